//! Render a single page to stdout

use anyhow::Result;

use crate::Blog;

/// Render `path` and print the HTML. Missing pages are an error.
pub async fn run(blog: &Blog, path: &str) -> Result<()> {
    let generator = blog.generator()?;
    let outcome = generator.render_path(path).await?;
    if !outcome.is_found() {
        anyhow::bail!("No page at {}", path);
    }
    println!("{}", outcome.html());
    Ok(())
}
