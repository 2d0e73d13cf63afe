//! List CMS content

use anyhow::Result;

use crate::content::EffectivePost;
use crate::Blog;

/// List content by type: `sites`, `posts`, or `site` with a site id
pub async fn run(blog: &Blog, content_type: &str, site_id: Option<&str>) -> Result<()> {
    for line in lines(blog, content_type, site_id).await? {
        println!("{}", line);
    }
    Ok(())
}

/// Lines printed by [`run`]
pub async fn lines(blog: &Blog, content_type: &str, site_id: Option<&str>) -> Result<Vec<String>> {
    let mut out = Vec::new();

    match content_type {
        "site" | "sites" if site_id.is_none() => {
            let sites = blog.store.sites().await?;
            out.push(format!("Sites ({}):", sites.len()));
            for site in sites {
                out.push(format!(
                    "  {} - {}",
                    site.site_id.as_deref().unwrap_or("-"),
                    site.title.as_deref().unwrap_or("Untitled")
                ));
            }
        }
        "site" | "sites" => {
            let site_id = site_id.unwrap_or_default();
            let posts = blog.store.site_listing(site_id).await?;
            out.push(format!("Posts of {} ({}):", site_id, posts.len()));
            for post in &posts {
                out.push(effective_line(post));
            }
        }
        "post" | "posts" => {
            let posts = blog.store.master_posts().await?;
            out.push(format!("Master posts ({}):", posts.len()));
            for post in posts {
                out.push(format!(
                    "  {} - {} [{}]",
                    date_column(post.published_at.as_ref()),
                    post.title.as_deref().unwrap_or("Untitled"),
                    post.slug.as_ref().map(|s| s.current.as_str()).unwrap_or("-")
                ));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: sites, posts, site <id>",
                content_type
            );
        }
    }

    Ok(out)
}

fn effective_line(post: &EffectivePost) -> String {
    format!(
        "  {} - {} [{}]",
        date_column(post.published_at.as_ref()),
        post.title.as_deref().unwrap_or("Untitled"),
        post.slug_str().unwrap_or("-")
    )
}

fn date_column(date: Option<&chrono::DateTime<chrono::Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string())
}
