//! CLI entry point for msm-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use msm_blog::config::AppConfig;
use msm_blog::Blog;

#[derive(Parser)]
#[command(name = "msm-blog")]
#[command(version)]
#[command(about = "Multi-site blog front-end over a headless CMS", long_about = None)]
struct Cli {
    /// Configuration file (defaults to msm.yml in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serve documents from an exported JSON dataset instead of the CMS
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to the configured address)
        #[arg(short, long)]
        ip: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// List sites, master posts, or the posts of one site
    List {
        /// Type of content to list (sites, posts, site)
        #[arg(default_value = "sites")]
        r#type: String,

        /// Site id, for `list site <id>`
        site: Option<String>,
    },

    /// Render one page to stdout
    Render {
        /// Request path, e.g. /us/hello-world
        #[arg(default_value = "/")]
        path: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "msm_blog=debug,info"
    } else {
        "msm_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Commands::Version = cli.command {
        println!("msm-blog version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::discover(std::env::current_dir()?)?,
    };
    config.apply_env();

    let blog = match &cli.fixtures {
        Some(path) => {
            tracing::info!("Serving fixtures from {:?}", path);
            Blog::from_fixtures(config, path)?
        }
        None => Blog::connect(config)?,
    };

    match cli.command {
        Commands::Serve { port, ip, open } => {
            let ip = ip.unwrap_or_else(|| blog.config.server.ip.clone());
            let port = port.unwrap_or(blog.config.server.port);
            tracing::info!("Starting server at http://{}:{}", ip, port);
            blog.serve(&ip, port, open).await?;
        }

        Commands::List { r#type, site } => {
            msm_blog::commands::list::run(&blog, &r#type, site.as_deref()).await?;
        }

        Commands::Render { path } => {
            msm_blog::commands::render::run(&blog, &path).await?;
        }

        Commands::Version => {}
    }

    Ok(())
}
