use blogdex::client::BlogClient;
use blogdex::config::{self, BlogConfig};
use blogdex::source::{ContentSource, DirSource, HttpSource};
use blogdex::{generate, output, page, scan};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blogdex")]
#[command(about = "Markdown blog pipeline: article index builder and renderer")]
#[command(long_about = "\
Markdown blog pipeline: article index builder and renderer

Articles are plain Markdown files. The build indexes them into a JSON
document and mirrors the raw files next to it; the client reads that
output back, normalizes an article and renders it to HTML.

Content structure:

  content/articles/
  ├── hello-world.md               # slug: hello-world
  └── 2024/
      ├── shipping-a-cli.md        # nesting is free; slugs stay flat
      └── img/terminal.png         # referenced as img/terminal.png

Build output (base_path = \"/blog\"):

  public/blog/
  ├── articles.json                # { \"articles\": [...] }, newest first
  └── content/                     # byte-identical copy of content/articles/

Metadata resolution (first available wins):
  Title:   front matter title → first '# heading' → filename
  Date:    front matter date → file modification time
  Summary: front matter summary → first 180 characters of the text
  Slug:    front matter slug → slugified filename

Run 'blogdex gen-config' to generate a documented blog.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Override the Markdown content directory
    #[arg(long, global = true)]
    content_dir: Option<PathBuf>,

    /// Override the served web root
    #[arg(long, global = true)]
    public_dir: Option<PathBuf>,

    /// Log debug events to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Where the client reads the built blog from.
#[derive(Args, Clone)]
struct SiteArgs {
    /// Read from a live site instead of the local public directory
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the article index and content mirror (default)
    Build,
    /// Scan and describe articles without writing anything
    Check,
    /// List articles from the built index, newest first
    List {
        /// Only the newest N (config client.latest_count when N is omitted)
        #[arg(long, value_name = "N")]
        latest: Option<Option<usize>>,
        #[command(flatten)]
        site: SiteArgs,
    },
    /// Fetch and render one article
    Show {
        slug: String,
        /// Print the normalized Markdown instead of HTML
        #[arg(long, conflicts_with = "page")]
        markdown: bool,
        /// Print a standalone HTML preview document
        #[arg(long)]
        page: bool,
        #[command(flatten)]
        site: SiteArgs,
    },
    /// Print a stock blog.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.take().unwrap_or(Command::Build);
    run(command, &cli).await
}

impl Cli {
    /// `blog.toml` merged over the defaults, then the directory flags.
    fn load_config(&self) -> Result<BlogConfig, config::ConfigError> {
        let mut config = config::load_config(&self.config)?;
        if let Some(dir) = &self.content_dir {
            config.content_dir = dir.clone();
        }
        if let Some(dir) = &self.public_dir {
            config.public_dir = dir.clone();
        }
        Ok(config)
    }
}

async fn run(command: Command, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::GenConfig => print!("{}", config::stock_config_toml()),
        Command::Build => {
            let config = &cli.load_config()?;
            println!("==> Building {}", config.content_dir.display());
            let report = generate::generate(config)?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", config.output_root().display());
        }
        Command::Check => {
            let config = &cli.load_config()?;
            println!("==> Checking {}", config.content_dir.display());
            let articles = if config.content_dir.exists() {
                scan::scan(
                    &config.content_dir,
                    &config.content_url_prefix(),
                    &config.index,
                )?
                .articles
            } else {
                Vec::new()
            };
            output::print_check_output(&articles);
            println!("==> Content is valid");
        }
        Command::List { latest, site } => {
            let config = &cli.load_config()?;
            let client = build_client(config, &site)?;
            let articles = match latest {
                None => client.list_articles().await?.to_vec(),
                Some(n) => {
                    client
                        .list_latest(n.unwrap_or(config.client.latest_count))
                        .await?
                }
            };
            output::print_article_list(&articles);
        }
        Command::Show {
            slug,
            markdown,
            page: as_page,
            site,
        } => {
            let config = &cli.load_config()?;
            let client = build_client(config, &site)?;
            let Some(article) = client.get_article(&slug).await? else {
                return Err(format!("No article with slug '{slug}'").into());
            };
            if markdown {
                print!("{}", article.markdown);
            } else if as_page {
                println!("{}", page::render_article_page(&article).into_string());
            } else {
                print!("{}", article.html);
            }
        }
    }
    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_client(
    config: &BlogConfig,
    site: &SiteArgs,
) -> Result<BlogClient, Box<dyn std::error::Error>> {
    let source: Arc<dyn ContentSource> = match &site.base_url {
        Some(url) => Arc::new(HttpSource::new(url)?),
        None => Arc::new(DirSource::new(config.public_dir.clone())),
    };
    Ok(BlogClient::from_config(config, source))
}
