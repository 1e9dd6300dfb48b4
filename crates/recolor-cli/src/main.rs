//! `recolor`: print the color overlay of a set of stylesheets.
//!
//! ```text
//! recolor --config gruvbox.yaml css/site.css css/print.css
//! recolor --transform '[255 - r, 255 - g, 255 - b, a]' --style 'body { color: #111 }'
//! recolor --transform '[0, 0, 0, 1]' --inline 'color: red; margin: 0'
//! ```
//!
//! Sheets are relative paths or URLs, resolved against `--page-url`
//! (default: the current directory). Logging goes to stderr and is
//! controlled with `RUST_LOG`.

mod fetcher;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use recolor::{Config, Overlay, PageStyles, RecolorEngine, RecolorPass, Sandbox};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::fetcher::CliFetcher;

#[derive(Debug, Parser)]
#[command(name = "recolor", version, about = "Print the color-only overlay of stylesheets")]
struct Cli {
    /// YAML config file (target_colors, swap_rules, transform_function, ...)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transform expression; overrides the config's transform_function
    #[arg(short, long)]
    transform: Option<String>,

    /// URL of the page the sheets belong to
    #[arg(long)]
    page_url: Option<String>,

    /// Inline CSS text, placed before the linked sheets
    #[arg(long = "style", value_name = "CSS")]
    styles: Vec<String>,

    /// Recolor a single inline declaration block and print the override
    #[arg(long, value_name = "STYLE", conflicts_with_all = ["styles", "sheets"])]
    inline: Option<String>,

    /// Stylesheet paths or URLs
    sheets: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(transform) = &cli.transform {
        let sandbox = Sandbox::new(transform.as_str()).context("invalid --transform")?;
        config = config.with_transform(sandbox);
    }

    let page_url = match &cli.page_url {
        Some(url) => url.clone(),
        None => current_dir_url()?,
    };
    let engine = RecolorEngine::css()?;
    let fetcher = CliFetcher::new();
    let pass = RecolorPass::new(&engine, &config, &fetcher);

    if let Some(style) = &cli.inline {
        if let Some(css) = pass.recolor_element_style(style, &page_url) {
            println!("{css}");
        }
        return Ok(());
    }

    let mut page = PageStyles::new(page_url.as_str());
    for css in &cli.styles {
        page = page.with_resident(css.as_str());
    }
    for sheet in &cli.sheets {
        page = page.with_linked(sheet.as_str());
    }

    let mut overlay = Overlay::new();
    let appended = pass.run(&page, &mut overlay).await;
    tracing::debug!(appended, "overlay ready");
    if !overlay.is_empty() {
        println!("{}", overlay.to_css());
    }
    Ok(())
}

fn current_dir_url() -> anyhow::Result<String> {
    let dir = std::env::current_dir().context("cannot read current directory")?;
    Url::from_directory_path(&dir)
        .map(String::from)
        .map_err(|()| anyhow!("cannot express {} as a URL", dir.display()))
}
