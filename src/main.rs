use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use simple_components::config::HostConfig;
use simple_components::cookie::register_cookie_banner;
use simple_components::dom;
use simple_components::registry::Registry;
use simple_components::session::{InMemorySessionStore, SessionStore};

/// Render registered widgets into a static HTML page.
///
/// The browser build registers widgets on a window namespace and lets the
/// page call them; this host does the same wiring explicitly, then writes
/// the resulting document out.
#[derive(Parser)]
#[command(name = "simple-components", version)]
struct Cli {
    /// TOML host configuration; environment variables are used when absent.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the page path from the configuration.
    #[arg(long)]
    page: Option<PathBuf>,
    /// Override the output path; stdout when absent.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => HostConfig::from_path(path)?,
        None => HostConfig::from_env()?,
    };
    if let Some(page) = cli.page {
        config.page = page;
    }
    if let Some(out) = cli.out {
        config.output = Some(out);
    }

    let store: Rc<dyn SessionStore> = Rc::new(InMemorySessionStore::new());
    let mut registry = Registry::new();
    register_cookie_banner(&mut registry, store)?;

    let html = fs::read_to_string(&config.page)
        .with_context(|| format!("reading page {:?}", config.page))?;
    let document = dom::parse_document(&html);

    let mut handles = Vec::new();
    for widget in &config.widgets {
        let Some(mount) = registry.mount_fn(&widget.entry) else {
            tracing::warn!(entry = %widget.entry, "no widget registered under entry point");
            continue;
        };
        match mount(&document, widget.to_mount_options()) {
            Ok(handle) => handles.push(handle),
            Err(err) => {
                tracing::warn!(entry = %widget.entry, %err, "mount failed; skipping widget");
            }
        }
    }
    tracing::info!(mounted = handles.len(), page = ?config.page, "rendered widgets into page");

    let rendered = document.to_string();
    match &config.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("writing output {:?}", path))?,
        None => println!("{rendered}"),
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
