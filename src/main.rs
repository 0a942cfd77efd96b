use plainchant_api::site::{Page, Thread};
use plainchant_api::util::ApiErr;
use plainchant_api::{Api, Config, Mode};

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum View {
    /// One thread with all replies
    Thread,
    /// A board index page of full threads
    Page,
    /// Catalog pages of thread roots
    Catalog,
    /// Catalog pages in the reduced threads-page form
    Threads,
}

/// Render a JSON dump of board records as the public JSON API
#[derive(Debug, Parser)]
#[command(name = "plainchant-api", version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(value_enum)]
    view: View,

    /// JSON dump of the records to translate
    input: PathBuf,
}

fn run(args: Args) -> Result<String, ApiErr> {
    let config = match &args.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };
    let api = Api::new(config);

    let input = fs::read_to_string(&args.input)?;
    info!(input = %args.input.display(), view = ?args.view, "Translating");

    let out = match args.view {
        View::Thread => {
            let thread: Thread = serde_json::from_str(&input)?;
            serde_json::to_string_pretty(&api.translate_thread(&thread, Mode::Full))?
        },
        View::Page => {
            let threads: Vec<Thread> = serde_json::from_str(&input)?;
            serde_json::to_string_pretty(&api.translate_page(&threads))?
        },
        View::Catalog => {
            let pages: Vec<Page> = serde_json::from_str(&input)?;
            serde_json::to_string_pretty(&api.translate_catalog(&pages, Mode::Full))?
        },
        View::Threads => {
            let pages: Vec<Page> = serde_json::from_str(&input)?;
            serde_json::to_string_pretty(&api.translate_catalog(&pages, Mode::ThreadsPageOnly))?
        },
    };
    Ok(out)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(out) => println!("{}", out),
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        },
    }
}
