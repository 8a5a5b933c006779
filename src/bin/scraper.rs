use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgGroup, Parser};
use log::{error, info};
use reqwest::blocking::Client;
use url::Url;

use gameday::boundary::{boundary_url, get_boundary, inclusive_urls};
use gameday::scrape::{download, FetchReport, Scraper, WEB_ROOT};
use gameday::storage;

/// Crawl the Gameday directory tree and mirror game files locally or
/// into a blob store.
#[derive(Parser, Debug)]
#[command(name = "scraper", about = "Gameday crawler and downloader")]
#[command(group(ArgGroup::new("action").required(true)))]
struct Args {
    /// Beginning date as YYYY, YYYY-MM, or YYYY-MM-DD
    #[arg(short, long)]
    begin: Option<String>,

    /// Ending date as YYYY, YYYY-MM, or YYYY-MM-DD
    #[arg(short, long)]
    end: Option<String>,

    /// Mirror files into the local cache directory
    #[arg(long, group = "action")]
    download: bool,

    /// Push files into the configured blob store
    #[arg(long, group = "action")]
    upload: bool,

    /// Local cache directory for downloads
    #[arg(short, long, default_value = "cache")]
    cache: PathBuf,

    /// Storage config file for uploads
    #[arg(long, default_value = "storage.json")]
    config: PathBuf,

    /// Rerun the scrape on an interval until signalled
    #[arg(short, long)]
    daemon: bool,

    /// Seconds between daemon runs
    #[arg(long, default_value_t = 24 * 60 * 60)]
    interval: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.daemon {
        run_daemon(&args)
    } else {
        run_scrape(&args)
    }
}

/// Run the scraper over the range [begin, end].
///
/// With no beginning, scraping starts from the root. With no ending, it
/// stops at yesterday's date: the schedule for a day is published ahead
/// of its game files, so crawling "today" reports spurious misses.
fn run_scrape(args: &Args) -> Result<()> {
    let started = Instant::now();
    let root = Url::parse(WEB_ROOT).context("parsing the web root")?;

    let begin = get_boundary(args.begin.as_deref());
    let start = match begin.date {
        Some(date) => root.join(&boundary_url(date, begin.parts))?.to_string(),
        None => WEB_ROOT.to_string(),
    };

    let end = get_boundary(args.end.as_deref());
    let stop = match end.date {
        Some(date) => root.join(&boundary_url(date, end.parts))?.to_string(),
        None => {
            let yesterday = Local::now().date_naive() - chrono::Duration::days(1);
            root.join(&boundary_url(yesterday, 3))?.to_string()
        }
    };

    let client = Client::new();
    let scraper = Scraper::new(client.clone());

    let years = inclusive_urls(scraper.years(WEB_ROOT), start.clone(), stop.clone());
    let months = inclusive_urls(scraper.months(years), start.clone(), stop.clone());
    let days = inclusive_urls(scraper.days(months), start, stop);
    let games = scraper.games(days);
    let files = scraper.files(games);

    let report: FetchReport = if args.upload {
        let config = storage::load_config(&args.config)?;
        let driver = storage::get_driver(&config)?;
        let container = storage::get_container(driver.as_ref(), &config.container)?;
        storage::upload(&client, files, driver.as_ref(), &container)
    } else {
        download(&client, files, &args.cache)
    };

    info!(
        "{} files in {:.1?}",
        report.completed,
        started.elapsed()
    );
    for url in &report.failures {
        error!("failed to download {}", url);
    }
    Ok(())
}

/// Rerun the scrape every `interval` seconds. SIGINT or SIGTERM stops
/// the loop between runs; an in-flight crawl finishes its pass first.
fn run_daemon(args: &Args) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })
    .context("installing the signal handler")?;

    while running.load(Ordering::SeqCst) {
        if let Err(err) = run_scrape(args) {
            error!("scrape run failed: {:#}", err);
        }

        let pause = Duration::from_secs(args.interval);
        let waited = Instant::now();
        while running.load(Ordering::SeqCst) && waited.elapsed() < pause {
            std::thread::sleep(Duration::from_secs(1));
        }
    }

    info!("daemon stopped");
    Ok(())
}
