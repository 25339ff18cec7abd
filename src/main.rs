mod app;
mod config;
mod date_bound;
mod feed;
mod gallery;
mod overlay;
mod picker;
mod previews;
mod trigger;
mod ui;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, AppEvent, HitMap};
use config::Config;
use date_bound::DateParts;
use feed::FeedClient;
use gallery::{run_cycle, CycleOutcome, DateRange, EMPTY_TEXT, ERROR_TEXT};
use picker::{Endpoint, RangePicker};
use previews::PreviewManager;

#[derive(Parser, Debug)]
#[command(name = "apod")]
#[command(about = "Browse Astronomy Picture of the Day images by date range")]
#[command(version)]
struct Cli {
    /// Config file path [default: ~/.config/darkwall-apod/config.toml]
    #[arg(long)]
    config: Option<String>,

    /// Override the feed URL from the config
    #[arg(long)]
    feed_url: Option<String>,

    /// Preselect the start date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// Preselect the end date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,

    /// Fetch once, print matching images as tab-separated lines and exit
    #[arg(long)]
    print: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Disable picture previews
    #[arg(long)]
    no_images: bool,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let writer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "darkwall_apod=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(log_file.is_none()),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    // Load config
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.feed_url {
        config.feed.url = url;
    }
    if cli.no_images {
        config.images.enabled = false;
    }

    let client = FeedClient::new(config.feed.url.clone(), &config.feed.user_agent)
        .context("Failed to create feed client")?;

    if cli.print {
        return print_once(&client, cli.start, cli.end).await;
    }

    let mut picker = RangePicker::new(config.picker.first_year, Local::now().year());
    for (endpoint, date) in [(Endpoint::Start, cli.start), (Endpoint::End, cli.end)] {
        if let Some(date) = date {
            if !picker.preselect(endpoint, date) {
                tracing::warn!("{:?} date {} is outside the selectable years", endpoint, date);
            }
        }
    }

    // Graphics detection talks to the terminal, so it has to happen before raw mode
    let previews = if config.images.enabled {
        PreviewManager::detect()
    } else {
        PreviewManager::disabled()
    };

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut app = App::new(config, picker, client, previews, events_tx);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run main loop
    let result = run_app(&mut terminal, &mut app, events_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut events: UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        while let Ok(event) = events.try_recv() {
            app.handle_event(event);
        }

        let mut hits = HitMap::default();
        terminal.draw(|f| hits = ui::draw(f, app))?;
        app.set_hits(hits);
        app.request_visible_previews();

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}

/// Headless mode: one fetch-and-filter cycle printed to stdout
async fn print_once(client: &FeedClient, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    let bound = |date: Option<NaiveDate>| date.and_then(|d| DateParts::from_date(d).bound());
    let range = DateRange::new(bound(start), bound(end));

    match run_cycle(client, range).await {
        CycleOutcome::Loaded(images) => {
            for image in images {
                println!("{}\t{}\t{}", image.date, image.title, image.url);
            }
            Ok(())
        }
        CycleOutcome::NoMatches => {
            eprintln!("{}", EMPTY_TEXT);
            Ok(())
        }
        CycleOutcome::Failed(detail) => bail!("{} ({})", ERROR_TEXT, detail),
    }
}
