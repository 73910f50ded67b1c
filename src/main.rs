use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trendwatch::app::{write_export, App, View};
use trendwatch::config::parse_warning_spec;
use trendwatch::data::duration::parse_refresh_interval;
use trendwatch::{events, ui, DataSource, FileSource, PanelConfig, PanelData};
use trendwatch_types::ResultBatch;

#[derive(Parser, Debug)]
#[command(name = "trendwatch")]
#[command(about = "Terminal monitor that warns before a metric trend crosses its threshold")]
struct Args {
    /// Panel config file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay a saved render response instead of querying the backend
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Graphite base URL (overrides the config endpoint)
    #[cfg(feature = "graphite")]
    #[arg(short, long, conflicts_with = "file")]
    graphite: Option<String>,

    /// Add a warning, e.g. "servers.web1.disk.used >= 90" (repeatable)
    #[arg(short, long = "warn", value_name = "WARNING")]
    warnings: Vec<String>,

    /// Crossings closer than this many days are warnings
    #[arg(short, long)]
    days: Option<u32>,

    /// Refresh interval (e.g. "30s", "5m")
    #[arg(short, long, default_value = "30s")]
    refresh: String,

    /// Export current state to JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Write logs to this file (RUST_LOG controls the level)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_file.as_deref())?;

    let mut panel = PanelConfig::load(args.config.as_deref())?;
    for spec in &args.warnings {
        let (target, threshold, op) = parse_warning_spec(spec)?;
        panel.add_warning(target, threshold, op);
    }
    if let Some(days) = args.days {
        panel.time_proximity_days = days;
    }
    #[cfg(feature = "graphite")]
    if let Some(ref url) = args.graphite {
        panel.endpoint = url.clone();
    }

    let refresh = parse_refresh_interval(&args.refresh)
        .with_context(|| format!("Invalid --refresh '{}'", args.refresh))?;

    info!(
        "Starting with {} warnings, proximity {} days",
        panel.warnings.len(),
        panel.time_proximity_days
    );

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        let batch = match args.file {
            Some(ref path) => read_file_once(path)?,
            None => fetch_once(&panel)?,
        };
        return export_to_file(&batch, &panel, export_path);
    }

    if let Some(ref path) = args.file {
        return run_tui(Box::new(FileSource::new(path)), panel, refresh);
    }

    run_with_graphite(panel, refresh)
}

/// Install the tracing subscriber. Without a log file logging stays off,
/// since the terminal belongs to the TUI.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trendwatch=info,trendwatch_adapters=info")),
        )
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();
    Ok(())
}

/// Run against a Graphite server, querying on a background runtime
#[cfg(feature = "graphite")]
fn run_with_graphite(panel: PanelConfig, refresh: Duration) -> Result<()> {
    use trendwatch::spawn_query_loop;

    let adapter = graphite_adapter(&panel)?;
    let rt = tokio::runtime::Runtime::new()?;

    let source = {
        let _guard = rt.enter();
        spawn_query_loop(adapter, panel.query(), refresh)
    };

    // The runtime keeps driving the query loop while the TUI owns this thread
    run_tui(Box::new(source), panel, refresh)
}

#[cfg(not(feature = "graphite"))]
fn run_with_graphite(_panel: PanelConfig, _refresh: Duration) -> Result<()> {
    bail!("Built without Graphite support; pass --file to replay a saved response")
}

#[cfg(feature = "graphite")]
fn graphite_adapter(
    panel: &PanelConfig,
) -> Result<trendwatch_adapters::graphite::GraphiteAdapter> {
    if panel.datasource != "graphite" {
        bail!("Unsupported datasource '{}'", panel.datasource);
    }
    Ok(trendwatch_adapters::graphite::GraphiteAdapter::builder()
        .endpoint(&panel.endpoint)
        .build()?)
}

/// Run one query and wait for the result
#[cfg(feature = "graphite")]
fn fetch_once(panel: &PanelConfig) -> Result<ResultBatch> {
    let adapter = graphite_adapter(panel)?;
    let rt = tokio::runtime::Runtime::new()?;
    let batch = rt.block_on(adapter.fetch(&panel.query()))?;
    Ok(batch)
}

#[cfg(not(feature = "graphite"))]
fn fetch_once(_panel: &PanelConfig) -> Result<ResultBatch> {
    bail!("Built without Graphite support; pass --file to export a saved response")
}

fn read_file_once(path: &Path) -> Result<ResultBatch> {
    let mut source = FileSource::new(path);
    match source.poll() {
        Some(batch) => Ok(batch),
        None => bail!("{}", source.error().unwrap_or("No data in file")),
    }
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, panel: PanelConfig, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, panel);
    let _ = app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

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

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered =
                    ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
                        .intersection(area);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Warnings => ui::warnings::render(frame, app, chunks[2]),
                View::Alerts => ui::alerts::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    // Content starts after header (1) + tabs (1) + table header (1)
                    events::handle_mouse_event(app, mouse, 3);
                }
                _ => {}
            }
        }

        // New batches are picked up as soon as they arrive; the full
        // re-evaluation against the clock runs once per interval.
        if last_refresh.elapsed() >= refresh_interval {
            let _ = app.refresh();
            last_refresh = Instant::now();
        } else {
            let _ = app.reload_data();
        }
    }

    Ok(())
}

/// Classify one batch and write the export
fn export_to_file(batch: &ResultBatch, panel: &PanelConfig, export_path: &Path) -> Result<()> {
    let data = PanelData::from_batch(
        &panel.warnings,
        batch,
        Utc::now(),
        panel.time_proximity_days,
    )?;
    write_export(&data, panel, export_path)?;

    let counts = data.counts();
    println!(
        "Exported {} targets ({} warning, {} critical) to: {}",
        counts.total(),
        counts.warning,
        counts.critical,
        export_path.display()
    );
    Ok(())
}
