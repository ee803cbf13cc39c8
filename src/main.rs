mod app;
mod clock;
mod domain;
mod engine;
mod error;
mod input;
mod notifications;
mod persistence;
mod report;
mod ticker;
mod ui;

use anyhow::{Context, Result};
use app::AppState;
use clap::{Parser, Subcommand};
use clock::SystemClock;
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use log::{error, info};
use persistence::{ensure_data_dir, get_or_create_user_uid, init_local_dir, log_file, FileStorage};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(about = "A terminal task timer with daily sessions, points and break reminders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .taskflow directory in the current directory
    Init,
    /// Generate a markdown report for the current day
    Report {
        /// Output file path. Defaults to <data dir>/report-YYYY-MM-DD.md
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export tasks, counters and settings as JSON
    Export {
        /// Output file path. Defaults to <data dir>/taskflow-data-YYYY-MM-DD.json
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the current state with an exported JSON file
    Import {
        file: PathBuf,
    },
    /// Print today's statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let data_dir = init_local_dir()?;
            println!("Initialized taskflow directory: {}", data_dir.display());
            println!();
            println!("Taskflow will now use this local directory for its data.");
            println!("Run 'taskflow' to start tracking tasks.");
            Ok(())
        }
        Some(Commands::Report { output }) => {
            let (app, _) = load_app()?;
            let date = chrono::Local::now().date_naive();
            let content = report::render_report(
                date,
                app.tasks(),
                app.engine.session(),
                app.engine.settings(),
            );
            let report_path = report::write_report(date, &content, output)?;
            println!("Report generated: {}", report_path.display());
            Ok(())
        }
        Some(Commands::Export { output }) => {
            let (app, data_dir) = load_app()?;
            let output = output.unwrap_or_else(|| {
                let date = chrono::Local::now().format("%Y-%m-%d");
                data_dir.join(format!("taskflow-data-{}.json", date))
            });
            persistence::atomic_write(&output, &app.export_snapshot()?)?;
            println!("Exported {} tasks to {}", app.tasks().len(), output.display());
            Ok(())
        }
        Some(Commands::Import { file }) => {
            let (mut app, _) = load_app()?;
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read file: {}", file.display()))?;
            let count = app
                .import_snapshot(&content)
                .with_context(|| format!("Could not import {}", file.display()))?;
            if !app.last_save_ok {
                anyhow::bail!("Imported data could not be saved");
            }
            println!("Imported {} tasks", count);
            Ok(())
        }
        Some(Commands::Stats) => {
            let (app, _) = load_app()?;
            print_stats(&app);
            Ok(())
        }
        None => run_tui(),
    }
}

/// Send diagnostics to `<data dir>/taskflow.log`; the terminal belongs to the UI
fn init_logging(data_dir: &Path) -> Result<()> {
    let path = log_file(data_dir);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}

/// Load the stored state for the current user
fn load_app() -> Result<(AppState, PathBuf)> {
    let data_dir = ensure_data_dir()?;
    init_logging(&data_dir)?;

    let uid = get_or_create_user_uid(&data_dir);
    info!("using {} for user {}", data_dir.display(), uid);

    let storage = FileStorage::new(&data_dir, uid);
    let app = AppState::new(Box::new(SystemClock), Box::new(storage));
    Ok((app, data_dir))
}

fn print_stats(app: &AppState) {
    use domain::format_work_time;

    let stats = app.aggregate();
    let day = if app.engine.is_day_started() {
        "running"
    } else {
        "not started"
    };
    println!("Day:              {}", day);
    println!("Work time:        {}", format_work_time(stats.total_work_time));
    println!("Points:           {}", stats.points);
    println!(
        "Tasks completed:  {}/{} ({}%)",
        stats.completed_tasks, stats.total_tasks, stats.completion_rate
    );
    println!(
        "Avg per task:     {}",
        format_work_time(stats.avg_time_per_completed)
    );
    println!(
        "Pauses:           {} (~{})",
        stats.active_pause_count,
        format_work_time(stats.estimated_pause_time)
    );
}

fn run_tui() -> Result<()> {
    let (mut app, data_dir) = load_app()?;
    eprintln!("Using taskflow directory: {}", data_dir.display());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        LeaveAlternateScreen,
        SetTitle("")
    )?;
    terminal.show_cursor()?;

    // Save on exit
    if !app.save() {
        eprintln!("Error saving state, see {}", log_file(&data_dir).display());
    }

    if let Err(err) = result {
        error!("{:#}", err);
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let poll_rate = ticker::tick_duration();
    let mut title = String::new();

    loop {
        // Render
        terminal.draw(|f| ui::render(f, app))?;

        let next_title = app.window_title();
        if next_title != title {
            execute!(terminal.backend_mut(), SetTitle(&next_title))?;
            title = next_title;
        }

        // Handle events with timeout for ticking
        if event::poll(poll_rate)? {
            match event::read()? {
                // Only process key press events (ignore key release)
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if input::handle_key(app, key)? {
                        return Ok(());
                    }
                }
                Event::FocusLost => app.on_focus_change(false),
                Event::FocusGained => app.on_focus_change(true),
                _ => {}
            }
        }

        // Tick timers
        app.tick();
    }
}
