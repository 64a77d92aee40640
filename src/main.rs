//! Ekman - explore labeled multi-dimensional datasets in the terminal.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ekman::app::{App, Focus};
use ekman::config::{load_params, parse_param, InitialParams};
use ekman::control::CartographicProvider;
use ekman::dashboard::Dashboard;
use ekman::data::DataReader;
use ekman::guess::CfAxisGuesser;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "ekman", version)]
#[command(about = "Explore labeled multi-dimensional datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a dataset and launch the interface
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Path to the NetCDF file to open
    path: PathBuf,

    /// JSON object with initial control values
    #[arg(long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Initial control value, overriding --params (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    param: Vec<String>,

    /// Leave out the projection pane
    #[arg(long)]
    no_projection: bool,

    /// Do not guess axes from metadata
    #[arg(long)]
    no_guess: bool,

    /// Print the kwargs JSON after applying the initial values, then exit
    #[arg(long)]
    dump_kwargs: bool,

    /// Enable logging to specified file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Log filter, in RUST_LOG syntax
    #[arg(long, default_value = "debug")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Show(args) => show(args),
    }
}

fn init_logging(args: &ShowArgs) -> Result<()> {
    let Some(log_path) = &args.log else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
    let filter = EnvFilter::try_new(&args.log_level)
        .with_context(|| format!("Invalid log level '{}'", args.log_level))?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing::info!("Starting Ekman");
    Ok(())
}

fn initial_params(args: &ShowArgs) -> Result<InitialParams> {
    let mut params = match &args.params {
        Some(path) => load_params(path)
            .with_context(|| format!("Failed to read parameters from {}", path.display()))?,
        None => InitialParams::new(),
    };
    for pair in &args.param {
        let (key, value) = parse_param(pair)?;
        params.insert(key, value);
    }
    Ok(params)
}

fn show(args: ShowArgs) -> Result<()> {
    init_logging(&args)?;
    let params = initial_params(&args)?;

    let dashboard = DataReader::read_file(&args.path).and_then(|data| {
        let mut builder = Dashboard::builder(data).initial_params(params);
        if !args.no_projection {
            builder = builder.projection(CartographicProvider);
        }
        if !args.no_guess {
            builder = builder.axis_guesser(CfAxisGuesser);
        }
        builder.build()
    });
    let dashboard = match dashboard {
        Ok(dashboard) => dashboard,
        Err(err) => {
            eprintln!("Unable to open the datafile: {}", err);
            std::process::exit(1);
        },
    };

    if args.dump_kwargs {
        println!("{}", dashboard.kwargs().to_json()?);
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(dashboard, args.path.clone());
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    if args.log.is_some() {
        tracing::info!("Ekman exited");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| ekman::ui::draw(f, &app))?;

        if !event::poll(std::time::Duration::from_millis(250))? {
            app.tick();
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        // Text input mode
        if let Some(buffer) = app.editing.as_mut() {
            match key.code {
                KeyCode::Enter => app.commit_editing(),
                KeyCode::Esc => app.editing = None,
                KeyCode::Backspace => {
                    buffer.pop();
                },
                KeyCode::Char(c) => buffer.push(c),
                _ => {},
            }
            continue;
        }

        // Keys shared by both focuses
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(()),
            (KeyModifiers::SHIFT, KeyCode::Char('T')) => {
                app.cycle_theme();
                continue;
            },
            (KeyModifiers::NONE, KeyCode::Char('y')) => {
                app.copy_kwargs();
                continue;
            },
            (KeyModifiers::NONE, KeyCode::Char('f')) => {
                app.toggle_focus();
                continue;
            },
            _ => {},
        }

        match app.focus {
            Focus::Plot => match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Esc) => app.toggle_focus(),
                (KeyModifiers::NONE, KeyCode::Up) | (KeyModifiers::NONE, KeyCode::Char('k')) => {
                    app.move_crosshair(1, 0);
                },
                (KeyModifiers::NONE, KeyCode::Down) | (KeyModifiers::NONE, KeyCode::Char('j')) => {
                    app.move_crosshair(-1, 0);
                },
                (KeyModifiers::NONE, KeyCode::Left) | (KeyModifiers::NONE, KeyCode::Char('h')) => {
                    app.move_crosshair(0, -1);
                },
                (KeyModifiers::NONE, KeyCode::Right) | (KeyModifiers::NONE, KeyCode::Char('l')) => {
                    app.move_crosshair(0, 1);
                },
                (KeyModifiers::SHIFT, KeyCode::Char('K')) => app.move_crosshair(10, 0),
                (KeyModifiers::SHIFT, KeyCode::Char('J')) => app.move_crosshair(-10, 0),
                (KeyModifiers::SHIFT, KeyCode::Char('H')) => app.move_crosshair(0, -10),
                (KeyModifiers::SHIFT, KeyCode::Char('L')) => app.move_crosshair(0, 10),
                (KeyModifiers::NONE, KeyCode::Enter) => app.tap(),
                (KeyModifiers::NONE, KeyCode::Char('c')) => app.clear_series(),
                (KeyModifiers::NONE, KeyCode::Char('s')) => app.next_selector(),
                (_, KeyCode::Char('+')) | (KeyModifiers::NONE, KeyCode::Char('=')) => {
                    app.step_selector(1);
                },
                (KeyModifiers::NONE, KeyCode::Char('-')) => app.step_selector(-1),
                (KeyModifiers::NONE, KeyCode::Char(' ')) => app.toggle_playing(),
                _ => {},
            },
            Focus::Controls => match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Tab) => app.next_tab(),
                (_, KeyCode::BackTab) => app.prev_tab(),
                (KeyModifiers::NONE, KeyCode::Up) | (KeyModifiers::NONE, KeyCode::Char('k')) => {
                    app.cursor_up();
                },
                (KeyModifiers::NONE, KeyCode::Down) | (KeyModifiers::NONE, KeyCode::Char('j')) => {
                    app.cursor_down();
                },
                (KeyModifiers::NONE, KeyCode::Left) | (KeyModifiers::NONE, KeyCode::Char('h')) => {
                    app.step(-1);
                },
                (KeyModifiers::NONE, KeyCode::Right) | (KeyModifiers::NONE, KeyCode::Char('l')) => {
                    app.step(1);
                },
                (KeyModifiers::NONE, KeyCode::Char(' ')) => app.toggle(),
                (KeyModifiers::NONE, KeyCode::Enter) => app.start_editing(),
                (KeyModifiers::NONE, KeyCode::Char('p')) => app.plot(),
                _ => {},
            },
        }
    }
}
