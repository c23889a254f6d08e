use clap::{error::ErrorKind, CommandFactory, Parser};
use cookfinity::{
    app::App,
    app_dirs::AppDirs,
    catalog::Catalog,
    config::{Config, ConfigStore, FileConfigStore},
    leaderboard::{format_table, write_csv, DifficultyFilter, Leaderboard, TimeWindow},
    ledger::{Difficulty, MemoryLedger, ScoreLedger, SqliteLedger},
    logging::init_file_logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner, ShellEvent, ShellEventSource, Ticker},
};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};

const TICK_RATE_MS: u64 = 100;

/// recipe browser and drag-and-drop cooking game for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Browse recipes, then cook them by dragging ingredients onto kitchen stations with the mouse. Finished dishes are scored and kept on a local leaderboard."
)]
pub struct Cli {
    /// open this recipe and start cooking right away
    #[clap(short = 'r', long)]
    recipe: Option<u64>,

    /// start with the results of this search
    #[clap(short = 's', long)]
    search: Option<String>,

    /// player name saved with your scores (remembered)
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// difficulty label saved with your scores (remembered)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// turn sound cues off (remembered)
    #[clap(short = 'm', long)]
    mute: bool,

    /// turn sound cues back on
    #[clap(long, conflicts_with = "mute")]
    unmute: bool,

    /// print the leaderboard and exit
    #[clap(long)]
    leaderboard: bool,

    /// write the leaderboard as CSV to PATH and exit
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,
}

impl Cli {
    /// Folds the remembered settings into `cfg`. Returns true if anything changed.
    fn apply(&self, cfg: &mut Config) -> bool {
        let before = cfg.clone();
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            cfg.player_name = name.to_string();
        }
        if let Some(difficulty) = self.difficulty {
            cfg.difficulty = difficulty;
        }
        if self.mute {
            cfg.sound_enabled = false;
        }
        if self.unmute {
            cfg.sound_enabled = true;
        }
        *cfg != before
    }

    fn wants_report(&self) -> bool {
        self.leaderboard || self.export_csv.is_some()
    }
}

fn open_ledger() -> Box<dyn ScoreLedger> {
    match SqliteLedger::open_default() {
        Ok(ledger) => Box::new(ledger),
        Err(err) => {
            warn!(%err, "score database unavailable, scores will not persist");
            Box::new(MemoryLedger::new())
        }
    }
}

fn report(cli: &Cli, ledger: &dyn ScoreLedger) -> Result<(), Box<dyn Error>> {
    let board = Leaderboard::load(ledger)?;
    let entries = board.ranked(
        DifficultyFilter::All,
        TimeWindow::AllTime,
        chrono::Local::now(),
    );

    if let Some(path) = &cli.export_csv {
        write_csv(&entries, File::create(path)?)?;
        info!(path = %path.display(), rows = entries.len(), "leaderboard exported");
        println!("wrote {} scores to {}", entries.len(), path.display());
    }
    if cli.leaderboard {
        print!("{}", format_table(&entries, chrono::Local::now()));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        if let Err(err) = init_file_logging(&path) {
            eprintln!("cookfinity: logging disabled: {err}");
        }
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    if cli.apply(&mut config) {
        if let Err(err) = store.save(&config) {
            warn!(%err, path = %store.path().display(), "could not save config");
        }
    }

    let ledger = open_ledger();
    if cli.wants_report() {
        return report(&cli, ledger.as_ref());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let catalog = Catalog::offline()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut app = App::new(catalog, ledger, config, runner.sender());
    let size = terminal.size()?;
    app.resize(size.width, size.height);

    if let Some(query) = cli.search.as_deref() {
        app.search(query);
    }
    if let Some(id) = cli.recipe {
        app.open_recipe(id);
        if app.recipe.is_some() {
            app.start_game();
        }
    }

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: ShellEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    info!("shell started");
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step();
        if let ShellEvent::Resize = event {
            let size = terminal.size()?;
            app.resize(size.width, size.height);
        }
        app.handle(event);

        if app.should_quit {
            break;
        }
    }
    app.shutdown();
    info!("shell stopped");
    Ok(())
}
