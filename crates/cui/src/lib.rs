mod actions;
mod app;
mod input;
mod persistence;
mod view;

use anyhow::{Context, Result};
use app::App;
pub use app::CardSource;
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs::OpenOptions;
use std::io::{self, stdout, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_LOG_FILE: &str = "recall.log";

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub stage: Option<String>,
    pub category: Option<String>,
    pub seed: Option<u64>,
    pub assets_dir: PathBuf,
    pub prefs_path: Option<PathBuf>,
    pub source: CardSource,
    pub gated: bool,
    pub log_path: PathBuf,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            stage: None,
            category: None,
            seed: None,
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            prefs_path: None,
            source: CardSource::Catalog,
            gated: false,
            log_path: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

pub fn run(options: LaunchOptions) -> Result<()> {
    init_logging(&options.log_path);
    ensure_interactive_terminal()?;
    let mut app = App::bootstrap(&options)?;

    enable_raw_mode().map_err(|err| {
        anyhow::anyhow!(
            "failed to enable raw mode; ensure the process owns an interactive terminal: {err}"
        )
    })?;
    let mut stdout = stdout();
    stdout
        .execute(EnterAlternateScreen)
        .context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let run_result = run_loop(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    run_result
}

pub fn run_with_args(args: &[String]) -> Result<()> {
    let options = parse_options(args)?;
    run(options)
}

fn parse_options(args: &[String]) -> Result<LaunchOptions> {
    let mut options = LaunchOptions {
        stage: std::env::var("RECALL_STAGE").ok(),
        category: std::env::var("RECALL_CATEGORY").ok(),
        ..LaunchOptions::default()
    };
    if let Some(dir) = std::env::var_os("RECALL_ASSETS") {
        options.assets_dir = PathBuf::from(dir);
    }
    if let Some(path) = std::env::var_os("RECALL_LOG") {
        options.log_path = PathBuf::from(path);
    }
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--stage" => {
                if let Some(value) = args.get(idx + 1) {
                    options.stage = Some(value.clone());
                    idx += 1;
                }
            }
            "--category" => {
                if let Some(value) = args.get(idx + 1) {
                    options.category = Some(value.clone());
                    idx += 1;
                }
            }
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    options.seed = value.parse::<u64>().ok();
                    idx += 1;
                }
            }
            "--assets" => {
                if let Some(value) = args.get(idx + 1) {
                    options.assets_dir = PathBuf::from(value);
                    idx += 1;
                }
            }
            "--prefs" => {
                if let Some(value) = args.get(idx + 1) {
                    options.prefs_path = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--source" => {
                if let Some(value) = args.get(idx + 1) {
                    options.source = CardSource::parse(value).ok_or_else(|| {
                        anyhow::anyhow!("unknown card source `{value}` (catalog|unsplash)")
                    })?;
                    idx += 1;
                }
            }
            "--log" => {
                if let Some(value) = args.get(idx + 1) {
                    options.log_path = PathBuf::from(value);
                    idx += 1;
                }
            }
            "--gated" => options.gated = true,
            _ => {}
        }
        idx += 1;
    }
    Ok(options)
}

/// Logs go to a file so they never draw over the TUI. An unopenable file
/// leaves logging off.
fn init_logging(path: &Path) {
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .ok();
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    while !app.should_quit {
        terminal.draw(|frame| view::draw(frame, app))?;
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let action = input::map_key(key);
                    let elapsed = last_tick.elapsed();
                    last_tick = Instant::now();
                    app.apply_input(action, elapsed);
                }
            }
        }
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            last_tick = Instant::now();
            app.on_tick(elapsed);
        }
    }
    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("leave alternate screen")?;
    terminal.show_cursor().context("show cursor")?;
    Ok(())
}

fn ensure_interactive_terminal() -> Result<()> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        return Ok(());
    }
    anyhow::bail!(
        "recall requires an interactive TTY (run directly in a terminal, not a piped/headless shell)"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_flags() {
        let options = parse_options(&args(&[
            "--stage", "hard", "--category", "space", "--seed", "42", "--gated", "--assets",
            "data",
        ]))
        .expect("options");
        assert_eq!(options.stage.as_deref(), Some("hard"));
        assert_eq!(options.category.as_deref(), Some("space"));
        assert_eq!(options.seed, Some(42));
        assert!(options.gated);
        assert_eq!(options.assets_dir, PathBuf::from("data"));
        assert_eq!(options.source, CardSource::Catalog);
    }

    #[test]
    fn rejects_unknown_source() {
        let err = parse_options(&args(&["--source", "ftp"])).expect_err("bad source");
        assert!(err.to_string().contains("unknown card source"));
    }

    #[test]
    fn bad_seed_is_ignored() {
        let options = parse_options(&args(&["--seed", "abc"])).expect("options");
        assert_eq!(options.seed, None);
    }
}
