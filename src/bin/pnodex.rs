// Native binary for pnodex - Terminal UI mode (or one-shot JSON with --json)

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::File,
    io,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc::UnboundedReceiver;

use pnodex::{
    app::{App, InputMode},
    config::{load, Config},
    driver::Driver,
    source_http::HttpSource,
    types::AppEvent,
    ui, ui_snapshot,
    ui_snapshot::UiAction,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    let cfg = load().context("Failed to load configuration")?;
    init_logging(&cfg)?;
    cfg.log_summary();

    let source = HttpSource::new(&cfg.api_base, cfg.fetch_timeout_ms)
        .context("Failed to build HTTP client")?;
    let app = App::new(cfg.network, cfg.notice_duration());
    let (mut driver, mut rx) = Driver::new(app, Arc::new(source), cfg.sync_settings());

    if cfg.json {
        driver.start();
        driver.settle(&mut rx).await;
        driver.shutdown();
        let snap = ui_snapshot::build(driver.app());
        println!("{}", serde_json::to_string_pretty(&snap)?);
        return Ok(());
    }

    // terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    driver.start();

    // main loop
    let result = run_loop(&mut driver, &mut terminal, &mut rx, cfg.render_fps).await;

    // cleanup
    driver.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

/// The TUI owns the terminal, so logs go to a file. JSON mode owns stdout,
/// so logs go to stderr.
fn init_logging(cfg: &Config) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if !cfg.json {
        let file = File::create(&cfg.log_file)
            .with_context(|| format!("Failed to open log file {}", cfg.log_file))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

async fn run_loop(
    driver: &mut Driver,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    rx: &mut UnboundedReceiver<AppEvent>,
    fps: u32,
) -> Result<()> {
    let frame_ms = 1000u32.saturating_div(fps.max(1)) as u64;
    let budget = Duration::from_millis(frame_ms.max(1));
    let mut last_frame = Instant::now().checked_sub(budget).unwrap_or_else(Instant::now);

    loop {
        // frame budget (coalesced renders)
        let wait = budget.saturating_sub(last_frame.elapsed());

        // input or background events
        if event::poll(wait)? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                    handle_key(driver, k);
                }
            }
        }
        while let Ok(ev) = rx.try_recv() {
            driver.handle(ev);
        }

        if driver.app().quit_flag() {
            break;
        }
        if last_frame.elapsed() >= budget {
            let snap = ui_snapshot::build(driver.app());
            let mode = driver.app().input_mode();
            terminal.draw(|f| ui::draw(f, &snap, mode))?;
            last_frame = Instant::now();
        }
    }
    Ok(())
}

fn handle_key(driver: &mut Driver, k: KeyEvent) {
    // Search box typing
    if driver.app().input_mode() == InputMode::Search {
        let app = driver.app_mut();
        match k.code {
            KeyCode::Char(c) => app.push_search_char(c),
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Enter | KeyCode::Esc => app.leave_search(),
            _ => {}
        }
        return;
    }

    // Normal mode keys
    match (k.code, k.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            driver.handle(AppEvent::Quit);
        }
        (KeyCode::Char('r'), _) => driver.act(UiAction::Refresh),
        (KeyCode::Char('n'), _) => {
            let network = driver.app().network().next();
            driver.act(UiAction::SwitchNetwork { network });
        }
        (KeyCode::Char('a'), _) => driver.app_mut().toggle_active_only(),
        (KeyCode::Char('s'), _) => driver.app_mut().cycle_sort(),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => driver.act(UiAction::PrevPage),
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => driver.act(UiAction::NextPage),
        (KeyCode::Home, _) => driver.act(UiAction::GoToPage { page: 1 }),
        (KeyCode::End, _) => driver.act(UiAction::GoToPage { page: usize::MAX }),
        (KeyCode::Char('/'), _) | (KeyCode::Char('f'), _) => driver.app_mut().enter_search(),
        (KeyCode::Esc, _) => {
            if driver.app().notifier().current().is_some() {
                driver.act(UiAction::DismissNotice);
            } else {
                driver.act(UiAction::SetSearch { text: String::new() });
            }
        }
        _ => {}
    }
}
