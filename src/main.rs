use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};

use expense_tracker::{App, Config, Expense, HttpApi, Income, RecordApi, ui::render};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

async fn run_app<B, A>(terminal: &mut Terminal<B>, mut app: App<A>) -> Result<()>
where
    B: Backend,
    A: RecordApi<Expense> + RecordApi<Income>,
{
    loop {
        terminal.draw(|f| render::draw(f, &app))?;

        // Draw the loading state first, then fetch.
        if app.has_pending() {
            app.process_pending().await;
            continue;
        }

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key).await;
            }
        }

        app.tick();
        if app.should_quit {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = Config::from_env();
    info!("using API at {}", config.api_url());
    let app = App::new(HttpApi::new(config.api_url()));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}
