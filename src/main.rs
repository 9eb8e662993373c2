mod app;
mod backend;
mod cli;
mod config;
mod event;
mod kanban;
mod logging;
mod model;
mod mutation;
mod notify;
mod sort;
mod table;
mod ui;

use std::io;
use std::panic;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::info;

use app::{Action, App};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("list") => return cli::handle_list(&args[1..]).await,
        Some("set") => return cli::handle_set(&args[1..]).await,
        Some("help" | "-h" | "--help") => {
            cli::print_help();
            return Ok(());
        }
        Some(other) => {
            cli::print_help();
            anyhow::bail!("Unknown command '{other}'");
        }
        None => {}
    }

    logging::init_tracing()?;
    let config = config::load_config()?;
    let backend = backend::create_backend(&config);
    info!(
        backend = backend.as_ref().map(|b| b.name()).unwrap_or("none"),
        "starting taskboard"
    );

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut app = App::new(&config, backend, action_tx.clone())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    // Restore the terminal before the default hook prints
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let size = terminal.size()?;
    app.update(Action::Resize(size.width, size.height));

    let event_tx = action_tx.clone();
    tokio::spawn(async move {
        event::run_event_loop(event_tx).await;
    });

    app.refresh_items();

    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        match action_rx.recv().await {
            Some(action) => {
                app.update(action);
                if app.should_quit {
                    break;
                }
            }
            None => break,
        }
    }

    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    info!("taskboard exited");

    Ok(())
}
