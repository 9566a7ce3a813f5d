//! Catalog TUI - Item Browser
//!
//! Terminal front end for the catalog API: type to search, arrows to move,
//! left/right to page.

mod app;

use std::io;
use std::sync::Mutex;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use catalog_client::{CatalogClient, FetchRequest, DEFAULT_BASE_URL};

use app::{Action, App, Message};

const API_URL_VAR: &str = "CATALOG_API_URL";
const LOG_FILE_VAR: &str = "CATALOG_TUI_LOG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let base_url = std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let client = CatalogClient::new(base_url);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Log to the file named by `CATALOG_TUI_LOG`; the terminal itself is busy.
fn init_logging() -> io::Result<()> {
    if let Ok(path) = std::env::var(LOG_FILE_VAR) {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    client: CatalogClient,
) -> io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new();

    spawn_fetch(&client, &tx, app.start());

    loop {
        terminal.draw(|f| app.render(f))?;

        while let Ok(message) = rx.try_recv() {
            app.receive(message);
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.handle_key(key.code, key.modifiers) {
                Action::None => {}
                Action::Quit => return Ok(()),
                Action::Fetch(request) => spawn_fetch(&client, &tx, request),
                Action::Open(id) => spawn_open(&client, &tx, id),
            }
        }
    }
}

fn spawn_fetch(client: &CatalogClient, tx: &mpsc::UnboundedSender<Message>, request: FetchRequest) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = request.execute(&client).await;
        // The receiver only goes away when the app is exiting.
        let _ = tx.send(Message::Listing(outcome));
    });
}

fn spawn_open(client: &CatalogClient, tx: &mpsc::UnboundedSender<Message>, id: i64) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.get_item(id).await;
        let _ = tx.send(Message::Detail(id, result));
    });
}
