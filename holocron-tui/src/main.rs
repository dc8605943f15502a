//! Holocron TUI entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use holocron_cache::{CacheConfig, CacheStore, CatalogClient, Transport};
use holocron_tui::api_client::ApiClient;
use holocron_tui::config::TuiConfig;
use holocron_tui::debounce::Debouncer;
use holocron_tui::error::TuiResult;
use holocron_tui::events::{commit_trigger, TuiEvent};
use holocron_tui::keys::{map_key, Action};
use holocron_tui::logging::init_logging;
use holocron_tui::session::{spawn_toggle_favorite, SearchSession};
use holocron_tui::state::App;
use holocron_tui::views::{list_viewport_height, render_view};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Everything the event handlers act on besides the app state.
struct Services {
    client: CatalogClient,
    debouncer: Debouncer,
    session: SearchSession,
    events: mpsc::Sender<TuiEvent>,
}

#[tokio::main]
async fn main() -> TuiResult<()> {
    let config = TuiConfig::load()?;
    init_logging(&config)?;
    info!(api_base_url = %config.api_base_url, "Starting Holocron TUI");

    let transport: Arc<dyn Transport> = Arc::new(ApiClient::new(&config)?);
    let store = Arc::new(CacheStore::new(
        CacheConfig::new().with_keep_unused_for(config.keep_unused_for()),
    ));
    let client = CatalogClient::new(transport, Arc::clone(&store));
    let mut app = App::new(config);

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;
    app.set_viewport_height(list_viewport_height(terminal.size()?));

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    spawn_input_reader(event_tx.clone());

    // Commits get their own channel so a burst of other events cannot drop one.
    let (commit_tx, mut commit_rx) = mpsc::channel::<()>(1);
    let debouncer = Debouncer::new(app.config.debounce_delay(), commit_trigger(commit_tx));
    let session = SearchSession::start(&client, &app.search, event_tx.clone());
    let mut services = Services {
        client,
        debouncer,
        session,
        events: event_tx,
    };

    let mut ticker = tokio::time::interval(app.config.tick_rate());

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                store.evict_unused();
                app.stats = store.stats();
            }
            Some(()) = commit_rx.recv() => {
                handle_event(&mut app, &mut services, TuiEvent::CommitSearch);
            }
            Some(event) = event_rx.recv() => {
                if handle_event(&mut app, &mut services, event) {
                    break;
                }
            }
        }
    }

    drop(services);
    store.dispose();
    info!("Holocron TUI stopped");
    Ok(())
}

fn setup_terminal() -> TuiResult<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let sent = match evt {
                    CrosstermEvent::Key(key) => sender.blocking_send(TuiEvent::Input(key)),
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            }
        }
    });
}

/// Returns `true` when the app should quit.
fn handle_event(app: &mut App, services: &mut Services, event: TuiEvent) -> bool {
    match event {
        TuiEvent::Input(key) => {
            if let Some(action) = map_key(key) {
                return handle_action(app, services, action);
            }
        }
        TuiEvent::Resize { width, height } => {
            app.set_viewport_height(list_viewport_height(Rect::new(0, 0, width, height)));
        }
        TuiEvent::CommitSearch => {
            if app.commit_search() {
                info!(search = %app.search, "Search committed");
                services.session =
                    SearchSession::start(&services.client, &app.search, services.events.clone());
            }
        }
        TuiEvent::QueryUpdated { search, view } => {
            app.apply_query(&search, view);
        }
        TuiEvent::FavoriteRolledBack { name } => {
            app.toggle_favorite_name(&name);
        }
    }
    false
}

fn handle_action(app: &mut App, services: &mut Services, action: Action) -> bool {
    match action {
        Action::Quit => return true,
        Action::InsertChar(c) => {
            app.insert_char(c);
            services.debouncer.schedule();
        }
        Action::DeleteChar => {
            app.delete_char();
            services.debouncer.schedule();
        }
        Action::ClearInput => {
            app.clear_input();
            services.debouncer.schedule();
        }
        Action::MoveUp => app.select_previous(),
        Action::MoveDown => app.select_next(),
        Action::PageUp => app.page_up(),
        Action::PageDown => app.page_down(),
        Action::Home => app.select_first(),
        Action::End => app.select_last(),
        Action::ToggleFavorite => {
            if let Some(name) = app.selected_person().map(|p| p.name.clone()) {
                app.toggle_favorite_name(&name);
                spawn_toggle_favorite(&services.client, &app.search, &name, services.events.clone());
            }
        }
        Action::Refresh => services.session.refetch(&services.client),
    }
    false
}
