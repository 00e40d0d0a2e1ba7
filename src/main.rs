mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

/// ~10 FPS: spinners and synchronizer updates are picked up on this beat.
const RENDER_TICK: Duration = Duration::from_millis(100);

enum CliCommand {
    Run { match_id: Option<String> },
    Exit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let initial_match = match handle_cli_args() {
        CliCommand::Exit => return Ok(()),
        CliCommand::Run { match_id } => match_id,
    };

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    let settings = AppSettings::load();
    tui_logger::init_logger(settings.effective_log_level())?;
    tui_logger::set_default_level(settings.effective_log_level());

    let app = App::new(settings);
    let network_worker_api = app.api().clone();
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread, for one-shot loads
    let network_worker = NetworkWorker::new(network_worker_api, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Render tick thread
    let tick_tx = ui_event_tx.clone();
    let render_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(RENDER_TICK);
        loop {
            interval.tick().await;
            if tick_tx.send(UiEvent::RenderTick).await.is_err() {
                break;
            }
        }
    });

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(
        terminal,
        app.clone(),
        initial_match,
        ui_event_rx,
        network_req_tx,
        network_resp_rx,
    )
    .await;

    app.lock().await.shutdown();
    input_handler.abort();
    network_task.abort();
    render_task.abort();

    Ok(())
}

fn handle_cli_args() -> CliCommand {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return CliCommand::Run { match_id: None };
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            CliCommand::Exit
        }
        "-V" | "--version" => {
            println!("hitlive {}", env!("CARGO_PKG_VERSION"));
            CliCommand::Exit
        }
        flag if flag.starts_with('-') => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
        _ => CliCommand::Run { match_id: Some(arg) },
    }
}

fn usage_text() -> &'static str {
    "hitlive - live campus match scores in the terminal

Usage:
  hitlive              open the home screen
  hitlive <MATCH_ID>   follow one match directly
  hitlive --help
  hitlive --version

Environment:
  HITLIVE_API_BASE          API origin (default http://127.0.0.1:3000)
  HITLIVE_DETAIL_POLL_SECS  match poll interval in seconds (default 20)
  HITLIVE_LIST_POLL_SECS    match list poll interval in seconds (default 30)
  HITLIVE_LIST_LIMIT        matches requested for the list (default 200)
  HITLIVE_LOG               log level: error, warn, info, debug, trace"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    initial_match: Option<String>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();
    let mut initial_match = initial_match;

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw =
                    handle_ui_event(ui_event, &app, &network_requests, &mut initial_match).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    initial_match: &mut Option<String>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            if let Some(match_id) = initial_match.take() {
                app.lock().await.open_match(match_id);
            } else {
                let _ = network_requests.send(NetworkRequest::LoadHome).await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::RenderTick => {
            app.lock().await.on_render_tick();
            true
        }
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::HomeLoaded { feed } => {
            let mut guard = app.lock().await;
            guard.on_home_loaded(feed);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        let event = match tokio::task::spawn_blocking(crossterm_event::read).await {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                log::error!("terminal input failed: {e}");
                continue;
            }
            Err(_) => break,
        };
        let ui_event = match event {
            Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
            Event::Resize(_, _) => Some(UiEvent::Resize),
            _ => None,
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).await.is_err()
        {
            break;
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: runs on quit and from the panic hook, where there is nobody
/// left to report a failure to.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
