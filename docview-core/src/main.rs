//! src/main.rs
//! Documentation viewer TUI entry point

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use doctree::{Forest, seed};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use tokio::{
    signal,
    sync::{Mutex, Notify, mpsc},
};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use docview_core::{
    Logger,
    config::Config,
    content::fetcher::fetcher_from_config,
    controller::{
        action_dispatcher::ActionDispatcher,
        actions::Action,
        event_loop::{EventLoop, TaskResult},
    },
    model::app_state::AppState,
    view::{theme::init_theme, ui::UIRenderer},
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    setup_panic_handler();

    let config = Config::load().await.unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        Config::default()
    });
    let _log_guard: WorkerGuard =
        Logger::init_tracing(&config.logging).context("Failed to initialize logging")?;
    info!("Starting documentation viewer");

    let app = App::new(config)
        .await
        .context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    event_loop: EventLoop,
    app_state: Arc<Mutex<AppState>>,
    action_dispatcher: ActionDispatcher,
    ui_renderer: UIRenderer,
    shutdown: Arc<Notify>,
    // keeps the action channel open for the life of the loop
    _action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    async fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let forest = load_forest(&config).await;
        let fetcher =
            fetcher_from_config(&config.documents).context("Failed to create document fetcher")?;

        // Create communication channels
        let (task_tx, task_rx) = mpsc::unbounded_channel::<TaskResult>();
        let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();

        let mut state = AppState::new(Arc::clone(&config), forest, fetcher, task_tx);
        state.start();
        let app_state = Arc::new(Mutex::new(state));

        let action_dispatcher = ActionDispatcher::new(Arc::clone(&app_state));
        let event_loop = EventLoop::new(
            Arc::clone(&app_state),
            task_rx,
            action_rx,
            config.ui.tick_rate,
        );
        let ui_renderer = UIRenderer::new(init_theme(config.ui.theme));

        let terminal = setup_terminal().context("Failed to initialize terminal")?;

        info!("Application initialized successfully");
        Ok(Self {
            terminal,
            event_loop,
            app_state,
            action_dispatcher,
            ui_renderer,
            shutdown: Arc::new(Notify::new()),
            _action_tx: action_tx,
        })
    }

    async fn run(mut self) -> Result<()> {
        self.setup_shutdown_handler();
        info!("Starting event loop");

        loop {
            self.render().await?;

            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("Shutdown signal received");
                    break;
                }

                action = self.event_loop.next_action() => {
                    let Some(action) = action else {
                        info!("Event sources closed");
                        break;
                    };
                    if !matches!(action, Action::Tick) {
                        debug!("Dispatching action: {:?}", action);
                    }
                    if !self.action_dispatcher.handle(action).await {
                        info!("Termination requested");
                        break;
                    }
                }
            }
        }

        let stats = self.ui_renderer.stats();
        info!(frames = stats.frames, slow = stats.slow, "Event loop terminated cleanly");
        Ok(())
    }

    async fn render(&mut self) -> Result<()> {
        let mut app = self.app_state.lock().await;
        if !app.ui.needs_redraw() {
            return Ok(());
        }

        let start = Instant::now();
        let renderer = &mut self.ui_renderer;
        self.terminal
            .draw(|frame: &mut Frame<'_>| renderer.render(frame, &mut app))
            .context("Failed to draw terminal")?;
        app.ui.clear_redraw();

        let duration = start.elapsed();
        if duration > Duration::from_millis(16) {
            warn!("Slow render: {}ms (target: <16ms)", duration.as_millis());
        }
        Ok(())
    }

    fn setup_shutdown_handler(&self) {
        let shutdown = Arc::clone(&self.shutdown);

        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{SignalKind, signal as unix_signal};

                match unix_signal(SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        tokio::select! {
                            _ = sigterm.recv() => info!("Received SIGTERM"),
                            _ = signal::ctrl_c() => info!("Received Ctrl+C"),
                        }
                    }
                    Err(e) => {
                        warn!("Failed to create SIGTERM handler: {}", e);
                        if let Err(e) = signal::ctrl_c().await {
                            warn!("Failed to listen for Ctrl+C: {}", e);
                            return;
                        }
                    }
                }
            }

            #[cfg(not(unix))]
            {
                if let Err(e) = signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
                info!("Received Ctrl+C");
            }

            shutdown.notify_one();
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal) {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

/// Seed file from the config, else the built-in dataset.
async fn load_forest(config: &Config) -> Forest {
    let Some(path) = config.documents.seed_file.clone() else {
        return seed::builtin_forest();
    };

    match tokio::task::spawn_blocking(move || seed::load_seed_file(&path)).await {
        Ok(Ok(forest)) => forest,
        Ok(Err(e)) => {
            error!("Failed to load seed file, using built-in tree: {}", e);
            seed::builtin_forest()
        }
        Err(e) => {
            error!("Seed loading task failed: {}", e);
            seed::builtin_forest()
        }
    }
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.clear().context("Failed to clear terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
