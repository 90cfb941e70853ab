//! Main entry point for the UI generator terminal client

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, Stdout},
    panic,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use uigen::{
    artifact::{ExportArtifact, ExportKind},
    config::{Config, ConfigFile, Overrides},
    download::save_artifact,
    image_loader::load_image,
    input::handle_event,
    inputs::OutputFormat,
    service::{GenerationService, HttpGenerationService},
    session::Session,
    state::{AppState, PREVIEW_PAGE_NAME},
    terminal_capabilities::detect_capabilities,
    ui,
    worker::{spawn_worker, WorkerHandle},
};

/// Target frame time for 60 FPS
const FRAME_TIME_MS: u64 = 16;

#[derive(Parser)]
#[command(name = "uigen", version)]
#[command(about = "Generate HTML/JSX UI from a prompt, a font and a product image", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generation service endpoint
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Describe the UI to generate
    #[arg(short, long)]
    prompt: Option<String>,

    /// Font name passed to the generator
    #[arg(long)]
    font: Option<String>,

    /// Product image to upload
    #[arg(short, long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Output format (html or jsx)
    #[arg(long, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Directory for downloads
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Generate once without the TUI, write the exports and exit
    #[arg(long)]
    generate_once: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            font: self.font.clone(),
            format: self.format,
            out_dir: self.out_dir.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // TUI apps can't log to stdout, so we write to a file (RUST_LOG controls the level)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("uigen.log")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    // Config file as read; CLI flags only shape this run's copy
    let config_file = match cli.config {
        Some(ref path) => Some(ConfigFile::open(path)?),
        None => match Config::config_path().and_then(ConfigFile::open) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable config, using defaults");
                None
            }
        },
    };
    let config = config_file
        .as_ref()
        .map(|file| file.config().clone())
        .unwrap_or_default()
        .with_overrides(&cli.overrides());

    let service = build_service(&config)?;
    tracing::info!(endpoint = %config.service.endpoint, "starting");

    if cli.generate_once {
        return run_generate_once(&cli, &config, service);
    }

    // Set up panic hook to restore terminal on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
        original_hook(panic_info);
    }));

    let capabilities = detect_capabilities();
    tracing::info!(colors = capabilities.color_support.name(), "terminal detected");
    let worker = spawn_worker(service)?;
    let mut app_state = AppState::new(config, capabilities, worker.request_tx.clone());

    if let Some(ref prompt) = cli.prompt {
        app_state.session.set_prompt(prompt.as_str());
    }
    if let Some(path) = cli.image.clone() {
        if let Err(e) = app_state.load_image(path) {
            app_state.set_status(&format!("Failed to load: {}", e), true);
        }
    }

    // Initialize terminal (only needed for interactive TUI)
    let mut terminal = setup_terminal()?;

    // Run main event loop
    let result = run_event_loop(&mut terminal, &mut app_state, &worker);

    // Cleanup
    cleanup_terminal(terminal)?;

    // Write back the file as loaded, never the overridden copy
    if let Some(ref file) = config_file {
        match file.save() {
            Ok(()) => tracing::debug!(path = ?file.path(), "config saved"),
            Err(e) => tracing::warn!(error = %e, "failed to save config"),
        }
    }

    // Shutdown worker
    worker.shutdown();

    result
}

fn build_service(config: &Config) -> Result<Arc<dyn GenerationService>> {
    let endpoint = config.service.endpoint.clone();
    let service = match config.service.request_timeout() {
        Some(timeout) => HttpGenerationService::with_timeout(endpoint, timeout)
            .context("Failed to build HTTP client")?,
        None => HttpGenerationService::new(endpoint),
    };
    Ok(Arc::new(service))
}

/// Set up the terminal for TUI rendering
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn cleanup_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main event loop - handles input, processes worker messages, renders UI
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app_state: &mut AppState,
    worker: &WorkerHandle,
) -> Result<()> {
    let frame_duration = Duration::from_millis(FRAME_TIME_MS);

    loop {
        let frame_start = Instant::now();

        // Render UI
        terminal.draw(|frame| ui::render(frame, app_state))?;

        // Poll for events with timeout
        let timeout = frame_duration.saturating_sub(frame_start.elapsed());
        if event::poll(timeout)? {
            let event = event::read()?;

            // Handle terminal resize
            if let Event::Resize(width, height) = event {
                app_state.set_terminal_size(width, height);
            }

            // Handle input
            handle_event(event, app_state)?;
        }

        // Process worker responses (non-blocking)
        while let Ok(response) = worker.response_rx.try_recv() {
            app_state.handle_worker_response(response);
        }

        app_state.tick();

        // Check for quit
        if app_state.should_quit {
            break;
        }
    }

    Ok(())
}

/// Submit once, write the primary and platform exports plus the preview page
fn run_generate_once(cli: &Cli, config: &Config, service: Arc<dyn GenerationService>) -> Result<()> {
    let Some(ref image_path) = cli.image else {
        bail!("--generate-once needs --image");
    };

    let mut session = Session::new(config.session_options());
    session.set_prompt(cli.prompt.clone().unwrap_or_default());
    session.set_image(load_image(image_path)?);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build runtime")?;

    let start = Instant::now();
    runtime.block_on(session.submit(service.as_ref()))?;
    let elapsed_ms = start.elapsed().as_millis();

    let dir = &config.export.directory;
    let page = ExportArtifact {
        file_name: PREVIEW_PAGE_NAME.to_string(),
        media_type: "text/html".to_string(),
        bytes: session.preview().document().into_bytes(),
    };
    let artifacts = [
        session.export_primary(),
        session.export(ExportKind::Shopify),
        page,
    ];

    for artifact in &artifacts {
        let path = save_artifact(artifact, dir)?;
        println!("{}", path.display());
    }
    eprintln!(
        "Generated {} in {}ms ({} colors)",
        session.format().name(),
        elapsed_ms,
        session.palette().len()
    );

    Ok(())
}
