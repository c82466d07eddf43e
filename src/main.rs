use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use promptly::caret::mapper::CoordinateMapper;
use promptly::caret::source::TrackerProcess;
use promptly::config::AppConfig;
use promptly::console::{parse_command, Command, HELP};
use promptly::display::DisplayLayout;
use promptly::kernel::event::UserAction;
use promptly::presentation::OverlayView;
use promptly::services::insert::Inserter;
use promptly::services::llm::GeminiClient;
use promptly::Session;

/// Prompt-quality overlay: watches the caret, scores prompts, offers rewrites.
#[derive(Debug, Parser)]
#[command(name = "promptly", version)]
struct Cli {
    /// Configuration file (default: <config dir>/promptly/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `promptly=trace`. RUST_LOG wins when set.
    #[arg(long, default_value = "promptly=info")]
    log_level: String,

    /// Do not start the caret watcher
    #[arg(long)]
    no_tracker: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Setup Logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    // 2. Configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    tracing::info!("Config loaded from {}", config.config_path.display());

    // 3. Collaborators
    let analyzer = GeminiClient::new(&config.llm);
    if !analyzer.has_api_key() {
        tracing::warn!("Missing API key; analysis requests will fail until GEMINI_API_KEY is set");
    }
    tracing::info!("Using model {}", analyzer.model());

    let mut session = Session::new(
        CoordinateMapper::new(config.overlay.edge_clearance),
        DisplayLayout::from_config(&config.displays),
        analyzer,
        Inserter::new(&config.inserter),
    );
    let handle = session.handle();

    if !cli.no_tracker {
        match TrackerProcess::spawn(&config.tracker) {
            Ok((tracker, observations)) => session.attach_tracker(tracker, observations),
            // The overlay still works with manual entry
            Err(e) => tracing::error!("Tracker unavailable: {:#}", e),
        }
    }

    // 4. Render Loop (console presentation)
    let widget_offset_x = config.overlay.widget_offset_x;
    let mut state_rx = handle.state();
    tokio::spawn(async move {
        let mut last = None;
        while state_rx.changed().await.is_ok() {
            let view = OverlayView::project(&state_rx.borrow_and_update(), widget_offset_x);
            if last.as_ref() != Some(&view) {
                println!("{}", view.render_text());
                last = Some(view);
            }
        }
    });

    // 5. Input Reader (Stdin). A plain thread, so a pending read never
    // holds the runtime open after the session ends.
    let input = handle.clone();
    std::thread::spawn(move || {
        println!("{}", HELP);

        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }

            let action = match parse_command(&line) {
                Ok(Command::Action(action)) => action,
                Ok(Command::Help) => {
                    println!("{}", HELP);
                    continue;
                }
                Ok(command @ (Command::CopyShown | Command::InsertShown)) => {
                    let view = OverlayView::project(&input.state().borrow(), widget_offset_x);
                    let Some(text) = view.copy_target().map(str::to_string) else {
                        println!("No rewrite to use yet");
                        continue;
                    };
                    if command == Command::CopyShown {
                        UserAction::ApplyFix(text)
                    } else {
                        UserAction::Insert(text)
                    }
                }
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };

            if let Err(e) = input.blocking_send(action) {
                tracing::error!("Failed to send input: {}", e);
                return;
            }
        }

        // Stdin closed: leave like the window closing
        let _ = input.blocking_send(UserAction::Quit);
    });

    // 6. Run Session
    tracing::info!("Overlay session active. Type `quit` to stop.");
    session.run().await
}
