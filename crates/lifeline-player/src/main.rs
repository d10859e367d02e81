//! Lifeline terminal player entry point.

use std::sync::Arc;

use lifeline_core::clock::SystemClock;
use lifeline_core::rng::SystemRng;
use lifeline_player::config::PlayerConfig;
use lifeline_player::controller::Controller;
use lifeline_player::error::AppError;
use lifeline_player::terminal;
use lifeline_session::application::session::Session;
use lifeline_story::application::loader::{FileStorySource, load_story};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Logs go to stderr so they never mix with the story on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let config = PlayerConfig::from_env()?;
    tracing::info!(story = %config.story_path.display(), "starting Lifeline player");

    let source = FileStorySource::new(&config.story_path);
    let graph = load_story(&source).await?;

    let session = Session::new(
        Arc::new(graph),
        config.session.clone(),
        Box::new(SystemRng::from_entropy()),
        Arc::new(SystemClock),
    )?;
    let controller = Controller::new(session, config.typing_delay);

    let (line_tx, line_rx) = mpsc::channel(8);
    let _reader = terminal::spawn_line_reader(std::io::BufReader::new(std::io::stdin()), line_tx);

    let mut stdout = tokio::io::stdout();
    terminal::run(controller, line_rx, &mut stdout).await
}
