use dotenv::dotenv;
use log::debug;
use tokio::sync::mpsc;

use trivia_quiz::config::Config;
use trivia_quiz::quiz::{controller::Controller, source::OpenTdbSource};
use trivia_quiz::terminal::{self, Terminal};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> HandlerResult {
    // A missing .env is fine, everything has a default
    dotenv().ok();

    pretty_env_logger::init();
    log::info!("Starting trivia quiz...");

    let config = Config::from_env();
    debug!("Using {:?}", config);

    let source = OpenTdbSource::new(config.api_url, config.request_timeout)?;

    let (events, inbox) = mpsc::unbounded_channel();
    let controller = Controller::new(source, Terminal::stdout(), events.clone());

    tokio::spawn(terminal::read_input(events));
    controller.run(inbox).await;

    Ok(())
}
