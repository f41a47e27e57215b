mod api;
mod config;
mod dashboard;
mod log;
mod model;
mod session;
mod ui;

use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use tracing::{event, info, Level};
use tracing_subscriber::EnvFilter;

use api::HttpApiClient;
use config::Config;
use session::{Credentials, Session};
use ui::app::Exit;

const DEFAULT_CONFIG: &str = "taskboard.yaml";

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var("TASKBOARD_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = Config::from_file_or_default(&config_path)?;

    let env_filter = EnvFilter::try_from_env("TASKBOARD_LOG");
    log::setup(env_filter, &config.log)?;

    event!(Level::INFO, "Starting TaskBoard: {}", env!("FULL_VERSION"));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("taskboard")
        .enable_all()
        .build()?;
    let exit = runtime.block_on(run(config))?;
    if exit == Exit::LoggedOut {
        println!("Logged out.");
    }
    Ok(())
}

async fn run(config: Config) -> anyhow::Result<Exit> {
    let client = HttpApiClient::new(&config.api.base_url, config.api.timeout())?;

    let token = env::var("TASKBOARD_TOKEN").ok().or(config.api.token.clone());
    let credentials = match (env::var("TASKBOARD_EMAIL"), env::var("TASKBOARD_PASSWORD")) {
        (Ok(email), Ok(password)) => Some(Credentials { email, password }),
        _ => None,
    };
    let session = Session::authenticate(&client, token, credentials).await?;
    let client = match session.token() {
        Some(token) => client.with_token(token),
        None => client,
    };
    info!(base_url = config.api.base_url.as_str(), "Backend configured.");

    ui::app::run(Arc::new(client), session, config.dashboard.search_debounce).await
}
