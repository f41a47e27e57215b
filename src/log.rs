use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot open log file '{0}': {1}")]
    OpeningError(PathBuf, std::io::Error),
    #[error("invalid log level '{0}': {1}")]
    Level(String, tracing_subscriber::filter::ParseError),
    #[error("setting tracing default subscriber failed: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Where log lines go. The terminal belongs to the UI, so stdout is not an
/// option.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum LogType {
    File { path: PathBuf },
    Stderr,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Log {
    pub level: String,
    #[serde(default)]
    pub structured: bool,
    pub backend: LogType,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            structured: false,
            backend: LogType::File {
                path: PathBuf::from("taskboard.log"),
            },
        }
    }
}

/// setup log from an optional environment filter and the config file
///
/// if the environment filter is present, the configured level is not used
pub fn setup(
    env_filter: Result<EnvFilter, tracing_subscriber::filter::FromEnvError>,
    config: &Option<Log>,
) -> Result<(), LogError> {
    let log = config.clone().unwrap_or_default();
    let env_filter = match env_filter {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::try_new(&log.level).map_err(|e| LogError::Level(log.level.clone(), e))?,
    };
    let sbuilder = Subscriber::builder()
        .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(env_filter);

    match log.backend {
        LogType::File { path } => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| LogError::OpeningError(path.clone(), e))?;
            let sbuilder = sbuilder.with_writer(Mutex::new(file));
            if log.structured {
                install(sbuilder.json().finish())
            } else {
                install(sbuilder.finish())
            }
        }
        LogType::Stderr => {
            let sbuilder = sbuilder.with_writer(std::io::stderr);
            if log.structured {
                install(sbuilder.json().finish())
            } else {
                install(sbuilder.finish())
            }
        }
    }
}

fn install<S>(subscriber: S) -> Result<(), LogError>
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
