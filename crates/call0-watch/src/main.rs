//! Call0 call access watcher.
//!
//! Mounts a call against the REST backend and follows its access state the
//! way the call UI does: fetches the creator, polls access until joined, and
//! requests access on demand. Session changes and notifications are logged.
//!
//! # Usage
//!
//! ```bash
//! # Watch a call as a signed-in user
//! CALL0_API_URL=https://api.call0.app CALL0_SESSION_COOKIE='session=...' \
//!     call0-watch --call-id abc123 --user-id u2
//!
//! # Ask the host for access right away
//! call0-watch --api-url http://localhost:8787 --call-id abc123 --user-id u2 --request-access
//! ```
//!
//! Type `call <id>`, `leave`, `join`, `unjoin`, `request`, `user <id>`,
//! `status`, or `quit` on stdin to drive the session.

mod input;

use std::time::Duration;

use call0_access::{
    AccessConfig, CallId, DEFAULT_POLL_INTERVAL, Runtime, RuntimeClosed, UserIdentity,
};
use call0_http::{ApiClient, ApiConfig, ApiError, DEFAULT_TIMEOUT, HttpDriver};
use clap::Parser;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::input::{Input, parse_line};

/// Call0 call access watcher
#[derive(Parser, Debug)]
#[command(name = "call0-watch")]
#[command(about = "Follow access to a Call0 call from the command line")]
#[command(version)]
struct Args {
    /// API base URL
    #[arg(long, env = "CALL0_API_URL")]
    api_url: String,

    /// Session cookie (`name=value`) sent with every request
    #[arg(long, env = "CALL0_SESSION_COOKIE", hide_env_values = true)]
    session_cookie: Option<String>,

    /// Call to mount on startup
    #[arg(short, long)]
    call_id: Option<String>,

    /// Signed-in user id; omit or pass `guest` for a guest
    #[arg(short, long, env = "CALL0_USER_ID")]
    user_id: Option<String>,

    /// Delay between access checks in milliseconds
    #[arg(long, default_value_t = default_poll_interval_ms())]
    poll_interval_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Ask the host for access after mounting the call
    #[arg(long)]
    request_access: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn default_poll_interval_ms() -> u64 {
    u64::try_from(DEFAULT_POLL_INTERVAL.as_millis()).unwrap_or(u64::MAX)
}

impl Args {
    fn api_config(&self) -> Result<ApiConfig, ApiError> {
        let mut config =
            ApiConfig::new(&self.api_url)?.with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(cookie) = &self.session_cookie {
            config = config.with_session_cookie(cookie.clone());
        }
        Ok(config)
    }

    fn access_config(&self) -> AccessConfig {
        AccessConfig { poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)) }
    }
}

/// Watcher errors.
#[derive(Debug, Error)]
enum WatchError {
    /// Invalid API configuration.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The access runtime stopped unexpectedly.
    #[error(transparent)]
    Runtime(#[from] RuntimeClosed),

    /// Reading stdin failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The runtime task panicked.
    #[error("runtime task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    run(args).await?;
    Ok(())
}

async fn run(args: Args) -> Result<(), WatchError> {
    let api = ApiClient::new(&args.api_config()?)?;
    let user = UserIdentity::from_raw(args.user_id.as_deref());

    tracing::info!(api = %api.base_url(), ?user, "call0-watch starting");

    let (runtime, handle) = Runtime::new(HttpDriver::new(api), user, args.access_config());
    let runtime_task = tokio::spawn(runtime.run());

    match args.call_id.as_deref().map(CallId::parse) {
        Some(Some(call_id)) => handle.set_call(Some(call_id)).await?,
        Some(None) => tracing::warn!("ignoring empty --call-id"),
        None => {},
    }
    if args.request_access {
        handle.request_access().await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line? {
                None => {
                    tracing::debug!("stdin closed; watching until interrupted");
                    stdin_open = false;
                },
                Some(line) => match parse_line(&line) {
                    Ok(Some(Input::Quit)) => break,
                    Ok(Some(Input::Status)) => {
                        let session = handle.session();
                        tracing::info!(status = ?session.status(), ?session, "current session");
                    },
                    Ok(Some(Input::Command(command))) => handle.send(command).await?,
                    Ok(None) => {},
                    Err(err) => tracing::warn!("{err}"),
                },
            },

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            },
        }
    }

    handle.shutdown().await?;
    runtime_task.await?;
    tracing::info!("call0-watch stopped");
    Ok(())
}
