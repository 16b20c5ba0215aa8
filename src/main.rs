use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;

use gold_ledger_server::api::{self, AppState};
use gold_ledger_server::sync::{RedisTransport, SyncCoordinator, TransportError};
use gold_ledger_server::util::{self, Env, EnvError};

#[derive(Debug, Error)]
enum RunnerErr {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

type Result<T> = core::result::Result<T, RunnerErr>;

#[tokio::main]
async fn main() -> Result<()> {
    _ = dotenvy::dotenv();
    util::trace::init();

    tracing::info!("starting gold ledger service");

    let env = Env::load()?;
    let transport = Arc::new(RedisTransport::connect(&env.redis_url).await?);
    let (sync, sync_tasks) = SyncCoordinator::spawn(transport);

    let state = Arc::new(AppState::new(sync));
    let (_addr, server_task) = api::start_server(state, env.api_port).await?;

    let mut handles = sync_tasks;
    handles.push(server_task);
    _ = join_all(handles).await;

    Ok(())
}
