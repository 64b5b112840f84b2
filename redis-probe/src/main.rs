use lambda_runtime::{run, service_fn, tracing, Error};
use probe_common::config::ConnectionConfig;

mod event_handler;
use event_handler::function_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = ConnectionConfig::redis_from_env()?;
    tracing::info!("connecting to {}", config.redis_url());

    // One multiplexed connection for the life of the process; clones share
    // the underlying pipe and queue their commands on it.
    let client = redis::Client::open(config.redis_url())?;
    let connection = client.get_multiplexed_tokio_connection().await?;

    run(service_fn(move |event| {
        let connection = connection.clone();
        async move { function_handler(connection, event).await }
    }))
    .await
}
