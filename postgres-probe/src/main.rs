use lambda_runtime::{run, service_fn, tracing, Error};
use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use postgres_openssl::MakeTlsConnector;
use probe_common::config::{ConnectionConfig, TransportSecurity};
use std::sync::Arc;
use tokio_postgres::Client;

mod event_handler;
use event_handler::function_handler;

/// Opens the one client this process will use. The connection driver runs
/// on its own task for the life of the process; it is never closed
/// explicitly.
async fn connect(config: &ConnectionConfig) -> Result<Client, Error> {
    let mut builder = SslConnector::builder(SslMethod::tls())?;
    if config.transport == TransportSecurity::InsecureTls {
        // Accepts whatever certificate the server presents. Opt-in only,
        // via DB_TLS_MODE=insecure-tls; not for production use.
        builder.set_verify(SslVerifyMode::NONE);
    }
    let connector = MakeTlsConnector::new(builder.build());

    let (client, connection) = tokio_postgres::connect(&config.conninfo(), connector).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("connection error: {e}");
        }
    });

    Ok(client)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = ConnectionConfig::postgres_from_env()?;
    tracing::info!(
        "connecting to {}:{} (transport: {})",
        config.host,
        config.port,
        config.transport
    );
    let client = Arc::new(connect(&config).await?);

    run(service_fn(move |event| {
        let client = Arc::clone(&client);
        async move { function_handler(client, event).await }
    }))
    .await
}
