use lambda_runtime::{tracing, Error, LambdaEvent};
use probe_common::demo::{DEMO_KEY, DEMO_VALUE, MISSING_KEY};
use probe_common::error::classify_redis;
use probe_common::response::ProbeResponse;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde_json::Value;

/// Proves key-value connectivity: one SET, a read-back GET, and a GET of a
/// key that was never written to confirm miss semantics. The event payload
/// and context are unused.
pub(crate) async fn function_handler(
    mut connection: MultiplexedConnection,
    _event: LambdaEvent<Value>,
) -> Result<ProbeResponse, Error> {
    let reply: String = connection
        .set(DEMO_KEY, DEMO_VALUE)
        .await
        .map_err(classify_redis)?;
    tracing::info!("SET {DEMO_KEY} => {reply}");

    let value: Option<String> = connection.get(DEMO_KEY).await.map_err(classify_redis)?;
    tracing::info!("GET {DEMO_KEY} => {value:?}");

    // A key that was never written must come back as a miss, not an error.
    let missing: Option<String> = connection.get(MISSING_KEY).await.map_err(classify_redis)?;
    tracing::info!("GET {MISSING_KEY} => {missing:?}");

    Ok(ProbeResponse::success())
}
