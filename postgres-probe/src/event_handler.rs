use lambda_runtime::{tracing, Error, LambdaEvent};
use probe_common::demo::{DEMO_USER_EMAIL, DEMO_USER_NAME};
use probe_common::error::classify_postgres;
use probe_common::response::ProbeResponse;
use serde::Deserialize;
use std::sync::Arc;
use tokio_postgres::Client;

const CREATE_USERS_TABLE: &str = "\
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(100) UNIQUE NOT NULL
    )";

/// The event payload is otherwise unused; `name` and `email` may be
/// supplied to override the demo row.
#[derive(Deserialize)]
pub struct Request {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl Request {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEMO_USER_NAME)
    }

    fn email(&self) -> &str {
        self.email.as_deref().unwrap_or(DEMO_USER_EMAIL)
    }
}

/// Proves relational connectivity: ensure the `users` relation exists,
/// insert one row, select everything back. Results are logged, not
/// returned; the caller only ever sees the fixed 200.
pub(crate) async fn function_handler(
    client: Arc<Client>,
    event: LambdaEvent<Request>,
) -> Result<ProbeResponse, Error> {
    // Idempotent against an existing compatible relation; a conflicting
    // one surfaces as a schema fault.
    client
        .execute(CREATE_USERS_TABLE, &[])
        .await
        .map_err(classify_postgres)?;

    let name = event.payload.name();
    let email = event.payload.email();
    let row = client
        .query_one(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id",
            &[&name, &email],
        )
        .await
        .map_err(classify_postgres)?;
    let id: i32 = row.get(0);
    tracing::info!("inserted user id: {id}");

    let rows = client
        .query("SELECT * FROM users", &[])
        .await
        .map_err(classify_postgres)?;
    tracing::info!("selected {} user(s)", rows.len());
    for row in &rows {
        let id: i32 = row.get("id");
        let name: &str = row.get("name");
        let email: &str = row.get("email");
        tracing::info!("user {id}: {name} <{email}>");
    }

    Ok(ProbeResponse::success())
}
