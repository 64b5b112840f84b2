use anyhow::Result;
use aws_config::BehaviorVersion;
use aws_sdk_lambda::Client;
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

#[derive(Default)]
struct Stats {
    success_count: usize,
    error_count: usize,
    total_latency_ms: f64,
}

/// The shape every probe returns on success.
#[derive(Deserialize)]
struct ProbeResponse {
    #[serde(rename = "statusCode")]
    status_code: String,
}

#[derive(Parser, Debug)]
#[command(name = "invoke-probe")]
#[command(about = "Invoke a deployed connectivity probe and summarize the results")]
struct Args {
    /// Lambda function name of the probe
    function: String,

    /// Number of invocations to run
    #[arg(long, default_value = "10")]
    iters: usize,

    /// Number of parallel workers
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Send a randomized email with each invocation so the relational
    /// probe's insert does not terminate on the unique constraint
    #[arg(long)]
    unique_email: bool,
}

/// Treats `--threads 0` as one worker instead of dividing by zero.
fn worker_count(requested: usize) -> usize {
    requested.max(1)
}

fn build_payload(unique_email: bool, rng: &mut StdRng) -> serde_json::Value {
    if unique_email {
        let suffix: u32 = rng.gen_range(0..=u32::MAX);
        serde_json::json!({ "email": format!("probe+{suffix:08x}@example.com") })
    } else {
        serde_json::json!({})
    }
}

async fn run_invocations(
    client: Arc<Client>,
    function_name: String,
    worker_id: usize,
    start: usize,
    end: usize,
    total: usize,
    unique_email: bool,
    stats: Arc<Mutex<Stats>>,
) {
    let mut rng = StdRng::from_entropy();

    for i in start..=end {
        let payload = build_payload(unique_email, &mut rng);
        let started = Instant::now();

        let result = client
            .invoke()
            .function_name(&function_name)
            .payload(aws_sdk_lambda::primitives::Blob::new(payload.to_string()))
            .send()
            .await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(response) => {
                let response_payload = response
                    .payload()
                    .map(|b| String::from_utf8_lossy(b.as_ref()).to_string())
                    .unwrap_or_else(|| "No response".to_string());

                // A probe success is the fixed 200 response; anything else
                // (runtime fault payloads included) counts as an error.
                let is_success = serde_json::from_str::<ProbeResponse>(&response_payload)
                    .map(|r| r.status_code == "200")
                    .unwrap_or(false);

                {
                    let mut stats = stats.lock().await;
                    if is_success {
                        stats.success_count += 1;
                        stats.total_latency_ms += latency_ms;
                    } else {
                        stats.error_count += 1;
                    }
                }

                println!(
                    "[Worker {}: {}/{}] {} => {}",
                    worker_id, i, total, function_name, response_payload
                );
            }
            Err(e) => {
                {
                    let mut stats = stats.lock().await;
                    stats.error_count += 1;
                }

                eprintln!(
                    "[Worker {}: {}/{}] Error invoking {}: {}",
                    worker_id, i, total, function_name, e
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let threads = worker_count(args.threads);

    println!(
        "Running {} invocations across {} worker(s)",
        args.iters, threads
    );

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = Arc::new(Client::new(&config));

    let stats = Arc::new(Mutex::new(Stats::default()));

    let iters_per_worker = args.iters / threads;
    let remainder = args.iters % threads;

    let mut tasks = JoinSet::new();

    let total_iters = args.iters;
    let unique_email = args.unique_email;

    let mut start = 1;
    for t in 1..=threads {
        let end = if t == threads {
            start + iters_per_worker - 1 + remainder
        } else {
            start + iters_per_worker - 1
        };

        let client = Arc::clone(&client);
        let function_name = args.function.clone();
        let stats = Arc::clone(&stats);

        tasks.spawn(async move {
            run_invocations(
                client,
                function_name,
                t,
                start,
                end,
                total_iters,
                unique_email,
                stats,
            )
            .await;
        });

        start = end + 1;
    }

    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            eprintln!("Worker failed: {}", e);
        }
    }

    let stats = stats.lock().await;
    println!("Completed {} invocations", args.iters);
    println!();
    println!("Results:");
    println!("  Success: {}", stats.success_count);
    println!("  Errors:  {}", stats.error_count);
    if stats.success_count > 0 {
        let avg_latency = stats.total_latency_ms / stats.success_count as f64;
        println!("  Avg round trip: {:.3}ms", avg_latency);
    }

    Ok(())
}
