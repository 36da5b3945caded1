//! Live Stream Example
//!
//! Connects to the service configured through `EVOLAB_BASE_URL` /
//! `EVOLAB_API_KEY`, prints an experiment's summary and follows its live
//! record stream, mirroring each record into the local store.
//!
//! Run with: cargo run --example live_stream -- <experiment-id>

use anyhow::Context;
use evolab::telemetry::GenerationData;
use evolab::{logging, ErrorKind, EvolabClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing("evolab=info");

    let experiment_id = std::env::args()
        .nth(1)
        .context("usage: live_stream <experiment-id>")?;
    let client = EvolabClient::from_env()?;

    match client.experiments().get(&experiment_id).await {
        Ok(experiment) => println!(
            "{} ({}): {:?} at generation {}, population {}",
            experiment.name(),
            experiment.id(),
            experiment.status(),
            experiment.generation(),
            experiment.population_size()
        ),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            anyhow::bail!("experiment {experiment_id} does not exist")
        }
        Err(e) => return Err(e.into()),
    }

    let mut stream = client.telemetry().stream(&experiment_id).await?;
    while let Some(record) = stream.next_record().await {
        let record = record?;
        match serde_json::from_value::<GenerationData>(record.into()) {
            Ok(data) => {
                client.local().record(&experiment_id, data);
                println!(
                    "generation {:>5}  convergence {:.4}  diversity {:.4}",
                    client.local().latest(&experiment_id).map_or(0, |r| r.generation()),
                    client.local().convergence_rate(&experiment_id),
                    client.local().population_diversity(&experiment_id),
                );
            }
            Err(e) => tracing::warn!(error = %e, "skipping record without generation fields"),
        }
    }

    println!("stream ended");
    Ok(())
}
