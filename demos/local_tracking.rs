//! Local Tracking Example
//!
//! Records a simulated run into a local TelemetryStore and prints the
//! derived statistics as the population settles.
//!
//! Run with: cargo run --example local_tracking

use evolab::telemetry::{GenerationData, TelemetryStore};
use rand::Rng;
use serde_json::json;

const POPULATION: usize = 12;
const GENERATIONS: u64 = 30;

fn main() {
    println!("=== Evolab Local Tracking ===\n");

    let store = TelemetryStore::new();
    let mut rng = rand::thread_rng();

    // -------------------------------------------------------------------------
    // 1. Simulate a run whose population slowly converges on one genome
    // -------------------------------------------------------------------------
    let target = "ACGTACGTACGTACGT";
    let mut genomes: Vec<String> = (0..POPULATION)
        .map(|_| (0..target.len()).map(|_| random_base(&mut rng)).collect())
        .collect();

    for generation in 0..GENERATIONS {
        for genome in &mut genomes {
            let mutated: String = genome
                .chars()
                .zip(target.chars())
                .map(|(current, wanted)| if rng.gen_bool(0.2) { wanted } else { current })
                .collect();
            *genome = mutated;
        }

        let best = genomes
            .iter()
            .map(|g| similarity(g, target))
            .fold(0.0_f64, f64::max);

        let data = GenerationData::new(generation, best, rng.gen_range(0.6..0.9), 1.0 - best)
            .with_genome(json!(genomes
                .iter()
                .map(|g| json!({ "dna": g }))
                .collect::<Vec<_>>()));
        store.record("demo-run", data);
    }

    // -------------------------------------------------------------------------
    // 2. Report
    // -------------------------------------------------------------------------
    let history = store.history("demo-run");
    println!("Recorded {} generations", history.len());
    for record in history.iter().step_by(5) {
        println!(
            "   gen {:>3}  fitness {:.3}  phi {:.3}  at {}",
            record.generation(),
            record.fitness(),
            record.phi(),
            record.timestamp()
        );
    }

    println!("\nConvergence rate:     {:.4}", store.convergence_rate("demo-run"));
    println!("Population diversity: {:.4}", store.population_diversity("demo-run"));

    store.clear("demo-run");
    println!("\nCleared: {} records left", store.len("demo-run"));
}

fn random_base(rng: &mut impl Rng) -> char {
    ['A', 'C', 'G', 'T'][rng.gen_range(0..4)]
}

fn similarity(genome: &str, target: &str) -> f64 {
    let matching = genome.chars().zip(target.chars()).filter(|(a, b)| a == b).count();
    matching as f64 / target.len() as f64
}
