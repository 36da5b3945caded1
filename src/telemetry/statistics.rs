//! Derived statistics over a recorded history
//!
//! Both scores are heuristics whose exact arithmetic is part of the
//! public contract: remote dashboards and local figures are compared by
//! eye, so the window size and distance definition must not drift.

use serde::Serialize;
use serde_json::Value;

/// Number of most recent records considered by [`convergence_rate`].
pub const CONVERGENCE_WINDOW: usize = 10;

/// Stability of recent fitness values, in `(0, 1]`.
///
/// Takes the last [`CONVERGENCE_WINDOW`] values of `fitness_history`
/// (oldest first), computes their population variance (divisor = window
/// size) and returns `1 / (1 + variance)`.
///
/// Returns exactly `0.0` when the whole history holds fewer than two values.
/// Non-finite fitness values (NaN, infinities) count as `0.0`.
///
/// ## Example
///
/// ```rust
/// use evolab::telemetry::convergence_rate;
///
/// assert_eq!(convergence_rate(&[0.5, 0.5, 0.5, 0.5]), 1.0);
/// assert!((convergence_rate(&[0.2, 0.4, 0.6, 0.8]) - 1.0 / 1.05).abs() < 1e-12);
/// assert_eq!(convergence_rate(&[0.9]), 0.0);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn convergence_rate(fitness_history: &[f64]) -> f64 {
    if fitness_history.len() < 2 {
        return 0.0;
    }

    let start = fitness_history.len().saturating_sub(CONVERGENCE_WINDOW);
    let window = &fitness_history[start..];
    let n = window.len() as f64;
    let fitness = || window.iter().map(|&f| if f.is_finite() { f } else { 0.0 });

    let mean = fitness().sum::<f64>() / n;
    let variance = fitness().map(|f| (f - mean).powi(2)).sum::<f64>() / n;

    1.0 / (1.0 + variance)
}

/// Genetic spread of a genome collection, in `[0, 1]`.
///
/// `genomes` must be an array of at least two genome values; anything else
/// (absent, a single genome object, an array of fewer than two) scores
/// exactly `0.0`. The score is the mean [`pairwise_distance`] over all
/// unordered pairs.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn population_diversity(genomes: Option<&Value>) -> f64 {
    let Some(Value::Array(genomes)) = genomes else {
        return 0.0;
    };
    if genomes.len() < 2 {
        return 0.0;
    }

    let forms: Vec<Vec<char>> = genomes
        .iter()
        .map(|genome| canonical_form(genome).chars().collect())
        .collect();

    let mut total = 0.0;
    let mut comparisons = 0usize;
    for (i, a) in forms.iter().enumerate() {
        for b in &forms[i + 1..] {
            total += char_distance(a, b);
            comparisons += 1;
        }
    }

    total / comparisons as f64
}

/// Normalized Hamming-style distance between two genomes, in `[0, 1]`.
///
/// Both genomes are rendered with [`canonical_form`]; positions past the
/// end of the shorter rendering count as differences, and the count is
/// divided by the longer length. Symmetric in its arguments.
#[must_use]
pub fn pairwise_distance(a: &Value, b: &Value) -> f64 {
    let a: Vec<char> = canonical_form(a).chars().collect();
    let b: Vec<char> = canonical_form(b).chars().collect();
    char_distance(&a, &b)
}

#[allow(clippy::cast_precision_loss)]
fn char_distance(a: &[char], b: &[char]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 0.0;
    }
    let differing = (0..max_len).filter(|&i| a.get(i) != b.get(i)).count();
    differing as f64 / max_len as f64
}

/// Canonical compact JSON rendering of a genome.
///
/// Arrays keep their order; object keys are emitted in sorted order so the
/// same logical genome always renders to the same string, whatever map
/// ordering `serde_json` was built with.
///
/// # Panics
///
/// Panics if a scalar cannot be rendered as JSON, which would make every
/// diversity figure meaningless.
#[must_use]
pub fn canonical_form(genome: &Value) -> String {
    let mut out = String::new();
    write_canonical(genome, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_scalar(key, out);
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        scalar => write_scalar(scalar, out),
    }
}

fn write_scalar<T: Serialize + ?Sized>(value: &T, out: &mut String) {
    out.push_str(&serde_json::to_string(value).expect("JSON scalar always renders"));
}
