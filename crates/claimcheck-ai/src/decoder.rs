//! Raw scores → label and probability distribution.

use claimcheck_core::{Label, LabelMapping, ProbabilityTable};

use crate::classifier::RawScores;

/// Softmax output in class-index order. Sums to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Probabilities(pub Vec<f64>);

impl Probabilities {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Percentages rounded to two decimals, keyed by label.
    pub fn to_percentages(&self, labels: &LabelMapping) -> ProbabilityTable {
        let mut table = ProbabilityTable::default();
        for (index, &p) in self.0.iter().enumerate() {
            if let Some(label) = labels.label(index) {
                table.set(label, round2(p * 100.0));
            }
        }
        table
    }
}

/// Decoded prediction: the argmax label plus the full distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub label: Label,
    pub probabilities: Probabilities,
}

/// Normalize `scores` and pick the most probable label.
///
/// Ties go to the lowest class index.
pub fn decode(scores: &RawScores, labels: &LabelMapping) -> anyhow::Result<Decoded> {
    anyhow::ensure!(
        scores.len() == labels.len(),
        "model produced {} scores for {} labels",
        scores.len(),
        labels.len()
    );
    anyhow::ensure!(
        scores.as_slice().iter().all(|s| s.is_finite()),
        "model produced non-finite scores: {:?}",
        scores.as_slice()
    );

    let probabilities = softmax(scores.as_slice());
    let index = argmax(&probabilities)
        .ok_or_else(|| anyhow::anyhow!("cannot decode an empty score vector"))?;
    let label = labels
        .label(index)
        .ok_or_else(|| anyhow::anyhow!("no label for class index {index}"))?;

    Ok(Decoded {
        label,
        probabilities: Probabilities(probabilities),
    })
}

/// Numerically stable softmax, computed in f64.
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits
        .iter()
        .map(|&x| x as f64)
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&x| (x as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the first maximum.
fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Round to two decimals, halves to even.
fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}
