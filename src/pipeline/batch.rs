//! Parallel characterization of independent inputs.

use rayon::prelude::*;
use tracing::info;

use super::Characterizer;
use crate::characterization::CodeCharacterization;
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct BatchInput {
    pub label: String,
    pub source: String,
}

impl BatchInput {
    pub fn new(label: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug)]
pub struct BatchResult {
    pub label: String,
    pub result: Result<Option<CodeCharacterization>>,
}

/// Characterize every input on the rayon pool. Results keep input order; a
/// fault in one input does not affect the others.
pub fn analyze_batch(characterizer: &Characterizer, inputs: &[BatchInput]) -> Vec<BatchResult> {
    let results: Vec<BatchResult> = inputs
        .par_iter()
        .map(|input| BatchResult {
            label: input.label.clone(),
            result: characterizer.characterize_labeled(&input.label, &input.source),
        })
        .collect();

    let failed = results.iter().filter(|r| r.result.is_err()).count();
    info!(total = results.len(), failed, "batch characterized");
    results
}
