//! # Description Selector
//!
//! Chooses one final description per canonical node from the candidates
//! accumulated during merging.
//!
//! Each node's selection depends only on its own candidate list, so the
//! reduction runs data-parallel across a worker pool sized to the available
//! processing units. Results are collected index-keyed — reassembled in node
//! order, never completion order — so output is deterministic regardless of
//! scheduling.

use crate::primitives::DESCRIPTION_LENGTH_CAP;
use crate::resolve::DescriptionScorer;
use crate::types::CanonicalNode;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Strategy for picking among multiple usable candidates.
#[derive(Clone, Copy)]
pub enum SelectionStrategy<'a> {
    /// Pick the longest remaining candidate (deterministic; the default).
    Longest,
    /// Delegate to an external description-quality scorer. Not guaranteed
    /// deterministic across scorer versions.
    Scored(&'a dyn DescriptionScorer),
}

impl Default for SelectionStrategy<'_> {
    fn default() -> Self {
        Self::Longest
    }
}

/// Annotate every canonical node with its final description.
///
/// Drains each node's `descriptions_list` so the accumulator memory is
/// released before serialization begins.
pub fn select_descriptions(
    nodes: &mut BTreeMap<String, CanonicalNode>,
    strategy: SelectionStrategy<'_>,
) {
    let candidate_lists: Vec<Vec<String>> = nodes
        .values_mut()
        .map(|node| std::mem::take(&mut node.descriptions_list))
        .collect();

    tracing::info!(
        "selecting best descriptions for {} nodes across {} worker threads",
        candidate_lists.len(),
        rayon::current_num_threads()
    );

    let chosen: Vec<Option<String>> = candidate_lists
        .par_iter()
        .map(|candidates| select_one(candidates, strategy))
        .collect();

    for (node, best) in nodes.values_mut().zip(chosen) {
        node.description = best;
    }
}

/// Selection for a single node's candidate list.
fn select_one(candidates: &[String], strategy: SelectionStrategy<'_>) -> Option<String> {
    let usable: Vec<&String> = candidates
        .iter()
        .filter(|d| !d.is_empty() && d.chars().count() < DESCRIPTION_LENGTH_CAP)
        .collect();

    match usable.as_slice() {
        [] => None,
        [only] => Some((*only).clone()),
        [first, rest @ ..] => match strategy {
            SelectionStrategy::Longest => {
                // Ties go to the earliest candidate, keeping the choice
                // stable under the pinned list order.
                let mut best = *first;
                let mut best_len = best.chars().count();
                for candidate in rest {
                    let len = candidate.chars().count();
                    if len > best_len {
                        best = *candidate;
                        best_len = len;
                    }
                }
                Some(best.clone())
            }
            SelectionStrategy::Scored(scorer) => {
                let owned: Vec<String> = usable.iter().map(|d| (*d).clone()).collect();
                scorer.best(&owned)
            }
        },
    }
}

// =============================================================================
// TESTS
// =============================================================================
