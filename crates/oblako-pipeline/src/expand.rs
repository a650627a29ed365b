//! Word list expander: pad a short vocabulary up to the density target.
//!
//! A chat with only a handful of distinct words would leave most of the
//! silhouette empty. The expander cyclically repeats the ranked list
//! until the target instance count is reached, so the placement engine
//! always has enough material to fill the shape.

use rand::Rng;

use crate::types::{CloudError, WordEntry};

/// Expand `entries` to exactly `target` word instances.
///
/// Lists already at or above the target pass through unchanged. Shorter
/// lists are cyclically repeated, topped up with uniformly random draws
/// if still short, and truncated to exactly `target`. Frequencies in the
/// result are recomputed from the expanded multiset (not inherited), and
/// the result is ordered most frequent first with the original rank as
/// the tie-break, so downstream size ordering stays deterministic.
///
/// # Errors
///
/// Returns [`CloudError::EmptyWordList`] for an empty input; the random
/// top-up must never draw from an empty sequence.
pub fn expand_word_list<R: Rng>(
    entries: &[WordEntry],
    target: usize,
    rng: &mut R,
) -> Result<Vec<WordEntry>, CloudError> {
    if entries.is_empty() {
        return Err(CloudError::EmptyWordList);
    }
    if entries.len() >= target {
        return Ok(entries.to_vec());
    }

    // Work on rank indices; words are materialized once at the end.
    let mut expanded: Vec<usize> = Vec::with_capacity(target + entries.len());
    while expanded.len() < target {
        expanded.extend(0..entries.len());
    }
    while expanded.len() < target {
        expanded.push(rng.random_range(0..entries.len()));
    }
    expanded.truncate(target);

    // Recount from the expanded multiset.
    let mut counts = vec![0_u32; entries.len()];
    for &rank in &expanded {
        counts[rank] += 1;
    }

    let mut ranks: Vec<usize> = (0..entries.len()).filter(|&i| counts[i] > 0).collect();
    ranks.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(a.cmp(&b)));

    let mut result = Vec::with_capacity(target);
    for rank in ranks {
        for _ in 0..counts[rank] {
            result.push(WordEntry::new(entries[rank].word.clone(), counts[rank]));
        }
    }
    Ok(result)
}
