// src/ideas/merge.rs
//! Pure merge of the community and ai-generated idea tracks.

use std::collections::HashSet;

use crate::ideas::{Idea, IdeaOrigin};

/// Upper bound on merged ideas offered to the user.
pub const MAX_IDEAS: usize = 3;

/// Titles agreeing on this prefix (case-folded) count as the same idea.
const DEDUP_PREFIX_CHARS: usize = 30;

/// Case-folded title prefix used as the duplicate key. Approximate on
/// purpose: near-identical titles collapse, unrelated ones survive.
pub fn dedup_key(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .chars()
        .take(DEDUP_PREFIX_CHARS)
        .collect()
}

/// Merge the two tracks into at most [`MAX_IDEAS`] ideas.
///
/// Community ideas are considered first, so on a title collision the
/// community variant survives. The result starts with the first surviving
/// idea of each origin (provenance diversity), then fills in pool order.
/// Never pads: 0–3 ideas out, deterministic for a given input.
pub fn merge_idea_tracks(community: Vec<Idea>, generated: Vec<Idea>) -> Vec<Idea> {
    // 1) Concat + dedup, first occurrence wins.
    let mut seen: HashSet<String> = HashSet::new();
    let mut pool: Vec<Idea> = Vec::new();
    for idea in community.into_iter().chain(generated) {
        if seen.insert(dedup_key(&idea.title)) {
            pool.push(idea);
        }
    }

    // 2) Seed with the first surviving idea of each origin.
    let mut picked: Vec<usize> = Vec::new();
    if let Some(idx) = pool.iter().position(|i| i.origin == IdeaOrigin::Community) {
        picked.push(idx);
    }
    if let Some(idx) = pool.iter().position(|i| i.origin == IdeaOrigin::AiGenerated) {
        picked.push(idx);
    }

    // 3) Fill remaining slots in pool order.
    for idx in 0..pool.len() {
        if picked.len() >= MAX_IDEAS {
            break;
        }
        if !picked.contains(&idx) {
            picked.push(idx);
        }
    }

    picked.into_iter().map(|idx| pool[idx].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_folds_case_and_trims() {
        assert_eq!(dedup_key("  Budget Tracker "), dedup_key("budget tracker"));
    }

    #[test]
    fn dedup_key_uses_prefix_only() {
        let a = "An AI assistant that summarizes long meeting notes";
        let b = "An AI assistant that summarizes everything else entirely";
        assert_eq!(dedup_key(a), dedup_key(b));
        assert_eq!(dedup_key(a).chars().count(), 30);
    }

    #[test]
    fn dedup_key_short_titles_stay_distinct() {
        assert_ne!(dedup_key("Budget app"), dedup_key("Recipe app"));
    }
}
