//! Additive scoring and sort keys.

use std::time::{Duration, SystemTime};

use super::{CompletionItem, UsageLearner};

/// Scores never reach this; `CEILING - score` keeps sort keys positive.
const CEILING: u32 = 1000;

const PREFIX_MATCH: u32 = 100;
const SUBSTRING_MATCH: u32 = 50;
const FREQUENCY_STEP: u32 = 10;
const FREQUENCY_CAP: u32 = 50;
const ENCLOSING_MENTION: u32 = 25;

/// Recency bonus for use within each age bound, checked in order.
const RECENCY: &[(Duration, u32)] = &[
    (Duration::from_secs(60), 30),
    (Duration::from_secs(5 * 60), 20),
    (Duration::from_secs(60 * 60), 10),
];

/// Inputs shared by every candidate of one query.
#[derive(Clone, Copy)]
pub struct RankContext<'a> {
    /// The partial word being typed.
    pub partial: &'a str,
    pub learner: &'a UsageLearner,
    /// Name of the method enclosing the cursor.
    pub enclosing: Option<&'a str>,
    pub now: SystemTime,
}

/// Additive score of one candidate, including its generator boost.
pub fn score(item: &CompletionItem, cx: &RankContext<'_>) -> u32 {
    let mut score = item.boost;

    let label = item.label.to_lowercase();
    let partial = cx.partial.to_lowercase();
    if label.starts_with(&partial) {
        score += PREFIX_MATCH;
    } else if label.contains(&partial) {
        score += SUBSTRING_MATCH;
    }

    if let Some(usage) = cx.learner.usage(&item.label) {
        score += usage.frequency.saturating_mul(FREQUENCY_STEP).min(FREQUENCY_CAP);

        let age = cx.now.duration_since(usage.last_used).unwrap_or(Duration::ZERO);
        score += RECENCY
            .iter()
            .find(|(bound, _)| age <= *bound)
            .map_or(0, |&(_, bonus)| bonus);
    }

    if let (Some(enclosing), Some(detail)) = (cx.enclosing, item.detail.as_deref()) {
        if detail.contains(enclosing) {
            score += ENCLOSING_MENTION;
        }
    }

    score
}

fn sort_key(item: &CompletionItem) -> String {
    format!("{:04}{}", CEILING.saturating_sub(item.score), item.label)
}

/// Score every item, fill in its sort key, and order best-first.
pub fn rank(mut items: Vec<CompletionItem>, cx: &RankContext<'_>) -> Vec<CompletionItem> {
    for item in &mut items {
        item.score = score(item, cx);
        item.sort_key = sort_key(item);
    }
    items.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    items
}
