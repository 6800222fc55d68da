// Numeric helpers shared by the scoring pipeline

use crate::models::PriceRange;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Compute exponential decay for time-based scoring
pub fn exponential_decay(age_hours: f64, half_life_hours: f64) -> f64 {
    if half_life_hours <= 0.0 {
        return 1.0;
    }
    (-age_hours.max(0.0) / half_life_hours * std::f64::consts::LN_2).exp()
}

/// Divide, returning 0 when the denominator is zero or the result is not finite.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// Cosine similarity of two sparse vectors. The union of keys forms the
/// dimensions; a zero vector on either side yields 0.
pub fn cosine_similarity<K: Eq + Hash>(a: &HashMap<K, f64>, b: &HashMap<K, f64>) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(k, va)| b.get(k).map(|vb| va * vb))
        .sum();
    let norm_a = a.values().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b = b.values().map(|v| v * v).sum::<f64>().sqrt();

    safe_ratio(dot, norm_a * norm_b).clamp(0.0, 1.0)
}

/// Jaccard index of two sets; two empty sets yield 0.
pub fn jaccard_index<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    let intersection = a.intersection(b).count();
    safe_ratio(intersection as f64, union as f64)
}

/// Overlap of two intervals divided by the span of their union.
pub fn interval_overlap_ratio(a: &PriceRange, b: &PriceRange) -> f64 {
    let overlap = (a.max.min(b.max) - a.min.max(b.min)).max(0.0);
    let union_span = a.max.max(b.max) - a.min.min(b.min);
    safe_ratio(overlap, union_span).clamp(0.0, 1.0)
}

/// Nearest-rank percentile over an ascending-sorted slice.
pub fn nearest_rank_percentile(sorted: &[f64], percentile: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let p = percentile.clamp(0.0, 100.0);
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    Some(sorted[index])
}

/// Lowercased alphanumeric words of `text`.
pub fn word_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// `word` is `keyword` or its plural ("coat", "coats", "dresses").
pub fn is_word_form(word: &str, keyword: &str) -> bool {
    word == keyword
        || word.strip_suffix('s') == Some(keyword)
        || word.strip_suffix("es") == Some(keyword)
}

/// Whether `phrase` occurs in `words` as consecutive whole words.
pub fn contains_phrase(words: &[String], phrase: &str) -> bool {
    let phrase = word_tokens(phrase);
    if phrase.is_empty() || phrase.len() > words.len() {
        return false;
    }
    words.windows(phrase.len()).any(|window| {
        window
            .iter()
            .zip(&phrase)
            .all(|(word, keyword)| is_word_form(word, keyword))
    })
}

/// Descending comparison for scores; NaN compares equal so sorting stays total.
pub fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
