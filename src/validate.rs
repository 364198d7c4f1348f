//! Input validation and intent detection.
//!
//! Provides O(1) validation sets and synonym maps so users can type natural
//! words for statuses and sort columns. Three-tier resolution: exact match →
//! synonym lookup → error with suggestion.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

// ── Valid value sets (O(1) lookups) ──────────────────────────

pub static VALID_STATUSES: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["deployed", "demo-done", "pending"].into_iter().collect());

// ── Synonym maps ─────────────────────────────────────────────

pub static STATUS_SYNONYMS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("done", "deployed"),
        ("live", "deployed"),
        ("shipped", "deployed"),
        ("released", "deployed"),
        ("deploy", "deployed"),
        ("demo", "demo-done"),
        ("demoed", "demo-done"),
        ("demo_done", "demo-done"),
        ("demodone", "demo-done"),
        ("todo", "pending"),
        ("open", "pending"),
        ("planned", "pending"),
        ("waiting", "pending"),
    ]
    .into_iter()
    .collect()
});

/// Column keys (lowercased, separators stripped) → canonical column name.
pub static COLUMN_KEYS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("no", "no"),
        ("number", "no"),
        ("page", "page"),
        ("childpage", "childPage"),
        ("child", "childPage"),
        ("milestone", "milestone"),
        ("feature", "milestone"),
        ("description", "description"),
        ("remarks", "remarks"),
        ("demodate", "demoDate"),
        ("demo", "demoDate"),
        ("deploymentdate", "deploymentDate"),
        ("deployment", "deploymentDate"),
        ("percentcost", "percentCost"),
        ("percent", "percentCost"),
        ("cost", "percentCost"),
        ("progress", "percentCost"),
        ("amount", "amount"),
    ]
    .into_iter()
    .collect()
});

/// Normalize a status filter via exact match or synonym lookup.
///
/// Returns the canonical status, or an error with the original input
/// and an optional suggestion.
pub fn normalize_status(input: &str) -> Result<&'static str, (String, Option<String>)> {
    let lower = input.trim().to_lowercase();

    // Tier 1: exact match
    if let Some(&status) = VALID_STATUSES.get(lower.as_str()) {
        return Ok(status);
    }

    // Tier 2: synonym lookup
    if let Some(&canonical) = STATUS_SYNONYMS.get(lower.as_str()) {
        return Ok(canonical);
    }

    // Tier 3: find closest suggestion
    let suggestion = find_closest_match(&lower, &VALID_STATUSES, &STATUS_SYNONYMS);
    Err((input.to_string(), suggestion))
}

/// Normalize a sort column name (`percentCost`, `percent_cost`, `cost`, ...).
pub fn normalize_column(input: &str) -> Result<&'static str, String> {
    let key: String = input
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_lowercase();

    COLUMN_KEYS
        .get(key.as_str())
        .copied()
        .ok_or_else(|| input.to_string())
}

/// Find the closest matching value across valid set and synonyms.
fn find_closest_match(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &v in valid.iter().chain(synonyms.keys()) {
        let dist = levenshtein_distance(input, v);
        if dist <= 3 && best.is_none_or(|(_, d)| dist < d) {
            // For synonyms, show what it maps to
            let shown = synonyms.get(v).copied().unwrap_or(v);
            best = Some((shown, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Use single-row optimization (O(min(m,n)) space)
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Find existing IDs similar to the searched ID.
///
/// Returns up to `max` suggestions with edit distance ≤ 3,
/// sorted by distance then alphabetically.
#[must_use]
pub fn find_similar_ids(searched: &str, existing: &[String], max: usize) -> Vec<String> {
    let mut candidates: Vec<(usize, &str)> = existing
        .iter()
        .map(|id| (levenshtein_distance(searched, id), id.as_str()))
        .filter(|(dist, _)| *dist <= 3)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max)
        .map(|(_, id)| id.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_status() {
        assert_eq!(normalize_status("deployed"), Ok("deployed"));
        assert_eq!(normalize_status("DEMO-DONE"), Ok("demo-done"));
        assert_eq!(normalize_status("live"), Ok("deployed"));
        assert_eq!(normalize_status("demo"), Ok("demo-done"));
        assert_eq!(normalize_status("todo"), Ok("pending"));
        assert!(normalize_status("nonsense").is_err());
    }

    #[test]
    fn test_normalize_status_suggests() {
        let err = normalize_status("deplyed").unwrap_err();
        assert_eq!(err.1.as_deref(), Some("deployed"));
    }

    #[test]
    fn test_normalize_column() {
        assert_eq!(normalize_column("percentCost"), Ok("percentCost"));
        assert_eq!(normalize_column("percent_cost"), Ok("percentCost"));
        assert_eq!(normalize_column("deployment-date"), Ok("deploymentDate"));
        assert_eq!(normalize_column("NO"), Ok("no"));
        assert_eq!(normalize_column("weight"), Err("weight".to_string()));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", "abd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_find_similar_ids() {
        let ids = vec![
            "row_1700000000000_a1b2c3d4e".to_string(),
            "row_1700000000000_a1b2c3d4f".to_string(),
            "row_1800000000000_zzzzzzzzz".to_string(),
        ];
        let result = find_similar_ids("row_1700000000000_a1b2c3d4x", &ids, 3);
        assert_eq!(result.len(), 2);
        assert!(!result.contains(&"row_1800000000000_zzzzzzzzz".to_string()));
    }
}
