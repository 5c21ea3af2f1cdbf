// LogScraper - core/stats.rs
//
// Min / max / average over a group's value -> count mapping.

use crate::core::model::{GroupStats, ValueCounts};

/// Compute stats for a group mapping.
///
/// Ties on the extreme count resolve to the first key in ascending key order.
/// An empty or absent mapping yields the zero record.
pub fn calc_stats(items: Option<&ValueCounts>) -> GroupStats {
    let Some(items) = items.filter(|m| !m.is_empty()) else {
        return GroupStats::default();
    };

    let mut max: Option<(&String, u64)> = None;
    let mut min: Option<(&String, u64)> = None;
    let mut total: u64 = 0;

    for (key, &count) in items {
        total += count;
        if max.map_or(true, |(_, c)| count > c) {
            max = Some((key, count));
        }
        if min.map_or(true, |(_, c)| count < c) {
            min = Some((key, count));
        }
    }

    GroupStats {
        max_key: max.map(|(k, _)| k.clone()),
        min_key: min.map(|(k, _)| k.clone()),
        max_count: max.map_or(0, |(_, c)| c),
        min_count: min.map_or(0, |(_, c)| c),
        avg_count: total as f64 / items.len() as f64,
    }
}
