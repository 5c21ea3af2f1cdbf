// LogScraper - core/aggregate.rs
//
// Merge per-file results into one run-wide result.

use crate::core::matcher::PatternMatcher;
use crate::core::model::{empty_results, AggregateResult, ScrapeResult};

/// Combine per-file results into an `AggregateResult`.
///
/// Every configured matcher appears in the output even if no file matched it.
/// The per-file breakdown is kept whenever more than one file was resolved,
/// even if some of them failed and `results` holds fewer entries.
pub fn aggregate(
    matchers: &[PatternMatcher],
    results: Vec<ScrapeResult>,
    resolved: usize,
) -> AggregateResult {
    let mut regexes = empty_results(matchers);

    for result in &results {
        for (name, hits) in &result.regexes {
            regexes.entry(name.clone()).or_default().merge(hits);
        }
    }

    tracing::debug!(
        resolved,
        processed = results.len(),
        regexes = regexes.len(),
        "Aggregation complete"
    );

    let file_hits = if resolved > 1 {
        Some(results)
    } else {
        None
    };

    AggregateResult { regexes, file_hits }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{RegexHits, RegexResults, ValueCounts};
    use std::path::PathBuf;

    fn group_matcher() -> PatternMatcher {
        PatternMatcher::new("group", r"My name is (?P<name>\w+)\.$").unwrap()
    }

    fn file_result(name: &str, total: u64, names: &[(&str, u64)]) -> ScrapeResult {
        let counts: ValueCounts = names.iter().map(|(k, v)| ((*k).to_string(), *v)).collect();
        let mut regexes = RegexResults::new();
        regexes.insert(
            "group".to_string(),
            RegexHits {
                total_hits: total,
                group_hits: [("name".to_string(), counts)].into_iter().collect(),
            },
        );
        ScrapeResult {
            filename: PathBuf::from(name),
            regexes,
        }
    }

    #[test]
    fn test_two_files_sum_and_keep_breakdown() {
        let results = vec![
            file_result("log1.log", 3, &[("Judge", 2), ("Franklin", 1)]),
            file_result("log2.log", 2, &[("Judge", 1), ("Franklin", 1)]),
        ];
        let agg = aggregate(&[group_matcher()], results.clone(), 2);

        let hits = &agg.regexes["group"];
        assert_eq!(hits.total_hits, 5);
        let names: Vec<_> = hits.group_hits["name"]
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        assert_eq!(names, vec![("Franklin", 2), ("Judge", 3)]);

        let per_file = agg.file_hits.expect("two files keep per-file results");
        assert_eq!(per_file, results);
    }

    #[test]
    fn test_single_file_omits_breakdown() {
        let agg = aggregate(
            &[group_matcher()],
            vec![file_result("only.log", 1, &[("Judge", 1)])],
            1,
        );
        assert!(agg.file_hits.is_none());
        assert_eq!(agg.regexes["group"].total_hits, 1);
    }

    #[test]
    fn test_unmatched_matcher_still_reported() {
        let silent = PatternMatcher::new("silent", r"(?P<never>zzz)").unwrap();
        let agg = aggregate(
            &[group_matcher(), silent],
            vec![file_result("only.log", 1, &[("Judge", 1)])],
            1,
        );
        let hits = &agg.regexes["silent"];
        assert_eq!(hits.total_hits, 0);
        assert!(hits.group_hits["never"].is_empty());
    }

    #[test]
    fn test_group_sums_preserved() {
        let results = vec![
            file_result("a.log", 4, &[("x", 1), ("y", 3)]),
            file_result("b.log", 2, &[("y", 2)]),
            file_result("c.log", 0, &[]),
        ];
        let per_file_sum: u64 = results
            .iter()
            .flat_map(|r| r.regexes["group"].group_hits["name"].values())
            .sum();
        let agg = aggregate(&[group_matcher()], results, 3);
        let agg_sum: u64 = agg.regexes["group"].group_hits["name"].values().sum();
        assert_eq!(agg_sum, per_file_sum);
        assert_eq!(agg.regexes["group"].total_hits, 6);
        assert_eq!(agg.file_hits.map(|f| f.len()), Some(3));
    }

    #[test]
    fn test_breakdown_follows_resolved_count_not_survivors() {
        // Two files resolved, one dropped while reading.
        let survivor = file_result("log1.log", 2, &[("Judge", 2)]);
        let agg = aggregate(&[group_matcher()], vec![survivor.clone()], 2);
        assert_eq!(agg.file_hits, Some(vec![survivor]));

        let none_left = aggregate(&[group_matcher()], Vec::new(), 2);
        assert_eq!(none_left.file_hits, Some(Vec::new()));
        assert_eq!(none_left.regexes["group"].total_hits, 0);
    }
}
