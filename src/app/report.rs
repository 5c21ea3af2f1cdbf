// LogScraper - app/report.rs
//
// Rendering of scrape results: a plain-text report (group hits, their stats
// and total hits per regex), a per-file breakdown, and JSON.
// Writes to any `Write`; the CLI passes stdout.

use crate::core::model::{AggregateResult, RegexResults};
use crate::core::stats::calc_stats;
use std::io::{self, Write};

/// Write the run-wide report: per regex and group every value with its
/// count, the group's stats, then the total hits of each regex.
pub fn write_report<W: Write>(result: &AggregateResult, out: &mut W) -> io::Result<()> {
    write_regexes(&result.regexes, out)?;
    writeln!(out)?;
    for (name, hits) in &result.regexes {
        writeln!(out, "Total hits for regex {name}: {}", hits.total_hits)?;
    }
    Ok(())
}

/// Write one report section per processed file. A single-file result has no
/// breakdown and writes nothing.
pub fn write_per_file<W: Write>(result: &AggregateResult, out: &mut W) -> io::Result<()> {
    for file in result.file_hits.iter().flatten() {
        writeln!(out, "File: {}", file.filename.display())?;
        write_regexes(&file.regexes, out)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Pretty-printed JSON of the whole result.
pub fn write_json<W: Write>(result: &AggregateResult, out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, result).map_err(io::Error::from)?;
    writeln!(out)
}

fn write_regexes<W: Write>(regexes: &RegexResults, out: &mut W) -> io::Result<()> {
    for (name, hits) in regexes {
        for (group, values) in &hits.group_hits {
            writeln!(out, "\n{name} hits per {group}:")?;
            for (value, count) in values {
                writeln!(out, "{value} : {count}")?;
            }

            let stats = calc_stats(Some(values));
            writeln!(out, "\n{name} max, min and average:")?;
            writeln!(out, "Aggregator: {group}")?;
            writeln!(
                out,
                "Max count : {}, value: {}",
                stats.max_count,
                stats.max_key.as_deref().unwrap_or("-")
            )?;
            writeln!(
                out,
                "Min count : {}, value: {}",
                stats.min_count,
                stats.min_key.as_deref().unwrap_or("-")
            )?;
            writeln!(out, "Average count : {:.2}", stats.avg_count)?;
        }
        writeln!(out, "\nTotal {name} hits: {}", hits.total_hits)?;
    }
    Ok(())
}
