// LogScraper - core/process.rs
//
// Per-file scraping. Core layer: accepts BufRead trait objects, never touches
// the filesystem directly; the app layer opens files (gzip or plain) and
// hands the reader in.

use crate::core::matcher::PatternMatcher;
use crate::core::model::{
    empty_results, FileLineMatches, MatchedLine, RegexHits, RegexLines, ScrapeResult,
};
use crate::util::constants;
use std::io::{self, BufRead};
use std::path::Path;

// =============================================================================
// Line iteration
// =============================================================================

/// Iterator over the lines of a reader.
///
/// Trailing `\n` / `\r\n` are stripped and invalid UTF-8 is replaced rather
/// than rejected, so a stray binary byte never aborts a scan.
pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LossyLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

// =============================================================================
// Scraping
// =============================================================================

/// Run every matcher over every line of `reader`, counting hits.
///
/// Each matcher is applied as an anchored match at the start of the line. On
/// a match, `total_hits` is incremented and each declared group that took
/// part in the match has its captured value counted. Groups that did not
/// participate contribute nothing.
pub fn scrape_lines<R: BufRead>(
    reader: R,
    filename: &Path,
    matchers: &[PatternMatcher],
) -> io::Result<ScrapeResult> {
    let mut regexes = empty_results(matchers);
    let mut lines_processed: u64 = 0;

    // Resolve each matcher's slot once instead of per line.
    let mut slots: Vec<(&PatternMatcher, RegexHits)> = matchers
        .iter()
        .map(|m| {
            let hits = regexes.remove(m.name()).unwrap_or_default();
            (m, hits)
        })
        .collect();

    for line in LossyLines::new(reader) {
        let line = line?;
        lines_processed += 1;

        for (matcher, hits) in slots.iter_mut() {
            let Some(caps) = matcher.match_start(&line) else {
                continue;
            };
            hits.total_hits += 1;
            for group in matcher.groups() {
                if let Some(value) = caps.name(group) {
                    let counts = hits.group_hits.entry(group.clone()).or_default();
                    *counts.entry(value.as_str().to_string()).or_insert(0) += 1;
                }
            }
        }
    }

    for (matcher, hits) in slots {
        regexes.insert(matcher.name().to_string(), hits);
    }

    tracing::debug!(
        file = %filename.display(),
        lines = lines_processed,
        "Scraping complete"
    );

    Ok(ScrapeResult {
        filename: filename.to_path_buf(),
        regexes,
    })
}

/// Collect every line that satisfies an unanchored search, per matcher.
pub fn find_matching_lines<R: BufRead>(
    reader: R,
    filename: &Path,
    matchers: &[PatternMatcher],
) -> io::Result<FileLineMatches> {
    let mut regexes: Vec<RegexLines> = matchers
        .iter()
        .map(|m| RegexLines {
            regex: m.name().to_string(),
            lines: Vec::new(),
        })
        .collect();

    for (idx, line) in LossyLines::new(reader).enumerate() {
        let line = line?;
        for (matcher, found) in matchers.iter().zip(regexes.iter_mut()) {
            if matcher.search(&line) {
                tracing::trace!(
                    file = %filename.display(),
                    regex = matcher.name(),
                    line = %preview(&line),
                    "Line matched"
                );
                found.lines.push(MatchedLine {
                    line_number: idx as u64 + 1,
                    text: line.clone(),
                });
            }
        }
    }

    Ok(FileLineMatches {
        filename: filename.to_path_buf(),
        regexes,
    })
}

/// Truncate a line for diagnostic output.
fn preview(line: &str) -> &str {
    match line.char_indices().nth(constants::DEBUG_MAX_LINE_PREVIEW) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
