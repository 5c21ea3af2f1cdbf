// LogScraper - core/matcher.rs
//
// Named regex wrapper. Exposes the pattern's named capture groups so the
// processor can aggregate hits per group value.

use crate::util::constants;
use crate::util::error::PatternError;
use regex::{Captures, Regex};
use std::fmt;

/// A named, compiled regular expression plus its declared capture groups.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    name: String,
    pattern: String,
    regex: Regex,
    /// Same pattern pinned to the start of the input.
    anchored: Regex,
    groups: Vec<String>,
}

impl PatternMatcher {
    /// Compile `pattern` under `name`.
    ///
    /// Fails with `PatternError` if the pattern is too long or does not compile.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Result<Self, PatternError> {
        let name = name.into();
        let pattern = pattern.into();
        let Compiled {
            regex,
            anchored,
            groups,
        } = compile(&name, &pattern)?;
        Ok(Self {
            name,
            pattern,
            regex,
            anchored,
            groups,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Named capture groups in declaration order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Match anchored at the start of `line`.
    ///
    /// A line that does not match at offset 0 is rejected without scanning
    /// the rest of it.
    pub fn match_start<'l>(&self, line: &'l str) -> Option<Captures<'l>> {
        self.anchored.captures(line)
    }

    /// Unanchored search anywhere in `line`.
    pub fn search(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }

    /// Replace the pattern, recompiling the regex and the group list.
    ///
    /// On failure the previous pattern stays in effect.
    pub fn update_pattern(&mut self, pattern: impl Into<String>) -> Result<(), PatternError> {
        let pattern = pattern.into();
        let Compiled {
            regex,
            anchored,
            groups,
        } = compile(&self.name, &pattern)?;
        tracing::debug!(
            regex = %self.name,
            old = %self.pattern,
            new = %pattern,
            "Pattern updated"
        );
        self.pattern = pattern;
        self.regex = regex;
        self.anchored = anchored;
        self.groups = groups;
        Ok(())
    }
}

impl fmt::Display for PatternMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern: {}, Groups: {:?}", self.pattern, self.groups)
    }
}

struct Compiled {
    regex: Regex,
    anchored: Regex,
    groups: Vec<String>,
}

fn compile(name: &str, pattern: &str) -> Result<Compiled, PatternError> {
    if pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
        return Err(PatternError::RegexTooLong {
            name: name.to_string(),
            length: pattern.len(),
            max_length: constants::MAX_REGEX_PATTERN_LENGTH,
        });
    }

    let invalid = |e: regex::Error| PatternError::InvalidRegex {
        name: name.to_string(),
        pattern: pattern.to_string(),
        source: e,
    };
    let regex = Regex::new(pattern).map_err(invalid)?;
    // Non-capturing wrapper, so group indices and names are unchanged.
    let anchored = Regex::new(&format!("^(?:{pattern})")).map_err(invalid)?;
    let groups = regex
        .capture_names()
        .flatten()
        .map(str::to_string)
        .collect();
    Ok(Compiled {
        regex,
        anchored,
        groups,
    })
}
