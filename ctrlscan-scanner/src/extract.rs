use crate::patterns::{PatternSet, RawMatch};
use std::collections::HashMap;
use tracing::debug;

/// An extracted value and the earliest byte offset it was found at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub value: String,
    pub offset: usize,
}

impl Located {
    pub fn new(value: impl Into<String>, offset: usize) -> Self {
        Self {
            value: value.into(),
            offset,
        }
    }
}

/// Trim, drop empties and reduce to distinct values in first-seen order
pub(crate) fn distinct(matches: Vec<RawMatch<'_>>) -> Vec<Located> {
    let mut out: Vec<Located> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for m in matches {
        let value = m.value.trim();
        if value.is_empty() {
            continue;
        }
        match index.get(value) {
            Some(&i) => {
                if m.start < out[i].offset {
                    out[i].offset = m.start;
                }
            }
            None => {
                index.insert(value.to_string(), out.len());
                out.push(Located::new(value, m.start));
            }
        }
    }

    out
}

/// Distinct endpoint strings found by any endpoint pattern
pub fn extract_endpoints(text: &str) -> Vec<String> {
    extract_endpoints_located(text)
        .into_iter()
        .map(|l| l.value)
        .collect()
}

pub fn extract_endpoints_located(text: &str) -> Vec<Located> {
    distinct(PatternSet::endpoints().candidates(text))
}

/// Distinct `$state.go` targets, in pattern order then text order
pub fn extract_redirects(text: &str) -> Vec<String> {
    extract_redirects_located(text)
        .into_iter()
        .map(|l| l.value)
        .collect()
}

pub fn extract_redirects_located(text: &str) -> Vec<Located> {
    let matches = PatternSet::redirects().candidates(text);
    for m in &matches {
        debug!("Matched redirect via {} -> {}", m.pattern, m.value.trim());
    }
    distinct(matches)
}
