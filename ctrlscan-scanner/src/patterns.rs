// Pattern library for lexical endpoint and redirect mining

use crate::error::Result;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Which part of a match becomes the extracted value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// A numbered capture group. Matches where the group did not participate yield nothing.
    Group(usize),
    /// The whole match
    Whole,
}

/// A single match-rule / capture-selector pair
#[derive(Debug, Clone)]
pub struct Pattern {
    name: &'static str,
    regex: Regex,
    capture: Capture,
    fallback: bool,
}

/// A raw, untrimmed value produced by one pattern, with its byte span in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch<'t> {
    pub pattern: &'static str,
    pub value: &'t str,
    pub start: usize,
    pub end: usize,
    pub fallback: bool,
}

impl RawMatch<'_> {
    fn overlaps(&self, other: &RawMatch<'_>) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl Pattern {
    /// Compile a case-insensitive pattern
    pub fn new(name: &'static str, source: &str, capture: Capture) -> Result<Self> {
        let regex = RegexBuilder::new(source).case_insensitive(true).build()?;
        Ok(Self {
            name,
            regex,
            capture,
            fallback: false,
        })
    }

    /// Mark this pattern as a catch-all: its matches are dropped wherever a
    /// tighter pattern already claimed an overlapping span.
    pub fn fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn matches<'t>(&self, text: &'t str) -> Vec<RawMatch<'t>> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let m = match self.capture {
                    Capture::Group(n) => caps.get(n)?,
                    Capture::Whole => caps.get(0)?,
                };
                Some(RawMatch {
                    pattern: self.name,
                    value: m.as_str(),
                    start: m.start(),
                    end: m.end(),
                    fallback: self.fallback,
                })
            })
            .collect()
    }
}

/// An ordered set of patterns evaluated independently over the same text
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

static ENDPOINT_PATTERNS: LazyLock<PatternSet> = LazyLock::new(|| {
    PatternSet::build(&[
        ("quoted_api_path", r#"['"](/api/[\w/-]+)['"]"#, Capture::Group(1), false),
        ("quoted_api_query", r#"['"](/api/[^'"?]+\?[^'"]+)['"]"#, Capture::Group(1), false),
        ("template_api_path", r"`(/api/[^`]+)`", Capture::Group(1), false),
        ("scope_api_assignment", r#"\$scope\.\w+API\s*=\s*['"]([^'"]+)['"]"#, Capture::Group(1), false),
        ("quoted_relative_api", r#"['"](api/[^'"?]+|/api/[^'"?]+)['"]"#, Capture::Group(1), false),
        ("url_property", r#"url:\s*['"](api/[^'"?]+|/api/[^'"?]+)['"]"#, Capture::Group(1), false),
        ("bare_api_path", r#"(?:/|\b)api/[^"'`?\s;,)]+"#, Capture::Whole, true),
    ])
    .expect("built-in endpoint patterns compile")
});

static REDIRECT_PATTERNS: LazyLock<PatternSet> = LazyLock::new(|| {
    PatternSet::build(&[
        ("state_go_quoted", r#"\$state\.go\(['"]([^'",\s)]+)['"]\s*\)"#, Capture::Group(1), false),
        ("state_go_quoted_args", r#"\$state\.go\(['"]([^'",\s)]+)['"]\s*,"#, Capture::Group(1), false),
        ("state_go_template", r"\$state\.go\(`([^`]+)`\)", Capture::Group(1), false),
        ("state_go_identifier", r"\$state\.go\(\s*(\w+)\s*\)", Capture::Group(1), false),
        ("state_go_options", r#"\$state\.go\(\s*['"]([^'"]+)['"],\s*\{"#, Capture::Group(1), false),
    ])
    .expect("built-in redirect patterns compile")
});

static DIRECTIVE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"[\w./\\-]*directives[/\\]\w+\.js\b")
        .case_insensitive(true)
        .build()
        .expect("directive reference pattern compiles")
});

static DIRECTIVE_ENDPOINT: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r#"(?:/|\b)api/[^"'?]+"#)
        .case_insensitive(true)
        .build()
        .expect("directive endpoint pattern compiles")
});

impl PatternSet {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    fn build(specs: &[(&'static str, &str, Capture, bool)]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(specs.len());
        for &(name, source, capture, fallback) in specs {
            let pattern = Pattern::new(name, source, capture)?;
            patterns.push(if fallback { pattern.fallback() } else { pattern });
        }
        Ok(Self::new(patterns))
    }

    /// The endpoint pattern library
    pub fn endpoints() -> &'static PatternSet {
        &ENDPOINT_PATTERNS
    }

    /// The `$state.go(...)` redirect pattern library
    pub fn redirects() -> &'static PatternSet {
        &REDIRECT_PATTERNS
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Run every pattern over `text` and concatenate the results in pattern order.
    ///
    /// Values are raw (untrimmed, possibly repeated). Matches of fallback patterns
    /// that overlap any span captured by a non-fallback pattern are discarded.
    pub fn candidates<'t>(&self, text: &'t str) -> Vec<RawMatch<'t>> {
        let all: Vec<RawMatch<'t>> = self.patterns.iter().flat_map(|p| p.matches(text)).collect();

        let claimed: Vec<&RawMatch<'t>> = all.iter().filter(|m| !m.fallback).collect();

        all.iter()
            .filter(|m| !m.fallback || !claimed.iter().any(|c| c.overlaps(m)))
            .cloned()
            .collect()
    }
}

/// Matches references to directive scripts, e.g. `/Sida/App/directives/widget.js`
pub fn directive_reference() -> &'static Regex {
    &DIRECTIVE_REFERENCE
}

/// Matches `api/...` routes within a single line of a directive script
pub fn directive_endpoint() -> &'static Regex {
    &DIRECTIVE_ENDPOINT
}
