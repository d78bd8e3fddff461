// Resolution of directive scripts referenced from controller files

use crate::error::{Result, ScanError};
use crate::extract::Located;
use crate::patterns::{directive_endpoint, directive_reference};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Casing applied to endpoints pulled out of directive files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseMode {
    /// Keep endpoints exactly as written, matching direct controller matches
    #[default]
    Preserve,
    /// Fold endpoints to lowercase
    Lowercase,
}

/// A directive reference that could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDirective {
    pub reference: String,
    pub path: PathBuf,
    pub reason: String,
}

/// Endpoints contributed by directive files, plus the references that were skipped
#[derive(Debug, Clone, Default)]
pub struct DirectiveScan {
    /// Distinct endpoints; offsets point at the directive reference in the controller text
    pub endpoints: Vec<Located>,
    /// Number of distinct directive files read
    pub resolved: usize,
    pub skipped: Vec<SkippedDirective>,
}

pub struct DirectiveResolver {
    base_dir: PathBuf,
    case: CaseMode,
}

impl DirectiveResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            case: CaseMode::default(),
        }
    }

    pub fn with_case(mut self, case: CaseMode) -> Self {
        self.case = case;
        self
    }

    /// Distinct directive references in first-seen order
    pub fn references(&self, text: &str) -> Vec<Located> {
        let mut seen = HashSet::new();
        directive_reference()
            .find_iter(text)
            .filter_map(|m| {
                let reference = m.as_str().trim();
                if reference.is_empty() || !seen.insert(reference.to_string()) {
                    return None;
                }
                Some(Located::new(reference, m.start()))
            })
            .collect()
    }

    /// Join a `/`-separated reference onto the base directory using host separators
    pub fn resolve_path(&self, reference: &str) -> PathBuf {
        let mut path = self.base_dir.clone();
        for segment in reference.split(['/', '\\']).filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path
    }

    /// Read one directive file and return the first endpoint on each line
    pub fn read_endpoints(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = fs::read(path).map_err(|source| ScanError::DirectiveUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);

        Ok(content
            .lines()
            .filter_map(|line| directive_endpoint().find(line))
            .filter_map(|m| self.normalize(m.as_str()))
            .collect())
    }

    fn normalize(&self, raw: &str) -> Option<String> {
        let route = raw.trim().trim_end_matches(['\'', '"', '`']).trim();
        if route.is_empty() || route.to_ascii_lowercase().ends_with(".html") {
            return None;
        }
        Some(match self.case {
            CaseMode::Preserve => route.to_string(),
            CaseMode::Lowercase => route.to_lowercase(),
        })
    }

    /// Resolve every directive referenced by `text` and collect their endpoints.
    /// Each resolved path is read at most once, however it is spelled.
    ///
    /// Missing or unreadable directive files are skipped and reported in
    /// [`DirectiveScan::skipped`]; they never fail the scan.
    pub fn resolve(&self, text: &str) -> DirectiveScan {
        let mut scan = DirectiveScan::default();
        let mut seen = HashSet::new();
        let mut visited = HashSet::new();

        for reference in self.references(text) {
            let path = self.resolve_path(&reference.value);
            if !visited.insert(path.clone()) {
                continue;
            }
            debug!("Resolving directive {} -> {}", reference.value, path.display());

            match self.read_endpoints(&path) {
                Ok(endpoints) => {
                    scan.resolved += 1;
                    for endpoint in endpoints {
                        if seen.insert(endpoint.clone()) {
                            scan.endpoints.push(Located::new(endpoint, reference.offset));
                        }
                    }
                }
                Err(e) => {
                    warn!("Skipping directive {}: {}", reference.value, e);
                    scan.skipped.push(SkippedDirective {
                        reference: reference.value,
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        scan
    }
}
