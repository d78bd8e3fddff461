// Catalog builder: walks controller files and merges their endpoints into the store

use crate::error::{CatalogError, Result};
use crate::model::{NewEndpoint, Page};
use crate::store::CatalogStore;
use ctrlscan_scanner::{
    CaseMode, DirectiveResolver, Located, SkippedDirective, extract_endpoints_located,
    extract_redirects_located,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const DEFAULT_FILE_SUFFIX: &str = "controller.js";

/// How a redirect is attached to the endpoints of a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectPolicy {
    /// The first redirect found in the file is attached to every endpoint
    #[default]
    #[serde(rename = "first")]
    FirstInFile,
    /// Each endpoint takes the closest redirect at or before its position,
    /// falling back to the first redirect in the file
    #[serde(rename = "nearest")]
    NearestPreceding,
}

impl RedirectPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "first" => Some(RedirectPolicy::FirstInFile),
            "nearest" => Some(RedirectPolicy::NearestPreceding),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectPolicy::FirstInFile => "first",
            RedirectPolicy::NearestPreceding => "nearest",
        }
    }

    /// Pick the redirect for an endpoint at `offset`. Empty when there are none.
    pub fn choose(&self, redirects: &[Located], offset: usize) -> String {
        let first = redirects.first().map(|r| r.value.clone()).unwrap_or_default();
        match self {
            RedirectPolicy::FirstInFile => first,
            RedirectPolicy::NearestPreceding => redirects
                .iter()
                .filter(|r| r.offset <= offset)
                .max_by_key(|r| r.offset)
                .map(|r| r.value.clone())
                .unwrap_or(first),
        }
    }
}

/// When new endpoints are written to the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistMode {
    /// Insert each endpoint as soon as it is found
    #[default]
    Incremental,
    /// Accumulate across the whole tree and write once at the end
    Batched,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub file_suffix: String,
    /// Base directory directive references are joined onto. Defaults to the scan root.
    pub directive_root: Option<PathBuf>,
    pub directive_case: CaseMode,
    pub redirect_policy: RedirectPolicy,
    pub persist_mode: PersistMode,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            directive_root: None,
            directive_case: CaseMode::default(),
            redirect_policy: RedirectPolicy::default(),
            persist_mode: PersistMode::default(),
        }
    }
}

/// An endpoint found in one controller file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundEndpoint {
    pub url: String,
    pub redirect: String,
    /// False when the page already had this url
    pub added: bool,
}

/// Result of scanning a single controller file
#[derive(Debug, Clone)]
pub struct PageScan {
    pub path: PathBuf,
    pub page: Page,
    pub page_created: bool,
    pub endpoints: Vec<FoundEndpoint>,
    /// Directive files that were read
    pub directives_resolved: usize,
    pub skipped_directives: Vec<SkippedDirective>,
}

#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub files_scanned: usize,
    pub pages_created: usize,
    pub endpoints_added: usize,
    pub pages: Vec<PageScan>,
}

impl ScanSummary {
    pub fn skipped_directives(&self) -> impl Iterator<Item = &SkippedDirective> {
        self.pages.iter().flat_map(|p| p.skipped_directives.iter())
    }

    /// True when directives were referenced but none could be read, which
    /// usually means the directive root points at the wrong directory.
    pub fn directive_root_unresolved(&self) -> bool {
        let resolved: usize = self.pages.iter().map(|p| p.directives_resolved).sum();
        resolved == 0 && self.skipped_directives().next().is_some()
    }
}

/// Deduplicating accumulator for batched persistence, keyed by (page id, url)
#[derive(Debug, Default)]
pub struct EndpointAccumulator {
    keys: HashSet<(i64, String)>,
    records: Vec<NewEndpoint>,
}

impl EndpointAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if (page id, url) was already accumulated
    pub fn insert(&mut self, endpoint: NewEndpoint) -> bool {
        if !self.keys.insert((endpoint.page_id, endpoint.url.clone())) {
            return false;
        }
        self.records.push(endpoint);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<NewEndpoint> {
        self.records
    }
}

/// Called with each controller path before it is scanned
pub type ScanProgressCallback = Arc<dyn Fn(&Path) + Send + Sync>;

/// Derive (folder name, controller name) from a controller path
pub fn page_identity(path: &Path) -> (String, String) {
    let controller = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let folder = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (folder, controller)
}

/// Union of two located lists, distinct by value, first list first
fn union(direct: Vec<Located>, extra: Vec<Located>) -> Vec<Located> {
    let mut seen = HashSet::new();
    direct
        .into_iter()
        .chain(extra)
        .filter(|l| seen.insert(l.value.clone()))
        .collect()
}

pub struct CatalogBuilder<'a, S: CatalogStore + ?Sized> {
    store: &'a mut S,
    options: ScanOptions,
    progress: Option<ScanProgressCallback>,
}

impl<'a, S: CatalogStore + ?Sized> CatalogBuilder<'a, S> {
    pub fn new(store: &'a mut S, options: ScanOptions) -> Self {
        Self {
            store,
            options,
            progress: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ScanProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Recursively list files under `root` whose name ends with the configured suffix,
    /// sorted by path
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(CatalogError::RootNotFound(root.to_path_buf()));
        }

        let suffix = self.options.file_suffix.to_lowercase();
        let mut files = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Cannot access path: {}", e);
                    continue;
                }
            };

            let matches = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.to_lowercase().ends_with(&suffix));

            if entry.file_type().is_file() && matches {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Scan every controller file under `root`.
    ///
    /// Fails with [`CatalogError::RootNotFound`] before touching the store if
    /// `root` is not a directory.
    pub fn scan(&mut self, root: &Path) -> Result<ScanSummary> {
        let files = self.discover(root)?;
        info!("Found {} controller files under {}", files.len(), root.display());

        let directive_root = self
            .options
            .directive_root
            .clone()
            .unwrap_or_else(|| root.to_path_buf());
        self.run(&files, &directive_root)
    }

    /// Scan an explicit list of controller files. They are processed in path
    /// order, so any permutation of the same list yields the same catalog.
    pub fn scan_files<P: AsRef<Path>>(&mut self, files: &[P]) -> Result<ScanSummary> {
        let directive_root = self
            .options
            .directive_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        self.run(files, &directive_root)
    }

    fn run<P: AsRef<Path>>(&mut self, files: &[P], directive_root: &Path) -> Result<ScanSummary> {
        let resolver =
            DirectiveResolver::new(directive_root).with_case(self.options.directive_case);
        let mut accumulator = EndpointAccumulator::new();
        let mut summary = ScanSummary::default();

        let mut ordered: Vec<&Path> = files.iter().map(|f| f.as_ref()).collect();
        ordered.sort();

        for path in ordered {
            if let Some(ref callback) = self.progress {
                callback(path);
            }

            let scan = self.scan_file(path, &resolver, &mut accumulator)?;
            summary.files_scanned += 1;
            if scan.page_created {
                summary.pages_created += 1;
            }
            summary.endpoints_added += scan.endpoints.iter().filter(|e| e.added).count();
            summary.pages.push(scan);
        }

        if self.options.persist_mode == PersistMode::Batched && !accumulator.is_empty() {
            info!("Writing {} endpoints in one batch", accumulator.len());
            self.store.create_endpoints(&accumulator.into_records())?;
        }

        if summary.directive_root_unresolved() {
            warn!(
                "None of the referenced directive files exist under {}; set the directive root to the web root",
                directive_root.display()
            );
        }

        Ok(summary)
    }

    fn scan_file(
        &mut self,
        path: &Path,
        resolver: &DirectiveResolver,
        accumulator: &mut EndpointAccumulator,
    ) -> Result<PageScan> {
        let bytes = fs::read(path).map_err(|source| CatalogError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);

        let (folder_name, controller_name) = page_identity(path);
        let (page, page_created) = self
            .store
            .find_or_create_page(&folder_name, &controller_name)?;
        if page_created {
            debug!("Created page {}/{}", folder_name, controller_name);
        }

        let directives = resolver.resolve(&content);
        let endpoints = union(extract_endpoints_located(&content), directives.endpoints);
        let redirects = extract_redirects_located(&content);

        let mut found = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let redirect = self.options.redirect_policy.choose(&redirects, endpoint.offset);
            let record = NewEndpoint::new(page.id, endpoint.value, redirect);

            let added = if self.store.endpoint_exists(page.id, &record.url)? {
                false
            } else {
                match self.options.persist_mode {
                    PersistMode::Incremental => {
                        self.store.create_endpoint(&record)?;
                        true
                    }
                    PersistMode::Batched => accumulator.insert(record.clone()),
                }
            };

            found.push(FoundEndpoint {
                url: record.url,
                redirect: record.redirect,
                added,
            });
        }

        debug!(
            "{}/{}: {} endpoints, {} redirects",
            folder_name,
            controller_name,
            found.len(),
            redirects.len()
        );

        Ok(PageScan {
            path: path.to_path_buf(),
            page,
            page_created,
            endpoints: found,
            directives_resolved: directives.resolved,
            skipped_directives: directives.skipped,
        })
    }
}
