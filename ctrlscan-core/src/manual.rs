// Hand-entered catalog records

use crate::error::Result;
use crate::model::{NewEndpoint, Page};
use crate::store::CatalogStore;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualEntry {
    pub url: String,
    pub redirect: String,
}

impl ManualEntry {
    pub fn new(url: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            redirect: redirect.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManualOutcome {
    pub page: Page,
    pub page_created: bool,
    pub added: usize,
    pub skipped: usize,
}

/// Attach hand-entered endpoints to the page (folder, controller), creating it if needed.
/// Blank urls and urls the page already has are skipped.
pub fn add_manual_entry<S: CatalogStore + ?Sized>(
    store: &mut S,
    folder_name: &str,
    controller_name: &str,
    entries: &[ManualEntry],
) -> Result<ManualOutcome> {
    let (page, page_created) =
        store.find_or_create_page(folder_name.trim(), controller_name.trim())?;

    let mut added = 0;
    let mut skipped = 0;
    for entry in entries {
        let url = entry.url.trim();
        if url.is_empty() || store.endpoint_exists(page.id, url)? {
            skipped += 1;
            continue;
        }
        store.create_endpoint(&NewEndpoint::new(page.id, url, entry.redirect.trim()))?;
        added += 1;
    }

    info!(
        "Manual entry for {}/{}: {} added, {} skipped",
        page.folder_name, page.controller_name, added, skipped
    );

    Ok(ManualOutcome {
        page,
        page_created,
        added,
        skipped,
    })
}
