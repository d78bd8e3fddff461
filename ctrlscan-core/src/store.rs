// Persistence seam for the catalog

use crate::error::{CatalogError, Result};
use crate::model::{Endpoint, NewEndpoint, Page};

/// Operations the catalog builder needs from a persistent store.
///
/// Implementations must keep (folder, controller) unique per page and
/// (page, url) unique per endpoint.
pub trait CatalogStore {
    fn find_page(&self, folder_name: &str, controller_name: &str) -> Result<Option<Page>>;

    fn create_page(&mut self, folder_name: &str, controller_name: &str) -> Result<Page>;

    fn page_endpoints(&self, page_id: i64) -> Result<Vec<Endpoint>>;

    fn endpoint_exists(&self, page_id: i64, url: &str) -> Result<bool>;

    fn create_endpoint(&mut self, endpoint: &NewEndpoint) -> Result<Endpoint>;

    /// Persist a batch of endpoints as one unit
    fn create_endpoints(&mut self, batch: &[NewEndpoint]) -> Result<()>;

    fn pages(&self) -> Result<Vec<Page>>;

    /// Returns the page and whether it was created by this call
    fn find_or_create_page(&mut self, folder_name: &str, controller_name: &str) -> Result<(Page, bool)> {
        match self.find_page(folder_name, controller_name)? {
            Some(page) => Ok((page, false)),
            None => Ok((self.create_page(folder_name, controller_name)?, true)),
        }
    }
}

/// In-memory store, used for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: Vec<Page>,
    endpoints: Vec<Endpoint>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    fn insert(&mut self, endpoint: &NewEndpoint) -> Result<Endpoint> {
        if !self.pages.iter().any(|p| p.id == endpoint.page_id) {
            return Err(CatalogError::Constraint(format!(
                "page {} does not exist",
                endpoint.page_id
            )));
        }
        if self.endpoint_exists(endpoint.page_id, &endpoint.url)? {
            return Err(CatalogError::Constraint(format!(
                "endpoint {} already exists for page {}",
                endpoint.url, endpoint.page_id
            )));
        }

        let created = Endpoint {
            id: self.endpoints.len() as i64 + 1,
            page_id: endpoint.page_id,
            url: endpoint.url.clone(),
            redirect: endpoint.redirect.clone(),
        };
        self.endpoints.push(created.clone());
        Ok(created)
    }
}

impl CatalogStore for MemoryStore {
    fn find_page(&self, folder_name: &str, controller_name: &str) -> Result<Option<Page>> {
        Ok(self
            .pages
            .iter()
            .find(|p| p.folder_name == folder_name && p.controller_name == controller_name)
            .cloned())
    }

    fn create_page(&mut self, folder_name: &str, controller_name: &str) -> Result<Page> {
        if self.find_page(folder_name, controller_name)?.is_some() {
            return Err(CatalogError::Constraint(format!(
                "page {}/{} already exists",
                folder_name, controller_name
            )));
        }

        let page = Page {
            id: self.pages.len() as i64 + 1,
            folder_name: folder_name.to_string(),
            controller_name: controller_name.to_string(),
        };
        self.pages.push(page.clone());
        Ok(page)
    }

    fn page_endpoints(&self, page_id: i64) -> Result<Vec<Endpoint>> {
        Ok(self
            .endpoints
            .iter()
            .filter(|e| e.page_id == page_id)
            .cloned()
            .collect())
    }

    fn endpoint_exists(&self, page_id: i64, url: &str) -> Result<bool> {
        Ok(self
            .endpoints
            .iter()
            .any(|e| e.page_id == page_id && e.url == url))
    }

    fn create_endpoint(&mut self, endpoint: &NewEndpoint) -> Result<Endpoint> {
        self.insert(endpoint)
    }

    fn create_endpoints(&mut self, batch: &[NewEndpoint]) -> Result<()> {
        // All-or-nothing, like the database transaction
        let checkpoint = self.endpoints.len();
        for endpoint in batch {
            if let Err(e) = self.insert(endpoint) {
                self.endpoints.truncate(checkpoint);
                return Err(e);
            }
        }
        Ok(())
    }

    fn pages(&self) -> Result<Vec<Page>> {
        Ok(self.pages.clone())
    }
}
