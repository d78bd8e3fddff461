// Catalog report generation

use crate::error::Result;
use crate::store::CatalogStore;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointEntry {
    pub url: String,
    pub redirect: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEntry {
    pub folder_name: String,
    pub controller_name: String,
    pub endpoints: Vec<EndpointEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogReport {
    pub generated_at: i64,
    pub total_pages: usize,
    pub total_endpoints: usize,
    pub pages: Vec<PageEntry>,
}

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

impl CatalogReport {
    /// Snapshot every page and its endpoints, sorted by folder then controller
    pub fn from_store<S: CatalogStore + ?Sized>(store: &S) -> Result<Self> {
        let mut pages = Vec::new();
        for page in store.pages()? {
            let endpoints = store
                .page_endpoints(page.id)?
                .into_iter()
                .map(|e| EndpointEntry {
                    url: e.url,
                    redirect: e.redirect,
                })
                .collect();
            pages.push(PageEntry {
                folder_name: page.folder_name,
                controller_name: page.controller_name,
                endpoints,
            });
        }
        pages.sort_by(|a, b| {
            (&a.folder_name, &a.controller_name).cmp(&(&b.folder_name, &b.controller_name))
        });

        Ok(Self {
            generated_at: chrono::Utc::now().timestamp(),
            total_pages: pages.len(),
            total_endpoints: pages.iter().map(|p| p.endpoints.len()).sum(),
            pages,
        })
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        Ok(match format {
            ReportFormat::Text => self.render_text(),
            ReportFormat::Json => self.render_json()?,
            ReportFormat::Csv => self.render_csv(),
            ReportFormat::Markdown => self.render_markdown(),
        })
    }

    pub fn write_to(&self, path: &Path, format: ReportFormat) -> Result<()> {
        let content = self.render(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    fn render_text(&self) -> String {
        let mut report = String::new();

        report.push_str(RULE);
        report.push_str("                         CTRLSCAN ENDPOINT CATALOG\n");
        report.push_str(RULE);
        report.push('\n');
        report.push_str(&format!("Generated:    {}\n", format_timestamp(self.generated_at)));
        report.push_str(&format!("Pages:        {}\n", self.total_pages));
        report.push_str(&format!("Endpoints:    {}\n\n", self.total_endpoints));

        for page in &self.pages {
            report.push_str(&format!("Folder: {}\n", page.folder_name));
            report.push_str(&format!("Controller: {}\n", page.controller_name));
            report.push_str("APIs:\n");
            if page.endpoints.is_empty() {
                report.push_str("  (none)\n");
            }
            for endpoint in &page.endpoints {
                report.push_str(&format!(
                    "  - {} (Redirect: {})\n",
                    endpoint.url, endpoint.redirect
                ));
            }
            report.push('\n');
        }

        report.push_str(RULE);
        report
    }

    fn render_json(&self) -> Result<String> {
        let json_report = serde_json::json!({
            "catalog": {
                "metadata": {
                    "generator": "ctrlscan",
                    "version": env!("CARGO_PKG_VERSION"),
                    "generated_at": format_iso8601_timestamp(self.generated_at),
                },
                "summary": {
                    "total_pages": self.total_pages,
                    "total_endpoints": self.total_endpoints,
                },
                "pages": self.pages,
            }
        });

        Ok(serde_json::to_string_pretty(&json_report)?)
    }

    fn render_csv(&self) -> String {
        let mut csv = String::from("folder,controller,url,redirect\n");
        for page in &self.pages {
            for endpoint in &page.endpoints {
                csv.push_str(&format!(
                    "{},{},{},{}\n",
                    csv_field(&page.folder_name),
                    csv_field(&page.controller_name),
                    csv_field(&endpoint.url),
                    csv_field(&endpoint.redirect)
                ));
            }
        }
        csv
    }

    fn render_markdown(&self) -> String {
        let mut md = String::from("# Endpoint Catalog\n\n");
        md.push_str(&format!(
            "Generated {} | {} pages | {} endpoints\n\n",
            format_timestamp(self.generated_at),
            self.total_pages,
            self.total_endpoints
        ));

        for page in &self.pages {
            md.push_str(&format!("## {}/{}\n\n", page.folder_name, page.controller_name));
            if page.endpoints.is_empty() {
                md.push_str("_No endpoints_\n\n");
                continue;
            }
            md.push_str("| Endpoint | Redirect |\n|---|---|\n");
            for endpoint in &page.endpoints {
                md.push_str(&format!(
                    "| `{}` | {} |\n",
                    endpoint.url.replace('|', "\\|"),
                    endpoint.redirect.replace('|', "\\|")
                ));
            }
            md.push('\n');
        }
        md
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn format_timestamp(timestamp: i64) -> String {
    use chrono::{DateTime, Utc};
    let datetime = DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now);
    datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn format_iso8601_timestamp(timestamp: i64) -> String {
    use chrono::{DateTime, Utc};
    let datetime = DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now);
    datetime.to_rfc3339()
}
