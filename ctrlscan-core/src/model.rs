use serde::{Deserialize, Serialize};

/// A controller page, identified by (folder name, controller name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub folder_name: String,
    pub controller_name: String,
}

/// A persisted endpoint belonging to a page. An empty redirect means none was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: i64,
    pub page_id: i64,
    pub url: String,
    pub redirect: String,
}

/// An endpoint record that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewEndpoint {
    pub page_id: i64,
    pub url: String,
    pub redirect: String,
}

impl NewEndpoint {
    pub fn new(page_id: i64, url: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self {
            page_id,
            url: url.into(),
            redirect: redirect.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "running" => Some(SessionStatus::Running),
            "completed" => Some(SessionStatus::Completed),
            "failed" => Some(SessionStatus::Failed),
            _ => None,
        }
    }
}

/// One recorded run of the scanner against a root directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSession {
    pub id: String,
    pub root: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub status: SessionStatus,
    pub files_scanned: i64,
    pub endpoints_added: i64,
}
