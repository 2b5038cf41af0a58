use serde::{Deserialize, Serialize};

use super::ordering::{self, Ordered};
use crate::types::{AppError, AppResult};

pub const PORTFOLIO_KEY: &str = "portfolio";

/// A PDF work sample. `pdf_url` is only a reference; nothing checks that the
/// file behind it still exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub pdf_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub order: i32,
}

fn default_true() -> bool {
    true
}

impl Ordered for Project {
    fn id(&self) -> u32 {
        self.id
    }
    fn set_id(&mut self, id: u32) {
        self.id = id;
    }
    fn order(&self) -> i32 {
        self.order
    }
    fn set_order(&mut self, order: i32) {
        self.order = order;
    }
    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub pdf_url: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioCollection {
    pub title: String,
    #[serde(default)]
    pub cta_text: String,
    #[serde(default)]
    pub cta_link: String,
    pub projects: Vec<Project>,
}

impl Default for PortfolioCollection {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            cta_text: "Discuss your project".to_string(),
            cta_link: "#contact".to_string(),
            projects: Vec::new(),
        }
    }
}

impl PortfolioCollection {
    pub fn from_payload(payload: serde_json::Value) -> AppResult<Self> {
        match payload.get("projects") {
            Some(projects) if projects.is_array() => {}
            _ => {
                return Err(AppError::InvalidRequest(
                    "projects must be an array".to_string(),
                ))
            }
        }
        let collection: PortfolioCollection = serde_json::from_value(payload)
            .map_err(|e| AppError::InvalidRequest(format!("invalid portfolio data: {}", e)))?;
        ordering::ensure_unique_ids(&collection.projects)?;
        Ok(collection)
    }

    pub fn add(&mut self, draft: NewProject) -> AppResult<Project> {
        if draft.title.trim().is_empty() {
            return Err(AppError::InvalidRequest("title is required".to_string()));
        }
        if draft.pdf_url.trim().is_empty() {
            return Err(AppError::InvalidRequest("pdfUrl is required".to_string()));
        }
        let project = Project {
            id: 0,
            title: draft.title,
            description: draft.description,
            pdf_url: draft.pdf_url,
            category: draft.category.filter(|c| !c.trim().is_empty()),
            active: draft.active,
            order: 0,
        };
        ordering::insert(&mut self.projects, project)
    }

    pub fn move_project(&mut self, id: u32, direction: ordering::Direction) -> AppResult<bool> {
        ordering::move_entry(&mut self.projects, id, direction)
    }

    pub fn remove(&mut self, id: u32) -> AppResult<()> {
        ordering::remove(&mut self.projects, id)
    }

    pub fn published(&self) -> Self {
        Self {
            title: self.title.clone(),
            cta_text: self.cta_text.clone(),
            cta_link: self.cta_link.clone(),
            projects: ordering::published(&self.projects),
        }
    }
}
