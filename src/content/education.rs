use serde::{Deserialize, Serialize};

use super::ordering::{self, Ordered};
use crate::types::{AppError, AppResult};

pub const EDUCATION_KEY: &str = "education";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    Education,
    Certificate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub id: u32,
    pub year: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(rename = "type", default)]
    pub kind: EntryKind,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub order: i32,
}

fn default_true() -> bool {
    true
}

impl Ordered for EducationEntry {
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

/// Fields an admin fills in when adding a timeline entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEducationEntry {
    pub year: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(rename = "type", default)]
    pub kind: EntryKind,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationCollection {
    pub title: String,
    pub items: Vec<EducationEntry>,
}

impl Default for EducationCollection {
    fn default() -> Self {
        let entry = |id: u32, year: &str, title: &str, subtitle: &str, kind: EntryKind| {
            EducationEntry {
                id,
                year: year.to_string(),
                title: title.to_string(),
                subtitle: subtitle.to_string(),
                kind,
                active: true,
                order: id as i32,
            }
        };
        Self {
            title: "Education & certificates".to_string(),
            items: vec![
                entry(1, "2016", "Interior Design", "Academy of Arts and Design", EntryKind::Education),
                entry(2, "2019", "Residential Interior Design", "Professional development course", EntryKind::Certificate),
                entry(3, "2021", "3D Visualization", "Autodesk 3ds Max & Corona Renderer", EntryKind::Certificate),
            ],
        }
    }
}

impl EducationCollection {
    pub fn from_payload(payload: serde_json::Value) -> AppResult<Self> {
        match payload.get("items") {
            Some(items) if items.is_array() => {}
            _ => return Err(AppError::InvalidRequest("items must be an array".to_string())),
        }
        let collection: EducationCollection = serde_json::from_value(payload)
            .map_err(|e| AppError::InvalidRequest(format!("invalid education data: {}", e)))?;
        ordering::ensure_unique_ids(&collection.items)?;
        Ok(collection)
    }

    pub fn add(&mut self, draft: NewEducationEntry) -> AppResult<EducationEntry> {
        let entry = EducationEntry {
            id: 0,
            year: draft.year,
            title: draft.title,
            subtitle: draft.subtitle,
            kind: draft.kind,
            active: draft.active,
            order: 0,
        };
        ordering::insert(&mut self.items, entry)
    }

    pub fn move_entry(&mut self, id: u32, direction: ordering::Direction) -> AppResult<bool> {
        ordering::move_entry(&mut self.items, id, direction)
    }

    pub fn remove(&mut self, id: u32) -> AppResult<()> {
        ordering::remove(&mut self.items, id)
    }

    /// The public timeline: active entries in display order.
    pub fn published(&self) -> Self {
        Self {
            title: self.title.clone(),
            items: ordering::published(&self.items),
        }
    }
}
