use serde::{Deserialize, Serialize};

use crate::utils::Patch;

/// Persistent book record, one row of the `book` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    /// Storage-assigned identifier; `None` until first persisted
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
}

impl Book {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: i64) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            description: Some(description.into()),
            price: Some(price),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Book as exchanged over the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookDto {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
}

/// Merge-patch payload for a book.
///
/// Only fields carrying a value overwrite the stored book; missing keys and
/// explicit `null`s both keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub description: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub price: Patch<i64>,
}
