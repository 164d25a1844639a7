use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Item {
    /// UUID to identify the item
    pub id: Uuid,
    /// Title of the item, never empty after trimming
    pub title: String,
    /// Whether the item has been checked off
    #[serde(default)]
    pub is_done: bool,
    /// When the item was created
    pub created_at: Timestamp,
}

impl Item {
    /// Builds a fresh, not-done item. Returns `None` when the title is blank.
    pub fn new(raw_title: &str) -> Option<Item> {
        let title = raw_title.trim();
        if title.is_empty() {
            return None;
        }

        Some(Item {
            id: Uuid::new_v4(),
            title: title.to_string(),
            is_done: false,
            created_at: Timestamp::now(),
        })
    }
}
