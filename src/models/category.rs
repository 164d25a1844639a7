use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::item::Item;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Category {
    /// UUID of the category
    pub id: Uuid,
    /// Display name of the category
    pub name: String,
    /// Slug of the category, unique across the store
    pub slug: String,
    /// Palette token used to color the category's list
    pub color: Option<String>,
    /// Items owned by this category, in insertion order
    #[serde(default)]
    pub items: Vec<Item>,
    /// Created at timestamp of the category
    pub created_at: Timestamp,
}

impl Default for Category {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            slug: String::new(),
            color: None,
            items: vec![],
            created_at: Timestamp::now(),
        }
    }
}

impl Category {
    pub fn find_item(&self, item_id: Uuid) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn find_item_mut(&mut self, item_id: Uuid) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    pub fn remove_item(&mut self, item_id: Uuid) -> Option<Item> {
        let position = self.items.iter().position(|i| i.id == item_id)?;
        Some(self.items.remove(position))
    }

    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|i| !i.is_done).count()
    }
}
