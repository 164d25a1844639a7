use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{category::Category, item::Item};

/// Current schema version
pub const CURRENT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Store {
    pub version: u32,
    pub categories: Vec<Category>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            categories: vec![],
        }
    }
}

impl Store {
    pub fn add_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    pub fn get_category(&self, category_id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    pub fn get_category_mut(&mut self, category_id: Uuid) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == category_id)
    }

    pub fn get_category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// Finds an item in whichever category holds it.
    pub fn find_item(&self, item_id: Uuid) -> Option<&Item> {
        self.categories.iter().find_map(|c| c.find_item(item_id))
    }

    pub fn find_item_mut(&mut self, item_id: Uuid) -> Option<&mut Item> {
        self.categories
            .iter_mut()
            .find_map(|c| c.find_item_mut(item_id))
    }

    pub fn remove_item(&mut self, item_id: Uuid) -> Option<Item> {
        self.categories
            .iter_mut()
            .find_map(|c| c.remove_item(item_id))
    }
}
