use std::rc::Rc;

use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::item::Item,
    storage::{
        Storage,
        database::{Database, WriteError},
    },
};

pub mod view;

use view::{ViewEntry, ViewMode, project};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Item title is empty")]
    Validation,

    #[error("Write failed: {0}")]
    Write(#[from] WriteError),

    #[error("Position {index} is outside the current view of {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A title/checkmark pair handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub title: String,
    pub is_done: bool,
}

/// Everything a renderer needs to draw the current list.
#[derive(Clone, Debug)]
pub struct Frame {
    /// `None` when no category is selected
    pub category_name: Option<String>,
    pub color: Option<String>,
    pub mode: ViewMode,
    pub rows: Vec<Row>,
}

pub trait Renderer {
    fn render(&mut self, frame: &Frame);
}

/// The list screen for one category: keeps a sorted or filtered view of its
/// items in step with the database and pushes a fresh [`Frame`] to the
/// renderer after every change.
///
/// Failures never escape. Mutations report whether they committed, and
/// anything that went wrong is logged.
pub struct ItemListSession<S: Storage> {
    db: Rc<Database<S>>,
    renderer: Box<dyn Renderer>,
    selected_category: Option<Uuid>,
    mode: ViewMode,
    current_view: Vec<ViewEntry>,
    seen_revision: u64,
}

impl<S: Storage> ItemListSession<S> {
    pub fn new(db: Rc<Database<S>>, renderer: Box<dyn Renderer>) -> Self {
        let seen_revision = db.revision();
        Self {
            db,
            renderer,
            selected_category: None,
            mode: ViewMode::Unfiltered,
            current_view: vec![],
            seen_revision,
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn select_category(&mut self, category_id: Option<Uuid>) {
        self.selected_category = category_id;
        self.load_items();
    }

    /// Returns the view, recomputing it first if the database changed since
    /// it was last built.
    pub fn current_view(&mut self) -> &[ViewEntry] {
        self.sync();
        &self.current_view
    }

    /// Rebuilds and redraws the view if another handle committed a write.
    pub fn sync(&mut self) {
        if self.db.revision() != self.seen_revision {
            tracing::debug!(
                seen = self.seen_revision,
                current = self.db.revision(),
                "view is stale, refreshing"
            );
            self.refresh();
        }
    }

    pub fn load_items(&mut self) {
        self.mode = ViewMode::Unfiltered;
        self.refresh();
    }

    /// Explicit search submit. An empty query goes back to the full list.
    pub fn search(&mut self, query: &str) {
        if query.is_empty() {
            self.load_items();
            return;
        }
        self.mode = ViewMode::Filtered {
            query: query.to_string(),
        };
        self.refresh();
    }

    /// Search text edited. Only clearing it has an effect; filtering waits
    /// for [`search`](Self::search).
    pub fn search_text_changed(&mut self, text: &str) {
        if text.is_empty() {
            self.load_items();
        }
    }

    pub fn add_item(&mut self, raw_title: &str) -> bool {
        let outcome = self.try_add_item(raw_title);
        self.finish("add", outcome)
    }

    pub fn toggle_done(&mut self, index: usize) -> bool {
        let Some(item_id) = self.entry_at(index) else {
            self.sync();
            return false;
        };
        let outcome = self
            .db
            .write(|store| match store.find_item_mut(item_id) {
                Some(item) => {
                    item.is_done = !item.is_done;
                    true
                }
                None => false,
            })
            .map_err(SessionError::from);
        self.finish("toggle", outcome)
    }

    pub fn delete_item(&mut self, index: usize) -> bool {
        let Some(item_id) = self.entry_at(index) else {
            self.sync();
            return false;
        };
        let outcome = self
            .db
            .write(|store| store.remove_item(item_id).is_some())
            .map_err(SessionError::from);
        self.finish("delete", outcome)
    }

    fn try_add_item(&self, raw_title: &str) -> Result<bool, SessionError> {
        let Some(category_id) = self.selected_category else {
            tracing::debug!("no category selected, ignoring new item");
            return Ok(false);
        };
        let item = Item::new(raw_title).ok_or(SessionError::Validation)?;

        let added = self.db.write(|store| match store.get_category_mut(category_id) {
            Some(category) => {
                category.items.push(item);
                true
            }
            None => false,
        })?;
        Ok(added)
    }

    /// Maps a position in the view the user last saw to the item shown
    /// there. Out-of-range positions and items removed through another
    /// handle are stale taps and do nothing.
    fn entry_at(&self, index: usize) -> Option<Uuid> {
        let Some(entry) = self.current_view.get(index) else {
            let err = SessionError::IndexOutOfRange {
                index,
                len: self.current_view.len(),
            };
            tracing::debug!(error = %err, "ignoring action");
            return None;
        };
        if self.db.read(|store| store.find_item(entry.id).is_none()) {
            tracing::debug!(item = %entry.id, "item no longer exists, ignoring action");
            return None;
        }
        Some(entry.id)
    }

    fn finish(&mut self, action: &str, outcome: Result<bool, SessionError>) -> bool {
        let applied = match outcome {
            Ok(applied) => {
                if !applied {
                    tracing::debug!(action, "target not found");
                }
                applied
            }
            Err(SessionError::Write(e)) => {
                tracing::error!(action, error = %e, "failed to save change");
                false
            }
            Err(e) => {
                tracing::debug!(action, error = %e, "rejected");
                false
            }
        };
        self.refresh();
        applied
    }

    fn refresh(&mut self) {
        let (category_name, color, entries) = match self.selected_category {
            Some(id) => self.db.read(|store| match store.get_category(id) {
                Some(category) => (
                    Some(category.name.clone()),
                    category.color.clone(),
                    project(category, &self.mode),
                ),
                None => {
                    tracing::warn!(category = %id, "selected category no longer exists");
                    (None, None, vec![])
                }
            }),
            None => (None, None, vec![]),
        };
        self.current_view = entries;
        self.seen_revision = self.db.revision();

        let frame = Frame {
            category_name,
            color,
            mode: self.mode.clone(),
            rows: self
                .current_view
                .iter()
                .map(|entry| Row {
                    title: entry.title.clone(),
                    is_done: entry.is_done,
                })
                .collect(),
        };
        self.renderer.render(&frame);
    }
}
