use jiff::Timestamp;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::models::{category::Category, item::Item};

/// Which sort/filter policy the session is showing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Every item, ordered by title.
    #[default]
    Unfiltered,
    /// Items whose title contains `query`, ordered by creation time.
    Filtered { query: String },
}

/// One row of the materialized view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewEntry {
    pub id: Uuid,
    pub title: String,
    pub is_done: bool,
    pub created_at: Timestamp,
}

impl From<&Item> for ViewEntry {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            is_done: item.is_done,
            created_at: item.created_at,
        }
    }
}

/// Case and diacritic folding used for search: "Café" and "CAFE" both
/// become "cafe". Only accents are dropped; other characters stay as they
/// are.
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

pub fn matches_query(title: &str, folded_query: &str) -> bool {
    fold(title).contains(folded_query)
}

/// Projects a category's items according to `mode`.
///
/// Unfiltered views sort by title with plain ordinal comparison, so
/// uppercase sorts before lowercase. Filtered views sort by `created_at`;
/// the sort is stable, so items created at the same instant keep their
/// stored order.
pub fn project(category: &Category, mode: &ViewMode) -> Vec<ViewEntry> {
    let mut entries: Vec<ViewEntry> = match mode {
        ViewMode::Unfiltered => category.items.iter().map(ViewEntry::from).collect(),
        ViewMode::Filtered { query } => {
            let folded_query = fold(query);
            category
                .items
                .iter()
                .filter(|item| matches_query(&item.title, &folded_query))
                .map(ViewEntry::from)
                .collect()
        }
    };

    match mode {
        ViewMode::Unfiltered => entries.sort_by(|a, b| a.title.cmp(&b.title)),
        ViewMode::Filtered { .. } => entries.sort_by_key(|entry| entry.created_at),
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, created_second: i64) -> Item {
        Item {
            created_at: Timestamp::from_second(created_second).unwrap(),
            ..Item::new(title).unwrap()
        }
    }

    fn category(items: Vec<Item>) -> Category {
        Category {
            name: String::from("Work"),
            slug: String::from("work"),
            items,
            ..Category::default()
        }
    }

    fn titles(entries: &[ViewEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_fold_strips_case_and_diacritics() {
        assert_eq!(fold("Café Crème"), "cafe creme");
        assert_eq!(fold("MILK"), "milk");
    }

    #[test]
    fn test_fold_keeps_symbols_and_scripts() {
        assert_eq!(fold("Walk the 🐶"), "walk the 🐶");
        assert_eq!(fold("Pay 5€"), "pay 5€");
        assert_eq!(fold("中文"), "中文");
        assert!(!matches_query("Walk the 🐶", &fold("dog")));
        assert!(!matches_query("Pay 5€", &fold("eur")));
        assert!(!matches_query("中文", &fold("zhong")));
        assert!(matches_query("Naïve résumé", &fold("naive resume")));
    }

    #[test]
    fn test_unfiltered_is_ordinal_title_order() {
        let category = category(vec![item("banana", 1), item("Cherry", 2), item("apple", 3)]);
        let entries = project(&category, &ViewMode::Unfiltered);
        assert_eq!(titles(&entries), vec!["Cherry", "apple", "banana"]);
    }

    #[test]
    fn test_filtered_is_substring_in_creation_order() {
        let category = category(vec![
            item("Email Bob", 10),
            item("Call Amy", 20),
            item("Walk dog", 5),
        ]);
        let mode = ViewMode::Filtered {
            query: String::from("a"),
        };
        let entries = project(&category, &mode);
        assert_eq!(titles(&entries), vec!["Walk dog", "Email Bob", "Call Amy"]);
    }

    #[test]
    fn test_filtered_is_not_prefix_or_fuzzy() {
        let category = category(vec![item("Buy milk", 1), item("Walk dog", 2)]);
        let mode = ViewMode::Filtered {
            query: String::from("mlk"),
        };
        assert!(project(&category, &mode).is_empty());

        let mode = ViewMode::Filtered {
            query: String::from("ILK"),
        };
        assert_eq!(titles(&project(&category, &mode)), vec!["Buy milk"]);
    }

    #[test]
    fn test_filtered_ignores_diacritics_on_both_sides() {
        let category = category(vec![item("Café au lait", 1), item("Tea", 2)]);
        let plain = ViewMode::Filtered {
            query: String::from("cafe"),
        };
        let accented = ViewMode::Filtered {
            query: String::from("CAFÉ"),
        };
        assert_eq!(titles(&project(&category, &plain)), vec!["Café au lait"]);
        assert_eq!(titles(&project(&category, &accented)), vec!["Café au lait"]);
    }
}
