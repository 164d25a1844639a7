use slug::slugify;
use thiserror::Error;

use crate::{
    models::{category::Category, store::Store},
    palette,
    storage::{
        Storage,
        database::{Database, WriteError},
    },
};

#[derive(Debug, Error)]
pub enum CreateCategoryError {
    #[error("Category name cannot be empty")]
    EmptyName,

    #[error("Category with name '{}' already exists", .0)]
    AlreadyExists(String),

    #[error("Unknown color '{}'. Available colors: {}", .0, palette::token_names().join(", "))]
    UnknownColor(String),

    #[error("Storage error: {0}")]
    Write(#[from] WriteError),
}

pub struct CreateCategoryParameters {
    pub name: String,
    pub color: Option<String>,
}

pub fn create_category<S: Storage>(
    db: &Database<S>,
    parameters: CreateCategoryParameters,
) -> Result<Category, CreateCategoryError> {
    let name = parameters.name.trim().to_string();
    if name.is_empty() {
        return Err(CreateCategoryError::EmptyName);
    }

    let color = match parameters.color {
        Some(token) if palette::lookup(&token).is_none() => {
            return Err(CreateCategoryError::UnknownColor(token));
        }
        Some(token) => Some(token.to_lowercase()),
        None => None,
    };

    let category_slug = slugify(&name);
    if db.read(|store| store.get_category_by_slug(&category_slug).is_some()) {
        return Err(CreateCategoryError::AlreadyExists(name));
    }

    let category = Category {
        name,
        slug: category_slug,
        color,
        ..Category::default()
    };

    let created = category.clone();
    db.write(|store| store.add_category(category))?;
    tracing::info!(category = %created.id, slug = %created.slug, "created category");

    Ok(created)
}

#[derive(Debug, Error)]
pub enum ResolveCategoryError {
    #[error("Category '{0}' not found")]
    NotFound(String),

    #[error("Category name is ambiguous. Multiple categories found: {}", .0.join(", "))]
    Ambiguous(Vec<String>),
}

/// Finds a category by slug or name. An exact match wins; otherwise the
/// query must be a case-insensitive substring of exactly one name.
pub fn resolve_category<'a>(
    store: &'a Store,
    query: &str,
) -> Result<&'a Category, ResolveCategoryError> {
    let needle = query.trim().to_lowercase();

    if let Some(category) = store
        .categories
        .iter()
        .find(|c| c.slug == slugify(&needle) || c.name.to_lowercase() == needle)
    {
        return Ok(category);
    }

    let matching: Vec<_> = store
        .categories
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .collect();

    match matching.len() {
        0 => Err(ResolveCategoryError::NotFound(query.to_string())),
        1 => Ok(matching[0]),
        _ => Err(ResolveCategoryError::Ambiguous(
            matching.iter().map(|c| c.name.clone()).collect(),
        )),
    }
}
