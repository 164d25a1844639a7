use serde_json::Value;

use crate::storage::StorageError;

type MigrationFn = fn(Value) -> Result<Value, StorageError>;

/// Step `n` upgrades a document from version `n + 1` to `n + 2`.
fn migration_steps() -> Vec<MigrationFn> {
    vec![]
}

/// Reads the schema version of a parsed store document. Documents written
/// before the field existed count as version 1; versions start at 1.
pub fn detect_version(document: &Value) -> Result<u32, StorageError> {
    match document.get("version") {
        None => Ok(1),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|&n| n > 0)
            .ok_or(StorageError::InvalidVersion),
    }
}

pub fn apply_migrations(
    mut document: Value,
    from_version: u32,
    to_version: u32,
) -> Result<Value, StorageError> {
    if from_version > to_version {
        return Err(StorageError::FutureVersion(from_version));
    }

    let steps = migration_steps();
    for version in from_version..to_version {
        let step = version
            .checked_sub(1)
            .and_then(|index| steps.get(index as usize))
            .ok_or(StorageError::UnsupportedVersion(version))?;
        document = step(document)?;
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_version_with_version_field() {
        let document = serde_json::json!({"version": 2, "categories": []});
        assert_eq!(detect_version(&document).unwrap(), 2);
    }

    #[test]
    fn test_detect_version_without_version_field() {
        let document = serde_json::json!({"categories": []});
        assert_eq!(detect_version(&document).unwrap(), 1);
    }

    #[test]
    fn test_detect_version_rejects_strings() {
        let document = serde_json::json!({"version": "one"});
        assert!(matches!(
            detect_version(&document),
            Err(StorageError::InvalidVersion)
        ));
    }

    #[test]
    fn test_detect_version_rejects_zero() {
        let document = serde_json::json!({"version": 0, "categories": []});
        assert!(matches!(
            detect_version(&document),
            Err(StorageError::InvalidVersion)
        ));
    }

    #[test]
    fn test_apply_migrations_from_zero() {
        let document = serde_json::json!({"version": 0});
        let result = apply_migrations(document, 0, 1);
        assert!(matches!(result, Err(StorageError::UnsupportedVersion(0))));
    }

    #[test]
    fn test_apply_migrations_same_version() {
        let document = serde_json::json!({"version": 1});
        let result = apply_migrations(document.clone(), 1, 1).unwrap();
        assert_eq!(result, document);
    }

    #[test]
    fn test_apply_migrations_missing_step() {
        let document = serde_json::json!({"version": 1});
        let result = apply_migrations(document, 1, 2);
        assert!(matches!(result, Err(StorageError::UnsupportedVersion(1))));
    }

    #[test]
    fn test_apply_migrations_future_version() {
        let document = serde_json::json!({"version": 5});
        let result = apply_migrations(document, 5, 1);
        assert!(matches!(result, Err(StorageError::FutureVersion(5))));
    }
}
