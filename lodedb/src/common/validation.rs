use crate::common::FIELD_SEPARATOR;
use crate::errors::{ErrorKind, LodeError, LodeResult};

// Names end up as directory and file names on disk.
fn has_path_chars(name: &str) -> bool {
    name.contains(['/', '\\', '\0'])
}

/// Checks that `name` can be used as a collection name.
///
/// A collection name is non-empty, does not start with `.` and contains no
/// path separator.
pub fn validate_collection_name(name: &str) -> LodeResult<()> {
    if name.trim().is_empty() {
        log::error!("Collection name cannot be empty");
        return Err(LodeError::new(
            "Collection name cannot be empty",
            ErrorKind::InvalidCollectionName,
        ));
    }

    if name.starts_with('.') || has_path_chars(name) {
        log::error!("Invalid collection name '{}'", name);
        return Err(LodeError::new(
            &format!("Invalid collection name '{}'", name),
            ErrorKind::InvalidCollectionName,
        ));
    }
    Ok(())
}

/// Checks that `field` is a usable field path.
///
/// Every segment of the path must be non-empty and the path must contain no
/// path separator.
pub fn validate_field_name(field: &str) -> LodeResult<()> {
    if field.is_empty() {
        log::error!("Field name cannot be empty");
        return Err(LodeError::new(
            "Field name cannot be empty",
            ErrorKind::InvalidFieldName,
        ));
    }

    if has_path_chars(field) || field.split(FIELD_SEPARATOR).any(str::is_empty) {
        log::error!("Invalid field name '{}'", field);
        return Err(LodeError::new(
            &format!("Invalid field name '{}'", field),
            ErrorKind::InvalidFieldName,
        ));
    }
    Ok(())
}

/// Checks that `id` can be used as a document id.
pub fn validate_id(id: &str) -> LodeResult<()> {
    if id.is_empty() {
        log::error!("Document id cannot be empty");
        return Err(LodeError::new(
            "Document id cannot be empty",
            ErrorKind::InvalidId,
        ));
    }

    if id == "." || id == ".." || has_path_chars(id) {
        log::error!("Invalid document id '{}'", id);
        return Err(LodeError::new(
            &format!("Invalid document id '{}'", id),
            ErrorKind::InvalidId,
        ));
    }
    Ok(())
}
