use serde_json::value::RawValue;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("property '{property}' is not defined (path '{path}')")]
    PropertyNotFound { property: String, path: String },
}

/// Splits a dotted query argument (`data.user.id`) into property names
pub fn split_path(dotted: &str) -> Vec<&str> {
    dotted.split('.').collect()
}

/// Descends a raw JSON document along `path`, one object level at a time.
///
/// Each step decodes only the current level into a map of still-encoded
/// values, so whatever sits at the end of the path (array, number, nested
/// object) is returned exactly as it appears in `document`. An empty path
/// returns the document unchanged.
pub fn navigate<'a, S: AsRef<str>>(
    document: &'a [u8],
    path: &[S],
) -> Result<&'a [u8], NavigationError> {
    let mut current = document;

    for property in path {
        let property = property.as_ref();
        let not_found = || NavigationError::PropertyNotFound {
            property: property.to_string(),
            path: join_path(path),
        };

        let level: HashMap<String, &'a RawValue> =
            serde_json::from_slice(current).map_err(|_| not_found())?;
        let value: &'a RawValue = *level.get(property).ok_or_else(not_found)?;

        debug!(property, "descended into property");
        current = value.get().as_bytes();
    }

    Ok(current)
}

fn join_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(".")
}
