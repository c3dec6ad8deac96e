use crate::error::ValidationError;
use crate::model::{Coaster, DataFile, Manufacturer, Park};

/// Find one record by exact id, falling back to a case-insensitive name match.
fn resolve<'a, T>(
    kind: &'static str,
    key: &str,
    items: &'a [T],
    id: impl Fn(&T) -> &str,
    name: impl Fn(&T) -> &str,
    unknown: impl FnOnce(String) -> ValidationError,
) -> Result<&'a T, ValidationError> {
    let key = key.trim();
    if let Some(item) = items.iter().find(|item| id(item) == key) {
        return Ok(item);
    }

    let wanted = key.to_lowercase();
    let matches: Vec<&T> = items
        .iter()
        .filter(|item| name(item).to_lowercase() == wanted)
        .collect();
    match matches.as_slice() {
        [] => Err(unknown(key.to_string())),
        [one] => Ok(*one),
        many => Err(ValidationError::Ambiguous {
            kind,
            key: key.to_string(),
            count: many.len(),
        }),
    }
}

pub fn resolve_park<'a>(doc: &'a DataFile, key: &str) -> Result<&'a Park, ValidationError> {
    resolve(
        "park",
        key,
        &doc.parks,
        |p| p.id.as_str(),
        |p| p.name.as_str(),
        ValidationError::UnknownPark,
    )
}

pub fn resolve_manufacturer<'a>(
    doc: &'a DataFile,
    key: &str,
) -> Result<&'a Manufacturer, ValidationError> {
    resolve(
        "manufacturer",
        key,
        &doc.manufacturers,
        |m| m.id.as_str(),
        |m| m.name.as_str(),
        ValidationError::UnknownManufacturer,
    )
}

/// Coaster names repeat across parks, so a bare name can be ambiguous.
pub fn resolve_coaster<'a>(doc: &'a DataFile, key: &str) -> Result<&'a Coaster, ValidationError> {
    resolve(
        "coaster",
        key,
        &doc.coasters,
        |c| c.id.as_str(),
        |c| c.name.as_str(),
        ValidationError::UnknownCoaster,
    )
}
