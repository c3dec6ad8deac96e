use super::{new_id, Change};
use crate::error::ValidationError;
use crate::model::{Coaster, DataFile, Manufacturer, Park};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParkDraft {
    pub name: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoasterDraft {
    pub name: String,
    pub park_id: String,
    pub manufacturer_id: Option<String>,
    pub notes: Option<String>,
}

fn clean_name(kind: &'static str, name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName { kind });
    }
    Ok(name.to_string())
}

/// Trimmed value, or None when blank
fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn ensure_unique<'a>(
    kind: &'static str,
    name: &str,
    mut existing: impl Iterator<Item = (&'a str, &'a str)>,
    editing: Option<&str>,
) -> Result<(), ValidationError> {
    let clash = existing.any(|(id, other)| Some(id) != editing && same_name(other, name));
    if clash {
        return Err(ValidationError::DuplicateName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

pub fn add_park(doc: &mut DataFile, draft: &ParkDraft) -> Result<Change, ValidationError> {
    let name = clean_name("park", &draft.name)?;
    ensure_unique(
        "park",
        &name,
        doc.parks.iter().map(|p| (p.id.as_str(), p.name.as_str())),
        None,
    )?;

    let id = new_id();
    let message = format!("Add park: {}", name);
    doc.parks.push(Park {
        id: id.clone(),
        name,
        country: clean_optional(draft.country.as_deref()),
    });
    Ok(Change::new(id, message))
}

pub fn update_park(
    doc: &mut DataFile,
    id: &str,
    draft: &ParkDraft,
) -> Result<Change, ValidationError> {
    let name = clean_name("park", &draft.name)?;
    ensure_unique(
        "park",
        &name,
        doc.parks.iter().map(|p| (p.id.as_str(), p.name.as_str())),
        Some(id),
    )?;

    let park = doc
        .parks
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| ValidationError::UnknownPark(id.to_string()))?;
    park.name = name;
    park.country = clean_optional(draft.country.as_deref());
    Ok(Change::new(id, format!("Update park: {}", park.name)))
}

pub fn add_manufacturer(doc: &mut DataFile, name: &str) -> Result<Change, ValidationError> {
    let name = clean_name("manufacturer", name)?;
    ensure_unique(
        "manufacturer",
        &name,
        doc.manufacturers
            .iter()
            .map(|m| (m.id.as_str(), m.name.as_str())),
        None,
    )?;

    let id = new_id();
    let message = format!("Add manufacturer: {}", name);
    doc.manufacturers.push(Manufacturer {
        id: id.clone(),
        name,
    });
    Ok(Change::new(id, message))
}

pub fn update_manufacturer(
    doc: &mut DataFile,
    id: &str,
    name: &str,
) -> Result<Change, ValidationError> {
    let name = clean_name("manufacturer", name)?;
    ensure_unique(
        "manufacturer",
        &name,
        doc.manufacturers
            .iter()
            .map(|m| (m.id.as_str(), m.name.as_str())),
        Some(id),
    )?;

    let manufacturer = doc
        .manufacturers
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| ValidationError::UnknownManufacturer(id.to_string()))?;
    manufacturer.name = name;
    Ok(Change::new(
        id,
        format!("Update manufacturer: {}", manufacturer.name),
    ))
}

/// Check a coaster draft against the catalog and return its cleaned form.
fn check_coaster(
    doc: &DataFile,
    draft: &CoasterDraft,
    editing: Option<&str>,
) -> Result<CoasterDraft, ValidationError> {
    let name = clean_name("coaster", &draft.name)?;
    let park = doc
        .park(&draft.park_id)
        .ok_or_else(|| ValidationError::UnknownPark(draft.park_id.clone()))?;

    let manufacturer_id = clean_optional(draft.manufacturer_id.as_deref());
    if let Some(id) = manufacturer_id.as_deref() {
        if doc.manufacturer(id).is_none() {
            return Err(ValidationError::UnknownManufacturer(id.to_string()));
        }
    }

    // Names only need to be unique within a park
    let clash = doc.coasters.iter().any(|c| {
        Some(c.id.as_str()) != editing && c.park_id == park.id && same_name(&c.name, &name)
    });
    if clash {
        return Err(ValidationError::DuplicateCoaster {
            name,
            park: park.name.clone(),
        });
    }

    Ok(CoasterDraft {
        name,
        park_id: park.id.clone(),
        manufacturer_id,
        notes: clean_optional(draft.notes.as_deref()),
    })
}

pub fn add_coaster(doc: &mut DataFile, draft: &CoasterDraft) -> Result<Change, ValidationError> {
    let clean = check_coaster(doc, draft, None)?;
    let id = new_id();
    let message = format!("Add coaster: {}", clean.name);
    doc.coasters.push(Coaster {
        id: id.clone(),
        name: clean.name,
        park_id: clean.park_id,
        manufacturer_id: clean.manufacturer_id,
        notes: clean.notes,
    });
    Ok(Change::new(id, message))
}

pub fn update_coaster(
    doc: &mut DataFile,
    id: &str,
    draft: &CoasterDraft,
) -> Result<Change, ValidationError> {
    if doc.coaster(id).is_none() {
        return Err(ValidationError::UnknownCoaster(id.to_string()));
    }
    let clean = check_coaster(doc, draft, Some(id))?;

    let coaster = doc
        .coasters
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| ValidationError::UnknownCoaster(id.to_string()))?;
    coaster.name = clean.name;
    coaster.park_id = clean.park_id;
    coaster.manufacturer_id = clean.manufacturer_id;
    coaster.notes = clean.notes;
    Ok(Change::new(id, format!("Update coaster: {}", coaster.name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (DataFile, String, String) {
        let mut doc = DataFile::default();
        let park = add_park(
            &mut doc,
            &ParkDraft {
                name: "Cedar Point".into(),
                country: Some("USA".into()),
            },
        )
        .unwrap();
        let manufacturer = add_manufacturer(&mut doc, "Intamin").unwrap();
        (doc, park.subject, manufacturer.subject)
    }

    fn draft(name: &str, park_id: &str) -> CoasterDraft {
        CoasterDraft {
            name: name.into(),
            park_id: park_id.into(),
            ..CoasterDraft::default()
        }
    }

    #[test]
    fn test_add_park_trims_and_messages() {
        let mut doc = DataFile::default();
        let change = add_park(
            &mut doc,
            &ParkDraft {
                name: "  Kings Island ".into(),
                country: Some("   ".into()),
            },
        )
        .unwrap();
        assert_eq!(change.message, "Add park: Kings Island");
        let park = doc.park(&change.subject).unwrap();
        assert_eq!(park.name, "Kings Island");
        assert_eq!(park.country, None);
    }

    #[test]
    fn test_empty_names_rejected() {
        let mut doc = DataFile::default();
        assert_eq!(
            add_park(&mut doc, &ParkDraft::default()).unwrap_err(),
            ValidationError::EmptyName { kind: "park" }
        );
        assert_eq!(
            add_manufacturer(&mut doc, "   ").unwrap_err(),
            ValidationError::EmptyName {
                kind: "manufacturer"
            }
        );
        assert!(doc.parks.is_empty());
    }

    #[test]
    fn test_duplicate_names_are_case_insensitive() {
        let (mut doc, park_id, _) = seeded();
        let err = add_park(
            &mut doc,
            &ParkDraft {
                name: "cedar point".into(),
                country: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateName { kind: "park", .. }));

        // Renaming a record to its own name (different case) is fine
        let change = update_park(
            &mut doc,
            &park_id,
            &ParkDraft {
                name: "CEDAR POINT".into(),
                country: None,
            },
        )
        .unwrap();
        assert_eq!(change.message, "Update park: CEDAR POINT");

        assert!(add_manufacturer(&mut doc, "INTAMIN").is_err());
    }

    #[test]
    fn test_update_unknown_park() {
        let (mut doc, _, _) = seeded();
        let err = update_park(
            &mut doc,
            "nope",
            &ParkDraft {
                name: "Anything".into(),
                country: None,
            },
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::UnknownPark("nope".into()));
    }

    #[test]
    fn test_update_manufacturer() {
        let (mut doc, _, manufacturer_id) = seeded();
        let change = update_manufacturer(&mut doc, &manufacturer_id, " B&M ").unwrap();
        assert_eq!(change.message, "Update manufacturer: B&M");
        assert_eq!(doc.manufacturer(&manufacturer_id).unwrap().name, "B&M");
    }

    #[test]
    fn test_add_coaster() {
        let (mut doc, park_id, manufacturer_id) = seeded();
        let change = add_coaster(
            &mut doc,
            &CoasterDraft {
                name: "Millennium Force".into(),
                park_id: park_id.clone(),
                manufacturer_id: Some(manufacturer_id.clone()),
                notes: Some("  ".into()),
            },
        )
        .unwrap();
        assert_eq!(change.message, "Add coaster: Millennium Force");
        let coaster = doc.coaster(&change.subject).unwrap();
        assert_eq!(coaster.park_id, park_id);
        assert_eq!(coaster.manufacturer_id, Some(manufacturer_id));
        assert_eq!(coaster.notes, None);
    }

    #[test]
    fn test_coaster_requires_known_park_and_manufacturer() {
        let (mut doc, park_id, _) = seeded();
        assert_eq!(
            add_coaster(&mut doc, &draft("X", "missing")).unwrap_err(),
            ValidationError::UnknownPark("missing".into())
        );
        let mut bad = draft("X", &park_id);
        bad.manufacturer_id = Some("missing".into());
        assert_eq!(
            add_coaster(&mut doc, &bad).unwrap_err(),
            ValidationError::UnknownManufacturer("missing".into())
        );
        assert!(doc.coasters.is_empty());
    }

    #[test]
    fn test_coaster_names_unique_per_park() {
        let (mut doc, park_id, _) = seeded();
        let other_park = add_park(
            &mut doc,
            &ParkDraft {
                name: "Kings Island".into(),
                country: None,
            },
        )
        .unwrap()
        .subject;

        add_coaster(&mut doc, &draft("Blue Streak", &park_id)).unwrap();
        let err = add_coaster(&mut doc, &draft("blue streak", &park_id)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateCoaster {
                name: "blue streak".into(),
                park: "Cedar Point".into()
            }
        );
        // Same name in another park is allowed
        add_coaster(&mut doc, &draft("Blue Streak", &other_park)).unwrap();
        assert_eq!(doc.coasters.len(), 2);
    }

    #[test]
    fn test_update_coaster_moves_park_and_keeps_id() {
        let (mut doc, park_id, _) = seeded();
        let other_park = add_park(
            &mut doc,
            &ParkDraft {
                name: "Kings Island".into(),
                country: None,
            },
        )
        .unwrap()
        .subject;
        let id = add_coaster(&mut doc, &draft("Beast", &park_id))
            .unwrap()
            .subject;

        let change = update_coaster(&mut doc, &id, &draft("The Beast", &other_park)).unwrap();
        assert_eq!(change.subject, id);
        assert_eq!(change.message, "Update coaster: The Beast");
        let coaster = doc.coaster(&id).unwrap();
        assert_eq!(coaster.park_id, other_park);
        assert_eq!(coaster.name, "The Beast");
    }
}
