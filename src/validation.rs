use anyhow::Result;
use log::warn;
use thiserror::Error;

use crate::clients::PropertyBackend;
use crate::models::property::{
    DraftProperty, AMENITIES, FURNISHED_STATES, LISTING_TYPES, PROPERTY_TYPES, STATUSES,
};

/// Rule violations reported by the gate, first violation wins.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("the price field is required and must be a non-negative number")]
    InvalidPrice,
    #[error("fill in all required fields ({0} is missing)")]
    MissingField(&'static str),
    #[error("unknown value '{1}' for {0}")]
    UnknownValue(&'static str, String),
    #[error("a property with code {0} already exists, choose another code")]
    CodeTaken(String),
    #[error("add and confirm the images before saving the property")]
    NoConfirmedImages,
}

/// Checks that the price parses as a non-negative number. Runs before the
/// required-field scan, matching the order the admin form reports problems.
pub fn check_price(draft: &DraftProperty) -> Result<(), ValidationError> {
    match draft.price_value() {
        Some(price) if price >= 0.0 => Ok(()),
        _ => Err(ValidationError::InvalidPrice),
    }
}

/// Checks the required fields and, when enum-valued fields are filled,
/// their vocabulary membership.
pub fn check_required_fields(draft: &DraftProperty) -> Result<(), ValidationError> {
    let required: [(&'static str, &str); 7] = [
        ("title", &draft.title),
        ("type", &draft.listing_type),
        ("property_type", &draft.property_type),
        ("price", &draft.price),
        ("status", &draft.status),
        ("neighborhood", &draft.neighborhood),
        ("city", &draft.city),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(name));
        }
    }

    check_vocabulary("type", &draft.listing_type, &LISTING_TYPES)?;
    check_vocabulary("status", &draft.status, &STATUSES)?;
    check_vocabulary("property_type", &draft.property_type, &PROPERTY_TYPES)?;
    if !draft.furnished.is_empty() {
        check_vocabulary("furnished", &draft.furnished, &FURNISHED_STATES)?;
    }
    for amenity in &draft.amenities {
        check_vocabulary("amenities", amenity, &AMENITIES)?;
    }

    Ok(())
}

fn check_vocabulary(
    field: &'static str,
    value: &str,
    allowed: &[&str],
) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::UnknownValue(field, value.to_string()))
    }
}

/// Scans the full backend listing for a case-insensitive code match.
/// Best-effort only: a failed listing fetch logs a warning and passes, and
/// two concurrent imports can still collide server-side.
pub async fn check_code_available(
    backend: &dyn PropertyBackend,
    code: &str,
) -> Result<(), ValidationError> {
    if code.trim().is_empty() {
        return Ok(());
    }

    let properties = match backend.list_all_properties().await {
        Ok(properties) => properties,
        Err(e) => {
            warn!("Skipping code-collision check, listing fetch failed: {}", e);
            return Ok(());
        }
    };

    let taken = properties
        .iter()
        .any(|p| p.code.to_lowercase() == code.to_lowercase());
    if taken {
        return Err(ValidationError::CodeTaken(code.to_string()));
    }

    Ok(())
}

/// Gate for the edit path; the code is immutable there, so no collision scan.
pub fn validate_for_edit(draft: &DraftProperty) -> Result<(), ValidationError> {
    check_price(draft)?;
    check_required_fields(draft)
}
