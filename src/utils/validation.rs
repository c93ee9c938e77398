use std::collections::HashSet;

use validator::{Validate, ValidationError};

use crate::error::Result;

pub fn validate<T: Validate>(val: &T) -> Result<()> {
    val.validate()?;
    Ok(())
}

/// Trims, drops empties and removes case-insensitive duplicates, keeping the
/// first spelling seen.
pub fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|skill| skill.trim().to_string())
        .filter(|skill| !skill.is_empty() && seen.insert(skill.to_lowercase()))
        .collect()
}

pub fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
