//! Reusable field validators for `#[validate(custom(...))]`

use validator::ValidationError;

/// Validator: string must contain something other than whitespace
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validator: name must produce a non-empty code
pub fn sluggable(value: &str) -> Result<(), ValidationError> {
    if crate::core::slug::slugify(value).is_empty() {
        let mut err = ValidationError::new("unsluggable");
        err.message = Some("must contain at least one letter or digit".into());
        Err(err)
    } else {
        Ok(())
    }
}
