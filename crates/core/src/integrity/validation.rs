//! Field-level input validation.
//!
//! Creation inputs are checked before any storage call so callers get the
//! complete list of problems instead of whichever constraint the database
//! trips over first.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::{Error, FieldError, ValidationError};
use crate::Result;

#[derive(Debug, Default)]
pub struct FieldValidator {
    errors: Vec<FieldError>,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` against `field` unless `condition` holds.
    pub fn check(&mut self, condition: bool, field: &str, message: &str) -> &mut Self {
        if !condition {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn require_text(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, "is required")
    }

    pub fn require_positive(&mut self, field: &str, value: Decimal) -> &mut Self {
        self.check(value > Decimal::ZERO, field, "must be greater than zero")
    }

    pub fn require_non_negative(&mut self, field: &str, value: Decimal) -> &mut Self {
        self.check(value >= Decimal::ZERO, field, "cannot be negative")
    }

    pub fn require_present<T>(&mut self, field: &str, value: &Option<T>) -> &mut Self {
        self.check(value.is_some(), field, "is required")
    }

    /// `later` must not fall before `earlier`; skipped when either is absent.
    pub fn require_not_before(
        &mut self,
        field: &str,
        later: Option<NaiveDate>,
        earlier_field: &str,
        earlier: Option<NaiveDate>,
    ) -> &mut Self {
        if let (Some(later), Some(earlier)) = (later, earlier) {
            if later < earlier {
                self.errors
                    .push(FieldError::new(field, format!("cannot be before {}", earlier_field)));
            }
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(&mut self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(ValidationError::Fields(std::mem::take(
                &mut self.errors,
            ))))
        }
    }
}
