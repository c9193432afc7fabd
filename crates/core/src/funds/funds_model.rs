use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::integrity::FieldValidator;
use crate::Result;

/// An investment fund that holds allocations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: String,
    pub name: String,
    pub vintage_year: Option<i32>,
    pub currency: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFund {
    /// Generated when absent.
    pub id: Option<String>,
    pub name: String,
    pub vintage_year: Option<i32>,
    /// Defaults to USD.
    pub currency: Option<String>,
}

impl NewFund {
    pub fn validate(&self) -> Result<()> {
        let mut validator = FieldValidator::new();
        validator.require_text("name", &self.name);
        if let Some(currency) = &self.currency {
            validator.check(
                currency.trim().len() == 3,
                "currency",
                "must be a three-letter code",
            );
        }
        if let Some(year) = self.vintage_year {
            validator.check((1900..=2200).contains(&year), "vintageYear", "is out of range");
        }
        validator.finish()
    }
}
