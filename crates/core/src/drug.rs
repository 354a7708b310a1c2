//! The canonical drug record.
//!
//! Every backend response shape is mapped onto [`Drug`] before it reaches a
//! caller; see `drugbit_client::api::response` for the accepted shapes.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Largest page a single listing request may ask for.
pub const MAX_LIMIT: usize = 1000;

/// A pharmacology reference record.
///
/// `name` is always present and non-empty. Every other text block may be
/// empty but is never missing, so a record always renders the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Drug {
    /// Backend-assigned identifier.
    pub id: i64,
    /// Primary display and lookup key, unique case-insensitively.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_name: Option<String>,
    /// Grouping label, e.g. "Induction Agent".
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub dosing: String,
    #[serde(default)]
    pub pharmacokinetics: String,
    #[serde(default)]
    pub pharmacodynamics: String,
    #[serde(default)]
    pub clinical_practical_considerations: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_emergency: Option<bool>,
    /// External reference link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Drug {
    /// Minimal record with only an id and a name.
    pub fn named(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            trade_name: None,
            category: String::new(),
            overview: String::new(),
            dosing: String::new(),
            pharmacokinetics: String::new(),
            pharmacodynamics: String::new(),
            clinical_practical_considerations: String::new(),
            is_emergency: None,
            url: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Case-insensitive name comparison.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Case-insensitive category comparison.
    pub fn in_category(&self, category: &str) -> bool {
        self.category.to_lowercase() == category.trim().to_lowercase()
    }

    pub fn is_emergency(&self) -> bool {
        self.is_emergency.unwrap_or(false)
    }
}

/// Sort drugs by name ascending, ignoring case, with byte order as tie-break.
pub fn sort_by_name(drugs: &mut [Drug]) {
    drugs.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Distinct, non-empty category labels sorted ascending (case-sensitive).
pub fn distinct_categories<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut categories: Vec<String> = labels
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

/// How a caller identifies a single drug.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DrugRef {
    Id(i64),
    Name(String),
}

impl DrugRef {
    /// Digits-only input is an id, anything else is a name.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if !trimmed.is_empty()
            && trimmed.bytes().all(|b| b.is_ascii_digit())
            && let Ok(id) = trimmed.parse::<i64>()
        {
            return DrugRef::Id(id);
        }
        DrugRef::Name(trimmed.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DrugRef::Name(name) if name.is_empty())
    }

    /// Whether `drug` is the record this reference points at.
    pub fn matches(&self, drug: &Drug) -> bool {
        match self {
            DrugRef::Id(id) => drug.id == *id,
            DrugRef::Name(name) => drug.name_matches(name),
        }
    }
}

impl fmt::Display for DrugRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrugRef::Id(id) => write!(f, "{id}"),
            DrugRef::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for DrugRef {
    fn from(input: &str) -> Self {
        DrugRef::parse(input)
    }
}
