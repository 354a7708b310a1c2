//! Drug API response types and normalization.
//!
//! Every backend shape seen in the wild is accepted here and mapped onto the
//! canonical [`Drug`]:
//!
//! - a bare JSON array of drugs, or a bare drug object
//! - a `{success, data, count?, total?}` envelope whose `data` is an array,
//!   an object, or `null`
//! - `trade_name` / `tradeName`, `clinical_practical_considerations` /
//!   `clinicalPracticalConsiderations`
//! - `id` as a number or a numeric string, `is_emergency` as `0/1` or a bool
//!
//! Unknown fields such as `last_updated` are ignored. Records without a name
//! are dropped.

use drugbit_core::{Drug, DrugRef};
use serde::Deserialize;
use serde_json::Value;

use crate::api::ApiError;

/// Raw drug object as sent by any backend revision.
#[derive(Debug, Default, Deserialize)]
pub struct RawDrug {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "tradeName")]
    pub trade_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub dosing: Option<String>,
    #[serde(default)]
    pub pharmacokinetics: Option<String>,
    #[serde(default)]
    pub pharmacodynamics: Option<String>,
    #[serde(default, alias = "clinicalPracticalConsiderations")]
    pub clinical_practical_considerations: Option<String>,
    #[serde(default, alias = "isEmergency")]
    pub is_emergency: Option<Value>,
    #[serde(default)]
    pub url: Option<String>,
}

fn parse_id(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        Value::String(s) => match s.trim() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl RawDrug {
    /// Whether the record carries a usable numeric id.
    pub fn has_id(&self) -> bool {
        parse_id(self.id.as_ref()).is_some()
    }

    /// Convert to the canonical record, or `None` when the name is missing.
    ///
    /// A missing or non-numeric id becomes `0`.
    pub fn into_drug(self) -> Option<Drug> {
        let name = non_blank(self.name)?;
        let id = parse_id(self.id.as_ref()).unwrap_or_else(|| {
            tracing::warn!(name = %name, id = ?self.id, "drug record has no usable id");
            0
        });
        Some(Drug {
            id,
            name,
            trade_name: non_blank(self.trade_name),
            category: self.category.unwrap_or_default().trim().to_string(),
            overview: self.overview.unwrap_or_default(),
            dosing: self.dosing.unwrap_or_default(),
            pharmacokinetics: self.pharmacokinetics.unwrap_or_default(),
            pharmacodynamics: self.pharmacodynamics.unwrap_or_default(),
            clinical_practical_considerations: self.clinical_practical_considerations.unwrap_or_default(),
            is_emergency: parse_flag(self.is_emergency.as_ref()),
            url: non_blank(self.url),
        })
    }
}

/// Strip a `{success, data}` envelope if present.
///
/// A bare value is returned unchanged. `success: false` becomes
/// [`ApiError::Backend`] carrying the envelope's message.
pub fn unwrap_envelope(value: Value) -> Result<Value, ApiError> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };

    if !map.contains_key("success") && !map.contains_key("data") {
        return Ok(Value::Object(map));
    }

    if map.get("success").and_then(Value::as_bool) == Some(false) {
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string();
        return Err(ApiError::Backend(message));
    }

    Ok(map.remove("data").unwrap_or(Value::Null))
}

fn parse_raw(value: Value) -> Result<RawDrug, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Shape(format!("invalid drug object: {e}")))
}

fn collect_drugs(items: Vec<Value>) -> Result<Vec<Drug>, ApiError> {
    let mut drugs = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match parse_raw(item)?.into_drug() {
            Some(drug) => drugs.push(drug),
            None => tracing::warn!(index, "skipping drug record without a name"),
        }
    }
    Ok(drugs)
}

/// Normalize a list response.
pub fn drugs_from_value(value: Value) -> Result<Vec<Drug>, ApiError> {
    match unwrap_envelope(value)? {
        Value::Array(items) => collect_drugs(items),
        Value::Null => Ok(Vec::new()),
        other => Err(ApiError::Shape(format!("expected an array of drugs, got {}", kind(&other)))),
    }
}

/// Normalize a single-drug response.
///
/// A list is accepted too; the record matching `wanted` is picked from it.
pub fn drug_from_value(value: Value, wanted: &DrugRef) -> Result<Option<Drug>, ApiError> {
    match unwrap_envelope(value)? {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(parse_raw(Value::Object(map))?.into_drug()),
        Value::Array(items) => {
            let by_id = matches!(wanted, DrugRef::Id(_));
            for item in items {
                let raw = parse_raw(item)?;
                if by_id && !raw.has_id() {
                    continue;
                }
                if let Some(drug) = raw.into_drug()
                    && wanted.matches(&drug)
                {
                    return Ok(Some(drug));
                }
            }
            Ok(None)
        }
        other => Err(ApiError::Shape(format!("expected a drug object, got {}", kind(&other)))),
    }
}

/// Normalize a category list response. Non-string entries are skipped.
pub fn categories_from_value(value: Value) -> Result<Vec<String>, ApiError> {
    match unwrap_envelope(value)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(ApiError::Shape(format!("expected an array of categories, got {}", kind(&other)))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
