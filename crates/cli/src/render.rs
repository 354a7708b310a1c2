//! Plain-text rendering for terminal output.

use drugbit_client::{FailureKind, FetchFailure};
use drugbit_core::Drug;

pub const NO_RESULTS: &str = "No results found.";

/// One line per drug: name, trade name and category.
pub fn drug_list(drugs: &[Drug]) -> String {
    drugs
        .iter()
        .map(|drug| {
            let mut line = drug.name.clone();
            if let Some(trade) = &drug.trade_name {
                line.push_str(&format!(" ({trade})"));
            }
            if !drug.category.is_empty() {
                line.push_str(&format!("  [{}]", drug.category));
            }
            if drug.is_emergency() {
                line.push_str("  !emergency");
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full record, one titled section per non-empty text block.
pub fn drug_detail(drug: &Drug) -> String {
    let mut out = match &drug.trade_name {
        Some(trade) => format!("{} ({trade})", drug.name),
        None => drug.name.clone(),
    };
    if !drug.category.is_empty() {
        out.push_str(&format!("\nCategory: {}", drug.category));
    }
    if drug.is_emergency() {
        out.push_str("\nEmergency drug");
    }

    let sections = [
        ("Overview", &drug.overview),
        ("Dosing", &drug.dosing),
        ("Pharmacokinetics", &drug.pharmacokinetics),
        ("Pharmacodynamics", &drug.pharmacodynamics),
        ("Clinical considerations", &drug.clinical_practical_considerations),
    ];
    for (title, body) in sections {
        if !body.trim().is_empty() {
            out.push_str(&format!("\n\n{title}\n{}", body.trim()));
        }
    }
    out
}

pub fn failure(failure: &FetchFailure) -> String {
    let hint = match failure.kind {
        FailureKind::RateLimited | FailureKind::Timeout | FailureKind::Network => "Please try again in a moment.",
        FailureKind::InvalidRequest => "Check the arguments and try again.",
        _ => "Please try again.",
    };
    format!("Could not load data ({failure}). {hint}")
}
