//! Derived subtotals.
//!
//! Fills in subtotals the template does not carry (or carries unreliably)
//! from the raw extracted lines. Every rule reads only raw inputs or fields
//! it never writes, so applying the derivation twice yields the same record.

use log::trace;

use super::fields::{FieldKey, FinancialData};
use super::multiyear::MultiyearData;

/// Operating revenue lines added on top of `chiffre_affaires`.
const ADDITIONAL_OPERATING_REVENUE: [FieldKey; 6] = [
    FieldKey::MargeCommerciale,
    FieldKey::ProductionStockee,
    FieldKey::ProductionImmobilisee,
    FieldKey::SubventionsExploitation,
    FieldKey::AutresProduits,
    FieldKey::TransfertsCharges,
];

/// Components of total liabilities when the template total is missing.
const DEBT_COMPONENTS: [FieldKey; 3] = [
    FieldKey::DettesFinancieres,
    FieldKey::PassifCirculant,
    FieldKey::TresoreriePassif,
];

/// Return a copy of `data` with derived subtotals filled in.
pub fn derive_fields(data: &FinancialData) -> FinancialData {
    let mut out = data.clone();

    if let Some(total) = total_operating_revenue(data) {
        out.set(FieldKey::TotalProduitsExploitation, total);
    }

    // Reconciliation rather than a sum of expense lines: individual expense
    // rows are not reliable across template variants.
    if let Some(charges) = out
        .get(FieldKey::TotalProduitsExploitation)
        .zip(out.get(FieldKey::ResultatExploitation))
        .and_then(|(revenue, result)| revenue.checked_sub(result))
    {
        out.set(FieldKey::TotalChargesExploitation, charges);
    }

    if let Some(working_capital) = data
        .get(FieldKey::ActifCirculant)
        .zip(data.get(FieldKey::PassifCirculant))
        .and_then(|(assets, liabilities)| assets.checked_sub(liabilities))
    {
        out.set(FieldKey::FondsDeRoulement, working_capital);
    }

    // Income statement is canonical; the balance-sheet label is a fallback.
    if !data.contains(FieldKey::ResultatNet) {
        if let Some(result) = data.get(FieldKey::ResultatExercice) {
            out.set(FieldKey::ResultatNet, result);
        }
    }

    if !data.contains(FieldKey::TotalDettes) {
        if let Some(total) = data.sum_present(&DEBT_COMPONENTS) {
            out.set(FieldKey::TotalDettes, total);
        }
    }

    trace!(
        "derived {} field(s) from {} raw field(s)",
        out.len() - data.len(),
        data.len()
    );
    out
}

/// Apply [`derive_fields`] to every year. Computed ratios are dropped since
/// they no longer match the enriched data.
pub fn derive_all(data: &MultiyearData) -> MultiyearData {
    data.map_data(derive_fields)
}

/// Revenue plus every additional operating revenue line present. `None` when
/// neither revenue nor any additional line is available, leaving a value
/// supplied directly (manual entry) untouched.
fn total_operating_revenue(data: &FinancialData) -> Option<rust_decimal::Decimal> {
    let additional = data.sum_present(&ADDITIONAL_OPERATING_REVENUE);
    match (data.get(FieldKey::ChiffreAffaires), additional) {
        (Some(revenue), Some(extra)) => revenue.checked_add(extra),
        (Some(revenue), None) => Some(revenue),
        (None, extra) => extra,
    }
}
