use log::trace;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{FinancialRatios, RatioKey};
use crate::statements::{FieldKey, FinancialData, MultiyearData};
use crate::types::{Money, Ratio};

const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute every ratio whose inputs are available.
///
/// Never fails: a ratio is omitted when an input is absent, when its divisor
/// is zero, or when the arithmetic would overflow.
pub fn calculate_ratios(data: &FinancialData) -> FinancialRatios {
    use FieldKey::*;

    let field = |key: FieldKey| data.get(key);
    let mut ratios = FinancialRatios::new();
    let mut put = |key: RatioKey, value: Option<Ratio>| {
        if let Some(v) = value {
            ratios.set(key, v);
        } else {
            trace!("{key} omitted");
        }
    };

    // -- Liquidity ------------------------------------------------------------
    let liquid_assets = field(ActifCirculant)
        .and_then(|ac| ac.checked_add(field(TresorerieActif).unwrap_or(Decimal::ZERO)));
    put(
        RatioKey::LiquiditeGenerale,
        ratio(liquid_assets, field(PassifCirculant)),
    );
    put(
        RatioKey::LiquiditeImmediate,
        ratio(field(TresorerieActif), field(PassifCirculant)),
    );

    // -- Structure ------------------------------------------------------------
    put(
        RatioKey::AutonomieFinanciere,
        percent(field(CapitauxPropres), field(TotalActif)),
    );
    put(
        RatioKey::Endettement,
        percent(field(TotalDettes), field(TotalActif)),
    );
    put(
        RatioKey::CouvertureDettes,
        ratio(field(ExcedentBrutExploitation), field(DettesFinancieres)),
    );
    put(
        RatioKey::FinancementStable,
        ratio(field(CapitauxPropres), field(ActifImmobilise)),
    );
    // Payback years only mean something while CAF is positive.
    put(
        RatioKey::CapaciteRemboursement,
        ratio(
            field(DettesFinancieres),
            field(CapaciteAutofinancement).filter(|caf| *caf > Decimal::ZERO),
        ),
    );

    // -- Profitability --------------------------------------------------------
    put(RatioKey::Roe, percent(field(ResultatNet), field(CapitauxPropres)));
    put(RatioKey::Roa, percent(field(ResultatNet), field(TotalActif)));
    put(
        RatioKey::MargeNette,
        percent(field(ResultatNet), field(ChiffreAffaires)),
    );
    put(
        RatioKey::MargeBrute,
        percent(field(MargeCommerciale), field(ChiffreAffaires)),
    );
    put(
        RatioKey::MargeEbe,
        percent(field(ExcedentBrutExploitation), field(ChiffreAffaires)),
    );
    put(
        RatioKey::TauxValeurAjoutee,
        percent(field(ValeurAjoutee), field(ChiffreAffaires)),
    );

    // -- Activity -------------------------------------------------------------
    put(
        RatioKey::RotationActif,
        ratio(field(ChiffreAffaires), field(TotalActif)),
    );
    put(
        RatioKey::RotationStocks,
        ratio(field(ChiffreAffaires), field(ActifCirculant)),
    );
    put(
        RatioKey::WorkingCapital,
        field(ActifCirculant)
            .zip(field(PassifCirculant))
            .and_then(|(ac, pc)| ac.checked_sub(pc)),
    );

    ratios
}

/// Fill `ratios` on every year record.
pub fn calculate_all(data: &MultiyearData) -> MultiyearData {
    let mut out = data.clone();
    for key in data.keys() {
        if let Some(record) = out.get_mut(key) {
            record.ratios = Some(calculate_ratios(&record.data));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `num / den`, or `None` when either side is absent or `den` is zero.
fn ratio(num: Option<Money>, den: Option<Money>) -> Option<Ratio> {
    let (num, den) = num.zip(den)?;
    if den.is_zero() {
        return None;
    }
    num.checked_div(den)
}

/// `num / den × 100`. The product is formed first so exact percentages such
/// as 12.5 stay exact.
fn percent(num: Option<Money>, den: Option<Money>) -> Option<Ratio> {
    ratio(num.and_then(|n| n.checked_mul(HUNDRED)), den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scenario() -> FinancialData {
        FinancialData::new()
            .with(FieldKey::TotalActif, dec!(10700000))
            .with(FieldKey::CapitauxPropres, dec!(6000000))
            .with(FieldKey::ChiffreAffaires, dec!(8000000))
            .with(FieldKey::ResultatNet, dec!(1000000))
    }

    fn approx(value: Option<Decimal>) -> Option<Decimal> {
        value.map(|v| v.round_dp(2))
    }

    #[test]
    fn test_profitability_ratios() {
        let ratios = calculate_ratios(&scenario());
        assert_eq!(approx(ratios.get(RatioKey::Roa)), Some(dec!(9.35)));
        assert_eq!(approx(ratios.get(RatioKey::Roe)), Some(dec!(16.67)));
        assert_eq!(ratios.get(RatioKey::MargeNette), Some(dec!(12.5)));
        assert_eq!(
            approx(ratios.get(RatioKey::AutonomieFinanciere)),
            Some(dec!(56.07))
        );
    }

    #[test]
    fn test_missing_inputs_omit_ratio() {
        let ratios = calculate_ratios(&scenario());
        assert_eq!(ratios.get(RatioKey::LiquiditeGenerale), None);
        assert_eq!(ratios.get(RatioKey::Endettement), None);
        assert_eq!(ratios.get(RatioKey::WorkingCapital), None);
    }

    #[test]
    fn test_zero_divisor_suppresses_ratio() {
        let data = FinancialData::new()
            .with(FieldKey::TotalActif, Decimal::ZERO)
            .with(FieldKey::ResultatNet, dec!(100))
            .with(FieldKey::ChiffreAffaires, Decimal::ZERO)
            .with(FieldKey::ActifCirculant, dec!(50))
            .with(FieldKey::PassifCirculant, Decimal::ZERO);
        let ratios = calculate_ratios(&data);
        assert_eq!(ratios.get(RatioKey::Roa), None);
        assert_eq!(ratios.get(RatioKey::RotationActif), None);
        assert_eq!(ratios.get(RatioKey::MargeNette), None);
        assert_eq!(ratios.get(RatioKey::LiquiditeGenerale), None);
        assert_eq!(ratios.get(RatioKey::WorkingCapital), Some(dec!(50)));
    }

    #[test]
    fn test_repayment_capacity_requires_positive_caf() {
        let data = FinancialData::new()
            .with(FieldKey::DettesFinancieres, dec!(5000000))
            .with(FieldKey::CapaciteAutofinancement, dec!(1250000));
        assert_eq!(
            calculate_ratios(&data).get(RatioKey::CapaciteRemboursement),
            Some(dec!(4))
        );

        let negative = data
            .clone()
            .with(FieldKey::CapaciteAutofinancement, dec!(-500000));
        assert_eq!(
            calculate_ratios(&negative).get(RatioKey::CapaciteRemboursement),
            None
        );
        let zero = data.with(FieldKey::CapaciteAutofinancement, Decimal::ZERO);
        assert_eq!(
            calculate_ratios(&zero).get(RatioKey::CapaciteRemboursement),
            None
        );
    }

    #[test]
    fn test_empty_data_yields_no_ratio() {
        assert!(calculate_ratios(&FinancialData::new()).is_empty());
    }

    #[test]
    fn test_liquidity_treats_missing_cash_as_zero() {
        let data = FinancialData::new()
            .with(FieldKey::ActifCirculant, dec!(300))
            .with(FieldKey::PassifCirculant, dec!(250));
        let ratios = calculate_ratios(&data);
        assert_eq!(ratios.get(RatioKey::LiquiditeGenerale), Some(dec!(1.2)));
        assert_eq!(ratios.get(RatioKey::LiquiditeImmediate), None);

        let with_cash = data.with(FieldKey::TresorerieActif, dec!(50));
        let ratios = calculate_ratios(&with_cash);
        assert_eq!(ratios.get(RatioKey::LiquiditeGenerale), Some(dec!(1.4)));
        assert_eq!(ratios.get(RatioKey::LiquiditeImmediate), Some(dec!(0.2)));
    }

    #[test]
    fn test_overflow_is_omitted_not_panicking() {
        let data = FinancialData::new()
            .with(FieldKey::ResultatNet, Decimal::MAX)
            .with(FieldKey::CapitauxPropres, dec!(0.0001))
            .with(FieldKey::TotalActif, dec!(1));
        let ratios = calculate_ratios(&data);
        assert_eq!(ratios.get(RatioKey::Roe), None);
        assert_eq!(ratios.get(RatioKey::Roa), None);
    }

    #[test]
    fn test_debt_service_capacity() {
        let data = FinancialData::new()
            .with(FieldKey::DettesFinancieres, dec!(3000))
            .with(FieldKey::CapaciteAutofinancement, dec!(1000));
        assert_eq!(
            calculate_ratios(&data).get(RatioKey::CapaciteRemboursement),
            Some(dec!(3))
        );
    }

    #[test]
    fn test_calculate_all_fills_every_year() {
        let mut data = MultiyearData::new();
        data.entry(crate::statements::YearKey::CURRENT, 2024)
            .unwrap()
            .data = scenario();
        data.entry(crate::statements::YearKey::PRIOR, 2024).unwrap();
        let out = calculate_all(&data);
        assert!(out.iter().all(|(_, r)| r.ratios.is_some()));
        assert!(data.iter().all(|(_, r)| r.ratios.is_none()));
    }
}
