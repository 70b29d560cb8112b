use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;

use ohada_analysis_core::ratios::calculate_ratios;
use ohada_analysis_core::statements::derive_fields;
use ohada_analysis_core::{with_metadata, FieldKey, FinancialData, RatioKey};

use super::read_input;

/// Arguments for ratio calculation on one period
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RatiosArgs {
    /// Path to JSON statement data ({"total_actif": ..., ...}); flags below
    /// override its values
    #[arg(long)]
    pub input: Option<String>,

    /// Skip derived subtotals (total_dettes, fonds_de_roulement, ...)
    #[arg(long)]
    pub raw: bool,

    /// Total actif
    #[arg(long)]
    pub total_actif: Option<Decimal>,

    /// Actif immobilisé
    #[arg(long)]
    pub actif_immobilise: Option<Decimal>,

    /// Actif circulant
    #[arg(long)]
    pub actif_circulant: Option<Decimal>,

    /// Trésorerie actif
    #[arg(long)]
    pub tresorerie_actif: Option<Decimal>,

    /// Capitaux propres
    #[arg(long)]
    pub capitaux_propres: Option<Decimal>,

    /// Dettes financières
    #[arg(long)]
    pub dettes_financieres: Option<Decimal>,

    /// Passif circulant
    #[arg(long)]
    pub passif_circulant: Option<Decimal>,

    /// Total des dettes
    #[arg(long)]
    pub total_dettes: Option<Decimal>,

    /// Chiffre d'affaires
    #[arg(long, alias = "ca")]
    pub chiffre_affaires: Option<Decimal>,

    /// Excédent brut d'exploitation
    #[arg(long, alias = "ebe")]
    pub excedent_brut_exploitation: Option<Decimal>,

    /// Résultat net
    #[arg(long)]
    pub resultat_net: Option<Decimal>,
}

impl RatiosArgs {
    fn overrides(&self) -> [(FieldKey, Option<Decimal>); 11] {
        [
            (FieldKey::TotalActif, self.total_actif),
            (FieldKey::ActifImmobilise, self.actif_immobilise),
            (FieldKey::ActifCirculant, self.actif_circulant),
            (FieldKey::TresorerieActif, self.tresorerie_actif),
            (FieldKey::CapitauxPropres, self.capitaux_propres),
            (FieldKey::DettesFinancieres, self.dettes_financieres),
            (FieldKey::PassifCirculant, self.passif_circulant),
            (FieldKey::TotalDettes, self.total_dettes),
            (FieldKey::ChiffreAffaires, self.chiffre_affaires),
            (FieldKey::ExcedentBrutExploitation, self.excedent_brut_exploitation),
            (FieldKey::ResultatNet, self.resultat_net),
        ]
    }
}

pub fn run_ratios(args: RatiosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let flags_given = args.overrides().iter().any(|(_, v)| v.is_some());

    let mut data: FinancialData = if args.input.is_some() || !flags_given {
        read_input(args.input.as_deref(), "no statement data")?
    } else {
        FinancialData::new()
    };
    for (field, value) in args.overrides() {
        if let Some(v) = value {
            data.set(field, v);
        }
    }

    let data = if args.raw { data } else { derive_fields(&data) };
    let ratios = calculate_ratios(&data);

    let warnings: Vec<String> = RatioKey::ALL
        .iter()
        .filter(|key| ratios.get(**key).is_none())
        .map(|key| format!("{key} non calculable : donnée manquante ou diviseur nul"))
        .collect();

    let output = with_metadata(
        "OHADA ratio engine (percent ratios in percent units)",
        &json!({ "derived_fields": !args.raw, "fields": data.len() }),
        warnings,
        start.elapsed().as_micros() as u64,
        ratios,
    );
    Ok(serde_json::to_value(output)?)
}
