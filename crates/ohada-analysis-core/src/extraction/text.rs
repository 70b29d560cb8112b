//! OCR text producer.
//!
//! OCR engines flatten statement tables into lines such as
//! `Total actif    10 700 000    9 800 000`. Each line is split into
//! columns, the first column is matched against known French labels and the
//! following amounts are assigned to `N` then `N-1`.

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::parser::parse_text;
use super::{finalize, ExtractionOptions, ExtractionOutput};
use crate::statements::{FieldKey, MultiyearData, YearKey};
use crate::types::Money;

/// Column separators: tab, pipe, semicolon or a run of two or more spaces.
static COLUMN_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\t+|\||;| {2,}").expect("column separator pattern"));

/// Label and amounts glued by single spaces: `Capital 5 000 000`.
static TRAILING_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<label>.*?[^\d\s.,()-])\s+(?P<amount>[-(]?\d[\d\s.,()-]*)$")
        .expect("trailing amount pattern")
});

/// First group of a space-grouped amount: optional sign, one to three digits.
static GROUP_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-(]?\d{1,3}$").expect("group start pattern"));

/// Following thousands group, possibly closing the amount with decimals or a
/// parenthesis.
static GROUP_CONTINUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3}([.,]\d+)?\)?$").expect("group continuation pattern"));

/// OHADA reference code printed before some labels (`BZ`, `XB`, ...).
static REFERENCE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}\s+").expect("reference code pattern"));

/// Label patterns over accent-folded, lower-cased text. First match wins, so
/// more specific labels come before the ones they contain.
static LABELS: Lazy<Vec<(FieldKey, Regex)>> = Lazy::new(|| {
    [
        // Bilan actif
        (FieldKey::ActifCirculantHao, r"^actif\s+circulant\s+hao\b"),
        (FieldKey::ActifImmobilise, r"^(total\s+)?actif\s+immobilise\b"),
        (FieldKey::ActifCirculant, r"^(total\s+)?actif\s+circulant\b"),
        (FieldKey::TresorerieActif, r"^(total\s+)?tresorerie[\s-]+actif\b"),
        (FieldKey::TotalActif, r"^total\s+(general\s+)?(de\s+l'\s*)?actif\b"),
        (FieldKey::ImmobilisationsIncorporelles, r"^immobilisations\s+incorporelles$"),
        (FieldKey::ImmobilisationsCorporelles, r"^immobilisations\s+corporelles$"),
        (FieldKey::ImmobilisationsFinancieres, r"^immobilisations\s+financieres$"),
        (FieldKey::Stocks, r"^stocks(\s+et\s+en-?\s*cours)?$"),
        (FieldKey::Clients, r"^clients$"),
        (FieldKey::AutresCreances, r"^autres\s+creances$"),
        // Bilan passif
        (FieldKey::Capital, r"^capital$"),
        (FieldKey::ResultatExercice, r"^resultat\s+(net\s+)?de\s+l'\s*exercice\b"),
        (FieldKey::CapitauxPropres, r"^(total\s+)?capitaux\s+propres\b"),
        (FieldKey::Emprunts, r"^emprunts(\s+et\s+dettes\s+financieres\s+diverses)?$"),
        (FieldKey::DettesFinancieres, r"^(total\s+)?dettes\s+financieres\b"),
        (FieldKey::Fournisseurs, r"^fournisseurs\s+d'\s*exploitation\b"),
        (FieldKey::DettesFiscalesSociales, r"^dettes\s+fiscales\s+et\s+sociales\b"),
        (FieldKey::PassifCirculant, r"^(total\s+)?passif\s+circulant\b"),
        (FieldKey::TresoreriePassif, r"^(total\s+)?tresorerie[\s-]+passif\b"),
        (FieldKey::TotalDettes, r"^total\s+(des\s+)?dettes$"),
        (FieldKey::TotalPassif, r"^total\s+(general\s+)?(du\s+)?passif\b"),
        // Compte de résultat
        (FieldKey::VentesMarchandises, r"^ventes\s+de\s+marchandises\b"),
        (FieldKey::AchatsMarchandises, r"^achats\s+de\s+marchandises\b"),
        (FieldKey::MargeCommerciale, r"^marge\s+commerciale\b"),
        (FieldKey::ChiffreAffaires, r"^chiffre\s+d'\s*affaires\b"),
        (FieldKey::ValeurAjoutee, r"^valeur\s+ajoutee\b"),
        (FieldKey::ChargesPersonnel, r"^charges\s+de\s+personnel\b"),
        (
            FieldKey::ExcedentBrutExploitation,
            r"^(excedent\s+brut\s+d'\s*exploitation|ebe)\b",
        ),
        (FieldKey::DotationsAmortissements, r"^dotations\s+aux\s+amortissements\b"),
        (FieldKey::ResultatExploitation, r"^resultat\s+d'\s*exploitation\b"),
        (FieldKey::FraisFinanciers, r"^frais\s+financiers\b"),
        (FieldKey::ResultatFinancier, r"^resultat\s+financier\b"),
        (FieldKey::ResultatActivitesOrdinaires, r"^resultat\s+des\s+activites\s+ordinaires\b"),
        (FieldKey::ResultatHao, r"^resultat\s+(hao|hors\s+activites\s+ordinaires)\b"),
        (FieldKey::ImpotsResultat, r"^impots?\s+sur\s+(le\s+)?resultat\b"),
        (FieldKey::ResultatNet, r"^resultat\s+net\b"),
        // Tableau des flux de trésorerie
        (
            FieldKey::CapaciteAutofinancement,
            r"^(capacite\s+d'\s*autofinancement|cafg?)\b",
        ),
        (
            FieldKey::FluxOperationnels,
            r"^flux\s+de\s+tresorerie\s+(provenant\s+)?des\s+activites\s+operationnelles\b",
        ),
        (
            FieldKey::FluxInvestissement,
            r"^flux\s+de\s+tresorerie\s+(provenant\s+)?des\s+activites\s+d'\s*investissement\b",
        ),
        (
            FieldKey::FluxFinancement,
            r"^flux\s+de\s+tresorerie\s+(provenant\s+)?des\s+activites\s+de\s+financement\b",
        ),
        (FieldKey::VariationTresorerieNette, r"^variation\s+de\s+la\s+tresorerie\s+nette\b"),
    ]
    .into_iter()
    .map(|(field, pattern)| (field, Regex::new(pattern).expect("label pattern")))
    .collect()
});

/// Extract statements from OCR text.
pub fn extract_from_text(text: &str, options: &ExtractionOptions) -> ExtractionOutput {
    let mut data = MultiyearData::new();
    let mut warnings = Vec::new();
    let mut unmatched = 0usize;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some((label, amounts)) = split_line(line) else {
            unmatched += 1;
            continue;
        };
        let Some(field) = match_label(&label) else {
            unmatched += 1;
            continue;
        };
        let amounts = match amounts {
            Ok(amounts) => amounts,
            Err(raw) => {
                warn!("{field}: cannot split \"{raw}\" into N and N-1 amounts");
                warnings.push(format!(
                    "{field} : montants \"{raw}\" ambigus, ligne ignorée \
                     (séparer les colonnes N et N-1 par une tabulation ou deux espaces)"
                ));
                continue;
            }
        };

        for (key, amount) in [YearKey::CURRENT, YearKey::PRIOR].into_iter().zip(amounts) {
            if !options.accepts(key.year_for(options.reference_year)) {
                continue;
            }
            match data.entry(key, options.reference_year) {
                Ok(record) if record.data.contains(field) => {
                    debug!("{field} already read for {key}, ignoring \"{line}\"");
                }
                Ok(record) => {
                    record.data.set(field, amount);
                }
                Err(e) => warnings.push(format!("{field}: {e}")),
            }
        }
    }

    debug!("{unmatched} OCR line(s) without a recognised label or amount");
    let output = finalize(data, warnings);
    info!(
        "text extraction: {} field(s) over {} year(s)",
        output.data.field_count(),
        output.data.len()
    );
    output
}

/// Amounts read from a line, or the raw text when they cannot be told apart.
type LineAmounts = Result<Vec<Money>, String>;

/// Split a line into its label and the amounts that follow it. `None` when
/// the line carries no amount.
fn split_line(line: &str) -> Option<(String, LineAmounts)> {
    let mut columns: Vec<&str> = COLUMN_SEPARATOR
        .split(line)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    if columns.len() == 1 {
        let caps = TRAILING_AMOUNT.captures(columns[0])?;
        let label = caps.name("label")?.as_str();
        let amount = caps.name("amount")?.as_str();
        return Some((label.to_string(), split_amounts(amount).ok_or_else(|| amount.to_string())));
    }

    let label = columns.remove(0);
    let mut amounts = Vec::new();
    for column in columns
        .into_iter()
        .filter(|c| c.chars().any(|ch| ch.is_ascii_digit()))
    {
        match split_amounts(column) {
            Some(found) => amounts.extend(found),
            None => return Some((label.to_string(), Err(column.to_string()))),
        }
    }
    (!amounts.is_empty()).then(|| (label.to_string(), Ok(amounts)))
}

/// Split a run of single-spaced amounts such as `10 700 000 9 800 000`.
///
/// Tokens are grouped by French thousands grouping: a group opens with one to
/// three digits and continues with three-digit tokens. A single group of four
/// or more tokens is split in two equal halves when both halves read as whole
/// amounts (`700 000 650 000`); otherwise a group longer than four tokens
/// cannot be told apart from two amounts and yields `None`.
fn split_amounts(run: &str) -> Option<Vec<Money>> {
    let mut groups: Vec<Vec<&str>> = Vec::new();
    let mut open = false;
    for token in run.split_whitespace() {
        match groups.last_mut() {
            Some(group) if open && GROUP_CONTINUATION.is_match(token) => {
                group.push(token);
                open = token.len() == 3;
            }
            _ => {
                open = GROUP_START.is_match(token);
                groups.push(vec![token]);
            }
        }
    }

    if groups.len() != 1 {
        return Some(groups.iter().map(|g| parse_text(&g.join(" "))).collect());
    }
    let single = &groups[0];
    let n = single.len();
    let (first, second) = single.split_at(n / 2);
    let full_group = |t: &str| t.len() == 3 && t.chars().all(|c| c.is_ascii_digit());
    if n >= 4 && n % 2 == 0 && full_group(first[0]) && !second[0].starts_with('0') {
        return Some(vec![parse_text(&first.join(" ")), parse_text(&second.join(" "))]);
    }
    (n <= 4).then(|| vec![parse_text(&single.join(" "))])
}

fn match_label(label: &str) -> Option<FieldKey> {
    let label = REFERENCE_CODE.replace(label, "");
    let folded = fold(&label);
    let folded = folded.trim_end_matches([':', '.', ' ']);
    LABELS
        .iter()
        .find(|(_, pattern)| pattern.is_match(folded))
        .map(|(field, _)| *field)
}

/// Lower-case, strip French diacritics and normalise apostrophes.
fn fold(label: &str) -> String {
    label
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            '’' | '`' | '´' => '\'',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::NO_DATA_WARNING;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const OCR_PAGE: &str = "\
BILAN AU 31/12/2024
Libellé    Exercice N    Exercice N-1
AZ Total actif immobilisé    4 200 000    4 000 000
BK Total actif circulant\t3 500 000\t3 100 000
BZ TOTAL GÉNÉRAL ACTIF | 10 700 000 | 9 800 000
CP Total capitaux propres ; 6 000 000 ; 5 400 000
Chiffre d’affaires    8.000.000
Résultat net   1 000 000,00   (250 000)
Capital 5 000 000
";

    #[test]
    fn test_amounts_assigned_to_n_then_n1() {
        let out = extract_from_text(OCR_PAGE, &ExtractionOptions::for_year(2024));
        let n = &out.data.get(YearKey::CURRENT).unwrap().data;
        let n1 = &out.data.get(YearKey::PRIOR).unwrap().data;

        assert_eq!(n.get(FieldKey::TotalActif), Some(dec!(10700000)));
        assert_eq!(n1.get(FieldKey::TotalActif), Some(dec!(9800000)));
        assert_eq!(n.get(FieldKey::ActifImmobilise), Some(dec!(4200000)));
        assert_eq!(n.get(FieldKey::ActifCirculant), Some(dec!(3500000)));
        assert_eq!(n.get(FieldKey::CapitauxPropres), Some(dec!(6000000)));
        assert_eq!(n.get(FieldKey::ChiffreAffaires), Some(dec!(8000000)));
        assert_eq!(n1.get(FieldKey::ResultatNet), Some(dec!(-250000)));
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    }

    #[test]
    fn test_single_space_label_and_amount() {
        let out = extract_from_text(OCR_PAGE, &ExtractionOptions::for_year(2024));
        let n = &out.data.get(YearKey::CURRENT).unwrap().data;
        assert_eq!(n.get(FieldKey::Capital), Some(dec!(5000000)));
        assert_eq!(n.get(FieldKey::ResultatNet), Some(dec!(1000000)));
    }

    #[test]
    fn test_headers_are_not_fields() {
        let out = extract_from_text(OCR_PAGE, &ExtractionOptions::for_year(2024));
        assert_eq!(out.data.get(YearKey::CURRENT).unwrap().data.len(), 7);
    }

    #[test]
    fn test_labels_are_accent_and_case_insensitive() {
        assert_eq!(match_label("EXCÉDENT BRUT D'EXPLOITATION"), Some(FieldKey::ExcedentBrutExploitation));
        assert_eq!(match_label("Valeur ajoutée :"), Some(FieldKey::ValeurAjoutee));
        assert_eq!(match_label("Actif circulant HAO"), Some(FieldKey::ActifCirculantHao));
        assert_eq!(match_label("Résultat de l’exercice"), Some(FieldKey::ResultatExercice));
        assert_eq!(match_label("Libellé"), None);
    }

    #[test]
    fn test_single_spaced_periods_are_split() {
        let text = "\
Total actif 10 700 000 9 800 000
Total capitaux propres 700 000 650 000
Résultat net 1 000 000 (250 000)
Chiffre d'affaires 1 200 000 000
";
        let out = extract_from_text(text, &ExtractionOptions::for_year(2024));
        let n = &out.data.get(YearKey::CURRENT).unwrap().data;
        let n1 = &out.data.get(YearKey::PRIOR).unwrap().data;
        assert_eq!(n.get(FieldKey::TotalActif), Some(dec!(10700000)));
        assert_eq!(n1.get(FieldKey::TotalActif), Some(dec!(9800000)));
        assert_eq!(n.get(FieldKey::CapitauxPropres), Some(dec!(700000)));
        assert_eq!(n1.get(FieldKey::CapitauxPropres), Some(dec!(650000)));
        assert_eq!(n.get(FieldKey::ResultatNet), Some(dec!(1000000)));
        assert_eq!(n1.get(FieldKey::ResultatNet), Some(dec!(-250000)));
        assert_eq!(n.get(FieldKey::ChiffreAffaires), Some(dec!(1200000000)));
        assert!(!n1.contains(FieldKey::ChiffreAffaires));
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    }

    #[test]
    fn test_unsplittable_amounts_are_skipped_with_warning() {
        let text = "\
Total capitaux propres 6 000 000 5 400 000
Total actif 1 000 000 800 000
";
        let out = extract_from_text(text, &ExtractionOptions::for_year(2024));
        let n = &out.data.get(YearKey::CURRENT).unwrap().data;
        assert!(!n.contains(FieldKey::TotalActif));
        assert_eq!(n.get(FieldKey::CapitauxPropres), Some(dec!(6000000)));
        assert_eq!(out.warnings.len(), 1, "{:?}", out.warnings);
        assert!(out.warnings[0].starts_with("total_actif : montants \"1 000 000 800 000\""));
    }

    #[test]
    fn test_split_amounts_grouping() {
        assert_eq!(split_amounts("5 000 000"), Some(vec![dec!(5000000)]));
        assert_eq!(split_amounts("1 000 000,00"), Some(vec![dec!(1000000)]));
        assert_eq!(split_amounts("8.000.000"), Some(vec![dec!(8000000)]));
        assert_eq!(
            split_amounts("4 200 000 4 000 000"),
            Some(vec![dec!(4200000), dec!(4000000)])
        );
        assert_eq!(split_amounts("1 000 000 800 000"), None);
    }

    #[test]
    fn test_year_range_applies() {
        let options = ExtractionOptions::for_year(2024).with_year_range(2023, 2023);
        let out = extract_from_text(OCR_PAGE, &options);
        assert!(out.data.get(YearKey::CURRENT).is_none());
        assert_eq!(
            out.data.get(YearKey::PRIOR).unwrap().data.get(FieldKey::TotalActif),
            Some(dec!(9800000))
        );
    }

    #[test]
    fn test_unrecognised_text_yields_no_data() {
        let out = extract_from_text("Rapport de gestion\nPage 1 sur 3", &ExtractionOptions::for_year(2024));
        assert!(out.is_empty());
        assert_eq!(out.warnings, vec![NO_DATA_WARNING.to_string()]);
    }
}
