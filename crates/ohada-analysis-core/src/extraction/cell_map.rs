//! Template layout: which cell holds which statement line.
//!
//! This table is the whole contract with the spreadsheet template. Sheet
//! names and coordinates must match it exactly; a template redesign only
//! touches this file.

use serde::Serialize;

use super::workbook::CellAddress;
use crate::statements::FieldKey;

pub const SHEET_BILAN: &str = "Bilan";
pub const SHEET_COMPTE_RESULTAT: &str = "CR";
pub const SHEET_FLUX_TRESORERIE: &str = "TFT";

/// Statement section of the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Assets,
    Liabilities,
    IncomeStatement,
    CashFlow,
}

/// One template line: the field and its current / prior period cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellMapping {
    pub field: FieldKey,
    pub current: CellAddress,
    pub prior: CellAddress,
}

/// All lines of one statement section.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatementLayout {
    pub statement: StatementKind,
    pub sheet: &'static str,
    pub rows: &'static [CellMapping],
}

const fn line(field: FieldKey, current: char, prior: char, row: u32) -> CellMapping {
    CellMapping {
        field,
        current: CellAddress::a1(current, row),
        prior: CellAddress::a1(prior, row),
    }
}

const fn ef(field: FieldKey, row: u32) -> CellMapping {
    line(field, 'E', 'F', row)
}

const fn ij(field: FieldKey, row: u32) -> CellMapping {
    line(field, 'I', 'J', row)
}

// ---------------------------------------------------------------------------
// Bilan, actif (E = N, F = N-1)
// ---------------------------------------------------------------------------

const ASSETS: &[CellMapping] = &[
    ef(FieldKey::FraisDeveloppement, 5),
    ef(FieldKey::BrevetsLicences, 6),
    ef(FieldKey::FondsCommercial, 7),
    ef(FieldKey::AutresImmobilisationsIncorporelles, 8),
    ef(FieldKey::ImmobilisationsIncorporelles, 9),
    ef(FieldKey::Terrains, 10),
    ef(FieldKey::Batiments, 11),
    ef(FieldKey::AmenagementsAgencements, 12),
    ef(FieldKey::MaterielMobilier, 13),
    ef(FieldKey::MaterielTransport, 14),
    ef(FieldKey::ImmobilisationsCorporelles, 15),
    ef(FieldKey::AvancesAcomptesImmobilisations, 16),
    ef(FieldKey::TitresParticipation, 17),
    ef(FieldKey::AutresImmobilisationsFinancieres, 18),
    ef(FieldKey::ImmobilisationsFinancieres, 19),
    ef(FieldKey::ActifImmobilise, 20),
    ef(FieldKey::ActifCirculantHao, 21),
    ef(FieldKey::StocksMarchandises, 22),
    ef(FieldKey::StocksMatieres, 23),
    ef(FieldKey::StocksProduits, 24),
    ef(FieldKey::Stocks, 25),
    ef(FieldKey::FournisseursAvancesVersees, 26),
    ef(FieldKey::Clients, 27),
    ef(FieldKey::AutresCreances, 28),
    ef(FieldKey::ActifCirculant, 29),
    ef(FieldKey::TitresPlacement, 30),
    ef(FieldKey::ValeursAEncaisser, 31),
    ef(FieldKey::BanquesCaisses, 32),
    ef(FieldKey::TresorerieActif, 33),
    ef(FieldKey::EcartConversionActif, 34),
    ef(FieldKey::TotalActif, 35),
];

// ---------------------------------------------------------------------------
// Bilan, passif (I = N, J = N-1)
// ---------------------------------------------------------------------------

const LIABILITIES: &[CellMapping] = &[
    ij(FieldKey::Capital, 5),
    ij(FieldKey::ApporteursCapitalNonAppele, 6),
    ij(FieldKey::PrimesCapital, 7),
    ij(FieldKey::EcartsReevaluation, 8),
    ij(FieldKey::ReservesIndisponibles, 9),
    ij(FieldKey::ReservesLibres, 10),
    ij(FieldKey::ReportANouveau, 11),
    ij(FieldKey::ResultatExercice, 12),
    ij(FieldKey::SubventionsInvestissement, 13),
    ij(FieldKey::ProvisionsReglementees, 14),
    ij(FieldKey::CapitauxPropres, 15),
    ij(FieldKey::Emprunts, 16),
    ij(FieldKey::DettesLocationAcquisition, 17),
    ij(FieldKey::ProvisionsRisques, 18),
    ij(FieldKey::DettesFinancieres, 19),
    ij(FieldKey::RessourcesStables, 20),
    ij(FieldKey::DettesCirculantesHao, 21),
    ij(FieldKey::ClientsAvancesRecues, 22),
    ij(FieldKey::Fournisseurs, 23),
    ij(FieldKey::DettesFiscalesSociales, 24),
    ij(FieldKey::AutresDettes, 25),
    ij(FieldKey::ProvisionsCourtTerme, 26),
    ij(FieldKey::PassifCirculant, 27),
    ij(FieldKey::BanquesEscompte, 28),
    ij(FieldKey::BanquesCreditsTresorerie, 29),
    ij(FieldKey::BanquesDecouverts, 30),
    ij(FieldKey::TresoreriePassif, 31),
    ij(FieldKey::EcartConversionPassif, 32),
    ij(FieldKey::TotalDettes, 33),
    ij(FieldKey::TotalPassif, 35),
];

// ---------------------------------------------------------------------------
// Compte de résultat (E = N, F = N-1)
// ---------------------------------------------------------------------------

const INCOME_STATEMENT: &[CellMapping] = &[
    ef(FieldKey::VentesMarchandises, 5),
    ef(FieldKey::AchatsMarchandises, 6),
    ef(FieldKey::VariationStocksMarchandises, 7),
    ef(FieldKey::MargeCommerciale, 8),
    ef(FieldKey::VentesProduitsFabriques, 9),
    ef(FieldKey::TravauxServicesVendus, 10),
    ef(FieldKey::ProduitsAccessoires, 11),
    ef(FieldKey::ChiffreAffaires, 12),
    ef(FieldKey::ProductionStockee, 13),
    ef(FieldKey::ProductionImmobilisee, 14),
    ef(FieldKey::SubventionsExploitation, 15),
    ef(FieldKey::AutresProduits, 16),
    ef(FieldKey::TransfertsCharges, 17),
    ef(FieldKey::AchatsMatieres, 18),
    ef(FieldKey::VariationStocksMatieres, 19),
    ef(FieldKey::AutresAchats, 20),
    ef(FieldKey::VariationStocksAutresApprovisionnements, 21),
    ef(FieldKey::Transports, 22),
    ef(FieldKey::ServicesExterieurs, 23),
    ef(FieldKey::ImpotsTaxes, 24),
    ef(FieldKey::AutresCharges, 25),
    ef(FieldKey::ValeurAjoutee, 26),
    ef(FieldKey::ChargesPersonnel, 27),
    ef(FieldKey::ExcedentBrutExploitation, 28),
    ef(FieldKey::ReprisesAmortissements, 29),
    ef(FieldKey::DotationsAmortissements, 30),
    ef(FieldKey::ResultatExploitation, 31),
    ef(FieldKey::RevenusFinanciers, 32),
    ef(FieldKey::ReprisesProvisionsFinancieres, 33),
    ef(FieldKey::TransfertsChargesFinancieres, 34),
    ef(FieldKey::FraisFinanciers, 35),
    ef(FieldKey::DotationsProvisionsFinancieres, 36),
    ef(FieldKey::ResultatFinancier, 37),
    ef(FieldKey::ResultatActivitesOrdinaires, 38),
    ef(FieldKey::ProduitsCessionsImmobilisations, 39),
    ef(FieldKey::AutresProduitsHao, 40),
    ef(FieldKey::ValeursComptablesCessions, 41),
    ef(FieldKey::AutresChargesHao, 42),
    ef(FieldKey::ResultatHao, 43),
    ef(FieldKey::ParticipationTravailleurs, 44),
    ef(FieldKey::ImpotsResultat, 45),
    ef(FieldKey::ResultatNet, 46),
];

// ---------------------------------------------------------------------------
// Tableau des flux de trésorerie (E = N, F = N-1)
// ---------------------------------------------------------------------------

const CASH_FLOW: &[CellMapping] = &[
    ef(FieldKey::TresorerieNetteOuverture, 5),
    ef(FieldKey::CapaciteAutofinancement, 6),
    ef(FieldKey::VariationActifCirculantHao, 7),
    ef(FieldKey::VariationStocks, 8),
    ef(FieldKey::VariationCreances, 9),
    ef(FieldKey::VariationPassifCirculant, 10),
    ef(FieldKey::FluxOperationnels, 11),
    ef(FieldKey::DecaissementsImmobilisationsIncorporelles, 12),
    ef(FieldKey::DecaissementsImmobilisationsCorporelles, 13),
    ef(FieldKey::DecaissementsImmobilisationsFinancieres, 14),
    ef(FieldKey::EncaissementsCessionsImmobilisations, 15),
    ef(FieldKey::EncaissementsCessionsFinancieres, 16),
    ef(FieldKey::FluxInvestissement, 17),
    ef(FieldKey::AugmentationsCapital, 18),
    ef(FieldKey::SubventionsRecues, 19),
    ef(FieldKey::PrelevementsCapital, 20),
    ef(FieldKey::DividendesVerses, 21),
    ef(FieldKey::FluxCapitauxPropres, 22),
    ef(FieldKey::EmpruntsNouveaux, 23),
    ef(FieldKey::AutresDettesFinancieresRecues, 24),
    ef(FieldKey::RemboursementsEmprunts, 25),
    ef(FieldKey::FluxCapitauxEtrangers, 26),
    ef(FieldKey::FluxFinancement, 27),
    ef(FieldKey::VariationTresorerieNette, 28),
    ef(FieldKey::TresorerieNetteCloture, 29),
];

const LAYOUT: &[StatementLayout] = &[
    StatementLayout {
        statement: StatementKind::Assets,
        sheet: SHEET_BILAN,
        rows: ASSETS,
    },
    StatementLayout {
        statement: StatementKind::Liabilities,
        sheet: SHEET_BILAN,
        rows: LIABILITIES,
    },
    StatementLayout {
        statement: StatementKind::IncomeStatement,
        sheet: SHEET_COMPTE_RESULTAT,
        rows: INCOME_STATEMENT,
    },
    StatementLayout {
        statement: StatementKind::CashFlow,
        sheet: SHEET_FLUX_TRESORERIE,
        rows: CASH_FLOW,
    },
];

/// The template layout, in extraction order.
pub fn layout() -> &'static [StatementLayout] {
    LAYOUT
}

/// Layout of a single statement section.
pub fn statement_layout(statement: StatementKind) -> &'static StatementLayout {
    match statement {
        StatementKind::Assets => &LAYOUT[0],
        StatementKind::Liabilities => &LAYOUT[1],
        StatementKind::IncomeStatement => &LAYOUT[2],
        StatementKind::CashFlow => &LAYOUT[3],
    }
}
