//! Statement field vocabulary and the `FinancialData` record.
//!
//! Identifiers follow the SYSCOHADA statement line labels. Derived subtotals
//! that never appear in the template are declared at the end.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Money;

keyed_enum! {
    /// A known statement line.
    pub enum FieldKey ("field") {
        // -- Bilan, actif -------------------------------------------------------
        FraisDeveloppement => "frais_developpement",
        BrevetsLicences => "brevets_licences_logiciels",
        FondsCommercial => "fonds_commercial",
        AutresImmobilisationsIncorporelles => "autres_immobilisations_incorporelles",
        ImmobilisationsIncorporelles => "immobilisations_incorporelles",
        Terrains => "terrains",
        Batiments => "batiments",
        AmenagementsAgencements => "amenagements_agencements",
        MaterielMobilier => "materiel_mobilier",
        MaterielTransport => "materiel_transport",
        ImmobilisationsCorporelles => "immobilisations_corporelles",
        AvancesAcomptesImmobilisations => "avances_acomptes_immobilisations",
        TitresParticipation => "titres_participation",
        AutresImmobilisationsFinancieres => "autres_immobilisations_financieres",
        ImmobilisationsFinancieres => "immobilisations_financieres",
        ActifImmobilise => "actif_immobilise",
        ActifCirculantHao => "actif_circulant_hao",
        StocksMarchandises => "stocks_marchandises",
        StocksMatieres => "stocks_matieres",
        StocksProduits => "stocks_produits",
        Stocks => "stocks",
        FournisseursAvancesVersees => "fournisseurs_avances_versees",
        Clients => "clients",
        AutresCreances => "autres_creances",
        ActifCirculant => "actif_circulant",
        TitresPlacement => "titres_placement",
        ValeursAEncaisser => "valeurs_a_encaisser",
        BanquesCaisses => "banques_cheques_postaux_caisse",
        TresorerieActif => "tresorerie_actif",
        EcartConversionActif => "ecart_conversion_actif",
        TotalActif => "total_actif",

        // -- Bilan, passif ------------------------------------------------------
        Capital => "capital",
        ApporteursCapitalNonAppele => "apporteurs_capital_non_appele",
        PrimesCapital => "primes_lies_capital",
        EcartsReevaluation => "ecarts_reevaluation",
        ReservesIndisponibles => "reserves_indisponibles",
        ReservesLibres => "reserves_libres",
        ReportANouveau => "report_a_nouveau",
        /// Result as carried on the balance sheet. Same concept as `resultat_net`.
        ResultatExercice => "resultat_exercice",
        SubventionsInvestissement => "subventions_investissement",
        ProvisionsReglementees => "provisions_reglementees",
        CapitauxPropres => "capitaux_propres",
        Emprunts => "emprunts",
        DettesLocationAcquisition => "dettes_location_acquisition",
        ProvisionsRisques => "provisions_risques_charges",
        DettesFinancieres => "dettes_financieres",
        RessourcesStables => "ressources_stables",
        DettesCirculantesHao => "dettes_circulantes_hao",
        ClientsAvancesRecues => "clients_avances_recues",
        Fournisseurs => "fournisseurs_exploitation",
        DettesFiscalesSociales => "dettes_fiscales_sociales",
        AutresDettes => "autres_dettes",
        ProvisionsCourtTerme => "provisions_risques_court_terme",
        PassifCirculant => "passif_circulant",
        BanquesEscompte => "banques_credits_escompte",
        BanquesCreditsTresorerie => "banques_credits_tresorerie",
        BanquesDecouverts => "banques_decouverts",
        TresoreriePassif => "tresorerie_passif",
        EcartConversionPassif => "ecart_conversion_passif",
        TotalDettes => "total_dettes",
        TotalPassif => "total_passif",

        // -- Compte de résultat -------------------------------------------------
        VentesMarchandises => "ventes_marchandises",
        AchatsMarchandises => "achats_marchandises",
        VariationStocksMarchandises => "variation_stocks_marchandises",
        MargeCommerciale => "marge_commerciale",
        VentesProduitsFabriques => "ventes_produits_fabriques",
        TravauxServicesVendus => "travaux_services_vendus",
        ProduitsAccessoires => "produits_accessoires",
        ChiffreAffaires => "chiffre_affaires",
        ProductionStockee => "production_stockee",
        ProductionImmobilisee => "production_immobilisee",
        SubventionsExploitation => "subventions_exploitation",
        AutresProduits => "autres_produits",
        TransfertsCharges => "transferts_charges",
        AchatsMatieres => "achats_matieres_premieres",
        VariationStocksMatieres => "variation_stocks_matieres",
        AutresAchats => "autres_achats",
        VariationStocksAutresApprovisionnements => "variation_stocks_autres_approvisionnements",
        Transports => "transports",
        ServicesExterieurs => "services_exterieurs",
        ImpotsTaxes => "impots_taxes",
        AutresCharges => "autres_charges",
        ValeurAjoutee => "valeur_ajoutee",
        ChargesPersonnel => "charges_personnel",
        ExcedentBrutExploitation => "excedent_brut_exploitation",
        ReprisesAmortissements => "reprises_amortissements_provisions",
        DotationsAmortissements => "dotations_amortissements_provisions",
        ResultatExploitation => "resultat_exploitation",
        RevenusFinanciers => "revenus_financiers",
        ReprisesProvisionsFinancieres => "reprises_provisions_financieres",
        TransfertsChargesFinancieres => "transferts_charges_financieres",
        FraisFinanciers => "frais_financiers",
        DotationsProvisionsFinancieres => "dotations_provisions_financieres",
        ResultatFinancier => "resultat_financier",
        ResultatActivitesOrdinaires => "resultat_activites_ordinaires",
        ProduitsCessionsImmobilisations => "produits_cessions_immobilisations",
        AutresProduitsHao => "autres_produits_hao",
        ValeursComptablesCessions => "valeurs_comptables_cessions",
        AutresChargesHao => "autres_charges_hao",
        ResultatHao => "resultat_hao",
        ParticipationTravailleurs => "participation_travailleurs",
        ImpotsResultat => "impots_resultat",
        ResultatNet => "resultat_net",

        // -- Tableau des flux de trésorerie --------------------------------------
        TresorerieNetteOuverture => "tresorerie_nette_ouverture",
        CapaciteAutofinancement => "capacite_autofinancement",
        VariationActifCirculantHao => "variation_actif_circulant_hao",
        VariationStocks => "variation_stocks",
        VariationCreances => "variation_creances",
        VariationPassifCirculant => "variation_passif_circulant",
        FluxOperationnels => "flux_tresorerie_activites_operationnelles",
        DecaissementsImmobilisationsIncorporelles => "decaissements_immobilisations_incorporelles",
        DecaissementsImmobilisationsCorporelles => "decaissements_immobilisations_corporelles",
        DecaissementsImmobilisationsFinancieres => "decaissements_immobilisations_financieres",
        EncaissementsCessionsImmobilisations => "encaissements_cessions_immobilisations",
        EncaissementsCessionsFinancieres => "encaissements_cessions_financieres",
        FluxInvestissement => "flux_tresorerie_activites_investissement",
        AugmentationsCapital => "augmentations_capital",
        SubventionsRecues => "subventions_investissement_recues",
        PrelevementsCapital => "prelevements_capital",
        DividendesVerses => "dividendes_verses",
        FluxCapitauxPropres => "flux_tresorerie_capitaux_propres",
        EmpruntsNouveaux => "emprunts_nouveaux",
        AutresDettesFinancieresRecues => "autres_dettes_financieres_recues",
        RemboursementsEmprunts => "remboursements_emprunts",
        FluxCapitauxEtrangers => "flux_tresorerie_capitaux_etrangers",
        FluxFinancement => "flux_tresorerie_activites_financement",
        VariationTresorerieNette => "variation_tresorerie_nette",
        TresorerieNetteCloture => "tresorerie_nette_cloture",

        // -- Derived ------------------------------------------------------------
        TotalProduitsExploitation => "total_produits_exploitation",
        TotalChargesExploitation => "total_charges_exploitation",
        FondsDeRoulement => "fonds_de_roulement",
    }
}

/// One period's statement values.
///
/// A field is either present with a finite amount or absent. Absence means
/// "not provided"; it is never encoded as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinancialData(BTreeMap<FieldKey, Money>);

impl FinancialData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FieldKey) -> Option<Money> {
        self.0.get(&key).copied()
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.0.contains_key(&key)
    }

    /// Insert or overwrite a value, returning the previous one.
    pub fn set(&mut self, key: FieldKey, value: Money) -> Option<Money> {
        self.0.insert(key, value)
    }

    pub fn remove(&mut self, key: FieldKey) -> Option<Money> {
        self.0.remove(&key)
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, key: FieldKey, value: Money) -> Self {
        self.0.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, Money)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// True when the field is present with a non-zero amount.
    pub fn is_nonzero(&self, key: FieldKey) -> bool {
        self.get(key).is_some_and(|v| !v.is_zero())
    }

    /// Sum of the listed fields that are present. `None` when none is, or
    /// when the sum overflows.
    pub fn sum_present(&self, keys: &[FieldKey]) -> Option<Money> {
        let mut present = keys.iter().filter_map(|k| self.get(*k));
        let first = present.next()?;
        present.try_fold(first, Decimal::checked_add)
    }
}

impl FromIterator<(FieldKey, Money)> for FinancialData {
    fn from_iter<I: IntoIterator<Item = (FieldKey, Money)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
