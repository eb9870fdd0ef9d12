//! User-facing strings in French and English.
//!
//! Templates use `{name}` placeholders filled by [`tr_fmt`].

use serde::{Deserialize, Serialize};

use crate::error::QuoteError;

/// Display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Fr, Language::En];

    /// Two-letter code stored in settings.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
        }
    }

    /// Name of the language in itself, for selectors.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Fr => "Français",
            Language::En => "English",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "fr" => Some(Language::Fr),
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

impl std::str::FromStr for Language {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| QuoteError::UnknownLanguage(s.to_string()))
    }
}

/// Every translatable string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Text {
    AppTitle,
    Language,
    BrandTagline,
    ModeThreeD,
    ModeLaser,
    About,
    AboutTitle,
    AboutBody,
    Quit,
    File,
    InputTitle,
    RulesTitle,
    AddPieceSection,
    Grams,
    Hours,
    Minutes,
    AddPiece,
    UpdatePiece,
    Edit,
    Delete,
    AddedPieces,
    NoPieces,
    CalculateAll,
    ResultsTitle,
    Back,
    Menu,
    PdfDetailed,
    PdfSimple,
    Copy,
    ReceiptImage,
    Summary,
    Piece,
    Weight,
    Time,
    GramPrice,
    TimePrice,
    ExceededSuffix,
    Subtotal,
    Markup,
    FinalPrice,
    FinalPriceLabel,
    Item,
    Value,
    RuleGramPrice,
    RuleNormalHour,
    RuleExceedHour,
    RuleThreshold,
    RuleMarkup,
    RestoreDefaults,
    Error,
    Warning,
    Confirm,
    Yes,
    No,
    Close,
    InvalidNumbers,
    InvalidRule,
    NeedPiece,
    ConfirmDelete,
    Copied,
    CopiedMsg,
    Success,
    CalcFirst,
    ImgSaved,
    PdfSaved,
    UnexpectedError,
    UnexpectedErrorMsg,
    QuoteTitle,
    QuoteTitleLaser,
    PricingRules,
    Total,
}

/// Look up `text` in `lang`.
pub fn tr(lang: Language, text: Text) -> &'static str {
    match lang {
        Language::Fr => fr(text),
        Language::En => en(text),
    }
}

/// Look up `text` and substitute `{name}` placeholders.
pub fn tr_fmt(lang: Language, text: Text, args: &[(&str, &str)]) -> String {
    let mut out = tr(lang, text).to_string();
    for (name, value) in args {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

fn en(text: Text) -> &'static str {
    match text {
        Text::AppTitle => "FabriCost",
        Text::Language => "Language",
        Text::BrandTagline => "3D & Laser Calculator",
        Text::ModeThreeD => "3D Printing",
        Text::ModeLaser => "Laser Cutting",
        Text::About => "About",
        Text::AboutTitle => "About FabriCost",
        Text::AboutBody => "FabriCost\n\nPrice calculator for 3D printing and laser cutting.",
        Text::Quit => "Quit",
        Text::File => "File",
        Text::InputTitle => "Price Calculator - Add Pieces",
        Text::RulesTitle => "Pricing Rules",
        Text::AddPieceSection => "Add New Piece",
        Text::Grams => "Grams:",
        Text::Hours => "Hours:",
        Text::Minutes => "Minutes:",
        Text::AddPiece => "Add",
        Text::UpdatePiece => "Update Piece {id}",
        Text::Edit => "Edit",
        Text::Delete => "Delete",
        Text::AddedPieces => "Added Pieces",
        Text::NoPieces => "No pieces added yet",
        Text::CalculateAll => "Calculate All Pieces",
        Text::ResultsTitle => "Calculation Results",
        Text::Back => "Back",
        Text::Menu => "Menu",
        Text::PdfDetailed => "Generate Detailed PDF",
        Text::PdfSimple => "Generate Simple PDF (Prices Only)",
        Text::Copy => "Copy",
        Text::ReceiptImage => "Receipt Image",
        Text::Summary => "TOTAL: {total}    TIME: {time}",
        Text::Piece => "Piece",
        Text::Weight => "Weight",
        Text::Time => "Time",
        Text::GramPrice => "Gramage Price",
        Text::TimePrice => "Time Price",
        Text::ExceededSuffix => " (exceeded)",
        Text::Subtotal => "Subtotal",
        Text::Markup => "Markup",
        Text::FinalPrice => "Final Price",
        Text::FinalPriceLabel => "Final Price:",
        Text::Item => "Item",
        Text::Value => "Value",
        Text::RuleGramPrice => "Gram Price (DT):",
        Text::RuleNormalHour => "Normal Hour Price (DT):",
        Text::RuleExceedHour => "Exceed Hour Price (DT):",
        Text::RuleThreshold => "Hour Threshold:",
        Text::RuleMarkup => "Markup (%):",
        Text::RestoreDefaults => "Restore Defaults",
        Text::Error => "Error",
        Text::Warning => "Warning",
        Text::Confirm => "Confirm",
        Text::Yes => "Yes",
        Text::No => "No",
        Text::Close => "Close",
        Text::InvalidNumbers => "Please enter valid numbers!",
        Text::InvalidRule => "Invalid pricing rule: {field}",
        Text::NeedPiece => "Please add at least one piece!",
        Text::ConfirmDelete => "Delete Piece {id}?",
        Text::Copied => "Copied",
        Text::CopiedMsg => "Piece {id} details copied to clipboard!",
        Text::Success => "Success",
        Text::CalcFirst => "Please calculate pieces first!",
        Text::ImgSaved => "Image saved to:\n{path}",
        Text::PdfSaved => "PDF saved to:\n{path}",
        Text::UnexpectedError => "Unexpected error",
        Text::UnexpectedErrorMsg => "An unexpected error occurred:\n{err}\n\nCheck the log for details.",
        Text::QuoteTitle => "3D Print Price Quote",
        Text::QuoteTitleLaser => "Laser Cutting Quote",
        Text::PricingRules => "Pricing Rules:",
        Text::Total => "TOTAL",
    }
}

fn fr(text: Text) -> &'static str {
    match text {
        Text::AppTitle => "FabriCost",
        Text::Language => "Langue",
        Text::BrandTagline => "Calculateur 3D & Laser",
        Text::ModeThreeD => "Impression 3D",
        Text::ModeLaser => "Découpe laser",
        Text::About => "À propos",
        Text::AboutTitle => "À propos de FabriCost",
        Text::AboutBody => {
            "FabriCost\n\nCalculateur de prix pour impression 3D et découpe laser."
        }
        Text::Quit => "Quitter",
        Text::File => "Fichier",
        Text::InputTitle => "Calculateur de prix - Ajouter des pièces",
        Text::RulesTitle => "Règles de tarification",
        Text::AddPieceSection => "Ajouter une nouvelle pièce",
        Text::Grams => "Grammes :",
        Text::Hours => "Heures :",
        Text::Minutes => "Minutes :",
        Text::AddPiece => "Ajouter",
        Text::UpdatePiece => "Modifier la pièce {id}",
        Text::Edit => "Modifier",
        Text::Delete => "Supprimer",
        Text::AddedPieces => "Pièces ajoutées",
        Text::NoPieces => "Aucune pièce ajoutée",
        Text::CalculateAll => "Calculer toutes les pièces",
        Text::ResultsTitle => "Résultats du calcul",
        Text::Back => "Retour",
        Text::Menu => "Menu",
        Text::PdfDetailed => "Générer PDF détaillé",
        Text::PdfSimple => "Générer PDF simple (prix seulement)",
        Text::Copy => "Copier",
        Text::ReceiptImage => "Reçu (image)",
        Text::Summary => "TOTAL : {total}    TEMPS : {time}",
        Text::Piece => "Pièce",
        Text::Weight => "Poids",
        Text::Time => "Temps",
        Text::GramPrice => "Prix du filament",
        Text::TimePrice => "Prix du temps",
        Text::ExceededSuffix => " (dépassement)",
        Text::Subtotal => "Sous-total",
        Text::Markup => "Marge",
        Text::FinalPrice => "Prix final",
        Text::FinalPriceLabel => "Prix final :",
        Text::Item => "Élément",
        Text::Value => "Valeur",
        Text::RuleGramPrice => "Prix par gramme (DT) :",
        Text::RuleNormalHour => "Prix horaire normal (DT) :",
        Text::RuleExceedHour => "Prix horaire (après seuil) (DT) :",
        Text::RuleThreshold => "Seuil (heures) :",
        Text::RuleMarkup => "Marge (%) :",
        Text::RestoreDefaults => "Restaurer les valeurs par défaut",
        Text::Error => "Erreur",
        Text::Warning => "Avertissement",
        Text::Confirm => "Confirmation",
        Text::Yes => "Oui",
        Text::No => "Non",
        Text::Close => "Fermer",
        Text::InvalidNumbers => "Veuillez saisir des nombres valides !",
        Text::InvalidRule => "Règle de tarification invalide : {field}",
        Text::NeedPiece => "Veuillez ajouter au moins une pièce !",
        Text::ConfirmDelete => "Supprimer la pièce {id} ?",
        Text::Copied => "Copié",
        Text::CopiedMsg => "Les détails de la pièce {id} ont été copiés dans le presse-papiers.",
        Text::Success => "Succès",
        Text::CalcFirst => "Veuillez d'abord calculer les pièces !",
        Text::ImgSaved => "Image enregistrée dans :\n{path}",
        Text::PdfSaved => "PDF enregistré dans :\n{path}",
        Text::UnexpectedError => "Erreur inattendue",
        Text::UnexpectedErrorMsg => {
            "Une erreur inattendue est survenue :\n{err}\n\nConsultez le journal pour le détail."
        }
        Text::QuoteTitle => "Devis impression 3D",
        Text::QuoteTitleLaser => "Devis découpe laser",
        Text::PricingRules => "Règles de tarification :",
        Text::Total => "TOTAL",
    }
}
