//! Erreurs exposées par le moteur.

use thiserror::Error;

use super::interfaces::ErreurCalcul;

/// Échec typé d’un appel à `Moteur::evaluate`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurEvaluation {
    /// Entrée rejetée par le préprocesseur ou l’évaluateur (message d’origine).
    #[error("{0}")]
    Syntaxe(String),

    /// Faute arithmétique pendant le calcul (division par zéro, ...).
    #[error("{0}")]
    Math(String),

    /// Délai dépassé maintenant, ou déjà dépassé par le passé pour la même expression.
    #[error("Calcul trop long pour : {expression}")]
    TropLent { expression: String },

    /// L’attente elle-même a échoué (fil de calcul perdu ou impossible à lancer).
    #[error("évaluation interrompue : {0}")]
    Interrompu(String),
}

impl ErreurEvaluation {
    pub fn trop_lent(expression: impl Into<String>) -> Self {
        ErreurEvaluation::TropLent {
            expression: expression.into(),
        }
    }
}

impl From<ErreurCalcul> for ErreurEvaluation {
    fn from(e: ErreurCalcul) -> Self {
        match e {
            ErreurCalcul::Syntaxe(m) => ErreurEvaluation::Syntaxe(m),
            ErreurCalcul::Arithmetique(m) => ErreurEvaluation::Math(m),
            ErreurCalcul::Interrompu => ErreurEvaluation::Interrompu("calcul interrompu".into()),
        }
    }
}

/// Valeur de configuration invalide.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurConfig {
    #[error("valeur invalide pour `{cle}` : {valeur:?} ({raison})")]
    ValeurInvalide {
        cle: &'static str,
        valeur: String,
        raison: &'static str,
    },
}
