//! Contrats étroits entre le moteur et ses collaborateurs.
//!
//! Le moteur ne connaît ni la grammaire ni l’arithmétique : il reçoit un
//! `Preprocesseur` (texte brut -> expression normalisée) et un `Evaluateur`
//! (expression normalisée -> texte résultat), tous deux injectés.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Type d’opération demandée.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Valeur décimale.
    Numerique,
    /// Forme exacte simplifiée (symbolique).
    Simplifie,
    /// Forme exacte réécrite en fonctions élémentaires.
    Elementaire,
}

impl Operation {
    pub fn nom(self) -> &'static str {
        match self {
            Operation::Numerique => "numeric",
            Operation::Simplifie => "simplify",
            Operation::Elementaire => "elementary",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nom())
    }
}

/// Erreurs remontées par les collaborateurs (préprocesseur, évaluateur).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurCalcul {
    #[error("{0}")]
    Arithmetique(String),
    #[error("{0}")]
    Syntaxe(String),
    /// Abandon sur signal d’annulation : ce n’est pas une erreur mathématique.
    #[error("calcul interrompu")]
    Interrompu,
}

/// Jeton d’annulation coopérative, partagé entre contrôleur et travailleur.
#[derive(Clone, Debug, Default)]
pub struct Annulation(Arc<AtomicBool>);

impl Annulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annuler(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn est_annulee(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// À appeler dans chaque boucle longue : `ann.verifier()?;`
    pub fn verifier(&self) -> Result<(), ErreurCalcul> {
        if self.est_annulee() {
            Err(ErreurCalcul::Interrompu)
        } else {
            Ok(())
        }
    }
}

/// Expression normalisée produite par le préprocesseur.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpressionPreparee {
    pub texte: String,
    /// Noms des variables sans valeur, dans l’ordre d’apparition, sans doublon.
    pub variables_indefinies: Vec<String>,
}

impl ExpressionPreparee {
    pub fn a_variables_indefinies(&self) -> bool {
        !self.variables_indefinies.is_empty()
    }
}

pub trait Preprocesseur: Send + Sync {
    fn preparer(&self, brut: &str) -> Result<ExpressionPreparee, ErreurCalcul>;
}

/// Évaluateur mathématique. Exécuté sur un fil de travail dédié :
/// doit consulter `ann` régulièrement et rendre `ErreurCalcul::Interrompu` dès qu’il est levé.
///
/// `precision` : chiffres après la virgule affichés ensuite (configuration courante) ;
/// un résultat numérique doit en porter au moins autant.
pub trait Evaluateur: Send + Sync {
    fn evaluer(
        &self,
        operation: Operation,
        texte: &str,
        precision: usize,
        ann: &Annulation,
    ) -> Result<String, ErreurCalcul>;
}
