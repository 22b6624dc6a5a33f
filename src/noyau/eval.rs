//! Noyau — évaluation (pipeline réel)
//!
//! texte normalisé -> jetons -> RPN -> Expr -> (elementaire) -> simplifier -> EXACT | lecture décimale
//!
//! Exécuté sur le fil de travail : chaque étape longue consulte le jeton d’annulation.

use tracing::trace;

use super::expr::Expr;
use super::format::format_exact_final;
use super::jetons::tokenize;
use super::lecture::lecture_decimale;
use super::rpn::{from_rpn, to_rpn};
use crate::moteur::config::PRECISION_MAX;
use crate::moteur::interfaces::{Annulation, ErreurCalcul, Evaluateur, Operation};

/// Chiffres calculés au minimum pour l’opération numérique (l’arrondi d’affichage vient après).
const DIGITS_NUMERIQUE: usize = 20;
/// Chiffres en plus de la précision affichée, pour que l’arrondi final soit juste.
const MARGE_ARRONDI: usize = 5;

/// Évaluateur exact (rationnels + π + √ + trig) fourni avec le moteur.
#[derive(Clone, Copy, Debug)]
pub struct NoyauExact {
    digits: usize,
}

impl Default for NoyauExact {
    fn default() -> Self {
        Self {
            digits: DIGITS_NUMERIQUE,
        }
    }
}

impl NoyauExact {
    /// Chiffres à calculer pour afficher `precision` chiffres après la virgule.
    fn digits_pour(&self, precision: usize) -> usize {
        self.digits
            .max(precision.min(PRECISION_MAX).saturating_add(MARGE_ARRONDI))
    }
}

fn analyser(texte: &str) -> Result<Expr, ErreurCalcul> {
    let jetons = tokenize(texte).map_err(ErreurCalcul::Syntaxe)?;
    let rpn = to_rpn(&jetons).map_err(ErreurCalcul::Syntaxe)?;
    from_rpn(&rpn).map_err(ErreurCalcul::Syntaxe)
}

impl Evaluateur for NoyauExact {
    fn evaluer(
        &self,
        operation: Operation,
        texte: &str,
        precision: usize,
        ann: &Annulation,
    ) -> Result<String, ErreurCalcul> {
        let expr = analyser(texte)?;
        trace!(%operation, %expr, "évaluation");

        match operation {
            Operation::Simplifie => Ok(format_exact_final(&expr.simplifier(ann)?)),
            Operation::Elementaire => Ok(format_exact_final(&expr.elementaire().simplifier(ann)?)),
            Operation::Numerique => {
                let simple = expr.simplifier(ann)?;
                lecture_decimale(&simple, self.digits_pour(precision), ann)
            }
        }
    }
}
