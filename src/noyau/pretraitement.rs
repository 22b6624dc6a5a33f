// src/noyau/pretraitement.rs
//
// Préprocesseur : texte libre -> expression normalisée.
// - jetons normalisés (minuscules, π -> pi, espaces uniformes)
// - structure vérifiée (RPN + AST) : une entrée mal formée échoue ici, avant tout fil de calcul
// - variables sans valeur relevées (tout identifiant qui n’est pas une fonction)
//
// Pur : aucun effet de bord.

use tracing::trace;

use super::jetons::{format_tokens, tokenize, Tok};
use super::rpn::{from_rpn, is_fonction_ident, to_rpn};
use crate::moteur::interfaces::{ErreurCalcul, ExpressionPreparee, Preprocesseur};

#[derive(Clone, Copy, Debug, Default)]
pub struct PreprocesseurExact;

impl Preprocesseur for PreprocesseurExact {
    fn preparer(&self, brut: &str) -> Result<ExpressionPreparee, ErreurCalcul> {
        let s = brut.trim();
        if s.is_empty() {
            return Err(ErreurCalcul::Syntaxe("Entrée vide".into()));
        }

        let jetons = tokenize(s).map_err(ErreurCalcul::Syntaxe)?;
        let rpn = to_rpn(&jetons).map_err(ErreurCalcul::Syntaxe)?;
        from_rpn(&rpn).map_err(ErreurCalcul::Syntaxe)?;

        let mut variables_indefinies: Vec<String> = Vec::new();
        for t in &jetons {
            if let Tok::Ident(name) = t {
                if !is_fonction_ident(name) && !variables_indefinies.contains(name) {
                    variables_indefinies.push(name.clone());
                }
            }
        }

        let texte = format_tokens(&jetons);
        trace!(brut, %texte, ?variables_indefinies, "expression préparée");

        Ok(ExpressionPreparee {
            texte,
            variables_indefinies,
        })
    }
}
