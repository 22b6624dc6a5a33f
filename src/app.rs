// src/app.rs
//
// Calculatrice bornée — module App (racine)
// -----------------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + vue.rs)
// - Ré-exporter AppCalc (pour main.rs: use crate::app::AppCalc;)
// - Fournir la boucle de session (lignes lues -> textes écrits)
// - Mode direct : expressions passées en arguments, une ligne de sortie chacune

pub mod etat;
pub mod vue;

pub use etat::AppCalc;

use std::io::{self, BufRead, Write};

use crate::moteur::interfaces::Operation;
use crate::moteur::Moteur;

const INVITE: &str = "> ";

/// Évalue chaque expression (sans session ni avis) ; `Ok(false)` si l’une a échoué.
pub fn evaluer_arguments<S: AsRef<str>>(
    moteur: &Moteur,
    operation: Operation,
    expressions: &[S],
    mut sortie: impl Write,
) -> io::Result<bool> {
    let mut tout_ok = true;
    for expr in expressions {
        match moteur.evaluate(operation, expr.as_ref()) {
            Ok(r) => writeln!(sortie, "{}", r.texte)?,
            Err(e) => {
                tout_ok = false;
                writeln!(sortie, "erreur : {e}")?;
            }
        }
    }
    Ok(tout_ok)
}

impl AppCalc {
    /// Boucle de lecture : s’arrête sur `:quitter` ou fin d’entrée.
    pub fn session(&mut self, entree: impl BufRead, mut sortie: impl Write) -> io::Result<()> {
        write!(sortie, "{INVITE}")?;
        sortie.flush()?;

        for ligne in entree.lines() {
            let Some(texte) = self.traiter_ligne(&ligne?) else {
                break;
            };
            if !texte.is_empty() {
                writeln!(sortie, "{texte}")?;
            }
            write!(sortie, "{INVITE}")?;
            sortie.flush()?;
        }
        writeln!(sortie)
    }
}
