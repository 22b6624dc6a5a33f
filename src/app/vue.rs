// src/app/vue.rs
//
// Vue terminal
// ------------
// - une ligne = une expression (évaluée avec l’opération courante) ou une commande ":..."
// - le rendu est du texte : l’appelant l’écrit où il veut (stdout, tests)
// - les réglages passent par `Moteur::reset`, jamais par l’état local

use tracing::debug;

use crate::moteur::config::{precision_valide, ConfigMoteur, PRECISION_MAX};
use crate::moteur::interfaces::Operation;
use crate::moteur::messages::NiveauMessage;

use super::etat::AppCalc;

pub const AIDE: &str = "\
Expressions : + - * / ^ ( ) pi sqrt sin cos tan, variables libres (x, y, ...)
Commandes :
  :num | :simplify | :elementary   opération courante
  :precision N                     chiffres après la virgule (0 à 340)
  :arrondi on|off                  arrondi des résultats numériques
  :separateur C|aucun              séparateur des milliers
  :format V [brut]                 formate un nombre (arrondi, ou 3 décimales si brut)
  :cache                           nombre d’expressions connues trop longues
  :aide                            cette aide
  :quitter                         fin de session";

#[derive(Clone, Debug, PartialEq)]
pub enum Commande {
    Evaluer(String),
    Operation(Operation),
    Precision(usize),
    Arrondi(bool),
    Separateur(Option<char>),
    Formater { valeur: f64, arrondi: bool },
    Cache,
    Aide,
    Quitter,
    Rien,
}

/// Analyse une ligne saisie.
pub fn lire_commande(ligne: &str) -> Result<Commande, String> {
    let ligne = ligne.trim();
    let Some(cmd) = ligne.strip_prefix(':') else {
        return Ok(if ligne.is_empty() {
            Commande::Rien
        } else {
            Commande::Evaluer(ligne.to_string())
        });
    };

    let mut mots = cmd.split_whitespace();
    let nom = mots.next().unwrap_or("");
    let arg = mots.next();

    if nom == "format" {
        let valeur = arg
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(|| format!("nombre attendu: {ligne:?}"))?;
        return match mots.next() {
            None => Ok(Commande::Formater { valeur, arrondi: true }),
            Some("brut") => Ok(Commande::Formater { valeur, arrondi: false }),
            Some(autre) => Err(format!("option inconnue: {autre:?}")),
        };
    }

    match (nom, arg) {
        ("num" | "numeric", None) => Ok(Commande::Operation(Operation::Numerique)),
        ("simplify", None) => Ok(Commande::Operation(Operation::Simplifie)),
        ("elementary", None) => Ok(Commande::Operation(Operation::Elementaire)),

        ("precision", Some(n)) => n
            .parse()
            .ok()
            .and_then(precision_valide)
            .map(Commande::Precision)
            .ok_or_else(|| format!("précision invalide: {n:?} (0 à {PRECISION_MAX})")),

        ("arrondi", Some("on")) => Ok(Commande::Arrondi(true)),
        ("arrondi", Some("off")) => Ok(Commande::Arrondi(false)),

        ("separateur", Some("aucun")) => Ok(Commande::Separateur(None)),
        ("separateur", Some(s)) if s.chars().count() == 1 => Ok(Commande::Separateur(s.chars().next())),

        ("cache", None) => Ok(Commande::Cache),
        ("aide" | "help", None) => Ok(Commande::Aide),
        ("quitter" | "q", None) => Ok(Commande::Quitter),

        _ => Err(format!("commande inconnue: {ligne:?} (:aide)")),
    }
}

impl AppCalc {
    /// Traite une ligne ; `None` = fin de session, sinon le texte à afficher.
    pub fn traiter_ligne(&mut self, ligne: &str) -> Option<String> {
        let commande = match lire_commande(ligne) {
            Ok(c) => c,
            Err(e) => return Some(e),
        };

        let sortie = match commande {
            Commande::Quitter => return None,
            Commande::Rien => String::new(),
            Commande::Aide => AIDE.to_string(),

            Commande::Evaluer(expr) => {
                self.entree = expr;
                self.eval_via_moteur();
                self.rendu()
            }

            Commande::Operation(op) => {
                self.set_operation(op);
                format!("opération : {op}")
            }

            Commande::Precision(n) => {
                self.regler(|c| c.precision = n);
                format!("précision : {n}")
            }
            Commande::Arrondi(on) => {
                self.regler(|c| c.arrondir = on);
                format!("arrondi : {}", if on { "on" } else { "off" })
            }
            Commande::Separateur(sep) => {
                self.regler(|c| c.separateur = sep);
                match sep {
                    Some(c) => format!("séparateur : {c:?}"),
                    None => "séparateur : aucun".to_string(),
                }
            }

            Commande::Formater { valeur, arrondi: true } => self.moteur.format_defaut(valeur),
            Commande::Formater { valeur, arrondi: false } => self.moteur.format(valeur, false),

            Commande::Cache => format!(
                "{} expression(s) connue(s) trop longue(s), {} fil(s) de calcul actif(s)",
                self.moteur.taille_cache(),
                self.moteur.travailleurs_actifs()
            ),
        };
        Some(sortie)
    }

    fn regler(&mut self, modifier: impl FnOnce(&mut ConfigMoteur)) {
        let mut config = self.moteur.config();
        modifier(&mut config);
        self.moteur.reset(config);
    }

    fn eval_via_moteur(&mut self) {
        self.clear_resultats();

        let r = self
            .moteur
            .evaluate_avec_messages(self.operation, &self.entree, Some(&self.registre));
        self.messages = self.registre.vider();

        match r {
            Ok(resultat) => {
                debug!(operation = %resultat.operation, "résultat");
                self.set_resultat(resultat)
            }
            Err(e) => self.set_erreur(e.to_string()),
        }
    }

    /// Avis, puis résultat ou erreur.
    pub fn rendu(&self) -> String {
        let mut lignes: Vec<String> = self
            .messages
            .iter()
            .map(|m| match m.niveau {
                NiveauMessage::Info => format!("note : {}", m.texte),
                NiveauMessage::Avertissement => format!("attention : {}", m.texte),
            })
            .collect();

        if !self.erreur.is_empty() {
            lignes.push(format!("erreur : {}", self.erreur));
        } else if let Some(r) = &self.resultat {
            lignes.push(format!("= {}", r.texte));
        }
        lignes.join("\n")
    }
}
