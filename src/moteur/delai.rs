//! Lancement d’un calcul sur un fil dédié + contrôle du délai.
//!
//! Le travailleur envoie exactement un message (son dernier geste) sur un canal
//! de capacité 1 ; le contrôleur attend ce message au plus `delai`.
//!
//! Reprise d’un fil qui déborde : Rust n’offre pas d’arrêt forcé sûr d’un fil.
//! Le contrôleur lève le jeton d’annulation, lâche le canal et détache le fil ;
//! l’évaluateur doit consulter le jeton pour s’arrêter réellement. Un évaluateur
//! qui ne le consulte pas finit son calcul dans le vide (résultat ignoré).

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError};
use tracing::{debug, warn};

use super::erreur::ErreurEvaluation;
use super::interfaces::{Annulation, ErreurCalcul, Evaluateur, Operation};

/// Issue d’une tentative : exactement une par appel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Issue {
    Valeur(String),
    /// Erreur arithmétique ou syntaxique rendue par l’évaluateur.
    Echec(ErreurCalcul),
    DelaiDepasse,
}

/// Message du travailleur : `None` = abandon sur annulation, aucune issue.
type Rapport = Option<Result<String, ErreurCalcul>>;

static NUMERO_FIL: AtomicU64 = AtomicU64::new(0);

/// Présence d’un fil de calcul dans le compteur partagé (décompté à la sortie).
struct Presence(Arc<AtomicUsize>);

impl Presence {
    fn entrer(actifs: &Arc<AtomicUsize>) -> Self {
        actifs.fetch_add(1, Ordering::SeqCst);
        Presence(Arc::clone(actifs))
    }
}

impl Drop for Presence {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Fil de calcul lancé : poignée, canal de son unique message, jeton d’annulation.
pub struct Travailleur {
    fil: JoinHandle<()>,
    rapport: Receiver<Rapport>,
    ann: Annulation,
}

/// Lance `evaluateur` sur un fil nommé ; le fil compte dans `actifs` jusqu’à sa sortie.
pub fn lancer_travailleur(
    evaluateur: &Arc<dyn Evaluateur>,
    operation: Operation,
    texte: &str,
    precision: usize,
    actifs: &Arc<AtomicUsize>,
) -> Result<Travailleur, ErreurEvaluation> {
    let (tx, rx) = bounded::<Rapport>(1);
    let ann = Annulation::new();

    let presence = Presence::entrer(actifs);
    let nom = format!("calcul-{}", NUMERO_FIL.fetch_add(1, Ordering::Relaxed));

    let evaluateur = Arc::clone(evaluateur);
    let jeton = ann.clone();
    let texte = texte.to_string();

    let fil = thread::Builder::new()
        .name(nom)
        .spawn(move || {
            debug!(%operation, %texte, "fil de calcul démarré");

            let rapport = match evaluateur.evaluer(operation, &texte, precision, &jeton) {
                // c’est nous qui avons interrompu : pas une erreur
                Err(ErreurCalcul::Interrompu) => None,
                autre => Some(autre),
            };

            debug!(abandon = rapport.is_none(), "fil de calcul terminé");
            // le contrôleur a pu partir : envoi ignoré dans ce cas
            let _ = tx.send(rapport);
            drop(presence);
        })
        .map_err(|e| ErreurEvaluation::Interrompu(format!("fil de calcul impossible à lancer : {e}")))?;

    Ok(Travailleur {
        fil,
        rapport: rx,
        ann,
    })
}

/// Évalue `texte` sur un fil dédié et attend au plus `delai`.
///
/// `actifs` compte les fils de calcul encore vivants (y compris ceux abandonnés).
pub fn executer_avec_delai(
    evaluateur: &Arc<dyn Evaluateur>,
    operation: Operation,
    texte: &str,
    precision: usize,
    delai: Duration,
    actifs: &Arc<AtomicUsize>,
) -> Result<Issue, ErreurEvaluation> {
    let Travailleur {
        fil: travailleur,
        rapport: rx,
        ann,
    } = lancer_travailleur(evaluateur, operation, texte, precision, actifs)?;

    match rx.recv_timeout(delai) {
        Ok(rapport) => {
            debug!("contrôleur réveillé par le fil de calcul");
            // le fil a envoyé son dernier message : il se termine
            let _ = travailleur.join();
            Ok(match rapport {
                Some(Ok(valeur)) => Issue::Valeur(valeur),
                Some(Err(e)) => Issue::Echec(e),
                None => Issue::DelaiDepasse,
            })
        }

        Err(RecvTimeoutError::Timeout) => {
            warn!(
                delai_ms = delai.as_millis() as u64,
                fil = travailleur.thread().name().unwrap_or("?"),
                "délai dépassé, annulation du calcul"
            );
            ann.annuler();
            // détaché : le fil sort dès qu’il consulte le jeton
            drop(travailleur);
            Ok(Issue::DelaiDepasse)
        }

        Err(RecvTimeoutError::Disconnected) => {
            let _ = travailleur.join();
            Err(ErreurEvaluation::Interrompu(
                "fil de calcul perdu sans résultat".into(),
            ))
        }
    }
}
