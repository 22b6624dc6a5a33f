//! Moteur d’évaluation borné
//!
//! Organisation interne :
//! - interfaces.rs : contrats préprocesseur / évaluateur + jeton d’annulation
//! - delai.rs      : fil de calcul + attente bornée
//! - cache.rs      : expressions déjà connues pour dépasser le délai
//! - politique.rs  : numérique -> simplification si variables sans valeur
//! - formatage.rs  : arrondi, groupement, post-traitement des résultats
//! - config.rs     : préférences (précision, arrondi, séparateur, délai)
//! - messages.rs   : avis consultatifs
//! - erreur.rs     : erreurs typées
//!
//! Un seul calcul à la fois : `Moteur::evaluate` tient le verrou d’évaluation
//! du prétraitement jusqu’au résultat, délai compris.

pub mod cache;
pub mod config;
pub mod delai;
pub mod erreur;
pub mod formatage;
pub mod interfaces;
pub mod messages;
pub mod politique;

#[cfg(test)]
mod tests_moteur;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, trace, warn};

use crate::noyau::{NoyauExact, PreprocesseurExact};

use cache::CacheLent;
use config::{ConfigMoteur, PRECISION_MAX};
use delai::{executer_avec_delai, Issue};
use erreur::ErreurEvaluation;
use interfaces::{Evaluateur, Operation, Preprocesseur};
use messages::{Message, NiveauMessage, RegistreMessages};

/// Résultat d’une évaluation réussie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resultat {
    pub texte: String,
    /// Opération réellement utilisée (après repli éventuel).
    pub operation: Operation,
}

/* ------------------------------------------------------------------------- */
/* Moteur                                                                    */
/* ------------------------------------------------------------------------- */

pub struct Moteur {
    preprocesseur: Box<dyn Preprocesseur>,
    evaluateur: Arc<dyn Evaluateur>,
    // verrou d’évaluation : protège aussi le cache
    verrou: Mutex<CacheLent>,
    // écrit seulement sous `verrou`, lu librement par `format`
    config: RwLock<ConfigMoteur>,
    actifs: Arc<AtomicUsize>,
}

impl Moteur {
    /// Moteur avec le noyau exact fourni.
    pub fn new(config: ConfigMoteur) -> Self {
        Self::avec_collaborateurs(config, PreprocesseurExact, NoyauExact::default())
    }

    pub fn avec_collaborateurs(
        config: ConfigMoteur,
        preprocesseur: impl Preprocesseur + 'static,
        evaluateur: impl Evaluateur + 'static,
    ) -> Self {
        let config = bornee(config);
        Self {
            preprocesseur: Box::new(preprocesseur),
            evaluateur: Arc::new(evaluateur),
            verrou: Mutex::new(CacheLent::new(config.capacite_cache)),
            config: RwLock::new(config),
            actifs: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn evaluate(&self, operation: Operation, brut: &str) -> Result<Resultat, ErreurEvaluation> {
        self.evaluate_avec_messages(operation, brut, None)
    }

    /// Évalue `brut` ; les avis (repli, délai dépassé) vont dans `messages` s’il est fourni.
    pub fn evaluate_avec_messages(
        &self,
        operation: Operation,
        brut: &str,
        messages: Option<&dyn RegistreMessages>,
    ) -> Result<Resultat, ErreurEvaluation> {
        // relâché sur tous les chemins, erreurs comprises
        let mut cache = self.verrou.lock();

        let preparee = self.preprocesseur.preparer(brut)?;
        debug!(%operation, expression = %preparee.texte, "évaluation demandée");

        let (operation, avis) = politique::choisir_operation(operation, &preparee);
        if let Some(avis) = avis {
            info!(variables = ?preparee.variables_indefinies, "repli sur la simplification");
            if let Some(m) = messages {
                m.ajouter(avis);
            }
        }

        if cache.contient(&preparee.texte) {
            debug!(expression = %preparee.texte, "déjà connue trop longue, pas de calcul");
            return Err(ErreurEvaluation::trop_lent(preparee.texte));
        }

        let config = self.config.read().clone();
        let issue = executer_avec_delai(
            &self.evaluateur,
            operation,
            &preparee.texte,
            config.precision,
            config.delai,
            &self.actifs,
        )?;

        match issue {
            Issue::Valeur(valeur) => {
                trace!(%valeur, "valeur brute");
                Ok(Resultat {
                    texte: formatage::depuis_processeur(operation, &valeur, &config),
                    operation,
                })
            }
            Issue::Echec(e) => Err(e.into()),
            Issue::DelaiDepasse => {
                if cache.inserer(&preparee.texte) {
                    warn!(expression = %preparee.texte, taille = cache.len(), "ajoutée au cache des calculs trop longs");
                }
                if let Some(m) = messages {
                    m.ajouter(Message {
                        niveau: NiveauMessage::Avertissement,
                        texte: format!(
                            "Délai de {} ms dépassé : « {} » ne sera plus calculée",
                            config.delai.as_millis(),
                            preparee.texte
                        ),
                    });
                }
                Err(ErreurEvaluation::trop_lent(preparee.texte))
            }
        }
    }

    /// Remplace la configuration. Attend la fin du calcul en cours.
    pub fn reset(&self, config: ConfigMoteur) {
        let config = bornee(config);
        let mut cache = self.verrou.lock();
        cache.redimensionner(config.capacite_cache);
        debug!(?config, "configuration remplacée");
        *self.config.write() = config;
    }

    pub fn format(&self, value: f64, round: bool) -> String {
        formatage::format_nombre(value, round, &self.config.read())
    }

    pub fn format_defaut(&self, value: f64) -> String {
        self.format(value, true)
    }

    pub fn config(&self) -> ConfigMoteur {
        self.config.read().clone()
    }

    /// Nombre d’expressions connues trop longues.
    pub fn taille_cache(&self) -> usize {
        self.verrou.lock().len()
    }

    /// Fils de calcul encore vivants, abandonnés compris.
    pub fn travailleurs_actifs(&self) -> usize {
        self.actifs.load(Ordering::SeqCst)
    }
}

fn bornee(config: ConfigMoteur) -> ConfigMoteur {
    if config.precision > PRECISION_MAX {
        warn!(demandee = config.precision, max = PRECISION_MAX, "précision ramenée au maximum");
    }
    config.bornee()
}
