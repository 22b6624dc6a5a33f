//! src/app/etat.rs
//!
//! État du terminal (sans rendu, sans analyse de commandes).
//!
//! Rôle : contenir l’état de la session (opération courante, dernière entrée,
//! résultat, erreur, avis) et offrir des mises à jour simples.
//!
//! Contrats :
//! - Aucune évaluation ici : le moteur est seulement détenu.
//! - Une erreur efface le résultat affiché, un résultat efface l’erreur.

use std::sync::Arc;

use crate::moteur::interfaces::Operation;
use crate::moteur::messages::{Message, MessagesMemoire};
use crate::moteur::{Moteur, Resultat};

pub struct AppCalc {
    pub moteur: Arc<Moteur>,

    // --- paramètres ---
    pub operation: Operation,

    // --- entrée / sorties ---
    pub entree: String,
    pub resultat: Option<Resultat>,
    pub erreur: String,
    pub messages: Vec<Message>,

    /// Registre passé au moteur le temps d’un calcul.
    pub(crate) registre: MessagesMemoire,
}

impl AppCalc {
    pub fn new(moteur: Arc<Moteur>) -> Self {
        Self {
            moteur,
            operation: Operation::Numerique,
            entree: String::new(),
            resultat: None,
            erreur: String::new(),
            messages: Vec::new(),
            registre: MessagesMemoire::new(),
        }
    }

    /// Efface résultat + erreur + avis (l’entrée reste).
    pub fn clear_resultats(&mut self) {
        self.resultat = None;
        self.erreur.clear();
        self.messages.clear();
    }

    pub fn set_operation(&mut self, operation: Operation) {
        self.operation = operation;
    }

    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.resultat = None;
        self.erreur = msg.into();
    }

    pub fn set_resultat(&mut self, resultat: Resultat) {
        self.erreur.clear();
        self.resultat = Some(resultat);
    }
}
