//! Cache négatif : expressions normalisées déjà connues pour dépasser le délai.
//!
//! Lu et écrit uniquement sous le verrou d’évaluation du moteur.
//! Sans capacité, il ne fait que grossir (durée de vie = processus).
//! Avec capacité, l’entrée la plus ancienne est oubliée en premier.

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Default)]
pub struct CacheLent {
    cles: HashSet<String>,
    // ordre d’insertion, utilisé seulement si `capacite` est bornée
    ordre: VecDeque<String>,
    capacite: Option<usize>,
}

impl CacheLent {
    pub fn new(capacite: Option<usize>) -> Self {
        Self {
            capacite,
            ..Self::default()
        }
    }

    pub fn contient(&self, expression: &str) -> bool {
        self.cles.contains(expression)
    }

    /// Ajoute l’expression. Retourne false si elle y était déjà.
    pub fn inserer(&mut self, expression: &str) -> bool {
        if self.capacite == Some(0) || !self.cles.insert(expression.to_string()) {
            return false;
        }

        if let Some(max) = self.capacite {
            self.ordre.push_back(expression.to_string());
            while self.ordre.len() > max {
                if let Some(vieille) = self.ordre.pop_front() {
                    self.cles.remove(&vieille);
                }
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.cles.len()
    }

    /// Change la borne ; les entrées en trop (les plus anciennes) sont oubliées.
    pub fn redimensionner(&mut self, capacite: Option<usize>) {
        if capacite == self.capacite {
            return;
        }
        let cles: Vec<String> = if self.capacite.is_some() {
            self.ordre.drain(..).collect()
        } else {
            // sans borne l’ordre n’est pas suivi : l’éviction sera arbitraire
            self.cles.iter().cloned().collect()
        };
        *self = Self::new(capacite);
        for c in cles {
            self.inserer(&c);
        }
    }
}
