//! Configuration du moteur : précision, arrondi, séparateur de milliers, délai.
//!
//! Lue une fois par `reset` depuis une `SourceConfig` (clé -> valeur texte).
//! Clés absentes : valeurs par défaut.

use std::collections::HashMap;
use std::time::Duration;

use super::erreur::ErreurConfig;

pub const CLE_PRECISION: &str = "result_precision";
pub const CLE_ARRONDI: &str = "round_result";
pub const CLE_SEPARATEUR: &str = "grouping_separator";
pub const CLE_DELAI: &str = "timeout_ms";
pub const CLE_CAPACITE_CACHE: &str = "negative_cache_capacity";

pub const PRECISION_DEFAUT: usize = 5;
/// Au-delà, le formatage coûterait plus que le calcul (et il n’est pas borné par le délai).
pub const PRECISION_MAX: usize = 340;
pub const ARRONDI_DEFAUT: bool = true;
pub const SEPARATEUR_DEFAUT: char = ' ';
pub const DELAI_DEFAUT: Duration = Duration::from_millis(3000);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigMoteur {
    /// Chiffres après la virgule quand le résultat est arrondi.
    pub precision: usize,
    pub arrondir: bool,
    /// `None` : pas de groupement des milliers.
    pub separateur: Option<char>,
    /// Durée maximale d’un calcul.
    pub delai: Duration,
    /// `None` : le cache des calculs trop longs n’est jamais purgé.
    pub capacite_cache: Option<usize>,
}

impl Default for ConfigMoteur {
    fn default() -> Self {
        Self {
            precision: PRECISION_DEFAUT,
            arrondir: ARRONDI_DEFAUT,
            separateur: Some(SEPARATEUR_DEFAUT),
            delai: DELAI_DEFAUT,
            capacite_cache: None,
        }
    }
}

/// Source de préférences (clé -> valeur texte).
pub trait SourceConfig {
    fn valeur(&self, cle: &str) -> Option<String>;
}

impl SourceConfig for HashMap<String, String> {
    fn valeur(&self, cle: &str) -> Option<String> {
        self.get(cle).cloned()
    }
}

/// Variables d’environnement : `result_precision` -> `CALC_RESULT_PRECISION`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SourceEnv;

impl SourceEnv {
    pub fn nom_variable(cle: &str) -> String {
        format!("CALC_{}", cle.to_ascii_uppercase())
    }
}

impl SourceConfig for SourceEnv {
    fn valeur(&self, cle: &str) -> Option<String> {
        std::env::var(Self::nom_variable(cle)).ok()
    }
}

fn invalide(cle: &'static str, valeur: &str, raison: &'static str) -> ErreurConfig {
    ErreurConfig::ValeurInvalide {
        cle,
        valeur: valeur.to_string(),
        raison,
    }
}

fn lire_entier(source: &dyn SourceConfig, cle: &'static str) -> Result<Option<u64>, ErreurConfig> {
    source
        .valeur(cle)
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| invalide(cle, &v, "entier positif attendu"))
        })
        .transpose()
}

/// `Some(p)` si `p` est dans [0, PRECISION_MAX].
pub fn precision_valide(p: u64) -> Option<usize> {
    usize::try_from(p).ok().filter(|&p| p <= PRECISION_MAX)
}

impl ConfigMoteur {
    /// Ramène la précision sous `PRECISION_MAX` (configuration construite à la main).
    pub fn bornee(mut self) -> Self {
        self.precision = self.precision.min(PRECISION_MAX);
        self
    }

    pub fn depuis_source(source: &dyn SourceConfig) -> Result<Self, ErreurConfig> {
        let mut config = ConfigMoteur::default();

        if let Some(p) = lire_entier(source, CLE_PRECISION)? {
            config.precision = precision_valide(p).ok_or_else(|| {
                invalide(CLE_PRECISION, &p.to_string(), "précision maximale : 340 chiffres")
            })?;
        }

        if let Some(v) = source.valeur(CLE_ARRONDI) {
            config.arrondir = match v.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "oui" => true,
                "false" | "0" | "off" | "non" => false,
                _ => return Err(invalide(CLE_ARRONDI, &v, "booléen attendu")),
            };
        }

        // Pas de trim : " " est justement la valeur par défaut.
        if let Some(v) = source.valeur(CLE_SEPARATEUR) {
            config.separateur = v.chars().next();
        }

        if let Some(ms) = lire_entier(source, CLE_DELAI)? {
            if ms == 0 {
                return Err(invalide(CLE_DELAI, "0", "délai strictement positif attendu"));
            }
            config.delai = Duration::from_millis(ms);
        }

        config.capacite_cache = lire_entier(source, CLE_CAPACITE_CACHE)?.map(|c| c as usize);

        Ok(config)
    }
}
