// src/moteur/tests_moteur.rs
//
// Moteur complet : délai, cache des calculs trop longs, repli, verrou unique.
// Les cas sensibles au temps utilisent des évaluateurs factices et des délais de ~50 ms.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use super::config::{ConfigMoteur, PRECISION_MAX};
use super::erreur::ErreurEvaluation;
use super::interfaces::{Annulation, ErreurCalcul, Evaluateur, Operation};
use super::messages::{MessagesMemoire, NiveauMessage};
use super::{Moteur, Resultat};
use crate::noyau::{NoyauExact, PreprocesseurExact};

/* ------------------------------------------------------------------------- */
/* Évaluateurs factices                                                      */
/* ------------------------------------------------------------------------- */

/// Ne termine jamais seul ; sort dès l’annulation. Compte ses lancements.
#[derive(Clone, Default)]
struct Boucle {
    appels: Arc<AtomicUsize>,
}

impl Evaluateur for Boucle {
    fn evaluer(&self, _: Operation, _: &str, _: usize, ann: &Annulation) -> Result<String, ErreurCalcul> {
        self.appels.fetch_add(1, Ordering::SeqCst);
        loop {
            ann.verifier()?;
            thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Noyau exact + compteur de lancements.
#[derive(Clone, Default)]
struct Compte {
    appels: Arc<AtomicUsize>,
}

impl Evaluateur for Compte {
    fn evaluer(&self, op: Operation, texte: &str, precision: usize, ann: &Annulation) -> Result<String, ErreurCalcul> {
        self.appels.fetch_add(1, Ordering::SeqCst);
        NoyauExact::default().evaluer(op, texte, precision, ann)
    }
}

/// Dort puis répond ; relève le nombre maximal de calculs simultanés.
#[derive(Clone, Default)]
struct Dormeur {
    en_cours: Arc<AtomicUsize>,
    max: Arc<AtomicUsize>,
}

impl Evaluateur for Dormeur {
    fn evaluer(&self, _: Operation, texte: &str, _: usize, _: &Annulation) -> Result<String, ErreurCalcul> {
        let n = self.en_cours.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(n, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        self.en_cours.fetch_sub(1, Ordering::SeqCst);
        Ok(texte.to_string())
    }
}

fn config_ms(ms: u64) -> ConfigMoteur {
    ConfigMoteur {
        delai: Duration::from_millis(ms),
        ..ConfigMoteur::default()
    }
}

fn moteur(ms: u64, e: impl Evaluateur + 'static) -> Moteur {
    Moteur::avec_collaborateurs(config_ms(ms), PreprocesseurExact, e)
}

fn attendre_travailleurs(m: &Moteur) {
    let debut = Instant::now();
    while m.travailleurs_actifs() != 0 {
        assert!(debut.elapsed() < Duration::from_secs(2), "fils de calcul jamais repris");
        thread::sleep(Duration::from_millis(5));
    }
}

/* ------------------------------------------------------------------------- */
/* Valeurs                                                                   */
/* ------------------------------------------------------------------------- */

#[test]
fn valeur_egale_au_calcul_direct_post_traite() {
    let m = Moteur::new(ConfigMoteur::default());

    let r = m.evaluate(Operation::Numerique, "1/2 + 1/3").unwrap();
    assert_eq!(
        r,
        Resultat {
            texte: "0.83333".into(),
            operation: Operation::Numerique,
        }
    );

    assert_eq!(m.evaluate(Operation::Numerique, "1000 * 1000").unwrap().texte, "1 000 000");
    assert_eq!(m.evaluate(Operation::Numerique, "pi").unwrap().texte, "3.14159");
    assert_eq!(m.evaluate(Operation::Simplifie, "pi / 2").unwrap().texte, "π/2");
    assert_eq!(m.evaluate(Operation::Elementaire, "tan(x)").unwrap().texte, "sin(x)/cos(x)");
    assert_eq!(m.taille_cache(), 0);
}

#[test]
fn division_par_zero_erreur_math() {
    let m = Moteur::new(ConfigMoteur::default());
    assert_eq!(
        m.evaluate(Operation::Numerique, "1/0").unwrap_err(),
        ErreurEvaluation::Math("division par zéro".into())
    );
    // verrou relâché après l’erreur
    assert_eq!(m.evaluate(Operation::Numerique, "1+1").unwrap().texte, "2");
}

#[test]
fn syntaxe_refusee_sans_lancer_de_calcul() {
    let compte = Compte::default();
    let m = moteur(1000, compte.clone());

    assert!(matches!(m.evaluate(Operation::Numerique, "1 +"), Err(ErreurEvaluation::Syntaxe(_))));
    assert!(matches!(m.evaluate(Operation::Numerique, "   "), Err(ErreurEvaluation::Syntaxe(_))));
    assert_eq!(compte.appels.load(Ordering::SeqCst), 0);
    assert_eq!(m.travailleurs_actifs(), 0);
}

/* ------------------------------------------------------------------------- */
/* Repli                                                                     */
/* ------------------------------------------------------------------------- */

#[test]
fn variable_sans_valeur_repli_et_avis() {
    let m = Moteur::new(ConfigMoteur::default());
    let messages = MessagesMemoire::new();

    let r = m
        .evaluate_avec_messages(Operation::Numerique, "x+1", Some(&messages))
        .unwrap();
    assert_eq!(r.texte, "x+1");
    assert_eq!(r.operation, Operation::Simplifie);

    let recus = messages.vider();
    assert_eq!(recus.len(), 1);
    assert_eq!(recus[0].niveau, NiveauMessage::Info);
    assert!(recus[0].texte.contains('x'));
}

#[test]
fn repli_sans_registre_reste_silencieux() {
    let m = Moteur::new(ConfigMoteur::default());
    let r = m.evaluate(Operation::Numerique, "a*b - b*a").unwrap();
    assert_eq!(r.operation, Operation::Simplifie);
}

/* ------------------------------------------------------------------------- */
/* Délai + cache                                                             */
/* ------------------------------------------------------------------------- */

#[test]
fn trop_lent_puis_echec_immediat_sans_relance() {
    let boucle = Boucle::default();
    let m = moteur(50, boucle.clone());
    let messages = MessagesMemoire::new();

    let debut = Instant::now();
    let e = m
        .evaluate_avec_messages(Operation::Numerique, "2 + 2", Some(&messages))
        .unwrap_err();
    let premiere = debut.elapsed();

    assert_eq!(e, ErreurEvaluation::trop_lent("2 + 2"));
    assert_eq!(e.to_string(), "Calcul trop long pour : 2 + 2");
    assert!(premiere >= Duration::from_millis(50));
    assert!(premiere < Duration::from_secs(1), "premier appel trop long: {premiere:?}");
    assert_eq!(messages.vider()[0].niveau, NiveauMessage::Avertissement);

    // même expression, écriture différente : même forme normalisée
    let debut = Instant::now();
    let e = m.evaluate(Operation::Numerique, "2+2").unwrap_err();
    assert_eq!(e, ErreurEvaluation::trop_lent("2 + 2"));
    assert!(debut.elapsed() < Duration::from_millis(50));

    assert_eq!(boucle.appels.load(Ordering::SeqCst), 1);
    assert_eq!(m.taille_cache(), 1);
    attendre_travailleurs(&m);
}

#[test]
fn fils_abandonnes_repris() {
    let m = moteur(30, Boucle::default());
    for i in 0..5 {
        let r = m.evaluate(Operation::Simplifie, &format!("{i} + 1"));
        assert!(matches!(r, Err(ErreurEvaluation::TropLent { .. })));
    }
    attendre_travailleurs(&m);
}

#[test]
fn n_expressions_lentes_n_entrees() {
    let m = moteur(20, Boucle::default());
    let n = 6;
    for _ in 0..2 {
        for i in 0..n {
            let _ = m.evaluate(Operation::Numerique, &format!("{i} * 3"));
        }
    }
    assert_eq!(m.taille_cache(), n);
}

#[test]
fn cache_borne_oublie_les_plus_anciennes() {
    let boucle = Boucle::default();
    let config = ConfigMoteur {
        capacite_cache: Some(1),
        ..config_ms(20)
    };
    let m = Moteur::avec_collaborateurs(config, PreprocesseurExact, boucle.clone());

    let _ = m.evaluate(Operation::Numerique, "1");
    let _ = m.evaluate(Operation::Numerique, "2");
    assert_eq!(m.taille_cache(), 1);

    // "1" a été oubliée : relancée
    let _ = m.evaluate(Operation::Numerique, "1");
    assert_eq!(boucle.appels.load(Ordering::SeqCst), 3);
    attendre_travailleurs(&m);
}

#[test]
fn delai_nul_toujours_une_issue() {
    // délai 0 : même un calcul instantané peut être déclaré trop lent
    let m = Moteur::avec_collaborateurs(
        ConfigMoteur {
            delai: Duration::ZERO,
            ..ConfigMoteur::default()
        },
        PreprocesseurExact,
        NoyauExact::default(),
    );
    match m.evaluate(Operation::Numerique, "1 + 1") {
        Ok(r) => assert_eq!(r.texte, "2"),
        Err(e) => assert_eq!(e, ErreurEvaluation::trop_lent("1 + 1")),
    }
    attendre_travailleurs(&m);
}

/* ------------------------------------------------------------------------- */
/* Configuration                                                             */
/* ------------------------------------------------------------------------- */

#[test]
fn reset_idempotent() {
    let m = Moteur::new(ConfigMoteur::default());
    let c = ConfigMoteur {
        precision: 2,
        separateur: None,
        ..ConfigMoteur::default()
    };

    m.reset(c.clone());
    let une = (m.format(1234.5678, true), m.config());
    m.reset(c.clone());
    let deux = (m.format(1234.5678, true), m.config());

    assert_eq!(une, deux);
    assert_eq!(une.0, "1234.57");
    assert_eq!(m.evaluate(Operation::Numerique, "2/3").unwrap().texte, "0.67");
}

#[test]
fn reset_precision_au_dela_de_vingt_chiffres() {
    let m = Moteur::new(ConfigMoteur::default());
    m.reset(ConfigMoteur {
        precision: 30,
        separateur: None,
        ..ConfigMoteur::default()
    });
    assert_eq!(
        m.evaluate(Operation::Numerique, "2/3").unwrap().texte,
        "0.666666666666666666666666666667"
    );

    // et retour à une précision courte sur le même moteur
    m.reset(ConfigMoteur {
        precision: 3,
        ..ConfigMoteur::default()
    });
    assert_eq!(m.evaluate(Operation::Numerique, "2/3").unwrap().texte, "0.667");
}

#[test]
fn precision_demesuree_ramenee_au_maximum() {
    let m = Moteur::new(ConfigMoteur {
        precision: usize::MAX,
        ..ConfigMoteur::default()
    });
    assert_eq!(m.config().precision, PRECISION_MAX);

    m.reset(ConfigMoteur {
        precision: 50_000_000,
        ..ConfigMoteur::default()
    });
    assert_eq!(m.config().precision, PRECISION_MAX);

    let t0 = Instant::now();
    assert_eq!(m.evaluate(Operation::Numerique, "1+1").unwrap().texte, "2");
    let tiers = m.evaluate(Operation::Numerique, "1/3").unwrap().texte;
    assert_eq!(tiers, format!("0.{}", "3".repeat(PRECISION_MAX)));
    assert!(t0.elapsed() < Duration::from_secs(2), "{:?}", t0.elapsed());
}

#[test]
fn reset_sans_arrondi_rend_le_texte_brut() {
    let m = Moteur::new(ConfigMoteur::default());
    m.reset(ConfigMoteur {
        arrondir: false,
        ..ConfigMoteur::default()
    });
    assert_eq!(m.format_defaut(0.5), "0.5");
    assert_eq!(m.evaluate(Operation::Numerique, "1/4").unwrap().texte, "0.25");
}

#[test]
fn format_ne_attend_pas_le_calcul_en_cours() {
    let m = Arc::new(moteur(300, Boucle::default()));

    let fond = {
        let m = Arc::clone(&m);
        thread::spawn(move || m.evaluate(Operation::Numerique, "7"))
    };
    thread::sleep(Duration::from_millis(30));

    let debut = Instant::now();
    assert_eq!(m.format_defaut(1234.5), "1 234.5");
    assert!(debut.elapsed() < Duration::from_millis(100));

    assert!(fond.join().unwrap().is_err());
    attendre_travailleurs(&m);
}

/* ------------------------------------------------------------------------- */
/* Verrou unique                                                             */
/* ------------------------------------------------------------------------- */

#[test]
fn evaluations_serialisees() {
    let dormeur = Dormeur::default();
    let m = Arc::new(moteur(2000, dormeur.clone()));

    let fils: Vec<_> = (0..4)
        .map(|i| {
            let m = Arc::clone(&m);
            thread::spawn(move || m.evaluate(Operation::Simplifie, &format!("{i}")))
        })
        .collect();

    for f in fils {
        assert!(f.join().unwrap().is_ok());
    }
    assert_eq!(dormeur.max.load(Ordering::SeqCst), 1);
}
