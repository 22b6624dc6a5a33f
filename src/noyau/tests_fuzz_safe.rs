//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - expressions générées par proptest, profondeur bornée
//! - nombre de cas réduit (lecture décimale coûteuse en debug)
//! - on accepte certaines erreurs attendues (division par zéro, tangente indéfinie, ...)
//! - invariants clés : texte normalisé stable, exact entier => numérique identique

use std::time::{Duration, Instant};

use proptest::prelude::*;

use super::{NoyauExact, PreprocesseurExact};
use crate::moteur::interfaces::{Annulation, ErreurCalcul, Evaluateur, Operation, Preprocesseur};

/* ------------------------ Helpers fuzz ------------------------ */

fn is_erreur_attendue(e: &ErreurCalcul) -> bool {
    // erreurs *normales* : le domaine est volontairement limité
    match e {
        ErreurCalcul::Arithmetique(m) => {
            m.contains("division par zéro")
                || m.contains("tangente indéfinie")
                || m.contains("racine carrée d’un nombre négatif")
                || m.contains("puissance trop grande")
        }
        ErreurCalcul::Syntaxe(_) | ErreurCalcul::Interrompu => false,
    }
}

fn evaluer(op: Operation, texte: &str) -> Result<String, ErreurCalcul> {
    NoyauExact::default().evaluer(op, texte, 5, &Annulation::new())
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn angle() -> impl Strategy<Value = String> {
    (-6i32..=7, prop::sample::select(vec![1u32, 2, 3, 4, 6])).prop_map(|(k, d)| {
        if d == 1 {
            format!("{k}*pi")
        } else {
            format!("{k}*pi/{d}")
        }
    })
}

fn atome() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..=12).prop_map(|n| n.to_string()),
        Just("pi".to_string()),
        Just("sqrt(2)".to_string()),
        Just("sqrt(4)".to_string()),
        angle().prop_map(|a| format!("({a})")),
    ]
}

fn expression() -> impl Strategy<Value = String> {
    atome().prop_recursive(4, 32, 2, |interne| {
        prop_oneof![
            (interne.clone(), interne.clone()).prop_map(|(a, b)| format!("({a}+{b})")),
            (interne.clone(), interne.clone()).prop_map(|(a, b)| format!("({a}-{b})")),
            (interne.clone(), interne.clone()).prop_map(|(a, b)| format!("({a}*{b})")),
            (interne.clone(), interne.clone()).prop_map(|(a, b)| format!("({a}/{b})")),
            (interne.clone(), 0u32..4).prop_map(|(a, n)| format!("({a})^{n}")),
            interne.prop_map(|a| format!("-({a})")),
            angle().prop_map(|a| format!("sin({a})")),
            angle().prop_map(|a| format!("cos({a})")),
            angle().prop_map(|a| format!("tan({a})")),
        ]
    })
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = vec![terme.to_string(); n];
    while items.len() > 1 {
        items = items
            .chunks(2)
            .map(|paire| match paire {
                [a, b] => format!("({a}+{b})"),
                [a] => a.clone(),
                _ => unreachable!(),
            })
            .collect();
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fuzz_safe_pipeline_sans_panique(expr in expression()) {
        let p = PreprocesseurExact.preparer(&expr)
            .unwrap_or_else(|e| panic!("préparation refusée: expr={expr:?} err={e}"));
        prop_assert!(!p.a_variables_indefinies());

        // texte normalisé stable (pas de décimaux générés)
        let p2 = PreprocesseurExact.preparer(&p.texte).unwrap();
        prop_assert_eq!(&p2.texte, &p.texte);

        let exact = evaluer(Operation::Simplifie, &p.texte);
        let numerique = evaluer(Operation::Numerique, &p.texte);

        for r in [&exact, &numerique] {
            if let Err(e) = r {
                prop_assert!(is_erreur_attendue(e), "erreur non attendue: expr={:?} err={:?}", expr, e);
            }
        }

        // exact entier => lecture décimale identique
        if let (Ok(x), Ok(n)) = (&exact, &numerique) {
            if x.parse::<i128>().is_ok() {
                prop_assert_eq!(x, n, "expr={:?}", expr);
            }
        }
    }

    #[test]
    fn fuzz_safe_elementaire_sans_panique(expr in expression()) {
        let p = PreprocesseurExact.preparer(&expr).unwrap();
        if let Err(e) = evaluer(Operation::Elementaire, &p.texte) {
            prop_assert!(is_erreur_attendue(&e), "erreur non attendue: expr={:?} err={:?}", expr, e);
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();

    let p = PreprocesseurExact.preparer(&somme_balancee("1/2", 800)).unwrap();
    assert_eq!(evaluer(Operation::Simplifie, &p.texte).unwrap(), "400");
    assert_eq!(evaluer(Operation::Numerique, &p.texte).unwrap(), "400");

    assert!(t0.elapsed() < Duration::from_secs(2), "budget temps dépassé");
}
