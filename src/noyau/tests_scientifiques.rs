//! Tests scientifiques (campagne) : invariants + robustesse + limites contrôlées.
//!
//! But : trouver les limites sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées (profondeur, longueur)
//! - digits limités pour la lecture décimale
//!
//! Notes (aligné avec l’état actuel du noyau) :
//! - Trig exacte seulement sur les multiples de π/2 ; ailleurs la forme reste symbolique
//!   et seule la lecture décimale donne une valeur.
//! - tan(kπ + π/2) est une erreur arithmétique, qui contamine toute l’expression.
//! - On passe toujours par le préprocesseur, comme le moteur : l’évaluateur ne voit
//!   que du texte normalisé.

use std::time::{Duration, Instant};

use super::{NoyauExact, PreprocesseurExact};
use crate::moteur::interfaces::{Annulation, ErreurCalcul, Evaluateur, Operation, Preprocesseur};

fn eval(op: Operation, expr: &str) -> Result<String, ErreurCalcul> {
    let p = PreprocesseurExact.preparer(expr)?;
    NoyauExact::default().evaluer(op, &p.texte, 5, &Annulation::new())
}

fn assert_exact_eq(expr: &str, attendu: &str) {
    let r = eval(Operation::Simplifie, expr).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"));
    assert_eq!(r.trim(), attendu, "expr={expr:?}");
}

fn assert_indefini(expr: &str) {
    for op in [Operation::Simplifie, Operation::Numerique] {
        match eval(op, expr) {
            Err(ErreurCalcul::Arithmetique(m)) => assert!(m.contains("tangente"), "expr={expr:?} m={m}"),
            autre => panic!("expr={expr:?} op={op} : erreur attendue, obtenu {autre:?}"),
        }
    }
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Invariants trig (quarts de tour) ------------------------ */

#[test]
fn sci_indefinis_tan() {
    assert_indefini("tan(pi/2)");
    assert_indefini("tan(3*pi/2)");
    assert_indefini("tan(-pi/2)");
}

#[test]
fn sci_symetries() {
    // sin(-x) = -sin(x)
    assert_exact_eq("sin(-pi/2)", "-1");
    assert_exact_eq("sin(pi/2)", "1");

    // cos(-x) = cos(x)
    assert_exact_eq("cos(-pi)", "-1");
    assert_exact_eq("cos(pi)", "-1");
}

#[test]
fn sci_periodicite() {
    // sin(x + 2π) = sin(x) : π/2 + 2π = 5π/2
    assert_exact_eq("sin(5*pi/2)", "1");
    // cos(x + 2π) = cos(x)
    assert_exact_eq("cos(3*pi)", "-1");
    // tan(x + π) = tan(x)
    assert_exact_eq("tan(7*pi)", "0");
}

#[test]
fn sci_propagation_indefini() {
    assert_indefini("1 + tan(pi/2)");
    assert_indefini("tan(pi/2) + 1");
    assert_indefini("2 * tan(pi/2)");
    assert_indefini("tan(pi/2) / 3");
}

#[test]
fn sci_angle_quelconque_reste_symbolique() {
    assert_exact_eq("sin(pi/4)", "sin(π/4)");
    let v = eval(Operation::Numerique, "sin(pi/4)").unwrap();
    assert!(v.starts_with("0.70710678118654752"), "v={v}");
}

/* ------------------------ Cohérence algébrique (zéro) ------------------------ */

#[test]
fn sci_zero_algebrique() {
    assert_exact_eq("(1/2 + 1/3) - 5/6", "0");
    assert_exact_eq("(2/3 * 3/4) - 1/2", "0");
    assert_exact_eq("sqrt(2)*sqrt(2) - 2", "0");
    assert_exact_eq("x - x", "0");
}

#[test]
fn sci_numerique_et_exact_coherents() {
    // si l’exact est rationnel, la lecture décimale le restitue
    assert_exact_eq("3/4 + 1/4", "1");
    assert_eq!(eval(Operation::Numerique, "3/4 + 1/4").unwrap(), "1");
    assert_eq!(eval(Operation::Numerique, "1.5 * 2").unwrap(), "3");
    assert_eq!(eval(Operation::Numerique, "2^-2").unwrap(), "0.25");
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_profondeur_sqrt_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    // alterne sqrt / carré : reste un carré parfait rationnel à chaque étape
    let mut expr = "4".to_string();
    for k in 0..60 {
        expr = if k % 2 == 0 {
            format!("sqrt({expr})")
        } else {
            format!("({expr})^2")
        };
    }

    assert_exact_eq(&expr, "4");
    budget(t0, max);
}

#[test]
fn sci_stress_taille_somme_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    // 80 termes : suffisant pour détecter une régression, sans exploser la pile
    let expr = vec!["1/2"; 80].join(" + ");
    assert_exact_eq(&expr, "40");
    budget(t0, max);
}

#[test]
fn sci_stress_bigint_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    // gros numérateur contrôlé (100 chiffres)
    let big = "9".repeat(100);
    assert_exact_eq(&format!("{big}/7 + 1/7"), &format!("1{}/7", "0".repeat(100)));
    budget(t0, max);
}

#[test]
fn sci_puissance_demesuree_refusee() {
    let e = eval(Operation::Numerique, "10^100000000").unwrap_err();
    assert_eq!(e, ErreurCalcul::Arithmetique("puissance trop grande".into()));
}
