// src/noyau/lecture.rs
//
// Lecture décimale : évaluation en entiers “scalés” (×10^digits), sans flottants.
// Toutes les séries et itérations consultent le jeton d’annulation.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::OnceLock;

use super::expr::{rational_pow_int, Expr};
use crate::moteur::interfaces::{Annulation, ErreurCalcul};

/// Chiffres de garde ajoutés pendant le calcul puis retirés.
const GARDE: usize = 10;

/* ------------------------ Décimal (scaled -> texte) ------------------------ */

fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// Convertit un entier “scalé” (×10^digits) en texte décimal tronqué.
pub fn scaled_to_decimal(mut scaled: BigInt, digits: usize) -> String {
    let neg = scaled.is_negative();
    if neg {
        scaled = -scaled;
    }

    let scale = pow10(digits);
    let int_part = &scaled / &scale;
    let frac_part = &scaled % &scale;
    let signe = if neg { "-" } else { "" };

    if digits == 0 {
        return format!("{signe}{int_part}");
    }

    let mut frac = frac_part.to_str_radix(10);
    while frac.len() < digits {
        frac.insert(0, '0');
    }

    format!("{signe}{int_part}.{frac}")
}

/// Comme `scaled_to_decimal`, sans zéros de fin ni "-0".
pub fn decimal_compact(scaled: BigInt, digits: usize) -> String {
    let mut s = scaled_to_decimal(scaled, digits);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s.remove(0);
    }
    s
}

/// r -> entier “scalé” = r * 10^digits (tronqué vers zéro)
fn rational_scaled(r: &BigRational, digits: usize) -> BigInt {
    (r.numer() * pow10(digits)) / r.denom()
}

/* ------------------------ π (Machin) + cache ------------------------ */

/// arctan(1/q) en entier scalé via série : atan(z) = z - z^3/3 + z^5/5 - ...
fn arctan_inv_q_scaled(q: i64, scale: &BigInt, ann: &Annulation) -> Result<BigInt, ErreurCalcul> {
    let q = BigInt::from(q);
    let q2 = &q * &q;

    let mut k: u64 = 0;
    let mut q_pow = q.clone(); // q^(2k+1)
    let mut sum = BigInt::zero();

    loop {
        ann.verifier()?;

        let term = scale / (&q_pow * BigInt::from(2 * k + 1));
        if term.is_zero() {
            break;
        }
        if k % 2 == 0 {
            sum += &term;
        } else {
            sum -= &term;
        }

        q_pow *= &q2;
        k += 1;
    }

    Ok(sum)
}

fn pi_scaled_compute(digits: usize, ann: &Annulation) -> Result<BigInt, ErreurCalcul> {
    let scale = pow10(digits + GARDE);

    // Machin : π = 16*atan(1/5) - 4*atan(1/239)
    let a = arctan_inv_q_scaled(5, &scale, ann)?;
    let b = arctan_inv_q_scaled(239, &scale, ann)?;

    Ok((BigInt::from(16) * a - BigInt::from(4) * b) / pow10(GARDE))
}

static PI_CACHE: OnceLock<Mutex<HashMap<usize, BigInt>>> = OnceLock::new();

/// π scalé, mis en cache par précision. Un calcul interrompu n’est pas mémorisé.
fn pi_scaled_cached(digits: usize, ann: &Annulation) -> Result<BigInt, ErreurCalcul> {
    let cache = PI_CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    if let Some(v) = cache.lock().get(&digits) {
        return Ok(v.clone());
    }

    // calcul hors verrou : un fil abandonné ne doit pas bloquer les suivants
    let v = pi_scaled_compute(digits, ann)?;
    cache.lock().insert(digits, v.clone());
    Ok(v)
}

/* ------------------------ sin / cos (Taylor) ------------------------ */

/// Ramène x (scalé) dans [-π, π].
fn reduire_angle(x: BigInt, digits: usize, ann: &Annulation) -> Result<BigInt, ErreurCalcul> {
    let pi = pi_scaled_cached(digits, ann)?;
    let deux_pi = &pi * BigInt::from(2);

    let mut r = &x % &deux_pi;
    if r.is_negative() {
        r += &deux_pi;
    }
    if r > pi {
        r -= &deux_pi;
    }
    Ok(r)
}

/// Série de Taylor commune : premier terme `t0`, rang initial `n0` (1 pour sin, 0 pour cos).
fn serie_trig(
    x: &BigInt,
    t0: BigInt,
    n0: u64,
    digits: usize,
    ann: &Annulation,
) -> Result<BigInt, ErreurCalcul> {
    let scale2 = pow10(2 * digits);
    let x2 = x * x;

    let mut term = t0;
    let mut n = n0;
    let mut sum = BigInt::zero();

    while !term.is_zero() {
        ann.verifier()?;
        sum += &term;
        term = -(&term * &x2) / &scale2 / BigInt::from((n + 1) * (n + 2));
        n += 2;
    }

    Ok(sum)
}

fn sin_scaled(x: BigInt, digits: usize, ann: &Annulation) -> Result<BigInt, ErreurCalcul> {
    let r = reduire_angle(x, digits, ann)?;
    serie_trig(&r, r.clone(), 1, digits, ann)
}

fn cos_scaled(x: BigInt, digits: usize, ann: &Annulation) -> Result<BigInt, ErreurCalcul> {
    let r = reduire_angle(x, digits, ann)?;
    serie_trig(&r, pow10(digits), 0, digits, ann)
}

/* ------------------------ Lecture : évaluation scalée ------------------------ */

fn division_par_zero() -> ErreurCalcul {
    ErreurCalcul::Arithmetique("division par zéro".into())
}

/// Évalue une expression en entier “scalé” (×10^digits).
/// - Var : erreur (aucune valeur connue).
/// - Pi : cache.
pub fn eval_scaled(expr: &Expr, digits: usize, ann: &Annulation) -> Result<BigInt, ErreurCalcul> {
    use Expr::*;

    ann.verifier()?;
    let scale = pow10(digits);

    match expr {
        Var(name) => Err(ErreurCalcul::Arithmetique(format!(
            "variable sans valeur: {name}"
        ))),

        Rat(r) => Ok(rational_scaled(r, digits)),
        Pi => pi_scaled_cached(digits, ann),

        Add(a, b) => Ok(eval_scaled(a, digits, ann)? + eval_scaled(b, digits, ann)?),
        Sub(a, b) => Ok(eval_scaled(a, digits, ann)? - eval_scaled(b, digits, ann)?),

        Mul(a, b) => {
            let sa = eval_scaled(a, digits, ann)?;
            let sb = eval_scaled(b, digits, ann)?;
            Ok((sa * sb) / &scale)
        }

        Div(a, b) => {
            let sa = eval_scaled(a, digits, ann)?;
            let sb = eval_scaled(b, digits, ann)?;
            if sb.is_zero() {
                return Err(division_par_zero());
            }
            Ok((sa * &scale) / sb)
        }

        PowInt(base, n) => {
            if let Rat(r) = base.as_ref() {
                return Ok(rational_scaled(&rational_pow_int(r, *n, ann)?, digits));
            }

            let b = eval_scaled(base, digits, ann)?;
            let mut e = n.unsigned_abs();
            let mut acc = scale.clone();
            let mut carre = b;
            while e > 0 {
                ann.verifier()?;
                if (e & 1) == 1 {
                    acc = (&acc * &carre) / &scale;
                }
                e >>= 1;
                if e > 0 {
                    carre = (&carre * &carre) / &scale;
                }
            }

            if *n < 0 {
                if acc.is_zero() {
                    return Err(division_par_zero());
                }
                return Ok((&scale * &scale) / acc);
            }
            Ok(acc)
        }

        Sqrt(x) => {
            let sx = eval_scaled(x, digits, ann)?;
            if sx.is_negative() {
                return Err(ErreurCalcul::Arithmetique(
                    "racine carrée d’un nombre négatif".into(),
                ));
            }
            // √(sx/10^d) * 10^d = √(sx * 10^d)
            Ok((sx * &scale).sqrt())
        }

        Sin(x) => sin_scaled(eval_scaled(x, digits, ann)?, digits, ann),
        Cos(x) => cos_scaled(eval_scaled(x, digits, ann)?, digits, ann),

        Tan(x) => {
            let sx = eval_scaled(x, digits, ann)?;
            let s = sin_scaled(sx.clone(), digits, ann)?;
            let c = cos_scaled(sx, digits, ann)?;
            if c.is_zero() {
                return Err(ErreurCalcul::Arithmetique(
                    "tangente indéfinie (division par zéro)".into(),
                ));
            }
            Ok((s * &scale) / c)
        }
    }
}

/// Valeur décimale (texte compact) à `digits` chiffres après la virgule.
/// Calcul avec chiffres de garde, puis troncature.
pub fn lecture_decimale(
    expr: &Expr,
    digits: usize,
    ann: &Annulation,
) -> Result<String, ErreurCalcul> {
    let scaled = eval_scaled(expr, digits.saturating_add(GARDE), ann)?;
    Ok(decimal_compact(scaled / pow10(GARDE), digits))
}
