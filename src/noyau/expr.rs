// src/noyau/expr.rs
//
// AST exact (sans flottants).
// - Rat : rationnel exact
// - Pi  : symbole π
// - Var : variable symbolique (ex: x)
//
// IMPORTANT (SAFE):
// - simplifier() ne doit jamais “inventer” une valeur pour Var.
// - simplifier() consulte le jeton d’annulation dans ses boucles longues (puissances),
//   le contrôleur de délai doit pouvoir reprendre la main.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use std::fmt;

use crate::moteur::interfaces::{Annulation, ErreurCalcul};

/// Garde-fou mémoire : taille maximale (en bits) d’une puissance exacte.
const BITS_PUISSANCE_MAX: u64 = 1 << 24;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Rat(BigRational),
    Pi,
    Var(String),

    Sqrt(Box<Expr>),        // √(x)
    PowInt(Box<Expr>, i64), // x^n (n entier)

    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Tan(Box<Expr>),

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Simplification locale (SAFE), sans heuristiques.
    /// Erreur arithmétique sur division par zéro exacte.
    pub fn simplifier(self, ann: &Annulation) -> Result<Expr, ErreurCalcul> {
        use Expr::*;

        ann.verifier()?;

        let e = match self {
            Rat(_) | Pi | Var(_) => self,

            Add(a, b) => {
                let a = a.simplifier(ann)?;
                let b = b.simplifier(ann)?;
                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x + y),
                    (Rat(x), _) if x.is_zero() => b,
                    (_, Rat(y)) if y.is_zero() => a,
                    _ => Add(Box::new(a), Box::new(b)),
                }
            }

            Sub(a, b) => {
                let a = a.simplifier(ann)?;
                let b = b.simplifier(ann)?;

                // x - x => 0
                if a == b {
                    return Ok(Rat(BigRational::zero()));
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x - y),
                    (_, Rat(y)) if y.is_zero() => a,
                    _ => Sub(Box::new(a), Box::new(b)),
                }
            }

            Mul(a, b) => {
                let a = a.simplifier(ann)?;
                let b = b.simplifier(ann)?;

                // √x * √x => x
                if let (Sqrt(x), Sqrt(y)) = (&a, &b) {
                    if x == y {
                        return Ok(*x.clone());
                    }
                    // √u * √v => √(u*v) si u,v rationnels >= 0
                    if let (Rat(ru), Rat(rv)) = (x.as_ref(), y.as_ref()) {
                        if !ru.is_negative() && !rv.is_negative() {
                            return Sqrt(Box::new(Rat(ru * rv))).simplifier(ann);
                        }
                    }
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x * y),
                    (Rat(x), _) | (_, Rat(x)) if x.is_zero() => Rat(BigRational::zero()),
                    (Rat(x), _) if x.is_one() => b,
                    (_, Rat(y)) if y.is_one() => a,
                    _ => Mul(Box::new(a), Box::new(b)),
                }
            }

            Div(a, b) => {
                let a = a.simplifier(ann)?;
                let b = b.simplifier(ann)?;

                if matches!(&b, Rat(y) if y.is_zero()) {
                    return Err(ErreurCalcul::Arithmetique("division par zéro".into()));
                }

                // π/π, √r/√r => 1 (jamais nuls après simplification)
                if a == b && matches!(&a, Pi | Sqrt(_)) && !contient_var(&a) {
                    return Ok(Rat(BigRational::one()));
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x / y),
                    (_, Rat(y)) if y.is_one() => a,
                    _ => Div(Box::new(a), Box::new(b)),
                }
            }

            PowInt(base, n) => {
                let base = base.simplifier(ann)?;
                if n == 0 {
                    return Ok(Rat(BigRational::one()));
                }
                if let Rat(r) = &base {
                    return Ok(Rat(rational_pow_int(r, n, ann)?));
                }
                if n == 1 {
                    base
                } else {
                    PowInt(Box::new(base), n)
                }
            }

            Sqrt(x) => {
                let x = x.simplifier(ann)?;
                if let Rat(r) = &x {
                    if r.is_negative() {
                        return Err(ErreurCalcul::Arithmetique(
                            "racine carrée d’un nombre négatif".into(),
                        ));
                    }
                    if let Some(s) = rational_sqrt_exact(r) {
                        return Ok(Rat(s));
                    }
                }
                Sqrt(Box::new(x))
            }

            Sin(x) => trig_remarquable(TrigFn::Sin, x.simplifier(ann)?)?,
            Cos(x) => trig_remarquable(TrigFn::Cos, x.simplifier(ann)?)?,
            Tan(x) => trig_remarquable(TrigFn::Tan, x.simplifier(ann)?)?,
        };

        Ok(e)
    }

    /// Réécriture en fonctions élémentaires : tan(x) -> sin(x)/cos(x).
    pub fn elementaire(self) -> Expr {
        use Expr::*;

        let b = |e: Box<Expr>| Box::new(e.elementaire());
        match self {
            Rat(_) | Pi | Var(_) => self,
            Tan(x) => {
                let x = x.elementaire();
                Div(Box::new(Sin(Box::new(x.clone()))), Box::new(Cos(Box::new(x))))
            }
            Sin(x) => Sin(b(x)),
            Cos(x) => Cos(b(x)),
            Sqrt(x) => Sqrt(b(x)),
            PowInt(x, n) => PowInt(b(x), n),
            Add(x, y) => Add(b(x), b(y)),
            Sub(x, y) => Sub(b(x), b(y)),
            Mul(x, y) => Mul(b(x), b(y)),
            Div(x, y) => Div(b(x), b(y)),
        }
    }

    /// Détecte un coeff·π (forme simple).
    ///
    /// SAFE: Var => None (on ne “devine” rien).
    pub fn as_coeff_pi(&self) -> Option<BigRational> {
        use Expr::*;

        match self {
            Pi => Some(BigRational::one()),

            Mul(a, b) => match (a.as_ref(), b.as_ref()) {
                (Rat(r), x) | (x, Rat(r)) => x.as_coeff_pi().map(|c| c * r),
                _ => None,
            },

            Div(a, b) => match b.as_ref() {
                Rat(r) if !r.is_zero() => a.as_coeff_pi().map(|c| c / r),
                _ => None,
            },

            // Sub(0, x) => -coeff(x)
            Sub(a, b) => match a.as_ref() {
                Rat(r0) if r0.is_zero() => b.as_coeff_pi().map(|c| -c),
                _ => None,
            },

            _ => None,
        }
    }
}

/* ------------------------ Trig : valeurs remarquables seulement ------------------------ */

#[derive(Clone, Copy, Debug)]
enum TrigFn {
    Sin,
    Cos,
    Tan,
}

/// sin/cos/tan exacts sur 0 et les multiples entiers de π/2 ; sinon forme symbolique.
fn trig_remarquable(f: TrigFn, x: Expr) -> Result<Expr, ErreurCalcul> {
    let coeff = match &x {
        Expr::Rat(r) if r.is_zero() => Some(BigRational::zero()),
        _ => x.as_coeff_pi(),
    };

    // quart de tour k tel que x = k·π/2
    let quart = coeff
        .map(|c| c * BigRational::from_integer(BigInt::from(2)))
        .filter(|q| q.is_integer())
        .and_then(|q| quart_de_tour(&q.to_integer()));

    let Some(k) = quart else {
        return Ok(match f {
            TrigFn::Sin => Expr::Sin(Box::new(x)),
            TrigFn::Cos => Expr::Cos(Box::new(x)),
            TrigFn::Tan => Expr::Tan(Box::new(x)),
        });
    };

    let entier = |n: i64| Expr::Rat(BigRational::from_integer(BigInt::from(n)));
    let (sin, cos) = match k {
        0 => (0, 1),
        1 => (1, 0),
        2 => (0, -1),
        _ => (-1, 0),
    };

    match f {
        TrigFn::Sin => Ok(entier(sin)),
        TrigFn::Cos => Ok(entier(cos)),
        TrigFn::Tan if cos == 0 => Err(ErreurCalcul::Arithmetique(
            "tangente indéfinie (division par zéro)".into(),
        )),
        TrigFn::Tan => Ok(entier(0)),
    }
}

/// k mod 4 (toujours dans [0, 4)).
fn quart_de_tour(k: &BigInt) -> Option<i64> {
    let quatre = BigInt::from(4);
    let mut r = k % &quatre;
    if r.is_negative() {
        r += &quatre;
    }
    r.to_i64()
}

/// Vrai si l’expression mentionne au moins une variable.
pub fn contient_var(expr: &Expr) -> bool {
    use Expr::*;
    match expr {
        Var(_) => true,
        Rat(_) | Pi => false,
        Sqrt(x) | Sin(x) | Cos(x) | Tan(x) | PowInt(x, _) => contient_var(x),
        Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) => contient_var(a) || contient_var(b),
    }
}

/* ------------------------ Affichage debug (pas “joli” final) ------------------------ */

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;
        match self {
            Rat(r) => {
                let n = r.numer();
                let d = r.denom();
                if d.is_one() {
                    write!(f, "{n}")
                } else {
                    write!(f, "{n}/{d}")
                }
            }
            Pi => write!(f, "π"),
            Var(s) => write!(f, "{s}"),
            Sqrt(x) => write!(f, "√({x})"),
            PowInt(x, n) => write!(f, "({x})^{n}"),
            Sin(x) => write!(f, "sin({x})"),
            Cos(x) => write!(f, "cos({x})"),
            Tan(x) => write!(f, "tan({x})"),
            Add(a, b) => write!(f, "({a}+{b})"),
            Sub(a, b) => write!(f, "({a}-{b})"),
            Mul(a, b) => write!(f, "({a}*{b})"),
            Div(a, b) => write!(f, "({a}/{b})"),
        }
    }
}

/* ------------------------ Outils rationnels ------------------------ */

/// base^exp exact, exponentiation rapide interruptible.
pub(crate) fn rational_pow_int(
    base: &BigRational,
    exp: i64,
    ann: &Annulation,
) -> Result<BigRational, ErreurCalcul> {
    if exp < 0 && base.is_zero() {
        return Err(ErreurCalcul::Arithmetique("division par zéro".into()));
    }

    let mut e = exp.unsigned_abs();
    let bits = base.numer().bits().max(base.denom().bits());
    if bits.saturating_mul(e) > BITS_PUISSANCE_MAX {
        return Err(ErreurCalcul::Arithmetique("puissance trop grande".into()));
    }

    let mut acc = BigRational::one();
    let mut b = base.clone();

    while e > 0 {
        ann.verifier()?;
        if (e & 1) == 1 {
            acc *= &b;
        }
        e >>= 1;
        if e > 0 {
            b = &b * &b;
        }
    }

    Ok(if exp < 0 { acc.recip() } else { acc })
}

fn rational_sqrt_exact(r: &BigRational) -> Option<BigRational> {
    if r.is_negative() {
        return None;
    }
    let sn = int_sqrt_exact(r.numer())?;
    let sd = int_sqrt_exact(r.denom())?;
    Some(BigRational::new(sn, sd))
}

fn int_sqrt_exact(x: &BigInt) -> Option<BigInt> {
    let s = x.sqrt();
    if &s * &s == *x {
        Some(s)
    } else {
        None
    }
}
