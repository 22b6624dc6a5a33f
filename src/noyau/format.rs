// src/noyau/format.rs
//
// Affichage EXACT “joli” des résultats symboliques (simplify / elementary).

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use super::expr::Expr;

/* ------------------------ Helpers ------------------------ */

fn format_rat_pretty(r: &BigRational) -> String {
    let n = r.numer();
    let d = r.denom();
    if d.is_one() {
        format!("{n}")
    } else {
        format!("{n}/{d}")
    }
}

/// (p/q)*√n -> p√n/q ; √n/q si p=1 ; -√n/q si p=-1
fn format_mul_rat_sqrt(r: &BigRational, n: &BigInt) -> String {
    let p = r.numer();
    let q = r.denom();

    if p.is_zero() {
        return "0".to_string();
    }

    let coeff = if p.is_one() {
        String::new()
    } else if *p == BigInt::from(-1) {
        "-".to_string()
    } else {
        format!("{p}")
    };

    if q.is_one() {
        format!("{coeff}√{n}")
    } else {
        format!("{coeff}√{n}/{q}")
    }
}

fn is_zero_expr(e: &Expr) -> bool {
    matches!(e, Expr::Rat(r) if r.is_zero())
}

/// Opérande qui doit être parenthésé dans un produit / quotient.
fn format_facteur(e: &Expr) -> String {
    match e {
        Expr::Add(_, _) | Expr::Sub(_, _) => format!("({})", format_expr_pretty(e)),
        Expr::Rat(r) if !r.denom().is_one() => format!("({})", format_rat_pretty(r)),
        _ => format_expr_pretty(e),
    }
}

/* ------------------------ π “joli” ------------------------ */

/// coeff*π : affichage joli (π/2, 3π/2, -2π, etc.)
pub fn format_coeff_pi(coeff: &BigRational) -> String {
    if coeff.is_zero() {
        return "0".to_string();
    }

    let n = coeff.numer();
    let d = coeff.denom();

    let num = if n.is_one() {
        "π".to_string()
    } else if *n == BigInt::from(-1) {
        "-π".to_string()
    } else {
        format!("{n}π")
    };

    if d.is_one() {
        num
    } else {
        format!("{num}/{d}")
    }
}

/* ------------------------ Affichage EXACT ------------------------ */

/// Formate l’expression EXACT, en privilégiant une sortie lisible:
/// - √2/2, 3√5, -√2/2, etc.
/// - parenthèses seulement autour des sommes dans un produit
pub fn format_expr_pretty(e: &Expr) -> String {
    use Expr::*;

    match e {
        Rat(r) => format_rat_pretty(r),
        Pi => "π".to_string(),
        Var(s) => s.clone(),

        Sqrt(x) => match x.as_ref() {
            Rat(r) if r.denom().is_one() => format!("√{}", r.numer()),
            _ => format!("√({})", format_expr_pretty(x)),
        },

        PowInt(x, n) => match x.as_ref() {
            Var(_) | Pi => format!("{}^{n}", format_expr_pretty(x)),
            _ => format!("({})^{n}", format_expr_pretty(x)),
        },

        Sin(x) => format!("sin({})", format_expr_pretty(x)),
        Cos(x) => format!("cos({})", format_expr_pretty(x)),
        Tan(x) => format!("tan({})", format_expr_pretty(x)),

        Mul(a, b) => match (a.as_ref(), b.as_ref()) {
            (Rat(r), Sqrt(inner)) | (Sqrt(inner), Rat(r)) => match inner.as_ref() {
                Rat(nr) if nr.denom().is_one() => format_mul_rat_sqrt(r, nr.numer()),
                _ => format!("{}*{}", format_facteur(a), format_facteur(b)),
            },
            _ => format!("{}*{}", format_facteur(a), format_facteur(b)),
        },

        Div(a, b) => format!("{}/{}", format_facteur(a), format_facteur(b)),

        Add(a, b) => format!("{}+{}", format_expr_pretty(a), format_expr_pretty(b)),

        // 0 - x => -x (rendu propre), sinon affichage normal
        Sub(a, b) => {
            let sb = match b.as_ref() {
                Add(_, _) | Sub(_, _) => format!("({})", format_expr_pretty(b)),
                _ => format_expr_pretty(b),
            };
            if is_zero_expr(a) {
                format!("-{sb}")
            } else {
                format!("{}-{sb}", format_expr_pretty(a))
            }
        }
    }
}

/// EXACT final : si l’expression est de la forme coeff*π, on affiche π joliment.
/// Sinon, on utilise format_expr_pretty.
pub fn format_exact_final(expr_simplifie: &Expr) -> String {
    if let Some(c) = expr_simplifie.as_coeff_pi() {
        return format_coeff_pi(&c);
    }
    format_expr_pretty(expr_simplifie)
}
