// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> AST
//
// Règles:
// - Ident(name):
//    - si name ∈ FONCTIONS => fonction unaire (postfixée en RPN)
//    - sinon => variable/atome (Expr::Var)
// - Moins unaire:
//    - si '-' arrive quand on n’attend PAS une valeur, on injecte 0 : "-x" => "0 x -"
//
// NOTE:
// - Les fonctions sont traitées comme des opérateurs “collés” à leur argument
//   et sont sorties après la parenthèse fermante.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

use super::expr::Expr;
use super::jetons::Tok;

/// Fonctions unaires reconnues.
pub const FONCTIONS: [&str; 4] = ["sin", "cos", "tan", "sqrt"];

fn precedence(t: &Tok) -> i32 {
    match t {
        Tok::Plus | Tok::Minus => 1,
        Tok::Star | Tok::Slash => 2,
        Tok::Caret => 3,
        _ => 0,
    }
}

fn is_right_associative(t: &Tok) -> bool {
    matches!(t, Tok::Caret)
}

pub fn is_fonction_ident(name: &str) -> bool {
    FONCTIONS.contains(&name)
}

/// Vrai si `top` bloque le dépilement : '(' ou une fonction en attente d’argument.
fn bloque_depilement(top: &Tok) -> bool {
    match top {
        Tok::LPar => true,
        Tok::Ident(name) => is_fonction_ident(name),
        _ => false,
    }
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Ident("sin"), LPar, Pi, Slash, Num(2), RPar]
///   rpn:    [Pi, Num(2), Slash, Ident("sin")]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Tok>, String> {
    let mut out: Vec<Tok> = Vec::new();
    let mut ops: Vec<Tok> = Vec::new();

    // “valeur” = un atome ou une expression fermée (sert au moins unaire).
    let mut prev_was_value = false;

    for tok in tokens.iter().cloned() {
        match tok {
            Tok::Num(_) | Tok::Pi => {
                out.push(tok);
                prev_was_value = true;
            }

            Tok::Ident(name) => {
                prev_was_value = !is_fonction_ident(&name);
                if prev_was_value {
                    out.push(Tok::Ident(name));
                } else {
                    ops.push(Tok::Ident(name));
                }
            }

            Tok::LPar => {
                ops.push(tok);
                prev_was_value = false;
            }

            Tok::RPar => {
                let mut ouverte = false;
                while let Some(top) = ops.pop() {
                    if matches!(top, Tok::LPar) {
                        ouverte = true;
                        break;
                    }
                    out.push(top);
                }
                if !ouverte {
                    return Err("parenthèse fermante sans ouvrante".into());
                }

                // fonction au sommet : elle sort avec son argument
                if matches!(ops.last(), Some(Tok::Ident(name)) if is_fonction_ident(name)) {
                    if let Some(f) = ops.pop() {
                        out.push(f);
                    }
                }

                prev_was_value = true;
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                // moins unaire : injecte 0, et ne dépile rien (lie l’opérande suivant)
                if matches!(tok, Tok::Minus) && !prev_was_value {
                    out.push(Tok::Num(BigRational::zero()));
                    ops.push(tok);
                    continue;
                }

                while let Some(top) = ops.last() {
                    if bloque_depilement(top) {
                        break;
                    }

                    let p_top = precedence(top);
                    let p_tok = precedence(&tok);

                    let doit_pop = if is_right_associative(&tok) {
                        p_top > p_tok
                    } else {
                        p_top >= p_tok
                    };
                    if !doit_pop {
                        break;
                    }
                    if let Some(op) = ops.pop() {
                        out.push(op);
                    }
                }

                ops.push(tok);
                prev_was_value = false;
            }
        }
    }

    while let Some(op) = ops.pop() {
        if matches!(op, Tok::LPar) {
            return Err("parenthèses non fermées".into());
        }
        out.push(op);
    }

    Ok(out)
}

/// Construit une Expr à partir d’une RPN.
pub fn from_rpn(rpn: &[Tok]) -> Result<Expr, String> {
    let mut st: Vec<Expr> = Vec::new();

    for tok in rpn.iter().cloned() {
        match tok {
            Tok::Num(r) => st.push(Expr::Rat(r)),
            Tok::Pi => st.push(Expr::Pi),

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                let b = st.pop().ok_or("expression invalide")?;
                let a = st.pop().ok_or("expression invalide")?;

                let e = match tok {
                    Tok::Plus => Expr::Add(Box::new(a), Box::new(b)),
                    Tok::Minus => Expr::Sub(Box::new(a), Box::new(b)),
                    Tok::Star => Expr::Mul(Box::new(a), Box::new(b)),
                    Tok::Slash => Expr::Div(Box::new(a), Box::new(b)),
                    _ => Expr::PowInt(Box::new(a), exposant_entier(&b)?),
                };

                st.push(e);
            }

            Tok::Ident(name) => {
                if is_fonction_ident(&name) {
                    let x = Box::new(st.pop().ok_or("fonction sans argument")?);
                    st.push(match name.as_str() {
                        "sqrt" => Expr::Sqrt(x),
                        "sin" => Expr::Sin(x),
                        "cos" => Expr::Cos(x),
                        _ => Expr::Tan(x),
                    });
                } else {
                    st.push(Expr::Var(name));
                }
            }

            Tok::LPar | Tok::RPar => return Err("parenthèse inattendue en RPN".into()),
        }
    }

    match (st.pop(), st.is_empty()) {
        (Some(e), true) => Ok(e),
        _ => Err("expression invalide".into()),
    }
}

/// Exposant entier seulement, éventuellement négatif ("2^-1" => Sub(0, 1)).
fn exposant_entier(b: &Expr) -> Result<i64, String> {
    let r = match b {
        Expr::Rat(r) => r.clone(),
        Expr::Sub(z, x) => match (z.as_ref(), x.as_ref()) {
            (Expr::Rat(z), Expr::Rat(x)) if z.is_zero() => -x.clone(),
            _ => return Err("exposant doit être entier".into()),
        },
        _ => return Err("exposant doit être entier".into()),
    };
    if !r.denom().is_one() {
        return Err("exposant doit être entier".into());
    }
    big_to_i64(r.numer()).ok_or_else(|| "exposant trop grand".into())
}

fn big_to_i64(x: &BigInt) -> Option<i64> {
    x.to_i64()
}
