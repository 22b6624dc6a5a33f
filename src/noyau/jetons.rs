// src/noyau/jetons.rs

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok {
    Num(BigRational),
    Pi,

    // Fonctions + variables (tout ce qui n’est pas pi / opérateur / nombre)
    // NOTE: le parse (RPN->Expr) décidera si c’est une fonction (sin/cos/...) ou une variable.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Caret, // ^

    LPar,
    RPar,
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - entiers (ex: 12) et décimaux (ex: 1.25, .5) -> Num exact
/// - opérateurs + - * / ^ (et ×, ÷, − en unicode)
/// - parenthèses ( )
/// - π ou pi
/// - identifiants [a-zA-Z_][a-zA-Z0-9_]* (normalisés en minuscules)
/// - √ (équivaut à ident("sqrt"))
///
/// Pas de fraction littérale : "1/0" reste une division (l’erreur est arithmétique,
/// pas syntaxique).
pub fn tokenize(s: &str) -> Result<Vec<Tok>, String> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let simple = match c {
            '(' => Some(Tok::LPar),
            ')' => Some(Tok::RPar),
            '+' => Some(Tok::Plus),
            '-' | '−' => Some(Tok::Minus),
            '*' | '×' => Some(Tok::Star),
            '/' | '÷' => Some(Tok::Slash),
            '^' => Some(Tok::Caret),
            'π' => Some(Tok::Pi),
            '√' => Some(Tok::Ident("sqrt".to_string())),
            _ => None,
        };
        if let Some(t) = simple {
            out.push(t);
            i += 1;
            continue;
        }

        // Identifiants ASCII : [a-zA-Z_][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let w = word.to_lowercase();

            // Normalisation : "pi" / "PI" devient Tok::Pi
            if w == "pi" {
                out.push(Tok::Pi);
            } else {
                out.push(Tok::Ident(w));
            }
            continue;
        }

        // Nombre : entier, ou décimal avec '.'
        if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let int_str: String = chars[start..i].iter().collect();

            let mut frac_str = String::new();
            if i < chars.len() && chars[i] == '.' {
                i += 1;
                let start_f = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                frac_str = chars[start_f..i].iter().collect();
            }

            if int_str.is_empty() && frac_str.is_empty() {
                return Err("nombre invalide: '.'".into());
            }

            out.push(Tok::Num(decimal_exact(&int_str, &frac_str)?));
            continue;
        }

        return Err(format!("caractère inattendu: '{c}'"));
    }

    Ok(out)
}

/// "12" + "05" -> 1205/100 (réduit par num_rational)
fn decimal_exact(int_str: &str, frac_str: &str) -> Result<BigRational, String> {
    let chiffres = format!("{int_str}{frac_str}");
    let n = BigInt::parse_bytes(chiffres.as_bytes(), 10).ok_or("nombre invalide")?;
    let d = BigInt::from(10).pow(frac_str.len() as u32);
    Ok(BigRational::new(n, d))
}

/// Texte normalisé d’une liste de jetons.
///
/// Sert de clé (cache des calculs trop longs) et d’entrée pour l’évaluateur :
/// la sortie doit pouvoir être re-tokenisée vers les mêmes jetons.
/// Un rationnel non entier est parenthésé, sinon "2^(3/2)" deviendrait "2^3/2".
pub fn format_tokens(tokens: &[Tok]) -> String {
    fn format_rat(r: &BigRational) -> String {
        let n = r.numer();
        let d = r.denom();
        if d.is_one() {
            format!("{n}")
        } else {
            format!("({n}/{d})")
        }
    }

    let mut out = Vec::new();
    for t in tokens {
        let s = match t {
            Tok::Num(r) => format_rat(r),
            Tok::Pi => "pi".to_string(),
            Tok::Ident(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Caret => "^".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}
