//! Formatage des nombres (arrondi, séparateur de milliers) et post-traitement
//! des résultats selon l’opération.
//!
//! Tout passe par un rationnel exact : pas de double arrondi binaire/décimal.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::config::{ConfigMoteur, PRECISION_MAX};
use super::interfaces::Operation;

/// Chiffres après la virgule quand on formate sans arrondi demandé.
const FRACTION_MAX_SANS_ARRONDI: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ModeArrondi {
    DemiHaut,
    DemiPair,
}

/// Formate une valeur flottante selon la configuration.
///
/// - NaN / infini : texte brut.
/// - `round` et arrondi actif : arrondi demi-haut à `precision` chiffres, zéros de fin retirés.
/// - `round` et arrondi inactif : texte brut.
/// - sans `round` : au plus 3 chiffres après la virgule (demi-pair).
pub fn format_nombre(value: f64, round: bool, config: &ConfigMoteur) -> String {
    match BigRational::from_float(value) {
        Some(r) if !(round && !config.arrondir) => format_rationnel(&r, round, config),
        _ => value.to_string(),
    }
}

fn format_rationnel(r: &BigRational, round: bool, config: &ConfigMoteur) -> String {
    let (fraction_max, mode) = if round {
        (config.precision.min(PRECISION_MAX), ModeArrondi::DemiHaut)
    } else {
        (FRACTION_MAX_SANS_ARRONDI, ModeArrondi::DemiPair)
    };

    let scale = BigInt::from(10).pow(fraction_max as u32);
    let arrondi = arrondir(&(r.abs() * BigRational::from_integer(scale.clone())), mode);

    let entier = &arrondi / &scale;
    let mut fraction = (&arrondi % &scale).to_str_radix(10);
    while fraction.len() < fraction_max {
        fraction.insert(0, '0');
    }
    let fraction = fraction.trim_end_matches('0');

    let signe = if r.is_negative() && !arrondi.is_zero() {
        "-"
    } else {
        ""
    };
    let entier = grouper(&entier.to_str_radix(10), config.separateur);

    if fraction.is_empty() {
        format!("{signe}{entier}")
    } else {
        format!("{signe}{entier}.{fraction}")
    }
}

/// Arrondi d’un rationnel positif à l’entier.
fn arrondir(x: &BigRational, mode: ModeArrondi) -> BigInt {
    let bas = x.floor();
    let reste = x - &bas;
    let demi = BigRational::new(BigInt::one(), BigInt::from(2));
    let bas = bas.to_integer();

    let monter = match mode {
        ModeArrondi::DemiHaut => reste >= demi,
        ModeArrondi::DemiPair => reste > demi || (reste == demi && (&bas % BigInt::from(2)).is_one()),
    };
    if monter {
        bas + 1u32
    } else {
        bas
    }
}

/// "1234567" -> "1 234 567"
fn grouper(chiffres: &str, separateur: Option<char>) -> String {
    let Some(sep) = separateur else {
        return chiffres.to_string();
    };

    let n = chiffres.len();
    let mut out = String::with_capacity(n + n / 3);
    for (i, c) in chiffres.chars().enumerate() {
        if i > 0 && (n - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

/// Lit un décimal texte ("-12.05") en rationnel exact.
fn lire_decimal(texte: &str) -> Option<BigRational> {
    let (neg, corps) = match texte.strip_prefix('-') {
        Some(reste) => (true, reste),
        None => (false, texte),
    };
    let (ent, frac) = corps.split_once('.').unwrap_or((corps, ""));
    if ent.is_empty() || !ent.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let n = BigInt::parse_bytes(format!("{ent}{frac}").as_bytes(), 10)?;
    let r = BigRational::new(n, BigInt::from(10).pow(frac.len() as u32));
    Some(if neg { -r } else { r })
}

/// Post-traitement du texte rendu par l’évaluateur, selon l’opération effectivement utilisée.
pub fn depuis_processeur(operation: Operation, texte: &str, config: &ConfigMoteur) -> String {
    let texte = texte.trim();
    match operation {
        Operation::Numerique => match lire_decimal(texte) {
            Some(_) if !config.arrondir => texte.to_string(),
            Some(r) => format_rationnel(&r, true, config),
            None => texte.to_string(),
        },
        Operation::Simplifie | Operation::Elementaire => texte.to_string(),
    }
}
