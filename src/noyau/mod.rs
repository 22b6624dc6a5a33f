//! Noyau exact Q-pur
//!
//! Organisation interne :
//! - jetons.rs        : tokenisation + texte normalisé
//! - rpn.rs           : shunting-yard + construction Expr
//! - expr.rs          : AST exact + simplifier + coeff*π + trig remarquable
//! - format.rs        : affichage EXACT “joli” (√2/2, 3√5, π/2…)
//! - lecture.rs       : lecture décimale (virgule fixe) + cache π
//! - pretraitement.rs : texte libre -> expression normalisée (Preprocesseur)
//! - eval.rs          : pipeline complet (Evaluateur)

pub mod eval;
pub mod expr;
pub mod format;
pub mod jetons;
pub mod lecture;
pub mod pretraitement;
pub mod rpn;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// collaborateurs branchés sur le moteur
pub use eval::NoyauExact;
pub use pretraitement::PreprocesseurExact;
