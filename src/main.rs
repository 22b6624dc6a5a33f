// src/main.rs
//
// Calculatrice bornée — point d’entrée terminal
// ---------------------------------------------
// - configuration lue une fois dans l’environnement (CALC_RESULT_PRECISION, CALC_TIMEOUT_MS, ...)
// - traces seulement si RUST_LOG est positionné
// - un seul moteur pour toute la session
// - avec des arguments : chacun est évalué (numérique), sans session interactive

mod app;
mod moteur;
mod noyau;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;

use app::AppCalc;
use moteur::config::{ConfigMoteur, SourceEnv};
use moteur::interfaces::Operation;
use moteur::Moteur;

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> ExitCode {
    init_tracing();

    let config = match ConfigMoteur::depuis_source(&SourceEnv) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration refusée : {e}");
            return ExitCode::from(2);
        }
    };
    info!(?config, "démarrage");

    let moteur = Arc::new(Moteur::new(config));

    let arguments: Vec<String> = std::env::args().skip(1).collect();
    if !arguments.is_empty() {
        return match app::evaluer_arguments(&moteur, Operation::Numerique, &arguments, io::stdout().lock()) {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                eprintln!("entrée/sortie : {e}");
                ExitCode::FAILURE
            }
        };
    }

    let mut app = AppCalc::new(moteur);
    println!("Calculatrice bornée (:aide pour l’aide)");

    match app.session(io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("entrée/sortie : {e}");
            ExitCode::FAILURE
        }
    }
}
