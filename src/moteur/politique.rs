//! Politique de repli : numérique demandé + variables sans valeur => simplification.
//!
//! Fonction pure : rend l’opération retenue et l’avis éventuel, sans effet de bord.

use super::interfaces::{ExpressionPreparee, Operation};
use super::messages::Message;

pub fn choisir_operation(
    demandee: Operation,
    preparee: &ExpressionPreparee,
) -> (Operation, Option<Message>) {
    if demandee != Operation::Numerique || !preparee.a_variables_indefinies() {
        return (demandee, None);
    }

    let variables = preparee.variables_indefinies.join(", ");
    let avis = Message::info(format!(
        "Variables sans valeur ({variables}) : simplification au lieu du calcul numérique"
    ));
    (Operation::Simplifie, Some(avis))
}
