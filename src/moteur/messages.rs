//! Messages consultatifs (jamais nécessaires à la correction du calcul).

use parking_lot::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NiveauMessage {
    Info,
    Avertissement,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub niveau: NiveauMessage,
    pub texte: String,
}

impl Message {
    pub fn info(texte: impl Into<String>) -> Self {
        Self {
            niveau: NiveauMessage::Info,
            texte: texte.into(),
        }
    }
}

/// Puits de messages injecté par l’appelant.
pub trait RegistreMessages {
    fn ajouter(&self, message: Message);
}

/// Registre en mémoire : accumule, puis `vider` rend tout d’un coup.
#[derive(Debug, Default)]
pub struct MessagesMemoire {
    messages: Mutex<Vec<Message>>,
}

impl MessagesMemoire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vider(&self) -> Vec<Message> {
        std::mem::take(&mut *self.messages.lock())
    }
}

impl RegistreMessages for MessagesMemoire {
    fn ajouter(&self, message: Message) {
        self.messages.lock().push(message);
    }
}
