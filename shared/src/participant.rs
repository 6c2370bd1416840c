use serde::{Serialize, Deserialize};

/// One roster entry taking part in a draw. Immutable for the duration of a
/// single draw; ticket counts only change between draws, through the
/// persistence layer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Participant {
    pub id: i32,
    pub name: String,
    pub tickets: u32,
}

/// The declared result of a settled draw.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Winner {
    pub id: i32,
    pub name: String,
}

impl From<&Participant> for Winner {
    fn from(p: &Participant) -> Self {
        Self { id: p.id, name: p.name.clone() }
    }
}

impl Participant {
    pub fn new(id: i32, name: impl Into<String>, tickets: u32) -> Self {
        Self { id, name: name.into(), tickets }
    }
}
