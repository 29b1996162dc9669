use serde::{Deserialize, Serialize};

/// Player intents collected for one tick
///
/// `soft_drop` reflects whether the key is held during the tick; the other
/// fields are key-down events that happened since the previous tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputIntents {
    pub move_left: bool,
    pub move_right: bool,
    pub rotate: bool,
    pub soft_drop: bool,
    pub quit: bool,
}

impl InputIntents {
    /// No input at all
    pub fn none() -> Self {
        Self::default()
    }

    pub fn left() -> Self {
        InputIntents { move_left: true, ..Self::default() }
    }

    pub fn right() -> Self {
        InputIntents { move_right: true, ..Self::default() }
    }

    pub fn rotate() -> Self {
        InputIntents { rotate: true, ..Self::default() }
    }

    pub fn soft_drop() -> Self {
        InputIntents { soft_drop: true, ..Self::default() }
    }

    pub fn quit() -> Self {
        InputIntents { quit: true, ..Self::default() }
    }

    /// Combine intents gathered from several events
    pub fn merge(self, other: InputIntents) -> Self {
        InputIntents {
            move_left: self.move_left || other.move_left,
            move_right: self.move_right || other.move_right,
            rotate: self.rotate || other.rotate,
            soft_drop: self.soft_drop || other.soft_drop,
            quit: self.quit || other.quit,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
