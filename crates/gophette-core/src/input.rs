use serde::{Deserialize, Serialize};

/// Button a player can press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Quit,
}

/// One discrete press or release, addressed to a character slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub action: InputAction,
    pub pressed: bool,
    #[serde(default)]
    pub character_index: usize,
}

impl InputEvent {
    pub fn press(action: InputAction, character_index: usize) -> Self {
        Self {
            action,
            pressed: true,
            character_index,
        }
    }

    pub fn release(action: InputAction, character_index: usize) -> Self {
        Self {
            action,
            pressed: false,
            character_index,
        }
    }
}
