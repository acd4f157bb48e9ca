use serde::{Deserialize, Serialize};

use gophette_core::input::InputAction;

/// Latched button state for one character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left_down: bool,
    pub right_down: bool,
    pub jump_down: bool,
    /// Armed by a jump press, consumed by the next physics step. Holding
    /// jump does not re-arm it.
    pub jump_triggered: bool,
}

impl InputState {
    /// Apply a press or release. `Quit` is not a per-character button and
    /// leaves the state untouched.
    pub fn apply(&mut self, action: InputAction, pressed: bool) {
        match action {
            InputAction::MoveLeft => self.left_down = pressed,
            InputAction::MoveRight => self.right_down = pressed,
            InputAction::Jump => {
                self.jump_down = pressed;
                if pressed {
                    self.jump_triggered = true;
                }
            },
            InputAction::Quit => {},
        }
    }

    /// -1 for left only, +1 for right only, 0 for neither or both.
    pub fn horizontal(&self) -> i32 {
        match (self.left_down, self.right_down) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }

    /// Read and clear the jump trigger.
    pub fn take_jump_trigger(&mut self) -> bool {
        std::mem::take(&mut self.jump_triggered)
    }
}
