use crate::backend::Graphics;
use crate::input::InputEvent;

/// A game the host loop drives once per rendered frame.
///
/// The host owns windowing, input polling, audio and presentation; the game
/// only consumes discrete input events, advances one fixed step per
/// `update`, and issues draw calls. Nothing here blocks.
pub trait FrameGame {
    /// Notable things that happened during one update.
    type Event;

    /// Apply one discrete press or release.
    fn handle_input(&mut self, event: InputEvent);

    /// Advance exactly one fixed time step.
    fn update(&mut self) -> Vec<Self::Event>;

    /// Draw the current frame.
    fn render(&self, graphics: &mut dyn Graphics);

    /// False once a quit was requested.
    fn running(&self) -> bool;

    /// Encode the deterministic simulation state.
    fn serialize_state(&self) -> Vec<u8>;

    /// Restore state produced by `serialize_state`. Malformed data is ignored.
    fn apply_state(&mut self, state: &[u8]);
}

/// Implements the snapshot and run-flag methods of [`FrameGame`] for a game
/// that keeps its simulation state in `self.state` and its run flag in
/// `self.running`. The implementing crate must depend on `rmp-serde`.
#[macro_export]
macro_rules! frame_game_boilerplate {
    (state_type: $StateType:ty) => {
        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.state).expect("game state serialization must succeed")
        }

        fn apply_state(&mut self, state: &[u8]) {
            if let Ok(s) = rmp_serde::from_slice::<$StateType>(state) {
                self.state = s;
            }
        }

        fn running(&self) -> bool {
            self.running
        }
    };
}
