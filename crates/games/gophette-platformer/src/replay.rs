//! Frame-indexed input scripts: loading, playback and recording.

use std::collections::VecDeque;
use std::path::Path;

use serde::{Deserialize, Serialize};

use gophette_core::input::{InputAction, InputEvent};

use crate::error::DataError;
use crate::input::InputState;

/// One scripted press or release, due on `frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub frame: u32,
    pub action: InputAction,
    pub pressed: bool,
}

impl InputRecord {
    pub fn new(frame: u32, action: InputAction, pressed: bool) -> Self {
        Self {
            frame,
            action,
            pressed,
        }
    }

    /// The recorded press, addressed to `character_index`.
    pub fn event_for(&self, character_index: usize) -> InputEvent {
        InputEvent {
            action: self.action,
            pressed: self.pressed,
            character_index,
        }
    }
}

/// An immutable input script whose records are in non-decreasing frame
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayScript {
    records: Vec<InputRecord>,
}

#[derive(Deserialize)]
struct ScriptFile {
    #[serde(default)]
    records: Vec<InputRecord>,
}

impl ReplayScript {
    pub fn new(records: Vec<InputRecord>) -> Result<Self, DataError> {
        for (index, pair) in records.windows(2).enumerate() {
            if pair[1].frame < pair[0].frame {
                tracing::warn!(
                    index = index + 1,
                    frame = pair[1].frame,
                    previous = pair[0].frame,
                    "replay record out of order"
                );
                return Err(DataError::OutOfOrder {
                    index: index + 1,
                    frame: pair[1].frame,
                    previous: pair[0].frame,
                });
            }
        }
        Ok(Self { records })
    }

    /// Parse a `[[records]]` table list.
    pub fn from_toml_str(s: &str) -> Result<Self, DataError> {
        let file: ScriptFile = toml::from_str(s)?;
        Self::new(file.records)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, DataError> {
        Ok(toml::to_string(self)?)
    }

    pub fn records(&self) -> &[InputRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Frame of the last record, or 0 for an empty script.
    pub fn last_frame(&self) -> u32 {
        self.records.last().map_or(0, |r| r.frame)
    }
}

/// Records still waiting to be played back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayQueue {
    pending: VecDeque<InputRecord>,
}

impl ReplayQueue {
    pub fn new(script: &ReplayScript) -> Self {
        Self {
            pending: script.records.iter().copied().collect(),
        }
    }

    /// Refill from `script`, dropping anything still pending.
    pub fn reload(&mut self, script: &ReplayScript) {
        self.pending.clear();
        self.pending.extend(script.records.iter().copied());
    }

    /// Remove and return every record due on or before `frame`, oldest
    /// first. Records whose frame has already passed still fire.
    pub fn due(&mut self, frame: u32) -> Vec<InputRecord> {
        let ready = self
            .pending
            .iter()
            .position(|r| r.frame > frame)
            .unwrap_or(self.pending.len());
        self.pending.drain(..ready).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Collects externally handled input so a session can be replayed later.
#[derive(Debug, Clone, Default)]
pub struct InputRecorder {
    records: Vec<InputRecord>,
}

impl InputRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame: u32, event: &InputEvent) {
        self.records
            .push(InputRecord::new(frame, event.action, event.pressed));
    }

    /// Forget everything recorded so far and start over at frame 0 with
    /// `held` as the latched buttons, so a replay begins in the same state.
    pub fn restart(&mut self, held: &InputState) {
        self.records.clear();
        let moves = [
            (InputAction::MoveLeft, held.left_down),
            (InputAction::MoveRight, held.right_down),
        ];
        for (action, down) in moves {
            if down {
                self.records.push(InputRecord::new(0, action, true));
            }
        }
        // A jump held without a pending trigger only matters once a new
        // press arrives, and that press is recorded.
        if held.jump_triggered {
            self.records.push(InputRecord::new(0, InputAction::Jump, true));
            if !held.jump_down {
                self.records.push(InputRecord::new(0, InputAction::Jump, false));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Close the recording. Records are stored in arrival order, which is
    /// frame order as long as the recording is restarted whenever the frame
    /// counter goes back to zero.
    pub fn finish(self) -> ReplayScript {
        ReplayScript {
            records: self.records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(frame: u32, action: InputAction, pressed: bool) -> InputRecord {
        InputRecord::new(frame, action, pressed)
    }

    #[test]
    fn rejects_out_of_order_records() {
        let err = ReplayScript::new(vec![
            rec(5, InputAction::Jump, true),
            rec(9, InputAction::Jump, false),
            rec(7, InputAction::MoveLeft, true),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            DataError::OutOfOrder {
                index: 2,
                frame: 7,
                previous: 9
            }
        );
    }

    #[test]
    fn equal_frames_are_allowed() {
        let script = ReplayScript::new(vec![
            rec(3, InputAction::MoveRight, true),
            rec(3, InputAction::Jump, true),
        ])
        .unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script.last_frame(), 3);
    }

    #[test]
    fn parses_toml_records() {
        let script = ReplayScript::from_toml_str(
            r#"
            [[records]]
            frame = 0
            action = "move_right"
            pressed = true

            [[records]]
            frame = 40
            action = "jump"
            pressed = true
            "#,
        )
        .unwrap();
        assert_eq!(
            script.records(),
            &[
                rec(0, InputAction::MoveRight, true),
                rec(40, InputAction::Jump, true)
            ]
        );
    }

    #[test]
    fn empty_document_is_an_empty_script() {
        let script = ReplayScript::from_toml_str("").unwrap();
        assert!(script.is_empty());
        assert_eq!(script.last_frame(), 0);
    }

    #[test]
    fn unknown_action_is_a_parse_error() {
        let err = ReplayScript::from_toml_str(
            "[[records]]\nframe = 1\naction = \"fly\"\npressed = true\n",
        )
        .unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }

    #[test]
    fn saved_script_loads_back() {
        let script = ReplayScript::new(vec![
            rec(2, InputAction::MoveLeft, true),
            rec(30, InputAction::MoveLeft, false),
        ])
        .unwrap();
        let text = script.to_toml_string().unwrap();
        assert!(text.contains("[[records]]"));
        assert!(text.contains("action = \"move_left\""));
        assert_eq!(ReplayScript::from_toml_str(&text).unwrap(), script);
    }

    #[test]
    fn queue_fires_due_and_overdue_records_in_order() {
        let script = ReplayScript::new(vec![
            rec(1, InputAction::MoveRight, true),
            rec(2, InputAction::Jump, true),
            rec(2, InputAction::Jump, false),
            rec(6, InputAction::MoveRight, false),
        ])
        .unwrap();
        let mut queue = ReplayQueue::new(&script);

        assert!(queue.due(0).is_empty());
        // Frame 1 was skipped: it still fires along with frame 2.
        let fired = queue.due(2);
        assert_eq!(fired, script.records()[..3].to_vec());
        assert_eq!(queue.len(), 1);
        assert!(queue.due(5).is_empty());
        assert_eq!(queue.due(100), vec![rec(6, InputAction::MoveRight, false)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn reload_restores_original_contents() {
        let script = ReplayScript::new(vec![
            rec(0, InputAction::MoveRight, true),
            rec(10, InputAction::MoveRight, false),
        ])
        .unwrap();
        let mut queue = ReplayQueue::new(&script);
        queue.due(0);
        assert_eq!(queue.len(), 1);
        queue.reload(&script);
        assert_eq!(queue, ReplayQueue::new(&script));
    }

    #[test]
    fn recorder_captures_frames_and_drops_character_index() {
        let mut recorder = InputRecorder::new();
        recorder.record(0, &InputEvent::press(InputAction::MoveRight, 0));
        recorder.record(12, &InputEvent::press(InputAction::Jump, 1));
        assert_eq!(recorder.len(), 2);

        let script = recorder.finish();
        assert_eq!(
            script.records(),
            &[
                rec(0, InputAction::MoveRight, true),
                rec(12, InputAction::Jump, true)
            ]
        );
        assert_eq!(script.records()[1].event_for(1).character_index, 1);
    }

    #[test]
    fn restarted_recorder_is_empty() {
        let mut recorder = InputRecorder::new();
        recorder.record(4, &InputEvent::release(InputAction::Jump, 0));
        recorder.restart(&InputState::default());
        assert!(recorder.is_empty());
        assert!(recorder.finish().is_empty());
    }

    #[test]
    fn restart_replays_latched_buttons_at_frame_zero() {
        let mut held = InputState::default();
        held.apply(InputAction::MoveRight, true);
        held.apply(InputAction::Jump, true);
        held.apply(InputAction::Jump, false);

        let mut recorder = InputRecorder::new();
        recorder.record(30, &InputEvent::press(InputAction::MoveLeft, 0));
        recorder.restart(&held);
        let script = recorder.finish();
        assert_eq!(
            script.records(),
            &[
                rec(0, InputAction::MoveRight, true),
                rec(0, InputAction::Jump, true),
                rec(0, InputAction::Jump, false),
            ]
        );

        let mut replayed = InputState::default();
        for r in script.records() {
            replayed.apply(r.action, r.pressed);
        }
        assert_eq!(replayed, held);
    }

    #[test]
    fn held_jump_without_pending_trigger_is_not_seeded() {
        let mut held = InputState::default();
        held.apply(InputAction::Jump, true);
        held.take_jump_trigger();

        let mut recorder = InputRecorder::new();
        recorder.restart(&held);
        assert!(recorder.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn draining_frame_by_frame_yields_every_record_once(
                mut frames in proptest::collection::vec(0u32..50, 0..40)
            ) {
                frames.sort_unstable();
                let records: Vec<_> = frames
                    .iter()
                    .map(|&f| rec(f, InputAction::Jump, true))
                    .collect();
                let script = ReplayScript::new(records.clone()).unwrap();
                let mut queue = ReplayQueue::new(&script);
                let mut fired = Vec::new();
                for frame in 0..50 {
                    for r in queue.due(frame) {
                        prop_assert_eq!(r.frame, frame);
                        fired.push(r);
                    }
                }
                prop_assert_eq!(fired, records);
            }
        }
    }
}
