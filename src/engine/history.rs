/// Linear undo/redo history
///
/// A single chronological list of executed commands plus a cursor. The
/// cursor counts applied commands, so `cursor == 0` means nothing to undo.
/// Executing while part of the list is undone discards the redoable tail —
/// history is a line, not a tree.

use crate::engine::command::{Command, SessionState};

#[derive(Debug, Default)]
pub struct CommandHistory {
    commands: Vec<Command>,
    cursor: usize,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the command's forward effect and append it, discarding any
    /// previously undone tail first.
    pub fn execute(&mut self, mut command: Command, state: &mut SessionState) {
        self.commands.truncate(self.cursor);
        command.apply(state);
        self.commands.push(command);
        self.cursor += 1;
    }

    /// Reverse the most recent applied command. No-op when there is none.
    pub fn undo(&mut self, state: &mut SessionState) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.commands[self.cursor].reverse(state);
        true
    }

    /// Re-apply the most recently undone command. No-op at the head.
    pub fn redo(&mut self, state: &mut SessionState) -> bool {
        if self.cursor == self.commands.len() {
            return false;
        }
        self.commands[self.cursor].apply(state);
        self.cursor += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    /// Label of the command an undo would reverse next.
    pub fn undo_label(&self) -> Option<&'static str> {
        self.cursor
            .checked_sub(1)
            .map(|i| self.commands[i].label())
    }

    /// Label of the command a redo would re-apply next.
    pub fn redo_label(&self) -> Option<&'static str> {
        self.commands.get(self.cursor).map(|c| c.label())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::spectrum::Spectrum;
    use crate::engine::command::CropSpectrum;

    fn state_with_ramp(n: usize) -> SessionState {
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * 2.0).collect();
        SessionState {
            spectrum: Some(Spectrum::new(x, y)),
            ..Default::default()
        }
    }

    fn crop(state: &SessionState, lo: f64, hi: f64) -> Command {
        Command::Crop(CropSpectrum::new(state, lo, hi))
    }

    #[test]
    fn test_undo_on_empty_history_is_noop() {
        let mut state = state_with_ramp(5);
        let mut history = CommandHistory::new();
        assert!(!history.undo(&mut state));
        assert!(!history.redo(&mut state));
    }

    #[test]
    fn test_execute_undo_roundtrip() {
        let mut state = state_with_ramp(10);
        let before = state.spectrum.clone();
        let mut history = CommandHistory::new();

        history.execute(crop(&state, 2.0, 4.0), &mut state);
        history.execute(crop(&state, 6.0, 7.0), &mut state);
        assert_eq!(state.spectrum.as_ref().unwrap().valid_count(), 5);

        assert!(history.undo(&mut state));
        assert!(history.undo(&mut state));
        assert_eq!(state.spectrum, before);
        assert!(!history.can_undo());
        assert!(history.can_redo());
    }

    #[test]
    fn test_redo_reapplies_in_order() {
        let mut state = state_with_ramp(10);
        let mut history = CommandHistory::new();
        history.execute(crop(&state, 0.0, 1.0), &mut state);
        history.execute(crop(&state, 8.0, 9.0), &mut state);
        let after_both = state.spectrum.clone();

        history.undo(&mut state);
        history.undo(&mut state);
        assert!(history.redo(&mut state));
        assert!(history.redo(&mut state));
        assert_eq!(state.spectrum, after_both);
        assert!(!history.redo(&mut state));
    }

    #[test]
    fn test_execute_after_undo_discards_redo_tail() {
        let mut state = state_with_ramp(12);
        let mut history = CommandHistory::new();
        history.execute(crop(&state, 0.0, 0.0), &mut state); // c1
        history.execute(crop(&state, 1.0, 1.0), &mut state); // c2
        history.execute(crop(&state, 2.0, 2.0), &mut state); // c3

        history.undo(&mut state);
        history.undo(&mut state);
        history.execute(crop(&state, 5.0, 5.0), &mut state); // c4

        // c2 and c3 are unreachable now.
        assert_eq!(history.len(), 2);
        assert!(!history.redo(&mut state));

        let spectrum = state.spectrum.as_ref().unwrap();
        assert!(spectrum.y[0].is_nan());
        assert!(!spectrum.y[1].is_nan());
        assert!(!spectrum.y[2].is_nan());
        assert!(spectrum.y[5].is_nan());
    }

    #[test]
    fn test_labels_track_cursor() {
        let mut state = state_with_ramp(5);
        let mut history = CommandHistory::new();
        assert_eq!(history.undo_label(), None);

        history.execute(crop(&state, 0.0, 1.0), &mut state);
        assert_eq!(history.undo_label(), Some("Crop"));
        assert_eq!(history.redo_label(), None);

        history.undo(&mut state);
        assert_eq!(history.undo_label(), None);
        assert_eq!(history.redo_label(), Some("Crop"));
    }
}
