pub mod baseline;
pub mod command;
pub mod history;
pub mod peaks;
pub mod scene;
pub mod transforms;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::command::{
        Command, CorrectBaseline, CropSpectrum, EstimateBaseline, LoadSpectrum, SessionState,
        SmoothSpectrum,
    };
    use super::history::CommandHistory;
    use crate::data::spectrum::{BaselineStage, Spectrum};

    /// Flat-spectrum end to end: load, estimate, correct, then unwind.
    #[test]
    fn test_load_estimate_correct_undo_undo() {
        let mut state = SessionState::default();
        let mut history = CommandHistory::new();

        let x: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let y = vec![5.0; 12];
        history.execute(
            Command::Load(LoadSpectrum::new(
                &state,
                Spectrum::new(x, y),
                PathBuf::from("flat.txt"),
            )),
            &mut state,
        );
        assert_eq!(state.stage, BaselineStage::Unestimated);

        history.execute(
            Command::EstimateBaseline(EstimateBaseline::new(&state, vec![5.0; 12])),
            &mut state,
        );
        assert_eq!(state.stage, BaselineStage::Estimated);
        let spectrum_before_correct = state.spectrum.clone();
        let baseline_before_correct = state.baseline.clone();

        history.execute(
            Command::CorrectBaseline(CorrectBaseline::new(&state)),
            &mut state,
        );
        let corrected = state.spectrum.as_ref().unwrap();
        assert!(corrected.y.iter().all(|&v| v == 0.0));
        assert!(state.baseline.continuous.is_none());

        // Undo the correction: spectrum and baseline come back exactly.
        history.undo(&mut state);
        assert_eq!(state.spectrum, spectrum_before_correct);
        assert_eq!(state.baseline, baseline_before_correct);
        assert_eq!(state.stage, BaselineStage::Estimated);

        // Undo the estimate: baseline cleared, stage back to unestimated.
        history.undo(&mut state);
        assert!(state.baseline.continuous.is_none());
        assert_eq!(state.stage, BaselineStage::Unestimated);
    }

    /// Executing a full sequence then undoing everything restores the
    /// initial spectrum, baseline and stage.
    #[test]
    fn test_full_sequence_roundtrip() {
        let mut state = SessionState::default();
        let mut history = CommandHistory::new();

        let x: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 10.0 + (v * 0.3).sin()).collect();
        history.execute(
            Command::Load(LoadSpectrum::new(
                &state,
                Spectrum::new(x, y),
                PathBuf::from("seq.txt"),
            )),
            &mut state,
        );

        let spectrum0 = state.spectrum.clone();
        let baseline0 = state.baseline.clone();
        let stage0 = state.stage;

        history.execute(
            Command::Crop(CropSpectrum::new(&state, 5.0, 8.0)),
            &mut state,
        );
        history.execute(Command::Smooth(SmoothSpectrum::new(&state)), &mut state);
        let n = state.spectrum.as_ref().unwrap().len();
        history.execute(
            Command::EstimateBaseline(EstimateBaseline::new(&state, vec![10.0; n])),
            &mut state,
        );
        history.execute(
            Command::CorrectBaseline(CorrectBaseline::new(&state)),
            &mut state,
        );

        while history.undo(&mut state) {}

        // The load itself was also undone; redo it to compare against the
        // post-load snapshot.
        history.redo(&mut state);
        assert_eq!(state.spectrum, spectrum0);
        assert_eq!(state.baseline, baseline0);
        assert_eq!(state.stage, stage0);
    }
}
