//! Simulated progress shown while a backend task runs.
//!
//! The backend reports no fractional progress, so the UI walks a fixed list
//! of phase labels on a timer instead. The percentage is capped below 100;
//! only a terminal task state completes the bar.

use std::time::Duration;

/// Interval between simulated-progress advances.
pub const PROGRESS_TICK_INTERVAL: Duration = Duration::from_millis(1500);

/// Highest percentage the simulation will claim on its own.
pub const SIMULATED_PERCENT_CAP: u8 = 85;

/// Label shown before the first tick lands.
pub const INITIAL_PHASE_LABEL: &str = "Initializing...";

/// Label shown between task success and the results render.
pub const COMPLETE_PHASE_LABEL: &str = "Analysis complete! Preparing results...";

/// Phase labels walked during an ATS analysis.
pub const ANALYSIS_PHASES: [&str; 8] = [
    "Analyzing document format...",
    "Extracting resume content...",
    "Identifying key skills and experiences...",
    "Matching keywords with job description...",
    "Calculating ATS compatibility score...",
    "Generating optimization suggestions...",
    "Creating improved resume sections...",
    "Finalizing recommendations...",
];

/// Phase labels walked during cover-letter generation.
pub const GENERATION_PHASES: [&str; 8] = [
    "Analyzing your resume...",
    "Understanding job requirements...",
    "Identifying key selling points...",
    "Crafting opening paragraph...",
    "Developing body content...",
    "Creating compelling closing...",
    "Formatting cover letter...",
    "Finalizing document...",
];

/// Tick-driven position in a workflow's phase list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulatedProgress {
    steps_done: usize,
}

impl SimulatedProgress {
    pub(crate) fn reset(&mut self) {
        self.steps_done = 0;
    }

    /// Advances one phase. Returns false once the list is exhausted, so
    /// callers can skip a redraw for ticks that change nothing.
    pub(crate) fn advance(&mut self, phases: &[&'static str]) -> bool {
        if self.steps_done >= phases.len() {
            return false;
        }
        self.steps_done += 1;
        true
    }

    pub fn percent(&self, phases: &[&'static str]) -> u8 {
        if phases.is_empty() {
            return 0;
        }
        let raw = usize::from(SIMULATED_PERCENT_CAP) * self.steps_done / phases.len();
        raw.min(usize::from(SIMULATED_PERCENT_CAP)) as u8
    }

    pub fn label(&self, phases: &[&'static str]) -> &'static str {
        match self.steps_done {
            0 => INITIAL_PHASE_LABEL,
            done => phases[(done - 1).min(phases.len() - 1)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_with_initial_label() {
        let progress = SimulatedProgress::default();
        assert_eq!(progress.percent(&ANALYSIS_PHASES), 0);
        assert_eq!(progress.label(&ANALYSIS_PHASES), INITIAL_PHASE_LABEL);
    }

    #[test]
    fn advances_through_phases_in_order() {
        let mut progress = SimulatedProgress::default();
        assert!(progress.advance(&ANALYSIS_PHASES));
        assert_eq!(progress.label(&ANALYSIS_PHASES), ANALYSIS_PHASES[0]);
        assert!(progress.advance(&ANALYSIS_PHASES));
        assert_eq!(progress.label(&ANALYSIS_PHASES), ANALYSIS_PHASES[1]);
    }

    #[test]
    fn percent_never_exceeds_cap() {
        let mut progress = SimulatedProgress::default();
        for _ in 0..ANALYSIS_PHASES.len() {
            assert!(progress.advance(&ANALYSIS_PHASES));
            assert!(progress.percent(&ANALYSIS_PHASES) <= SIMULATED_PERCENT_CAP);
        }
        assert_eq!(progress.percent(&ANALYSIS_PHASES), SIMULATED_PERCENT_CAP);
        assert_eq!(progress.label(&ANALYSIS_PHASES), "Finalizing recommendations...");
    }

    #[test]
    fn exhausted_list_reports_no_change() {
        let mut progress = SimulatedProgress::default();
        for _ in 0..GENERATION_PHASES.len() {
            assert!(progress.advance(&GENERATION_PHASES));
        }
        assert!(!progress.advance(&GENERATION_PHASES));
        assert_eq!(progress.percent(&GENERATION_PHASES), SIMULATED_PERCENT_CAP);
    }

    #[test]
    fn reset_returns_to_initial_label() {
        let mut progress = SimulatedProgress::default();
        progress.advance(&ANALYSIS_PHASES);
        progress.reset();
        assert_eq!(progress.percent(&ANALYSIS_PHASES), 0);
        assert_eq!(progress.label(&ANALYSIS_PHASES), INITIAL_PHASE_LABEL);
    }
}
