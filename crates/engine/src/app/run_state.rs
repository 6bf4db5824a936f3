use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    pub fn banner(self) -> &'static str {
        match self {
            Outcome::Won => "YOU WIN",
            Outcome::Lost => "YOU LOSE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    /// A terminal outcome was observed; the final frame stays on screen until
    /// `deadline`, and no further ticks run.
    Ending {
        outcome: Outcome,
        deadline: Instant,
    },
    Terminated,
}

/// Loop-level status. Every transition is one-way:
/// `Running -> Ending -> Terminated`, or `Running -> Terminated` on quit.
#[derive(Debug, Clone)]
pub struct RunState {
    status: RunStatus,
    end_delay: Duration,
}

impl RunState {
    pub fn new(end_delay: Duration) -> Self {
        Self {
            status: RunStatus::Running,
            end_delay,
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn accepts_ticks(&self) -> bool {
        matches!(self.status, RunStatus::Running)
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.status, RunStatus::Terminated)
    }

    /// Records an outcome seen during a render pass. Returns true only on the
    /// pass that starts the ending.
    pub fn observe_outcome(&mut self, outcome: Option<Outcome>, now: Instant) -> bool {
        let (RunStatus::Running, Some(outcome)) = (self.status, outcome) else {
            return false;
        };
        self.status = RunStatus::Ending {
            outcome,
            deadline: now + self.end_delay,
        };
        true
    }

    pub fn request_quit(&mut self) {
        self.status = RunStatus::Terminated;
    }

    pub fn poll(&mut self, now: Instant) -> RunStatus {
        if let RunStatus::Ending { deadline, .. } = self.status {
            if now >= deadline {
                self.status = RunStatus::Terminated;
            }
        }
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_stops_ticks_then_terminates_after_delay() {
        let start = Instant::now();
        let mut state = RunState::new(Duration::from_secs(3));
        assert!(state.accepts_ticks());

        assert!(state.observe_outcome(Some(Outcome::Won), start));
        assert!(!state.accepts_ticks());
        assert!(matches!(
            state.poll(start + Duration::from_secs(1)),
            RunStatus::Ending {
                outcome: Outcome::Won,
                ..
            }
        ));
        assert_eq!(
            state.poll(start + Duration::from_secs(3)),
            RunStatus::Terminated
        );
    }

    #[test]
    fn later_outcomes_do_not_restart_the_ending() {
        let start = Instant::now();
        let mut state = RunState::new(Duration::from_secs(3));
        state.observe_outcome(Some(Outcome::Lost), start);
        assert!(!state.observe_outcome(Some(Outcome::Won), start + Duration::from_secs(2)));
        assert!(matches!(
            state.status(),
            RunStatus::Ending {
                outcome: Outcome::Lost,
                ..
            }
        ));
    }

    #[test]
    fn no_outcome_keeps_running() {
        let mut state = RunState::new(Duration::from_secs(3));
        assert!(!state.observe_outcome(None, Instant::now()));
        assert_eq!(state.poll(Instant::now()), RunStatus::Running);
    }

    #[test]
    fn quit_is_immediate() {
        let mut state = RunState::new(Duration::from_secs(3));
        state.request_quit();
        assert!(state.is_terminated());
        assert!(!state.observe_outcome(Some(Outcome::Won), Instant::now()));
    }
}
