use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub ticks_to_run: u32,
    pub remaining_accumulator: Duration,
    pub dropped_backlog: Duration,
}

/// Fixed-timestep accumulator. Wall-clock frame time is added to a carried
/// accumulator and drained in whole `fixed_dt` ticks; the remainder waits for
/// the next frame. Without a tick cap every full tick in the accumulator runs.
#[derive(Debug, Clone)]
pub struct FixedStepper {
    fixed_dt: Duration,
    accumulator: Duration,
    max_frame_delta: Option<Duration>,
    max_ticks_per_frame: Option<u32>,
}

impl FixedStepper {
    pub fn new(fixed_dt: Duration) -> Self {
        Self {
            fixed_dt: normalize_non_zero_duration(fixed_dt, Duration::from_millis(16)),
            accumulator: Duration::ZERO,
            max_frame_delta: None,
            max_ticks_per_frame: None,
        }
    }

    pub fn from_tps(target_tps: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / f64::from(target_tps.max(1))))
    }

    pub fn with_max_frame_delta(mut self, max_frame_delta: Option<Duration>) -> Self {
        self.max_frame_delta = max_frame_delta.filter(|value| !value.is_zero());
        self
    }

    pub fn with_max_ticks_per_frame(mut self, max_ticks_per_frame: Option<u32>) -> Self {
        self.max_ticks_per_frame = max_ticks_per_frame.map(|value| value.max(1));
        self
    }

    pub fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// Adds one frame's elapsed time and returns how many ticks to run now.
    pub fn advance(&mut self, frame_dt: Duration) -> StepPlan {
        let frame_dt = match self.max_frame_delta {
            Some(max_frame_delta) => clamp_frame_delta(frame_dt, max_frame_delta),
            None => frame_dt,
        };
        let accumulator = self.accumulator.saturating_add(frame_dt);
        let plan = plan_sim_steps(accumulator, self.fixed_dt, self.max_ticks_per_frame);
        self.accumulator = plan.remaining_accumulator;
        plan
    }
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: Option<u32>,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    let under_cap = |ticks: u32| max_ticks_per_frame.map_or(true, |cap| ticks < cap);

    while accumulator >= fixed_dt && under_cap(ticks_to_run) {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

pub(crate) fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_ticks_accumulate_into_one_tick() {
        let fixed_dt = Duration::from_millis(20);
        let mut stepper = FixedStepper::new(fixed_dt);

        let first = stepper.advance(fixed_dt / 2);
        assert_eq!(first.ticks_to_run, 0);
        assert_eq!(stepper.accumulator(), Duration::from_millis(10));

        let second = stepper.advance(fixed_dt / 2);
        assert_eq!(second.ticks_to_run, 1);
        assert_eq!(stepper.accumulator(), Duration::ZERO);
    }

    #[test]
    fn remainder_carries_to_next_frame() {
        let mut stepper = FixedStepper::new(Duration::from_millis(16));
        let plan = stepper.advance(Duration::from_millis(40));
        assert_eq!(plan.ticks_to_run, 2);
        assert_eq!(stepper.accumulator(), Duration::from_millis(8));
        assert_eq!(stepper.advance(Duration::from_millis(8)).ticks_to_run, 1);
    }

    #[test]
    fn unbounded_stepper_catches_up_fully() {
        let mut stepper = FixedStepper::new(Duration::from_millis(10));
        let plan = stepper.advance(Duration::from_secs(2));
        assert_eq!(plan.ticks_to_run, 200);
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, Some(5));

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, Some(3));

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn max_frame_delta_caps_a_stalled_frame() {
        let mut stepper = FixedStepper::new(Duration::from_millis(10))
            .with_max_frame_delta(Some(Duration::from_millis(250)));
        let plan = stepper.advance(Duration::from_millis(600));
        assert_eq!(plan.ticks_to_run, 25);
    }

    #[test]
    fn from_tps_matches_sixty_hertz() {
        let stepper = FixedStepper::from_tps(60);
        assert!((stepper.fixed_dt().as_secs_f64() - 1.0 / 60.0).abs() < 1e-6);
    }
}
