use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::stepper::normalize_non_zero_duration;
use super::{
    AudioBackend, FixedStepper, InputAction, InputSnapshot, Projection, Renderer, RunState,
    RunStatus, Scene, SceneLoadError,
};

pub const SLOW_FRAME_ENV_VAR: &str = "TILEHOP_SLOW_FRAME_MS";

/// Loop tuning. Durations are read from config files as whole milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    #[serde(rename = "max_frame_delta_ms", deserialize_with = "duration_ms")]
    pub max_frame_delta: Duration,
    /// `None` drains the whole accumulator every frame, however large.
    pub max_ticks_per_frame: Option<u32>,
    #[serde(rename = "end_screen_delay_ms", deserialize_with = "duration_ms")]
    pub end_screen_delay: Duration,
    #[serde(rename = "metrics_log_interval_ms", deserialize_with = "duration_ms")]
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
    pub clear_color: [u8; 4],
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Tilehop".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: Some(8),
            end_screen_delay: Duration::from_secs(3),
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
            clear_color: [20, 22, 28, 255],
        }
    }
}

fn duration_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("failed to load scene: {0}")]
    SceneLoad(#[from] SceneLoadError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    mut scene: Box<dyn Scene>,
    mut audio: Box<dyn AudioBackend>,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window), Projection::default())
        .map_err(AppError::CreateRenderer)?;

    scene.load(&mut renderer, audio.as_mut())?;
    info!("scene_loaded");

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let mut stepper = FixedStepper::from_tps(target_tps)
        .with_max_frame_delta(Some(max_frame_delta))
        .with_max_ticks_per_frame(config.max_ticks_per_frame);
    let fixed_dt_seconds = stepper.fixed_dt().as_secs_f32();
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let mut input_collector = InputCollector::default();
    let mut run_state = RunState::new(config.end_screen_delay);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame = %format_optional_cap(config.max_ticks_per_frame),
        end_screen_delay_ms = config.end_screen_delay.as_millis() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        render_fps_cap = %format_optional_cap(effective_render_cap),
        "loop_config"
    );

    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, Instant::now());
    let mut last_applied_title: Option<String> = None;
    let window_for_loop = Arc::clone(&window);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        run_state.request_quit();
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_key(event.physical_key, event.state);
                        if input_collector.quit_requested && !run_state.is_terminated() {
                            run_state.request_quit();
                            info!(reason = "quit_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if slow_frame_delay > Duration::ZERO {
                            // Explicit debug perturbation only; this is not the FPS cap.
                            thread::sleep(slow_frame_delay);
                        }

                        let now = Instant::now();
                        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;

                        if run_state.poll(now) == RunStatus::Terminated {
                            info!(reason = "end_screen_elapsed", "shutdown_requested");
                            window_target.exit();
                            return;
                        }

                        if run_state.accepts_ticks() {
                            let step_plan = stepper.advance(raw_frame_dt);
                            for _ in 0..step_plan.ticks_to_run {
                                let input_snapshot = input_collector.snapshot_for_tick();
                                scene.update(fixed_dt_seconds, &input_snapshot, audio.as_mut());
                            }
                            metrics_accumulator.record_ticks(step_plan.ticks_to_run);

                            if step_plan.dropped_backlog > Duration::ZERO {
                                metrics_accumulator
                                    .record_dropped_backlog(step_plan.dropped_backlog);
                                warn!(
                                    dropped_backlog_ms =
                                        step_plan.dropped_backlog.as_millis() as u64,
                                    max_ticks_per_frame =
                                        %format_optional_cap(config.max_ticks_per_frame),
                                    "sim_clamp_triggered"
                                );
                            }
                        }

                        // Single authoritative FPS cap sleep point for render pacing.
                        let elapsed_since_last_present =
                            Instant::now().saturating_duration_since(last_present_instant);
                        let cap_sleep =
                            compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                        if cap_sleep > Duration::ZERO {
                            thread::sleep(cap_sleep);
                        }

                        renderer.begin_frame(config.clear_color);
                        scene.render(&mut renderer);
                        if run_state.observe_outcome(scene.outcome(), now) {
                            if let RunStatus::Ending { outcome, .. } = run_state.status() {
                                info!(
                                    outcome = ?outcome,
                                    end_screen_delay_ms =
                                        config.end_screen_delay.as_millis() as u64,
                                    "run_ended"
                                );
                            }
                        }
                        if let Err(error) = renderer.present() {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                        last_present_instant = Instant::now();

                        let next_title = scene.debug_title();
                        if next_title != last_applied_title {
                            if let Some(title) = &next_title {
                                window_for_loop.set_title(title);
                            } else {
                                window_for_loop.set_title(&config.window_title);
                            }
                            last_applied_title = next_title;
                        }
                        metrics_accumulator.record_frame(raw_frame_dt);

                        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                            info!(
                                fps = snapshot.fps,
                                tps = snapshot.tps,
                                frame_time_ms = snapshot.frame_time_ms,
                                dropped_backlog_ms = snapshot.dropped_backlog_ms,
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Tracks held keys between frames and turns jump/attack presses into edges
/// that are delivered to exactly one tick.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    jump_pressed_edge: bool,
    attack_pressed_edge: bool,
}

impl InputCollector {
    fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let Some(action) = action_for_key(key) else {
            return;
        };
        let is_pressed = state == ElementState::Pressed;
        let was_down = self.action_states.is_down(action);
        self.action_states.set(action, is_pressed);

        if !is_pressed || was_down {
            return;
        }
        match action {
            InputAction::Jump => self.jump_pressed_edge = true,
            InputAction::Attack => self.attack_pressed_edge = true,
            InputAction::Quit => self.quit_requested = true,
            InputAction::MoveLeft | InputAction::MoveRight => {}
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.jump_pressed_edge,
            self.attack_pressed_edge,
        );
        self.jump_pressed_edge = false;
        self.attack_pressed_edge = false;
        snapshot
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    match key {
        PhysicalKey::Code(KeyCode::ArrowLeft) => Some(InputAction::MoveLeft),
        PhysicalKey::Code(KeyCode::ArrowRight) => Some(InputAction::MoveRight),
        PhysicalKey::Code(KeyCode::Space) => Some(InputAction::Jump),
        PhysicalKey::Code(KeyCode::KeyA) => Some(InputAction::Attack),
        PhysicalKey::Code(KeyCode::KeyQ) | PhysicalKey::Code(KeyCode::Escape) => {
            Some(InputAction::Quit)
        }
        _ => None,
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_optional_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(value) => match value.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(PhysicalKey::Code(code), ElementState::Pressed);
    }

    fn release(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(PhysicalKey::Code(code), ElementState::Released);
    }

    #[test]
    fn jump_press_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Space);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.jump_pressed());
        assert!(!second.jump_pressed());
        assert!(second.is_down(InputAction::Jump));
    }

    #[test]
    fn no_retrigger_without_new_press() {
        let mut input = InputCollector::default();
        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(!first.jump_pressed());
        assert!(!second.attack_pressed());
    }

    #[test]
    fn held_attack_does_not_spam_press_edges() {
        let mut input = InputCollector::default();

        press(&mut input, KeyCode::KeyA);
        let first = input.snapshot_for_tick();

        // key repeat
        press(&mut input, KeyCode::KeyA);
        let second = input.snapshot_for_tick();

        release(&mut input, KeyCode::KeyA);
        press(&mut input, KeyCode::KeyA);
        let third = input.snapshot_for_tick();

        assert!(first.attack_pressed());
        assert!(!second.attack_pressed());
        assert!(third.attack_pressed());
    }

    #[test]
    fn press_survives_frames_without_ticks() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Space);
        release(&mut input, KeyCode::Space);

        assert!(input.snapshot_for_tick().jump_pressed());
    }

    #[test]
    fn arrow_keys_map_to_held_movement() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::ArrowLeft);
        press(&mut input, KeyCode::ArrowRight);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(snapshot.is_down(InputAction::MoveRight));
        assert!(!snapshot.jump_pressed());
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::ArrowRight);
        release(&mut input, KeyCode::ArrowRight);

        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn quit_keys_request_quit() {
        let mut q = InputCollector::default();
        press(&mut q, KeyCode::KeyQ);
        assert!(q.snapshot_for_tick().quit_requested());

        let mut escape = InputCollector::default();
        press(&mut escape, KeyCode::Escape);
        assert!(escape.quit_requested);
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyZ);
        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.quit_requested());
        assert!(!snapshot.jump_pressed());
        assert!(!snapshot.attack_pressed());
    }

    #[test]
    fn loop_config_defaults_fill_missing_fields() {
        let raw = r#"{ "target_tps": 30, "end_screen_delay_ms": 500 }"#;
        let config: LoopConfig = serde_json::from_str(raw).expect("config");
        assert_eq!(config.target_tps, 30);
        assert_eq!(config.end_screen_delay, Duration::from_millis(500));
        assert_eq!(config.max_ticks_per_frame, Some(8));
        assert_eq!(config.max_frame_delta, Duration::from_millis(250));
    }

    #[test]
    fn loop_config_null_tick_cap_means_unbounded() {
        let config: LoopConfig =
            serde_json::from_str(r#"{ "max_ticks_per_frame": null }"#).expect("config");
        assert_eq!(config.max_ticks_per_frame, None);
    }

    #[test]
    fn loop_config_rejects_unknown_fields() {
        let result = serde_json::from_str::<LoopConfig>(r#"{ "tick_rate": 60 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn target_frame_duration_none_when_cap_off() {
        assert_eq!(target_frame_duration(None), None);
    }

    #[test]
    fn compute_cap_sleep_zero_when_over_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(20), target_frame_duration(Some(60)));
        assert_eq!(sleep, Duration::ZERO);
    }

    #[test]
    fn compute_cap_sleep_positive_when_under_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(5), target_frame_duration(Some(60)));
        assert!(sleep > Duration::ZERO);
    }

    #[test]
    fn normalize_render_fps_cap_disables_zero() {
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(normalize_render_fps_cap(Some(60)), Some(60));
    }
}
