use std::cell::Cell;
use std::env;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::{resolve_app_paths, StartupError};

use super::input::{ActionInput, InputAction, Key, KeyBindings, KeyboardState, PlatformEvent};
use super::metrics::FrameStats;
use super::rendering::{FsImageDecoder, Renderer, Viewport, DEFAULT_TEXTURE_CAPACITY};
use super::scene::{Scene, SceneError, SceneWorld, WorldSettings};
use super::sprite::DEFAULT_SPRITE_CAPACITY;

pub const SLOW_FRAME_ENV_VAR: &str = "KNIGHT_SLOW_FRAME_MS";

const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(100);
const DEFAULT_MAX_ACCUMULATOR: Duration = Duration::from_millis(250);
const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_accumulator: Duration,
    pub fps_refresh_interval: Duration,
    pub debug_dump_interval: Duration,
    pub clear_color: [u8; 3],
    pub texture_capacity: usize,
    pub max_sprites: usize,
    pub key_bindings: KeyBindings,
    pub simulated_slow_frame_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Knight Engine 2D - Sprite Demo".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            max_accumulator: DEFAULT_MAX_ACCUMULATOR,
            fps_refresh_interval: DEFAULT_REPORT_INTERVAL,
            debug_dump_interval: DEFAULT_REPORT_INTERVAL,
            clear_color: [34, 139, 34],
            texture_capacity: DEFAULT_TEXTURE_CAPACITY,
            max_sprites: DEFAULT_SPRITE_CAPACITY,
            key_bindings: KeyBindings::default(),
            simulated_slow_frame_ms: 0,
        }
    }
}

impl LoopConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.window_width.max(1),
            height: self.window_height.max(1),
        }
    }

    pub fn world_settings(&self) -> WorldSettings {
        WorldSettings {
            viewport: self.viewport(),
            texture_capacity: self.texture_capacity,
            sprite_capacity: self.max_sprites,
            clear_color: self.clear_color,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("failed to load scene: {0}")]
    SceneLoad(#[from] SceneError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
    #[error("failed to present frame: {0}")]
    Render(#[source] PixelsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub ticks_to_run: u32,
    pub remaining_accumulator: Duration,
    pub dropped_backlog: Duration,
}

/// Fixed-step accumulator. All arithmetic is on `Duration` so the same delta
/// sequence always yields the same tick count and remainder.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_accumulator: Duration,
    accumulator: Duration,
}

impl FixedTimestep {
    pub fn new(target_tps: u32, max_frame_delta: Duration, max_accumulator: Duration) -> Self {
        let target_tps = target_tps.max(1);
        Self {
            fixed_dt: Duration::from_secs(1) / target_tps,
            max_frame_delta: normalize_non_zero_duration(max_frame_delta, DEFAULT_MAX_FRAME_DELTA),
            max_accumulator: normalize_non_zero_duration(max_accumulator, DEFAULT_MAX_ACCUMULATOR),
            accumulator: Duration::ZERO,
        }
    }

    pub fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    pub fn clamp_frame_delta(&self, raw_frame_dt: Duration) -> Duration {
        clamp_frame_delta(raw_frame_dt, self.max_frame_delta)
    }

    /// Adds an already clamped frame delta and plans this frame's ticks.
    pub fn advance(&mut self, frame_dt: Duration) -> StepPlan {
        let plan = plan_sim_steps(
            self.accumulator.saturating_add(frame_dt),
            self.fixed_dt,
            self.max_accumulator,
        );
        self.accumulator = plan.remaining_accumulator;
        plan
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    WindowClose,
    QuitKey,
}

impl ShutdownReason {
    fn as_str(self) -> &'static str {
        match self {
            ShutdownReason::WindowClose => "window_close",
            ShutdownReason::QuitKey => "quit_key",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub ticks: u32,
    pub dropped_backlog: Duration,
}

/// Platform-independent half of the loop: key state, the running flag and
/// the fixed-step scheduling of a scene.
///
/// A frame is `begin_frame`, any number of `handle_event`, then `run_frame`.
/// `begin_frame` refreshes key edges, so it must run before that frame's
/// events are applied.
#[derive(Debug)]
pub struct EngineCore {
    state: LoopState,
    keyboard: KeyboardState,
    bindings: KeyBindings,
    timestep: FixedTimestep,
}

impl EngineCore {
    pub fn new(config: &LoopConfig) -> Self {
        Self {
            state: LoopState::Running,
            keyboard: KeyboardState::new(),
            bindings: config.key_bindings.clone(),
            timestep: FixedTimestep::new(
                config.target_tps,
                config.max_frame_delta,
                config.max_accumulator,
            ),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    /// Returns the clamped frame delta.
    pub fn begin_frame(&mut self, raw_frame_dt: Duration) -> Duration {
        self.keyboard.refresh();
        self.timestep.clamp_frame_delta(raw_frame_dt)
    }

    /// Applies one platform event. Returns the reason when it stops the loop.
    pub fn handle_event(&mut self, event: PlatformEvent) -> Option<ShutdownReason> {
        match event {
            PlatformEvent::Quit => self.stop(ShutdownReason::WindowClose),
            PlatformEvent::KeyDown(key) => {
                self.keyboard.set_key(key, true);
                if self.bindings.is_bound_to(key, InputAction::Quit) {
                    self.stop(ShutdownReason::QuitKey)
                } else {
                    None
                }
            }
            PlatformEvent::KeyUp(key) => {
                self.keyboard.set_key(key, false);
                None
            }
        }
    }

    pub fn release_keys(&mut self) {
        self.keyboard.release_all();
    }

    fn stop(&mut self, reason: ShutdownReason) -> Option<ShutdownReason> {
        if self.state == LoopState::Stopped {
            return None;
        }
        self.state = LoopState::Stopped;
        info!(reason = reason.as_str(), "shutdown_requested");
        Some(reason)
    }

    /// Continuous input, then the per-frame toggles, then every fixed tick
    /// the accumulator allows.
    pub fn run_frame(
        &mut self,
        frame_dt: Duration,
        scene: &mut dyn Scene,
        world: &mut SceneWorld,
    ) -> FrameReport {
        let input = ActionInput::new(&self.keyboard, &self.bindings);
        scene.apply_frame_input(&input, world);

        if input.is_pressed(InputAction::ToggleDebug) {
            world.toggle_debug();
        }
        if input.is_pressed(InputAction::ToggleStressTest) {
            world.toggle_stress_test();
        }

        let plan = self.timestep.advance(frame_dt);
        let fixed_dt_seconds = self.timestep.fixed_dt().as_secs_f32();
        for _ in 0..plan.ticks_to_run {
            scene.update(fixed_dt_seconds, &input, world);
        }

        if plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_backlog_ms = plan.dropped_backlog.as_secs_f64() * 1000.0,
                "accumulator_clamped"
            );
        }

        FrameReport {
            ticks: plan.ticks_to_run,
            dropped_backlog: plan.dropped_backlog,
        }
    }
}

pub fn run_app(config: LoopConfig, mut scene: Box<dyn Scene>) -> Result<(), AppError> {
    let app_paths = resolve_app_paths()?;
    info!(root = %app_paths.root.display(), "asset_root");

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer =
        Renderer::new(Arc::clone(&window), config.viewport()).map_err(AppError::CreateRenderer)?;

    let decoder = FsImageDecoder::new(app_paths.root.clone());
    let mut world = SceneWorld::new(config.world_settings(), Box::new(decoder));
    if let Err(error) = scene.load(&mut world) {
        world.teardown();
        return Err(AppError::SceneLoad(error));
    }
    info!(sprite_count = world.sprite_count(), "scene_loaded");

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut core = EngineCore::new(&config);
    let fps_refresh_interval =
        normalize_non_zero_duration(config.fps_refresh_interval, DEFAULT_REPORT_INTERVAL);
    let debug_dump_interval =
        normalize_non_zero_duration(config.debug_dump_interval, DEFAULT_REPORT_INTERVAL);
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);

    info!(
        target_tps = config.target_tps.max(1),
        fixed_dt_us = core.timestep().fixed_dt().as_micros() as u64,
        max_frame_delta_ms = config.max_frame_delta.as_millis() as u64,
        max_accumulator_ms = config.max_accumulator.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        "loop_config"
    );

    let window_for_loop = Arc::clone(&window);
    let render_failure: Rc<Cell<Option<PixelsError>>> = Rc::new(Cell::new(None));
    let render_failure_in_loop = Rc::clone(&render_failure);
    let started = Instant::now();
    let mut last_frame_instant = started;
    let mut frame_dt = Duration::ZERO;
    let mut raw_frame_dt = Duration::ZERO;
    let mut frame_stats = FrameStats::new(fps_refresh_interval, started);
    let mut last_debug_dump = started;

    event_loop
        .run(move |event, window_target| match event {
            Event::NewEvents(_) => {
                let now = Instant::now();
                raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                last_frame_instant = now;
                frame_dt = core.begin_frame(raw_frame_dt);
            }
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::Resized(size) => {
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            render_failure_in_loop.set(Some(error));
                            window_target.exit();
                        }
                    }
                    WindowEvent::Focused(false) => core.release_keys(),
                    other => {
                        if let Some(platform_event) = translate_window_event(&other) {
                            core.handle_event(platform_event);
                        }
                    }
                }
            }
            Event::AboutToWait => {
                if !core.is_running() {
                    window_target.exit();
                    return;
                }

                if slow_frame_delay > Duration::ZERO {
                    // Debug perturbation to exercise the delta and accumulator clamps.
                    thread::sleep(slow_frame_delay);
                }

                let report = core.run_frame(frame_dt, scene.as_mut(), &mut world);
                frame_stats.record_ticks(report.ticks);

                if let Err(error) = renderer.render_world(&world) {
                    warn!(error = %error, "renderer_draw_failed");
                    render_failure_in_loop.set(Some(error));
                    window_target.exit();
                    return;
                }
                frame_stats.record_frame(raw_frame_dt);

                let now = Instant::now();
                if let Some(snapshot) = frame_stats.maybe_snapshot(now) {
                    window_for_loop.set_title(&format!(
                        "{} - {:.1} FPS",
                        config.window_title, snapshot.fps
                    ));
                }
                if world.debug_enabled()
                    && now.saturating_duration_since(last_debug_dump) >= debug_dump_interval
                {
                    last_debug_dump = now;
                    log_debug_stats(&world, frame_stats.latest().fps, frame_dt);
                }
            }
            Event::LoopExiting => {
                scene.unload(&mut world);
                world.teardown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)?;

    match render_failure.take() {
        Some(error) => Err(AppError::Render(error)),
        None => Ok(()),
    }
}

fn log_debug_stats(world: &SceneWorld, fps: f32, frame_dt: Duration) {
    let player = world.player().map(|sprite| sprite.position).unwrap_or_default();
    let camera = world.camera().position;
    info!(
        fps,
        delta_s = frame_dt.as_secs_f32(),
        delta_ms = frame_dt.as_secs_f32() * 1000.0,
        sprites = world.sprite_count(),
        player_x = player.x,
        player_y = player.y,
        camera_x = camera.x,
        camera_y = camera.y,
        "debug_stats"
    );
}

fn translate_window_event(event: &WindowEvent) -> Option<PlatformEvent> {
    match event {
        WindowEvent::CloseRequested => Some(PlatformEvent::Quit),
        WindowEvent::KeyboardInput { event, .. } => {
            if event.repeat {
                return None;
            }
            let key = Key::from_physical(event.physical_key)?;
            Some(match event.state {
                ElementState::Pressed => PlatformEvent::KeyDown(key),
                ElementState::Released => PlatformEvent::KeyUp(key),
            })
        }
        _ => None,
    }
}

/// Clamps the accumulator to `max_accumulator`, then drains whole ticks.
/// Whatever the clamp removed is reported as dropped backlog.
pub fn plan_sim_steps(
    accumulator: Duration,
    fixed_dt: Duration,
    max_accumulator: Duration,
) -> StepPlan {
    let clamped = accumulator.min(max_accumulator);
    let dropped_backlog = accumulator.saturating_sub(clamped);
    if fixed_dt.is_zero() {
        return StepPlan {
            ticks_to_run: 0,
            remaining_accumulator: clamped,
            dropped_backlog,
        };
    }

    let ticks = (clamped.as_nanos() / fixed_dt.as_nanos()).min(u128::from(u32::MAX)) as u32;
    let consumed = fixed_dt.saturating_mul(ticks);
    StepPlan {
        ticks_to_run: ticks,
        remaining_accumulator: clamped.saturating_sub(consumed),
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    parse_slow_frame_delay(env::var(SLOW_FRAME_ENV_VAR), config_slow_frame_ms)
}

fn parse_slow_frame_delay(
    value: Result<String, env::VarError>,
    config_slow_frame_ms: u64,
) -> Duration {
    match value {
        Ok(value) => match value.trim().parse::<u64>() {
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
    use crate::app::rendering::{DecodeError, DecodedImage, ImageDecoder};

    struct NoAssets;

    impl ImageDecoder for NoAssets {
        fn decode(&mut self, _path: &str) -> Result<DecodedImage, DecodeError> {
            Err(DecodeError::Open("no assets in tests".to_string()))
        }
    }

    #[derive(Debug, PartialEq)]
    enum Call {
        FrameInput { debug_enabled: bool },
        Update(f32),
    }

    #[derive(Default)]
    struct RecordingScene {
        calls: Vec<Call>,
    }

    impl RecordingScene {
        fn updates(&self) -> usize {
            self.calls
                .iter()
                .filter(|call| matches!(call, Call::Update(_)))
                .count()
        }

        fn simulated_seconds(&self) -> f64 {
            self.calls
                .iter()
                .map(|call| match call {
                    Call::Update(dt) => f64::from(*dt),
                    Call::FrameInput { .. } => 0.0,
                })
                .sum()
        }
    }

    impl Scene for RecordingScene {
        fn load(&mut self, _world: &mut SceneWorld) -> Result<(), SceneError> {
            Ok(())
        }

        fn apply_frame_input(&mut self, _input: &ActionInput<'_>, world: &mut SceneWorld) {
            self.calls.push(Call::FrameInput {
                debug_enabled: world.debug_enabled(),
            });
        }

        fn update(
            &mut self,
            fixed_dt_seconds: f32,
            _input: &ActionInput<'_>,
            _world: &mut SceneWorld,
        ) {
            self.calls.push(Call::Update(fixed_dt_seconds));
        }

        fn unload(&mut self, _world: &mut SceneWorld) {}
    }

    fn world() -> SceneWorld {
        SceneWorld::with_seed(WorldSettings::default(), Box::new(NoAssets), 5)
    }

    fn run_frames(deltas_ms: &[u64]) -> (Vec<u32>, RecordingScene) {
        let mut core = EngineCore::new(&LoopConfig::default());
        let mut scene = RecordingScene::default();
        let mut world = world();
        let ticks = deltas_ms
            .iter()
            .map(|ms| {
                let frame_dt = core.begin_frame(Duration::from_millis(*ms));
                core.run_frame(frame_dt, &mut scene, &mut world).ticks
            })
            .collect();
        (ticks, scene)
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(100);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let max_accumulator = Duration::from_millis(250);
        let result = plan_sim_steps(Duration::from_millis(50), fixed_dt, max_accumulator);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(2));
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_clamps_accumulator_before_draining() {
        let fixed_dt = Duration::from_millis(10);
        let max_accumulator = Duration::from_millis(250);
        let result = plan_sim_steps(Duration::from_millis(400), fixed_dt, max_accumulator);

        assert_eq!(result.ticks_to_run, 25);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(150));
    }

    #[test]
    fn zero_tick_rate_is_normalized() {
        let timestep = FixedTimestep::new(0, Duration::ZERO, Duration::ZERO);
        assert_eq!(timestep.fixed_dt(), Duration::from_secs(1));
        assert_eq!(
            timestep.clamp_frame_delta(Duration::from_secs(3)),
            DEFAULT_MAX_FRAME_DELTA
        );
    }

    #[test]
    fn same_delta_sequence_gives_same_ticks() {
        let deltas = [16, 17, 5, 40, 100, 0, 33, 16, 16, 250];
        let (first_ticks, first_scene) = run_frames(&deltas);
        let (second_ticks, second_scene) = run_frames(&deltas);

        assert_eq!(first_ticks, second_ticks);
        assert_eq!(first_scene.updates(), second_scene.updates());
        assert_eq!(
            first_scene.simulated_seconds(),
            second_scene.simulated_seconds()
        );
    }

    #[test]
    fn oversized_frame_counts_as_clamp_value() {
        let (stalled, _) = run_frames(&[16, 2_000, 16]);
        let (at_clamp, _) = run_frames(&[16, 100, 16]);
        assert_eq!(stalled, at_clamp);
    }

    #[test]
    fn accumulator_is_bounded_across_frames() {
        let config = LoopConfig {
            max_frame_delta: Duration::from_secs(1),
            ..LoopConfig::default()
        };
        let mut core = EngineCore::new(&config);
        let mut scene = RecordingScene::default();
        let mut world = world();

        let frame_dt = core.begin_frame(Duration::from_secs(1));
        let report = core.run_frame(frame_dt, &mut scene, &mut world);
        assert_eq!(report.ticks, 15);
        assert!(report.dropped_backlog > Duration::from_millis(700));
        assert!(core.timestep().accumulator() < core.timestep().fixed_dt());
    }

    #[test]
    fn update_receives_fixed_dt_only() {
        let (_, scene) = run_frames(&[100, 7, 45]);
        let fixed = (Duration::from_secs(1) / 60).as_secs_f32();
        for call in &scene.calls {
            if let Call::Update(dt) = call {
                assert_eq!(*dt, fixed);
            }
        }
    }

    #[test]
    fn frame_input_runs_once_before_ticks() {
        let (_, scene) = run_frames(&[100]);
        assert!(matches!(scene.calls[0], Call::FrameInput { .. }));
        assert_eq!(scene.calls.len(), 7);
        assert!(scene.calls[1..]
            .iter()
            .all(|call| matches!(call, Call::Update(_))));
    }

    #[test]
    fn toggles_fire_once_per_press_regardless_of_tick_count() {
        let mut core = EngineCore::new(&LoopConfig::default());
        let mut scene = RecordingScene::default();
        let mut world = world();

        let frame_dt = core.begin_frame(Duration::from_millis(100));
        core.handle_event(PlatformEvent::KeyDown(Key::P));
        core.handle_event(PlatformEvent::KeyDown(Key::T));
        let report = core.run_frame(frame_dt, &mut scene, &mut world);
        assert!(report.ticks > 1);
        assert!(world.debug_enabled());
        assert!(world.stress_test().is_active());

        // Held across the next frame: no second toggle.
        let frame_dt = core.begin_frame(Duration::from_millis(100));
        core.run_frame(frame_dt, &mut scene, &mut world);
        assert!(world.debug_enabled());
        assert!(world.stress_test().is_active());

        let frame_dt = core.begin_frame(Duration::from_millis(16));
        core.handle_event(PlatformEvent::KeyUp(Key::P));
        core.run_frame(frame_dt, &mut scene, &mut world);
        let frame_dt = core.begin_frame(Duration::from_millis(16));
        core.handle_event(PlatformEvent::KeyDown(Key::P));
        core.run_frame(frame_dt, &mut scene, &mut world);
        assert!(!world.debug_enabled());
    }

    #[test]
    fn toggle_is_visible_to_next_frame_input_only() {
        let mut core = EngineCore::new(&LoopConfig::default());
        let mut scene = RecordingScene::default();
        let mut world = world();

        let frame_dt = core.begin_frame(Duration::ZERO);
        core.handle_event(PlatformEvent::KeyDown(Key::P));
        core.run_frame(frame_dt, &mut scene, &mut world);
        let frame_dt = core.begin_frame(Duration::ZERO);
        core.run_frame(frame_dt, &mut scene, &mut world);

        assert_eq!(
            scene.calls,
            vec![
                Call::FrameInput {
                    debug_enabled: false
                },
                Call::FrameInput {
                    debug_enabled: true
                },
            ]
        );
    }

    #[test]
    fn quit_event_and_quit_keys_stop_the_loop_once() {
        let mut core = EngineCore::new(&LoopConfig::default());
        assert_eq!(core.handle_event(PlatformEvent::KeyDown(Key::W)), None);
        assert!(core.is_running());
        assert_eq!(
            core.handle_event(PlatformEvent::KeyDown(Key::Q)),
            Some(ShutdownReason::QuitKey)
        );
        assert_eq!(core.state(), LoopState::Stopped);
        assert_eq!(core.handle_event(PlatformEvent::Quit), None);

        let mut core = EngineCore::new(&LoopConfig::default());
        assert_eq!(
            core.handle_event(PlatformEvent::Quit),
            Some(ShutdownReason::WindowClose)
        );
        let mut core = EngineCore::new(&LoopConfig::default());
        assert_eq!(
            core.handle_event(PlatformEvent::KeyDown(Key::Escape)),
            Some(ShutdownReason::QuitKey)
        );
    }

    #[test]
    fn key_events_feed_keyboard_state() {
        let mut core = EngineCore::new(&LoopConfig::default());
        core.begin_frame(Duration::ZERO);
        core.handle_event(PlatformEvent::KeyDown(Key::D));
        assert!(core.keyboard().is_pressed(Key::D));
        core.begin_frame(Duration::ZERO);
        core.handle_event(PlatformEvent::KeyUp(Key::D));
        assert!(core.keyboard().is_released(Key::D));
        core.handle_event(PlatformEvent::KeyDown(Key::D));
        core.release_keys();
        assert!(!core.keyboard().is_down(Key::D));
    }

    #[test]
    fn slow_frame_env_value_parses_or_falls_back() {
        assert_eq!(
            parse_slow_frame_delay(Ok("25".to_string()), 0),
            Duration::from_millis(25)
        );
        assert_eq!(
            parse_slow_frame_delay(Ok("soon".to_string()), 7),
            Duration::from_millis(7)
        );
        assert_eq!(
            parse_slow_frame_delay(Err(env::VarError::NotPresent), 3),
            Duration::from_millis(3)
        );
    }

    #[test]
    fn default_config_matches_demo_constants() {
        let config = LoopConfig::default();
        assert_eq!(
            config.viewport(),
            Viewport {
                width: 800,
                height: 600
            }
        );
        assert_eq!(config.target_tps, 60);
        let settings = config.world_settings();
        assert_eq!(settings.texture_capacity, 32);
        assert_eq!(settings.sprite_capacity, 256);
        assert_eq!(settings.clear_color, [34, 139, 34]);
    }
}
