//! Scripted headless session that drives the lawn with recorded pointer input.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use lawn_defence_core::{CellIndex, Command, Event, PlacementError, PlantKind, Sun, WorldRect};
use lawn_defence_system_drag_drop::{DragDrop, DropOutcome, PointerInput};
use lawn_defence_system_placement::Validator;
use lawn_defence_system_shooting::Shooting;
use lawn_defence_system_sun_production::SunProduction;
use lawn_defence_world::{self as world, query, World};
use serde::Deserialize;
use tracing::{debug, info};

const DEFAULT_FRAME_RATE: u32 = 60;

/// Recorded pointer input replayed one step per frame.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Script {
    #[serde(default = "default_frame_rate")]
    pub(crate) frame_rate: u32,
    #[serde(default, rename = "step")]
    pub(crate) steps: Vec<Step>,
}

/// Single scripted action.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub(crate) enum Step {
    /// Button goes down, starting a drag over a card or collecting sun.
    Press { x: f32, y: f32 },
    /// Pointer moves while the button state is unchanged.
    Move { x: f32, y: f32 },
    /// Button goes up, resolving any drag in flight.
    Release { x: f32, y: f32 },
    /// Click aimed at a sun pickup only.
    Collect { x: f32, y: f32 },
    /// Idle frames covering the provided number of seconds.
    Wait { seconds: f32 },
}

fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

impl Default for Script {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            steps: vec![
                Step::Press { x: 220.0, y: 700.0 },
                Step::Move { x: 60.0, y: 60.0 },
                Step::Release { x: 60.0, y: 60.0 },
                Step::Press { x: 100.0, y: 700.0 },
                Step::Move { x: 140.0, y: 60.0 },
                Step::Release { x: 140.0, y: 60.0 },
                Step::Wait { seconds: 15.0 },
                Step::Collect { x: 40.0, y: 20.0 },
            ],
        }
    }
}

impl Script {
    /// Loads a script stored at the provided path.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session script at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid session script at {}", path.display()))
    }

    /// Parses a script from TOML contents.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        let script: Self =
            toml::from_str(contents).context("failed to parse session script toml contents")?;
        if script.frame_rate == 0 {
            bail!("session frame_rate must be positive");
        }
        for step in &script.steps {
            if let Step::Wait { seconds } = step {
                if !seconds.is_finite() {
                    bail!("wait step duration must be finite, got {seconds}");
                }
            }
        }
        Ok(script)
    }

    fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

/// Totals gathered while replaying a script.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SessionReport {
    pub(crate) frames: u64,
    pub(crate) committed: Vec<PlantKind>,
    pub(crate) cancelled: Vec<(PlantKind, PlacementError)>,
    pub(crate) sun_collected: u32,
    pub(crate) projectiles_fired: usize,
    pub(crate) final_balance: Sun,
    pub(crate) plants_on_lawn: usize,
    pub(crate) claimed_cells: Vec<(CellIndex, WorldRect)>,
    pub(crate) suns_uncollected: usize,
}

/// World plus every system the adapter drives each frame.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    drag_drop: DragDrop,
    sun_production: SunProduction,
    shooting: Shooting,
    report: SessionReport,
}

impl Session {
    pub(crate) fn new(
        world: World,
        drag_drop: DragDrop,
        sun_production: SunProduction,
        shooting: Shooting,
    ) -> Self {
        Self {
            world,
            drag_drop,
            sun_production,
            shooting,
            report: SessionReport::default(),
        }
    }

    /// Replays every step of the script and summarises the outcome.
    pub(crate) fn run(mut self, script: &Script) -> SessionReport {
        let dt = script.frame_duration();
        let frame_seconds = dt.as_secs_f32();

        for step in &script.steps {
            match *step {
                Step::Press { x, y } => self.frame(PointerInput::press(Vec2::new(x, y)), dt),
                Step::Move { x, y } => self.frame(PointerInput::at(Vec2::new(x, y)), dt),
                Step::Release { x, y } => self.frame(PointerInput::release(Vec2::new(x, y)), dt),
                Step::Collect { x, y } => {
                    let point = Vec2::new(x, y);
                    let mut events = Vec::new();
                    world::apply(&mut self.world, Command::CollectSun { point }, &mut events);
                    self.record(&events);
                    self.frame(PointerInput::at(point), dt);
                }
                Step::Wait { seconds } => {
                    let frames = (seconds.max(0.0) / frame_seconds).ceil() as u64;
                    let pointer = self
                        .drag_drop
                        .candidate()
                        .map_or(Vec2::ZERO, |candidate| candidate.position);
                    for _ in 0..frames {
                        self.frame(PointerInput::at(pointer), dt);
                    }
                }
            }
        }

        self.report.frames = query::tick_index(&self.world);
        self.report.final_balance = query::sun_balance(&self.world);
        self.report.plants_on_lawn = query::entity_view(&self.world).placed().count();
        self.report.suns_uncollected = query::sun_pickups(&self.world).len();
        if let Some(grid) = query::grid(&self.world) {
            self.report.claimed_cells = grid
                .occupied_cells()
                .into_iter()
                .map(|cell| (cell, grid.cell_rect(cell)))
                .collect();
        }
        info!(
            frames = self.report.frames,
            balance = self.report.final_balance.get(),
            plants = self.report.plants_on_lawn,
            "session finished"
        );
        self.report
    }

    fn frame(&mut self, input: PointerInput, dt: Duration) {
        let mut commands = Vec::new();
        let was_dragging = self.drag_drop.is_dragging();
        let outcome = {
            let view = query::entity_view(&self.world);
            let validator = Validator::for_world(&self.world, &view);
            self.drag_drop.handle(
                input,
                &validator,
                query::sun_balance(&self.world),
                &mut commands,
            )
        };

        if input.pressed && !was_dragging && !self.drag_drop.is_dragging() {
            commands.push(Command::CollectSun {
                point: input.position,
            });
        }
        commands.push(Command::Tick { dt });

        let mut events = Vec::new();
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut events);
        }

        self.sun_production.handle(&events, &mut commands);
        self.shooting.handle(&events, &mut commands);
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        if let Some(outcome) = outcome {
            debug!(?outcome, "drop resolved");
            if let DropOutcome::Cancelled { kind, reason } = outcome {
                self.report.cancelled.push((kind, reason));
            }
        }
        self.record(&events);
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::PlantPlaced { kind, .. } => self.report.committed.push(*kind),
                Event::PlacementRejected { kind, reason, .. } => {
                    self.report.cancelled.push((*kind, *reason));
                }
                Event::SunCollected { value, .. } => {
                    self.report.sun_collected =
                        self.report.sun_collected.saturating_add(value.get());
                }
                Event::ProjectileFired { .. } => self.report.projectiles_fired += 1,
                _ => {}
            }
        }
    }
}
