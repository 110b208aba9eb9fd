#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Drag-and-drop controller that turns pointer gestures over the card tray
//! into plant placement commands.
//!
//! The controller walks `Idle -> Dragging -> {Committed, Cancelled} -> Idle`.
//! While dragging it only queries the validator for feedback; the commit
//! itself is delegated to the world through [`Command::PlacePlant`].

use glam::Vec2;
use lawn_defence_core::{
    CellIndex, Command, PlacementError, PlantKind, Sun, Tint, VisualState, WorldRect,
};
use lawn_defence_system_placement::{affordable, PlacementProbe, Validator};
use tracing::{debug, info};

const DEFAULT_SMOOTHING: f32 = 0.3;
const DEFAULT_TRAY_ORIGIN: Vec2 = Vec2::new(100.0, 700.0);
const DEFAULT_CARD_SPACING: f32 = 120.0;
const DEFAULT_CARD_SIZE: Vec2 = Vec2::new(100.0, 120.0);

/// Factory description of a plant that can be dragged out of the tray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantTemplate {
    /// Kind of plant produced by the template.
    pub kind: PlantKind,
    /// Sun debited when the plant is committed.
    pub cost: Sun,
    /// Bounding extent used for overlap tests.
    pub extent: Vec2,
}

impl PlantTemplate {
    /// Creates the stock template for the provided plant kind.
    #[must_use]
    pub const fn for_kind(kind: PlantKind) -> Self {
        Self {
            kind,
            cost: kind.default_cost(),
            extent: kind.default_extent(),
        }
    }

    /// Overrides the placement cost.
    #[must_use]
    pub const fn with_cost(mut self, cost: Sun) -> Self {
        self.cost = cost;
        self
    }

    /// Overrides the bounding extent.
    #[must_use]
    pub const fn with_extent(mut self, extent: Vec2) -> Self {
        self.extent = extent;
        self
    }

    fn instantiate(&self, position: Vec2) -> Candidate {
        Candidate {
            kind: self.kind,
            cost: self.cost,
            extent: self.extent,
            position,
            target_cell: None,
            visual: VisualState::Carded,
        }
    }
}

/// Tunables that shape the controller and its card tray.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Whether candidates ease toward the nearest free grid cell.
    pub snapping: bool,
    /// Fraction of the remaining distance covered each frame while snapping.
    pub smoothing: f32,
    /// Centre of the first card in the tray.
    pub tray_origin: Vec2,
    /// Horizontal distance between neighbouring card centres.
    pub card_spacing: f32,
    /// Rendered size of a card used for press hit-testing.
    pub card_size: Vec2,
    /// Plants offered by the tray, left to right.
    pub templates: Vec<PlantTemplate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapping: true,
            smoothing: DEFAULT_SMOOTHING,
            tray_origin: DEFAULT_TRAY_ORIGIN,
            card_spacing: DEFAULT_CARD_SPACING,
            card_size: DEFAULT_CARD_SIZE,
            templates: PlantKind::ALL
                .iter()
                .copied()
                .map(PlantTemplate::for_kind)
                .collect(),
        }
    }
}

/// Card laid out in the tray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Card {
    /// Template the card instantiates.
    pub template: PlantTemplate,
    /// World-space bounds accepting press gestures.
    pub bounds: WorldRect,
}

/// Placement in progress, owned by the controller while dragging.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Kind of plant being placed.
    pub kind: PlantKind,
    /// Sun required to commit the plant.
    pub cost: Sun,
    /// Bounding extent used for overlap tests.
    pub extent: Vec2,
    /// Current world-space position of the candidate.
    pub position: Vec2,
    /// Grid cell the candidate is easing toward, if any.
    pub target_cell: Option<CellIndex>,
    /// Presentation state including the feedback tint.
    pub visual: VisualState,
}

/// Pointer snapshot distilled from adapter input for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerInput {
    /// Pointer position in world space.
    pub position: Vec2,
    /// Indicates whether the button went down on this frame.
    pub pressed: bool,
    /// Indicates whether the button went up on this frame.
    pub released: bool,
}

impl PointerInput {
    /// Pointer hovering or held at the provided position.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            pressed: false,
            released: false,
        }
    }

    /// Pointer pressed down at the provided position.
    #[must_use]
    pub const fn press(position: Vec2) -> Self {
        Self {
            position,
            pressed: true,
            released: false,
        }
    }

    /// Pointer released at the provided position.
    #[must_use]
    pub const fn release(position: Vec2) -> Self {
        Self {
            position,
            pressed: false,
            released: true,
        }
    }
}

/// Resolution of a drag once the pointer is released.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DropOutcome {
    /// The candidate passed every check and a placement command was emitted.
    Committed {
        /// Kind of plant committed.
        kind: PlantKind,
        /// Final anchor handed to the world.
        position: Vec2,
        /// Grid cell the plant claims, if any.
        cell: Option<CellIndex>,
    },
    /// The candidate was discarded without touching world state.
    Cancelled {
        /// Kind of plant discarded.
        kind: PlantKind,
        /// Check that rejected the drop.
        reason: PlacementError,
    },
}

/// Controller that owns at most one in-flight placement candidate.
#[derive(Clone, Debug)]
pub struct DragDrop {
    snapping: bool,
    smoothing: f32,
    cards: Vec<Card>,
    candidate: Option<Candidate>,
}

impl Default for DragDrop {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl DragDrop {
    /// Creates an idle controller and lays out its card tray.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let smoothing = if config.smoothing.is_finite() {
            config.smoothing.clamp(0.0, 1.0)
        } else {
            DEFAULT_SMOOTHING
        };
        let cards = config
            .templates
            .iter()
            .enumerate()
            .map(|(slot, template)| Card {
                template: *template,
                bounds: WorldRect::centered(
                    config.tray_origin + Vec2::new(slot as f32 * config.card_spacing, 0.0),
                    config.card_size,
                ),
            })
            .collect();

        Self {
            snapping: config.snapping,
            smoothing,
            cards,
            candidate: None,
        }
    }

    /// Cards offered by the tray in layout order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Reports whether a candidate is currently being dragged.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.candidate.is_some()
    }

    /// Candidate currently being dragged, if any.
    #[must_use]
    pub fn candidate(&self) -> Option<&Candidate> {
        self.candidate.as_ref()
    }

    /// Starts dragging a fresh candidate of the provided kind.
    ///
    /// Returns `false` when a drag is already in flight or no card offers the
    /// kind.
    pub fn begin_drag(&mut self, kind: PlantKind, pointer: Vec2) -> bool {
        if self.candidate.is_some() {
            return false;
        }
        let Some(card) = self.cards.iter().find(|card| card.template.kind == kind) else {
            return false;
        };

        debug!(target: "drag_drop", ?kind, x = pointer.x, y = pointer.y, "drag started");
        self.candidate = Some(card.template.instantiate(pointer));
        true
    }

    /// Processes one frame of pointer input.
    ///
    /// Presses over a card begin a drag, held pointers move the candidate and
    /// refresh its tint, and releases resolve the candidate. Commits push a
    /// [`Command::PlacePlant`] into `out`.
    pub fn handle(
        &mut self,
        input: PointerInput,
        validator: &Validator<'_>,
        balance: Sun,
        out: &mut Vec<Command>,
    ) -> Option<DropOutcome> {
        if input.pressed && self.candidate.is_none() {
            let pressed_card = self
                .cards
                .iter()
                .find(|card| card.bounds.contains(input.position))
                .map(|card| card.template.kind);
            if let Some(kind) = pressed_card {
                let _ = self.begin_drag(kind, input.position);
            }
        }

        self.update(input.position, validator, balance);

        if input.released {
            return self.release(validator, balance, out);
        }
        None
    }

    fn update(&mut self, pointer: Vec2, validator: &Validator<'_>, balance: Sun) {
        let snapping = self.snapping;
        let smoothing = self.smoothing;
        let Some(candidate) = self.candidate.as_mut() else {
            return;
        };

        let nearest = validator
            .grid()
            .filter(|grid| snapping && grid.is_point_in_grid_area(pointer))
            .and_then(|grid| {
                grid.find_nearest_free_cell(pointer)
                    .map(|cell| (cell, grid.cell_to_world(cell)))
            });

        match nearest {
            Some((cell, centre)) => {
                candidate.position = candidate.position.lerp(centre, smoothing);
                candidate.target_cell = Some(cell);
            }
            None => {
                candidate.position = pointer;
                candidate.target_cell = None;
            }
        }

        let anchor = anchor_of(candidate, validator);
        let accepted = validator.can_place(&PlacementProbe::placed(anchor, candidate.extent))
            && affordable(balance, candidate.cost);
        let tint = if accepted {
            Tint::DRAG_ACCEPT
        } else {
            Tint::DRAG_REJECT
        };
        candidate.visual = VisualState::Dragging(tint);
    }

    fn release(
        &mut self,
        validator: &Validator<'_>,
        balance: Sun,
        out: &mut Vec<Command>,
    ) -> Option<DropOutcome> {
        let candidate = self.candidate.take()?;
        let anchor = anchor_of(&candidate, validator);
        let kind = candidate.kind;

        let verdict = validator
            .check(&PlacementProbe::placed(anchor, candidate.extent))
            .and_then(|()| {
                if affordable(balance, candidate.cost) {
                    Ok(())
                } else {
                    Err(PlacementError::InsufficientFunds)
                }
            });

        if let Err(reason) = verdict {
            info!(target: "drag_drop", ?kind, %reason, "drop cancelled");
            return Some(DropOutcome::Cancelled { kind, reason });
        }

        let cell = validator.target_cell(anchor);
        info!(target: "drag_drop", ?kind, x = anchor.x, y = anchor.y, "drop committed");
        out.push(Command::PlacePlant {
            kind,
            position: anchor,
            extent: candidate.extent,
            cost: candidate.cost,
        });
        Some(DropOutcome::Committed {
            kind,
            position: anchor,
            cell,
        })
    }
}

/// Position a candidate would be committed at.
///
/// Snapped candidates land on the centre of their target cell; free-floating
/// ones stay where they are.
fn anchor_of(candidate: &Candidate, validator: &Validator<'_>) -> Vec2 {
    match (candidate.target_cell, validator.grid()) {
        (Some(cell), Some(grid)) => grid.cell_to_world(cell),
        _ => candidate.position,
    }
}
