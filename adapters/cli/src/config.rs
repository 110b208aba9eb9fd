//! Author-time lawn configuration loaded from TOML.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use lawn_defence_core::{GridLayout, PlacementRegion, PlantKind, Sun, WorldRect};
use lawn_defence_system_drag_drop::{Config as DragDropConfig, PlantTemplate};
use lawn_defence_system_sun_production::{Config as SunProductionConfig, IntervalRange};
use lawn_defence_world::WorldConfig;
use serde::Deserialize;

/// Complete lawn configuration. Every section falls back to stock values.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LawnConfig {
    pub(crate) grid: GridSection,
    pub(crate) region: Option<RegionSection>,
    pub(crate) economy: EconomySection,
    pub(crate) drag: DragSection,
    pub(crate) cards: CardsSection,
    pub(crate) plants: Vec<PlantSection>,
    pub(crate) viewport: ViewportSection,
    pub(crate) sun: SunSection,
    pub(crate) shooting: ShootingSection,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GridSection {
    /// Disabling the grid switches placement to region checks.
    pub(crate) enabled: bool,
    pub(crate) cell_size: Vec2,
    pub(crate) origin: Vec2,
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) max_search_radius: u32,
}

impl Default for GridSection {
    fn default() -> Self {
        let layout = GridLayout::default();
        Self {
            enabled: true,
            cell_size: layout.cell_size(),
            origin: layout.origin(),
            columns: layout.columns(),
            rows: layout.rows(),
            max_search_radius: layout.max_search_radius(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case", deny_unknown_fields)]
pub(crate) enum RegionSection {
    Rect { min: Vec2, size: Vec2 },
    Polygon { vertices: Vec<Vec2> },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EconomySection {
    pub(crate) starting_sun: Sun,
}

impl Default for EconomySection {
    fn default() -> Self {
        Self {
            starting_sun: Sun::new(200),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DragSection {
    pub(crate) snapping: bool,
    pub(crate) smoothing: f32,
}

impl Default for DragSection {
    fn default() -> Self {
        let defaults = DragDropConfig::default();
        Self {
            snapping: defaults.snapping,
            smoothing: defaults.smoothing,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CardsSection {
    pub(crate) tray_origin: Vec2,
    pub(crate) spacing: f32,
    pub(crate) card_size: Vec2,
}

impl Default for CardsSection {
    fn default() -> Self {
        let defaults = DragDropConfig::default();
        Self {
            tray_origin: defaults.tray_origin,
            spacing: defaults.card_spacing,
            card_size: defaults.card_size,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PlantSection {
    pub(crate) kind: PlantKind,
    #[serde(default)]
    pub(crate) cost: Option<Sun>,
    #[serde(default)]
    pub(crate) extent: Option<Vec2>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ViewportSection {
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Default for ViewportSection {
    fn default() -> Self {
        let viewport = WorldConfig::default().viewport;
        Self {
            width: viewport.x,
            height: viewport.y,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SunSection {
    pub(crate) value: Sun,
    /// Seconds before a new sunflower's first production, as `[min, max]`.
    pub(crate) first_interval: [f32; 2],
    /// Seconds between later productions, as `[min, max]`.
    pub(crate) mature_interval: [f32; 2],
    pub(crate) spawn_offset: Vec2,
    pub(crate) fall_velocity: Vec2,
    pub(crate) extent: Vec2,
}

impl Default for SunSection {
    fn default() -> Self {
        let defaults = SunProductionConfig::default();
        Self {
            value: defaults.sun_value,
            first_interval: [
                defaults.first_interval.min().as_secs_f32(),
                defaults.first_interval.max().as_secs_f32(),
            ],
            mature_interval: [
                defaults.mature_interval.min().as_secs_f32(),
                defaults.mature_interval.max().as_secs_f32(),
            ],
            spawn_offset: defaults.spawn_offset,
            fall_velocity: defaults.spawn_velocity,
            extent: WorldConfig::default().sun_extent,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ShootingSection {
    pub(crate) fire_interval: f32,
    pub(crate) projectile_speed: f32,
    pub(crate) projectile_extent: Vec2,
}

impl Default for ShootingSection {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            fire_interval: 0.5,
            projectile_speed: world.projectile_speed,
            projectile_extent: world.projectile_extent,
        }
    }
}

impl LawnConfig {
    /// Loads the configuration stored at the provided path.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read lawn config at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid lawn config at {}", path.display()))
    }

    /// Parses a configuration from TOML contents.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse lawn config toml contents")
    }

    /// Collaborators bound into the world at construction.
    pub(crate) fn world_config(&self) -> Result<WorldConfig> {
        let grid = if self.grid.enabled {
            let layout = GridLayout::new(
                self.grid.cell_size,
                self.grid.origin,
                self.grid.columns,
                self.grid.rows,
                self.grid.max_search_radius,
            )
            .context("invalid [grid] section")?;
            Some(layout)
        } else {
            None
        };

        let region = match &self.region {
            Some(RegionSection::Rect { min, size }) => {
                if size.x <= 0.0 || size.y <= 0.0 {
                    bail!("region rectangle must have a positive size, got {size}");
                }
                Some(PlacementRegion::Rect(WorldRect::from_min_size(*min, *size)))
            }
            Some(RegionSection::Polygon { vertices }) => {
                if vertices.len() < 3 {
                    bail!(
                        "region polygon needs at least three vertices, got {}",
                        vertices.len()
                    );
                }
                Some(PlacementRegion::Polygon(vertices.clone()))
            }
            None => None,
        };

        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            bail!(
                "viewport must have a positive size, got {}x{}",
                self.viewport.width,
                self.viewport.height
            );
        }

        Ok(WorldConfig {
            grid,
            region,
            starting_sun: self.economy.starting_sun,
            viewport: Vec2::new(self.viewport.width, self.viewport.height),
            sun_extent: self.sun.extent,
            projectile_speed: self.shooting.projectile_speed,
            projectile_extent: self.shooting.projectile_extent,
        })
    }

    /// Controller tunables and the card tray contents.
    pub(crate) fn drag_drop_config(&self) -> Result<DragDropConfig> {
        let mut templates: Vec<PlantTemplate> = Vec::with_capacity(self.plants.len());
        for plant in &self.plants {
            if templates.iter().any(|template| template.kind == plant.kind) {
                bail!("plant {:?} is listed more than once", plant.kind);
            }
            let mut template = PlantTemplate::for_kind(plant.kind);
            if let Some(cost) = plant.cost {
                template = template.with_cost(cost);
            }
            if let Some(extent) = plant.extent {
                template = template.with_extent(extent);
            }
            templates.push(template);
        }
        if templates.is_empty() {
            templates = PlantKind::ALL
                .iter()
                .copied()
                .map(PlantTemplate::for_kind)
                .collect();
        }

        Ok(DragDropConfig {
            snapping: self.drag.snapping,
            smoothing: self.drag.smoothing,
            tray_origin: self.cards.tray_origin,
            card_spacing: self.cards.spacing,
            card_size: self.cards.card_size,
            templates,
        })
    }

    /// Sunflower production tuning, optionally overriding the seed.
    pub(crate) fn sun_production_config(&self, seed: Option<u64>) -> Result<SunProductionConfig> {
        let defaults = SunProductionConfig::default();
        Ok(SunProductionConfig {
            first_interval: interval_range(self.sun.first_interval)
                .context("invalid sun.first_interval")?,
            mature_interval: interval_range(self.sun.mature_interval)
                .context("invalid sun.mature_interval")?,
            sun_value: self.sun.value,
            spawn_offset: self.sun.spawn_offset,
            spawn_velocity: self.sun.fall_velocity,
            rng_seed: seed.unwrap_or(defaults.rng_seed),
        })
    }

    /// Time between consecutive shots of a planted shooter.
    pub(crate) fn fire_interval(&self) -> Result<Duration> {
        seconds(self.shooting.fire_interval).context("invalid shooting.fire_interval")
    }
}

fn interval_range([min, max]: [f32; 2]) -> Result<IntervalRange> {
    Ok(IntervalRange::new(seconds(min)?, seconds(max)?))
}

fn seconds(value: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(value)
        .with_context(|| format!("{value} is not a non-negative number of seconds"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_matches_stock_values() {
        let config = LawnConfig::from_toml_str("").expect("empty config parses");

        let world = config.world_config().expect("stock world config is valid");
        assert_eq!(world, WorldConfig::default());

        let drag = config.drag_drop_config().expect("stock tray is valid");
        assert_eq!(drag, DragDropConfig::default());

        let sun = config.sun_production_config(None).expect("stock sun is valid");
        assert_eq!(sun, SunProductionConfig::default());

        assert_eq!(
            config.fire_interval().expect("stock interval"),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn sections_override_defaults() {
        let config = LawnConfig::from_toml_str(
            r#"
            [grid]
            cell_size = [40.0, 50.0]
            columns = 4
            rows = 3

            [economy]
            starting_sun = 75

            [drag]
            snapping = false

            [[plants]]
            kind = "sunflower"
            cost = 25

            [sun]
            first_interval = [1.0, 1.0]
            "#,
        )
        .expect("config parses");

        let world = config.world_config().expect("world config is valid");
        let layout = world.grid.expect("grid stays enabled");
        assert_eq!(layout.cell_size(), Vec2::new(40.0, 50.0));
        assert_eq!((layout.columns(), layout.rows()), (4, 3));
        assert_eq!(world.starting_sun, Sun::new(75));

        let drag = config.drag_drop_config().expect("tray is valid");
        assert!(!drag.snapping);
        assert_eq!(
            drag.templates,
            vec![PlantTemplate::for_kind(PlantKind::Sunflower).with_cost(Sun::new(25))]
        );

        let sun = config.sun_production_config(Some(9)).expect("sun is valid");
        assert_eq!(sun.first_interval.min(), Duration::from_secs(1));
        assert_eq!(sun.rng_seed, 9);
    }

    #[test]
    fn disabled_grid_with_polygon_region() {
        let config = LawnConfig::from_toml_str(
            r#"
            [grid]
            enabled = false

            [region]
            shape = "polygon"
            vertices = [[0.0, 0.0], [300.0, 0.0], [0.0, 300.0]]
            "#,
        )
        .expect("config parses");

        let world = config.world_config().expect("world config is valid");
        assert!(world.grid.is_none());
        assert!(matches!(
            world.region,
            Some(PlacementRegion::Polygon(ref vertices)) if vertices.len() == 3
        ));
    }

    #[test]
    fn invalid_values_are_reported() {
        let zero_cells = LawnConfig::from_toml_str("[grid]\ncell_size = [0.0, 80.0]\n")
            .expect("config parses");
        assert!(zero_cells.world_config().is_err());

        let degenerate = LawnConfig::from_toml_str(
            "[region]\nshape = \"polygon\"\nvertices = [[0.0, 0.0], [1.0, 1.0]]\n",
        )
        .expect("config parses");
        assert!(degenerate.world_config().is_err());

        let duplicate = LawnConfig::from_toml_str(
            "[[plants]]\nkind = \"peashooter\"\n[[plants]]\nkind = \"peashooter\"\n",
        )
        .expect("config parses");
        assert!(duplicate.drag_drop_config().is_err());

        let negative = LawnConfig::from_toml_str("[shooting]\nfire_interval = -1.0\n")
            .expect("config parses");
        assert!(negative.fire_interval().is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(LawnConfig::from_toml_str("[economy]\nstarting_moons = 5\n").is_err());
        assert!(LawnConfig::from_toml_str("[[plants]]\nkind = \"cherry_bomb\"\n").is_err());
    }

    #[test]
    fn demo_config_is_valid() {
        let config = LawnConfig::from_toml_str(include_str!("../../../demos/lawn.toml"))
            .expect("demo config parses");
        let _ = config.world_config().expect("demo world config is valid");
        let _ = config.drag_drop_config().expect("demo tray is valid");
        let _ = config.sun_production_config(None).expect("demo sun is valid");

        let gridless = LawnConfig::from_toml_str(include_str!("../../../demos/gridless.toml"))
            .expect("gridless demo parses");
        let world = gridless.world_config().expect("gridless world config is valid");
        assert!(world.grid.is_none() && world.region.is_some());
    }
}
