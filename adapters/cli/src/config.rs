//! Sandbox configuration loaded from TOML.

use std::{collections::BTreeSet, fs, path::Path, time::Duration};

use anyhow::{bail, ensure, Context, Result};
use placement_sandbox_core::{BoundaryMode, Bounds, Footprint, Prototype, PrototypeId};
use placement_sandbox_system_animation::{CycleConfig, DropConfig};
use placement_sandbox_system_editing::RotationDial;
use placement_sandbox_system_interaction::{CameraConfig, RouterConfig};
use placement_sandbox_system_validation::SpatialValidator;
use serde::Deserialize;

/// Longest accepted animation or weather phase.
const MAX_PHASE: Duration = Duration::from_secs(24 * 60 * 60);

/// Complete sandbox configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub(crate) struct SandboxConfig {
    pub(crate) placement: PlacementSection,
    pub(crate) camera: CameraConfig,
    pub(crate) rotation: RotationDial,
    pub(crate) animation: DropConfig,
    pub(crate) weather: CycleConfig,
    pub(crate) prototypes: Vec<PrototypeEntry>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PlacementSection {
    pub(crate) bounds: Bounds,
    #[serde(default)]
    pub(crate) boundary: BoundaryMode,
}

impl Default for PlacementSection {
    fn default() -> Self {
        Self {
            bounds: Bounds::symmetric(13.0),
            boundary: BoundaryMode::Inclusive,
        }
    }
}

/// Catalog entry. A missing footprint is legal here and only fails once a drag starts.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PrototypeEntry {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) footprint: Option<Footprint>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            placement: PlacementSection::default(),
            camera: CameraConfig::default(),
            rotation: RotationDial::default(),
            animation: DropConfig::default(),
            weather: CycleConfig::default(),
            prototypes: default_prototypes(),
        }
    }
}

fn default_prototypes() -> Vec<PrototypeEntry> {
    vec![
        PrototypeEntry {
            name: "crate".to_owned(),
            footprint: Some(Footprint::new(0.5, 0.5)),
        },
        PrototypeEntry {
            name: "bench".to_owned(),
            footprint: Some(Footprint::new(1.0, 0.35).with_height(0.5)),
        },
        PrototypeEntry {
            name: "lamp".to_owned(),
            footprint: Some(Footprint::new(0.2, 0.2).with_height(2.5)),
        },
        PrototypeEntry {
            name: "decal".to_owned(),
            footprint: None,
        },
    ]
}

impl SandboxConfig {
    /// Reads and validates a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read sandbox config at {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("invalid sandbox config at {}", path.display()))
    }

    /// Parses and validates configuration text.
    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse sandbox config toml contents")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.placement.bounds.is_well_formed(),
            "placement bounds {:?} must be finite with min <= max",
            self.placement.bounds
        );
        ensure!(
            self.camera.bounds.is_well_formed(),
            "camera bounds {:?} must be finite with min <= max",
            self.camera.bounds
        );
        ensure!(
            self.camera.leeway.is_finite() && self.camera.leeway >= 0.0,
            "camera leeway must be a non-negative number, got {}",
            self.camera.leeway
        );
        ensure!(
            self.camera.pixels_per_unit.is_finite() && self.camera.pixels_per_unit > 0.0,
            "camera pixels_per_unit must be positive, got {}",
            self.camera.pixels_per_unit
        );
        ensure!(
            self.rotation.step_degrees().is_finite() && self.rotation.step_degrees() > 0.0,
            "rotation step_degrees must be positive, got {}",
            self.rotation.step_degrees()
        );
        ensure!(
            self.animation.height.is_finite(),
            "animation height must be finite"
        );
        ensure!(
            self.animation.duration <= MAX_PHASE,
            "animation duration must be at most {MAX_PHASE:?}, got {:?}",
            self.animation.duration
        );
        for (name, phase) in [
            ("cooldown", self.weather.cooldown),
            ("active", self.weather.active),
        ] {
            ensure!(
                !phase.is_zero() && phase <= MAX_PHASE,
                "weather {name} must be above zero and at most {MAX_PHASE:?}, got {phase:?}"
            );
        }

        let mut seen = BTreeSet::new();
        for entry in &self.prototypes {
            if !seen.insert(entry.name.as_str()) {
                bail!("prototype `{}` is defined more than once", entry.name);
            }
            if let Some(footprint) = entry.footprint {
                ensure!(
                    footprint.is_well_formed(),
                    "prototype `{}` has a degenerate footprint {:?}",
                    entry.name,
                    footprint
                );
            }
        }
        Ok(())
    }

    pub(crate) fn validator(&self) -> SpatialValidator {
        SpatialValidator::new(self.placement.bounds, self.placement.boundary)
    }

    pub(crate) fn router_config(&self) -> RouterConfig {
        RouterConfig {
            validator: self.validator(),
            dial: self.rotation,
            drop: self.animation,
            camera: self.camera,
        }
    }

    pub(crate) fn catalog(&self) -> Vec<Prototype> {
        self.prototypes
            .iter()
            .map(|entry| Prototype {
                id: PrototypeId::new(entry.name.clone()),
                footprint: entry.footprint,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_builtin_defaults() {
        let config = SandboxConfig::from_toml("").expect("empty config parses");
        assert_eq!(config.placement.bounds, Bounds::symmetric(13.0));
        assert_eq!(config.placement.boundary, BoundaryMode::Inclusive);
        assert_eq!(config.camera.bounds, Bounds::symmetric(7.5));
        assert_eq!(config.camera.leeway, 1.0);
        assert_eq!(config.rotation.range_degrees(), 90.0);
        assert_eq!(config.catalog().len(), 4);
    }

    #[test]
    fn sections_override_defaults() {
        let config = SandboxConfig::from_toml(
            r#"
            [placement]
            bounds = { min_x = -5.0, max_x = 5.0, min_z = -3.0, max_z = 3.0 }
            boundary = "exclusive"

            [rotation]
            step_degrees = 30.0
            steps_per_side = 3

            [weather]
            cooldown = 5.0
            active = 2.5

            [[prototypes]]
            name = "plank"
            footprint = { half_x = 2.0, half_z = 0.25, offset_x = 0.5 }
            "#,
        )
        .expect("config parses");

        assert_eq!(config.placement.boundary, BoundaryMode::Exclusive);
        assert_eq!(config.rotation.offset_for(1.0), 90.0);
        assert_eq!(config.weather.active.as_secs_f32(), 2.5);
        let catalog = config.catalog();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog[0].footprint,
            Some(Footprint::new(2.0, 0.25).with_offset(0.5, 0.0))
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = SandboxConfig::from_toml("[placement]\nbounds_typo = 1\n")
            .expect_err("unknown key must fail");
        assert!(format!("{error:#}").contains("bounds_typo"));
    }

    #[test]
    fn inverted_bounds_are_reported() {
        let error = SandboxConfig::from_toml(
            "[placement]\nbounds = { min_x = 5.0, max_x = -5.0, min_z = -1.0, max_z = 1.0 }\n",
        )
        .expect_err("inverted bounds must fail");
        assert!(format!("{error:#}").contains("placement bounds"));
    }

    #[test]
    fn weather_phases_must_be_positive_and_bounded() {
        let error = SandboxConfig::from_toml("[weather]\ncooldown = 0.0\nactive = 5.0\n")
            .expect_err("zero cooldown must fail");
        assert!(format!("{error:#}").contains("weather cooldown"));

        let error = SandboxConfig::from_toml("[weather]\ncooldown = 5.0\nactive = 1e12\n")
            .expect_err("huge active phase must fail");
        assert!(format!("{error:#}").contains("weather active"));

        assert!(SandboxConfig::from_toml("[weather]\ncooldown = -1.0\nactive = 5.0\n").is_err());
        let config = SandboxConfig::from_toml("[weather]\ncooldown = 0.25\nactive = 86400.0\n")
            .expect("bounded phases load");
        assert_eq!(config.weather.cooldown, Duration::from_millis(250));
    }

    #[test]
    fn duplicate_prototypes_are_reported() {
        let error = SandboxConfig::from_toml(
            "[[prototypes]]\nname = \"crate\"\n[[prototypes]]\nname = \"crate\"\n",
        )
        .expect_err("duplicate names must fail");
        assert!(format!("{error:#}").contains("more than once"));
    }

    #[test]
    fn shipped_sample_matches_builtin_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../sandbox.toml");
        let config = SandboxConfig::load(&path).expect("sample config loads");
        let defaults = SandboxConfig::default();
        assert_eq!(config.placement.bounds, defaults.placement.bounds);
        assert_eq!(config.camera, defaults.camera);
        assert_eq!(config.rotation, defaults.rotation);
        assert_eq!(config.animation, defaults.animation);
        assert_eq!(config.weather, defaults.weather);
        assert_eq!(config.catalog(), defaults.catalog());
    }
}
