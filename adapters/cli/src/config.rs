//! Optional TOML tuning file.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use encircle_system_pathfinding::PathfinderConfig;
use serde::Deserialize;

/// Top-level layout of the tuning file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Step costs and risk detection used by every path query.
    pub(crate) pathfinding: PathfinderConfig,
}

impl Settings {
    /// Reads the tuning file, falling back to defaults when none is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let settings: Self = toml::from_str(contents)?;
        settings
            .pathfinding
            .validate()
            .context("invalid [pathfinding] table")?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_uses_defaults() {
        let settings = Settings::load(None).expect("defaults");
        assert_eq!(settings.pathfinding, PathfinderConfig::default());
    }

    #[test]
    fn pathfinding_table_overrides_fields() {
        let settings = Settings::parse("[pathfinding]\ncrowd_penalty = 6.5\ncrowd_free_radius = 1\n")
            .expect("parse");

        assert_eq!(settings.pathfinding.crowd_penalty, 6.5);
        assert_eq!(settings.pathfinding.crowd_free_radius, 1);
        assert_eq!(settings.pathfinding.risk_threshold, 3);
    }

    #[test]
    fn unknown_tables_are_rejected() {
        assert!(Settings::parse("[rendering]\nscale = 2\n").is_err());
    }

    #[test]
    fn unusable_costs_are_rejected() {
        let error = Settings::parse("[pathfinding]\ncardinal_cost = -1.0\n")
            .expect_err("negative step cost");

        assert_eq!(error.to_string(), "invalid [pathfinding] table");
        assert_eq!(
            error.root_cause().to_string(),
            "cardinal_cost must be greater than zero, got -1"
        );
        assert!(Settings::parse("[pathfinding]\ncrowd_penalty = -2.0\n").is_err());
        assert!(Settings::parse("[pathfinding]\ncrowd_penalty = 0.0\n").is_ok());
    }

    #[test]
    fn unreadable_file_reports_the_path() {
        let error = Settings::load(Some(Path::new("/nonexistent/encircle.toml")))
            .expect_err("file is missing");
        assert!(error.to_string().contains("/nonexistent/encircle.toml"));
    }
}
