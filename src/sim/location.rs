//! Map location service: bases, build areas and defend points
//!
//! The real map analysis lives outside this crate. [`StaticLocations`] is a
//! precomputed layout, loadable from TOML, that covers what the dispatch
//! core asks of it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{CommanderError, Result};
use crate::core::types::Point2;

/// An expansion location with its anchor points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub townhall: Point2,
    #[serde(default)]
    pub build_areas: Vec<Point2>,
    #[serde(default)]
    pub defend_points: Vec<Point2>,
    #[serde(default)]
    pub rally_point: Option<Point2>,
    #[serde(default)]
    pub active: bool,
}

impl Base {
    pub fn new(townhall: Point2) -> Self {
        Self {
            townhall,
            build_areas: Vec::new(),
            defend_points: Vec::new(),
            rally_point: None,
            active: false,
        }
    }

    pub fn with_build_area(mut self, point: Point2) -> Self {
        self.build_areas.push(point);
        self
    }

    pub fn with_defend_point(mut self, point: Point2) -> Self {
        self.defend_points.push(point);
        self
    }

    pub fn build_area(&self, index: usize) -> Option<Point2> {
        self.build_areas.get(index).copied()
    }

    pub fn defend_point(&self, index: usize) -> Option<Point2> {
        self.defend_points.get(index).copied()
    }

    /// Rally point, falling back to the townhall
    pub fn rally_point(&self) -> Point2 {
        self.rally_point.unwrap_or(self.townhall)
    }
}

/// Map knowledge the bot consumes
pub trait LocationService {
    fn bases(&self) -> &[Base];

    fn start_base_index(&self) -> usize;

    fn proxy_location(&self) -> Point2;

    /// Mark a base as taken; returns false for an unknown index
    fn activate_base(&mut self, index: usize) -> bool;

    fn base(&self, index: usize) -> Option<&Base> {
        self.bases().get(index)
    }

    fn start_location(&self) -> Point2 {
        self.base(self.start_base_index())
            .map(|b| b.townhall)
            .unwrap_or_default()
    }

    /// Index of the base whose townhall is closest to `pos`
    fn nearest_base_index(&self, pos: Point2) -> Option<usize> {
        self.bases()
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.townhall
                    .distance_squared(&pos)
                    .total_cmp(&b.townhall.distance_squared(&pos))
            })
            .map(|(i, _)| i)
    }

    /// Highest-index base currently marked active
    fn newest_active_base(&self) -> Option<usize> {
        self.bases().iter().rposition(|b| b.active)
    }
}

/// A fixed base layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticLocations {
    #[serde(default)]
    pub start_base: usize,
    #[serde(default)]
    pub proxy: Point2,
    #[serde(default)]
    pub bases: Vec<Base>,
}

impl StaticLocations {
    pub fn new(bases: Vec<Base>, start_base: usize, proxy: Point2) -> Self {
        Self { start_base, proxy, bases }
    }

    /// Single-base layout around a known start position
    pub fn single_base(townhall: Point2) -> Self {
        Self::new(vec![Base::new(townhall)], 0, townhall)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let layout: StaticLocations = toml::from_str(content)?;
        if !layout.bases.is_empty() && layout.start_base >= layout.bases.len() {
            return Err(CommanderError::Config(format!(
                "start_base {} out of range ({} bases)",
                layout.start_base,
                layout.bases.len()
            )));
        }
        Ok(layout)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

impl LocationService for StaticLocations {
    fn bases(&self) -> &[Base] {
        &self.bases
    }

    fn start_base_index(&self) -> usize {
        self.start_base
    }

    fn proxy_location(&self) -> Point2 {
        self.proxy
    }

    fn activate_base(&mut self, index: usize) -> bool {
        match self.bases.get_mut(index) {
            Some(base) => {
                base.active = true;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bases() -> StaticLocations {
        StaticLocations::new(
            vec![
                Base::new(Point2::new(30.0, 30.0)).with_build_area(Point2::new(35.0, 30.0)),
                Base::new(Point2::new(60.0, 30.0)),
            ],
            0,
            Point2::new(100.0, 100.0),
        )
    }

    #[test]
    fn test_nearest_base() {
        let layout = two_bases();
        assert_eq!(layout.nearest_base_index(Point2::new(50.0, 31.0)), Some(1));
        assert_eq!(layout.nearest_base_index(Point2::new(31.0, 29.0)), Some(0));
        assert_eq!(StaticLocations::default().nearest_base_index(Point2::default()), None);
    }

    #[test]
    fn test_newest_active_base() {
        let mut layout = two_bases();
        assert_eq!(layout.newest_active_base(), None);
        assert!(layout.activate_base(0));
        assert_eq!(layout.newest_active_base(), Some(0));
        assert!(layout.activate_base(1));
        assert_eq!(layout.newest_active_base(), Some(1));
        assert!(!layout.activate_base(7));
    }

    #[test]
    fn test_from_toml() {
        let content = r#"
            start_base = 1
            proxy = { x = 90.0, y = 40.0 }

            [[bases]]
            townhall = { x = 30.0, y = 30.0 }
            build_areas = [ { x = 34.0, y = 30.0 } ]

            [[bases]]
            townhall = { x = 60.0, y = 30.0 }
            rally_point = { x = 58.0, y = 34.0 }
        "#;
        let layout = StaticLocations::from_toml(content).unwrap();
        assert_eq!(layout.start_location(), Point2::new(60.0, 30.0));
        assert_eq!(layout.bases[0].build_area(0), Some(Point2::new(34.0, 30.0)));
        assert_eq!(layout.bases[1].rally_point(), Point2::new(58.0, 34.0));
        assert_eq!(layout.bases[0].rally_point(), Point2::new(30.0, 30.0));
    }

    #[test]
    fn test_start_base_out_of_range() {
        let content = "start_base = 3\n[[bases]]\ntownhall = { x = 1.0, y = 1.0 }\n";
        assert!(StaticLocations::from_toml(content).is_err());
    }
}
