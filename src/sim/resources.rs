//! Resource target lookups over a snapshot

use crate::core::geometry::nearest_to;
use crate::core::types::Point2;
use crate::sim::catalog;
use crate::sim::snapshot::{Alliance, UnitSnapshot, WorldSnapshot};

fn nearest<'a>(
    snapshot: &'a WorldSnapshot,
    around: Point2,
    keep: impl Fn(&UnitSnapshot) -> bool,
) -> Option<&'a UnitSnapshot> {
    let tag = nearest_to(
        snapshot.units.iter().filter(|&u| keep(u)).map(|u| (u.tag, u.pos)),
        around,
    )?;
    snapshot.unit(tag)
}

/// Closest neutral mineral patch to `around`
pub fn nearest_mineral_patch(snapshot: &WorldSnapshot, around: Point2) -> Option<&UnitSnapshot> {
    nearest(snapshot, around, |u| {
        u.alliance == Alliance::Neutral && catalog::is_mineral_patch(u.unit_type)
    })
}

/// Closest geyser with no gas structure on it
///
/// A geyser counts as claimed when any gas structure, of any side, stands
/// within `claim_radius` of it.
pub fn nearest_free_geyser(
    snapshot: &WorldSnapshot,
    around: Point2,
    claim_radius: f32,
) -> Option<&UnitSnapshot> {
    let claim_sq = claim_radius * claim_radius;
    let claimed: Vec<Point2> = snapshot
        .units
        .iter()
        .filter(|u| catalog::is_gas_structure(u.unit_type))
        .map(|u| u.pos)
        .collect();

    nearest(snapshot, around, |u| {
        catalog::is_geyser(u.unit_type)
            && !claimed.iter().any(|p| p.distance_squared(&u.pos) <= claim_sq)
    })
}

/// Closest finished friendly gas structure
pub fn nearest_gas_structure(snapshot: &WorldSnapshot, around: Point2) -> Option<&UnitSnapshot> {
    nearest(snapshot, around, |u| {
        u.alliance == Alliance::Own && catalog::is_gas_structure(u.unit_type) && u.is_complete()
    })
}
