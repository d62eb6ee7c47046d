//! Point sampling and nearest-candidate selection

use std::f32::consts::TAU;

use rand::Rng;

use crate::core::types::{Point2, UnitTag};

/// Sample a point uniformly by area inside the disk of `radius` around `center`
///
/// The square root on the radial sample keeps the density flat; sampling
/// the radius linearly would crowd points toward the center.
pub fn uniform_point_in_disk<R: Rng + ?Sized>(center: Point2, radius: f32, rng: &mut R) -> Point2 {
    let r = radius * rng.gen::<f32>().sqrt();
    let theta = rng.gen::<f32>() * TAU;
    Point2::new(center.x + r * theta.cos(), center.y + r * theta.sin())
}

/// Pick the candidate closest to `target`
///
/// Ties on squared distance go to the smaller tag, so the result does not
/// depend on iteration order.
pub fn nearest_to<I>(candidates: I, target: Point2) -> Option<UnitTag>
where
    I: IntoIterator<Item = (UnitTag, Point2)>,
{
    candidates
        .into_iter()
        .map(|(tag, pos)| (pos.distance_squared(&target), tag))
        .min_by(|(da, ta), (db, tb)| da.total_cmp(db).then(ta.cmp(tb)))
        .map(|(_, tag)| tag)
}
