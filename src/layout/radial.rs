use super::*;

use std::f32::consts::TAU;

/// Cartesian point for an angle (radians, clockwise from 12 o'clock) and radius.
pub(crate) fn polar_to_point(angle: f32, radius: f32) -> (f32, f32) {
    (radius * angle.sin(), -radius * angle.cos())
}

/// Inverse of [`polar_to_point`], with the angle folded into `[0, 2π)`.
pub(crate) fn point_to_polar(point: (f32, f32)) -> (f32, f32) {
    let angle = point.0.atan2(-point.1).rem_euclid(TAU);
    (angle, point.0.hypot(point.1))
}

pub(super) fn compute_radial_layout(
    root: &Node,
    width: f32,
    height: f32,
    config: &RadialConfig,
) -> TreeLayout {
    let separation = Separation {
        sibling: config.sibling_separation,
        cousin: config.cousin_separation,
    };
    let max_radius = (width.min(height) / 2.0 - config.radius_margin).max(0.0);
    let slots = tidy_tree(root, separation, TAU);

    let (descendants, links) = assemble(root, &slots, |slot| {
        let angle = slot.x;
        let radius = slot.depth as f32 * config.level_spacing;
        (angle, radius, polar_to_point(angle, radius))
    });

    let outer = descendants.iter().map(|node| node.y).fold(0.0_f32, f32::max);
    if outer > max_radius {
        tracing::debug!(
            outer,
            max_radius,
            "radial layout extends past the viewport bound"
        );
    }

    TreeLayout {
        descendants,
        links,
        orientation: Orientation::Radial,
        origin: (width / 2.0, height / 2.0),
        extent: (TAU, max_radius),
    }
}
