use std::f64::consts::TAU;

use crate::error::{GeometryError, OperationError, Result};
use crate::math::arc_2d::{cy_from_angle, cy_from_radius};
use crate::math::{abs_to_rel, Point2, Vector2, TOLERANCE};
use crate::topology::{Curvature, EdgeId, PatternStore};

use super::edge_factory::EdgeFactory;

/// Builds circular arcs.
///
/// `right` puts the arc on the right-hand side of the chord walked from
/// start to end.
pub struct CircleEdgeFactory;

fn chord_length(start: &Point2, end: &Point2) -> Result<f64> {
    let len = (end - start).norm();
    if len < TOLERANCE {
        return Err(GeometryError::Degenerate("arc endpoints coincide".into()).into());
    }
    Ok(len)
}

impl CircleEdgeFactory {
    /// Arc sweeping `angle` radians between two points.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ParameterOutOfRange`] unless the angle lies
    /// in `(0, 2π)`.
    pub fn from_points_angle(
        store: &mut PatternStore,
        start: Point2,
        end: Point2,
        angle: f64,
        right: bool,
    ) -> Result<EdgeId> {
        chord_length(&start, &end)?;
        let cy = cy_from_angle(angle, right).ok_or(GeometryError::ParameterOutOfRange {
            parameter: "angle",
            value: angle,
            min: 0.0,
            max: TAU,
        })?;
        EdgeFactory::with_curvature(store, start, end, Curvature::Circle { cy })
    }

    /// Arc of the given radius between two points.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ParameterOutOfRange`] if the radius is
    /// smaller than half the chord.
    pub fn from_points_radius(
        store: &mut PatternStore,
        start: Point2,
        end: Point2,
        radius: f64,
        large_arc: bool,
        right: bool,
    ) -> Result<EdgeId> {
        let chord = chord_length(&start, &end)?;
        let cy = cy_from_radius(radius / chord, large_arc, right).ok_or(
            GeometryError::ParameterOutOfRange {
                parameter: "radius",
                value: radius,
                min: chord / 2.0,
                max: f64::INFINITY,
            },
        )?;
        EdgeFactory::with_curvature(store, start, end, Curvature::Circle { cy })
    }

    /// Arc from `start` to `end` passing through `point`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the three points are
    /// collinear.
    pub fn from_three_points(
        store: &mut PatternStore,
        start: Point2,
        end: Point2,
        point: Point2,
    ) -> Result<EdgeId> {
        let rel = abs_to_rel(&start, &end, &point)
            .ok_or_else(|| GeometryError::Degenerate("arc endpoints coincide".into()))?;
        if rel.y.abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("arc points are collinear".into()).into());
        }
        // Circle center sits at (0.5, h) in the chord frame.
        let h = ((rel.x - 0.5).powi(2) + rel.y * rel.y - 0.25) / (2.0 * rel.y);
        let r = (0.25 + h * h).sqrt();
        let cy = h + rel.y.signum() * r;
        EdgeFactory::with_curvature(store, start, end, Curvature::Circle { cy })
    }

    /// Arc of given radius and length, starting at `start` with its chord
    /// along +x.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the length covers a full
    /// circle or more.
    pub fn from_rad_length(
        store: &mut PatternStore,
        start: Point2,
        radius: f64,
        length: f64,
        right: bool,
    ) -> Result<EdgeId> {
        if radius <= 0.0 || length <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "arc radius {radius} and length {length} must be positive"
            ))
            .into());
        }
        let angle = length / radius;
        if angle >= TAU {
            return Err(OperationError::InvalidInput(format!(
                "arc of length {length} exceeds the circumference of radius {radius}"
            ))
            .into());
        }
        let end = start + Vector2::new(2.0 * radius * (angle / 2.0).sin(), 0.0);
        Self::from_points_angle(store, start, end, angle, right)
    }
}
