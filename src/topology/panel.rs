use std::collections::{BTreeMap, HashMap};

use nalgebra::Rotation3;

use crate::error::Result;
use crate::math::{Point2, Point3, Vector3};
use crate::operations::creation::EdgeSeqFactory;
use crate::serialization::{EdgeRecord, PanelRecord};
use crate::stitching::Interface;

use super::sequence::{EdgeSequence, LinearizeParams, SequenceBounds};
use super::vertex::VertexId;
use super::PatternStore;

slotmap::new_key_type! {
    /// Unique identifier for a panel in the pattern store.
    pub struct PanelId;
}

/// Rotation from intrinsic XYZ Euler angles in degrees.
#[must_use]
pub fn rotation_from_euler_deg(angles: [f64; 3]) -> Rotation3<f64> {
    let [rx, ry, rz] = angles.map(f64::to_radians);
    Rotation3::from_axis_angle(&Vector3::x_axis(), rx)
        * Rotation3::from_axis_angle(&Vector3::y_axis(), ry)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), rz)
}

/// Intrinsic XYZ Euler angles in degrees of a rotation.
///
/// At gimbal lock the Z angle is reported as zero.
#[must_use]
pub fn euler_deg_from_rotation(rotation: &Rotation3<f64>) -> [f64; 3] {
    let m = rotation.matrix();
    let sy = m[(0, 2)].clamp(-1.0, 1.0);
    let ry = sy.asin();
    let (rx, rz) = if sy.abs() < 1.0 - 1e-9 {
        ((-m[(1, 2)]).atan2(m[(2, 2)]), (-m[(0, 1)]).atan2(m[(0, 0)]))
    } else {
        (m[(2, 1)].atan2(m[(1, 1)]), 0.0)
    };
    [rx, ry, rz].map(f64::to_degrees)
}

/// A flat piece of fabric placed in 3D space.
#[derive(Debug, Clone)]
pub struct PanelData {
    pub name: String,
    /// Closed boundary of the panel.
    pub edges: EdgeSequence,
    pub translation: Vector3,
    pub rotation: Rotation3<f64>,
    pub label: Option<String>,
    /// Named boundary parts available for stitching.
    pub interfaces: BTreeMap<String, Interface>,
}

impl PanelData {
    /// Creates a panel at the world origin with identity rotation.
    #[must_use]
    pub fn new(name: impl Into<String>, edges: EdgeSequence) -> Self {
        Self {
            name: name.into(),
            edges,
            translation: Vector3::zeros(),
            rotation: Rotation3::identity(),
            label: None,
            interfaces: BTreeMap::new(),
        }
    }

    pub fn translate_by(&mut self, by: &Vector3) {
        self.translation += by;
    }

    /// Applies `rotation` on top of the current orientation.
    pub fn rotate_by(&mut self, rotation: &Rotation3<f64>) {
        self.rotation = rotation * self.rotation;
    }

    pub fn set_rotation_degrees(&mut self, angles: [f64; 3]) {
        self.rotation = rotation_from_euler_deg(angles);
    }

    #[must_use]
    pub fn rotation_degrees(&self) -> [f64; 3] {
        euler_deg_from_rotation(&self.rotation)
    }

    /// World position of a point given in the panel plane.
    #[must_use]
    pub fn point_to_3d(&self, p: &Point2) -> Point3 {
        Point3::from(self.rotation * Vector3::new(p.x, p.y, 0.0) + self.translation)
    }
}

impl PatternStore {
    /// Serializes a panel and numbers its edges.
    ///
    /// Each boundary edge gets its position in the loop as `geometric_id`,
    /// which stitch assembly relies on. A boundary that is not a closed loop
    /// is reported and serialized as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel or one of its edges is missing.
    pub fn assemble_panel(&mut self, id: PanelId) -> Result<PanelRecord> {
        let (name, edges, translation, rotation, label) = {
            let p = self.panel(id)?;
            (
                p.name.clone(),
                p.edges.clone(),
                p.translation,
                p.rotation_degrees(),
                p.label.clone(),
            )
        };
        if !edges.is_loop(self) {
            tracing::warn!(panel = %name, "panel boundary is not a closed loop");
        }

        let mut index: HashMap<VertexId, usize> = HashMap::new();
        let mut vertices = Vec::new();
        let mut records = Vec::with_capacity(edges.len());
        for (i, e) in edges.iter().enumerate() {
            let (points, properties) = self.edge_assembly(*e)?;
            let data = self.edge(*e)?;
            let mut endpoints = [0; 2];
            for (slot, (v, p)) in endpoints
                .iter_mut()
                .zip([(data.start, points[0]), (data.end, points[1])])
            {
                *slot = *index.entry(v).or_insert_with(|| {
                    vertices.push([p.x, p.y]);
                    vertices.len() - 1
                });
            }
            records.push(EdgeRecord {
                endpoints,
                properties,
            });
            self.edge_mut(*e)?.geometric_id = Some(i);
        }

        Ok(PanelRecord {
            translation: translation.into(),
            rotation,
            vertices,
            edges: records,
            label,
        })
    }

    /// Rebuilds a panel from its serialized form.
    ///
    /// # Errors
    ///
    /// Returns an error if the record references missing vertices or holds
    /// degenerate edges.
    pub fn panel_from_record(&mut self, name: &str, record: &PanelRecord) -> Result<PanelId> {
        let edges = EdgeSeqFactory::from_record(self, record)?;
        let mut panel = PanelData::new(name, edges);
        panel.translation = Vector3::from(record.translation);
        panel.set_rotation_degrees(record.rotation);
        panel.label.clone_from(&record.label);
        Ok(self.add_panel(panel))
    }

    /// 2D bounds of the panel boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel or one of its edges is missing.
    pub fn panel_bbox(&self, id: PanelId, params: &LinearizeParams) -> Result<SequenceBounds> {
        self.panel(id)?.edges.bbox(self, params)
    }

    /// World-space bounds of the placed panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel or one of its edges is missing.
    pub fn panel_bbox3d(&self, id: PanelId, params: &LinearizeParams) -> Result<(Point3, Point3)> {
        let panel = self.panel(id)?;
        let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for e in &panel.edges {
            for p in self.edge_samples(*e, params.samples)? {
                let w = panel.point_to_3d(&p);
                min = min.inf(&w);
                max = max.sup(&w);
            }
        }
        Ok((min, max))
    }

    /// Mirrors the panel across its local Y axis.
    ///
    /// The boundary is reversed afterwards so it keeps its winding, and the
    /// placement is mirrored across the world YZ plane.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel or one of its edges is missing.
    pub fn mirror_panel(&mut self, id: PanelId) -> Result<()> {
        let mut edges = self.panel(id)?.edges.clone();
        edges.reflect(self, &Point2::origin(), &Point2::new(0.0, 1.0))?;
        edges.reverse(self)?;

        let panel = self.panel_mut(id)?;
        panel.edges = edges;
        for interface in panel.interfaces.values_mut() {
            interface.reverse(false);
        }
        panel.translation.x = -panel.translation.x;
        let [rx, ry, rz] = panel.rotation_degrees();
        panel.set_rotation_degrees([rx, -ry, -rz]);
        Ok(())
    }

    /// Whether the panel boundary crosses itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel or one of its edges is missing.
    pub fn panel_is_self_intersecting(&self, id: PanelId, params: &LinearizeParams) -> Result<bool> {
        self.panel(id)?.edges.is_self_intersecting(self, params)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::Curvature;
    use approx::assert_relative_eq;

    fn square_panel(store: &mut PatternStore) -> PanelId {
        let pts = [(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]
            .map(|(x, y)| Point2::new(x, y));
        let edges = EdgeSeqFactory::from_verts(store, &pts, true).unwrap();
        let top = edges[2];
        store.edge_mut(top).unwrap().curvature = Curvature::Circle { cy: -0.2 };
        store.edge_mut(top).unwrap().label = Some("top".into());
        store.add_panel(PanelData::new("square", edges))
    }

    #[test]
    fn euler_roundtrip() {
        for angles in [[0.0, 0.0, 0.0], [10.0, 20.0, 30.0], [-45.0, 80.0, 170.0], [0.0, 180.0, 0.0]] {
            let r = rotation_from_euler_deg(angles);
            let back = rotation_from_euler_deg(euler_deg_from_rotation(&r));
            assert_relative_eq!(*r.matrix(), *back.matrix(), epsilon = 1e-9);
        }
        let back = euler_deg_from_rotation(&rotation_from_euler_deg([10.0, 20.0, 30.0]));
        assert_relative_eq!(back[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(back[1], 20.0, epsilon = 1e-9);
        assert_relative_eq!(back[2], 30.0, epsilon = 1e-9);
    }

    #[test]
    fn point_to_3d_applies_placement() {
        let mut panel = PanelData::new("p", EdgeSequence::new());
        panel.set_rotation_degrees([0.0, 90.0, 0.0]);
        panel.translate_by(&Vector3::new(0.0, 0.0, 5.0));
        let w = panel.point_to_3d(&Point2::new(1.0, 2.0));
        assert_relative_eq!(w, Point3::new(0.0, 2.0, 4.0), epsilon = 1e-12);
    }

    #[test]
    fn assembly_roundtrip_keeps_loop() {
        let mut store = PatternStore::new();
        let id = square_panel(&mut store);
        store.panel_mut(id).unwrap().translate_by(&Vector3::new(1.0, 2.0, 3.0));
        store
            .panel_mut(id)
            .unwrap()
            .set_rotation_degrees([0.0, 30.0, 0.0]);

        let record = store.assemble_panel(id).unwrap();
        assert_eq!(record.vertices.len(), 4);
        assert_eq!(record.edges[3].endpoints, [3, 0]);
        let edges = store.panel(id).unwrap().edges.clone();
        for (i, e) in edges.iter().enumerate() {
            assert_eq!(store.edge(*e).unwrap().geometric_id, Some(i));
        }

        let copy = store.panel_from_record("square", &record).unwrap();
        let rebuilt = store.panel(copy).unwrap();
        assert!(rebuilt.edges.is_loop(&store));
        assert_relative_eq!(rebuilt.translation, Vector3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(rebuilt.rotation_degrees()[1], 30.0, epsilon = 1e-9);
        let rebuilt_top = rebuilt.edges[2];
        assert_eq!(store.edge(rebuilt_top).unwrap().label.as_deref(), Some("top"));
        match store.edge(rebuilt_top).unwrap().curvature {
            Curvature::Circle { cy } => assert_relative_eq!(cy, -0.2, epsilon = 1e-9),
            ref other => panic!("unexpected curvature {other:?}"),
        }
        assert_relative_eq!(
            rebuilt.edges.length(&store).unwrap(),
            edges.length(&store).unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn mirror_keeps_winding() {
        let mut store = PatternStore::new();
        let id = square_panel(&mut store);
        store.panel_mut(id).unwrap().translate_by(&Vector3::new(4.0, 0.0, 0.0));
        store.mirror_panel(id).unwrap();
        let panel = store.panel(id).unwrap();
        assert!(panel.edges.is_loop(&store));
        assert_relative_eq!(panel.translation.x, -4.0);

        let bounds = store.panel_bbox(id, &LinearizeParams::default()).unwrap();
        assert_relative_eq!(bounds.min.x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.max.x, 0.0, epsilon = 1e-12);

        // Signed area stays positive (counter-clockwise).
        let pts = panel.edges.points(&store).unwrap();
        let area: f64 = (0..pts.len())
            .map(|i| {
                let (a, b) = (pts[i], pts[(i + 1) % pts.len()]);
                a.x * b.y - b.x * a.y
            })
            .sum();
        assert!(area > 0.0);
    }

    #[test]
    fn bbox3d_follows_translation() {
        let mut store = PatternStore::new();
        let id = square_panel(&mut store);
        store.panel_mut(id).unwrap().translate_by(&Vector3::new(0.0, 0.0, 7.0));
        let (min, max) = store.panel_bbox3d(id, &LinearizeParams::default()).unwrap();
        assert_relative_eq!(min.z, 7.0);
        assert_relative_eq!(max.z, 7.0);
        assert_relative_eq!(max.x, 2.0, epsilon = 1e-12);
        assert!(!store
            .panel_is_self_intersecting(id, &LinearizeParams::default())
            .unwrap());
    }
}
