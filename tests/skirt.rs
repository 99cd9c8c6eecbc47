#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use seamline::math::{Point2, Vector3};
use seamline::operations::creation::EdgeSeqFactory;
use seamline::operations::fitting::CutIntoEdge;
use seamline::params::DesignParams;
use seamline::serialization::PatternRecord;
use seamline::stitching::{AssemblePattern, Interface, Stitches, StitchingRule};
use seamline::topology::{PanelData, PanelId, PatternStore};
use tracing_subscriber::EnvFilter;

const DESIGN: &str = r#"{
    "design": {
        "front": {
            "width": { "v": 20.0, "range": [10, 40], "type": "float" },
            "length": { "v": 30.0, "range": [20, 80], "type": "float" }
        },
        "dart": {
            "width": { "v": 2.0, "type": "float" },
            "depth": { "v": 8.0, "type": "float" }
        }
    }
}"#;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn rect(store: &mut PatternStore, name: &str, w: f64, h: f64) -> PanelId {
    let pts = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)].map(|(x, y)| Point2::new(x, y));
    let seq = EdgeSeqFactory::from_verts(store, &pts, true).unwrap();
    store.add_panel(PanelData::new(name, seq))
}

#[test]
fn darted_skirt_assembles() {
    init_logging();
    let params = DesignParams::parse(DESIGN).unwrap();
    let width = params.get_f64("front.width").unwrap();
    let length = params.get_f64("front.length").unwrap();
    let dart_width = params.get_f64("dart.width").unwrap();

    let mut store = PatternStore::new();
    let front = rect(&mut store, "front", width, length);
    let back = rect(&mut store, "back", width, length);
    let belt = rect(&mut store, "belt", width - dart_width, 3.0);
    {
        let back = store.panel_mut(back).unwrap();
        back.translate_by(&Vector3::new(0.0, 0.0, -20.0));
        back.set_rotation_degrees([0.0, 180.0, 0.0]);
    }

    // Waist of the front runs from (w, h) to (0, h); its left is inside.
    let waist = store.panel(front).unwrap().edges[2];
    let dart = EdgeSeqFactory::dart_shape(&mut store, dart_width, params.get_f64("dart.depth").unwrap())
        .unwrap();
    let cut = CutIntoEdge::new(dart, waist, width / 2.0, false, 1e-4)
        .execute(&mut store)
        .unwrap();
    let tip = store.edge_points(cut.inserted[0]).unwrap().1;
    assert!(tip.y < length);
    cut.splice_into(&mut store.panel_mut(front).unwrap().edges, waist)
        .unwrap();

    let boundary = store.panel(front).unwrap().edges.clone();
    assert_eq!(boundary.len(), 6);
    assert!(boundary.is_loop(&store));
    assert_relative_eq!(
        cut.leftovers.length(&store).unwrap(),
        width - dart_width,
        epsilon = 1e-6
    );

    let front_side = Interface::new(&store, front, boundary.slice(1..2));
    let back_side = Interface::new(&store, back, store.panel(back).unwrap().edges.slice(3..4));
    let front_waist = Interface::new(&store, front, cut.leftovers.clone());
    let belt_bottom = Interface::new(&store, belt, store.panel(belt).unwrap().edges.slice(0..1));

    let side = StitchingRule::new(&mut store, front_side, back_side).unwrap();
    let waistline = StitchingRule::new(&mut store, front_waist, belt_bottom).unwrap();
    assert!(side.is_matching(&store).unwrap());
    assert!(waistline.is_matching(&store).unwrap());
    assert_eq!(waistline.sides().1.len(), 2);
    assert_eq!(store.panel(belt).unwrap().edges.len(), 5);
    assert!(store.panel(belt).unwrap().edges.is_loop(&store));

    let stitches: Stitches = [side, waistline].into_iter().collect();
    let pattern = AssemblePattern::new(vec![front, back, belt], &stitches)
        .execute(&mut store)
        .unwrap();
    assert_eq!(pattern.panels.len(), 3);
    assert_eq!(pattern.panels["front"].edges.len(), 6);
    assert_eq!(pattern.panels["back"].translation, [0.0, 0.0, -20.0]);
    assert_eq!(pattern.stitches.len(), 3);
    assert!(pattern.stitches.iter().all(|s| !s.right_wrong));

    let json = pattern.to_json().unwrap();
    let parsed = PatternRecord::from_json(&json).unwrap();
    assert_eq!(parsed.stitches, pattern.stitches);
    assert!(parsed.panels.keys().eq(pattern.panels.keys()));
    for (name, panel) in &parsed.panels {
        let original = &pattern.panels[name];
        assert_eq!(panel.edges.len(), original.edges.len());
        for (a, b) in panel.vertices.iter().zip(&original.vertices) {
            assert_relative_eq!(a[0], b[0], epsilon = 1e-9);
            assert_relative_eq!(a[1], b[1], epsilon = 1e-9);
        }
    }
}
