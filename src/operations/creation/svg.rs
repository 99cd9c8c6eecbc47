//! Edge sequences from SVG path data.
//!
//! Supports a single subpath built from `M`, `L`, `H`, `V`, `Q`, `C`, `A`
//! and `Z` commands, in absolute and relative form. Arcs must be circular.
//!
//! Coordinates are taken as they are, without flipping the SVG y axis. An
//! arc with the sweep flag set turns towards positive angles, which places
//! it on the right-hand side of its chord.

use crate::error::{GeometryError, OperationError, Result, SeamlineError};
use crate::geometry::{Curve, EdgeCurve};
use crate::math::arc_2d::cy_from_radius;
use crate::math::{abs_to_rel, Point2, Vector2, TOLERANCE};
use crate::topology::{Curvature, EdgeSequence, PatternStore};

use super::seq_factory::EdgeSeqFactory;

/// Distance under which path points are treated as the same point.
const POINT_EPS: f64 = 1e-9;

/// Samples per edge when searching for center-line crossings.
const CROSSING_SAMPLES: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(char),
    Number(f64),
}

fn tokenize(d: &str) -> Result<Vec<Token>> {
    let mut raw = Vec::new();
    let mut current = String::new();
    for ch in d.chars() {
        match ch {
            'M' | 'm' | 'L' | 'l' | 'H' | 'h' | 'V' | 'v' | 'C' | 'c' | 'S' | 's' | 'Q' | 'q'
            | 'T' | 't' | 'A' | 'a' | 'Z' | 'z' => {
                if !current.is_empty() {
                    raw.push(std::mem::take(&mut current));
                }
                raw.push(ch.to_string());
            }
            ' ' | ',' | '\n' | '\r' | '\t' => {
                if !current.is_empty() {
                    raw.push(std::mem::take(&mut current));
                }
            }
            '-' | '+' => {
                // A sign inside an exponent belongs to the number.
                if !current.is_empty() && !matches!(current.chars().last(), Some('e' | 'E')) {
                    raw.push(std::mem::take(&mut current));
                }
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        raw.push(current);
    }

    raw.into_iter()
        .map(|tok| {
            let mut chars = tok.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => Ok(Token::Command(c)),
                _ => tok.parse::<f64>().map(Token::Number).map_err(|_| {
                    SeamlineError::from(OperationError::InvalidInput(format!(
                        "invalid number '{tok}' in path data"
                    )))
                }),
            }
        })
        .collect()
}

/// One drawing command in absolute coordinates.
#[derive(Debug, Clone, Copy)]
enum PathSegment {
    Line {
        start: Point2,
        end: Point2,
    },
    Quadratic {
        start: Point2,
        control: Point2,
        end: Point2,
    },
    Cubic {
        start: Point2,
        controls: [Point2; 2],
        end: Point2,
    },
    Arc {
        start: Point2,
        end: Point2,
        radius: f64,
        large_arc: bool,
        sweep: bool,
    },
}

impl PathSegment {
    fn endpoints(&self) -> (Point2, Point2) {
        match *self {
            Self::Line { start, end }
            | Self::Quadratic { start, end, .. }
            | Self::Cubic { start, end, .. }
            | Self::Arc { start, end, .. } => (start, end),
        }
    }

    /// Applies a uniform scaling map to every point.
    fn mapped(&self, f: impl Fn(&Point2) -> Point2, scale: f64) -> Self {
        match *self {
            Self::Line { start, end } => Self::Line {
                start: f(&start),
                end: f(&end),
            },
            Self::Quadratic {
                start,
                control,
                end,
            } => Self::Quadratic {
                start: f(&start),
                control: f(&control),
                end: f(&end),
            },
            Self::Cubic {
                start,
                controls: [c1, c2],
                end,
            } => Self::Cubic {
                start: f(&start),
                controls: [f(&c1), f(&c2)],
                end: f(&end),
            },
            Self::Arc {
                start,
                end,
                radius,
                large_arc,
                sweep,
            } => Self::Arc {
                start: f(&start),
                end: f(&end),
                radius: radius * scale,
                large_arc,
                sweep,
            },
        }
    }

    fn curvature(&self) -> Result<Curvature> {
        let (start, end) = self.endpoints();
        let rel = |p: &Point2| {
            abs_to_rel(&start, &end, p)
                .ok_or_else(|| GeometryError::Degenerate("path segment endpoints coincide".into()))
        };
        Ok(match self {
            Self::Line { .. } => Curvature::Straight,
            Self::Quadratic { control, .. } => Curvature::Quadratic {
                control: rel(control)?,
            },
            Self::Cubic {
                controls: [c1, c2], ..
            } => Curvature::Cubic {
                controls: [rel(c1)?, rel(c2)?],
            },
            Self::Arc {
                radius,
                large_arc,
                sweep,
                ..
            } => {
                // Radii too small for the chord are scaled up to a half circle.
                let chord = (end - start).norm();
                let cy = cy_from_radius((radius / chord).max(0.5), *large_arc, *sweep)
                    .ok_or_else(|| GeometryError::Degenerate("arc radius cannot span its chord".into()))?;
                Curvature::Circle { cy }
            }
        })
    }

    fn curve(&self) -> Result<EdgeCurve> {
        let (start, end) = self.endpoints();
        Ok(self.curvature()?.to_absolute(&start, &end))
    }
}

#[derive(Debug, Default)]
struct ParsedPath {
    segments: Vec<PathSegment>,
    closed: bool,
}

impl ParsedPath {
    fn push(&mut self, segment: PathSegment) -> Result<()> {
        if self.closed {
            return Err(OperationError::InvalidInput("path continues after closing".into()).into());
        }
        let (start, end) = segment.endpoints();
        if (end - start).norm() < POINT_EPS {
            tracing::debug!(?start, "skipping zero-length path segment");
            return Ok(());
        }
        self.segments.push(segment);
        Ok(())
    }
}

fn take_numbers(tokens: &[Token], i: &mut usize, count: usize) -> Result<Vec<f64>> {
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        match tokens.get(*i) {
            Some(Token::Number(n)) => out.push(*n),
            _ => {
                return Err(OperationError::InvalidInput(format!(
                    "expected {count} arguments in path data, found {}",
                    out.len()
                ))
                .into())
            }
        }
        *i += 1;
    }
    Ok(out)
}

fn parse_path(d: &str) -> Result<ParsedPath> {
    let tokens = tokenize(d)?;
    let mut path = ParsedPath::default();
    let mut current = Point2::origin();
    let mut subpath_start: Option<Point2> = None;
    let mut i = 0;

    while i < tokens.len() {
        let cmd = match tokens[i] {
            Token::Command(c) => c,
            Token::Number(n) => {
                return Err(OperationError::InvalidInput(format!(
                    "path data has a stray number {n}"
                ))
                .into())
            }
        };
        i += 1;
        let upper = cmd.to_ascii_uppercase();
        let arity = match upper {
            'M' | 'L' => 2,
            'H' | 'V' => 1,
            'Q' => 4,
            'C' => 6,
            'A' => 7,
            'Z' => 0,
            other => {
                return Err(OperationError::InvalidInput(format!(
                    "unsupported path command '{other}'"
                ))
                .into())
            }
        };

        if upper == 'Z' {
            let start = subpath_start.ok_or_else(|| {
                OperationError::InvalidInput("path closes before it starts".into())
            })?;
            path.push(PathSegment::Line {
                start: current,
                end: start,
            })?;
            path.closed = true;
            current = start;
            continue;
        }
        if upper != 'M' && subpath_start.is_none() {
            return Err(OperationError::InvalidInput("path data must start with a move".into()).into());
        }

        let relative = cmd.is_ascii_lowercase();
        let mut first_pair = true;
        loop {
            let args = take_numbers(&tokens, &mut i, arity)?;
            let base = if relative { current.coords } else { Vector2::zeros() };
            let at = |x: f64, y: f64| Point2::new(x, y) + base;

            match upper {
                'M' if first_pair => {
                    if subpath_start.is_some() {
                        return Err(OperationError::InvalidInput(
                            "multiple subpaths are not supported".into(),
                        )
                        .into());
                    }
                    current = at(args[0], args[1]);
                    subpath_start = Some(current);
                }
                'M' | 'L' => {
                    let end = at(args[0], args[1]);
                    path.push(PathSegment::Line { start: current, end })?;
                    current = end;
                }
                'H' => {
                    let end = Point2::new(args[0] + base.x, current.y);
                    path.push(PathSegment::Line { start: current, end })?;
                    current = end;
                }
                'V' => {
                    let end = Point2::new(current.x, args[0] + base.y);
                    path.push(PathSegment::Line { start: current, end })?;
                    current = end;
                }
                'Q' => {
                    let end = at(args[2], args[3]);
                    path.push(PathSegment::Quadratic {
                        start: current,
                        control: at(args[0], args[1]),
                        end,
                    })?;
                    current = end;
                }
                'C' => {
                    let end = at(args[4], args[5]);
                    path.push(PathSegment::Cubic {
                        start: current,
                        controls: [at(args[0], args[1]), at(args[2], args[3])],
                        end,
                    })?;
                    current = end;
                }
                _ => {
                    let (rx, ry) = (args[0].abs(), args[1].abs());
                    if (rx - ry).abs() > 1e-6 * rx.max(ry) {
                        return Err(OperationError::InvalidInput(format!(
                            "elliptic arcs are not supported (rx = {rx}, ry = {ry})"
                        ))
                        .into());
                    }
                    let end = at(args[5], args[6]);
                    path.push(PathSegment::Arc {
                        start: current,
                        end,
                        radius: rx,
                        large_arc: args[3] > 0.5,
                        sweep: args[4] > 0.5,
                    })?;
                    current = end;
                }
            }
            first_pair = false;

            if !matches!(tokens.get(i), Some(Token::Number(_))) {
                break;
            }
        }
    }

    if path.segments.is_empty() {
        return Err(OperationError::InvalidInput("path has no drawable segments".into()).into());
    }
    Ok(path)
}

/// Inserts the path as a chained sequence.
fn build_sequence(store: &mut PatternStore, path: &ParsedPath) -> Result<EdgeSequence> {
    let (Some(first_seg), Some(last_seg)) = (path.segments.first(), path.segments.last()) else {
        return Err(OperationError::InvalidInput("path has no drawable segments".into()).into());
    };
    let closes = path.closed || (last_seg.endpoints().1 - first_seg.endpoints().0).norm() < POINT_EPS;

    let first = store.add_point(first_seg.endpoints().0);
    let mut prev = first;
    let mut seq = EdgeSequence::new();
    for (i, segment) in path.segments.iter().enumerate() {
        let next = if closes && i + 1 == path.segments.len() {
            first
        } else {
            store.add_point(segment.endpoints().1)
        };
        seq.append(store.add_edge(prev, next, segment.curvature()?)?);
        prev = next;
    }
    Ok(seq)
}

/// Parameters in `(0, 1)` where the curve crosses the line `x = 0`.
fn axis_crossings(curve: &EdgeCurve) -> Vec<f64> {
    let x = |t: f64| curve.evaluate(t).x;
    let mut out = Vec::new();
    let (mut prev_t, mut prev_x) = (0.0, x(0.0));
    for k in 1..=CROSSING_SAMPLES {
        let t = f64::from(k) / f64::from(CROSSING_SAMPLES);
        let xt = x(t);
        if k < CROSSING_SAMPLES && xt.abs() < POINT_EPS {
            out.push(t);
        } else if prev_x.abs() >= POINT_EPS && xt.abs() >= POINT_EPS && (prev_x < 0.0) != (xt < 0.0) {
            let (mut lo, mut hi) = (prev_t, t);
            for _ in 0..60 {
                let mid = 0.5 * (lo + hi);
                if (x(mid) < 0.0) == (prev_x < 0.0) {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            out.push(0.5 * (lo + hi));
        }
        prev_t = t;
        prev_x = xt;
    }
    out
}

impl EdgeSeqFactory {
    /// Edge sequence described by SVG path data.
    ///
    /// Consecutive segments share vertices. A closed path, or one ending
    /// where it started, comes back to its first vertex.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for malformed path data,
    /// unsupported commands, several subpaths or elliptic arcs.
    pub fn from_svg_path(store: &mut PatternStore, d: &str) -> Result<EdgeSequence> {
        let path = parse_path(d)?;
        build_sequence(store, &path)
    }

    /// Splits a path outline into its left and right halves.
    ///
    /// The outline is scaled to `target_height` and moved so that its
    /// bounding box is centered on `x = 0` and sits on `y = 0`. Edges
    /// crossing the center line are split there. Both halves are chained
    /// and share the vertices on the center line.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the path does not cross
    /// its center line exactly twice (once for an open path), and
    /// [`GeometryError::Degenerate`] for a flat path.
    pub fn halfs_from_svg(
        store: &mut PatternStore,
        d: &str,
        target_height: f64,
    ) -> Result<(EdgeSequence, EdgeSequence)> {
        if target_height <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "target height {target_height} must be positive"
            ))
            .into());
        }
        let parsed = parse_path(d)?;

        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for segment in &parsed.segments {
            for p in segment.curve()?.sample(32) {
                min = min.inf(&p);
                max = max.sup(&p);
            }
        }
        let height = max.y - min.y;
        if height < TOLERANCE {
            return Err(GeometryError::Degenerate("path has no height".into()).into());
        }
        let scale = target_height / height;
        let center_x = 0.5 * (min.x + max.x);
        let map = |p: &Point2| Point2::new((p.x - center_x) * scale, (p.y - min.y) * scale);
        let path = ParsedPath {
            segments: parsed.segments.iter().map(|s| s.mapped(map, scale)).collect(),
            closed: parsed.closed,
        };
        let mut seq = build_sequence(store, &path)?;

        let outline = seq.clone();
        for edge in outline.iter().copied() {
            let params = axis_crossings(&store.as_curve(edge)?);
            if params.is_empty() {
                continue;
            }
            let mut fractions = Vec::with_capacity(params.len() + 1);
            let mut prev = 0.0;
            for t in params.iter().chain(std::iter::once(&1.0)) {
                fractions.push(t - prev);
                prev = *t;
            }
            let pieces = store.subdivide_edge(edge, &fractions, false)?;
            for piece in pieces.iter().skip(1) {
                let start = store.edge(*piece)?.start;
                store.vertex_mut(start)?.point.x = 0.0;
            }
            seq.substitute(edge, &pieces)?;
            store.remove_edge(edge);
        }

        let mut cuts = Vec::new();
        for (i, edge) in seq.iter().enumerate() {
            let start = store.edge_points(*edge)?.0;
            if start.x.abs() < POINT_EPS {
                cuts.push(i);
            }
        }
        let (a, b) = if seq.is_loop(store) {
            let &[c0, c1] = cuts.as_slice() else {
                return Err(OperationError::InvalidInput(format!(
                    "closed outline crosses its center line {} times, expected 2",
                    cuts.len()
                ))
                .into());
            };
            let mut tail = seq.slice(c1..seq.len());
            tail.append_seq(&seq.slice(0..c0));
            (seq.slice(c0..c1), tail)
        } else {
            let interior: Vec<usize> = cuts.into_iter().filter(|c| *c > 0).collect();
            let &[c] = interior.as_slice() else {
                return Err(OperationError::InvalidInput(format!(
                    "open outline crosses its center line {} times, expected 1",
                    interior.len()
                ))
                .into());
            };
            (seq.slice(0..c), seq.slice(c..seq.len()))
        };

        let lead = a
            .first()
            .ok_or_else(|| OperationError::InvalidInput("empty outline half".into()))?;
        if store.as_curve(lead)?.evaluate(0.5).x < 0.0 {
            Ok((a, b))
        } else {
            Ok((b, a))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn tokenizer_splits_signs_and_keeps_exponents() {
        let tokens = tokenize("M1-2L3e-1,4").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Command('M'),
                Token::Number(1.0),
                Token::Number(-2.0),
                Token::Command('L'),
                Token::Number(0.3),
                Token::Number(4.0),
            ]
        );
        assert!(tokenize("M 1 x2").is_err());
    }

    #[test]
    fn relative_square_closes_on_first_vertex() {
        let mut store = PatternStore::new();
        let seq = EdgeSeqFactory::from_svg_path(&mut store, "m 1 1 l 2 0 v 2 h -2 z").unwrap();
        assert_eq!(seq.len(), 4);
        assert!(seq.is_loop(&store));
        assert_relative_eq!(seq.length(&store).unwrap(), 8.0, epsilon = 1e-12);
        let (s, _) = seq.shortcut(&store).unwrap();
        assert_relative_eq!(s, Point2::new(1.0, 1.0), epsilon = 1e-12);
        assert_eq!(store.vertex_count(), 4);
    }

    #[test]
    fn curves_and_implicit_lines() {
        let mut store = PatternStore::new();
        let seq =
            EdgeSeqFactory::from_svg_path(&mut store, "M0,0 Q1,1 2,0 C2.5,-1 3.5,-1 4,0 L5,0 6,1").unwrap();
        assert_eq!(seq.len(), 4);
        assert!(seq.is_chained(&store));
        assert!(!seq.is_loop(&store));
        assert!(matches!(store.edge(seq[0]).unwrap().curvature, Curvature::Quadratic { .. }));
        assert!(matches!(store.edge(seq[1]).unwrap().curvature, Curvature::Cubic { .. }));
        assert!(store.is_straight(seq[3]).unwrap());
    }

    #[test]
    fn sweep_flag_picks_side() {
        let mut store = PatternStore::new();
        let seq = EdgeSeqFactory::from_svg_path(&mut store, "M 0 0 L 2 0 A 1 1 0 0 1 0 0 Z").unwrap();
        assert_eq!(seq.len(), 2);
        assert!(seq.is_loop(&store));
        assert_relative_eq!(seq.length(&store).unwrap(), 2.0 + PI, epsilon = 1e-9);
        assert!(store.as_curve(seq[1]).unwrap().evaluate(0.5).y > 0.0);
    }

    #[test]
    fn rejected_paths() {
        let mut store = PatternStore::new();
        for d in [
            "M 0 0 A 1 2 0 0 1 2 0",
            "M 0 0 L 1 0 M 2 2 L 3 3",
            "M 0 0 S 1 1 2 0",
            "L 1 1",
            "M 0 0 L 1",
            "M 0 0",
        ] {
            assert!(EdgeSeqFactory::from_svg_path(&mut store, d).is_err(), "{d}");
        }
    }

    #[test]
    fn outline_halves() {
        let mut store = PatternStore::new();
        let (left, right) =
            EdgeSeqFactory::halfs_from_svg(&mut store, "M 0 0 L 4 0 L 4 2 L 0 2 Z", 1.0).unwrap();
        assert_eq!(left.len(), 3);
        assert_eq!(right.len(), 3);
        assert!(left.is_chained(&store) && right.is_chained(&store));
        assert_relative_eq!(left.length(&store).unwrap(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(right.length(&store).unwrap(), 3.0, epsilon = 1e-9);

        let bounds = right.bbox(&store, &crate::topology::LinearizeParams::default()).unwrap();
        assert_relative_eq!(bounds.min.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.max, Point2::new(1.0, 1.0), epsilon = 1e-12);

        // Each half starts where the other one ends.
        let (ls, le) = left.shortcut(&store).unwrap();
        let (rs, re) = right.shortcut(&store).unwrap();
        assert_relative_eq!(ls, re, epsilon = 1e-12);
        assert_relative_eq!(le, rs, epsilon = 1e-12);
    }

    #[test]
    fn curved_outline_is_split_on_curves() {
        let mut store = PatternStore::new();
        let (left, right) = EdgeSeqFactory::halfs_from_svg(
            &mut store,
            "M -1 0 L 1 0 C 1 1 0.5 2 0 2 C -0.5 2 -1 1 -1 0 Z",
            4.0,
        )
        .unwrap();
        assert_relative_eq!(
            left.length(&store).unwrap(),
            right.length(&store).unwrap(),
            epsilon = 1e-6
        );
        assert!(EdgeSeqFactory::halfs_from_svg(&mut store, "M 0 0 L 1 0", 1.0).is_err());
    }
}
