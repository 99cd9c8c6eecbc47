//! Composite Gauss-Legendre integration, used for Bezier arc lengths.

const NODES: [f64; 5] = [
    0.0,
    -0.538_469_310_105_683_1,
    0.538_469_310_105_683_1,
    -0.906_179_845_938_664,
    0.906_179_845_938_664,
];

const WEIGHTS: [f64; 5] = [
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
    0.236_926_885_056_189_1,
];

/// Number of sub-intervals of the composite rule.
const PANELS: u32 = 16;

/// Integrates `f` over `[a, b]` with a 16-panel, 5-point Gauss-Legendre rule.
pub fn integrate<F>(f: F, a: f64, b: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    if (b - a).abs() < f64::EPSILON {
        return 0.0;
    }
    let h = (b - a) / f64::from(PANELS);
    let mut total = 0.0;
    for k in 0..PANELS {
        let lo = a + h * f64::from(k);
        let mid = lo + h * 0.5;
        let half = h * 0.5;
        let panel: f64 = NODES
            .iter()
            .zip(WEIGHTS.iter())
            .map(|(x, w)| w * f(mid + half * x))
            .sum();
        total += panel * half;
    }
    total
}
