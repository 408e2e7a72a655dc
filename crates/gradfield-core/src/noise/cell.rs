//! Per-pixel gradient noise kernel.
//!
//! Bilinear gradient interpolation over one lattice cell: dot each corner's
//! gradient with the point's offset from that corner, then blend the four
//! products with the quintic ease curve.

use super::lattice::Lattice;

/// Quintic ease curve `6t⁵ − 15t⁴ + 10t³`.
///
/// First and second derivatives vanish at 0 and 1, so neighbouring cells
/// meet without visible creases.
#[inline]
pub fn smooth(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Eased interpolation from `a` to `b`. Weights outside `[0, 1]` snap to the
/// nearer endpoint.
#[inline]
pub fn interpolate(a: f32, b: f32, w: f32) -> f32 {
    if w < 0.0 {
        return a;
    }
    if w > 1.0 {
        return b;
    }
    a + smooth(w) * (b - a)
}

#[inline]
fn dot(offset: [f32; 2], gradient: [f32; 2]) -> f32 {
    offset[0] * gradient[0] + offset[1] * gradient[1]
}

/// Noise at pixel `(x, y)` of a field tiled by `cell_size` cells.
///
/// The lattice must hold the corner past the cell containing `(x, y)` in both
/// axes; lattices from [`Lattice::for_field`] always do.
#[inline]
pub fn evaluate(lattice: &Lattice, cell_size: usize, x: usize, y: usize) -> f32 {
    let fx = (x % cell_size) as f32 / cell_size as f32;
    let fy = (y % cell_size) as f32 / cell_size as f32;
    evaluate_in_cell(lattice, x / cell_size, y / cell_size, fx, fy)
}

/// Noise at fractional offset `(fx, fy)` inside lattice cell `(col, row)`.
///
/// `fx = 1` on cell `col` and `fx = 0` on cell `col + 1` land on the same
/// shared edge and agree.
pub fn evaluate_in_cell(lattice: &Lattice, col: usize, row: usize, fx: f32, fy: f32) -> f32 {
    let top_left = dot([fx, fy], lattice.gradient(col, row));
    let top_right = dot([fx - 1.0, fy], lattice.gradient(col + 1, row));
    let bottom_left = dot([fx, fy - 1.0], lattice.gradient(col, row + 1));
    let bottom_right = dot([fx - 1.0, fy - 1.0], lattice.gradient(col + 1, row + 1));

    let top = interpolate(top_left, top_right, fx);
    let bottom = interpolate(bottom_left, bottom_right, fx);
    interpolate(top, bottom, fy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lattice(w: usize, h: usize, seed: u64) -> Lattice {
        Lattice::build(w, h, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn smooth_endpoints_and_midpoint() {
        assert_eq!(smooth(0.0), 0.0);
        assert_eq!(smooth(1.0), 1.0);
        assert_abs_diff_eq!(smooth(0.5), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn smooth_is_monotonic() {
        let mut prev = smooth(0.0);
        for i in 1..=100 {
            let v = smooth(i as f32 / 100.0);
            assert!(v >= prev, "smooth decreased at t={}", i as f32 / 100.0);
            prev = v;
        }
    }

    #[test]
    fn interpolate_clamps_out_of_range_weights() {
        assert_eq!(interpolate(2.0, 5.0, -0.1), 2.0);
        assert_eq!(interpolate(2.0, 5.0, 1.1), 5.0);
        assert_eq!(interpolate(2.0, 5.0, 0.0), 2.0);
        assert_abs_diff_eq!(interpolate(2.0, 5.0, 0.5), 3.5, epsilon = 1e-6);
    }

    #[test]
    fn lattice_corners_evaluate_to_zero() {
        let l = lattice(3, 3, 11);
        for y in [0, 20] {
            for x in [0, 20] {
                assert_eq!(evaluate(&l, 20, x, y), 0.0);
            }
        }
    }

    #[test]
    fn evaluation_is_pure() {
        let l = lattice(5, 5, 99);
        for (x, y) in [(3, 7), (17, 2), (31, 31), (12, 29)] {
            assert_eq!(evaluate(&l, 8, x, y).to_bits(), evaluate(&l, 8, x, y).to_bits());
        }
    }

    #[test]
    fn shared_vertical_edge_has_no_seam() {
        let l = lattice(4, 3, 5);
        for i in 0..=10 {
            let fy = i as f32 / 10.0;
            let left = evaluate_in_cell(&l, 0, 1, 1.0, fy);
            let right = evaluate_in_cell(&l, 1, 1, 0.0, fy);
            assert_abs_diff_eq!(left, right, epsilon = 1e-6);
        }
    }

    #[test]
    fn shared_horizontal_edge_has_no_seam() {
        let l = lattice(3, 4, 6);
        for i in 0..=10 {
            let fx = i as f32 / 10.0;
            let above = evaluate_in_cell(&l, 1, 0, fx, 1.0);
            let below = evaluate_in_cell(&l, 1, 1, fx, 0.0);
            assert_abs_diff_eq!(above, below, epsilon = 1e-6);
        }
    }

    #[test]
    fn values_stay_within_unit_range() {
        let l = lattice(9, 9, 2024);
        for y in 0..64 {
            for x in 0..64 {
                let v = evaluate(&l, 8, x, y);
                assert!((-1.0..=1.0).contains(&v), "({x}, {y}) = {v}");
            }
        }
    }

    #[test]
    fn axis_gradient_produces_expected_ramp() {
        // All gradients point along +x: value reduces to the eased blend of fx and fx-1.
        let l = Lattice::from_gradients(2, 2, vec![[1.0, 0.0]; 4]);
        let v = evaluate_in_cell(&l, 0, 0, 0.5, 0.25);
        assert_abs_diff_eq!(v, 0.5 + smooth(0.5) * (-0.5 - 0.5), epsilon = 1e-6);
    }
}
