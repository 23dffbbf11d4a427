//! Clamped uniform cubic B-spline surfaces
//!
//! The control grid is padded with two clones of each boundary row/column so
//! the evaluated surface passes through the boundary control points. Each
//! output sample blends a 4×4 window of the padded grid with the uniform cubic
//! basis (scaled by 6 per axis, hence the division by 36).

use glam::DVec3;

use super::grid::Grid;

/// Clones added on every edge of the control grid
pub const PAD: usize = 2;
/// Smallest control grid (per axis) the interpolator accepts
pub const MIN_CONTROL_POINTS: usize = 4;
/// Smallest output resolution (per axis)
pub const MIN_RESOLUTION: usize = 2;

/// Normalization of the 2D blend (6 per axis)
const BASIS_SCALE: f64 = 36.0;

/// Position, partial derivatives and unit normal at one surface parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: DVec3,
    pub tangent_u: DVec3,
    pub tangent_v: DVec3,
    pub normal: DVec3,
}

/// A surface sampled on a regular `nu` × `nv` parameter grid
#[derive(Debug, Clone)]
pub struct Surface {
    pub position: Grid<DVec3>,
    pub tangent_u: Grid<DVec3>,
    pub tangent_v: Grid<DVec3>,
    /// `normalize(tangent_u × tangent_v)`; non-finite where a tangent vanishes
    pub normal: Grid<DVec3>,
}

impl Surface {
    pub fn nu(&self) -> usize {
        self.position.nx()
    }

    pub fn nv(&self) -> usize {
        self.position.ny()
    }

    pub fn point(&self, ku: usize, kv: usize) -> SurfacePoint {
        SurfacePoint {
            position: self.position[(ku, kv)],
            tangent_u: self.tangent_u[(ku, kv)],
            tangent_v: self.tangent_v[(ku, kv)],
            normal: self.normal[(ku, kv)],
        }
    }
}

/// Pad a control grid to `(nx + 4) × (ny + 4)` by cloning the nearest
/// boundary point outward. Corners of the border take the original corner.
pub fn pad_control_points(control_points: &Grid<DVec3>) -> Grid<DVec3> {
    let nx = control_points.nx();
    let ny = control_points.ny();
    Grid::from_fn(nx + 2 * PAD, ny + 2 * PAD, |kx, ky| {
        let sx = kx.saturating_sub(PAD).min(nx - 1);
        let sy = ky.saturating_sub(PAD).min(ny - 1);
        control_points[(sx, sy)]
    })
}

/// Uniform cubic B-spline blending weights, scaled by 6
#[inline]
fn basis(u: f64) -> [f64; 4] {
    let u2 = u * u;
    let u3 = u2 * u;
    let w = 1.0 - u;
    [
        w * w * w,
        3.0 * u3 - 6.0 * u2 + 4.0,
        -3.0 * u3 + 3.0 * u2 + 3.0 * u + 1.0,
        u3,
    ]
}

/// d/du of [`basis`]
#[inline]
fn basis_derivative(u: f64) -> [f64; 4] {
    let u2 = u * u;
    let w = 1.0 - u;
    [
        -3.0 * w * w,
        9.0 * u2 - 12.0 * u,
        -9.0 * u2 + 6.0 * u + 3.0,
        3.0 * u2,
    ]
}

/// Map a normalized parameter `s ∈ [0, 1]` to `(interval, u)` for a padded
/// axis with `n` original control points.
///
/// The padded axis holds `n + 1` cubic intervals, so `t = s · (n + 1)`. The
/// right end lands exactly on `t = n + 1`, which is folded back into the last
/// interval with `u = 1`.
fn knot_interval(s: f64, n: usize) -> (usize, f64) {
    let t = s * (n + 1) as f64;
    let mut interval = t.floor() as usize;
    let mut u = t - interval as f64;

    if interval == n + 1 && u == 0.0 {
        interval = n;
        u = 1.0;
    }

    assert!(interval <= n, "parameter {s} outside [0, 1]");
    assert!((0.0..=1.0).contains(&u));
    (interval, u)
}

/// Evaluate a padded grid at normalized parameters `(s, t)`.
fn evaluate_padded(padded: &Grid<DVec3>, nx: usize, ny: usize, s: f64, t: f64) -> SurfacePoint {
    let (ix, ux) = knot_interval(s, nx);
    let (iy, uy) = knot_interval(t, ny);

    let cxs = basis(ux);
    let cys = basis(uy);
    let dcxs = basis_derivative(ux);
    let dcys = basis_derivative(uy);

    let mut position = DVec3::ZERO;
    let mut du = DVec3::ZERO;
    let mut dv = DVec3::ZERO;
    for (a, (&cx, &dcx)) in cxs.iter().zip(&dcxs).enumerate() {
        for (b, (&cy, &dcy)) in cys.iter().zip(&dcys).enumerate() {
            let p = padded[(ix + a, iy + b)];
            position += cx * cy * p;
            du += dcx * cy * p;
            dv += cx * dcy * p;
        }
    }

    // Chain rule: derivatives with respect to s and t rather than the local u.
    let tangent_u = du * ((nx + 1) as f64 / BASIS_SCALE);
    let tangent_v = dv * ((ny + 1) as f64 / BASIS_SCALE);

    SurfacePoint {
        position: position / BASIS_SCALE,
        tangent_u,
        tangent_v,
        normal: tangent_u.cross(tangent_v).normalize(),
    }
}

fn assert_control_grid(control_points: &Grid<DVec3>) {
    assert!(
        control_points.nx() >= MIN_CONTROL_POINTS && control_points.ny() >= MIN_CONTROL_POINTS,
        "control grid {}x{} is smaller than {MIN_CONTROL_POINTS}x{MIN_CONTROL_POINTS}",
        control_points.nx(),
        control_points.ny()
    );
}

/// Evaluate the clamped surface at a single normalized parameter pair.
pub fn evaluate(control_points: &Grid<DVec3>, s: f64, t: f64) -> SurfacePoint {
    assert_control_grid(control_points);
    let padded = pad_control_points(control_points);
    evaluate_padded(&padded, control_points.nx(), control_points.ny(), s, t)
}

/// Sample the clamped surface on an `nu` × `nv` grid spanning `[0, 1]²`.
pub fn interpolate(control_points: &Grid<DVec3>, nu: usize, nv: usize) -> Surface {
    assert_control_grid(control_points);
    assert!(
        nu >= MIN_RESOLUTION && nv >= MIN_RESOLUTION,
        "surface resolution {nu}x{nv} is below {MIN_RESOLUTION}x{MIN_RESOLUTION}"
    );

    let nx = control_points.nx();
    let ny = control_points.ny();
    let padded = pad_control_points(control_points);

    let points = Grid::from_fn(nu, nv, |ku, kv| {
        let s = ku as f64 / (nu - 1) as f64;
        let t = kv as f64 / (nv - 1) as f64;
        evaluate_padded(&padded, nx, ny, s, t)
    });

    Surface {
        position: points.map(|p| p.position),
        tangent_u: points.map(|p| p.tangent_u),
        tangent_v: points.map(|p| p.tangent_v),
        normal: points.map(|p| p.normal),
    }
}
