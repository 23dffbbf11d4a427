//! Geometry generation for the scene: backboard mesh, arcs, guides and overlays

use glam::{DVec3, Vec3};
use std::f32::consts::TAU;

use super::vertex::{LineVertex, MeshVertex, colors};
use crate::sim::{Grid, Sample, Surface};

/// How a polyline's points are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Consecutive points joined
    Strip,
    /// Points joined in pairs
    Segments,
    /// Unjoined points
    Points,
}

/// Colored run of points handed to the presenter
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Vec3>,
    pub color: [f32; 4],
    pub topology: Topology,
}

impl Polyline {
    pub fn new(points: Vec<Vec3>, color: [f32; 4], topology: Topology) -> Self {
        Self {
            points,
            color,
            topology,
        }
    }

    pub fn strip(points: &[DVec3], color: [f32; 4]) -> Self {
        Self::new(points.iter().map(|p| p.as_vec3()).collect(), color, Topology::Strip)
    }

    pub fn vertices(&self) -> Vec<LineVertex> {
        self.points
            .iter()
            .map(|&p| LineVertex::new(p, self.color))
            .collect()
    }
}

/// Triangulated surface ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    pub nu: usize,
    pub nv: usize,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    /// Two triangles per grid cell
    pub fn from_surface(surface: &Surface) -> Self {
        let (nu, nv) = (surface.nu(), surface.nv());

        let vertices = surface
            .position
            .indexed()
            .map(|((ku, kv), p)| {
                let n = surface.normal[(ku, kv)];
                let normal = if n.is_finite() { n.as_vec3() } else { Vec3::ZERO };
                MeshVertex {
                    position: p.as_vec3().to_array(),
                    normal: normal.to_array(),
                    uv: [
                        ku as f32 / (nu - 1) as f32,
                        kv as f32 / (nv - 1) as f32,
                    ],
                }
            })
            .collect();

        let index = |ku: usize, kv: usize| (ku * nv + kv) as u32;
        let mut indices = Vec::with_capacity((nu - 1) * (nv - 1) * 6);
        for ku in 0..nu - 1 {
            for kv in 0..nv - 1 {
                let (a, b) = (index(ku, kv), index(ku + 1, kv));
                let (c, d) = (index(ku, kv + 1), index(ku + 1, kv + 1));
                indices.extend_from_slice(&[a, b, c, c, b, d]);
            }
        }

        Self {
            nu,
            nv,
            vertices,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Grid lines of the mesh as segments
    pub fn wireframe(&self) -> Polyline {
        let at = |ku: usize, kv: usize| Vec3::from(self.vertices[ku * self.nv + kv].position);
        let mut points = Vec::new();
        for ku in 0..self.nu {
            for kv in 0..self.nv {
                if ku + 1 < self.nu {
                    points.extend([at(ku, kv), at(ku + 1, kv)]);
                }
                if kv + 1 < self.nv {
                    points.extend([at(ku, kv), at(ku, kv + 1)]);
                }
            }
        }
        Polyline::new(points, colors::WIREFRAME, Topology::Segments)
    }
}

/// Short segments along both tangents at every surface sample
pub fn tangent_segments(surface: &Surface, scale: f64) -> Polyline {
    let mut points = Vec::new();
    for ((ku, kv), p) in surface.position.indexed() {
        for t in [surface.tangent_u[(ku, kv)], surface.tangent_v[(ku, kv)]] {
            points.push(p.as_vec3());
            points.push((*p + t * scale).as_vec3());
        }
    }
    Polyline::new(points, colors::TANGENT, Topology::Segments)
}

/// Unit-normal segments of length `length`, skipping undefined normals
pub fn normal_segments(surface: &Surface, length: f64) -> Polyline {
    let mut points = Vec::new();
    for (p, n) in surface.position.iter().zip(surface.normal.iter()) {
        if n.is_finite() {
            points.push(p.as_vec3());
            points.push((*p + *n * length).as_vec3());
        }
    }
    Polyline::new(points, colors::NORMAL, Topology::Segments)
}

/// Release-to-backboard arc of every sample
pub fn shot_arcs(samples: &[Sample], points_per_arc: usize) -> Vec<Polyline> {
    samples
        .iter()
        .map(|s| Polyline::strip(&s.shot.arc(points_per_arc), colors::SHOT))
        .collect()
}

/// Backboard-to-landing arc of every sample
pub fn bounce_arcs(samples: &[Sample], points_per_arc: usize) -> Vec<Polyline> {
    samples
        .iter()
        .map(|s| Polyline::strip(&s.bounce.arc(points_per_arc), colors::BOUNCE))
        .collect()
}

pub fn control_point_cloud(control_points: &Grid<DVec3>) -> Polyline {
    Polyline::new(
        control_points.iter().map(|p| p.as_vec3()).collect(),
        colors::CONTROL_POINT,
        Topology::Points,
    )
}

/// Red/green/blue x/y/z axes at the camera focus, scaled with distance
pub fn axes_lines(focus: Vec3, distance: f32) -> Vec<Polyline> {
    let scale = distance * 0.1;
    [
        (Vec3::X, [1.0, 0.0, 0.0, 1.0]),
        (Vec3::Y, [0.0, 1.0, 0.0, 1.0]),
        (Vec3::Z, [0.0, 0.0, 1.0, 1.0]),
    ]
    .into_iter()
    .map(|(axis, color)| Polyline::new(vec![focus, focus + axis * scale], color, Topology::Strip))
    .collect()
}

/// Circle of radius `r` around `(cx, cy)` on the floor
fn floor_circle(cx: f32, cy: f32, r: f32, segments: usize) -> Vec<Vec3> {
    (0..=segments)
        .map(|k| {
            let theta = TAU * k as f32 / segments as f32;
            Vec3::new(cx + r * theta.cos(), cy + r * theta.sin(), 0.0)
        })
        .collect()
}

/// Half-court markings on the floor (z = 0); the wall is at y = 0
pub fn court_lines() -> Vec<Polyline> {
    const BASELINE_Y: f32 = -1.22;
    const HALF_WIDTH: f32 = 7.62;
    const HALF_COURT_Y: f32 = BASELINE_Y + 14.33;
    const LANE_HALF_WIDTH: f32 = 2.44;
    const FREE_THROW_Y: f32 = BASELINE_Y + 5.79;
    const FREE_THROW_RADIUS: f32 = 1.83;

    let floor = |x: f32, y: f32| Vec3::new(x, y, 0.0);
    let outline = vec![
        floor(-HALF_WIDTH, BASELINE_Y),
        floor(HALF_WIDTH, BASELINE_Y),
        floor(HALF_WIDTH, HALF_COURT_Y),
        floor(-HALF_WIDTH, HALF_COURT_Y),
        floor(-HALF_WIDTH, BASELINE_Y),
    ];
    let lane = vec![
        floor(-LANE_HALF_WIDTH, BASELINE_Y),
        floor(-LANE_HALF_WIDTH, FREE_THROW_Y),
        floor(LANE_HALF_WIDTH, FREE_THROW_Y),
        floor(LANE_HALF_WIDTH, BASELINE_Y),
    ];

    vec![
        Polyline::new(outline, colors::COURT, Topology::Strip),
        Polyline::new(lane, colors::COURT, Topology::Strip),
        Polyline::new(
            floor_circle(0.0, FREE_THROW_Y, FREE_THROW_RADIUS, 48),
            colors::COURT,
            Topology::Strip,
        ),
    ]
}

/// Bin `values` into `bins` equal buckets over `[0, max]`.
/// Returns the counts and the upper edge used.
pub fn histogram_counts(values: &[f64], bins: usize) -> (Vec<usize>, f64) {
    let mut counts = vec![0; bins];
    let max = values.iter().copied().fold(0.0, f64::max);
    if bins == 0 || values.is_empty() {
        return (counts, max);
    }
    for &v in values {
        let k = if max > 0.0 {
            ((v / max) * bins as f64) as usize
        } else {
            0
        };
        counts[k.min(bins - 1)] += 1;
    }
    (counts, max)
}

/// Bar chart of miss distances, standing upright beside the court
pub fn histogram_bars(values: &[f64], bins: usize) -> Polyline {
    const ORIGIN_X: f32 = 3.0;
    const ORIGIN_Y: f32 = 0.5;
    const BAR_WIDTH: f32 = 0.15;
    const MAX_HEIGHT: f32 = 2.0;

    let (counts, _) = histogram_counts(values, bins);
    let tallest = counts.iter().copied().max().unwrap_or(0).max(1) as f32;

    let mut points = Vec::with_capacity(counts.len() * 6);
    for (k, &count) in counts.iter().enumerate() {
        let x0 = ORIGIN_X + k as f32 * BAR_WIDTH;
        let x1 = x0 + BAR_WIDTH * 0.8;
        // up is -z
        let top = -MAX_HEIGHT * count as f32 / tallest;
        let corner = |x: f32, z: f32| Vec3::new(x, ORIGIN_Y, z);
        points.extend([
            corner(x0, 0.0),
            corner(x0, top),
            corner(x0, top),
            corner(x1, top),
            corner(x1, top),
            corner(x1, 0.0),
        ]);
    }
    Polyline::new(points, colors::HISTOGRAM, Topology::Segments)
}
