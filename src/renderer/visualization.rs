//! Scene state for the backboard problem
//!
//! Rebuilt whenever a new control grid arrives and pushed to a [`Presenter`]
//! once per frame. Key presses toggle individual layers or move the camera.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::presenter::Presenter;
use super::shapes::{self, Polyline, SurfaceMesh};
use super::vertex::colors;
use crate::Settings;
use crate::sim::{Backboard, Grid, Problem, Sample, rim_loop};

const ARC_POINTS: usize = 256;
const RIM_POINTS: usize = 48;
const TANGENT_SCALE: f64 = 0.05;
const NORMAL_LENGTH: f64 = 0.1;
const HISTOGRAM_BINS: usize = 20;
/// Camera orbit per key press, in degrees
const ROTATE_STEP_DEG: f32 = 5.0;
/// Camera pan per key press, in pointer units
const PAN_STEP: f32 = 50.0;

/// Which overlays are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layers {
    pub tangents: bool,
    pub normals: bool,
    pub shots: bool,
    pub bounces: bool,
    pub control_points: bool,
    pub court: bool,
    pub histogram: bool,
    pub wireframe: bool,
    /// Axes at the camera focus
    pub axes: bool,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            tangents: false,
            normals: false,
            shots: true,
            bounces: true,
            control_points: true,
            court: true,
            histogram: true,
            wireframe: false,
            axes: false,
        }
    }
}

impl Layers {
    /// Flip the layer bound to `key`. Returns its name and new state.
    pub fn toggle(&mut self, key: char) -> Option<(&'static str, bool)> {
        let (name, flag) = match key.to_ascii_lowercase() {
            't' => ("tangents", &mut self.tangents),
            'n' => ("normals", &mut self.normals),
            's' => ("shots", &mut self.shots),
            'b' => ("bounces", &mut self.bounces),
            'c' => ("control points", &mut self.control_points),
            'g' => ("court", &mut self.court),
            'h' => ("histogram", &mut self.histogram),
            'w' => ("wireframe", &mut self.wireframe),
            'x' => ("axes", &mut self.axes),
            _ => return None,
        };
        *flag = !*flag;
        Some((name, *flag))
    }
}

/// Summary of the miss distances behind the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissStats {
    pub samples: usize,
    /// Rebounds that started below the rim
    pub below_rim: usize,
    /// Sum of squared misses over samples at or above the rim
    pub objective: f64,
    pub mean: f64,
    pub max: f64,
}

impl MissStats {
    fn from_distances(samples: usize, below_rim: usize, distances: &[f64]) -> Self {
        let objective = distances.iter().map(|d| d * d).sum();
        let max = distances.iter().copied().fold(0.0, f64::max);
        let mean = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };
        Self {
            samples,
            below_rim,
            objective,
            mean,
            max,
        }
    }
}

/// Geometry rebuilt on every update
#[derive(Debug, Default)]
struct Scene {
    mesh: Option<SurfaceMesh>,
    wireframe: Option<Polyline>,
    tangents: Option<Polyline>,
    normals: Option<Polyline>,
    shots: Vec<Polyline>,
    bounces: Vec<Polyline>,
    control_points: Option<Polyline>,
    histogram: Option<Polyline>,
    stats: Option<MissStats>,
}

pub struct ProblemVisualization {
    pub layers: Layers,
    pub camera: Camera,
    problem: Problem,
    nu_vis: usize,
    nv_vis: usize,
    /// Never toggled
    rim: Polyline,
    court: Vec<Polyline>,
    scene: Scene,
}

impl ProblemVisualization {
    pub fn new(problem: Problem, nu_vis: usize, nv_vis: usize, layers: Layers) -> Self {
        Self {
            layers,
            camera: Camera::default(),
            problem,
            nu_vis,
            nv_vis,
            rim: Polyline::strip(&rim_loop(RIM_POINTS), colors::RIM),
            court: shapes::court_lines(),
            scene: Scene::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let problem = Problem::new(
            Backboard::new(settings.nx, settings.ny),
            settings.nu_obj,
            settings.nv_obj,
        );
        Self::new(problem, settings.nu_vis, settings.nv_vis, settings.layers)
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Stats of the last update, if any
    pub fn stats(&self) -> Option<&MissStats> {
        self.scene.stats.as_ref()
    }

    /// Returns whether the key was bound to anything
    pub fn handle_key_press(&mut self, key: char) -> bool {
        if let Some((name, on)) = self.layers.toggle(key) {
            log::info!("{name} {}", if on { "shown" } else { "hidden" });
            return true;
        }
        match key {
            'a' => self.camera.rotate(-ROTATE_STEP_DEG, 0.0),
            'd' => self.camera.rotate(ROTATE_STEP_DEG, 0.0),
            'r' => self.camera.rotate(0.0, -ROTATE_STEP_DEG),
            'f' => self.camera.rotate(0.0, ROTATE_STEP_DEG),
            '+' | '=' => self.camera.scroll(-1.0),
            '-' => self.camera.scroll(1.0),
            'j' => self.camera.pan(-PAN_STEP, 0.0),
            'l' => self.camera.pan(PAN_STEP, 0.0),
            'i' => self.camera.pan(0.0, -PAN_STEP),
            'k' => self.camera.pan(0.0, PAN_STEP),
            'u' => self.camera.lift(PAN_STEP),
            'o' => self.camera.lift(-PAN_STEP),
            _ => {
                log::debug!("Unbound key {key:?}");
                return false;
            }
        }
        let focus = self.camera.center();
        log::debug!(
            "Camera focus {{{:.1}, {:.1}, {:.1}}} azimuth {:.0} elevation {:.0} distance {:.2}",
            focus.x,
            focus.y,
            focus.z,
            self.camera.azimuth_deg,
            self.camera.elevation_deg,
            self.camera.distance
        );
        true
    }

    /// Rebuild every layer from a new control grid
    pub fn update(&mut self, control_points: &Grid<DVec3>) {
        let backboard = self.problem.backboard;
        let surface = backboard.interpolate(control_points, self.nu_vis, self.nv_vis);
        let mesh = SurfaceMesh::from_surface(&surface);
        let samples = self.problem.compute_shots(control_points);

        // Drawing tolerates rebounds below the rim; they are counted, not scored.
        let (below, above): (Vec<&Sample>, Vec<&Sample>) =
            samples.iter().partition(|s| s.bounce.lower_than_hoop);
        let distances: Vec<f64> = above
            .iter()
            .map(|s| s.bounce.xy_distance_from_hoop())
            .collect();
        let stats = MissStats::from_distances(samples.len(), below.len(), &distances);
        if stats.below_rim > 0 {
            log::warn!("{} rebounds start below the rim", stats.below_rim);
        }
        log::debug!(
            "Miss objective {:.6} (mean {:.4} m, max {:.4} m)",
            stats.objective,
            stats.mean,
            stats.max
        );

        self.scene = Scene {
            wireframe: Some(mesh.wireframe()),
            mesh: Some(mesh),
            tangents: Some(shapes::tangent_segments(&surface, TANGENT_SCALE)),
            normals: Some(shapes::normal_segments(&surface, NORMAL_LENGTH)),
            shots: shapes::shot_arcs(&samples, ARC_POINTS),
            bounces: shapes::bounce_arcs(&samples, ARC_POINTS),
            control_points: Some(shapes::control_point_cloud(control_points)),
            histogram: Some(shapes::histogram_bars(&distances, HISTOGRAM_BINS)),
            stats: Some(stats),
        };
    }

    /// Polylines of every enabled layer
    pub fn trajectories(&self) -> Vec<Polyline> {
        let layers = &self.layers;
        let scene = &self.scene;
        let mut lines = vec![self.rim.clone()];

        let mut push = |enabled: bool, line: &Option<Polyline>| {
            if let (true, Some(line)) = (enabled, line) {
                lines.push(line.clone());
            }
        };
        push(layers.tangents, &scene.tangents);
        push(layers.normals, &scene.normals);
        push(layers.control_points, &scene.control_points);
        push(layers.histogram, &scene.histogram);
        push(layers.wireframe, &scene.wireframe);

        if layers.court {
            lines.extend(self.court.iter().cloned());
        }
        if layers.axes {
            lines.extend(shapes::axes_lines(self.camera.center(), self.camera.distance));
        }
        if layers.shots {
            lines.extend(scene.shots.iter().cloned());
        }
        if layers.bounces {
            lines.extend(scene.bounces.iter().cloned());
        }
        lines
    }

    /// Push the current frame to a presenter
    pub fn draw(&self, presenter: &mut impl Presenter) {
        if let Some(mesh) = &self.scene.mesh {
            presenter.publish_surface(mesh);
        }
        presenter.publish_trajectories(&self.trajectories());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::shapes::Topology;

    #[derive(Default)]
    struct Recorder {
        meshes: Vec<SurfaceMesh>,
        lines: Vec<Vec<Polyline>>,
    }

    impl Presenter for Recorder {
        fn publish_surface(&mut self, mesh: &SurfaceMesh) {
            self.meshes.push(mesh.clone());
        }

        fn publish_trajectories(&mut self, lines: &[Polyline]) {
            self.lines.push(lines.to_vec());
        }
    }

    fn visualization(layers: Layers) -> ProblemVisualization {
        let problem = Problem::new(Backboard::new(6, 4), 5, 4);
        ProblemVisualization::new(problem, 6, 5, layers)
    }

    fn all_off() -> Layers {
        Layers {
            tangents: false,
            normals: false,
            shots: false,
            bounces: false,
            control_points: false,
            court: false,
            histogram: false,
            wireframe: false,
            axes: false,
        }
    }

    #[test]
    fn test_toggle_keys() {
        let mut layers = Layers::default();
        assert_eq!(layers.toggle('t'), Some(("tangents", true)));
        assert_eq!(layers.toggle('T'), Some(("tangents", false)));
        assert_eq!(layers.toggle('s'), Some(("shots", false)));
        assert_eq!(layers.toggle('x'), Some(("axes", true)));
        assert_eq!(layers.toggle('?'), None);
        assert_eq!(
            layers,
            Layers {
                shots: false,
                axes: true,
                ..Layers::default()
            }
        );
    }

    #[test]
    fn test_draw_before_update_has_only_static_lines() {
        let vis = visualization(Layers::default());
        let mut recorder = Recorder::default();
        vis.draw(&mut recorder);
        assert!(recorder.meshes.is_empty());
        // rim plus court
        assert_eq!(recorder.lines[0].len(), 1 + shapes::court_lines().len());
    }

    #[test]
    fn test_update_builds_every_layer() {
        let mut vis = visualization(Layers::default());
        let cps = vis.problem().backboard.initialize();
        vis.update(&cps);

        let stats = *vis.stats().unwrap();
        assert_eq!(stats.samples, 20 * 3 * 2);
        assert_eq!(stats.below_rim, 0);
        assert!(stats.objective >= 0.0 && stats.max >= stats.mean);

        let mut recorder = Recorder::default();
        vis.draw(&mut recorder);
        let mesh = &recorder.meshes[0];
        assert_eq!((mesh.nu, mesh.nv), (6, 5));

        let lines = &recorder.lines[0];
        let arcs = lines
            .iter()
            .filter(|l| l.color == colors::SHOT || l.color == colors::BOUNCE)
            .count();
        assert_eq!(arcs, 2 * stats.samples);
        assert!(lines.iter().all(|l| l.color != colors::TANGENT));
        assert!(
            lines
                .iter()
                .any(|l| l.topology == Topology::Points && l.points.len() == 24)
        );
    }

    #[test]
    fn test_camera_keys() {
        let mut vis = visualization(all_off());
        let before = vis.camera;
        assert!(vis.handle_key_press('d'));
        assert!(vis.handle_key_press('+'));
        assert_eq!(vis.camera.azimuth_deg, before.azimuth_deg + ROTATE_STEP_DEG);
        assert!(vis.camera.distance < before.distance);
        assert_eq!(vis.layers, all_off());

        assert!(vis.handle_key_press('x'));
        assert_eq!(vis.trajectories().len(), 1 + 3);
    }

    #[test]
    fn test_pan_and_lift_keys_move_focus() {
        let mut vis = visualization(all_off());
        let start = vis.camera.center();

        assert!(vis.handle_key_press('l'));
        let panned = vis.camera.center();
        assert_eq!(panned.z, start.z);
        assert!((panned.truncate() - start.truncate()).length() > 0.0);

        assert!(vis.handle_key_press('j'));
        assert!((vis.camera.center() - start).length() < 1e-5);

        assert!(vis.handle_key_press('u'));
        let lifted = vis.camera.center();
        // up is -z
        assert!(lifted.z < start.z);
        assert!((lifted.truncate() - start.truncate()).length() < 1e-5);
        assert!(vis.handle_key_press('o'));
        assert!((vis.camera.center().z - start.z).abs() < 1e-5);
        assert_eq!(vis.layers, all_off());
    }

    #[test]
    fn test_key_press_changes_output() {
        let mut vis = visualization(all_off());
        let cps = vis.problem().backboard.initialize();
        vis.update(&cps);
        assert_eq!(vis.trajectories().len(), 1);

        assert!(vis.handle_key_press('n'));
        assert!(!vis.handle_key_press('?'));
        let lines = vis.trajectories();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].color, colors::NORMAL);
    }
}
