//! Seams between the scene builder and whatever draws it or feeds it keys

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use super::shapes::{Polyline, SurfaceMesh};
use super::vertex::{LineVertex, MeshVertex};

/// Receives the geometry of one frame
pub trait Presenter {
    fn publish_surface(&mut self, mesh: &SurfaceMesh);
    fn publish_trajectories(&mut self, lines: &[Polyline]);
}

/// Non-blocking source of key presses
pub trait KeySource {
    fn poll_keypress(&mut self) -> Option<char>;
}

/// Keys delivered over a channel from an input thread
#[derive(Debug)]
pub struct ChannelKeys {
    rx: Receiver<char>,
    closed: bool,
}

impl ChannelKeys {
    pub fn new() -> (Sender<char>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx, closed: false })
    }

    /// Every sender is gone and no keys are queued
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl KeySource for ChannelKeys {
    fn poll_keypress(&mut self) -> Option<char> {
        match self.rx.try_recv() {
            Ok(key) => Some(key),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }
}

/// Headless presenter: builds the vertex buffers a GPU backend would upload
/// and logs their sizes
#[derive(Debug, Default)]
pub struct LogPresenter {
    frames: u64,
    triangles: usize,
    mesh_bytes: u64,
    line_bytes: u64,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Vertex and index bytes of the last published frame
    pub fn frame_bytes(&self) -> u64 {
        self.mesh_bytes + self.line_bytes
    }
}

impl Presenter for LogPresenter {
    fn publish_surface(&mut self, mesh: &SurfaceMesh) {
        self.frames += 1;
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&mesh.vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(&mesh.indices);
        debug_assert_eq!(
            vertex_bytes.len() as u64,
            mesh.vertices.len() as u64 * MeshVertex::desc().array_stride
        );
        self.mesh_bytes = (vertex_bytes.len() + index_bytes.len()) as u64;

        if mesh.triangle_count() != self.triangles {
            log::debug!(
                "Backboard mesh {}x{} ({} triangles, {} bytes)",
                mesh.nu,
                mesh.nv,
                mesh.triangle_count(),
                self.mesh_bytes
            );
            self.triangles = mesh.triangle_count();
        }
    }

    fn publish_trajectories(&mut self, lines: &[Polyline]) {
        let vertices: Vec<LineVertex> = lines.iter().flat_map(|l| l.vertices()).collect();
        let bytes = vertices.len() as u64 * LineVertex::desc().array_stride;
        debug_assert_eq!(bytemuck::cast_slice::<_, u8>(&vertices).len() as u64, bytes);

        if bytes != self.line_bytes {
            log::debug!(
                "{} polylines, {} vertices ({bytes} bytes)",
                lines.len(),
                vertices.len()
            );
            self.line_bytes = bytes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_keys_drain_then_close() {
        let (tx, mut keys) = ChannelKeys::new();
        tx.send('t').unwrap();
        tx.send('n').unwrap();
        assert_eq!(keys.poll_keypress(), Some('t'));
        assert_eq!(keys.poll_keypress(), Some('n'));
        assert_eq!(keys.poll_keypress(), None);
        assert!(!keys.is_closed());

        drop(tx);
        assert_eq!(keys.poll_keypress(), None);
        assert!(keys.is_closed());
    }

    #[test]
    fn test_log_presenter_sizes_vertex_buffers() {
        use crate::renderer::shapes::Topology;
        use glam::Vec3;

        let mut presenter = LogPresenter::new();
        let lines = [
            Polyline::new(vec![Vec3::ZERO, Vec3::X], [1.0; 4], Topology::Strip),
            Polyline::new(vec![Vec3::Y; 3], [0.5; 4], Topology::Points),
        ];
        presenter.publish_trajectories(&lines);
        assert_eq!(presenter.frame_bytes(), 5 * 28);

        let mesh = SurfaceMesh {
            nu: 2,
            nv: 2,
            vertices: vec![
                MeshVertex {
                    position: [0.0; 3],
                    normal: [0.0; 3],
                    uv: [0.0; 2],
                };
                4
            ],
            indices: vec![0, 1, 2, 2, 1, 3],
        };
        presenter.publish_surface(&mesh);
        assert_eq!(presenter.frames(), 1);
        assert_eq!(presenter.frame_bytes(), 4 * 32 + 6 * 4 + 5 * 28);
    }
}
