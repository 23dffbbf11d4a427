//! Vertex types for 3D line and mesh rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Line/point vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Surface mesh vertex
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    /// Zero where the surface normal is undefined
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: (2 * std::mem::size_of::<[f32; 3]>()) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Colors for scene elements
pub mod colors {
    pub const TANGENT: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
    pub const NORMAL: [f32; 4] = [0.4, 0.4, 0.6, 1.0];
    pub const SHOT: [f32; 4] = [0.1, 0.6, 0.2, 1.0];
    pub const BOUNCE: [f32; 4] = [0.1, 0.2, 0.7, 1.0];
    pub const CONTROL_POINT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const RIM: [f32; 4] = [1.0, 0.45, 0.1, 1.0];
    pub const COURT: [f32; 4] = [0.9, 0.9, 0.85, 1.0];
    pub const HISTOGRAM: [f32; 4] = [0.95, 0.8, 0.2, 1.0];
    pub const WIREFRAME: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts_match_struct_sizes() {
        assert_eq!(LineVertex::desc().array_stride, 28);
        assert_eq!(MeshVertex::desc().array_stride, 32);
        let last = MeshVertex::desc().attributes[2];
        assert_eq!(last.offset, 24);
    }
}
