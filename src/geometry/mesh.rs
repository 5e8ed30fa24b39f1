//! Curl mesh for the turning page.
//!
//! An N×N grid of points in normalized [0,1]×[0,1] page space. The mesh is
//! derived state: it is only ever recomputed from progress, direction and
//! stiffness, never edited point by point.
//!
//! Deformation per column:
//! 1. `d` = distance of the column to the leading edge (0 at the edge)
//! 2. `curl = (1 - d)² · (1 - stiffness)`
//! 3. `lift = curl · sin(progress·π)`
//! 4. rows fold toward the page centre line by `lift · FOLD_DEPTH`
//! 5. columns compress toward the spine by `lift · COMPRESSION`
//!
//! This is a visual approximation of paper bending, not a cloth solver.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::state::TurnDirection;

/// Vertical fold strength at full curl
const FOLD_DEPTH: f32 = 0.18;
/// Horizontal compression at full curl
const COMPRESSION: f32 = 0.35;

/// A vertex of the page mesh
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Deformed position in page space
    pub position: [f32; 2],
    /// Undeformed position, used as texture coordinates
    pub uv: [f32; 2],
}

impl MeshVertex {
    fn at_rest(u: f32, v: f32) -> Self {
        Self {
            position: [u, v],
            uv: [u, v],
        }
    }

    pub fn position_vec2(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    pub fn uv_vec2(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }
}

/// Grid mesh describing the curling page
#[derive(Debug, Clone)]
pub struct PageMesh {
    /// Points per side
    resolution: usize,
    /// Row-major vertices (`index = row * resolution + column`)
    pub vertices: Vec<MeshVertex>,
    /// Triangle indices (3 per triangle)
    pub indices: Vec<u32>,
}

impl PageMesh {
    /// Allocate a flat grid with `resolution` points per side (at least 2)
    pub fn new(resolution: usize) -> Self {
        let resolution = resolution.max(2);
        let step = 1.0 / (resolution - 1) as f32;

        let mut vertices = Vec::with_capacity(resolution * resolution);
        for row in 0..resolution {
            for column in 0..resolution {
                vertices.push(MeshVertex::at_rest(column as f32 * step, row as f32 * step));
            }
        }

        let n = resolution as u32;
        let mut indices = Vec::with_capacity((resolution - 1) * (resolution - 1) * 6);
        for row in 0..n - 1 {
            for column in 0..n - 1 {
                let top_left = row * n + column;
                let top_right = top_left + 1;
                let bottom_left = top_left + n;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[top_left, bottom_left, top_right]);
                indices.extend_from_slice(&[top_right, bottom_left, bottom_right]);
            }
        }

        Self {
            resolution,
            vertices,
            indices,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Restore the undeformed grid
    pub fn reset(&mut self) {
        for vertex in &mut self.vertices {
            vertex.position = vertex.uv;
        }
    }

    /// Recompute every point from the turn parameters
    pub fn deform(&mut self, progress: f32, direction: TurnDirection, stiffness: f32) {
        let bend = (progress.clamp(0.0, 1.0) * std::f32::consts::PI).sin();
        let flexibility = 1.0 - stiffness.clamp(0.0, 1.0);

        for vertex in &mut self.vertices {
            let [u, v] = vertex.uv;

            // Forward turns lift the right edge, backward turns the left edge
            let distance_to_edge = match direction {
                TurnDirection::Forward => 1.0 - u,
                TurnDirection::Backward => u,
            };
            let curl = (1.0 - distance_to_edge).powi(2) * flexibility;
            let lift = curl * bend;

            let y = v + (0.5 - v) * lift * FOLD_DEPTH;
            let squeeze = 1.0 - lift * COMPRESSION;
            let x = match direction {
                TurnDirection::Forward => u * squeeze,
                TurnDirection::Backward => 1.0 - (1.0 - u) * squeeze,
            };

            vertex.position = [x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)];
        }
    }

    /// Deformed point at grid coordinates, `None` outside the grid
    pub fn point(&self, column: usize, row: usize) -> Option<Vec2> {
        if column >= self.resolution || row >= self.resolution {
            return None;
        }
        self.vertices
            .get(row * self.resolution + column)
            .map(MeshVertex::position_vec2)
    }

    /// Largest displacement of any point from its rest position
    pub fn curl_amount(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| (v.position_vec2() - v.uv_vec2()).length())
            .fold(0.0, f32::max)
    }

    /// Whether every point sits at its rest position
    pub fn is_flat(&self) -> bool {
        self.curl_amount() < 1e-6
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw vertex bytes (for GPU upload)
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
