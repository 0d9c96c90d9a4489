//! CPU-side mesh representation and flat-normal derivation.
//!
//! Meshes stay non-indexed: every triangle contributes three vertices and
//! three copies of its face normal, giving faceted shading without a
//! smoothing pass.

mod stl;

use glam::Vec3;
pub use stl::{load_stl, parse_stl};

/// One mesh face as three corner points in counter-clockwise winding.
pub type Triangle = [Vec3; 3];

/// Non-indexed triangle mesh with one flat normal per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Corner positions, three per triangle.
    pub positions: Vec<Vec3>,
    /// Face normals replicated so `normals[i]` pairs with `positions[i]`.
    pub normals: Vec<Vec3>,
}

impl Mesh {
    /// Build a mesh from a triangle list, deriving one flat normal per face.
    #[must_use]
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let mut positions = Vec::with_capacity(triangles.len() * 3);
        let mut normals = Vec::with_capacity(triangles.len() * 3);
        for tri in triangles {
            let normal = face_normal(tri);
            positions.extend_from_slice(tri);
            normals.extend([normal; 3]);
        }
        Self { positions, normals }
    }

    /// Number of vertices (three per triangle).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Positions packed as arrays for vertex upload.
    #[must_use]
    pub fn position_data(&self) -> Vec<[f32; 3]> {
        self.positions.iter().map(|p| p.to_array()).collect()
    }

    /// Normals packed as arrays for vertex upload.
    #[must_use]
    pub fn normal_data(&self) -> Vec<[f32; 3]> {
        self.normals.iter().map(|n| n.to_array()).collect()
    }
}

/// Unit normal of a face via the cross product of its first two edges
/// (`p1 - p0` then `p2 - p0`, right-hand rule).
///
/// Zero-area triangles yield a zero vector, which shades black rather than
/// poisoning downstream math with NaN.
#[must_use]
pub fn face_normal(tri: &Triangle) -> Vec3 {
    (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_right_triangle_normal_points_up() {
        let tri = [Vec3::ZERO, Vec3::X, Vec3::Y];
        assert_eq!(face_normal(&tri), Vec3::Z);
    }

    #[test]
    fn winding_flips_normal_sign() {
        let tri = [Vec3::ZERO, Vec3::Y, Vec3::X];
        assert_eq!(face_normal(&tri), -Vec3::Z);
    }

    #[test]
    fn face_normals_are_unit_length() {
        let tri = [
            Vec3::new(0.3, -1.2, 4.0),
            Vec3::new(2.0, 0.5, -0.7),
            Vec3::new(-1.0, 3.0, 1.5),
        ];
        let n = face_normal(&tri);
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_triangle_yields_zero_normal() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(face_normal(&[p, p, p]), Vec3::ZERO);
        // Collinear points also have zero area.
        let tri = [Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        assert_eq!(face_normal(&tri), Vec3::ZERO);
    }

    #[test]
    fn normals_replicate_per_corner() {
        let triangles = vec![
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            [Vec3::ZERO, Vec3::Y, Vec3::Z],
        ];
        let mesh = Mesh::from_triangles(&triangles);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.normals.len(), 6);
        for tri in mesh.normals.chunks_exact(3) {
            assert_eq!(tri[0], tri[1]);
            assert_eq!(tri[1], tri[2]);
        }
        assert_eq!(mesh.normals[0], Vec3::Z);
        assert_eq!(mesh.normals[3], Vec3::X);
    }

    #[test]
    fn packed_data_matches_vectors() {
        let mesh = Mesh::from_triangles(&[[Vec3::ZERO, Vec3::X, Vec3::Y]]);
        assert_eq!(mesh.position_data()[1], [1.0, 0.0, 0.0]);
        assert_eq!(mesh.normal_data()[0], [0.0, 0.0, 1.0]);
    }
}
