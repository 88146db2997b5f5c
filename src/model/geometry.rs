//! Static geometry for the chair and the light markers.
//!
//! Both meshes are built from axis-aligned boxes. Every visible box side is
//! emitted as two independent triangles (6 vertices, no index buffer).

use glam::Vec3;

use super::vertex::{ChairVertex, MarkerVertex};

pub const VERTICES_PER_QUAD: usize = 6;
pub const CHAIR_VERTEX_COUNT: usize = 27 * VERTICES_PER_QUAD;
pub const MARKER_VERTEX_COUNT: usize = 6 * VERTICES_PER_QUAD;

/// One side of an axis-aligned box, named by its outward normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosZ,
        Face::PosX,
        Face::NegZ,
        Face::NegX,
        Face::PosY,
        Face::NegY,
    ];

    /// Side faces only (no top, no bottom).
    pub const SIDES: [Face; 4] = [Face::PosZ, Face::NegZ, Face::PosX, Face::NegX];

    pub fn normal(self) -> Vec3 {
        match self {
            Face::PosX => Vec3::X,
            Face::NegX => Vec3::NEG_X,
            Face::PosY => Vec3::Y,
            Face::NegY => Vec3::NEG_Y,
            Face::PosZ => Vec3::Z,
            Face::NegZ => Vec3::NEG_Z,
        }
    }
}

// Texture coordinates of the quad corners in emission order.
const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
// Two triangles over the four corners: 0-1-2, 2-3-0.
const QUAD_ORDER: [usize; VERTICES_PER_QUAD] = [0, 1, 2, 2, 3, 0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    pub min: Vec3,
    pub max: Vec3,
}

impl Cuboid {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Corners of `face`, counter-clockwise when viewed from outside.
    pub fn face_corners(&self, face: Face) -> [Vec3; 4] {
        let (lo, hi) = (self.min, self.max);
        match face {
            Face::PosZ => [
                Vec3::new(lo.x, lo.y, hi.z),
                Vec3::new(hi.x, lo.y, hi.z),
                Vec3::new(hi.x, hi.y, hi.z),
                Vec3::new(lo.x, hi.y, hi.z),
            ],
            Face::NegZ => [
                Vec3::new(hi.x, lo.y, lo.z),
                Vec3::new(lo.x, lo.y, lo.z),
                Vec3::new(lo.x, hi.y, lo.z),
                Vec3::new(hi.x, hi.y, lo.z),
            ],
            Face::PosX => [
                Vec3::new(hi.x, lo.y, hi.z),
                Vec3::new(hi.x, lo.y, lo.z),
                Vec3::new(hi.x, hi.y, lo.z),
                Vec3::new(hi.x, hi.y, hi.z),
            ],
            Face::NegX => [
                Vec3::new(lo.x, lo.y, lo.z),
                Vec3::new(lo.x, lo.y, hi.z),
                Vec3::new(lo.x, hi.y, hi.z),
                Vec3::new(lo.x, hi.y, lo.z),
            ],
            Face::PosY => [
                Vec3::new(lo.x, hi.y, hi.z),
                Vec3::new(hi.x, hi.y, hi.z),
                Vec3::new(hi.x, hi.y, lo.z),
                Vec3::new(lo.x, hi.y, lo.z),
            ],
            Face::NegY => [
                Vec3::new(lo.x, lo.y, lo.z),
                Vec3::new(hi.x, lo.y, lo.z),
                Vec3::new(hi.x, lo.y, hi.z),
                Vec3::new(lo.x, lo.y, hi.z),
            ],
        }
    }

    fn push_chair_faces(&self, faces: &[Face], out: &mut Vec<ChairVertex>) {
        for &face in faces {
            let corners = self.face_corners(face);
            let normal = face.normal().to_array();
            out.extend(QUAD_ORDER.iter().map(|&i| ChairVertex {
                position: corners[i].to_array(),
                normal,
                tex_coords: QUAD_UVS[i],
            }));
        }
    }

    fn push_marker_faces(&self, faces: &[Face], out: &mut Vec<MarkerVertex>) {
        for &face in faces {
            let corners = self.face_corners(face);
            out.extend(QUAD_ORDER.iter().map(|&i| MarkerVertex {
                position: corners[i].to_array(),
            }));
        }
    }
}

pub const SEAT: Cuboid = Cuboid::new(Vec3::new(-2.0, -0.2, -2.0), Vec3::new(2.0, 0.2, 2.0));
pub const BACK_REST: Cuboid = Cuboid::new(Vec3::new(-1.8, 0.2, -2.0), Vec3::new(1.8, 3.5, -1.8));
pub const LEGS: [Cuboid; 4] = [
    // front right
    Cuboid::new(Vec3::new(1.4, -3.0, 1.2), Vec3::new(1.8, -0.2, 1.6)),
    // front left
    Cuboid::new(Vec3::new(-1.8, -3.0, 1.2), Vec3::new(-1.4, -0.2, 1.6)),
    // back right
    Cuboid::new(Vec3::new(1.4, -3.0, -1.6), Vec3::new(1.8, -0.2, -1.2)),
    // back left
    Cuboid::new(Vec3::new(-1.8, -3.0, -1.6), Vec3::new(-1.4, -0.2, -1.2)),
];

/// Seat, back rest (its bottom sits on the seat) and four legs.
pub fn chair_vertices() -> Vec<ChairVertex> {
    let mut vertices = Vec::with_capacity(CHAIR_VERTEX_COUNT);
    SEAT.push_chair_faces(&Face::ALL, &mut vertices);
    BACK_REST.push_chair_faces(
        &[Face::PosZ, Face::NegZ, Face::NegX, Face::PosX, Face::PosY],
        &mut vertices,
    );
    for leg in &LEGS {
        leg.push_chair_faces(&Face::SIDES, &mut vertices);
    }
    vertices
}

/// Unit cube centered at the origin.
pub fn marker_cube_vertices() -> Vec<MarkerVertex> {
    let cube = Cuboid::new(Vec3::splat(-0.5), Vec3::splat(0.5));
    let mut vertices = Vec::with_capacity(MARKER_VERTEX_COUNT);
    cube.push_marker_faces(&Face::ALL, &mut vertices);
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_chair_vertex_count() {
        let vertices = chair_vertices();
        assert_eq!(vertices.len(), 162);
        assert_eq!(vertices.len(), CHAIR_VERTEX_COUNT);
    }

    #[test]
    fn test_chair_normals_are_axis_aligned_units() {
        for (i, v) in chair_vertices().iter().enumerate() {
            let n = Vec3::from_array(v.normal);
            assert_relative_eq!(n.length(), 1.0, epsilon = 1e-6);
            let non_zero = v.normal.iter().filter(|c| **c != 0.0).count();
            assert_eq!(non_zero, 1, "vertex {} has normal {:?}", i, v.normal);
        }
    }

    #[test]
    fn test_face_normals_point_outward() {
        for face in Face::ALL {
            let cube = Cuboid::new(Vec3::splat(-1.0), Vec3::splat(1.0));
            let corners = cube.face_corners(face);
            let winding = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
            assert!(
                winding.normalize().abs_diff_eq(face.normal(), 1e-6),
                "{:?} winds towards {:?}",
                face,
                winding
            );
            for corner in corners {
                assert_relative_eq!(corner.dot(face.normal()), 1.0);
            }
        }
    }

    #[test]
    fn test_chair_texture_coordinates_per_quad() {
        let vertices = chair_vertices();
        for quad in vertices.chunks(VERTICES_PER_QUAD) {
            let uvs: Vec<[f32; 2]> = quad.iter().map(|v| v.tex_coords).collect();
            assert_eq!(
                uvs,
                vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]
            );
        }
    }

    #[test]
    fn test_chair_bounds() {
        let vertices = chair_vertices();
        let (min, max) = vertices.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), v| {
                let p = Vec3::from_array(v.position);
                (min.min(p), max.max(p))
            },
        );
        assert_eq!(min, Vec3::new(-2.0, -3.0, -2.0));
        assert_eq!(max, Vec3::new(2.0, 3.5, 2.0));
    }

    #[test]
    fn test_marker_cube() {
        let vertices = marker_cube_vertices();
        assert_eq!(vertices.len(), 36);

        let mut sum = Vec3::ZERO;
        for v in &vertices {
            for c in v.position {
                assert_eq!(c.abs(), 0.5);
            }
            sum += Vec3::from_array(v.position);
        }
        // Symmetric about the origin.
        assert!(sum.abs_diff_eq(Vec3::ZERO, 1e-6));
    }
}
