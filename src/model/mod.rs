pub mod geometry;
mod mesh;
mod texture;
mod vertex;

pub use geometry::{chair_vertices, marker_cube_vertices};
pub use mesh::Mesh;
pub use texture::{Texture, TextureImage, PLACEHOLDER_COLOR};
pub use vertex::{ChairVertex, MarkerVertex, VertexLayout};
