//! I/O for mesh descriptions

mod mesh;

pub use mesh::{read_mesh, write_mesh, MeshDocument, MeshLayout};
