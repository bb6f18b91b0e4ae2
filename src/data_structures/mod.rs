//! Engine data structures.
//!
//! - `model` contains the loaded model tree, vertices and GPU meshes
//! - `texture` wraps GPU textures (baked colour map, depth buffer)

pub mod model;
pub mod texture;
