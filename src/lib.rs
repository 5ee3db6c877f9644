//! Reference maps of simplicial meshes.
//!
//! A reference map takes the reference simplex onto an entity of a mesh.
//! [`ReferenceMap`] evaluates these maps, their derivatives, their inverses and
//! the jacobian determinants for all entities and points at once.

extern crate nalgebra as na;

pub mod error;
pub mod jacobian;
pub mod linalg;
pub mod mesh;
pub mod refmap;
pub mod shape;
pub mod simplex;

pub use error::{Error, Result};
pub use jacobian::JacobianKind;
pub use mesh::{Mesh, MeshTopology, VertexCoords};
pub use refmap::{Mask, ReferenceMap};
pub use shape::{LagrangeElement, ShapeElement};

pub type Dim = usize;
