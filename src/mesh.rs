//! A simplicial mesh: vertex coordinates (geometry) plus the entities of every
//! topological dimension (topology).
//!
//! Vertex indices are 0-based throughout. Cell tables using 1-based vertex
//! numbering are translated once, in [`Mesh::from_one_based`].

pub mod coordinates;
pub mod topology;

pub use coordinates::{CoordSimplex, VertexCoords};
pub use topology::MeshTopology;

use crate::{
  error::{Error, Result},
  Dim,
};

pub type VertexIdx = usize;
pub type CellIdx = usize;
pub type SimplexVertices = Vec<VertexIdx>;

#[derive(Debug, Clone)]
pub struct Mesh {
  coords: VertexCoords,
  topology: MeshTopology,
}

// constructors
impl Mesh {
  pub fn new(coords: VertexCoords, cells: Vec<SimplexVertices>) -> Result<Self> {
    let topology = MeshTopology::new(coords.nvertices(), cells)?;
    if topology.dim() > coords.dim() {
      return Err(Error::InvalidMesh(format!(
        "{}-dimensional cells cannot live in {}-dimensional space",
        topology.dim(),
        coords.dim()
      )));
    }
    Ok(Self { coords, topology })
  }

  /// Builds a mesh from a cell table with 1-based vertex numbering.
  pub fn from_one_based(coords: VertexCoords, cells: Vec<SimplexVertices>) -> Result<Self> {
    let cells = cells
      .into_iter()
      .enumerate()
      .map(|(icell, cell)| {
        cell
          .into_iter()
          .map(|v| {
            v.checked_sub(1).ok_or_else(|| {
              Error::InvalidMesh(format!("cell {icell} uses vertex 0 in 1-based numbering"))
            })
          })
          .collect::<Result<SimplexVertices>>()
      })
      .collect::<Result<Vec<_>>>()?;
    Self::new(coords, cells)
  }
}

// getters
impl Mesh {
  /// The dimension of the embedding space.
  pub fn dim(&self) -> Dim {
    self.coords.dim()
  }
  /// The dimension of the cells.
  pub fn dim_intrinsic(&self) -> Dim {
    self.topology.dim()
  }
  pub fn nvertices(&self) -> usize {
    self.coords.nvertices()
  }
  pub fn ncells(&self) -> usize {
    self.topology.ncells()
  }

  pub fn coords(&self) -> &VertexCoords {
    &self.coords
  }
  pub fn topology(&self) -> &MeshTopology {
    &self.topology
  }

  pub fn entities(&self, dim: Dim) -> Result<&[SimplexVertices]> {
    self.topology.entities(dim)
  }

  pub fn entity_simplex(&self, dim: Dim, ientity: usize) -> Result<CoordSimplex> {
    let entities = self.entities(dim)?;
    let entity = entities.get(ientity).ok_or(Error::EntityOutOfRange {
      entity: ientity,
      nentities: entities.len(),
    })?;
    Ok(self.coords.coord_simplex(entity))
  }
}

// geometry updates
impl Mesh {
  /// Mutable access to the position of a single vertex.
  pub fn coord_mut(&mut self, ivertex: VertexIdx) -> Result<na::DVectorViewMut<f64>> {
    let nvertices = self.nvertices();
    if ivertex >= nvertices {
      return Err(Error::EntityOutOfRange {
        entity: ivertex,
        nentities: nvertices,
      });
    }
    Ok(self.coords.coord_mut(ivertex))
  }

  /// Replaces all vertex positions, keeping the topology.
  ///
  /// The new coordinates must have the same dimension and vertex count.
  pub fn set_coords(&mut self, coords: VertexCoords) -> Result<()> {
    if (coords.dim(), coords.nvertices()) != (self.dim(), self.nvertices()) {
      return Err(Error::InvalidMesh(format!(
        "expected {} vertices in {} dimensions, got {} in {}",
        self.nvertices(),
        self.dim(),
        coords.nvertices(),
        coords.dim()
      )));
    }
    self.coords = coords;
    Ok(())
  }
}
