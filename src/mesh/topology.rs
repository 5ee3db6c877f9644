use super::{SimplexVertices, VertexIdx};
use crate::{
  error::{Error, Result},
  Dim,
};

use indexmap::IndexSet;
use itertools::Itertools as _;

/// The entities of a simplicial mesh, grouped by topological dimension.
///
/// The cells are kept in the given vertex order, since this order defines the
/// orientation of their reference maps. All other entities are stored with
/// ascending vertex indices and are ordered lexicographically.
#[derive(Debug, Clone)]
pub struct MeshTopology {
  /// `skeletons[d]` contains all `d`-dimensional entities.
  skeletons: Vec<Vec<SimplexVertices>>,
}
impl MeshTopology {
  pub fn new(nvertices: usize, cells: Vec<SimplexVertices>) -> Result<Self> {
    let cell_nvertices = cells
      .first()
      .map(|c| c.len())
      .ok_or_else(|| Error::InvalidMesh("no cells given".into()))?;
    // skeleton 0 is always the full vertex list, so cells are at least edges
    if cell_nvertices < 2 {
      return Err(Error::InvalidMesh(format!(
        "cells need at least 2 vertices, got {cell_nvertices}"
      )));
    }
    for (icell, cell) in cells.iter().enumerate() {
      if cell.len() != cell_nvertices {
        return Err(Error::InvalidMesh(format!(
          "cell {icell} has {} vertices, expected {cell_nvertices}",
          cell.len()
        )));
      }
      if let Some(&v) = cell.iter().find(|&&v| v >= nvertices) {
        return Err(Error::InvalidMesh(format!(
          "cell {icell} references vertex {v}, but there are only {nvertices} vertices"
        )));
      }
      if !cell.iter().all_unique() {
        return Err(Error::InvalidMesh(format!(
          "cell {icell} has repeated vertices"
        )));
      }
    }

    let dim = cell_nvertices - 1;
    let mut skeletons = Vec::with_capacity(dim + 1);
    skeletons.push((0..nvertices).map(|v| vec![v]).collect());
    for sub_dim in 1..dim {
      let mut subs: IndexSet<SimplexVertices> = cells
        .iter()
        .flat_map(|cell| cell.iter().copied().sorted().combinations(sub_dim + 1))
        .collect();
      subs.sort();
      skeletons.push(subs.into_iter().collect());
    }
    skeletons.push(cells);

    Ok(Self { skeletons })
  }

  /// The dimension of the cells.
  pub fn dim(&self) -> Dim {
    self.skeletons.len() - 1
  }
  pub fn nvertices(&self) -> usize {
    self.skeletons[0].len()
  }
  pub fn ncells(&self) -> usize {
    self.cells().len()
  }
  pub fn cells(&self) -> &[SimplexVertices] {
    &self.skeletons[self.dim()]
  }

  /// All entities of topological dimension `dim` as vertex tuples.
  pub fn entities(&self, dim: Dim) -> Result<&[SimplexVertices]> {
    self
      .skeletons
      .get(dim)
      .map(|s| s.as_slice())
      .ok_or(Error::EntityDimension {
        dim,
        dim_intrinsic: self.dim(),
      })
  }

  pub fn nentities(&self, dim: Dim) -> Result<usize> {
    self.entities(dim).map(|e| e.len())
  }

  /// The index of the entity with exactly these vertices, in any order.
  pub fn entity_index(&self, vertices: &[VertexIdx]) -> Option<usize> {
    let dim = vertices.len().checked_sub(1)?;
    let skeleton = self.skeletons.get(dim)?;
    if dim == self.dim() {
      let sorted = vertices.iter().sorted().collect_vec();
      skeleton
        .iter()
        .position(|cell| cell.iter().sorted().collect_vec() == sorted)
    } else {
      let sorted = vertices.iter().copied().sorted().collect_vec();
      skeleton.binary_search(&sorted).ok()
    }
  }
}
