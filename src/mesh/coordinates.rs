use super::VertexIdx;
use crate::{
  error::{Error, Result},
  linalg::DMatrixExt as _,
  Dim,
};

#[derive(Debug, Clone)]
pub struct VertexCoords {
  /// The vertex coordinates in the columns of a matrix.
  matrix: na::DMatrix<f64>,
}
impl VertexCoords {
  pub fn new(matrix: na::DMatrix<f64>) -> Self {
    Self { matrix }
  }

  /// Builds the coordinates from a list of points of equal length.
  pub fn from_points<P: AsRef<[f64]>>(points: &[P]) -> Result<Self> {
    let dim = points
      .first()
      .map(|p| p.as_ref().len())
      .ok_or_else(|| Error::InvalidMesh("no vertices given".into()))?;
    if let Some((ivertex, p)) = points
      .iter()
      .enumerate()
      .find(|(_, p)| p.as_ref().len() != dim)
    {
      return Err(Error::InvalidMesh(format!(
        "vertex {ivertex} has {} coordinates, expected {dim}",
        p.as_ref().len()
      )));
    }
    let matrix = na::DMatrix::from_fn(dim, points.len(), |d, v| points[v].as_ref()[d]);
    Ok(Self::new(matrix))
  }

  pub fn dim(&self) -> Dim {
    self.matrix.nrows()
  }
  pub fn nvertices(&self) -> usize {
    self.matrix.ncols()
  }

  pub fn coord(&self, ivertex: VertexIdx) -> na::DVectorView<f64> {
    self.matrix.column(ivertex)
  }
  pub fn coord_mut(&mut self, ivertex: VertexIdx) -> na::DVectorViewMut<f64> {
    self.matrix.column_mut(ivertex)
  }

  pub fn matrix(&self) -> &na::DMatrix<f64> {
    &self.matrix
  }
  pub fn into_matrix(self) -> na::DMatrix<f64> {
    self.matrix
  }

  pub fn coord_simplex(&self, vertices: &[VertexIdx]) -> CoordSimplex {
    let mut vert_coords = na::DMatrix::zeros(self.dim(), vertices.len());
    for (i, &v) in vertices.iter().enumerate() {
      vert_coords.set_column(i, &self.coord(v));
    }
    CoordSimplex::new(vert_coords)
  }

  /// Embeds the coordinates into a higher dimensional space by zero padding.
  pub fn embed_euclidean(mut self, dim: Dim) -> Result<VertexCoords> {
    let old_dim = self.matrix.nrows();
    if dim < old_dim {
      return Err(Error::InvalidMesh(format!(
        "cannot embed {old_dim}-dimensional coordinates into {dim} dimensions"
      )));
    }
    self.matrix = self.matrix.insert_rows(old_dim, dim - old_dim, 0.0);
    Ok(self)
  }
}

/// A simplex given by the coordinates of its vertices.
#[derive(Debug, Clone)]
pub struct CoordSimplex {
  vertices: na::DMatrix<f64>,
}
impl CoordSimplex {
  pub fn new(vertices: na::DMatrix<f64>) -> Self {
    Self { vertices }
  }

  pub fn nvertices(&self) -> usize {
    self.vertices.ncols()
  }
  pub fn dim_intrinsic(&self) -> Dim {
    self.nvertices() - 1
  }
  pub fn dim_embedded(&self) -> Dim {
    self.vertices.nrows()
  }
  pub fn is_euclidean(&self) -> bool {
    self.dim_intrinsic() == self.dim_embedded()
  }

  pub fn base_vertex(&self) -> na::DVectorView<f64> {
    self.vertices.column(0)
  }

  /// The edge vectors emanating from the base vertex, in the columns.
  ///
  /// This is the (constant) jacobian of the affine reference map.
  pub fn spanning_vectors(&self) -> na::DMatrix<f64> {
    let mut mat = na::DMatrix::zeros(self.dim_embedded(), self.dim_intrinsic());
    let v0 = self.vertices.column(0);
    for (i, vi) in self.vertices.column_iter().skip(1).enumerate() {
      let v0i = vi - v0;
      mat.set_column(i, &v0i);
    }
    mat
  }

  /// Signed volume factor for euclidean simplicies, unsigned otherwise.
  pub fn det(&self) -> f64 {
    if self.is_euclidean() {
      self.spanning_vectors().determinant()
    } else {
      self.spanning_vectors().gram_det_sqrt()
    }
  }
  pub fn vol(&self) -> f64 {
    crate::simplex::ref_vol(self.dim_intrinsic()) * self.det().abs()
  }
}
