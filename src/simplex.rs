use crate::Dim;

/// The reference simplex in `dim` dimensions.
///
/// Vertex 0 is the origin, vertex `i > 0` is the `(i-1)`-th unit vector.
/// This vertex order defines the order of the barycentric coordinates
/// and therefore of the linear basis functions.
#[derive(Debug, Clone)]
pub struct RefSimplex {
  /// vertex coordinates in the columns
  vertices: na::DMatrix<f64>,
}
impl RefSimplex {
  pub fn new(dim: Dim) -> Self {
    let mut vertices = na::DMatrix::zeros(dim, dim + 1);
    for d in 0..dim {
      vertices[(d, d + 1)] = 1.0;
    }
    Self { vertices }
  }

  pub fn dim(&self) -> Dim {
    self.vertices.nrows()
  }
  pub fn nvertices(&self) -> usize {
    self.vertices.ncols()
  }
  pub fn vertices(&self) -> &na::DMatrix<f64> {
    &self.vertices
  }
  pub fn vertex(&self, ivertex: usize) -> na::DVectorView<f64> {
    self.vertices.column(ivertex)
  }

  pub fn centroid(&self) -> na::DVector<f64> {
    self.vertices.column_mean()
  }

  /// The barycentric coordinates of the given local points.
  ///
  /// `points` has one point per column; the result has one row per vertex.
  pub fn barycentric_coords(&self, points: &na::DMatrix<f64>) -> na::DMatrix<f64> {
    debug_assert_eq!(points.nrows(), self.dim());
    let npoints = points.ncols();
    let mut bary = na::DMatrix::zeros(self.nvertices(), npoints);
    for (ipoint, point) in points.column_iter().enumerate() {
      bary[(0, ipoint)] = 1.0 - point.sum();
      for d in 0..self.dim() {
        bary[(d + 1, ipoint)] = point[d];
      }
    }
    bary
  }

  /// The constant derivatives of the barycentric coordinate functions.
  ///
  /// Entry `(i, k)` is the derivative of the `i`-th barycentric coordinate
  /// in direction `k`.
  pub fn bary_coord_deriv(&self) -> na::DMatrix<f64> {
    let dim = self.dim();
    let mut deriv = na::DMatrix::zeros(dim + 1, dim);
    for k in 0..dim {
      deriv[(0, k)] = -1.0;
      deriv[(k + 1, k)] = 1.0;
    }
    deriv
  }
}

/// The volume of the reference simplex.
pub fn ref_vol(dim: Dim) -> f64 {
  ((1..=dim).product::<usize>() as f64).recip()
}
