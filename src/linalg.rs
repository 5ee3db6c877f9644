use ndarray::ArrayView4;

/// Relative threshold below which a volume factor counts as degenerate.
///
/// The volume spanned by the columns of a matrix is compared against the
/// product of the column norms (Hadamard's bound), so the test does not depend
/// on the scale of the mesh.
pub const SINGULARITY_TOLERANCE: f64 = 1e-12;

pub trait DMatrixExt: Sized {
  fn gramian(&self) -> Self;
  fn gram_det(&self) -> f64;
  fn gram_det_sqrt(&self) -> f64;
  fn column_norm_product(&self) -> f64;
  fn is_degenerate_volume(&self, vol: f64) -> bool;
  fn try_inverse_regular(&self) -> Option<Self>;
}
impl DMatrixExt for na::DMatrix<f64> {
  fn gramian(&self) -> Self {
    self.transpose() * self
  }
  fn gram_det(&self) -> f64 {
    self.gramian().determinant()
  }
  fn gram_det_sqrt(&self) -> f64 {
    self.gram_det().sqrt()
  }

  fn column_norm_product(&self) -> f64 {
    self.column_iter().map(|c| c.norm()).product()
  }

  /// Also true for non-finite volumes.
  fn is_degenerate_volume(&self, vol: f64) -> bool {
    let vol = vol.abs();
    !vol.is_finite() || vol <= SINGULARITY_TOLERANCE * self.column_norm_product()
  }

  /// Inverse of a square matrix, [`None`] if it is (numerically) singular.
  fn try_inverse_regular(&self) -> Option<Self> {
    if !self.is_square() || self.is_degenerate_volume(self.determinant()) {
      return None;
    }
    self.clone().try_inverse()
  }
}

/// Copies the `(ientity, ipoint)` block of a batched matrix tensor.
pub fn matrix_block(tensor: &ArrayView4<f64>, ientity: usize, ipoint: usize) -> na::DMatrix<f64> {
  let (_, _, nrows, ncols) = tensor.dim();
  na::DMatrix::from_fn(nrows, ncols, |i, j| tensor[[ientity, ipoint, i, j]])
}

pub fn assert_mat_eq(a: &na::DMatrix<f64>, b: &na::DMatrix<f64>) {
  const TOL: f64 = 10e-12;
  let diff = a - b;
  let error = diff.norm();
  let equal = error <= TOL;
  if !equal {
    println!("Matrix a={a:.3}");
    println!("Matrix b={b:.3}");
    println!("a-b={diff:.3}");
    panic!("Matrices not equal.");
  }
}
