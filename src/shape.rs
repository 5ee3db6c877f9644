//! Shape elements: basis functions on the reference simplex that define the
//! reference maps.

pub mod lagrange;

pub use lagrange::LagrangeElement;

use crate::{error::Result, Dim};

use ndarray::ArrayD;

/// A set of basis functions on reference simplicies of dimension up to [`Self::dim`].
pub trait ShapeElement {
  /// Maximal dimension of the reference domain.
  fn dim(&self) -> Dim;

  /// Polynomial order of the basis functions.
  fn order(&self) -> usize;

  /// Number of basis functions on the `dim`-dimensional reference simplex.
  fn nbasis(&self, dim: Dim) -> usize;

  /// Evaluates the basis functions or their derivatives of order `deriv`.
  ///
  /// `points` holds one local point per column. The dimension of the points
  /// selects the reference simplex. With `B` basis functions, `P` points and
  /// local dimension `d` the result has shape `B x P`, `B x P x d` or
  /// `B x P x d x d` for `deriv` equal to 0, 1 or 2.
  fn eval_basis(&self, points: &na::DMatrix<f64>, deriv: usize) -> Result<ArrayD<f64>>;
}
