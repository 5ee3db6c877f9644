//! Batched determinants and inverses of reference map jacobians.
//!
//! Jacobian tensors have shape `nentities x npoints x dim_embedded x dim_intrinsic`.
//! Which closed form applies is decided once per tensor by [`JacobianKind`].

use crate::{
  error::{Error, Result},
  linalg::{matrix_block, DMatrixExt as _},
  Dim,
};

use ndarray::{Array2, Array4, ArrayView4};
use tracing::warn;

/// The shape class of a jacobian block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JacobianKind {
  /// `D x D`: an entity of full dimension.
  Square(Dim),
  /// `D x 1` with `D > 1`: a curve embedded in `D`-dimensional space.
  ///
  /// The volume factor is the tangent norm, for space curves (`D = 3`) too.
  /// Curves in `D >= 4` are classified but have no supported determinant.
  Curve(Dim),
  /// `3 x 2`: a surface embedded in 3-dimensional space.
  Surface,
}
impl JacobianKind {
  /// Classifies jacobians of entities of dimension `dim_intrinsic`
  /// embedded in `dim_embedded`-dimensional space.
  pub fn classify(dim_embedded: Dim, dim_intrinsic: Dim) -> Option<Self> {
    match (dim_embedded, dim_intrinsic) {
      (_, 0) => None,
      (d, n) if d == n => Some(Self::Square(d)),
      (d, 1) => Some(Self::Curve(d)),
      (3, 2) => Some(Self::Surface),
      _ => None,
    }
  }

  pub fn nrows(self) -> usize {
    match self {
      Self::Square(d) | Self::Curve(d) => d,
      Self::Surface => 3,
    }
  }
  pub fn ncols(self) -> usize {
    match self {
      Self::Square(d) => d,
      Self::Curve(_) => 1,
      Self::Surface => 2,
    }
  }

  /// The volume factor of a single jacobian block.
  ///
  /// This is the determinant for square jacobians and the square root of the
  /// gram determinant otherwise.
  fn volume_factor(self, jac: &na::DMatrix<f64>) -> Option<f64> {
    match self {
      Self::Square(1..=3) => Some(jac.determinant()),
      Self::Curve(2..=3) => Some(jac.column(0).norm()),
      Self::Surface => {
        let t0 = na::Vector3::new(jac[(0, 0)], jac[(1, 0)], jac[(2, 0)]);
        let t1 = na::Vector3::new(jac[(0, 1)], jac[(1, 1)], jac[(2, 1)]);
        Some(t0.cross(&t1).norm())
      }
      _ => None,
    }
  }

  fn check_shape(self, jacs: &ArrayView4<f64>, operation: &'static str) -> Result<()> {
    let (_, _, nrows, ncols) = jacs.dim();
    if (nrows, ncols) != (self.nrows(), self.ncols()) {
      return Err(Error::UnsupportedJacobianShape {
        nrows,
        ncols,
        operation,
      });
    }
    Ok(())
  }

  fn unsupported(self, operation: &'static str) -> Error {
    Error::UnsupportedJacobianShape {
      nrows: self.nrows(),
      ncols: self.ncols(),
      operation,
    }
  }

  /// The volume factors of all blocks, of shape `nentities x npoints`.
  pub fn determinants(self, jacs: ArrayView4<f64>) -> Result<Array2<f64>> {
    self.check_shape(&jacs, "determinant")?;
    if !matches!(self, Self::Square(1..=3) | Self::Curve(2..=3) | Self::Surface) {
      return Err(self.unsupported("determinant"));
    }

    let (nentities, npoints, _, _) = jacs.dim();
    let mut dets = Array2::zeros((nentities, npoints));
    for ((ientity, ipoint), det) in dets.indexed_iter_mut() {
      let jac = matrix_block(&jacs, ientity, ipoint);
      let vol = self
        .volume_factor(&jac)
        .ok_or_else(|| self.unsupported("determinant"))?;
      if jac.is_degenerate_volume(vol) {
        warn!("degenerate jacobian in entity {ientity} at point {ipoint}");
        return Err(Error::NumericalSingularity {
          entity: ientity,
          point: ipoint,
        });
      }
      *det = vol;
    }
    Ok(dets)
  }

  /// The inverses of all blocks, of shape `nentities x npoints x D x D`.
  ///
  /// Only square jacobians are inverted. No pseudo-inverse is provided for
  /// curves and surfaces.
  pub fn inverses(self, jacs: ArrayView4<f64>) -> Result<Array4<f64>> {
    self.check_shape(&jacs, "inverse")?;
    let n = match self {
      Self::Square(n @ 1..=3) => n,
      _ => return Err(self.unsupported("inverse")),
    };

    let (nentities, npoints, _, _) = jacs.dim();
    let mut invs = Array4::zeros((nentities, npoints, n, n));
    for ientity in 0..nentities {
      for ipoint in 0..npoints {
        let jac = matrix_block(&jacs, ientity, ipoint);
        let Some(inv) = jac.try_inverse_regular() else {
          warn!("singular jacobian in entity {ientity} at point {ipoint}");
          return Err(Error::NumericalSingularity {
            entity: ientity,
            point: ipoint,
          });
        };
        for i in 0..n {
          for j in 0..n {
            invs[[ientity, ipoint, i, j]] = inv[(i, j)];
          }
        }
      }
    }
    Ok(invs)
  }
}

fn classify_tensor(jacs: &ArrayView4<f64>, operation: &'static str) -> Result<JacobianKind> {
  let (_, _, nrows, ncols) = jacs.dim();
  JacobianKind::classify(nrows, ncols).ok_or(Error::UnsupportedJacobianShape {
    nrows,
    ncols,
    operation,
  })
}

/// Volume factors of a jacobian tensor, classified by its trailing shape.
pub fn determinants(jacs: ArrayView4<f64>) -> Result<Array2<f64>> {
  classify_tensor(&jacs, "determinant")?.determinants(jacs)
}

/// Inverses of a jacobian tensor, classified by its trailing shape.
pub fn inverses(jacs: ArrayView4<f64>) -> Result<Array4<f64>> {
  classify_tensor(&jacs, "inverse")?.inverses(jacs)
}
