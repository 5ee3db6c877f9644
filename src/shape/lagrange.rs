use super::ShapeElement;
use crate::{
  error::{Error, Result},
  simplex::RefSimplex,
  Dim,
};

use itertools::Itertools as _;
use ndarray::{ArrayD, IxDyn};
use num_integer::binomial;

/// Nodal Lagrange element of order 1 or 2 on simplicies.
///
/// Basis functions are written in barycentric coordinates `l_i`.
/// Order 1: `l_i` for every vertex `i`.
/// Order 2: `l_i (2 l_i - 1)` for every vertex `i`, followed by
/// `4 l_i l_j` for every edge `i < j` in lexicographic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LagrangeElement {
  dim: Dim,
  order: usize,
}
impl LagrangeElement {
  pub fn new(dim: Dim, order: usize) -> Result<Self> {
    if !(1..=2).contains(&order) {
      return Err(Error::UnsupportedOrder {
        order,
        context: "lagrange elements are available for order 1 and 2",
      });
    }
    Ok(Self { dim, order })
  }

  /// The linear element, defining straight sided (affine) reference maps.
  pub fn p1(dim: Dim) -> Self {
    Self { dim, order: 1 }
  }
  pub fn p2(dim: Dim) -> Self {
    Self { dim, order: 2 }
  }

  fn local_basis(&self, dim: Dim) -> Vec<LocalBasisFn> {
    let vertices = (0..=dim).map(LocalBasisFn::Vertex);
    match self.order {
      1 => vertices.collect(),
      _ => vertices
        .chain(
          (0..=dim)
            .tuple_combinations()
            .map(|(i, j)| LocalBasisFn::Edge(i, j)),
        )
        .collect(),
    }
  }
}

impl ShapeElement for LagrangeElement {
  fn dim(&self) -> Dim {
    self.dim
  }
  fn order(&self) -> usize {
    self.order
  }
  fn nbasis(&self, dim: Dim) -> usize {
    binomial(dim + self.order, self.order)
  }

  fn eval_basis(&self, points: &na::DMatrix<f64>, deriv: usize) -> Result<ArrayD<f64>> {
    if deriv > 2 {
      return Err(Error::InvalidDerivativeOrder(deriv));
    }
    let dim = points.nrows();
    if dim > self.dim {
      return Err(Error::PointDimension { dim, max: self.dim });
    }

    let simp = RefSimplex::new(dim);
    let bary = simp.barycentric_coords(points);
    let difbary = simp.bary_coord_deriv();
    let basis = self.local_basis(dim);

    let shape = [basis.len(), points.ncols()]
      .into_iter()
      .chain(std::iter::repeat(dim).take(deriv))
      .collect_vec();

    let order = self.order;
    let table = ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
      let f = basis[idx[0]];
      let l = bary.column(idx[1]);
      match deriv {
        0 => f.value(order, l),
        1 => f.deriv(order, l, &difbary, idx[2]),
        _ => f.second_deriv(order, &difbary, idx[2], idx[3]),
      }
    });
    Ok(table)
  }
}

/// A basis function, identified by the vertex or edge it is attached to.
#[derive(Debug, Clone, Copy)]
enum LocalBasisFn {
  Vertex(usize),
  Edge(usize, usize),
}
impl LocalBasisFn {
  fn value(self, order: usize, l: na::DVectorView<f64>) -> f64 {
    match (self, order) {
      (Self::Vertex(i), 1) => l[i],
      (Self::Vertex(i), _) => l[i] * (2.0 * l[i] - 1.0),
      (Self::Edge(i, j), _) => 4.0 * l[i] * l[j],
    }
  }

  /// Derivative in direction `k`.
  fn deriv(self, order: usize, l: na::DVectorView<f64>, dl: &na::DMatrix<f64>, k: usize) -> f64 {
    match (self, order) {
      (Self::Vertex(i), 1) => dl[(i, k)],
      (Self::Vertex(i), _) => (4.0 * l[i] - 1.0) * dl[(i, k)],
      (Self::Edge(i, j), _) => 4.0 * (dl[(i, k)] * l[j] + l[i] * dl[(j, k)]),
    }
  }

  /// Second derivative in directions `k` and `m`. Constant on the simplex.
  fn second_deriv(self, order: usize, dl: &na::DMatrix<f64>, k: usize, m: usize) -> f64 {
    match (self, order) {
      (Self::Vertex(_), 1) => 0.0,
      (Self::Vertex(i), _) => 4.0 * dl[(i, k)] * dl[(i, m)],
      (Self::Edge(i, j), _) => 4.0 * (dl[(i, k)] * dl[(j, m)] + dl[(i, m)] * dl[(j, k)]),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  use approx::assert_relative_eq;
  use ndarray::Axis;

  fn sample_points(dim: Dim) -> na::DMatrix<f64> {
    // a few points inside and on the boundary of the reference simplex
    let simp = RefSimplex::new(dim);
    let nvertices = simp.nvertices();
    let mut points = simp.vertices().clone().insert_column(nvertices, 0.0);
    points.set_column(nvertices, &simp.centroid());
    points
  }

  #[test]
  fn partition_of_unity() {
    for order in 1..=2 {
      for dim in 0..=3 {
        let elem = LagrangeElement::new(dim, order).unwrap();
        let points = sample_points(dim);
        let values = elem.eval_basis(&points, 0).unwrap();
        assert_eq!(values.shape(), &[elem.nbasis(dim), points.ncols()]);
        for sum in values.sum_axis(Axis(0)).iter() {
          assert_relative_eq!(*sum, 1.0, epsilon = 1e-14);
        }
      }
    }
  }

  #[test]
  fn derivatives_sum_to_zero() {
    for order in 1..=2 {
      for dim in 1..=3 {
        let elem = LagrangeElement::new(dim, order).unwrap();
        let points = sample_points(dim);
        for deriv in 1..=2 {
          let table = elem.eval_basis(&points, deriv).unwrap();
          for sum in table.sum_axis(Axis(0)).iter() {
            assert_relative_eq!(*sum, 0.0, epsilon = 1e-13);
          }
        }
      }
    }
  }

  #[test]
  fn p1_gradients_are_barycentric_derivatives() {
    let elem = LagrangeElement::p1(2);
    let points = na::DMatrix::from_column_slice(2, 1, &[0.25, 0.25]);
    let grads = elem.eval_basis(&points, 1).unwrap();
    assert_eq!(grads.shape(), &[3, 1, 2]);
    assert_eq!(grads[[0, 0, 0]], -1.0);
    assert_eq!(grads[[0, 0, 1]], -1.0);
    assert_eq!(grads[[1, 0, 0]], 1.0);
    assert_eq!(grads[[1, 0, 1]], 0.0);
    assert_eq!(grads[[2, 0, 1]], 1.0);

    let hessians = elem.eval_basis(&points, 2).unwrap();
    assert_eq!(hessians.shape(), &[3, 1, 2, 2]);
    assert!(hessians.iter().all(|&h| h == 0.0));
  }

  #[test]
  fn p2_is_nodal() {
    let dim = 2;
    let elem = LagrangeElement::p2(dim);
    // vertices followed by edge midpoints (0,1), (0,2), (1,2)
    let nodes = na::DMatrix::from_column_slice(
      2,
      6,
      &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.5, 0.0, 0.0, 0.5, 0.5, 0.5],
    );
    let values = elem.eval_basis(&nodes, 0).unwrap();
    for ibasis in 0..6 {
      for inode in 0..6 {
        let expected = if ibasis == inode { 1.0 } else { 0.0 };
        assert_relative_eq!(values[[ibasis, inode]], expected, epsilon = 1e-14);
      }
    }
  }

  #[test]
  fn p2_second_derivatives_in_1d() {
    let elem = LagrangeElement::p2(1);
    let points = na::DMatrix::from_column_slice(1, 1, &[0.3]);
    let hessians = elem.eval_basis(&points, 2).unwrap();
    // (1-x)(1-2x), x(2x-1), 4x(1-x)
    assert_eq!(hessians[[0, 0, 0, 0]], 4.0);
    assert_eq!(hessians[[1, 0, 0, 0]], 4.0);
    assert_eq!(hessians[[2, 0, 0, 0]], -8.0);
  }

  #[test]
  fn invalid_requests() {
    let elem = LagrangeElement::p1(1);
    let points = na::DMatrix::zeros(2, 1);
    assert!(matches!(
      elem.eval_basis(&points, 0),
      Err(Error::PointDimension { dim: 2, max: 1 })
    ));
    let points = na::DMatrix::zeros(1, 1);
    assert!(matches!(
      elem.eval_basis(&points, 3),
      Err(Error::InvalidDerivativeOrder(3))
    ));
    assert!(matches!(
      LagrangeElement::new(2, 3),
      Err(Error::UnsupportedOrder { order: 3, .. })
    ));
  }
}
