//! The family of reference maps of a mesh.
//!
//! For every entity of a chosen topological dimension the reference map takes
//! the reference simplex onto the entity. All operations are batched over the
//! selected entities and the given local points.

use crate::{
  error::{Error, Result},
  jacobian::JacobianKind,
  linalg::DMatrixExt as _,
  mesh::{CellIdx, Mesh},
  shape::{LagrangeElement, ShapeElement},
};

use ndarray::{Array2, Array3, Array4, Array5, ArrayD, Axis, Ix3, Ix4, Ix5, IxDyn};
use tracing::{debug, warn};

/// A selection of entities.
#[derive(Debug, Clone, Copy)]
pub enum Mask<'a> {
  /// Selects the entities with these indices, in this order.
  Indices(&'a [usize]),
  /// Selects the entities flagged `true`. Needs one flag per entity.
  Include(&'a [bool]),
}
impl<'a> From<&'a [usize]> for Mask<'a> {
  fn from(indices: &'a [usize]) -> Self {
    Self::Indices(indices)
  }
}
impl<'a> From<&'a [bool]> for Mask<'a> {
  fn from(flags: &'a [bool]) -> Self {
    Self::Include(flags)
  }
}
impl Mask<'_> {
  pub fn apply<'e, T>(self, entities: &'e [T]) -> Result<Vec<&'e T>> {
    match self {
      Self::Indices(indices) => indices
        .iter()
        .map(|&i| {
          entities.get(i).ok_or_else(|| {
            Error::InvalidMask(format!(
              "index {i} out of range for {} entities",
              entities.len()
            ))
          })
        })
        .collect(),
      Self::Include(flags) => {
        if flags.len() != entities.len() {
          return Err(Error::InvalidMask(format!(
            "got {} flags for {} entities",
            flags.len(),
            entities.len()
          )));
        }
        Ok(
          entities
            .iter()
            .zip(flags)
            .filter(|(_, &include)| include)
            .map(|(e, _)| e)
            .collect(),
        )
      }
    }
  }
}

/// Connects the reference simplicies with the entities of a mesh.
///
/// Holds no state besides the mesh and the shape element defining the maps,
/// every call recomputes from the current mesh.
#[derive(Debug, Clone)]
pub struct ReferenceMap<'a, E = LagrangeElement> {
  mesh: &'a Mesh,
  shape_elem: E,
}

impl<'a> ReferenceMap<'a> {
  /// Reference maps of straight sided entities, defined by the linear element.
  pub fn new(mesh: &'a Mesh) -> Self {
    Self::with_shape_element(mesh, LagrangeElement::p1(mesh.dim()))
  }
}

impl<'a, E: ShapeElement> ReferenceMap<'a, E> {
  pub fn with_shape_element(mesh: &'a Mesh, shape_elem: E) -> Self {
    Self { mesh, shape_elem }
  }

  pub fn mesh(&self) -> &'a Mesh {
    self.mesh
  }
  pub fn shape_element(&self) -> &E {
    &self.shape_elem
  }

  /// Evaluates the reference maps, or their derivatives of order `deriv`, at
  /// the local `points` (one per column).
  ///
  /// The dimension of the points selects the entities: `d`-dimensional points
  /// evaluate the maps of all `d`-dimensional entities, optionally restricted
  /// by `mask`. An empty point matrix denotes the single point of the
  /// 0-dimensional reference simplex, so the vertex coordinates are returned.
  ///
  /// The result has shape `nentities x npoints x dim_embedded`, followed by
  /// `x d` for the jacobians and `x d x d` for the second derivatives.
  pub fn eval(
    &self,
    points: &na::DMatrix<f64>,
    deriv: usize,
    mask: Option<Mask>,
  ) -> Result<ArrayD<f64>> {
    if deriv > 2 {
      return Err(Error::InvalidDerivativeOrder(deriv));
    }
    let vertex_point;
    let points = if points.is_empty() {
      vertex_point = na::DMatrix::zeros(0, 1);
      &vertex_point
    } else {
      points
    };
    let dim = points.nrows();

    let basis = self.shape_elem.eval_basis(points, deriv)?;
    let nbasis = basis.shape()[0];
    let npoints = basis.shape()[1];
    if nbasis != dim + 1 {
      return Err(Error::BasisMismatch {
        nbasis,
        nvertices: dim + 1,
      });
    }
    let tail = basis.shape()[2..].to_vec();
    let ntail = tail.iter().product::<usize>();
    let basis = basis.into_shape_with_order((nbasis, npoints, ntail))?;

    let entities = self.mesh.entities(dim)?;
    let entities = match mask {
      Some(mask) => mask.apply(entities)?,
      None => entities.iter().collect(),
    };
    debug!(
      "evaluating derivative {deriv} of {} reference maps of dimension {dim} at {npoints} points",
      entities.len()
    );

    let coords = self.mesh.coords();
    let dim_embedded = self.mesh.dim();
    let mut maps = Array4::zeros((entities.len(), npoints, dim_embedded, ntail));
    for (entity, mut map) in entities.iter().zip(maps.axis_iter_mut(Axis(0))) {
      for ((ipoint, icomp, itail), value) in map.indexed_iter_mut() {
        *value = entity
          .iter()
          .enumerate()
          .map(|(ibasis, &ivertex)| coords.coord(ivertex)[icomp] * basis[[ibasis, ipoint, itail]])
          .sum();
      }
    }

    let shape = [entities.len(), npoints, dim_embedded]
      .into_iter()
      .chain(tail)
      .collect::<Vec<_>>();
    Ok(maps.into_shape_with_order(IxDyn(&shape))?)
  }

  /// The global points, of shape `nentities x npoints x dim_embedded`.
  pub fn map_points(&self, points: &na::DMatrix<f64>, mask: Option<Mask>) -> Result<Array3<f64>> {
    Ok(self.eval(points, 0, mask)?.into_dimensionality::<Ix3>()?)
  }

  /// The jacobians, of shape `nentities x npoints x dim_embedded x d`.
  pub fn jacobians(&self, points: &na::DMatrix<f64>, mask: Option<Mask>) -> Result<Array4<f64>> {
    Ok(self.eval(points, 1, mask)?.into_dimensionality::<Ix4>()?)
  }

  /// The second derivatives, of shape `nentities x npoints x dim_embedded x d x d`.
  pub fn hessians(&self, points: &na::DMatrix<f64>, mask: Option<Mask>) -> Result<Array5<f64>> {
    Ok(self.eval(points, 2, mask)?.into_dimensionality::<Ix5>()?)
  }

  /// Maps the global `points` (one per column) back onto the reference
  /// simplex, using the reference map of the host cell given for each point.
  ///
  /// Only available for affine maps on meshes in 1D and 2D.
  pub fn eval_inverse(
    &self,
    points: &na::DMatrix<f64>,
    hosts: &[CellIdx],
  ) -> Result<na::DMatrix<f64>> {
    let order = self.shape_elem.order();
    if order != 1 {
      return Err(Error::UnsupportedOrder {
        order,
        context: "only affine reference maps can be inverted",
      });
    }
    let dim = self.mesh.dim();
    if !(1..=2).contains(&dim) {
      return Err(Error::UnsupportedDimension {
        dim,
        context: "inverse maps are only available in 1D and 2D",
      });
    }
    if points.nrows() != dim {
      return Err(Error::UnsupportedDimension {
        dim: points.nrows(),
        context: "points must have the dimension of the mesh",
      });
    }
    if hosts.len() != points.ncols() {
      return Err(Error::HostCountMismatch {
        npoints: points.ncols(),
        nhosts: hosts.len(),
      });
    }

    let cells = self.mesh.entities(dim)?;
    let mut preimages = na::DMatrix::zeros(dim, points.ncols());
    for (ipoint, (point, &host)) in points.column_iter().zip(hosts).enumerate() {
      let cell = cells.get(host).ok_or(Error::EntityOutOfRange {
        entity: host,
        nentities: cells.len(),
      })?;
      let simplex = self.mesh.coords().coord_simplex(cell);
      let Some(inv) = simplex.spanning_vectors().try_inverse_regular() else {
        warn!("degenerate host cell {host}");
        return Err(Error::NumericalSingularity {
          entity: host,
          point: ipoint,
        });
      };
      preimages.set_column(ipoint, &(inv * (point - simplex.base_vertex())));
    }
    Ok(preimages)
  }

  /// The inverse jacobians, of shape `nentities x npoints x d x d`.
  ///
  /// Only square jacobians (`d` equal to the embedding dimension) are supported.
  pub fn jacobian_inverse(
    &self,
    points: &na::DMatrix<f64>,
    mask: Option<Mask>,
  ) -> Result<Array4<f64>> {
    let kind = self.jacobian_kind(points, "inverse")?;
    let jacs = self.jacobians(points, mask)?;
    kind.inverses(jacs.view())
  }

  /// The jacobian determinants, of shape `nentities x npoints`.
  ///
  /// For curves and surfaces this is the length and area element respectively.
  pub fn jacobian_determinant(
    &self,
    points: &na::DMatrix<f64>,
    mask: Option<Mask>,
  ) -> Result<Array2<f64>> {
    let kind = self.jacobian_kind(points, "determinant")?;
    let jacs = self.jacobians(points, mask)?;
    kind.determinants(jacs.view())
  }

  fn jacobian_kind(
    &self,
    points: &na::DMatrix<f64>,
    operation: &'static str,
  ) -> Result<JacobianKind> {
    let nrows = self.mesh.dim();
    let ncols = points.nrows();
    JacobianKind::classify(nrows, ncols).ok_or(Error::UnsupportedJacobianShape {
      nrows,
      ncols,
      operation,
    })
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::mesh::VertexCoords;

  use approx::assert_relative_eq;

  fn unit_square() -> Mesh {
    let coords =
      VertexCoords::from_points(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]).unwrap();
    Mesh::new(coords, vec![vec![0, 1, 2], vec![0, 2, 3]]).unwrap()
  }

  #[test]
  fn empty_points_yield_vertex_coords() {
    let mesh = unit_square();
    let refmap = ReferenceMap::new(&mesh);
    let maps = refmap.map_points(&na::DMatrix::zeros(0, 0), None).unwrap();
    assert_eq!(maps.shape(), &[4, 1, 2]);
    for ivertex in 0..4 {
      for icomp in 0..2 {
        assert_eq!(
          maps[[ivertex, 0, icomp]],
          mesh.coords().coord(ivertex)[icomp]
        );
      }
    }
  }

  #[test]
  fn edge_maps_of_triangle_mesh() {
    let mesh = unit_square();
    let refmap = ReferenceMap::new(&mesh);
    let midpoint = na::DMatrix::from_element(1, 1, 0.5);
    let maps = refmap.map_points(&midpoint, None).unwrap();
    // edges: [0,1], [0,2], [0,3], [1,2], [2,3]
    assert_eq!(maps.shape(), &[5, 1, 2]);
    assert_relative_eq!(maps[[1, 0, 0]], 0.5);
    assert_relative_eq!(maps[[1, 0, 1]], 0.5);
    assert_relative_eq!(maps[[3, 0, 0]], 1.0);
    assert_relative_eq!(maps[[3, 0, 1]], 0.5);

    let jacs = refmap.jacobians(&midpoint, None).unwrap();
    assert_eq!(jacs.shape(), &[5, 1, 2, 1]);
    assert_relative_eq!(jacs[[4, 0, 0, 0]], -1.0);
    assert_relative_eq!(jacs[[4, 0, 1, 0]], 0.0);
  }

  #[test]
  fn cell_jacobians_are_spanning_vectors() {
    let mesh = unit_square();
    let refmap = ReferenceMap::new(&mesh);
    let points = na::DMatrix::from_column_slice(2, 2, &[0.1, 0.2, 0.5, 0.25]);
    let jacs = refmap.jacobians(&points, None).unwrap();
    assert_eq!(jacs.shape(), &[2, 2, 2, 2]);
    for icell in 0..2 {
      let spanning = mesh.entity_simplex(2, icell).unwrap().spanning_vectors();
      for ipoint in 0..2 {
        let jac = crate::linalg::matrix_block(&jacs.view(), icell, ipoint);
        crate::linalg::assert_mat_eq(&jac, &spanning);
      }
    }
    let hessians = refmap.hessians(&points, None).unwrap();
    assert_eq!(hessians.shape(), &[2, 2, 2, 2, 2]);
    assert!(hessians.iter().all(|&h| h == 0.0));
  }

  #[test]
  fn invalid_masks() {
    let mesh = unit_square();
    let refmap = ReferenceMap::new(&mesh);
    let points = na::DMatrix::from_column_slice(2, 1, &[0.2, 0.2]);
    assert!(matches!(
      refmap.eval(&points, 0, Some(Mask::Indices(&[2]))),
      Err(Error::InvalidMask(_))
    ));
    assert!(matches!(
      refmap.eval(&points, 0, Some(Mask::Include(&[true]))),
      Err(Error::InvalidMask(_))
    ));
  }

  #[test]
  fn integer_mask_gathers_in_order() {
    let mesh = unit_square();
    let refmap = ReferenceMap::new(&mesh);
    let points = na::DMatrix::from_column_slice(2, 1, &[0.2, 0.2]);
    let all = refmap.map_points(&points, None).unwrap();
    let gathered = refmap
      .map_points(&points, Some(Mask::from(&[1usize, 0, 1][..])))
      .unwrap();
    assert_eq!(gathered.shape(), &[3, 1, 2]);
    assert_eq!(gathered.index_axis(Axis(0), 0), all.index_axis(Axis(0), 1));
    assert_eq!(gathered.index_axis(Axis(0), 1), all.index_axis(Axis(0), 0));
  }

  #[test]
  fn invalid_derivative_order() {
    let mesh = unit_square();
    let refmap = ReferenceMap::new(&mesh);
    let points = na::DMatrix::from_column_slice(2, 1, &[0.2, 0.2]);
    assert!(matches!(
      refmap.eval(&points, 3, None),
      Err(Error::InvalidDerivativeOrder(3))
    ));
  }

  #[test]
  fn quadratic_element_does_not_match_straight_entities() {
    let mesh = unit_square();
    let refmap = ReferenceMap::with_shape_element(&mesh, LagrangeElement::p2(2));
    let points = na::DMatrix::from_column_slice(2, 1, &[0.2, 0.2]);
    assert!(matches!(
      refmap.eval(&points, 0, None),
      Err(Error::BasisMismatch {
        nbasis: 6,
        nvertices: 3
      })
    ));
  }

  #[test]
  fn inverse_rejects_malformed_hosts() {
    let mesh = unit_square();
    let refmap = ReferenceMap::new(&mesh);
    let points = na::DMatrix::from_column_slice(2, 2, &[0.2, 0.1, 0.3, 0.9]);
    assert!(matches!(
      refmap.eval_inverse(&points, &[0]),
      Err(Error::HostCountMismatch {
        npoints: 2,
        nhosts: 1
      })
    ));
    assert!(matches!(
      refmap.eval_inverse(&points, &[0, 2]),
      Err(Error::EntityOutOfRange {
        entity: 2,
        nentities: 2
      })
    ));
    let points = na::DMatrix::from_column_slice(1, 1, &[0.2]);
    assert!(matches!(
      refmap.eval_inverse(&points, &[0]),
      Err(Error::UnsupportedDimension { dim: 1, .. })
    ));
  }

  #[test]
  fn inverse_of_degenerate_cell_is_singular() {
    let coords =
      VertexCoords::from_points(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [0.0, 1.0]]).unwrap();
    let mesh = Mesh::new(coords, vec![vec![0, 1, 3], vec![0, 1, 2]]).unwrap();
    let refmap = ReferenceMap::new(&mesh);
    let points = na::DMatrix::from_column_slice(2, 2, &[0.2, 0.3, 1.5, 1.5]);
    assert!(matches!(
      refmap.eval_inverse(&points, &[0, 1]),
      Err(Error::NumericalSingularity {
        entity: 1,
        point: 1
      })
    ));
    let centroid = na::DMatrix::from_element(2, 1, 1.0 / 3.0);
    assert!(matches!(
      refmap.jacobian_determinant(&centroid, None),
      Err(Error::NumericalSingularity { entity: 1, .. })
    ));
    assert!(refmap
      .jacobian_determinant(&centroid, Some(Mask::Indices(&[0])))
      .is_ok());
  }
}
