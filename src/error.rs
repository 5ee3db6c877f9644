use crate::Dim;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("invalid mask: {0}")]
  InvalidMask(String),

  #[error("derivative order {0} is not supported (expected 0, 1 or 2)")]
  InvalidDerivativeOrder(usize),

  #[error("unsupported dimension {dim}: {context}")]
  UnsupportedDimension { dim: Dim, context: &'static str },

  #[error("unsupported polynomial order {order}: {context}")]
  UnsupportedOrder { order: usize, context: &'static str },

  #[error("unsupported jacobian shape {nrows}x{ncols} for {operation}")]
  UnsupportedJacobianShape {
    nrows: usize,
    ncols: usize,
    operation: &'static str,
  },

  #[error("singular jacobian in entity {entity} at point {point}")]
  NumericalSingularity { entity: usize, point: usize },

  #[error("mesh has no entities of dimension {dim} (cells have dimension {dim_intrinsic})")]
  EntityDimension { dim: Dim, dim_intrinsic: Dim },

  #[error("local points of dimension {dim} exceed the reference domain dimension {max}")]
  PointDimension { dim: Dim, max: Dim },

  #[error("shape element has {nbasis} basis functions but entities have {nvertices} vertices")]
  BasisMismatch { nbasis: usize, nvertices: usize },

  #[error("got {npoints} points but {nhosts} hosts")]
  HostCountMismatch { npoints: usize, nhosts: usize },

  #[error("entity {entity} out of range for {nentities} entities")]
  EntityOutOfRange { entity: usize, nentities: usize },

  #[error("invalid mesh: {0}")]
  InvalidMesh(String),

  #[error(transparent)]
  Shape(#[from] ndarray::ShapeError),
}
