//! Presentation side
//!
//! Turns control grids into drawable geometry. Nothing here feeds back into
//! the optimizer; the actual drawing happens behind the [`Presenter`] trait.

pub mod camera;
pub mod presenter;
pub mod shapes;
pub mod vertex;
pub mod visualization;

pub use camera::Camera;
pub use presenter::{ChannelKeys, KeySource, LogPresenter, Presenter};
pub use shapes::{Polyline, SurfaceMesh, Topology};
pub use vertex::{LineVertex, MeshVertex};
pub use visualization::{Layers, MissStats, ProblemVisualization};
