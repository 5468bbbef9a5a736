use dungen_core::{GeometryError, GraphError, LayoutError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("房间尺寸必须为正数: {width}×{height}")]
    InvalidDimensions { width: f64, height: f64 },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}
