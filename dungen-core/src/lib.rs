//! 地牢布局几何核心：把房间连通图落成二维多边形布局。
//!
//! 外部的摆放过程负责决定房间往哪里移动；本 crate 只提供平移、缩放、距离、碰撞面积、
//! 墙体接触长度等原语，以及在每次移动后重新计算整体尺寸的 [`layout::Layout`]。

pub mod blueprint;
pub mod door;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod polygon;
pub mod room;

pub mod errors {
    use thiserror::Error;

    use crate::graph::RoomId;

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum GeometryError {
        #[error("polygon needs at least 3 points, got {count}")]
        TooFewPoints { count: usize },
        #[error("line starting at ({x}, {y}) has zero length")]
        DegenerateLine { x: f64, y: f64 },
        #[error("room definition must offer at least one blueprint")]
        EmptyDefinition,
        #[error("door marker does not match any boundary edge of room {room:?}")]
        DoorNotOnBoundary { room: Option<RoomId> },
        #[error("boundary edge of room {room:?} cannot contain a door")]
        DoorNotAllowed { room: Option<RoomId> },
        #[error("boundary edge of room {room:?} already holds a door")]
        DoorAlreadyPresent { room: Option<RoomId> },
    }

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum GraphError {
        #[error("room {0} is already registered")]
        DuplicateRoom(RoomId),
        #[error("room {0} is not registered")]
        UnknownRoom(RoomId),
        #[error("room {0} cannot connect to itself")]
        SelfConnection(RoomId),
        #[error("rooms {0} and {1} are already connected")]
        DuplicateConnection(RoomId, RoomId),
    }

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum LayoutError {
        #[error("vertex {0} is not part of the layout's graph")]
        UnknownVertex(RoomId),
        #[error("vertex {0} has no room placed")]
        Unplaced(RoomId),
    }
}

pub use blueprint::{DoorConstraint, DoorConstraintType, RoomBlueprint, RoomDefinition, RoomType};
pub use door::{Door, DoorAccess};
pub use errors::{GeometryError, GraphError, LayoutError};
pub use geometry::{BoundaryLine, Bounds2D, Line, Vector2F};
pub use graph::{DungenGraph, RoomId};
pub use layout::Layout;
pub use polygon::Polygon2d;
pub use room::Room;
