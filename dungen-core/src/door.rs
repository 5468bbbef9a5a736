use serde::{Deserialize, Serialize};

use crate::geometry::{Line, Vector2F};
use crate::graph::RoomId;

/// 门的默认通行策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorAccess {
    #[default]
    Open,
    Locked,
}

/// 已放置的门：占据房间边界上的一段（世界坐标），通向另一个房间。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub marker: Line,
    pub connecting_room: RoomId,
    #[serde(default)]
    pub default_access: DoorAccess,
}

impl Door {
    pub fn new(marker: Line, connecting_room: RoomId, default_access: DoorAccess) -> Self {
        Self {
            marker,
            connecting_room,
            default_access,
        }
    }

    #[inline]
    pub fn translate(&mut self, offset: Vector2F) {
        self.marker.translate(offset);
    }

    #[inline]
    pub fn scale(&mut self, factor: f64) {
        self.marker.scale(factor);
    }

    /// 以新的标记线段重建门，保留目标房间与通行策略。
    #[inline]
    pub fn with_marker(&self, marker: Line) -> Self {
        Self::new(marker, self.connecting_room, self.default_access)
    }
}
