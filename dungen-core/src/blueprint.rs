//! 房间蓝图与房间定义：由外部加载的只读创作数据，多个房间通过 `Arc` 共享。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::GeometryError;
use crate::geometry::{Line, Vector2F};
use crate::polygon::Polygon2d;

/// 门位限制作用于哪一类边。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoorConstraintType {
    #[default]
    Placeholder,
}

/// 门位限制。受限时门只能放在 `allowed_positions` 中的线段上，
/// 这些线段以蓝图局部原点为基准，使用时需加上房间位置。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DoorConstraint {
    pub has_restricted_door: bool,
    #[serde(default)]
    pub kind: DoorConstraintType,
    #[serde(default)]
    pub allowed_positions: Vec<(Vector2F, Vector2F)>,
}

impl DoorConstraint {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn restricted(
        kind: DoorConstraintType,
        allowed_positions: impl IntoIterator<Item = (Vector2F, Vector2F)>,
    ) -> Self {
        Self {
            has_restricted_door: true,
            kind,
            allowed_positions: allowed_positions.into_iter().collect(),
        }
    }

    /// 判断 `line` 是否满足类型为 `kind` 的限制；该类型未受限时返回 `default`。
    pub fn permits(
        &self,
        line: &Line,
        kind: DoorConstraintType,
        origin: Vector2F,
        default: bool,
    ) -> bool {
        if !self.has_restricted_door || self.kind != kind {
            return default;
        }
        self.allowed_positions
            .iter()
            .any(|(start, end)| line.approx_eq(&Line::new(*start + origin, *end + origin)))
    }
}

/// 房间原型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    #[default]
    Normal,
    Start,
    Boss,
}

/// 具名的房间外形（局部坐标）及门位限制。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BlueprintData", into = "BlueprintData")]
pub struct RoomBlueprint {
    name: String,
    shape: Polygon2d,
    door_constraint: DoorConstraint,
}

impl RoomBlueprint {
    pub fn new(name: impl Into<String>, points: Vec<Vector2F>) -> Result<Self, GeometryError> {
        Ok(Self {
            name: name.into(),
            shape: Polygon2d::new(points)?,
            door_constraint: DoorConstraint::unrestricted(),
        })
    }

    /// 以原点为中心、宽高为 `width`×`height` 的矩形蓝图。
    pub fn rectangle(
        name: impl Into<String>,
        width: f64,
        height: f64,
    ) -> Result<Self, GeometryError> {
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self::new(
            name,
            vec![
                Vector2F::new(hw, hh),
                Vector2F::new(hw, -hh),
                Vector2F::new(-hw, -hh),
                Vector2F::new(-hw, hh),
            ],
        )
    }

    pub fn with_door_constraint(mut self, constraint: DoorConstraint) -> Self {
        self.door_constraint = constraint;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn shape(&self) -> &Polygon2d {
        &self.shape
    }

    #[inline]
    pub fn points(&self) -> &[Vector2F] {
        self.shape.points()
    }

    #[inline]
    pub fn door_constraint(&self) -> &DoorConstraint {
        &self.door_constraint
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BlueprintData {
    name: String,
    points: Vec<Vector2F>,
    #[serde(default)]
    door_constraint: DoorConstraint,
}

impl TryFrom<BlueprintData> for RoomBlueprint {
    type Error = GeometryError;

    fn try_from(data: BlueprintData) -> Result<Self, Self::Error> {
        Ok(RoomBlueprint::new(data.name, data.points)?.with_door_constraint(data.door_constraint))
    }
}

impl From<RoomBlueprint> for BlueprintData {
    fn from(blueprint: RoomBlueprint) -> Self {
        Self {
            points: blueprint.shape.points().to_vec(),
            name: blueprint.name,
            door_constraint: blueprint.door_constraint,
        }
    }
}

/// 房间定义：同一原型下的一个或多个蓝图变体，选择策略由外部决定。
#[derive(Debug, Clone, PartialEq)]
pub struct RoomDefinition {
    blueprints: Vec<Arc<RoomBlueprint>>,
    room_type: RoomType,
}

impl RoomDefinition {
    pub fn new(
        blueprints: impl IntoIterator<Item = Arc<RoomBlueprint>>,
        room_type: RoomType,
    ) -> Result<Self, GeometryError> {
        let blueprints: Vec<_> = blueprints.into_iter().collect();
        if blueprints.is_empty() {
            return Err(GeometryError::EmptyDefinition);
        }
        Ok(Self {
            blueprints,
            room_type,
        })
    }

    #[inline]
    pub fn blueprints(&self) -> &[Arc<RoomBlueprint>] {
        &self.blueprints
    }

    #[inline]
    pub fn blueprint(&self, index: usize) -> Option<&Arc<RoomBlueprint>> {
        self.blueprints.get(index)
    }

    #[inline]
    pub fn room_type(&self) -> RoomType {
        self.room_type
    }
}
