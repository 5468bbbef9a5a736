use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::errors::LayoutError;
use crate::geometry::{Bounds2D, Vector2F};
use crate::graph::{DungenGraph, RoomId};
use crate::room::Room;

/// 针对某个连通图的一次布局尝试：顶点到房间的映射以及整体包围尺寸。
///
/// 宽高只在 [`Layout::update`] 等修改入口内部重新计算，外部无法直接写入。
#[derive(Debug, Clone)]
pub struct Layout {
    graph: Arc<DungenGraph>,
    rooms: BTreeMap<RoomId, Room>,
    bounds: Bounds2D,
}

impl Layout {
    pub fn new(graph: Arc<DungenGraph>) -> Self {
        Self {
            graph,
            rooms: BTreeMap::new(),
            bounds: Bounds2D::empty(),
        }
    }

    /// 以已有布局为起点构造新布局：保留新图中仍存在的顶点的房间，丢弃其余房间。
    pub fn seeded(prior: &Layout, graph: Arc<DungenGraph>) -> Self {
        let rooms: BTreeMap<RoomId, Room> = prior
            .rooms
            .iter()
            .filter(|(vertex, _)| graph.contains(**vertex))
            .map(|(vertex, room)| (*vertex, room.clone()))
            .collect();
        debug!(
            kept = rooms.len(),
            dropped = prior.rooms.len() - rooms.len(),
            "seeded layout from prior placement"
        );
        let mut layout = Self {
            graph,
            rooms,
            bounds: Bounds2D::empty(),
        };
        layout.recompute_bounds();
        layout
    }

    #[inline]
    pub fn graph(&self) -> &Arc<DungenGraph> {
        &self.graph
    }

    /// 记录 `vertex` 当前的房间摆放并重新计算整体尺寸，返回之前的摆放。
    pub fn update(&mut self, vertex: RoomId, room: Room) -> Result<Option<Room>, LayoutError> {
        if !self.graph.contains(vertex) {
            return Err(LayoutError::UnknownVertex(vertex));
        }
        let previous = self.rooms.insert(vertex, room);
        self.recompute_bounds();
        Ok(previous)
    }

    /// 原地修改已放置的房间，随后重新计算整体尺寸。
    pub fn modify_room<F>(&mut self, vertex: RoomId, f: F) -> Result<(), LayoutError>
    where
        F: FnOnce(&mut Room),
    {
        let room = self
            .rooms
            .get_mut(&vertex)
            .ok_or(LayoutError::Unplaced(vertex))?;
        f(room);
        self.recompute_bounds();
        Ok(())
    }

    pub fn translate_room(&mut self, vertex: RoomId, offset: Vector2F) -> Result<(), LayoutError> {
        self.modify_room(vertex, |room| room.translate(offset))
    }

    pub fn scale_room(&mut self, vertex: RoomId, factor: f64) -> Result<(), LayoutError> {
        self.modify_room(vertex, |room| room.scale(factor))
    }

    pub fn remove(&mut self, vertex: RoomId) -> Option<Room> {
        let removed = self.rooms.remove(&vertex);
        if removed.is_some() {
            self.recompute_bounds();
        }
        removed
    }

    #[inline]
    pub fn room(&self, vertex: RoomId) -> Option<&Room> {
        self.rooms.get(&vertex)
    }

    /// 按顶点 ID 升序遍历已放置的房间。
    pub fn rooms(&self) -> impl Iterator<Item = (RoomId, &Room)> {
        self.rooms.iter().map(|(vertex, room)| (*vertex, room))
    }

    #[inline]
    pub fn placed_count(&self) -> usize {
        self.rooms.len()
    }

    #[inline]
    pub fn is_placed(&self, vertex: RoomId) -> bool {
        self.rooms.contains_key(&vertex)
    }

    /// 图中尚未放置房间的顶点，按图的注册顺序。
    pub fn unplaced_vertices(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.graph
            .vertex_ids()
            .filter(|vertex| !self.rooms.contains_key(vertex))
    }

    pub fn is_complete(&self) -> bool {
        self.unplaced_vertices().next().is_none()
    }

    /// 所有房间包围盒的并集；没有房间时为空。
    #[inline]
    pub fn bounds(&self) -> Bounds2D {
        self.bounds
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.bounds.width()
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bounds.height()
    }

    /// 所有房间两两之间的重叠面积之和。
    pub fn total_collision_area(&self) -> f64 {
        let rooms: Vec<&Room> = self.rooms.values().collect();
        let mut total = 0.0;
        for (i, a) in rooms.iter().enumerate() {
            for b in &rooms[i + 1..] {
                total += Room::collision_area(a, b);
            }
        }
        total
    }

    /// 把所有房间对齐到整数网格，作为导出前的收尾步骤。
    pub fn snap_to_grid(&mut self) {
        for room in self.rooms.values_mut() {
            room.snap_to_grid();
        }
        self.recompute_bounds();
    }

    fn recompute_bounds(&mut self) {
        let mut bounds = Bounds2D::empty();
        for room in self.rooms.values() {
            bounds.include_bounds(&room.bounding_box());
        }
        self.bounds = bounds;
        debug!(
            rooms = self.rooms.len(),
            width = bounds.width(),
            height = bounds.height(),
            "layout bounds updated"
        );
    }
}
