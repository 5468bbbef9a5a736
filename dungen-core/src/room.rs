use std::sync::Arc;

use tracing::trace;

use crate::blueprint::{DoorConstraintType, RoomBlueprint};
use crate::door::Door;
use crate::errors::GeometryError;
use crate::geometry::{BoundaryLine, Bounds2D, Line, Vector2F};
use crate::graph::RoomId;
use crate::polygon::Polygon2d;

/// 已放置的房间：蓝图外形 + 世界坐标位置 + 门。
///
/// 平移与缩放会同时作用于顶点、门与位置，三者始终保持一致。
#[derive(Debug, Clone)]
pub struct Room {
    blueprint: Arc<RoomBlueprint>,
    number: Option<RoomId>,
    position: Vector2F,
    doors: Vec<Door>,
    shape: Polygon2d,
}

impl Room {
    /// 以原点为位置创建房间，蓝图顶点原样作为世界坐标外形。
    pub fn new(blueprint: Arc<RoomBlueprint>) -> Self {
        Self::with_position(blueprint, Vector2F::ZERO, None)
    }

    pub fn with_position(
        blueprint: Arc<RoomBlueprint>,
        position: Vector2F,
        number: Option<RoomId>,
    ) -> Self {
        let shape = blueprint.shape().clone();
        Self {
            blueprint,
            number,
            position,
            doors: Vec::new(),
            shape,
        }
    }

    /// 以新的外形替换当前外形，编号、蓝图、门与位置保持不变，原房间不受影响。
    pub fn with_shape(&self, points: Vec<Vector2F>) -> Result<Room, GeometryError> {
        Ok(Self {
            blueprint: self.blueprint.clone(),
            number: self.number,
            position: self.position,
            doors: self.doors.clone(),
            shape: Polygon2d::new(points)?,
        })
    }

    #[inline]
    pub fn blueprint(&self) -> &Arc<RoomBlueprint> {
        &self.blueprint
    }

    #[inline]
    pub fn number(&self) -> Option<RoomId> {
        self.number
    }

    #[inline]
    pub fn set_number(&mut self, number: Option<RoomId>) {
        self.number = number;
    }

    #[inline]
    pub fn position(&self) -> Vector2F {
        self.position
    }

    #[inline]
    pub fn doors(&self) -> &[Door] {
        &self.doors
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
    pub fn bounding_box(&self) -> Bounds2D {
        self.shape.bounding_box()
    }

    #[inline]
    pub fn center(&self) -> Vector2F {
        self.shape.center()
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.shape.area()
    }

    pub fn translate(&mut self, offset: Vector2F) {
        self.position += offset;
        for door in &mut self.doors {
            door.translate(offset);
        }
        self.shape.translate(offset);
    }

    /// 以原点为基准缩放。需要绕中心缩放时先平移到原点。
    pub fn scale(&mut self, factor: f64) {
        self.position *= factor;
        for door in &mut self.doors {
            door.scale(factor);
        }
        self.shape.scale(factor);
    }

    /// 查找标记线段与 `line` 相同（容差内、不区分方向）的门。
    pub fn door_for_line(&self, line: &Line) -> Option<&Door> {
        self.doors.iter().find(|door| door.marker.approx_eq(line))
    }

    /// 在边界边上放一扇门。标记必须与某条可放门且尚无门的边重合。
    pub fn add_door(&mut self, door: Door) -> Result<(), GeometryError> {
        let Some(edge) = self
            .shape
            .edges()
            .find(|edge| edge.approx_eq(&door.marker))
        else {
            return Err(GeometryError::DoorNotOnBoundary { room: self.number });
        };
        let classified = self.classify(edge);
        if classified.is_door() {
            return Err(GeometryError::DoorAlreadyPresent { room: self.number });
        }
        if !classified.can_contain_door() {
            return Err(GeometryError::DoorNotAllowed { room: self.number });
        }
        // 标记与边共用坐标
        let marker = if edge.start.approx_eq(door.marker.start) {
            edge
        } else {
            edge.reversed()
        };
        self.doors.push(door.with_marker(marker));
        Ok(())
    }

    pub fn remove_door(&mut self, line: &Line) -> Option<Door> {
        let index = self
            .doors
            .iter()
            .position(|door| door.marker.approx_eq(line))?;
        Some(self.doors.remove(index))
    }

    /// 按当前顶点与门重新推导边界：门 / 可放门 / 普通墙。
    pub fn boundary(&self) -> Vec<BoundaryLine> {
        self.shape.boundary_with(|line| self.classify(line))
    }

    /// 把门端点与顶点取整到网格（中点远离零），并把位置重置为新的中心。
    ///
    /// 有损操作；对已是整数的坐标再次调用不会产生变化。
    pub fn snap_to_grid(&mut self) {
        for door in &mut self.doors {
            let marker = Line::new(
                door.marker.start.round_half_away(),
                door.marker.end.round_half_away(),
            );
            *door = door.with_marker(marker);
        }
        self.shape.map_points(Vector2F::round_half_away);
        self.position = self.center();
    }

    /// `room1` 的任一顶点到 `room2` 任一边的最短距离。
    ///
    /// 按定义不对称：`distance(a, b)` 与 `distance(b, a)` 可能不同。
    pub fn distance(room1: &Room, room2: &Room) -> f64 {
        let mut best = f64::INFINITY;
        for &point in room1.points() {
            for edge in room2.shape.edges() {
                best = best.min(edge.distance_squared_to_point(point));
            }
        }
        best.sqrt()
    }

    pub fn center_distance(room1: &Room, room2: &Room) -> f64 {
        (room1.center() - room2.center()).magnitude()
    }

    /// 两个房间墙体贴合的长度。
    pub fn contact_area(room1: &Room, room2: &Room) -> f64 {
        Polygon2d::contact_area(&room1.shape, &room2.shape)
    }

    /// 两个房间重叠的面积。包围盒不相交时直接返回 0，不做精确求交。
    pub fn collision_area(room1: &Room, room2: &Room) -> f64 {
        if !Self::bounding_boxes_overlap(room1, room2) {
            trace!(
                a = ?room1.number,
                b = ?room2.number,
                "bounding boxes apart, skipping exact intersection"
            );
            return 0.0;
        }
        Polygon2d::collide_area(&room1.shape, &room2.shape)
    }

    /// 碰撞面积计算使用的粗筛条件。
    #[inline]
    pub fn bounding_boxes_overlap(room1: &Room, room2: &Room) -> bool {
        room1.bounding_box().overlaps(&room2.bounding_box())
    }

    fn classify(&self, line: Line) -> BoundaryLine {
        if self.door_for_line(&line).is_some() {
            BoundaryLine::door(line)
        } else if self.blueprint.door_constraint().permits(
            &line,
            DoorConstraintType::Placeholder,
            self.position,
            true,
        ) {
            BoundaryLine::eligible(line)
        } else {
            BoundaryLine::plain(line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::DoorConstraint;
    use crate::door::DoorAccess;

    fn square() -> Arc<RoomBlueprint> {
        Arc::new(RoomBlueprint::rectangle("square", 20.0, 20.0).unwrap())
    }

    fn right_wall() -> Line {
        Line::new(Vector2F::new(10.0, 10.0), Vector2F::new(10.0, -10.0))
    }

    #[test]
    fn translate_and_scale_keep_doors_in_step() {
        let mut room = Room::new(square());
        room.add_door(Door::new(right_wall(), RoomId::new(1), DoorAccess::Open))
            .unwrap();

        room.translate(Vector2F::new(5.0, 0.0));
        room.scale(2.0);

        assert_eq!(room.position(), Vector2F::new(10.0, 0.0));
        let expected = Line::new(Vector2F::new(30.0, 20.0), Vector2F::new(30.0, -20.0));
        assert!(room.doors()[0].marker.approx_eq(&expected));
        assert!(room.door_for_line(&expected.reversed()).is_some());
        let doors = room.boundary().iter().filter(|b| b.is_door()).count();
        assert_eq!(doors, 1);
    }

    #[test]
    fn door_must_sit_on_an_edge() {
        let mut room = Room::with_position(square(), Vector2F::ZERO, Some(RoomId::new(4)));
        let off_wall = Line::new(Vector2F::new(0.0, 0.0), Vector2F::new(1.0, 0.0));
        assert_eq!(
            room.add_door(Door::new(off_wall, RoomId::new(1), DoorAccess::Open)),
            Err(GeometryError::DoorNotOnBoundary {
                room: Some(RoomId::new(4))
            })
        );

        let door = Door::new(right_wall(), RoomId::new(1), DoorAccess::Open);
        room.add_door(door).unwrap();
        assert!(matches!(
            room.add_door(door),
            Err(GeometryError::DoorAlreadyPresent { .. })
        ));
        assert_eq!(room.remove_door(&right_wall()), Some(door));
        assert!(room.doors().is_empty());
    }

    #[test]
    fn restricted_blueprint_limits_eligible_edges() {
        let blueprint = RoomBlueprint::rectangle("cell", 20.0, 20.0)
            .unwrap()
            .with_door_constraint(DoorConstraint::restricted(
                DoorConstraintType::Placeholder,
                [(Vector2F::new(10.0, 10.0), Vector2F::new(10.0, -10.0))],
            ));
        let mut room = Room::new(Arc::new(blueprint));

        let eligible: Vec<_> = room
            .boundary()
            .into_iter()
            .filter(BoundaryLine::can_contain_door)
            .collect();
        assert_eq!(eligible.len(), 1);
        assert!(eligible[0].line.approx_eq(&right_wall()));

        let top = Line::new(Vector2F::new(-10.0, 10.0), Vector2F::new(10.0, 10.0));
        assert!(matches!(
            room.add_door(Door::new(top, RoomId::new(2), DoorAccess::Locked)),
            Err(GeometryError::DoorNotAllowed { .. })
        ));

        // 允许的门位随房间位置一起移动
        room.translate(Vector2F::new(3.0, 4.0));
        let moved = right_wall().translated(Vector2F::new(3.0, 4.0));
        let boundary = room.boundary();
        let edge = boundary
            .iter()
            .find(|b| b.line.approx_eq(&moved))
            .expect("moved wall is still an edge");
        assert!(edge.can_contain_door());
        assert_eq!(boundary.iter().filter(|b| b.can_contain_door()).count(), 1);
    }

    #[test]
    fn snap_to_grid_rounds_and_is_idempotent() {
        let mut room = Room::new(square());
        room.add_door(Door::new(right_wall(), RoomId::new(1), DoorAccess::Locked))
            .unwrap();
        room.translate(Vector2F::new(0.5, -0.4));
        room.scale(1.01);

        room.snap_to_grid();
        let once = room.clone();
        room.snap_to_grid();

        assert_eq!(room.points(), once.points());
        assert_eq!(room.doors(), once.doors());
        assert_eq!(room.position(), once.position());
        assert!(
            room.points()
                .iter()
                .all(|p| p.x().fract() == 0.0 && p.y().fract() == 0.0)
        );
        assert_eq!(room.position(), room.center());
        assert_eq!(room.doors()[0].default_access, DoorAccess::Locked);
        // 门与取整后的墙依旧重合
        assert!(room.boundary().iter().any(BoundaryLine::is_door));
    }

    #[test]
    fn door_stays_on_wall_after_snapping_near_half() {
        let blueprint = Arc::new(RoomBlueprint::rectangle("odd", 21.0, 20.0).unwrap());
        let mut room = Room::new(blueprint);
        let almost = Line::new(
            Vector2F::new(10.4999999, 10.0),
            Vector2F::new(10.4999999, -10.0),
        );
        room.add_door(Door::new(almost, RoomId::new(1), DoorAccess::Open))
            .unwrap();
        assert_eq!(room.doors()[0].marker.start, Vector2F::new(10.5, 10.0));

        room.snap_to_grid();

        let marker = room.doors()[0].marker;
        assert_eq!(marker.start, Vector2F::new(11.0, 10.0));
        assert!(room.shape().edges().any(|edge| edge.approx_eq(&marker)));
        assert_eq!(room.boundary().iter().filter(|b| b.is_door()).count(), 1);
    }

    #[test]
    fn stored_marker_keeps_the_given_direction() {
        let mut room = Room::new(square());
        room.add_door(Door::new(
            right_wall().reversed(),
            RoomId::new(1),
            DoorAccess::Open,
        ))
        .unwrap();
        assert_eq!(room.doors()[0].marker, right_wall().reversed());
    }

    #[test]
    fn with_shape_carries_doors_and_position() {
        let mut room = Room::with_position(square(), Vector2F::ZERO, Some(RoomId::new(2)));
        room.add_door(Door::new(right_wall(), RoomId::new(1), DoorAccess::Locked))
            .unwrap();
        room.translate(Vector2F::new(3.0, 0.0));
        let original_points = room.points().to_vec();

        let wider = room
            .with_shape(vec![
                Vector2F::new(13.0, 10.0),
                Vector2F::new(13.0, -10.0),
                Vector2F::new(-17.0, -10.0),
                Vector2F::new(-17.0, 10.0),
            ])
            .unwrap();

        assert_eq!(wider.number(), Some(RoomId::new(2)));
        assert_eq!(wider.position(), room.position());
        assert_eq!(wider.doors(), room.doors());
        assert!(Arc::ptr_eq(wider.blueprint(), room.blueprint()));
        assert!((wider.area() - 600.0).abs() < 1e-9);
        assert_eq!(wider.boundary().iter().filter(|b| b.is_door()).count(), 1);
        assert_eq!(room.points(), original_points.as_slice());
        assert!((room.area() - 400.0).abs() < 1e-9);

        assert!(matches!(
            room.with_shape(vec![Vector2F::ZERO, Vector2F::new(1.0, 0.0)]),
            Err(GeometryError::TooFewPoints { count: 2 })
        ));
    }

    #[test]
    fn clone_copies_doors_independently() {
        let mut room = Room::new(square());
        room.add_door(Door::new(right_wall(), RoomId::new(1), DoorAccess::Open))
            .unwrap();
        let copy = room.clone();
        room.translate(Vector2F::new(1.0, 0.0));
        assert!(copy.doors()[0].marker.approx_eq(&right_wall()));
        assert!(Arc::ptr_eq(copy.blueprint(), room.blueprint()));
    }

    #[test]
    fn center_distance_between_rooms() {
        let a = Room::new(square());
        let mut b = Room::new(square());
        b.translate(Vector2F::new(3.0, 4.0));
        assert!((Room::center_distance(&a, &b) - 5.0).abs() < 1e-9);
    }
}
