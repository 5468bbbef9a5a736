//! 简单多边形及其两两度量：包围盒、面积、墙体接触长度与精确相交面积。
//!
//! 所有度量与顶点绕向无关，内部会先统一为逆时针顺序。

use crate::errors::GeometryError;
use crate::geometry::{BoundaryLine, Bounds2D, GEOMETRY_EPSILON, Line, Vector2F};

/// 有序顶点构成的闭合简单多边形。
///
/// 边界（边列表）总是按需从顶点推导，不做缓存，因此修改顶点后不会读到过期的边界。
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon2d {
    points: Vec<Vector2F>,
}

impl Polygon2d {
    /// 顶点少于三个或相邻顶点重合（含首尾）时返回错误。
    pub fn new(points: Vec<Vector2F>) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::TooFewPoints {
                count: points.len(),
            });
        }
        let polygon = Self { points };
        for edge in polygon.edges() {
            Line::try_new(edge.start, edge.end)?;
        }
        Ok(polygon)
    }

    #[inline]
    pub fn points(&self) -> &[Vector2F] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 对每个顶点应用映射，顶点数量保持不变。
    pub fn map_points(&mut self, mut f: impl FnMut(Vector2F) -> Vector2F) {
        for point in &mut self.points {
            *point = f(*point);
        }
    }

    pub fn translate(&mut self, offset: Vector2F) {
        self.map_points(|p| p + offset);
    }

    /// 以原点（而非中心）为基准缩放。
    pub fn scale(&mut self, factor: f64) {
        self.map_points(|p| p * factor);
    }

    /// 依次返回每条边，最后一条边由末顶点回到首顶点。
    pub fn edges(&self) -> impl Iterator<Item = Line> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| Line::new(self.points[i], self.points[(i + 1) % n]))
    }

    /// 用调用方提供的分类策略生成边界。
    pub fn boundary_with<F>(&self, classify: F) -> Vec<BoundaryLine>
    where
        F: FnMut(Line) -> BoundaryLine,
    {
        self.edges().map(classify).collect()
    }

    /// 默认边界：每条边都可以放门。
    pub fn boundary(&self) -> Vec<BoundaryLine> {
        self.boundary_with(BoundaryLine::eligible)
    }

    pub fn bounding_box(&self) -> Bounds2D {
        Bounds2D::from_points(&self.points)
    }

    /// 包围盒中点，不是面积质心。
    pub fn center(&self) -> Vector2F {
        self.bounding_box().center()
    }

    /// 鞋带公式求有向面积，逆时针为正。
    pub fn signed_area(&self) -> f64 {
        shoelace(&self.points) * 0.5
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// 射线法判断点是否在内部。恰好落在边上的点结果不做保证。
    pub fn contains_point(&self, point: Vector2F) -> bool {
        contains(&self.points, point)
    }

    /// 两个多边形墙体重合的总长度。
    ///
    /// 仅统计反向且共线的边对（即两个房间从外侧贴合的墙），结果是长度而非面积。
    pub fn contact_area(a: &Polygon2d, b: &Polygon2d) -> f64 {
        let a_points = a.counter_clockwise_points();
        let b_points = b.counter_clockwise_points();

        let mut total = 0.0;
        for edge_a in loop_edges(&a_points) {
            for edge_b in loop_edges(&b_points) {
                total += anti_parallel_overlap(&edge_a, &edge_b);
            }
        }
        total
    }

    /// 两个简单多边形的精确相交面积（可为凹多边形）。
    ///
    /// 沿相交区域的边界做格林公式积分：A 的边位于 B 内部的部分与 B 的边位于 A 内部的部分
    /// 共同围成交集边界。同向重合的墙只计一次，反向重合的墙不属于交集。
    /// 复杂度为两者边数的乘积再乘以边数，调用方应先做包围盒粗筛。
    pub fn collide_area(a: &Polygon2d, b: &Polygon2d) -> f64 {
        let a_points = a.counter_clockwise_points();
        let b_points = b.counter_clockwise_points();

        let twice_area = clipped_boundary_integral(&a_points, &b_points, SharedWall::Keep)
            + clipped_boundary_integral(&b_points, &a_points, SharedWall::Skip);
        (twice_area * 0.5).max(0.0)
    }

    fn counter_clockwise_points(&self) -> Vec<Vector2F> {
        let mut points = self.points.clone();
        if shoelace(&points) < 0.0 {
            points.reverse();
        }
        points
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SharedWall {
    Keep,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Inside,
    Outside,
    OnBoundary { same_direction: bool },
}

fn shoelace(points: &[Vector2F]) -> f64 {
    loop_edges(points)
        .map(|edge| edge.start.cross(edge.end))
        .sum()
}

fn loop_edges(points: &[Vector2F]) -> impl Iterator<Item = Line> + '_ {
    let n = points.len();
    (0..n).map(move |i| Line::new(points[i], points[(i + 1) % n]))
}

fn contains(points: &[Vector2F], point: Vector2F) -> bool {
    let mut inside = false;
    for edge in loop_edges(points) {
        let (a, b) = (edge.start, edge.end);
        if (a.y() > point.y()) != (b.y() > point.y()) {
            let x = a.x() + (point.y() - a.y()) * (b.x() - a.x()) / (b.y() - a.y());
            if point.x() < x {
                inside = !inside;
            }
        }
    }
    inside
}

fn anti_parallel_overlap(a: &Line, b: &Line) -> f64 {
    let length = a.length();
    if length <= GEOMETRY_EPSILON || b.length() <= GEOMETRY_EPSILON {
        return 0.0;
    }
    let axis = a.direction() / length;
    let other = b.direction() / b.length();

    if axis.cross(other).abs() > GEOMETRY_EPSILON || axis.dot(other) >= 0.0 {
        return 0.0;
    }
    if axis.cross(b.start - a.start).abs() > GEOMETRY_EPSILON {
        return 0.0;
    }

    let t0 = axis.dot(b.start - a.start);
    let t1 = axis.dot(b.end - a.start);
    let lo = t0.min(t1).max(0.0);
    let hi = t0.max(t1).min(length);
    (hi - lo).max(0.0)
}

/// `subject` 的每条边在 `clip` 内部的部分对鞋带和的贡献（两倍面积）。
fn clipped_boundary_integral(
    subject: &[Vector2F],
    clip: &[Vector2F],
    shared: SharedWall,
) -> f64 {
    let mut sum = 0.0;
    for edge in loop_edges(subject) {
        let direction = edge.direction();
        let mut cuts = vec![0.0, 1.0];
        for other in loop_edges(clip) {
            cut_parameters(&edge, &other, &mut cuts);
        }
        cuts.sort_by(f64::total_cmp);
        cuts.dedup_by(|a, b| (*a - *b).abs() <= GEOMETRY_EPSILON);

        for window in cuts.windows(2) {
            let (t0, t1) = (window[0], window[1]);
            if t1 - t0 <= GEOMETRY_EPSILON {
                continue;
            }
            let start = edge.start + direction * t0;
            let end = edge.start + direction * t1;
            let mid = edge.start + direction * ((t0 + t1) * 0.5);

            let inside = match locate(mid, direction, clip) {
                Location::Inside => true,
                Location::Outside => false,
                Location::OnBoundary { same_direction } => {
                    shared == SharedWall::Keep && same_direction
                }
            };
            if inside {
                sum += start.cross(end);
            }
        }
    }
    sum
}

/// 收集 `other` 与 `edge` 的交点在 `edge` 上的参数（0..1 之间）。
fn cut_parameters(edge: &Line, other: &Line, cuts: &mut Vec<f64>) {
    let d = edge.direction();
    let e = other.direction();
    let offset = other.start - edge.start;
    let denom = d.cross(e);
    let scale = d.magnitude() * e.magnitude();
    if scale <= f64::EPSILON {
        return;
    }

    if denom.abs() > GEOMETRY_EPSILON * scale {
        let t = offset.cross(e) / denom;
        let u = offset.cross(d) / denom;
        let slack = GEOMETRY_EPSILON;
        if t > 0.0 && t < 1.0 && u >= -slack && u <= 1.0 + slack {
            cuts.push(t);
        }
        return;
    }

    // 平行：仅当共线时，把对方端点投影为切分点。
    if offset.cross(d).abs() > GEOMETRY_EPSILON * d.magnitude() {
        return;
    }
    let len_sq = d.magnitude_squared();
    for point in [other.start, other.end] {
        let t = (point - edge.start).dot(d) / len_sq;
        if t > 0.0 && t < 1.0 {
            cuts.push(t);
        }
    }
}

fn locate(point: Vector2F, direction: Vector2F, polygon: &[Vector2F]) -> Location {
    let tolerance = GEOMETRY_EPSILON * GEOMETRY_EPSILON;
    for edge in loop_edges(polygon) {
        if edge.distance_squared_to_point(point) <= tolerance {
            return Location::OnBoundary {
                same_direction: direction.dot(edge.direction()) > 0.0,
            };
        }
    }
    if contains(polygon, point) {
        Location::Inside
    } else {
        Location::Outside
    }
}
