use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::errors::GeometryError;

/// 几何比较使用的统一容差。平移、缩放与取整之后的端点比较都以此为准。
pub const GEOMETRY_EPSILON: f64 = 1e-6;

/// 二维浮点向量，内部以 `glam::DVec2` 表示。既表示点也表示位移。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2F(pub DVec2);

impl Vector2F {
    pub const ZERO: Self = Self(DVec2::ZERO);

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    #[inline]
    pub fn x(self) -> f64 {
        self.0.x
    }

    #[inline]
    pub fn y(self) -> f64 {
        self.0.y
    }

    #[inline]
    pub fn as_vec2(self) -> DVec2 {
        self.0
    }

    #[inline]
    pub fn magnitude(self) -> f64 {
        self.0.length()
    }

    #[inline]
    pub fn magnitude_squared(self) -> f64 {
        self.0.length_squared()
    }

    #[inline]
    pub fn dot(self, other: Vector2F) -> f64 {
        self.0.dot(other.0)
    }

    /// 二维叉积（z 分量），正值表示 `other` 位于 `self` 的逆时针一侧。
    #[inline]
    pub fn cross(self, other: Vector2F) -> f64 {
        self.0.perp_dot(other.0)
    }

    /// 绕原点逆时针旋转 `radians` 弧度。
    #[inline]
    pub fn rotate(self, radians: f64) -> Self {
        Self(DVec2::from_angle(radians).rotate(self.0))
    }

    /// 分量取整，中点远离零（`2.5 -> 3`，`-2.5 -> -3`）。
    #[inline]
    pub fn round_half_away(self) -> Self {
        Self::new(self.0.x.round(), self.0.y.round())
    }

    #[inline]
    pub fn approx_eq(self, other: Vector2F) -> bool {
        (self.0.x - other.0.x).abs() <= GEOMETRY_EPSILON
            && (self.0.y - other.0.y).abs() <= GEOMETRY_EPSILON
    }

    #[inline]
    pub fn min(self, other: Vector2F) -> Self {
        Self(self.0.min(other.0))
    }

    #[inline]
    pub fn max(self, other: Vector2F) -> Self {
        Self(self.0.max(other.0))
    }
}

impl From<DVec2> for Vector2F {
    fn from(value: DVec2) -> Self {
        Self(value)
    }
}

impl From<(f64, f64)> for Vector2F {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Vector2F {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Vector2F {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Vector2F {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Vector2F {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<f64> for Vector2F {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self(self.0 * rhs)
    }
}

impl MulAssign<f64> for Vector2F {
    fn mul_assign(&mut self, rhs: f64) {
        self.0 *= rhs;
    }
}

impl Div<f64> for Vector2F {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self(self.0 / rhs)
    }
}

impl Neg for Vector2F {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

/// 有向线段。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Vector2F,
    pub end: Vector2F,
}

impl Line {
    #[inline]
    pub fn new(start: Vector2F, end: Vector2F) -> Self {
        Self { start, end }
    }

    /// 构造线段并拒绝起点与终点重合的退化情况。
    pub fn try_new(start: Vector2F, end: Vector2F) -> Result<Self, GeometryError> {
        if start.approx_eq(end) {
            return Err(GeometryError::DegenerateLine {
                x: start.x(),
                y: start.y(),
            });
        }
        Ok(Self { start, end })
    }

    #[inline]
    pub fn direction(&self) -> Vector2F {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().magnitude()
    }

    #[inline]
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    #[inline]
    pub fn translate(&mut self, offset: Vector2F) {
        self.start += offset;
        self.end += offset;
    }

    #[inline]
    pub fn scale(&mut self, factor: f64) {
        self.start *= factor;
        self.end *= factor;
    }

    #[inline]
    pub fn translated(&self, offset: Vector2F) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }

    /// 端点在容差内相等即视为同一线段，不区分方向。
    pub fn approx_eq(&self, other: &Line) -> bool {
        (self.start.approx_eq(other.start) && self.end.approx_eq(other.end))
            || (self.start.approx_eq(other.end) && self.end.approx_eq(other.start))
    }

    /// 点到线段的最短距离平方。
    pub fn distance_squared_to_point(&self, point: Vector2F) -> f64 {
        let dir = self.direction();
        let len_sq = dir.magnitude_squared();
        if len_sq <= f64::EPSILON {
            return (point - self.start).magnitude_squared();
        }
        let t = ((point - self.start).dot(dir) / len_sq).clamp(0.0, 1.0);
        let closest = self.start + dir * t;
        (point - closest).magnitude_squared()
    }
}

/// 多边形边界上的一条边，附带门位信息。
///
/// 通过构造函数保证 `is_door` 蕴含 `can_contain_door`。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryLine {
    pub line: Line,
    can_contain_door: bool,
    is_door: bool,
}

impl BoundaryLine {
    #[inline]
    pub fn plain(line: Line) -> Self {
        Self {
            line,
            can_contain_door: false,
            is_door: false,
        }
    }

    #[inline]
    pub fn eligible(line: Line) -> Self {
        Self {
            line,
            can_contain_door: true,
            is_door: false,
        }
    }

    #[inline]
    pub fn door(line: Line) -> Self {
        Self {
            line,
            can_contain_door: true,
            is_door: true,
        }
    }

    #[inline]
    pub fn can_contain_door(&self) -> bool {
        self.can_contain_door
    }

    #[inline]
    pub fn is_door(&self) -> bool {
        self.is_door
    }
}

/// 轴对齐边界框。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2D {
    min: Vector2F,
    max: Vector2F,
}

impl Bounds2D {
    #[inline]
    pub fn new(min: Vector2F, max: Vector2F) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn empty() -> Self {
        Self {
            min: Vector2F::new(f64::INFINITY, f64::INFINITY),
            max: Vector2F::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vector2F>) -> Self {
        let mut bounds = Self::empty();
        for point in points {
            bounds.include_point(*point);
        }
        bounds
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x() > self.max.x() || self.min.y() > self.max.y()
    }

    #[inline]
    pub fn min(&self) -> Vector2F {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Vector2F {
        self.max
    }

    pub fn include_point(&mut self, point: Vector2F) {
        if self.is_empty() {
            self.min = point;
            self.max = point;
            return;
        }
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn include_bounds(&mut self, other: &Bounds2D) {
        if other.is_empty() {
            return;
        }
        self.include_point(other.min);
        self.include_point(other.max);
    }

    #[inline]
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.x() - self.min.x()
        }
    }

    #[inline]
    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max.y() - self.min.y()
        }
    }

    #[inline]
    pub fn center(&self) -> Vector2F {
        debug_assert!(!self.is_empty());
        (self.min + self.max) * 0.5
    }

    /// 两个包围盒在两个轴上都有交集（含边界接触）时返回 `true`。
    pub fn overlaps(&self, other: &Bounds2D) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.max.x() >= other.min.x()
            && self.min.x() <= other.max.x()
            && self.max.y() >= other.min.y()
            && self.min.y() <= other.max.y()
    }
}
