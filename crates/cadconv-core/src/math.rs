//! 数学基础类型
//!
//! 基于 nalgebra 提供的向量和点类型的别名。

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// 2D点类型
pub type Point2 = na::Point2<f64>;

/// 2D向量类型
pub type Vector2 = na::Vector2<f64>;

/// 2D齐次变换矩阵
pub type Matrix3 = na::Matrix3<f64>;

/// 数值容差，用于几何比较
pub const EPSILON: f64 = 1e-10;

/// 判断两个浮点数是否近似相等
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// 2D包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// 创建空的包围盒（无效状态，可用于累加）
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::MAX, f64::MAX),
            max: Point2::new(f64::MIN, f64::MIN),
        }
    }

    /// 从点集创建包围盒
    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    /// 是否包含至少一个点
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    pub fn expand_to_include(&mut self, point: &Point2) {
        if !point.x.is_finite() || !point.y.is_finite() {
            return;
        }
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// 合并两个包围盒；无效的一方被忽略
    pub fn union(&self, other: &Self) -> Self {
        if !other.is_valid() {
            return *self;
        }
        if !self.is_valid() {
            return *other;
        }
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn contains(&self, point: &Point2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// 四个角点（逆时针，从左下开始）
    pub fn corners(&self) -> [Point2; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }
}
