//! 2D变换操作
//!
//! 块引用展开和画布映射使用的仿射变换。

use crate::math::{Matrix3, Point2, Vector2};
use serde::{Deserialize, Serialize};

/// 2D仿射变换
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    matrix: Matrix3,
}

impl Transform2D {
    /// 创建单位变换
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// 创建平移变换
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            matrix: Matrix3::new(
                1.0, 0.0, dx,
                0.0, 1.0, dy,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 创建旋转变换（绕原点，弧度）
    pub fn rotation(angle: f64) -> Self {
        let cos = angle.cos();
        let sin = angle.sin();
        Self {
            matrix: Matrix3::new(
                cos, -sin, 0.0,
                sin, cos, 0.0,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 创建缩放变换（绕原点）
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            matrix: Matrix3::new(
                sx, 0.0, 0.0,
                0.0, sy, 0.0,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 块插入变换：先减去块基点，再缩放、旋转，最后平移到插入点
    pub fn insert(insertion: Point2, base_point: Point2, scale: Vector2, rotation: f64) -> Self {
        Self::translation(insertion.x, insertion.y)
            .then(&Self::rotation(rotation))
            .then(&Self::scale(scale.x, scale.y))
            .then(&Self::translation(-base_point.x, -base_point.y))
    }

    /// 组合两个变换（self 在后，other 在前）
    pub fn then(&self, other: &Transform2D) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// 变换一个点
    pub fn transform_point(&self, point: &Point2) -> Point2 {
        let v = self.matrix * nalgebra::Vector3::new(point.x, point.y, 1.0);
        Point2::new(v.x, v.y)
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}
