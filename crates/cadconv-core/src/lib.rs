//! cadconv 核心几何
//!
//! 提供渲染 DXF 模型空间所需的2D几何图元、颜色和变换。
//!
//! # 架构设计
//!
//! - `Entity`: DXF 类型名 + 几何 + 属性 + 图层
//! - `Geometry`: 几何数据（线、圆、多段线、文本、块引用等）
//! - `Properties`: 视觉属性（颜色、线宽）
//!
//! # 示例
//!
//! ```rust
//! use cadconv_core::prelude::*;
//!
//! let line = Line::new(Point2::origin(), Point2::new(100.0, 50.0));
//! let entity = Entity::new(EntityKind::Line, Geometry::Line(line));
//! assert_eq!(entity.dxftype(), "LINE");
//! ```

pub mod entity;
pub mod geometry;
pub mod math;
pub mod properties;
pub mod transform;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::entity::{Entity, EntityKind};
    pub use crate::geometry::{
        Arc, BlockRef, Circle, Ellipse, Geometry, Line, Point, Polyline, PolylineVertex, Solid,
        Spline, Text, TextAlignment, VerticalAlignment,
    };
    pub use crate::math::{BoundingBox2, Point2, Vector2};
    pub use crate::properties::{Color, ColorRef, LineWeight, Properties};
    pub use crate::transform::Transform2D;
}
