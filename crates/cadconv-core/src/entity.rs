//! CAD实体
//!
//! 实体保留其 DXF 类型名，类型查询和渲染过滤都基于这个名字。

use crate::geometry::Geometry;
use crate::properties::Properties;
use serde::{Deserialize, Serialize};

/// 实体的 DXF 类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Point,
    Line,
    Circle,
    Arc,
    LwPolyline,
    Polyline,
    Ellipse,
    Spline,
    Solid,
    Trace,
    Text,
    MText,
    Insert,
    Dimension,
}

impl EntityKind {
    /// DXF 类型名（大写，如 `TEXT`、`MTEXT`）
    pub fn dxftype(&self) -> &'static str {
        match self {
            EntityKind::Point => "POINT",
            EntityKind::Line => "LINE",
            EntityKind::Circle => "CIRCLE",
            EntityKind::Arc => "ARC",
            EntityKind::LwPolyline => "LWPOLYLINE",
            EntityKind::Polyline => "POLYLINE",
            EntityKind::Ellipse => "ELLIPSE",
            EntityKind::Spline => "SPLINE",
            EntityKind::Solid => "SOLID",
            EntityKind::Trace => "TRACE",
            EntityKind::Text => "TEXT",
            EntityKind::MText => "MTEXT",
            EntityKind::Insert => "INSERT",
            EntityKind::Dimension => "DIMENSION",
        }
    }

    /// TEXT 或 MTEXT
    pub fn is_text(&self) -> bool {
        matches!(self, EntityKind::Text | EntityKind::MText)
    }
}

/// CAD实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,

    /// 几何类型和数据
    pub geometry: Geometry,

    /// 视觉属性
    pub properties: Properties,

    /// 所属图层名
    pub layer: String,
}

impl Entity {
    pub fn new(kind: EntityKind, geometry: Geometry) -> Self {
        Self {
            kind,
            geometry,
            properties: Properties::default(),
            layer: "0".to_string(),
        }
    }

    pub fn dxftype(&self) -> &'static str {
        self.kind.dxftype()
    }

    /// 使用指定的图层
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    /// 使用指定的属性
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }
}
