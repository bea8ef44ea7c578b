//! 几何图元定义
//!
//! 支持的基本图元：
//! - 点 (Point)
//! - 线段 (Line)
//! - 圆 (Circle)
//! - 圆弧 (Arc)
//! - 多段线 (Polyline，含凸度)
//! - 椭圆 (Ellipse)
//! - 样条曲线 (Spline)
//! - 实心填充 (Solid)
//! - 文本 (Text)
//! - 块引用 (BlockRef)
//!
//! 除文本和块引用外，所有图元都可以离散为 [`Path2`] 供渲染后端使用。

use crate::math::{Point2, Vector2, EPSILON};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// 圆弧离散化的角度步长（5°）
const ARC_STEP: f64 = PI / 36.0;

/// 几何类型枚举
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Geometry {
    Point(Point),
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    Polyline(Polyline),
    Ellipse(Ellipse),
    Spline(Spline),
    Solid(Solid),
    Text(Text),
    BlockRef(BlockRef),
}

/// 离散后的路径
#[derive(Debug, Clone, PartialEq)]
pub struct Path2 {
    pub points: Vec<Point2>,
    pub closed: bool,
    /// 是否填充（否则描边）
    pub filled: bool,
}

impl Path2 {
    pub fn open(points: Vec<Point2>) -> Self {
        Self {
            points,
            closed: false,
            filled: false,
        }
    }

    pub fn closed(points: Vec<Point2>) -> Self {
        Self {
            points,
            closed: true,
            filled: false,
        }
    }

    pub fn fill(points: Vec<Point2>) -> Self {
        Self {
            points,
            closed: true,
            filled: true,
        }
    }
}

impl Geometry {
    /// 离散为路径（文本和块引用返回空）
    pub fn to_paths(&self) -> Vec<Path2> {
        match self {
            Geometry::Point(p) => vec![Path2::open(vec![p.position, p.position])],
            Geometry::Line(l) => vec![Path2::open(vec![l.start, l.end])],
            Geometry::Circle(c) => vec![Path2::closed(c.sample_points())],
            Geometry::Arc(a) => {
                let points = a.sample_points();
                if points.is_empty() {
                    Vec::new()
                } else {
                    vec![Path2::open(points)]
                }
            }
            Geometry::Polyline(pl) => {
                let points = pl.flatten();
                if points.is_empty() {
                    Vec::new()
                } else if pl.closed {
                    vec![Path2::closed(points)]
                } else {
                    vec![Path2::open(points)]
                }
            }
            Geometry::Ellipse(e) => {
                let points = e.sample_points(e.segment_count());
                if points.is_empty() {
                    Vec::new()
                } else if e.is_full() {
                    vec![Path2::closed(points)]
                } else {
                    vec![Path2::open(points)]
                }
            }
            Geometry::Spline(s) => {
                let points = s.sample_points(s.segment_count());
                if points.len() < 2 {
                    Vec::new()
                } else if s.closed {
                    vec![Path2::closed(points)]
                } else {
                    vec![Path2::open(points)]
                }
            }
            Geometry::Solid(s) => vec![Path2::fill(s.outline())],
            Geometry::Text(_) | Geometry::BlockRef(_) => Vec::new(),
        }
    }
}

/// 将角度差归一化到 (0, 2π]；非有限值返回 `None`
fn normalized_sweep(delta: f64) -> Option<f64> {
    if !delta.is_finite() {
        return None;
    }
    let sweep = delta.rem_euclid(TAU);
    Some(if sweep <= EPSILON { TAU } else { sweep })
}

/// 按角度范围计算分段数
fn arc_segments(sweep: f64) -> usize {
    ((sweep.abs() / ARC_STEP).ceil() as usize).max(4)
}

/// 点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub position: Point2,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point2::new(x, y),
        }
    }
}

/// 线段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub start: Point2,
    pub end: Point2,
}

impl Line {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// 圆
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point2, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        Point2::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    /// 采样点（不含重复的终点）
    pub fn sample_points(&self) -> Vec<Point2> {
        let segments = arc_segments(TAU);
        (0..segments)
            .map(|i| self.point_at_angle(TAU * i as f64 / segments as f64))
            .collect()
    }
}

/// 圆弧（逆时针，从起始角到终止角）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point2,
    pub radius: f64,
    /// 起始角度（弧度）
    pub start_angle: f64,
    /// 终止角度（弧度）
    pub end_angle: f64,
}

impl Arc {
    pub fn new(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
        }
    }

    /// 扫过的角度，范围 (0, 2π]；角度不是有限值时为 `None`
    pub fn sweep_angle(&self) -> Option<f64> {
        normalized_sweep(self.end_angle - self.start_angle)
    }

    /// 采样点；角度无效时为空
    pub fn sample_points(&self) -> Vec<Point2> {
        let Some(sweep) = self.sweep_angle() else {
            return Vec::new();
        };
        let segments = arc_segments(sweep);
        (0..=segments)
            .map(|i| {
                let angle = self.start_angle + sweep * i as f64 / segments as f64;
                Point2::new(
                    self.center.x + self.radius * angle.cos(),
                    self.center.y + self.radius * angle.sin(),
                )
            })
            .collect()
    }
}

/// 多段线顶点
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PolylineVertex {
    pub point: Point2,
    /// 凸度（bulge）- 用于弧线段，0表示直线
    pub bulge: f64,
}

impl PolylineVertex {
    pub fn new(point: Point2) -> Self {
        Self { point, bulge: 0.0 }
    }

    pub fn with_bulge(point: Point2, bulge: f64) -> Self {
        Self { point, bulge }
    }
}

/// 多段线
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polyline {
    pub vertices: Vec<PolylineVertex>,
    /// 是否闭合
    pub closed: bool,
}

impl Polyline {
    pub fn new(vertices: Vec<PolylineVertex>, closed: bool) -> Self {
        Self { vertices, closed }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point2>, closed: bool) -> Self {
        Self {
            vertices: points.into_iter().map(PolylineVertex::new).collect(),
            closed,
        }
    }

    /// 展开为折线点列，弧线段按凸度离散
    pub fn flatten(&self) -> Vec<Point2> {
        let n = self.vertices.len();
        let Some(first) = self.vertices.first() else {
            return Vec::new();
        };

        let mut points = vec![first.point];
        let segment_count = if self.closed { n } else { n - 1 };
        for i in 0..segment_count {
            let v1 = &self.vertices[i];
            let v2 = &self.vertices[(i + 1) % n];
            if v1.bulge.abs() < EPSILON {
                points.push(v2.point);
            } else {
                points.extend(bulge_arc(v1.point, v2.point, v1.bulge).into_iter().skip(1));
            }
        }

        // 闭合多段线的终点与起点重合，由 Path2::closed 负责闭合
        if self.closed && points.len() > 1 {
            points.pop();
        }
        points
    }
}

/// 凸度弧线段离散：bulge = tan(θ/4)，正值为逆时针
fn bulge_arc(p1: Point2, p2: Point2, bulge: f64) -> Vec<Point2> {
    let chord = p2 - p1;
    let length = chord.norm();
    if length < EPSILON {
        return vec![p1, p2];
    }

    let theta = 4.0 * bulge.atan();
    let normal = Vector2::new(-chord.y, chord.x) / length;
    let offset = (length / 2.0) / (theta / 2.0).tan();
    let center = p1 + chord / 2.0 + normal * offset;
    let radius = (p1 - center).norm();
    let start = (p1.y - center.y).atan2(p1.x - center.x);

    let segments = arc_segments(theta);
    let mut points: Vec<Point2> = (0..segments)
        .map(|i| {
            let angle = start + theta * i as f64 / segments as f64;
            Point2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect();
    points.push(p2);
    points
}

/// 椭圆
///
/// - 长轴由中心点和长轴向量定义
/// - 短轴长度 = 长轴长度 × ratio
/// - 起始/终止参数用于椭圆弧
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Point2,
    /// 长轴端点（相对于中心的向量）
    pub major_axis: Vector2,
    /// 短轴与长轴的比例 (0.0 < ratio <= 1.0)
    pub ratio: f64,
    /// 起始参数（弧度，0.0 表示长轴正方向）
    pub start_param: f64,
    /// 终止参数（弧度，2π 表示完整椭圆）
    pub end_param: f64,
}

impl Ellipse {
    pub fn arc(
        center: Point2,
        major_axis: Vector2,
        ratio: f64,
        start_param: f64,
        end_param: f64,
    ) -> Self {
        Self {
            center,
            major_axis,
            ratio: ratio.clamp(EPSILON, 1.0),
            start_param,
            end_param,
        }
    }

    pub fn major_radius(&self) -> f64 {
        self.major_axis.norm()
    }

    pub fn minor_radius(&self) -> f64 {
        self.major_radius() * self.ratio
    }

    /// 参数范围，范围 (0, 2π]
    fn param_sweep(&self) -> Option<f64> {
        normalized_sweep(self.end_param - self.start_param)
    }

    pub fn is_full(&self) -> bool {
        self.param_sweep()
            .is_some_and(|sweep| (sweep - TAU).abs() < 1e-6)
    }

    fn segment_count(&self) -> usize {
        self.param_sweep().map_or(0, arc_segments)
    }

    /// 获取椭圆上指定参数的点
    ///
    /// 参数 t 是椭圆的参数化角度，不是真正的几何角度
    pub fn point_at_param(&self, t: f64) -> Point2 {
        let major_radius = self.major_radius();
        if major_radius < EPSILON {
            return self.center;
        }
        let major_dir = self.major_axis / major_radius;
        let minor_dir = Vector2::new(-major_dir.y, major_dir.x);
        self.center
            + major_dir * (major_radius * t.cos())
            + minor_dir * (self.minor_radius() * t.sin())
    }

    /// 采样点；参数无效时为空
    pub fn sample_points(&self, segments: usize) -> Vec<Point2> {
        let Some(sweep) = self.param_sweep() else {
            return Vec::new();
        };
        let count = if self.is_full() { segments } else { segments + 1 };
        (0..count)
            .map(|i| self.point_at_param(self.start_param + sweep * i as f64 / segments as f64))
            .collect()
    }
}

/// 样条曲线（B-样条 / NURBS）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spline {
    /// 曲线阶数（通常为 3）
    pub degree: usize,
    pub control_points: Vec<Point2>,
    /// 节点向量（knot vector）
    pub knots: Vec<f64>,
    /// 权重（为空时视为全为 1）
    pub weights: Vec<f64>,
    /// 拟合点（没有控制点时使用）
    pub fit_points: Vec<Point2>,
    pub closed: bool,
}

impl Spline {
    /// 节点向量是否与控制点和阶数匹配
    fn has_valid_knots(&self) -> bool {
        self.degree >= 1
            && self.control_points.len() > self.degree
            && self.knots.len() == self.control_points.len() + self.degree + 1
    }

    fn segment_count(&self) -> usize {
        (self.control_points.len().max(self.fit_points.len()) * 8).clamp(16, 512)
    }

    /// 使用 De Boor 算法计算样条曲线上的点（齐次坐标，支持权重）
    pub fn point_at_param(&self, t: f64) -> Point2 {
        let k = self.degree;
        let n = self.control_points.len();

        // 定位 t 所在的节点区间
        let mut span = k;
        while span < n - 1 && self.knots[span + 1] <= t {
            span += 1;
        }

        let weight = |i: usize| {
            if self.weights.len() == n {
                self.weights[i]
            } else {
                1.0
            }
        };

        let mut d: Vec<(f64, f64, f64)> = (0..=k)
            .map(|j| {
                let idx = j + span - k;
                let w = weight(idx);
                let p = self.control_points[idx];
                (p.x * w, p.y * w, w)
            })
            .collect();

        for r in 1..=k {
            for j in (r..=k).rev() {
                let left = self.knots[j + span - k];
                let right = self.knots[j + 1 + span - r];
                let denom = right - left;
                let alpha = if denom.abs() < EPSILON {
                    0.0
                } else {
                    (t - left) / denom
                };
                d[j] = (
                    (1.0 - alpha) * d[j - 1].0 + alpha * d[j].0,
                    (1.0 - alpha) * d[j - 1].1 + alpha * d[j].1,
                    (1.0 - alpha) * d[j - 1].2 + alpha * d[j].2,
                );
            }
        }

        let (x, y, w) = d[k];
        if w.abs() < EPSILON {
            Point2::new(x, y)
        } else {
            Point2::new(x / w, y / w)
        }
    }

    /// 获取采样点（用于渲染）
    ///
    /// 节点向量无效时退化为控制多边形，没有控制点时使用拟合点。
    pub fn sample_points(&self, segments: usize) -> Vec<Point2> {
        if !self.has_valid_knots() {
            return if self.control_points.len() >= 2 {
                self.control_points.clone()
            } else {
                self.fit_points.clone()
            };
        }

        let start = self.knots[self.degree];
        let end = self.knots[self.control_points.len()];
        (0..=segments)
            .map(|i| self.point_at_param(start + (end - start) * i as f64 / segments as f64))
            .collect()
    }
}

/// 实心填充（DXF SOLID，三角形或四边形）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solid {
    /// 按 DXF 顺序保存的四个角点（第四点可与第三点相同）
    pub corners: [Point2; 4],
}

impl Solid {
    /// DXF 中的角点顺序为 1-2-4-3，这里转换为轮廓顺序
    pub fn outline(&self) -> Vec<Point2> {
        let [a, b, c, d] = self.corners;
        if (c - d).norm() < EPSILON {
            vec![a, b, c]
        } else {
            vec![a, b, d, c]
        }
    }
}

/// 文本水平对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// 文本垂直对齐方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VerticalAlignment {
    #[default]
    Baseline,
    Bottom,
    Middle,
    Top,
}

/// 文本（TEXT 单行或 MTEXT 多行，行之间用 '\n' 分隔）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    /// 对齐基准点
    pub position: Point2,
    pub content: String,
    /// 字高
    pub height: f64,
    /// 旋转角度（弧度）
    pub rotation: f64,
    /// 宽度系数
    pub width_factor: f64,
    pub alignment: TextAlignment,
    pub vertical_alignment: VerticalAlignment,
    /// 文字样式名
    pub style: String,
}

impl Text {
    /// 行距与字高的比例
    pub const LINE_SPACING: f64 = 1.667;

    pub fn new(position: Point2, content: impl Into<String>, height: f64) -> Self {
        Self {
            position,
            content: content.into(),
            height,
            rotation: 0.0,
            width_factor: 1.0,
            alignment: TextAlignment::Left,
            vertical_alignment: VerticalAlignment::Baseline,
            style: "Standard".to_string(),
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_alignment(mut self, alignment: TextAlignment, vertical: VerticalAlignment) -> Self {
        self.alignment = alignment;
        self.vertical_alignment = vertical;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    /// 所有行的总高度
    pub fn total_height(&self) -> f64 {
        let line_count = self.lines().count().max(1) as f64;
        self.height * (1.0 + (line_count - 1.0) * Self::LINE_SPACING)
    }

    /// 首行顶部相对于基准点的纵向偏移（未旋转）
    pub fn top_offset(&self) -> f64 {
        match self.vertical_alignment {
            VerticalAlignment::Baseline => self.height,
            VerticalAlignment::Bottom => self.total_height(),
            VerticalAlignment::Middle => self.total_height() / 2.0,
            VerticalAlignment::Top => 0.0,
        }
    }
}

/// 块引用（INSERT，或标注的匿名块）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockRef {
    pub name: String,
    pub insertion: Point2,
    pub scale: Vector2,
    /// 旋转角度（弧度）
    pub rotation: f64,
}

impl BlockRef {
    pub fn new(name: impl Into<String>, insertion: Point2) -> Self {
        Self {
            name: name.into(),
            insertion,
            scale: Vector2::new(1.0, 1.0),
            rotation: 0.0,
        }
    }
}
