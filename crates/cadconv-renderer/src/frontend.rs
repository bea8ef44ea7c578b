//! 渲染前端
//!
//! 把文档实体解释为绘图指令：
//! - 解析颜色（ACI、BYLAYER、BYBLOCK）和线宽
//! - 递归展开块引用
//! - 文字转字形轮廓（字高乘以文字缩放）
//! - 通过实体过滤器跳过不需要的实体
//!
//! 所有指令先在世界坐标中收集，计算范围后再映射到后端画布。

use crate::backend::{Backend, StrokeStyle};
use crate::camera::Camera2D;
use crate::font::FontFace;
use cadconv_core::entity::Entity;
use cadconv_core::geometry::{Geometry, Text};
use cadconv_core::math::{BoundingBox2, Point2};
use cadconv_core::properties::{Color, ColorRef, LineWeight};
use cadconv_core::transform::Transform2D;
use cadconv_file::Document;
use tracing::{debug, warn};

/// 块引用的最大嵌套深度
pub const MAX_BLOCK_DEPTH: usize = 16;

/// 画布四周的留白比例
const FIT_MARGIN: f64 = 0.02;

/// 最细线宽（毫米）
const MIN_LINE_WEIGHT_MM: f64 = 0.13;

/// 点实体的绘制半径（毫米）
const POINT_RADIUS_MM: f64 = 0.2;

/// 渲染上下文：文档及其背景色
pub struct RenderContext<'a> {
    document: &'a Document,
    background: Color,
}

impl<'a> RenderContext<'a> {
    pub fn new(document: &'a Document, background: Color) -> Self {
        Self {
            document,
            background,
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// 图层是否打开（未定义的图层视为打开）
    pub fn is_layer_visible(&self, layer: &str) -> bool {
        self.document.layer(layer).map_or(true, |l| l.visible)
    }

    /// 将颜色引用解析为实际颜色
    ///
    /// `parent` 为所在块引用的颜色，顶层实体为 None。
    pub fn resolve_color(&self, color: ColorRef, layer: &str, parent: Option<Color>) -> Color {
        let color = match color {
            ColorRef::ByBlock => return parent.unwrap_or_else(|| self.background.contrasting()),
            ColorRef::ByLayer => {
                // 块内 0 层上的实体随块引用
                if let (Some(parent), true) = (parent, layer == "0") {
                    return parent;
                }
                self.document
                    .layer(layer)
                    .map(|l| l.color)
                    .unwrap_or(ColorRef::Index(7))
            }
            other => other,
        };

        match color {
            ColorRef::Rgb(c) => c,
            ColorRef::Index(i) if color.is_foreground() || i == 0 => self.background.contrasting(),
            ColorRef::Index(i) => Color::from_aci(i),
            ColorRef::ByLayer | ColorRef::ByBlock => self.background.contrasting(),
        }
    }

    /// 解析线宽（毫米）
    pub fn resolve_line_weight(&self, weight: LineWeight, layer: &str, parent: Option<f64>) -> f64 {
        match weight {
            LineWeight::ByBlock => parent.unwrap_or(LineWeight::DEFAULT_MM),
            LineWeight::ByLayer => self
                .document
                .layer(layer)
                .map_or(LineWeight::DEFAULT_MM, |l| {
                    l.line_weight.to_mm(LineWeight::DEFAULT_MM)
                }),
            other => other.to_mm(LineWeight::DEFAULT_MM),
        }
    }
}

/// 前端参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontendConfig {
    /// 字高缩放
    pub text_scale: f64,
    /// 线宽缩放
    pub line_width_scale: f64,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            text_scale: 1.0,
            line_width_scale: 1.0,
        }
    }
}

/// 收集到的绘图指令（世界坐标）
#[derive(Debug, Clone)]
enum DrawItem {
    Stroke {
        points: Vec<Point2>,
        closed: bool,
        color: Color,
        width_mm: f64,
    },
    Fill {
        contours: Vec<Vec<Point2>>,
        color: Color,
    },
    Dot {
        center: Point2,
        color: Color,
    },
}

impl DrawItem {
    fn bounding_box(&self) -> BoundingBox2 {
        match self {
            DrawItem::Stroke { points, .. } => BoundingBox2::from_points(points.iter().copied()),
            DrawItem::Fill { contours, .. } => {
                BoundingBox2::from_points(contours.iter().flatten().copied())
            }
            DrawItem::Dot { center, .. } => BoundingBox2::new(*center, *center),
        }
    }
}

/// 实体过滤器：返回 false 的实体不绘制
pub type EntityFilter<'f> = dyn Fn(&Entity) -> bool + 'f;

/// 只保留非文字实体（过滤 TEXT 和 MTEXT）
pub fn exclude_text(entity: &Entity) -> bool {
    !entity.kind.is_text()
}

/// 继承自块引用的属性
#[derive(Debug, Clone, Copy)]
struct Inherited {
    transform: Transform2D,
    color: Option<Color>,
    width_mm: Option<f64>,
    depth: usize,
}

impl Default for Inherited {
    fn default() -> Self {
        Self {
            transform: Transform2D::identity(),
            color: None,
            width_mm: None,
            depth: 0,
        }
    }
}

/// 渲染前端
pub struct Frontend<'a> {
    ctx: RenderContext<'a>,
    config: FrontendConfig,
    font: Option<&'a FontFace>,
    filter: Option<Box<EntityFilter<'a>>>,
    missing_font_warned: bool,
}

impl<'a> Frontend<'a> {
    pub fn new(ctx: RenderContext<'a>, config: FrontendConfig) -> Self {
        Self {
            ctx,
            config,
            font: None,
            filter: None,
            missing_font_warned: false,
        }
    }

    /// 所有文字使用的字体
    pub fn with_font(mut self, font: Option<&'a FontFace>) -> Self {
        self.font = font;
        self
    }

    /// 设置实体过滤器（同样作用于块内实体）
    pub fn with_filter(mut self, filter: impl Fn(&Entity) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// 绘制模型空间；返回绘制的图元数量
    pub fn draw_layout(&mut self, backend: &mut dyn Backend) -> usize {
        let items = self.collect_items();

        backend.clear(self.ctx.background());

        let bbox = items
            .iter()
            .fold(BoundingBox2::empty(), |acc, item| acc.union(&item.bounding_box()));
        if !bbox.is_valid() {
            debug!("Nothing to draw");
            return 0;
        }

        let (width, height) = backend.size();
        let mut camera = Camera2D::new(width, height);
        camera.zoom_to_fit(&bbox, FIT_MARGIN);

        let per_mm = backend.units_per_mm();
        for item in &items {
            match item {
                DrawItem::Stroke {
                    points,
                    closed,
                    color,
                    width_mm,
                } => {
                    let screen: Vec<Point2> =
                        points.iter().map(|p| camera.world_to_screen(*p)).collect();
                    let style = StrokeStyle {
                        color: *color,
                        width: width_mm.max(MIN_LINE_WEIGHT_MM)
                            * self.config.line_width_scale
                            * per_mm,
                    };
                    backend.stroke(&screen, *closed, &style);
                }
                DrawItem::Fill { contours, color } => {
                    let screen: Vec<Vec<Point2>> = contours
                        .iter()
                        .map(|c| c.iter().map(|p| camera.world_to_screen(*p)).collect())
                        .collect();
                    backend.fill(&screen, *color);
                }
                DrawItem::Dot { center, color } => {
                    let c = camera.world_to_screen(*center);
                    let r = POINT_RADIUS_MM * per_mm;
                    let dot: Vec<Point2> = (0..12)
                        .map(|i| {
                            let a = std::f64::consts::TAU * f64::from(i) / 12.0;
                            Point2::new(c.x + r * a.cos(), c.y + r * a.sin())
                        })
                        .collect();
                    backend.fill(&[dot], *color);
                }
            }
        }
        items.len()
    }

    fn collect_items(&mut self) -> Vec<DrawItem> {
        let document = self.ctx.document();
        let mut items = Vec::new();
        for entity in document.modelspace() {
            self.collect_entity(entity, Inherited::default(), &mut items);
        }
        items
    }

    fn passes_filter(&self, entity: &Entity) -> bool {
        self.filter.as_ref().map_or(true, |f| f(entity))
    }

    fn collect_entity(&mut self, entity: &Entity, inherited: Inherited, items: &mut Vec<DrawItem>) {
        if !self.passes_filter(entity) || !self.ctx.is_layer_visible(&entity.layer) {
            return;
        }

        let color = self
            .ctx
            .resolve_color(entity.properties.color, &entity.layer, inherited.color);
        let width_mm =
            self.ctx
                .resolve_line_weight(entity.properties.line_weight, &entity.layer, inherited.width_mm);
        let transform = &inherited.transform;

        match &entity.geometry {
            Geometry::BlockRef(block_ref) => {
                if inherited.depth >= MAX_BLOCK_DEPTH {
                    warn!("Block nesting deeper than {} at '{}'", MAX_BLOCK_DEPTH, block_ref.name);
                    return;
                }
                let Some(block) = self.ctx.document().block(&block_ref.name) else {
                    debug!("Undefined block '{}'", block_ref.name);
                    return;
                };
                let local = Transform2D::insert(
                    block_ref.insertion,
                    block.base_point,
                    block_ref.scale,
                    block_ref.rotation,
                );
                let child = Inherited {
                    transform: transform.then(&local),
                    color: Some(color),
                    width_mm: Some(width_mm),
                    depth: inherited.depth + 1,
                };
                for sub in &block.entities {
                    self.collect_entity(sub, child, items);
                }
            }

            Geometry::Text(text) => {
                let Some(font) = self.font else {
                    if !self.missing_font_warned {
                        warn!("No usable font found, text entities are skipped");
                        self.missing_font_warned = true;
                    }
                    return;
                };
                let mut scaled: Text = text.clone();
                scaled.height *= self.config.text_scale;
                let contours: Vec<Vec<Point2>> = font
                    .text_outlines(&scaled)
                    .into_iter()
                    .map(|c| c.iter().map(|p| transform.transform_point(p)).collect())
                    .collect();
                if !contours.is_empty() {
                    items.push(DrawItem::Fill { contours, color });
                }
            }

            Geometry::Point(point) => items.push(DrawItem::Dot {
                center: transform.transform_point(&point.position),
                color,
            }),

            geometry => {
                for path in geometry.to_paths() {
                    let points: Vec<Point2> =
                        path.points.iter().map(|p| transform.transform_point(p)).collect();
                    if path.filled {
                        items.push(DrawItem::Fill {
                            contours: vec![points],
                            color,
                        });
                    } else {
                        items.push(DrawItem::Stroke {
                            points,
                            closed: path.closed,
                            color,
                            width_mm,
                        });
                    }
                }
            }
        }
    }
}
