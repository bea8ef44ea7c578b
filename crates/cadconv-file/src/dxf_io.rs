//! DXF文件导入
//!
//! 读取以下内容：
//! - 模型空间实体（图纸空间和不可见实体被跳过）
//! - 块定义（INSERT 和标注引用的匿名块）
//! - 图层表和文字样式表

use crate::document::{Block, Document, Layer, TextStyle};
use crate::error::FileError;
use crate::mtext::{expand_special_codes, plain_mtext};
use cadconv_core::entity::{Entity, EntityKind};
use cadconv_core::geometry::{
    Arc, BlockRef, Circle, Ellipse, Geometry, Line, Point, Polyline, PolylineVertex, Solid,
    Spline, Text, TextAlignment, VerticalAlignment,
};
use cadconv_core::math::{Point2, Vector2};
use cadconv_core::properties::{Color, ColorRef, LineWeight, Properties};
use dxf::entities::EntityType;
use dxf::enums::{AttachmentPoint, HorizontalTextJustification, VerticalTextJustification};
use std::path::Path;
use tracing::debug;

/// 从DXF文件导入
pub fn import(path: &Path) -> Result<Document, FileError> {
    let drawing = dxf::Drawing::load_file(path).map_err(|e| FileError::Dxf(e.to_string()))?;
    let mut document = from_drawing(&drawing);
    document.set_file_path(path);
    Ok(document)
}

/// 将已加载的 `dxf::Drawing` 转换为文档
pub fn from_drawing(drawing: &dxf::Drawing) -> Document {
    let mut document = Document::new();

    // 导入图层
    for layer in drawing.layers() {
        let color = layer.color.index().map(ColorRef::Index).unwrap_or(ColorRef::Index(7));
        let mut new_layer = Layer::new(&layer.name).with_color(color);
        new_layer.line_weight = match LineWeight::from_dxf(layer.line_weight.raw_value()) {
            LineWeight::Width(w) => LineWeight::Width(w),
            _ => LineWeight::Default,
        };
        new_layer.visible = layer.is_layer_on;
        document.add_layer(new_layer);
    }

    // 导入文字样式
    for style in drawing.styles() {
        document.register_style(TextStyle::new(&style.name, &style.primary_font_file_name));
    }

    // 导入块定义
    for block in drawing.blocks() {
        let entities = block.entities.iter().filter_map(convert_dxf_entity).collect();
        document.add_block(Block {
            name: block.name.clone(),
            base_point: Point2::new(block.base_point.x, block.base_point.y),
            entities,
        });
    }

    // 导入模型空间实体
    let mut skipped = 0usize;
    for entity in drawing.entities() {
        if entity.common.is_in_paper_space {
            continue;
        }
        match convert_dxf_entity(entity) {
            Some(converted) => document.add_entity(converted),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("Skipped {} unsupported or invisible entities", skipped);
    }

    document
}

fn point2(p: &dxf::Point) -> Point2 {
    Point2::new(p.x, p.y)
}

/// 将DXF实体转换为内部实体；不支持或不可见的实体返回 None
fn convert_dxf_entity(entity: &dxf::entities::Entity) -> Option<Entity> {
    if !entity.common.is_visible {
        return None;
    }

    let (kind, geometry) = match &entity.specific {
        EntityType::Line(line) => (
            EntityKind::Line,
            Geometry::Line(Line::new(point2(&line.p1), point2(&line.p2))),
        ),

        EntityType::Circle(circle) => (
            EntityKind::Circle,
            Geometry::Circle(Circle::new(point2(&circle.center), circle.radius)),
        ),

        EntityType::Arc(arc) => (
            EntityKind::Arc,
            Geometry::Arc(Arc::new(
                point2(&arc.center),
                arc.radius,
                arc.start_angle.to_radians(),
                arc.end_angle.to_radians(),
            )),
        ),

        EntityType::LwPolyline(lwpoly) => {
            let vertices = lwpoly
                .vertices
                .iter()
                .map(|v| PolylineVertex::with_bulge(Point2::new(v.x, v.y), v.bulge))
                .collect();
            (
                EntityKind::LwPolyline,
                Geometry::Polyline(Polyline::new(vertices, lwpoly.is_closed())),
            )
        }

        EntityType::Polyline(poly) => {
            let vertices = poly
                .vertices()
                .map(|v| PolylineVertex::with_bulge(point2(&v.location), v.bulge))
                .collect();
            (
                EntityKind::Polyline,
                Geometry::Polyline(Polyline::new(vertices, poly.is_closed())),
            )
        }

        EntityType::ModelPoint(point) => (
            EntityKind::Point,
            Geometry::Point(Point::new(point.location.x, point.location.y)),
        ),

        EntityType::Ellipse(ellipse) => (
            EntityKind::Ellipse,
            Geometry::Ellipse(Ellipse::arc(
                point2(&ellipse.center),
                Vector2::new(ellipse.major_axis.x, ellipse.major_axis.y),
                ellipse.minor_axis_ratio,
                ellipse.start_parameter,
                ellipse.end_parameter,
            )),
        ),

        EntityType::Spline(spline) => (
            EntityKind::Spline,
            Geometry::Spline(Spline {
                degree: spline.degree_of_curve.max(1) as usize,
                control_points: spline.control_points.iter().map(point2).collect(),
                knots: spline.knot_values.clone(),
                weights: spline.weight_values.clone(),
                fit_points: spline.fit_points.iter().map(point2).collect(),
                closed: spline.is_closed(),
            }),
        ),

        EntityType::Solid(solid) => (
            EntityKind::Solid,
            Geometry::Solid(Solid {
                corners: [
                    point2(&solid.first_corner),
                    point2(&solid.second_corner),
                    point2(&solid.third_corner),
                    point2(&solid.fourth_corner),
                ],
            }),
        ),

        EntityType::Trace(trace) => (
            EntityKind::Trace,
            Geometry::Solid(Solid {
                corners: [
                    point2(&trace.first_corner),
                    point2(&trace.second_corner),
                    point2(&trace.third_corner),
                    point2(&trace.fourth_corner),
                ],
            }),
        ),

        EntityType::Text(text) => (EntityKind::Text, Geometry::Text(convert_text(text))),

        EntityType::MText(mtext) => (EntityKind::MText, Geometry::Text(convert_mtext(mtext))),

        EntityType::Insert(insert) => {
            let mut block_ref = BlockRef::new(&insert.name, point2(&insert.location));
            block_ref.scale = Vector2::new(insert.x_scale_factor, insert.y_scale_factor);
            block_ref.rotation = insert.rotation.to_radians();
            (EntityKind::Insert, Geometry::BlockRef(block_ref))
        }

        // 标注的几何保存在匿名块（*D...）中，按块引用处理
        EntityType::RotatedDimension(dim) => dimension_block(&dim.dimension_base)?,
        EntityType::RadialDimension(dim) => dimension_block(&dim.dimension_base)?,
        EntityType::DiameterDimension(dim) => dimension_block(&dim.dimension_base)?,
        EntityType::AngularThreePointDimension(dim) => dimension_block(&dim.dimension_base)?,
        EntityType::OrdinateDimension(dim) => dimension_block(&dim.dimension_base)?,

        _ => return None,
    };

    let properties = Properties::with_color(convert_color(&entity.common))
        .set_line_weight(LineWeight::from_dxf(entity.common.lineweight_enum_value));

    Some(
        Entity::new(kind, geometry)
            .with_layer(&entity.common.layer)
            .with_properties(properties),
    )
}

fn dimension_block(base: &dxf::entities::DimensionBase) -> Option<(EntityKind, Geometry)> {
    if base.block_name.is_empty() {
        return None;
    }
    Some((
        EntityKind::Dimension,
        Geometry::BlockRef(BlockRef::new(&base.block_name, Point2::origin())),
    ))
}

/// 实体颜色：真彩色优先，其次 ACI 索引
fn convert_color(common: &dxf::entities::EntityCommon) -> ColorRef {
    if common.color_24_bit > 0 {
        return ColorRef::Rgb(Color::from_hex(common.color_24_bit as u32 & 0x00FF_FFFF));
    }
    if common.color.is_by_layer() {
        ColorRef::ByLayer
    } else if common.color.is_by_block() {
        ColorRef::ByBlock
    } else {
        common
            .color
            .index()
            .map(ColorRef::Index)
            .unwrap_or(ColorRef::ByLayer)
    }
}

/// TEXT：非默认对齐时以第二对齐点为基准点
fn convert_text(text: &dxf::entities::Text) -> Text {
    let (alignment, vertical) = match text.horizontal_text_justification {
        HorizontalTextJustification::Center => (TextAlignment::Center, VerticalAlignment::Baseline),
        HorizontalTextJustification::Right => (TextAlignment::Right, VerticalAlignment::Baseline),
        HorizontalTextJustification::Middle => (TextAlignment::Center, VerticalAlignment::Middle),
        _ => (TextAlignment::Left, VerticalAlignment::Baseline),
    };
    let vertical = match text.vertical_text_justification {
        VerticalTextJustification::Bottom => VerticalAlignment::Bottom,
        VerticalTextJustification::Middle => VerticalAlignment::Middle,
        VerticalTextJustification::Top => VerticalAlignment::Top,
        VerticalTextJustification::Baseline => vertical,
    };

    let uses_second_point = !matches!(
        text.horizontal_text_justification,
        HorizontalTextJustification::Left
            | HorizontalTextJustification::Aligned
            | HorizontalTextJustification::Fit
    ) || vertical != VerticalAlignment::Baseline;
    let position = if uses_second_point {
        point2(&text.second_alignment_point)
    } else {
        point2(&text.location)
    };

    let mut result = Text::new(position, expand_special_codes(&text.value), text.text_height)
        .with_rotation(text.rotation.to_radians())
        .with_alignment(alignment, vertical)
        .with_style(&text.text_style_name);
    if text.relative_x_scale_factor > 0.0 {
        result.width_factor = text.relative_x_scale_factor;
    }
    result
}

/// MTEXT：拼接扩展文本并去除格式代码
fn convert_mtext(mtext: &dxf::entities::MText) -> Text {
    let mut raw = mtext.extended_text.concat();
    raw.push_str(&mtext.text);

    let (alignment, vertical) = match mtext.attachment_point {
        AttachmentPoint::TopLeft => (TextAlignment::Left, VerticalAlignment::Top),
        AttachmentPoint::TopCenter => (TextAlignment::Center, VerticalAlignment::Top),
        AttachmentPoint::TopRight => (TextAlignment::Right, VerticalAlignment::Top),
        AttachmentPoint::MiddleLeft => (TextAlignment::Left, VerticalAlignment::Middle),
        AttachmentPoint::MiddleCenter => (TextAlignment::Center, VerticalAlignment::Middle),
        AttachmentPoint::MiddleRight => (TextAlignment::Right, VerticalAlignment::Middle),
        AttachmentPoint::BottomLeft => (TextAlignment::Left, VerticalAlignment::Bottom),
        AttachmentPoint::BottomCenter => (TextAlignment::Center, VerticalAlignment::Bottom),
        AttachmentPoint::BottomRight => (TextAlignment::Right, VerticalAlignment::Bottom),
    };

    // X 轴方向向量优先于旋转角
    let direction = &mtext.x_axis_direction;
    let rotation = if direction.x.abs() > 1e-9 || direction.y.abs() > 1e-9 {
        direction.y.atan2(direction.x)
    } else {
        mtext.rotation_angle.to_radians()
    };

    Text::new(
        point2(&mtext.insertion_point),
        plain_mtext(&raw),
        mtext.initial_text_height,
    )
    .with_rotation(rotation)
    .with_alignment(alignment, vertical)
    .with_style(&mtext.text_style_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxf::entities::{self as dxf_entities, EntityType};
    use dxf::enums::AcadVersion;

    fn write_fixture(drawing: &mut dxf::Drawing) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        drawing.header.version = AcadVersion::R2000;
        drawing.save_file(dir.path().join("fixture.dxf")).unwrap();
        dir
    }

    #[test]
    fn test_import_entities_and_tables() {
        let mut drawing = dxf::Drawing::new();

        let mut layer = dxf::tables::Layer::default();
        layer.name = "WALLS".to_string();
        layer.color = dxf::Color::from_index(1);
        drawing.add_layer(layer);

        let mut line = dxf_entities::Entity::new(EntityType::Line(dxf_entities::Line::new(
            dxf::Point::new(0.0, 0.0, 0.0),
            dxf::Point::new(10.0, 0.0, 0.0),
        )));
        line.common.layer = "WALLS".to_string();
        drawing.add_entity(line);

        let mut text = dxf_entities::Text::default();
        text.location = dxf::Point::new(1.0, 1.0, 0.0);
        text.text_height = 2.5;
        text.value = "%%c100".to_string();
        drawing.add_entity(dxf_entities::Entity::new(EntityType::Text(text)));

        let mut mtext = dxf_entities::MText::default();
        mtext.insertion_point = dxf::Point::new(0.0, 5.0, 0.0);
        mtext.initial_text_height = 1.0;
        mtext.text = r"첫째 줄\P둘째 줄".to_string();
        drawing.add_entity(dxf_entities::Entity::new(EntityType::MText(mtext)));

        let dir = write_fixture(&mut drawing);
        let doc = import(&dir.path().join("fixture.dxf")).unwrap();

        assert_eq!(doc.query(&["LINE"]).count(), 1);
        assert_eq!(doc.query(&["TEXT", "MTEXT"]).count(), 2);
        assert_eq!(doc.layer("walls").map(|l| l.color), Some(ColorRef::Index(1)));

        let line = doc.query(&["LINE"]).next().unwrap();
        assert_eq!(line.layer, "WALLS");
        assert_eq!(line.properties.color, ColorRef::ByLayer);

        let contents: Vec<String> = doc
            .query(&["TEXT", "MTEXT"])
            .filter_map(|e| match &e.geometry {
                Geometry::Text(t) => Some(t.content.clone()),
                _ => None,
            })
            .collect();
        assert!(contents.contains(&"\u{2300}100".to_string()));
        assert!(contents.contains(&"첫째 줄\n둘째 줄".to_string()));
        assert!(doc.file_path().is_some());
    }

    #[test]
    fn test_import_blocks_and_inserts() {
        let mut drawing = dxf::Drawing::new();

        let mut block = dxf::Block::default();
        block.name = "DOOR".to_string();
        block.entities.push(dxf_entities::Entity::new(EntityType::Circle(
            dxf_entities::Circle::new(dxf::Point::new(0.0, 0.0, 0.0), 1.0),
        )));
        drawing.add_block(block);

        let mut insert = dxf_entities::Insert::default();
        insert.name = "DOOR".to_string();
        insert.location = dxf::Point::new(5.0, 5.0, 0.0);
        insert.rotation = 90.0;
        drawing.add_entity(dxf_entities::Entity::new(EntityType::Insert(insert)));

        let dir = write_fixture(&mut drawing);
        let doc = import(&dir.path().join("fixture.dxf")).unwrap();

        let block = doc.block("door").unwrap();
        assert_eq!(block.entities.len(), 1);
        assert_eq!(block.entities[0].dxftype(), "CIRCLE");

        let insert = doc.query(&["INSERT"]).next().unwrap();
        match &insert.geometry {
            Geometry::BlockRef(r) => {
                assert_eq!(r.name, "DOOR");
                assert!((r.rotation - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
            }
            other => panic!("unexpected geometry: {:?}", other),
        }
    }

    #[test]
    fn test_import_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.dxf");
        std::fs::write(&path, "this is not a drawing\nat all\n").unwrap();
        assert!(matches!(import(&path), Err(FileError::Dxf(_))));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(import(&dir.path().join("missing.dxf")).is_err());
    }
}
