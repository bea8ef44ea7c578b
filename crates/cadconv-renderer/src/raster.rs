//! PNG 光栅后端（tiny-skia）

use crate::backend::{write_output, Backend, FigureSize, StrokeStyle, MM_PER_INCH};
use crate::error::RenderError;
use cadconv_core::math::Point2;
use cadconv_core::properties::Color;
use std::path::Path;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};
use tracing::debug;

/// PNG 输出分辨率
pub const PNG_DPI: f64 = 300.0;

/// 基于 tiny-skia 的光栅画布
pub struct RasterBackend {
    pixmap: Pixmap,
    dpi: f64,
}

impl RasterBackend {
    /// 按像素尺寸创建画布
    pub fn new(width: u32, height: u32, dpi: f64) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::EmptyCanvas {
            width: f64::from(width),
            height: f64::from(height),
        })?;
        Ok(Self { pixmap, dpi })
    }

    /// 按图像尺寸和分辨率创建画布
    pub fn from_figure(size: FigureSize, dpi: f64) -> Result<Self, RenderError> {
        let (w, h) = size.to_units(dpi);
        if !(w.is_finite() && h.is_finite()) || w < 1.0 || h < 1.0 || w > u32::MAX as f64 {
            return Err(RenderError::EmptyCanvas {
                width: w,
                height: h,
            });
        }
        Self::new(w.round() as u32, h.round() as u32, dpi)
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    fn paint(color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = true;
        paint
    }
}

impl Backend for RasterBackend {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.pixmap.width()), f64::from(self.pixmap.height()))
    }

    fn units_per_mm(&self) -> f64 {
        self.dpi / MM_PER_INCH
    }

    fn clear(&mut self, color: Color) {
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a));
    }

    fn stroke(&mut self, points: &[Point2], closed: bool, style: &StrokeStyle) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x as f32, first.y as f32);
        for p in rest {
            pb.line_to(p.x as f32, p.y as f32);
        }
        if closed {
            pb.close();
        }
        // 退化路径（长度为零）无法构建
        let Some(path) = pb.finish() else {
            return;
        };

        let stroke = Stroke {
            width: style.width.max(0.1) as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap.stroke_path(
            &path,
            &Self::paint(style.color),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    fn fill(&mut self, contours: &[Vec<Point2>], color: Color) {
        let mut pb = PathBuilder::new();
        for contour in contours.iter().filter(|c| c.len() >= 3) {
            pb.move_to(contour[0].x as f32, contour[0].y as f32);
            for p in &contour[1..] {
                pb.line_to(p.x as f32, p.y as f32);
            }
            pb.close();
        }
        let Some(path) = pb.finish() else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &Self::paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn save(&mut self, path: &Path) -> Result<(), RenderError> {
        let data = self
            .pixmap
            .encode_png()
            .map_err(|e| RenderError::Png(e.to_string()))?;
        write_output(path, &data)?;
        debug!(
            "Wrote {}x{} PNG to {}",
            self.pixmap.width(),
            self.pixmap.height(),
            path.display()
        );
        Ok(())
    }
}
