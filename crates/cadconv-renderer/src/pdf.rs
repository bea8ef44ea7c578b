//! PDF 矢量后端（printpdf）
//!
//! 单页文档，页面尺寸等于图像尺寸，1 设备单位 = 1 pt。

use crate::backend::{write_output, Backend, FigureSize, StrokeStyle, MM_PER_INCH};
use crate::error::RenderError;
use cadconv_core::math::Point2;
use cadconv_core::properties::Color;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    Color as PdfColor, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point as PdfPoint, Polygon, Pt, Rgb,
};
use std::path::Path;
use tracing::debug;

/// 每英寸点数
pub const POINTS_PER_INCH: f64 = 72.0;

/// 基于 printpdf 的 PDF 画布
pub struct PdfBackend {
    /// 保存时取出（printpdf 的保存会消耗文档）
    document: Option<PdfDocumentReference>,
    layer: PdfLayerReference,
    width: f64,
    height: f64,
}

impl PdfBackend {
    /// 按图像尺寸创建单页文档
    pub fn from_figure(size: FigureSize, title: &str) -> Result<Self, RenderError> {
        let (width, height) = size.to_units(POINTS_PER_INCH);
        if !(width.is_finite() && height.is_finite()) || width < 1.0 || height < 1.0 {
            return Err(RenderError::EmptyCanvas { width, height });
        }

        let (document, page, layer) = PdfDocument::new(
            title,
            Mm((size.width_in * MM_PER_INCH) as f32),
            Mm((size.height_in * MM_PER_INCH) as f32),
            "Modelspace",
        );
        let layer = document.get_page(page).get_layer(layer);

        Ok(Self {
            document: Some(document),
            layer,
            width,
            height,
        })
    }

    /// 画布坐标（Y 向下）转 PDF 坐标（Y 向上）
    fn to_pdf(&self, p: &Point2) -> (PdfPoint, bool) {
        (
            PdfPoint {
                x: Pt(p.x as f32),
                y: Pt((self.height - p.y) as f32),
            },
            false,
        )
    }

    fn pdf_color(color: Color) -> PdfColor {
        let [r, g, b, _] = color.to_f32_array();
        PdfColor::Rgb(Rgb::new(r, g, b, None))
    }
}

impl Backend for PdfBackend {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn units_per_mm(&self) -> f64 {
        POINTS_PER_INCH / MM_PER_INCH
    }

    fn clear(&mut self, color: Color) {
        let page = vec![
            Point2::new(0.0, 0.0),
            Point2::new(self.width, 0.0),
            Point2::new(self.width, self.height),
            Point2::new(0.0, self.height),
        ];
        self.fill(&[page], color);
    }

    fn stroke(&mut self, points: &[Point2], closed: bool, style: &StrokeStyle) {
        if points.len() < 2 {
            return;
        }
        self.layer.set_outline_color(Self::pdf_color(style.color));
        self.layer.set_outline_thickness(style.width as f32);
        self.layer.add_line(Line {
            points: points.iter().map(|p| self.to_pdf(p)).collect(),
            is_closed: closed,
        });
    }

    fn fill(&mut self, contours: &[Vec<Point2>], color: Color) {
        let rings: Vec<Vec<(PdfPoint, bool)>> = contours
            .iter()
            .filter(|c| c.len() >= 3)
            .map(|c| c.iter().map(|p| self.to_pdf(p)).collect())
            .collect();
        if rings.is_empty() {
            return;
        }
        self.layer.set_fill_color(Self::pdf_color(color));
        self.layer.add_polygon(Polygon {
            rings,
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn save(&mut self, path: &Path) -> Result<(), RenderError> {
        let document = self
            .document
            .take()
            .ok_or_else(|| RenderError::Pdf("document already saved".to_string()))?;
        let data = document
            .save_to_bytes()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        write_output(path, &data)?;
        debug!(
            "Wrote {:.0}x{:.0} pt PDF to {}",
            self.width,
            self.height,
            path.display()
        );
        Ok(())
    }
}
