//! 导出模块
//!
//! 将文档模型空间导出为 PNG 或 PDF。

use crate::backend::{Backend, FigureSize};
use crate::error::RenderError;
use crate::font::FontFace;
use crate::frontend::{exclude_text, Frontend, FrontendConfig, RenderContext};
use crate::pdf::PdfBackend;
use crate::raster::{RasterBackend, PNG_DPI};
use cadconv_core::properties::Color;
use cadconv_file::Document;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    /// 文件扩展名（小写）
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PNG" => Ok(ExportFormat::Png),
            "PDF" => Ok(ExportFormat::Pdf),
            _ => Err(RenderError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Pdf => "PDF",
        })
    }
}

/// 导出参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// 图像尺寸缩放
    pub scale: f64,
    pub line_width_scale: f64,
    pub text_scale: f64,
    /// 是否绘制 TEXT/MTEXT
    pub include_text: bool,
    pub background: Color,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            scale: 1.0,
            line_width_scale: 1.0,
            text_scale: 1.0,
            include_text: true,
            background: Color::WHITE,
        }
    }
}

/// 渲染文档并写出到 `path`
///
/// 只有渲染成功后才创建输出文件。
pub fn export_document(
    document: &Document,
    options: &ExportOptions,
    font: Option<&FontFace>,
    path: &Path,
) -> Result<(), RenderError> {
    let figure = FigureSize::BASE.scaled(options.scale);
    let mut backend: Box<dyn Backend> = match options.format {
        ExportFormat::Png => Box::new(RasterBackend::from_figure(figure, PNG_DPI)?),
        ExportFormat::Pdf => {
            let title = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "drawing".to_string());
            Box::new(PdfBackend::from_figure(figure, &title)?)
        }
    };

    let config = FrontendConfig {
        text_scale: options.text_scale,
        line_width_scale: options.line_width_scale,
    };
    let mut frontend =
        Frontend::new(RenderContext::new(document, options.background), config).with_font(font);
    if !options.include_text {
        frontend = frontend.with_filter(exclude_text);
    }

    let drawn = frontend.draw_layout(backend.as_mut());
    debug!("Drew {} primitives for {}", drawn, path.display());

    backend.save(path)
}

/// 打开 DXF 文件并导出
pub fn export_file(
    source: &Path,
    options: &ExportOptions,
    font: Option<&FontFace>,
    path: &Path,
) -> Result<(), RenderError> {
    let document = Document::open(source)?;
    export_document(&document, options, font, path)
}
