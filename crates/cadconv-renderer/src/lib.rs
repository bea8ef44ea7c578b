//! cadconv 渲染器
//!
//! 将 DXF 文档的模型空间渲染为图像。
//!
//! # 结构
//!
//! - **前端** ([`Frontend`])：解释实体，解析颜色和线宽，展开块引用，过滤实体
//! - **后端** ([`Backend`])：PNG（tiny-skia）和 PDF（printpdf）画布
//! - **字体** ([`FontFace`])：文字以字形轮廓绘制

pub mod backend;
pub mod camera;
pub mod error;
pub mod export;
pub mod font;
pub mod frontend;
pub mod pdf;
pub mod raster;

pub use backend::{Backend, FigureSize, StrokeStyle};
pub use camera::Camera2D;
pub use error::RenderError;
pub use export::{export_document, export_file, ExportFormat, ExportOptions};
pub use font::FontFace;
pub use frontend::{exclude_text, Frontend, FrontendConfig, RenderContext};
pub use pdf::PdfBackend;
pub use raster::{RasterBackend, PNG_DPI};
