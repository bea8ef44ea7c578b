//! 渲染错误定义

use cadconv_file::FileError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to load drawing: {0}")]
    Load(#[from] FileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Canvas size {width}x{height} is empty")]
    EmptyCanvas { width: f64, height: f64 },

    #[error("PNG encoding failed: {0}")]
    Png(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}
