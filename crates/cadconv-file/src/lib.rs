//! cadconv 文件处理
//!
//! 支持：
//! - `.dxf` 导入（模型空间、块、图层、文字样式）
//! - 文字样式替换（统一为韩文字体）

pub mod document;
pub mod dxf_io;
pub mod error;
pub mod mtext;
pub mod text_style;

pub use document::{Block, Document, Layer, TextStyle};
pub use error::FileError;
