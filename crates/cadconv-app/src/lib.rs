//! cadconv 批量转换程序
//!
//! DWG 通过外部转换器转为 DXF，DXF 渲染为 PNG 或 PDF。

pub mod banner;
pub mod batch;
pub mod config;
pub mod converter;
pub mod discovery;
pub mod error;
pub mod output;
pub mod progress;

pub use batch::{run, BatchSummary};
pub use config::{Settings, TextMode};
pub use converter::Converter;
pub use error::{ConfigError, ConverterError};
pub use progress::BatchProgress;
