//! 输出文件命名

use cadconv_renderer::ExportFormat;
use std::path::{Path, PathBuf};

/// 根据源文件、缩放、文字开关和格式生成输出路径
///
/// `plans/A.dxf`, 1.0, true, PNG → `plans/A_with_text_x1.0.png`
pub fn output_path(source: &Path, scale: f64, include_text: bool, format: ExportFormat) -> PathBuf {
    let suffix = if include_text {
        "with_text"
    } else {
        "without_text"
    };

    let mut name = source.with_extension("").into_os_string();
    name.push(format!("_{}_x{:?}.{}", suffix, scale, format.extension()));
    PathBuf::from(name)
}
