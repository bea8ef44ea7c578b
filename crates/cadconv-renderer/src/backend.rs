//! 绘图后端接口
//!
//! 后端只接收画布坐标（设备单位，原点在左上角，Y 轴向下）的折线和填充区域，
//! 实体解释、颜色解析和坐标变换都由 [`Frontend`](crate::frontend::Frontend) 完成。

use crate::error::RenderError;
use cadconv_core::math::Point2;
use cadconv_core::properties::Color;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// 每英寸毫米数
pub const MM_PER_INCH: f64 = 25.4;

/// 描边样式
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    /// 线宽（设备单位）
    pub width: f64,
}

/// 绘图后端
pub trait Backend {
    /// 画布尺寸（设备单位）
    fn size(&self) -> (f64, f64);

    /// 每毫米对应的设备单位数
    fn units_per_mm(&self) -> f64;

    /// 用背景色填满整个画布
    fn clear(&mut self, color: Color);

    /// 描边折线
    fn stroke(&mut self, points: &[Point2], closed: bool, style: &StrokeStyle);

    /// 填充区域（多个轮廓，非零环绕规则）
    fn fill(&mut self, contours: &[Vec<Point2>], color: Color);

    /// 写出到文件
    fn save(&mut self, path: &Path) -> Result<(), RenderError>;
}

/// 图像尺寸（英寸），乘以缩放系数后得到画布尺寸
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width_in: f64,
    pub height_in: f64,
}

impl FigureSize {
    /// 基准尺寸 6.4 × 4.8 英寸
    pub const BASE: FigureSize = FigureSize {
        width_in: 6.4,
        height_in: 4.8,
    };

    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            width_in: self.width_in * scale,
            height_in: self.height_in * scale,
        }
    }

    /// 按分辨率换算为设备单位
    pub fn to_units(&self, per_inch: f64) -> (f64, f64) {
        (self.width_in * per_inch, self.height_in * per_inch)
    }
}

impl Default for FigureSize {
    fn default() -> Self {
        Self::BASE
    }
}

/// 写出编码后的文件
///
/// 数据先写入目标目录中的临时文件，完整写入后再重命名为 `path`，
/// 失败时不会留下不完整的输出，已存在的同名文件保持不变。
pub(crate) fn write_output(path: &Path, data: &[u8]) -> Result<(), RenderError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
