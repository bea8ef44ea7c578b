//! 字体加载与文字轮廓
//!
//! 文字以字形轮廓（填充多边形）的形式绘制，PNG 和 PDF 后端得到完全相同的几何。

use crate::error::RenderError;
use ab_glyph::{Font, FontVec, OutlineCurve};
use cadconv_core::geometry::{Text, TextAlignment};
use cadconv_core::math::Point2;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 大写字母高度与 em 的比例；CAD 字高指大写字母高度
const CAP_HEIGHT_RATIO: f64 = 0.7;

/// 二次/三次曲线的离散段数
const CURVE_SEGMENTS: usize = 6;

/// 找不到指定字体时尝试的系统字体（均包含韩文字形）
const FALLBACK_FONTS: &[&str] = &[
    // Windows
    "C:\\Windows\\Fonts\\malgun.ttf",
    "C:\\Windows\\Fonts\\gulim.ttc",
    // macOS
    "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    "/Library/Fonts/AppleGothic.ttf",
    // Linux
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
];

/// 已加载的字体
pub struct FontFace {
    font: FontVec,
    path: PathBuf,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace").field("path", &self.path).finish()
    }
}

impl FontFace {
    /// 从字体文件加载（`.ttc` 取第一个字体）
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let font = FontVec::try_from_vec(data)
            .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            font,
            path: path.to_path_buf(),
        })
    }

    /// 先尝试 `preferred`，失败后依次尝试系统字体
    pub fn load_system(preferred: &Path) -> Option<Self> {
        let candidates =
            std::iter::once(preferred.to_path_buf()).chain(FALLBACK_FONTS.iter().map(PathBuf::from));
        for path in candidates {
            match Self::load(&path) {
                Ok(face) => {
                    info!("Loaded font from: {}", path.display());
                    return Some(face);
                }
                Err(e) => debug!("Font not usable: {}", e),
            }
        }
        None
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn units_per_em(&self) -> f64 {
        f64::from(self.font.units_per_em().unwrap_or(1000.0))
    }

    /// 单行文字宽度（字体单位）
    fn line_advance(&self, line: &str) -> f64 {
        line.chars()
            .map(|c| f64::from(self.font.h_advance_unscaled(self.font.glyph_id(c))))
            .sum()
    }

    /// 生成文字的字形轮廓（世界坐标）
    ///
    /// 使用 `text.height` 作为字高，并应用对齐、旋转和宽度系数。
    pub fn text_outlines(&self, text: &Text) -> Vec<Vec<Point2>> {
        let scale = text.height / CAP_HEIGHT_RATIO / self.units_per_em();
        if !(scale.is_finite() && scale > 0.0) {
            return Vec::new();
        }

        let (sin, cos) = text.rotation.sin_cos();
        let width_factor = if text.width_factor > 0.0 {
            text.width_factor
        } else {
            1.0
        };
        let first_baseline = text.top_offset() - text.height;

        let mut contours = Vec::new();
        for (row, line) in text.lines().enumerate() {
            let line_width = self.line_advance(line) * scale * width_factor;
            let x_offset = match text.alignment {
                TextAlignment::Left => 0.0,
                TextAlignment::Center => -line_width / 2.0,
                TextAlignment::Right => -line_width,
            };
            let baseline = first_baseline - row as f64 * text.height * Text::LINE_SPACING;

            let mut pen = 0.0;
            for c in line.chars() {
                let id = self.font.glyph_id(c);
                if let Some(outline) = self.font.outline(id) {
                    let place = |x: f32, y: f32| {
                        let lx = x_offset + (pen + f64::from(x)) * scale * width_factor;
                        let ly = baseline + f64::from(y) * scale;
                        Point2::new(
                            text.position.x + lx * cos - ly * sin,
                            text.position.y + lx * sin + ly * cos,
                        )
                    };
                    contours.extend(outline_contours(&outline.curves, place));
                }
                pen += f64::from(self.font.h_advance_unscaled(id));
            }
        }
        contours
    }
}

/// 将轮廓曲线序列拆分为闭合折线
///
/// 曲线起点与上一段终点不重合时开始新的轮廓。
fn outline_contours(
    curves: &[OutlineCurve],
    place: impl Fn(f32, f32) -> Point2,
) -> Vec<Vec<Point2>> {
    let mut contours: Vec<Vec<Point2>> = Vec::new();
    let mut current: Vec<Point2> = Vec::new();
    let mut last_end: Option<ab_glyph::Point> = None;

    for curve in curves {
        let (start, end) = match curve {
            OutlineCurve::Line(p0, p1) => (*p0, *p1),
            OutlineCurve::Quad(p0, _, p2) => (*p0, *p2),
            OutlineCurve::Cubic(p0, _, _, p3) => (*p0, *p3),
        };

        if last_end != Some(start) {
            if current.len() >= 3 {
                contours.push(std::mem::take(&mut current));
            }
            current.clear();
            current.push(place(start.x, start.y));
        }

        match curve {
            OutlineCurve::Line(_, p1) => current.push(place(p1.x, p1.y)),
            OutlineCurve::Quad(p0, p1, p2) => {
                for i in 1..=CURVE_SEGMENTS {
                    let t = i as f32 / CURVE_SEGMENTS as f32;
                    let mt = 1.0 - t;
                    let x = mt * mt * p0.x + 2.0 * mt * t * p1.x + t * t * p2.x;
                    let y = mt * mt * p0.y + 2.0 * mt * t * p1.y + t * t * p2.y;
                    current.push(place(x, y));
                }
            }
            OutlineCurve::Cubic(p0, p1, p2, p3) => {
                for i in 1..=CURVE_SEGMENTS {
                    let t = i as f32 / CURVE_SEGMENTS as f32;
                    let mt = 1.0 - t;
                    let a = mt * mt * mt;
                    let b = 3.0 * mt * mt * t;
                    let c = 3.0 * mt * t * t;
                    let d = t * t * t;
                    let x = a * p0.x + b * p1.x + c * p2.x + d * p3.x;
                    let y = a * p0.y + b * p1.y + c * p2.y + d * p3.y;
                    current.push(place(x, y));
                }
            }
        }
        last_end = Some(end);
    }

    if current.len() >= 3 {
        contours.push(current);
    }
    contours
}
