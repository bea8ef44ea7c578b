//! 实体属性定义
//!
//! 包含颜色（命名色、十六进制、AutoCAD ACI）和线宽。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 颜色解析错误
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown color: {0:?}")]
pub struct ColorParseError(pub String);

/// RGBA颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// 单字母颜色缩写（绘图库基础色）
const SHORT_COLORS: &[(&str, u32)] = &[
    ("w", 0xFFFFFF),
    ("k", 0x000000),
    ("r", 0xFF0000),
    ("g", 0x008000),
    ("b", 0x0000FF),
    ("y", 0xBFBF00),
    ("c", 0x00BFBF),
    ("m", 0xBF00BF),
];

/// AutoCAD 标准颜色索引表（0 号不使用）
const ACI_PALETTE: [u32; 256] = [
    0x000000, 0xFF0000, 0xFFFF00, 0x00FF00, 0x00FFFF, 0x0000FF, 0xFF00FF, 0xFFFFFF,
    0x808080, 0xC0C0C0, 0xFF0000, 0xFFAAAA, 0xBD0000, 0xBD7E7E, 0x810000, 0x815656,
    0x680000, 0x684545, 0x4F0000, 0x4F3535, 0xFF3F00, 0xFFBFAA, 0xBD2E00, 0xBD8D7E,
    0x811F00, 0x816056, 0x681900, 0x684E45, 0x4F1300, 0x4F3B35, 0xFF7F00, 0xFFD4AA,
    0xBD5E00, 0xBD9D7E, 0x814000, 0x816B56, 0x683400, 0x685645, 0x4F2700, 0x4F4235,
    0xFFBF00, 0xFFEAAA, 0xBD8D00, 0xBDAD7E, 0x816000, 0x817656, 0x684E00, 0x685F45,
    0x4F3B00, 0x4F4935, 0xFFFF00, 0xFFFFAA, 0xBDBD00, 0xBDBD7E, 0x818100, 0x818156,
    0x686800, 0x686845, 0x4F4F00, 0x4F4F35, 0xBFFF00, 0xEAFFAA, 0x8DBD00, 0xADBD7E,
    0x608100, 0x768156, 0x4E6800, 0x5F6845, 0x3B4F00, 0x494F35, 0x7FFF00, 0xD4FFAA,
    0x5EBD00, 0x9DBD7E, 0x408100, 0x6B8156, 0x346800, 0x566845, 0x274F00, 0x424F35,
    0x3FFF00, 0xBFFFAA, 0x2EBD00, 0x8DBD7E, 0x1F8100, 0x608156, 0x196800, 0x4E6845,
    0x134F00, 0x3B4F35, 0x00FF00, 0xAAFFAA, 0x00BD00, 0x7EBD7E, 0x008100, 0x568156,
    0x006800, 0x456845, 0x004F00, 0x354F35, 0x00FF3F, 0xAAFFBF, 0x00BD2E, 0x7EBD8D,
    0x00811F, 0x568160, 0x006819, 0x45684E, 0x004F13, 0x354F3B, 0x00FF7F, 0xAAFFD4,
    0x00BD5E, 0x7EBD9D, 0x008140, 0x56816B, 0x006834, 0x456856, 0x004F27, 0x354F42,
    0x00FFBF, 0xAAFFEA, 0x00BD8D, 0x7EBDAD, 0x008160, 0x568176, 0x00684E, 0x45685F,
    0x004F3B, 0x354F49, 0x00FFFF, 0xAAFFFF, 0x00BDBD, 0x7EBDBD, 0x008181, 0x568181,
    0x006868, 0x456868, 0x004F4F, 0x354F4F, 0x00BFFF, 0xAAEAFF, 0x008DBD, 0x7EADBD,
    0x006081, 0x567681, 0x004E68, 0x455F68, 0x003B4F, 0x35494F, 0x007FFF, 0xAAD4FF,
    0x005EBD, 0x7E9DBD, 0x004081, 0x566B81, 0x003468, 0x455668, 0x00274F, 0x35424F,
    0x003FFF, 0xAABFFF, 0x002EBD, 0x7E8DBD, 0x001F81, 0x566081, 0x001968, 0x454E68,
    0x00134F, 0x353B4F, 0x0000FF, 0xAAAAFF, 0x0000BD, 0x7E7EBD, 0x000081, 0x565681,
    0x000068, 0x454568, 0x00004F, 0x35354F, 0x3F00FF, 0xBFAAFF, 0x2E00BD, 0x8D7EBD,
    0x1F0081, 0x605681, 0x190068, 0x4E4568, 0x13004F, 0x3B354F, 0x7F00FF, 0xD4AAFF,
    0x5E00BD, 0x9D7EBD, 0x400081, 0x6B5681, 0x340068, 0x564568, 0x27004F, 0x42354F,
    0xBF00FF, 0xEAAAFF, 0x8D00BD, 0xAD7EBD, 0x600081, 0x765681, 0x4E0068, 0x5F4568,
    0x3B004F, 0x49354F, 0xFF00FF, 0xFFAAFF, 0xBD00BD, 0xBD7EBD, 0x810081, 0x815681,
    0x680068, 0x684568, 0x4F004F, 0x4F354F, 0xFF00BF, 0xFFAAEA, 0xBD008D, 0xBD7EAD,
    0x810060, 0x815676, 0x68004E, 0x68455F, 0x4F003B, 0x4F3549, 0xFF007F, 0xFFAAD4,
    0xBD005E, 0xBD7E9D, 0x810040, 0x81566B, 0x680034, 0x684556, 0x4F0027, 0x4F3542,
    0xFF003F, 0xFFAABF, 0xBD002E, 0xBD7E8D, 0x81001F, 0x815660, 0x680019, 0x68454E,
    0x4F0013, 0x4F353B, 0x333333, 0x505050, 0x696969, 0x828282, 0xBEBEBE, 0xFFFFFF,
];

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 从十六进制值创建（如 0xFF0000 表示红色）
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
            a: 255,
        }
    }

    /// 解析颜色字符串（不区分大小写）
    ///
    /// 支持 CSS 颜色名、`#rgb`/`#rrggbb`、`rgb()`/`hsl()` 函数、
    /// 单字母缩写（`k`、`w` 等）以及 `"0.0"`..`"1.0"` 的灰度值。
    pub fn from_name(name: &str) -> Result<Self, ColorParseError> {
        let trimmed = name.trim();
        let lower = trimmed.to_ascii_lowercase();

        if let Some((_, hex)) = SHORT_COLORS.iter().find(|(n, _)| *n == lower) {
            return Ok(Self::from_hex(*hex));
        }

        if let Ok(level) = lower.parse::<f64>() {
            return if (0.0..=1.0).contains(&level) {
                let v = (level * 255.0).round() as u8;
                Ok(Self::new(v, v, v))
            } else {
                Err(ColorParseError(trimmed.to_string()))
            };
        }

        let [r, g, b, a] = csscolorparser::parse(&lower)
            .map_err(|_| ColorParseError(trimmed.to_string()))?
            .to_rgba8();
        Ok(Self::with_alpha(r, g, b, a))
    }

    /// AutoCAD颜色索引(ACI)转RGB
    ///
    /// 0 (ByBlock) 和 256 (ByLayer) 不在此处理，0 返回黑色。
    pub fn from_aci(index: u8) -> Self {
        Self::from_hex(ACI_PALETTE[usize::from(index)])
    }

    /// 感知亮度 (0.0 - 1.0)
    pub fn luminance(&self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b))
            / 255.0
    }

    pub fn is_light(&self) -> bool {
        self.luminance() >= 0.5
    }

    /// 在此背景色上可见的前景色（黑或白）
    pub fn contrasting(&self) -> Self {
        if self.is_light() {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }

    /// 转换为 [0.0, 1.0] 范围的浮点数组
    pub fn to_f32_array(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    // 预定义颜色（AutoCAD ACI颜色兼容）
    pub const RED: Color = Color::new(255, 0, 0);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const CYAN: Color = Color::new(0, 255, 255);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const MAGENTA: Color = Color::new(255, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const GRAY: Color = Color::new(128, 128, 128);
}

/// 实体颜色引用（解析前）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColorRef {
    /// 跟随图层
    #[default]
    ByLayer,
    /// 跟随块引用
    ByBlock,
    /// ACI 索引 1-255
    Index(u8),
    /// 真彩色
    Rgb(Color),
}

impl ColorRef {
    /// ACI 7 在浅色背景上显示为黑色，深色背景上显示为白色
    pub fn is_foreground(&self) -> bool {
        matches!(self, ColorRef::Index(7))
    }
}

/// 线宽
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum LineWeight {
    /// 默认线宽
    Default,
    /// 跟随图层
    #[default]
    ByLayer,
    /// 跟随块
    ByBlock,
    /// 指定线宽（毫米）
    Width(f64),
}

impl LineWeight {
    /// 未指定线宽时使用的值（毫米）
    pub const DEFAULT_MM: f64 = 0.25;

    /// 从 DXF 组码 370 的值创建（单位为 1/100 毫米，负数为特殊值）
    pub fn from_dxf(value: i16) -> Self {
        match value {
            -1 => LineWeight::ByLayer,
            -2 => LineWeight::ByBlock,
            v if v < 0 => LineWeight::Default,
            v => LineWeight::Width(f64::from(v) / 100.0),
        }
    }

    /// 获取实际线宽（毫米），ByLayer 时使用 `layer_mm`
    pub fn to_mm(&self, layer_mm: f64) -> f64 {
        match self {
            LineWeight::Default | LineWeight::ByBlock => Self::DEFAULT_MM,
            LineWeight::ByLayer => layer_mm,
            LineWeight::Width(w) => *w,
        }
    }
}

/// 实体的视觉属性
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Properties {
    pub color: ColorRef,
    pub line_weight: LineWeight,
}

impl Properties {
    pub fn with_color(color: ColorRef) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn set_line_weight(mut self, line_weight: LineWeight) -> Self {
        self.line_weight = line_weight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::from_name("white").unwrap(), Color::WHITE);
        assert_eq!(Color::from_name(" Black ").unwrap(), Color::BLACK);
        assert_eq!(Color::from_name("#ff8000").unwrap(), Color::new(255, 128, 0));
        assert_eq!(Color::from_name("#fff").unwrap(), Color::WHITE);
        assert!(Color::from_name("not-a-color").is_err());
        assert!(Color::from_name("#12345").is_err());
    }

    #[test]
    fn test_css_names_and_gray_levels() {
        assert_eq!(Color::from_name("lightblue").unwrap(), Color::new(173, 216, 230));
        assert_eq!(Color::from_name("Gold").unwrap(), Color::new(255, 215, 0));
        assert_eq!(Color::from_name("navajowhite").unwrap(), Color::new(255, 222, 173));
        assert_eq!(Color::from_name("k").unwrap(), Color::BLACK);
        assert_eq!(Color::from_name("0.5").unwrap(), Color::new(128, 128, 128));
        assert_eq!(Color::from_name("1").unwrap(), Color::WHITE);
        assert!(Color::from_name("1.5").is_err());
    }

    #[test]
    fn test_aci_palette() {
        assert_eq!(Color::from_aci(1), Color::RED);
        assert_eq!(Color::from_aci(7), Color::WHITE);
        assert_eq!(Color::from_aci(8), Color::GRAY);
        assert_eq!(Color::from_aci(10), Color::RED);
        assert_eq!(Color::from_aci(21), Color::from_hex(0xFFBFAA));
        assert_eq!(Color::from_aci(35), Color::from_hex(0x816B56));
        assert_eq!(Color::from_aci(140), Color::from_hex(0x00BFFF));
        assert_eq!(Color::from_aci(170), Color::BLUE);
        assert_eq!(Color::from_aci(249), Color::from_hex(0x4F353B));
        assert_eq!(Color::from_aci(250), Color::new(51, 51, 51));
        assert_eq!(Color::from_aci(255), Color::WHITE);
    }

    #[test]
    fn test_contrast() {
        assert_eq!(Color::WHITE.contrasting(), Color::BLACK);
        assert_eq!(Color::BLACK.contrasting(), Color::WHITE);
    }

    #[test]
    fn test_line_weight_from_dxf() {
        assert_eq!(LineWeight::from_dxf(-1), LineWeight::ByLayer);
        assert_eq!(LineWeight::from_dxf(-3), LineWeight::Default);
        assert_eq!(LineWeight::from_dxf(50), LineWeight::Width(0.5));
        assert_eq!(LineWeight::ByLayer.to_mm(0.35), 0.35);
    }
}
