//! 配置加载
//!
//! 从 INI 文件的 `[Settings]` 节读取设置，缺失的键使用默认值；
//! `CADCONV_` 前缀的环境变量（分隔符 `__`）可以覆盖文件中的值，
//! 例如 `CADCONV_SETTINGS__SCALE=2`。

use crate::error::ConfigError;
use cadconv_core::properties::Color;
use cadconv_renderer::ExportFormat;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 文字输出模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    /// "1"：只输出带文字的图像
    WithText,
    /// 其他值：只输出不带文字的图像
    WithoutText,
    /// "3"：两种都输出
    Both,
}

impl TextMode {
    pub fn from_choice(choice: &str) -> Self {
        match choice.trim() {
            "1" => TextMode::WithText,
            "3" => TextMode::Both,
            _ => TextMode::WithoutText,
        }
    }

    /// 依次需要渲染的文字开关
    pub fn renders(&self) -> &'static [bool] {
        match self {
            TextMode::WithText => &[true],
            TextMode::WithoutText => &[false],
            TextMode::Both => &[true, false],
        }
    }
}

impl fmt::Display for TextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TextMode::WithText => "with text",
            TextMode::WithoutText => "without text",
            TextMode::Both => "with and without text",
        })
    }
}

/// 运行设置
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// 转换器可执行文件
    #[serde(
        rename = "ODAFileConverter_Dir",
        alias = "odafileconverter_dir",
        default = "default_converter_path"
    )]
    pub converter_path: PathBuf,

    /// 输入根目录
    #[serde(rename = "DATA_DIR", alias = "data_dir", default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(
        default = "default_background_color",
        deserialize_with = "deserialize_color"
    )]
    pub background_color: Color,

    #[serde(default = "default_format", deserialize_with = "deserialize_format")]
    pub format_choice: ExportFormat,

    /// 图像尺寸缩放
    #[serde(rename = "Scale", alias = "scale", default = "default_scale")]
    pub scale: f64,

    #[serde(
        rename = "LineWidthScale",
        alias = "linewidthscale",
        default = "default_scale"
    )]
    pub line_width_scale: f64,

    #[serde(rename = "TextScale", alias = "textscale", default = "default_scale")]
    pub text_scale: f64,

    #[serde(default = "default_text_mode", deserialize_with = "deserialize_text_mode")]
    pub text_choice: TextMode,

    /// 韩文字体文件
    #[serde(default = "default_font_path")]
    pub font_path: PathBuf,
}

/// 配置文件根结构
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(rename = "Settings", alias = "settings", default)]
    settings: Settings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            converter_path: default_converter_path(),
            data_dir: default_data_dir(),
            background_color: default_background_color(),
            format_choice: default_format(),
            scale: default_scale(),
            line_width_scale: default_scale(),
            text_scale: default_scale(),
            text_choice: default_text_mode(),
            font_path: default_font_path(),
        }
    }
}

impl Settings {
    /// 从 INI 文件加载；文件不存在时全部使用默认值
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
        }

        let config = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Ini)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("CADCONV")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let file: ConfigFile = config.try_deserialize()?;
        Ok(file.settings)
    }
}

fn default_converter_path() -> PathBuf {
    PathBuf::from(r"C:\Program Files\ODA\ODAFileConverter 25.8.0\ODAFileConverter.exe")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("DATA")
}

fn default_background_color() -> Color {
    Color::WHITE
}

fn default_format() -> ExportFormat {
    ExportFormat::Png
}

fn default_scale() -> f64 {
    1.0
}

fn default_text_mode() -> TextMode {
    TextMode::WithText
}

fn default_font_path() -> PathBuf {
    PathBuf::from(r"C:\Windows\Fonts\malgun.ttf")
}

/// 无法识别的颜色回退为白色
fn deserialize_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
    let name = String::deserialize(deserializer)?;
    Ok(Color::from_name(&name).unwrap_or_else(|e| {
        warn!("{}, using white background", e);
        default_background_color()
    }))
}

fn deserialize_format<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<ExportFormat, D::Error> {
    let value = String::deserialize(deserializer)?;
    value.parse().map_err(serde::de::Error::custom)
}

fn deserialize_text_mode<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<TextMode, D::Error> {
    let value = String::deserialize(deserializer)?;
    Ok(TextMode::from_choice(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.data_dir, PathBuf::from("DATA"));
        assert_eq!(settings.format_choice, ExportFormat::Png);
        assert_eq!(settings.text_choice, TextMode::WithText);
        assert_eq!(settings.background_color, Color::WHITE);
    }

    #[test]
    fn test_partial_file() {
        let (_dir, path) = write_config(
            "[Settings]\n\
             DATA_DIR = drawings\n\
             format_choice = PDF\n\
             Scale = 2.5\n\
             text_choice = 3\n\
             background_color = black\n",
        );
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("drawings"));
        assert_eq!(settings.format_choice, ExportFormat::Pdf);
        assert_eq!(settings.scale, 2.5);
        assert_eq!(settings.text_choice, TextMode::Both);
        assert_eq!(settings.background_color, Color::BLACK);

        // 未给出的键使用默认值
        assert_eq!(settings.line_width_scale, 1.0);
        assert_eq!(settings.text_scale, 1.0);
        assert_eq!(settings.font_path, default_font_path());
    }

    #[test]
    fn test_malformed_number_fails() {
        let (_dir, path) = write_config("[Settings]\nScale = large\n");
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn test_background_color_names() {
        let (_dir, path) = write_config("[Settings]\nbackground_color = lightblue\n");
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.background_color, Color::new(173, 216, 230));

        let (_dir, path) = write_config("[Settings]\nbackground_color = 0.25\n");
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.background_color, Color::new(64, 64, 64));

        // 无法识别的颜色不会中止加载
        let (_dir, path) = write_config("[Settings]\nbackground_color = sparkly\nScale = 3\n");
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.background_color, Color::WHITE);
        assert_eq!(settings.scale, 3.0);
    }

    #[test]
    fn test_unknown_format_fails() {
        let (_dir, path) = write_config("[Settings]\nformat_choice = SVG\n");
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn test_text_mode_choices() {
        assert_eq!(TextMode::from_choice("1"), TextMode::WithText);
        assert_eq!(TextMode::from_choice("2"), TextMode::WithoutText);
        assert_eq!(TextMode::from_choice("3"), TextMode::Both);
        assert_eq!(TextMode::from_choice("x"), TextMode::WithoutText);
        assert_eq!(TextMode::Both.renders(), &[true, false]);
        assert_eq!(TextMode::WithoutText.renders(), &[false]);
    }
}
