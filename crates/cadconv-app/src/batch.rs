//! 批量转换流程
//!
//! 先把输入目录下的全部 DWG 转换为 DXF，再把全部 DXF（包括刚生成的）
//! 渲染为 PNG 或 PDF。单个文件失败只记录日志，继续处理下一个。

use crate::config::Settings;
use crate::converter::Converter;
use crate::discovery::find_files;
use crate::output::output_path;
use crate::progress::BatchProgress;
use cadconv_file::text_style::apply_korean_font;
use cadconv_file::Document;
use cadconv_renderer::{export_document, ExportOptions, FontFace};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// 批处理结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub dwg_converted: usize,
    pub dwg_failed: usize,
    /// 无法读取的 DXF 文件
    pub dxf_failed: usize,
    pub outputs_written: usize,
    pub outputs_failed: usize,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        self.dwg_failed + self.dxf_failed + self.outputs_failed > 0
    }
}

/// 执行完整的批处理
pub fn run(settings: &Settings, progress: &BatchProgress) -> BatchSummary {
    let mut summary = BatchSummary::default();
    convert_dwg_files(settings, progress, &mut summary);
    render_dxf_files(settings, progress, &mut summary);
    info!("Batch finished: {:?}", summary);
    summary
}

/// DWG → DXF 阶段
pub fn convert_dwg_files(settings: &Settings, progress: &BatchProgress, summary: &mut BatchSummary) {
    let files = find_files(&settings.data_dir, "dwg");
    progress.println(format!("Found {} DWG files for conversion.", files.len()));
    if files.is_empty() {
        return;
    }

    let converter = Converter::new(&settings.converter_path);
    let overall = progress.overall(files.len() as u64, "Overall Progress");

    for dwg in &files {
        progress.println(format!("Converting {} to DXF format...", dwg.display()));
        match converter.convert(dwg) {
            Ok(()) => {
                progress.println("Conversion successful.");
                summary.dwg_converted += 1;
            }
            Err(e) => {
                error!("Conversion error: {}: {}", dwg.display(), e);
                summary.dwg_failed += 1;
            }
        }
        overall.inc(1);
    }
    overall.finish_and_clear();
}

/// DXF → PNG/PDF 阶段
pub fn render_dxf_files(settings: &Settings, progress: &BatchProgress, summary: &mut BatchSummary) {
    let files = find_files(&settings.data_dir, "dxf");
    progress.println(format!("Found {} DXF files for output conversion.", files.len()));
    if files.is_empty() {
        return;
    }

    let font = FontFace::load_system(&settings.font_path);
    if font.is_none() {
        warn!(
            "No usable font found (tried {}), text will not be drawn",
            settings.font_path.display()
        );
    }

    let renders = settings.text_choice.renders();
    let overall = progress.overall(files.len() as u64, "Output Conversion Progress");
    let step = progress.step(renders.len() as u64, "Current Step Progress");

    for dxf in &files {
        step.reset();
        render_one(settings, font.as_ref(), dxf, progress, summary, || step.inc(1));
        overall.inc(1);
    }
    step.finish_and_clear();
    overall.finish_and_clear();
}

/// 渲染单个 DXF 的所有输出
fn render_one(
    settings: &Settings,
    font: Option<&FontFace>,
    dxf: &Path,
    progress: &BatchProgress,
    summary: &mut BatchSummary,
    mut on_step: impl FnMut(),
) {
    let mut document = match Document::open(dxf) {
        Ok(document) => document,
        Err(e) => {
            error!("Error converting {}: {}", dxf.display(), e);
            summary.dxf_failed += 1;
            return;
        }
    };
    let substituted = apply_korean_font(&mut document);
    debug!(
        "Loaded {} entities from {}, {} text entities use the Korean font",
        document.entity_count(),
        dxf.display(),
        substituted
    );

    for &include_text in settings.text_choice.renders() {
        let options = ExportOptions {
            format: settings.format_choice,
            scale: settings.scale,
            line_width_scale: settings.line_width_scale,
            text_scale: settings.text_scale,
            include_text,
            background: settings.background_color,
        };
        let target = output_path(dxf, settings.scale, include_text, settings.format_choice);

        match export_document(&document, &options, font, &target) {
            Ok(()) => {
                progress.println(format!("Converted {} -> {}", dxf.display(), target.display()));
                summary.outputs_written += 1;
            }
            Err(e) => {
                error!("Error converting {}: {}", dxf.display(), e);
                summary.outputs_failed += 1;
            }
        }
        on_step();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextMode;
    use cadconv_renderer::ExportFormat;
    use std::path::PathBuf;

    fn write_sample_dxf(path: &Path) {
        let mut drawing = dxf::Drawing::new();
        drawing.header.version = dxf::enums::AcadVersion::R2000;
        drawing.add_entity(dxf::entities::Entity::new(dxf::entities::EntityType::Line(
            dxf::entities::Line::new(
                dxf::Point::new(0.0, 0.0, 0.0),
                dxf::Point::new(100.0, 50.0, 0.0),
            ),
        )));
        drawing.save_file(path).unwrap();
    }

    const FIXTURE_FONT: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../cadconv-renderer/tests/fixtures/RobotoMedium.ttf"
    );

    fn write_labelled_dxf(path: &Path) {
        let mut drawing = dxf::Drawing::new();
        drawing.header.version = dxf::enums::AcadVersion::R2000;
        drawing.add_entity(dxf::entities::Entity::new(dxf::entities::EntityType::Line(
            dxf::entities::Line::new(
                dxf::Point::new(0.0, 0.0, 0.0),
                dxf::Point::new(100.0, 50.0, 0.0),
            ),
        )));
        let mut text = dxf::entities::Text::default();
        text.location = dxf::Point::new(10.0, 30.0, 0.0);
        text.text_height = 8.0;
        text.value = "PLAN".to_string();
        drawing.add_entity(dxf::entities::Entity::new(dxf::entities::EntityType::Text(text)));
        drawing.save_file(path).unwrap();
    }

    fn settings_for(dir: &Path, mode: TextMode, format: ExportFormat) -> Settings {
        Settings {
            converter_path: dir.join("no-converter"),
            data_dir: dir.to_path_buf(),
            font_path: dir.join("no-font.ttf"),
            text_choice: mode,
            format_choice: format,
            ..Settings::default()
        }
    }

    #[test]
    fn test_summary_failures() {
        assert!(!BatchSummary::default().has_failures());
        let summary = BatchSummary {
            outputs_failed: 1,
            ..Default::default()
        };
        assert!(summary.has_failures());
    }

    #[test]
    fn test_render_both_modes() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_dxf(&dir.path().join("plan.dxf"));

        let settings = settings_for(dir.path(), TextMode::Both, ExportFormat::Png);
        let mut summary = BatchSummary::default();
        render_dxf_files(&settings, &BatchProgress::hidden(), &mut summary);

        assert_eq!(summary.outputs_written, 2);
        assert!(dir.path().join("plan_with_text_x1.0.png").exists());
        assert!(dir.path().join("plan_without_text_x1.0.png").exists());
    }

    #[test]
    fn test_configured_font_draws_text() {
        let dir = tempfile::tempdir().unwrap();
        write_labelled_dxf(&dir.path().join("plan.dxf"));

        let mut settings = settings_for(dir.path(), TextMode::Both, ExportFormat::Png);
        settings.font_path = PathBuf::from(FIXTURE_FONT);
        let mut summary = BatchSummary::default();
        render_dxf_files(&settings, &BatchProgress::hidden(), &mut summary);
        assert_eq!(summary.outputs_written, 2);

        let with_text = std::fs::read(dir.path().join("plan_with_text_x1.0.png")).unwrap();
        let without_text = std::fs::read(dir.path().join("plan_without_text_x1.0.png")).unwrap();
        assert_ne!(with_text, without_text);

        // 没有字体时两张图相同
        let mut settings = settings_for(dir.path(), TextMode::Both, ExportFormat::Png);
        settings.font_path = dir.path().join("no-font.ttf");
        if FontFace::load_system(&settings.font_path).is_none() {
            render_dxf_files(&settings, &BatchProgress::hidden(), &mut summary);
            let with_text = std::fs::read(dir.path().join("plan_with_text_x1.0.png")).unwrap();
            let without_text = std::fs::read(dir.path().join("plan_without_text_x1.0.png")).unwrap();
            assert_eq!(with_text, without_text);
        }
    }

    #[test]
    fn test_unreadable_dxf_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.dxf"), "not a drawing\n").unwrap();
        write_sample_dxf(&dir.path().join("good.dxf"));

        let settings = settings_for(dir.path(), TextMode::WithoutText, ExportFormat::Pdf);
        let mut summary = BatchSummary::default();
        render_dxf_files(&settings, &BatchProgress::hidden(), &mut summary);

        assert_eq!(summary.dxf_failed, 1);
        assert_eq!(summary.outputs_written, 1);
        assert!(!dir.path().join("broken_without_text_x1.0.pdf").exists());
        assert!(dir.path().join("good_without_text_x1.0.pdf").exists());
    }

    #[test]
    fn test_missing_converter_is_counted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plan.dwg"), b"dwg").unwrap();

        let settings = settings_for(dir.path(), TextMode::WithText, ExportFormat::Png);
        let summary = run(&settings, &BatchProgress::hidden());

        assert_eq!(summary.dwg_failed, 1);
        assert_eq!(summary.dwg_converted, 0);
        assert_eq!(summary.outputs_written, 0);
    }
}
