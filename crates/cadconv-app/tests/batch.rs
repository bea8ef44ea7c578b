//! 批处理端到端测试（使用 shell 脚本模拟外部转换器）

#![cfg(unix)]

use cadconv_app::{run, BatchProgress, Settings, TextMode};
use cadconv_renderer::ExportFormat;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// 写入脚本后立即执行，并发测试的 fork 会持有写句柄（ETXTBSY）
static LOCK: Mutex<()> = Mutex::new(());

fn write_template_dxf(path: &Path) {
    let mut drawing = dxf::Drawing::new();
    drawing.header.version = dxf::enums::AcadVersion::R2000;
    drawing.add_entity(dxf::entities::Entity::new(dxf::entities::EntityType::Line(
        dxf::entities::Line::new(
            dxf::Point::new(0.0, 0.0, 0.0),
            dxf::Point::new(40.0, 30.0, 0.0),
        ),
    )));
    drawing.add_entity(dxf::entities::Entity::new(dxf::entities::EntityType::Circle(
        dxf::entities::Circle::new(dxf::Point::new(20.0, 15.0, 0.0), 10.0),
    )));
    let mut text = dxf::entities::Text::default();
    text.location = dxf::Point::new(5.0, 5.0, 0.0);
    text.text_height = 2.5;
    text.value = "평면도".to_string();
    drawing.add_entity(dxf::entities::Entity::new(dxf::entities::EntityType::Text(text)));
    drawing.save_file(path).unwrap();
}

/// 模拟转换器：校验参数后为暂存目录中的每个文件写出 DXF
fn write_fake_converter(dir: &Path, template: &Path) -> PathBuf {
    let script = dir.join("fake-converter.sh");
    let body = format!(
        "#!/bin/sh\n\
         [ \"$3\" = ACAD2018 ] && [ \"$4\" = DXF ] && [ \"$5\" = 0 ] && [ \"$6\" = 1 ] && [ \"$7\" = '*.DWG' ] || exit 2\n\
         for f in \"$1\"/*; do\n\
           name=$(basename \"$f\")\n\
           cp \"{}\" \"$2/${{name%.*}}.dxf\" || exit 3\n\
         done\n",
        template.display()
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn write_failing_converter(dir: &Path) -> PathBuf {
    let script = dir.join("failing-converter.sh");
    fs::write(&script, "#!/bin/sh\necho 'cannot read drawing' >&2\nexit 1\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

struct Fixture {
    tools: tempfile::TempDir,
    data: tempfile::TempDir,
    template: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tools = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        let template = tools.path().join("template.dxf");
        write_template_dxf(&template);
        Self {
            tools,
            data,
            template,
        }
    }

    fn tools(&self) -> &Path {
        self.tools.path()
    }

    fn data(&self) -> &Path {
        self.data.path()
    }

    fn settings(&self, converter: PathBuf, mode: TextMode) -> Settings {
        Settings {
            converter_path: converter,
            data_dir: self.data().to_path_buf(),
            font_path: self.tools().join("missing-font.ttf"),
            text_choice: mode,
            ..Settings::default()
        }
    }
}

#[test]
fn test_dwg_converted_then_rendered_with_text() {
    let _guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let fixture = Fixture::new();
    let converter = write_fake_converter(fixture.tools(), &fixture.template);
    fs::create_dir(fixture.data().join("floor1")).unwrap();
    fs::write(fixture.data().join("floor1/A.dwg"), b"AC1032").unwrap();

    let settings = fixture.settings(converter, TextMode::WithText);
    let summary = run(&settings, &BatchProgress::hidden());

    assert_eq!(summary.dwg_converted, 1);
    assert_eq!(summary.outputs_written, 1);
    assert!(fixture.data().join("floor1/A.dxf").exists());

    let png = fixture.data().join("floor1/A_with_text_x1.0.png");
    assert!(fs::read(&png).unwrap().starts_with(b"\x89PNG"));
    assert!(!fixture.data().join("floor1/A_without_text_x1.0.png").exists());

    // 源 DWG 保持不变
    assert_eq!(fs::read(fixture.data().join("floor1/A.dwg")).unwrap(), b"AC1032");
}

#[test]
fn test_existing_dxf_rendered_both_ways_as_pdf() {
    let _guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let fixture = Fixture::new();
    fs::copy(&fixture.template, fixture.data().join("B.DXF")).unwrap();

    let mut settings = fixture.settings(fixture.tools().join("unused"), TextMode::Both);
    settings.format_choice = ExportFormat::Pdf;
    settings.scale = 2.0;
    let summary = run(&settings, &BatchProgress::hidden());

    assert_eq!(summary.dwg_converted + summary.dwg_failed, 0);
    assert_eq!(summary.outputs_written, 2);
    for name in ["B_with_text_x2.0.pdf", "B_without_text_x2.0.pdf"] {
        let bytes = fs::read(fixture.data().join(name)).unwrap();
        assert!(bytes.starts_with(b"%PDF"), "{} is not a PDF", name);
    }
}

#[test]
fn test_failing_converter_does_not_abort() {
    let _guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let fixture = Fixture::new();
    let converter = write_failing_converter(fixture.tools());
    fs::write(fixture.data().join("C.dwg"), b"AC1032").unwrap();
    fs::write(fixture.data().join("D.dwg"), b"AC1032").unwrap();

    let settings = fixture.settings(converter, TextMode::WithoutText);
    let summary = run(&settings, &BatchProgress::hidden());

    assert_eq!(summary.dwg_failed, 2);
    assert_eq!(summary.dwg_converted, 0);
    assert_eq!(summary.outputs_written, 0);
    let leftovers: Vec<_> = fs::read_dir(fixture.data())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 2);
}

#[test]
fn test_broken_dxf_skipped_others_rendered() {
    let _guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let fixture = Fixture::new();
    fs::write(fixture.data().join("broken.dxf"), "not a drawing\n").unwrap();
    fs::copy(&fixture.template, fixture.data().join("good.dxf")).unwrap();

    let settings = fixture.settings(fixture.tools().join("unused"), TextMode::WithoutText);
    let summary = run(&settings, &BatchProgress::hidden());

    assert_eq!(summary.dxf_failed, 1);
    assert_eq!(summary.outputs_written, 1);
    assert!(summary.has_failures());
    assert!(!fixture.data().join("broken_without_text_x1.0.png").exists());
    assert!(fixture.data().join("good_without_text_x1.0.png").exists());
}

#[test]
fn test_settings_loaded_from_ini() {
    let _guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let fixture = Fixture::new();
    fs::copy(&fixture.template, fixture.data().join("E.dxf")).unwrap();

    let ini = fixture.tools().join("config.ini");
    fs::write(
        &ini,
        format!(
            "[Settings]\nDATA_DIR = {}\nformat_choice = png\nScale = 0.5\ntext_choice = 2\nbackground_color = black\n",
            fixture.data().display()
        ),
    )
    .unwrap();

    let settings = Settings::load(&ini).unwrap();
    assert_eq!(settings.text_choice, TextMode::WithoutText);
    let summary = run(&settings, &BatchProgress::hidden());

    assert_eq!(summary.outputs_written, 1);
    assert!(fixture.data().join("E_without_text_x0.5.png").exists());
}
