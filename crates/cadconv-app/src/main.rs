//! cadconv - DWG/DXF 批量转换为 PNG/PDF

use anyhow::{Context, Result};
use cadconv_app::{banner, BatchProgress, Settings};
use clap::Parser;
use console::Term;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "cadconv", version, about = "Batch convert DWG/DXF drawings to PNG or PDF")]
struct Cli {
    /// INI 配置文件
    #[arg(short, long, default_value = "config.ini")]
    config: PathBuf,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    /// 启动时不清屏
    #[arg(long)]
    no_clear: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .finish(),
    )?;

    let settings = Settings::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    if !cli.no_clear {
        if let Err(e) = banner::clear_screen(&Term::stdout()) {
            warn!("Failed to clear the terminal: {}", e);
        }
    }
    banner::print_title(env!("CARGO_PKG_VERSION"));

    info!(
        "Input directory: {}, format: {}, scale: {:?}, text: {}",
        settings.data_dir.display(),
        settings.format_choice,
        settings.scale,
        settings.text_choice
    );

    let progress = BatchProgress::new();
    let summary = cadconv_app::run(&settings, &progress);
    if summary.has_failures() {
        info!(
            "{} DWG and {} DXF files failed, {} outputs failed",
            summary.dwg_failed, summary.dxf_failed, summary.outputs_failed
        );
    }

    println!("All conversions are complete.");
    Ok(())
}
