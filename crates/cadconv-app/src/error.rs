//! 应用错误定义

use std::path::PathBuf;
use thiserror::Error;

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// DWG → DXF 转换错误
#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("Failed to stage {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start converter {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Converter failed ({status}): {stderr}")]
    ProcessFailed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Input has no file name: {}", .0.display())]
    InvalidInput(PathBuf),
}
