//! DWG → DXF 转换
//!
//! 调用外部 ODA File Converter。每次转换先将 DWG 复制到独立的临时目录，
//! 转换器把该目录中的文件写到源文件所在目录。

use crate::error::ConverterError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// 输出 DXF 版本
pub const OUTPUT_VERSION: &str = "ACAD2018";
/// 输出格式
pub const OUTPUT_TYPE: &str = "DXF";
/// 不递归子目录
pub const RECURSE_FLAG: &str = "0";
/// 审核并修复输入
pub const AUDIT_FLAG: &str = "1";
/// 输入文件过滤
pub const INPUT_FILTER: &str = "*.DWG";

/// 外部转换器
#[derive(Debug, Clone)]
pub struct Converter {
    executable: PathBuf,
}

impl Converter {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// 构造转换器的位置参数
    pub fn arguments(source_dir: &Path, output_dir: &Path) -> Vec<OsString> {
        vec![
            source_dir.as_os_str().to_owned(),
            output_dir.as_os_str().to_owned(),
            OUTPUT_VERSION.into(),
            OUTPUT_TYPE.into(),
            RECURSE_FLAG.into(),
            AUDIT_FLAG.into(),
            INPUT_FILTER.into(),
        ]
    }

    /// 将 `dwg` 转换为同目录下的 DXF
    ///
    /// 退出码为 0 即视为成功，不检查输出内容。临时目录在返回时删除。
    pub fn convert(&self, dwg: &Path) -> Result<(), ConverterError> {
        let file_name = dwg
            .file_name()
            .ok_or_else(|| ConverterError::InvalidInput(dwg.to_path_buf()))?;
        let output_dir = match dwg.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let staging = tempfile::tempdir().map_err(|source| ConverterError::Staging {
            path: dwg.to_path_buf(),
            source,
        })?;
        std::fs::copy(dwg, staging.path().join(file_name)).map_err(|source| {
            ConverterError::Staging {
                path: dwg.to_path_buf(),
                source,
            }
        })?;

        let args = Self::arguments(staging.path(), &output_dir);
        debug!("Running {} {:?}", self.executable.display(), args);

        let output = Command::new(&self.executable)
            .args(&args)
            .output()
            .map_err(|source| ConverterError::Spawn {
                program: self.executable.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            debug!("Converter stdout: {}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("Converter stderr: {}", stderr.trim());
        }

        if !output.status.success() {
            return Err(ConverterError::ProcessFailed {
                status: output.status,
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}
