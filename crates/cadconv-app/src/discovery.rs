//! 文件发现

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// 递归查找 `root` 下扩展名为 `extension` 的文件（不区分大小写）
///
/// 不跟随符号链接；根目录不存在时返回空列表。
pub fn find_files(root: &Path, extension: &str) -> Vec<PathBuf> {
    if !root.is_dir() {
        warn!("Input directory {} does not exist", root.display());
        return Vec::new();
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            files.push(entry.into_path());
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_recursive_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("a.dwg"), b"").unwrap();
        fs::write(root.join("sub/B.DWG"), b"").unwrap();
        fs::write(root.join("sub/deeper/c.Dwg"), b"").unwrap();
        fs::write(root.join("sub/d.dxf"), b"").unwrap();
        fs::write(root.join("dwg"), b"").unwrap();
        fs::create_dir(root.join("folder.dwg")).unwrap();

        let mut found = find_files(root, "dwg");
        found.sort();
        assert_eq!(
            found,
            vec![
                root.join("a.dwg"),
                root.join("sub/B.DWG"),
                root.join("sub/deeper/c.Dwg"),
            ]
        );

        assert_eq!(find_files(root, "dxf"), vec![root.join("sub/d.dxf")]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_files(&dir.path().join("nowhere"), "dwg").is_empty());
    }
}
