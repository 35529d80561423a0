use std::fs;
use std::path::{Path, PathBuf};

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn relative_path(path: &Path) -> String {
    path.strip_prefix(root())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn collect_rs_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = fs::read_dir(dir).unwrap_or_else(|e| {
        panic!("failed to read dir {}: {e}", dir.display());
    });

    for entry in entries {
        let path = entry
            .unwrap_or_else(|e| panic!("failed to read dir entry: {e}"))
            .path();
        if path.is_dir() {
            collect_rs_files_recursive(&path, files);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
}

fn rs_files(relative_dir: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_rs_files_recursive(&root().join(relative_dir), &mut files);
    files.sort();
    files
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

/// `(file, line number, line)` for every line under `relative_dir` that
/// contains one of `patterns`.
pub fn find_lines_containing(
    relative_dir: &str,
    patterns: &[&str],
) -> Vec<(String, usize, String)> {
    let mut hits = Vec::new();
    for file in rs_files(relative_dir) {
        for (idx, line) in read(&file).lines().enumerate() {
            if patterns.iter().any(|p| line.contains(p)) {
                hits.push((relative_path(&file), idx + 1, line.to_string()));
            }
        }
    }
    hits
}

/// Lines in `mod.rs` files that are neither module declarations nor
/// re-exports.
pub fn find_non_export_lines_in_mod_files(relative_dir: &str) -> Vec<(String, usize, String)> {
    let mut violations = Vec::new();
    for file in rs_files(relative_dir) {
        if file.file_name().and_then(|s| s.to_str()) != Some("mod.rs") {
            continue;
        }
        let content = read(&file);
        let mut in_use_block = false;
        for (idx, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();

            if in_use_block {
                in_use_block = !line.ends_with(';');
                continue;
            }
            if line.starts_with("pub use ") {
                in_use_block = !line.ends_with(';');
                continue;
            }
            if line.is_empty()
                || line.starts_with("//")
                || line.starts_with("pub mod ")
                || line.starts_with("mod ")
                || line.starts_with("#[cfg")
            {
                continue;
            }

            violations.push((relative_path(&file), idx + 1, raw_line.to_string()));
        }
    }
    violations
}
