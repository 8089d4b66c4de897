//! Source layout checks across the workspace crates
//!
//! Every Rust source file opens with an inner `//!` module doc, never an outer `///`
//! comment that would attach to the first item instead of the module.
//!
//! Run with: cargo test --test source_layout_tests

use std::fs;
use std::path::{Path, PathBuf};

fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

fn workspace_sources() -> Vec<PathBuf> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).parent().unwrap().to_path_buf();
    let mut files = Vec::new();
    for krate in ["rio_gpu", "rio_gpu_cafe", "rio_gpu_gl"] {
        for sub in ["src", "tests"] {
            let dir = root.join(krate).join(sub);
            if dir.is_dir() {
                rust_sources(&dir, &mut files);
            }
        }
    }
    files
}

// ============================================================================
// MODULE HEADERS
// ============================================================================

#[test]
fn test_module_headers_are_inner_docs() {
    let files = workspace_sources();
    assert!(files.len() > 30);

    let outer: Vec<_> = files
        .iter()
        .filter(|path| {
            let text = fs::read_to_string(path).unwrap();
            text.lines().next().is_some_and(|line| line.starts_with("///"))
        })
        .collect();
    assert!(outer.is_empty(), "outer doc headers in {:?}", outer);
}

#[test]
fn test_library_sources_have_module_docs() {
    let missing: Vec<_> = workspace_sources()
        .into_iter()
        .filter(|path| path.components().any(|c| c.as_os_str() == "src"))
        .filter(|path| {
            let text = fs::read_to_string(path).unwrap();
            !(text.starts_with("//!") || text.starts_with("/*!"))
        })
        .collect();
    assert!(missing.is_empty(), "no module doc in {:?}", missing);
}
