/// Header/implementation pair discovery.
///
/// Walks a project tree, collects C++ headers, and pairs each one with a
/// sibling implementation file sharing its stem. Results are sorted by
/// header path so batch output is reproducible across platforms.
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

const HEADER_EXTENSIONS: &[&str] = &["h", "hpp"];
const IMPL_EXTENSIONS: &[&str] = &["cpp", "cc", "cxx"];

/// A discovered header and its optional implementation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePair {
    pub header_path: PathBuf,
    pub implementation_path: Option<PathBuf>,
}

fn is_header(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| HEADER_EXTENSIONS.contains(&ext))
}

/// Look for a sibling implementation file next to `header`, trying the
/// implementation extensions in order.
#[must_use]
pub fn find_implementation(header: &Path) -> Option<PathBuf> {
    IMPL_EXTENSIONS.iter().find_map(|ext| {
        let candidate = header.with_extension(ext);
        candidate.is_file().then_some(candidate)
    })
}

/// Discover all header/implementation pairs under `root`.
///
/// The walk respects `.gitignore`. Unreadable directory entries are
/// skipped. The returned pairs are sorted by header path.
#[must_use]
pub fn discover(root: &Path) -> Vec<SourcePair> {
    let walker = WalkBuilder::new(root).hidden(false).build();

    let mut pairs: Vec<SourcePair> = walker
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_header(path))
        .map(|header_path| SourcePair {
            implementation_path: find_implementation(&header_path),
            header_path,
        })
        .collect();

    pairs.sort_by(|a, b| a.header_path.cmp(&b.header_path));
    pairs
}
