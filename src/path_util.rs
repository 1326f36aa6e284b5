//! Path utilities for lexical (filesystem-free) path handling.
//! Nothing here touches the disk or resolves symlinks.

use std::path::{Component, Path, PathBuf};

/// Normalize a relative path string to use forward slashes.
/// Used so rewritten reports read the same when produced on Windows.
#[must_use]
pub fn normalize_rel_path(s: &str) -> String {
    s.replace('\\', "/")
}

/// Collapse `.` and `..` components without consulting the filesystem.
/// `..` directly under a root stays at the root; leading `..` of a relative path is kept.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Component equality as the platform's filesystem sees it: ASCII case-insensitive
/// on Windows (drive letters, directory names), exact elsewhere.
fn same_component(a: &Component<'_>, b: &Component<'_>) -> bool {
    if cfg!(windows) {
        a.as_os_str()
            .to_string_lossy()
            .eq_ignore_ascii_case(&b.as_os_str().to_string_lossy())
    } else {
        a == b
    }
}

fn root_len(components: &[Component<'_>]) -> usize {
    components
        .iter()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .count()
}

/// Compute `path` relative to `base` lexically.
///
/// Both sides are normalized first. On Windows components compare
/// case-insensitively, so `c:\work\a.c` against `C:\Work` gives `a.c`.
/// Returns `None` when the two paths do not share a root (e.g. different
/// Windows drives, or one absolute and one not), in which case no relative
/// form exists. Equal paths yield `.`.
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    let path = normalize_lexically(path);
    let base = normalize_lexically(base);
    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let path_root = &path_parts[..root_len(&path_parts)];
    let base_root = &base_parts[..root_len(&base_parts)];
    if path_root.len() != base_root.len()
        || !path_root
            .iter()
            .zip(base_root)
            .all(|(a, b)| same_component(a, b))
    {
        return None;
    }

    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| same_component(a, b))
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push(Component::ParentDir);
    }
    for part in &path_parts[common..] {
        rel.push(part);
    }

    if rel.as_os_str().is_empty() {
        rel.push(Component::CurDir);
    }
    Some(rel)
}
