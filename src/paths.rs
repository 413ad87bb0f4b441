//! Lexical path helpers.
//!
//! Paths stored in documents are relative to the document's directory and
//! always use `/` separators. Only [`relative_to`] looks outside its
//! arguments: it reads the working directory when one path is relative and
//! the other absolute.

use std::path::{Component, Path, PathBuf};

/// Remove `.` segments and fold `..` into the preceding segment.
///
/// A `..` that would climb above a root is dropped. Leading `..` segments of
/// a relative path are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Express `target` relative to the directory `base_dir`.
///
/// When only one of the two paths is absolute, the other is taken relative
/// to the current working directory. Paths on different drive prefixes, or
/// a working directory that cannot be read, give the normalised target back
/// unchanged.
pub fn relative_to(target: &Path, base_dir: &Path) -> PathBuf {
    if target.has_root() == base_dir.has_root() {
        return lexical_relative(&normalize(target), &normalize(base_dir));
    }
    match std::env::current_dir() {
        Ok(cwd) => relative_to_in(target, base_dir, &cwd),
        Err(e) => {
            log::warn!("Cannot read working directory to relate {:?}: {}", target, e);
            normalize(target)
        }
    }
}

/// Like [`relative_to`], with relative inputs anchored at `cwd`.
pub fn relative_to_in(target: &Path, base_dir: &Path, cwd: &Path) -> PathBuf {
    let target = normalize(&cwd.join(target));
    let base = normalize(&cwd.join(base_dir));
    lexical_relative(&target, &base)
}

fn lexical_relative(target: &Path, base: &Path) -> PathBuf {
    if target.has_root() != base.has_root() {
        return target.to_path_buf();
    }

    let target_parts: Vec<Component<'_>> = target.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    let common = target_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let shares_prefix = match (target_parts.first(), base_parts.first()) {
        (Some(Component::Prefix(a)), Some(Component::Prefix(b))) => a == b,
        (Some(Component::Prefix(_)), _) | (_, Some(Component::Prefix(_))) => false,
        _ => true,
    };
    if !shares_prefix {
        return target.to_path_buf();
    }

    let mut out = PathBuf::new();
    for _ in common..base_parts.len() {
        out.push("..");
    }
    for part in &target_parts[common..] {
        out.push(part.as_os_str());
    }
    out
}

/// Render a relative path with `/` separators, as stored in documents.
pub fn to_portable(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::CurDir => None,
            other => Some(other.as_os_str().to_string_lossy().replace('\\', "/")),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve a stored document path against the document's directory.
pub fn resolve(base_dir: &Path, stored: &str) -> PathBuf {
    let stored = Path::new(stored);
    if stored.is_absolute() {
        normalize(stored)
    } else {
        normalize(&base_dir.join(stored))
    }
}

/// The directory a file lives in, or `.` for a bare file name.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize(Path::new("../a/../../b")), PathBuf::from("../../b"));
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_relative_to_sibling_directory() {
        let rel = relative_to(
            Path::new("/project/art/sheets/hero.png"),
            Path::new("/project/docs"),
        );
        assert_eq!(to_portable(&rel), "../art/sheets/hero.png");
    }

    #[test]
    fn test_relative_to_same_directory() {
        let rel = relative_to(Path::new("/p/hero.png"), Path::new("/p"));
        assert_eq!(to_portable(&rel), "hero.png");
    }

    #[test]
    fn test_relative_to_relative_paths() {
        let rel = relative_to(Path::new("sheets/../img/a.png"), Path::new("./docs"));
        assert_eq!(to_portable(&rel), "../img/a.png");
    }

    #[test]
    fn test_relative_target_under_absolute_base() {
        let rel = relative_to_in(Path::new("art/hero.png"), Path::new("/w"), Path::new("/home/me"));
        assert_eq!(to_portable(&rel), "../home/me/art/hero.png");
        assert_eq!(
            resolve(Path::new("/w"), &to_portable(&rel)),
            PathBuf::from("/home/me/art/hero.png")
        );
    }

    #[test]
    fn test_absolute_target_under_relative_base() {
        let rel = relative_to_in(Path::new("/w/art/a.png"), Path::new("docs"), Path::new("/w"));
        assert_eq!(to_portable(&rel), "../art/a.png");
    }

    #[test]
    fn test_mixed_roots_use_working_directory() {
        let cwd = std::env::current_dir().unwrap();
        let rel = relative_to(Path::new("art/hero.png"), &cwd.join("docs"));
        assert_eq!(to_portable(&rel), "../art/hero.png");
    }

    #[test]
    fn test_resolve() {
        assert_eq!(
            resolve(Path::new("/p/docs"), "../img/a.png"),
            PathBuf::from("/p/img/a.png")
        );
        assert_eq!(resolve(Path::new("/p"), "/x/y.png"), PathBuf::from("/x/y.png"));
    }

    #[test]
    fn test_parent_dir_of_bare_name() {
        assert_eq!(parent_dir(Path::new("doc.json")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("a/doc.json")), PathBuf::from("a"));
    }
}
