//! Filesystem lookups for candidate executables.

use std::cmp::Ordering;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Immediate subdirectories of `dir`, sorted by name. Symlinked
/// directories are included.
pub(crate) fn subdirectories(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let walk = WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walk {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => dirs.push(entry.into_path()),
            Ok(_) => {}
            // the root itself could not be listed
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(_) => {}
        }
    }
    Ok(dirs)
}

/// Find a file called `name` (ASCII case-insensitive) under `dir`.
///
/// `dir` itself is searched first, then each subdirectory in sorted order
/// down to `depth_limit` extra levels. The first hit wins. Links are
/// followed; unreadable directories and dangling links are skipped.
pub(crate) fn find_file(dir: &Path, name: &str, depth_limit: usize) -> Option<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(depth_limit + 1)
        .sort_by(files_first)
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| {
            entry.file_type().is_file()
                && entry.file_name().to_string_lossy().eq_ignore_ascii_case(name)
        })
        .map(DirEntry::into_path)
}

/// Sibling order for [`find_file`]: files before directories, then by name.
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    // entries are sorted before links are followed, so ask the filesystem
    let a_dir = a.path().is_dir();
    let b_dir = b.path().is_dir();
    a_dir
        .cmp(&b_dir)
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Lexically normalize `path`: drop `.` components and fold `..` into
/// their parent. Does not touch the filesystem or resolve symlinks.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = out.components().next_back();
                let after_name = matches!(last, Some(Component::Normal(_)));
                let at_root = matches!(last, Some(Component::RootDir | Component::Prefix(_)));
                if after_name {
                    out.pop();
                } else if !at_root {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Whether two paths name the same file after normalization.
///
/// Comparison ignores ASCII case on Windows.
pub(crate) fn is_same_path(a: &Path, b: &Path) -> bool {
    let a = normalize_path(a);
    let b = normalize_path(b);
    if cfg!(windows) {
        a.to_string_lossy()
            .eq_ignore_ascii_case(&b.to_string_lossy())
    } else {
        a == b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_find_file_in_dir() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("python"));
        assert_eq!(
            find_file(tmp.path(), "python", 1),
            Some(tmp.path().join("python"))
        );
    }

    #[test]
    fn test_find_file_one_level_down() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("bin").join("python"));
        assert_eq!(
            find_file(tmp.path(), "python", 1),
            Some(tmp.path().join("bin").join("python"))
        );
    }

    #[test]
    fn test_find_file_respects_depth_limit() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("a").join("b").join("python"));
        assert_eq!(find_file(tmp.path(), "python", 1), None);
        assert!(find_file(tmp.path(), "python", 2).is_some());
    }

    #[test]
    fn test_find_file_case_insensitive() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("Scripts").join("PYTHON.EXE"));
        assert_eq!(
            find_file(tmp.path(), "python.exe", 1),
            Some(tmp.path().join("Scripts").join("PYTHON.EXE"))
        );
    }

    #[test]
    fn test_find_file_ignores_directories_with_matching_name() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("python")).unwrap();
        assert_eq!(find_file(tmp.path(), "python", 0), None);
    }

    #[test]
    fn test_find_file_prefers_shallow_hit() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("python"));
        touch(&tmp.path().join("bin").join("python"));
        assert_eq!(
            find_file(tmp.path(), "python", 1),
            Some(tmp.path().join("python"))
        );
    }

    #[test]
    fn test_subdirectories_sorted_and_dirs_only() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("b")).unwrap();
        fs::create_dir(tmp.path().join("a")).unwrap();
        touch(&tmp.path().join("file.txt"));
        let dirs = subdirectories(tmp.path()).unwrap();
        assert_eq!(dirs, vec![tmp.path().join("a"), tmp.path().join("b")]);
    }

    #[test]
    fn test_find_file_in_sibling_dirs_after_own_files() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("a").join("python"));
        touch(&tmp.path().join("b").join("python"));
        touch(&tmp.path().join("z").join("python"));
        assert_eq!(
            find_file(tmp.path(), "python", 1),
            Some(tmp.path().join("a").join("python"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_followed() {
        let tmp = tempfile::tempdir().unwrap();
        let real = tmp.path().join("venvs").join("real");
        touch(&real.join("bin").join("python"));
        let root = tmp.path().join("ws");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(&real, root.join(".venv")).unwrap();

        let dirs = subdirectories(&root).unwrap();
        assert_eq!(dirs, vec![root.join(".venv")]);
        assert_eq!(
            find_file(&dirs[0], "python", 1),
            Some(root.join(".venv").join("bin").join("python"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_is_not_a_hit() {
        let tmp = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("python")).unwrap();
        assert_eq!(find_file(tmp.path(), "python", 1), None);
    }

    #[test]
    fn test_subdirectories_of_missing_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(subdirectories(&tmp.path().join("missing")).is_err());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/ws/project/../external/./python")),
            PathBuf::from("/ws/external/python")
        );
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize_path(Path::new("../../a")), PathBuf::from("../../a"));
    }

    #[test]
    fn test_is_same_path() {
        assert!(is_same_path(
            Path::new("/ws/env/bin/python"),
            Path::new("/ws/env/./bin/../bin/python")
        ));
        assert!(!is_same_path(
            Path::new("/ws/env/bin/python"),
            Path::new("/ws/other/bin/python")
        ));
    }
}
