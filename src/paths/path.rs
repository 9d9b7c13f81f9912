use std::{
    borrow::Cow,
    path::{Component, Path, PathBuf},
};

/// Utility function to replace separators and convert to unicode (via to_string_lossy) on os path.
///
/// Reference values inside documents always use `/`, whatever the host OS.
pub fn os_path_to_string<P: AsRef<Path>>(os_path_ref: P) -> String {
    let res = os_path_ref
        .as_ref()
        .components()
        .map(|c| match c {
            Component::RootDir => Cow::from("".to_string()),
            _ => c.as_os_str().to_string_lossy(),
        })
        .collect::<Vec<_>>()
        .join("/");
    tracing::trace!(
        "os_path_to_string: turned {:?} into {}",
        os_path_ref.as_ref(),
        res
    );
    res
}

/// Resolve `.` and `..` components lexically, without touching the filesystem.
///
/// Leading `..` components of a relative path are preserved; `..` directly under the root is
/// dropped.
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }
    components.iter().collect()
}

/// Directory containing `file`, or the empty path for a bare file name.
pub fn parent_dir<P: AsRef<Path>>(file: P) -> PathBuf {
    normalize(file.as_ref().parent().unwrap_or(Path::new("")))
}

/// Whether two directory paths name the same directory after lexical normalization.
pub fn same_dir<A: AsRef<Path>, B: AsRef<Path>>(a: A, b: B) -> bool {
    normalize(a) == normalize(b)
}

/// Express `to` relative to the directory `from_dir`, walking upward with `..` where needed.
///
/// Both paths are expected to share the same base (both absolute, or both relative to the same
/// working directory). When they cannot be related (one absolute and one relative, or `from_dir`
/// climbs above its own base) the normalized `to` is returned unchanged. Two identical
/// directories yield `.`.
pub fn relative_path<A: AsRef<Path>, B: AsRef<Path>>(from_dir: A, to: B) -> PathBuf {
    let from = normalize(from_dir);
    let to = normalize(to);
    if from.has_root() != to.has_root() {
        return to;
    }
    let from_parts: Vec<Component> = from.components().collect();
    let to_parts: Vec<Component> = to.components().collect();

    let common_len = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if from_parts[common_len..]
        .iter()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return to;
    }

    let mut result = PathBuf::new();
    for _ in common_len..from_parts.len() {
        result.push("..");
    }
    for part in &to_parts[common_len..] {
        result.push(part.as_os_str());
    }
    if result.as_os_str().is_empty() {
        result.push(".");
    }
    result
}

/// Reference from the document at `from_file` to the document at `to_file`: just the file name
/// when both live in the same directory, otherwise a `/`-separated relative path.
pub fn relative_target<A: AsRef<Path>, B: AsRef<Path>>(from_file: A, to_file: B) -> String {
    let from_dir = parent_dir(from_file);
    let to_file = to_file.as_ref();
    if same_dir(&from_dir, parent_dir(to_file)) {
        if let Some(name) = to_file.file_name() {
            return name.to_string_lossy().into_owned();
        }
    }
    os_path_to_string(relative_path(from_dir, to_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("./a/./b/../c"), PathBuf::from("a/c"));
        assert_eq!(normalize("../a/.."), PathBuf::from(".."));
        assert_eq!(normalize("/../a"), PathBuf::from("/a"));
        assert_eq!(normalize(""), PathBuf::from(""));
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("sub", "a.dita"), PathBuf::from("../a.dita"));
        assert_eq!(relative_path("", "sub/b.dita"), PathBuf::from("sub/b.dita"));
        assert_eq!(
            relative_path("docs/x/y", "docs/images"),
            PathBuf::from("../../images")
        );
        assert_eq!(relative_path("/r/docs", "/r/docs"), PathBuf::from("."));
        assert_eq!(relative_path("./docs", "docs/a"), PathBuf::from("a"));
        assert_eq!(relative_path("docs", "/abs/a"), PathBuf::from("/abs/a"));
    }

    #[test]
    fn test_relative_target() {
        assert_eq!(relative_target("a.dita", "a.dita"), "a.dita");
        assert_eq!(relative_target("sub/b.dita", "a.dita"), "../a.dita");
        assert_eq!(relative_target("a.dita", "sub/b.dita"), "sub/b.dita");
        assert_eq!(relative_target("x/one.dita", "x/two.dita"), "two.dita");
        assert_eq!(
            relative_target("/corpus/x/one.dita", "/corpus/y/z/two.dita"),
            "../y/z/two.dita"
        );
    }

    #[test]
    fn test_os_path_to_string_uses_forward_slashes() {
        let path: PathBuf = ["..", "images", "a.png"].iter().collect();
        assert_eq!(os_path_to_string(path), "../images/a.png");
        assert_eq!(os_path_to_string("/abs/dir"), "/abs/dir");
    }
}
