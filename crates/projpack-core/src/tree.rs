//! Tree-shaped listing of packaged files.
//!
//! ```text
//! ├── README.md
//! └── src
//!     ├── a.py
//!     └── sub
//!         └── b.py
//! ```

use crate::PackError;
use crate::Result;
use crate::filters;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const SPACE_INDENT: &str = "    ";

/// Node of a [`FileTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A packaged file.
    File,
    /// A directory and its children, ordered by name.
    Dir(BTreeMap<String, Node>),
}

/// Nested view of file paths relative to a project root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    root: BTreeMap<String, Node>,
}

impl FileTree {
    /// Builds a tree from files under `project_path`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::OutsideProject`] if a file is not under
    /// `project_path`.
    pub fn from_files<P: AsRef<Path>>(files: &[P], project_path: &Path) -> Result<Self> {
        let root_abs = filters::absolutize(project_path)?;
        let mut tree = Self::default();

        for file in files {
            let file_abs = filters::absolutize(file.as_ref())?;
            let relative = file_abs
                .strip_prefix(&root_abs)
                .map_err(|_| PackError::OutsideProject {
                    path: file_abs.clone(),
                    root: root_abs.clone(),
                })?;

            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            tree.insert(&parts);
        }

        Ok(tree)
    }

    fn insert(&mut self, parts: &[String]) {
        let Some((leaf, dirs)) = parts.split_last() else {
            return;
        };

        let mut level = &mut self.root;
        for dir in dirs {
            let node = level
                .entry(dir.clone())
                .or_insert_with(|| Node::Dir(BTreeMap::new()));
            if matches!(node, Node::File) {
                *node = Node::Dir(BTreeMap::new());
            }
            level = match node {
                Node::Dir(children) => children,
                Node::File => return,
            };
        }
        level.entry(leaf.clone()).or_insert(Node::File);
    }

    /// Returns `true` if the tree has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Returns the top-level entries.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, Node> {
        &self.root
    }

    /// Returns the rendered lines, one per file or directory.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        render_level(&self.root, "", &mut lines);
        lines
    }
}

fn render_level(level: &BTreeMap<String, Node>, prefix: &str, lines: &mut Vec<String>) {
    let count = level.len();
    for (index, (name, node)) in level.iter().enumerate() {
        let is_last = index + 1 == count;
        let pointer = if is_last { LAST_BRANCH } else { BRANCH };
        lines.push(format!("{prefix}{pointer}{name}"));

        if let Node::Dir(children) = node {
            let indent = if is_last { SPACE_INDENT } else { PIPE_INDENT };
            render_level(children, &format!("{prefix}{indent}"), lines);
        }
    }
}

impl fmt::Display for FileTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// Renders `files` as a box-drawing tree relative to `project_path`.
///
/// Entries at each level are sorted by name. An empty list renders as an
/// empty string.
///
/// # Examples
///
/// ```
/// use projpack_core::tree::render_tree;
/// use std::path::Path;
///
/// let files = [Path::new("/p/src/a.py"), Path::new("/p/src/sub/b.py")];
/// let listing = render_tree(&files, Path::new("/p"))?;
/// assert_eq!(
///     listing,
///     "└── src\n    ├── a.py\n    └── sub\n        └── b.py"
/// );
/// # Ok::<(), projpack_core::PackError>(())
/// ```
///
/// # Errors
///
/// Returns [`PackError::OutsideProject`] if a file is not under
/// `project_path`.
pub fn render_tree<P: AsRef<Path>>(files: &[P], project_path: &Path) -> Result<String> {
    FileTree::from_files(files, project_path).map(|tree| tree.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| Path::new("/p").join(n)).collect()
    }

    #[test]
    fn test_render_single_file() {
        let listing = render_tree(&paths(&["a.py"]), Path::new("/p")).unwrap();
        assert_eq!(listing, "└── a.py");
    }

    #[test]
    fn test_render_sorted_siblings() {
        let listing = render_tree(&paths(&["z.py", "b.py", "a.py"]), Path::new("/p")).unwrap();
        assert_eq!(listing, "├── a.py\n├── b.py\n└── z.py");
    }

    #[test]
    fn test_render_pipe_under_non_last_ancestor() {
        let files = paths(&["lib/x.py", "lib/y.py", "main.py"]);
        let listing = render_tree(&files, Path::new("/p")).unwrap();
        assert_eq!(
            listing,
            "├── lib\n│   ├── x.py\n│   └── y.py\n└── main.py"
        );
    }

    #[test]
    fn test_render_byte_order() {
        let files = paths(&["b.py", "B.py", "_c.py"]);
        let listing = render_tree(&files, Path::new("/p")).unwrap();
        assert_eq!(listing, "├── B.py\n├── _c.py\n└── b.py");
    }

    #[test]
    fn test_render_empty() {
        let files: Vec<PathBuf> = Vec::new();
        assert_eq!(render_tree(&files, Path::new("/p")).unwrap(), "");
        assert!(FileTree::from_files(&files, Path::new("/p")).unwrap().is_empty());
    }

    #[test]
    fn test_render_outside_project() {
        let err = render_tree(&[PathBuf::from("/elsewhere/a.py")], Path::new("/p")).unwrap_err();
        assert!(matches!(err, PackError::OutsideProject { .. }));
    }

    #[test]
    fn test_duplicate_paths_collapse() {
        let tree = FileTree::from_files(&paths(&["a.py", "a.py"]), Path::new("/p")).unwrap();
        assert_eq!(tree.lines(), ["└── a.py"]);
    }

    #[test]
    fn test_entries_structure() {
        let tree = FileTree::from_files(&paths(&["src/a.py"]), Path::new("/p")).unwrap();
        let Some(Node::Dir(children)) = tree.entries().get("src") else {
            panic!("src should be a directory");
        };
        assert_eq!(children.get("a.py"), Some(&Node::File));
    }
}
