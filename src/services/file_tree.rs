use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

use super::installers::InstallError;

/// Read-only view over the files of an extracted package.
///
/// Built once per install and never mutated. Files are absolute and sorted so that
/// installs are deterministic.
#[derive(Debug, Clone)]
pub struct PackageFileTree {
    root: Utf8PathBuf,
    files: Vec<Utf8PathBuf>,
}

impl PackageFileTree {
    /// Recursively enumerate every regular file below `dir`.
    ///
    /// # Errors
    ///
    /// - [`InstallError::FileSystem`] if `dir` is absent or cannot be walked
    /// - [`InstallError::NonUtf8Path`] if an entry name is not valid UTF-8
    pub fn build_from_location(dir: &Utf8Path) -> Result<Self, InstallError> {
        if !dir.is_dir() {
            return Err(InstallError::FileSystem {
                path: dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "package directory not found"),
            });
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .and_then(Utf8Path::from_path)
                    .unwrap_or(dir)
                    .to_path_buf();
                InstallError::FileSystem {
                    path,
                    source: e.into(),
                }
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = Utf8PathBuf::try_from(entry.into_path())
                .map_err(|e| InstallError::NonUtf8Path(e.into_path_buf()))?;
            files.push(path);
        }

        tracing::debug!("Enumerated {} files under {}", files.len(), dir);

        Ok(Self {
            root: dir.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute paths of every file in the tree.
    pub fn recursive_files(&self) -> &[Utf8PathBuf] {
        &self.files
    }

    /// `(absolute, relative-to-root)` pairs.
    pub fn relative_files(&self) -> impl Iterator<Item = (&Utf8Path, &Utf8Path)> {
        self.files.iter().filter_map(|abs| {
            abs.strip_prefix(&self.root)
                .ok()
                .map(|rel| (abs.as_path(), rel))
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scratch() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, root)
    }

    #[test]
    fn test_build_lists_nested_files_sorted() {
        let (_temp_dir, root) = scratch();
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("b/inner/z.lua"), "z").unwrap();
        fs::write(root.join("a/y.lua"), "y").unwrap();
        fs::write(root.join("top.txt"), "t").unwrap();

        let tree = PackageFileTree::build_from_location(&root).unwrap();
        let relative: Vec<&str> = tree.relative_files().map(|(_, rel)| rel.as_str()).collect();

        assert_eq!(tree.len(), 3);
        assert_eq!(relative, vec!["a/y.lua", "b/inner/z.lua", "top.txt"]);
        assert!(tree.recursive_files().iter().all(|p| p.starts_with(&root)));
    }

    #[test]
    fn test_empty_directories_are_not_files() {
        let (_temp_dir, root) = scratch();
        fs::create_dir_all(root.join("empty/also_empty")).unwrap();

        let tree = PackageFileTree::build_from_location(&root).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_missing_directory_is_filesystem_error() {
        let (_temp_dir, root) = scratch();

        let err = PackageFileTree::build_from_location(&root.join("UE4SS/Mods")).unwrap_err();
        assert!(matches!(err, InstallError::FileSystem { .. }));
    }
}
