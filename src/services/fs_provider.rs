use camino::Utf8Path;
use std::fs;
use std::io;

/// Filesystem operations the installers depend on.
///
/// Installers only touch the disk through this trait so failures can be injected
/// in tests.
#[cfg_attr(test, mockall::automock)]
pub trait FsProvider: Send + Sync {
    fn exists(&self, path: &Utf8Path) -> bool;

    /// Recursive and idempotent.
    fn mkdirs(&self, path: &Utf8Path) -> io::Result<()>;

    /// Copy file bytes, replacing `dst` if present.
    fn copy_file(&self, src: &Utf8Path, dst: &Utf8Path) -> io::Result<()>;

    fn remove_file(&self, path: &Utf8Path) -> io::Result<()>;

    fn remove_dir_all(&self, path: &Utf8Path) -> io::Result<()>;
}

/// [`FsProvider`] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FsProvider for LocalFs {
    fn exists(&self, path: &Utf8Path) -> bool {
        path.exists()
    }

    fn mkdirs(&self, path: &Utf8Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn copy_file(&self, src: &Utf8Path, dst: &Utf8Path) -> io::Result<()> {
        fs::copy(src, dst).map(|_| ())
    }

    fn remove_file(&self, path: &Utf8Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Utf8Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }
}
