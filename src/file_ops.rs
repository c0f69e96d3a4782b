//! Filesystem implementations of the folder listing and copy seams

use crate::domain::{natural_cmp, FileCopier, FolderLister};
use crate::error::{Result, SortError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Lists real subdirectories, sorted naturally by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFolderLister {
    pub show_hidden: bool,
}

impl FolderLister for FsFolderLister {
    fn list_subfolders(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if !self.show_hidden && name.starts_with('.') {
                continue;
            }
            names.push(name);
        }
        names.sort_by(|a, b| natural_cmp(a, b));
        Ok(names)
    }
}

/// Copies the image into the target folder under its own file name.
///
/// An existing file of the same name is overwritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCopier;

impl FileCopier for FsCopier {
    fn copy_file(&self, source: &Path, target_folder: &Path) -> io::Result<PathBuf> {
        let destination = destination_path(source, target_folder)?;
        if !target_folder.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Target folder not found: {}", target_folder.display()),
            ));
        }
        fs::copy(source, &destination)?;
        Ok(destination)
    }
}

/// Reports where each image would go without touching the disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunCopier;

impl FileCopier for DryRunCopier {
    fn copy_file(&self, source: &Path, target_folder: &Path) -> io::Result<PathBuf> {
        let destination = destination_path(source, target_folder)?;
        info!(
            from = %source.display(),
            to = %destination.display(),
            "[dry run] would copy"
        );
        Ok(destination)
    }
}

fn destination_path(source: &Path, target_folder: &Path) -> io::Result<PathBuf> {
    let name = source.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Not a file path: {}", source.display()),
        )
    })?;
    Ok(target_folder.join(name))
}

/// Opens a file with the system's default application.
pub fn open_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(SortError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }
    open::that(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FolderTree;
    use tempfile::TempDir;

    mod lister_tests {
        use super::*;

        #[test]
        fn test_lists_only_directories_in_natural_order() {
            let temp_dir = TempDir::new().unwrap();
            let root = temp_dir.path();
            fs::create_dir(root.join("set10")).unwrap();
            fs::create_dir(root.join("set2")).unwrap();
            fs::create_dir(root.join(".cache")).unwrap();
            fs::write(root.join("file.jpg"), b"x").unwrap();

            let names = FsFolderLister::default().list_subfolders(root).unwrap();
            assert_eq!(names, vec!["set2", "set10"]);

            let with_hidden = FsFolderLister { show_hidden: true }
                .list_subfolders(root)
                .unwrap();
            assert_eq!(with_hidden.len(), 3);
        }

        #[test]
        fn test_missing_directory_errors() {
            let result = FsFolderLister::default().list_subfolders(Path::new("/nonexistent/dir"));
            assert!(result.is_err());
        }

        #[test]
        fn test_builds_tree_from_disk() {
            let temp_dir = TempDir::new().unwrap();
            let root = temp_dir.path();
            fs::create_dir_all(root.join("people").join("family")).unwrap();
            fs::create_dir_all(root.join("people").join("friends")).unwrap();
            fs::create_dir(root.join("places")).unwrap();

            let tree = FolderTree::build(root, &FsFolderLister::default()).unwrap();
            assert_eq!(tree.len(), 5);
            let friends = tree.resolve(&[0, 1]);
            assert_eq!(tree.node(friends).path, root.join("people").join("friends"));
            assert_eq!(tree.sequence_label(friends), "12");
        }
    }

    mod copier_tests {
        use super::*;

        #[test]
        fn test_copy_into_folder() {
            let temp_dir = TempDir::new().unwrap();
            let source = temp_dir.path().join("photo.jpg");
            let target = temp_dir.path().join("dest");
            fs::write(&source, b"pixels").unwrap();
            fs::create_dir(&target).unwrap();

            let written = FsCopier.copy_file(&source, &target).unwrap();
            assert_eq!(written, target.join("photo.jpg"));
            assert_eq!(fs::read(&written).unwrap(), b"pixels");
            assert!(source.exists());
        }

        #[test]
        fn test_copy_overwrites_existing_name() {
            let temp_dir = TempDir::new().unwrap();
            let source = temp_dir.path().join("photo.jpg");
            let target = temp_dir.path().join("dest");
            fs::write(&source, b"new").unwrap();
            fs::create_dir(&target).unwrap();
            fs::write(target.join("photo.jpg"), b"old").unwrap();

            FsCopier.copy_file(&source, &target).unwrap();
            assert_eq!(fs::read(target.join("photo.jpg")).unwrap(), b"new");
        }

        #[test]
        fn test_copy_to_missing_folder_fails() {
            let temp_dir = TempDir::new().unwrap();
            let source = temp_dir.path().join("photo.jpg");
            fs::write(&source, b"x").unwrap();

            let result = FsCopier.copy_file(&source, &temp_dir.path().join("missing"));
            assert!(result.is_err());
        }

        #[test]
        fn test_copy_missing_source_fails() {
            let temp_dir = TempDir::new().unwrap();
            let result = FsCopier.copy_file(&temp_dir.path().join("gone.jpg"), temp_dir.path());
            assert!(result.is_err());
        }

        #[test]
        fn test_dry_run_leaves_disk_alone() {
            let temp_dir = TempDir::new().unwrap();
            let source = temp_dir.path().join("photo.jpg");
            fs::write(&source, b"x").unwrap();
            let target = temp_dir.path().join("dest");

            let written = DryRunCopier.copy_file(&source, &target).unwrap();
            assert_eq!(written, target.join("photo.jpg"));
            assert!(!target.exists());
        }
    }

    #[test]
    fn test_open_missing_file() {
        assert!(open_file(Path::new("/nonexistent/photo.jpg")).is_err());
    }
}
