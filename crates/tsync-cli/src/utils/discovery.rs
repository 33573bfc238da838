//! Input file discovery.

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expands `paths` into a sorted, de-duplicated list of files.
///
/// Files are taken as given whatever their extension; directories are
/// walked recursively for files ending in `.{extension}`.
pub fn collect_files(paths: &[PathBuf], extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ));
        }

        for entry in WalkDir::new(path).follow_links(true) {
            let entry = entry.map_err(io::Error::other)?;
            if entry.file_type().is_file() && has_extension(entry.path(), extension) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_files_walks_directories() {
        let temp = assert_fs::TempDir::new().unwrap();
        let nested = temp.path().join("i18n/extra");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("i18n/app_de.ts"), "").unwrap();
        fs::write(nested.join("app_fr.ts"), "").unwrap();
        fs::write(nested.join("notes.txt"), "").unwrap();
        let explicit = temp.path().join("custom.xml");
        fs::write(&explicit, "").unwrap();

        let files = collect_files(
            &[temp.path().join("i18n"), explicit.clone(), temp.path().join("i18n")],
            "ts",
        )
        .unwrap();

        assert_eq!(files, vec![
            explicit,
            temp.path().join("i18n/app_de.ts"),
            nested.join("app_fr.ts"),
        ]);
    }

    #[test]
    fn test_collect_files_missing_path() {
        let temp = assert_fs::TempDir::new().unwrap();
        let err = collect_files(&[temp.path().join("nope")], "ts").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
