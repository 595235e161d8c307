//! Submission packaging: zips a project directory into `submission/<name>.zip`.
//!
//! Directories whose path (relative to the project root) contains
//! `submission` or `.git` are skipped, as are files whose name contains `.zip`.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Directory that receives the archives.
pub const SUBMISSION_DIR: &str = "submission";

const EXCLUDED_DIR_PATTERNS: &[&str] = &["submission", ".git"];
const EXCLUDED_FILE_PATTERN: &str = ".zip";

/// Result of a [`package`] run.
#[derive(Debug)]
pub struct PackageReport {
    pub archive: PathBuf,
    pub files: usize,
}

/// Returns `true` if the directory at `relative` (to the project root) must not be archived.
pub fn is_excluded_dir(relative: &Path) -> bool {
    let path = relative.to_string_lossy();
    EXCLUDED_DIR_PATTERNS.iter().any(|p| path.contains(p))
}

/// Returns `true` if a file called `name` must not be archived.
pub fn is_excluded_file(name: &str) -> bool {
    name.contains(EXCLUDED_FILE_PATTERN)
}

/// Lists every file under `root` that belongs in the archive, as sorted paths relative to `root`.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(root, Path::new(""), &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(root: &Path, relative: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let dir = root.join(relative);
    let entries =
        fs::read_dir(&dir).with_context(|| format!("failed to list '{}'", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let child = relative.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            if is_excluded_dir(&child) {
                debug!(dir = %child.display(), "Skipping excluded directory");
                continue;
            }
            walk(root, &child, files)?;
        } else if entry.path().is_file() {
            if is_excluded_file(&entry.file_name().to_string_lossy()) {
                continue;
            }
            files.push(child);
        }
    }

    Ok(())
}

/// Archive entry name for a relative path: components joined with `/`.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Zips every file under `root` into `root/submission/<name>.zip`.
#[tracing::instrument(skip(root), fields(root = %root.display()))]
pub fn package(root: &Path, name: &str) -> Result<PackageReport> {
    let files = collect_files(root)?;

    let out_dir = root.join(SUBMISSION_DIR);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create '{}'", out_dir.display()))?;

    let archive = out_dir.join(format!("{name}.zip"));
    let file = File::create(&archive)
        .with_context(|| format!("failed to create '{}'", archive.display()))?;
    let mut zip = ZipWriter::new(file);

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for relative in &files {
        zip.start_file(entry_name(relative), options)?;

        let source = root.join(relative);
        let mut reader =
            File::open(&source).with_context(|| format!("failed to open '{}'", source.display()))?;
        io::copy(&mut reader, &mut zip)?;
    }
    zip.finish()?;

    info!(archive = %archive.display(), files = files.len(), "Submission archive written");
    Ok(PackageReport {
        archive,
        files: files.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Read;

    fn project_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("decade_summary_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        for (path, body) in [
            ("README.md", "readme"),
            ("notebooks/eda.ipynb", "{}"),
            ("src/eda.py", "print()"),
            (".git/HEAD", "ref"),
            ("submission/old.txt", "old"),
            ("data/raw.zip", "zip"),
        ] {
            let full = dir.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, body).unwrap();
        }
        dir
    }

    #[test]
    fn test_exclusion_predicates() {
        assert!(is_excluded_dir(Path::new(".git")));
        assert!(is_excluded_dir(Path::new("src/.github")));
        assert!(is_excluded_dir(Path::new("old_submission")));
        assert!(!is_excluded_dir(Path::new("src")));

        assert!(is_excluded_file("archive.zip"));
        assert!(is_excluded_file("notes.zip.bak"));
        assert!(!is_excluded_file("eda.py"));
    }

    #[test]
    fn test_entry_name_uses_forward_slashes() {
        let relative: PathBuf = ["notebooks", "part1", "eda.ipynb"].iter().collect();
        assert_eq!(entry_name(&relative), "notebooks/part1/eda.ipynb");
    }

    #[test]
    fn test_collect_files_skips_excluded() {
        let dir = project_dir("collect");

        let files: Vec<String> = collect_files(&dir)
            .unwrap()
            .iter()
            .map(|p| entry_name(p))
            .collect();

        assert_eq!(files, vec!["README.md", "notebooks/eda.ipynb", "src/eda.py"]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_package_writes_archive() {
        let dir = project_dir("package");

        let report = package(&dir, "ramos_notebook2").unwrap();
        assert_eq!(report.files, 3);
        assert_eq!(report.archive, dir.join("submission/ramos_notebook2.zip"));

        let mut archive = zip::ZipArchive::new(File::open(&report.archive).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(String::from).collect();
        names.sort();
        assert_eq!(names, vec!["README.md", "notebooks/eda.ipynb", "src/eda.py"]);

        let mut body = String::new();
        archive
            .by_name("src/eda.py")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "print()");

        // a second run must not pick up its own output
        let again = package(&dir, "ramos_notebook2").unwrap();
        assert_eq!(again.files, 3);

        fs::remove_dir_all(&dir).unwrap();
    }
}
