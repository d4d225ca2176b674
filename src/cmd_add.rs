use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gitrs_core::Repository;
use gitrs_core::index::Index;
use ignore::WalkBuilder;

pub fn run(paths: &[PathBuf]) -> Result<()> {
    let repo = Repository::discover()?;
    let mut index = Index::open(&repo.index_path())?;

    for path in paths {
        add_path(&repo, &mut index, path)?;
    }

    index.save(&repo.index_path())?;
    Ok(())
}

/// Adds a single pathspec: a directory (including `.`) is walked recursively,
/// staging every regular file found and skipping `.git`; a regular file is
/// staged directly; anything else (symlink, device, …) is skipped with a
/// warning rather than failing the whole command.
fn add_path(repo: &Repository, index: &mut Index, path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path)
        .with_context(|| format!("pathspec '{}' did not match any files", path.display()))?;

    if metadata.is_dir() {
        add_directory(repo, index, path)
    } else if metadata.is_file() {
        add_single_file(repo, index, path)
    } else {
        eprintln!("Skipping non-regular file: {}", path.display());
        Ok(())
    }
}

fn add_directory(repo: &Repository, index: &mut Index, dir: &Path) -> Result<()> {
    let walker = WalkBuilder::new(dir).max_depth(Some(1)).hidden(false).build();
    let mut entries: Vec<_> = walker
        .filter_map(|e| {
            let entry = e.ok()?;
            if entry.depth() == 0 || entry.file_name() == ".git" {
                None
            } else {
                Some(entry)
            }
        })
        .collect();
    entries.sort_by_key(|e| e.file_name().to_os_string());

    for entry in entries {
        add_path(repo, index, entry.path())?;
    }
    Ok(())
}

fn add_single_file(repo: &Repository, index: &mut Index, path: &Path) -> Result<()> {
    let cleaned = strip_cur_dir_components(path);
    let path_str = cleaned.to_str().context("path is not valid UTF-8")?;
    index.add_from_workdir(repo, path_str)?;
    println!("add '{path_str}'");
    Ok(())
}

/// Drops `.` (`Component::CurDir`) components so a pathspec like `.` or
/// `./sub` doesn't leave a leading `./` in the staged path — `Index::write_tree`
/// would otherwise synthesize a spurious `"."` subdirectory from it.
fn strip_cur_dir_components(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_repo(dir: &Path) -> Repository {
        let repo = Repository::at(dir.join(".git"));
        repo.init().unwrap();
        repo
    }

    #[test]
    fn add_dot_stages_every_file_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(dir.path());
        fs::write(dir.path().join("a.txt"), b"A").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), b"B").unwrap();

        let cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let result = run(&[PathBuf::from(".")]);
        std::env::set_current_dir(cwd).unwrap();
        result.unwrap();

        let index = Index::open(&repo.index_path()).unwrap();
        assert_eq!(index.count(), 2);
        assert!(index.get_by_path("a.txt").is_some());
        assert!(index.get_by_path("sub/b.txt").is_some());
    }

    #[test]
    fn add_skips_git_directory_contents() {
        let dir = tempfile::tempdir().unwrap();
        let repo = test_repo(dir.path());
        fs::write(dir.path().join("a.txt"), b"A").unwrap();

        let cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let result = run(&[PathBuf::from(".")]);
        std::env::set_current_dir(cwd).unwrap();
        result.unwrap();

        let index = Index::open(&repo.index_path()).unwrap();
        assert!(index.entries().iter().all(|e| !e.path.contains(".git")));
    }
}
