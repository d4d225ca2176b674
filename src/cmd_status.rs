use std::fs;

use anyhow::Result;
use gitrs_core::index::Index;
use gitrs_core::object::{Object, ObjectKind};
use gitrs_core::refs::HeadState;
use gitrs_core::{Error, Repository, hasher};

/// A minimal three-way comparison (HEAD tree vs. index vs. working tree)
/// sufficient to show added/modified/deleted paths. Read-only — no index or
/// object-store mutation.
pub fn run() -> Result<()> {
    let repo = Repository::discover()?;
    let staged = Index::open(&repo.index_path())?;
    let head = load_head_index(&repo)?;

    let mut to_be_committed = Vec::new();
    for entry in staged.entries() {
        match head.get_by_path(&entry.path) {
            None => to_be_committed.push(format!("new file:   {}", entry.path)),
            Some(head_entry) if head_entry.digest != entry.digest => {
                to_be_committed.push(format!("modified:   {}", entry.path))
            }
            _ => {}
        }
    }
    for entry in head.entries() {
        if staged.get_by_path(&entry.path).is_none() {
            to_be_committed.push(format!("deleted:    {}", entry.path));
        }
    }

    let mut not_staged = Vec::new();
    for entry in staged.entries() {
        match fs::read(&entry.path) {
            Ok(bytes) => {
                let digest = hasher::hash(&Object::new(ObjectKind::Blob, bytes).serialize());
                if digest != entry.digest {
                    not_staged.push(format!("modified:   {}", entry.path));
                }
            }
            Err(_) => not_staged.push(format!("deleted:    {}", entry.path)),
        }
    }

    if to_be_committed.is_empty() && not_staged.is_empty() {
        println!("nothing to commit, working tree clean");
        return Ok(());
    }
    if !to_be_committed.is_empty() {
        println!("Changes to be committed:");
        for line in &to_be_committed {
            println!("  {line}");
        }
    }
    if !not_staged.is_empty() {
        println!("Changes not staged for commit:");
        for line in &not_staged {
            println!("  {line}");
        }
    }
    Ok(())
}

fn load_head_index(repo: &Repository) -> Result<Index> {
    let mut head = Index::new();
    let head_commit_digest = match repo.read_head()? {
        HeadState::Detached(digest) => Some(digest),
        HeadState::Branch(name) => match repo.read_branch_tip(&name) {
            Ok(digest) => Some(digest),
            Err(Error::NotFound(_)) => None,
            Err(err) => return Err(err.into()),
        },
    };
    if let Some(digest) = head_commit_digest {
        let commit = repo.get_commit(&hasher::to_hex(&digest))?;
        head.read_tree(repo, &hasher::to_hex(&commit.tree))?;
    }
    Ok(head)
}
