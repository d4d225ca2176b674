use std::path::Path;

use anyhow::{Result, bail};
use gitrs_core::commit::{self, Commit};
use gitrs_core::refs::HeadState;
use gitrs_core::{Error, hasher, Repository};

pub fn run(message: &str) -> Result<()> {
    let repo = Repository::discover()?;
    let tree = repo.write_tree_from_workdir(Path::new("."))?;

    let branch = match repo.read_head()? {
        HeadState::Branch(name) => name,
        HeadState::Detached(_) => bail!("cannot commit while HEAD is detached"),
    };

    let parent = match repo.read_branch_tip(&branch) {
        Ok(digest) => Some(digest),
        Err(Error::NotFound(_)) => None,
        Err(err) => return Err(err.into()),
    };

    let (name, email) = commit::identity_from_gitconfig()?;
    let identity = commit::format_identity(&name, &email)?;
    let (timestamp, tz_offset) = commit::local_time_and_offset();

    let digest = repo.put_commit(&Commit {
        tree,
        parent,
        author: identity.clone(),
        committer: identity,
        timestamp,
        tz_offset,
        message: message.to_string(),
    })?;

    repo.write_branch_tip(&branch, digest)?;
    println!("{}", hasher::to_hex(&digest));
    Ok(())
}
