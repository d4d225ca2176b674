use anyhow::Result;
use gitrs_core::commit::{self, Commit};
use gitrs_core::{hasher, Repository};

pub fn run(message: &str, parent: Option<&str>, tree_digest: &str) -> Result<()> {
    let repo = Repository::discover()?;
    let tree = hasher::from_hex(tree_digest)?;
    let parent = parent.map(hasher::from_hex).transpose()?;

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

    println!("{}", hasher::to_hex(&digest));
    Ok(())
}
