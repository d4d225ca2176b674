use anyhow::Result;
use gitrs_core::{Error, Repository, hasher};

pub fn run() -> Result<()> {
    let repo = Repository::discover()?;
    let mut current = match repo.resolve_head() {
        Ok(digest) => Some(digest),
        Err(Error::NotFound(_)) => None,
        Err(err) => return Err(err.into()),
    };

    while let Some(digest) = current {
        let hex = hasher::to_hex(&digest);
        let commit = repo.get_commit(&hex)?;

        println!("commit {hex}");
        println!("Author: {}", commit.author);
        println!();
        for line in commit.message.lines() {
            println!("    {line}");
        }
        println!();

        current = commit.parent;
    }
    Ok(())
}
