use std::path::Path;

use anyhow::Result;
use gitrs_core::{hasher, Repository};

pub fn run() -> Result<()> {
    let repo = Repository::discover()?;
    let digest = repo.write_tree_from_workdir(Path::new("."))?;
    println!("{}", hasher::to_hex(&digest));
    Ok(())
}
