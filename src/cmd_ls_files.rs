use anyhow::Result;
use gitrs_core::index::Index;
use gitrs_core::{hasher, Repository};

pub fn run(stage: bool) -> Result<()> {
    let repo = Repository::discover()?;
    let index = Index::open(&repo.index_path())?;

    for entry in index.entries() {
        if stage {
            println!(
                "{:0>6o} {} 0    {}",
                entry.mode,
                hasher::to_hex(&entry.digest),
                entry.path
            );
        } else {
            println!("{}", entry.path);
        }
    }
    Ok(())
}
