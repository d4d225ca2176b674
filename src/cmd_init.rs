use anyhow::Result;
use gitrs_core::Repository;

pub fn run() -> Result<()> {
    let repo = Repository::at(".git");
    repo.init()?;
    println!("Initialized empty git repository in .git/");
    Ok(())
}
