use std::io::{Write, stdout};

use anyhow::{Result, bail};
use gitrs_core::object::ObjectKind;
use gitrs_core::tree;
use gitrs_core::{hasher, Repository};

pub fn run(name_only: bool, tree_digest: &str) -> Result<()> {
    let repo = Repository::discover()?;
    let object = repo.get_object(tree_digest)?;
    if object.kind != ObjectKind::Tree {
        bail!("{tree_digest} is not a tree object");
    }

    let entries = tree::decode(&object.payload)?;
    let mut out = stdout().lock();
    for entry in entries {
        if name_only {
            writeln!(out, "{}", entry.name)?;
        } else {
            let kind = ObjectKind::from_mode(&entry.mode)?;
            writeln!(
                out,
                "{:0>6} {} {}    {}",
                entry.mode,
                kind.as_str(),
                hasher::to_hex(&entry.digest),
                entry.name
            )?;
        }
    }
    Ok(())
}
