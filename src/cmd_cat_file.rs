use std::io::{Write, stdout};

use anyhow::{Result, bail};
use gitrs_core::object::ObjectKind;
use gitrs_core::tree;
use gitrs_core::{hasher, Repository};

pub fn run(pretty_print: bool, digest: &str) -> Result<()> {
    if !pretty_print {
        bail!("-p must be passed; raw type/size printing is not supported");
    }
    let repo = Repository::discover()?;
    let object = repo.get_object(digest)?;

    match object.kind {
        ObjectKind::Blob => {
            stdout().write_all(&object.payload)?;
        }
        ObjectKind::Tree => {
            let entries = tree::decode(&object.payload)?;
            let mut out = stdout().lock();
            for entry in entries {
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
        ObjectKind::Commit | ObjectKind::Tag => {
            stdout().write_all(&object.payload)?;
        }
    }
    Ok(())
}
