use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gitrs_core::hasher;
use gitrs_core::object::{Object, ObjectKind};
use gitrs_core::Repository;

pub fn run(file: &Path, write: bool) -> Result<()> {
    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let object = Object::new(ObjectKind::Blob, bytes);

    let digest = if write {
        let repo = Repository::discover()?;
        repo.put_object(object.kind, &object.payload)?
    } else {
        hasher::hash(&object.serialize())
    };

    println!("{}", hasher::to_hex(&digest));
    Ok(())
}
