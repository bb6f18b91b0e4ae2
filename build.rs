use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use fs_extra::{copy_items, dir::CopyOptions};

fn main() -> Result<()> {
    // Rerun when anything under assets/ changes.
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let assets = manifest_dir.join("assets");

    // `resources::load_binary` falls back to this copy.
    println!(
        "cargo:rustc-env=PORTAL_ASSETS_DIR={}",
        out_dir.join("assets").display()
    );

    if !assets.exists() {
        println!("cargo:warning=no assets/ directory, the room model and texture must be supplied at runtime");
        return Ok(());
    }
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    copy_items(&[&assets], &out_dir, &copy_options)
        .with_context(|| format!("copying {} into {}", assets.display(), out_dir.display()))?;

    Ok(())
}
