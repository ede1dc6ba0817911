// SPDX-License-Identifier: MIT

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;

use hidtree::names::UsageTable;
use hidtree::DescriptorTree;

#[derive(Debug, ClapParser)]
#[command(name = "hidtree")]
#[command(about = "Decodes USB HID report descriptors into a readable tree", long_about = None)]
struct Cli {
    /// Usage-name table files, loaded in order; later entries override
    /// earlier ones
    #[arg(value_name = "FILE", long, short)]
    usages: Vec<PathBuf>,
    /// Binary report descriptor files
    #[arg(value_name = "DESCRIPTOR", required = true)]
    descriptors: Vec<PathBuf>,
}

fn show(path: &Path, names: &UsageTable) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if data.is_empty() {
        println!("Empty");
        return Ok(());
    }
    let tree = DescriptorTree::try_from(data.as_slice())
        .with_context(|| format!("decoding {}", path.display()))?;
    for warning in tree.warnings() {
        eprintln!("WARNING: {warning}");
    }
    print!("{}", tree.display(names));
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let mut names = UsageTable::new();
    for path in &args.usages {
        names
            .load_file(path)
            .with_context(|| format!("loading usage table {}", path.display()))?;
    }

    let mut failed = 0;
    for path in &args.descriptors {
        println!("File: {}", path.display());
        if let Err(err) = show(path, &names) {
            eprintln!("ERROR: {err:#}");
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} descriptor(s) failed to decode");
    }
    Ok(())
}
