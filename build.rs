// SPDX-License-Identifier: MIT

use std::io::Write;
use std::path::PathBuf;

// For each .bin file in our tests/data directory, create one basic test
// function that decodes that report descriptor. The generated file is
// included by tests/descriptors.rs.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let datadir: PathBuf = [concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data")]
        .iter()
        .collect();
    let out_dir = std::env::var_os("OUT_DIR").ok_or("OUT_DIR is not set")?;
    let dest_path = PathBuf::from(&out_dir).join("descriptor-tests.rs");
    let mut file = std::fs::File::create(dest_path)?;

    if !datadir.is_dir() {
        // the packaged crate ships without fixtures
        return Ok(());
    }

    writeln!(file, "use hidtree::DescriptorTree;")?;

    for entry in std::fs::read_dir(datadir)?.flatten() {
        let filename = entry.file_name().into_string().unwrap_or_default();
        let Some(name) = filename.strip_suffix(".bin") else {
            continue;
        };
        let funcname = name.replace([':', '.', '-'], "_");
        let path = entry.path();
        writeln!(
            file,
            "
#[test]
#[allow(non_snake_case)]
fn decodes_{funcname}() {{
    let bytes: Vec<u8> = std::fs::read({path:?}).unwrap();
    DescriptorTree::try_from(bytes.as_slice())
        .unwrap_or_else(|err| panic!(\"failed to decode {filename}: {{err}}\"));
}}
"
        )?;
    }

    Ok(())
}
