// SPDX-License-Identifier: MIT

//! Resolution of usages to human-readable names, driven by text tables
//! loaded at runtime.
//!
//! The table format is line oriented and tab separated. A line
//! `(<hex>)<TAB><name>` opens a usage page; every following line
//! `<hex><TAB><name>` or `<hex>-<hex><TAB><name>` names one usage or an
//! inclusive range of usages on that page. Blank lines and lines starting
//! with `#` are skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::types::Usage;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("line {line}: missing tab separator")]
    MissingSeparator { line: usize },
    #[error("line {line}: invalid hex number: {source}")]
    InvalidNumber {
        line: usize,
        source: std::num::ParseIntError,
    },
    #[error("line {line}: usage entry before any page line")]
    NoOpenPage { line: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Default)]
struct PageNames {
    name: String,
    usages: HashMap<u16, String>,
}

/// Maps usages to their display names.
///
/// Several tables may be loaded into the same `UsageTable`; later entries
/// overwrite earlier ones, so a small local table can refine a big
/// published one. An empty table is valid and resolves everything to `?`.
#[derive(Debug, Default)]
pub struct UsageTable {
    pages: HashMap<u16, PageNames>,
}

impl UsageTable {
    pub fn new() -> UsageTable {
        UsageTable::default()
    }

    /// Loads one table from a file, adding to whatever is already loaded.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), TableError> {
        self.load_str(&fs::read_to_string(path)?)
    }

    /// Loads one table from text, adding to whatever is already loaded.
    pub fn load_str(&mut self, text: &str) -> Result<(), TableError> {
        let mut current: Option<u16> = None;
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let lineno = lineno + 1;
            let (key, name) = line
                .split_once('\t')
                .ok_or(TableError::MissingSeparator { line: lineno })?;
            let key = key.trim();
            let name = name.trim();
            if let Some(page) = key.strip_prefix('(').and_then(|k| k.strip_suffix(')')) {
                let page = parse_hex(page, lineno)?;
                let entry = self.pages.entry(page).or_default();
                entry.name = name.to_string();
                current = Some(page);
            } else {
                let Some(page) = current else {
                    return Err(TableError::NoOpenPage { line: lineno });
                };
                // some published tables use U+2010 as the range separator
                let key = key.replace('\u{2010}', "-");
                let (first, last) = match key.split_once('-') {
                    Some((first, last)) => (parse_hex(first, lineno)?, parse_hex(last, lineno)?),
                    None => {
                        let id = parse_hex(&key, lineno)?;
                        (id, id)
                    }
                };
                // the page exists whenever `current` is set
                let usages = &mut self.pages.entry(page).or_default().usages;
                for id in first..=last {
                    usages.insert(id, name.to_string());
                }
            }
        }
        Ok(())
    }

    /// The display label for a usage: `pp:ii = Page Name: Usage Name` in
    /// zero-padded lowercase hex, with `?` for anything the loaded tables
    /// do not cover. The zero usage has no label; fields carrying it are
    /// padding.
    pub fn label(&self, usage: Usage) -> Option<String> {
        if u32::from(usage) == 0 {
            return None;
        }
        let page = u16::from(usage.page());
        let id = u16::from(usage.id());
        let names = self.pages.get(&page);
        let page_name = names.map_or("?", |p| p.name.as_str());
        let usage_name = names
            .and_then(|p| p.usages.get(&id))
            .map_or("?", String::as_str);
        Some(format!("{page:02x}:{id:02x} = {page_name}: {usage_name}"))
    }
}

fn parse_hex(text: &str, line: usize) -> Result<u16, TableError> {
    u16::from_str_radix(text, 16).map_err(|source| TableError::InvalidNumber { line, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
# test table
(1)\tGeneric Desktop
02\tMouse
30\tX
31\tY

(9)\tButton
0001-0003\tButton
";

    #[test]
    fn labels_resolve_names() {
        let mut table = UsageTable::new();
        table.load_str(TABLE).unwrap();
        assert_eq!(
            table.label(Usage(0x10002)).as_deref(),
            Some("01:02 = Generic Desktop: Mouse")
        );
        assert_eq!(
            table.label(Usage(0x10030)).as_deref(),
            Some("01:30 = Generic Desktop: X")
        );
    }

    #[test]
    fn ranges_name_every_usage() {
        let mut table = UsageTable::new();
        table.load_str(TABLE).unwrap();
        for id in 1..=3u32 {
            assert_eq!(
                table.label(Usage(0x90000 + id)).as_deref(),
                Some(format!("09:{id:02x} = Button: Button").as_str())
            );
        }
        assert_eq!(table.label(Usage(0x90004)).as_deref(), Some("09:04 = Button: ?"));
    }

    #[test]
    fn unknown_entries_fall_back_to_question_marks() {
        let mut table = UsageTable::new();
        table.load_str(TABLE).unwrap();
        assert_eq!(
            table.label(Usage(0x10099)).as_deref(),
            Some("01:99 = Generic Desktop: ?")
        );
        assert_eq!(table.label(Usage(0x70001)).as_deref(), Some("07:01 = ?: ?"));
        assert_eq!(
            UsageTable::new().label(Usage(0xff00_0001)).as_deref(),
            Some("ff00:01 = ?: ?")
        );
    }

    #[test]
    fn zero_usage_has_no_label() {
        let mut table = UsageTable::new();
        table.load_str(TABLE).unwrap();
        assert_eq!(table.label(Usage(0)), None);
    }

    #[test]
    fn unicode_hyphen_ranges() {
        let mut table = UsageTable::new();
        table
            .load_str("(9)\tButton\n0001\u{2010}0002\tButton\n")
            .unwrap();
        assert_eq!(
            table.label(Usage(0x90002)).as_deref(),
            Some("09:02 = Button: Button")
        );
    }

    #[test]
    fn later_loads_override() {
        let mut table = UsageTable::new();
        table.load_str(TABLE).unwrap();
        table.load_str("(1)\tGD\n30\tX axis\n").unwrap();
        // renamed page and usage
        assert_eq!(table.label(Usage(0x10030)).as_deref(), Some("01:30 = GD: X axis"));
        // untouched usages on the reopened page survive
        assert_eq!(table.label(Usage(0x10031)).as_deref(), Some("01:31 = GD: Y"));
    }

    #[test]
    fn missing_separator_is_an_error() {
        let mut table = UsageTable::new();
        match table.load_str("(1)\tGeneric Desktop\n30 X\n") {
            Err(TableError::MissingSeparator { line: 2 }) => {}
            other => panic!("expected MissingSeparator, got {other:?}"),
        }
    }

    #[test]
    fn usage_before_page_is_an_error() {
        let mut table = UsageTable::new();
        match table.load_str("# heading\n30\tX\n") {
            Err(TableError::NoOpenPage { line: 2 }) => {}
            other => panic!("expected NoOpenPage, got {other:?}"),
        }
    }

    #[test]
    fn bad_hex_is_an_error() {
        let mut table = UsageTable::new();
        match table.load_str("(1)\tGeneric Desktop\n3g\tX\n") {
            Err(TableError::InvalidNumber { line: 2, .. }) => {}
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }
}
