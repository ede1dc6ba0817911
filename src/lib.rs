// SPDX-License-Identifier: MIT

//! A decoder for USB HID Report Descriptors.
//!
//! The descriptor byte stream is split into items (see [hid]), interpreted
//! with the HID global/local state model, and arranged into a tree of
//! collections owning reports, ready to be rendered as indented text:
//!
//! ```
//! # use hidtree::{names::UsageTable, DescriptorTree};
//! # fn decode(bytes: &[u8]) {
//! let mut names = UsageTable::new();
//! names
//!     .load_str("(1)\tGeneric Desktop\n30\tX\n")
//!     .unwrap();
//! let tree = DescriptorTree::try_from(bytes).unwrap();
//! for warning in tree.warnings() {
//!     eprintln!("WARNING: {warning}");
//! }
//! print!("{}", tree.display(&names));
//! # }
//! ```
//!
//! Unless stated otherwise, a reference to "Section a.b.c" refers to the
//! [HID Device Class Definition for HID 1.11](https://www.usb.org/document-library/device-class-definition-hid-111).

use std::collections::BTreeMap;

use thiserror::Error;

pub mod hid;
pub mod names;
pub mod render;
pub mod types;
pub mod units;

use hid::{Item, ItemTag, Items};
use names::UsageTable;
use render::TreeDisplay;
pub use types::*;

/// Returns the given error from the enclosing function unless the
/// condition holds.
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}
pub(crate) use ensure;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unknown item tag {prefix:#04x} at offset {offset}")]
    UnknownItemTag { offset: usize, prefix: u8 },
    #[error("item at offset {offset} declares {expected} data bytes but only {available} remain")]
    Truncated {
        offset: usize,
        expected: usize,
        available: usize,
    },
    #[error("unsupported {tag} item at offset {offset}")]
    UnsupportedItem { offset: usize, tag: ItemTag },
    #[error("Pop without a matching Push at offset {offset}")]
    EmptyScopeStack { offset: usize },
    #[error("{tag} item at offset {offset} without a preceding Report Count")]
    MissingReportCount { offset: usize, tag: ItemTag },
    #[error("{tag} item at offset {offset} without a preceding Report Size")]
    MissingReportSize { offset: usize, tag: ItemTag },
    #[error("Usage Maximum at offset {offset} without a preceding Usage Minimum")]
    MissingUsageMinimum { offset: usize },
    #[error("End Collection at offset {offset} without an open collection")]
    UnexpectedEndCollection { offset: usize },
    #[error("descriptor ends with {open} unclosed collection(s)")]
    UnclosedCollections { open: usize },
}

type Result<T> = std::result::Result<T, ParseError>;

/// A non-fatal oddity found while interpreting the descriptor. The only
/// one currently detected: a Main item declaring more usages than its
/// Report Count has room for, see Section 6.2.2.8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Offset of the Main item that could not consume all queued usages.
    pub offset: usize,
    /// The usages that were left over, in declaration order.
    pub unused: Vec<Usage>,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unused = self
            .unused
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "Main item at offset {} has more usages than its Report Count, unused: {}",
            self.offset, unused
        )
    }
}

/// Whether a report moves device-to-host, host-to-device, or either way
/// on request. The derived order is the presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportKind {
    Input,
    Output,
    Feature,
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReportKind::Input => "Input",
            ReportKind::Output => "Output",
            ReportKind::Feature => "Feature",
        })
    }
}

/// The collection types of Section 6.2.2.6, plus the synthetic root that
/// every descriptor tree hangs off. Codes outside the defined
/// `0x00..=0x06` render numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Root,
    Physical,
    Application,
    Logical,
    Report,
    NamedArray,
    UsageSwitch,
    UsageModifier,
    Other(u32),
}

impl From<u32> for CollectionKind {
    fn from(code: u32) -> CollectionKind {
        match code {
            0x00 => CollectionKind::Physical,
            0x01 => CollectionKind::Application,
            0x02 => CollectionKind::Logical,
            0x03 => CollectionKind::Report,
            0x04 => CollectionKind::NamedArray,
            0x05 => CollectionKind::UsageSwitch,
            0x06 => CollectionKind::UsageModifier,
            other => CollectionKind::Other(other),
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionKind::Root => f.write_str("Descriptor"),
            CollectionKind::Physical => f.write_str("Physical"),
            CollectionKind::Application => f.write_str("Application"),
            CollectionKind::Logical => f.write_str("Logical"),
            CollectionKind::Report => f.write_str("Report"),
            CollectionKind::NamedArray => f.write_str("Named Array"),
            CollectionKind::UsageSwitch => f.write_str("Usage Switch"),
            CollectionKind::UsageModifier => f.write_str("Usage Modifier"),
            CollectionKind::Other(code) => write!(f, "{code:#x}"),
        }
    }
}

/// Index of a [Collection] within the [DescriptorTree] that produced it.
/// Two collections are the same collection exactly when their ids are
/// equal; nested collections with identical kind and usage stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionId(usize);

/// One collection of the descriptor tree.
#[derive(Debug)]
pub struct Collection {
    kind: CollectionKind,
    usage: Usage,
    children: Vec<CollectionId>,
    reports: Vec<Report>,
}

impl Collection {
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// The collection's usage, zero when the descriptor declared none.
    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Child collections in declaration order.
    pub fn children(&self) -> &[CollectionId] {
        &self.children
    }

    /// The reports attached to this collection, in presentation order:
    /// Input before Output before Feature, report ids ascending with
    /// id-less reports first.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }
}

/// One report. A report accumulates fields across every Main item that
/// names the same (kind, id) pair, wherever in the collection hierarchy
/// those items appear.
#[derive(Debug, PartialEq)]
pub struct Report {
    pub kind: ReportKind,
    pub id: Option<ReportId>,
    pub fields: Vec<Field>,
}

/// One batch of `count` consecutive values sharing a usage and width.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// The usage, zero for padding.
    pub usage: Usage,
    /// How many consecutive values this field covers.
    pub count: usize,
    /// The raw Main item flags (data/constant, array/variable, ...).
    pub flags: u32,
    /// Collection ids from just below the collection the report is
    /// attached to down to the field's immediate parent. Empty when the
    /// field lives directly in the report's own collection.
    pub path: Vec<CollectionId>,
    /// The global state frozen when the field was declared. The unit is
    /// already cleared unless it was set since the previous Main item.
    pub state: Globals,
}

/// The global item state, Section 6.2.2.7. `Push` and `Pop` copy the
/// whole record; every emitted [Field] freezes a copy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Globals {
    pub usage_page: Option<UsagePage>,
    pub logical_minimum: Option<LogicalMinimum>,
    pub logical_maximum: Option<LogicalMaximum>,
    pub physical_minimum: Option<PhysicalMinimum>,
    pub physical_maximum: Option<PhysicalMaximum>,
    pub unit_exponent: Option<UnitExponent>,
    pub unit: Option<Unit>,
    pub report_size: Option<ReportSize>,
    pub report_id: Option<ReportId>,
    pub report_count: Option<ReportCount>,
}

/// A decoded report descriptor: collections arranged in a tree, each
/// owning the reports whose fields live underneath it.
#[derive(Debug)]
pub struct DescriptorTree {
    collections: Vec<Collection>,
    warnings: Vec<Warning>,
}

impl DescriptorTree {
    /// The synthetic root. It is not a collection of the descriptor
    /// itself; its children are the descriptor's top-level collections.
    pub fn root(&self) -> CollectionId {
        CollectionId(0)
    }

    /// Looks up a collection. Ids are only meaningful for the tree that
    /// produced them.
    pub fn collection(&self, id: CollectionId) -> &Collection {
        &self.collections[id.0]
    }

    /// Diagnostics collected while interpreting the descriptor, in
    /// stream order.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// A [std::fmt::Display] adapter that renders the tree as indented
    /// text, resolving names through `names`.
    pub fn display<'a>(&'a self, names: &'a UsageTable) -> TreeDisplay<'a> {
        TreeDisplay::new(self, names)
    }

    /// Whether this collection or any of its descendants owns a report.
    /// Collections that do not are skipped by the renderer.
    pub fn has_reports(&self, id: CollectionId) -> bool {
        let collection = self.collection(id);
        !collection.reports.is_empty()
            || collection
                .children
                .iter()
                .any(|child| self.has_reports(*child))
    }
}

impl TryFrom<&[u8]> for DescriptorTree {
    type Error = ParseError;

    fn try_from(bytes: &[u8]) -> Result<DescriptorTree> {
        parse_report_descriptor(bytes)
    }
}

/// Interpreter state for one pass over the item stream.
struct Parser {
    globals: Globals,
    /// Push/Pop scope stack of global state copies.
    stack: Vec<Globals>,
    /// Usages queued by local items since the last Main or Collection
    /// item.
    usages: Vec<Usage>,
    /// Pending Usage Minimum. Deliberately not cleared at Main item
    /// boundaries.
    usage_minimum: Option<u32>,
    /// Set when Unit, Unit Exponent or a Physical bound was stored since
    /// the last field-emitting Main item. A snapshot taken while this is
    /// clear has its unit masked out.
    use_unit: bool,
    /// Collection arena; index 0 is the synthetic root.
    collections: Vec<Collection>,
    /// The open collection path, starting at the root. Never empty.
    path: Vec<CollectionId>,
    reports: BTreeMap<(ReportKind, Option<ReportId>), Report>,
    warnings: Vec<Warning>,
}

impl Parser {
    fn new() -> Parser {
        Parser {
            globals: Globals::default(),
            stack: vec![],
            usages: vec![],
            usage_minimum: None,
            use_unit: false,
            collections: vec![Collection {
                kind: CollectionKind::Root,
                usage: Usage(0),
                children: vec![],
                reports: vec![],
            }],
            path: vec![CollectionId(0)],
            reports: BTreeMap::new(),
            warnings: vec![],
        }
    }

    /// The combined 32-bit usage for a Usage/Usage Minimum/Usage Maximum
    /// item: the value as-is when it carries its own page (a four byte
    /// payload), otherwise merged with the current Usage Page.
    fn resolve_usage(&self, item: &Item) -> u32 {
        let value = u32::from(item.value());
        if item.value().len() <= 2 {
            let page = self.globals.usage_page.map_or(0, u16::from);
            (u32::from(page) << 16) | value
        } else {
            value
        }
    }

    fn interpret(&mut self, item: &Item) -> Result<()> {
        let offset = item.offset();
        let value = item.value();
        match item.tag() {
            ItemTag::UsagePage => self.globals.usage_page = Some(UsagePage(value.into())),
            ItemTag::LogicalMinimum => {
                self.globals.logical_minimum = Some(LogicalMinimum(value.into()))
            }
            ItemTag::LogicalMaximum => {
                self.globals.logical_maximum = Some(LogicalMaximum(value.into()))
            }
            ItemTag::PhysicalMinimum => {
                self.globals.physical_minimum = Some(PhysicalMinimum(value.into()));
                self.use_unit = true;
            }
            ItemTag::PhysicalMaximum => {
                self.globals.physical_maximum = Some(PhysicalMaximum(value.into()));
                self.use_unit = true;
            }
            ItemTag::UnitExponent => {
                self.globals.unit_exponent = Some(UnitExponent(value.into()));
                self.use_unit = true;
            }
            ItemTag::Unit => {
                self.globals.unit = Some(Unit(value.into()));
                self.use_unit = true;
            }
            ItemTag::ReportSize => self.globals.report_size = Some(ReportSize(value.into())),
            ItemTag::ReportId => self.globals.report_id = Some(ReportId(value.into())),
            ItemTag::ReportCount => self.globals.report_count = Some(ReportCount(value.into())),
            ItemTag::Push => self.stack.push(self.globals),
            ItemTag::Pop => {
                self.globals = self
                    .stack
                    .pop()
                    .ok_or(ParseError::EmptyScopeStack { offset })?;
            }
            ItemTag::Usage => {
                let usage = Usage(self.resolve_usage(item));
                self.usages.push(usage);
            }
            ItemTag::UsageMinimum => self.usage_minimum = Some(self.resolve_usage(item)),
            ItemTag::UsageMaximum => {
                let minimum = self
                    .usage_minimum
                    .ok_or(ParseError::MissingUsageMinimum { offset })?;
                // an inverted range contributes nothing
                for usage in minimum..=self.resolve_usage(item) {
                    self.usages.push(Usage(usage));
                }
            }
            ItemTag::Collection => self.open_collection(value.into()),
            ItemTag::EndCollection => {
                ensure!(
                    self.path.len() > 1,
                    ParseError::UnexpectedEndCollection { offset }
                );
                self.path.pop();
            }
            ItemTag::Input => self.emit_fields(ReportKind::Input, item)?,
            ItemTag::Output => self.emit_fields(ReportKind::Output, item)?,
            ItemTag::Feature => self.emit_fields(ReportKind::Feature, item)?,
            tag => return Err(ParseError::UnsupportedItem { offset, tag }),
        }
        Ok(())
    }

    fn open_collection(&mut self, code: u32) {
        let usage = self.usages.first().copied().unwrap_or(Usage(0));
        self.usages.clear();
        let id = CollectionId(self.collections.len());
        self.collections.push(Collection {
            kind: CollectionKind::from(code),
            usage,
            children: vec![],
            reports: vec![],
        });
        // the path always holds at least the root
        let parent = self.path.last().copied().unwrap_or(CollectionId(0));
        self.collections[parent.0].children.push(id);
        self.path.push(id);
    }

    fn emit_fields(&mut self, kind: ReportKind, item: &Item) -> Result<()> {
        let offset = item.offset();
        let mut state = self.globals;
        if !self.use_unit {
            // a unit left over from an earlier Main item does not apply
            state.unit = None;
        }
        let count = state.report_count.ok_or(ParseError::MissingReportCount {
            offset,
            tag: item.tag(),
        })?;
        ensure!(
            state.report_size.is_some(),
            ParseError::MissingReportSize {
                offset,
                tag: item.tag(),
            }
        );
        let n = usize::from(count);
        let flags = u32::from(item.value());

        let report = self
            .reports
            .entry((kind, state.report_id))
            .or_insert_with(|| Report {
                kind,
                id: state.report_id,
                fields: vec![],
            });

        if self.usages.is_empty() {
            if n > 0 {
                report.fields.push(Field {
                    usage: Usage(0),
                    count: n,
                    flags,
                    path: self.path.clone(),
                    state,
                });
            }
        } else {
            let consumed = self.usages.len().min(n);
            for (j, usage) in self.usages.iter().take(consumed).copied().enumerate() {
                // the last declared usage absorbs the remaining count
                let count = if j + 1 == self.usages.len() { n - j } else { 1 };
                report.fields.push(Field {
                    usage,
                    count,
                    flags,
                    path: self.path.clone(),
                    state,
                });
            }
            if self.usages.len() > n {
                self.warnings.push(Warning {
                    offset,
                    unused: self.usages[n..].to_vec(),
                });
            }
        }

        self.usages.clear();
        self.use_unit = false;
        Ok(())
    }

    fn finish(mut self) -> Result<DescriptorTree> {
        ensure!(
            self.path.len() == 1,
            ParseError::UnclosedCollections {
                open: self.path.len() - 1,
            }
        );
        // BTreeMap order is the presentation order
        for report in std::mem::take(&mut self.reports).into_values() {
            self.attach(report);
        }
        Ok(DescriptorTree {
            collections: self.collections,
            warnings: self.warnings,
        })
    }

    /// Hangs the report off the deepest collection that every one of its
    /// fields sits under, comparing collections by id, and trims the
    /// field paths to the remainder below that collection.
    fn attach(&mut self, mut report: Report) {
        let mut prefix: Option<Vec<CollectionId>> = None;
        for field in &report.fields {
            match prefix.as_mut() {
                None => prefix = Some(field.path.clone()),
                Some(prefix) => {
                    if field.path.len() < prefix.len() {
                        prefix.truncate(field.path.len());
                    }
                    if let Some(diverged) =
                        prefix.iter().zip(&field.path).position(|(a, b)| a != b)
                    {
                        prefix.truncate(diverged);
                    }
                }
            }
        }
        // every field path starts at the root, so the common prefix of a
        // non-empty field list always retains the root
        let prefix = prefix.unwrap_or_else(|| vec![CollectionId(0)]);
        let anchor = prefix.last().copied().unwrap_or(CollectionId(0));
        for field in &mut report.fields {
            field.path.drain(..prefix.len());
        }
        self.collections[anchor.0].reports.push(report);
    }
}

fn parse_report_descriptor(bytes: &[u8]) -> Result<DescriptorTree> {
    let items = Items::try_from(bytes)?;
    let mut parser = Parser::new();
    for item in items.iter() {
        parser.interpret(item)?;
    }
    parser.finish()
}
