// SPDX-License-Identifier: MIT

//! A wrapper around the HID Core items. This module handles splitting a
//! report descriptor byte stream into its individual tagged items.
//! Interpretation of the resulting [Item]s is left to the caller, usually
//! via [DescriptorTree](crate::DescriptorTree).
//!
//! Unless stated otherwise, a reference to "Section a.b.c" refers to the
//! [HID Device Class Definition for HID 1.11](https://www.usb.org/document-library/device-class-definition-hid-111).
//!
//! # Itemizing HID Report Descriptors
//!
//! Entry point is usually [`Items::try_from(bytes)`](Items::try_from):
//!
//! ```
//! # use crate::hidtree::hid::*;
//! # fn itemize(bytes: &[u8]) {
//! let items = Items::try_from(bytes).unwrap();
//! for item in items.iter() {
//!     println!(
//!         "{} item at offset {:02x}, value {:#x}",
//!         item.tag(),
//!         item.offset(),
//!         u32::from(item.value())
//!     );
//! }
//! # }
//! ```

use crate::{ensure, ParseError};

/// The category of a short item, encoded in bits 2 and 3 of the prefix
/// byte, see Section 6.2.2.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCategory {
    Main,
    Global,
    Local,
}

/// The tag of a short item, identified by the prefix byte with the size
/// bits masked off. See Section 6.2.2.4 (Main), 6.2.2.7 (Global) and
/// 6.2.2.8 (Local) for the individual tags.
///
/// Every tag the HID specification defines is listed here, including the
/// string, designator and delimiter tags that the interpreter later
/// rejects as unsupported. A prefix byte outside this list does not
/// itemize at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemTag {
    // Main items
    Input,
    Output,
    Feature,
    Collection,
    EndCollection,
    // Global items
    UsagePage,
    LogicalMinimum,
    LogicalMaximum,
    PhysicalMinimum,
    PhysicalMaximum,
    UnitExponent,
    Unit,
    ReportSize,
    ReportId,
    ReportCount,
    Push,
    Pop,
    // Local items
    Usage,
    UsageMinimum,
    UsageMaximum,
    DesignatorIndex,
    DesignatorMinimum,
    DesignatorMaximum,
    StringIndex,
    StringMinimum,
    StringMaximum,
    Delimiter,
}

impl ItemTag {
    /// Look up the tag for a prefix byte. Returns `None` for prefixes the
    /// HID specification leaves undefined, which includes the long item
    /// prefix `0xfe`.
    fn from_prefix(prefix: u8) -> Option<ItemTag> {
        match prefix & !0b11 {
            0b10000000 => Some(ItemTag::Input),
            0b10010000 => Some(ItemTag::Output),
            0b10110000 => Some(ItemTag::Feature),
            0b10100000 => Some(ItemTag::Collection),
            0b11000000 => Some(ItemTag::EndCollection),
            0b00000100 => Some(ItemTag::UsagePage),
            0b00010100 => Some(ItemTag::LogicalMinimum),
            0b00100100 => Some(ItemTag::LogicalMaximum),
            0b00110100 => Some(ItemTag::PhysicalMinimum),
            0b01000100 => Some(ItemTag::PhysicalMaximum),
            0b01010100 => Some(ItemTag::UnitExponent),
            0b01100100 => Some(ItemTag::Unit),
            0b01110100 => Some(ItemTag::ReportSize),
            0b10000100 => Some(ItemTag::ReportId),
            0b10010100 => Some(ItemTag::ReportCount),
            0b10100100 => Some(ItemTag::Push),
            0b10110100 => Some(ItemTag::Pop),
            0b00001000 => Some(ItemTag::Usage),
            0b00011000 => Some(ItemTag::UsageMinimum),
            0b00101000 => Some(ItemTag::UsageMaximum),
            0b00111000 => Some(ItemTag::DesignatorIndex),
            0b01001000 => Some(ItemTag::DesignatorMinimum),
            0b01011000 => Some(ItemTag::DesignatorMaximum),
            0b01111000 => Some(ItemTag::StringIndex),
            0b10001000 => Some(ItemTag::StringMinimum),
            0b10011000 => Some(ItemTag::StringMaximum),
            0b10101000 => Some(ItemTag::Delimiter),
            _ => None,
        }
    }

    pub fn category(&self) -> ItemCategory {
        match self {
            ItemTag::Input
            | ItemTag::Output
            | ItemTag::Feature
            | ItemTag::Collection
            | ItemTag::EndCollection => ItemCategory::Main,
            ItemTag::UsagePage
            | ItemTag::LogicalMinimum
            | ItemTag::LogicalMaximum
            | ItemTag::PhysicalMinimum
            | ItemTag::PhysicalMaximum
            | ItemTag::UnitExponent
            | ItemTag::Unit
            | ItemTag::ReportSize
            | ItemTag::ReportId
            | ItemTag::ReportCount
            | ItemTag::Push
            | ItemTag::Pop => ItemCategory::Global,
            ItemTag::Usage
            | ItemTag::UsageMinimum
            | ItemTag::UsageMaximum
            | ItemTag::DesignatorIndex
            | ItemTag::DesignatorMinimum
            | ItemTag::DesignatorMaximum
            | ItemTag::StringIndex
            | ItemTag::StringMinimum
            | ItemTag::StringMaximum
            | ItemTag::Delimiter => ItemCategory::Local,
        }
    }
}

impl std::fmt::Display for ItemTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ItemTag::Input => "Input",
            ItemTag::Output => "Output",
            ItemTag::Feature => "Feature",
            ItemTag::Collection => "Collection",
            ItemTag::EndCollection => "End Collection",
            ItemTag::UsagePage => "Usage Page",
            ItemTag::LogicalMinimum => "Logical Minimum",
            ItemTag::LogicalMaximum => "Logical Maximum",
            ItemTag::PhysicalMinimum => "Physical Minimum",
            ItemTag::PhysicalMaximum => "Physical Maximum",
            ItemTag::UnitExponent => "Unit Exponent",
            ItemTag::Unit => "Unit",
            ItemTag::ReportSize => "Report Size",
            ItemTag::ReportId => "Report ID",
            ItemTag::ReportCount => "Report Count",
            ItemTag::Push => "Push",
            ItemTag::Pop => "Pop",
            ItemTag::Usage => "Usage",
            ItemTag::UsageMinimum => "Usage Minimum",
            ItemTag::UsageMaximum => "Usage Maximum",
            ItemTag::DesignatorIndex => "Designator Index",
            ItemTag::DesignatorMinimum => "Designator Minimum",
            ItemTag::DesignatorMaximum => "Designator Maximum",
            ItemTag::StringIndex => "String Index",
            ItemTag::StringMinimum => "String Minimum",
            ItemTag::StringMaximum => "String Maximum",
            ItemTag::Delimiter => "Delimiter",
        };
        f.write_str(name)
    }
}

/// Represents one value extracted from a set of (LE) data bytes. Items
/// without data bytes read as value 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidValue {
    value: u32,
    nbytes: usize,
}

impl HidValue {
    /// Reads a little-endian value from item data bytes. The item size
    /// encoding only permits lengths 0, 1, 2 and 4.
    fn read(bytes: &[u8]) -> HidValue {
        let value = bytes
            .iter()
            .rev()
            .fold(0u32, |value, byte| (value << 8) | u32::from(*byte));
        HidValue {
            value,
            nbytes: bytes.len(),
        }
    }

    /// The length of the value in bytes, required to determine whether the
    /// value may be signed and whether a usage carries its own page.
    pub fn len(&self) -> usize {
        self.nbytes
    }

    pub fn is_empty(&self) -> bool {
        self.nbytes == 0
    }
}

impl From<&HidValue> for usize {
    fn from(v: &HidValue) -> usize {
        v.value as usize
    }
}

impl From<HidValue> for usize {
    fn from(v: HidValue) -> usize {
        usize::from(&v)
    }
}

impl From<&HidValue> for u32 {
    fn from(v: &HidValue) -> u32 {
        v.value
    }
}

impl From<HidValue> for u32 {
    fn from(v: HidValue) -> u32 {
        u32::from(&v)
    }
}

impl From<&HidValue> for u16 {
    fn from(v: &HidValue) -> u16 {
        (v.value & 0xFFFF) as u16
    }
}

impl From<HidValue> for u16 {
    fn from(v: HidValue) -> u16 {
        u16::from(&v)
    }
}

impl From<&HidValue> for i32 {
    /// Sign-extends by the declared length of the value. This is how
    /// Logical and Physical Minimum/Maximum become negative.
    fn from(v: &HidValue) -> i32 {
        match v.nbytes {
            1 => ((v.value & 0xFF) as i8) as i32,
            2 => ((v.value & 0xFFFF) as i16) as i32,
            // zero-length values read as 0 and need no extension
            _ => v.value as i32,
        }
    }
}

impl From<HidValue> for i32 {
    fn from(v: HidValue) -> i32 {
        i32::from(&v)
    }
}

/// A single short item extracted from a report descriptor, together with
/// the byte offset it was found at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    offset: usize,
    tag: ItemTag,
    value: HidValue,
}

impl Item {
    /// The offset of this item in the byte stream it was extracted from.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn tag(&self) -> ItemTag {
        self.tag
    }

    /// The data value of this item.
    pub fn value(&self) -> &HidValue {
        &self.value
    }
}

/// The set of items extracted from a report descriptor byte stream, in
/// stream order. This is the result of splitting the descriptor without
/// *interpreting* it and thus generally only useful to analyze the
/// components of the report descriptor.
#[derive(Debug)]
pub struct Items {
    items: Vec<Item>,
}

impl std::ops::Deref for Items {
    type Target = [Item];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl TryFrom<&[u8]> for Items {
    type Error = ParseError;

    /// Attempts to itemize the given HID report descriptor into its set
    /// of [Item]s.
    fn try_from(bytes: &[u8]) -> crate::Result<Self> {
        itemize(bytes)
    }
}

/// Split the HID Report Descriptor represented by bytes into its set of
/// items.
pub(crate) fn itemize(bytes: &[u8]) -> crate::Result<Items> {
    // Payload length from the size bits of the prefix byte, Section 6.2.2.2.
    const SIZES: [usize; 4] = [0, 1, 2, 4];

    let mut offset = 0;
    let mut items: Vec<Item> = Vec::new();
    while offset < bytes.len() {
        let prefix = bytes[offset];
        let tag = ItemTag::from_prefix(prefix)
            .ok_or(ParseError::UnknownItemTag { offset, prefix })?;
        let expected = SIZES[usize::from(prefix & 0b11)];
        let data = &bytes[offset + 1..];
        ensure!(
            data.len() >= expected,
            ParseError::Truncated {
                offset,
                expected,
                available: data.len(),
            }
        );
        items.push(Item {
            offset,
            tag,
            value: HidValue::read(&data[..expected]),
        });
        offset += 1 + expected;
    }
    Ok(Items { items })
}
