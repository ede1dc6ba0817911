// SPDX-License-Identifier: MIT

//! Plain-text rendering of a [DescriptorTree].
//!
//! The output is an indented tree: collection lines, report headers and
//! one line per field, with logical and physical ranges annotated behind
//! a `#` column where they carry information.

use std::fmt;

use crate::names::UsageTable;
use crate::units;
use crate::{CollectionId, DescriptorTree, Field, Report};

/// Field lines pad to this width before the ` # ` range annotation.
const DESCRIPTION_WIDTH: usize = 50;

/// A [fmt::Display] adapter pairing a tree with the usage-name table it
/// renders with. Created through [DescriptorTree::display].
pub struct TreeDisplay<'a> {
    tree: &'a DescriptorTree,
    names: &'a UsageTable,
}

impl<'a> TreeDisplay<'a> {
    pub(crate) fn new(tree: &'a DescriptorTree, names: &'a UsageTable) -> TreeDisplay<'a> {
        TreeDisplay { tree, names }
    }

    /// One collection header. The usage label may be empty, the
    /// separating space stays either way.
    fn collection_line(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: CollectionId,
        indent: usize,
    ) -> fmt::Result {
        let collection = self.tree.collection(id);
        let label = self.names.label(collection.usage()).unwrap_or_default();
        writeln!(
            f,
            "{}{} {}",
            "  ".repeat(indent),
            collection.kind(),
            label
        )
    }

    /// A collection with everything below it. Collections without any
    /// report in their subtree produce no output at all.
    fn collection(&self, f: &mut fmt::Formatter<'_>, id: CollectionId, indent: usize) -> fmt::Result {
        if !self.tree.has_reports(id) {
            return Ok(());
        }
        self.collection_line(f, id, indent)?;
        let collection = self.tree.collection(id);
        for child in collection.children() {
            self.collection(f, *child, indent + 1)?;
        }
        for report in collection.reports() {
            self.report(f, report, indent + 1)?;
        }
        Ok(())
    }

    fn report(&self, f: &mut fmt::Formatter<'_>, report: &Report, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match report.id {
            Some(id) => writeln!(f, "{pad}{} 0x{:02x}", report.kind, u32::from(id))?,
            None => writeln!(f, "{pad}{}", report.kind)?,
        }

        // fields carry their collection path below the report's own
        // collection; each path entry is printed once, when entered
        let mut shown: Vec<CollectionId> = vec![];
        for field in &report.fields {
            let keep = shown
                .iter()
                .zip(&field.path)
                .take_while(|(a, b)| a == b)
                .count();
            shown.truncate(keep);
            for &entered in &field.path[shown.len()..] {
                self.collection_line(f, entered, indent + 1 + shown.len())?;
                shown.push(entered);
            }
            self.field(f, field, indent + 1 + shown.len())?;
        }
        Ok(())
    }

    fn field(&self, f: &mut fmt::Formatter<'_>, field: &Field, indent: usize) -> fmt::Result {
        let state = &field.state;
        // the state machine rejects Main items without a report size
        let size = state.report_size.map_or(0, usize::from);
        let sign = if state.logical_minimum.map_or(0, i32::from) >= 0 {
            'u'
        } else {
            'i'
        };

        let mut line = format!("{}{}{}", "  ".repeat(indent), sign, size);
        if field.count != 1 {
            line.push_str(&format!("[{}]", field.count));
        }
        line.push(' ');
        let label = self.names.label(field.usage);
        match &label {
            Some(label) => line.push_str(label),
            None => line.push_str("padding"),
        }

        if let (Some(_), Some(minimum), Some(maximum)) =
            (&label, state.logical_minimum, state.logical_maximum)
        {
            let minimum = i64::from(i32::from(minimum));
            let maximum = i64::from(i32::from(maximum));
            if minimum != maximum {
                // the full unsigned range of the field width carries no
                // information
                let range = (minimum != 0 || size >= 63 || maximum != (1i64 << size) - 1)
                    .then(|| format!("{minimum} to {maximum}"));
                let physical = match (state.unit, state.physical_maximum) {
                    (Some(unit), Some(physical_maximum)) if u32::from(unit) != 0 => {
                        let multiplier = units::multiplier(state.unit_exponent);
                        let low = f64::from(state.physical_minimum.map_or(0, i32::from));
                        let high = f64::from(i32::from(physical_maximum));
                        Some(format!(
                            "{} to {} {}",
                            units::format_float(low * multiplier),
                            units::format_float(high * multiplier),
                            units::label(unit)
                        ))
                    }
                    _ => None,
                };
                if range.is_some() || physical.is_some() {
                    line = format!("{line:<DESCRIPTION_WIDTH$} # ");
                    if let Some(range) = &range {
                        line.push_str(range);
                    }
                    if let Some(physical) = &physical {
                        if range.is_some() {
                            line.push_str(" = ");
                        }
                        line.push_str(physical);
                    }
                }
            }
        }
        writeln!(f, "{line}")
    }
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.collection(f, self.tree.root(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(bytes: &[u8]) -> String {
        let tree = DescriptorTree::try_from(bytes).unwrap();
        tree.display(&UsageTable::new()).to_string()
    }

    #[test]
    fn empty_descriptor_renders_nothing() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn descriptor_without_reports_renders_nothing() {
        #[rustfmt::skip]
        let bytes = [
            0x05, 0x01,         // Usage Page (Generic Desktop)
            0x09, 0x02,         // Usage (Mouse)
            0xa1, 0x01,         // Collection (Application)
            0xc0,               // End Collection
        ];
        assert_eq!(render(&bytes), "");
    }

    #[test]
    fn collections_without_reports_are_hidden() {
        #[rustfmt::skip]
        let bytes = [
            0x05, 0x01,         // Usage Page (Generic Desktop)
            0x09, 0x02,         // Usage (Mouse)
            0xa1, 0x01,         // Collection (Application)
            0xc0,               // End Collection
            0x09, 0x04,         // Usage (Joystick)
            0xa1, 0x01,         // Collection (Application)
            0x09, 0x30,         //   Usage (X)
            0x15, 0x00,         //   Logical Minimum (0)
            0x26, 0xff, 0x00,   //   Logical Maximum (255)
            0x75, 0x08,         //   Report Size (8)
            0x95, 0x01,         //   Report Count (1)
            0x81, 0x02,         //   Input
            0xc0,               // End Collection
        ];
        let text = render(&bytes);
        let expected = concat!(
            "Descriptor \n",
            "  Application 01:04 = ?: ?\n",
            "    Input\n",
            "      u8 01:30 = ?: ?\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn report_id_shows_in_the_header() {
        #[rustfmt::skip]
        let bytes = [
            0x05, 0x01,         // Usage Page (Generic Desktop)
            0x09, 0x30,         // Usage (X)
            0x15, 0x00,         // Logical Minimum (0)
            0x25, 0x01,         // Logical Maximum (1)
            0x75, 0x01,         // Report Size (1)
            0x95, 0x01,         // Report Count (1)
            0x85, 0x05,         // Report ID (5)
            0x81, 0x02,         // Input
        ];
        let text = render(&bytes);
        assert!(text.contains("\n  Input 0x05\n"), "got: {text}");
    }

    #[test]
    fn signed_field_with_count_and_range() {
        #[rustfmt::skip]
        let bytes = [
            0x05, 0x01,         // Usage Page (Generic Desktop)
            0x09, 0x30,         // Usage (X)
            0x15, 0x81,         // Logical Minimum (-127)
            0x25, 0x7f,         // Logical Maximum (127)
            0x75, 0x08,         // Report Size (8)
            0x95, 0x02,         // Report Count (2)
            0x81, 0x02,         // Input
        ];
        let text = render(&bytes);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[2].starts_with("    i8[2] 01:30 = ?: ?"));
        assert!(lines[2].ends_with("# -127 to 127"));
        assert_eq!(lines[2].find('#'), Some(DESCRIPTION_WIDTH + 1));
    }

    #[test]
    fn full_width_range_is_not_annotated() {
        #[rustfmt::skip]
        let bytes = [
            0x05, 0x01,         // Usage Page (Generic Desktop)
            0x09, 0x30,         // Usage (X)
            0x15, 0x00,         // Logical Minimum (0)
            0x26, 0xff, 0x00,   // Logical Maximum (255)
            0x75, 0x08,         // Report Size (8)
            0x95, 0x01,         // Report Count (1)
            0x81, 0x02,         // Input
        ];
        let text = render(&bytes);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[2], "    u8 01:30 = ?: ?");
    }

    #[test]
    fn padding_fields_have_no_annotation() {
        #[rustfmt::skip]
        let bytes = [
            0x05, 0x01,         // Usage Page (Generic Desktop)
            0x15, 0x00,         // Logical Minimum (0)
            0x25, 0x07,         // Logical Maximum (7)
            0x75, 0x02,         // Report Size (2)
            0x95, 0x03,         // Report Count (3)
            0x81, 0x01,         // Input (Const)
        ];
        let text = render(&bytes);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "  Input");
        assert_eq!(lines[2], "    u2[3] padding");
    }

    #[test]
    fn physical_range_without_logical_range() {
        #[rustfmt::skip]
        let bytes = [
            0x05, 0x01,         // Usage Page (Generic Desktop)
            0x09, 0x39,         // Usage (Hat Switch)
            0x15, 0x00,         // Logical Minimum (0)
            0x25, 0x07,         // Logical Maximum (7)
            0x35, 0x00,         // Physical Minimum (0)
            0x46, 0x10, 0x0e,   // Physical Maximum (3600)
            0x55, 0x0f,         // Unit Exponent (-1)
            0x66, 0x14, 0x00,   // Unit (English Rotation: degrees)
            0x75, 0x03,         // Report Size (3)
            0x95, 0x01,         // Report Count (1)
            0x81, 0x42,         // Input (Data,Var,Abs,Null)
        ];
        let text = render(&bytes);
        let lines: Vec<&str> = text.lines().collect();
        // 0..7 fills the three bits, so only the physical range prints
        assert!(lines[2].starts_with("    u3 01:39 = ?: ?"));
        assert!(lines[2].ends_with("# 0 to 360 deg"), "got: {}", lines[2]);
        assert_eq!(lines[2].find('#'), Some(DESCRIPTION_WIDTH + 1));
    }

    #[test]
    fn dimensionless_unit_leaves_trailing_space() {
        #[rustfmt::skip]
        let bytes = [
            0x05, 0x01,         // Usage Page (Generic Desktop)
            0x09, 0x30,         // Usage (X)
            0x15, 0x00,         // Logical Minimum (0)
            0x25, 0x05,         // Logical Maximum (5)
            0x35, 0x00,         // Physical Minimum (0)
            0x45, 0x05,         // Physical Maximum (5)
            0x65, 0x01,         // Unit (SI Linear, no dimensions)
            0x75, 0x08,         // Report Size (8)
            0x95, 0x01,         // Report Count (1)
            0x81, 0x02,         // Input
        ];
        let text = render(&bytes);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[2].ends_with("# 0 to 5 = 0 to 5 "), "got: {}", lines[2]);
    }

    #[test]
    fn field_paths_reopen_collections_between_fields() {
        #[rustfmt::skip]
        let bytes = [
            0x05, 0x01,         // Usage Page (Generic Desktop)
            0x09, 0x01,         // Usage (Pointer)
            0xa1, 0x01,         // Collection (Application)
            0xa1, 0x00,         //   Collection (Physical)
            0x09, 0x30,         //     Usage (X)
            0x15, 0x00,         //     Logical Minimum (0)
            0x25, 0x01,         //     Logical Maximum (1)
            0x75, 0x01,         //     Report Size (1)
            0x95, 0x01,         //     Report Count (1)
            0x81, 0x02,         //     Input
            0xc0,               //   End Collection
            0xa1, 0x00,         //   Collection (Physical)
            0x09, 0x31,         //     Usage (Y)
            0x81, 0x02,         //     Input
            0xc0,               //   End Collection
            0xc0,               // End Collection
        ];
        let text = render(&bytes);
        let expected = concat!(
            "Descriptor \n",
            "  Application 01:01 = ?: ?\n",
            "    Input\n",
            "      Physical \n",
            "        u1 01:30 = ?: ?\n",
            "      Physical \n",
            "        u1 01:31 = ?: ?\n",
        );
        assert_eq!(text, expected);
    }
}
