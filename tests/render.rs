// SPDX-License-Identifier: MIT

//! End-to-end rendering tests with a trimmed-down usage table.

use hidtree::names::UsageTable;
use hidtree::DescriptorTree;

const TABLE: &str = "\
(1)\tGeneric Desktop
1\tPointer
2\tMouse
4\tJoystick
30\tX
31\tY
32\tZ
35\tRz
36\tSlider
38\tWheel
39\tHat switch
(9)\tButton
1-e\tButton
";

fn names() -> UsageTable {
    let mut names = UsageTable::new();
    names.load_str(TABLE).unwrap();
    names
}

#[test]
fn renders_a_minimal_mouse() {
    #[rustfmt::skip]
    let bytes = [
        0x05, 0x01,         // Usage Page (Generic Desktop)
        0x09, 0x02,         // Usage (Mouse)
        0xa1, 0x01,         // Collection (Application)
        0x09, 0x30,         //   Usage (X)
        0x15, 0x00,         //   Logical Minimum (0)
        0x26, 0xff, 0x00,   //   Logical Maximum (255)
        0x75, 0x08,         //   Report Size (8)
        0x95, 0x01,         //   Report Count (1)
        0x81, 0x02,         //   Input (Data,Var,Abs)
        0xc0,               // End Collection
    ];
    let tree = DescriptorTree::try_from(&bytes[..]).unwrap();
    assert!(tree.warnings().is_empty());
    let expected = concat!(
        "Descriptor \n",
        "  Application 01:02 = Generic Desktop: Mouse\n",
        "    Input\n",
        "      u8 01:30 = Generic Desktop: X\n",
    );
    assert_eq!(tree.display(&names()).to_string(), expected);
}

#[test]
fn renders_the_joystick_fixture() {
    let bytes = include_bytes!("data/joystick.bin");
    let tree = DescriptorTree::try_from(&bytes[..]).unwrap();
    assert!(tree.warnings().is_empty());
    let names = names();
    let expected = concat!(
        "Descriptor \n",
        "  Application 01:04 = Generic Desktop: Joystick\n",
        "    Physical 01:01 = Generic Desktop: Pointer\n",
        "      Input\n",
        "        u10 01:30 = Generic Desktop: X\n",
        "        u10 01:31 = Generic Desktop: Y\n",
        "        u8 01:35 = Generic Desktop: Rz\n",
        "        u8 01:32 = Generic Desktop: Z\n",
        "        u8 01:36 = Generic Desktop: Slider\n",
        "        u1 09:01 = Button: Button\n",
        "        u1 09:02 = Button: Button\n",
        "        u1 09:03 = Button: Button\n",
        "        u1 09:04 = Button: Button\n",
        "        u1 09:05 = Button: Button\n",
        "        u1 09:06 = Button: Button\n",
        "        u1 09:07 = Button: Button\n",
        "        u1 09:08 = Button: Button\n",
        "        u1 09:09 = Button: Button\n",
        "        u1 09:0a = Button: Button\n",
        "        u1 09:0b = Button: Button\n",
        "        u1 09:0c = Button: Button\n",
        "        u1 09:0d = Button: Button\n",
        "        u1 09:0e = Button: Button\n",
        "        u4 01:39 = Generic Desktop: Hat switch     # 1 to 8 = 0 to 315 deg\n",
        "        u2 padding\n",
    );
    let rendered = tree.display(&names).to_string();
    assert_eq!(rendered, expected);
    // same input, same table, same text
    assert_eq!(tree.display(&names).to_string(), rendered);
}

#[test]
fn renders_the_mouse_fixture() {
    let bytes = include_bytes!("data/mouse.bin");
    let tree = DescriptorTree::try_from(&bytes[..]).unwrap();
    assert!(tree.warnings().is_empty());
    let expected = concat!(
        "Descriptor \n",
        "  Application 01:02 = Generic Desktop: Mouse\n",
        "    Physical 01:01 = Generic Desktop: Pointer\n",
        "      Input\n",
        "        u1 09:01 = Button: Button\n",
        "        u1 09:02 = Button: Button\n",
        "        u1 09:03 = Button: Button\n",
        "        u5 padding\n",
        "        i8 01:30 = Generic Desktop: X              # -127 to 127\n",
        "        i8 01:31 = Generic Desktop: Y              # -127 to 127\n",
        "        i8 01:38 = Generic Desktop: Wheel          # -127 to 127\n",
    );
    assert_eq!(tree.display(&names()).to_string(), expected);
}
