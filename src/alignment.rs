//! Text alignment lookup tables.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignSide {
    Top,
    Left,
    Right,
    Bottom,
    Justify,
    Center,
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

const CENTER_BY_AXIS: [(Axis, &str); 2] = [
    (Axis::Vertical, "Text.AlignVCenter"),
    (Axis::Horizontal, "Text.AlignHCenter"),
];

// QML has no baseline text alignment; bottom is the closest constant.
const BY_SIDE: [(AlignSide, &str); 6] = [
    (AlignSide::Top, "Text.AlignTop"),
    (AlignSide::Left, "Text.AlignLeft"),
    (AlignSide::Right, "Text.AlignRight"),
    (AlignSide::Bottom, "Text.AlignBottom"),
    (AlignSide::Justify, "Text.AlignJustify"),
    (AlignSide::Baseline, "Text.AlignBottom"),
];

/// Map an alignment side to its QML constant for the given axis.
pub fn resolve_alignment(side: AlignSide, axis: Axis) -> &'static str {
    if side == AlignSide::Center {
        return lookup(&CENTER_BY_AXIS, axis);
    }
    lookup(&BY_SIDE, side)
}

fn lookup<K: PartialEq + Copy>(table: &[(K, &'static str)], key: K) -> &'static str {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_depends_on_axis() {
        let v = resolve_alignment(AlignSide::Center, Axis::Vertical);
        let h = resolve_alignment(AlignSide::Center, Axis::Horizontal);
        assert_eq!(v, "Text.AlignVCenter");
        assert_eq!(h, "Text.AlignHCenter");
        assert_ne!(v, h);
    }

    #[test]
    fn other_sides_ignore_axis() {
        for side in [
            AlignSide::Top,
            AlignSide::Left,
            AlignSide::Right,
            AlignSide::Bottom,
            AlignSide::Justify,
            AlignSide::Baseline,
        ] {
            let v = resolve_alignment(side, Axis::Vertical);
            let h = resolve_alignment(side, Axis::Horizontal);
            assert_eq!(v, h, "{side:?} should map the same on both axes");
            assert!(v.starts_with("Text.Align"));
        }
        assert_eq!(resolve_alignment(AlignSide::Top, Axis::Vertical), "Text.AlignTop");
        assert_eq!(
            resolve_alignment(AlignSide::Justify, Axis::Horizontal),
            "Text.AlignJustify"
        );
    }

    #[test]
    fn sides_deserialize_from_lowercase() {
        let side: AlignSide = serde_json::from_str("\"baseline\"").expect("parse side");
        assert_eq!(side, AlignSide::Baseline);
    }
}
