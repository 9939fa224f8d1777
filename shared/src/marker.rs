use crate::coords::Coordinates;

const LABEL_ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Colors accepted by the Static Maps `markers` parameter.
pub const MARKER_PALETTE: [&str; 8] = [
    "red", "blue", "green", "purple", "orange", "yellow", "gray", "brown",
];

pub const DEFAULT_MARKER_COLOR: &str = "red";

/// Label for the place at `index` in the *input* order. Indices are never
/// re-packed after failures, so a failed place leaves a gap in the letter
/// sequence and later places keep the label tied to their own index.
/// Wraps around after Z (no AA-style numbering).
pub fn label_for_index(index: usize) -> char {
    LABEL_ALPHABET[index % LABEL_ALPHABET.len()] as char
}

pub fn color_for_index(index: usize, colored: bool) -> &'static str {
    if colored {
        MARKER_PALETTE[index % MARKER_PALETTE.len()]
    } else {
        DEFAULT_MARKER_COLOR
    }
}

/// One `markers=` parameter of a static map request.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Coordinates,
    pub color: &'static str,
    pub label: char,
}

impl Marker {
    /// `color:<c>|label:<L>|<lat>,<lng>`, the wire form before URL encoding.
    pub fn to_param(&self) -> String {
        format!(
            "color:{}|label:{}|{}",
            self.color,
            self.label,
            self.position.to_param()
        )
    }
}
