//! Static color tables
//!
//! All tables are compile-time constants; lookups never allocate.

/// Base hues shared by every palette
pub mod core {
    pub const RED: &str = "#FF0000";
    pub const ORANGE: &str = "#FFA500";
    pub const YELLOW: &str = "#FFD700";
    pub const GREEN: &str = "#00FF00";
    pub const CYAN: &str = "#00FFFF";
    pub const BLUE: &str = "#0000FF";
    pub const PURPLE: &str = "#7700FF";
    pub const MAGENTA: &str = "#FF00FF";

    pub const BLUE_GREEN: &str = "#00FF77";
    pub const YELLOW_GREEN: &str = "#77FF00";
    pub const PINK_RED: &str = "#FF0077";
    pub const MEDIUM_BLUE: &str = "#0077FF";
}

use core::*;

/// Color for derived labels whose base is not in the table
pub const UNKNOWN_COLOR: &str = "#999999";

/// Label → color pairs
pub type Palette = &'static [(&'static str, &'static str)];

/// Note letters, C through B
pub const MUSICAL_NOTES: Palette = &[
    ("C", BLUE),
    ("D", GREEN),
    ("E", YELLOW),
    ("F", ORANGE),
    ("G", RED),
    ("A", PURPLE),
    ("B", MAGENTA),
];

/// Six HSV primaries and secondaries
pub const HSV_COLOURS: Palette = &[
    ("Red", RED),
    ("Yellow", YELLOW),
    ("Green", GREEN),
    ("Cyan", CYAN),
    ("Blue", BLUE),
    ("Magenta", MAGENTA),
];

/// Eight RGB colour names
pub const RGB_COLOURS: Palette = &[
    ("Red", RED),
    ("Orange", ORANGE),
    ("Yellow", YELLOW),
    ("Green", GREEN),
    ("Cyan", CYAN),
    ("Blue", BLUE),
    ("Magenta", MAGENTA),
    ("Violet", PURPLE),
];

/// Months walk the hue wheel from winter blue to autumn purple; seasons reuse
/// their anchor month's hue.
pub const MONTHS: Palette = &[
    ("Dec", BLUE),
    ("Jan", MEDIUM_BLUE),
    ("Feb", CYAN),
    ("Mar", BLUE_GREEN),
    ("Apr", GREEN),
    ("May", YELLOW_GREEN),
    ("Jun", YELLOW),
    ("Jul", ORANGE),
    ("Aug", RED),
    ("Sep", PINK_RED),
    ("Oct", MAGENTA),
    ("Nov", PURPLE),
    ("Winter", BLUE),
    ("Spring", GREEN),
    ("Summer", YELLOW),
    ("Fall", MAGENTA),
];

pub const WEEKDAYS: Palette = &[
    ("Mon", BLUE),
    ("Tue", CYAN),
    ("Wed", GREEN),
    ("Thu", YELLOW),
    ("Fri", ORANGE),
    ("Sat", RED),
    ("Sun", MAGENTA),
];

/// Prefixes removed from month labels before lookup
pub const MONTH_PREFIXES: &[&str] = &["Early In ", "Late In "];

/// Prefixes removed from weekday labels before lookup
pub const WEEKDAY_PREFIXES: &[&str] = &["Very Early On ", "Very Late On "];

/// Ten-color categorical scheme for kinds without a dedicated palette
pub const CATEGORY10: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Look up a label in a palette
pub fn lookup(palette: Palette, label: &str) -> Option<&'static str> {
    palette
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, color)| *color)
}

/// Remove the earliest occurrence of any of `prefixes` from `label`.
///
/// The match is not anchored: "Mid Early In Mar" loses "Early In " too.
pub fn strip_first_prefix(label: &str, prefixes: &[&str]) -> String {
    let earliest = prefixes
        .iter()
        .filter_map(|p| label.find(p).map(|pos| (pos, p.len())))
        .min_by_key(|(pos, _)| *pos);

    match earliest {
        Some((pos, len)) => format!("{}{}", &label[..pos], &label[pos + len..]),
        None => label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes() {
        assert_eq!(MUSICAL_NOTES.len(), 7);
        assert_eq!(HSV_COLOURS.len(), 6);
        assert_eq!(RGB_COLOURS.len(), 8);
        assert_eq!(MONTHS.len(), 16);
        assert_eq!(WEEKDAYS.len(), 7);
        assert_eq!(CATEGORY10.len(), 10);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(MONTHS, "Mar"), Some(BLUE_GREEN));
        assert_eq!(lookup(RGB_COLOURS, "Violet"), Some(PURPLE));
        assert_eq!(lookup(HSV_COLOURS, "Violet"), None);
    }

    #[test]
    fn test_strip_first_prefix() {
        assert_eq!(strip_first_prefix("Early In Mar", MONTH_PREFIXES), "Mar");
        assert_eq!(strip_first_prefix("Late In Dec", MONTH_PREFIXES), "Dec");
        assert_eq!(strip_first_prefix("Mar", MONTH_PREFIXES), "Mar");
        assert_eq!(
            strip_first_prefix("Very Late On Sun", WEEKDAY_PREFIXES),
            "Sun"
        );
        // Only the first occurrence is removed
        assert_eq!(
            strip_first_prefix("Early In Late In Mar", MONTH_PREFIXES),
            "Late In Mar"
        );
    }
}
