//! Static line data for the Underground network
//!
//! This module contains the fixed table of line codes accepted by TrackerNet
//! and the display names reported back to clients.

use super::Line;

/// Static array of all lines served by TrackerNet
///
/// Codes are the single lower-case letters used in upstream URL paths.
pub static LINES: [Line; 10] = [
    Line {
        code: "b",
        name: "Bakerloo",
    },
    Line {
        code: "c",
        name: "Central",
    },
    Line {
        code: "d",
        name: "District",
    },
    Line {
        code: "h",
        name: "Hammersmith & Circle",
    },
    Line {
        code: "j",
        name: "Jubilee",
    },
    Line {
        code: "m",
        name: "Metropolitan",
    },
    Line {
        code: "n",
        name: "Northern",
    },
    Line {
        code: "p",
        name: "Piccadilly",
    },
    Line {
        code: "v",
        name: "Victoria",
    },
    Line {
        code: "w",
        name: "Waterloo & City",
    },
];

/// Returns a slice of all lines
pub fn all_lines() -> &'static [Line] {
    &LINES
}

/// Finds a line by its code
///
/// # Arguments
/// * `code` - The single-letter line code (e.g., "b")
///
/// # Returns
/// * `Some(&Line)` if a line with the given code exists
/// * `None` if no line matches the code
pub fn get_line_by_code(code: &str) -> Option<&'static Line> {
    LINES.iter().find(|line| line.code == code)
}
