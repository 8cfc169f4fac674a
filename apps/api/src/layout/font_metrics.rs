//! Headless text measurement for bracket layout.
//!
//! Glyph advances come from the standard PDF core-font AFM files, stored in
//! thousandths of an em for ASCII 0x20..=0x7E (index = byte - 32). Characters
//! outside that range fall back to the family's average advance. This is
//! close enough to browser canvas output that boxes sized here fit the
//! rendered names, and it keeps layout independent of any drawing surface.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Measurement contract
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// Sans-serif used by the web bracket.
    Helvetica,
    /// Serif used by the print/PDF export.
    Times,
}

impl FontFamily {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "helvetica" | "sans" | "sans-serif" => Some(FontFamily::Helvetica),
            "times" | "serif" => Some(FontFamily::Times),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: FontFamily,
    pub size_px: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextSize {
    pub width: f32,
    pub height: f32,
}

/// Maps (text, font) to its rendered pixel box.
pub trait TextMetrics: Send + Sync {
    fn measure(&self, text: &str, font: &FontSpec) -> TextSize;
}

// ────────────────────────────────────────────────────────────────────────────
// Static AFM tables
// ────────────────────────────────────────────────────────────────────────────

pub struct GlyphTable {
    advances: [u16; 95],
    /// Fallback advance for non-ASCII characters.
    pub average_advance: u16,
    /// Ascender-to-descender height, also in thousandths of an em.
    pub line_height: u16,
}

impl GlyphTable {
    /// Width of `s` in ems.
    pub fn measure_em(&self, s: &str) -> f32 {
        let units: u32 = s
            .chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    u32::from(self.advances[code - 32])
                } else {
                    u32::from(self.average_advance)
                }
            })
            .sum();
        units as f32 / 1000.0
    }
}

#[rustfmt::skip]
static HELVETICA: GlyphTable = GlyphTable {
    advances: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A-M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N-Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a-m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n-z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    average_advance: 536,
    line_height: 1150,
};

#[rustfmt::skip]
static TIMES: GlyphTable = GlyphTable {
    advances: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        // 0-9
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        // :    ;    <    =    >    ?    @
        278, 278, 564, 564, 564, 444, 921,
        // A-M
        722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
        // N-Z
        722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 469, 500, 333,
        // a-m
        444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
        // n-z
        500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
        // {    |    }    ~
        480, 200, 480, 541,
    ],
    average_advance: 480,
    line_height: 1120,
};

pub fn glyph_table(family: FontFamily) -> &'static GlyphTable {
    match family {
        FontFamily::Helvetica => &HELVETICA,
        FontFamily::Times => &TIMES,
    }
}

/// `TextMetrics` backed by the static AFM tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct AfmMetrics;

impl TextMetrics for AfmMetrics {
    fn measure(&self, text: &str, font: &FontSpec) -> TextSize {
        let table = glyph_table(font.family);
        TextSize {
            width: table.measure_em(text) * font.size_px,
            height: f32::from(table.line_height) / 1000.0 * font.size_px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_font(family: FontFamily) -> FontSpec {
        FontSpec {
            family,
            size_px: 10.0,
        }
    }

    #[test]
    fn test_empty_string_has_zero_width_but_line_height() {
        let size = AfmMetrics.measure("", &make_font(FontFamily::Helvetica));
        assert_eq!(size.width, 0.0);
        assert!((size.height - 11.5).abs() < 1e-4, "got {}", size.height);
    }

    #[test]
    fn test_helvetica_known_word() {
        // P(667) + e(556) + t(278) + e(556) + r(333) = 2390 units
        let size = AfmMetrics.measure("Peter", &make_font(FontFamily::Helvetica));
        assert!((size.width - 23.9).abs() < 1e-3, "got {}", size.width);
    }

    #[test]
    fn test_width_scales_with_font_size() {
        let small = AfmMetrics.measure("Agnes", &make_font(FontFamily::Times));
        let large = AfmMetrics.measure(
            "Agnes",
            &FontSpec {
                family: FontFamily::Times,
                size_px: 20.0,
            },
        );
        assert!((large.width - small.width * 2.0).abs() < 1e-3);
        assert!((large.height - small.height * 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_non_ascii_falls_back_to_average() {
        let table = glyph_table(FontFamily::Helvetica);
        let width = table.measure_em("é");
        assert!((width - 0.536).abs() < 1e-4);
    }

    #[test]
    fn test_times_narrower_than_helvetica_for_lowercase() {
        let text = "therese of lisieux";
        let sans = AfmMetrics.measure(text, &make_font(FontFamily::Helvetica));
        let serif = AfmMetrics.measure(text, &make_font(FontFamily::Times));
        assert!(serif.width < sans.width);
    }

    #[test]
    fn test_parse_family() {
        assert_eq!(FontFamily::parse("Helvetica"), Some(FontFamily::Helvetica));
        assert_eq!(FontFamily::parse(" serif "), Some(FontFamily::Times));
        assert_eq!(FontFamily::parse("comic"), None);
    }
}
