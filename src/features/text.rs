// Text features — length, word count, emoji count, uppercase ratio.
//
// Emoji counting uses a fixed table of Unicode code point ranges rather than
// a grapheme-aware emoji parser, so that any implementation using the same
// table gets the same counts. Each code point in a range counts once:
// a flag (two regional indicators) counts as 2, while variation selectors,
// zero-width joiners, and skin-tone modifiers count as 0.

/// Inclusive code point ranges treated as emoji.
pub const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F300, 0x1F5FF), // Miscellaneous Symbols and Pictographs
    (0x1F600, 0x1F64F), // Emoticons
    (0x1F680, 0x1F6FF), // Transport and Map Symbols
    (0x1F700, 0x1F77F), // Alchemical Symbols
    (0x1F780, 0x1F7FF), // Geometric Shapes Extended
    (0x1F800, 0x1F8FF), // Supplemental Arrows-C
    (0x1F900, 0x1F9FF), // Supplemental Symbols and Pictographs
    (0x1FA00, 0x1FA6F), // Chess Symbols
    (0x1FA70, 0x1FAFF), // Symbols and Pictographs Extended-A
    (0x2600, 0x26FF),   // Miscellaneous Symbols
    (0x2700, 0x27BF),   // Dingbats
    (0x1F1E6, 0x1F1FF), // Regional Indicator Symbols
    (0x231A, 0x231B),   // watch, hourglass
    (0x23E9, 0x23F3),   // media control symbols
    (0x23F8, 0x23FA),
    (0x2B05, 0x2B07),   // arrows
    (0x2B1B, 0x2B1C),   // large squares
    (0x2B50, 0x2B50),   // star
    (0x2B55, 0x2B55),   // heavy circle
    (0x1F004, 0x1F004), // mahjong red dragon
    (0x1F0CF, 0x1F0CF), // joker
    (0x1F18E, 0x1F18E), // AB button
    (0x1F191, 0x1F19A), // squared words (CL, COOL, FREE, ...)
];

/// Skin-tone modifiers sit inside 0x1F300-0x1F5FF but modify the preceding
/// emoji rather than standing alone.
const SKIN_TONE_MODIFIERS: (u32, u32) = (0x1F3FB, 0x1F3FF);

pub fn is_emoji(c: char) -> bool {
    let cp = c as u32;
    if (SKIN_TONE_MODIFIERS.0..=SKIN_TONE_MODIFIERS.1).contains(&cp) {
        return false;
    }
    EMOJI_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

pub fn count_emoji(text: &str) -> usize {
    text.chars().filter(|&c| is_emoji(c)).count()
}

/// Fraction of alphabetic characters that are uppercase.
///
/// Returns 0.0 when the text has no alphabetic characters, so the feature
/// matrix never contains NaN.
pub fn uppercase_ratio(text: &str) -> f64 {
    let mut alphabetic = 0usize;
    let mut upper = 0usize;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        alphabetic += 1;
        if c.is_uppercase() {
            upper += 1;
        }
    }
    if alphabetic == 0 {
        return 0.0;
    }
    upper as f64 / alphabetic as f64
}

/// Length in Unicode scalar values of the trimmed text.
pub fn char_length(text: &str) -> usize {
    text.trim().chars().count()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Normalization used for exact-duplicate detection: trimmed and lowercased.
pub fn normalize_for_dedup(text: &str) -> String {
    text.trim().to_lowercase()
}
