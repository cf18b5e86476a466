#![forbid(unsafe_code)]

//! Hangul initial-consonant (chosung) extraction.
//!
//! A precomposed Hangul syllable (U+AC00..=U+D7A3) is laid out as
//! `base + (initial * 21 + medial) * 28 + final`, so the initial consonant is
//! `(c - base) / 588`. The result is emitted as a compatibility jamo
//! (ㄱ..ㅎ), which is what a phone keyboard produces for a lone consonant.
//!
//! # Example
//! ```
//! use postaid_text::chosung::chosung;
//!
//! assert_eq!(chosung("홍길동"), "ㅎㄱㄷ");
//! assert_eq!(chosung("A동 101"), "Aㄷ 101");
//! ```

const SYLLABLE_FIRST: u32 = 0xAC00;
const SYLLABLE_COUNT: u32 = 11_172;
const SYLLABLES_PER_INITIAL: u32 = 21 * 28;

const INITIALS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ', 'ㅌ',
    'ㅍ', 'ㅎ',
];

/// Leading consonant of a precomposed Hangul syllable.
///
/// Returns `None` for every other character, including standalone jamo.
#[inline]
#[must_use]
pub fn initial_consonant(c: char) -> Option<char> {
    let offset = (c as u32).checked_sub(SYLLABLE_FIRST)?;
    if offset >= SYLLABLE_COUNT {
        return None;
    }
    INITIALS
        .get((offset / SYLLABLES_PER_INITIAL) as usize)
        .copied()
}

/// Map one character to its chosung form: the initial consonant for a Hangul
/// syllable, the character itself otherwise.
#[inline]
#[must_use]
pub fn chosung_char(c: char) -> char {
    initial_consonant(c).unwrap_or(c)
}

/// Replace every Hangul syllable with its initial consonant.
///
/// Digits, Latin letters, spaces, and standalone jamo pass through verbatim,
/// so the output has exactly as many chars as the input.
#[must_use]
pub fn chosung(text: &str) -> String {
    text.chars().map(chosung_char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_and_last_syllables() {
        assert_eq!(initial_consonant('가'), Some('ㄱ'));
        assert_eq!(initial_consonant('힣'), Some('ㅎ'));
    }

    #[test]
    fn double_consonants() {
        assert_eq!(chosung("까치"), "ㄲㅊ");
        assert_eq!(chosung("빵"), "ㅃ");
        assert_eq!(chosung("짜장"), "ㅉㅈ");
    }

    #[test]
    fn non_syllables_pass_through() {
        assert_eq!(initial_consonant('ㄱ'), None);
        assert_eq!(initial_consonant('a'), None);
        assert_eq!(chosung("101호 (2층)"), "101ㅎ (2ㅊ)");
    }

    #[test]
    fn char_count_is_preserved() {
        let s = "월계빌라 B동 3층";
        assert_eq!(chosung(s).chars().count(), s.chars().count());
    }

    #[test]
    fn empty_input() {
        assert_eq!(chosung(""), "");
    }
}
