//! Name similarity on a 0-100 scale.
//!
//! The score is the indel ratio of the lowercased names:
//! `100 * 2 * lcs / (len_a + len_b)` over characters, where `lcs` is the
//! longest common subsequence. Halves round to even, so 62.5 scores 62 and
//! 87.5 scores 88. An empty name scores 0 against anything.

use std::cmp::Ordering;

use rapidfuzz::distance::indel;

/// Lowercase form used for every comparison.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Case-insensitive similarity of two names, 0-100.
pub fn similarity(a: &str, b: &str) -> u8 {
    score_normalized(&normalize_name(a), &normalize_name(b))
}

/// Similarity of two already-normalized names.
pub fn score_normalized(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let total = a.chars().count() + b.chars().count();
    // indel distance = total - 2 * lcs
    let distance = indel::distance(a.chars(), b.chars());
    percent(total.saturating_sub(distance), total)
}

/// Highest score two names of these character lengths can reach.
///
/// The common subsequence is at most the shorter name, so this bounds
/// `score_normalized` from above for any pair with these lengths.
pub fn max_score_for_lengths(a_len: usize, b_len: usize) -> u8 {
    if a_len == 0 || b_len == 0 {
        return 0;
    }
    percent(2 * a_len.min(b_len), a_len + b_len)
}

/// `100 * num / den` rounded half to even.
fn percent(num: usize, den: usize) -> u8 {
    let scaled = num * 100;
    let (quotient, remainder) = (scaled / den, scaled % den);
    let rounded = match (2 * remainder).cmp(&den) {
        Ordering::Greater => quotient + 1,
        Ordering::Equal if quotient % 2 == 1 => quotient + 1,
        _ => quotient,
    };
    rounded.min(100) as u8
}
