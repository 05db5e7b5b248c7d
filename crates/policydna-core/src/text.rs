//! Text normalization and similarity primitives for policy language.
//!
//! Policy wording varies heavily between carriers while meaning the same
//! thing ("we shall reimburse" vs "we will pay"). Everything that compares
//! text in this workspace goes through [`normalize`] first: case folding,
//! punctuation stripping, and substitution of common insurance wording
//! variants with one canonical token per concept.

use std::collections::BTreeSet;

/// Canonical substitutions for common insurance wording variants.
///
/// Each entry maps a variant phrase to its canonical replacement; all
/// variants of one concept share the same replacement so that paraphrases
/// normalize to comparable token streams. Multi-word phrases are applied
/// before single words. Kept as a flat inspectable list so the table can be
/// audited against filed policy forms.
pub const SYNONYMS: &[(&str, &str)] = &[
    ("caused directly or indirectly by", "caused by"),
    ("caused by or resulting from", "caused by"),
    ("resulting directly from", "caused by"),
    ("resulting from", "caused by"),
    ("covered cause of loss", "covered peril"),
    ("insured peril", "covered peril"),
    ("insured property", "covered property"),
    ("building", "premises"),
    ("structure", "premises"),
    ("provide", "pay"),
    ("reimburse", "pay"),
    ("indemnify", "pay"),
    ("cover", "pay"),
    ("shall", "will"),
];

/// Tokens too common to carry meaning in term-overlap comparisons.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "in", "of", "and", "or", "to", "by", "for", "with", "as", "at", "from",
    "on", "is", "are", "be", "will",
];

/// Normalize policy text for comparison.
///
/// Lowercases, replaces punctuation with spaces, collapses whitespace, then
/// applies [`SYNONYMS`] at token level (longest phrase first). The result is
/// a single-space-separated token stream.
pub fn normalize(text: &str) -> String {
    let lowered: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();

    // Longest phrases first so "covered cause of loss" wins over "cover".
    let mut table: Vec<(Vec<&str>, Vec<&str>)> = SYNONYMS
        .iter()
        .map(|(pat, canon)| {
            (
                pat.split_whitespace().collect::<Vec<_>>(),
                canon.split_whitespace().collect::<Vec<_>>(),
            )
        })
        .collect();
    table.sort_by_key(|(pat, _)| std::cmp::Reverse(pat.len()));

    for (pattern, replacement) in &table {
        let mut out: Vec<&str> = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            if i + pattern.len() <= tokens.len() && tokens[i..i + pattern.len()] == pattern[..] {
                out.extend_from_slice(replacement);
                i += pattern.len();
            } else {
                out.push(tokens[i]);
                i += 1;
            }
        }
        tokens = out;
    }

    tokens.join(" ")
}

/// Extract the key-term set of a piece of policy text.
///
/// Terms are tokens of the normalized text with at least 3 letters, minus
/// stopwords. Deterministic: the same text always yields the same set.
pub fn key_terms(text: &str) -> BTreeSet<String> {
    terms_of_normalized(&normalize(text))
}

/// Key terms of already-normalized text (avoids re-normalizing).
pub fn terms_of_normalized(normalized: &str) -> BTreeSet<String> {
    normalized
        .split_whitespace()
        .filter(|t| t.len() >= 3 && t.chars().all(|c| c.is_ascii_alphabetic()))
        .filter(|t| !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Fraction of `of` terms that also appear in `within` (0.0 when `of` is empty).
pub fn containment(of: &BTreeSet<String>, within: &BTreeSet<String>) -> f64 {
    if of.is_empty() {
        return 0.0;
    }
    of.intersection(within).count() as f64 / of.len() as f64
}

/// Split text into sentences on `.`, `!`, or `?` followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut sentences = Vec::new();
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if matches!(b, b'.' | b'!' | b'?') {
            let at_end = i + 1 == bytes.len();
            let before_space = !at_end && bytes[i + 1].is_ascii_whitespace();
            if at_end || before_space {
                let sentence = text[start..=i].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = i + 1;
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Character-level sequence similarity ratio in [0, 1].
///
/// Ratcliff/Obershelp: recursively finds the longest common substring and
/// counts matched characters on both sides of it; ratio = 2M / (|a| + |b|).
/// Identical strings score exactly 1.0; disjoint strings score 0.0.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let mut matched = 0usize;
    let mut pending = vec![(0usize, a.len(), 0usize, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(&a, &b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        pending.push((alo, i, blo, j));
        pending.push((i + size, ahi, j + size, bhi));
    }

    2.0 * matched as f64 / total as f64
}

/// Longest matching block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns (start in a, start in b, length). Earliest block wins ties so the
/// result is deterministic.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    use std::collections::HashMap;

    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate().take(bhi).skip(blo) {
        b2j.entry(c).or_default().push(j);
    }

    let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0usize);
    // j2len[j] = length of the match ending at a[i], b[j].
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for i in alo..ahi {
        let mut row: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = b2j.get(&a[i]) {
            for &j in js {
                let k = if j > blo {
                    j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                row.insert(j, k);
                if k > bestsize {
                    besti = i + 1 - k;
                    bestj = j + 1 - k;
                    bestsize = k;
                }
            }
        }
        j2len = row;
    }

    (besti, bestj, bestsize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Loss, or Damage;"), "loss or damage");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("loss   or\n\tdamage"), "loss or damage");
    }

    #[test]
    fn synonym_phrase_replaced_before_single_word() {
        // "covered cause of loss" must become "covered peril", not trip over
        // the single-token "cover" rule.
        assert_eq!(normalize("any Covered Cause of Loss"), "any covered peril");
    }

    #[test]
    fn synonym_variants_share_canonical_token() {
        assert_eq!(normalize("insured peril"), normalize("covered cause of loss"));
        assert_eq!(normalize("the building"), normalize("the structure"));
        assert_eq!(normalize("we shall reimburse"), normalize("we will pay"));
    }

    #[test]
    fn adjacent_occurrences_all_replaced() {
        assert_eq!(normalize("cover cover cover"), "pay pay pay");
    }

    #[test]
    fn key_terms_drop_stopwords_and_short_tokens() {
        let terms = key_terms("We will pay for loss of or damage to it");
        assert!(terms.contains("pay"));
        assert!(terms.contains("loss"));
        assert!(terms.contains("damage"));
        assert!(!terms.contains("will"));
        assert!(!terms.contains("for"));
        assert!(!terms.contains("we"));
    }

    #[test]
    fn key_terms_deterministic() {
        let text = "We will pay for direct physical loss of or damage to Covered Property.";
        assert_eq!(key_terms(text), key_terms(text));
    }

    #[test]
    fn split_sentences_basic() {
        let s = split_sentences("First sentence. Second one! Third?");
        assert_eq!(s, vec!["First sentence.", "Second one!", "Third?"]);
    }

    #[test]
    fn split_sentences_no_terminator() {
        assert_eq!(split_sentences("no terminator here"), vec!["no terminator here"]);
    }

    #[test]
    fn split_sentences_ignores_inline_periods() {
        // "CP 00 10" style form numbers do not end sentences mid-token.
        let s = split_sentences("See form A.B for details. Done.");
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn sequence_ratio_identical_is_one() {
        assert_eq!(sequence_ratio("abc def", "abc def"), 1.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
    }

    #[test]
    fn sequence_ratio_disjoint_is_zero() {
        assert_eq!(sequence_ratio("aaa", "bbb"), 0.0);
    }

    #[test]
    fn sequence_ratio_partial_overlap() {
        // "abcd" vs "bcde": longest block "bcd" -> 2*3/8 = 0.75.
        let r = sequence_ratio("abcd", "bcde");
        assert!((r - 0.75).abs() < 1e-9);
    }

    #[test]
    fn sequence_ratio_symmetric_total() {
        let a = "we will pay for loss";
        let b = "we will not pay for the loss";
        let r1 = sequence_ratio(a, b);
        let r2 = sequence_ratio(b, a);
        assert!((r1 - r2).abs() < 1e-9);
    }

    #[test]
    fn sequence_ratio_monotone_example() {
        let base = "we will pay for direct physical loss";
        let close = "we will pay for direct physical damage";
        let far = "the insured must submit a sworn proof of loss";
        assert!(sequence_ratio(base, close) > sequence_ratio(base, far));
    }

    #[test]
    fn containment_of_subset_is_one() {
        let small = key_terms("loss damage water");
        let big = key_terms("loss damage water sewer drain");
        assert_eq!(containment(&small, &big), 1.0);
    }

    #[test]
    fn containment_of_empty_is_zero() {
        let empty = BTreeSet::new();
        let big = key_terms("loss damage");
        assert_eq!(containment(&empty, &big), 0.0);
    }
}
