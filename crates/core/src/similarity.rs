//! Prompt similarity scoring for the "similar models" search.
//!
//! Pure string math, no database access. Two signals are blended:
//!
//! - a text score: exact match, containment, or normalized edit
//!   distance over the full prompt;
//! - a keyword score: Jaccard overlap of the tokenized word sets.
//!
//! Short queries (<= 3 characters) weight the text score at 0.9 because
//! keyword overlap is meaningless at that length; longer queries use a
//! 0.7 / 0.3 blend.

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Minimum combined score for a candidate to appear in results.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;

/// Default number of similar models returned.
pub const DEFAULT_SIMILAR_LIMIT: usize = 5;

/// Combined score at or above which a result counts as an exact match.
pub const EXACT_MATCH_THRESHOLD: f64 = 0.95;

// ---------------------------------------------------------------------------
// Text score
// ---------------------------------------------------------------------------

/// Score two prompts on raw text: `1.0` for a case-insensitive exact
/// match, `0.8` when one contains the other, otherwise
/// `1 - levenshtein / max_len`, floored at zero. Empty input scores 0.
pub fn text_score(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 0.8;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let distance = levenshtein(&a_chars, &b_chars);
    let max_len = a_chars.len().max(b_chars.len());

    (1.0 - distance as f64 / max_len as f64).max(0.0)
}

/// Levenshtein distance over two char slices, two-row DP.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut curr = vec![0usize; a.len() + 1];

    for (j, bc) in b.iter().enumerate() {
        curr[0] = j + 1;
        for (i, ac) in a.iter().enumerate() {
            let substitution = prev[i] + usize::from(ac != bc);
            curr[i + 1] = substitution.min(prev[i + 1] + 1).min(curr[i] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[a.len()]
}

// ---------------------------------------------------------------------------
// Keyword score
// ---------------------------------------------------------------------------

/// Jaccard overlap of the two prompts' word sets.
///
/// Tokenization: lowercase, strip punctuation (underscores survive, as
/// word characters), split on whitespace. No stop-word removal and no
/// minimum token length. Returns 0 when either side has no tokens.
pub fn keyword_jaccard(a: &str, b: &str) -> f64 {
    let set_a = tokenize(a);
    let set_b = tokenize(b);

    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    intersection as f64 / union as f64
}

fn tokenize(text: &str) -> std::collections::HashSet<String> {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Combined score
// ---------------------------------------------------------------------------

/// Blend the text and keyword scores for a query prompt against a
/// stored candidate prompt.
pub fn combined_score(query: &str, candidate: &str) -> f64 {
    let text = text_score(query, candidate);
    let keyword = keyword_jaccard(query, candidate);

    if query.trim().chars().count() <= 3 {
        text * 0.9 + keyword * 0.1
    } else {
        text * 0.7 + keyword * 0.3
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
