//! Choosing where to cut a text run.
//!
//! Text is tokenized into alternating runs of whitespace and non-whitespace. A cut
//! always lands at the start of a word so that the whitespace separating two words
//! stays with the part that remains on the page. Only when the first word of a run
//! is the sole thing left on a page do cuts fall inside a word.

/// A maximal run of either whitespace or non-whitespace characters, as byte offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub start: usize,
    pub end: usize,
    pub whitespace: bool,
}

pub(crate) fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    for (i, ch) in text.char_indices() {
        let whitespace = ch.is_whitespace();
        let end = i + ch.len_utf8();
        match tokens.last_mut() {
            Some(token) if token.whitespace == whitespace => token.end = end,
            _ => tokens.push(Token {
                start: i,
                end,
                whitespace,
            }),
        }
    }
    tokens
}

/// Offsets at which `text` can be cut while keeping at least one whole word before
/// the cut: the start of every word except the first.
pub(crate) fn word_breaks(tokens: &[Token]) -> Vec<usize> {
    tokens
        .iter()
        .filter(|token| !token.whitespace)
        .skip(1)
        .map(|token| token.start)
        .collect()
}

/// Offsets strictly inside the first word of `text`, one per character boundary
pub(crate) fn char_breaks(text: &str, tokens: &[Token]) -> Vec<usize> {
    let Some(word) = tokens.iter().find(|token| !token.whitespace) else {
        return Vec::new();
    };
    text[word.start..word.end]
        .char_indices()
        .skip(1)
        .map(|(i, _)| word.start + i)
        .collect()
}

/// Binary searches `cuts` (ascending) for the largest cut accepted by `fits`. The
/// predicate must be monotone: once a cut is rejected, every larger cut is too.
/// Calls `fits` at most `ceil(log2(cuts.len() + 1))` times.
pub(crate) fn largest_fitting<F>(cuts: &[usize], mut fits: F) -> Option<usize>
where
    F: FnMut(usize) -> bool,
{
    let (mut lo, mut hi) = (0, cuts.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if fits(cuts[mid]) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo.checked_sub(1).map(|i| cuts[i])
}

/// Upper bound on the calls [largest_fitting] makes over `cuts` candidates
pub(crate) fn max_attempts(cuts: usize) -> usize {
    (usize::BITS - cuts.leading_zeros()) as usize
}
