//! Text normalization and keyword helpers shared by every matcher.
//!
//! All comparisons in the assistant happen on normalized text: lowercase,
//! NFD-decomposed with combining marks removed, and trimmed. "Está bien" and
//! "esta bien" are therefore the same phrase everywhere.

use unicode_normalization::UnicodeNormalization;

/// Distance returned by [`levenshtein`] when the lengths differ by more than 3.
pub const LEVENSHTEIN_CUTOFF: usize = 100;

/// Lowercases, strips diacritics and trims.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Splits already-normalized text into alphanumeric words.
pub fn words(normalized: &str) -> Vec<&str> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Classic Levenshtein distance over Unicode scalar values.
///
/// Short-circuits to [`LEVENSHTEIN_CUTOFF`] when the lengths differ by more
/// than 3, which keeps token-vs-name comparisons cheap.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    if m.abs_diff(n) > 3 {
        return LEVENSHTEIN_CUTOFF;
    }
    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }
    dp[m][n]
}

/// Checks normalized text against a keyword list.
///
/// - multi-word keywords match as a phrase on word boundaries
/// - keywords of up to 3 chars must equal a whole word ("ok", "si")
/// - longer keywords match as a word prefix, so "horario" also hits "horarios"
pub fn contains_keyword(normalized: &str, keywords: &[&str]) -> bool {
    let tokens = words(normalized);
    let joined = format!(" {} ", tokens.join(" "));

    keywords.iter().any(|kw| {
        if kw.contains(' ') {
            joined.contains(&format!(" {kw} "))
        } else if kw.chars().count() <= 3 {
            tokens.iter().any(|t| t == kw)
        } else {
            tokens.iter().any(|t| t.starts_with(kw))
        }
    })
}

/// Truncates to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
