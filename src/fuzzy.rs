//! Tool-name fuzzy matching.
//!
//! Suggests the closest known tool name for a name the model got slightly
//! wrong. Matching is advisory: callers decide whether to act on it.

/// Best candidate for a proposed tool name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// Closest candidate, if it is close enough to be plausible
    pub matched: Option<String>,
    /// Minimum distance found, reported even when nothing matched.
    /// `usize::MAX` when there were no candidates.
    pub distance: usize,
}

impl FuzzyMatch {
    fn exact(name: &str) -> Self {
        Self {
            matched: Some(name.to_string()),
            distance: 0,
        }
    }
}

/// Levenshtein edit distance with unit insert/delete/substitute cost.
///
/// Operates on `char`s, not bytes.
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            matrix[i][j] = (matrix[i - 1][j] + 1) // deletion
                .min(matrix[i][j - 1] + 1) // insertion
                .min(matrix[i - 1][j - 1] + cost); // substitution
        }
    }

    matrix[a_len][b_len]
}

/// Whether `distance` is within 30% of `candidate`'s length.
fn within_tolerance(distance: usize, candidate: &str) -> bool {
    distance * 10 <= candidate.chars().count() * 3
}

/// Find the closest candidate to `proposed`.
///
/// Exact matches (case-sensitive, then case-insensitive) short-circuit with
/// distance 0. Otherwise the candidate with the smallest distance between
/// the lowercased names wins; the first one in iteration order breaks ties.
/// It is returned only if that distance is at most 30% of the candidate's
/// own length.
#[must_use]
pub fn find_closest<'a, I>(proposed: &str, candidates: I) -> FuzzyMatch
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let candidates = candidates.into_iter();

    if let Some(exact) = candidates.clone().find(|c| *c == proposed) {
        return FuzzyMatch::exact(exact);
    }

    // Same folding as the distance computation below.
    let proposed_lower = proposed.to_lowercase();
    if let Some(folded) = candidates
        .clone()
        .find(|c| c.to_lowercase() == proposed_lower)
    {
        return FuzzyMatch::exact(folded);
    }

    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        let distance = levenshtein(&proposed_lower, &candidate.to_lowercase());
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }

    match best {
        Some((candidate, distance)) if within_tolerance(distance, candidate) => FuzzyMatch {
            matched: Some(candidate.to_string()),
            distance,
        },
        Some((_, distance)) => FuzzyMatch {
            matched: None,
            distance,
        },
        None => FuzzyMatch {
            matched: None,
            distance: usize::MAX,
        },
    }
}
