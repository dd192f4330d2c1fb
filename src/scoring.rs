//! The substring + acronym scoring engine.
//!
//! Ranks a candidate's name, comment, and generic name against a query
//! using two independent models — literal substring matches and acronym
//! alignment — and takes the best of the two. The acronym matcher is
//! memoized on `(start_index, query_suffix_len)` to keep it polynomial
//! instead of exponential in the worst case.

use std::collections::HashMap;

use crate::relevance;

/// Which field of an application a candidate string came from; the point
/// tables differ by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    GenericName,
    Comment,
}

struct SubstringWeights {
    found: i64,
    start_string: i64,
    start_word: i64,
}

fn substring_weights(field: Field) -> SubstringWeights {
    match field {
        Field::Name => SubstringWeights {
            found: 2500,
            start_string: 3000,
            start_word: 2500,
        },
        Field::Comment => SubstringWeights {
            found: 750,
            start_string: 0,
            start_word: 750,
        },
        Field::GenericName => SubstringWeights {
            found: 1800,
            start_string: 2600,
            start_word: 1800,
        },
    }
}

/// Penalty subtracted once for the whole candidate, keyed by how many of
/// the three scored keys (`name`, `comment`, `generic_name`) contributed
/// any score at all — *not* how many times `query` occurs within any one
/// of them.
fn multiples_penalty(keys_matched: usize) -> i64 {
    match keys_matched.min(3) {
        0 | 1 => 0,
        2 => 2000,
        _ => 4000,
    }
}

/// Score one key's first occurrence of `query` in `haystack` (both
/// already case-folded). Returns `None` if `query` does not occur.
///
/// Adds `found`, plus exactly one of `start_string` (the occurrence is at
/// index 0) or `start_word` (the character immediately before the
/// occurrence is a space) — never both, per the source algorithm's
/// `if ... else if ...`.
fn substring_field_score(haystack: &str, query: &str, field: Field) -> Option<i64> {
    if query.is_empty() || haystack.is_empty() {
        return None;
    }
    let i = haystack.find(query)?;
    let weights = substring_weights(field);
    let mut score = weights.found;
    if i == 0 {
        score += weights.start_string;
    } else if haystack[..i].ends_with(' ') {
        score += weights.start_word;
    }
    Some(score)
}

/// The substring sub-score across every field of one application, with
/// the multi-key penalty and the query-length boost applied once at the
/// end.
///
/// `fields` pairs each candidate string with the field weight table it
/// should use (`(&app.name, Field::Name)`, etc).
pub fn substring_score(fields: &[(&str, Field)], query: &str) -> i64 {
    if query.is_empty() {
        return 0;
    }
    let mut raw = 0i64;
    let mut keys_matched = 0usize;
    for (text, field) in fields {
        if let Some(score) = substring_field_score(text, query, *field) {
            raw += score;
            keys_matched += 1;
        }
    }
    if keys_matched == 0 {
        return 0;
    }
    raw -= multiples_penalty(keys_matched);
    if raw <= 0 {
        return raw;
    }
    // Length boost: longer queries that still substring-match are less
    // likely to be accidental, so the match is worth proportionally more.
    let boost = (query.chars().count() as f64).ln() / 5.0 + 1.0;
    (raw as f64 * boost) as i64
}

struct AcronymWeights {
    found: i64,
    start_string: i64,
    letter_word: i64,
    letter_capital: i64,
    letter_non: i64,
    letter_word_skip: i64,
}

fn acronym_weights(field: Field) -> Option<AcronymWeights> {
    match field {
        Field::Name => Some(AcronymWeights {
            found: 3000,
            start_string: 800,
            letter_word: 1200,
            letter_capital: 800,
            letter_non: 500,
            letter_word_skip: 1200,
        }),
        Field::GenericName => Some(AcronymWeights {
            found: 3000,
            start_string: 800,
            letter_word: 1000,
            letter_capital: 700,
            letter_non: 500,
            letter_word_skip: 1000,
        }),
        Field::Comment => None,
    }
}

/// Strip spaces, underscores and hyphens to build an acronym query.
pub fn acronym_query(query: &str) -> String {
    query.chars().filter(|c| !matches!(c, ' ' | '_' | '-')).collect()
}

struct AcronymMatcher<'a> {
    string: &'a [char],
    original: &'a [char],
    acronym: &'a [char],
    weights: &'a AcronymWeights,
    memo: HashMap<(usize, usize), i64>,
}

impl<'a> AcronymMatcher<'a> {
    /// Best achievable score matching `self.acronym[acronym_from..]`
    /// against occurrences of its first character inside
    /// `self.string[start..]`.
    ///
    /// `first` marks the very first call (matching the Python method's
    /// `first=True` default), which alone is eligible for the
    /// `start_string` bonus.
    fn best(&mut self, start: usize, acronym_from: usize, first: bool) -> i64 {
        if acronym_from >= self.acronym.len() {
            return 0;
        }
        if let Some(&cached) = self.memo.get(&(start, acronym_from)) {
            return cached;
        }

        let target = self.acronym[acronym_from];
        let mut best = 0i64;

        for index in start..self.string.len() {
            if self.string[index] != target {
                continue;
            }

            let mut letter_score = 0i64;
            if first && index == start {
                letter_score += self.weights.start_string;
            }
            // A letter is "first of a word" either at the very start of
            // the source string, or immediately after a space.
            let word_start = index == 0 || self.string[index - 1] == ' ';
            if word_start {
                letter_score += self.weights.letter_word;
            } else {
                let original = self.original[index];
                let prev_lower = index > 0 && self.original[index - 1].is_lowercase();
                if original.is_uppercase() && prev_lower {
                    letter_score += self.weights.letter_capital;
                } else {
                    letter_score -= self.weights.letter_non;
                }
            }
            // Word-skip penalty: an entire word was skipped since the
            // previous aligned letter — a space strictly before the
            // character immediately preceding this match (that one is
            // excluded: landing right after a single space is an ordinary
            // word start, not a skip). Never applies to the acronym's
            // first letter.
            if !first && index > start + 1 && self.string[start..index - 1].contains(&' ') {
                letter_score -= self.weights.letter_word_skip;
            }

            let remain = self.best(index + 1, acronym_from + 1, false);
            let next_score = if remain != 0 {
                letter_score + remain
            } else if acronym_from + 1 == self.acronym.len() {
                letter_score
            } else {
                0
            };
            best = best.max(next_score);
        }

        self.memo.insert((start, acronym_from), best);
        best
    }
}

/// The best acronym-match score of `query` (already stripped of spaces,
/// underscores and hyphens) against `haystack`, using `field`'s weight
/// table. `Field::Comment` never participates in acronym scoring and
/// always yields 0.
fn acronym_field_score(haystack_folded: &str, haystack_original: &str, query: &str, field: Field) -> i64 {
    if query.is_empty() {
        return 0;
    }
    let Some(weights) = acronym_weights(field) else {
        return 0;
    };
    let string: Vec<char> = haystack_folded.chars().collect();
    let original: Vec<char> = haystack_original.chars().collect();
    if string.len() != original.len() {
        // Case-folding must be length-preserving for the index alignment
        // below to hold; ASCII folding always satisfies this.
        return 0;
    }
    let acronym: Vec<char> = query.chars().collect();
    if acronym.is_empty() {
        return 0;
    }

    let mut matcher = AcronymMatcher {
        string: &string,
        original: &original,
        acronym: &acronym,
        weights: &weights,
        memo: HashMap::new(),
    };
    let score = matcher.best(0, 0, true);
    if score <= 0 {
        return 0;
    }
    score + weights.found
}

/// The acronym sub-score across every field that supports acronym
/// matching (name and generic name), taking the maximum.
///
/// `fields` gives each candidate string in both its case-folded and
/// original-case forms (the original case is needed to detect
/// `letter_capital` camel-case boundaries).
pub fn acronym_score(fields: &[(&str, &str, Field)], query: &str) -> i64 {
    let acronym = acronym_query(query);
    if acronym.is_empty() {
        return 0;
    }
    fields
        .iter()
        .map(|(folded, original, field)| acronym_field_score(folded, original, &acronym, *field))
        .max()
        .unwrap_or(0)
}

/// Combine the substring and acronym sub-scores into the final, clamped
/// relevance: `clamp(max(substring, acronym))`.
pub fn combine(substring: i64, acronym: i64) -> i64 {
    relevance::clamp(substring.max(acronym))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::fold_case;

    fn score_app(name: &str, generic_name: &str, comment: &str, query: &str) -> i64 {
        let query_folded = fold_case(query);
        let name_folded = fold_case(name);
        let generic_folded = fold_case(generic_name);
        let comment_folded = fold_case(comment);

        let sub = substring_score(
            &[
                (name_folded.as_str(), Field::Name),
                (comment_folded.as_str(), Field::Comment),
                (generic_folded.as_str(), Field::GenericName),
            ],
            &query_folded,
        );
        let acr = acronym_score(
            &[
                (name_folded.as_str(), name, Field::Name),
                (generic_folded.as_str(), generic_name, Field::GenericName),
            ],
            &query_folded,
        );
        combine(sub, acr)
    }

    #[test]
    fn acronym_beats_substring_for_an_initialism_query() {
        let score = score_app("GIMP Image Editor", "Image Editor", "", "gimp");
        assert!(score >= relevance::GOOD, "expected >= GOOD, got {score}");
    }

    #[test]
    fn no_match_scores_zero() {
        let score = score_app("Firefox", "Web Browser", "Browse the web", "xyz");
        assert_eq!(score, 0);
    }

    #[test]
    fn acronym_matches_capitalized_initials() {
        // "vsc" against "Visual Studio Code" should hit letter_capital on
        // each initial.
        let score = score_app("Visual Studio Code", "Code Editor", "", "vsc");
        assert!(score > relevance::BAD, "expected a real acronym hit, got {score}");
    }

    #[test]
    fn empty_query_scores_zero() {
        assert_eq!(score_app("Anything", "", "", ""), 0);
    }

    #[test]
    fn start_string_and_start_word_are_mutually_exclusive() {
        // index 0 gets start_string only, never start_word too (the
        // source algorithm is `if i == 0 { .. } else if is_space { .. }`).
        let weights = substring_weights(Field::Name);
        let score = substring_field_score("ab cd", "ab", Field::Name).unwrap();
        assert_eq!(score, weights.found + weights.start_string);

        let score = substring_field_score("xy ab cd", "ab", Field::Name).unwrap();
        assert_eq!(score, weights.found + weights.start_word);
    }

    #[test]
    fn multiples_penalty_scales_with_keys_matched_not_occurrences() {
        // "ab" occurs twice within `name` alone, but only one *key*
        // (name) matched at all, so no multi-key penalty applies.
        let single_key = substring_score(&[("ababab", Field::Name)], "ab");
        let weights = substring_weights(Field::Name);
        let boost = (2f64).ln() / 5.0 + 1.0;
        assert_eq!(single_key, ((weights.found + weights.start_string) as f64 * boost) as i64);

        // Matching in two distinct keys applies the two-key penalty once.
        let two_keys = substring_score(
            &[("ab cd", Field::Name), ("ab ef", Field::Comment)],
            "ab",
        );
        let name_w = substring_weights(Field::Name);
        let comment_w = substring_weights(Field::Comment);
        let raw = (name_w.found + name_w.start_string) + (comment_w.found + comment_w.start_string) - multiples_penalty(2);
        assert_eq!(two_keys, (raw as f64 * boost) as i64);
    }

    #[test]
    fn relevance_is_always_clamped() {
        assert_eq!(combine(999_999, 0), relevance::MAX);
        assert_eq!(combine(-999_999, -999_999), relevance::MIN);
    }
}
