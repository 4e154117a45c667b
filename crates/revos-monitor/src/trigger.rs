//! Trigger-word detection.
//!
//! Exact (case-insensitive) substring match wins immediately. For trigger
//! words of at least four characters a fuzzy pass recovers
//! single-character typos: each whitespace token of the text is accepted
//! when it is within one edit (substitution, insertion, deletion, or
//! adjacent transposition) of the trigger. Short trigger words skip the
//! fuzzy pass entirely so common two- and three-letter words cannot
//! false-positive.

/// Minimum trigger length (in characters) before fuzzy matching applies.
const MIN_FUZZY_TRIGGER_CHARS: usize = 4;

/// Returns the configured trigger word when `text` contains it, exactly
/// or within one edit. Empty or whitespace-only trigger words never
/// match.
#[must_use]
pub fn match_trigger<'a>(text: &str, trigger_word: &'a str) -> Option<&'a str> {
    let trigger = trigger_word.trim().to_lowercase();
    if trigger.is_empty() {
        return None;
    }

    let text = text.to_lowercase();
    if text.contains(&trigger) {
        return Some(trigger_word);
    }

    if trigger.chars().count() < MIN_FUZZY_TRIGGER_CHARS {
        return None;
    }

    text.split_whitespace()
        .any(|token| within_one_edit(token, &trigger))
        .then_some(trigger_word)
}

/// Bounded edit-distance check: true when `a` and `b` are equal or one
/// substitution, insertion, deletion, or adjacent transposition apart.
/// Tokens whose length differs by more than one are rejected without
/// further comparison.
fn within_one_edit(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len() == b.len() {
        let mismatches: Vec<usize> = (0..a.len()).filter(|&i| a[i] != b[i]).collect();
        return match mismatches.as_slice() {
            [_] => true,
            [i, j] => j == &(i + 1) && a[*i] == b[*j] && a[*j] == b[*i],
            _ => false,
        };
    }

    if a.len().abs_diff(b.len()) != 1 {
        return false;
    }

    // One insertion/deletion: walk both, allowing a single skip in the
    // longer token.
    let (short, long) = if a.len() < b.len() { (&a, &b) } else { (&b, &a) };
    let mut i = 0;
    let mut j = 0;
    let mut skipped = false;
    while i < short.len() && j < long.len() {
        if short[i] == long[j] {
            i += 1;
            j += 1;
        } else if skipped {
            return false;
        } else {
            skipped = true;
            j += 1;
        }
    }
    true
}
