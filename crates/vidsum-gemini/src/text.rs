//! Transcript preparation helpers.
//!
//! Transcripts are truncated to a fixed character budget before they enter a
//! prompt, preferring a cut at a sentence boundary so the model never sees a
//! sentence chopped mid-word. Chinese text additionally gets normalized:
//! caption tracks frequently carry stray ASCII whitespace between ideographs
//! and run sentences together without breaks.

use vidsum_models::Language;

/// Maximum number of characters of a single transcript included in a prompt.
pub const TRANSCRIPT_CHAR_BUDGET: usize = 2000;

/// Sentence-terminal punctuation for Japanese and Chinese text.
const CJK_TERMINATORS: [char; 4] = ['。', '！', '？', '；'];

/// Truncates a transcript to [`TRANSCRIPT_CHAR_BUDGET`] characters.
pub fn truncate_transcript(text: &str, language: Language) -> String {
    truncate_with_budget(text, TRANSCRIPT_CHAR_BUDGET, language)
}

/// Truncates `text` to at most `budget` characters, cutting at the last
/// sentence boundary that fits.
///
/// For English the boundary is a period followed by whitespace and the cut
/// keeps the period. For Japanese and Chinese the boundary is one of the
/// fullwidth terminators and the cut keeps it. When no boundary exists within
/// the budget the text is cut hard at the budget and suffixed with `…`.
/// Budgets are counted in characters, not bytes.
pub fn truncate_with_budget(text: &str, budget: usize, language: Language) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= budget {
        return text.to_string();
    }

    let cut = match language {
        Language::En => last_latin_boundary(&chars, budget),
        Language::Ja | Language::Zh => last_cjk_boundary(&chars, budget),
    };

    match cut {
        Some(end) => chars[..end].iter().collect(),
        None => {
            let mut truncated: String = chars[..budget].iter().collect();
            truncated.push('…');
            truncated
        }
    }
}

/// Index one past the last `. ` period within the first `budget` characters.
fn last_latin_boundary(chars: &[char], budget: usize) -> Option<usize> {
    (0..budget).rev().find_map(|i| {
        let followed_by_space = match chars.get(i + 1) {
            Some(next) => next.is_whitespace(),
            None => true,
        };
        (chars[i] == '.' && followed_by_space).then_some(i + 1)
    })
}

/// Index one past the last fullwidth terminator within the first `budget`
/// characters.
fn last_cjk_boundary(chars: &[char], budget: usize) -> Option<usize> {
    (0..budget)
        .rev()
        .find(|&i| CJK_TERMINATORS.contains(&chars[i]))
        .map(|i| i + 1)
}

/// Returns true when `c` belongs to a CJK script (Han ideographs or kana).
///
/// Punctuation and fullwidth forms are deliberately excluded: an English
/// response containing a stray fullwidth comma must not pass Chinese output
/// validation.
pub fn is_cjk_char(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'     // CJK Unified Ideographs
        | '\u{3400}'..='\u{4DBF}'   // CJK Extension A
        | '\u{F900}'..='\u{FAFF}'   // CJK Compatibility Ideographs
        | '\u{3040}'..='\u{309F}'   // Hiragana
        | '\u{30A0}'..='\u{30FF}'   // Katakana
    )
}

/// Returns true when `text` contains at least one CJK script character.
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk_char)
}

/// CJK script characters plus CJK punctuation and fullwidth forms.
///
/// Whitespace between two of these never carries meaning, so the collapse
/// pass treats the whole class as glue-free.
fn is_cjk_or_fullwidth(c: char) -> bool {
    is_cjk_char(c)
        || matches!(c,
            '\u{3000}'..='\u{303F}'     // CJK punctuation
            | '\u{FF00}'..='\u{FFEF}'   // Fullwidth and halfwidth forms
        )
}

/// Normalizes Chinese transcript text for prompt inclusion.
///
/// Two passes: drop whitespace runs flanked on both sides by CJK characters,
/// then insert a newline after each sentence terminator that is not already
/// followed by a break or another terminator.
pub fn normalize_chinese(text: &str) -> String {
    insert_sentence_breaks(&collapse_cjk_whitespace(text))
}

fn collapse_cjk_whitespace(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            let prev_is_cjk = out.chars().last().map(is_cjk_or_fullwidth).unwrap_or(false);
            let next_is_cjk = chars.get(j).copied().map(is_cjk_or_fullwidth).unwrap_or(false);
            if !(prev_is_cjk && next_is_cjk) {
                out.extend(&chars[i..j]);
            }
            i = j;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

fn insert_sentence_breaks(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    for (i, &c) in chars.iter().enumerate() {
        out.push(c);
        if CJK_TERMINATORS.contains(&c) {
            match chars.get(i + 1) {
                Some('\n') => {}
                Some(next) if CJK_TERMINATORS.contains(next) => {}
                None => {}
                Some(_) => out.push('\n'),
            }
        }
    }
    out
}
