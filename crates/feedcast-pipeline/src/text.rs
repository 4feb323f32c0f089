//! Small text-shaping helpers shared by the Digest and TTS phases:
//! ad-trimming, input-token
//! budgeting, topic slugs for filenames/tags, and
//! deterministic fallback copy.

use chrono::NaiveDate;

/// Trims a leading and trailing fraction of characters from `text`.
pub fn trim_ad_fraction(text: &str, fraction: f64) -> &str {
    let fraction = fraction.clamp(0.0, 0.5);
    let len = text.len();
    let cut = (len as f64 * fraction) as usize;
    if cut == 0 || cut * 2 >= len {
        return text;
    }
    let mut start = cut;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    let mut end = len - cut;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}

/// Retains the earliest characters up to `max_chars`.
/// A rough 4-characters-per-token heuristic converts a token budget into
/// a character budget, kept conservative (undercounts tokens rather than
/// over) since no tokenizer is wired in here.
pub fn truncate_to_token_budget(text: &str, max_tokens: i64) -> &str {
    truncate_to_char_budget(text, tokens_to_chars(max_tokens))
}

fn tokens_to_chars(max_tokens: i64) -> usize {
    (max_tokens.max(0) as usize).saturating_mul(4)
}

fn truncate_to_char_budget(text: &str, max_chars: usize) -> &str {
    if text.len() <= max_chars {
        return text;
    }
    let mut end = max_chars;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Retains the earliest characters across `transcripts`, in order, up to
/// one shared `max_tokens` budget for the whole set — not `max_tokens`
/// per transcript. Each transcript consumes from a running remaining
/// budget; once the budget is exhausted, later transcripts contribute
/// nothing.
pub fn truncate_transcripts_to_budget(transcripts: &[String], max_tokens: i64) -> Vec<String> {
    let mut remaining = tokens_to_chars(max_tokens);
    transcripts
        .iter()
        .map(|t| {
            let piece = truncate_to_char_budget(t, remaining);
            remaining -= piece.len();
            piece.to_string()
        })
        .collect()
}

/// A stable filesystem/tag-safe slug for a topic name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    slug.trim_matches('-').to_string()
}

/// The deterministic fallback title for a digest whose metadata
/// generation failed.
pub fn fallback_title(topic_name: &str, date: NaiveDate) -> String {
    format!("{topic_name} Daily Digest - {}", date.format("%B %d, %Y"))
}

/// The short script for a topic with no qualifying episodes on a given
/// day.
pub fn no_content_script(topic_name: &str) -> String {
    format!(
        "There's no new {topic_name} content that meets today's bar. We'll be back tomorrow with the next update."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_five_percent_from_each_end() {
        let text = "a".repeat(100);
        let trimmed = trim_ad_fraction(&text, 0.05);
        assert_eq!(trimmed.len(), 90);
    }

    #[test]
    fn zero_fraction_is_a_no_op() {
        assert_eq!(trim_ad_fraction("hello world", 0.0), "hello world");
    }

    #[test]
    fn truncate_keeps_earliest_characters() {
        let text = "0123456789";
        assert_eq!(truncate_to_token_budget(text, 2), "01234567");
    }

    #[test]
    fn transcripts_share_one_budget_instead_of_one_each() {
        let transcripts = vec!["0123456789".to_string(), "abcdefghij".to_string()];
        // budget of 2 tokens = 8 chars total, shared across both transcripts.
        let truncated = truncate_transcripts_to_budget(&transcripts, 2);
        assert_eq!(truncated[0], "01234567");
        assert_eq!(truncated[1], "");
    }

    #[test]
    fn transcripts_budget_carries_remainder_into_later_items() {
        let transcripts = vec!["012".to_string(), "abcdefghij".to_string()];
        // budget of 2 tokens = 8 chars total; first transcript only uses 3,
        // leaving 5 for the second.
        let truncated = truncate_transcripts_to_budget(&transcripts, 2);
        assert_eq!(truncated[0], "012");
        assert_eq!(truncated[1], "abcde");
    }

    #[test]
    fn slugify_collapses_punctuation_and_spaces() {
        assert_eq!(slugify("AI & Machine Learning!"), "ai-machine-learning");
    }

    #[test]
    fn fallback_title_matches_spec_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(fallback_title("AI", date), "AI Daily Digest - March 05, 2026");
    }
}
