//! A stable filesystem/url-safe slug for a topic name, used to derive the
//! stable `<guid>` the RSS contract requires.
//! Duplicated from `feedcast-pipeline::text::slugify` rather than shared
//! via a dependency: this crate has no other reason to depend on the
//! pipeline crate, and the two must agree on format independently of
//! whichever one changes first.

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation_and_spaces() {
        assert_eq!(slugify("AI & Machine Learning!"), "ai-machine-learning");
    }
}
