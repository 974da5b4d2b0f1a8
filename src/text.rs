//! Free-text normalisation and keyword matching shared by the resolvers
//! and classifiers.
//!
//! Everything is matched on a normalised form: lower-case ASCII
//! alphanumerics separated by single spaces. Short keywords (three
//! characters or fewer, e.g. "mgo", "bop", "rig") must match whole words so
//! they don't fire inside longer words. Longer keywords must start a word
//! and may only run on by an inflection ("drill" hits "drilling", "cacl"
//! hits "cacl2") so "weather" stays out of "weatherford" and "spar" out of
//! "spare".

/// Endings a long keyword may run on by, before any trailing digits
const INFLECTIONS: &[&str] = &[
    "", "s", "es", "d", "ed", "ing", "ings", "er", "ers", "ion", "ions", "ment", "ments",
];

/// Lower-case, replace every non-alphanumeric run with one space, trim.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Whether a normalised haystack contains a keyword (normalised here).
pub fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    let kw = normalize(keyword);
    if kw.is_empty() || haystack.is_empty() {
        return false;
    }
    if kw.chars().filter(|c| !c.is_whitespace()).count() <= 3 {
        format!(" {haystack} ").contains(&format!(" {kw} "))
    } else {
        haystack.match_indices(kw.as_str()).any(|(i, _)| {
            let starts_word = i == 0 || haystack.as_bytes()[i - 1] == b' ';
            let run_on = haystack[i + kw.len()..].split(' ').next().unwrap_or("");
            starts_word && is_inflection(run_on)
        })
    }
}

fn is_inflection(tail: &str) -> bool {
    INFLECTIONS.contains(&tail.trim_end_matches(|c: char| c.is_ascii_digit()))
}

/// Whether any keyword appears in the normalised haystack.
pub fn contains_any<S: AsRef<str>>(haystack: &str, keywords: &[S]) -> bool {
    keywords.iter().any(|k| contains_keyword(haystack, k.as_ref()))
}

/// Number of distinct keywords that appear in the normalised haystack.
pub fn count_matches<S: AsRef<str>>(haystack: &str, keywords: &[S]) -> usize {
    keywords
        .iter()
        .filter(|k| contains_keyword(haystack, k.as_ref()))
        .count()
}

/// Normalise and join several optional text fields into one haystack.
pub fn join_fields<'a>(fields: impl IntoIterator<Item = Option<&'a str>>) -> String {
    let parts: Vec<String> = fields
        .into_iter()
        .flatten()
        .map(normalize)
        .filter(|s| !s.is_empty())
        .collect();
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_punctuation() {
        assert_eq!(normalize("  Thunder-Horse  (PDQ) "), "thunder horse pdq");
        assert_eq!(normalize("C-Port"), "c port");
        assert_eq!(normalize("P&A"), "p a");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_short_keyword_needs_whole_word() {
        assert!(contains_keyword("loaded mgo to rig", "mgo"));
        assert!(!contains_keyword("smgol", "mgo"));
        assert!(contains_keyword("p a campaign", "P&A"));
        assert!(!contains_keyword("trigger", "rig"));
    }

    #[test]
    fn test_long_keyword_matches_word_prefix() {
        assert!(contains_keyword("drilling support", "drill"));
        assert!(contains_keyword("waiting on weather", "Waiting"));
        assert!(contains_keyword("offshore waiting on weather", "waiting on weather"));
        assert!(!contains_keyword("transit", "waiting"));
    }

    #[test]
    fn test_long_keyword_never_starts_mid_word() {
        assert!(!contains_keyword("support vessel", "port"));
        assert!(!contains_keyword("daily report", "port"));
        assert!(!contains_keyword("database export", "base"));
        assert!(contains_keyword("port fourchon", "port"));
    }

    #[test]
    fn test_long_keyword_runs_on_only_by_inflection() {
        assert!(!contains_keyword("offload weatherford tools", "weather"));
        assert!(!contains_keyword("spare parts delivery", "spar"));
        assert!(!contains_keyword("portable tank", "port"));
        assert!(contains_keyword("weathered in", "weather"));
        assert!(contains_keyword("two spars", "spar"));
        assert!(contains_keyword("cacl2 brine", "cacl"));
        assert!(contains_keyword("well abandonment", "abandon"));
    }

    #[test]
    fn test_count_and_join() {
        let hay = join_fields([Some("Thunder Horse"), None, Some("Drilling")]);
        assert_eq!(hay, "thunder horse drilling");
        assert_eq!(count_matches(&hay, &["thunder", "drill", "argos"]), 2);
        assert!(contains_any(&hay, &["argos", "horse"]));
    }
}
