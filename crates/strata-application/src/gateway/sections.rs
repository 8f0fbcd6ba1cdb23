//! Heading-delimited text contract.
//!
//! When search grounding is on the provider cannot return schema-constrained
//! JSON, so the model is asked for Markdown sections instead. Grammar of a
//! heading line:
//!
//! ```text
//! heading  := ws* ( "#"{1,6} ws+ title | bold-title ) ws*
//! title    := number? bold? name ":"? bold? ":"?
//! number   := digit+ ( "." | ")" ) ws*
//! bold     := "**" | "__"
//! ```
//!
//! A `#` heading, or a bold title ending in a colon, always starts a new
//! section, whether or not it is one of the requested names. A bare bold line
//! (`**Key point**`) starts one only when it names a requested heading;
//! otherwise it is body text. A section's body is every line after its
//! heading up to the next heading.

use regex::Regex;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:#{1,6}\s+(?P<hashed>.+?)|(?P<bold>(?:\d+[.)]\s*)?(?:\*\*|__).+?(?:\*\*|__)\s*:?))\s*$")
        .expect("heading pattern is valid")
});

static NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s*").expect("numbering pattern is valid"));

/// A line that looks like a heading.
#[derive(Debug, PartialEq, Eq)]
struct Heading {
    /// Lowercased, without numbering, emphasis or colon.
    title: String,
    /// `#` heading or colon-terminated bold title.
    explicit: bool,
}

fn heading(line: &str) -> Option<Heading> {
    let caps = HEADING.captures(line)?;
    let (raw, explicit) = match caps.name("hashed") {
        Some(hashed) => (hashed.as_str().trim(), true),
        None => {
            let bold = caps.name("bold")?.as_str().trim();
            let colon = bold
                .trim_end_matches(|c| c == '*' || c == '_')
                .trim_end()
                .ends_with(':');
            (bold, colon)
        }
    };

    let without_number = NUMBERING.replace(raw, "");
    let title = without_number
        .trim()
        .trim_end_matches(':')
        .trim_matches(|c| c == '*' || c == '_')
        .trim()
        .trim_end_matches(':')
        .trim();
    Some(Heading {
        title: title.to_lowercase(),
        explicit,
    })
}

/// Index of the requested heading `title` names, preferring the longest match.
fn match_heading(title: &str, headings: &[&str]) -> Option<usize> {
    headings
        .iter()
        .enumerate()
        .filter(|(_, heading)| {
            let heading = heading.to_lowercase();
            title == heading || title.starts_with(&format!("{} ", heading))
                || title.starts_with(&format!("{}(", heading))
        })
        .max_by_key(|(_, heading)| heading.len())
        .map(|(index, _)| index)
}

/// Splits `text` into the bodies of the requested `headings`.
///
/// The result is aligned with `headings`: `None` where a heading is absent or
/// its body is empty. Heading names match case-insensitively, and a heading
/// may carry a parenthetical or extra words after the name
/// (`## Strategic Alternative A (Bold)`). A repeated heading keeps its first
/// body.
pub fn parse_sections(text: &str, headings: &[&str]) -> Vec<Option<String>> {
    let mut bodies: Vec<Option<String>> = vec![None; headings.len()];
    let mut current: Option<usize> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.lines() {
        let Some(found) = heading(line) else {
            buffer.push(line);
            continue;
        };
        let matched = match_heading(&found.title, headings);
        if found.explicit || matched.is_some() {
            flush(&mut bodies, current, &mut buffer);
            current = matched;
        } else {
            buffer.push(line);
        }
    }
    flush(&mut bodies, current, &mut buffer);

    bodies
}

fn flush(bodies: &mut [Option<String>], index: Option<usize>, buffer: &mut Vec<&str>) {
    if let Some(index) = index {
        let body = buffer.join("\n").trim().to_string();
        if bodies[index].is_none() && !body.is_empty() {
            bodies[index] = Some(body);
        }
    }
    buffer.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADINGS: &[&str] = &["Diagnosis", "Guiding Policy", "Diagnosis Snapshot"];

    fn heading_title(line: &str) -> Option<String> {
        heading(line).map(|heading| heading.title)
    }

    #[test]
    fn test_heading_variants() {
        assert_eq!(heading_title("## Diagnosis").as_deref(), Some("diagnosis"));
        assert_eq!(heading_title("### 2. **Guiding Policy:**").as_deref(), Some("guiding policy"));
        assert_eq!(heading_title("**Guiding Policy**:").as_deref(), Some("guiding policy"));
        assert_eq!(heading_title("1) __Diagnosis__").as_deref(), Some("diagnosis"));
        assert_eq!(heading_title("Plain sentence with **bold** inside."), None);
        assert_eq!(heading_title("#hashtag"), None);
    }

    #[test]
    fn test_parse_sections() {
        let text = "Intro text is ignored.\n\
                    ## 1. Diagnosis\n\
                    The core obstacle is X.\n\
                    It compounds Y.\n\
                    \n\
                    ## **Guiding Policy:**\n\
                    Focus on Z.\n\
                    ## Sources\n\
                    - https://example.com\n";

        let sections = parse_sections(text, HEADINGS);
        assert_eq!(
            sections[0].as_deref(),
            Some("The core obstacle is X.\nIt compounds Y.")
        );
        assert_eq!(sections[1].as_deref(), Some("Focus on Z."));
        assert_eq!(sections[2], None);
    }

    #[test]
    fn test_bold_line_inside_body_is_kept() {
        let text = "## Diagnosis\n\
                    **Key point**\n\
                    Loyalty erodes after the first purchase.\n\
                    **Guiding Policy**\n\
                    Focus on onboarding.\n\
                    **Evidence:**\n\
                    Survey data.";

        let sections = parse_sections(text, HEADINGS);
        assert_eq!(
            sections[0].as_deref(),
            Some("**Key point**\nLoyalty erodes after the first purchase.")
        );
        assert_eq!(sections[1].as_deref(), Some("Focus on onboarding."));
        assert!(heading("**Key point**").is_some_and(|h| !h.explicit));
        assert!(heading("**Evidence:**").is_some_and(|h| h.explicit));
    }

    #[test]
    fn test_longest_heading_wins() {
        let text = "## Diagnosis Snapshot\nsnapshot\n## Diagnosis (root cause)\nroot";
        let sections = parse_sections(text, HEADINGS);
        assert_eq!(sections[0].as_deref(), Some("root"));
        assert_eq!(sections[2].as_deref(), Some("snapshot"));
    }

    #[test]
    fn test_no_headings() {
        let sections = parse_sections("just a paragraph of prose", HEADINGS);
        assert!(sections.iter().all(Option::is_none));
    }

    #[test]
    fn test_empty_and_repeated_sections() {
        let text = "## Diagnosis\n\n## Guiding Policy\nfirst\n## Guiding Policy\nsecond";
        let sections = parse_sections(text, HEADINGS);
        assert_eq!(sections[0], None);
        assert_eq!(sections[1].as_deref(), Some("first"));
    }
}
