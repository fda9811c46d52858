//! Section splitting
//!
//! A line of the form `Section <digits>:` opens a new section titled with
//! the text after the first colon. Lines before the first marker belong to
//! an implicit "Introduction" section. Sections with blank content are
//! dropped.

use crate::models::Section;

/// Title of the implicit leading section
pub const INTRODUCTION_TITLE: &str = "Introduction";

/// Split raw document text into titled sections, in document order
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut title = INTRODUCTION_TITLE.to_string();
    let mut content = String::new();

    for line in text.split('\n') {
        if let Some(next_title) = section_marker_title(line) {
            push_if_not_blank(&mut sections, title, content);
            title = next_title.to_string();
            content = String::new();
        } else {
            content.push_str(line);
            content.push('\n');
        }
    }
    push_if_not_blank(&mut sections, title, content);

    sections
}

/// Title for a `Section <digits>:` line, or `None` for ordinary text
fn section_marker_title(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("Section ")?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || rest.as_bytes().get(digits) != Some(&b':') {
        return None;
    }
    line.split_once(':').map(|(_, title)| title.trim())
}

fn push_if_not_blank(sections: &mut Vec<Section>, title: String, content: String) {
    if !content.trim().is_empty() {
        sections.push(Section { title, content });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_markers_yields_single_introduction() {
        let sections = split_sections("This agreement is made.\nBetween two parties.\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, INTRODUCTION_TITLE);
        assert_eq!(sections[0].content, "This agreement is made.\nBetween two parties.\n\n");
    }

    #[test]
    fn test_blank_text_yields_nothing() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("   \n\t\n  ").is_empty());
    }

    #[test]
    fn test_marker_titles_and_content() {
        let text = "Preamble text\nSection 1: Liability\nThe legal exposure is severe.\nSection 2:   Payment Terms  \nNet 30.\n";
        let sections = split_sections(text);

        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Introduction", "Liability", "Payment Terms"]);
        assert_eq!(sections[1].content, "The legal exposure is severe.\n");
        assert_eq!(sections[2].content, "Net 30.\n\n");
    }

    #[test]
    fn test_empty_introduction_is_dropped() {
        let sections = split_sections("Section 1: Liability\nThe legal exposure is severe.\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Liability");
    }

    #[test]
    fn test_empty_sections_are_dropped() {
        let sections = split_sections("Section 1: Empty\n\n   \nSection 2: Full\ntext\nSection 3: Trailing\n");
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Full"]);
    }

    #[test]
    fn test_title_after_first_colon_only() {
        let sections = split_sections("Section 12: Term: Renewal\nauto-renews\n");
        assert_eq!(sections[0].title, "Term: Renewal");
    }

    #[test]
    fn test_non_markers_stay_in_content() {
        // No digits, missing colon, indented, lowercase
        let text = "Section A: nope\nSection 3 missing colon\n  Section 4: indented\nsection 5: lower\n";
        let sections = split_sections(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, INTRODUCTION_TITLE);
        assert!(sections[0].content.contains("Section A: nope\n"));
        assert!(sections[0].content.contains("  Section 4: indented\n"));
    }
}
