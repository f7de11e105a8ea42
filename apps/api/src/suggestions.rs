//! Suggestion generation: a fixed rule table mapping detected deficiencies
//! to parameterized recommendation text. Keyword suggestions come first,
//! then formatting/structure, then content; within each group the largest
//! score impact sorts first.

use serde::{Deserialize, Serialize};

use crate::extract::FormattingFlags;
use crate::scoring::ContentSignals;

const MAX_MISSING_LISTED: usize = 12;
const MAX_SEMANTIC_LISTED: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Suggestions {
    pub items: Vec<Suggestion>,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
enum Group {
    Keywords,
    Formatting,
    Content,
}

struct Rule {
    group: Group,
    impact: f64,
    suggestion: Suggestion,
}

pub fn build_suggestions(
    flags: &FormattingFlags,
    missing_keywords: &[String],
    semantic_misses: &[String],
    signals: &ContentSignals,
    jd_too_short: bool,
) -> Suggestions {
    let mut rules: Vec<Rule> = Vec::new();

    // ── keywords ──────────────────────────────────────────────────────

    if jd_too_short {
        rules.push(Rule {
            group: Group::Keywords,
            impact: 45.0,
            suggestion: Suggestion {
                kind: "keywords".to_string(),
                title: "Job description too short".to_string(),
                detail: "Paste a full job description (at least 2-3 paragraphs) to get \
                         accurate keyword matching."
                    .to_string(),
            },
        });
    }

    if !missing_keywords.is_empty() {
        let top: Vec<&str> = missing_keywords
            .iter()
            .take(MAX_MISSING_LISTED)
            .map(String::as_str)
            .collect();
        rules.push(Rule {
            group: Group::Keywords,
            impact: 31.5,
            suggestion: Suggestion {
                kind: "keywords".to_string(),
                title: "Add missing keywords (exact matches)".to_string(),
                detail: format!("Try adding where true: {}", top.join(", ")),
            },
        });
    }

    if !semantic_misses.is_empty() {
        let top: Vec<&str> = semantic_misses
            .iter()
            .take(MAX_SEMANTIC_LISTED)
            .map(String::as_str)
            .collect();
        rules.push(Rule {
            group: Group::Keywords,
            impact: 13.5,
            suggestion: Suggestion {
                kind: "keywords".to_string(),
                title: "Add related skills/terms (semantic misses)".to_string(),
                detail: format!(
                    "These appear in the job description but not in resume context: {}",
                    top.join(", ")
                ),
            },
        });
    }

    // ── formatting / structure ────────────────────────────────────────

    if flags.possible_multi_column_layout {
        rules.push(Rule {
            group: Group::Formatting,
            impact: 6.0,
            suggestion: Suggestion {
                kind: "formatting".to_string(),
                title: "Avoid multi-column layout".to_string(),
                detail: "ATS systems can misread columns. Use a single-column layout \
                         with simple headings."
                    .to_string(),
            },
        });
    }

    let missing_sections = &flags.section_presence.missing_core_sections;
    if !missing_sections.is_empty() {
        rules.push(Rule {
            group: Group::Formatting,
            impact: (2.0 * missing_sections.len() as f64).min(6.0),
            suggestion: Suggestion {
                kind: "structure".to_string(),
                title: "Add core sections".to_string(),
                detail: format!(
                    "Consider adding: {} with clear headings.",
                    missing_sections.join(", ")
                ),
            },
        });
    }

    if !flags.contact_info.email_detected {
        rules.push(Rule {
            group: Group::Formatting,
            impact: 5.0,
            suggestion: Suggestion {
                kind: "formatting".to_string(),
                title: "Add an email address".to_string(),
                detail: "Recruiters and ATS parsers expect a plain-text email address \
                         near the top of the resume."
                    .to_string(),
            },
        });
    }

    if !flags.contact_info.phone_detected {
        rules.push(Rule {
            group: Group::Formatting,
            impact: 3.0,
            suggestion: Suggestion {
                kind: "formatting".to_string(),
                title: "Add a phone number".to_string(),
                detail: "Include a phone number in plain text so contact parsing \
                         does not fail."
                    .to_string(),
            },
        });
    }

    if flags.uses_tables {
        rules.push(Rule {
            group: Group::Formatting,
            impact: 2.0,
            suggestion: Suggestion {
                kind: "formatting".to_string(),
                title: "Avoid tables for layout".to_string(),
                detail: "Table cells are often read out of order by ATS parsers. \
                         Move the content into plain lines."
                    .to_string(),
            },
        });
    }

    // ── content ───────────────────────────────────────────────────────

    if !signals.has_numbers {
        rules.push(Rule {
            group: Group::Content,
            impact: 10.0,
            suggestion: Suggestion {
                kind: "content".to_string(),
                title: "Quantify impact".to_string(),
                detail: "Add metrics: latency reduced, accuracy improved, cost reduced, \
                         users served, requests/day, etc."
                    .to_string(),
            },
        });
    }

    if signals.bullet_lines < 6 {
        rules.push(Rule {
            group: Group::Content,
            impact: 8.0,
            suggestion: Suggestion {
                kind: "content".to_string(),
                title: "Add more bullet points with impact".to_string(),
                detail: "Use 3-6 bullets per role/project focusing on outcomes, tools, \
                         and measurable results."
                    .to_string(),
            },
        });
    }

    if signals.action_verb_hits < 3 {
        rules.push(Rule {
            group: Group::Content,
            impact: if signals.action_verb_hits == 0 { 8.0 } else { 4.0 },
            suggestion: Suggestion {
                kind: "content".to_string(),
                title: "Lead bullets with action verbs".to_string(),
                detail: "Start each bullet with a verb such as built, reduced, or led \
                         to make ownership clear."
                    .to_string(),
            },
        });
    }

    // Stable sort: group order first, then severity within the group.
    rules.sort_by(|a, b| {
        a.group.cmp(&b.group).then(
            b.impact
                .partial_cmp(&a.impact)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });

    Suggestions {
        items: rules.into_iter().map(|r| r.suggestion).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ContactInfo, Readability, SectionPresence};

    fn clean_flags() -> FormattingFlags {
        FormattingFlags {
            file_type: "pdf".to_string(),
            contact_info: ContactInfo {
                email_detected: true,
                phone_detected: true,
                linkedin_detected: true,
            },
            possible_multi_column_layout: false,
            uses_tables: false,
            uses_images: false,
            section_presence: SectionPresence {
                detected_sections: vec!["skills".to_string()],
                missing_core_sections: Vec::new(),
            },
            readability: Readability {
                line_count: 40,
                short_line_ratio: 0.1,
            },
        }
    }

    fn strong_signals() -> ContentSignals {
        ContentSignals {
            bullet_lines: 12,
            has_numbers: true,
            action_verb_hits: 5,
        }
    }

    #[test]
    fn test_no_deficiencies_yields_no_suggestions() {
        let out = build_suggestions(&clean_flags(), &[], &[], &strong_signals(), false);
        assert!(out.items.is_empty());
    }

    #[test]
    fn test_missing_keywords_produce_suggestion() {
        let missing = vec!["kubernetes".to_string(), "terraform".to_string()];
        let out = build_suggestions(&clean_flags(), &missing, &[], &strong_signals(), false);
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].kind, "keywords");
        assert!(out.items[0].detail.contains("kubernetes"));
    }

    #[test]
    fn test_missing_keyword_list_is_truncated() {
        let missing: Vec<String> = (0..20).map(|i| format!("skill{i}")).collect();
        let out = build_suggestions(&clean_flags(), &missing, &[], &strong_signals(), false);
        assert!(out.items[0].detail.contains("skill11"));
        assert!(!out.items[0].detail.contains("skill12"));
    }

    #[test]
    fn test_group_order_keywords_formatting_content() {
        let mut flags = clean_flags();
        flags.possible_multi_column_layout = true;
        let weak = ContentSignals {
            bullet_lines: 0,
            has_numbers: false,
            action_verb_hits: 0,
        };
        let missing = vec!["rust".to_string()];
        let out = build_suggestions(&flags, &missing, &[], &weak, false);

        let kinds: Vec<&str> = out.items.iter().map(|s| s.kind.as_str()).collect();
        let first_keyword = kinds.iter().position(|k| *k == "keywords").unwrap();
        let first_formatting = kinds.iter().position(|k| *k == "formatting").unwrap();
        let first_content = kinds.iter().position(|k| *k == "content").unwrap();
        assert!(first_keyword < first_formatting);
        assert!(first_formatting < first_content);
    }

    #[test]
    fn test_too_short_hint_sorts_first() {
        let missing = vec!["rust".to_string()];
        let out = build_suggestions(&clean_flags(), &missing, &[], &strong_signals(), true);
        assert_eq!(out.items[0].title, "Job description too short");
    }

    #[test]
    fn test_severity_orders_within_formatting_group() {
        let mut flags = clean_flags();
        flags.possible_multi_column_layout = true; // impact 6
        flags.contact_info.phone_detected = false; // impact 3
        let out = build_suggestions(&flags, &[], &[], &strong_signals(), false);
        assert_eq!(out.items[0].title, "Avoid multi-column layout");
        assert_eq!(out.items[1].title, "Add a phone number");
    }

    #[test]
    fn test_content_rules_fire_for_weak_resume() {
        let weak = ContentSignals {
            bullet_lines: 2,
            has_numbers: false,
            action_verb_hits: 1,
        };
        let out = build_suggestions(&clean_flags(), &[], &[], &weak, false);
        let titles: Vec<&str> = out.items.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Quantify impact",
                "Add more bullet points with impact",
                "Lead bullets with action verbs"
            ]
        );
    }

    #[test]
    fn test_tables_flag_produces_formatting_suggestion() {
        let mut flags = clean_flags();
        flags.uses_tables = true;
        let out = build_suggestions(&flags, &[], &[], &strong_signals(), false);
        assert!(out.items.iter().any(|s| s.title == "Avoid tables for layout"));
    }
}
