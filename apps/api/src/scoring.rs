//! Score computation: pure, deterministic weighted arithmetic over keyword
//! coverage, formatting flags and content signals. Category caps are fixed:
//! keywords 45, formatting 25, content 30.

use serde::{Deserialize, Serialize};

use crate::extract::FormattingFlags;
use crate::keywords::{round2, word_present};

pub const KEYWORDS_MAX: f64 = 45.0;
pub const FORMATTING_MAX: f64 = 25.0;
pub const CONTENT_MAX: f64 = 30.0;

/// Blend of exact vs semantic keyword coverage inside the keyword bucket.
const EXACT_WEIGHT: f64 = 0.7;
const SEMANTIC_WEIGHT: f64 = 0.3;

const ACTION_VERBS: &[&str] = &[
    "built",
    "developed",
    "implemented",
    "designed",
    "optimized",
    "improved",
    "reduced",
    "increased",
    "deployed",
    "integrated",
    "automated",
    "led",
    "owned",
    "created",
    "delivered",
    "tested",
    "fine-tuned",
];

/// Lightweight writing-quality signals pulled from resume text.
#[derive(Debug, Clone, Default)]
pub struct ContentSignals {
    pub bullet_lines: usize,
    pub has_numbers: bool,
    pub action_verb_hits: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breakdown {
    pub keywords: f64,
    pub formatting: f64,
    pub content: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scores {
    pub total: f64,
    pub breakdown: Breakdown,
}

pub fn content_signals(text: &str) -> ContentSignals {
    let lower = text.to_lowercase();

    let bullet_lines = text
        .lines()
        .filter(|ln| {
            let s = ln.trim_start();
            s.starts_with('-') || s.starts_with('•') || s.starts_with('*')
        })
        .count();

    let action_verb_hits = ACTION_VERBS
        .iter()
        .filter(|v| word_present(&lower, v))
        .count();

    ContentSignals {
        bullet_lines,
        has_numbers: has_standalone_number(&lower),
        action_verb_hits,
    }
}

/// Combines the three category scores. Deterministic for identical inputs.
pub fn compute_scores(
    keyword_coverage: f64,
    semantic_coverage: f64,
    flags: &FormattingFlags,
    signals: &ContentSignals,
) -> Scores {
    let keywords = score_keywords(keyword_coverage, semantic_coverage);
    let formatting = round2(score_formatting(flags));
    let content = round2(score_content(signals));

    let total = round2((keywords + formatting + content).clamp(0.0, 100.0));

    Scores {
        total,
        breakdown: Breakdown {
            keywords,
            formatting,
            content,
        },
    }
}

/// 0..45, blended from exact (70%) and semantic (30%) coverage.
fn score_keywords(keyword_coverage: f64, semantic_coverage: f64) -> f64 {
    let kc = keyword_coverage.clamp(0.0, 100.0);
    let sc = semantic_coverage.clamp(0.0, 100.0);
    let combined = (EXACT_WEIGHT * kc + SEMANTIC_WEIGHT * sc).clamp(0.0, 100.0);
    round2(combined / 100.0 * KEYWORDS_MAX)
}

/// 0..25. Starts at the cap and subtracts fixed penalties per issue.
fn score_formatting(flags: &FormattingFlags) -> f64 {
    let mut score = FORMATTING_MAX;

    if !flags.contact_info.email_detected {
        score -= 5.0;
    }
    if !flags.contact_info.phone_detected {
        score -= 3.0;
    }

    let missing = flags.section_presence.missing_core_sections.len();
    if missing > 0 {
        score -= (2.0 * missing as f64).min(6.0);
    }

    if flags.possible_multi_column_layout {
        score -= 6.0;
    }

    score.clamp(0.0, FORMATTING_MAX)
}

/// 0..30. Rewards bullet structure, quantified impact and action verbs.
fn score_content(signals: &ContentSignals) -> f64 {
    let mut score = CONTENT_MAX;

    if signals.bullet_lines < 6 {
        score -= 8.0;
    } else if signals.bullet_lines < 12 {
        score -= 4.0;
    }

    if !signals.has_numbers {
        score -= 10.0;
    }

    if signals.action_verb_hits == 0 {
        score -= 8.0;
    } else if signals.action_verb_hits < 3 {
        score -= 4.0;
    }

    score.clamp(0.0, CONTENT_MAX)
}

/// A digit run starting at a non-alphanumeric boundary, so version strings
/// like "v2" don't count as quantified impact.
fn has_standalone_number(t: &str) -> bool {
    let mut prev: Option<char> = None;
    for c in t.chars() {
        if c.is_ascii_digit() && prev.map_or(true, |p| !p.is_alphanumeric()) {
            return true;
        }
        prev = Some(c);
    }
    false
}
