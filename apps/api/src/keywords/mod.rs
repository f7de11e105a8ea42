//! Keyword engine: candidate extraction from a job description, exact
//! present/missing matching against resume text, and embedding-backed
//! semantic matching for the terms literal matching misses.

use aho_corasick::AhoCorasick;
use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::embedding::{cosine_similarity, Embedder};
use crate::errors::AppError;

/// Cap on terms pulled out of a job description.
pub const MAX_JD_TERMS: usize = 80;
/// Cap on skill terms extracted from the resume for semantic comparison.
const MAX_RESUME_TERMS: usize = 140;
/// Cap on resume lines kept for best-line matching.
const MAX_RESUME_LINES: usize = 180;
/// Lines shorter than this carry too little context to embed.
const MIN_LINE_LEN: usize = 18;
/// Semantic matches reported back to the client, highest score first.
const TOP_SEMANTIC_MATCHES: usize = 12;
/// Job descriptions below this word count are treated as absent.
const MIN_JD_WORDS: usize = 12;

/// Curated skill/tool vocabulary. Doubles as the fallback keyword set when
/// no job description is supplied.
const SKILL_PATTERNS: &[&str] = &[
    // cloud/devops
    "aws",
    "azure",
    "gcp",
    "google cloud",
    "kubernetes",
    "docker",
    "jenkins",
    "github actions",
    "gitlab ci",
    "terraform",
    "ansible",
    "helm",
    "argocd",
    "gitops",
    "prometheus",
    "grafana",
    "linux",
    "nginx",
    "apache",
    "vault",
    // languages/frameworks
    "python",
    "java",
    "javascript",
    "typescript",
    "rust",
    "golang",
    "react",
    "node.js",
    "spring boot",
    "graphql",
    // data/ai
    "pytorch",
    "tensorflow",
    "scikit-learn",
    "nlp",
    "llm",
    "rag",
    "langchain",
    "kafka",
    "spark",
    // db
    "postgresql",
    "mysql",
    "mongodb",
    "redis",
    "elasticsearch",
];

const STOPWORDS: &[&str] = &[
    "and",
    "or",
    "to",
    "with",
    "in",
    "of",
    "for",
    "a",
    "an",
    "the",
    "using",
    "experience",
    "strong",
    "skills",
    "knowledge",
    "ability",
    "responsible",
    "responsibilities",
    "requirements",
    "preferred",
    "must",
    "should",
    "role",
    "position",
    "job",
];

/// Tokens a free-text candidate must contain to look like a skill or tool
/// rather than prose.
const TECH_HINTS: &[&str] = &[
    "+", "#", ".", "-", "ci", "sql", "cloud", "kube", "docker", "git",
];

/// Literal present/missing partition over a keyword set. The two lists are
/// disjoint and together cover every extracted keyword.
#[derive(Debug, Clone, Default)]
pub struct ExactMatches {
    pub present: Vec<String>,
    pub missing: Vec<String>,
    /// Percentage of keywords literally present, 0..100.
    pub coverage: f64,
}

/// A near-match found by embedding similarity for a single keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticMatch {
    pub keyword: String,
    /// Cosine similarity, 0..1.
    pub score: f32,
    /// Best-scoring resume line, empty when a skill term won instead.
    pub best_line: String,
}

#[derive(Debug, Clone, Default)]
pub struct SemanticAnalysis {
    pub matches: Vec<SemanticMatch>,
    pub hits: Vec<String>,
    pub misses: Vec<String>,
    /// Percentage of keywords with a semantic hit, 0..100.
    pub coverage: f64,
}

/// Compiled matchers plus the fallback vocabulary. Built once at startup
/// and shared through `AppState`.
pub struct KeywordEngine {
    curated: AhoCorasick,
    patterns: Vec<String>,
    candidate_re: Regex,
    rule_line_re: Regex,
    fallback: Vec<String>,
}

impl KeywordEngine {
    /// `fallback` overrides the built-in skill list for no-JD analyses.
    pub fn new(fallback: Option<Vec<String>>) -> anyhow::Result<Self> {
        let patterns: Vec<String> = SKILL_PATTERNS.iter().map(|s| s.to_string()).collect();

        let curated = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .context("failed to build skill pattern matcher")?;

        let fallback = match fallback {
            Some(list) => unique_keep_order(
                list.into_iter()
                    .map(|t| normalize_term(&t))
                    .filter(|t| !t.is_empty())
                    .collect(),
            ),
            None => patterns.clone(),
        };

        Ok(Self {
            curated,
            patterns,
            candidate_re: Regex::new(r"[a-z0-9+#.\-]{2,}(?:\s+[a-z0-9+#.\-]{2,}){0,3}")?,
            rule_line_re: Regex::new(r"^[-•*_=]{3,}$")?,
            fallback,
        })
    }

    /// Extracts skill/tool terms from free text, in first-occurrence order:
    /// curated vocabulary hits first pass, tech-looking free candidates
    /// second, stopword-filtered and deduplicated.
    pub fn extract_terms(&self, text: &str, max_terms: usize) -> Vec<String> {
        let low = text.to_lowercase();
        let mut found: Vec<String> = Vec::new();

        for m in self.curated.find_overlapping_iter(&low) {
            found.push(self.patterns[m.pattern().as_usize()].clone());
        }

        for m in self.candidate_re.find_iter(&low) {
            let cand = normalize_term(m.as_str());
            if cand.len() < 2 || cand.len() > 40 {
                continue;
            }
            if TECH_HINTS.iter().any(|h| cand.contains(h)) {
                found.push(cand);
            }
        }

        unique_keep_order(found)
            .into_iter()
            .filter(|t| !STOPWORDS.contains(&t.as_str()))
            .filter(|t| !t.split_whitespace().all(|w| STOPWORDS.contains(&w)))
            .take(max_terms)
            .collect()
    }

    /// The keyword set used when no (usable) job description is supplied.
    pub fn fallback_terms(&self) -> Vec<String> {
        self.fallback.clone()
    }

    /// Case-insensitive literal matching. Single-word keywords require word
    /// boundaries; multiword keywords match as substrings.
    pub fn exact_match(&self, resume_text: &str, jd_keywords: &[String]) -> ExactMatches {
        let rt = resume_text.to_lowercase();

        let mut present = Vec::new();
        let mut missing = Vec::new();

        for kw in jd_keywords {
            let k = normalize_term(kw);
            if k.is_empty() {
                continue;
            }
            let hit = if k.contains(' ') {
                rt.contains(&k)
            } else {
                word_present(&rt, &k)
            };
            if hit {
                present.push(k);
            } else {
                missing.push(k);
            }
        }

        let present = unique_keep_order(present);
        let missing = unique_keep_order(missing);

        let total = present.len() + missing.len();
        let coverage = if total > 0 {
            round2(present.len() as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        ExactMatches {
            present,
            missing,
            coverage,
        }
    }

    /// Embedding-based matching of JD terms against resume skill terms and
    /// resume lines. A term scores its best cosine across both sets; when a
    /// line wins, it is kept as the match preview.
    pub async fn semantic_match(
        &self,
        resume_text: &str,
        jd_terms: &[String],
        embedder: &dyn Embedder,
        threshold: f32,
    ) -> Result<SemanticAnalysis, AppError> {
        let jd_terms = unique_keep_order(
            jd_terms
                .iter()
                .map(|t| normalize_term(t))
                .filter(|t| !t.is_empty())
                .collect(),
        );
        if jd_terms.is_empty() {
            return Ok(SemanticAnalysis::default());
        }

        let resume_terms = self.extract_terms(resume_text, MAX_RESUME_TERMS);
        let resume_lines = self.clean_resume_lines(resume_text);

        if resume_terms.is_empty() && resume_lines.is_empty() {
            return Ok(SemanticAnalysis {
                matches: Vec::new(),
                hits: Vec::new(),
                misses: jd_terms,
                coverage: 0.0,
            });
        }

        let jd_emb = embed(embedder, &jd_terms).await?;
        let term_emb = embed(embedder, &resume_terms).await?;
        let line_emb = embed(embedder, &resume_lines).await?;

        let mut matches = Vec::with_capacity(jd_terms.len());
        let mut hits = Vec::new();
        let mut misses = Vec::new();

        for (i, term) in jd_terms.iter().enumerate() {
            let mut best_score = 0.0_f32;
            let mut best_line = String::new();

            for term_vec in &term_emb {
                let s = cosine_similarity(&jd_emb[i], term_vec);
                if s > best_score {
                    best_score = s;
                }
            }
            for (j, line_vec) in line_emb.iter().enumerate() {
                let s = cosine_similarity(&jd_emb[i], line_vec);
                if s > best_score {
                    best_score = s;
                    best_line = resume_lines[j].clone();
                }
            }

            let best_score = best_score.clamp(0.0, 1.0);
            if best_score >= threshold {
                hits.push(term.clone());
            } else {
                misses.push(term.clone());
            }
            matches.push(SemanticMatch {
                keyword: term.clone(),
                score: best_score,
                best_line,
            });
        }

        let total = hits.len() + misses.len();
        let coverage = if total > 0 {
            round2(hits.len() as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        // Stable sort keeps extraction order for equal scores.
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(TOP_SEMANTIC_MATCHES);

        Ok(SemanticAnalysis {
            matches,
            hits,
            misses,
            coverage,
        })
    }

    /// Short, meaningful resume lines for best-line matching.
    fn clean_resume_lines(&self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for ln in text.lines() {
            let s = collapse_ws(ln);
            if s.len() < MIN_LINE_LEN {
                continue;
            }
            if self.rule_line_re.is_match(&s) {
                continue;
            }
            lines.push(s);
            if lines.len() == MAX_RESUME_LINES {
                break;
            }
        }
        lines
    }
}

async fn embed(embedder: &dyn Embedder, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }
    embedder
        .embed_batch(texts)
        .await
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))
}

/// Whether the supplied job description is too small to extract keywords
/// from; such inputs fall back to the static keyword set.
pub fn jd_is_too_short(jd: &str) -> bool {
    jd.split_whitespace().count() < MIN_JD_WORDS
}

pub(crate) fn normalize_term(s: &str) -> String {
    collapse_ws(&s.to_lowercase())
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn unique_keep_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if item.is_empty() || !seen.insert(item.clone()) {
            continue;
        }
        out.push(item);
    }
    out
}

/// Case-sensitive whole-word containment: the needle must not touch an
/// alphanumeric character on either side. Callers lowercase both sides.
pub(crate) fn word_present(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let abs = start + pos;
        let end = abs + needle.len();
        let before_ok = haystack[..abs]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = end;
    }
    false
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
