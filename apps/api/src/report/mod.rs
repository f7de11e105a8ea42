//! Report rendering: analysis result → self-contained HTML document.
//!
//! The output embeds all styling inline so the downloaded file opens
//! anywhere without assets. The seam is fallible: a backend that converts
//! through an external engine surfaces `Render` errors here, and the
//! pipeline keeps the job alive with the download disabled.

use chrono::Utc;

use crate::analysis::AnalysisResult;
use crate::errors::AppError;

const MAX_LISTED_KEYWORDS: usize = 25;
const MAX_LISTED_MATCHES: usize = 8;
const MAX_LISTED_SUGGESTIONS: usize = 10;
const MAX_LINE_PREVIEW: usize = 140;

const REPORT_CSS: &str = "\
body { font-family: ui-sans-serif, system-ui, -apple-system, 'Segoe UI', Roboto, Arial; \
background: #070A12; color: #E7E9EE; margin: 0; padding: 24px; }\n\
.wrap { max-width: 980px; margin: 0 auto; }\n\
.panel { background: rgba(255,255,255,0.03); border: 1px solid rgba(255,255,255,0.08); \
border-radius: 16px; padding: 14px; margin-top: 14px; }\n\
.kpi { font-size: 34px; font-weight: 800; }\n\
.muted { color: rgba(231,233,238,0.7); font-size: 13px; }\n\
.gold { color: #D4AF37; }\n\
.pill { display: inline-block; padding: 6px 10px; margin-right: 8px; border-radius: 999px; \
border: 1px solid rgba(255,255,255,0.1); background: rgba(0,0,0,0.15); font-size: 13px; }\n\
.card { background: rgba(255,255,255,0.03); border: 1px solid rgba(255,255,255,0.08); \
border-radius: 16px; padding: 12px; margin-bottom: 10px; }\n\
.tag { display: inline-block; font-size: 11px; padding: 4px 8px; border-radius: 999px; \
border: 1px solid rgba(212,175,55,0.35); color: #D4AF37; background: rgba(212,175,55,0.08); \
margin-bottom: 6px; }\n\
.title { font-weight: 700; margin-bottom: 4px; }\n\
.detail { color: rgba(231,233,238,0.75); font-size: 13px; line-height: 1.4; }\n\
table { width: 100%; border-collapse: collapse; font-size: 13px; }\n\
th, td { border: 1px solid rgba(255,255,255,0.1); padding: 8px; text-align: left; \
vertical-align: top; }\n\
ul { margin: 8px 0 0 18px; }\n";

pub fn render_html_report(result: &AnalysisResult) -> Result<String, AppError> {
    let generated = Utc::now().format("%Y-%m-%d %H:%M UTC");
    let scores = &result.scores;
    let kw = &result.keyword_analysis;
    let flags = &result.formatting_flags;

    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n");
    html.push_str("<title>ATS Report</title>\n<style>\n");
    html.push_str(REPORT_CSS);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"wrap\">\n");

    // header
    html.push_str("<div class=\"panel\">\n");
    html.push_str(&format!("<div class=\"muted\">Generated: {generated}</div>\n"));
    html.push_str("<h1 style=\"margin:8px 0 0; font-size: 22px;\">ATS Compatibility Report</h1>\n");
    html.push_str(&format!(
        "<div class=\"muted\">Filename: {}</div>\n</div>\n",
        escape_html(&result.filename)
    ));

    // score KPIs
    html.push_str("<div class=\"panel\">\n<div class=\"muted\">Overall ATS Score</div>\n");
    html.push_str(&format!(
        "<div class=\"kpi\"><span class=\"gold\">{}</span><span class=\"muted\"> / 100</span></div>\n",
        scores.total
    ));
    html.push_str(&format!(
        "<div style=\"margin-top:10px;\">\
         <span class=\"pill\">Keywords: <span class=\"gold\">{}</span>/45</span>\
         <span class=\"pill\">Formatting: <span class=\"gold\">{}</span>/25</span>\
         <span class=\"pill\">Content: <span class=\"gold\">{}</span>/30</span>\
         </div>\n</div>\n",
        scores.breakdown.keywords, scores.breakdown.formatting, scores.breakdown.content
    ));

    // quick flags
    html.push_str("<div class=\"panel\">\n<div class=\"muted\">Quick Flags</div>\n<ul>\n");
    html.push_str(&format!(
        "<li>Possible multi-column layout: {}</li>\n",
        flags.possible_multi_column_layout
    ));
    html.push_str(&format!("<li>Uses tables: {}</li>\n", flags.uses_tables));
    let missing_sections = &flags.section_presence.missing_core_sections;
    html.push_str(&format!(
        "<li>Missing core sections: {}</li>\n",
        if missing_sections.is_empty() {
            "none".to_string()
        } else {
            escape_html(&missing_sections.join(", "))
        }
    ));
    html.push_str(&format!(
        "<li>Email detected: {}</li>\n<li>Phone detected: {}</li>\n</ul>\n</div>\n",
        flags.contact_info.email_detected, flags.contact_info.phone_detected
    ));

    // keyword lists
    html.push_str("<div class=\"panel\">\n<div class=\"muted\">Keywords Present</div>\n");
    html.push_str(&format!("<ul>{}</ul>\n</div>\n", list_items(&kw.present)));
    html.push_str("<div class=\"panel\">\n<div class=\"muted\">Keywords Missing</div>\n");
    html.push_str(&format!("<ul>{}</ul>\n</div>\n", list_items(&kw.missing)));
    html.push_str(&format!(
        "<div class=\"panel\"><div class=\"muted\">Coverage: {:.2}% exact, {:.2}% semantic</div></div>\n",
        kw.coverage, kw.semantic_coverage
    ));

    // semantic matches
    html.push_str("<div class=\"panel\">\n<div class=\"muted\">Semantic Context Matches</div>\n");
    if kw.semantic_matches.is_empty() {
        html.push_str("<div class=\"detail\">none</div>\n");
    } else {
        html.push_str("<table>\n<tr><th>Keyword</th><th>Match</th><th>Best Resume Line</th></tr>\n");
        for m in kw.semantic_matches.iter().take(MAX_LISTED_MATCHES) {
            let mut line = m.best_line.clone();
            if line.chars().count() > MAX_LINE_PREVIEW {
                line = line.chars().take(MAX_LINE_PREVIEW).collect::<String>() + "...";
            }
            html.push_str(&format!(
                "<tr><td>{}</td><td>{:.0}%</td><td>{}</td></tr>\n",
                escape_html(&m.keyword),
                f64::from(m.score.clamp(0.0, 1.0)) * 100.0,
                escape_html(&line)
            ));
        }
        html.push_str("</table>\n");
    }
    html.push_str("</div>\n");

    // suggestions
    html.push_str("<div class=\"panel\">\n<div class=\"muted\">Recommendations</div>\n<div style=\"margin-top:10px;\">\n");
    if result.suggestions.items.is_empty() {
        html.push_str("<div class=\"detail\">none</div>\n");
    } else {
        for s in result.suggestions.items.iter().take(MAX_LISTED_SUGGESTIONS) {
            html.push_str(&format!(
                "<div class=\"card\"><div class=\"tag\">{}</div>\
                 <div class=\"title\">{}</div><div class=\"detail\">{}</div></div>\n",
                escape_html(&s.kind.to_uppercase()),
                escape_html(&s.title),
                escape_html(&s.detail)
            ));
        }
    }
    html.push_str("</div>\n</div>\n");

    html.push_str("</div>\n</body>\n</html>\n");
    Ok(html)
}

fn list_items(items: &[String]) -> String {
    if items.is_empty() {
        return "<li>none</li>".to_string();
    }
    items
        .iter()
        .take(MAX_LISTED_KEYWORDS)
        .map(|x| format!("<li>{}</li>", escape_html(x)))
        .collect()
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
