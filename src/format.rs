//! Markdown rendering of session output for the terminal.

use crate::analyze::{DeepDive, select_top};
use crate::region::{country_counts, country_name, region_group};
use crate::search::{HarvestSource, LocalizedQueries, SearchResult};
use crate::session::SessionOutcome;

/// Escape characters that break Markdown link syntax: `[`, `]`, `(`, `)`.
fn escape_md_link(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '[' | ']' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Newlines would break a heading; flatten them.
fn one_line(s: &str) -> String {
    s.replace(['\n', '\r'], " ")
}

fn format_signal(rank: usize, r: &SearchResult) -> String {
    let mut line = format!(
        "{rank}. [P{priority}] [{category}] [{title}]({link})",
        priority = r.rank(),
        category = r.category_or_default(),
        title = escape_md_link(&one_line(r.display_title())),
        link = escape_md_link(&r.link),
    );
    line.push_str(&format!("\n   {} | {}", r.source, r.date.as_deref().unwrap_or("Recent")));
    let snippet = r.display_snippet();
    if !snippet.is_empty() {
        line.push_str(&format!("\n   {}", one_line(snippet)));
    }
    line.push('\n');
    line
}

fn format_coverage(results: &[SearchResult], out: &mut String) {
    let counts = country_counts(results);
    if counts.is_empty() {
        return;
    }
    out.push_str("## Coverage\n\n| Country | Region | Results |\n|---------|--------|---------|\n");
    for (code, count) in &counts {
        out.push_str(&format!(
            "| {} | {} | {count} |\n",
            country_name(code),
            region_group(Some(code)).as_str()
        ));
    }
    out.push('\n');
}

pub fn format_outcome(outcome: &SessionOutcome, top: usize) -> String {
    let mut out = format!("# Market intelligence: {}\n\n", one_line(&outcome.query));

    if outcome.source == HarvestSource::Fallback {
        out.push_str("> **Note:** live search returned nothing; showing cached intelligence.\n\n");
    }

    out.push_str(outcome.report.trim());
    out.push_str("\n\n---\n\n");

    out.push_str(&format!(
        "## Top signals ({} of {})\n\n",
        top.min(outcome.results.len()),
        outcome.results.len()
    ));
    for (i, r) in select_top(&outcome.results, top).into_iter().enumerate() {
        out.push_str(&format_signal(i + 1, r));
    }
    out.push('\n');

    format_coverage(&outcome.results, &mut out);
    out
}

pub fn format_localized(query: &str, localized: &LocalizedQueries) -> String {
    let mut out = format!(
        "# Localized queries: {}\n\n| Locale | Query |\n|--------|-------|\n",
        one_line(query)
    );
    for (locale, text) in localized.iter() {
        out.push_str(&format!("| {locale} | {} |\n", text.replace('|', "\\|")));
    }
    out
}

pub fn format_dive(article: &SearchResult, dive: &DeepDive) -> String {
    format!(
        "# {}\n\n{}\n\n## Summary\n\n{}\n\n## Why it matters\n\n{}\n",
        one_line(&article.title),
        article.link,
        dive.extended_summary.trim(),
        dive.importance.trim()
    )
}
