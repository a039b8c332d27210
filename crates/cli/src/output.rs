//! Output formatting for the CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use muniqa_harness::{LinkOutcome, Verdict};
use muniqa_pages::{SectionResult, SuiteResult};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// JSON document
    Json,
    /// Plain line-per-link text
    Plain,
}

pub fn print_suite(result: &SuiteResult, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            for section in &result.sections {
                print_section_table(section);
            }
            print_totals(result);
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(result).unwrap_or_default()
            );
        }
        OutputFormat::Plain => {
            for section in &result.sections {
                if section.skipped {
                    println!("{}: skipped", section.section);
                    continue;
                }
                for report in &section.reports {
                    println!(
                        "{}\t{}\t{}",
                        section.section,
                        verdict_word(report.verdict),
                        report.label
                    );
                }
                if let Some(err) = &section.flow_error {
                    println!("{}\tflow-error\t{}", section.section, err);
                }
            }
        }
    }
}

fn print_section_table(section: &SectionResult) {
    if section.skipped {
        println!("{} {}", "⏭".dimmed(), format!("{}: skipped", section.section).dimmed());
        return;
    }

    println!("\n{}", format!("── {} ──", section.section).bold());
    if let Some(err) = &section.flow_error {
        println!("{} flow error: {}", "❌".red(), err);
    }
    if section.reports.is_empty() {
        println!("(no link checks)");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Verdict", "Link", "Outcome", "ms"]);
    for report in &section.reports {
        table.add_row(vec![
            verdict_cell(report.verdict),
            report.label.clone(),
            outcome_summary(&report.outcome),
            report.duration_ms.to_string(),
        ]);
    }
    println!("{table}");
}

fn print_totals(result: &SuiteResult) {
    let t = &result.totals;
    println!(
        "\n{} {} links: {} {} {} {} {} {} ({} sections run, {} skipped, {:.1}s)",
        "Σ".bold(),
        t.links_checked,
        t.passed.to_string().green(),
        "passed".green(),
        t.warned.to_string().yellow(),
        "warned".yellow(),
        t.failed.to_string().red(),
        "failed".red(),
        t.sections_run,
        t.sections_skipped,
        result.duration_ms as f64 / 1000.0
    );
}

fn verdict_cell(verdict: Verdict) -> String {
    match verdict {
        Verdict::Pass => "✅".to_string(),
        Verdict::Warn => "⚠️".to_string(),
        Verdict::Fail => "❌".to_string(),
    }
}

fn verdict_word(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "pass",
        Verdict::Warn => "warn",
        Verdict::Fail => "fail",
    }
}

fn outcome_summary(outcome: &LinkOutcome) -> String {
    match outcome {
        LinkOutcome::PassedHref => "href matched".to_string(),
        LinkOutcome::PassedClick => "opened in new tab".to_string(),
        LinkOutcome::SameWindow { url_matched, .. } => {
            if *url_matched {
                "navigated in place (URL ok)".to_string()
            } else {
                "navigated in place to wrong URL".to_string()
            }
        }
        LinkOutcome::UrlMismatch { actual, .. } => {
            format!("opened but URL differs: …{}", tail(actual, 30))
        }
        LinkOutcome::NotFound => "element not found".to_string(),
        LinkOutcome::ClickFailed { reason } => format!("click failed: {}", tail(reason, 40)),
    }
}

fn tail(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    let skip = count - n;
    let (idx, _) = s.char_indices().nth(skip).unwrap_or((0, ' '));
    &s[idx..]
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message);
}

pub fn print_success(message: &str) {
    println!("{} {}", "✅".green(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_respects_char_boundaries() {
        // Hebrew URLs are multi-byte; a byte slice at the wrong offset
        // would panic.
        let s = "Documents/טופס ויתור סודיות .pdf";
        let t = tail(s, 10);
        assert_eq!(t.chars().count(), 10);
    }

    #[test]
    fn tail_returns_short_strings_whole() {
        assert_eq!(tail("abc", 10), "abc");
    }
}
