//! Suite result types
//!
//! Serializable aggregates the runner builds and the CLI renders / writes to
//! disk as JSON.

use std::path::{Path, PathBuf};

use serde::Serialize;

use muniqa_harness::{HarnessResult, LinkReport, Verdict};

use crate::section::Section;

/// Result of one portal section's flow.
#[derive(Debug, Clone, Serialize)]
pub struct SectionResult {
    pub section: Section,
    pub reports: Vec<LinkReport>,
    /// Error that aborted the section flow itself (navigation, search flow),
    /// as opposed to individual link failures.
    pub flow_error: Option<String>,
    /// Section had no URL configured and was not visited.
    pub skipped: bool,
    pub duration_ms: u64,
}

impl SectionResult {
    pub fn skipped(section: Section) -> Self {
        Self {
            section,
            reports: Vec::new(),
            flow_error: None,
            skipped: true,
            duration_ms: 0,
        }
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.reports.iter().filter(|r| r.verdict == verdict).count()
    }

    /// A section fails on any Fail verdict or a flow error.
    pub fn failed(&self) -> bool {
        self.flow_error.is_some() || self.reports.iter().any(|r| r.verdict == Verdict::Fail)
    }
}

/// Aggregate counters over all sections.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SuiteTotals {
    pub links_checked: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
    pub sections_run: usize,
    pub sections_skipped: usize,
    pub sections_failed: usize,
}

/// Result of the whole run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteResult {
    pub totals: SuiteTotals,
    pub sections: Vec<SectionResult>,
    pub duration_ms: u64,
}

impl SuiteResult {
    pub fn from_sections(sections: Vec<SectionResult>, duration_ms: u64) -> Self {
        let mut totals = SuiteTotals::default();
        for section in &sections {
            if section.skipped {
                totals.sections_skipped += 1;
                continue;
            }
            totals.sections_run += 1;
            if section.failed() {
                totals.sections_failed += 1;
            }
            totals.links_checked += section.reports.len();
            totals.passed += section.count(Verdict::Pass);
            totals.warned += section.count(Verdict::Warn);
            totals.failed += section.count(Verdict::Fail);
        }
        Self {
            totals,
            sections,
            duration_ms,
        }
    }

    /// Warnings do not fail the suite; Fail verdicts and flow errors do.
    pub fn success(&self) -> bool {
        self.totals.sections_failed == 0
    }

    /// Write the result as pretty JSON under `dir`, returning the file path.
    pub fn write_to(&self, dir: &Path) -> HarnessResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join("results.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muniqa_harness::LinkOutcome;

    fn report(verdict: Verdict) -> LinkReport {
        LinkReport {
            label: "קישור".into(),
            expected_part: "part".into(),
            outcome: match verdict {
                Verdict::Pass => LinkOutcome::PassedHref,
                Verdict::Warn => LinkOutcome::UrlMismatch {
                    expected: "a".into(),
                    actual: "b".into(),
                },
                Verdict::Fail => LinkOutcome::NotFound,
            },
            verdict,
            duration_ms: 1,
            screenshot: None,
        }
    }

    fn section(section: Section, verdicts: &[Verdict]) -> SectionResult {
        SectionResult {
            section,
            reports: verdicts.iter().map(|v| report(*v)).collect(),
            flow_error: None,
            skipped: false,
            duration_ms: 5,
        }
    }

    #[test]
    fn totals_aggregate_verdicts() {
        let result = SuiteResult::from_sections(
            vec![
                section(Section::Parking, &[Verdict::Pass, Verdict::Warn]),
                section(Section::Water, &[Verdict::Pass, Verdict::Fail]),
                SectionResult::skipped(Section::Business),
            ],
            100,
        );
        assert_eq!(result.totals.links_checked, 4);
        assert_eq!(result.totals.passed, 2);
        assert_eq!(result.totals.warned, 1);
        assert_eq!(result.totals.failed, 1);
        assert_eq!(result.totals.sections_run, 2);
        assert_eq!(result.totals.sections_skipped, 1);
        assert_eq!(result.totals.sections_failed, 1);
        assert!(!result.success());
    }

    #[test]
    fn warnings_alone_do_not_fail_the_suite() {
        let result = SuiteResult::from_sections(
            vec![section(Section::Daycare, &[Verdict::Pass, Verdict::Warn])],
            10,
        );
        assert!(result.success());
    }

    #[test]
    fn flow_error_fails_the_section() {
        let mut s = section(Section::Street, &[]);
        s.flow_error = Some("search flow broke".into());
        assert!(s.failed());
    }

    #[test]
    fn writes_results_json() {
        let dir = tempfile::tempdir().unwrap();
        let result = SuiteResult::from_sections(vec![], 0);
        let path = result.write_to(dir.path()).unwrap();
        let raw = std::fs::read_to_string(path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["totals"]["links_checked"], 0);
    }
}
