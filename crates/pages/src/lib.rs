//! Page objects for the municipal services portal
//!
//! One module per portal section. Each page object owns its section URL, its
//! link-expectation tables (visible label fragment mapped to expected URL
//! substring), and a `run_flow` that drives the section end to end through
//! the harness: open, verify landing, check links tab by tab.
//!
//! The [`runner::SuiteRunner`] sequences sections over a single browser
//! session and aggregates [`report`] types for the CLI.

pub mod business;
pub mod daycare;
pub mod education;
pub mod enforcement;
pub mod login;
pub mod parking;
pub mod report;
pub mod runner;
pub mod section;
pub mod street;
pub mod water;

pub use report::{SectionResult, SuiteResult, SuiteTotals};
pub use runner::{RunnerConfig, SuiteRunner};
pub use section::Section;
