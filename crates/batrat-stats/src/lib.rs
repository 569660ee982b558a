//! Inferential statistics for the bat landing observations.
//!
//! Two independent analyses run over records cleaned by
//! [`batrat_core::clean`]:
//!
//! - [`contingency`]: cross-tabulation of two categorical fields and the
//!   chi-square test of independence, flagged low-validity when expected
//!   counts are small.
//! - [`regression`]: logistic regression of a binary outcome on continuous
//!   predictors, fitted by IRLS with Wald inference and fit diagnostics.
//! - [`density`]: Gaussian kernel density estimate overlaid on histograms.
//!
//! ```no_run
//! use batrat_core::{DataSession, clean};
//! use batrat_stats::{analyze, fit};
//!
//! let session = DataSession::load("dataset1.csv", "dataset2.csv").unwrap();
//! let cleaned = clean(session.landings(), &["risk", "reward"]).unwrap();
//! let analysis = analyze(&cleaned, "risk", "reward").unwrap();
//! println!("chi2 = {:.3}, p = {:.4}", analysis.test.statistic, analysis.test.p_value);
//!
//! let predictors = ["seconds_after_rat_arrival", "hours_after_sunset"];
//! let mut required = vec!["risk"];
//! required.extend(predictors);
//! let cleaned = clean(session.landings(), &required).unwrap();
//! let model = fit(&cleaned, "risk", &predictors).unwrap();
//! println!("{model}");
//! ```

pub mod contingency;
pub mod density;
pub mod regression;

pub use contingency::{
    ContingencyAnalysis, ContingencyTable, IndependenceTestResult, Verdict, analyze, analyze_with,
    grouped_counts, independence_test,
};
pub use density::{KernelDensity, scott_bandwidth};
pub use regression::{CoefficientEstimate, INTERCEPT, RegressionFitResult, fit, fit_with};
