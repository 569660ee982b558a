use batrat_core::{AnalysisConfig, AnalysisResult, DataSession, clean};
use batrat_stats::{RegressionFitResult, fit_with};

pub fn run(
    session: &DataSession,
    config: &AnalysisConfig,
    outcome: &str,
    predictors: &[&str],
    json: bool,
) {
    let (model, dropped) = match compute(session, config, outcome, predictors) {
        Ok(v) => v,
        Err(e) => super::fail(&format!("logit {outcome}"), &e),
    };

    if json {
        match serde_json::to_string_pretty(&model) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Failed to serialize result: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if dropped > 0 {
        println!("{dropped} landing(s) with missing or invalid values were excluded.\n");
    }
    println!("{model}");
    let alpha = config.significance_level;
    for term in model.terms.iter().skip(1) {
        if let Some(p) = term.p_value {
            let verdict = if p < alpha { "significant" } else { "not significant" };
            println!("  {}: {verdict} at alpha = {alpha}", term.name);
        }
    }
}

/// Clean the landings on the outcome and every predictor, then fit.
pub fn compute(
    session: &DataSession,
    config: &AnalysisConfig,
    outcome: &str,
    predictors: &[&str],
) -> AnalysisResult<(RegressionFitResult, usize)> {
    let mut required = Vec::with_capacity(predictors.len() + 1);
    required.push(outcome);
    required.extend_from_slice(predictors);

    let cleaned = clean(session.landings(), &required)?;
    let model = fit_with(&cleaned, outcome, predictors, config)?;
    Ok((model, cleaned.dropped()))
}
