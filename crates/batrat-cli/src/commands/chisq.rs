use batrat_core::{AnalysisConfig, AnalysisResult, DataSession, clean};
use batrat_stats::{ContingencyAnalysis, analyze_with};

pub fn run(session: &DataSession, config: &AnalysisConfig, row: &str, col: &str, json: bool) {
    let (analysis, dropped) = match compute(session, config, row, col) {
        Ok(v) => v,
        Err(e) => super::fail(&format!("{row} x {col}"), &e),
    };

    if json {
        let verdict = analysis.verdict(config.significance_level);
        let doc = serde_json::json!({
            "dropped_records": dropped,
            "significance_level": config.significance_level,
            "verdict": verdict,
            "analysis": analysis,
        });
        match serde_json::to_string_pretty(&doc) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Failed to serialize result: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if dropped > 0 {
        println!("{dropped} landing(s) without a valid {row}/{col} were excluded.\n");
    }
    print!("{}", render(&analysis, config.significance_level));
}

/// Clean the landings on both fields and run the independence test.
pub fn compute(
    session: &DataSession,
    config: &AnalysisConfig,
    row: &str,
    col: &str,
) -> AnalysisResult<(ContingencyAnalysis, usize)> {
    let cleaned = clean(session.landings(), &[row, col])?;
    let analysis = analyze_with(&cleaned, row, col, config)?;
    Ok((analysis, cleaned.dropped()))
}

/// Cross-tabulation, test statistics and verdict as plain text.
pub fn render(analysis: &ContingencyAnalysis, alpha: f64) -> String {
    let test = &analysis.test;
    let mut out = format!("{}\n\n", analysis.table);
    out.push_str(&format!("Chi-square statistic: {:.4}\n", test.statistic));
    out.push_str(&format!("Degrees of freedom:   {}\n", test.degrees_of_freedom));
    out.push_str(&format!("p-value:              {:.6}\n", test.p_value));
    if test.yates_corrected {
        out.push_str("(Yates continuity correction applied)\n");
    }
    out.push_str(&format!(
        "{} (alpha = {alpha})\n",
        analysis.verdict(alpha).message()
    ));
    if analysis.low_validity {
        out.push_str(&format!(
            "WARNING: smallest expected count is {:.2}; the chi-square approximation is unreliable\n",
            test.min_expected
        ));
    }
    out
}
