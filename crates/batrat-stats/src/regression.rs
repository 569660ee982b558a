//! Binary logistic regression by iteratively reweighted least squares.
//!
//! The model is `P(y = 1 | x) = σ(β₀ + β·x)`, fitted by Newton-Raphson on the
//! log-likelihood. Each step solves `(XᵀWX) Δ = Xᵀ(y − p)` with
//! `W = diag(p(1 − p))`, and the loop stops once `‖Δ‖₂` falls below the
//! configured tolerance or the iteration cap is reached.
//!
//! Non-convergence is a result flag, not an error. A singular information
//! matrix at the final estimate, or a perfectly separated outcome, is a
//! [`AnalysisError::SingularModel`].

use std::fmt;

use nalgebra::{Cholesky, DMatrix, DVector, Dyn};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

use batrat_core::{
    AnalysisConfig, AnalysisError, AnalysisResult, FieldKind, FieldSpec, Record, SchemaError,
    Value, label_order,
};

/// Name of the implicit intercept term.
pub const INTERCEPT: &str = "const";

/// Relative pivot threshold below which the information matrix is singular.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Fitted probabilities this close to every observed outcome mean the data
/// are perfectly separated.
const SEPARATION_TOLERANCE: f64 = 1e-8;

/// One model term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientEstimate {
    pub name: String,
    pub estimate: f64,
    pub standard_error: Option<f64>,
    /// Wald statistic `estimate / standard_error`.
    pub z: Option<f64>,
    pub p_value: Option<f64>,
    /// 95% Wald confidence interval.
    pub conf_int: Option<(f64, f64)>,
    /// Zero-variance predictor, excluded from estimation.
    pub aliased: bool,
}

/// Summary of a logistic regression fit.
///
/// Coefficients and likelihoods are not meaningful when `converged` is
/// false; callers must label them as unreliable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionFitResult {
    pub outcome: String,
    /// Outcome label mapped to 1.
    pub positive_label: String,
    pub negative_label: String,
    /// Intercept first, then predictors in request order.
    pub terms: Vec<CoefficientEstimate>,
    pub log_likelihood: f64,
    /// Log-likelihood of the intercept-only model.
    pub null_log_likelihood: f64,
    /// McFadden's `1 − ℓ / ℓ₀`.
    pub pseudo_r_squared: f64,
    /// Likelihood-ratio statistic against the intercept-only model.
    pub llr: f64,
    pub llr_p_value: Option<f64>,
    pub aic: f64,
    pub bic: f64,
    pub converged: bool,
    pub iterations: usize,
    pub n_observations: usize,
    pub df_model: usize,
    pub df_resid: usize,
}

impl RegressionFitResult {
    pub fn term(&self, name: &str) -> Option<&CoefficientEstimate> {
        self.terms.iter().find(|t| t.name == name)
    }

    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.term(name).map(|t| t.estimate)
    }

    pub fn standard_error(&self, name: &str) -> Option<f64> {
        self.term(name).and_then(|t| t.standard_error)
    }

    pub fn p_value(&self, name: &str) -> Option<f64> {
        self.term(name).and_then(|t| t.p_value)
    }

    /// `(term, estimate)` pairs in model order.
    pub fn coefficients(&self) -> Vec<(&str, f64)> {
        self.terms
            .iter()
            .map(|t| (t.name.as_str(), t.estimate))
            .collect()
    }
}

impl fmt::Display for RegressionFitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Logit: {} (1 = {}, 0 = {})",
            self.outcome, self.positive_label, self.negative_label
        )?;
        writeln!(
            f,
            "No. observations: {:>8}   Df model: {:>3}   Df residuals: {}",
            self.n_observations, self.df_model, self.df_resid
        )?;
        writeln!(
            f,
            "Log-likelihood:   {:>8.3}   LL-null:  {:>8.3}   Pseudo R²: {:.4}",
            self.log_likelihood, self.null_log_likelihood, self.pseudo_r_squared
        )?;
        match self.llr_p_value {
            Some(p) => writeln!(f, "LLR:              {:>8.3}   LLR p:    {:>8.4}", self.llr, p)?,
            None => writeln!(f, "LLR:              {:>8.3}", self.llr)?,
        }
        writeln!(
            f,
            "AIC:              {:>8.3}   BIC:      {:>8.3}",
            self.aic, self.bic
        )?;
        writeln!(
            f,
            "Converged: {} ({} iterations)",
            if self.converged { "yes" } else { "NO" },
            self.iterations
        )?;

        let w = self
            .terms
            .iter()
            .map(|t| t.name.len())
            .max()
            .unwrap_or(5)
            .max(5);
        writeln!(
            f,
            "{:<w$}  {:>10}  {:>10}  {:>8}  {:>8}  {:>10}  {:>10}",
            "term", "coef", "std err", "z", "P>|z|", "[0.025", "0.975]"
        )?;
        for t in &self.terms {
            write!(f, "{:<w$}  {:>10.4}", t.name, t.estimate)?;
            if t.aliased {
                writeln!(f, "  (aliased: zero variance)")?;
                continue;
            }
            match (t.standard_error, t.z, t.p_value, t.conf_int) {
                (Some(se), Some(z), Some(p), Some((lo, hi))) => writeln!(
                    f,
                    "  {se:>10.4}  {z:>8.3}  {p:>8.4}  {lo:>10.4}  {hi:>10.4}"
                )?,
                _ => writeln!(f)?,
            }
        }
        if !self.converged {
            write!(
                f,
                "WARNING: the fit did not converge; coefficients are unreliable"
            )?;
        }
        Ok(())
    }
}

/// Fit `outcome ~ const + predictors` with default settings.
pub fn fit<R: Record>(
    records: &[R],
    outcome: &str,
    predictors: &[&str],
) -> AnalysisResult<RegressionFitResult> {
    fit_with(records, outcome, predictors, &AnalysisConfig::default())
}

/// [`fit`] with explicit tolerance and iteration cap.
pub fn fit_with<R: Record>(
    records: &[R],
    outcome: &str,
    predictors: &[&str],
    config: &AnalysisConfig,
) -> AnalysisResult<RegressionFitResult> {
    if records.is_empty() {
        return Err(SchemaError::EmptyInput.into());
    }

    let outcome_field = R::Field::parse(outcome)?;
    if outcome_field.kind() == FieldKind::Text {
        return Err(SchemaError::WrongKind {
            field: outcome_field.name(),
            expected: FieldKind::Categorical,
        }
        .into());
    }
    let predictor_fields = predictors
        .iter()
        .map(|p| R::Field::parse(p)?.require_kind(FieldKind::Continuous))
        .collect::<Result<Vec<_>, _>>()?;

    let labels = outcome_labels(records, outcome_field)?;
    let (positive, negative) = binary_labels(outcome_field, labels)?;

    let mut y = Vec::with_capacity(records.len());
    let mut columns = vec![Vec::with_capacity(records.len()); predictor_fields.len()];
    for (index, record) in records.iter().enumerate() {
        let missing = |field: R::Field| SchemaError::MissingValue {
            field: field.name(),
            index,
        };
        let label = record
            .value(outcome_field)
            .map(|v| v.to_string())
            .ok_or_else(|| missing(outcome_field))?;
        y.push(if outcome_field.same_category(&label, &positive) {
            1.0
        } else {
            0.0
        });
        for (col, &field) in columns.iter_mut().zip(&predictor_fields) {
            match record.value(field) {
                Some(Value::Number(v)) if v.is_finite() => col.push(v),
                _ => return Err(missing(field).into()),
            }
        }
    }

    // Zero-variance predictors are aliased with the intercept.
    let aliased: Vec<bool> = columns.iter().map(|c| is_constant(c)).collect();
    for (field, _) in predictor_fields.iter().zip(&aliased).filter(|(_, a)| **a) {
        log::warn!(
            "{} has zero variance; dropped from the model as aliased with the intercept",
            field.name()
        );
    }

    let n = y.len();
    let kept: Vec<&Vec<f64>> = columns
        .iter()
        .zip(&aliased)
        .filter(|(_, a)| !**a)
        .map(|(c, _)| c)
        .collect();
    let k = 1 + kept.len();
    let design = DMatrix::from_fn(n, k, |i, j| if j == 0 { 1.0 } else { kept[j - 1][i] });
    let y = DVector::from_vec(y);

    let estimate = irls(&design, &y, config);
    if !estimate.converged {
        log::warn!(
            "logit {} did not converge after {} iterations",
            outcome_field.name(),
            estimate.iterations
        );
    }

    let beta = estimate.beta;
    let probs = (&design * &beta).map(sigmoid);
    let worst_residual = (&y - &probs).amax();
    if worst_residual < SEPARATION_TOLERANCE {
        return Err(AnalysisError::SingularModel(format!(
            "{} is perfectly separated by the predictors",
            outcome_field.name()
        )));
    }

    let covariance = factor_information(&design, &probs)
        .ok_or_else(|| {
            AnalysisError::SingularModel("information matrix is singular at the estimate".into())
        })?
        .inverse();
    let se = covariance.diagonal().map(f64::sqrt);

    let log_likelihood = log_likelihood(&design, &y, &beta);
    let ybar = y.mean();
    let null_log_likelihood = n as f64 * (ybar * ybar.ln() + (1.0 - ybar) * (1.0 - ybar).ln());
    let df_model = k - 1;
    let llr = 2.0 * (log_likelihood - null_log_likelihood);
    let llr_p_value = if df_model > 0 {
        ChiSquared::new(df_model as f64)
            .ok()
            .map(|d| d.sf(llr.max(0.0)).clamp(0.0, 1.0))
    } else {
        None
    };

    let normal = Normal::standard();
    let z_crit = normal.inverse_cdf(0.975);
    let wald = |name: String, b: f64, s: f64| {
        let z = b / s;
        CoefficientEstimate {
            name,
            estimate: b,
            standard_error: Some(s),
            z: Some(z),
            p_value: Some((2.0 * normal.sf(z.abs())).clamp(0.0, 1.0)),
            conf_int: Some((b - z_crit * s, b + z_crit * s)),
            aliased: false,
        }
    };

    let mut terms = Vec::with_capacity(1 + predictor_fields.len());
    terms.push(wald(INTERCEPT.to_string(), beta[0], se[0]));
    let mut j = 1;
    for (field, &is_aliased) in predictor_fields.iter().zip(&aliased) {
        if is_aliased {
            terms.push(CoefficientEstimate {
                name: field.name().to_string(),
                estimate: 0.0,
                standard_error: None,
                z: None,
                p_value: None,
                conf_int: None,
                aliased: true,
            });
        } else {
            terms.push(wald(field.name().to_string(), beta[j], se[j]));
            j += 1;
        }
    }

    log::debug!(
        "logit {}: ll={:.4}, iterations={}, converged={}",
        outcome_field.name(),
        log_likelihood,
        estimate.iterations,
        estimate.converged
    );

    Ok(RegressionFitResult {
        outcome: outcome_field.name().to_string(),
        positive_label: positive,
        negative_label: negative,
        terms,
        log_likelihood,
        null_log_likelihood,
        pseudo_r_squared: 1.0 - log_likelihood / null_log_likelihood,
        llr,
        llr_p_value,
        aic: -2.0 * log_likelihood + 2.0 * k as f64,
        bic: -2.0 * log_likelihood + k as f64 * (n as f64).ln(),
        converged: estimate.converged,
        iterations: estimate.iterations,
        n_observations: n,
        df_model,
        df_resid: n.saturating_sub(k),
    })
}

// ---------------------------------------------------------------------------
// Outcome coding
// ---------------------------------------------------------------------------

fn outcome_labels<R: Record>(records: &[R], field: R::Field) -> Result<Vec<String>, SchemaError> {
    let mut labels: Vec<String> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let label = record
            .value(field)
            .map(|v| v.to_string())
            .ok_or(SchemaError::MissingValue {
                field: field.name(),
                index,
            })?;
        // Spellings of one class (`1`, `1.0`) count once.
        if !labels.iter().any(|l| field.same_category(l, &label)) {
            labels.push(label);
        }
    }
    Ok(labels)
}

/// Split two distinct labels into (positive, negative). The vocabulary
/// decides when it recognises both; otherwise the larger label is positive.
fn binary_labels<F: FieldSpec>(
    field: F,
    mut labels: Vec<String>,
) -> Result<(String, String), SchemaError> {
    if labels.len() != 2 {
        return Err(SchemaError::NotBinary {
            field: field.name(),
            distinct: labels.len(),
        });
    }
    labels.sort_by(|a, b| label_order(a, b).then_with(|| a.cmp(b)));
    let hi = labels.pop().unwrap_or_default();
    let lo = labels.pop().unwrap_or_default();

    if let Some(vocab) = field.vocabulary() {
        match (vocab.classify(&lo), vocab.classify(&hi)) {
            (Some(true), Some(false)) => return Ok((lo, hi)),
            (Some(false), Some(true)) => return Ok((hi, lo)),
            _ => {}
        }
    }
    Ok((hi, lo))
}

// ---------------------------------------------------------------------------
// Numerics
// ---------------------------------------------------------------------------

struct IrlsEstimate {
    beta: DVector<f64>,
    iterations: usize,
    converged: bool,
}

fn irls(design: &DMatrix<f64>, y: &DVector<f64>, config: &AnalysisConfig) -> IrlsEstimate {
    let mut beta = DVector::zeros(design.ncols());
    let mut iterations = 0;
    let mut converged = false;

    for iter in 1..=config.max_iterations {
        let probs = (design * &beta).map(sigmoid);
        let Some(chol) = factor_information(design, &probs) else {
            log::debug!("information matrix singular at iteration {iter}");
            break;
        };

        let score = design.tr_mul(&(y - &probs));
        let delta = chol.solve(&score);
        let next = &beta + &delta;
        if next.iter().any(|b| !b.is_finite()) {
            break;
        }
        beta = next;
        iterations = iter;

        if delta.norm() < config.tolerance {
            converged = true;
            break;
        }
    }

    IrlsEstimate {
        beta,
        iterations,
        converged,
    }
}

/// `XᵀWX` with `W = diag(p(1 − p))`.
fn information(design: &DMatrix<f64>, probs: &DVector<f64>) -> DMatrix<f64> {
    let mut weighted = design.clone();
    for (mut row, p) in weighted.row_iter_mut().zip(probs.iter()) {
        row *= p * (1.0 - p);
    }
    design.tr_mul(&weighted)
}

/// Cholesky factor of the information matrix, or `None` when it is not
/// numerically positive definite: a squared pivot at or below
/// [`PIVOT_TOLERANCE`] times its diagonal entry marks a column that is
/// (nearly) a combination of earlier ones.
fn factor_information(
    design: &DMatrix<f64>,
    probs: &DVector<f64>,
) -> Option<Cholesky<f64, Dyn>> {
    let info = information(design, probs);
    let diagonal = info.diagonal();
    if diagonal.iter().any(|d| !(d.is_finite() && *d > 0.0)) {
        return None;
    }
    let chol = Cholesky::new(info)?;
    let l = chol.l_dirty();
    let full_rank = diagonal
        .iter()
        .enumerate()
        .all(|(j, &d)| l[(j, j)] * l[(j, j)] > PIVOT_TOLERANCE * d);
    full_rank.then_some(chol)
}

fn log_likelihood(design: &DMatrix<f64>, y: &DVector<f64>, beta: &DVector<f64>) -> f64 {
    (design * beta)
        .iter()
        .zip(y.iter())
        .map(|(eta, yi)| yi * eta - softplus(*eta))
        .sum()
}

fn sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let e = eta.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + eᵗ)` without overflow.
fn softplus(t: f64) -> f64 {
    if t > 0.0 {
        t + (-t).exp().ln_1p()
    } else {
        t.exp().ln_1p()
    }
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use batrat_core::ObservationRecord;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn landing(risk: &str, seconds: f64, hours: f64) -> ObservationRecord {
        ObservationRecord {
            risk: Some(risk.to_string()),
            seconds_after_rat_arrival: Some(seconds),
            hours_after_sunset: Some(hours),
            ..Default::default()
        }
    }

    /// x = 0: 3 of 10 positive; x = 1: 7 of 10 positive.
    fn two_group_data() -> Vec<ObservationRecord> {
        let mut data = Vec::new();
        for (x, positives) in [(0.0, 3), (1.0, 7)] {
            for i in 0..10 {
                let risk = if i < positives { "1" } else { "0" };
                data.push(landing(risk, x, 1.0));
            }
        }
        data
    }

    #[test]
    fn saturated_two_group_model_matches_closed_form() {
        let fit = fit(&two_group_data(), "risk", &["seconds_after_rat_arrival"]).unwrap();
        assert!(fit.converged);
        assert_eq!(fit.n_observations, 20);
        assert_eq!(fit.positive_label, "1");

        let b0 = (3.0f64 / 7.0).ln();
        let b1 = 2.0 * (7.0f64 / 3.0).ln();
        assert!((fit.coefficient(INTERCEPT).unwrap() - b0).abs() < 1e-6);
        assert!((fit.coefficient("seconds_after_rat_arrival").unwrap() - b1).abs() < 1e-6);

        let se0 = (1.0f64 / 3.0 + 1.0 / 7.0).sqrt();
        let se1 = (2.0 * (1.0f64 / 3.0 + 1.0 / 7.0)).sqrt();
        assert!((fit.standard_error(INTERCEPT).unwrap() - se0).abs() < 1e-6);
        assert!((fit.standard_error("seconds_after_rat_arrival").unwrap() - se1).abs() < 1e-6);

        let ll = 2.0 * (3.0 * 0.3f64.ln() + 7.0 * 0.7f64.ln());
        assert!((fit.log_likelihood - ll).abs() < 1e-8);
        assert!((fit.null_log_likelihood - 20.0 * 0.5f64.ln()).abs() < 1e-10);
        assert!((fit.llr - 2.0 * (ll - 20.0 * 0.5f64.ln())).abs() < 1e-8);
        assert_eq!(fit.df_model, 1);
        assert_eq!(fit.df_resid, 18);
        assert!((fit.aic - (-2.0 * ll + 4.0)).abs() < 1e-8);
    }

    #[test]
    fn wald_statistics_are_consistent() {
        let fit = fit(&two_group_data(), "risk", &["seconds_after_rat_arrival"]).unwrap();
        let t = fit.term("seconds_after_rat_arrival").unwrap();
        let (se, z, p) = (
            t.standard_error.unwrap(),
            t.z.unwrap(),
            t.p_value.unwrap(),
        );
        assert!((z - t.estimate / se).abs() < 1e-12);
        // |z| ≈ 1.736, two-sided p ≈ 0.083
        assert!(p > 0.05 && p < 0.1);
        let (lo, hi) = t.conf_int.unwrap();
        assert!(lo < t.estimate && t.estimate < hi);
        assert!((hi - lo - 2.0 * 1.959_963_984_540_054 * se).abs() < 1e-6);
    }

    #[test]
    fn constant_predictor_is_aliased() {
        let mut data = Vec::new();
        for i in 0..20 {
            data.push(landing(if i % 2 == 0 { "1" } else { "0" }, i as f64, 2.5));
        }
        let fit = fit(&data, "risk", &["hours_after_sunset"]).unwrap();
        assert!(fit.converged);
        let term = fit.term("hours_after_sunset").unwrap();
        assert!(term.aliased);
        assert_eq!(term.estimate, 0.0);
        assert!(term.standard_error.is_none());
        assert!(fit.coefficient(INTERCEPT).unwrap().abs() < 1e-9);
        assert!(fit.standard_error(INTERCEPT).unwrap().is_finite());
        assert_eq!(fit.df_model, 0);
        assert!(fit.llr_p_value.is_none());
    }

    #[test]
    fn separable_data_never_converges_silently() {
        let data: Vec<_> = (0..10)
            .map(|i| landing(if i >= 5 { "1" } else { "0" }, i as f64, 1.0))
            .collect();
        match fit(&data, "risk", &["seconds_after_rat_arrival"]) {
            Err(AnalysisError::SingularModel(_)) => {}
            Ok(result) => assert!(!result.converged),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn collinear_predictors_are_singular() {
        let data: Vec<_> = (0..12)
            .map(|i| {
                let x = (i % 4) as f64;
                landing(if i % 3 == 0 { "1" } else { "0" }, x, 2.0 * x)
            })
            .collect();
        assert!(matches!(
            fit(
                &data,
                "risk",
                &["seconds_after_rat_arrival", "hours_after_sunset"]
            ),
            Err(AnalysisError::SingularModel(_))
        ));
    }

    #[test]
    fn information_factor_rejects_collapsed_pivots() {
        let probs = DVector::from_element(4, 0.5);

        let design = DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
        let chol = factor_information(&design, &probs).unwrap();
        let product = information(&design, &probs) * chol.inverse();
        assert!((product - DMatrix::identity(2, 2)).amax() < 1e-12);

        // Second column is a tiny perturbation of the intercept.
        let design = DMatrix::from_row_slice(
            4,
            2,
            &[1.0, 1.0, 1.0, 1.0 + 1e-7, 1.0, 1.0, 1.0, 1.0],
        );
        assert!(factor_information(&design, &probs).is_none());
    }

    #[test]
    fn refitting_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(17);
        let data: Vec<_> = (0..200)
            .map(|_| {
                let seconds: f64 = rng.random::<f64>() * 10.0;
                let hours: f64 = rng.random::<f64>() * 6.0;
                let p = sigmoid(-1.0 + 0.3 * seconds - 0.2 * hours);
                let risk = if rng.random::<f64>() < p { "1" } else { "0" };
                landing(risk, seconds, hours)
            })
            .collect();
        let predictors = ["seconds_after_rat_arrival", "hours_after_sunset"];
        let a = fit(&data, "risk", &predictors).unwrap();
        let b = fit(&data, "risk", &predictors).unwrap();
        assert!(a.converged);
        assert_eq!(a.coefficients(), b.coefficients());
        assert!(a.pseudo_r_squared > 0.0 && a.pseudo_r_squared < 1.0);
        assert!(a.iterations < 20);
    }

    #[test]
    fn vocabulary_decides_positive_label() {
        let data: Vec<_> = (0..8)
            .map(|i| {
                let risk = if i % 3 == 0 { "risk-taking" } else { "risk-avoidance" };
                landing(risk, i as f64, 1.0)
            })
            .collect();
        let fit = fit(&data, "risk", &["seconds_after_rat_arrival"]).unwrap();
        assert_eq!(fit.positive_label, "risk-taking");
        assert_eq!(fit.negative_label, "risk-avoidance");
    }

    #[test]
    fn spellings_of_one_class_code_alike() {
        let respelled: Vec<_> = two_group_data()
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| {
                if i % 2 == 0 {
                    r.risk = r.risk.map(|l| format!("{l}.0"));
                }
                r
            })
            .collect();
        let mixed = fit(&respelled, "risk", &["seconds_after_rat_arrival"]).unwrap();
        let plain = fit(&two_group_data(), "risk", &["seconds_after_rat_arrival"]).unwrap();
        assert_eq!(mixed.n_observations, 20);
        for (a, b) in mixed.coefficients().iter().zip(plain.coefficients()) {
            assert!((a.1 - b.1).abs() < 1e-9);
        }

        let worded: Vec<_> = (0..12)
            .map(|i| {
                let risk = ["yes", "Yes", "no", "NO"][i % 4];
                landing(risk, (i % 5) as f64, 1.0)
            })
            .collect();
        let fit = fit(&worded, "risk", &["seconds_after_rat_arrival"]).unwrap();
        assert_eq!(fit.positive_label.to_ascii_lowercase(), "yes");
        assert_eq!(fit.negative_label.to_ascii_lowercase(), "no");
    }

    #[test]
    fn outcome_must_be_binary() {
        let data = vec![landing("0", 1.0, 1.0), landing("0", 2.0, 1.0)];
        assert_eq!(
            fit(&data, "risk", &["seconds_after_rat_arrival"]).unwrap_err(),
            AnalysisError::Schema(SchemaError::NotBinary {
                field: "risk",
                distinct: 1
            })
        );
    }

    #[test]
    fn predictors_must_be_continuous() {
        let data = two_group_data();
        assert!(matches!(
            fit(&data, "risk", &["season"]),
            Err(AnalysisError::Schema(SchemaError::WrongKind { .. }))
        ));
        assert!(matches!(
            fit(&data, "risk", &["wingspan"]),
            Err(AnalysisError::Schema(SchemaError::UnknownField(_)))
        ));
        assert!(matches!(
            fit(&data, "start_time", &["seconds_after_rat_arrival"]),
            Err(AnalysisError::Schema(SchemaError::WrongKind { .. }))
        ));
    }

    #[test]
    fn missing_predictor_is_rejected() {
        let mut data = two_group_data();
        data[4].seconds_after_rat_arrival = None;
        assert_eq!(
            fit(&data, "risk", &["seconds_after_rat_arrival"]).unwrap_err(),
            AnalysisError::Schema(SchemaError::MissingValue {
                field: "seconds_after_rat_arrival",
                index: 4
            })
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        let data: Vec<ObservationRecord> = Vec::new();
        assert_eq!(
            fit(&data, "risk", &[]).unwrap_err(),
            AnalysisError::Schema(SchemaError::EmptyInput)
        );
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let config = AnalysisConfig {
            max_iterations: 1,
            ..Default::default()
        };
        let fit = fit_with(&two_group_data(), "risk", &["seconds_after_rat_arrival"], &config)
            .unwrap();
        assert!(!fit.converged);
        assert_eq!(fit.iterations, 1);
        assert!(fit.to_string().contains("did not converge"));
    }

    #[test]
    fn sigmoid_and_softplus_are_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!((sigmoid(800.0) - 1.0).abs() < 1e-15);
        assert!((softplus(800.0) - 800.0).abs() < 1e-9);
        assert!(softplus(-800.0) >= 0.0);
    }
}
