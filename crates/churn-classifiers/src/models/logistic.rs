use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::config::{ClassWeight, ModelConfig};
use crate::error::{ChurnError, Result};
use crate::models::classifier_trait::ClassifierModel;

/// Sufficient-decrease constant for the backtracking line search.
const ARMIJO: f64 = 1e-4;
const MAX_HALVINGS: usize = 40;

/// L2-penalised binary logistic regression fitted by Newton iterations.
///
/// Minimises `0.5 * ||w||^2 + C * sum_i s_i * logloss_i` where `s_i` is the
/// class weight of sample `i`. The intercept is not penalised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub config: ModelConfig,
    pub coefficients: Option<Array1<f64>>,
    pub intercept: Option<f64>,
    /// Newton iterations used by the last `fit`.
    pub n_iter: usize,
    pub converged: bool,
}

impl LogisticRegression {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            coefficients: None,
            intercept: None,
            n_iter: 0,
            converged: false,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some() && self.intercept.is_some()
    }

    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    fn parameters(&self) -> Result<(&Array1<f64>, f64)> {
        match (&self.coefficients, self.intercept) {
            (Some(coef), Some(intercept)) => Ok((coef, intercept)),
            _ => Err(ChurnError::NotFitted("logistic_regression")),
        }
    }

    /// Signed distance to the decision boundary, `x . w + b`.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (coef, intercept) = self.parameters()?;
        if x.ncols() != coef.len() {
            return Err(ChurnError::LengthMismatch {
                what: "feature columns",
                expected: coef.len(),
                actual: x.ncols(),
            });
        }
        Ok(x.dot(coef) + intercept)
    }
}

impl ClassifierModel for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
        let (n_samples, n_features) = x.dim();
        if n_samples != y.len() {
            return Err(ChurnError::LengthMismatch {
                what: "target vector",
                expected: n_samples,
                actual: y.len(),
            });
        }

        let sw = sample_weights(y, self.config.class_weight)?;
        let yf = y.mapv(f64::from);
        let c = self.config.c;
        let grad_scale = c * sw.sum();

        let mut design = Array2::<f64>::ones((n_samples, n_features + 1));
        design.slice_mut(s![.., ..n_features]).assign(x);

        let mut penalty = Array1::<f64>::ones(n_features + 1);
        penalty[n_features] = 0.0;

        let mut beta = Array1::<f64>::zeros(n_features + 1);
        let mut loss = objective(&design, &yf, &sw, &beta, c, n_features);
        let mut converged = false;
        let mut n_iter = 0;

        while n_iter < self.config.max_iter {
            let (prob, grad) = gradient(&design, &yf, &sw, &beta, &penalty, c);
            if max_abs(&grad) / grad_scale <= self.config.tol {
                converged = true;
                break;
            }
            n_iter += 1;

            let curvature = prob.mapv(|p| p * (1.0 - p)) * &sw * c;
            let weighted = &design * &curvature.view().insert_axis(Axis(1));
            let mut hessian = design.t().dot(&weighted);
            for j in 0..=n_features {
                hessian[[j, j]] += penalty[j];
            }

            let Some(step) = cholesky_solve(&hessian, &grad) else {
                log::warn!("Hessian is not positive definite at iteration {}; stopping", n_iter);
                break;
            };

            let slope = grad.dot(&step);
            let mut t = 1.0;
            let mut accepted = false;
            for _ in 0..MAX_HALVINGS {
                let candidate = &beta - &(&step * t);
                let candidate_loss = objective(&design, &yf, &sw, &candidate, c, n_features);
                if candidate_loss <= loss - ARMIJO * t * slope {
                    beta = candidate;
                    loss = candidate_loss;
                    accepted = true;
                    break;
                }
                t *= 0.5;
            }
            if !accepted {
                log::debug!("Line search made no progress at iteration {}", n_iter);
                break;
            }
        }

        // The last permitted step may itself reach tolerance.
        if !converged && n_iter == self.config.max_iter {
            let (_, grad) = gradient(&design, &yf, &sw, &beta, &penalty, c);
            converged = max_abs(&grad) / grad_scale <= self.config.tol;
        }

        if !converged {
            log::warn!(
                "LogisticRegression did not converge within {} iterations (max_iter={}); \
                 the fitted model may be suboptimal",
                n_iter,
                self.config.max_iter
            );
        } else {
            log::debug!("LogisticRegression converged after {} iterations", n_iter);
        }

        self.coefficients = Some(beta.slice(s![..n_features]).to_owned());
        self.intercept = Some(beta[n_features]);
        self.n_iter = n_iter;
        self.converged = converged;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>> {
        Ok(self.decision_function(x)?.mapv(|z| u8::from(z > 0.0)))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }

    fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    fn name(&self) -> &'static str {
        "logistic_regression"
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

/// Fitted probabilities and the gradient of the penalised objective at `beta`.
fn gradient(
    design: &Array2<f64>,
    y: &Array1<f64>,
    sw: &Array1<f64>,
    beta: &Array1<f64>,
    penalty: &Array1<f64>,
    c: f64,
) -> (Array1<f64>, Array1<f64>) {
    let prob = design.dot(beta).mapv(sigmoid);
    let residual = (&prob - y) * sw * c;
    let grad = design.t().dot(&residual) + beta * penalty;
    (prob, grad)
}

fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0f64, |m, g| m.max(g.abs()))
}

fn objective(
    design: &Array2<f64>,
    y: &Array1<f64>,
    sw: &Array1<f64>,
    beta: &Array1<f64>,
    c: f64,
    n_features: usize,
) -> f64 {
    let z = design.dot(beta);
    let data_loss: f64 = z
        .iter()
        .zip(y.iter())
        .zip(sw.iter())
        .map(|((&zi, &yi), &si)| si * (softplus(zi) - yi * zi))
        .sum();
    let w = beta.slice(s![..n_features]);
    0.5 * w.dot(&w) + c * data_loss
}

/// Per-sample weights. Both classes must be present.
fn sample_weights(y: &Array1<u8>, class_weight: ClassWeight) -> Result<Array1<f64>> {
    let n = y.len();
    let positives = y.iter().filter(|&&v| v == 1).count();
    let negatives = n - positives;
    for (class, count) in [(0u8, negatives), (1u8, positives)] {
        if count == 0 {
            return Err(ChurnError::EmptyClass {
                class,
                partition: "training",
            });
        }
    }
    Ok(match class_weight {
        ClassWeight::Uniform => Array1::ones(n),
        ClassWeight::Balanced => {
            let w_pos = n as f64 / (2.0 * positives as f64);
            let w_neg = n as f64 / (2.0 * negatives as f64);
            y.mapv(|v| if v == 1 { w_pos } else { w_neg })
        }
    })
}

/// Solve the symmetric positive-definite system `a x = b`.
/// Retries once with a small ridge when `a` is numerically singular.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    if let Some(l) = cholesky_factor(a) {
        return Some(substitute(&l, b));
    }
    let n = a.nrows();
    let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
    let mut a_reg = a.clone();
    for k in 0..n {
        a_reg[[k, k]] += ridge.max(f64::EPSILON);
    }
    cholesky_factor(&a_reg).map(|l| substitute(&l, b))
}

fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Forward then backward substitution through `L L^T`.
fn substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }
    x
}
