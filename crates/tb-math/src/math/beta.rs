//! Beta distribution CDF and quantile for conversion-rate posteriors.
//!
//! The CDF uses the regularized incomplete beta function with
//! a continued-fraction approximation (Numerical Recipes), iterated to
//! near machine precision so quantiles are stable enough for reporting.

use super::stable::log_beta;

const BETACF_MAX_ITERS: usize = 300;
const BETACF_EPS: f64 = 1.0e-15;
const BETACF_FPMIN: f64 = 1.0e-300;

const INV_CDF_MAX_ITERS: usize = 200;
const INV_CDF_TOL: f64 = 1.0e-13;

fn invalid_shape(alpha: f64, beta: f64) -> bool {
    alpha.is_nan() || beta.is_nan() || alpha <= 0.0 || beta <= 0.0
}

/// Regularized incomplete beta function I_x(a,b), i.e. P(X <= x).
pub fn beta_cdf(x: f64, alpha: f64, beta: f64) -> f64 {
    if x.is_nan() || invalid_shape(alpha, beta) {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let bt = (alpha * x.ln() + beta * (-x).ln_1p() - log_beta(alpha, beta)).exp();
    let threshold = (alpha + 1.0) / (alpha + beta + 2.0);
    let cdf = if x < threshold {
        bt * betacf(alpha, beta, x) / alpha
    } else {
        1.0 - bt * betacf(beta, alpha, 1.0 - x) / beta
    };
    cdf.clamp(0.0, 1.0)
}

/// Inverse CDF (quantile) for Beta(alpha, beta).
///
/// Bisection on the CDF; the CDF is monotone so this always converges.
pub fn beta_inv_cdf(p: f64, alpha: f64, beta: f64) -> f64 {
    if p.is_nan() || invalid_shape(alpha, beta) {
        return f64::NAN;
    }
    if p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }

    let mut low = 0.0;
    let mut high = 1.0;
    let mut mid = 0.5;
    for _ in 0..INV_CDF_MAX_ITERS {
        mid = 0.5 * (low + high);
        let cdf = beta_cdf(mid, alpha, beta);
        if cdf.is_nan() {
            return f64::NAN;
        }
        let delta = cdf - p;
        if delta.abs() < INV_CDF_TOL || high - low < f64::EPSILON {
            return mid;
        }
        if delta < 0.0 {
            low = mid;
        } else {
            high = mid;
        }
    }
    mid
}

/// Continued fraction for the incomplete beta function (modified Lentz).
fn betacf(alpha: f64, beta: f64, x: f64) -> f64 {
    let qab = alpha + beta;
    let qap = alpha + 1.0;
    let qam = alpha - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < BETACF_FPMIN {
        d = BETACF_FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=BETACF_MAX_ITERS {
        let m_f = m as f64;
        let m2 = 2.0 * m_f;
        let aa = m_f * (beta - m_f) * x / ((qam + m2) * (alpha + m2));
        d = 1.0 + aa * d;
        if d.abs() < BETACF_FPMIN {
            d = BETACF_FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < BETACF_FPMIN {
            c = BETACF_FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(alpha + m_f) * (qab + m_f) * x / ((alpha + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < BETACF_FPMIN {
            d = BETACF_FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < BETACF_FPMIN {
            c = BETACF_FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < BETACF_EPS {
            break;
        }
    }

    h
}
