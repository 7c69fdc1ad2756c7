// 📐 Statistics - Student's t-test
// Pooled-variance two-sample test with a two-tailed p-value

use serde::{Deserialize, Serialize};

// ============================================================================
// DESCRIPTIVE HELPERS
// ============================================================================

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator). NaN for fewer than 2 values.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    ss / (values.len() - 1) as f64
}

// ============================================================================
// T-TEST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTest {
    pub statistic: f64,
    pub degrees_of_freedom: f64,
    /// Two-tailed
    pub p_value: f64,
}

/// Why a t-test could not produce a statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Degenerate {
    /// One of the groups has fewer than 2 observations
    GroupTooSmall,
    /// Both groups are constant, so the pooled standard error is 0
    ZeroVariance,
}

impl Degenerate {
    pub fn describe(&self) -> &'static str {
        match self {
            Degenerate::GroupTooSmall => "each half needs at least two days of data",
            Degenerate::ZeroVariance => "daily sales show no variation on either side of the split",
        }
    }
}

/// Independent two-sample Student's t-test assuming equal variances.
///
/// Returns `Err(Degenerate)` where the statistic would be undefined instead
/// of handing back NaN.
pub fn student_t_test(a: &[f64], b: &[f64]) -> Result<TTest, Degenerate> {
    if a.len() < 2 || b.len() < 2 {
        return Err(Degenerate::GroupTooSmall);
    }

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let v1 = sample_variance(a);
    let v2 = sample_variance(b);

    if v1 == 0.0 && v2 == 0.0 {
        return Err(Degenerate::ZeroVariance);
    }

    let df = n1 + n2 - 2.0;
    let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
    let standard_error = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    let statistic = (mean(a) - mean(b)) / standard_error;

    Ok(TTest {
        statistic,
        degrees_of_freedom: df,
        p_value: two_tailed_p(statistic, df),
    })
}

/// P(|T| >= |t|) for Student's t with `df` degrees of freedom
pub fn two_tailed_p(t: f64, df: f64) -> f64 {
    let x = df / (df + t * t);
    regularized_incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

// ============================================================================
// SPECIAL FUNCTIONS
// ============================================================================

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// ln Γ(x) for x > 0 (Lanczos approximation)
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection: Γ(x)Γ(1-x) = π / sin(πx)
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut acc = LANCZOS_COEFFICIENTS[0];
    for (i, c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;

    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

/// I_x(a, b), evaluated with the Lentz continued fraction
pub fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    // The fraction converges fast only on this side of the mean
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITERATIONS: usize = 300;
    const EPSILON: f64 = 3.0e-16;
    const TINY: f64 = 1.0e-300;

    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        // Even step
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        // Odd step
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }

    h
}

// ============================================================================
// TESTS
// ============================================================================
