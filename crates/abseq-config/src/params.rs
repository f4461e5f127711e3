//! Test-parameter types.

use serde::{Deserialize, Serialize};

/// Parameters of one sequential test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestParams {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Odds ratio `t1` under the alternative hypothesis; expected above 1.
    #[serde(default = "default_odds_ratio")]
    pub odds_ratio: f64,

    /// Type I error bound.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Type II error bound.
    #[serde(default = "default_beta")]
    pub beta: f64,

    /// Force a decision after this many paired observations.
    #[serde(default)]
    pub truncation_point: Option<usize>,

    /// Seed for the intra-bucket permutation; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub description: Option<String>,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_odds_ratio() -> f64 {
    2.0
}

fn default_alpha() -> f64 {
    0.05
}

fn default_beta() -> f64 {
    0.10
}

impl Default for TestParams {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            odds_ratio: default_odds_ratio(),
            alpha: default_alpha(),
            beta: default_beta(),
            truncation_point: None,
            seed: None,
            description: None,
        }
    }
}

impl TestParams {
    pub fn new(odds_ratio: f64, alpha: f64, beta: f64) -> Self {
        Self {
            odds_ratio,
            alpha,
            beta,
            ..Self::default()
        }
    }

    pub fn with_truncation(mut self, truncation_point: usize) -> Self {
        self.truncation_point = Some(truncation_point);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Apply command-line overrides on top of file or default values.
    pub fn apply(&mut self, overrides: &ParamOverrides) {
        if let Some(odds_ratio) = overrides.odds_ratio {
            self.odds_ratio = odds_ratio;
        }
        if let Some(alpha) = overrides.alpha {
            self.alpha = alpha;
        }
        if let Some(beta) = overrides.beta {
            self.beta = beta;
        }
        if overrides.truncation_point.is_some() {
            self.truncation_point = overrides.truncation_point;
        }
        if overrides.seed.is_some() {
            self.seed = overrides.seed;
        }
    }
}

/// Per-field overrides, typically from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct ParamOverrides {
    pub odds_ratio: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub truncation_point: Option<usize>,
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_conventional_design() {
        let p = TestParams::default();
        assert_eq!(p.odds_ratio, 2.0);
        assert_eq!(p.alpha, 0.05);
        assert_eq!(p.beta, 0.10);
        assert!(p.truncation_point.is_none());
        assert_eq!(p.schema_version, crate::CONFIG_SCHEMA_VERSION);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let p: TestParams = serde_json::from_str(r#"{"alpha": 0.01, "truncation_point": 500}"#)
            .expect("partial params parse");
        assert_eq!(p.alpha, 0.01);
        assert_eq!(p.beta, 0.10);
        assert_eq!(p.truncation_point, Some(500));
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let mut p = TestParams::default().with_truncation(100);
        p.apply(&ParamOverrides {
            odds_ratio: Some(1.5),
            seed: Some(7),
            ..Default::default()
        });
        assert_eq!(p.odds_ratio, 1.5);
        assert_eq!(p.alpha, 0.05);
        assert_eq!(p.truncation_point, Some(100));
        assert_eq!(p.seed, Some(7));
    }
}
