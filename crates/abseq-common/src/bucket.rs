//! Experiment arms and per-interval aggregate counts.

use serde::{Deserialize, Serialize};

/// One side of a two-arm experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arm {
    /// The exposed group, `x` in the sequential test.
    Treatment,
    /// The control group, `y` in the sequential test.
    Control,
}

impl std::str::FromStr for Arm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "treatment" | "exposed" | "x" => Ok(Arm::Treatment),
            "control" | "y" => Ok(Arm::Control),
            _ => Err(format!("unknown experiment arm: {}", s)),
        }
    }
}

impl std::fmt::Display for Arm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arm::Treatment => write!(f, "treatment"),
            Arm::Control => write!(f, "control"),
        }
    }
}

/// Trials and successes observed for one arm in one time bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateBucket {
    /// Number of trials (users who saw the ad and answered).
    pub engagement: u64,
    /// Number of successful trials; never exceeds `engagement`.
    pub success: u64,
}

impl AggregateBucket {
    pub fn new(engagement: u64, success: u64) -> Self {
        Self {
            engagement,
            success,
        }
    }

    /// Whether the counts satisfy `success <= engagement`.
    pub fn is_consistent(&self) -> bool {
        self.success <= self.engagement
    }

    /// Buckets with no trials contribute nothing to a sequence.
    pub fn is_empty(&self) -> bool {
        self.engagement == 0
    }

    /// Number of failed trials, or None when the counts are inconsistent.
    pub fn failures(&self) -> Option<u64> {
        self.engagement.checked_sub(self.success)
    }
}

/// Bucket series for both arms, in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmBuckets {
    #[serde(default)]
    pub treatment: Vec<AggregateBucket>,
    #[serde(default)]
    pub control: Vec<AggregateBucket>,
}

impl ArmBuckets {
    /// Buckets for one arm.
    pub fn arm(&self, arm: Arm) -> &[AggregateBucket] {
        match arm {
            Arm::Treatment => &self.treatment,
            Arm::Control => &self.control,
        }
    }

    /// Mutable bucket list for one arm.
    pub fn arm_mut(&mut self, arm: Arm) -> &mut Vec<AggregateBucket> {
        match arm {
            Arm::Treatment => &mut self.treatment,
            Arm::Control => &mut self.control,
        }
    }

    /// Total trials recorded for one arm.
    pub fn total_engagement(&self, arm: Arm) -> u64 {
        self.arm(arm).iter().map(|b| b.engagement).sum()
    }

    /// Total successes recorded for one arm.
    pub fn total_success(&self, arm: Arm) -> u64 {
        self.arm(arm).iter().map(|b| b.success).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_parses_aliases() {
        assert_eq!("exposed".parse::<Arm>().unwrap(), Arm::Treatment);
        assert_eq!(" Control ".parse::<Arm>().unwrap(), Arm::Control);
        assert!("placebo".parse::<Arm>().is_err());
    }

    #[test]
    fn arm_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Arm::Treatment).unwrap(), "\"treatment\"");
    }

    #[test]
    fn bucket_consistency() {
        assert!(AggregateBucket::new(5, 5).is_consistent());
        assert!(!AggregateBucket::new(2, 3).is_consistent());
        assert_eq!(AggregateBucket::new(2, 3).failures(), None);
        assert_eq!(AggregateBucket::new(7, 3).failures(), Some(4));
        assert!(AggregateBucket::default().is_empty());
    }

    #[test]
    fn arm_buckets_totals() {
        let buckets = ArmBuckets {
            treatment: vec![AggregateBucket::new(10, 3), AggregateBucket::new(4, 1)],
            control: vec![AggregateBucket::new(6, 2)],
        };
        assert_eq!(buckets.total_engagement(Arm::Treatment), 14);
        assert_eq!(buckets.total_success(Arm::Treatment), 4);
        assert_eq!(buckets.total_success(Arm::Control), 2);
    }

    #[test]
    fn arm_buckets_missing_arm_defaults_empty() {
        let parsed: ArmBuckets =
            serde_json::from_str(r#"{"treatment":[{"engagement":3,"success":1}]}"#).unwrap();
        assert_eq!(parsed.treatment.len(), 1);
        assert!(parsed.control.is_empty());
    }
}
