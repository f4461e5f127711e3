//! Trial-sequence reconstruction from hourly aggregate counts.
//!
//! Each bucket becomes a contiguous segment holding exactly `success` ones
//! and `engagement - success` zeros, shuffled within the segment only.
//! Segments keep the bucket order, so the sequence stays chronological at
//! bucket granularity.

use abseq_common::{AggregateBucket, Arm, ArmBuckets};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Errors raised while building a trial sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("bucket {index}: success {success} exceeds engagement {engagement}")]
    SuccessExceedsEngagement {
        index: usize,
        success: u64,
        engagement: u64,
    },

    #[error("bucket totals overflow the addressable sequence length")]
    TooLong,
}

impl From<SequenceError> for abseq_common::Error {
    fn from(err: SequenceError) -> Self {
        match err {
            SequenceError::SuccessExceedsEngagement {
                index,
                success,
                engagement,
            } => abseq_common::Error::SuccessExceedsEngagement {
                index,
                success,
                engagement,
            },
            other => abseq_common::Error::Input(other.to_string()),
        }
    }
}

/// Ordered binary outcomes for one arm.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TrialSequence {
    outcomes: Vec<u8>,
}

impl TrialSequence {
    pub fn as_slice(&self) -> &[u8] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of ones.
    pub fn successes(&self) -> u64 {
        self.outcomes.iter().map(|&v| u64::from(v)).sum()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.outcomes
    }
}

impl AsRef<[u8]> for TrialSequence {
    fn as_ref(&self) -> &[u8] {
        &self.outcomes
    }
}

/// Treatment and control sequences built from one [`ArmBuckets`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArmSequences {
    pub treatment: TrialSequence,
    pub control: TrialSequence,
}

/// Reconstructs trial sequences, reporting to an optional sink.
#[derive(Default, Clone, Copy)]
pub struct SequenceBuilder<'a> {
    sink: Option<&'a dyn DiagnosticSink>,
}

impl<'a> SequenceBuilder<'a> {
    pub fn new() -> Self {
        Self { sink: None }
    }

    pub fn with_sink(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build one arm's sequence.
    ///
    /// Every bucket is checked before anything is allocated, so a violation
    /// never leaves a partial sequence behind.
    pub fn build<R>(
        &self,
        buckets: &[AggregateBucket],
        rng: &mut R,
    ) -> Result<TrialSequence, SequenceError>
    where
        R: Rng + ?Sized,
    {
        self.build_for(None, buckets, rng)
    }

    /// Build both arms, treatment first, from the same random source.
    pub fn build_arms<R>(
        &self,
        buckets: &ArmBuckets,
        rng: &mut R,
    ) -> Result<ArmSequences, SequenceError>
    where
        R: Rng + ?Sized,
    {
        let treatment = self.build_for(Some(Arm::Treatment), &buckets.treatment, rng)?;
        let control = self.build_for(Some(Arm::Control), &buckets.control, rng)?;
        Ok(ArmSequences { treatment, control })
    }

    fn build_for<R>(
        &self,
        arm: Option<Arm>,
        buckets: &[AggregateBucket],
        rng: &mut R,
    ) -> Result<TrialSequence, SequenceError>
    where
        R: Rng + ?Sized,
    {
        let mut total: u64 = 0;
        for (index, bucket) in buckets.iter().enumerate() {
            if !bucket.is_consistent() {
                return Err(SequenceError::SuccessExceedsEngagement {
                    index,
                    success: bucket.success,
                    engagement: bucket.engagement,
                });
            }
            total = total
                .checked_add(bucket.engagement)
                .ok_or(SequenceError::TooLong)?;
        }
        let capacity = usize::try_from(total).map_err(|_| SequenceError::TooLong)?;

        let mut outcomes = Vec::with_capacity(capacity);
        let mut successes = 0u64;
        for bucket in buckets {
            let start = outcomes.len();
            // Lengths fit in usize: their sum was checked above.
            let ones = bucket.success as usize;
            let zeros = (bucket.engagement - bucket.success) as usize;
            outcomes.resize(start + ones, 1u8);
            outcomes.resize(start + ones + zeros, 0u8);
            outcomes[start..].shuffle(rng);
            successes += bucket.success;
        }

        if let Some(sink) = self.sink {
            sink.record(&Diagnostic::SequenceBuilt {
                arm,
                buckets: buckets.len(),
                trials: outcomes.len(),
                successes,
            });
        }

        Ok(TrialSequence { outcomes })
    }
}

/// Build one arm's sequence without diagnostics.
pub fn build_trial_sequence<R>(
    buckets: &[AggregateBucket],
    rng: &mut R,
) -> Result<TrialSequence, SequenceError>
where
    R: Rng + ?Sized,
{
    SequenceBuilder::new().build(buckets, rng)
}

/// Random source for the builder: seeded when a seed is given, otherwise
/// drawn from the thread-local generator.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;

    fn buckets(pairs: &[(u64, u64)]) -> Vec<AggregateBucket> {
        pairs
            .iter()
            .map(|&(e, s)| AggregateBucket::new(e, s))
            .collect()
    }

    #[test]
    fn segments_preserve_counts_and_order() {
        let input = buckets(&[(3, 1), (0, 0), (4, 4), (5, 0)]);
        let mut rng = StdRng::seed_from_u64(7);
        let seq = build_trial_sequence(&input, &mut rng).unwrap();
        let out = seq.as_slice();
        assert_eq!(out.len(), 12);
        assert_eq!(out[..3].iter().filter(|&&v| v == 1).count(), 1);
        assert_eq!(&out[3..7], &[1, 1, 1, 1]);
        assert_eq!(&out[7..], &[0, 0, 0, 0, 0]);
        assert_eq!(seq.successes(), 5);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let input = buckets(&[(50, 20), (30, 3), (10, 9)]);
        let a = build_trial_sequence(&input, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = build_trial_sequence(&input, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_are_permutation_equivalent() {
        let input = buckets(&[(40, 17), (25, 12)]);
        let a = build_trial_sequence(&input, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = build_trial_sequence(&input, &mut StdRng::seed_from_u64(2)).unwrap();
        let mut sa = a.as_slice()[..40].to_vec();
        let mut sb = b.as_slice()[..40].to_vec();
        sa.sort_unstable();
        sb.sort_unstable();
        assert_eq!(sa, sb);
        assert_eq!(a.successes(), b.successes());
    }

    #[test]
    fn success_above_engagement_names_bucket() {
        let input = buckets(&[(3, 1), (2, 5)]);
        let err = build_trial_sequence(&input, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(
            err,
            SequenceError::SuccessExceedsEngagement {
                index: 1,
                success: 5,
                engagement: 2
            }
        );
        let common: abseq_common::Error = err.into();
        assert_eq!(common.code(), 22);
    }

    #[test]
    fn empty_input_gives_empty_sequence() {
        let seq = build_trial_sequence(&[], &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(seq.is_empty());
    }

    #[test]
    fn build_arms_reports_to_sink() {
        let sink = CollectingSink::new();
        let input = ArmBuckets {
            treatment: buckets(&[(4, 2)]),
            control: buckets(&[(3, 1), (2, 0)]),
        };
        let seqs = SequenceBuilder::new()
            .with_sink(&sink)
            .build_arms(&input, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(seqs.treatment.len(), 4);
        assert_eq!(seqs.control.len(), 5);

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert!(matches!(
            records[1],
            Diagnostic::SequenceBuilt {
                arm: Some(Arm::Control),
                buckets: 2,
                trials: 5,
                successes: 1
            }
        ));
    }

    #[test]
    fn unseeded_rng_still_preserves_counts() {
        let input = buckets(&[(20, 5)]);
        let seq = build_trial_sequence(&input, &mut rng_from_seed(None)).unwrap();
        assert_eq!(seq.successes(), 5);
    }
}
