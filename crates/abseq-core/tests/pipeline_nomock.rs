//! No-mock pipeline tests: impression records through to a decision.

use abseq_common::{AggregateBucket, Arm, ArmBuckets};
use abseq_config::TestParams;
use abseq_core::aggregate::{aggregate_hourly, parse_impressions_content};
use abseq_core::sequence::{rng_from_seed, SequenceBuilder};
use abseq_core::sprt::{Outcome, SprtEngine};
use abseq_core::{CollectingSink, Diagnostic};

fn impressions(rows: &[(&str, &str, u32, u64, u64)]) -> String {
    let mut out =
        String::from("auction_id,experiment,date,hour,device_make,platform_os,browser,yes,no\n");
    for (i, (arm, date, hour, yes, no)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "id-{i},{arm},{date},{hour},Generic Smartphone,6,Chrome Mobile,{yes},{no}\n"
        ));
    }
    out
}

#[test]
fn csv_to_decision_reports_every_stage() {
    let mut rows = Vec::new();
    for hour in 0..12u32 {
        rows.push(("exposed", "2020-07-03", hour, 1, 0));
        rows.push(("control", "2020-07-03", hour, 0, 1));
    }
    let records = parse_impressions_content(&impressions(&rows)).unwrap();
    let buckets = aggregate_hourly(&records).unwrap();
    assert_eq!(buckets.treatment.len(), 12);

    let sink = CollectingSink::new();
    let sequences = SequenceBuilder::new()
        .with_sink(&sink)
        .build_arms(&buckets, &mut rng_from_seed(Some(11)))
        .unwrap();
    let result = SprtEngine::new(TestParams::default())
        .with_sink(&sink)
        .run(sequences.treatment.as_slice(), sequences.control.as_slice())
        .unwrap();

    assert_eq!(result.outcome, Outcome::RejectNull);
    assert_eq!(result.stopping_index, Some(10));

    let records = sink.records();
    let built = records
        .iter()
        .filter(|d| matches!(d, Diagnostic::SequenceBuilt { .. }))
        .count();
    assert_eq!(built, 2);
    assert!(matches!(
        records.last(),
        Some(Diagnostic::BoundaryCrossed {
            n: 10,
            outcome: Outcome::RejectNull,
            ..
        })
    ));
}

#[test]
fn same_seed_same_decision() {
    let buckets = ArmBuckets {
        treatment: vec![AggregateBucket::new(30, 18), AggregateBucket::new(25, 9)],
        control: vec![AggregateBucket::new(30, 8), AggregateBucket::new(25, 10)],
    };
    let run = |seed| {
        let seqs = SequenceBuilder::new()
            .build_arms(&buckets, &mut rng_from_seed(Some(seed)))
            .unwrap();
        SprtEngine::new(TestParams::default())
            .run(seqs.treatment.as_slice(), seqs.control.as_slice())
            .unwrap()
    };
    let a = run(5);
    let b = run(5);
    assert_eq!(a.outcome, b.outcome);
    assert_eq!(a.x1, b.x1);
    assert_eq!(a.r, b.r);
    assert_eq!(*a.x1.last().unwrap(), 27);
    assert_eq!(*a.r.last().unwrap(), 45);
}

#[test]
fn truncated_run_against_real_layout() {
    let mut rows = Vec::new();
    for hour in 0..5u32 {
        rows.push(("exposed", "2020-07-04", hour, 1, 1));
        rows.push(("control", "2020-07-04", hour, 1, 1));
    }
    let records = parse_impressions_content(&impressions(&rows)).unwrap();
    let buckets = aggregate_hourly(&records).unwrap();
    assert_eq!(buckets.arm(Arm::Control)[0], AggregateBucket::new(2, 1));

    let seqs = SequenceBuilder::new()
        .build_arms(&buckets, &mut rng_from_seed(Some(2)))
        .unwrap();
    let result = SprtEngine::new(TestParams::default().with_truncation(6))
        .run(seqs.treatment.as_slice(), seqs.control.as_slice())
        .unwrap();
    assert!(result.outcome.is_truncated());
    assert_eq!(result.stopping_index, Some(6));
    assert_eq!(result.stats.len(), 6);
}
