use super::*;
use rand::{rngs::StdRng, SeedableRng};

fn mean_std(xs: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

#[test]
fn exact_value() {
    let m = MeasurementRange::exact(5.0).unwrap();
    assert!(m.is_exact());
    assert!(!m.is_range());
    assert_eq!((m.min(), m.max(), m.best_estimate()), (5.0, 5.0, 5.0));
    assert_eq!(m.unit(), "FT");
    assert_eq!(m.to_string(), "5.00 FT");
}

#[test]
fn min_max_range() {
    let m = MeasurementRange::between(7.0, 10.0).unwrap();
    assert_eq!(m.best_estimate(), 8.5);
    assert!(m.is_range());
    assert!(!m.is_exact());
    assert_eq!(m.range_width(), 3.0);
    assert_eq!(m.uncertainty(), 1.5);
    assert_eq!(m.to_string(), "7.0-10.0 FT (best: 8.50)");

    let swapped = MeasurementRange::between(10.0, 7.0).unwrap();
    assert_eq!((swapped.min(), swapped.max()), (7.0, 10.0));
}

#[test]
fn value_plus_minus_uncertainty() {
    let m = MeasurementRange::around(12.0, 0.5).unwrap();
    assert_eq!((m.min(), m.max(), m.best_estimate()), (11.5, 12.5, 12.0));
    assert!(MeasurementRange::around(12.0, -0.5).unwrap_err().is_config_error());
}

#[test]
fn tolerance_band_is_neither_exact_nor_range() {
    let at = MeasurementRange::between(0.0, EXACT_TOL).unwrap();
    assert_eq!(at.range_width(), EXACT_TOL);
    assert!(!at.is_exact());
    assert!(!at.is_range());

    let below = MeasurementRange::between(0.0, 0.009).unwrap();
    assert!(below.is_exact() && !below.is_range());

    let above = MeasurementRange::between(0.0, 0.011).unwrap();
    assert!(above.is_range() && !above.is_exact());
}

#[test]
fn spec_precedence_and_errors() {
    let both = MeasurementSpec {
        min: Some(1.0),
        max: Some(3.0),
        value: Some(10.0),
        uncertainty: Some(1.0),
        ..Default::default()
    };
    let m = MeasurementRange::from_spec(&both, "mm").unwrap();
    assert_eq!(m.best_estimate(), 2.0);
    assert_eq!(m.unit(), "mm");

    let value_only = MeasurementSpec {
        min: Some(1.0),
        value: Some(4.0),
        ..Default::default()
    };
    assert!(MeasurementRange::from_spec(&value_only, "FT").unwrap().is_exact());

    let empty = MeasurementSpec::default();
    let err = MeasurementRange::from_spec(&empty, "FT").unwrap_err();
    assert!(err.is_config_error());

    let half = MeasurementSpec {
        max: Some(3.0),
        uncertainty: Some(1.0),
        ..Default::default()
    };
    assert!(MeasurementRange::from_spec(&half, "FT").is_err());

    let bad_conf = MeasurementSpec {
        value: Some(1.0),
        confidence: Some(0.0),
        ..Default::default()
    };
    assert!(MeasurementRange::from_spec(&bad_conf, "FT").is_err());
    assert!(MeasurementRange::exact(f64::NAN).is_err());
}

#[test]
fn spec_deserializes_from_json_aliases() {
    let spec: MeasurementSpec =
        serde_json::from_str(r#"{"min_val": 7.0, "max_val": 10.0, "distribution": "normal"}"#)
            .unwrap();
    let m = MeasurementRange::from_spec(&spec, "FT").unwrap();
    assert_eq!(m.distribution(), Distribution::Normal);
    assert_eq!(m.best_estimate(), 8.5);
}

#[test]
fn fallback_without_random_source() {
    let m = MeasurementRange::between(7.0, 10.0).unwrap();
    let d = m.sample(4, None);
    assert_eq!(d.method, SampleMethod::Fallback);
    assert_eq!(d.values, vec![8.5; 4]);
}

#[test]
fn exact_samples_are_constant() {
    let mut rng = StdRng::seed_from_u64(1);
    let m = MeasurementRange::exact(3.25)
        .unwrap()
        .with_distribution(Distribution::Normal);
    let d = m.sample(100, Some(&mut rng));
    assert_eq!(d.method, SampleMethod::MonteCarlo);
    assert!(d.values.iter().all(|&v| v == 3.25));
}

#[test]
fn uniform_moments_and_bounds() {
    let mut rng = StdRng::seed_from_u64(11);
    let m = MeasurementRange::between(7.0, 10.0).unwrap();
    let d = m.sample(40_000, Some(&mut rng));
    assert!(d.values.iter().all(|&v| (7.0..=10.0).contains(&v)));
    let (mean, sd) = mean_std(&d.values);
    assert!((mean - 8.5).abs() < 0.03, "mean {mean}");
    assert!((sd - 3.0 / 12f64.sqrt()).abs() < 0.02, "sd {sd}");
}

#[test]
fn normal_is_clamped_into_range() {
    let mut rng = StdRng::seed_from_u64(5);
    let m = MeasurementRange::between(7.0, 10.0)
        .unwrap()
        .with_distribution(Distribution::Normal);
    let expected_sd = 3.0 / (2.0 * 1.959_963_985);
    assert!((m.normal_std() - expected_sd).abs() < 1e-6);
    let d = m.sample(40_000, Some(&mut rng));
    assert!(d.values.iter().all(|&v| (7.0..=10.0).contains(&v)));
    // About 5% of the mass sits on the bounds after clamping.
    let clamped = d.values.iter().filter(|&&v| v == 7.0 || v == 10.0).count();
    let frac = clamped as f64 / d.values.len() as f64;
    assert!((frac - 0.05).abs() < 0.01, "clamped fraction {frac}");
    let (mean, sd) = mean_std(&d.values);
    assert!((mean - 8.5).abs() < 0.02);
    assert!(sd < expected_sd);
}

#[test]
fn full_confidence_normal_collapses_to_best() {
    let mut rng = StdRng::seed_from_u64(5);
    let m = MeasurementRange::between(7.0, 10.0)
        .unwrap()
        .with_distribution(Distribution::Normal)
        .with_confidence(1.0)
        .unwrap();
    assert_eq!(m.normal_std(), 0.0);
    assert!(m.sample(10, Some(&mut rng)).values.iter().all(|&v| v == 8.5));
}

#[test]
fn triangular_moments() {
    let mut rng = StdRng::seed_from_u64(9);
    let m = MeasurementRange::between(0.0, 6.0)
        .unwrap()
        .with_distribution(Distribution::Triangular);
    let d = m.sample(40_000, Some(&mut rng));
    assert!(d.values.iter().all(|&v| (0.0..=6.0).contains(&v)));
    // Symmetric triangle on [0, 6]: mean 3, variance 36/24.
    let (mean, sd) = mean_std(&d.values);
    assert!((mean - 3.0).abs() < 0.03);
    assert!((sd - 1.5f64.sqrt()).abs() < 0.02);
}

#[test]
fn record_round_trip() {
    let m = MeasurementRange::around(8.123, 1.4567)
        .unwrap()
        .with_distribution(Distribution::Triangular)
        .with_unit("mm");
    let rec = m.to_record();
    assert_eq!(rec.min, 6.67);
    assert_eq!(rec.max, 9.58);
    assert_eq!(rec.best_estimate, 8.12);
    assert!(rec.is_range);

    let json = serde_json::to_string(&rec).unwrap();
    let back: MeasurementRecord = serde_json::from_str(&json).unwrap();
    let rebuilt = MeasurementRange::from_record(&back).unwrap();
    let rec2 = rebuilt.to_record();
    assert_eq!((rec2.min, rec2.max), (rec.min, rec.max));
    assert!((rec2.best_estimate - rec.best_estimate).abs() < 0.011);
    assert_eq!(rebuilt.distribution(), Distribution::Triangular);
    assert_eq!(rebuilt.unit(), "mm");
}

proptest::proptest! {
    #[test]
    fn draws_stay_inside_the_range(
        lo in -50.0f64..50.0,
        width in 0.0f64..20.0,
        conf in 0.5f64..1.0,
        dist in proptest::sample::select(vec![
            Distribution::Uniform,
            Distribution::Normal,
            Distribution::Triangular,
        ]),
        seed in proptest::num::u64::ANY,
    ) {
        let m = MeasurementRange::between(lo, lo + width)
            .unwrap()
            .with_distribution(dist)
            .with_confidence(conf)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let d = m.sample(200, Some(&mut rng));
        proptest::prop_assert_eq!(d.values.len(), 200);
        proptest::prop_assert!(d.values.iter().all(|&v| v >= m.min() && v <= m.max()));
    }
}
