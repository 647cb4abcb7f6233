use thermowatch::core::Reading;
use thermowatch::detector::{AnomalyDetector, AnomalyReason, DetectorConfig, Phase};

fn factory_config() -> DetectorConfig {
    DetectorConfig {
        window_capacity: 50,
        calibration_minimum: 20,
        hard_limit_threshold: 90.0,
        z_threshold: 3.0,
    }
}

/// 20 values spread evenly over [20, 30]
fn calibration_values() -> Vec<f64> {
    (0..20).map(|i| 20.0 + f64::from(i) * 10.0 / 19.0).collect()
}

fn calibrated_detector() -> AnomalyDetector {
    let mut detector = AnomalyDetector::new(factory_config()).unwrap();
    for (i, value) in calibration_values().into_iter().enumerate() {
        detector.process(Reading::new(value, i as f64)).unwrap();
    }
    detector
}

#[test]
fn test_factory_scenario() {
    let mut detector = AnomalyDetector::new(factory_config()).unwrap();

    let mut last = None;
    for (i, value) in calibration_values().into_iter().enumerate() {
        last = Some(detector.process(Reading::new(value, i as f64)).unwrap());
    }
    assert_eq!(last.unwrap().remaining_calibration, Some(0));
    assert_eq!(detector.phase(), Phase::Active);

    let spike = detector.process(Reading::new(95.0, 20.0)).unwrap();
    assert!(spike.is_anomaly);
    assert_eq!(spike.reason, AnomalyReason::HardLimit);
    assert_eq!(detector.window().len(), 20);

    let normal = detector.process(Reading::new(26.0, 21.0)).unwrap();
    assert!(!normal.is_anomaly);
    assert_eq!(normal.reason, AnomalyReason::None);
    assert_eq!(detector.window().len(), 21);
}

#[test]
fn test_calibration_countdown_is_edge_triggered() {
    let mut detector = AnomalyDetector::new(factory_config()).unwrap();

    let remaining: Vec<usize> = calibration_values()
        .into_iter()
        .enumerate()
        .map(|(i, v)| detector.process(Reading::new(v, i as f64)).unwrap())
        .map(|outcome| {
            assert!(!outcome.is_anomaly);
            assert_eq!(outcome.reason, AnomalyReason::None);
            assert_eq!(outcome.score, None);
            outcome.remaining_calibration.unwrap()
        })
        .collect();

    assert_eq!(remaining, (0..20).rev().collect::<Vec<_>>());

    // Active from here on: no more countdown, ever.
    for i in 0..30 {
        let outcome = detector.process(Reading::new(25.0, 100.0 + f64::from(i))).unwrap();
        assert_eq!(outcome.remaining_calibration, None);
        assert!(!outcome.completes_calibration());
        assert!(outcome.score.is_some());
    }
    assert_eq!(detector.phase(), Phase::Active);
}

#[test]
fn test_calibration_admits_everything() {
    let mut detector = AnomalyDetector::new(factory_config()).unwrap();

    // Even hard-limit values are trusted while calibrating.
    let outcome = detector.process(Reading::new(150.0, 0.0)).unwrap();
    assert!(!outcome.is_anomaly);
    assert_eq!(outcome.remaining_calibration, Some(19));
    assert_eq!(detector.window().values().collect::<Vec<_>>(), vec![150.0]);
}

#[test]
fn test_anomaly_leaves_window_untouched() {
    let mut detector = calibrated_detector();
    let before: Vec<f64> = detector.window().values().collect();

    let outcome = detector.process(Reading::new(45.0, 50.0)).unwrap();
    assert!(outcome.is_anomaly);
    assert_eq!(outcome.reason, AnomalyReason::Statistical);
    assert!(outcome.score.unwrap() > 3.0);

    let after: Vec<f64> = detector.window().values().collect();
    assert_eq!(before, after);
}

#[test]
fn test_low_outlier_is_statistical() {
    let mut detector = calibrated_detector();
    let outcome = detector.process(Reading::new(5.0, 50.0)).unwrap();
    assert!(outcome.is_anomaly);
    assert_eq!(outcome.reason, AnomalyReason::Statistical);
    assert!(outcome.score.unwrap() < -3.0);
    assert_eq!(detector.window().len(), 20);
}

#[test]
fn test_normal_reading_is_admitted_last() {
    let mut detector = calibrated_detector();
    detector.process(Reading::new(24.5, 50.0)).unwrap();
    assert_eq!(detector.window().values().last(), Some(24.5));
    assert_eq!(detector.window().len(), 21);
}

#[test]
fn test_hard_limit_wins_over_statistical() {
    let mut detector = calibrated_detector();
    let outcome = detector.process(Reading::new(1000.0, 50.0)).unwrap();

    assert!(outcome.score.unwrap() > 3.0);
    assert!(outcome.is_anomaly);
    assert_eq!(outcome.reason, AnomalyReason::HardLimit);
}

#[test]
fn test_hard_limit_is_inclusive() {
    let config = DetectorConfig {
        hard_limit_threshold: 30.0,
        z_threshold: 100.0,
        ..factory_config()
    };
    let mut detector = AnomalyDetector::new(config).unwrap();
    for (i, value) in calibration_values().into_iter().enumerate() {
        detector.process(Reading::new(value, i as f64)).unwrap();
    }

    // 30.0 is within the learned spread, but sits exactly on the ceiling.
    let outcome = detector.process(Reading::new(30.0, 50.0)).unwrap();
    assert_eq!(outcome.reason, AnomalyReason::HardLimit);
    assert!(outcome.score.unwrap().abs() < 100.0);
}

#[test]
fn test_zero_variance_window() {
    let mut detector = AnomalyDetector::new(factory_config()).unwrap();
    for i in 0..20 {
        detector.process(Reading::new(22.2, f64::from(i))).unwrap();
    }

    // Hard-limit hits are not learned, so the window stays flat.
    let outcome = detector.process(Reading::new(91.0, 20.0)).unwrap();
    assert_eq!(outcome.score, Some(0.0));
    assert_eq!(outcome.reason, AnomalyReason::HardLimit);

    let outcome = detector.process(Reading::new(60.0, 21.0)).unwrap();
    assert_eq!(outcome.score, Some(0.0));
    assert!(!outcome.is_anomaly);
    assert_eq!(outcome.reason, AnomalyReason::None);
    assert_eq!(detector.window().len(), 21);
}

#[test]
fn test_window_slides_after_capacity() {
    let config = DetectorConfig {
        window_capacity: 5,
        calibration_minimum: 3,
        hard_limit_threshold: 90.0,
        z_threshold: 3.0,
    };
    let mut detector = AnomalyDetector::new(config).unwrap();
    for (i, value) in [20.0, 21.0, 22.0, 21.0, 20.0, 21.0, 22.0].into_iter().enumerate() {
        detector.process(Reading::new(value, i as f64)).unwrap();
    }

    assert_eq!(detector.window().len(), 5);
    assert_eq!(detector.window().values().collect::<Vec<_>>(), vec![22.0, 21.0, 20.0, 21.0, 22.0]);
}

#[test]
fn test_offline_notice_keeps_state() {
    let mut detector = calibrated_detector();
    let before: Vec<f64> = detector.window().values().collect();

    let event = detector.notify_source_offline();
    assert_eq!(event.phase, Phase::Active);
    assert_eq!(event.retained_values, 20);

    assert_eq!(detector.phase(), Phase::Active);
    assert_eq!(detector.window().values().collect::<Vec<_>>(), before);

    // Detection resumes where it left off.
    let outcome = detector.process(Reading::new(25.0, 99.0)).unwrap();
    assert_eq!(outcome.remaining_calibration, None);
}

#[test]
fn test_nan_reading_rejected() {
    let mut detector = calibrated_detector();
    assert!(detector.process(Reading::new(f64::NAN, 0.0)).is_err());
    assert_eq!(detector.window().len(), 20);
}

#[test]
fn test_extreme_magnitudes_score_finitely() {
    let config = DetectorConfig {
        window_capacity: 5,
        calibration_minimum: 3,
        hard_limit_threshold: f64::MAX,
        z_threshold: 3.0,
    };
    let mut detector = AnomalyDetector::new(config).unwrap();
    for (i, value) in [1.7e308, 1.7e308, 1.0].into_iter().enumerate() {
        detector.process(Reading::new(value, i as f64)).unwrap();
    }

    let outcome = detector.process(Reading::new(-1e308, 3.0)).unwrap();
    let score = outcome.score.unwrap();
    assert!(score.is_finite());
    assert!((score + 2.662).abs() < 1e-3);
    assert!(!outcome.is_anomaly);
    assert_eq!(detector.window().len(), 4);
}
