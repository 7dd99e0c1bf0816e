//! Randomized property tests for the parameter system
//!
//! Each test draws its inputs from a seeded generator so failures are reproducible.

use crate::test_helpers::{approx_eq, random_limits, seeded_rng};
use modelfit_params::parameters::{
    BoundedTransform, IdentityTransform, Limits, Log10Transform, LogTransform, ParameterBase,
    ParameterRegistry, RealParameter, Transform,
};
use rand::Rng;
use std::sync::Arc;

const SAMPLES: usize = 500;

#[test]
fn test_check_and_clip_agree_with_bounds() {
    let mut rng = seeded_rng(42);
    for _ in 0..SAMPLES {
        let limits = random_limits(&mut rng, 100.0);
        let v = rng.gen_range(-200.0..200.0);

        assert_eq!(limits.check(v), limits.min() <= v && v <= limits.max());

        let clipped = limits.clip(v);
        if limits.check(v) {
            assert_eq!(clipped, v);
        } else if v < limits.min() {
            assert_eq!(clipped, limits.min());
        } else {
            assert_eq!(clipped, limits.max());
        }
    }
}

#[test]
fn test_invalid_limits_always_fail() {
    let mut rng = seeded_rng(7);
    for _ in 0..SAMPLES {
        let min = rng.gen_range(-100.0..100.0);
        let max = min - rng.gen_range(1e-6..100.0);
        assert!(Limits::<f64>::new(min, max, "inverted").is_err());
        assert!(Limits::<f64>::new(f64::NAN, max, "nan").is_err());
        assert!(Limits::<f64>::new(min, f64::NAN, "nan").is_err());

        let mut limits = Limits::<f64>::new(max, min, "valid").unwrap();
        assert!(limits.set_min(min + 1.0).is_err());
        assert!(limits.set_max(f64::NAN).is_err());
        assert_eq!(limits.min(), max);
        assert_eq!(limits.max(), min);
    }
}

#[test]
fn test_transform_round_trip() {
    let mut rng = seeded_rng(1234);
    let bounded = BoundedTransform::new(Limits::<f64>::new(-5.0, 5.0, "box").unwrap());
    let lower = BoundedTransform::new(Limits::<f64>::lower(2.0).unwrap());
    let upper = BoundedTransform::new(Limits::<f64>::upper(-2.0).unwrap());

    for _ in 0..SAMPLES {
        let positive = rng.gen_range(1e-3..1e3);
        let real = rng.gen_range(-1e3..1e3);

        let cases: [(&dyn Transform<f64>, f64); 6] = [
            (&IdentityTransform, real),
            (&LogTransform, positive),
            (&Log10Transform, positive),
            (&bounded, rng.gen_range(-4.99..4.99)),
            (&lower, 2.0 + positive),
            (&upper, -2.0 - positive),
        ];
        for (transform, x) in cases {
            let back = transform.reverse(transform.forward(x));
            assert!(
                approx_eq(back, x, 1e-9 * x.abs().max(1.0)),
                "{}: {} -> {}",
                transform,
                x,
                back
            );
        }
    }
}

#[test]
fn test_set_value_succeeds_iff_within_limits() {
    let mut rng = seeded_rng(99);
    for _ in 0..SAMPLES {
        let limits = Arc::new(random_limits(&mut rng, 50.0));
        let mut param = RealParameter::builder()
            .value(limits.min())
            .limits(Arc::clone(&limits))
            .build()
            .unwrap();

        let v = rng.gen_range(-100.0..100.0);
        let before = param.value();
        match param.set_value(v) {
            Ok(()) => {
                assert!(limits.check(v));
                assert_eq!(param.value(), v);
                assert_eq!(param.value_transformed(), param.transform().forward(v));
            }
            Err(_) => {
                assert!(!limits.check(v));
                assert_eq!(param.value(), before);
            }
        }
    }
}

#[test]
fn test_set_value_transformed_matches_reverse() {
    let mut rng = seeded_rng(5);
    for _ in 0..SAMPLES {
        let mut direct = RealParameter::builder()
            .value(1.0)
            .limits(Arc::new(Limits::<f64>::new(1e-3, 1e3, "log").unwrap()))
            .transform(Arc::new(LogTransform))
            .build()
            .unwrap();
        let mut via_reverse = direct.clone();

        let t = rng.gen_range(-10.0..10.0);
        let lhs = direct.set_value_transformed(t);
        let rhs = via_reverse.set_value(via_reverse.transform().reverse(t));
        assert_eq!(lhs.is_ok(), rhs.is_ok());
        assert_eq!(direct.value(), via_reverse.value());
    }
}

#[test]
fn test_propagation_is_all_or_nothing() {
    let mut rng = seeded_rng(2024);
    for _ in 0..50 {
        let mut registry = ParameterRegistry::new();
        let parent = registry.insert(RealParameter::new(0.0).unwrap());
        let children: Vec<_> = (0..5)
            .map(|_| {
                let max = rng.gen_range(1.0..10.0);
                let param = RealParameter::builder()
                    .limits(Arc::new(Limits::<f64>::new(-max, max, "child").unwrap()))
                    .build()
                    .unwrap();
                registry.insert(param)
            })
            .collect();
        for &child in &children {
            registry.add_inheritor(parent, child).unwrap();
        }

        let v = rng.gen_range(-10.0..10.0);
        let accepted = children
            .iter()
            .all(|&child| registry.get(child).unwrap().limits().check(v));
        let result = registry.set_value(parent, v);
        assert_eq!(result.is_ok(), accepted);

        let expected = if accepted { v } else { 0.0 };
        assert_eq!(registry.value(parent).unwrap(), expected);
        for &child in &children {
            assert_eq!(registry.value(child).unwrap(), expected);
        }
    }
}
