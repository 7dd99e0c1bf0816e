//! Integration tests for the Transform implementations
//!
//! These tests verify forward/reverse consistency and derivatives of each transform.

use crate::test_helpers::approx_eq;
use modelfit_params::parameters::{
    BoundedTransform, IdentityTransform, Limits, Log10Transform, LogTransform, Transform,
};
use std::f64::consts::LN_10;
use std::f64::INFINITY;

/// Central finite difference of `forward`
fn numerical_derivative(transform: &dyn Transform<f64>, x: f64) -> f64 {
    let h = 1e-6 * x.abs().max(1.0);
    (transform.forward(x + h) - transform.forward(x - h)) / (2.0 * h)
}

#[test]
fn test_identity_transform() {
    let transform = IdentityTransform;
    for x in [-1e6, -1.0, 0.0, 3.5, 1e6] {
        assert_eq!(Transform::<f64>::forward(&transform, x), x);
        assert_eq!(Transform::<f64>::reverse(&transform, x), x);
        assert_eq!(Transform::<f64>::derivative(&transform, x), 1.0);
    }
    assert_eq!(transform.to_string(), "IdentityTransform()");
}

#[test]
fn test_log_transforms() {
    let ln = LogTransform;
    assert_eq!(Transform::<f64>::forward(&ln, 1.0), 0.0);
    assert_eq!(Transform::<f64>::derivative(&ln, 2.0), 0.5);
    assert!(Transform::<f64>::forward(&ln, -1.0).is_nan());

    let log10 = Log10Transform;
    assert!(approx_eq(Transform::<f64>::forward(&log10, 1000.0), 3.0, 1e-12));
    assert!(approx_eq(Transform::<f64>::reverse(&log10, -2.0), 0.01, 1e-15));
    assert!(approx_eq(
        Transform::<f64>::derivative(&log10, 4.0),
        1.0 / (4.0 * LN_10),
        1e-15
    ));
}

#[test]
fn test_derivatives_match_finite_differences() {
    let transforms: Vec<(Box<dyn Transform<f64>>, Vec<f64>)> = vec![
        (Box::new(IdentityTransform), vec![-3.0, 0.0, 2.0]),
        (Box::new(LogTransform), vec![0.5, 1.0, 20.0]),
        (Box::new(Log10Transform), vec![0.5, 1.0, 20.0]),
        (
            Box::new(BoundedTransform::new(Limits::<f64>::new(-2.0, 8.0, "box").unwrap())),
            vec![-1.0, 0.0, 3.0, 7.0],
        ),
        (
            Box::new(BoundedTransform::new(Limits::<f64>::new(1.0, INFINITY, "lower").unwrap())),
            vec![2.0, 5.0, 50.0],
        ),
        (
            Box::new(BoundedTransform::new(Limits::<f64>::upper(1.0).unwrap())),
            vec![-50.0, -5.0, 0.0],
        ),
    ];

    for (transform, points) in &transforms {
        for &x in points {
            let analytic = transform.derivative(x);
            let numeric = numerical_derivative(transform.as_ref(), x);
            assert!(
                approx_eq(analytic, numeric, 1e-5 * analytic.abs().max(1.0)),
                "{} at {}: analytic {} vs numeric {}",
                transform,
                x,
                analytic,
                numeric
            );
        }
    }
}

#[test]
fn test_bounded_transform_stays_inside() {
    let limits = Limits::<f64>::new(0.0, 1.0, "fraction").unwrap();
    let transform = BoundedTransform::new(limits.clone());
    assert_eq!(transform.limits(), &limits);

    for y in [-100.0, -2.0, 0.0, 0.3, 1e4] {
        assert!(limits.check(transform.reverse(y)));
    }

    // Bounds themselves map to finite values
    assert!(transform.forward(0.0).is_finite());
    assert!(transform.forward(1.0).is_finite());
    assert!(transform.to_string().starts_with("BoundedTransform(Limits(0, 1"));
}
