//! Integration tests for the Parameter struct
//!
//! These tests verify that the Parameter struct behaves correctly in various scenarios.

use crate::test_helpers::{approx_eq, bounded_real};
use modelfit_params::parameters::{
    BoundedTransform, Category, CategoryDefaults, Limits, LogTransform, NonNegativeParameter, Parameter,
    ParameterBase, ParameterError, PositiveParameter, RealParameter,
};
use modelfit_params::unit::{NamedUnit, Unit, UnitNone};
use modelfit_params::{ErrorKind, LimitsPolicy};
use std::f64::{INFINITY, NEG_INFINITY};
use std::sync::Arc;

/// An angle in radians, restricted to one turn
struct Angle;

impl Category<f64> for Angle {
    const NAME: &'static str = "angle";
    const DESCRIPTION: &'static str = "Angle in radians";
    const LINEAR: bool = true;

    fn min() -> f64 {
        -std::f64::consts::PI
    }
    fn max() -> f64 {
        std::f64::consts::PI
    }
}

#[test]
fn test_parameter_lifecycle() {
    // Create a parameter
    let mut param = RealParameter::new(10.0).unwrap();

    // Check initial state
    assert_eq!(param.name(), "real");
    assert_eq!(param.value(), 10.0);
    assert_eq!(param.value_transformed(), 10.0);
    assert!(param.free());
    assert_eq!(param.category_min(), NEG_INFINITY);
    assert_eq!(param.category_max(), INFINITY);
    assert!(param.inheritee().is_none());

    // Change value
    param.set_value(15.0).unwrap();
    assert_eq!(param.value(), 15.0);

    // Set limits
    param
        .set_limits(Some(Arc::new(Limits::new(0.0, 20.0, "range").unwrap())))
        .unwrap();
    assert_eq!(param.limits().min(), 0.0);
    assert_eq!(param.limits().max(), 20.0);

    // Set value outside limits (should fail)
    assert!(param.set_value(-5.0).is_err());
    assert!(param.set_value(25.0).is_err());
    assert_eq!(param.value(), 15.0);

    // Fix and free
    param.set_fixed(true).unwrap();
    assert!(param.fixed());
    param.set_free(true).unwrap();
    assert!(param.free());

    // Label
    param.set_label("amplitude".to_string());
    assert_eq!(param.label(), "amplitude");
    assert_eq!(
        param.to_string(),
        "real(value=15, limits=Limits(0, 20, 'range'), label='amplitude')"
    );
}

#[test]
fn test_custom_category() {
    let param = Parameter::<f64, Angle>::try_default().unwrap();
    assert_eq!(param.name(), "angle");
    assert_eq!(param.description(), "Angle in radians");
    assert!(param.linear());
    assert_eq!(param.value(), 0.0);

    assert!(Parameter::<f64, Angle>::new(4.0).is_err());

    let err = Parameter::<f64, Angle>::builder()
        .limits(Arc::new(Limits::new(-4.0, 0.0, "wide").unwrap()))
        .build()
        .unwrap_err();
    assert!(matches!(err, ParameterError::LimitsExceedCategory { .. }));
    assert_eq!(err.kind(), ErrorKind::BoundsViolation);
}

#[test]
fn test_non_negative_category() {
    let mut param = NonNegativeParameter::try_default().unwrap();
    assert_eq!(param.category_min(), 0.0);
    assert!(!param.limits().check(-1.0));

    let result = param.set_limits(Some(Arc::new(Limits::new(-1.0, 1.0, "neg").unwrap())));
    assert!(result.is_err());

    // Narrower limits are fine
    param
        .set_limits(Some(Arc::new(Limits::new(0.5, 1.0, "narrow").unwrap())))
        .unwrap();
    assert_eq!(param.value(), 0.5);
}

#[test]
fn test_positive_category() {
    let param = PositiveParameter::try_default().unwrap();
    assert_eq!(param.value(), 1.0);
    assert!(param.category_min() > 0.0);
    assert!(PositiveParameter::new(0.0).is_err());
    assert!(PositiveParameter::new(f64::MIN_POSITIVE).is_ok());
}

#[test]
fn test_log_transform_parameter() {
    let mut param = PositiveParameter::builder()
        .value(std::f64::consts::E)
        .transform(Arc::new(LogTransform))
        .build()
        .unwrap();
    assert!(approx_eq(param.value_transformed(), 1.0, 1e-12));
    assert!(approx_eq(param.transform_derivative(), 1.0 / std::f64::consts::E, 1e-12));

    param.set_value_transformed(2.0).unwrap();
    assert!(approx_eq(param.value(), 2f64.exp(), 1e-12));

    assert_eq!(
        param.to_string(),
        format!("positive(value={}, transform=LogTransform())", param.value())
    );
}

#[test]
fn test_limits_policy_keep() {
    let mut param = bounded_real(5.0, 0.0, 10.0);
    let narrow = Arc::new(Limits::new(0.0, 1.0, "narrow").unwrap());

    param
        .set_limits_with(Some(Arc::clone(&narrow)), LimitsPolicy::Keep)
        .unwrap();
    assert_eq!(param.value(), 5.0);
    assert!(Arc::ptr_eq(&param.limits_arc(), &narrow));

    // The next successful write restores the invariant
    assert!(param.set_value(5.0).is_err());
    param.set_value(0.5).unwrap();
    assert!(param.limits().check(param.value()));
}

#[test]
fn test_shared_handles() {
    let defaults = CategoryDefaults::<f64, Angle>::new().unwrap();
    let unit: Arc<dyn Unit> = Arc::new(NamedUnit::new("rad"));

    let params: Vec<Parameter<f64, Angle>> = (0..3)
        .map(|i| {
            Parameter::builder()
                .value(i as f64 * 0.5)
                .unit(Arc::clone(&unit))
                .defaults(defaults.clone())
                .build()
                .unwrap()
        })
        .collect();

    for param in &params {
        assert!(param.is_limits_maximal());
        assert!(Arc::ptr_eq(&param.limits_arc(), defaults.limits_maximal()));
        assert_eq!(param.unit().map(|u| u.name()), Some("rad"));
    }
    assert_eq!(Arc::strong_count(&unit), 4);

    let mut param = params[0].clone();
    param.set_unit(Some(Arc::new(UnitNone)));
    assert_eq!(param.unit().unwrap().name(), "None");
}

#[test]
fn test_identity_not_value_equality() {
    let p1 = bounded_real(1.0, 0.0, 2.0);
    let p2 = bounded_real(1.0, 0.0, 2.0);
    assert_eq!(p1.value(), p2.value());
    assert_eq!(p1.limits(), p2.limits());
    assert_ne!(p1, p2);
    assert_ne!(p1.id(), p2.id());

    // Clones are new parameters
    let p3 = p1.clone();
    assert_ne!(p1, p3);
    assert!(p1.id() < p3.id());
}

#[test]
fn test_bounded_transform_on_single_value_limits() {
    let limits = Limits::new(2.0, 2.0, "point").unwrap();
    let mut param = RealParameter::builder()
        .value(2.0)
        .limits(Arc::new(limits.clone()))
        .transform(Arc::new(BoundedTransform::new(limits)))
        .build()
        .unwrap();
    assert_eq!(param.value_transformed(), 0.0);
    assert_eq!(param.transform_derivative(), 0.0);

    param.set_value_transformed(1.0).unwrap();
    assert_eq!(param.value(), 2.0);
    assert!(!param.value_transformed().is_nan());
}
