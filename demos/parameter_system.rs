//! Example demonstrating the parameter system for a Gaussian source model
//!
//! This example shows how to define parameters with limits and transforms, tie
//! parameters together through inheritance, and drive them from the transformed
//! scale the way an optimizer would.

use modelfit_params::parameters::{
    BoundedTransform, Limits, LogTransform, NonNegativeParameter, ParameterBase,
    ParameterRegistry, PositiveParameter, RealParameter,
};
use modelfit_params::unit::{NamedUnit, Unit};
use modelfit_params::{ParamId, ParameterConfig, Propagation, Result};
use std::sync::Arc;

/// Parameters of a circular Gaussian: f(x, y) = flux / (2 pi sigma^2) * exp(-r^2 / (2 sigma^2))
struct GaussianSource {
    registry: ParameterRegistry<f64>,
    flux: ParamId,
    cen_x: ParamId,
    cen_y: ParamId,
    sigma_x: ParamId,
    sigma_y: ParamId,
}

impl GaussianSource {
    fn new() -> Result<Self> {
        let config = ParameterConfig::new().with_propagation(Propagation::AllOrNothing);
        let mut registry = ParameterRegistry::with_config(config);

        let pixels: Arc<dyn Unit> = Arc::new(NamedUnit::new("pixel"));
        let centroid_limits = Arc::new(Limits::new(-10.0, 10.0, "centroid")?);

        // Flux is fitted on a log scale
        let flux = registry.insert(
            PositiveParameter::builder()
                .value(100.0)
                .limits(Arc::new(Limits::new(1e-3, 1e6, "flux")?))
                .transform(Arc::new(LogTransform))
                .unit(Arc::new(NamedUnit::new("nJy")))
                .label("flux")
                .build()?,
        );

        // Centroids live inside the image, so a bounded transform keeps them there
        let centroid = |label: &str| {
            RealParameter::builder()
                .limits(Arc::clone(&centroid_limits))
                .transform(Arc::new(BoundedTransform::new(Limits::clone(&centroid_limits))))
                .unit(Arc::clone(&pixels))
                .label(label)
                .build()
        };
        let cen_x = registry.insert(centroid("cen_x")?);
        let cen_y = registry.insert(centroid("cen_y")?);

        // A circular source has one width, so sigma_y follows sigma_x
        let sigma = |label: &str| {
            NonNegativeParameter::builder()
                .value(1.0)
                .unit(Arc::clone(&pixels))
                .label(label)
                .build()
        };
        let sigma_x = registry.insert(sigma("sigma_x")?);
        let sigma_y = registry.insert(sigma("sigma_y")?);
        registry.add_inheritor(sigma_x, sigma_y)?;

        Ok(Self {
            registry,
            flux,
            cen_x,
            cen_y,
            sigma_x,
            sigma_y,
        })
    }

    fn evaluate(&self, x: f64, y: f64) -> Result<f64> {
        let flux = self.registry.value(self.flux)?;
        let (cx, cy) = (self.registry.value(self.cen_x)?, self.registry.value(self.cen_y)?);
        let (sx, sy) = (self.registry.value(self.sigma_x)?, self.registry.value(self.sigma_y)?);

        let norm = flux / (2.0 * std::f64::consts::PI * sx * sy);
        let r2 = (x - cx).powi(2) / (2.0 * sx * sx) + (y - cy).powi(2) / (2.0 * sy * sy);
        Ok(norm * (-r2).exp())
    }

    /// Ids of the parameters an optimizer may vary
    fn free_parameters(&self) -> Vec<ParamId> {
        self.registry
            .iter()
            .filter(|param| param.free())
            .map(|param| param.id())
            .collect()
    }

    fn print_parameters(&self) {
        for param in self.registry.iter() {
            let unit = param.unit().map(|u| u.name()).unwrap_or("");
            println!(
                "  {:8} = {:10.4} {:6} (transformed {:10.4}, free: {})",
                param.label(),
                param.value(),
                unit,
                param.value_transformed(),
                param.free()
            );
        }
    }
}

fn main() -> Result<()> {
    println!("Parameter system example");
    println!("========================\n");

    let mut source = GaussianSource::new()?;
    println!("Initial parameters:");
    source.print_parameters();

    // An optimizer only sees the free parameters, on their transformed scale
    let free = source.free_parameters();
    println!("\nFree parameters: {}", free.len());

    let data: Vec<(f64, f64, f64)> = [(-1.0, 0.5), (0.0, 0.0), (0.5, 1.0), (2.0, -1.0)]
        .iter()
        .map(|&(x, y)| {
            let r2 = (x - 0.5f64).powi(2) + (y + 0.25f64).powi(2);
            let z = 250.0 / (2.0 * std::f64::consts::PI * 1.5 * 1.5) * (-r2 / (2.0 * 1.5 * 1.5)).exp();
            (x, y, z)
        })
        .collect();

    // Coordinate descent with fixed steps on the transformed scale
    let mut step = 0.5;
    for iteration in 0..200 {
        let mut improved = false;
        for &id in &free {
            let start = source.registry.value_transformed(id)?;
            let mut best = (chi2(&source, &data)?, start);
            for candidate in [start - step, start + step] {
                if source.registry.set_value_transformed(id, candidate).is_ok() {
                    let score = chi2(&source, &data)?;
                    if score < best.0 {
                        best = (score, candidate);
                    }
                }
            }
            source.registry.set_value_transformed(id, best.1)?;
            improved |= best.1 != start;
        }
        if !improved {
            step /= 2.0;
            if step < 1e-8 {
                println!("\nConverged after {} iterations", iteration + 1);
                break;
            }
        }
    }

    println!("\nFitted parameters:");
    source.print_parameters();
    println!("\nchi2 = {:.6e}", chi2(&source, &data)?);

    // Writes outside the limits are rejected and leave every parameter unchanged
    let width = source.registry.value(source.sigma_x)?;
    if let Err(err) = source.registry.set_value(source.sigma_x, -1.0) {
        println!("\nRejected sigma_x = -1: {}", err);
    }
    assert_eq!(source.registry.value(source.sigma_y)?, width);

    Ok(())
}

fn chi2(source: &GaussianSource, data: &[(f64, f64, f64)]) -> Result<f64> {
    data.iter().try_fold(0.0, |acc, &(x, y, z)| {
        let residual = source.evaluate(x, y)? - z;
        Ok(acc + residual * residual)
    })
}
