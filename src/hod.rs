//! Central and satellite occupation functions of the five-parameter HOD.
//!
//! Both functions are pure and are evaluated once per sampler step over
//! the whole mass grid; they allocate nothing beyond the output array.

use crate::kernel::cumulative_spline_kernel;
use crate::params::{HodParam, ParamSpace};

use ndarray::{Array1, ArrayView1, Zip};
use std::f64::consts::SQRT_2;

/// Mean central-galaxy occupation per mass bin.
///
/// A smoothed step in log-mass: the spline-kernel CDF centred on `Mmin`
/// with width `sigma_logM / sqrt(2)`. Non-decreasing in mass.
pub fn central_occupation(
    space: &ParamSpace,
    theta: &[f64],
    mass: ArrayView1<f64>,
) -> Array1<f64> {
    let mmin = space.value(HodParam::Mmin, theta);
    let sigma_logm = space.value(HodParam::SigmaLogM, theta);
    mass.mapv(|m| cumulative_spline_kernel(m.log10(), mmin, sigma_logm / SQRT_2))
}

/// Mean satellite occupation per mass bin: a power law in mass scaled by
/// the central occupation,
/// `central * ((mass - 10^M0) / 10^M1)^alpha`.
///
/// `M0` and `M1` are log-masses and are converted to linear masses here.
/// Bins with `mass < 10^M0` put a negative base under a non-integer
/// exponent and yield NaN; the value propagates unchanged and the
/// posterior turns any non-finite likelihood into a rejection, so such
/// proposals are discarded rather than clamped.
pub fn satellite_occupation(
    space: &ParamSpace,
    theta: &[f64],
    central: ArrayView1<f64>,
    mass: ArrayView1<f64>,
) -> Array1<f64> {
    let m0 = 10_f64.powf(space.value(HodParam::M0, theta));
    let m1 = 10_f64.powf(space.value(HodParam::M1, theta));
    let alpha = space.value(HodParam::Alpha, theta);
    Zip::from(central)
        .and(mass)
        .map_collect(|&cen, &m| cen * ((m - m0) / m1).powf(alpha))
}

/// Log-spaced mass grid covering `[10^log_mmin, 10^log_mmax]` with `n`
/// bins, for evaluating the occupation functions.
pub fn log_mass_grid(log_mmin: f64, log_mmax: f64, n: usize) -> Array1<f64> {
    Array1::linspace(log_mmin, log_mmax, n).mapv(|lg| 10_f64.powf(lg))
}
