//! Bounded scalar minimization.
//!
//! `BrentBounded` is Brent's method restricted to a closed bracket: golden
//! section steps with parabolic interpolation once three points are known.
//! The step rules and stopping test follow the classic `fminbound` routine,
//! so results agree with it to within `xatol`.

use serde::Serialize;

/// Result of a bounded search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Minimum {
    pub x: f64,
    pub fx: f64,
    pub evaluations: usize,
    /// Stopping tolerance reached without exhausting the evaluation budget
    /// and without NaN.
    pub converged: bool,
}

/// Minimizer of a scalar function over `[lo, hi]`.
pub trait BoundedMinimizer {
    fn minimize(&self, f: &mut dyn FnMut(f64) -> f64, lo: f64, hi: f64) -> Minimum;

    /// Absolute tolerance on `x`.
    fn tolerance(&self) -> f64;

    /// Short identifier used in result records.
    fn name(&self) -> &'static str;
}

/// Brent's bounded method.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BrentBounded {
    pub xatol: f64,
    pub max_evals: usize,
}

impl Default for BrentBounded {
    fn default() -> Self {
        Self {
            xatol: 1e-5,
            max_evals: 500,
        }
    }
}

/// `sign(v)`, with 0 mapped to +1.
#[inline]
fn step_sign(v: f64) -> f64 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

impl BoundedMinimizer for BrentBounded {
    fn minimize(&self, f: &mut dyn FnMut(f64) -> f64, lo: f64, hi: f64) -> Minimum {
        let (mut a, mut b) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        if !(a.is_finite() && b.is_finite()) {
            return Minimum {
                x: f64::NAN,
                fx: f64::NAN,
                evaluations: 0,
                converged: false,
            };
        }
        let sqrt_eps = 2.2e-16f64.sqrt();
        let golden_mean = 0.5 * (3.0 - 5f64.sqrt());

        let mut fulc = a + golden_mean * (b - a);
        let mut nfc = fulc;
        let mut xf = fulc;
        let (mut rat, mut e) = (0.0f64, 0.0f64);
        let mut fx = f(xf);
        let mut evaluations = 1;
        let mut fu = f64::INFINITY;
        let (mut ffulc, mut fnfc) = (fx, fx);
        let mut xm = 0.5 * (a + b);
        let mut tol1 = sqrt_eps * xf.abs() + self.xatol / 3.0;
        let mut tol2 = 2.0 * tol1;
        let mut exhausted = false;

        while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
            let mut golden = true;
            if e.abs() > tol1 {
                // Try a parabola through the three best points.
                golden = false;
                let mut r = (xf - nfc) * (fx - ffulc);
                let mut q = (xf - fulc) * (fx - fnfc);
                let mut p = (xf - fulc) * q - (xf - nfc) * r;
                q = 2.0 * (q - r);
                if q > 0.0 {
                    p = -p;
                }
                q = q.abs();
                r = e;
                e = rat;
                if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                    rat = p / q;
                    let x = xf + rat;
                    if (x - a) < tol2 || (b - x) < tol2 {
                        rat = tol1 * step_sign(xm - xf);
                    }
                } else {
                    golden = true;
                }
            }
            if golden {
                e = if xf >= xm { a - xf } else { b - xf };
                rat = golden_mean * e;
            }

            let x = xf + step_sign(rat) * rat.abs().max(tol1);
            fu = f(x);
            evaluations += 1;

            if fu <= fx {
                if x >= xf {
                    a = xf;
                } else {
                    b = xf;
                }
                fulc = nfc;
                ffulc = fnfc;
                nfc = xf;
                fnfc = fx;
                xf = x;
                fx = fu;
            } else {
                if x < xf {
                    a = x;
                } else {
                    b = x;
                }
                if fu <= fnfc || nfc == xf {
                    fulc = nfc;
                    ffulc = fnfc;
                    nfc = x;
                    fnfc = fu;
                } else if fu <= ffulc || fulc == xf || fulc == nfc {
                    fulc = x;
                    ffulc = fu;
                }
            }

            xm = 0.5 * (a + b);
            tol1 = sqrt_eps * xf.abs() + self.xatol / 3.0;
            tol2 = 2.0 * tol1;

            if evaluations >= self.max_evals {
                exhausted = true;
                break;
            }
        }

        let nan = xf.is_nan() || fx.is_nan() || fu.is_nan();
        if exhausted {
            tracing::warn!(evaluations, x = xf, "bounded search hit its evaluation budget");
        }
        Minimum {
            x: xf,
            fx,
            evaluations,
            converged: !exhausted && !nan,
        }
    }

    fn tolerance(&self) -> f64 {
        self.xatol
    }

    fn name(&self) -> &'static str {
        "brent_bounded"
    }
}
