
use std::sync::Arc;

use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftPlanner};

use crate::{DigSigProcErr, Result};

/// Unnormalized discrete Fourier transforms.  Nothing here scales by the length, so a
/// forward/inverse pair multiplies the input by `len`.
pub trait Transform {
	/// Complex to complex, in place
	fn forward(&mut self, buffer:&mut [Complex<f64>]) -> Result<()>;

	/// Real to complex half spectrum; `output` must hold `input.len()/2 + 1` bins.  The
	/// contents of `input` are not preserved.
	fn forward_real(&mut self, input:&mut [f64], output:&mut [Complex<f64>]) -> Result<()>;

	/// Complex to complex inverse, in place
	fn inverse(&mut self, buffer:&mut [Complex<f64>]) -> Result<()>;
}

/// `Transform` backed by rustfft and realfft.  Both planners cache plans by length, so a
/// long-lived instance only plans each size once.  Planners aren't shared between
/// threads; give each worker its own instance.
pub struct RustFftTransform {
	complex_planner: FftPlanner<f64>,
	real_planner: RealFftPlanner<f64>,
}

impl RustFftTransform {

	pub fn new() -> Self {
		Self { complex_planner: FftPlanner::new(), real_planner: RealFftPlanner::new() }
	}

	fn run_complex(fft:Arc<dyn Fft<f64>>, buffer:&mut [Complex<f64>]) -> Result<()> {
		if buffer.len() != fft.len() {
			return Err(DigSigProcErr::Transform(format!("buffer of {} for a length {} plan", buffer.len(), fft.len())));
		}
		fft.process(buffer);
		Ok(())
	}

}

impl Default for RustFftTransform {
	fn default() -> Self { Self::new() }
}

impl Transform for RustFftTransform {

	fn forward(&mut self, buffer:&mut [Complex<f64>]) -> Result<()> {
		if buffer.is_empty() { return Err(DigSigProcErr::Transform("empty input".into())); }
		let fft = self.complex_planner.plan_fft_forward(buffer.len());
		Self::run_complex(fft, buffer)
	}

	fn forward_real(&mut self, input:&mut [f64], output:&mut [Complex<f64>]) -> Result<()> {
		if input.is_empty() { return Err(DigSigProcErr::Transform("empty input".into())); }
		let r2c:Arc<dyn RealToComplex<f64>> = self.real_planner.plan_fft_forward(input.len());
		r2c.process(input, output)?;
		Ok(())
	}

	fn inverse(&mut self, buffer:&mut [Complex<f64>]) -> Result<()> {
		if buffer.is_empty() { return Err(DigSigProcErr::Transform("empty input".into())); }
		let ifft = self.complex_planner.plan_fft_inverse(buffer.len());
		Self::run_complex(ifft, buffer)
	}

}
