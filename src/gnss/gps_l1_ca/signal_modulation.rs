
use num_complex::Complex;
use num_traits::Zero;

use crate::Result;
use crate::fourier_analysis::Transform;
use super::{code, CHIP_RATE_HZ};
use super::catalog::SatelliteCode;

pub fn samples_per_code(fs:u32) -> usize { (fs / 1000) as usize }

/// One code period sampled at `fs`: +1.0 where the chip is set, -1.0 where it isn't
pub fn prn_real_sampled(sv:&SatelliteCode, fs:u32) -> Vec<f64> {
	let samples_per_chip:f64 = fs as f64 / CHIP_RATE_HZ;

	(0..samples_per_code(fs)).map(|i| {
		let chip_idx:usize = (i as f64 / samples_per_chip) as usize;
		if code::chip(sv, chip_idx) { 1.0 } else { -1.0 }
	}).collect()
}

/// Half spectrum of one sampled code period, `code_len/2 + 1` bins
#[derive(Debug, Clone)]
pub struct ReplicaSpectrum {
	pub code_len: usize,
	pub bins: Vec<Complex<f64>>,
}

impl ReplicaSpectrum {

	pub fn new<T: Transform>(sv:&SatelliteCode, fs:u32, fft:&mut T) -> Result<Self> {
		let mut samples = prn_real_sampled(sv, fs);
		let code_len = samples.len();
		let mut bins:Vec<Complex<f64>> = vec![Complex::zero(); code_len/2 + 1];
		fft.forward_real(&mut samples, &mut bins)?;
		Ok(Self{ code_len, bins })
	}

}
