
use std::ops::RangeInclusive;

use log::trace;
use num_complex::Complex;
use num_traits::Zero;

use crate::{DigSigProcErr, Result};
use crate::config;
use crate::fourier_analysis::Transform;
use crate::gnss::gps_l1_ca::CODE_LENGTH;
use crate::gnss::gps_l1_ca::signal_modulation::ReplicaSpectrum;
use super::SignalSpectrum;
use super::peak::{DopplerBin, PeakState, SignalStrength};

/// Circular correlation of one code period against the signal spectrum at every Doppler bin
/// within +/- `max_doppler_hz`.
///
/// The signal spectrum spans a whole number of code periods, so its bins are `decimation`
/// times finer than the replica's.  Taking every `decimation`-th signal bin starting at
/// `shift` lines the replica up with the signal shifted by `shift` fine bins, which gives
/// fine Doppler resolution from a single long transform.
pub struct CorrelationSearch<'a> {
	signal: &'a [Complex<f64>],
	code_len: usize,
	decimation: usize,
	max_shift: i64,
	bin_width_hz: f64,
}

impl<'a> CorrelationSearch<'a> {

	pub fn new(spectrum:&'a SignalSpectrum, max_doppler_hz:u32) -> Result<Self> {
		let code_len = spectrum.code_len();
		let signal_len = spectrum.bins.len();
		if code_len == 0 || signal_len == 0 || signal_len % code_len != 0 {
			return Err(DigSigProcErr::SpectrumMismatch{ spectrum_len: signal_len, code_len });
		}

		Ok(Self {
			signal: &spectrum.bins,
			code_len,
			decimation: signal_len / code_len,
			max_shift: config::max_shift(max_doppler_hz, signal_len, spectrum.sample_rate_sps),
			bin_width_hz: spectrum.bin_width_hz(),
		})
	}

	pub fn max_shift(&self) -> i64 { self.max_shift }
	pub fn bin_width_hz(&self) -> f64 { self.bin_width_hz }
	pub fn shifts(&self) -> RangeInclusive<i64> { -self.max_shift..=self.max_shift }

	fn signal_bin(&self, replica_idx:usize, shift:i64) -> Complex<f64> {
		let n = self.signal.len() as i64;
		self.signal[((replica_idx * self.decimation) as i64 + shift).rem_euclid(n) as usize]
	}

	/// Correlation peak for a single Doppler bin.  `buffer` is scratch space reused between
	/// calls.
	pub fn correlate<T: Transform>(&self, shift:i64, replica:&ReplicaSpectrum, buffer:&mut Vec<Complex<f64>>, fft:&mut T) -> Result<DopplerBin> {
		let len = self.code_len;
		if replica.code_len != len || replica.bins.len() != len/2 + 1 {
			return Err(DigSigProcErr::SpectrumMismatch{ spectrum_len: self.signal.len(), code_len: replica.code_len });
		}

		buffer.clear();
		buffer.resize(len, Complex::zero());

		// The signal bins are already conjugated, so these products give correlation rather
		// than convolution.  The replica is real, so its upper half is the conjugate mirror of
		// the lower half.
		for i in 0..(len/2) {
			let mirror = len - 1 - i;
			buffer[i]      = self.signal_bin(i, shift) * replica.bins[i];
			buffer[mirror] = self.signal_bin(mirror, shift) * replica.bins[i+1].conj();
		}

		fft.inverse(buffer)?;

		let mut max_pwr:f64 = 0.0;
		let mut tot_pwr:f64 = 0.0;
		let mut best_idx:usize = 0;
		for (idx, c) in buffer.iter().enumerate() {
			let pwr = c.norm_sqr();
			if pwr > max_pwr {
				max_pwr = pwr;
				best_idx = idx;
			}
			tot_pwr += pwr;
		}

		let snr = if tot_pwr > 0.0 { max_pwr / (tot_pwr / len as f64) } else { 0.0 };
		let code_phase = best_idx as f64 * (CODE_LENGTH as f64 / len as f64);
		trace!("doppler {:9.2} [Hz], code phase {:8.3} [chips], S/N {:.3}", shift as f64 * self.bin_width_hz, code_phase, snr);

		Ok(DopplerBin{ snr, code_phase })
	}

	/// Sweeps every Doppler bin in ascending order and returns the strongest refined peak
	pub fn search<T: Transform>(&self, replica:&ReplicaSpectrum, fft:&mut T) -> Result<SignalStrength> {
		let mut buffer:Vec<Complex<f64>> = Vec::with_capacity(self.code_len);

		let state = self.shifts().try_fold(PeakState::new(self.bin_width_hz), |state, shift| {
			self.correlate(shift, replica, &mut buffer, fft).map(|bin| state.push(shift, bin))
		})?;

		Ok(state.finish())
	}

}
