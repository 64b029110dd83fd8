
pub mod correlation;
pub mod peak;

#[cfg(test)]
mod tests;

use log::{debug, info, warn};
use num_complex::Complex;
use rayon::prelude::*;
use serde::Serialize;

use crate::{DigSigProcErr, Result};
use crate::config::AcquisitionConfig;
use crate::fourier_analysis::Transform;
use crate::gnss::gps_l1_ca::catalog::{SatelliteCode, SATELLITES};
use crate::gnss::gps_l1_ca::signal_modulation::{self, ReplicaSpectrum};

pub use self::correlation::CorrelationSearch;
pub use self::peak::{DopplerBin, PeakState, SignalStrength};

/// Conjugated forward transform of the whole analysis window
#[derive(Debug, Clone)]
pub struct SignalSpectrum {
	pub sample_rate_sps: u32,
	pub bins: Vec<Complex<f64>>,
}

impl SignalSpectrum {

	pub fn new<T: Transform>(mut samples:Vec<Complex<f64>>, sample_rate_sps:u32, fft:&mut T) -> Result<Self> {
		fft.forward(&mut samples)?;
		for c in samples.iter_mut() { *c = c.conj(); }
		Ok(Self{ sample_rate_sps, bins: samples })
	}

	pub fn code_len(&self) -> usize { signal_modulation::samples_per_code(self.sample_rate_sps) }
	pub fn bin_width_hz(&self) -> f64 { self.sample_rate_sps as f64 / self.bins.len() as f64 }

}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcquisitionRecord {
	pub prn: u8,
	pub navstar: u8,
	pub snr: f64,
	pub doppler_hz: f64,
	pub code_phase: f64,
	pub detected: bool,
}

/// Searches one analysis window for every satellite in the catalog.  Satellites are
/// independent of each other; the only shared state is the read-only signal spectrum.
pub struct Acquisition<'a> {
	spectrum: &'a SignalSpectrum,
	search: CorrelationSearch<'a>,
	pub detection_threshold: f64,
}

impl<'a> Acquisition<'a> {

	pub fn new(spectrum:&'a SignalSpectrum, max_doppler_hz:u32, detection_threshold:f64) -> Result<Self> {
		let search = CorrelationSearch::new(spectrum, max_doppler_hz)?;
		debug!("Searching {} Doppler bins of {:.3} [Hz] over {} samples", 2*search.max_shift() + 1, search.bin_width_hz(), spectrum.bins.len());
		Ok(Self{ spectrum, search, detection_threshold })
	}

	pub fn from_config(spectrum:&'a SignalSpectrum, config:&AcquisitionConfig) -> Result<Self> {
		Self::new(spectrum, config.max_doppler_hz, config.detection_threshold)
	}

	pub fn max_doppler_searched_hz(&self) -> f64 { self.search.max_shift() as f64 * self.search.bin_width_hz() }

	pub fn acquire_satellite<T: Transform>(&self, sv:&SatelliteCode, fft:&mut T) -> Result<SignalStrength> {
		let replica = ReplicaSpectrum::new(sv, self.spectrum.sample_rate_sps, fft)?;
		let strength = self.search.search(&replica, fft)?;
		debug!("PRN {:02}: S/N {:.3}, {:.2} [Hz], {:.3} [chips]", sv.prn, strength.snr, strength.doppler_hz, strength.code_phase);
		Ok(strength)
	}

	fn record<T: Transform>(&self, sv:&SatelliteCode, fft:&mut T) -> Result<AcquisitionRecord> {
		let strength = self.acquire_satellite(sv, fft)?;
		Ok(AcquisitionRecord {
			prn:        sv.prn,
			navstar:    sv.navstar,
			snr:        strength.snr,
			doppler_hz: strength.doppler_hz,
			code_phase: strength.code_phase,
			detected:   strength.snr >= self.detection_threshold,
		})
	}

	/// One satellite after another, reusing a single transform context
	pub fn acquire_all<T: Transform>(&self, fft:&mut T) -> Result<Vec<AcquisitionRecord>> {
		let records = SATELLITES.iter().map(|sv| self.record(sv, fft)).collect::<Result<Vec<_>>>()?;
		self.summarize(&records);
		Ok(records)
	}

	/// One satellite per worker; each worker builds its own transform context.  Results come
	/// back in catalog order and match `acquire_all` exactly.
	pub fn acquire_all_parallel<T: Transform + Default>(&self) -> Result<Vec<AcquisitionRecord>> {
		let records = SATELLITES.par_iter()
			.map_init(T::default, |fft, sv| self.record(sv, fft))
			.collect::<Result<Vec<_>>>()?;
		self.summarize(&records);
		Ok(records)
	}

	fn summarize(&self, records:&[AcquisitionRecord]) {
		let detected:Vec<u8> = records.iter().filter(|r| r.detected).map(|r| r.prn).collect();
		if detected.is_empty() {
			warn!("No satellite reached S/N {:.1}", self.detection_threshold);
		} else {
			info!("Detected {} of {} satellites: {:?}", detected.len(), records.len(), detected);
		}
	}

}

/// Full acquisition of the first window of samples as described by `config`.  Samples past
/// the end of the window are ignored.
pub fn acquire<T: Transform + Default>(mut samples:Vec<Complex<f64>>, config:&AcquisitionConfig) -> Result<Vec<AcquisitionRecord>> {
	config.validate()?;
	if samples.len() < config.window_len() {
		return Err(DigSigProcErr::InsufficientSamples{ expected: config.window_len(), actual: samples.len() });
	}
	samples.truncate(config.window_len());

	let mut fft = T::default();
	let spectrum = SignalSpectrum::new(samples, config.sample_rate_sps, &mut fft)?;
	let acq = Acquisition::from_config(&spectrum, config)?;

	if config.parallel { acq.acquire_all_parallel::<T>() }
	else               { acq.acquire_all(&mut fft) }
}
