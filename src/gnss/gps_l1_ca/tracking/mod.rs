
use std::f64::consts;

use log::{debug, warn};
use num_complex::Complex;
use rayon::prelude::*;
use serde::Serialize;

use crate::{DigSigProcErr, Result};
use crate::config::TrackingConfig;
use crate::filters::{LoopFilter, ScalarFilter};
use crate::gnss::acquisition::AcquisitionRecord;
use crate::gnss::tracking::{LockMonitor, LockTest, TrackReport, TrackingResult};
use super::{code, catalog, CHIP_RATE_HZ, CODE_LENGTH, L1_CARRIER_HZ};
use super::catalog::SatelliteCode;

pub mod bit_sync;


pub use self::bit_sync::NavigationBits;

pub const SYMBOL_LEN_SEC:f64 = 1.0e-3;

const ZERO:Complex<f64> = Complex{ re: 0.0, im: 0.0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackingState {
	PullIn,
	Locked,
	LostLock,
}

/// Early/prompt/late code correlator with a DLL on the code and a Costas PLL on the carrier,
/// fed one complex sample at a time.  Loops are updated at the end of every code period.
pub struct Tracking {
	pub prn: u8,
	pub fs: f64,
	pub state: TrackingState,
	local_code: Vec<i8>,
	early_late_spacing: f64,

	// Carrier
	acq_doppler_hz: f64,
	carrier_hz: f64,
	carrier_phase_rad: f64,
	carrier_filter: LoopFilter,

	// Code
	code_freq_basis_hz: f64,
	code_freq_hz: f64,
	code_phase: f64,
	code_filter: LoopFilter,

	// Used during summation over one code period
	sum_early:  Complex<f64>,
	sum_prompt: Complex<f64>,
	sum_late:   Complex<f64>,
	sample_idx: usize,

	lock: LockMonitor,
}

impl Tracking {

	/// Starts tracking at the first sample with the code phase [chips] and Doppler [Hz]
	/// found by acquisition
	pub fn new(sv:&SatelliteCode, acq_doppler_hz:f64, acq_code_phase:f64, fs:u32, config:&TrackingConfig) -> Self {
		let mut trk = Self {
			prn: sv.prn,
			fs: fs as f64,
			state: TrackingState::PullIn,
			local_code: code::prn_int(sv),
			early_late_spacing: config.early_late_spacing_chips,

			acq_doppler_hz: 0.0, carrier_hz: 0.0, carrier_phase_rad: 0.0,
			carrier_filter: LoopFilter::new(&config.pll, SYMBOL_LEN_SEC),

			code_freq_basis_hz: CHIP_RATE_HZ, code_freq_hz: CHIP_RATE_HZ, code_phase: 0.0,
			code_filter: LoopFilter::new(&config.dll, SYMBOL_LEN_SEC),

			sum_early: ZERO, sum_prompt: ZERO, sum_late: ZERO, sample_idx: 0,

			lock: LockMonitor::new(bit_sync::PROMPTS_PER_BIT, SYMBOL_LEN_SEC,
				config.carrier_lock_threshold, config.cn0_threshold_db_hz, config.lock_fail_limit),
		};
		trk.initialize(acq_doppler_hz, acq_code_phase);
		trk
	}

	pub fn from_record(record:&AcquisitionRecord, fs:u32, config:&TrackingConfig) -> Result<Self> {
		let sv = catalog::by_prn(record.prn).ok_or_else(|| DigSigProcErr::InvalidConfig(format!("no L1 CA code for PRN {}", record.prn)))?;
		Ok(Self::new(sv, record.doppler_hz, record.code_phase, fs, config))
	}

	pub fn carrier_freq_hz(&self) -> f64 { self.carrier_hz }
	pub fn carrier_phase_rad(&self) -> f64 { self.carrier_phase_rad }
	pub fn code_freq_hz(&self) -> f64 { self.code_freq_hz }
	pub fn code_phase_chips(&self) -> f64 { self.code_phase }

	fn local_chip(&self, phase:f64) -> f64 {
		self.local_code[(phase.floor() as i64).rem_euclid(CODE_LENGTH as i64) as usize] as f64
	}

	// Public interface
	/// Takes the next complex sample.  Returns a report at the end of every code period.
	pub fn apply(&mut self, sample:Complex<f64>) -> TrackingResult {
		if self.state == TrackingState::LostLock { return TrackingResult::Err(DigSigProcErr::LossOfLock); }

		// Remove the carrier
		let x = sample * Complex::from_polar(1.0, -self.carrier_phase_rad);
		self.carrier_phase_rad += 2.0 * consts::PI * self.carrier_hz / self.fs;

		self.sum_early  += x * self.local_chip(self.code_phase - self.early_late_spacing);
		self.sum_prompt += x * self.local_chip(self.code_phase);
		self.sum_late   += x * self.local_chip(self.code_phase + self.early_late_spacing);
		self.code_phase += self.code_freq_hz / self.fs;

		let result = if self.code_phase >= CODE_LENGTH as f64 { self.end_of_period() } else { TrackingResult::NotReady };
		self.sample_idx += 1;
		result
	}

	fn end_of_period(&mut self) -> TrackingResult {
		self.code_phase -= CODE_LENGTH as f64;
		self.carrier_phase_rad = self.carrier_phase_rad.rem_euclid(2.0 * consts::PI);

		// Costas discriminator is insensitive to data bits; carrier_error has units [cycles]
		let prompt = self.sum_prompt;
		let carrier_error = if prompt.re == 0.0 { 0.0 } else { (prompt.im / prompt.re).atan() / (2.0 * consts::PI) };
		self.carrier_hz = self.acq_doppler_hz + self.carrier_filter.apply(carrier_error);

		// Normalized early minus late envelope
		let (e, l) = (self.sum_early.norm(), self.sum_late.norm());
		let code_error = if e + l == 0.0 { 0.0 } else { (e - l) / (e + l) };
		self.code_freq_hz = self.code_freq_basis_hz - self.code_filter.apply(code_error);

		let next_state = match (self.state, self.lock.update(prompt)) {
			(_, LockTest::Lost)                  => TrackingState::LostLock,
			(TrackingState::PullIn, LockTest::Pass) => TrackingState::Locked,
			(state, _)                           => state,
		};
		if next_state != self.state {
			debug!("PRN {:02}: {:?} -> {:?} after {} samples", self.prn, self.state, next_state, self.sample_idx + 1);
		}
		self.state = next_state;

		let report = TrackReport {
			prn: self.prn,
			sample_idx: self.sample_idx,
			prompt_i: prompt.re,
			prompt_q: prompt.im,
			early: e,
			late: l,
			carrier_error,
			code_error,
			carrier_hz: self.carrier_hz,
			code_freq_hz: self.code_freq_hz,
			code_phase: self.code_phase,
			cn0_db_hz: self.lock.last_cn0_db_hz(),
			carrier_lock: self.lock.last_carrier_lock(),
			locked: self.state == TrackingState::Locked,
		};

		// Reset the accumulators for the next period
		self.sum_early  = ZERO;
		self.sum_prompt = ZERO;
		self.sum_late   = ZERO;

		match self.state {
			TrackingState::LostLock => {
				warn!("PRN {:02}: loss of lock at sample {}", self.prn, self.sample_idx);
				TrackingResult::Err(DigSigProcErr::LossOfLock)
			},
			_ => TrackingResult::Ok(report),
		}
	}

	/// Restarts both loops from a new acquisition.  The next sample is taken to be at
	/// `acq_code_phase` [chips].
	pub fn initialize(&mut self, acq_doppler_hz:f64, acq_code_phase:f64) {
		self.acq_doppler_hz    = acq_doppler_hz;
		self.carrier_hz        = acq_doppler_hz;
		self.carrier_phase_rad = 0.0;

		// The code is Doppler shifted by the same fraction as the carrier
		let radial_velocity_factor:f64 = (L1_CARRIER_HZ + acq_doppler_hz) / L1_CARRIER_HZ;
		self.code_freq_basis_hz = radial_velocity_factor * CHIP_RATE_HZ;
		self.code_freq_hz       = self.code_freq_basis_hz;
		self.code_phase         = acq_code_phase.rem_euclid(CODE_LENGTH as f64);

		self.carrier_filter.initialize();
		self.code_filter.initialize();
		self.lock.initialize();

		self.sum_early  = ZERO;
		self.sum_prompt = ZERO;
		self.sum_late   = ZERO;
		self.sample_idx = 0;

		self.state = TrackingState::PullIn;

		// Leave fs, local_code and the loop and lock parameters as is
	}

}

/// Everything one channel produced over a block of samples
#[derive(Debug, Clone, Serialize)]
pub struct TrackingOutcome {
	pub prn: u8,
	pub reports: Vec<TrackReport>,
	/// Sample at which the lock detector gave up, if it did
	pub lost_lock_at: Option<usize>,
}

impl TrackingOutcome {

	pub fn locked(&self) -> bool { self.lost_lock_at.is_none() && self.reports.last().map_or(false, |r| r.locked) }

	/// Bits from the code periods tracked in lock; `first_edge` counts code periods from the
	/// start of tracking
	pub fn navigation_bits(&self) -> Option<NavigationBits> {
		let start = self.reports.iter().position(|r| r.locked)?;
		let prompt_i:Vec<f64> = self.reports[start..].iter().take_while(|r| r.locked).map(|r| r.prompt_i).collect();
		NavigationBits::from_prompts(&prompt_i).map(|nav| NavigationBits{ first_edge: nav.first_edge + start, ..nav })
	}

}

/// Tracks one satellite from the start of `samples` for at most `config.duration_ms`
pub fn track(samples:&[Complex<f64>], record:&AcquisitionRecord, fs:u32, config:&TrackingConfig) -> Result<TrackingOutcome> {
	config.validate()?;
	let mut trk = Tracking::from_record(record, fs, config)?;
	let mut reports:Vec<TrackReport> = Vec::with_capacity(config.duration_ms as usize);
	let mut lost_lock_at:Option<usize> = None;

	for (idx, s) in samples.iter().take(config.duration_len(fs)).enumerate() {
		match trk.apply(*s) {
			TrackingResult::NotReady => {},
			TrackingResult::Ok(report) => reports.push(report),
			TrackingResult::Err(DigSigProcErr::LossOfLock) => {
				lost_lock_at = Some(idx);
				break;
			},
			TrackingResult::Err(e) => return Err(e),
		}
	}

	debug!("PRN {:02}: {} code periods tracked, final state {:?}", record.prn, reports.len(), trk.state);
	Ok(TrackingOutcome{ prn: record.prn, reports, lost_lock_at })
}

/// Tracks every detected satellite over the same samples, in the order given
pub fn track_all(samples:&[Complex<f64>], records:&[AcquisitionRecord], fs:u32, config:&TrackingConfig) -> Result<Vec<TrackingOutcome>> {
	let detected:Vec<&AcquisitionRecord> = records.iter().filter(|r| r.detected).collect();
	if config.parallel {
		detected.par_iter().map(|r| track(samples, r, fs, config)).collect()
	} else {
		detected.iter().map(|r| track(samples, r, fs, config)).collect()
	}
}
