
use std::collections::VecDeque;

use num_complex::Complex;
use serde::Serialize;

use crate::DigSigProcErr;

pub mod lock_detectors;

/// State of a channel at the end of one coherent integration interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackReport {
	pub prn: u8,
	/// Index of the last sample in this interval
	pub sample_idx: usize,
	pub prompt_i: f64,
	pub prompt_q: f64,
	pub early: f64,
	pub late: f64,
	/// Costas discriminator output [cycles]
	pub carrier_error: f64,
	pub code_error: f64,
	pub carrier_hz: f64,
	/// [chips/sec]
	pub code_freq_hz: f64,
	/// Code phase at the start of the next interval [chips]
	pub code_phase: f64,
	pub cn0_db_hz: f64,
	pub carrier_lock: f64,
	pub locked: bool,
}

#[derive(Debug)]
pub enum TrackingResult {
	NotReady,
	Ok(TrackReport),
	Err(DigSigProcErr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTest {
	/// Not enough prompts yet to judge
	Filling,
	Pass,
	Fail,
	/// Too many failures; the channel should give up
	Lost,
}

/// Carrier lock and C/N0 tests over a sliding window of prompt correlations.  A pass
/// forgives one earlier failure, so only a sustained run of failures loses lock.
pub struct LockMonitor {
	prompt_buffer: VecDeque<Complex<f64>>,
	window: usize,
	coh_integration_time_s: f64,
	fail_count: usize,
	pub fail_limit: usize,
	pub threshold_carrier_lock: f64,
	pub threshold_cn0_db_hz: f64,
	last_cn0_db_hz: f64,
	last_carrier_lock: f64,
}

impl LockMonitor {

	pub fn new(window:usize, coh_integration_time_s:f64, threshold_carrier_lock:f64, threshold_cn0_db_hz:f64, fail_limit:usize) -> Self {
		Self {
			prompt_buffer: VecDeque::with_capacity(window + 1),
			window, coh_integration_time_s, fail_count: 0, fail_limit,
			threshold_carrier_lock, threshold_cn0_db_hz,
			last_cn0_db_hz: 0.0, last_carrier_lock: 0.0,
		}
	}

	pub fn last_cn0_db_hz(&self) -> f64 { self.last_cn0_db_hz }
	pub fn last_carrier_lock(&self) -> f64 { self.last_carrier_lock }

	pub fn update(&mut self, prompt:Complex<f64>) -> LockTest {
		self.prompt_buffer.push_back(prompt);
		while self.prompt_buffer.len() > self.window { self.prompt_buffer.pop_front(); }
		if self.prompt_buffer.len() < self.window { return LockTest::Filling; }

		self.last_cn0_db_hz = lock_detectors::cn0_svn_estimator(&self.prompt_buffer, self.coh_integration_time_s);
		self.last_carrier_lock = lock_detectors::carrier_lock_detector(&self.prompt_buffer);

		// NaN fails both comparisons
		if self.last_carrier_lock >= self.threshold_carrier_lock && self.last_cn0_db_hz >= self.threshold_cn0_db_hz {
			self.fail_count = self.fail_count.saturating_sub(1);
			LockTest::Pass
		} else {
			self.fail_count += 1;
			if self.fail_count > self.fail_limit { LockTest::Lost } else { LockTest::Fail }
		}
	}

	pub fn initialize(&mut self) {
		self.prompt_buffer.clear();
		self.fail_count = 0;
		self.last_cn0_db_hz = 0.0;
		self.last_carrier_lock = 0.0;
	}

}
