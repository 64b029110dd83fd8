
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;

use crate::gnss::gps_l1_ca;
use crate::{DigSigProcErr, Result};

pub const DEFAULT_SAMPLE_RATE_SPS:u32 = 4_000_000;
pub const DEFAULT_WINDOW_MS:u32 = 20;
pub const DEFAULT_MAX_DOPPLER_HZ:u32 = 5000;
pub const DEFAULT_DETECTION_THRESHOLD:f64 = 20.0;

/// Parameters of one acquisition run.  Every field has a default, so a JSON config file
/// only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
	pub sample_rate_sps: u32,
	pub window_ms: u32,
	pub max_doppler_hz: u32,
	pub detection_threshold: f64,
	pub parallel: bool,
}

impl Default for AcquisitionConfig {
	fn default() -> Self {
		Self {
			sample_rate_sps:     DEFAULT_SAMPLE_RATE_SPS,
			window_ms:           DEFAULT_WINDOW_MS,
			max_doppler_hz:      DEFAULT_MAX_DOPPLER_HZ,
			detection_threshold: DEFAULT_DETECTION_THRESHOLD,
			parallel:            false,
		}
	}
}

impl AcquisitionConfig {

	pub fn from_json_file<P: AsRef<Path>>(path:P) -> Result<Self> { read_json(path) }

	pub fn validate(&self) -> Result<()> {
		if self.sample_rate_sps == 0 || self.sample_rate_sps % 1000 != 0 {
			return Err(DigSigProcErr::InvalidConfig(format!("sample rate {} [samples/sec] must be a non-zero multiple of 1000", self.sample_rate_sps)));
		}
		if (self.sample_rate_sps as f64) < gps_l1_ca::CHIP_RATE_HZ {
			return Err(DigSigProcErr::InvalidConfig(format!("sample rate {} [samples/sec] is below the chip rate", self.sample_rate_sps)));
		}
		if self.window_ms == 0 {
			return Err(DigSigProcErr::InvalidConfig("analysis window must be at least 1 [ms]".into()));
		}
		if !self.detection_threshold.is_finite() || self.detection_threshold < 0.0 {
			return Err(DigSigProcErr::InvalidConfig(format!("detection threshold {} must be finite and non-negative", self.detection_threshold)));
		}
		Ok(())
	}

	// Derived quantities
	pub fn code_period_len(&self) -> usize { (self.sample_rate_sps / 1000) as usize }
	pub fn window_len(&self) -> usize { self.code_period_len() * (self.window_ms as usize) }
	pub fn max_shift(&self) -> i64 { max_shift(self.max_doppler_hz, self.window_len(), self.sample_rate_sps) }
	pub fn bin_width_hz(&self) -> f64 { self.sample_rate_sps as f64 / self.window_len() as f64 }

}

/// Largest Doppler bin index searched, `floor(max_doppler_hz * window_len / fs)`
pub fn max_shift(max_doppler_hz:u32, window_len:usize, sample_rate_sps:u32) -> i64 {
	((max_doppler_hz as u64 * window_len as u64) / sample_rate_sps as u64) as i64
}

/// Noise bandwidth, damping and gain of a second-order tracking loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopParameters {
	pub noise_bw_hz: f64,
	pub zeta: f64,
	pub gain: f64,
}

impl LoopParameters {

	fn validate(&self, name:&str) -> Result<()> {
		let all_positive = [self.noise_bw_hz, self.zeta, self.gain].iter().all(|x| x.is_finite() && *x > 0.0);
		if all_positive { Ok(()) }
		else { Err(DigSigProcErr::InvalidConfig(format!("{} loop parameters must be finite and positive: {:?}", name, self))) }
	}

}

/// Parameters of the code (DLL) and carrier (PLL) loops and of the lock detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
	pub duration_ms: u32,
	/// Offset of the early and late replicas from prompt [chips]
	pub early_late_spacing_chips: f64,
	pub dll: LoopParameters,
	pub pll: LoopParameters,
	pub carrier_lock_threshold: f64,
	pub cn0_threshold_db_hz: f64,
	/// Net failed lock tests tolerated before the channel gives up
	pub lock_fail_limit: usize,
	pub parallel: bool,
}

impl Default for TrackingConfig {
	fn default() -> Self {
		Self {
			duration_ms: 430,
			early_late_spacing_chips: 0.5,
			dll: LoopParameters{ noise_bw_hz:  2.0, zeta: 0.7, gain: 1.0  },
			pll: LoopParameters{ noise_bw_hz: 25.0, zeta: 0.7, gain: 0.25 },
			carrier_lock_threshold: 0.8,
			cn0_threshold_db_hz: 30.0,
			lock_fail_limit: 50,
			parallel: false,
		}
	}
}

impl TrackingConfig {

	pub fn from_json_file<P: AsRef<Path>>(path:P) -> Result<Self> { read_json(path) }

	pub fn validate(&self) -> Result<()> {
		if self.duration_ms == 0 {
			return Err(DigSigProcErr::InvalidConfig("tracking duration must be at least 1 [ms]".into()));
		}
		if !(self.early_late_spacing_chips > 0.0 && self.early_late_spacing_chips <= 1.0) {
			return Err(DigSigProcErr::InvalidConfig(format!("early/late spacing {} [chips] must be in (0, 1]", self.early_late_spacing_chips)));
		}
		self.dll.validate("DLL")?;
		self.pll.validate("PLL")?;
		if !(self.carrier_lock_threshold.abs() <= 1.0) {
			return Err(DigSigProcErr::InvalidConfig(format!("carrier lock threshold {} must be in [-1, 1]", self.carrier_lock_threshold)));
		}
		if !self.cn0_threshold_db_hz.is_finite() {
			return Err(DigSigProcErr::InvalidConfig(format!("C/N0 threshold {} must be finite", self.cn0_threshold_db_hz)));
		}
		Ok(())
	}

	pub fn duration_len(&self, sample_rate_sps:u32) -> usize { (sample_rate_sps / 1000) as usize * (self.duration_ms as usize) }

}

/// Acquisition followed by tracking of every detected satellite
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
	pub acquisition: AcquisitionConfig,
	pub tracking: TrackingConfig,
}

impl ReceiverConfig {

	pub fn from_json_file<P: AsRef<Path>>(path:P) -> Result<Self> { read_json(path) }

	pub fn validate(&self) -> Result<()> {
		self.acquisition.validate()?;
		self.tracking.validate()
	}

	/// Samples needed to cover both the acquisition window and the tracking run
	pub fn input_len(&self) -> usize {
		self.acquisition.window_len().max(self.tracking.duration_len(self.acquisition.sample_rate_sps))
	}

}

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path:P) -> Result<T> {
	let reader = BufReader::new(File::open(path)?);
	serde_json::from_reader(reader).map_err(|e| DigSigProcErr::InvalidConfig(format!("unable to parse config file: {}", e)))
}
