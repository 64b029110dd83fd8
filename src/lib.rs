
use thiserror::Error;

pub mod config;
pub mod filters;
pub mod fourier_analysis;
pub mod io;
pub mod gnss;

#[derive(Debug, Error)]
pub enum DigSigProcErr {
	#[error("insufficient samples: expected {expected}, got {actual}")]
	InsufficientSamples{ expected:usize, actual:usize },

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("transform failed: {0}")]
	Transform(String),

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("loss of lock")]
	LossOfLock,

	#[error("signal spectrum of {spectrum_len} bins is not a multiple of the {code_len} sample code period")]
	SpectrumMismatch{ spectrum_len:usize, code_len:usize },
}

impl From<realfft::FftError> for DigSigProcErr {
	fn from(e:realfft::FftError) -> Self { DigSigProcErr::Transform(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, DigSigProcErr>;
