
use crate::config::LoopParameters;

pub trait ScalarFilter {

	fn apply(&mut self, x:f64) -> f64;
	fn initialize(&mut self);

}

pub struct FirstOrderFIR { pub b0: f64, pub b1: f64,
						   pub x0: f64, pub x1: f64 }

impl FirstOrderFIR {

	pub fn new(b0: f64, b1: f64) -> Self { Self { b0, b1, x0: 0.0, x1: 0.0 } }

}

impl ScalarFilter for FirstOrderFIR {

	fn apply(&mut self, x:f64) -> f64 {
		self.x0 = self.x1;
		self.x1 = x;
		self.b0*self.x0 + self.b1*self.x1
	}

	fn initialize(&mut self) {
		self.x0 = 0.0;
		self.x1 = 0.0;
	}

}

/// Time constants `(tau1, tau2)` of a second-order loop with the given noise bandwidth,
/// damping ratio and gain
pub fn loop_time_constants(params:&LoopParameters) -> (f64, f64) {
	let zeta = params.zeta;
	let wn = (params.noise_bw_hz * 8.0 * zeta) / (4.0 * zeta * zeta + 1.0);
	(params.gain / (wn * wn), (2.0 * zeta) / wn)
}

/// Proportional-plus-integral loop filter feeding an NCO.  Each call takes the latest
/// discriminator output and returns the accumulated NCO command.
pub struct LoopFilter {
	fir: FirstOrderFIR,
	nco: f64,
}

impl LoopFilter {

	pub fn new(params:&LoopParameters, update_interval_sec:f64) -> Self {
		let (tau1, tau2) = loop_time_constants(params);
		Self{ fir: FirstOrderFIR::new(-tau2 / tau1, (tau2 + update_interval_sec) / tau1), nco: 0.0 }
	}

	pub fn nco(&self) -> f64 { self.nco }

}

impl ScalarFilter for LoopFilter {

	fn apply(&mut self, x:f64) -> f64 {
		self.nco += self.fir.apply(x);
		self.nco
	}

	fn initialize(&mut self) {
		self.fir.initialize();
		self.nco = 0.0;
	}

}
