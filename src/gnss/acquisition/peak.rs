
use serde::Serialize;

/// Acquisition result for one satellite
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalStrength {
	pub snr: f64,
	pub doppler_hz: f64,
	/// [chips]
	pub code_phase: f64,
}

impl SignalStrength {
	/// No peak was found
	pub const NONE:SignalStrength = SignalStrength{ snr: 0.0, doppler_hz: 0.0, code_phase: 0.0 };
}

/// Best code phase and its SNR within one Doppler bin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DopplerBin {
	pub snr: f64,
	pub code_phase: f64,
}

/// Fractional offset of the vertex of the parabola through three equally spaced samples,
/// relative to the middle one.  Flat samples have no vertex, so the middle sample stands.
pub fn parabolic_offset(y0:f64, y1:f64, y2:f64) -> f64 {
	let curvature = y0 - 2.0*y1 + y2;
	if curvature == 0.0 { 0.0 }
	else { 0.5 * (y0 - y2) / curvature }
}

/// Running state of the peak search over a Doppler sweep.  Bins must be pushed in
/// ascending Doppler order.  A bin can only be judged once both of its neighbors are
/// known, so each push settles the bin before it; bins off either end of the sweep count
/// as SNR 0.
///
/// Assumes the correlation peak is locally parabolic in Doppler, which is only an
/// approximation.
#[derive(Debug, Clone)]
pub struct PeakState {
	bin_width_hz: f64,
	snr_before_pending: f64,
	pending: Option<(i64, DopplerBin)>,
	best: SignalStrength,
}

impl PeakState {

	pub fn new(bin_width_hz:f64) -> Self {
		Self{ bin_width_hz, snr_before_pending: 0.0, pending: None, best: SignalStrength::NONE }
	}

	pub fn push(mut self, shift:i64, bin:DopplerBin) -> Self {
		if let Some((pending_shift, pending_bin)) = self.pending {
			self.settle(pending_shift, pending_bin, bin.snr);
			self.snr_before_pending = pending_bin.snr;
		}
		self.pending = Some((shift, bin));
		self
	}

	pub fn finish(mut self) -> SignalStrength {
		if let Some((pending_shift, pending_bin)) = self.pending.take() {
			self.settle(pending_shift, pending_bin, 0.0);
		}
		self.best
	}

	fn settle(&mut self, shift:i64, bin:DopplerBin, snr_after:f64) {
		let (y0, y1, y2) = (self.snr_before_pending, bin.snr, snr_after);

		// Only local peaks
		if y0 > y1 || y2 > y1 { return; }

		// Only the highest peak; also rules out NaN
		if !(y1 > self.best.snr) { return; }

		let correction = parabolic_offset(y0, y1, y2);
		self.best = SignalStrength{
			snr:        y1 - 0.25*(y0 - y2)*correction,
			doppler_hz: (shift as f64 + correction) * self.bin_width_hz,
			code_phase: bin.code_phase,
		};
	}

}
