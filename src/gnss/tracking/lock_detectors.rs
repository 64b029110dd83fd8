
use std::collections::VecDeque;

use num_complex::Complex;

/// Signal-to-noise-variance C/N0 estimate [dB-Hz] over a run of prompt correlations
pub fn cn0_svn_estimator(prompt_buffer:&VecDeque<Complex<f64>>, coh_integration_time_s:f64) -> f64 {
	let n:f64 = prompt_buffer.len() as f64;
	let p_sig:f64 = {
		let sum:f64 = prompt_buffer.iter().map(|c| c.re.abs()).sum();
		(sum / n).powi(2)
	};
	let p_tot:f64 = {
		let sum:f64 = prompt_buffer.iter().map(|c| c.norm_sqr()).sum();
		sum / n
	};
	let snr = p_sig / (p_tot - p_sig);
	10.0 * snr.log10() - 10.0 * coh_integration_time_s.log10()
}

/// Cosine of twice the average carrier phase error; near 1 when the prompt energy is all in I
pub fn carrier_lock_detector(prompt_buffer:&VecDeque<Complex<f64>>) -> f64 {
	let tmp_sum_i:f64 = prompt_buffer.iter().map(|c| c.re).sum();
	let tmp_sum_q:f64 = prompt_buffer.iter().map(|c| c.im).sum();
	let nbp:f64 = tmp_sum_i * tmp_sum_i + tmp_sum_q * tmp_sum_q;
	let nbd:f64 = tmp_sum_i * tmp_sum_i - tmp_sum_q * tmp_sum_q;
	nbd / nbp
}
