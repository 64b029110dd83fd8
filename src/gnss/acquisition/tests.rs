
use std::f64::consts::PI;

use num_complex::Complex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::DigSigProcErr;
use crate::config::AcquisitionConfig;
use crate::fourier_analysis::RustFftTransform;
use crate::gnss::acquisition::{acquire, Acquisition, AcquisitionRecord, SignalSpectrum};
use crate::gnss::gps_l1_ca::catalog::SATELLITES;
use crate::gnss::gps_l1_ca::signal_modulation::prn_real_sampled;

// Two samples per chip and a 2 [ms] window keep the sweep small: 21 bins of 500 [Hz]
fn test_config() -> AcquisitionConfig {
	AcquisitionConfig {
		sample_rate_sps: 2_046_000,
		window_ms: 2,
		max_doppler_hz: 5000,
		detection_threshold: 100.0,
		parallel: false,
	}
}

struct Synthetic {
	prn_idx: usize,
	offset_samples: usize,
	doppler_hz: f64,
	noise_std: f64,
}

impl Synthetic {

	fn samples(&self, config:&AcquisitionConfig) -> Vec<Complex<f64>> {
		let fs = config.sample_rate_sps as f64;
		let code = prn_real_sampled(&SATELLITES[self.prn_idx], config.sample_rate_sps);
		let mut rng = StdRng::seed_from_u64(0x5eed);
		let noise = Normal::new(0.0, self.noise_std).unwrap();

		(0..config.window_len()).map(|i| {
			let carrier = Complex::from_polar(1.0, 2.0 * PI * self.doppler_hz * (i as f64) / fs);
			let clean = Complex{ re: code[(i + self.offset_samples) % code.len()], im: 0.0 } * carrier;
			clean + Complex{ re: noise.sample(&mut rng), im: noise.sample(&mut rng) }
		}).collect()
	}

}

fn strongest(records:&[AcquisitionRecord]) -> &AcquisitionRecord {
	records.iter().fold(&records[0], |best, r| if r.snr > best.snr { r } else { best })
}

fn assert_others_rejected(records:&[AcquisitionRecord], prn:u8) {
	let target = records.iter().find(|r| r.prn == prn).unwrap();
	for r in records.iter().filter(|r| r.prn != prn) {
		assert!(r.snr < target.snr / 10.0, "PRN {} S/N {} too close to PRN {} S/N {}", r.prn, r.snr, prn, target.snr);
	}
}

#[test]
fn tiled_replica_matches_its_own_satellite() {
	let config = test_config();
	let samples = Synthetic{ prn_idx: 6, offset_samples: 0, doppler_hz: 0.0, noise_std: 0.0 }.samples(&config);
	let records = acquire::<RustFftTransform>(samples, &config).unwrap();

	assert_eq!(records.len(), 32);
	let best = strongest(&records);
	assert_eq!(best.prn, 7);
	assert!(best.doppler_hz.abs() < config.bin_width_hz(), "doppler {}", best.doppler_hz);

	let chips_per_sample = 1023.0 / config.code_period_len() as f64;
	assert!(best.code_phase <= chips_per_sample || best.code_phase >= 1023.0 - chips_per_sample, "phase {}", best.code_phase);

	assert_others_rejected(&records, 7);

	let detected:Vec<u8> = records.iter().filter(|r| r.detected).map(|r| r.prn).collect();
	assert_eq!(detected, vec![7]);
}

#[test]
fn recovers_code_phase_and_doppler_in_noise() {
	let config = test_config();
	let samples = Synthetic{ prn_idx: 12, offset_samples: 1000, doppler_hz: 1500.0, noise_std: 1.0 }.samples(&config);
	let records = acquire::<RustFftTransform>(samples, &config).unwrap();

	let best = strongest(&records);
	assert_eq!(best.prn, 13);
	assert!((best.doppler_hz - 1500.0).abs() < config.bin_width_hz(), "doppler {}", best.doppler_hz);
	// 1000 samples at two samples per chip
	assert!((best.code_phase - 500.0).abs() <= 0.5, "phase {}", best.code_phase);
	assert_others_rejected(&records, 13);
}

#[test]
fn doppler_between_bins_is_interpolated() {
	let config = test_config();
	let samples = Synthetic{ prn_idx: 0, offset_samples: 300, doppler_hz: -1250.0, noise_std: 0.5 }.samples(&config);
	let records = acquire::<RustFftTransform>(samples, &config).unwrap();

	let best = strongest(&records);
	assert_eq!(best.prn, 1);
	assert!((best.doppler_hz + 1250.0).abs() < config.bin_width_hz(), "doppler {}", best.doppler_hz);
	assert!((best.code_phase - 150.0).abs() <= 0.5, "phase {}", best.code_phase);
}

#[test]
fn parallel_and_repeated_runs_are_identical() {
	let config = test_config();
	let samples = Synthetic{ prn_idx: 20, offset_samples: 77, doppler_hz: 2000.0, noise_std: 1.0 }.samples(&config);

	let first = acquire::<RustFftTransform>(samples.clone(), &config).unwrap();
	let second = acquire::<RustFftTransform>(samples.clone(), &config).unwrap();
	let parallel = acquire::<RustFftTransform>(samples, &AcquisitionConfig{ parallel: true, ..test_config() }).unwrap();

	assert_eq!(first, second);
	assert_eq!(first, parallel);
	for (record, sv) in parallel.iter().zip(SATELLITES.iter()) {
		assert_eq!(record.prn, sv.prn);
	}
}

#[test]
fn results_stay_in_bounds_on_noise() {
	let config = test_config();
	let mut rng = StdRng::seed_from_u64(11);
	let noise = Normal::new(0.0, 1.0).unwrap();
	let samples:Vec<Complex<f64>> = (0..config.window_len())
		.map(|_| Complex{ re: noise.sample(&mut rng), im: noise.sample(&mut rng) })
		.collect();

	let mut fft = RustFftTransform::new();
	let spectrum = SignalSpectrum::new(samples, config.sample_rate_sps, &mut fft).unwrap();
	let acq = Acquisition::from_config(&spectrum, &config).unwrap();
	let limit = acq.max_doppler_searched_hz();
	assert!((limit - 5000.0).abs() < 1e-9);

	for r in acq.acquire_all(&mut fft).unwrap() {
		assert!(r.snr >= 0.0);
		assert!(r.doppler_hz.abs() <= limit, "PRN {} doppler {}", r.prn, r.doppler_hz);
		assert!(r.code_phase >= 0.0 && r.code_phase < 1023.0);
	}
}

#[test]
fn single_satellite_matches_full_run() {
	let config = test_config();
	let samples = Synthetic{ prn_idx: 30, offset_samples: 5, doppler_hz: -500.0, noise_std: 0.7 }.samples(&config);
	let mut fft = RustFftTransform::new();
	let spectrum = SignalSpectrum::new(samples, config.sample_rate_sps, &mut fft).unwrap();
	let acq = Acquisition::from_config(&spectrum, &config).unwrap();

	let all = acq.acquire_all(&mut fft).unwrap();
	let one = acq.acquire_satellite(&SATELLITES[30], &mut fft).unwrap();
	assert_eq!(all[30].snr, one.snr);
	assert_eq!(all[30].doppler_hz, one.doppler_hz);
	assert_eq!(all[30].code_phase, one.code_phase);
}

#[test]
fn wrong_window_length_is_rejected() {
	let config = test_config();
	let mut samples = Synthetic{ prn_idx: 0, offset_samples: 0, doppler_hz: 0.0, noise_std: 0.0 }.samples(&config);
	samples.truncate(config.window_len() - 1);

	match acquire::<RustFftTransform>(samples, &config) {
		Err(DigSigProcErr::InsufficientSamples{ expected, actual }) => {
			assert_eq!(expected, 4092);
			assert_eq!(actual, 4091);
		},
		other => panic!("Unexpected result: {:?}", other),
	}
}

#[test]
fn spectrum_must_span_whole_code_periods() {
	let mut fft = RustFftTransform::new();
	let samples = vec![Complex{ re: 1.0, im: 0.0 }; 4093];
	let spectrum = SignalSpectrum::new(samples, 2_046_000, &mut fft).unwrap();
	assert!(matches!(Acquisition::new(&spectrum, 5000, 20.0), Err(DigSigProcErr::SpectrumMismatch{ spectrum_len: 4093, code_len: 2046 })));
}

#[test]
fn invalid_config_is_rejected_before_any_work() {
	let config = AcquisitionConfig{ sample_rate_sps: 2_046_500, ..test_config() };
	assert!(matches!(acquire::<RustFftTransform>(vec![], &config), Err(DigSigProcErr::InvalidConfig(_))));
}

#[test]
fn samples_past_the_window_are_ignored() {
	let config = test_config();
	let window = Synthetic{ prn_idx: 8, offset_samples: 640, doppler_hz: -3000.0, noise_std: 1.0 }.samples(&config);
	let mut longer = window.clone();
	longer.extend(window.iter().take(1500).map(|s| *s * 3.0));

	let exact = acquire::<RustFftTransform>(window, &config).unwrap();
	let extended = acquire::<RustFftTransform>(longer, &config).unwrap();
	assert_eq!(exact, extended);
	assert_eq!(strongest(&extended).prn, 9);
}

#[test]
fn default_config_at_four_msps() {
	// 4000 samples per code period, so chips do not line up with samples
	let config = AcquisitionConfig{ parallel: true, ..AcquisitionConfig::default() };
	let samples = Synthetic{ prn_idx: 17, offset_samples: 1234, doppler_hz: 2200.0, noise_std: 1.0 }.samples(&config);
	let records = acquire::<RustFftTransform>(samples, &config).unwrap();
	assert_eq!(records.len(), 32);

	let best = strongest(&records);
	assert_eq!(best.prn, 18);
	assert!((best.doppler_hz - 2200.0).abs() < config.bin_width_hz(), "doppler {}", best.doppler_hz);

	let chips_per_sample = 1023.0 / config.code_period_len() as f64;
	let expected_phase = 1234.0 * chips_per_sample;
	assert!((best.code_phase - expected_phase).abs() <= chips_per_sample, "phase {} vs {}", best.code_phase, expected_phase);

	assert_others_rejected(&records, 18);
	assert!(records.iter().filter(|r| r.detected).any(|r| r.prn == 18));
}
