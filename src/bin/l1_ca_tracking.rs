
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use clap::{Arg, App, ArgMatches};
use colored::*;
use log::info;

use soft_correlator::{io, DigSigProcErr, Result};
use soft_correlator::config::ReceiverConfig;
use soft_correlator::fourier_analysis::RustFftTransform;
use soft_correlator::gnss::acquisition;
use soft_correlator::gnss::gps_l1_ca::catalog;
use soft_correlator::gnss::gps_l1_ca::tracking::{self, TrackingOutcome};

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let matches = App::new("GPS L1 CA Tracking")
		.version("0.1.0")
		.about("Takes IQ samples (interleaved little-endian f32) centered on 1575.42 MHz, acquires all 32 L1 CA PRNs on the first window and tracks every detected satellite")
		.arg(Arg::with_name("filename")
			.short("f").long("filename")
			.help("Input filename; reads stdin if absent or '-'")
			.takes_value(true))
		.arg(Arg::with_name("config")
			.short("c").long("config")
			.help("JSON file with \"acquisition\" and \"tracking\" sections; command line flags take precedence")
			.takes_value(true))
		.arg(Arg::with_name("sample_rate_sps")
			.short("s").long("sample_rate_sps")
			.takes_value(true))
		.arg(Arg::with_name("window_ms")
			.short("w").long("window_ms")
			.takes_value(true))
		.arg(Arg::with_name("max_doppler_hz")
			.short("d").long("max_doppler_hz")
			.takes_value(true))
		.arg(Arg::with_name("threshold")
			.short("t").long("threshold")
			.takes_value(true))
		.arg(Arg::with_name("duration_ms")
			.short("m").long("duration_ms")
			.help("Milliseconds of signal to track from the first sample")
			.takes_value(true))
		.arg(Arg::with_name("parallel")
			.short("p").long("parallel")
			.help("Acquire and track satellites on all cores"))
		.arg(Arg::with_name("output")
			.short("o").long("output")
			.takes_value(true)
			.possible_values(&["table", "json"])
			.default_value("table"))
		.arg(Arg::with_name("bits_dir")
			.short("b").long("bits_dir")
			.help("Directory for one SVnn.bin text file of navigation bits per locked satellite")
			.takes_value(true))
		.get_matches();

	if let Err(e) = run(&matches) {
		eprintln!("{}", format!("Error: {}", e).red());
		std::process::exit(1);
	}
}

fn parse_arg<T: FromStr>(matches:&ArgMatches, name:&str) -> Result<Option<T>> {
	match matches.value_of(name) {
		Some(s) => s.parse().map(Some).map_err(|_| DigSigProcErr::InvalidConfig(format!("unable to parse {} from {:?}", name, s))),
		None => Ok(None),
	}
}

fn config_from_args(matches:&ArgMatches) -> Result<ReceiverConfig> {
	let mut config = match matches.value_of("config") {
		Some(fname) => ReceiverConfig::from_json_file(fname)?,
		None        => ReceiverConfig::default(),
	};

	if let Some(fs) = parse_arg(matches, "sample_rate_sps")? { config.acquisition.sample_rate_sps = fs; }
	if let Some(ms) = parse_arg(matches, "window_ms")? { config.acquisition.window_ms = ms; }
	if let Some(hz) = parse_arg(matches, "max_doppler_hz")? { config.acquisition.max_doppler_hz = hz; }
	if let Some(th) = parse_arg(matches, "threshold")? { config.acquisition.detection_threshold = th; }
	if let Some(ms) = parse_arg(matches, "duration_ms")? { config.tracking.duration_ms = ms; }
	if matches.is_present("parallel") {
		config.acquisition.parallel = true;
		config.tracking.parallel = true;
	}

	config.validate()?;
	Ok(config)
}

fn run(matches:&ArgMatches) -> Result<()> {
	let config = config_from_args(matches)?;
	let fs = config.acquisition.sample_rate_sps;

	let src:Box<dyn Read> = match matches.value_of("filename") {
		None | Some("-") => Box::new(std::io::stdin()),
		Some(fname)      => Box::new(File::open(fname)?),
	};

	info!("Acquiring on {} [ms], tracking for {} [ms] at {} [samples/sec]", config.acquisition.window_ms, config.tracking.duration_ms, fs);

	let samples = io::read_iq_window(src, config.input_len())?;
	let records = acquisition::acquire::<RustFftTransform>(samples.clone(), &config.acquisition)?;
	let outcomes = tracking::track_all(&samples, &records, fs, &config.tracking)?;

	for outcome in &outcomes {
		let navstar = catalog::by_prn(outcome.prn).map_or(0, |sv| sv.navstar);
		let status = match (outcome.locked(), outcome.reports.last()) {
			(_, None)          => "no full code period".red(),
			(true, Some(r))    => format!("{:9.2} [Hz], C/N0 {:5.1} [dB-Hz], locked", r.carrier_hz, r.cn0_db_hz).green(),
			(false, Some(r))   => match outcome.lost_lock_at {
				Some(idx) => format!("{:9.2} [Hz], lost lock at sample {}", r.carrier_hz, idx).red(),
				None      => format!("{:9.2} [Hz], C/N0 {:5.1} [dB-Hz], pulling in", r.carrier_hz, r.cn0_db_hz).yellow(),
			},
		};
		eprintln!("PRN {:02} (SVN {:02}) {}", outcome.prn, navstar, status);
	}

	if let Some(dir) = matches.value_of("bits_dir") {
		write_bits(Path::new(dir), &outcomes)?;
	}

	match matches.value_of("output") {
		Some("json") => println!("{}", serde_json::to_string_pretty(&outcomes).map_err(|e| DigSigProcErr::Io(e.into()))?),
		_            => print_table(&outcomes),
	}

	Ok(())
}

fn write_bits(dir:&Path, outcomes:&[TrackingOutcome]) -> Result<()> {
	std::fs::create_dir_all(dir)?;
	for outcome in outcomes {
		if let Some(nav) = outcome.navigation_bits() {
			let path = dir.join(format!("SV{:02}.bin", outcome.prn));
			let mut f = File::create(&path)?;
			writeln!(f, "{}", nav.to_text())?;
			info!("PRN {:02}: {} bits to {}", outcome.prn, nav.bits.len(), path.display());
		}
	}
	Ok(())
}

fn print_table(outcomes:&[TrackingOutcome]) {
	println!("# SV, locked, code periods, carrier (Hz), C/N0 (dB-Hz), bits");
	for outcome in outcomes {
		let bits = outcome.navigation_bits().map_or(0, |nav| nav.bits.len());
		match outcome.reports.last() {
			Some(r) => println!("{}\t{}\t{}\t{:.3}\t{:.2}\t{}", outcome.prn, outcome.locked(), outcome.reports.len(), r.carrier_hz, r.cn0_db_hz, bits),
			None    => println!("{}\t{}\t0\t-\t-\t{}", outcome.prn, outcome.locked(), bits),
		}
	}
	println!();
}
