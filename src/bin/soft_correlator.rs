
use std::fs::File;
use std::io::Read;
use std::str::FromStr;

use clap::{Arg, App, ArgMatches};
use colored::*;
use log::info;

use soft_correlator::{io, DigSigProcErr, Result};
use soft_correlator::config::AcquisitionConfig;
use soft_correlator::fourier_analysis::RustFftTransform;
use soft_correlator::gnss::acquisition::{self, AcquisitionRecord};

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let matches = App::new("GPS L1 CA Soft Correlator")
		.version("0.1.0")
		.about("Takes one window of IQ samples (interleaved little-endian f32) centered on 1575.42 MHz and searches Doppler and code phase for all 32 L1 CA PRNs")
		.arg(Arg::with_name("filename")
			.short("f").long("filename")
			.help("Input filename; reads stdin if absent or '-'")
			.takes_value(true))
		.arg(Arg::with_name("config")
			.short("c").long("config")
			.help("JSON file with acquisition parameters; command line flags take precedence")
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
			.help("S/N at or above which a satellite is reported as detected")
			.takes_value(true))
		.arg(Arg::with_name("parallel")
			.short("p").long("parallel")
			.help("Search satellites on all cores"))
		.arg(Arg::with_name("output")
			.short("o").long("output")
			.takes_value(true)
			.possible_values(&["table", "json"])
			.default_value("table"))
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

fn config_from_args(matches:&ArgMatches) -> Result<AcquisitionConfig> {
	let mut config = match matches.value_of("config") {
		Some(fname) => AcquisitionConfig::from_json_file(fname)?,
		None        => AcquisitionConfig::default(),
	};

	if let Some(fs) = parse_arg(matches, "sample_rate_sps")? { config.sample_rate_sps = fs; }
	if let Some(ms) = parse_arg(matches, "window_ms")? { config.window_ms = ms; }
	if let Some(hz) = parse_arg(matches, "max_doppler_hz")? { config.max_doppler_hz = hz; }
	if let Some(th) = parse_arg(matches, "threshold")? { config.detection_threshold = th; }
	if matches.is_present("parallel") { config.parallel = true; }

	config.validate()?;
	Ok(config)
}

fn run(matches:&ArgMatches) -> Result<()> {
	let config = config_from_args(matches)?;

	let src:Box<dyn Read> = match matches.value_of("filename") {
		None | Some("-") => Box::new(std::io::stdin()),
		Some(fname)      => Box::new(File::open(fname)?),
	};

	info!("Searching {} [ms] at {} [samples/sec], +/-{} [Hz], parallel={}", config.window_ms, config.sample_rate_sps, config.max_doppler_hz, config.parallel);

	let samples = io::read_iq_window(src, config.window_len())?;
	let records = acquisition::acquire::<RustFftTransform>(samples, &config)?;

	for r in &records {
		let result_str = format!("{:9.2} [Hz], {:8.3} [chips], S/N {:.3}", r.doppler_hz, r.code_phase, r.snr);
		if r.detected { eprintln!("PRN {:02} {}", r.prn, result_str.green());  }
		else          { eprintln!("PRN {:02} {}", r.prn, result_str.yellow()); }
	}

	match matches.value_of("output") {
		Some("json") => println!("{}", serde_json::to_string_pretty(&records).map_err(|e| DigSigProcErr::Io(e.into()))?),
		_            => print_table(&records),
	}

	Ok(())
}

fn print_table(records:&[AcquisitionRecord]) {
	println!("# SV, S/N ratio, doppler shift (Hz), phase (chips)");
	for r in records {
		println!("{}\t{:.6}\t{:.6}\t{:.6}", r.prn, r.snr, r.doppler_hz, r.code_phase);
	}
	println!();
}
