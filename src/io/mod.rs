
use std::io::{BufReader, ErrorKind, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use num_complex::Complex;

use crate::{DigSigProcErr, Result};

/// Reads exactly `n` complex samples, each stored as interleaved little-endian `f32` I and Q.
/// Running out of input before `n` complete samples is an error; a dangling I without its Q
/// doesn't count as a sample.
pub fn read_iq_window<R: Read>(src:R, n:usize) -> Result<Vec<Complex<f64>>> {
	let mut src = BufReader::new(src);
	let mut samples:Vec<Complex<f64>> = Vec::with_capacity(n);

	while samples.len() < n {
		match read_iq_sample(&mut src) {
			Ok(s) => samples.push(s),
			Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
				return Err(DigSigProcErr::InsufficientSamples{ expected: n, actual: samples.len() });
			},
			Err(e) => return Err(e.into()),
		}
	}

	Ok(samples)
}

fn read_iq_sample<R: Read>(src:&mut R) -> std::io::Result<Complex<f64>> {
	let re = src.read_f32::<LittleEndian>()?;
	let im = src.read_f32::<LittleEndian>()?;
	Ok(Complex{ re: re as f64, im: im as f64 })
}
