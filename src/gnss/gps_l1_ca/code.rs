
use once_cell::sync::Lazy;

use super::CODE_LENGTH;
use super::catalog::SatelliteCode;

const G1_TAPS:[usize; 2] = [3, 10];
const G2_TAPS:[usize; 6] = [2, 3, 6, 8, 9, 10];

/// Outputs of the G1 and G2 shift registers over one code period, shared by every PRN
pub static CHIP_TABLE:Lazy<ChipTable> = Lazy::new(ChipTable::generate);

pub struct ChipTable {
	states: [(bool, bool); CODE_LENGTH],
}

impl ChipTable {

	// Both registers start out all ones and are read from stage 10
	fn generate() -> Self {
		let mut states = [(false, false); CODE_LENGTH];
		let mut r1 = [true; 10];
		let mut r2 = [true; 10];

		for state in states.iter_mut() {
			*state = (r1[9], r2[9]);
			let fb1 = G1_TAPS.iter().fold(false, |acc, t| acc ^ r1[t-1]);
			let fb2 = G2_TAPS.iter().fold(false, |acc, t| acc ^ r2[t-1]);
			r1.rotate_right(1);
			r2.rotate_right(1);
			r1[0] = fb1;
			r2[0] = fb2;
		}

		Self{ states }
	}

	pub fn g1(&self, idx:usize) -> bool { self.states[idx % CODE_LENGTH].0 }
	pub fn g2(&self, idx:usize) -> bool { self.states[idx % CODE_LENGTH].1 }

}

/// C/A code chip `idx` for this satellite; the code repeats every 1023 chips
pub fn chip(sv:&SatelliteCode, idx:usize) -> bool {
	let idx = idx % CODE_LENGTH;
	let g2_idx = (idx + sv.advance as usize) % CODE_LENGTH;
	CHIP_TABLE.g1(idx) ^ CHIP_TABLE.g2(g2_idx)
}

/// One code period as +1/-1 values
pub fn prn_int(sv:&SatelliteCode) -> Vec<i8> {
	(0..CODE_LENGTH).map(|idx| if chip(sv, idx) { 1 } else { -1 }).collect()
}

#[cfg(test)]
mod tests {

	use super::*;
	use crate::gnss::gps_l1_ca::catalog::{self, SATELLITES};

	fn first_ten_octal(prn:u8) -> u16 {
		let sv = catalog::by_prn(prn).unwrap();
		(0..10).fold(0, |acc, idx| (acc << 1) | (chip(sv, idx) as u16))
	}

	#[test]
	fn register_outputs_match_published_table() {
		let expected_head:[(u8, u8); 20] = [(1,1), (1,1), (1,1), (1,1), (1,1), (1,1), (1,1), (1,1), (1,1), (1,1),
			(0,0), (0,0), (0,1), (1,0), (1,1), (1,1), (0,0), (0,1), (0,0), (1,0)];
		for (idx, (g1, g2)) in expected_head.iter().enumerate() {
			assert_eq!(CHIP_TABLE.g1(idx), *g1 == 1, "G1 at {}", idx);
			assert_eq!(CHIP_TABLE.g2(idx), *g2 == 1, "G2 at {}", idx);
		}

		let expected_tail:[(u8, u8); 3] = [(0,1), (0,1), (0,0)];
		for (offset, (g1, g2)) in expected_tail.iter().enumerate() {
			let idx = CODE_LENGTH - 3 + offset;
			assert_eq!(CHIP_TABLE.g1(idx), *g1 == 1);
			assert_eq!(CHIP_TABLE.g2(idx), *g2 == 1);
		}
	}

	#[test]
	fn first_chips_match_is_gps_200() {
		assert_eq!(first_ten_octal(1),  0o1440);
		assert_eq!(first_ten_octal(2),  0o1620);
		assert_eq!(first_ten_octal(32), 0o1712);
	}

	#[test]
	fn chips_are_periodic_and_deterministic() {
		for sv in SATELLITES.iter() {
			for idx in (0..CODE_LENGTH).step_by(37) {
				let c = chip(sv, idx);
				assert_eq!(c, chip(sv, idx));
				assert_eq!(c, chip(sv, idx + CODE_LENGTH));
				assert_eq!(c, chip(sv, idx + 5*CODE_LENGTH));
			}
		}
	}

	#[test]
	fn codes_are_balanced() {
		for sv in SATELLITES.iter() {
			let sum:i32 = prn_int(sv).iter().map(|x| *x as i32).sum();
			assert_eq!(sum, 1, "PRN {}", sv.prn);
		}
	}

	#[test]
	fn cross_correlation_is_three_valued() {
		let a = prn_int(&SATELLITES[0]);
		let b = prn_int(&SATELLITES[1]);
		for shift in 0..CODE_LENGTH {
			let r:i32 = (0..CODE_LENGTH).map(|i| (a[i] as i32) * (b[(i + shift) % CODE_LENGTH] as i32)).sum();
			assert!(r == -1 || r == -65 || r == 63, "shift {} gave {}", shift, r);
		}
	}

}
