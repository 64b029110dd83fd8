
use serde::Serialize;

use super::CODE_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SatelliteCode {
	pub prn: u8,
	pub navstar: u8,
	/// How many chips into the future to read G2
	pub advance: u16,
}

// IS-GPS-200 specifies how many chips to delay G2; the catalog stores that delay
// time-reversed as a look-ahead.
const fn sv(prn:u8, navstar:u8, g2_delay:u16) -> SatelliteCode {
	SatelliteCode{ prn, navstar, advance: (CODE_LENGTH as u16) - g2_delay }
}

// Given in IS-GPS-200, Table 3-I
pub static SATELLITES:[SatelliteCode; 32] = [
	sv( 1, 63,   5), sv( 2, 56,   6), sv( 3, 37,   7), sv( 4, 35,   8),
	sv( 5, 64,  17), sv( 6, 36,  18), sv( 7, 62, 139), sv( 8, 44, 140),
	sv( 9, 33, 141), sv(10, 38, 251), sv(11, 46, 252), sv(12, 59, 254),
	sv(13, 43, 255), sv(14, 49, 256), sv(15, 60, 257), sv(16, 51, 258),
	sv(17, 57, 469), sv(18, 50, 470), sv(19, 54, 471), sv(20, 47, 472),
	sv(21, 52, 473), sv(22, 53, 474), sv(23, 55, 509), sv(24, 23, 512),
	sv(25, 24, 513), sv(26, 26, 514), sv(27, 27, 515), sv(28, 48, 516),
	sv(29, 61, 859), sv(30, 39, 860), sv(31, 58, 861), sv(32, 22, 862),
];

pub fn by_prn(prn:u8) -> Option<&'static SatelliteCode> { SATELLITES.iter().find(|sv| sv.prn == prn) }

#[cfg(test)]
mod tests {

	use super::*;

	#[test]
	fn catalog_is_ordered_by_prn() {
		for (idx, sv) in SATELLITES.iter().enumerate() {
			assert_eq!(sv.prn as usize, idx + 1);
			assert!((sv.advance as usize) < CODE_LENGTH);
		}
	}

	#[test]
	fn lookup() {
		assert_eq!(by_prn(1).map(|sv| sv.advance), Some(1018));
		assert_eq!(by_prn(32).map(|sv| sv.navstar), Some(22));
		assert!(by_prn(0).is_none());
		assert!(by_prn(33).is_none());
	}

}
