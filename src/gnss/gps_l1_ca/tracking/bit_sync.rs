
use serde::Serialize;

/// One navigation data bit spans 20 code periods
pub const PROMPTS_PER_BIT:usize = 20;

/// Navigation data recovered from the in-phase prompt of consecutive code periods.  The
/// Costas loop can't tell a bit from its inverse, so the whole stream may be inverted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationBits {
	/// Index of the first prompt after the first sign change, where bit integration starts
	pub first_edge: usize,
	pub bits: Vec<bool>,
}

impl NavigationBits {

	/// Integrates whole bits starting at the first sign change.  Prompts left over at the end
	/// that don't fill a bit are dropped.  Returns None if the sign never changes.
	pub fn from_prompts(prompt_i:&[f64]) -> Option<Self> {
		let first_edge = prompt_i.windows(2).position(|w| (w[0] > 0.0) != (w[1] > 0.0))? + 1;
		let bits = prompt_i[first_edge..].chunks_exact(PROMPTS_PER_BIT)
			.map(|chunk| chunk.iter().sum::<f64>() > 0.0)
			.collect();
		Some(Self{ first_edge, bits })
	}

	/// Edge offset followed by one right-aligned 0/1 per bit
	pub fn to_text(&self) -> String {
		self.bits.iter().fold(format!("{}", self.first_edge), |mut s, b| {
			s.push_str(&format!("{:3}", *b as u8));
			s
		})
	}

}
