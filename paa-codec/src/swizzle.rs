#[cfg(feature = "arbitrary")] use arbitrary::{Arbitrary, Unstructured, Result as ArbitraryResult};
use derive_more::Display;
use enum_utils::FromStr;

use crate::{PaaError, PaaResult, ChannelData};
use crate::PaaError::*;


/// PAA texture ARGB swizzle data (see [`ChannelSwizzle`])
///
/// A SWIZTAGG carries one code byte per destination channel, in `A, R, G, B`
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgbSwizzle {
	#[allow(missing_docs)]
	pub a: ChannelSwizzle,
	#[allow(missing_docs)]
	pub r: ChannelSwizzle,
	#[allow(missing_docs)]
	pub g: ChannelSwizzle,
	#[allow(missing_docs)]
	pub b: ChannelSwizzle,
}


impl Default for ArgbSwizzle {
	fn default() -> Self {
		Self::new()
	}
}


impl std::fmt::Display for ArgbSwizzle {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			s if s.is_noop() => write!(f, "(no-op)"),
			_ => write!(f, "{}, {}, {}, {}", self.a, self.r, self.g, self.b),
		}
	}
}


#[cfg(feature = "arbitrary")]
impl<'a> Arbitrary<'a> for ArgbSwizzle {
	fn arbitrary(input: &mut Unstructured) -> ArbitraryResult<Self> {
		Ok(Self::from_code(input.arbitrary()?))
	}
}


impl ArgbSwizzle {
	/// Create a new ArgbSwizzle with no-op values (mapping alpha to alpha, etc).
	///
	/// # Example
	/// ```
	/// # use paa_codec::*;
	/// assert!(ArgbSwizzle::new().is_noop());
	/// assert_eq!(ArgbSwizzle::new().to_code(), [0, 1, 2, 3]);
	/// ```
	pub const fn new() -> Self {
		ArgbSwizzle {
			a: ChannelSwizzle::with_target(ChannelSwizzleId::Alpha),
			r: ChannelSwizzle::with_target(ChannelSwizzleId::Red),
			g: ChannelSwizzle::with_target(ChannelSwizzleId::Green),
			b: ChannelSwizzle::with_target(ChannelSwizzleId::Blue),
		}
	}


	/// Decode the 4-byte SWIZTAGG payload.
	///
	/// # Example
	/// ```
	/// # use paa_codec::{ArgbSwizzle, ChannelSwizzleData, ChannelSwizzleId::*};
	/// let swiz = ArgbSwizzle::from_code([0x05, 0x08, 0x02, 0x03]);
	/// assert_eq!(swiz.a.data, ChannelSwizzleData::Source { neg_flag: true, source: Red });
	/// assert_eq!(swiz.r.data, ChannelSwizzleData::Fill);
	/// ```
	pub const fn from_code(code: [u8; 4]) -> Self {
		ArgbSwizzle {
			a: ChannelSwizzle { target: ChannelSwizzleId::Alpha, data: ChannelSwizzleData::from_code(code[0]) },
			r: ChannelSwizzle { target: ChannelSwizzleId::Red, data: ChannelSwizzleData::from_code(code[1]) },
			g: ChannelSwizzle { target: ChannelSwizzleId::Green, data: ChannelSwizzleData::from_code(code[2]) },
			b: ChannelSwizzle { target: ChannelSwizzleId::Blue, data: ChannelSwizzleData::from_code(code[3]) },
		}
	}


	/// Encode `self` as a 4-byte SWIZTAGG payload.
	pub const fn to_code(&self) -> [u8; 4] {
		[self.a.data.to_code(), self.r.data.to_code(), self.g.data.to_code(), self.b.data.to_code()]
	}


	/// Parse ARGB swizzle values from respective A, R, G and B strings (in the
	/// same format as specified in `TexConvert.cfg`).
	///
	/// # Errors
	/// - [`InvalidSwizzleString`]: Some of the input strings were invalid.
	///
	/// # Example
	/// ```
	/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
	/// # use paa_codec::{ArgbSwizzle, ChannelSwizzleData};
	/// let swiz = ArgbSwizzle::parse_argb("A", "R", "1", "1-B")?;
	/// assert!(matches!(swiz.g.data, ChannelSwizzleData::Fill));
	/// # Ok(()) }
	/// ```
	pub fn parse_argb(a: &str, r: &str, g: &str, b: &str) -> PaaResult<Self> {
		let a = ChannelSwizzle::parse_data_with_target(a, ChannelSwizzleId::Alpha)?;
		let r = ChannelSwizzle::parse_data_with_target(r, ChannelSwizzleId::Red)?;
		let g = ChannelSwizzle::parse_data_with_target(g, ChannelSwizzleId::Green)?;
		let b = ChannelSwizzle::parse_data_with_target(b, ChannelSwizzleId::Blue)?;
		let result = ArgbSwizzle { a, r, g, b };

		Ok(result)
	}


	/// Apply the swizzle to decoded channels in place.
	///
	/// Every destination reads from the channels as they were before any of
	/// them was modified, so `R <- 1-B` together with `B <- 1-R` sees the
	/// original values.  Only [`ChannelSwizzleData::Fill`] and inverted
	/// sources from another channel write anything; every other operation
	/// leaves its destination unchanged.
	///
	/// # Example
	/// ```
	/// # use paa_codec::{ArgbSwizzle, ChannelData};
	/// let mut channels = ChannelData::filled(4, 4, [0.25, 0.5, 1.0, 0.0]);
	/// ArgbSwizzle::parse_argb("1", "1-B", "G", "1-R").unwrap().apply_to_channels(&mut channels);
	/// assert_eq!(channels.pixel(0, 0), [0.0, 0.5, 0.75, 1.0]);
	/// ```
	pub fn apply_to_channels(&self, channels: &mut ChannelData) {
		if self.is_noop() {
			return;
		};

		let snapshot = channels.clone();

		for swizzle in [self.a, self.r, self.g, self.b] {
			swizzle.apply(&snapshot, channels);
		};
	}


	/// Returns `true` if `self` maps every channel to itself, i.e., if the
	/// swizzle does not change any channel.
	pub fn is_noop(&self) -> bool {
		self.a.is_noop() && self.r.is_noop() && self.g.is_noop() && self.b.is_noop()
	}
}


impl std::str::FromStr for ArgbSwizzle {
	type Err = PaaError;

	/// Parse four comma-separated channel operations in `A, R, G, B` order,
	/// e.g. `"1-G, R, 1-A, B"`.
	fn from_str(s: &str) -> PaaResult<Self> {
		let parts: Vec<&str> = s.split(',').collect();

		match parts[..] {
			[a, r, g, b] => Self::parse_argb(a, r, g, b),
			_ => Err(InvalidSwizzleString(String::from(s))),
		}
	}
}


/// Swizzle information for a single ARGB channel
///
/// Some PAA textures apply "swizzle" to its channels during conversion to PAA.
/// The specific swizzle algorithm is described by the `TexConvert.cfg` file
/// from TexView and depends on the texture class (as determined by its file
/// name suffix).  Here's an example of a swizzle definition from that file:
///
/// ```text
/// class normalmap_vhq {
///   name = "*_novhq.*";
///   <..>
///   channelSwizzleA = "1-R";
///   channelSwizzleR = "1";
///   channelSwizzleG = "G";
///   channelSwizzleB = "1";
///   <..>
/// };
/// ```
///
/// In this case, the swizzle values mean that, e.g., the PAA alpha channel is
/// computed from the original image's negated red channel value, the PAA red
/// channel is filled with all ones, etc.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display(fmt = "<{}={}>", target, data)]
pub struct ChannelSwizzle {
	/// Channel being written into.
	pub target: ChannelSwizzleId,
	/// Data that's being written.
	pub data: ChannelSwizzleData,
}


impl ChannelSwizzle {
	/// Create a no-op [`ChannelSwizzle`] that targets a specific channel.
	pub const fn with_target(target: ChannelSwizzleId) -> Self {
		ChannelSwizzle {
			target,
			data: ChannelSwizzleData::Source {
				neg_flag: false,
				source: target,
			},
		}
	}


	/// Parse a channel swizzle operation from a `&str`, and construct a
	/// [`ChannelSwizzle`] from the operation and the target channel.
	///
	/// # Errors
	/// - [`InvalidSwizzleString`]: If failed to parse `data`.
	///
	/// # Example
	/// ```
	/// # use paa_codec::{ChannelSwizzle, ChannelSwizzleId, ChannelSwizzleData};
	/// let swiz_alpha = ChannelSwizzle::parse_data_with_target("1-G", ChannelSwizzleId::Alpha).unwrap();
	/// assert_eq!(swiz_alpha.target, ChannelSwizzleId::Alpha);
	/// assert_eq!(swiz_alpha.data, ChannelSwizzleData::Source { neg_flag: true, source: ChannelSwizzleId::Green });
	/// ```
	pub fn parse_data_with_target(data: &str, target: ChannelSwizzleId) -> PaaResult<Self> {
		let data = data.parse::<ChannelSwizzleData>()?;
		let result = ChannelSwizzle { target, data };
		Ok(result)
	}


	/// Write [`Self::target`] of `dst` from the pre-swizzle `src`.
	fn apply(&self, src: &ChannelData, dst: &mut ChannelData) {
		use ChannelSwizzleData::*;

		match self.data {
			Fill => dst.channel_mut(self.target).fill(1.0),

			Source { neg_flag: true, source } if source != self.target => {
				let target = dst.channel_mut(self.target);

				for (t, s) in target.iter_mut().zip(src.channel(source)) {
					*t = 1.0 - s;
				};
			},

			Source { .. } => (),
		};
	}


	/// Returns `true` if `self` maps [`Self::target`] to itself.
	///
	/// # Example
	/// ```
	/// # use paa_codec::*;
	/// use paa_codec::ChannelSwizzleId::*;
	/// let data = ChannelSwizzleData::Source { neg_flag: false, source: Red };
	/// let channel = ChannelSwizzle { target: Red, data };
	/// assert!(channel.is_noop());
	/// let channel = ChannelSwizzle { target: Blue, data };
	/// assert!(!channel.is_noop());
	/// ```
	pub fn is_noop(&self) -> bool {
		matches!(self, ChannelSwizzle { target, data: ChannelSwizzleData::Source { neg_flag: false, source } } if target == source)
	}
}


/// One of the four texture channels
///
/// The discriminant is the channel's index in RGBA order, as used by
/// [`ChannelData::channel`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, FromStr)]
#[cfg_attr(feature = "arbitrary", derive(Arbitrary))]
#[enumeration(case_insensitive)]
#[repr(usize)]
#[allow(missing_docs)]
pub enum ChannelSwizzleId {
	#[display(fmt = "a")]
	#[enumeration(rename = "A")]
	Alpha = 0x03,
	#[display(fmt = "r")]
	#[enumeration(rename = "R")]
	Red = 0x00,
	#[display(fmt = "g")]
	#[enumeration(rename = "G")]
	Green = 0x01,
	#[display(fmt = "b")]
	#[enumeration(rename = "B")]
	Blue = 0x02,
}


impl ChannelSwizzleId {
	/// Map the 2-bit source field of a swizzle code byte, which indexes
	/// channels in `A, R, G, B` order.
	pub const fn from_code_bits(bits: u8) -> Self {
		match bits & 0b11 {
			0b00 => ChannelSwizzleId::Alpha,
			0b01 => ChannelSwizzleId::Red,
			0b10 => ChannelSwizzleId::Green,
			_ => ChannelSwizzleId::Blue,
		}
	}


	/// Inverse of [`Self::from_code_bits`].
	pub const fn to_code_bits(self) -> u8 {
		match self {
			ChannelSwizzleId::Alpha => 0b00,
			ChannelSwizzleId::Red => 0b01,
			ChannelSwizzleId::Green => 0b10,
			ChannelSwizzleId::Blue => 0b11,
		}
	}
}


/// Swizzle algorithm for a single channel without its target (see also
/// [`ChannelSwizzle`])
///
/// Code byte layout: bits 0-1 select the source channel, bit 2 negates it,
/// bit 3 fills the channel with ones and overrides the other bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(Arbitrary))]
pub enum ChannelSwizzleData {
	/// Take data from a channel.  When applied, only the inverted form with
	/// a source other than the target has an effect.
	Source {
		/// Negate `source` (`1 - source`) if true.
		neg_flag: bool,
		/// Input texture channel to source from.
		source: ChannelSwizzleId,
	},

	/// Fill the channel with ones.
	Fill,
}


impl ChannelSwizzleData {
	const NEG_FLAG: u8 = 0b0100;
	const FILL_FLAG: u8 = 0b1000;


	/// Decode a single swizzle code byte.
	pub const fn from_code(code: u8) -> Self {
		if code & Self::FILL_FLAG != 0 {
			ChannelSwizzleData::Fill
		}
		else {
			ChannelSwizzleData::Source {
				neg_flag: code & Self::NEG_FLAG != 0,
				source: ChannelSwizzleId::from_code_bits(code),
			}
		}
	}


	/// Encode as a single swizzle code byte.
	pub const fn to_code(self) -> u8 {
		match self {
			ChannelSwizzleData::Fill => Self::FILL_FLAG,
			ChannelSwizzleData::Source { neg_flag, source } => {
				let neg = if neg_flag { Self::NEG_FLAG } else { 0 };
				neg | source.to_code_bits()
			},
		}
	}
}


impl std::str::FromStr for ChannelSwizzleData {
	type Err = PaaError;

	fn from_str(s: &str) -> PaaResult<Self> {
		let mut st = s.trim().to_uppercase();
		st.retain(|c| !c.is_whitespace());

		match st.as_str() {
			s @ ("A" | "R" | "G" | "B") => {
				let result = ChannelSwizzleData::Source {
					neg_flag: false,
					source: s.parse::<ChannelSwizzleId>()
						.map_err(|_| InvalidChannelSwizzleIdString(String::from(s)))?
				};
				Ok(result)
			},

			s @ ("1-A" | "1-R" | "1-G" | "1-B") => {
				let result = ChannelSwizzleData::Source {
					neg_flag: true,
					source: s[2..].parse::<ChannelSwizzleId>()
						.map_err(|_| InvalidChannelSwizzleIdString(String::from(s)))?
				};
				Ok(result)
			},

			"1" => Ok(ChannelSwizzleData::Fill),

			_ => Err(InvalidSwizzleString(String::from(s))),
		}
	}
}


impl std::fmt::Display for ChannelSwizzleData {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		use ChannelSwizzleData::*;

		match self {
			Source { neg_flag, source } => {
				let neg_str = if *neg_flag { "1-" } else { "" };
				write!(f, "{}{}", neg_str, source)
			},

			Fill => write!(f, "1"),
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;


	#[test]
	fn parse_swizzle() {
		for c in ["a", "R", "G", "b"] {
			let src_pos = format!("             {}", c);
			let src_neg = format!("  1 -  {} ", c);
			assert_eq!(src_pos.parse::<ChannelSwizzleData>().unwrap(), ChannelSwizzleData::Source { neg_flag: false, source: c.parse::<ChannelSwizzleId>().unwrap() });
			assert_eq!(src_neg.parse::<ChannelSwizzleData>().unwrap(), ChannelSwizzleData::Source { neg_flag: true, source: c.parse::<ChannelSwizzleId>().unwrap() });
		};
		assert_eq!("1   ".parse::<ChannelSwizzleData>().unwrap(), ChannelSwizzleData::Fill);
		assert!(matches!("2".parse::<ChannelSwizzleData>(), Err(InvalidSwizzleString(_))));

		let swiz = "1-G, R, 1-A, B".parse::<ArgbSwizzle>().unwrap();
		assert_eq!(swiz.to_code(), [0x06, 0x01, 0x04, 0x03]);
		assert_eq!(swiz.to_string(), "<a=1-g>, <r=r>, <g=1-a>, <b=b>");
		assert!(matches!("A, R, G".parse::<ArgbSwizzle>(), Err(InvalidSwizzleString(_))));
	}


	#[test]
	fn code_bytes() {
		for code in 0u8..16 {
			let data = ChannelSwizzleData::from_code(code);

			if code & 0b1000 != 0 {
				assert_eq!(data, ChannelSwizzleData::Fill);
			}
			else {
				assert_eq!(data.to_code(), code);
			};
		};

		// Fill wins over negation
		assert_eq!(ChannelSwizzleData::from_code(0b1101), ChannelSwizzleData::Fill);
	}


	fn gradient() -> ChannelData {
		let mut channels = ChannelData::new(4, 4);

		for (i, id) in [ChannelSwizzleId::Red, ChannelSwizzleId::Green, ChannelSwizzleId::Blue, ChannelSwizzleId::Alpha].iter().enumerate() {
			for (p, v) in channels.channel_mut(*id).iter_mut().enumerate() {
				*v = (p as f32 + i as f32 * 16.0) / 64.0;
			};
		};

		channels
	}


	#[test]
	fn identity_swizzle_is_noop() {
		let original = gradient();
		let mut channels = original.clone();
		ArgbSwizzle::from_code([0, 1, 2, 3]).apply_to_channels(&mut channels);
		assert_eq!(channels, original);
	}


	#[test]
	fn force_one_overrides_contents() {
		let original = gradient();

		// Fill flag on alpha, whose source bits also point at alpha
		let mut channels = original.clone();
		ArgbSwizzle::from_code([0x08, 1, 2, 3]).apply_to_channels(&mut channels);
		assert!(channels.a().iter().all(|&v| v == 1.0));
		assert_eq!(channels.r(), original.r());

		// Fill flag with the negation bit set on green
		let mut channels = original.clone();
		ArgbSwizzle::from_code([0, 1, 0x0C, 3]).apply_to_channels(&mut channels);
		assert!(channels.g().iter().all(|&v| v == 1.0));
	}


	#[test]
	fn swizzle_reads_snapshot() {
		let original = gradient();
		let mut channels = original.clone();

		// A <- 1-R, R <- 1-B, B <- 1-R
		ArgbSwizzle::parse_argb("1-R", "1-B", "G", "1-R").unwrap().apply_to_channels(&mut channels);

		assert_eq!(channels.g(), original.g());

		for (i, (r, b)) in original.r().iter().zip(original.b()).enumerate() {
			assert_eq!(channels.r()[i], 1.0 - b);
			assert_eq!(channels.b()[i], 1.0 - r);
			assert_eq!(channels.a()[i], 1.0 - r);
		};
	}


	#[test]
	fn plain_source_leaves_channel() {
		let original = gradient();

		// R <- B, A <- R, B <- 1-B
		for code in [[0, 3, 2, 3], [1, 1, 2, 3], [0, 1, 2, 0x07], [2, 3, 0, 1]] {
			let mut channels = original.clone();
			ArgbSwizzle::from_code(code).apply_to_channels(&mut channels);
			assert_eq!(channels, original, "code {:?}", code);
		};
	}
}
