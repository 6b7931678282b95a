use std::io::{Read, Seek, SeekFrom};

#[cfg(feature = "arbitrary")] use arbitrary::Arbitrary;
use bstr::{BString, ByteSlice};
use byteorder::{LittleEndian, ByteOrder, ReadBytesExt};
use deku::prelude::*;
use derive_more::Display;

use crate::PaaResult;
use crate::PaaError::*;
use crate::ArgbSwizzle;
use crate::ReadExt;
use crate::ExtendExt;
use crate::macros;


/// Metadata frame present in PAA headers
///
/// On disk, every Tagg starts with the signature `"GGAT"` followed by its
/// 4-byte name, both stored reversed.  [`Tagg::name`] holds the name in
/// reading order, e.g. `b"SWIZ"` for the frame stored as `"ZIWS"`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(Arbitrary))]
pub struct Tagg {
	/// Tagg name in reading order.
	pub name: [u8; 4],
	/// Raw payload.
	pub data: Vec<u8>,
}


impl Tagg {
	/// "TAGG" as it appears on disk.
	pub const SIGNATURE: &'static [u8; 4] = b"GGAT";


	/// Construct a [`Tagg`] from its name in reading order and its payload.
	pub fn new(name: [u8; 4], data: Vec<u8>) -> Self {
		Self { name, data }
	}


	/// Try to read a [`Tagg`] from `input`.  If the next 4 bytes are not the
	/// Tagg signature, seeks back to where it started and returns `Ok(None)`.
	///
	/// # Errors
	/// - [`UnexpectedEof`]: EOF before the signature or inside the Tagg.
	/// - [`UnexpectedIoError`]: Read or backtracking seek failed.
	pub fn read_tagg_from<R: Read + Seek>(input: &mut R) -> PaaResult<Option<Self>> {
		let mut signature = [0u8; 4];
		input.read_exact(&mut signature)?;

		if &signature != Self::SIGNATURE {
			let _ = input.seek(SeekFrom::Current(-4))?;
			return Ok(None);
		};

		let mut name = [0u8; 4];
		input.read_exact(&mut name)?;
		name.reverse();

		let payload_length = input.read_u32::<LittleEndian>()?;
		let data = input.read_exact_buffered(payload_length.try_into().map_err(|_| ArithmeticOverflow)?)?;

		macros::log!(trace, "Read TAGG {} with {} bytes of payload", name.as_bstr(), payload_length);

		Ok(Some(Self { name, data }))
	}


	/// Read consecutive [`Tagg`]s until the next 4 bytes are not a Tagg
	/// signature.
	///
	/// # Errors
	/// See [`Self::read_tagg_from`].
	pub fn read_taggs_from<R: Read + Seek>(input: &mut R) -> PaaResult<Vec<Self>> {
		let mut result: Vec<Self> = Vec::with_capacity(8);

		while let Some(tagg) = Self::read_tagg_from(input)? {
			result.push(tagg);
		};

		Ok(result)
	}


	/// Wrap `input` with a [`Cursor`][std::io::Cursor] and
	/// [`read_tagg_from`][`Self::read_tagg_from`] from it.
	///
	/// # Errors
	/// See [`Self::read_tagg_from`].
	pub fn from_bytes(input: &[u8]) -> PaaResult<Option<Self>> {
		let mut cursor = std::io::Cursor::new(input);
		Self::read_tagg_from(&mut cursor)
	}


	/// Serialize a Tagg into PAA-ready data.
	///
	/// # Errors
	/// - [`ArithmeticOverflow`]: The payload length overflows a [`u32`].
	///
	/// # Example
	/// ```
	/// # use paa_codec::Tagg;
	/// let tagg = Tagg::new(*b"SWIZ", vec![0, 1, 2, 3]);
	/// assert_eq!(tagg.to_bytes().unwrap(), b"GGATZIWS\x04\x00\x00\x00\x00\x01\x02\x03");
	/// ```
	pub fn to_bytes(&self) -> PaaResult<Vec<u8>> {
		let len = u32::try_from(self.data.len()).map_err(|_| ArithmeticOverflow)?;

		let mut bytes: Vec<u8> = Vec::with_capacity(self.data.len() + 12);
		bytes.extend(Self::SIGNATURE);
		bytes.extend(self.name.iter().rev());
		bytes.extend_with_uint::<LittleEndian, _, 4>(len);
		bytes.extend(&self.data);

		Ok(bytes)
	}


	/// Interpret the payload according to the Tagg name.  Unrecognized names
	/// yield [`TaggPayload::Other`].
	///
	/// # Errors
	/// - [`UnexpectedTaggDataSize`]: Payload was of an unexpected length for
	///   its name.
	/// - [`UnknownTransparencyValue`]: FLAGTAGG with an unknown transparency
	///   mode.
	pub fn payload(&self) -> PaaResult<TaggPayload> {
		let data = &self.data[..];

		let fixed_size = |expected: usize| -> PaaResult<()> {
			if data.len() == expected { Ok(()) } else { Err(UnexpectedTaggDataSize) }
		};

		match &self.name {
			TaggPayload::AVGC_NAME => {
				fixed_size(4)?;
				let (_, rgba) = Bgra8888Pixel::from_bytes((data, 0)).map_err(|_| UnexpectedTaggDataSize)?;
				Ok(TaggPayload::Avgc { rgba })
			},

			TaggPayload::MAXC_NAME => {
				fixed_size(4)?;
				let (_, rgba) = Bgra8888Pixel::from_bytes((data, 0)).map_err(|_| UnexpectedTaggDataSize)?;
				Ok(TaggPayload::Maxc { rgba })
			},

			TaggPayload::FLAG_NAME => {
				fixed_size(4)?;
				let (_, transparency) = Transparency::from_bytes((&data[0..1], 0))
					.map_err(|_| UnknownTransparencyValue(data[0]))?;
				Ok(TaggPayload::Flag { transparency })
			},

			TaggPayload::SWIZ_NAME => {
				let code: [u8; 4] = data.try_into().map_err(|_| UnexpectedTaggDataSize)?;
				Ok(TaggPayload::Swiz { swizzle: ArgbSwizzle::from_code(code) })
			},

			TaggPayload::PROC_NAME => {
				Ok(TaggPayload::Proc { code: BString::from(data) })
			},

			TaggPayload::OFFS_NAME => {
				// Offset vectors that are not of length 16 do not apparently
				// occur; however, we do allow them nonetheless
				if data.len() % std::mem::size_of::<u32>() != 0 {
					return Err(UnexpectedTaggDataSize);
				};

				let mut offsets = vec![0u32; data.len() / std::mem::size_of::<u32>()];
				LittleEndian::read_u32_into(data, &mut offsets[..]);

				if let Some(idx) = offsets.iter().position(|x| *x == 0) {
					offsets.truncate(idx);
				};

				Ok(TaggPayload::Offs { offsets })
			},

			name => Ok(TaggPayload::Other { name: *name, data: self.data.clone() }),
		}
	}
}


impl std::fmt::Display for Tagg {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self.payload() {
			Ok(payload) => write!(f, "{}", payload),
			Err(e) => write!(f, "{} {{ <{}> }}", self.name.as_bstr(), e),
		}
	}
}


/// Typed view of a [`Tagg`] payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggPayload {
	/// Average color value.
	Avgc {
		/// Average over all pixels of the largest mipmap.
		rgba: Bgra8888Pixel,
	},

	/// Maximum color value.
	Maxc {
		/// Per-channel maximum over all pixels of the largest mipmap.
		rgba: Bgra8888Pixel,
	},

	/// PAA flags (only transparency/alpha interpolation is currently
	/// documented).
	Flag {
		/// Texture transparency type.
		transparency: Transparency,
	},

	/// Texture swizzle (subpixel mapping) algorithm.
	Swiz {
		/// Specific mapping that was used to encode the PAA.
		swizzle: ArgbSwizzle,
	},

	/// Procedural texture code.
	Proc {
		/// Procedural texture expression as stored in the file.
		code: BString,
	},

	/// Mipmap offsets.
	Offs {
		/// Offsets into the file for each respective mipmap.
		offsets: Vec<u32>,
	},

	/// A Tagg this crate does not interpret.
	Other {
		/// Tagg name in reading order.
		name: [u8; 4],
		/// Raw payload.
		data: Vec<u8>,
	},
}


impl std::fmt::Display for TaggPayload {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Avgc { rgba } => write!(f, "Avgc {{ {} }}", rgba),
			Self::Maxc { rgba } => write!(f, "Maxc {{ {} }}", rgba),
			Self::Flag { transparency } => write!(f, "Flag {{ {} }}", transparency),
			Self::Swiz { swizzle } => write!(f, "Swiz {{ {} }}", swizzle),
			Self::Proc { code } => write!(f, "Proc {{ {:?} }}", code),
			Self::Offs { offsets } => write!(f, "Offs {{ {:X?} }}", offsets),
			Self::Other { name, data } => write!(f, "{} {{ {} bytes }}", name.as_bstr(), data.len()),
		}
	}
}


impl TaggPayload {
	#[allow(missing_docs)]
	pub const AVGC_NAME: &'static [u8; 4] = b"AVGC";
	#[allow(missing_docs)]
	pub const MAXC_NAME: &'static [u8; 4] = b"MAXC";
	#[allow(missing_docs)]
	pub const FLAG_NAME: &'static [u8; 4] = b"FLAG";
	#[allow(missing_docs)]
	pub const SWIZ_NAME: &'static [u8; 4] = b"SWIZ";
	#[allow(missing_docs)]
	pub const PROC_NAME: &'static [u8; 4] = b"PROC";
	#[allow(missing_docs)]
	pub const OFFS_NAME: &'static [u8; 4] = b"OFFS";


	/// Serialize the payload back into a [`Tagg`].  An OFFSTAGG is padded
	/// with zeroes to 16 offsets.
	///
	/// # Example
	/// ```
	/// # use paa_codec::{TaggPayload, ArgbSwizzle};
	/// let tagg = TaggPayload::Swiz { swizzle: ArgbSwizzle::new() }.to_tagg();
	/// assert_eq!(&tagg.name, b"SWIZ");
	/// assert_eq!(tagg.data, vec![0, 1, 2, 3]);
	/// ```
	pub fn to_tagg(&self) -> Tagg {
		match self {
			Self::Avgc { rgba } => Tagg::new(*Self::AVGC_NAME, rgba.to_array().to_vec()),

			Self::Maxc { rgba } => Tagg::new(*Self::MAXC_NAME, rgba.to_array().to_vec()),

			Self::Flag { transparency } => Tagg::new(*Self::FLAG_NAME, vec![transparency.id(), 0, 0, 0]),

			Self::Swiz { swizzle } => Tagg::new(*Self::SWIZ_NAME, swizzle.to_code().to_vec()),

			Self::Proc { code } => Tagg::new(*Self::PROC_NAME, code.to_vec()),

			Self::Offs { offsets } => {
				let mut offsets = offsets.clone();
				offsets.resize(std::cmp::max(offsets.len(), 16), 0);

				let mut data = vec![0u8; offsets.len() * std::mem::size_of::<u32>()];
				LittleEndian::write_u32_into(&offsets[..], &mut data);

				Tagg::new(*Self::OFFS_NAME, data)
			},

			Self::Other { name, data } => Tagg::new(*name, data.clone()),
		}
	}
}


/// The color data used in AVGCTAGG and MAXCTAGG; its byte layout is B:G:R:A
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, DekuRead)]
#[cfg_attr(feature = "arbitrary", derive(Arbitrary))]
pub struct Bgra8888Pixel {
	#[allow(missing_docs)]
	pub b: u8,
	#[allow(missing_docs)]
	pub g: u8,
	#[allow(missing_docs)]
	pub r: u8,
	#[allow(missing_docs)]
	pub a: u8,
}


impl Bgra8888Pixel {
	/// Return the on-disk B:G:R:A bytes.
	pub const fn to_array(&self) -> [u8; 4] {
		[self.b, self.g, self.r, self.a]
	}
}


impl std::fmt::Display for Bgra8888Pixel {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "<r={:.3}> <g={:.3}> <b={:.3}> <a={:.3}>",
			f32::from(self.r) / 255.0, f32::from(self.g) / 255.0, f32::from(self.b) / 255.0, f32::from(self.a) / 255.0)
	}
}


/// Alpha interpolation algorithm used when the texture is rendered
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, DekuRead)]
#[cfg_attr(feature = "arbitrary", derive(Arbitrary))]
#[deku(type = "u8")]
pub enum Transparency {
	/// Transparency disabled
	#[display(fmt = "<no transparency>")]
	#[deku(id = "0x00")]
	None,

	/// Transparency enabled, alpha channel interpolation enabled
	#[display(fmt = "<transparent, interpolated alpha>")]
	#[deku(id = "0x01")]
	AlphaInterpolated,

	/// Transparency enabled, alpha channel interpolation disabled
	#[display(fmt = "<transparent, non-interpolated alpha>")]
	#[deku(id = "0x02")]
	AlphaNotInterpolated,
}


impl Transparency {
	/// Return the on-disk transparency byte.
	pub const fn id(&self) -> u8 {
		match self {
			Transparency::None => 0x00,
			Transparency::AlphaInterpolated => 0x01,
			Transparency::AlphaNotInterpolated => 0x02,
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;
	use crate::fixtures::tagg_record;


	#[test]
	fn read_taggs_stops_at_palette() {
		let mut data = tagg_record(b"SWIZ", &[0x0B, 0x01, 0x02, 0x03]);
		data.extend(tagg_record(b"QQQQ", b"hello"));
		data.extend([0x00, 0x00, 0xAA, 0xBB]);

		let mut cursor = Cursor::new(&data[..]);
		let taggs = Tagg::read_taggs_from(&mut cursor).unwrap();

		assert_eq!(taggs.len(), 2);
		assert_eq!(&taggs[0].name, b"SWIZ");
		assert_eq!(&taggs[1].name, b"QQQQ");
		assert_eq!(taggs[1].data, b"hello");
		assert_eq!(cursor.position() as usize, data.len() - 4);
	}


	#[test]
	fn truncated_tagg_is_eof() {
		let mut data = tagg_record(b"PROC", b"some long procedural texture");
		data.truncate(20);
		let mut cursor = Cursor::new(&data[..]);
		assert!(matches!(Tagg::read_taggs_from(&mut cursor), Err(UnexpectedEof)));
	}


	#[test]
	fn typed_payloads() {
		let avgc = Tagg::new(*b"AVGC", vec![0x00, 0x80, 0xFF, 0x40]);
		assert_eq!(avgc.payload().unwrap(), TaggPayload::Avgc { rgba: Bgra8888Pixel { b: 0x00, g: 0x80, r: 0xFF, a: 0x40 } });

		let flag = Tagg::new(*b"FLAG", vec![0x02, 0, 0, 0]);
		assert_eq!(flag.payload().unwrap(), TaggPayload::Flag { transparency: Transparency::AlphaNotInterpolated });

		let bad_flag = Tagg::new(*b"FLAG", vec![0x07, 0, 0, 0]);
		assert!(matches!(bad_flag.payload(), Err(UnknownTransparencyValue(0x07))));

		let short_swiz = Tagg::new(*b"SWIZ", vec![0x00, 0x01]);
		assert!(matches!(short_swiz.payload(), Err(UnexpectedTaggDataSize)));

		let mut offs_data = vec![0u8; 64];
		offs_data[0..4].copy_from_slice(&0x80u32.to_le_bytes());
		offs_data[4..8].copy_from_slice(&0x1A0u32.to_le_bytes());
		let offs = Tagg::new(*b"OFFS", offs_data);
		assert_eq!(offs.payload().unwrap(), TaggPayload::Offs { offsets: vec![0x80, 0x1A0] });

		let other = Tagg::new(*b"ABCD", vec![1, 2, 3]);
		assert_eq!(other.payload().unwrap(), TaggPayload::Other { name: *b"ABCD", data: vec![1, 2, 3] });
	}


	#[test]
	fn payload_to_tagg() {
		for tagg in [
			Tagg::new(*b"MAXC", vec![0x10, 0x20, 0x30, 0x40]),
			Tagg::new(*b"FLAG", vec![0x01, 0, 0, 0]),
			Tagg::new(*b"SWIZ", vec![0x05, 0x08, 0x02, 0x03]),
			Tagg::new(*b"PROC", b"fresnel(1.3,0.7)".to_vec()),
		] {
			assert_eq!(tagg.payload().unwrap().to_tagg(), tagg);
		};

		let offs = TaggPayload::Offs { offsets: vec![0x80] }.to_tagg();
		assert_eq!(offs.data.len(), 64);
	}


	#[test]
	fn display_tagg() {
		let swiz = Tagg::new(*b"SWIZ", vec![0x00, 0x01, 0x02, 0x03]);
		assert_eq!(swiz.to_string(), "Swiz { (no-op) }");

		let other = Tagg::new(*b"ABCD", vec![1, 2, 3]);
		assert_eq!(other.to_string(), "ABCD { 3 bytes }");
	}
}
