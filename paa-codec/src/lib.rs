#![warn(missing_docs, unreachable_pub, clippy::all)]
#![allow(clippy::wildcard_imports, clippy::enum_glob_use)]
#![warn(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]


#![doc = include_str!("../../README.md")]


mod macros;
mod tagg;
mod mipmap;
mod channels;
mod swizzle;
mod decode;
pub mod lzo;
pub mod dxt;

pub use tagg::*;
pub use mipmap::*;
pub use channels::*;
pub use swizzle::*;
pub use decode::*;
pub use lzo::LzoError;


use std::io::{Read, Seek, Cursor};

#[cfg(feature = "arbitrary")] use arbitrary::Arbitrary;
use byteorder::{LittleEndian, ByteOrder, ReadBytesExt};
use deku::prelude::*;
use derive_more::{Display, Error};
use static_assertions::const_assert;

use PaaError::*;

/// [`std::result::Result`] parameterized with [`PaaError`]
pub type PaaResult<T> = Result<T, PaaError>;


/// `paa_codec`'s [`std::error::Error`]
#[derive(Debug, Display, Error, Clone)]
#[non_exhaustive]
pub enum PaaError {
	/// A function that reads from [`std::io::Read`] encountered early EOF.
	#[display(fmt = "Unexpected end of input file")]
	UnexpectedEof,

	/// Unexpected I/O error that is not UnexpectedEof.
	#[display(fmt = "Unexpected I/O error: {}", _0)]
	UnexpectedIoError(#[error(ignore)] std::io::ErrorKind),

	/// Attempted to read a PAA image with an unknown format tag.
	#[display(fmt = "Unknown PAA type: 0x{:04X}", _0)]
	UnknownPaaType(#[error(ignore)] u16),

	/// The PAA declares an index palette; palettized textures are not
	/// supported.
	#[display(fmt = "Index palette PAAs are not supported")]
	IndexedPaletteUnsupported,

	/// The two bytes following the mipmap terminator were not zero.
	#[display(fmt = "Unexpected EOF marker after the last mipmap: 0x{:04X}", _0)]
	UnexpectedEofMarker(#[error(ignore)] u16),

	/// Attempted to decode a DXTn mipmap whose dimensions are not multiples
	/// of 4.  Enum members are width and height.
	#[error(ignore)]
	#[display(fmt = "DXTn mipmap dimensions must be multiples of 4, got {}x{}", _0, _1)]
	InvalidResolution(u16, u16),

	/// Attempted to decode a mipmap of a [`PaaType`] that has no decoder.
	#[display(fmt = "Decoding is not supported for PAA type {:?}", _0)]
	UnsupportedPaaType(#[error(ignore)] PaaType),

	/// Attempted to read a typed payload from a Tagg with unexpected payload
	/// size.
	#[display(fmt = "Attempted to read a TAGG with unexpected payload size")]
	UnexpectedTaggDataSize,

	/// Attempted to read a [`TaggPayload::Flag`] with unexpected
	/// transparency value.
	#[display(fmt = "Attempted to read a FLAGTAGG with unknown transparency value: {:02x?}", _0)]
	UnknownTransparencyValue(#[error(ignore)] u8),

	/// Attempted to parse an unexpected swizzle value with FromStr.
	#[display(fmt = "Attempted to parse an unexpected swizzle value: {}", _0)]
	InvalidSwizzleString(#[error(ignore)] String),

	/// Attempted to parse a ChannelSwizzleId from a string that is not "A",
	/// "R", "G", or "B".
	#[display(fmt = "Attempted to parse an unexpected ChannelSwizzleId value: {}", _0)]
	InvalidChannelSwizzleIdString(#[error(ignore)] String),

	/// Mipmap dimension is 32768 or larger, or its payload does not fit the
	/// 24-bit length field.
	#[display(fmt = "Mipmap has a dimension of 32768 or more, or a payload that overflows a 24-bit length")]
	MipmapTooLarge,

	/// More mipmaps than a [`TaggPayload::Offs`] can address.
	#[display(fmt = "An image with an OFFSTAGG can hold at most {} mipmaps", PaaImage::MAX_MIPMAPS)]
	TooManyMipmaps,

	/// A checked arithmetic operation triggered an unexpected under/overflow.
	#[display(fmt = "A checked arithmetic operation triggered an unexpected under/overflow")]
	ArithmeticOverflow,

	/// LZO1X decompression of a mipmap payload failed.
	#[display(fmt = "DXT-LZO decompression failed: {}", _0)]
	LzoDecompressError(LzoError),

	/// [`PaaDecoder::decode_nth`] received a mipmap index out of range.
	#[display(fmt = "Mipmap index out of range")]
	MipmapIndexOutOfRange,
}


impl PaaError {
	/// Classify the error by the stage that detected it.
	///
	/// # Example
	/// ```
	/// # use paa_codec::{PaaError, PaaErrorKind, LzoError};
	/// assert_eq!(PaaError::IndexedPaletteUnsupported.kind(), PaaErrorKind::Format);
	/// assert_eq!(PaaError::from(LzoError::InputOverrun).kind(), PaaErrorKind::Compression);
	/// ```
	pub fn kind(&self) -> PaaErrorKind {
		match self {
			UnexpectedEof | UnexpectedIoError(_) => PaaErrorKind::Io,
			LzoDecompressError(_) => PaaErrorKind::Compression,
			_ => PaaErrorKind::Format,
		}
	}
}


/// Broad class of a [`PaaError`], see [`PaaError::kind`]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum PaaErrorKind {
	/// Container or structure-level error found by the reader or the block
	/// decoder.
	Format,
	/// Stream-level error found by the LZO1X decompressor.
	Compression,
	/// The input could not be read.
	Io,
}


impl From<std::io::Error> for PaaError {
	fn from(error: std::io::Error) -> Self {
		match error.kind() {
			std::io::ErrorKind::UnexpectedEof => UnexpectedEof,
			kind => UnexpectedIoError(kind),
		}
	}
}


impl From<LzoError> for PaaError {
	fn from(error: LzoError) -> Self {
		LzoDecompressError(error)
	}
}


/// A single PAA texture file represented as a struct
#[derive(Default, Debug, Clone, PartialEq)]
pub struct PaaImage {
	/// Format of all mipmaps in the image.
	pub paatype: PaaType,
	/// PAA header metadata.
	pub taggs: Vec<Tagg>,
	/// PAA mipmaps, largest first.
	pub mipmaps: Vec<PaaMipmap>,
}


impl PaaImage {
	/// Maximum number of mipmaps in a [`PaaImage`] carrying a
	/// [`TaggPayload::Offs`].
	pub const MAX_MIPMAPS: usize = 16;


	/// Read a [`PaaImage`][Self] from an [`std::io::Read`].
	///
	/// The reader fails on the first malformed structure; no partially read
	/// image is returned.
	///
	/// # Errors
	/// - [`UnexpectedEof`]: Unexpected end of file.
	/// - [`UnexpectedIoError`]: Unexpected read or seek error.
	/// - [`UnknownPaaType`]: The format tag is not a known [`PaaType`].
	/// - [`IndexedPaletteUnsupported`]: The palette flag is non-zero.
	/// - [`UnexpectedEofMarker`]: The mipmap terminator is not followed by
	///   a zero EOF marker.
	pub fn read_from<R: Read + Seek>(input: &mut R) -> PaaResult<Self> {
		let paatype = PaaType::read_from(input)?;
		let taggs = Tagg::read_taggs_from(input)?;

		let palette_flag = input.read_u16::<LittleEndian>()?;

		if palette_flag != 0 {
			return Err(IndexedPaletteUnsupported);
		};

		let mipmaps = PaaMipmap::read_from_until_terminator(input, paatype)?;

		let eof_marker = input.read_u16::<LittleEndian>()?;

		if eof_marker != 0 {
			return Err(UnexpectedEofMarker(eof_marker));
		};

		macros::log!(debug, "Read {:?} PAA with {} taggs and {} mipmaps", paatype, taggs.len(), mipmaps.len());

		Ok(PaaImage { paatype, taggs, mipmaps })
	}


	/// Wrap `input` with a [`Cursor`][std::io::Cursor] and
	/// [`read_from`][`Self::read_from`] from it.
	///
	/// # Errors
	/// See [`Self::read_from`].
	pub fn from_bytes(input: &[u8]) -> PaaResult<Self> {
		let mut cursor = Cursor::new(input);
		Self::read_from(&mut cursor)
	}


	/// Convert self to PAA data as `Vec<u8>`.  Mipmap payloads are written
	/// as they are; nothing is compressed.
	///
	/// If the image carries an OFFSTAGG, it is regenerated from the actual
	/// mipmap positions and moved after the other taggs.
	///
	/// # Errors
	/// - [`MipmapTooLarge`]: A mipmap cannot be represented in the header.
	/// - [`TooManyMipmaps`]: An OFFSTAGG is present and there are more than
	///   [`Self::MAX_MIPMAPS`] mipmaps.
	/// - [`ArithmeticOverflow`]: A tagg payload or a mipmap offset overflows
	///   a [`u32`].
	pub fn to_bytes(&self) -> PaaResult<Vec<u8>> {
		let mut buf: Vec<u8> = Vec::with_capacity(self.bytes_size_hint());

		buf.extend_with_uint::<LittleEndian, _, 2>(self.paatype.tag());

		let has_offs = self.taggs.iter().any(|t| &t.name == TaggPayload::OFFS_NAME);

		for t in self.taggs.iter().filter(|t| &t.name != TaggPayload::OFFS_NAME) {
			buf.extend(t.to_bytes()?);
		};

		let mipmap_blocks = self.mipmaps
			.iter()
			.map(PaaMipmap::to_bytes)
			.collect::<PaaResult<Vec<Vec<u8>>>>()?;

		if has_offs {
			if mipmap_blocks.len() > Self::MAX_MIPMAPS {
				return Err(TooManyMipmaps);
			};

			let offs_len = TaggPayload::Offs { offsets: vec![] }.to_tagg().to_bytes()?.len();
			let palette_len = 2;
			let mipmaps_offset = buf.len() + offs_len + palette_len;

			let offsets = mipmap_blocks
				.iter()
				.scan(mipmaps_offset, |acc, b| {
					let current = *acc;
					*acc += b.len();
					Some(current)
				})
				.map(|o| u32::try_from(o).map_err(|_| ArithmeticOverflow))
				.collect::<PaaResult<Vec<u32>>>()?;

			buf.extend(TaggPayload::Offs { offsets }.to_tagg().to_bytes()?);
		};

		buf.extend_with_uint::<LittleEndian, _, 2>(0u16);

		for m in mipmap_blocks {
			buf.extend(m);
		};

		buf.extend([0u8; 6]);

		Ok(buf)
	}


	/// Return the swizzle recorded in the first SWIZTAGG, or a no-op
	/// swizzle if there is none.
	///
	/// # Errors
	/// - [`UnexpectedTaggDataSize`]: The SWIZTAGG payload is not 4 bytes.
	pub fn swizzle(&self) -> PaaResult<ArgbSwizzle> {
		let swiz = self.taggs
			.iter()
			.find(|t| &t.name == TaggPayload::SWIZ_NAME);

		match swiz.map(Tagg::payload).transpose()? {
			Some(TaggPayload::Swiz { swizzle }) => Ok(swizzle),
			_ => Ok(ArgbSwizzle::new()),
		}
	}


	fn bytes_size_hint(&self) -> usize {
		let taggs: usize = self.taggs.iter().map(|t| t.data.len() + 12).sum();
		let mipmaps: usize = self.mipmaps.iter().map(|m| m.data.len() + 7).sum();
		taggs + mipmaps + 16
	}
}


/// Bitmap encoding used by all [mipmaps][`PaaImage::mipmaps`] of a given PAA
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, DekuRead)]
#[cfg_attr(feature = "arbitrary", derive(Arbitrary))]
#[deku(type = "u16", endian = "little")]
pub enum PaaType {
	/// 8 bits alpha, 8 bits grayscale.
	#[deku(id = "0x80_80")]
	Ai88,

	/// ARGB 1:5:5:5 in a little-endian 2-byte integer.
	#[deku(id = "0x15_55")]
	Argb1555,

	/// ARGB 4:4:4:4 in a little-endian 2-byte integer.
	#[deku(id = "0x44_44")]
	Argb4444,

	/// ARGB 8:8:8:8.
	#[deku(id = "0x88_88")]
	Argb8888,

	/// DXT1 (BC1) texture with 1-bit colour-key alpha.
	#[deku(id = "0xFF_01")]
	Dxt1,

	/// DXT2 texture (recognized, not decoded).
	#[deku(id = "0xFF_02")]
	Dxt2,

	/// DXT3 (BC2) texture (recognized, not decoded).
	#[deku(id = "0xFF_03")]
	Dxt3,

	/// DXT4 texture (recognized, not decoded).
	#[deku(id = "0xFF_04")]
	Dxt4,

	/// DXT5 (BC3) texture.
	#[deku(id = "0xFF_05")]
	Dxt5,
}


impl Default for PaaType {
	/// Returns [`Dxt5`][`PaaType::Dxt5`].
	fn default() -> Self {
		PaaType::Dxt5
	}
}


impl PaaType {
	/// Read the 2-byte format tag that opens a PAA file.
	///
	/// # Errors
	/// - [`UnexpectedEof`]: Fewer than 2 bytes available.
	/// - [`UnknownPaaType`]: The tag is not a known [`PaaType`].
	pub fn read_from<R: Read>(input: &mut R) -> PaaResult<Self> {
		let mut buf = [0u8; 2];
		input.read_exact(&mut buf)?;

		let (_, paatype) = PaaType::from_bytes((&buf, 0))
			.map_err(|_| UnknownPaaType(LittleEndian::read_u16(&buf)))?;

		Ok(paatype)
	}


	/// Return the on-disk format tag.
	///
	/// # Example
	/// ```
	/// # use paa_codec::PaaType;
	/// assert_eq!(PaaType::Dxt1.tag(), 0xFF01);
	/// assert_eq!(PaaType::Ai88.tag(), 0x8080);
	/// ```
	pub const fn tag(&self) -> u16 {
		use PaaType::*;

		match self {
			Ai88 => 0x8080,
			Argb1555 => 0x1555,
			Argb4444 => 0x4444,
			Argb8888 => 0x8888,
			Dxt1 => 0xFF01,
			Dxt2 => 0xFF02,
			Dxt3 => 0xFF03,
			Dxt4 => 0xFF04,
			Dxt5 => 0xFF05,
		}
	}


	/// Calculate the size in bytes of uncompressed mipmap data from its width
	/// and height in pixels.
	pub const fn predict_size(&self, width: u16, height: u16) -> usize {
		use PaaType::*;

		const_assert!(std::mem::size_of::<usize>() >= 4);

		let mut result = width as usize * height as usize;

		match self {
			Dxt1 => { result /= 2 },
			Dxt2 | Dxt3 | Dxt4 | Dxt5 => (),
			Argb4444 | Argb1555 | Ai88 => { result *= 2 },
			Argb8888 => { result *= 4 },
		};

		result
	}


	/// Return true if the [`PaaType`] is DXTn.
	///
	/// # Example
	/// ```
	/// # use paa_codec::PaaType;
	/// assert!(PaaType::Dxt5.is_dxtn());
	/// assert!(!PaaType::Argb1555.is_dxtn());
	/// ```
	pub const fn is_dxtn(&self) -> bool {
		use PaaType::*;
		matches!(self, Dxt1 | Dxt2 | Dxt3 | Dxt4 | Dxt5)
	}


	/// Return true if mipmaps of this type can be decoded into
	/// [`ChannelData`].
	///
	/// # Example
	/// ```
	/// # use paa_codec::PaaType;
	/// assert!(PaaType::Dxt1.is_decodable());
	/// assert!(!PaaType::Dxt3.is_decodable());
	/// assert!(!PaaType::Argb8888.is_decodable());
	/// ```
	pub const fn is_decodable(&self) -> bool {
		matches!(self, PaaType::Dxt1 | PaaType::Dxt5)
	}
}


trait ExtendExt: Extend<u8> {
	/// Convenience function which extends an [`std::iter::Extend<u8>`] with a
	/// [`byteorder::ByteOrder`]-encoded integer.
	fn extend_with_uint<B: ByteOrder, T: Into<u64>, const N: usize>(&mut self, v: T) {
		let mut buf = [0u8; N];
		B::write_uint(&mut buf[..], v.into(), N);
		self.extend(buf);
	}
}


impl<T> ExtendExt for T where T: Extend<u8> {}


trait ReadExt: Read {
	const SINGLE_READ_SIZE: usize = 4096;

	/// Read exactly `len` bytes, growing the buffer as data arrives rather
	/// than allocating `len` up front.
	fn read_exact_buffered(&mut self, len: usize) -> PaaResult<Vec<u8>> {
		let mut data: Vec<u8> = Vec::with_capacity(std::cmp::min(len, Self::SINGLE_READ_SIZE));
		let mut buf = vec![0u8; Self::SINGLE_READ_SIZE];
		let mut total = 0usize;

		while total < len {
			let bufsize = std::cmp::min(Self::SINGLE_READ_SIZE, len - total);
			self.read_exact(&mut buf[..bufsize])?;
			data.extend(&buf[..bufsize]);
			total += bufsize;
		};

		Ok(data)
	}
}


impl<T> ReadExt for T where T: Read { }


#[cfg(test)]
pub(crate) mod fixtures {
	//! Hand-assembled PAA files shared by the tests of several modules.

	use super::*;


	/// A DXT1 block with `v0` = pure red, `v1` = black, all codes 0.
	pub(crate) const RED_DXT1_BLOCK: [u8; 8] = [0x00, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];


	/// Assemble a PAA from a format tag, raw tagg records and raw mipmap
	/// records (each already including its header).
	pub(crate) fn assemble(tag: u16, taggs: &[Vec<u8>], mipmaps: &[Vec<u8>]) -> Vec<u8> {
		let mut buf = vec![];
		buf.extend_with_uint::<LittleEndian, _, 2>(tag);
		taggs.iter().for_each(|t| buf.extend(t));
		buf.extend([0u8, 0]);
		mipmaps.iter().for_each(|m| buf.extend(m));
		buf.extend([0u8; 6]);
		buf
	}


	/// Raw mipmap record: width (with optional LZO flag), height, u24 length, payload.
	pub(crate) fn mipmap_record(width: u16, height: u16, lzo: bool, payload: &[u8]) -> Vec<u8> {
		let mut buf = vec![];
		let width = if lzo { width | 0x8000 } else { width };
		buf.extend_with_uint::<LittleEndian, _, 2>(width);
		buf.extend_with_uint::<LittleEndian, _, 2>(height);
		buf.extend_with_uint::<LittleEndian, u32, 3>(payload.len().try_into().unwrap());
		buf.extend(payload);
		buf
	}


	/// Raw tagg record with the name given in reading order (e.g. `b"SWIZ"`).
	pub(crate) fn tagg_record(name: &[u8; 4], payload: &[u8]) -> Vec<u8> {
		let mut buf = b"GGAT".to_vec();
		buf.extend(name.iter().rev());
		buf.extend_with_uint::<LittleEndian, u32, 4>(payload.len().try_into().unwrap());
		buf.extend(payload);
		buf
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use super::fixtures::*;
	use byteorder::BigEndian;
	use static_assertions::assert_impl_all;


	#[test]
	fn test_extend_with_uint() {
		let mut dest: Vec<u8> = vec![];

		dest.extend_with_uint::<LittleEndian, _, 2>(1234u16);
		assert_eq!(dest, vec![0xD2, 0x04]);

		dest.extend_with_uint::<LittleEndian, _, 3>(1234u32);
		assert_eq!(dest, vec![0xD2, 0x04, 0xD2, 0x04, 0x00]);

		dest.extend_with_uint::<BigEndian, _, 4>(5678u32);
		assert_eq!(dest, vec![0xD2, 0x04, 0xD2, 0x04, 0x00, 0x00, 0x00, 0x16, 0x2E]);
	}


	#[test]
	fn test_read_exact_buffered() {
		let mut input = Cursor::new(vec![0x41u8, 0x42, 0x43, 0x44, 0x45, 0x46]);
		assert_eq!(input.read_exact_buffered(1).unwrap(), vec![0x41u8]);
		assert_eq!(input.read_exact_buffered(2).unwrap(), vec![0x42u8, 0x43]);
		assert_eq!(input.read_exact_buffered(3).unwrap(), vec![0x44u8, 0x45, 0x46]);
		assert!(matches!(input.read_exact_buffered(1), Err(UnexpectedEof)));
	}


	#[test]
	fn assert_traits() {
		use std::fmt::{Debug, Display};
		use std::error::Error;
		use std::panic::{UnwindSafe, RefUnwindSafe};

		assert_impl_all!(PaaError: Debug, Display, Error, Send, Sync, UnwindSafe, RefUnwindSafe);
		assert_impl_all!(LzoError: Debug, Display, Error, Send, Sync, Copy);
	}


	#[test]
	fn read_minimal_dxt1() {
		let data = assemble(0xFF01, &[], &[mipmap_record(4, 4, false, &RED_DXT1_BLOCK)]);
		let image = PaaImage::from_bytes(&data).unwrap();

		assert_eq!(image.paatype, PaaType::Dxt1);
		assert!(image.taggs.is_empty());
		assert_eq!(image.mipmaps.len(), 1);
		assert_eq!(image.mipmaps[0].width, 4);
		assert_eq!(image.mipmaps[0].height, 4);
		assert_eq!(image.mipmaps[0].compression, PaaMipmapCompression::Uncompressed);
		assert_eq!(image.mipmaps[0].data, RED_DXT1_BLOCK);
	}


	#[test]
	fn end_to_end_red_dxt1() {
		let data = assemble(0xFF01, &[], &[mipmap_record(4, 4, false, &RED_DXT1_BLOCK)]);
		let image = PaaImage::from_bytes(&data).unwrap();
		let channels = PaaDecoder::with_paa(image).decode_first().unwrap();

		assert_eq!(channels.len(), 16);
		assert!(channels.r().iter().all(|&v| v == 1.0));
		assert!(channels.g().iter().all(|&v| v == 0.0));
		assert!(channels.b().iter().all(|&v| v == 0.0));
		assert!(channels.a().iter().all(|&v| v == 1.0));
	}


	#[test]
	fn read_taggs_and_mipmap_chain() {
		let taggs = [
			tagg_record(b"AVGC", &[0x10, 0x20, 0x30, 0xFF]),
			tagg_record(b"SWIZ", &[0x00, 0x01, 0x02, 0x03]),
		];
		let mipmaps = [
			mipmap_record(8, 8, false, &[0u8; 32]),
			mipmap_record(4, 4, false, &[0u8; 8]),
		];
		let data = assemble(0xFF01, &taggs, &mipmaps);
		let image = PaaImage::from_bytes(&data).unwrap();

		assert_eq!(image.taggs.len(), 2);
		assert_eq!(&image.taggs[0].name, b"AVGC");
		assert_eq!(&image.taggs[1].name, b"SWIZ");
		assert!(image.swizzle().unwrap().is_noop());
		assert_eq!(image.mipmaps.iter().map(|m| (m.width, m.height)).collect::<Vec<_>>(), vec![(8, 8), (4, 4)]);
	}


	#[test]
	fn read_lzo_flag() {
		let data = assemble(0xFF05, &[], &[mipmap_record(4, 4, true, &[0x11, 0x00, 0x00])]);
		let image = PaaImage::from_bytes(&data).unwrap();
		assert_eq!(image.mipmaps[0].width, 4);
		assert_eq!(image.mipmaps[0].compression, PaaMipmapCompression::Lzo);
	}


	#[test]
	fn read_errors() {
		let unknown = assemble(0x1234, &[], &[]);
		assert!(matches!(PaaImage::from_bytes(&unknown), Err(UnknownPaaType(0x1234))));

		let palette = [0x01u8, 0xFF, 0x01, 0x00, 0xAA, 0xBB, 0xCC, 0, 0, 0, 0, 0, 0];
		assert!(matches!(PaaImage::from_bytes(&palette), Err(IndexedPaletteUnsupported)));

		let mut bad_eof = assemble(0xFF01, &[], &[]);
		let len = bad_eof.len();
		bad_eof[len - 2] = 0x34;
		bad_eof[len - 1] = 0x12;
		assert!(matches!(PaaImage::from_bytes(&bad_eof), Err(UnexpectedEofMarker(0x1234))));

		let mut truncated = assemble(0xFF01, &[], &[mipmap_record(4, 4, false, &RED_DXT1_BLOCK)]);
		truncated.truncate(12);
		assert!(matches!(PaaImage::from_bytes(&truncated), Err(UnexpectedEof)));
	}


	#[test]
	fn to_bytes_round_trip() {
		let taggs = [
			tagg_record(b"FLAG", &[0x01, 0x00, 0x00, 0x00]),
			tagg_record(b"SWIZ", &[0x0B, 0x01, 0x02, 0x03]),
		];
		let mipmaps = [
			mipmap_record(8, 4, true, &[0x11, 0x00, 0x00]),
			mipmap_record(4, 4, false, &RED_DXT1_BLOCK),
		];
		let data = assemble(0xFF01, &taggs, &mipmaps);
		let image = PaaImage::from_bytes(&data).unwrap();

		assert_eq!(image.to_bytes().unwrap(), data);
	}


	#[test]
	fn to_bytes_regenerates_offsets() {
		let mut image = PaaImage {
			paatype: PaaType::Dxt1,
			taggs: vec![TaggPayload::Offs { offsets: vec![1, 2, 3] }.to_tagg()],
			mipmaps: vec![],
		};

		image.mipmaps.push(PaaMipmap {
			width: 8,
			height: 8,
			paatype: PaaType::Dxt1,
			compression: PaaMipmapCompression::Uncompressed,
			data: vec![0; 32],
		});
		image.mipmaps.push(PaaMipmap {
			width: 4,
			height: 4,
			paatype: PaaType::Dxt1,
			compression: PaaMipmapCompression::Uncompressed,
			data: RED_DXT1_BLOCK.to_vec(),
		});

		let data = image.to_bytes().unwrap();
		let reread = PaaImage::from_bytes(&data).unwrap();

		let offsets = match reread.taggs[0].payload().unwrap() {
			TaggPayload::Offs { offsets } => offsets,
			p => panic!("Expected an OFFSTAGG, got {:?}", p),
		};

		// 2 (type) + 12 + 64 (OFFS) + 2 (palette)
		assert_eq!(offsets, vec![80, 80 + 7 + 32]);
		assert_eq!(reread.mipmaps, image.mipmaps);

		let first = offsets[0] as usize;
		assert_eq!(&data[first..first + 2], &[8, 0]);
	}
}
