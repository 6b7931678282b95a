use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use static_assertions::const_assert;
use tap::prelude::*;

use crate::{PaaResult, PaaType, ChannelData};
use crate::PaaError::*;
use crate::{ReadExt, ExtendExt};
use crate::{lzo, dxt};
use crate::macros;
#[cfg(doc)] use crate::PaaImage;


/// A single mipmap (image) from a [`PaaImage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaaMipmap {
	/// Width in pixels.  Must not be larger than 32767; MSB indicates compression.
	pub width: u16,
	/// Height in pixels.
	pub height: u16,
	/// Underlying data type. Equals to the type of the parent [`PaaImage`].
	pub paatype: PaaType,
	/// Compression of [`data`][`Self::data`].
	pub compression: PaaMipmapCompression,
	/// Mipmap payload as stored in the file (compressed if
	/// [`compression`][`Self::compression`] says so).
	pub data: Vec<u8>,
}


impl PaaMipmap {
	const LZO_FLAG: u16 = 0x8000;
	const MAX_DATA_LEN: usize = 0xFF_FFFF;


	/// Attempt to read a mipmap record from a [`Read`].  Returns `None` at
	/// the terminator record (width and height both 0), which consumes only
	/// the 4 dimension bytes.
	///
	/// # Errors
	/// - [`UnexpectedEof`]: [`std::io::Read::read_exact()`] or
	///   [`byteorder::ReadBytesExt::read_uint()`] encountered an EOF.
	/// - [`UnexpectedIoError`]: [`std::io::Read::read_exact()`] or
	///   [`byteorder::ReadBytesExt::read_uint()`] encountered an unexpected I/O error.
	///
	/// [`Read`]: std::io::Read
	pub fn read_from<R: Read>(input: &mut R, paatype: PaaType) -> PaaResult<Option<Self>> {
		use PaaMipmapCompression::*;

		let mut width = input.read_u16::<LittleEndian>()?;
		let height = input.read_u16::<LittleEndian>()?;

		if width == 0 && height == 0 {
			return Ok(None);
		};

		let compression = if width & Self::LZO_FLAG != 0 { Lzo } else { Uncompressed };
		width &= !Self::LZO_FLAG;

		const_assert!(std::mem::size_of::<usize>() >= 4);
		#[allow(clippy::cast_possible_truncation)]
		let data_len = input.read_uint::<LittleEndian>(3)? as usize;

		let data = input.read_exact_buffered(data_len)?;

		macros::log!(trace, "Read {}x{} {:?} mipmap, {:?}, {} bytes", width, height, paatype, compression, data_len);

		Ok(Some(PaaMipmap { width, height, paatype, compression, data }))
	}


	/// Wrap `input` with a [`Cursor`][std::io::Cursor] and
	/// [`read_from`][`Self::read_from`] from it.
	///
	/// # Errors
	/// See [`Self::read_from`].
	pub fn from_bytes(input: &[u8], paatype: PaaType) -> PaaResult<Option<Self>> {
		let mut cursor = std::io::Cursor::new(input);
		Self::read_from(&mut cursor, paatype)
	}


	/// Read sequential mipmaps from `input` up to and including the
	/// terminator record.
	///
	/// # Errors
	/// See [`Self::read_from`].
	pub fn read_from_until_terminator<R: Read>(input: &mut R, paatype: PaaType) -> PaaResult<Vec<Self>> {
		let mut result: Vec<PaaMipmap> = Vec::with_capacity(8);

		while let Some(mip) = PaaMipmap::read_from(input, paatype)? {
			result.push(mip);
		};

		Ok(result)
	}


	/// Serialize the mipmap record, with the payload written as it is.
	///
	/// # Errors
	/// - [`MipmapTooLarge`]: Mipmap dimension equals to or is larger than
	///   32768, or the payload does not fit a 24-bit length.
	pub fn to_bytes(&self) -> PaaResult<Vec<u8>> {
		use PaaMipmapCompression::*;

		if self.width >= Self::LZO_FLAG || self.height >= Self::LZO_FLAG || self.data.len() > Self::MAX_DATA_LEN {
			return Err(MipmapTooLarge);
		};

		let mut bytes: Vec<u8> = Vec::with_capacity(self.data.len() + 7);

		let width = match self.compression {
			Lzo => self.width | Self::LZO_FLAG,
			Uncompressed => self.width,
		};

		bytes.extend_with_uint::<LittleEndian, _, 2>(width);
		bytes.extend_with_uint::<LittleEndian, _, 2>(self.height);

		#[allow(clippy::cast_possible_truncation)]
		bytes.extend_with_uint::<LittleEndian, u32, 3>(self.data.len() as u32);
		bytes.extend(&self.data[..]);

		Ok(bytes)
	}


	/// Return true if any dimension is 0.
	pub fn is_empty(&self) -> bool {
		self.width == 0 || self.height == 0
	}


	/// Return the uncompressed [`paatype`][`Self::paatype`]-encoded payload.
	///
	/// # Errors
	/// - [`LzoDecompressError`]: The LZO stream is malformed or does not
	///   expand to [`PaaType::predict_size`] bytes.
	pub fn decompress(&self) -> PaaResult<Vec<u8>> {
		let dst_len = self.paatype.predict_size(self.width, self.height);
		self.compression.decompress_slice(&self.data, dst_len)
	}


	/// Decompress and decode the mipmap into [`ChannelData`].
	///
	/// # Errors
	/// - [`UnsupportedPaaType`]: [`PaaType::is_decodable`] is false.
	/// - See [`Self::decompress`], [`dxt::decode_dxt1`].
	///
	/// # Example
	/// ```
	/// # use paa_codec::*;
	/// let mipmap = PaaMipmap {
	///     width: 4,
	///     height: 4,
	///     paatype: PaaType::Dxt1,
	///     compression: PaaMipmapCompression::Uncompressed,
	///     data: vec![0x00, 0xF8, 0, 0, 0, 0, 0, 0],
	/// };
	/// let channels = mipmap.decode().unwrap();
	/// assert!(channels.r().iter().all(|&r| r == 1.0));
	/// ```
	pub fn decode(&self) -> PaaResult<ChannelData> {
		use PaaType::*;

		if !self.paatype.is_decodable() {
			return Err(UnsupportedPaaType(self.paatype));
		};

		let data = self.decompress()?;

		match self.paatype {
			Dxt1 => dxt::decode_dxt1(&data, self.width, self.height),
			Dxt5 => dxt::decode_dxt5(&data, self.width, self.height),
			t => Err(UnsupportedPaaType(t)),
		}
	}
}


impl Default for PaaMipmap {
	fn default() -> Self {
		PaaMipmap {
			width: 0,
			height: 0,
			paatype: PaaType::default(),
			compression: PaaMipmapCompression::Uncompressed,
			data: vec![],
		}
	}
}


/// The algorithm compressing the data of a given mipmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum PaaMipmapCompression {
	/// Data is stored as-is.
	Uncompressed,
	/// LZO1X compression (flagged by the MSB of the width).
	Lzo,
}


impl PaaMipmapCompression {
	/// Decompress `input`, which must expand to exactly `dst_len` bytes.
	/// Uncompressed data is returned as is.
	///
	/// # Errors
	/// - [`LzoDecompressError`]: failed to decompress input as LZO.
	pub fn decompress_slice(self, input: &[u8], dst_len: usize) -> PaaResult<Vec<u8>> {
		use PaaMipmapCompression::*;

		match self {
			Uncompressed => Ok(input.to_vec()),
			Lzo => {
				let (consumed, data) = lzo::decompress(input, dst_len)
					.tap_err(|_e| { macros::log!(debug, "LZO decompression failed: {}", _e); })?;

				if consumed != input.len() {
					macros::log!(debug, "LZO stream ended {} bytes before the end of the payload", input.len() - consumed);
				};

				Ok(data)
			},
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::PaaError;
	use crate::fixtures::*;


	#[test]
	fn read_record() {
		let record = mipmap_record(8, 4, true, &[1, 2, 3]);
		let mip = PaaMipmap::from_bytes(&record, PaaType::Dxt5).unwrap().unwrap();

		assert_eq!(mip.width, 8);
		assert_eq!(mip.height, 4);
		assert_eq!(mip.compression, PaaMipmapCompression::Lzo);
		assert_eq!(mip.data, vec![1, 2, 3]);
		assert_eq!(mip.to_bytes().unwrap(), record);

		// flag is cleared for non-DXT types too
		let mip = PaaMipmap::from_bytes(&record, PaaType::Argb8888).unwrap().unwrap();
		assert_eq!(mip.width, 8);
		assert_eq!(mip.compression, PaaMipmapCompression::Lzo);
	}


	#[test]
	fn terminator() {
		assert_eq!(PaaMipmap::from_bytes(&[0, 0, 0, 0], PaaType::Dxt1).unwrap(), None);

		// only one zero dimension is not a terminator
		let record = mipmap_record(0, 4, false, &[]);
		let mip = PaaMipmap::from_bytes(&record, PaaType::Dxt1).unwrap().unwrap();
		assert!(mip.is_empty());

		let mut chain = mipmap_record(4, 4, false, &RED_DXT1_BLOCK);
		chain.extend([0, 0, 0, 0, 0xAA]);
		let mut cursor = std::io::Cursor::new(&chain[..]);
		let mips = PaaMipmap::read_from_until_terminator(&mut cursor, PaaType::Dxt1).unwrap();
		assert_eq!(mips.len(), 1);
		assert_eq!(cursor.position(), 15 + 4);
	}


	#[test]
	fn truncated() {
		let record = mipmap_record(4, 4, false, &RED_DXT1_BLOCK);
		assert!(matches!(PaaMipmap::from_bytes(&record[..6], PaaType::Dxt1), Err(PaaError::UnexpectedEof)));
		assert!(matches!(PaaMipmap::from_bytes(&record[..14], PaaType::Dxt1), Err(PaaError::UnexpectedEof)));
	}


	#[test]
	fn too_large() {
		let mut mip = PaaMipmap { width: 0x8000, height: 4, ..Default::default() };
		assert!(matches!(mip.to_bytes(), Err(PaaError::MipmapTooLarge)));

		mip.width = 4;
		mip.data = vec![0; 0x100_0000];
		assert!(matches!(mip.to_bytes(), Err(PaaError::MipmapTooLarge)));
	}


	#[test]
	fn decode_lzo() {
		let mut lzo = minilzo_rs::LZO::init().unwrap();
		let raw: Vec<u8> = RED_DXT1_BLOCK.iter().copied().cycle().take(8 * 4).collect();

		let mip = PaaMipmap {
			width: 8,
			height: 8,
			paatype: PaaType::Dxt1,
			compression: PaaMipmapCompression::Lzo,
			data: lzo.compress(&raw).unwrap(),
		};

		assert_eq!(mip.decompress().unwrap(), raw);
		let channels = mip.decode().unwrap();
		assert_eq!(channels.len(), 64);
		assert!(channels.r().iter().all(|&r| r == 1.0));
	}


	#[test]
	fn decode_errors() {
		let mip = PaaMipmap { width: 4, height: 4, paatype: PaaType::Argb4444, data: vec![0; 32], ..Default::default() };
		assert!(matches!(mip.decode(), Err(PaaError::UnsupportedPaaType(PaaType::Argb4444))));

		let mip = PaaMipmap { width: 4, height: 4, paatype: PaaType::Dxt3, data: vec![0; 16], ..Default::default() };
		assert!(matches!(mip.decode(), Err(PaaError::UnsupportedPaaType(PaaType::Dxt3))));

		let mip = PaaMipmap {
			width: 4,
			height: 4,
			paatype: PaaType::Dxt1,
			compression: PaaMipmapCompression::Lzo,
			data: vec![0x11, 0x00, 0x00],
		};
		assert!(matches!(mip.decode(), Err(PaaError::LzoDecompressError(lzo::LzoError::ShortOutput { expected: 8, actual: 0 }))));

		// header claims a ~2 GiB payload
		let mip = PaaMipmap {
			width: 0x7FFF,
			height: 0xFFFF,
			paatype: PaaType::Dxt5,
			compression: PaaMipmapCompression::Lzo,
			data: vec![0x11, 0x00, 0x00],
		};
		let expected = PaaType::Dxt5.predict_size(0x7FFF, 0xFFFF);
		assert!(matches!(mip.decode(), Err(PaaError::LzoDecompressError(lzo::LzoError::ShortOutput { expected: e, actual: 0 })) if e == expected));

		let mip = PaaMipmap { width: 4, height: 2, paatype: PaaType::Dxt1, data: vec![0; 8], ..Default::default() };
		assert!(matches!(mip.decode(), Err(PaaError::InvalidResolution(4, 2))));
	}
}
