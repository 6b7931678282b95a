//! DXT1 (BC1) and DXT5 (BC3) block decoders
//!
//! Textures are split into 4x4 texel blocks stored left-to-right,
//! top-to-bottom.  Decoded texels are written into a [`ChannelData`] in its
//! bottom-to-top row order.

use byteorder::{ByteOrder, LittleEndian};
use deku::prelude::*;

use crate::{PaaResult, ChannelData};
use crate::PaaError::*;
use crate::macros;


/// A single compressed 4x4 block
pub trait DxtBlock: Sized {
	/// Size of the block in bytes.
	const SIZE: usize;

	/// Parse a block from exactly [`Self::SIZE`] bytes.
	///
	/// # Errors
	/// - [`UnexpectedEof`][crate::PaaError::UnexpectedEof]: `input` is too
	///   short.
	fn parse(input: &[u8]) -> PaaResult<Self>;

	/// Decode the block into 16 RGBA texels in row-major order, top row
	/// first.
	fn texels(&self) -> [[f32; 4]; 16];
}


/// DXT1 block: two RGB565 endpoints and 2-bit colour indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead)]
#[deku(endian = "little")]
pub struct Dxt1Block {
	#[allow(missing_docs)]
	pub color0: u16,
	#[allow(missing_docs)]
	pub color1: u16,
	/// 2 bits per texel, texel 0 in the least significant bits.
	pub codes: u32,
}


impl DxtBlock for Dxt1Block {
	const SIZE: usize = 8;


	fn parse(input: &[u8]) -> PaaResult<Self> {
		let (_, block) = Self::from_bytes((input, 0)).map_err(|_| UnexpectedEof)?;
		Ok(block)
	}


	fn texels(&self) -> [[f32; 4]; 16] {
		let palette = color_palette(self.color0, self.color1, true);
		std::array::from_fn(|p| palette[color_code(self.codes, p)])
	}
}


/// DXT5 block: an interpolated alpha block followed by a DXT1-style colour
/// block
#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead)]
#[deku(endian = "little")]
pub struct Dxt5Block {
	#[allow(missing_docs)]
	pub alpha0: u8,
	#[allow(missing_docs)]
	pub alpha1: u8,
	/// 3 bits per texel, little-endian, texel 0 in the least significant
	/// bits.
	pub alpha_codes: [u8; 6],
	#[allow(missing_docs)]
	pub color0: u16,
	#[allow(missing_docs)]
	pub color1: u16,
	/// 2 bits per texel, texel 0 in the least significant bits.
	pub codes: u32,
}


impl DxtBlock for Dxt5Block {
	const SIZE: usize = 16;


	fn parse(input: &[u8]) -> PaaResult<Self> {
		let (_, block) = Self::from_bytes((input, 0)).map_err(|_| UnexpectedEof)?;
		Ok(block)
	}


	fn texels(&self) -> [[f32; 4]; 16] {
		let palette = color_palette(self.color0, self.color1, false);
		let alphas = alpha_palette(self.alpha0, self.alpha1);
		let alpha_codes = LittleEndian::read_u48(&self.alpha_codes);

		std::array::from_fn(|p| {
			let [r, g, b, _] = palette[color_code(self.codes, p)];
			#[allow(clippy::cast_possible_truncation)]
			let a = alphas[((alpha_codes >> (3 * p)) & 0b111) as usize];
			[r, g, b, a]
		})
	}
}


/// Decode a DXT1 mipmap.
///
/// # Errors
/// - [`InvalidResolution`][crate::PaaError::InvalidResolution]: `width` or
///   `height` is not a multiple of 4.
/// - [`UnexpectedEof`][crate::PaaError::UnexpectedEof]: `input` holds fewer
///   than `width * height / 2` bytes.
///
/// # Example
/// ```
/// # use paa_codec::dxt;
/// let channels = dxt::decode_dxt1(&[0x00, 0xF8, 0, 0, 0, 0, 0, 0], 4, 4).unwrap();
/// assert_eq!(channels.pixel(0, 0), [1.0, 0.0, 0.0, 1.0]);
/// ```
pub fn decode_dxt1(input: &[u8], width: u16, height: u16) -> PaaResult<ChannelData> {
	decode_blocks::<Dxt1Block>(input, width, height)
}


/// Decode a DXT5 mipmap.
///
/// # Errors
/// - [`InvalidResolution`][crate::PaaError::InvalidResolution]: `width` or
///   `height` is not a multiple of 4.
/// - [`UnexpectedEof`][crate::PaaError::UnexpectedEof]: `input` holds fewer
///   than `width * height` bytes.
pub fn decode_dxt5(input: &[u8], width: u16, height: u16) -> PaaResult<ChannelData> {
	decode_blocks::<Dxt5Block>(input, width, height)
}


/// Decode `width / 4 * height / 4` blocks of type `B`.  Data past the last
/// block is ignored.
///
/// # Errors
/// See [`decode_dxt1`].
pub fn decode_blocks<B: DxtBlock>(input: &[u8], width: u16, height: u16) -> PaaResult<ChannelData> {
	if width % 4 != 0 || height % 4 != 0 {
		return Err(InvalidResolution(width, height));
	};

	let blocks_x = usize::from(width / 4);
	let blocks_y = usize::from(height / 4);
	let data_len = blocks_x * blocks_y * B::SIZE;

	let data = input.get(..data_len).ok_or(UnexpectedEof)?;
	let mut channels = ChannelData::new(width, height);

	macros::log!(trace, "Decoding {} {}-byte blocks for {}x{}", blocks_x * blocks_y, B::SIZE, width, height);

	for (i, chunk) in data.chunks_exact(B::SIZE).enumerate() {
		let block = B::parse(chunk)?;
		let (block_col, block_row) = (i % blocks_x, i / blocks_x);

		for (p, texel) in block.texels().into_iter().enumerate() {
			let (r, c) = (p / 4, p % 4);
			let x = block_col * 4 + c;
			let row = usize::from(height) - block_row * 4 - r - 1;

			#[allow(clippy::cast_possible_truncation)]
			channels.set_pixel(x as u16, row as u16, texel);
		};
	};

	Ok(channels)
}


fn color_code(codes: u32, p: usize) -> usize {
	((codes >> (2 * p)) & 0b11) as usize
}


fn rgb565(v: u16) -> [f32; 3] {
	[
		f32::from(v >> 11) / 31.0,
		f32::from((v >> 5) & 0x3F) / 63.0,
		f32::from(v & 0x1F) / 31.0,
	]
}


/// Build the 4-entry RGBA palette.  In 3-colour mode (`color0 <= color1`)
/// entry 3 is black; with `color_key` its alpha is also 0.
fn color_palette(color0: u16, color1: u16, color_key: bool) -> [[f32; 4]; 4] {
	let c0 = rgb565(color0);
	let c1 = rgb565(color1);

	let mix = |w0: f32, w1: f32| -> [f32; 4] {
		let [r, g, b] = std::array::from_fn(|i| w0 * c0[i] + w1 * c1[i]);
		[r, g, b, 1.0]
	};

	let [r0, g0, b0] = c0;
	let [r1, g1, b1] = c1;

	if color0 > color1 {
		[[r0, g0, b0, 1.0], [r1, g1, b1, 1.0], mix(2.0 / 3.0, 1.0 / 3.0), mix(1.0 / 3.0, 2.0 / 3.0)]
	}
	else {
		let key = if color_key { 0.0 } else { 1.0 };
		[[r0, g0, b0, 1.0], [r1, g1, b1, 1.0], mix(0.5, 0.5), [0.0, 0.0, 0.0, key]]
	}
}


/// Build the 8-entry alpha palette.
fn alpha_palette(alpha0: u8, alpha1: u8) -> [f32; 8] {
	let a0 = f32::from(alpha0) / 255.0;
	let a1 = f32::from(alpha1) / 255.0;

	let mut result = [a0, a1, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0];

	if a0 > a1 {
		for k in 1..=6 {
			result[k + 1] = ((7 - k) as f32 / 7.0) * a0 + (k as f32 / 7.0) * a1;
		};
	}
	else {
		for k in 1..=4 {
			result[k + 1] = ((5 - k) as f32 / 5.0) * a0 + (k as f32 / 5.0) * a1;
		};
	};

	result
}
