//! LZO1X decompressor for DXT-LZO mipmap payloads
//!
//! The stream is a sequence of command bytes.  Each command encodes a
//! back-reference ("match") into the already decompressed output, optionally
//! followed by up to 3 literal bytes copied verbatim from the input; a
//! separate command class encodes longer literal runs.  The stream ends with
//! a match whose distance is exactly 16384.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use derive_more::{Display, Error};

use crate::macros;


/// Stream-level LZO1X decompression error
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum LzoError {
	/// A command would write past `expected_size`.
	#[display(fmt = "Output overrun: {} bytes requested, {} bytes remaining", requested, remaining)]
	OutputOverrun {
		#[allow(missing_docs)]
		requested: usize,
		#[allow(missing_docs)]
		remaining: usize,
	},

	/// A match refers to data before the start of the output.
	#[display(fmt = "Back-reference distance {} exceeds the {} bytes decompressed so far", distance, available)]
	BackreferenceOutOfRange {
		#[allow(missing_docs)]
		distance: usize,
		#[allow(missing_docs)]
		available: usize,
	},

	/// The end-of-stream command carried a length other than 3.
	#[display(fmt = "Invalid end-of-stream marker with length {}", length)]
	InvalidEos {
		#[allow(missing_docs)]
		length: usize,
	},

	/// The stream ended before producing `expected_size` bytes.
	#[display(fmt = "Stream ended after {} of {} expected bytes", actual, expected)]
	ShortOutput {
		#[allow(missing_docs)]
		expected: usize,
		#[allow(missing_docs)]
		actual: usize,
	},

	/// The input ended in the middle of a command.
	#[display(fmt = "Input ended in the middle of a command")]
	InputOverrun,
}


use LzoError::*;


/// Decompress an LZO1X stream that is expected to expand to exactly
/// `expected_size` bytes.
///
/// Returns the number of input bytes consumed (up to and including the
/// end-of-stream command) together with the output.  Input after the
/// end-of-stream command is ignored.
///
/// # Errors
/// - [`OutputOverrun`]: The stream expands past `expected_size`.
/// - [`BackreferenceOutOfRange`]: A match reaches before the start of the
///   output.
/// - [`InvalidEos`]: Malformed end-of-stream command.
/// - [`ShortOutput`]: The stream ended early.
/// - [`InputOverrun`]: The input ended before the end-of-stream command.
///
/// # Example
/// ```
/// # use paa_codec::lzo;
/// let input = [0x15, b'a', b'b', b'c', b'd', 0x6C, 0x00, 0x11, 0x00, 0x00];
/// let (consumed, output) = lzo::decompress(&input, 8).unwrap();
/// assert_eq!(consumed, input.len());
/// assert_eq!(output, b"abcdabcd");
/// ```
pub fn decompress(input: &[u8], expected_size: usize) -> Result<(usize, Vec<u8>), LzoError> {
	let mut decoder = Decoder::new(input, expected_size);
	decoder.run()?;

	#[allow(clippy::cast_possible_truncation)]
	let consumed = decoder.input.position() as usize;

	macros::log!(trace, "LZO: {} bytes in, {} bytes out", consumed, decoder.output.len());

	Ok((consumed, decoder.output))
}


struct Decoder<'a> {
	input: Cursor<&'a [u8]>,
	output: Vec<u8>,
	expected_size: usize,
}


impl<'a> Decoder<'a> {
	const EOS_DISTANCE: usize = 0x4000;
	/// Upper bound on the up-front reservation per input byte.  The output
	/// still grows up to `expected_size` on demand.
	const RESERVE_RATIO: usize = 64;


	fn new(input: &'a [u8], expected_size: usize) -> Self {
		let reserve = std::cmp::min(expected_size, input.len().saturating_mul(Self::RESERVE_RATIO));

		Decoder {
			input: Cursor::new(input),
			output: Vec::with_capacity(reserve),
			expected_size,
		}
	}


	fn run(&mut self) -> Result<(), LzoError> {
		let mut cmd = self.read_u8()?;
		let mut state: usize;

		if cmd > 17 {
			let length = usize::from(cmd - 17);
			self.copy_literals(length)?;
			state = std::cmp::min(4, length);
			cmd = self.read_u8()?;
		}
		else {
			state = 0;
		};

		loop {
			let (length, distance, trailing) = match cmd {
				128..=255 => {
					let length = 5 + usize::from((cmd >> 5) & 3);
					let distance = (usize::from(self.read_u8()?) << 3) + usize::from((cmd >> 2) & 7) + 1;
					(length, distance, usize::from(cmd & 3))
				},

				64..=127 => {
					let length = 3 + usize::from((cmd >> 5) & 1);
					let distance = (usize::from(self.read_u8()?) << 3) + usize::from((cmd >> 2) & 7) + 1;
					(length, distance, usize::from(cmd & 3))
				},

				32..=63 => {
					let length = 2 + self.get_extended_length(cmd, 31)?;
					let extra = usize::from(self.read_u16()?);
					(length, (extra >> 2) + 1, extra & 3)
				},

				16..=31 => {
					let length = 2 + self.get_extended_length(cmd, 7)?;
					let extra = usize::from(self.read_u16()?);
					let distance = Self::EOS_DISTANCE + (usize::from(cmd & 8) << 11) + (extra >> 2);

					if distance == Self::EOS_DISTANCE {
						if length != 3 {
							return Err(InvalidEos { length });
						};

						break;
					};

					(length, distance, extra & 3)
				},

				_ if state == 0 => {
					let length = 3 + self.get_extended_length(cmd, 15)?;
					self.copy_literals(length)?;
					state = 4;
					cmd = self.read_u8()?;
					continue;
				},

				_ if state < 4 => {
					let distance = (usize::from(self.read_u8()?) << 2) + usize::from(cmd >> 2) + 1;
					(2, distance, usize::from(cmd & 3))
				},

				_ => {
					let distance = (usize::from(self.read_u8()?) << 2) + usize::from(cmd >> 2) + 2049;
					(3, distance, usize::from(cmd & 3))
				},
			};

			self.copy_match(distance, length)?;
			self.copy_literals(trailing)?;
			state = trailing;
			cmd = self.read_u8()?;
		};

		if self.output.len() != self.expected_size {
			return Err(ShortOutput { expected: self.expected_size, actual: self.output.len() });
		};

		Ok(())
	}


	fn read_u8(&mut self) -> Result<u8, LzoError> {
		self.input.read_u8().map_err(|_| InputOverrun)
	}


	fn read_u16(&mut self) -> Result<u16, LzoError> {
		self.input.read_u16::<LittleEndian>().map_err(|_| InputOverrun)
	}


	fn check_capacity(&self, n: usize) -> Result<(), LzoError> {
		let remaining = self.expected_size - self.output.len();

		if remaining < n {
			return Err(OutputOverrun { requested: n, remaining });
		};

		Ok(())
	}


	/// Decode a length field of `mask` bits, where zero escapes to a run of
	/// zero bytes (255 each) closed by a non-zero byte.
	fn get_extended_length(&mut self, first: u8, mask: u8) -> Result<usize, LzoError> {
		if first & mask != 0 {
			return Ok(usize::from(first & mask));
		};

		let mut length = usize::from(mask);

		loop {
			match self.read_u8()? {
				0 => length += 255,
				t => return Ok(length + usize::from(t)),
			};
		};
	}


	fn copy_literals(&mut self, length: usize) -> Result<(), LzoError> {
		self.check_capacity(length)?;

		#[allow(clippy::cast_possible_truncation)]
		let start = self.input.position() as usize;
		let source = self.input.get_ref();

		let end = start.checked_add(length).filter(|e| *e <= source.len()).ok_or(InputOverrun)?;
		self.output.extend_from_slice(&source[start..end]);
		self.input.set_position(end as u64);

		Ok(())
	}


	/// Append `length` bytes starting `distance` bytes behind the end of the
	/// output.  `length` may exceed `distance`, in which case the copied
	/// region repeats.
	fn copy_match(&mut self, distance: usize, length: usize) -> Result<(), LzoError> {
		self.check_capacity(length)?;

		let available = self.output.len();

		if distance > available || distance == 0 {
			return Err(BackreferenceOutOfRange { distance, available });
		};

		let start = available - distance;
		let mut remaining = length;

		while remaining > 0 {
			let chunk = std::cmp::min(distance, remaining);
			self.output.extend_from_within(start..start + chunk);
			remaining -= chunk;
		};

		Ok(())
	}
}
