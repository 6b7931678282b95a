use crate::{PaaImage, PaaResult, ArgbSwizzle, ChannelData};
use crate::PaaError::*;
use crate::macros;


/// Wrapper around [`PaaImage`] that decodes mipmaps into swizzled
/// [`ChannelData`]
#[derive(Debug, Clone)]
pub struct PaaDecoder {
	paa: PaaImage,
	swizzle: Option<ArgbSwizzle>,
}


impl PaaDecoder {
	/// Create an instance of `Self` from a [`PaaImage`].  Decoded channels
	/// get the swizzle from the image's SWIZTAGG.
	pub fn with_paa(paa: PaaImage) -> Self {
		Self { paa, swizzle: None }
	}


	/// Apply `swizzle` instead of the one stored in the image.
	#[must_use]
	pub fn with_swizzle(self, swizzle: ArgbSwizzle) -> Self {
		Self { swizzle: Some(swizzle), ..self }
	}


	/// The wrapped image.
	pub fn paa(&self) -> &PaaImage {
		&self.paa
	}


	/// Decode mipmap at [`PaaImage::mipmaps`]`[index]` and apply the swizzle.
	///
	/// # Errors
	/// - [`MipmapIndexOutOfRange`]: `index` is outside of bounds of [`PaaImage::mipmaps`].
	/// - [`UnexpectedTaggDataSize`]: The image's SWIZTAGG is malformed.
	/// - other: see [`PaaMipmap::decode`][crate::PaaMipmap::decode].
	pub fn decode_nth(&self, index: usize) -> PaaResult<ChannelData> {
		let mipmap = self.paa.mipmaps
			.get(index)
			.ok_or(MipmapIndexOutOfRange)?;

		let swizzle = match self.swizzle {
			Some(s) => s,
			None => self.paa.swizzle()?,
		};

		let mut channels = mipmap.decode()?;

		macros::log!(debug, "Decoded mipmap {} ({}x{}), swizzle: {}", index, mipmap.width, mipmap.height, swizzle);

		swizzle.apply_to_channels(&mut channels);

		Ok(channels)
	}


	/// Decode the first (largest) mipmap, see [`PaaDecoder::decode_nth`].
	///
	/// # Errors
	/// See [`PaaDecoder::decode_nth`].
	pub fn decode_first(&self) -> PaaResult<ChannelData> {
		self.decode_nth(0)
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use crate::PaaError;
	use crate::fixtures::*;


	fn red_with_swizzle(code: [u8; 4]) -> PaaImage {
		let taggs = [tagg_record(b"SWIZ", &code)];
		let mipmaps = [mipmap_record(4, 4, false, &RED_DXT1_BLOCK)];
		PaaImage::from_bytes(&assemble(0xFF01, &taggs, &mipmaps)).unwrap()
	}


	#[test]
	fn applies_stored_swizzle() {
		// A <- 1-R, B <- 1-G, G <- R is left alone
		let decoder = PaaDecoder::with_paa(red_with_swizzle([0x05, 0x01, 0x01, 0x06]));
		let channels = decoder.decode_first().unwrap();

		assert!(channels.a().iter().all(|&v| v == 0.0));
		assert!(channels.b().iter().all(|&v| v == 1.0));
		assert!(channels.r().iter().all(|&v| v == 1.0));
		assert!(channels.g().iter().all(|&v| v == 0.0));
	}


	#[test]
	fn swizzle_override() {
		let decoder = PaaDecoder::with_paa(red_with_swizzle([0x05, 0x01, 0x01, 0x06]))
			.with_swizzle(ArgbSwizzle::new());
		let channels = decoder.decode_first().unwrap();

		assert!(channels.a().iter().all(|&v| v == 1.0));
		assert!(channels.b().iter().all(|&v| v == 0.0));
	}


	#[test]
	fn index_out_of_range() {
		let decoder = PaaDecoder::with_paa(red_with_swizzle([0, 1, 2, 3]));
		assert_eq!(decoder.paa().mipmaps.len(), 1);
		assert!(matches!(decoder.decode_nth(1), Err(PaaError::MipmapIndexOutOfRange)));
		assert!(matches!(PaaDecoder::with_paa(PaaImage::default()).decode_first(), Err(PaaError::MipmapIndexOutOfRange)));
	}
}
