use image::RgbaImage;

use crate::ChannelSwizzleId;


/// Decoded mipmap as four planar channels of floats in `0.0..=1.0`
///
/// Channels are stored in RGBA order and indexed by [`ChannelSwizzleId`].
/// Rows are laid out bottom-to-top: index `0` is the leftmost pixel of the
/// bottom row of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelData {
	width: u16,
	height: u16,
	channels: [Vec<f32>; 4],
}


impl ChannelData {
	/// Create zero-filled channels for a `width` x `height` image.
	pub fn new(width: u16, height: u16) -> Self {
		Self::filled(width, height, [0.0; 4])
	}


	/// Create channels where every pixel has the value `rgba`.
	pub fn filled(width: u16, height: u16, rgba: [f32; 4]) -> Self {
		let len = width as usize * height as usize;
		let channels = rgba.map(|v| vec![v; len]);
		ChannelData { width, height, channels }
	}


	/// Image width in pixels.
	pub fn width(&self) -> u16 {
		self.width
	}


	/// Image height in pixels.
	pub fn height(&self) -> u16 {
		self.height
	}


	/// Number of pixels in each channel.
	pub fn len(&self) -> usize {
		self.channels[0].len()
	}


	/// Returns `true` if the image has no pixels.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}


	#[allow(missing_docs)]
	pub fn r(&self) -> &[f32] {
		self.channel(ChannelSwizzleId::Red)
	}


	#[allow(missing_docs)]
	pub fn g(&self) -> &[f32] {
		self.channel(ChannelSwizzleId::Green)
	}


	#[allow(missing_docs)]
	pub fn b(&self) -> &[f32] {
		self.channel(ChannelSwizzleId::Blue)
	}


	#[allow(missing_docs)]
	pub fn a(&self) -> &[f32] {
		self.channel(ChannelSwizzleId::Alpha)
	}


	/// Borrow a single channel.
	pub fn channel(&self, id: ChannelSwizzleId) -> &[f32] {
		&self.channels[id as usize]
	}


	/// Mutably borrow a single channel.
	pub fn channel_mut(&mut self, id: ChannelSwizzleId) -> &mut [f32] {
		&mut self.channels[id as usize]
	}


	/// Read the RGBA value of the pixel at column `x` of row `row`, counting
	/// rows from the bottom.
	///
	/// # Panics
	/// Panics if the coordinates are out of bounds.
	pub fn pixel(&self, x: u16, row: u16) -> [f32; 4] {
		let i = self.index(x, row);
		[self.channels[0][i], self.channels[1][i], self.channels[2][i], self.channels[3][i]]
	}


	/// Write the RGBA value of the pixel at column `x` of row `row`, counting
	/// rows from the bottom.
	///
	/// # Panics
	/// Panics if the coordinates are out of bounds.
	pub fn set_pixel(&mut self, x: u16, row: u16, rgba: [f32; 4]) {
		let i = self.index(x, row);

		for (c, v) in self.channels.iter_mut().zip(rgba) {
			c[i] = v;
		};
	}


	/// Take the channels out in RGBA order.
	pub fn into_channels(self) -> [Vec<f32>; 4] {
		self.channels
	}


	/// Convert to an 8-bit [`RgbaImage`] with the usual top-to-bottom row
	/// order.  Values are clamped to `0.0..=1.0`, scaled by 255 and rounded.
	///
	/// # Example
	/// ```
	/// # use paa_codec::ChannelData;
	/// let mut channels = ChannelData::new(1, 2);
	/// channels.set_pixel(0, 0, [1.0, 0.0, 0.0, 1.0]);
	/// let image = channels.to_rgba_image();
	/// assert_eq!(image.get_pixel(0, 1).0, [255, 0, 0, 255]);
	/// assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
	/// ```
	pub fn to_rgba_image(&self) -> RgbaImage {
		let (width, height) = (self.width as u32, self.height as u32);

		RgbaImage::from_fn(width, height, |x, y| {
			let row = (height - 1 - y) as u16;
			let rgba = self.pixel(x as u16, row);
			image::Rgba(rgba.map(to_u8))
		})
	}


	fn index(&self, x: u16, row: u16) -> usize {
		assert!(x < self.width && row < self.height, "Pixel ({}, {}) out of bounds", x, row);
		row as usize * self.width as usize + x as usize
	}
}


fn to_u8(v: f32) -> u8 {
	(v.clamp(0.0, 1.0) * 255.0).round() as u8
}


#[cfg(test)]
mod tests {
	use super::*;


	#[test]
	fn test_layout() {
		let mut channels = ChannelData::new(3, 2);
		assert_eq!(channels.len(), 6);
		assert!(!channels.is_empty());

		channels.set_pixel(2, 1, [0.1, 0.2, 0.3, 0.4]);
		assert_eq!(channels.r()[5], 0.1);
		assert_eq!(channels.g()[5], 0.2);
		assert_eq!(channels.b()[5], 0.3);
		assert_eq!(channels.a()[5], 0.4);
		assert_eq!(channels.pixel(2, 1), [0.1, 0.2, 0.3, 0.4]);

		let [r, _, _, a] = channels.into_channels();
		assert_eq!(r, vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.1]);
		assert_eq!(a[5], 0.4);

		assert!(ChannelData::new(0, 0).is_empty());
	}


	#[test]
	fn test_to_rgba_image() {
		let mut channels = ChannelData::filled(2, 2, [0.5, 0.0, 1.0, 1.0]);
		channels.set_pixel(1, 1, [2.0, -1.0, 0.2, 0.0]);

		let image = channels.to_rgba_image();
		assert_eq!(image.dimensions(), (2, 2));

		// bottom row is the last one in the image
		assert_eq!(image.get_pixel(0, 1).0, [128, 0, 255, 255]);
		assert_eq!(image.get_pixel(1, 0).0, [255, 0, 51, 0]);
	}


	#[test]
	#[should_panic]
	fn test_pixel_out_of_bounds() {
		ChannelData::new(4, 4).pixel(4, 0);
	}
}
