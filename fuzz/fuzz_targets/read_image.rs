#![no_main]
use libfuzzer_sys::fuzz_target;

use std::io::Cursor;

use paa_codec::{PaaImage, PaaDecoder};

fuzz_target!(|data: &[u8]| {
	let mut cursor = Cursor::new(data);
	let image = PaaImage::read_from(&mut cursor);

	if let Ok(image) = image {
		if let Ok(bytes) = image.to_bytes() {
			let reread = PaaImage::from_bytes(&bytes).unwrap();
			assert_eq!(image.mipmaps, reread.mipmaps);
		};

		let _ = PaaDecoder::with_paa(image).decode_first();
	};
});
