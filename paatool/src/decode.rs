use paa_codec::*;
use anyhow::{Context, Result as AnyhowResult};
use tap::prelude::*;

use crate::mipmap_index;


pub fn command_decode(matches: &clap::ArgMatches) -> AnyhowResult<()> {
	let paa_path = matches.value_of("paa").context("PAA required")?;
	let png_path = matches.value_of("png").context("PNG required")?;
	let mip_idx = mipmap_index(matches)?;

	let swizzle = match (matches.value_of("swizzle"), matches.is_present("no_swizzle")) {
		(Some(s), _) => Some(s.parse::<ArgbSwizzle>().with_context(|| format!("Invalid swizzle: \"{s}\""))?),
		(None, true) => Some(ArgbSwizzle::new()),
		(None, false) => None,
	};

	let mut paa_file = std::fs::File::open(paa_path).with_context(|| format!("Could not open file: {paa_path}"))?;
	let image = PaaImage::read_from(&mut paa_file).with_context(|| format!("Could not read PaaImage: {paa_path}"))?;
	let mip_count = image.mipmaps.len();

	let decoder = match swizzle {
		Some(s) => PaaDecoder::with_paa(image).with_swizzle(s),
		None => PaaDecoder::with_paa(image),
	};

	let channels = decoder.decode_nth(mip_idx)
		.tap_ok(|c| tracing::debug!("Decoded {}x{} mipmap", c.width(), c.height()))
		.with_context(|| format!("Failed to decode mipmap #{} (should be in [1..{mip_count}])", mip_idx + 1))?;

	channels.to_rgba_image()
		.save_with_format(png_path, image::ImageFormat::Png)
		.with_context(|| format!("save_with_format to path failed: {png_path}"))?;

	Ok(())
}
