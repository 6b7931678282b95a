use paa_codec::*;
use anyhow::{Context, Result as AnyhowResult};

use crate::mipmap_index;


pub fn command_dump_mipmap(matches: &clap::ArgMatches) -> AnyhowResult<()> {
	let paa_path = matches.value_of("paa").context("PAA required")?;
	let bin_path = matches.value_of("bin").context("BIN required")?;
	let compressed = matches.is_present("compressed");
	let mip_idx = mipmap_index(matches)?;

	tracing::trace!("Mipmap #{} requested", mip_idx + 1);

	let mut paa_file = std::fs::File::open(paa_path)
		.context(format!("{paa_path}: Could not open file"))?;
	let image = PaaImage::read_from(&mut paa_file)
		.context(format!("{paa_path}: Could not read PaaImage"))?;

	let mipmap = image.mipmaps.get(mip_idx)
		.context("Mipmap index out of range")?;

	tracing::trace!("Mipmap #{}: {}x{} {:?}, data length={}", mip_idx + 1, mipmap.width, mipmap.height, mipmap.compression, mipmap.data.len());

	let data = match compressed {
		true => mipmap.data.clone(),
		false => mipmap.decompress().context("Could not decompress mipmap")?,
	};

	std::fs::write(bin_path, &data)
		.context(format!("{bin_path}: Could not write mipmap data"))?;

	Ok(())
}
