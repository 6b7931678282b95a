use paa_codec::*;
use anyhow::{Context, Result as AnyhowResult};
use tap::prelude::*;


pub fn command_info(matches: &clap::ArgMatches) -> AnyhowResult<()> {
	let brief = matches.is_present("brief");
	let serialize = matches.is_present("serialize_back");

	let mut result = Ok(());

	for path in matches.values_of("input").context("INPUT required")? {
		let result_now = paa_path_info(path, brief, serialize);

		if let Err(ref e) = result_now {
			tracing::error!("{e:?}");
			result = result_now;
		};
	};

	result
}


fn paa_path_info(path: &str, brief: bool, serialize_back: bool) -> AnyhowResult<()> {
	let brief_prefix = if brief {
		"".to_string()
	}
	else {
		format!("{}: ", path)
	};

	let mut file = std::fs::File::open(path).with_context(|| format!("Could not open file: {path}"))?;
	let filesize = file.metadata().with_context(|| format!("Could not read metadata to determine size: {path}"))?.len();
	let image = PaaImage::read_from(&mut file).with_context(|| format!("Could not read PaaImage: {path}"))?;

	println!("{brief_prefix}File size: {filesize} (0x{filesize:X})");
	println!("{brief_prefix}PaaType: {:?}", image.paatype);

	for (pos, tagg) in image.taggs.iter().enumerate() {
		match tagg.payload() {
			Ok(payload) => println!("{brief_prefix}Tagg #{}: {payload}", pos+1),
			Err(e) => println!("{brief_prefix}Tagg #{}: {tagg} ERROR {e}", pos+1),
		};
	};

	for (pos, m) in image.mipmaps.iter().enumerate() {
		let pos = pos + 1;
		let decoded_size = m.paatype.predict_size(m.width, m.height);

		println!("{brief_prefix}Mipmap #{pos}, {}x{} [{:?}], size={}, decompressed size={}",
			m.width,
			m.height,
			m.compression,
			m.data.len(),
			decoded_size);
	};

	if serialize_back {
		tracing::trace!("Attempting to serialize PaaImage back");

		let data = image.to_bytes()
			.context("Could not serialize image to bytes")?
			.tap(|d| tracing::debug!("Serialized {} bytes, file has {filesize}", d.len()));

		PaaImage::from_bytes(&data).context("Could not read serialized image back")?;
	};

	Ok(())
}
