use anyhow::{Context, Result as AnyhowResult};

mod decode;
mod dump_mipmap;
mod info;


fn construct_app() -> clap::Command<'static> {
	clap::Command::new("paatool")
		.version(clap::crate_version!())
		.setting(clap::AppSettings::DeriveDisplayOrder)
		.arg(clap::arg!(loglevel: -L <LEVEL> "Global log verbosity level")
			.required(false)
			.ignore_case(true)
			.possible_values(["Error", "Warn", "Info", "Debug", "Trace"])
			.default_value("Info"))
		.subcommand(clap::Command::new("decode")
			.about("Decode a PAA file to PNG")
			.arg(clap::arg!(mipmap: -m --mipmap <N> "1-based mipmap index")
				.required(false)
				.default_value("1"))
			.arg(clap::arg!(swizzle: --swizzle <ARGB> "Swizzle to apply instead of the SWIZTAGG, e.g. \"1-R,G,G,1\"")
				.required(false)
				.conflicts_with("no_swizzle"))
			.arg(clap::arg!(no_swizzle: --"no-swizzle" "Do not apply any swizzle").takes_value(false))
			.arg(clap::arg!(paa: <PAA> "PAA input file"))
			.arg(clap::arg!(png: <PNG> "PNG output path")))
		.subcommand(clap::Command::new("dump-mipmap")
			.about("Write mipmap payload bytes to a file")
			.arg(clap::arg!(mipmap: -m --mipmap <N> "1-based mipmap index")
				.required(false)
				.default_value("1"))
			.arg(clap::arg!(compressed: -c --compressed "Dump the payload as stored, without LZO decompression").takes_value(false))
			.arg(clap::arg!(paa: <PAA> "PAA input file"))
			.arg(clap::arg!(bin: <BIN> "Output path")))
		.subcommand(clap::Command::new("info")
			.about("Parse a PAA file and log details")
			.arg(clap::arg!(brief: -b --brief "Do not prepend file name to output").takes_value(false))
			.arg(clap::arg!(serialize_back: -S "Serialize PAA back in memory for debugging").takes_value(false))
			.arg(clap::arg!(input: <INPUT> ... "PAA file to parse")))
}


/// Parse a 1-based mipmap index argument into a 0-based index.
fn mipmap_index(matches: &clap::ArgMatches) -> AnyhowResult<usize> {
	let mip_idx_str = matches.value_of("mipmap").unwrap_or("1");

	mip_idx_str.parse::<usize>()
		.with_context(|| format!("Could not parse mipmap index from \"{mip_idx_str}\""))?
		.checked_sub(1)
		.context("Mipmap index cannot be 0")
}


fn paatool() -> AnyhowResult<()> {
	let matches = construct_app().get_matches_from(wild::args());
	let loglevel_str = matches.value_of("loglevel")
		.unwrap_or("Info");
	let loglevel = loglevel_str
		.parse::<tracing::Level>()
		.with_context(|| format!("Failed to parse loglevel from -L{}", loglevel_str))?;

	tracing_subscriber::fmt()
		.with_max_level(loglevel)
		.init();

	tracing::trace!("Global loglevel set to {:?}", loglevel);

	match matches.subcommand() {
		Some(("decode", matches)) => {
			decode::command_decode(matches)
		},

		Some(("dump-mipmap", matches)) => {
			dump_mipmap::command_dump_mipmap(matches)
		},

		Some(("info", matches)) => {
			info::command_info(matches)
		},

		Some((&_, _)) => unreachable!(),

		None => {
			let _ = construct_app().print_help();
			Ok(())
		},
	}
}


fn main() -> AnyhowResult<()> {
	match paatool() {
		Ok(()) => Ok(()),
		Err(e) => { tracing::error!("{:?}", e); std::process::exit(1) },
	}
}


#[test]
fn verify_app() {
	construct_app().debug_assert();
}
