/// Emit a `log` record under the `paa_codec` target.  Compiles to nothing
/// unless the `log` feature is enabled.
macro_rules! log {
	($level:ident, $($arg:tt)*) => {
		#[cfg(feature = "log")]
		log::$level!(target: "paa_codec", $($arg)*);
	}
}

pub(crate) use log;
