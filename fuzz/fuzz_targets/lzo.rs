#![no_main]
use libfuzzer_sys::fuzz_target;

use paa_codec::lzo;

fuzz_target!(|input: (u16, &[u8])| {
	let (expected_size, data) = input;
	let expected_size = usize::from(expected_size);

	if let Ok((consumed, output)) = lzo::decompress(data, expected_size) {
		assert!(consumed <= data.len());
		assert_eq!(output.len(), expected_size);
	};
});
