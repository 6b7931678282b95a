#![no_main]
use libfuzzer_sys::fuzz_target;
use arbitrary::{
	Arbitrary,
	Unstructured,
	Result as ArbitraryResult,
};
use paa_codec::{dxt, ArgbSwizzle};


#[derive(Debug)]
struct DxtFuzzer {
	dxt5: bool,
	width: u16,
	height: u16,
	swizzle: ArgbSwizzle,
	data: Vec<u8>,
}

impl<'a> Arbitrary<'a> for DxtFuzzer {
	fn arbitrary(input: &mut Unstructured) -> ArbitraryResult<Self> {
		let dxt5 = <bool as Arbitrary>::arbitrary(input)?;

		// Limited to 256x256 to avoid slow-unit fuzz artifacts; any multiple
		// of 4 is accepted by the decoders.
		let width: u16 = input.int_in_range(0..=64)? * 4;
		let height: u16 = input.int_in_range(0..=64)? * 4;
		let swizzle = <ArgbSwizzle as Arbitrary>::arbitrary(input)?;

		let data_len = usize::from(width) * usize::from(height) / if dxt5 { 1 } else { 2 };
		let mut data: Vec<u8> = vec![0u8; data_len];
		input.fill_buffer(&mut data)?;

		Ok(Self { dxt5, width, height, swizzle, data })
	}
}


fuzz_target!(|input: DxtFuzzer| {
	let mut channels = match input.dxt5 {
		true => dxt::decode_dxt5(&input.data, input.width, input.height),
		false => dxt::decode_dxt1(&input.data, input.width, input.height),
	}.unwrap();

	assert_eq!(channels.len(), usize::from(input.width) * usize::from(input.height));

	input.swizzle.apply_to_channels(&mut channels);

	for c in [channels.r(), channels.g(), channels.b(), channels.a()] {
		assert!(c.iter().all(|v| v.is_finite()));
	};

	let image = channels.to_rgba_image();
	assert_eq!(image.dimensions(), (input.width.into(), input.height.into()));
});
