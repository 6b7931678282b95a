#![no_main]
use libfuzzer_sys::fuzz_target;
use bstr::BString;
use arbitrary::{
	Arbitrary,
	Unstructured,
	Result as ArbitraryResult,
};
use paa_codec::{
	ArgbSwizzle,
	Bgra8888Pixel,
	Tagg,
	TaggPayload,
	Transparency,
};


#[derive(Debug)]
struct TaggPayloadFuzzer(TaggPayload);


impl<'a> Arbitrary<'a> for TaggPayloadFuzzer {
	fn arbitrary(input: &mut Unstructured) -> ArbitraryResult<Self> {
		use TaggPayload::*;

		let variant_idx: usize = input.int_in_range(1..=6)?;

		let result = match variant_idx {
			1 => Avgc { rgba: <Bgra8888Pixel as Arbitrary>::arbitrary(input)? },
			2 => Maxc { rgba: <Bgra8888Pixel as Arbitrary>::arbitrary(input)? },
			3 => Flag { transparency: <Transparency as Arbitrary>::arbitrary(input)? },
			4 => Swiz { swizzle: <ArgbSwizzle as Arbitrary>::arbitrary(input)? },
			5 => Proc { code: BString::from(<Vec<u8> as Arbitrary>::arbitrary(input)?) },
			6 => {
				let offs_len = input.int_in_range(0..=16)? as usize;
				let mut offsets: Vec<u32> = vec![0u32; offs_len];

				for o in offsets.iter_mut() {
					*o = input.int_in_range(1..=u32::MAX)?;
				}

				Offs { offsets }
			},
			_ => unreachable!(),
		};

		Ok(Self(result))
	}
}


fuzz_target!(|tuple: (TaggPayloadFuzzer, &[u8])| {
	let (TaggPayloadFuzzer(payload), data) = tuple;

	let tagg = payload.to_tagg();
	let bytes = tagg.to_bytes().unwrap();
	let tagg_prime = Tagg::from_bytes(&bytes).unwrap().unwrap();
	assert_eq!(tagg, tagg_prime);
	assert_eq!(payload, tagg_prime.payload().unwrap());

	if let Ok(Some(tagg)) = Tagg::from_bytes(data) {
		let _ = tagg.payload();
		let _ = tagg.to_string();
	};
});
