//! Full encode/decode round trip through the packed 260-bit frame layout,
//! exercising the encoder, decoder and bit-packer together rather than in
//! isolation.

use radlib::gsm::{Decoder, Encoder, Parameters, FRAME_OCTETS};

fn test_tone(n: usize) -> Vec<i16> {
    (0..n).map(|i| ((i as f32 * 0.15).sin() * 8000.0) as i16).collect()
}

#[test]
fn encoding_then_decoding_a_tone_produces_plausible_audio() {
    let pcm = test_tone(160 * 10);
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new();

    let mut out = Vec::new();
    for frame in pcm.chunks(160) {
        let mut sop = [0i16; 160];
        sop.copy_from_slice(frame);

        let params = encoder.encode(&sop);

        let mut area = [0u8; FRAME_OCTETS];
        params.pack(&mut area);
        let back = Parameters::unpack(&area);

        out.extend_from_slice(&decoder.decode(&back));
    }

    assert_eq!(out.len(), pcm.len());
    let peak = out.iter().map(|&s| s.unsigned_abs()).max().unwrap();
    assert!(peak > 100, "decoded audio is implausibly quiet (peak {peak})");
}

#[test]
fn packed_frame_is_exactly_two_hundred_sixty_bits() {
    let mut encoder = Encoder::new();
    let sop = [0i16; 160];
    let params = encoder.encode(&sop);

    let mut area = [0u8; FRAME_OCTETS];
    params.pack(&mut area);

    assert_eq!(area.len() * 8, 264);
    assert_eq!(FRAME_OCTETS, 33);
}
