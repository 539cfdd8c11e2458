use crate::{
    DEFAULT_WINDOW_LOG, WINDOW_LOG_RANGE, context::Context, prelude::*, window::Window,
};

const_assert!(
    *WINDOW_LOG_RANGE.start() <= DEFAULT_WINDOW_LOG
        && DEFAULT_WINDOW_LOG <= *WINDOW_LOG_RANGE.end()
);

/// Streaming decoder for a sequence of LZFSE, LZVN and raw blocks.
///
/// Tables and scratch buffers are kept between calls, so decoding several
/// streams with one instance avoids reallocating them.
pub struct Decoder<R: lzfse_io::Reader> {
    ctx: Context<R>,
    window_buf: Vec<u8>,
}

impl<R: lzfse_io::Reader> std::fmt::Debug for Decoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("ctx", &self.ctx)
            .field("window_buf", &self.window_buf.len())
            .finish()
    }
}

impl<R: lzfse_io::Reader> Decoder<R> {
    pub fn new(src: R) -> Self {
        Self {
            ctx: Context::new(src),
            window_buf: vec![0; 1 << DEFAULT_WINDOW_LOG],
        }
    }

    /// Uses a history window of `2^window_log` bytes. Streams whose matches
    /// reach further back fail with [`Error::DistanceBeyondWindow`].
    pub fn with_window_log(src: R, window_log: u8) -> Result<Self, Error> {
        if !WINDOW_LOG_RANGE.contains(&window_log) {
            return Err(Error::WindowLogOutOfBounds(window_log));
        }

        Ok(Self {
            ctx: Context::new(src),
            window_buf: vec![0; 1 << window_log],
        })
    }

    /// Decodes blocks up to and including the next end-of-stream block and
    /// returns the number of bytes written. Bytes produced before an error
    /// stay written.
    pub fn decode(&mut self, writer: impl std::io::Write) -> Result<u64, Error> {
        let mut window = Window::new(&mut self.window_buf, writer);

        let mut n_blocks = 0;
        while self.ctx.block(&mut window)? {
            n_blocks += 1;
        }
        window.flush()?;

        tracing::debug!("decoded stream; blocks={n_blocks}; bytes={}", window.total());
        Ok(window.total())
    }

    pub fn into_inner(self) -> R {
        self.ctx.src
    }
}

/// Decodes one stream from `src` into `dst` with the default window.
pub fn decode(src: impl lzfse_io::Reader, dst: impl std::io::Write) -> Result<u64, Error> {
    Decoder::new(src).decode(dst)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        COMPRESSEDLZVN_BLOCK_MAGIC, COMPRESSEDV2_BLOCK_MAGIC, ENCODE_SYMBOLS,
        ENDOFSTREAM_BLOCK_MAGIC, UNCOMPRESSED_BLOCK_MAGIC,
        lzfse_header::{
            Header,
            tests::{V2Fields, pack_v1, pack_v2},
        },
    };

    fn decode_vec(src: &[u8]) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        decode(src, &mut out)?;
        Ok(out)
    }

    fn encode(data: &[u8]) -> Vec<u8> {
        let mut enc = Vec::new();
        lzfse_rust::encode_bytes(data, &mut enc).expect("encoding failed");
        enc
    }

    /// Text-like data with enough repetition to get LZFSE blocks.
    fn generate(len: usize, seed: u64) -> Vec<u8> {
        const WORDS: [&[u8]; 8] = [
            b"lorem ", b"ipsum ", b"dolor ", b"sit ", b"amet, ", b"consectetur ",
            b"adipiscing ", b"elit.\n",
        ];

        let mut state = seed;
        let mut out = Vec::with_capacity(len);
        while out.len() < len {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let word = WORDS[(state >> 61) as usize];
            out.extend_from_slice(word);
            if (state >> 40) & 0xF == 0 {
                out.push((state >> 32) as u8);
            }
        }

        out.truncate(len);
        out
    }

    fn noise(len: usize, seed: u64) -> Vec<u8> {
        let mut state = seed | 1;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 24) as u8
            })
            .collect()
    }

    /// A `bvx2` block whose tables hold a single symbol each: every literal is
    /// `b'a'` and every match is `l = 3`, `m = 4`, `d = 1`.
    fn constant_v2_block() -> Vec<u8> {
        let mut freqs = vec![0u16; ENCODE_SYMBOLS];
        freqs[3] = 64;
        freqs[20 + 4] = 64;
        freqs[40 + 1] = 256;
        freqs[104 + b'a' as usize] = 1024;

        let mut block = b"bvx2".to_vec();
        block.extend(pack_v2(&V2Fields {
            n_raw_bytes: 14,
            n_literals: 6,
            n_matches: 2,
            freqs,
            ..Default::default()
        }));
        block
    }

    #[test]
    fn test_raw_block_then_end() -> Result<(), Error> {
        let mut src = b"bvx-".to_vec();
        src.extend_from_slice(&5u32.to_le_bytes());
        src.extend_from_slice(&[1, 2, 3, 4, 5]);
        src.extend_from_slice(b"bvx$");

        assert_eq!(decode_vec(&src)?, [1, 2, 3, 4, 5]);
        Ok(())
    }

    #[test]
    fn test_end_of_stream_only() -> Result<(), Error> {
        assert!(decode_vec(b"bvx$")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_lzvn_block() -> Result<(), Error> {
        let payload = [0xE3, b'a', b'b', b'c', 0x06, 0, 0, 0, 0, 0, 0, 0];
        let mut src = b"bvxn".to_vec();
        src.extend_from_slice(&3u32.to_le_bytes());
        src.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        src.extend_from_slice(&payload);
        src.extend_from_slice(b"bvx$");

        assert_eq!(decode_vec(&src)?, b"abc");
        Ok(())
    }

    #[test]
    fn test_unknown_magic() {
        let mut out = Vec::new();
        let ret = decode(&b"bvx?\x05\x00\x00\x00hello"[..], &mut out);

        assert!(matches!(ret, Err(Error::UnknownBlockMagic(0x3F78_7662))));
        assert!(out.is_empty());
    }

    #[test]
    fn test_unknown_magic_after_block() {
        let mut src = b"bvx-".to_vec();
        src.extend_from_slice(&2u32.to_le_bytes());
        src.extend_from_slice(b"ok");
        src.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());

        let mut out = Vec::new();
        let ret = decode(&src[..], &mut out);

        assert!(matches!(ret, Err(Error::UnknownBlockMagic(0xDEAD_BEEF))));
        assert_eq!(out, b"ok");
    }

    #[test]
    fn test_missing_end_of_stream() {
        let mut src = b"bvx-".to_vec();
        src.extend_from_slice(&1u32.to_le_bytes());
        src.push(b'x');

        assert!(matches!(decode_vec(&src), Err(Error::Truncated)));
        assert!(matches!(decode_vec(b""), Err(Error::Truncated)));
    }

    #[test]
    fn test_known_raw_stream() -> Result<(), Error> {
        let src = [
            0x62, 0x76, 0x78, 0x2d, 0x04, 0x00, 0x00, 0x00, 0x74, 0x65, 0x73, 0x74, 0x62,
            0x76, 0x78, 0x24,
        ];

        assert_eq!(decode_vec(&src)?, b"test");
        Ok(())
    }

    #[test]
    fn test_constant_v2_block() -> Result<(), Error> {
        let mut src = constant_v2_block();
        src.extend_from_slice(b"bvx$");

        assert_eq!(decode_vec(&src)?, [b'a'; 14]);
        Ok(())
    }

    #[test]
    fn test_identical_blocks_decode_identically() -> Result<(), Error> {
        let block = constant_v2_block();
        let mut src = block.clone();
        src.extend_from_slice(&block);
        src.extend_from_slice(b"bvx$");

        let first = decode_vec(&src)?;
        let second = decode_vec(&src)?;

        assert_eq!(first, [b'a'; 28]);
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_consecutive_streams() -> Result<(), Error> {
        let mut src = encode(b"first stream");
        src.extend(encode(b"second stream"));

        let mut decoder = Decoder::new(&src[..]);
        let mut out = Vec::new();
        assert_eq!(decoder.decode(&mut out)?, 12);
        assert_eq!(decoder.decode(&mut out)?, 13);
        assert_eq!(out, b"first streamsecond stream");
        assert!(decoder.into_inner().is_empty());

        Ok(())
    }

    #[test]
    fn test_window_log_bounds() {
        assert!(matches!(
            Decoder::with_window_log(&b""[..], 15),
            Err(Error::WindowLogOutOfBounds(15))
        ));
        assert!(matches!(
            Decoder::with_window_log(&b""[..], 31),
            Err(Error::WindowLogOutOfBounds(31))
        ));
        assert!(Decoder::with_window_log(&b""[..], 16).is_ok());
    }

    #[test]
    fn test_small_window_rejects_far_matches() -> Result<(), Error> {
        // Two copies of 100 KiB of noise: the only matches reach 100 KiB back.
        let chunk = noise(100 * 1024, 7);
        let mut data = chunk.clone();
        data.extend_from_slice(&chunk);
        let enc = encode(&data);

        let mut out = Vec::new();
        let ret = Decoder::with_window_log(&enc[..], 16)?.decode(&mut out);
        assert!(matches!(ret, Err(Error::DistanceBeyondWindow { .. })));

        let mut out = Vec::new();
        Decoder::with_window_log(&enc[..], 18)?.decode(&mut out)?;
        assert_eq!(out, data);

        Ok(())
    }

    #[test]
    fn test_round_trip_sizes() -> Result<(), Error> {
        for len in [0, 1, 15, 100, 4095, 4096, 70_000, 1_000_000] {
            let data = generate(len, len as u64);
            let enc = encode(&data);

            assert_eq!(decode_vec(&enc)?, data, "len={len}");
        }

        Ok(())
    }

    #[test]
    fn test_round_trip_incompressible() -> Result<(), Error> {
        let data = noise(50_000, 1);
        assert_eq!(decode_vec(&encode(&data))?, data);
        Ok(())
    }

    #[test]
    fn test_agrees_with_reference_decoder() -> Result<(), Error> {
        let enc = encode(&generate(300_000, 99));

        let mut expected = Vec::new();
        lzfse_rust::decode_bytes(&enc, &mut expected).expect("decoding failed");

        assert_eq!(decode_vec(&enc)?, expected);
        Ok(())
    }

    /// Rewrites every `bvx2` block of `src` as the equivalent `bvx1` block.
    fn to_v1(src: &[u8]) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        let mut rest = src;
        let mut n_v2 = 0;

        loop {
            let magic = u32::from_le_bytes(rest[..4].try_into().expect("magic"));
            let word = move |at: usize| {
                u32::from_le_bytes(rest[at..at + 4].try_into().expect("word")) as usize
            };

            let len = match magic {
                ENDOFSTREAM_BLOCK_MAGIC => {
                    out.extend_from_slice(&rest[..4]);
                    break;
                }
                UNCOMPRESSED_BLOCK_MAGIC => 8 + word(4),
                COMPRESSEDLZVN_BLOCK_MAGIC => 12 + word(8),
                COMPRESSEDV2_BLOCK_MAGIC => {
                    let mut r = &rest[4..];
                    let header = Header::read_v2(&mut r)?;
                    let n_payload = (header.n_literal_payload_bytes
                        + header.n_lmd_payload_bytes)
                        as usize;

                    out.extend_from_slice(b"bvx1");
                    out.extend(pack_v1(&header));
                    out.extend_from_slice(&r[..n_payload]);

                    rest = &r[n_payload..];
                    n_v2 += 1;
                    continue;
                }
                other => panic!("unexpected magic {other:#x}"),
            };

            out.extend_from_slice(&rest[..len]);
            rest = &rest[len..];
        }

        assert!(n_v2 > 0, "no bvx2 block to rewrite");
        Ok(out)
    }

    #[test]
    fn test_v1_blocks_decode_like_v2() -> Result<(), Error> {
        for len in [5_000, 200_000] {
            let data = generate(len, 7);
            let v1 = to_v1(&encode(&data))?;

            assert!(v1.windows(4).any(|w| w == b"bvx1"));
            assert_eq!(decode_vec(&v1)?, data, "len={len}");
        }

        Ok(())
    }

    #[test]
    fn test_truncated_stream_fails() {
        let enc = encode(&generate(20_000, 3));

        for cut in [enc.len() - 4, enc.len() / 2, 40, 3] {
            assert!(decode_vec(&enc[..cut]).is_err(), "cut={cut}");
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_round_trip_arbitrary(data in proptest::collection::vec(any::<u8>(), 0..6000)) {
            let enc = encode(&data);
            let dec = decode_vec(&enc).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(dec, data);
        }

        #[test]
        fn test_round_trip_repetitive(
            len in 0usize..200_000,
            seed in any::<u64>(),
        ) {
            let data = generate(len, seed);
            let enc = encode(&data);
            let dec = decode_vec(&enc).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(dec, data);
        }
    }
}
