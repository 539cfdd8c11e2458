use crate::{
    COMPRESSEDLZVN_BLOCK_MAGIC, COMPRESSEDV1_BLOCK_MAGIC, COMPRESSEDV2_BLOCK_MAGIC,
    ENDOFSTREAM_BLOCK_MAGIC, UNCOMPRESSED_BLOCK_MAGIC, context::Context, lzfse_header::Header,
    lzvn, prelude::*, window::Window,
};

impl<R: lzfse_io::Reader> Context<R> {
    /// Decodes the next block into `window`. Returns `false` once the
    /// end-of-stream block has been read.
    pub fn block<W: std::io::Write>(
        &mut self,
        window: &mut Window<'_, W>,
    ) -> Result<bool, Error> {
        let block_type = BlockType::try_from(self.src.read_u32()?)?;
        let start = window.total();

        let n_raw_bytes = match block_type {
            BlockType::EndOfStream => {
                tracing::debug!("end of stream; total={start}");
                return Ok(false);
            }

            BlockType::Raw => {
                let n_raw_bytes = self.src.read_u32()?;
                tracing::debug!("raw block; n_raw_bytes={n_raw_bytes}");

                window.read_from(&mut self.src, n_raw_bytes as usize)?;
                n_raw_bytes
            }

            BlockType::Lzvn => {
                let n_raw_bytes = self.src.read_u32()?;
                let n_payload_bytes = self.src.read_u32()?;
                tracing::debug!(
                    "lzvn block; n_raw_bytes={n_raw_bytes}; n_payload_bytes={n_payload_bytes}"
                );

                let payload =
                    self.scratch_buf
                        .fill(&mut self.src, 0, n_payload_bytes as usize)?;
                lzvn::decode(payload, window)?;
                n_raw_bytes
            }

            BlockType::LzfseV1 | BlockType::LzfseV2 => {
                let header = if block_type == BlockType::LzfseV1 {
                    Header::read_v1(&mut self.src)?
                } else {
                    Header::read_v2(&mut self.src)?
                };
                tracing::debug!("lzfse block; type={block_type:?}; header={header:?}");

                self.lzfse(&header, window)?;
                header.n_raw_bytes
            }
        };

        let produced = window.total() - start;
        if produced != n_raw_bytes as u64 {
            return Err(Error::RawSizeMismatch {
                expected: n_raw_bytes as u64,
                actual: produced,
            });
        }

        Ok(true)
    }

    fn lzfse<W: std::io::Write>(
        &mut self,
        header: &Header,
        window: &mut Window<'_, W>,
    ) -> Result<(), Error> {
        self.fse.rebuild(header)?;
        self.literals(header)?;
        self.lmd(header, window)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockType {
    EndOfStream,
    Raw,
    LzfseV1,
    LzfseV2,
    Lzvn,
}

impl TryFrom<u32> for BlockType {
    type Error = Error;

    fn try_from(magic: u32) -> Result<Self, Self::Error> {
        match magic {
            ENDOFSTREAM_BLOCK_MAGIC => Ok(Self::EndOfStream),
            UNCOMPRESSED_BLOCK_MAGIC => Ok(Self::Raw),
            COMPRESSEDV1_BLOCK_MAGIC => Ok(Self::LzfseV1),
            COMPRESSEDV2_BLOCK_MAGIC => Ok(Self::LzfseV2),
            COMPRESSEDLZVN_BLOCK_MAGIC => Ok(Self::Lzvn),
            _ => Err(Error::UnknownBlockMagic(magic)),
        }
    }
}
