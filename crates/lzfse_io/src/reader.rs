pub trait Reader: std::io::Read + ReadU8 + ReadU16 + ReadU32 + ReadU64 {}

impl<T: std::io::Read> Reader for T {}

pub trait ReadU8: std::io::Read {
    fn read_u8(&mut self) -> std::io::Result<u8>;
}

impl<T: std::io::Read> ReadU8 for T {
    #[inline]
    fn read_u8(&mut self) -> std::io::Result<u8> {
        let mut buf = [0; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }
}

pub trait ReadU16: std::io::Read {
    fn read_u16(&mut self) -> std::io::Result<u16>;
}

impl<T: std::io::Read> ReadU16 for T {
    #[inline]
    fn read_u16(&mut self) -> std::io::Result<u16> {
        let mut buf = [0; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }
}

pub trait ReadU32: std::io::Read {
    fn read_u32(&mut self) -> std::io::Result<u32>;
}

impl<T: std::io::Read> ReadU32 for T {
    #[inline]
    fn read_u32(&mut self) -> std::io::Result<u32> {
        let mut buf = [0; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

pub trait ReadU64: std::io::Read {
    fn read_u64(&mut self) -> std::io::Result<u64>;
}

impl<T: std::io::Read> ReadU64 for T {
    #[inline]
    fn read_u64(&mut self) -> std::io::Result<u64> {
        let mut buf = [0; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }
}
