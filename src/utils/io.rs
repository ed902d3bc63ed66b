// I/O utilities for reading tagged files

use std::io::{Read, Seek, SeekFrom};

/// Read up to `len` bytes; a short result means the stream ended early
pub fn read_up_to<R: Read>(reader: &mut R, len: usize) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(len);
    reader.take(len as u64).read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Check if file has signature at current position
pub fn check_signature<R: Read + Seek>(reader: &mut R, signature: &[u8]) -> std::io::Result<bool> {
    let pos = reader.stream_position()?;
    let buffer = read_up_to(reader, signature.len())?;
    reader.seek(SeekFrom::Start(pos))?;
    Ok(buffer == signature)
}
