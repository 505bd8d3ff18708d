use std::io::{Read, Write};

use super::{codec::Codec, codec::WireMessage, errors::Result};

/// Read exactly one `M` from the stream. Blocks until all of its bytes
/// have arrived, the stream closes, or the read timeout expires.
pub fn read_message<M: WireMessage, R: Read>(reader: &mut R, codec: &Codec) -> Result<M> {
    let mut buf = vec![0; M::SIZE];
    reader.read_exact(&mut buf)?;
    codec.decode(&buf)
}

/// Write one message in a single chunk.
pub fn write_message<M: WireMessage, W: Write>(writer: &mut W, codec: &Codec, msg: &M) -> Result<()> {
    writer.write_all(&codec.encode(msg))?;
    writer.flush()?;
    Ok(())
}
