//! Native binary snapshot of the fingerprint index.
//!
//! Format:
//! - Header (16 bytes):
//!   - Magic: "TRIKO" (5 bytes)
//!   - Version: u8 (1 byte)
//!   - Reserved: 2 bytes
//!   - Entry count: u64 (8 bytes, little-endian)
//! - Entries, one per fingerprint, in ascending fingerprint order:
//!   - Fingerprint value: u64 (little-endian)
//!   - Member count: u32 (little-endian)
//!   - Members: u32 little-endian byte length followed by UTF-8 bytes

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::core::Fingerprint;
use crate::error::{Error, Result};
use crate::index::{FingerprintStore, MemoryStore};

/// Magic bytes identifying an index snapshot
const MAGIC: &[u8; 5] = b"TRIKO";

/// Current snapshot format version
const VERSION: u8 = 1;

/// Header size in bytes
const HEADER_SIZE: usize = 16;

/// Save a store snapshot to a file.
pub fn save_snapshot(store: &MemoryStore, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_snapshot(store, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a store snapshot to a writer.
pub fn write_snapshot<W: Write>(store: &MemoryStore, writer: &mut W) -> Result<()> {
    let mut header = [0u8; HEADER_SIZE];
    header[0..5].copy_from_slice(MAGIC);
    header[5] = VERSION;
    // Bytes 6..8 reserved.
    header[8..16].copy_from_slice(&(store.len() as u64).to_le_bytes());
    writer.write_all(&header)?;

    for (fingerprint, ids) in store.iter() {
        writer.write_all(&fingerprint.value().to_le_bytes())?;
        writer.write_all(&(ids.len() as u32).to_le_bytes())?;
        for id in ids {
            writer.write_all(&(id.len() as u32).to_le_bytes())?;
            writer.write_all(id.as_bytes())?;
        }
    }

    Ok(())
}

/// Load a store snapshot from a file.
pub fn load_snapshot(path: &Path) -> Result<MemoryStore> {
    let mut reader = BufReader::new(File::open(path)?);
    read_snapshot(&mut reader)
}

/// Read a store snapshot from a reader.
pub fn read_snapshot<R: Read>(reader: &mut R) -> Result<MemoryStore> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    if &header[0..5] != MAGIC {
        return Err(Error::Snapshot("bad magic bytes".into()));
    }
    if header[5] != VERSION {
        return Err(Error::Snapshot(format!(
            "unsupported snapshot version {} (expected {})",
            header[5], VERSION
        )));
    }

    let entry_count = u64::from_le_bytes([
        header[8], header[9], header[10], header[11], header[12], header[13], header[14],
        header[15],
    ]);

    let mut store = MemoryStore::new();
    for _ in 0..entry_count {
        let fingerprint = Fingerprint::from_value(read_u64(reader)?);
        let member_count = read_u32(reader)?;
        for _ in 0..member_count {
            let len = read_u32(reader)? as usize;
            let mut bytes = vec![0u8; len];
            reader.read_exact(&mut bytes)?;
            let id = String::from_utf8(bytes)
                .map_err(|_| Error::Snapshot("image id is not valid UTF-8".into()))?;
            store.add(fingerprint, &id)?;
        }
    }

    Ok(store)
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
