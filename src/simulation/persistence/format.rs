//! Save file layout.
//!
//! ```text
//! "SAND" | u8 version | u16 width | u16 height | u32 rng | u32 step | u32 seed | cells
//! ```
//!
//! Little-endian, one byte per cell in row-major order. Older versions are
//! prefixes of the current header: v1 stops after the dimensions, v2 adds
//! the RNG state, v3 the step counter, v4 the initial seed. The legacy
//! unversioned layout (`"SAND" | u16 width | u16 height | cells`) has no
//! version byte and is recognised by its exact total size.

use crate::core::error::SaveError;
use crate::domain::materials::MaterialId;

pub const MAGIC: &[u8; 4] = b"SAND";

pub const CURRENT_VERSION: u8 = 4;

const LEGACY_HEADER_LEN: usize = 8;

/// Header length for a versioned save, `None` for unknown versions.
fn header_len(version: u8) -> Option<usize> {
    match version {
        1 => Some(9),
        2 => Some(13),
        3 => Some(17),
        4 => Some(21),
        _ => None,
    }
}

/// Decoded save, not yet applied to a simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// 0 for the legacy layout.
    pub version: u8,
    pub width: u32,
    pub height: u32,
    pub rng: Option<u32>,
    pub step: Option<u32>,
    pub seed: Option<u32>,
    pub cells: Vec<MaterialId>,
}

pub fn encode(width: u32, height: u32, rng: u32, step: u32, seed: u32, cells: &[MaterialId]) -> Vec<u8> {
    let mut out = Vec::with_capacity(21 + cells.len());
    out.extend_from_slice(MAGIC);
    out.push(CURRENT_VERSION);
    out.extend_from_slice(&(width as u16).to_le_bytes());
    out.extend_from_slice(&(height as u16).to_le_bytes());
    out.extend_from_slice(&rng.to_le_bytes());
    out.extend_from_slice(&step.to_le_bytes());
    out.extend_from_slice(&seed.to_le_bytes());
    out.extend_from_slice(cells);
    out
}

pub fn decode(bytes: &[u8]) -> Result<Snapshot, SaveError> {
    if bytes.len() < MAGIC.len() {
        return Err(SaveError::Truncated { expected: MAGIC.len(), actual: bytes.len() });
    }
    if &bytes[..4] != MAGIC {
        return Err(SaveError::BadMagic { found: bytes[..4].to_vec() });
    }

    match decode_versioned(bytes) {
        Ok(snapshot) => Ok(snapshot),
        Err(err) => decode_legacy(bytes).ok_or(err),
    }
}

fn decode_versioned(bytes: &[u8]) -> Result<Snapshot, SaveError> {
    let mut r = Reader::new(bytes, 4);
    let version = r.u8()?;
    let header = header_len(version).ok_or(SaveError::UnsupportedVersion(version))?;
    if bytes.len() < header {
        return Err(SaveError::Truncated { expected: header, actual: bytes.len() });
    }

    let width = r.u16()? as u32;
    let height = r.u16()? as u32;
    let rng = if version >= 2 { Some(r.u32()?) } else { None };
    let step = if version >= 3 { Some(r.u32()?) } else { None };
    let seed = if version >= 4 { Some(r.u32()?) } else { None };

    let cells = grid_bytes(bytes, header, width, height)?;
    Ok(Snapshot { version, width, height, rng, step, seed, cells: cells.to_vec() })
}

fn decode_legacy(bytes: &[u8]) -> Option<Snapshot> {
    let mut r = Reader::new(bytes, 4);
    let width = r.u16().ok()? as u32;
    let height = r.u16().ok()? as u32;
    let cells = grid_bytes(bytes, LEGACY_HEADER_LEN, width, height).ok()?;
    Some(Snapshot {
        version: 0,
        width,
        height,
        rng: None,
        step: None,
        seed: None,
        cells: cells.to_vec(),
    })
}

fn grid_bytes(bytes: &[u8], header: usize, width: u32, height: u32) -> Result<&[u8], SaveError> {
    if width == 0 || height == 0 {
        return Err(SaveError::InvalidDimensions { width, height });
    }
    let expected = header + width as usize * height as usize;
    if bytes.len() < expected {
        return Err(SaveError::Truncated { expected, actual: bytes.len() });
    }
    if bytes.len() > expected {
        return Err(SaveError::TrailingBytes { expected, actual: bytes.len() });
    }
    Ok(&bytes[header..])
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], SaveError> {
        let end = self.pos + N;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(SaveError::Truncated { expected: end, actual: self.bytes.len() })?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, SaveError> {
        Ok(self.take::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, SaveError> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    fn u32(&mut self) -> Result<u32, SaveError> {
        Ok(u32::from_le_bytes(self.take()?))
    }
}
