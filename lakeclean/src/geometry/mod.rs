//! GeoPackage binary geometry.
//!
//! Every geometry value in a GeoPackage feature table is a blob made of a
//! small header followed by standard WKB:
//!
//! ```text
//! ┌────┬─────────┬───────┬────────┬────────────────────┬─────────┐
//! │ GP │ version │ flags │ srs_id │ envelope (0-64 B)  │   WKB   │
//! └────┴─────────┴───────┴────────┴────────────────────┴─────────┘
//! ```
//!
//! The blob is kept verbatim so the cleaned output is written bit-for-bit as
//! read. Only the header is decoded (for the layer extent) and the WKB is
//! rendered as WKT for the audit artifact.

mod wkt;

pub use wkt::wkb_to_wkt;

const MAGIC: &[u8; 2] = b"GP";
const FIXED_HEADER_LEN: usize = 8;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Envelope {
    /// Smallest envelope containing both.
    pub fn union(self, other: Envelope) -> Envelope {
        Envelope {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// A validated GeoPackage geometry blob.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBlob {
    bytes: Vec<u8>,
    wkb_offset: usize,
}

impl GeometryBlob {
    /// Validate the header of a raw blob.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, String> {
        if bytes.len() < FIXED_HEADER_LEN {
            return Err(format!("blob too short ({} bytes)", bytes.len()));
        }
        if &bytes[0..2] != MAGIC {
            return Err("missing 'GP' magic".to_string());
        }
        let envelope_len = match envelope_indicator(bytes[3]) {
            0 => 0,
            1 => 32,
            2 | 3 => 48,
            4 => 64,
            other => return Err(format!("invalid envelope indicator {}", other)),
        };
        let wkb_offset = FIXED_HEADER_LEN + envelope_len;
        if bytes.len() < wkb_offset {
            return Err(format!(
                "header declares {} bytes but blob has {}",
                wkb_offset,
                bytes.len()
            ));
        }
        Ok(Self { bytes, wkb_offset })
    }

    /// The raw blob, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The WKB payload after the header.
    pub fn wkb(&self) -> &[u8] {
        &self.bytes[self.wkb_offset..]
    }

    fn little_endian(&self) -> bool {
        self.bytes[3] & 0x01 == 1
    }

    /// Header flag marking an empty geometry.
    pub fn is_empty(&self) -> bool {
        self.bytes[3] & 0x10 != 0
    }

    pub fn srs_id(&self) -> i32 {
        let raw = [self.bytes[4], self.bytes[5], self.bytes[6], self.bytes[7]];
        if self.little_endian() {
            i32::from_le_bytes(raw)
        } else {
            i32::from_be_bytes(raw)
        }
    }

    /// XY envelope stored in the header, if any.
    pub fn envelope(&self) -> Option<Envelope> {
        if envelope_indicator(self.bytes[3]) == 0 {
            return None;
        }
        let read = |i: usize| {
            let start = FIXED_HEADER_LEN + i * 8;
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&self.bytes[start..start + 8]);
            if self.little_endian() {
                f64::from_le_bytes(raw)
            } else {
                f64::from_be_bytes(raw)
            }
        };
        Some(Envelope {
            min_x: read(0),
            max_x: read(1),
            min_y: read(2),
            max_y: read(3),
        })
    }

    /// Render as WKT, falling back to hex WKB for payloads the WKT encoder
    /// does not understand.
    pub fn to_wkt(&self) -> String {
        wkb_to_wkt(self.wkb()).unwrap_or_else(|_| hex::encode(self.wkb()))
    }
}

fn envelope_indicator(flags: u8) -> u8 {
    (flags >> 1) & 0x07
}
