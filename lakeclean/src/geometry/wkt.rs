//! WKB to WKT rendering for the audit artifact.
//!
//! Handles the seven OGC simple feature types in 2D, Z, M and ZM, both as ISO
//! type codes (`1003`) and as EWKB high-bit flags.

use std::fmt::Write as _;

const EWKB_Z: u32 = 0x8000_0000;
const EWKB_M: u32 = 0x4000_0000;
const EWKB_SRID: u32 = 0x2000_0000;

#[derive(Debug, Clone, Copy)]
struct Dims {
    z: bool,
    m: bool,
}

impl Dims {
    fn count(self) -> usize {
        2 + self.z as usize + self.m as usize
    }

    fn tag(self) -> &'static str {
        match (self.z, self.m) {
            (false, false) => "",
            (true, false) => " Z",
            (false, true) => " M",
            (true, true) => " ZM",
        }
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    little: bool,
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], String> {
        let end = self.pos + N;
        let slice = self
            .buf
            .get(self.pos..end)
            .ok_or_else(|| format!("unexpected end of WKB at byte {}", self.pos))?;
        self.pos = end;
        let mut raw = [0u8; N];
        raw.copy_from_slice(slice);
        Ok(raw)
    }

    fn byte_order(&mut self) -> Result<(), String> {
        let [order] = self.take::<1>()?;
        self.little = match order {
            0 => false,
            1 => true,
            other => return Err(format!("invalid byte order marker {}", other)),
        };
        Ok(())
    }

    fn u32(&mut self) -> Result<u32, String> {
        let raw = self.take::<4>()?;
        Ok(if self.little {
            u32::from_le_bytes(raw)
        } else {
            u32::from_be_bytes(raw)
        })
    }

    fn f64(&mut self) -> Result<f64, String> {
        let raw = self.take::<8>()?;
        Ok(if self.little {
            f64::from_le_bytes(raw)
        } else {
            f64::from_be_bytes(raw)
        })
    }
}

/// Render a WKB geometry as WKT.
pub fn wkb_to_wkt(wkb: &[u8]) -> Result<String, String> {
    let mut reader = Reader {
        buf: wkb,
        pos: 0,
        little: true,
    };
    let mut out = String::new();
    write_geometry(&mut reader, &mut out)?;
    Ok(out)
}

fn write_geometry(r: &mut Reader<'_>, out: &mut String) -> Result<(), String> {
    r.byte_order()?;
    let raw_type = r.u32()?;
    if raw_type & EWKB_SRID != 0 {
        r.u32()?;
    }
    let iso = raw_type & 0x0FFF_FFFF;
    let dims = Dims {
        z: raw_type & EWKB_Z != 0 || matches!(iso / 1000, 1 | 3),
        m: raw_type & EWKB_M != 0 || matches!(iso / 1000, 2 | 3),
    };

    let name = match iso % 1000 {
        1 => "POINT",
        2 => "LINESTRING",
        3 => "POLYGON",
        4 => "MULTIPOINT",
        5 => "MULTILINESTRING",
        6 => "MULTIPOLYGON",
        7 => "GEOMETRYCOLLECTION",
        other => return Err(format!("unsupported geometry type {}", other)),
    };
    out.push_str(name);
    out.push_str(dims.tag());

    match iso % 1000 {
        1 => {
            let coords = read_coord(r, dims)?;
            if coords.iter().all(|c| c.is_nan()) {
                out.push_str(" EMPTY");
            } else {
                out.push_str(" (");
                push_coord(out, &coords);
                out.push(')');
            }
        }
        2 => write_points(r, dims, out)?,
        3 => write_rings(r, dims, out)?,
        4..=7 => {
            let count = r.u32()?;
            if count == 0 {
                out.push_str(" EMPTY");
                return Ok(());
            }
            out.push_str(" (");
            for i in 0..count {
                if i > 0 {
                    out.push_str(", ");
                }
                let mut part = String::new();
                write_geometry(r, &mut part)?;
                if iso % 1000 == 7 {
                    out.push_str(&part);
                } else {
                    // Members of MULTI* types drop their own type keyword.
                    let body = part.find('(').map(|i| &part[i..]).unwrap_or("EMPTY");
                    out.push_str(body);
                }
            }
            out.push(')');
        }
        _ => unreachable!(),
    }
    Ok(())
}

fn read_coord(r: &mut Reader<'_>, dims: Dims) -> Result<Vec<f64>, String> {
    (0..dims.count()).map(|_| r.f64()).collect()
}

fn push_coord(out: &mut String, coord: &[f64]) {
    for (i, v) in coord.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}", v);
    }
}

fn write_points(r: &mut Reader<'_>, dims: Dims, out: &mut String) -> Result<(), String> {
    let count = r.u32()?;
    if count == 0 {
        out.push_str(" EMPTY");
        return Ok(());
    }
    out.push_str(" (");
    push_point_list(r, dims, count, out)?;
    out.push(')');
    Ok(())
}

fn write_rings(r: &mut Reader<'_>, dims: Dims, out: &mut String) -> Result<(), String> {
    let rings = r.u32()?;
    if rings == 0 {
        out.push_str(" EMPTY");
        return Ok(());
    }
    out.push_str(" (");
    for i in 0..rings {
        if i > 0 {
            out.push_str(", ");
        }
        let count = r.u32()?;
        out.push('(');
        push_point_list(r, dims, count, out)?;
        out.push(')');
    }
    out.push(')');
    Ok(())
}

fn push_point_list(
    r: &mut Reader<'_>,
    dims: Dims,
    count: u32,
    out: &mut String,
) -> Result<(), String> {
    for i in 0..count {
        if i > 0 {
            out.push_str(", ");
        }
        let coord = read_coord(r, dims)?;
        push_coord(out, &coord);
    }
    Ok(())
}
