//! Positional read/write of the local part of a configuration file.

use crate::algs::wire::LINK_BYTES;
use crate::data::field::LatticeField;
use crate::data::su3::{SU3_REALS, Su3};
use crate::gauge_error::GaugeError;
use crate::topology::{NDIM, Site, sites};
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Bytes of the four links of one site.
const SITE_BYTES: usize = NDIM * LINK_BYTES;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    /// Files written by this crate.
    Little,
    /// Foreign files; decoded values are checked for finiteness.
    Big,
}

/// The local sites whose last coordinate is 0. Each one starts a run of
/// `local[3]` sites that are contiguous in the file too.
fn row_starts(field: &LatticeField) -> impl Iterator<Item = Site> {
    let mut ext = field.index().local_extents();
    ext[NDIM - 1] = 1;
    sites(ext)
}

fn row_offset(field: &LatticeField, grid_coord: [usize; NDIM], start: Site) -> u64 {
    let index = field.index();
    let g = index.global_index(index.to_global(start, grid_coord));
    (g * SITE_BYTES) as u64
}

/// Write the local links of `field` into `target` at their global offsets.
pub fn write_configuration<W: Write + Seek>(
    target: &mut W,
    field: &LatticeField,
    grid_coord: [usize; NDIM],
) -> Result<(), GaugeError> {
    let nt = field.index().local_extents()[NDIM - 1];
    let mut row = Vec::with_capacity(nt * SITE_BYTES);
    for start in row_starts(field) {
        row.clear();
        for t in 0..nt {
            let mut site = start;
            site[NDIM - 1] = t;
            for mu in 0..NDIM {
                for r in field.link(site, mu).to_reals() {
                    row.extend_from_slice(&r.to_le_bytes());
                }
            }
        }
        target.seek(SeekFrom::Start(row_offset(field, grid_coord, start)))?;
        target.write_all(&row)?;
    }
    target.flush()?;
    Ok(())
}

/// Fill the local links of `field` from `source`.
///
/// # Errors
/// `GaugeError::Io` on short or failed reads; for [`ByteOrder::Big`],
/// `GaugeError::CorruptConfiguration` when any decoded value is not finite.
pub fn read_configuration<R: Read + Seek>(
    source: &mut R,
    field: &mut LatticeField,
    grid_coord: [usize; NDIM],
    order: ByteOrder,
) -> Result<(), GaugeError> {
    read_into(source, field, grid_coord, order, "<stream>")
}

fn read_into<R: Read + Seek>(
    source: &mut R,
    field: &mut LatticeField,
    grid_coord: [usize; NDIM],
    order: ByteOrder,
    name: &str,
) -> Result<(), GaugeError> {
    let nt = field.index().local_extents()[NDIM - 1];
    let mut row = vec![0u8; nt * SITE_BYTES];
    let starts: Vec<Site> = row_starts(field).collect();
    for start in starts {
        source
            .seek(SeekFrom::Start(row_offset(field, grid_coord, start)))
            .map_err(|e| GaugeError::io(name, e))?;
        source
            .read_exact(&mut row)
            .map_err(|e| GaugeError::io(name, e))?;
        let reals = match order {
            ByteOrder::Little => decode_little_endian(&row),
            ByteOrder::Big => {
                let reals = decode_big_endian(&row);
                if let Some(pos) = reals.iter().position(|v| !v.is_finite()) {
                    let mut site = start;
                    site[NDIM - 1] = pos / (NDIM * SU3_REALS);
                    return Err(GaugeError::CorruptConfiguration {
                        path: name.to_string(),
                        reason: format!(
                            "non-finite value {} at local site {site:?}, link {}",
                            reals[pos],
                            (pos / SU3_REALS) % NDIM
                        ),
                    });
                }
                reals
            }
        };
        for (k, chunk) in reals.chunks_exact(SU3_REALS).enumerate() {
            let mut site = start;
            site[NDIM - 1] = k / NDIM;
            let mut buf = [0.0; SU3_REALS];
            buf.copy_from_slice(chunk);
            field.set_link(site, k % NDIM, Su3::from_reals(&buf));
        }
    }
    Ok(())
}

fn decode_little_endian(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(8)
        .map(|c| {
            let mut b = [0u8; 8];
            b.copy_from_slice(c);
            f64::from_le_bytes(b)
        })
        .collect()
}

/// Decode big-endian doubles. Trailing bytes that do not fill a double are
/// ignored.
#[cfg(not(feature = "rayon"))]
pub fn decode_big_endian(bytes: &[u8]) -> Vec<f64> {
    bytes.chunks_exact(8).map(be_double).collect()
}

/// Decode big-endian doubles. Trailing bytes that do not fill a double are
/// ignored.
#[cfg(feature = "rayon")]
pub fn decode_big_endian(bytes: &[u8]) -> Vec<f64> {
    bytes.par_chunks_exact(8).map(be_double).collect()
}

fn be_double(c: &[u8]) -> f64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(c);
    f64::from_be_bytes(b)
}

/// Write the local part of `field` into the file at `path`, creating it if
/// needed. Several processes may write disjoint parts of the same file.
pub fn write_configuration_file(
    path: impl AsRef<Path>,
    field: &LatticeField,
    grid_coord: [usize; NDIM],
) -> Result<(), GaugeError> {
    let path = path.as_ref();
    let name = path.display().to_string();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| GaugeError::io(&name, e))?;
    }
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| GaugeError::io(&name, e))?;
    write_configuration(&mut file, field, grid_coord).map_err(|e| match e {
        GaugeError::Io { source, .. } => GaugeError::io(&name, source),
        other => other,
    })
}

/// Read the local part of `field` from the file at `path`.
pub fn read_configuration_file(
    path: impl AsRef<Path>,
    field: &mut LatticeField,
    grid_coord: [usize; NDIM],
    order: ByteOrder,
) -> Result<(), GaugeError> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let mut file = std::fs::File::open(path).map_err(|e| GaugeError::io(&name, e))?;
    read_into(&mut file, field, grid_coord, order, &name)
}
