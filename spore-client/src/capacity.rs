//! Cell capacity accounting.

use crate::types::{Cell, CellOutput};

/// Shannons per CKByte.
pub const SHANNONS_PER_CKB: u64 = 100_000_000;

/// Bytes taken by the capacity field itself.
const CAPACITY_FIELD_BYTES: u64 = 8;

/// Minimal capacity, in shannons, a cell with this output and data needs.
pub fn occupied_capacity(output: &CellOutput, data_len: usize) -> u64 {
    let bytes = CAPACITY_FIELD_BYTES
        + output.lock.occupied_bytes()
        + output.type_.as_ref().map_or(0, |s| s.occupied_bytes())
        + data_len as u64;
    bytes.saturating_mul(SHANNONS_PER_CKB)
}

/// Capacity held by the cell beyond what it occupies.
pub fn capacity_margin(cell: &Cell) -> u64 {
    cell.output
        .capacity
        .saturating_sub(occupied_capacity(&cell.output, cell.output_data.len()))
}

/// Render shannons as a decimal CKB amount, e.g. `123.45`.
pub fn format_ckb(shannons: u64) -> String {
    let whole = shannons / SHANNONS_PER_CKB;
    let frac = shannons % SHANNONS_PER_CKB;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:08}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
