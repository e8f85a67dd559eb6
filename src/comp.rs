/// Expand a `comp_t`, the kernel's 16-bit pseudo-float used for the
/// time and memory fields of accounting records: a 13-bit mantissa
/// scaled by a 3-bit base-8 exponent.
///
/// Every 16-bit input is a valid encoding, so this never fails.
pub fn expand(comp: u16) -> u64 {
    let mantissa = (comp & 0x1fff) as u64;
    let exp = (comp >> 13) & 0x7;
    mantissa << (3 * exp)
}
