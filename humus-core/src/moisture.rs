//! Capacitance to moisture mapping
//!
//! Linear two-point mapping: the dry endpoint is 0 %, the wet endpoint is
//! 100 %. The quotient is truncated, not rounded, and the result is
//! clamped because wet soil routinely reads past the wet endpoint.

/// Map a raw capacitance onto 0-100 %
///
/// `moisture = clamp((capacitance - dry) * 100 / (wet - dry), 0, 100)`
/// with integer truncation toward zero. Works for either endpoint order.
///
/// Returns `None` when `dry == wet` (no slope to map with).
pub fn moisture_percent(capacitance: u16, dry: u16, wet: u16) -> Option<u8> {
    if dry == wet {
        return None;
    }

    let span = wet as i32 - dry as i32;
    let offset = capacitance as i32 - dry as i32;
    let percent = offset * 100 / span;

    Some(percent.clamp(0, 100) as u8)
}
