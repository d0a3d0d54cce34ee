//! Conflict block strategy.
//!
//! Writes both versions verbatim between delimiting markers, leaving the
//! resolution to a human.

/// Marker line opening the BASE half.
pub const BASE_MARKER: &str = ">>>>>>>>>> BASE";

/// Marker line separating BASE from SOURCE.
pub const SEPARATOR_MARKER: &str = "========== NOVO ==========";

/// Marker line closing the block.
pub const END_MARKER: &str = "<<<<<<<<<< FIM MERGE";

/// Build a conflict block holding `base` then `source`.
pub fn conflict_block(base: &[u8], source: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(base.len() + source.len() + 96);
    push_line(&mut out, BASE_MARKER.as_bytes());
    push_body(&mut out, base);
    push_line(&mut out, SEPARATOR_MARKER.as_bytes());
    push_body(&mut out, source);
    push_line(&mut out, END_MARKER.as_bytes());
    out
}

fn push_line(out: &mut Vec<u8>, line: &[u8]) {
    out.extend_from_slice(line);
    out.push(b'\n');
}

fn push_body(out: &mut Vec<u8>, body: &[u8]) {
    out.extend_from_slice(body);
    if !body.is_empty() && !body.ends_with(b"\n") {
        out.push(b'\n');
    }
}
