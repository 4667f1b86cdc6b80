use flameview_core::model::FlameFrame;
use flameview_protocol::Color;

/// FNV-1a; stable across runs and platforms, unlike `DefaultHasher`.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |h, &b| {
        (h ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Classic flame-graph warm palette, keyed by function name so a function
/// keeps its color across views.
pub fn warm(frame: &FlameFrame) -> Color {
    let h = fnv1a(frame.function.as_bytes());
    let unit = |shift: u32| ((h >> shift) & 0xff) as f64 / 255.0;
    let r = 205.0 + 50.0 * unit(0);
    let g = 230.0 * unit(8);
    let b = 55.0 * unit(16);
    Color::rgb(r as u8, g as u8, b as u8)
}
