//! Platform abstraction layer
//!
//! Browser glue around the sim:
//! - Canvas 2D renderer (`canvas`)
//! - DOM HUD, overlays and shop buttons (`dom`)
//! - Manifest-driven image loading over fetch (`fetch`)
//!
//! Only the small pure helpers below build on native targets.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod fetch;

/// 0xRRGGBB -> "#rrggbb"
pub fn css_color(color: u32) -> String {
    format!("#{:06x}", color & 0x00ff_ffff)
}

/// Manifest location for a category
pub fn manifest_url(category: &str) -> String {
    format!("images/{}/manifest.json", category)
}

/// Shown on the failure overlay, picked by tick count
pub const FAIL_MESSAGES: [&str; 5] = [
    "AI detected your defeat pattern. It's learning from your tears...",
    "You were out-algorithmed. Even the AI is frowning.",
    "The slop wins today. Tomorrow it's personal.",
    "Model says: 99% chance you try again.",
    "AIs don't cry. We did it for them.",
];

pub fn fail_message(seed: u64) -> &'static str {
    FAIL_MESSAGES[(seed % FAIL_MESSAGES.len() as u64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(css_color(0x2ecc71), "#2ecc71");
        assert_eq!(css_color(0xff), "#0000ff");
        assert_eq!(css_color(0xff12_3456), "#123456");
    }

    #[test]
    fn test_manifest_url() {
        assert_eq!(manifest_url("dogs"), "images/dogs/manifest.json");
    }

    #[test]
    fn test_fail_message_wraps() {
        assert_eq!(fail_message(0), fail_message(5));
    }
}
