//! Browser URL overrides.
//!
//! Usage:
//! `index.html?assets=https://example.org/colorado/`

#![cfg(target_arch = "wasm32")]

/// Returns `Some(root)` if `?assets=...` is present in the browser URL.
pub fn query_asset_root() -> Option<String> {
    let window = web_sys::window()?;
    let search = window.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    let root = params.get("assets")?;
    if root.trim().is_empty() {
        None
    } else {
        Some(root)
    }
}
