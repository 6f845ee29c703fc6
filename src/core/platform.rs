//! Native-library naming conventions for the current platform.

/// Static archives are considered on every platform.
pub const STATIC_LIB_EXT: &str = "a";

/// Shared-library extension for the current platform.
#[cfg(target_os = "macos")]
pub const SHARED_LIB_EXT: &str = "dylib";
#[cfg(not(target_os = "macos"))]
pub const SHARED_LIB_EXT: &str = "so";

/// File extensions an installed library may carry, static archive first.
pub fn lib_extensions() -> [&'static str; 2] {
    [STATIC_LIB_EXT, SHARED_LIB_EXT]
}

/// Whether a filename names a native library (by extension).
pub fn is_native_library(name: &str) -> bool {
    lib_extensions()
        .iter()
        .any(|ext| name.ends_with(&format!(".{ext}")))
}
