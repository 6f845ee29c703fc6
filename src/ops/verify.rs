//! Post-install verification.

use crate::core::{platform, Tool};

/// Check whether an installation of `tool` left its expected artifacts.
///
/// Native libraries may live under `lib/` or flat in the install root
/// (some tools use non-standard layouts); anything else is checked at the
/// install root. The first artifact found anywhere expected decides.
pub fn check_successful_installation(tool: &Tool) -> bool {
    let Some(install) = tool.install_path() else {
        return false;
    };

    for artifact in &tool.artifacts {
        if platform::is_native_library(artifact) {
            if install.join("lib").join(artifact).exists() {
                return true;
            }
            if install.join(artifact).exists() {
                return true;
            }
        }
        if install.join(artifact).exists() {
            return true;
        }
    }
    false
}
