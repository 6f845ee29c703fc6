//! Install context: paths and settings for one run.
//!
//! The context is immutable during resolution; all per-tool mutable state
//! lives in the catalog.

use std::path::{Path, PathBuf};

use crate::error::InstallError;

/// C++ standard libraries a compiler may link against.
pub const CPP_STANDARD_LIBS: [&str; 2] = ["-lc++", "-lstdc++"];

/// Default C++ compiler.
pub const DEFAULT_CPP_COMPILER: &str = "g++";

/// Default Fortran compiler.
pub const DEFAULT_FORTRAN_COMPILER: &str = "gfortran";

/// Paths and settings shared by one top-level install invocation.
#[derive(Debug, Clone)]
pub struct InstallContext {
    /// Install root under which tools and the shared tree live.
    prefix: PathBuf,

    /// Directory holding the per-tool install scripts.
    scripts_dir: PathBuf,

    /// C++ compiler (name or path), exported as `CXX` for the run.
    cpp_compiler: String,

    /// Fortran compiler (name or path), exported as `FC` for the run.
    fortran_compiler: String,

    /// C++ standard library link flag.
    cpp_standard_lib: String,

    /// Host MG5 distribution invoking the install, if any.
    mg5_path: Option<PathBuf>,

    /// Overwrite an existing installation of the target.
    force: bool,
}

impl InstallContext {
    /// Create a context with default compilers.
    pub fn new(prefix: PathBuf, scripts_dir: PathBuf) -> Self {
        InstallContext {
            prefix,
            scripts_dir,
            cpp_compiler: DEFAULT_CPP_COMPILER.to_string(),
            fortran_compiler: DEFAULT_FORTRAN_COMPILER.to_string(),
            cpp_standard_lib: "-lstdc++".to_string(),
            mg5_path: None,
            force: false,
        }
    }

    /// Set the C++ compiler.
    pub fn set_cpp_compiler(&mut self, compiler: impl Into<String>) {
        self.cpp_compiler = compiler.into();
    }

    /// Set the Fortran compiler.
    pub fn set_fortran_compiler(&mut self, compiler: impl Into<String>) {
        self.fortran_compiler = compiler.into();
    }

    /// Set the C++ standard library flag; only `-lc++` and `-lstdc++` are
    /// accepted.
    pub fn set_cpp_standard_lib(&mut self, value: &str) -> Result<(), InstallError> {
        if !CPP_STANDARD_LIBS.contains(&value) {
            return Err(InstallError::UnsupportedOption {
                option: "--cpp-standard-lib".to_string(),
                value: value.to_string(),
            });
        }
        self.cpp_standard_lib = value.to_string();
        Ok(())
    }

    /// Set the host MG5 path.
    pub fn set_mg5_path(&mut self, path: PathBuf) {
        self.mg5_path = Some(path);
    }

    /// Allow overwriting an existing installation.
    pub fn set_force(&mut self, force: bool) {
        self.force = force;
    }

    /// Get the install root.
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Get the install scripts directory.
    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    /// Get the C++ compiler.
    pub fn cpp_compiler(&self) -> &str {
        &self.cpp_compiler
    }

    /// Get the Fortran compiler.
    pub fn fortran_compiler(&self) -> &str {
        &self.fortran_compiler
    }

    /// Get the C++ standard library flag.
    pub fn cpp_standard_lib(&self) -> &str {
        &self.cpp_standard_lib
    }

    /// Get the host MG5 path, if one was given.
    pub fn mg5_path(&self) -> Option<&Path> {
        self.mg5_path.as_deref()
    }

    /// Check if existing installations may be overwritten.
    pub fn force(&self) -> bool {
        self.force
    }

    /// Default install directory of a tool under this prefix.
    pub fn default_install_path(&self, name: &str) -> PathBuf {
        self.prefix.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_lib_validation() {
        let mut ctx = InstallContext::new(PathBuf::from("/opt/tools"), PathBuf::from("/scripts"));
        assert!(ctx.set_cpp_standard_lib("-lc++").is_ok());
        assert_eq!(ctx.cpp_standard_lib(), "-lc++");

        let err = ctx.set_cpp_standard_lib("-lgcc").unwrap_err();
        assert!(matches!(err, InstallError::UnsupportedOption { .. }));
        // The bad value did not stick.
        assert_eq!(ctx.cpp_standard_lib(), "-lc++");
    }

    #[test]
    fn test_default_install_path() {
        let ctx = InstallContext::new(PathBuf::from("/opt/tools"), PathBuf::from("/scripts"));
        assert_eq!(
            ctx.default_install_path("hepmc"),
            PathBuf::from("/opt/tools/hepmc")
        );
    }
}
