//! Configuration for packaging runs.

use crate::PackError;
use crate::Result;
use std::path::PathBuf;

/// Configuration for packaging runs.
///
/// Controls where archives are written and how entries are stored. The file
/// selection itself (extensions, exclusions) is per project and lives in
/// [`ProjectSpec`](crate::ProjectSpec).
///
/// # Examples
///
/// ```
/// use projpack_core::PackConfig;
///
/// let config = PackConfig::default()
///     .with_output_dir("/var/tmp/packages")
///     .with_compression_level(9);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackConfig {
    /// Directory the archive is written to.
    ///
    /// Default: the system temporary directory.
    pub output_dir: PathBuf,

    /// Compression level (1-9).
    ///
    /// `None` uses the gzip default.
    ///
    /// Default: `Some(6)`.
    pub compression_level: Option<u8>,

    /// Store file mode, owner and group in entry headers.
    ///
    /// Default: `true`.
    pub preserve_permissions: bool,

    /// Store the contents of symlink targets instead of the links.
    ///
    /// Default: `false` (symlinks are stored as symlinks).
    pub follow_symlinks: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir(),
            compression_level: Some(6),
            preserve_permissions: true,
            follow_symlinks: false,
        }
    }
}

impl PackConfig {
    /// Creates a new `PackConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the compression level.
    ///
    /// Out-of-range levels are reported by [`validate`](Self::validate).
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Sets whether to preserve permissions.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Sets whether to follow symlinks.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is set but not in 1-9.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(PackError::InvalidCompressionLevel { level });
        }
        Ok(())
    }
}

/// Converts a user compression level (1-9) to a flate2 compression level.
///
/// - `None` or `Some(6)`: default compression
/// - `1-3`: fast compression
/// - `7-9`: best compression
/// - other values: literal level
///
/// # Examples
///
/// ```
/// use projpack_core::config::compression_level_to_flate2;
///
/// assert_eq!(compression_level_to_flate2(Some(9)), flate2::Compression::best());
/// assert_eq!(compression_level_to_flate2(None), flate2::Compression::default());
/// ```
#[must_use]
pub fn compression_level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(1..=3) => flate2::Compression::fast(),
        Some(7..=9) => flate2::Compression::best(),
        Some(n) => flate2::Compression::new(u32::from(n)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_config_default() {
        let config = PackConfig::default();
        assert_eq!(config.output_dir, std::env::temp_dir());
        assert_eq!(config.compression_level, Some(6));
        assert!(config.preserve_permissions);
        assert!(!config.follow_symlinks);
    }

    #[test]
    fn test_pack_config_builder() {
        let config = PackConfig::new()
            .with_output_dir("/out")
            .with_compression_level(1)
            .with_preserve_permissions(false)
            .with_follow_symlinks(true);

        assert_eq!(config.output_dir, PathBuf::from("/out"));
        assert_eq!(config.compression_level, Some(1));
        assert!(!config.preserve_permissions);
        assert!(config.follow_symlinks);
    }

    #[test]
    fn test_pack_config_validate() {
        assert!(PackConfig::default().validate().is_ok());
        assert!(
            PackConfig {
                compression_level: None,
                ..Default::default()
            }
            .validate()
            .is_ok()
        );

        for level in [0, 10] {
            let err = PackConfig::default()
                .with_compression_level(level)
                .validate()
                .unwrap_err();
            assert!(matches!(err, PackError::InvalidCompressionLevel { level: l } if l == level));
        }
    }

    #[test]
    fn test_compression_level_mapping() {
        assert_eq!(compression_level_to_flate2(None), flate2::Compression::default());
        assert_eq!(compression_level_to_flate2(Some(6)), flate2::Compression::default());
        assert_eq!(compression_level_to_flate2(Some(2)), flate2::Compression::fast());
        assert_eq!(compression_level_to_flate2(Some(8)), flate2::Compression::best());
        assert_eq!(compression_level_to_flate2(Some(4)), flate2::Compression::new(4));
    }
}
