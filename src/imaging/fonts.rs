//! Font discovery for placeholder labels.
//!
//! Labels are usually user, team or league names, so the font has to cover
//! CJK as well as Latin. Fonts are not bundled. Instead an ordered list of
//! well-known locations is probed once, when the generator is built, and the
//! first file that exists *and* parses wins.
//!
//! A missing or unreadable candidate is skipped, never an error. If no
//! candidate works the generator falls back to the built-in bitmap font
//! (see [`bitmap_font`](super::bitmap_font)), which only covers ASCII.

use ab_glyph::FontVec;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default search path, most preferred first.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/wqy-microhei/wqy-microhei.ttc",
    "/usr/share/fonts/zihun/zihun-xingmouhei.ttf",
    "/usr/share/fonts/chinese/TrueType/uming.ttc",
    "/usr/share/fonts/wqy-zenhei/wqy-zenhei.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
];

pub fn default_font_candidates() -> Vec<PathBuf> {
    DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect()
}

/// The font a generator draws with.
pub enum FontSource {
    /// A TrueType/OpenType face (first face of a collection).
    TrueType { path: PathBuf, font: FontVec },
    /// The built-in 5×7 bitmap font.
    Builtin,
}

impl FontSource {
    /// Probe `candidates` in order and load the first usable font.
    pub fn resolve<P: AsRef<Path>>(candidates: &[P]) -> Self {
        for candidate in candidates {
            let path = candidate.as_ref();
            if !path.exists() {
                debug!(path = %path.display(), "font candidate not present");
                continue;
            }
            match load_font(path) {
                Ok(font) => {
                    info!(path = %path.display(), "using font");
                    return Self::TrueType {
                        path: path.to_path_buf(),
                        font,
                    };
                }
                Err(reason) => {
                    warn!(path = %path.display(), %reason, "skipping unreadable font");
                }
            }
        }
        warn!("no usable font found, falling back to built-in bitmap font");
        Self::Builtin
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::TrueType { path, .. } => Some(path),
            Self::Builtin => None,
        }
    }
}

impl fmt::Debug for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrueType { path, .. } => f.debug_tuple("TrueType").field(path).finish(),
            Self::Builtin => f.write_str("Builtin"),
        }
    }
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TrueType { path, .. } => write!(f, "{}", path.display()),
            Self::Builtin => f.write_str("built-in bitmap font"),
        }
    }
}

fn load_font(path: &Path) -> Result<FontVec, String> {
    let data = std::fs::read(path).map_err(|e| e.to_string())?;
    // Index 0 is the first face for .ttc collections and the only face otherwise.
    FontVec::try_from_vec_and_index(data, 0).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_candidates_falls_back_to_builtin() {
        let source = FontSource::resolve::<PathBuf>(&[]);
        assert!(source.is_builtin());
        assert_eq!(source.path(), None);
    }

    #[test]
    fn missing_candidates_fall_back_to_builtin() {
        let source = FontSource::resolve(&["/nonexistent/a.ttf", "/nonexistent/b.ttc"]);
        assert!(source.is_builtin());
    }

    #[test]
    fn unreadable_font_is_skipped_not_raised() {
        let tmp = TempDir::new().unwrap();
        let bogus = tmp.path().join("broken.ttf");
        std::fs::write(&bogus, b"definitely not a font").unwrap();

        let source = FontSource::resolve(&[bogus]);
        assert!(source.is_builtin());
    }

    #[test]
    fn display_names_builtin() {
        assert_eq!(FontSource::Builtin.to_string(), "built-in bitmap font");
    }

    #[test]
    fn default_candidates_prefer_cjk_faces() {
        let candidates = default_font_candidates();
        assert!(candidates[0].to_string_lossy().contains("wqy-microhei"));
        assert!(
            candidates
                .last()
                .unwrap()
                .to_string_lossy()
                .contains("DejaVuSans")
        );
    }
}
