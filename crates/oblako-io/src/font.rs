//! Font loading as an ordered fallback chain.
//!
//! Candidates are tried in order: the configured path first, then a set
//! of well-known platform faces. Misses are logged at debug severity and
//! never raised past the chain; only an exhausted chain is an error.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::ServiceError;
use oblako_pipeline::FontShaper;

/// Well-known sans-serif faces with Cyrillic coverage, per platform.
const PLATFORM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Walk the fallback chain and return the first candidate that both
/// reads and parses.
///
/// # Errors
///
/// Returns [`ServiceError::FontUnavailable`] when every candidate in
/// the chain failed.
pub fn load_font_chain(configured: Option<&Path>) -> Result<FontShaper, ServiceError> {
    let candidates = configured
        .into_iter()
        .chain(PLATFORM_FONTS.iter().map(Path::new));
    load_first(candidates).ok_or(ServiceError::FontUnavailable)
}

/// Try each candidate path in order; `None` if none is usable.
fn load_first<'a>(candidates: impl Iterator<Item = &'a Path>) -> Option<FontShaper> {
    for candidate in candidates {
        match fs::read(candidate) {
            Ok(bytes) => match FontShaper::from_bytes(&bytes) {
                Ok(shaper) => {
                    debug!(path = %candidate.display(), "font loaded");
                    return Some(shaper);
                }
                Err(error) => {
                    debug!(path = %candidate.display(), %error, "font candidate failed to parse");
                }
            },
            Err(error) => {
                debug!(path = %candidate.display(), %error, "font candidate unreadable");
            }
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_chain_yields_nothing() {
        assert!(load_first(std::iter::empty()).is_none());
    }

    #[test]
    fn missing_file_is_skipped() {
        let path = Path::new("/nonexistent/definitely-not-a-font.ttf");
        assert!(load_first(std::iter::once(path)).is_none());
    }

    #[test]
    fn unparseable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-font.ttf");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"definitely not sfnt data").unwrap();

        assert!(load_first(std::iter::once(path.as_path())).is_none());
    }

    #[test]
    fn chain_stops_at_the_first_miss_only_when_exhausted() {
        // Two bad candidates in a row still yield nothing rather than
        // erroring early.
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.ttf");
        fs::write(&bad, b"junk").unwrap();
        let missing = dir.path().join("missing.ttf");

        let candidates = [bad.as_path(), missing.as_path()];
        assert!(load_first(candidates.into_iter()).is_none());
    }
}
