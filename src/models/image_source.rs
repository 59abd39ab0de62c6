use std::fmt;
use std::path::{Path, PathBuf};

/// File extensions treated as displayable images.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif"];

/// One image shown by the gallery.
///
/// The core never looks inside a source; it only needs a stable identity for
/// list keys and something to hand back to long-press observers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// Remote or platform resource URI.
    Uri(String),
    /// Local file on disk.
    File(PathBuf),
}

impl ImageSource {
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Stable identity used as the page key in the paginated list.
    pub fn key(&self) -> String {
        match self {
            ImageSource::Uri(uri) => uri.clone(),
            ImageSource::File(path) => path.display().to_string(),
        }
    }

    /// Local path, if this source lives on disk. `file://` URIs count too.
    pub fn local_path(&self) -> Option<PathBuf> {
        match self {
            ImageSource::File(path) => Some(path.clone()),
            ImageSource::Uri(uri) => uri.strip_prefix("file://").map(PathBuf::from),
        }
    }

    /// Short human-readable name (file name or last URI segment).
    pub fn display_name(&self) -> String {
        match self {
            ImageSource::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            ImageSource::Uri(uri) => {
                let trimmed = uri.split(['?', '#']).next().unwrap_or(uri);
                trimmed
                    .rsplit('/')
                    .find(|segment| !segment.is_empty())
                    .unwrap_or(uri)
                    .to_string()
            }
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

/// Check whether a path carries one of the supported image extensions.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let ext = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_stable() {
        let uri = ImageSource::uri("https://example.com/a.jpg");
        assert_eq!(uri.key(), "https://example.com/a.jpg");
        assert_eq!(uri.key(), uri.clone().key());

        let file = ImageSource::file("/tmp/b.png");
        assert_eq!(file.key(), "/tmp/b.png");
    }

    #[test]
    fn test_local_path() {
        assert_eq!(
            ImageSource::uri("file:///srv/pics/c.webp").local_path(),
            Some(PathBuf::from("/srv/pics/c.webp"))
        );
        assert_eq!(ImageSource::uri("https://x.org/c.webp").local_path(), None);
        assert_eq!(
            ImageSource::file("d.gif").local_path(),
            Some(PathBuf::from("d.gif"))
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(
            ImageSource::uri("https://x.org/photos/cat.jpg?w=200").display_name(),
            "cat.jpg"
        );
        assert_eq!(ImageSource::uri("https://x.org/photos/").display_name(), "photos");
        assert_eq!(ImageSource::file("/a/b/dog.png").display_name(), "dog.png");
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("a.JPG")));
        assert!(is_image_path(Path::new("dir/b.tiff")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("no_extension")));
    }
}
