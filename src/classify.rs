//! Extension to file type classification.
//!
//! A static table maps a normalized extension (lowercase, no leading dot) to a
//! coarse type label such as `"video"` or `"code"`. Unknown extensions and files
//! without an extension are unclassified and get an empty label.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// Extension to type pairs, grouped by type.
/// Based on https://github.com/dyne/file-extension-list
const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("7z", "archive"),
    ("apk", "archive"),
    ("ar", "archive"),
    ("bz2", "archive"),
    ("cab", "archive"),
    ("cpio", "archive"),
    ("deb", "archive"),
    ("dmg", "archive"),
    ("egg", "archive"),
    ("gz", "archive"),
    ("iso", "archive"),
    ("jar", "archive"),
    ("lha", "archive"),
    ("mar", "archive"),
    ("pak", "archive"),
    ("rar", "archive"),
    ("rpm", "archive"),
    ("s7z", "archive"),
    ("shar", "archive"),
    ("tar", "archive"),
    ("tbz2", "archive"),
    ("tgz", "archive"),
    ("tlz", "archive"),
    ("war", "archive"),
    ("whl", "archive"),
    ("xpi", "archive"),
    ("xz", "archive"),
    ("zip", "archive"),
    ("zipx", "archive"),
    ("aac", "audio"),
    ("aiff", "audio"),
    ("ape", "audio"),
    ("au", "audio"),
    ("flac", "audio"),
    ("gsm", "audio"),
    ("it", "audio"),
    ("m3u", "audio"),
    ("m4a", "audio"),
    ("mid", "audio"),
    ("mod", "audio"),
    ("mp3", "audio"),
    ("mpa", "audio"),
    ("pls", "audio"),
    ("ra", "audio"),
    ("s3m", "audio"),
    ("sid", "audio"),
    ("wav", "audio"),
    ("wma", "audio"),
    ("xm", "audio"),
    ("azw", "book"),
    ("azw3", "book"),
    ("azw6", "book"),
    ("cbz", "book"),
    ("c", "code"),
    ("cc", "code"),
    ("class", "code"),
    ("clj", "code"),
    ("cpp", "code"),
    ("cs", "code"),
    ("css", "code"),
    ("cxx", "code"),
    ("diff", "code"),
    ("el", "code"),
    ("go", "code"),
    ("h", "code"),
    ("html", "code"),
    ("java", "code"),
    ("js", "code"),
    ("less", "code"),
    ("lua", "code"),
    ("m", "code"),
    ("m4", "code"),
    ("patch", "code"),
    ("php", "code"),
    ("pl", "code"),
    ("po", "code"),
    ("py", "code"),
    ("rb", "code"),
    ("rs", "code"),
    ("scss", "code"),
    ("swift", "code"),
    ("vb", "code"),
    ("vcxproj", "code"),
    ("wasm", "code"),
    ("xcodeproj", "code"),
    ("xml", "code"),
    ("csv", "document"),
    ("doc", "document"),
    ("docx", "document"),
    ("ebook", "document"),
    ("epub", "document"),
    ("ics", "document"),
    ("key", "document"),
    ("md", "document"),
    ("numbers", "document"),
    ("odt", "document"),
    ("pages", "document"),
    ("pdf", "document"),
    ("ppt", "document"),
    ("rst", "document"),
    ("rtf", "document"),
    ("vcf", "document"),
    ("xls", "document"),
    ("xlsx", "document"),
    ("eot", "font"),
    ("otf", "font"),
    ("ttf", "font"),
    ("woff", "font"),
    ("woff2", "font"),
    ("3dm", "image"),
    ("3ds", "image"),
    ("ai", "image"),
    ("bmp", "image"),
    ("dds", "image"),
    ("dwg", "image"),
    ("dxf", "image"),
    ("eps", "image"),
    ("gif", "image"),
    ("gpx", "image"),
    ("jpeg", "image"),
    ("jpg", "image"),
    ("kml", "image"),
    ("kmz", "image"),
    ("max", "image"),
    ("png", "image"),
    ("procreate", "image"),
    ("ps", "image"),
    ("psd", "image"),
    ("svg", "image"),
    ("tga", "image"),
    ("thm", "image"),
    ("tif", "image"),
    ("tiff", "image"),
    ("webp", "image"),
    ("xcf", "image"),
    ("txt", "text"),
    ("3g2", "video"),
    ("3gp", "video"),
    ("aaf", "video"),
    ("asf", "video"),
    ("avchd", "video"),
    ("avi", "video"),
    ("drc", "video"),
    ("flv", "video"),
    ("m2v", "video"),
    ("m4p", "video"),
    ("m4v", "video"),
    ("mkv", "video"),
    ("mng", "video"),
    ("mov", "video"),
    ("mp2", "video"),
    ("mp4", "video"),
    ("mpe", "video"),
    ("mpeg", "video"),
    ("mpg", "video"),
    ("mpv", "video"),
    ("mxf", "video"),
    ("nsv", "video"),
    ("ogg", "video"),
    ("ogm", "video"),
    ("ogv", "video"),
    ("qt", "video"),
    ("rm", "video"),
    ("rmvb", "video"),
    ("roq", "video"),
    ("srt", "video"),
    ("svi", "video"),
    ("vob", "video"),
    ("webm", "video"),
    ("wmv", "video"),
    ("yuv", "video"),
];

static TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| EXTENSION_TYPES.iter().copied().collect());

/// Lowercased extension of `path` without the leading dot.
///
/// `"clip.MP4"` gives `"mp4"`, `"archive.tar.gz"` gives `"gz"`, and a name
/// without a dot (or ending in one) gives `""`.
#[must_use]
pub fn normalized_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Type label for an already-normalized extension, `""` when unknown.
#[must_use]
pub fn type_for_extension(extension: &str) -> &'static str {
    TABLE.get(extension).copied().unwrap_or("")
}

/// Normalized extension and type label for a path.
#[must_use]
pub fn classify(path: &Path) -> (String, &'static str) {
    let extension = normalized_extension(path);
    let file_type = type_for_extension(&extension);
    (extension, file_type)
}
