//! Upload validation for the document workspace.
//!
//! Three checks run before any byte is stored:
//! 1. Size ceiling
//! 2. Magic byte detection for executables
//! 3. Extension blocklist
//!
//! Media-type detection prefers magic bytes and falls back to the file
//! extension only for text formats that genuinely lack them.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Magic byte signatures for executable files.
pub const MAGIC_SIGNATURES: &[(&str, &[u8])] = &[
    ("Windows PE/MZ", &[0x4D, 0x5A]),
    ("ELF", &[0x7F, 0x45, 0x4C, 0x46]),
    ("Mach-O 32", &[0xFE, 0xED, 0xFA, 0xCE]),
    ("Mach-O 64", &[0xFE, 0xED, 0xFA, 0xCF]),
    ("Mach-O Fat", &[0xCA, 0xFE, 0xBA, 0xBE]),
    ("WebAssembly", &[0x00, 0x61, 0x73, 0x6D]),
];

/// Blocked file extensions (case-insensitive).
static BLOCKED_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Windows executables
        "exe", "dll", "scr", "msi", "com",
        // Unix compiled binaries
        "so", "dylib", "out",
        // JVM
        "jar", "class",
        // Packages
        "deb", "rpm", "apk", "dmg", "pkg",
        // Other dangerous
        "lnk", "hta", "scf",
    ]
    .into_iter()
    .collect()
});

/// Result of upload validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub allowed: bool,
    pub block_reason: Option<String>,
    pub detected_type: Option<String>,
}

impl ValidationResult {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            block_reason: None,
            detected_type: None,
        }
    }

    pub fn blocked(reason: impl Into<String>, detected: impl Into<String>) -> Self {
        Self {
            allowed: false,
            block_reason: Some(reason.into()),
            detected_type: Some(detected.into()),
        }
    }
}

/// Validate an upload before anything is written.
pub fn validate_file(filename: &str, data: &[u8], max_size_bytes: u64) -> ValidationResult {
    if data.len() as u64 > max_size_bytes {
        return ValidationResult::blocked(
            format!("File exceeds maximum size of {} bytes", max_size_bytes),
            "oversized",
        );
    }

    if let Some(ext) = filename.rsplit('.').next() {
        if BLOCKED_EXTENSIONS.contains(ext.to_lowercase().as_str()) {
            return ValidationResult::blocked(
                format!("File extension .{} is not allowed", ext),
                format!("blocked_extension:{}", ext),
            );
        }
    }

    for (name, magic) in MAGIC_SIGNATURES {
        if data.len() >= magic.len() && &data[..magic.len()] == *magic {
            return ValidationResult::blocked(
                format!("Executable file detected: {}", name),
                format!("executable:{}", name.to_lowercase().replace(' ', "_")),
            );
        }
    }

    ValidationResult::allowed()
}

/// Detect the media type from file magic bytes.
///
/// Falls back to extension-based detection for text formats (which carry no
/// magic bytes), then to the claimed type, then to octet-stream.
pub fn detect_media_type(filename: &str, data: &[u8], claimed: Option<&str>) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    if let Some(ext) = filename.rsplit('.').next() {
        if let Some(mime) = mime_from_extension(ext) {
            return mime.to_string();
        }
    }

    // A claimed binary type without matching magic bytes is garbage; only
    // text-like claims survive to this point.
    match claimed {
        Some(c) if !claimed_is_binary(c) => c.to_string(),
        _ => "application/octet-stream".to_string(),
    }
}

/// True for claimed types that should have recognizable magic bytes.
fn claimed_is_binary(claimed: &str) -> bool {
    if claimed.starts_with("image/")
        || claimed.starts_with("audio/")
        || claimed.starts_with("video/")
    {
        return true;
    }
    matches!(
        claimed,
        "application/pdf" | "application/zip" | "application/gzip" | "application/epub+zip"
    )
}

/// Map text-only extensions to media types.
///
/// Binary document formats (pdf, epub, djvu) are intentionally excluded:
/// they have magic bytes, so trusting the extension would defeat the
/// mismatch guard above.
fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "txt" | "log" => Some("text/plain"),
        "md" | "markdown" => Some("text/markdown"),
        "tex" | "latex" => Some("application/x-tex"),
        "bib" => Some("application/x-bibtex"),
        "csv" => Some("text/csv"),
        "html" | "htm" => Some("text/html"),
        "xml" => Some("application/xml"),
        "json" => Some("application/json"),
        "rst" => Some("text/x-rst"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // %PDF-1.4 header; infer recognizes this as application/pdf
    const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n";

    #[test]
    fn accepts_ordinary_pdf() {
        let result = validate_file("paper.pdf", PDF_BYTES, 1024);
        assert!(result.allowed, "plain PDF should pass: {:?}", result.block_reason);
    }

    #[test]
    fn rejects_oversized_file() {
        let result = validate_file("paper.pdf", PDF_BYTES, 8);
        assert!(!result.allowed);
        assert_eq!(result.detected_type.as_deref(), Some("oversized"));
    }

    #[test]
    fn rejects_blocked_extension() {
        let result = validate_file("setup.exe", b"harmless bytes", 1024);
        assert!(!result.allowed);
        assert!(result
            .block_reason
            .as_deref()
            .unwrap_or_default()
            .contains(".exe"));
    }

    #[test]
    fn blocked_extension_is_case_insensitive() {
        let result = validate_file("SETUP.EXE", b"harmless bytes", 1024);
        assert!(!result.allowed);
    }

    #[test]
    fn rejects_elf_magic_bytes() {
        let data = [0x7F, 0x45, 0x4C, 0x46, 0x02, 0x01];
        let result = validate_file("innocent.pdf", &data, 1024);
        assert!(!result.allowed);
        assert_eq!(result.detected_type.as_deref(), Some("executable:elf"));
    }

    #[test]
    fn rejects_pe_magic_bytes() {
        let data = b"MZ\x90\x00";
        let result = validate_file("paper.pdf", data, 1024);
        assert!(!result.allowed);
    }

    #[test]
    fn detect_media_type_prefers_magic_bytes() {
        assert_eq!(
            detect_media_type("mislabeled.txt", PDF_BYTES, Some("text/plain")),
            "application/pdf"
        );
    }

    #[test]
    fn detect_media_type_falls_back_to_extension_for_text() {
        assert_eq!(
            detect_media_type("notes.md", b"# Heading\n", None),
            "text/markdown"
        );
        assert_eq!(
            detect_media_type("refs.bib", b"@article{key}", None),
            "application/x-bibtex"
        );
    }

    #[test]
    fn detect_media_type_trusts_text_claims_only() {
        assert_eq!(
            detect_media_type("unknown", b"free-form text", Some("text/plain")),
            "text/plain"
        );
        // Claimed PDF without PDF magic bytes is garbage
        assert_eq!(
            detect_media_type("unknown", b"free-form text", Some("application/pdf")),
            "application/octet-stream"
        );
    }

    #[test]
    fn detect_media_type_defaults_to_octet_stream() {
        assert_eq!(
            detect_media_type("mystery", b"\x00\x01\x02\x03", None),
            "application/octet-stream"
        );
    }
}
