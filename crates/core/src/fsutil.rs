//! Filesystem primitives: stat, hash, binary/symlink detection, path
//! normalization, and root-containment checks.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// First 8 KiB read to sniff for binary content.
const SNIFF_LEN: usize = 8192;

/// `true` if `path` is a symlink. No I/O failure is reported as `false`.
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata().map(|m| m.file_type().is_symlink()).unwrap_or(false)
}

/// `true` if a zero byte appears in the first 8 KiB of `path`. `false` on any read failure.
pub fn is_binary(path: &Path) -> bool {
    let Ok(mut f) = File::open(path) else { return false };
    let mut buf = [0u8; SNIFF_LEN];
    let Ok(n) = f.read(&mut buf) else { return false };
    buf[..n].contains(&0)
}

/// Byte size rounded up to KiB, so any non-empty file is at least 1 KiB.
pub fn size_kb(bytes: u64) -> u64 {
    bytes.div_ceil(1024)
}

/// `true` when `rel` resolves to a path inside `root`: rejects `..`-escapes,
/// absolute inputs, and any path whose resolved form is not root-prefixed.
pub fn within_root(rel: &str, root: &Path) -> bool {
    if rel.is_empty() || rel.starts_with('/') || rel.starts_with('\\') {
        return false;
    }
    if Path::new(rel).components().any(|c| matches!(c, std::path::Component::ParentDir)) {
        return false;
    }
    let candidate = root.join(rel);
    match (candidate.canonicalize(), root.canonicalize()) {
        (Ok(c), Ok(r)) => c.starts_with(r),
        // If the file doesn't exist yet (or root can't be canonicalized), fall back to a
        // lexical check since canonicalize() requires the path to exist.
        _ => !rel.split('/').any(|seg| seg == ".."),
    }
}

/// Normalize a path to use `/` separators. Idempotent.
pub fn to_forward_slashes(p: &str) -> String {
    if cfg!(windows) {
        p.replace('\\', "/")
    } else {
        p.to_string()
    }
}

/// `"sha256:" + lowercase hex` digest of the full file contents.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("sha256:{:x}", hasher.finalize()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Rust,
    Go,
    C,
    Cpp,
    Java,
    Markdown,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Markdown => "markdown",
            Language::Unknown => "unknown",
        }
    }

    pub fn is_code(&self) -> bool {
        !matches!(self, Language::Markdown | Language::Unknown)
    }
}

/// Extension-based classification into one of the nine supported source
/// families (ts, tsx, js, jsx/mjs/cjs, py, rs, go, c/h, cpp family, java);
/// anything else is `Unknown`.
pub fn language_of(path: &Path) -> Language {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "ts" | "tsx" => Language::TypeScript,
        "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
        "py" | "pyi" => Language::Python,
        "rs" => Language::Rust,
        "go" => Language::Go,
        "c" | "h" => Language::C,
        "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
        "java" => Language::Java,
        "md" | "markdown" => Language::Markdown,
        _ => Language::Unknown,
    }
}

/// Resolve `path` to a path relative to `root` using forward slashes, if contained.
pub fn relativize(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let s = rel.to_string_lossy().replace('\\', "/");
    Some(s)
}

pub fn abs_join(root: &Path, rel: &str) -> PathBuf {
    root.join(rel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn size_kb_rounds_up() {
        assert_eq!(size_kb(0), 0);
        assert_eq!(size_kb(1), 1);
        assert_eq!(size_kb(1024), 1);
        assert_eq!(size_kb(1025), 2);
    }

    #[test]
    fn hash_file_matches_empty_sha256() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        File::create(&path).unwrap();
        let hash = hash_file(&path).unwrap();
        assert_eq!(hash, "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    }

    #[test]
    fn is_binary_detects_nul_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.dat");
        let mut f = File::create(&path).unwrap();
        f.write_all(&[1, 2, 0, 3]).unwrap();
        assert!(is_binary(&path));

        let text_path = dir.path().join("text.txt");
        std::fs::write(&text_path, "hello world").unwrap();
        assert!(!is_binary(&text_path));
    }

    #[test]
    fn within_root_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!within_root("../escape", dir.path()));
        assert!(!within_root("/abs/path", dir.path()));
        assert!(!within_root("", dir.path()));
    }

    #[test]
    fn within_root_accepts_nested_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/file.txt"), "x").unwrap();
        assert!(within_root("sub/file.txt", dir.path()));
    }

    #[test]
    fn language_of_classifies_known_extensions() {
        assert_eq!(language_of(Path::new("a.rs")), Language::Rust);
        assert_eq!(language_of(Path::new("a.go")), Language::Go);
        assert_eq!(language_of(Path::new("a.py")), Language::Python);
        assert_eq!(language_of(Path::new("a.tsx")), Language::TypeScript);
        assert_eq!(language_of(Path::new("a.xyz")), Language::Unknown);
    }
}
