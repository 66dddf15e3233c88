//! Artifact data model: the exact shapes serialized to `.ark/index/*`.

use crate::error::Warning;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub rel_path: String,
    pub abs_path: std::path::PathBuf,
    pub size: u64,
    pub mtime: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Class,
    Method,
    Interface,
    Type,
    Enum,
    Constant,
    Module,
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Export,
    Public,
    Private,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub symbol_id: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring_summary: Option<String>,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_callers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_callees: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Fast,
    Slow,
    Integration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestEntry {
    pub test_id: String,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub tier: Tier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_touched: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestMap {
    pub schema_version: String,
    pub tests: Vec<TestEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrypointType {
    Executable,
    Module,
    Library,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entrypoint {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntrypointType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFile {
    pub path: String,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubDirectory {
    pub name: String,
    pub path: String,
    #[serde(rename = "fileCount")]
    pub file_count: usize,
    #[serde(rename = "codeFileCount")]
    pub code_file_count: usize,
    pub key_files: Vec<KeyFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub entrypoints: Vec<Entrypoint>,
    pub key_files: Vec<KeyFile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subdirectories: Vec<SubDirectory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildCommands {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_full: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryOverview {
    pub total_files: usize,
    pub total_code_files: usize,
    pub languages: BTreeMap<String, usize>,
    pub top_level_dirs: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoMap {
    pub schema_version: String,
    pub modules: Vec<Module>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub owners: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub build_commands: BuildCommands,
    pub overview: DirectoryOverview,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHashEntry {
    pub hash: String,
    pub mtime: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHashes {
    pub schema_version: String,
    pub git_commit: Option<String>,
    pub files: BTreeMap<String, FileHashEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    Success,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildStats {
    pub total_files: usize,
    pub total_symbols: usize,
    pub total_tests: usize,
    pub incremental: bool,
    pub files_changed: usize,
    pub files_new: usize,
    pub files_deleted: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub max_file_kb: u64,
    pub max_files: usize,
    pub respect_gitignore: bool,
    pub follow_symlinks: bool,
    /// Names of the adapters available/configured for this build (not just
    /// the subset that fired on some file), so consecutive runs with the
    /// same adapters configured compare equal.
    pub adapters_used: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub schema_version: String,
    pub tool_version: String,
    pub generated_at: String,
    pub repo_root: String,
    pub git_commit: Option<String>,
    pub status: BuildStatus,
    pub stats: BuildStats,
    pub config: ConfigSnapshot,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}
