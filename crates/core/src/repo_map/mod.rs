//! Repo map builder: module inference, subdirectory and key-file scoring,
//! entrypoints, ownership, build commands, and the directory overview.

mod build_cmds;
mod entrypoints;
mod keyfiles;
mod modules;
mod overview;
mod owners;
mod subdirs;

use crate::model::{DiscoveredFile, Module, RepoMap};
use std::path::Path;

pub const SCHEMA_VERSION: &str = "1.1.0";

/// Build the full repo map from the discovered file set.
pub fn build(root: &Path, files: &[DiscoveredFile]) -> RepoMap {
    let rel_paths: Vec<String> = files.iter().map(|f| f.rel_path.clone()).collect();
    let module_paths = modules::infer(root, &rel_paths);

    let mut built_modules = Vec::with_capacity(module_paths.len());
    for module_dir in &module_paths {
        let subdirs = if module_dir == "." { Vec::new() } else { subdirs::detect(module_dir, &module_paths, files) };
        let key_files = keyfiles::select_for_module(module_dir, &subdirs, files);
        let entrypoints = entrypoints::detect(module_dir, &rel_paths);
        let description = modules::description_of(root, module_dir);

        built_modules.push(Module {
            path: module_dir.clone(),
            description,
            entrypoints,
            key_files,
            subdirectories: subdirs,
            responsibilities: Vec::new(),
        });
    }

    RepoMap {
        schema_version: SCHEMA_VERSION.to_string(),
        modules: built_modules,
        owners: owners::parse(root),
        build_commands: build_cmds::detect(root),
        overview: overview::build(files),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn df(dir: &Path, rel: &str) -> DiscoveredFile {
        let abs = dir.join(rel);
        if let Some(parent) = abs.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&abs, "fn x() {}\n").unwrap();
        DiscoveredFile { rel_path: rel.to_string(), abs_path: abs, size: 10, mtime: String::new() }
    }

    #[test]
    fn root_manifest_repo_has_single_root_module() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[package]\nname=\"x\"\n").unwrap();
        let files = vec![df(dir.path(), "src/main.rs"), df(dir.path(), "src/lib.rs")];
        let map = build(dir.path(), &files);
        assert_eq!(map.modules.len(), 1);
        assert_eq!(map.modules[0].path, ".");
    }

    #[test]
    fn overview_and_build_commands_populated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[package]\nname=\"x\"\n").unwrap();
        let files = vec![df(dir.path(), "src/main.rs")];
        let map = build(dir.path(), &files);
        assert_eq!(map.overview.total_files, 1);
        assert_eq!(map.build_commands.build.as_deref(), Some("cargo build"));
    }
}
