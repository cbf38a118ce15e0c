use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};

use crate::{
    options::ParserOptions,
    pass::ShaderPass,
    shader_file::{ShaderFile, parse_user_shader},
};

/// Thread-safe, clone-friendly cache of shader file contents keyed by path.
#[derive(Debug, Clone, Default)]
pub struct ShaderCache {
    inner: Arc<Mutex<HashMap<PathBuf, Arc<str>>>>,
}

impl ShaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached text for `path`, reading the file on first use.
    pub fn load(&self, path: &Path) -> Result<Arc<str>> {
        if let Some(text) = self.get(path) {
            return Ok(text);
        }

        let text: Arc<str> = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read shader file {}", path.display()))?
            .into();

        let mut map = self
            .inner
            .lock()
            .map_err(|_| anyhow!("shader cache lock poisoned"))?;
        // Another thread may have raced us; keep whichever landed first.
        Ok(map.entry(path.to_path_buf()).or_insert(text).clone())
    }

    /// Insert or replace the text for `path` without touching the disk.
    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<Arc<str>>) {
        let Ok(mut map) = self.inner.lock() else {
            return;
        };
        map.insert(path.into(), text.into());
    }

    pub fn get(&self, path: &Path) -> Option<Arc<str>> {
        let map = self.inner.lock().ok()?;
        map.get(path).cloned()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.inner
            .lock()
            .ok()
            .is_some_and(|map| map.contains_key(path))
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut map) = self.inner.lock() {
            map.clear();
        }
    }
}

/// Load and parse one shader file.
///
/// Only a read failure is an error. A parse failure is logged with the file
/// name and returned inside the [`ShaderFile`] next to the passes that were
/// accepted before it.
pub fn load_user_shader(
    cache: &ShaderCache,
    path: &Path,
    opts: &ParserOptions,
) -> Result<ShaderFile> {
    let text = cache.load(path)?;
    let file = parse_user_shader(&text, opts);
    if let Some(e) = &file.error {
        tracing::error!(
            "invalid user shader {}: {e} (keeping {} earlier passes)",
            path.display(),
            file.passes.len()
        );
    }
    Ok(file)
}

/// Load and parse every shader file in `paths`, in order. A file that
/// cannot be read is logged and skipped.
pub fn load_user_shaders(
    cache: &ShaderCache,
    paths: &[PathBuf],
    opts: &ParserOptions,
) -> Vec<ShaderPass> {
    let mut out = Vec::new();
    for path in paths {
        match load_user_shader(cache, path, opts) {
            Ok(file) => out.extend(file.passes),
            Err(e) => tracing::error!("{e:#}"),
        }
    }
    out
}
