// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The parameter store is the only state shared between the pipeline and the
//! compute stack: image builds write the tag they pushed, synthesis reads it.
//! Stores are read on every lookup; nothing is cached in process.

use crate::errors::{Error, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait ParameterStore {
    /// Returns `Ok(None)` when the store is reachable but has no such entry.
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Last writer wins when `overwrite` is set; otherwise an existing entry
    /// is an error.
    fn put(&mut self, name: &str, value: &str, overwrite: bool) -> Result<()>;

    fn require(&self, name: &str) -> Result<String> {
        self.get(name)?
            .ok_or_else(|| Error::MissingParameter(name.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryParameterStore {
    entries: IndexMap<String, String>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.entries.insert(name.to_string(), value.to_string());
        self
    }
}

impl ParameterStore for InMemoryParameterStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.entries.get(name).cloned())
    }

    fn put(&mut self, name: &str, value: &str, overwrite: bool) -> Result<()> {
        if !overwrite && self.entries.contains_key(name) {
            return Err(Error::ParameterExists(name.to_string()));
        }
        self.entries.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// A flat `name: value` mapping in a JSON or YAML file, e.g. the output of
/// `aws ssm get-parameters` reshaped by the CdkBuild project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileParameterStore {
    path: PathBuf,
}

impl FileParameterStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileParameterStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Files named `*.yaml` or `*.yml` are written back as YAML, anything
    /// else as JSON.
    fn writes_yaml(&self) -> bool {
        matches!(
            self.path.extension().and_then(|extension| extension.to_str()),
            Some("yaml") | Some("yml")
        )
    }

    fn read_entries(&self) -> Result<IndexMap<String, String>> {
        if !self.path.exists() {
            return Err(Error::FileNotFoundError(self.path.display().to_string()));
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(IndexMap::new());
        }
        let raw: IndexMap<String, serde_yaml::Value> = serde_yaml::from_str(&content)?;
        raw.into_iter()
            .map(|(name, value)| match value {
                serde_yaml::Value::String(s) => Ok((name, s)),
                serde_yaml::Value::Number(n) => Ok((name, n.to_string())),
                serde_yaml::Value::Bool(b) => Ok((name, b.to_string())),
                _ => Err(Error::IllegalArguments(format!(
                    "parameter `{name}` in {} is not a plain string value",
                    self.path.display()
                ))),
            })
            .collect()
    }
}

impl ParameterStore for FileParameterStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let entries = self.read_entries()?;
        log::debug!(
            "looked up parameter {} in {}",
            name,
            self.path.display()
        );
        Ok(entries.get(name).cloned())
    }

    fn put(&mut self, name: &str, value: &str, overwrite: bool) -> Result<()> {
        let mut entries = if self.path.exists() {
            self.read_entries()?
        } else {
            IndexMap::new()
        };
        if !overwrite && entries.contains_key(name) {
            return Err(Error::ParameterExists(name.to_string()));
        }
        entries.insert(name.to_string(), value.to_string());
        let content = if self.writes_yaml() {
            serde_yaml::to_string(&entries)?
        } else {
            serde_json::to_string_pretty(&entries)?
        };
        fs::write(&self.path, content)?;
        log::info!("recorded parameter {} in {}", name, self.path.display());
        Ok(())
    }
}

/// Reads parameters from environment variables of the same name, which is
/// how a CodeBuild project exposes `parameter-store` env entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvParameterStore;

impl ParameterStore for EnvParameterStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(std::env::var(name).ok().filter(|value| !value.is_empty()))
    }

    fn put(&mut self, name: &str, _value: &str, _overwrite: bool) -> Result<()> {
        Err(Error::IllegalArguments(format!(
            "environment parameter store is read-only, cannot write `{name}`"
        )))
    }
}

#[cfg(test)]
#[path = "parameters_tests.rs"]
mod parameters_tests;
