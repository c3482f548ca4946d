// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Execution-engine contract consumed by the background preloader.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::RwLock;

use upload_kernel::types::Archive;

use crate::errors::EngineError;

/// Engine-side package identity. Archives are content addressed, so a
/// package is known by its archive hash before anything is decoded.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageId(pub String);

impl PackageId {
    pub fn of(archive: &Archive) -> Self {
        PackageId(archive.hash.as_str().to_string())
    }
}

impl From<&str> for PackageId {
    fn from(s: &str) -> Self {
        PackageId(s.to_string())
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedPackage(pub Vec<u8>);

pub trait ExecutionEngine: Send + Sync {
    fn loaded_package_ids(&self) -> BTreeSet<PackageId>;

    fn decode(&self, archive: &Archive) -> Result<DecodedPackage, EngineError>;

    fn preload(&self, id: PackageId, package: DecodedPackage) -> Result<(), EngineError>;
}

/// Reference engine: a package is its payload.
#[derive(Default)]
pub struct MemoryEngine {
    packages: RwLock<HashMap<PackageId, DecodedPackage>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self, id: &PackageId) -> bool {
        self.packages
            .read()
            .map(|p| p.contains_key(id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.packages.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ExecutionEngine for MemoryEngine {
    fn loaded_package_ids(&self) -> BTreeSet<PackageId> {
        match self.packages.read() {
            Ok(p) => p.keys().cloned().collect(),
            Err(_) => {
                tracing::warn!("Engine package cache lock poisoned; reporting nothing loaded");
                BTreeSet::new()
            }
        }
    }

    fn decode(&self, archive: &Archive) -> Result<DecodedPackage, EngineError> {
        if archive.payload.is_empty() {
            return Err(EngineError::Decode(format!("archive {} has no payload", archive.hash)));
        }
        Ok(DecodedPackage(archive.payload.clone()))
    }

    fn preload(&self, id: PackageId, package: DecodedPackage) -> Result<(), EngineError> {
        let mut packages = self
            .packages
            .write()
            .map_err(|_| EngineError::Preload("package cache lock poisoned".to_string()))?;
        packages.insert(id, package);
        Ok(())
    }
}
