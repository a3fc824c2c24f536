// Copyright 2025 Cowboy AI, LLC.

//! Schema backend resolution
//!
//! The backend is resolved lazily, on the first `schema()` call anywhere in
//! the process, never at load time. Resolution runs the configured
//! [`BackendLoader`]; a success is kept for every later call, a failure is
//! returned to the caller and nothing is kept, so a later call retries.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::errors::SchemaResult;
use crate::guard::GuardId;
use crate::schema::SchemaNode;

/// Renders backend-neutral schema nodes into a concrete document
#[cfg_attr(test, mockall::automock)]
pub trait SchemaBackend: Send + Sync {
    /// Backend name, reported in errors and on rendered schemas
    fn name(&self) -> String;

    /// Render `root`; `definitions` holds nodes referenced through `SchemaNode::Reference`
    fn render(
        &self,
        root: &SchemaNode,
        definitions: &BTreeMap<GuardId, SchemaNode>,
    ) -> SchemaResult<serde_json::Value>;
}

/// Produces the backend on first use
pub type BackendLoader = fn() -> SchemaResult<Arc<dyn SchemaBackend>>;

struct BackendSlot {
    resolved: Option<Arc<dyn SchemaBackend>>,
    loader: BackendLoader,
}

static SLOT: RwLock<BackendSlot> = RwLock::new(BackendSlot {
    resolved: None,
    loader: default_loader,
});

fn read_slot() -> RwLockReadGuard<'static, BackendSlot> {
    SLOT.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_slot() -> RwLockWriteGuard<'static, BackendSlot> {
    SLOT.write().unwrap_or_else(PoisonError::into_inner)
}

/// The loader used unless [`set_backend_loader`] replaced it
///
/// Yields the JSON Schema backend when the `json-schema` feature is enabled.
pub fn default_loader() -> SchemaResult<Arc<dyn SchemaBackend>> {
    #[cfg(feature = "json-schema")]
    {
        Ok(Arc::new(crate::schema::json::JsonSchemaBackend::new()))
    }
    #[cfg(not(feature = "json-schema"))]
    {
        Err(crate::errors::SchemaError::unavailable(
            "json-schema",
            "cim-typeguard was built without the `json-schema` feature",
        ))
    }
}

/// Return the active backend, loading it on first use
pub fn resolve_backend() -> SchemaResult<Arc<dyn SchemaBackend>> {
    let loader = {
        let slot = read_slot();
        if let Some(backend) = &slot.resolved {
            return Ok(backend.clone());
        }
        slot.loader
    };

    match loader() {
        Ok(loaded) => {
            let mut slot = write_slot();
            let backend = slot.resolved.get_or_insert(loaded).clone();
            debug!(backend = %backend.name(), "Resolved schema backend");
            Ok(backend)
        }
        Err(err) => {
            warn!(error = %err, "Schema backend could not be resolved");
            Err(err)
        }
    }
}

/// Use `backend` from now on
pub fn install_backend(backend: Arc<dyn SchemaBackend>) {
    debug!(backend = %backend.name(), "Installed schema backend");
    write_slot().resolved = Some(backend);
}

/// Replace the loader and forget any resolved backend
pub fn set_backend_loader(loader: BackendLoader) {
    let mut slot = write_slot();
    slot.resolved = None;
    slot.loader = loader;
}

/// Forget any resolved backend and restore [`default_loader`]
pub fn reset_backend() {
    set_backend_loader(default_loader);
}
