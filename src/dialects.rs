//! Registering and loading upstream dialects.

use mlir_capi_sys::{Capi, MlirContext, MlirDialect, MlirStringRef};

use crate::error::{Error, Result};

/// Upstream dialects the builder and scenarios rely on.
pub const UPSTREAM_DIALECTS: &[&str] = &["arith", "builtin", "cf", "func", "memref", "scf", "shape"];

/// Makes every upstream dialect available to `context`.
///
/// Creates a temporary registry, fills it with every upstream dialect, appends
/// it to the context and destroys it again. Safe to repeat on the same
/// context: each call works with its own registry. Dialects are registered,
/// not loaded; use [`load_dialect`] or `mlirContextGetOrLoadDialect` to load
/// one.
///
/// # Safety
///
/// `context` must be a live context.
pub unsafe fn register_all_upstream_dialects(capi: &Capi, context: MlirContext) {
    unsafe {
        let registry = capi.mlirDialectRegistryCreate();
        capi.mlirRegisterAllDialects(registry);
        capi.mlirContextAppendDialectRegistry(context, registry);
        capi.mlirDialectRegistryDestroy(registry);
    }
    tracing::debug!("registered all upstream dialects");
}

/// Loads the dialect called `name`, which must already be registered.
///
/// # Safety
///
/// `context` must be a live context.
pub unsafe fn load_dialect(capi: &Capi, context: MlirContext, name: &str) -> Result<MlirDialect> {
    let dialect = unsafe { capi.mlirContextGetOrLoadDialect(context, MlirStringRef::new(name)) };
    if dialect.is_null() {
        return Err(Error::UnknownDialect(name.to_string()));
    }
    tracing::trace!(dialect = name, "loaded dialect");
    Ok(dialect)
}

/// Loads each of `names`, stopping at the first unknown one.
///
/// # Safety
///
/// `context` must be a live context.
pub unsafe fn load_dialects<'n>(
    capi: &Capi,
    context: MlirContext,
    names: impl IntoIterator<Item = &'n str>,
) -> Result<Vec<MlirDialect>> {
    names
        .into_iter()
        .map(|name| unsafe { load_dialect(capi, context, name) })
        .collect()
}

/// The namespace a loaded dialect was registered under.
///
/// # Safety
///
/// `dialect` must be a live, non-null dialect.
pub unsafe fn dialect_namespace(capi: &Capi, dialect: MlirDialect) -> String {
    unsafe { capi.mlirDialectGetNamespace(dialect).to_string_lossy() }
}
