//! Scope guards pairing creation calls with their destroy calls.
//!
//! These are optional: the raw table works without them, and nothing stops a
//! caller from destroying a context through [`OwnedContext::raw`] while guards
//! still refer to it. What they do provide is that dropping the guard runs the
//! matching `mlir*Destroy` call exactly once, and that a module cannot outlive
//! the borrow of the context it was created in.

use core::fmt;
use core::marker::PhantomData;

use mlir_capi_sys::{
    Capi, MlirBlock, MlirContext, MlirDialectRegistry, MlirLocation, MlirModule,
    MlirOpPrintingFlags, MlirOperation, MlirStringRef,
};

use crate::dialects::register_all_upstream_dialects;
use crate::error::Result;
use crate::support;

/// An `MlirContext` destroyed on drop.
pub struct OwnedContext<'a> {
    capi: &'a Capi,
    raw: MlirContext,
}

impl<'a> OwnedContext<'a> {
    pub fn new(capi: &'a Capi) -> Self {
        let raw = unsafe { capi.mlirContextCreate() };
        Self { capi, raw }
    }

    /// A new context with every upstream dialect registered.
    pub fn with_upstream_dialects(capi: &'a Capi) -> Self {
        let context = Self::new(capi);
        unsafe { register_all_upstream_dialects(capi, context.raw) };
        context
    }

    pub fn capi(&self) -> &'a Capi {
        self.capi
    }

    pub fn raw(&self) -> MlirContext {
        self.raw
    }

    /// Gives up ownership; the caller becomes responsible for destroying it.
    pub fn into_raw(self) -> MlirContext {
        let raw = self.raw;
        core::mem::forget(self);
        raw
    }

    pub fn unknown_location(&self) -> MlirLocation {
        unsafe { self.capi.mlirLocationUnknownGet(self.raw) }
    }

    pub fn file_location(&self, filename: &str, line: u32, column: u32) -> MlirLocation {
        unsafe {
            self.capi
                .mlirLocationFileLineColGet(self.raw, MlirStringRef::new(filename), line, column)
        }
    }

    pub fn set_allow_unregistered_dialects(&self, allow: bool) {
        unsafe { self.capi.mlirContextSetAllowUnregisteredDialects(self.raw, allow) }
    }

    pub fn loaded_dialect_count(&self) -> usize {
        unsafe { self.capi.mlirContextGetNumLoadedDialects(self.raw) as usize }
    }

    pub fn registered_dialect_count(&self) -> usize {
        unsafe { self.capi.mlirContextGetNumRegisteredDialects(self.raw) as usize }
    }
}

impl Drop for OwnedContext<'_> {
    fn drop(&mut self) {
        unsafe { self.capi.mlirContextDestroy(self.raw) }
    }
}

impl fmt::Debug for OwnedContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedContext").field(&self.raw.ptr).finish()
    }
}

/// An `MlirModule` destroyed on drop, borrowing the context it lives in.
pub struct OwnedModule<'c> {
    capi: &'c Capi,
    raw: MlirModule,
    _context: PhantomData<&'c OwnedContext<'c>>,
}

impl<'c> OwnedModule<'c> {
    /// An empty module at an unknown location in `context`.
    pub fn empty(context: &'c OwnedContext<'_>) -> Self {
        unsafe { Self::new(context, context.unknown_location()) }
    }

    /// An empty module at `location`.
    ///
    /// # Safety
    ///
    /// `location` must be live and belong to `context`.
    ///
    /// ```compile_fail,E0133
    /// use mlir_capi::{OwnedContext, OwnedModule};
    /// use mlir_capi::sys::MlirLocation;
    ///
    /// fn module_at(context: &OwnedContext<'_>) {
    ///     let _ = OwnedModule::new(context, MlirLocation::null());
    /// }
    /// ```
    pub unsafe fn new(context: &'c OwnedContext<'_>, location: MlirLocation) -> Self {
        let raw = unsafe { context.capi().mlirModuleCreateEmpty(location) };
        Self::from_raw_parts(context, raw)
    }

    pub fn parse(context: &'c OwnedContext<'_>, source: &str) -> Result<Self> {
        let raw = unsafe { support::parse_module(context.capi(), context.raw(), source)? };
        Ok(Self::from_raw_parts(context, raw))
    }

    fn from_raw_parts(context: &'c OwnedContext<'_>, raw: MlirModule) -> Self {
        Self {
            capi: context.capi(),
            raw,
            _context: PhantomData,
        }
    }

    pub fn raw(&self) -> MlirModule {
        self.raw
    }

    pub fn body(&self) -> MlirBlock {
        unsafe { self.capi.mlirModuleGetBody(self.raw) }
    }

    /// The `builtin.module` operation wrapping the body.
    pub fn as_operation(&self) -> MlirOperation {
        unsafe { self.capi.mlirModuleGetOperation(self.raw) }
    }

    pub fn verify(&self) -> bool {
        unsafe { self.capi.mlirOperationVerify(self.as_operation()) }
    }

    /// Gives up ownership, e.g. before nesting the module into another operation.
    pub fn into_raw(self) -> MlirModule {
        let raw = self.raw;
        core::mem::forget(self);
        raw
    }
}

impl Drop for OwnedModule<'_> {
    fn drop(&mut self) {
        unsafe { self.capi.mlirModuleDestroy(self.raw) }
    }
}

impl fmt::Display for OwnedModule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&unsafe { support::operation_to_string(self.capi, self.as_operation()) })
    }
}

impl fmt::Debug for OwnedModule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedModule").field(&self.raw.ptr).finish()
    }
}

/// An `MlirDialectRegistry` destroyed on drop.
pub struct OwnedDialectRegistry<'a> {
    capi: &'a Capi,
    raw: MlirDialectRegistry,
}

impl<'a> OwnedDialectRegistry<'a> {
    pub fn new(capi: &'a Capi) -> Self {
        let raw = unsafe { capi.mlirDialectRegistryCreate() };
        Self { capi, raw }
    }

    pub fn raw(&self) -> MlirDialectRegistry {
        self.raw
    }

    pub fn register_all(&self) {
        unsafe { self.capi.mlirRegisterAllDialects(self.raw) }
    }

    /// Copies the registered dialects into `context`.
    pub fn append_to(&self, context: &OwnedContext<'_>) {
        unsafe { self.capi.mlirContextAppendDialectRegistry(context.raw(), self.raw) }
    }
}

impl Drop for OwnedDialectRegistry<'_> {
    fn drop(&mut self) {
        unsafe { self.capi.mlirDialectRegistryDestroy(self.raw) }
    }
}

/// Printing options for `mlirOperationPrintWithFlags`, destroyed on drop.
pub struct OwnedPrintingFlags<'a> {
    capi: &'a Capi,
    raw: MlirOpPrintingFlags,
}

impl<'a> OwnedPrintingFlags<'a> {
    pub fn new(capi: &'a Capi) -> Self {
        let raw = unsafe { capi.mlirOpPrintingFlagsCreate() };
        Self { capi, raw }
    }

    pub fn raw(&self) -> MlirOpPrintingFlags {
        self.raw
    }

    /// Print every operation in the generic `"dialect.op"(...)` form.
    pub fn generic_form(self) -> Self {
        unsafe { self.capi.mlirOpPrintingFlagsPrintGenericOpForm(self.raw) };
        self
    }

    pub fn debug_info(self, pretty_form: bool) -> Self {
        unsafe { self.capi.mlirOpPrintingFlagsEnableDebugInfo(self.raw, true, pretty_form) };
        self
    }

    /// # Safety
    ///
    /// `operation` must be a live operation.
    pub unsafe fn print(&self, operation: MlirOperation) -> String {
        unsafe { support::operation_to_string_with_flags(self.capi, operation, self.raw) }
    }
}

impl Drop for OwnedPrintingFlags<'_> {
    fn drop(&mut self) {
        unsafe { self.capi.mlirOpPrintingFlagsDestroy(self.raw) }
    }
}
