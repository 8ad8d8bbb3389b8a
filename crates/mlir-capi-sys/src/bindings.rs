//! The function binding table.
//!
//! Each entry names one exported symbol of the MLIR C API together with its
//! signature. The table is resolved against the shared library once, in full,
//! so a missing symbol is reported at load time rather than at first call.
//! Calls forward their arguments by value and return the foreign result by
//! value; nothing is checked on the way through.

use core::ffi::{c_char, c_uint, c_void};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use libloading::Library;

use crate::error::{LoadAttempt, LoadError, Result};
use crate::library::LibraryConfig;
use crate::types::*;

macro_rules! capi_table {
    ($(
        $(#[$meta:meta])*
        fn $name:ident($($arg:ident: $ty:ty),* $(,)?) $(-> $ret:ty)?;
    )*) => {
        /// A loaded MLIR C library with every bound symbol resolved.
        ///
        /// Forwarding methods are named after the C symbols they call.
        #[allow(non_snake_case)]
        pub struct Capi {
            path: PathBuf,
            $( $name: unsafe extern "C" fn($($ty),*) $(-> $ret)?, )*
            // Dropped last so the function pointers never outlive the mapping.
            _library: Library,
        }

        impl Capi {
            /// Every bound symbol, in table order.
            pub const SYMBOLS: &'static [&'static str] = &[$(stringify!($name)),*];

            #[allow(non_snake_case)]
            fn resolve(library: Library, path: PathBuf) -> Result<Self> {
                $(
                    let $name = unsafe {
                        resolve_symbol::<unsafe extern "C" fn($($ty),*) $(-> $ret)?>(
                            &library,
                            &path,
                            stringify!($name),
                        )?
                    };
                )*
                Ok(Self { path, $($name,)* _library: library })
            }

            $(
                $(#[$meta])*
                ///
                /// # Safety
                ///
                /// Arguments are passed to the native function unchecked. Handles
                /// must be live and belong to a context that has not been destroyed.
                #[allow(non_snake_case, clippy::too_many_arguments)]
                #[inline]
                pub unsafe fn $name(&self, $($arg: $ty),*) $(-> $ret)? {
                    unsafe { (self.$name)($($arg),*) }
                }
            )*
        }
    };
}

/// # Safety
///
/// `F` must be the exact function pointer type of `symbol`.
unsafe fn resolve_symbol<F: Copy>(library: &Library, path: &Path, symbol: &'static str) -> Result<F> {
    let resolved = unsafe { library.get::<F>(symbol.as_bytes()) };
    match resolved {
        Ok(function) => Ok(*function),
        Err(source) => Err(LoadError::MissingSymbol {
            symbol,
            library: path.to_path_buf(),
            source,
        }),
    }
}

capi_table! {
    // Support
    /// Builds a string reference over a NUL-terminated C string.
    fn mlirStringRefCreateFromCString(string: *const c_char) -> MlirStringRef;

    // Context
    fn mlirContextCreate() -> MlirContext;
    fn mlirContextDestroy(context: MlirContext);
    fn mlirContextEqual(lhs: MlirContext, rhs: MlirContext) -> bool;
    fn mlirContextAppendDialectRegistry(context: MlirContext, registry: MlirDialectRegistry);
    /// Returns a null dialect when no dialect of that name is registered.
    fn mlirContextGetOrLoadDialect(context: MlirContext, name: MlirStringRef) -> MlirDialect;
    fn mlirContextGetNumLoadedDialects(context: MlirContext) -> isize;
    fn mlirContextGetNumRegisteredDialects(context: MlirContext) -> isize;
    fn mlirContextLoadAllAvailableDialects(context: MlirContext);
    fn mlirContextSetAllowUnregisteredDialects(context: MlirContext, allow: bool);
    fn mlirContextGetAllowUnregisteredDialects(context: MlirContext) -> bool;

    // Dialects
    fn mlirDialectGetNamespace(dialect: MlirDialect) -> MlirStringRef;
    fn mlirDialectRegistryCreate() -> MlirDialectRegistry;
    fn mlirDialectRegistryDestroy(registry: MlirDialectRegistry);
    /// Adds every upstream dialect to `registry`.
    fn mlirRegisterAllDialects(registry: MlirDialectRegistry);

    // Locations
    fn mlirLocationUnknownGet(context: MlirContext) -> MlirLocation;
    fn mlirLocationFileLineColGet(
        context: MlirContext,
        filename: MlirStringRef,
        line: c_uint,
        column: c_uint,
    ) -> MlirLocation;

    // Modules
    fn mlirModuleCreateEmpty(location: MlirLocation) -> MlirModule;
    /// Returns a null module when `module` does not parse.
    fn mlirModuleCreateParse(context: MlirContext, module: MlirStringRef) -> MlirModule;
    fn mlirModuleGetBody(module: MlirModule) -> MlirBlock;
    fn mlirModuleGetOperation(module: MlirModule) -> MlirOperation;
    fn mlirModuleFromOperation(operation: MlirOperation) -> MlirModule;
    fn mlirModuleGetContext(module: MlirModule) -> MlirContext;
    fn mlirModuleDestroy(module: MlirModule);

    // Operation state
    fn mlirOperationStateGet(name: MlirStringRef, location: MlirLocation) -> MlirOperationState;
    fn mlirOperationStateAddResults(state: *mut MlirOperationState, n: isize, results: *const MlirType);
    fn mlirOperationStateAddOperands(state: *mut MlirOperationState, n: isize, operands: *const MlirValue);
    /// Transfers ownership of the regions to the operation being built.
    fn mlirOperationStateAddOwnedRegions(state: *mut MlirOperationState, n: isize, regions: *const MlirRegion);
    fn mlirOperationStateAddSuccessors(state: *mut MlirOperationState, n: isize, successors: *const MlirBlock);
    fn mlirOperationStateAddAttributes(
        state: *mut MlirOperationState,
        n: isize,
        attributes: *const MlirNamedAttribute,
    );
    fn mlirOperationStateEnableResultTypeInference(state: *mut MlirOperationState);

    // Operations
    /// Consumes the state's arrays. Returns a null operation on failure.
    fn mlirOperationCreate(state: *mut MlirOperationState) -> MlirOperation;
    fn mlirOperationDestroy(operation: MlirOperation);
    fn mlirOperationGetName(operation: MlirOperation) -> MlirIdentifier;
    fn mlirOperationGetNumResults(operation: MlirOperation) -> isize;
    fn mlirOperationGetResult(operation: MlirOperation, position: isize) -> MlirValue;
    fn mlirOperationGetNumRegions(operation: MlirOperation) -> isize;
    fn mlirOperationGetRegion(operation: MlirOperation, position: isize) -> MlirRegion;
    fn mlirOperationVerify(operation: MlirOperation) -> bool;
    fn mlirOperationDump(operation: MlirOperation);
    fn mlirOperationPrint(operation: MlirOperation, callback: MlirStringCallback, user_data: *mut c_void);
    fn mlirOperationPrintWithFlags(
        operation: MlirOperation,
        flags: MlirOpPrintingFlags,
        callback: MlirStringCallback,
        user_data: *mut c_void,
    );

    // Printing flags
    fn mlirOpPrintingFlagsCreate() -> MlirOpPrintingFlags;
    fn mlirOpPrintingFlagsDestroy(flags: MlirOpPrintingFlags);
    fn mlirOpPrintingFlagsEnableDebugInfo(flags: MlirOpPrintingFlags, enable: bool, pretty_form: bool);
    fn mlirOpPrintingFlagsPrintGenericOpForm(flags: MlirOpPrintingFlags);

    // Regions
    fn mlirRegionCreate() -> MlirRegion;
    fn mlirRegionDestroy(region: MlirRegion);
    /// Transfers ownership of `block` to `region`.
    fn mlirRegionAppendOwnedBlock(region: MlirRegion, block: MlirBlock);
    fn mlirRegionGetFirstBlock(region: MlirRegion) -> MlirBlock;

    // Blocks
    /// `args` and `locations` must both hold `n_args` elements.
    fn mlirBlockCreate(n_args: isize, args: *const MlirType, locations: *const MlirLocation) -> MlirBlock;
    fn mlirBlockDestroy(block: MlirBlock);
    fn mlirBlockAppendOwnedOperation(block: MlirBlock, operation: MlirOperation);
    fn mlirBlockInsertOwnedOperation(block: MlirBlock, position: isize, operation: MlirOperation);
    fn mlirBlockGetNumArguments(block: MlirBlock) -> isize;
    fn mlirBlockGetArgument(block: MlirBlock, position: isize) -> MlirValue;
    fn mlirBlockAddArgument(block: MlirBlock, ty: MlirType, location: MlirLocation) -> MlirValue;
    fn mlirBlockGetFirstOperation(block: MlirBlock) -> MlirOperation;

    // Values
    fn mlirValueGetType(value: MlirValue) -> MlirType;
    fn mlirValueDump(value: MlirValue);
    fn mlirValueIsABlockArgument(value: MlirValue) -> bool;
    fn mlirValueIsAOpResult(value: MlirValue) -> bool;

    // Types
    /// Returns a null type when `ty` does not parse.
    fn mlirTypeParseGet(context: MlirContext, ty: MlirStringRef) -> MlirType;
    fn mlirTypeEqual(lhs: MlirType, rhs: MlirType) -> bool;
    fn mlirTypeDump(ty: MlirType);
    fn mlirTypePrint(ty: MlirType, callback: MlirStringCallback, user_data: *mut c_void);
    fn mlirIndexTypeGet(context: MlirContext) -> MlirType;
    fn mlirF32TypeGet(context: MlirContext) -> MlirType;
    fn mlirIntegerTypeGet(context: MlirContext, bitwidth: c_uint) -> MlirType;
    fn mlirFunctionTypeGet(
        context: MlirContext,
        n_inputs: isize,
        inputs: *const MlirType,
        n_results: isize,
        results: *const MlirType,
    ) -> MlirType;

    // Attributes
    /// Returns a null attribute when `attr` does not parse.
    fn mlirAttributeParseGet(context: MlirContext, attr: MlirStringRef) -> MlirAttribute;
    fn mlirAttributeEqual(lhs: MlirAttribute, rhs: MlirAttribute) -> bool;
    fn mlirAttributeGetType(attr: MlirAttribute) -> MlirType;
    fn mlirAttributeDump(attr: MlirAttribute);
    fn mlirAttributePrint(attr: MlirAttribute, callback: MlirStringCallback, user_data: *mut c_void);
    fn mlirTypeAttrGet(ty: MlirType) -> MlirAttribute;
    fn mlirStringAttrGet(context: MlirContext, value: MlirStringRef) -> MlirAttribute;
    fn mlirNamedAttributeGet(name: MlirIdentifier, attr: MlirAttribute) -> MlirNamedAttribute;

    // Identifiers
    fn mlirIdentifierGet(context: MlirContext, name: MlirStringRef) -> MlirIdentifier;
    fn mlirIdentifierStr(ident: MlirIdentifier) -> MlirStringRef;

    // Symbol tables
    fn mlirSymbolTableCreate(operation: MlirOperation) -> MlirSymbolTable;
    fn mlirSymbolTableDestroy(table: MlirSymbolTable);
    fn mlirSymbolTableLookup(table: MlirSymbolTable, name: MlirStringRef) -> MlirOperation;
}

impl Capi {
    /// Opens the first loadable candidate from `config` and resolves the table.
    pub fn load(config: &LibraryConfig) -> Result<Self> {
        let mut attempts = Vec::new();
        for path in config.candidates() {
            match unsafe { Library::new(&path) } {
                Ok(library) => {
                    tracing::debug!(path = %path.display(), "opened MLIR C library");
                    let capi = Self::resolve(library, path)?;
                    tracing::debug!(symbols = Self::SYMBOLS.len(), "resolved MLIR C API table");
                    return Ok(capi);
                }
                Err(reason) => {
                    tracing::debug!(path = %path.display(), %reason, "candidate library did not open");
                    attempts.push(LoadAttempt { path, reason });
                }
            }
        }
        let name = config.name.to_string_lossy().into_owned();
        tracing::warn!(%name, tried = attempts.len(), "MLIR C library not found");
        Err(LoadError::LibraryNotFound {
            name,
            attempts,
        })
    }

    /// The process-wide table, configured from the environment on first use.
    ///
    /// The outcome of the first load, success or failure, is kept for the
    /// lifetime of the process.
    pub fn global() -> std::result::Result<&'static Capi, &'static LoadError> {
        static GLOBAL: OnceLock<Result<Capi>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Capi::load(&LibraryConfig::from_env()))
            .as_ref()
    }

    /// The file this table was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Capi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capi")
            .field("path", &self.path)
            .field("symbols", &Self::SYMBOLS.len())
            .finish()
    }
}
