//! `#[repr(C)]` mirrors of the structs in the MLIR C API headers.
//!
//! Every opaque MLIR object is passed across the C boundary as a struct with a
//! single pointer field. These records carry no behavior beyond null checks:
//! the native library owns the objects they point to, and nothing here tracks
//! whether a handle is still alive.

use core::ffi::{c_char, c_void};
use core::mem::{align_of, size_of};

macro_rules! opaque_handles {
    (@ptr mut) => { *mut c_void };
    (@ptr const) => { *const c_void };
    ($( $(#[$meta:meta])* $name:ident($qual:tt); )*) => {
        $(
            $(#[$meta])*
            #[repr(C)]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name {
                pub ptr: opaque_handles!(@ptr $qual),
            }

            impl $name {
                /// The null handle, as returned by a failed foreign call.
                pub const fn null() -> Self {
                    Self { ptr: core::ptr::null_mut::<c_void>() as _ }
                }

                pub fn is_null(self) -> bool {
                    self.ptr.is_null()
                }
            }

            const _: () = assert!(size_of::<$name>() == size_of::<*mut c_void>());
            const _: () = assert!(align_of::<$name>() == align_of::<*mut c_void>());
        )*

        /// Names of every opaque handle record, in declaration order.
        pub const HANDLE_TYPES: &[&str] = &[$(stringify!($name)),*];
    };
}

opaque_handles! {
    MlirAsmState(mut);
    MlirBytecodeWriterConfig(mut);
    /// Top-level registry owning dialect registrations and interned objects.
    MlirContext(mut);
    MlirDialect(mut);
    MlirDialectRegistry(mut);
    MlirOperation(mut);
    MlirOpOperand(mut);
    MlirOpPrintingFlags(mut);
    MlirBlock(mut);
    MlirRegion(mut);
    MlirSymbolTable(mut);
    MlirAttribute(const);
    MlirIdentifier(const);
    MlirLocation(const);
    MlirModule(mut);
    MlirType(const);
    /// An SSA value: either an operation result or a block argument.
    MlirValue(const);
}

/// A non-owning reference to a string, not necessarily NUL-terminated.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MlirStringRef {
    pub data: *const c_char,
    pub length: usize,
}

impl MlirStringRef {
    /// Borrows `s` without copying. The result is only valid while `s` lives.
    pub fn new(s: &str) -> Self {
        Self {
            data: s.as_ptr().cast(),
            length: s.len(),
        }
    }

    pub fn is_empty(self) -> bool {
        self.length == 0
    }

    /// # Safety
    ///
    /// `data` must point to `length` readable bytes that outlive `'a`.
    pub unsafe fn as_bytes<'a>(self) -> &'a [u8] {
        if self.data.is_null() || self.length == 0 {
            return &[];
        }
        unsafe { core::slice::from_raw_parts(self.data.cast::<u8>(), self.length) }
    }

    /// # Safety
    ///
    /// Same requirements as [`MlirStringRef::as_bytes`].
    pub unsafe fn to_string_lossy(self) -> String {
        String::from_utf8_lossy(unsafe { self.as_bytes() }).into_owned()
    }
}

/// An `(identifier, attribute)` pair attached to an operation.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MlirNamedAttribute {
    pub name: MlirIdentifier,
    pub attribute: MlirAttribute,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MlirLogicalResult {
    pub value: i8,
}

impl MlirLogicalResult {
    pub const fn success() -> Self {
        Self { value: 1 }
    }

    pub const fn failure() -> Self {
        Self { value: 0 }
    }

    pub fn is_success(self) -> bool {
        self.value != 0
    }

    pub fn is_failure(self) -> bool {
        self.value == 0
    }
}

/// Mutable builder accumulating everything needed to create an operation.
///
/// Field order matches `struct MlirOperationState` in `mlir-c/IR.h`. The
/// arrays are owned by the native side once filled through the
/// `mlirOperationStateAdd*` functions, and released by `mlirOperationCreate`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
#[allow(non_snake_case)]
pub struct MlirOperationState {
    pub name: MlirStringRef,
    pub location: MlirLocation,
    pub nResults: isize,
    pub results: *mut MlirType,
    pub nOperands: isize,
    pub operands: *mut MlirValue,
    pub nRegions: isize,
    pub regions: *mut MlirRegion,
    pub nSuccessors: isize,
    pub successors: *mut MlirBlock,
    pub nAttributes: isize,
    pub attributes: *mut MlirNamedAttribute,
    pub enableResultTypeInference: bool,
}

/// Receives printed output in chunks, together with the caller's user data.
pub type MlirStringCallback = unsafe extern "C" fn(MlirStringRef, *mut c_void);

const _: () = assert!(size_of::<MlirStringRef>() == 2 * size_of::<usize>());
const _: () = assert!(size_of::<MlirNamedAttribute>() == 2 * size_of::<*mut c_void>());
const _: () = assert!(size_of::<MlirLogicalResult>() == 1);
