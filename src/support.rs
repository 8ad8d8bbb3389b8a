//! String plumbing: printing through callbacks and null-checked parsing.

use core::ffi::c_void;

use mlir_capi_sys::{
    Capi, MlirAttribute, MlirContext, MlirIdentifier, MlirModule, MlirOpPrintingFlags,
    MlirOperation, MlirStringCallback, MlirStringRef, MlirType,
};

use crate::error::{Error, ParseKind, Result};

unsafe extern "C" fn append_chunk(chunk: MlirStringRef, user_data: *mut c_void) {
    let buffer = unsafe { &mut *user_data.cast::<Vec<u8>>() };
    buffer.extend_from_slice(unsafe { chunk.as_bytes() });
}

/// Collects everything a `mlir*Print` function streams into its callback.
///
/// `print` receives the callback and the user-data pointer to forward to the
/// foreign function. Invalid UTF-8 is replaced rather than rejected.
pub fn print_to_string(print: impl FnOnce(MlirStringCallback, *mut c_void)) -> String {
    let mut buffer: Vec<u8> = Vec::new();
    print(append_chunk, (&mut buffer as *mut Vec<u8>).cast());
    match String::from_utf8(buffer) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

/// # Safety
///
/// `operation` must be a live operation handle.
pub unsafe fn operation_to_string(capi: &Capi, operation: MlirOperation) -> String {
    print_to_string(|callback, user_data| unsafe {
        capi.mlirOperationPrint(operation, callback, user_data)
    })
}

/// # Safety
///
/// `operation` and `flags` must be live handles.
pub unsafe fn operation_to_string_with_flags(
    capi: &Capi,
    operation: MlirOperation,
    flags: MlirOpPrintingFlags,
) -> String {
    print_to_string(|callback, user_data| unsafe {
        capi.mlirOperationPrintWithFlags(operation, flags, callback, user_data)
    })
}

/// # Safety
///
/// `ty` must be a live type handle.
pub unsafe fn type_to_string(capi: &Capi, ty: MlirType) -> String {
    print_to_string(|callback, user_data| unsafe { capi.mlirTypePrint(ty, callback, user_data) })
}

/// # Safety
///
/// `attr` must be a live attribute handle.
pub unsafe fn attribute_to_string(capi: &Capi, attr: MlirAttribute) -> String {
    print_to_string(|callback, user_data| unsafe {
        capi.mlirAttributePrint(attr, callback, user_data)
    })
}

/// # Safety
///
/// `ident` must be a live identifier handle.
pub unsafe fn identifier_to_string(capi: &Capi, ident: MlirIdentifier) -> String {
    unsafe { capi.mlirIdentifierStr(ident).to_string_lossy() }
}

/// Parses a type, turning the native null result into an error.
///
/// # Safety
///
/// `context` must be a live context.
pub unsafe fn parse_type(capi: &Capi, context: MlirContext, source: &str) -> Result<MlirType> {
    let ty = unsafe { capi.mlirTypeParseGet(context, MlirStringRef::new(source)) };
    if ty.is_null() {
        return Err(parse_error(ParseKind::Type, source));
    }
    Ok(ty)
}

/// Parses an attribute, turning the native null result into an error.
///
/// # Safety
///
/// `context` must be a live context.
pub unsafe fn parse_attribute(
    capi: &Capi,
    context: MlirContext,
    source: &str,
) -> Result<MlirAttribute> {
    let attr = unsafe { capi.mlirAttributeParseGet(context, MlirStringRef::new(source)) };
    if attr.is_null() {
        return Err(parse_error(ParseKind::Attribute, source));
    }
    Ok(attr)
}

/// Parses a whole module from text. The caller owns the returned module.
///
/// # Safety
///
/// `context` must be a live context.
pub unsafe fn parse_module(capi: &Capi, context: MlirContext, source: &str) -> Result<MlirModule> {
    let module = unsafe { capi.mlirModuleCreateParse(context, MlirStringRef::new(source)) };
    if module.is_null() {
        return Err(parse_error(ParseKind::Module, source));
    }
    Ok(module)
}

/// Interns `name` in `context`.
///
/// # Safety
///
/// `context` must be a live context.
pub unsafe fn identifier(capi: &Capi, context: MlirContext, name: &str) -> MlirIdentifier {
    unsafe { capi.mlirIdentifierGet(context, MlirStringRef::new(name)) }
}

fn parse_error(kind: ParseKind, source: &str) -> Error {
    tracing::debug!(%kind, source, "native parser returned a null handle");
    Error::Parse {
        kind,
        source_text: source.to_string(),
    }
}
