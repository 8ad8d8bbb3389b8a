//! Exercise scripts: call sequences that drive each binding end to end.
//!
//! Each scenario is a plain sequence of foreign calls with no logic of its
//! own. They exist so the test suite and the `mlir-capi` binary can check
//! that the table round-trips against a real library without faulting.

use mlir_capi_sys::{Capi, MlirBlock, MlirContext, MlirLocation, MlirOperation, MlirType};

use crate::builder::{OperationBuilder, argument, create_block, create_region, result};
use crate::dialects::{load_dialects, register_all_upstream_dialects};
use crate::error::{Error, Result};
use crate::owned::{OwnedContext, OwnedModule};
use crate::support::{parse_attribute, parse_type};

/// Dialects the `@add` function is built from.
pub const ADD_FUNCTION_DIALECTS: &[&str] = &["arith", "func", "memref", "scf"];

/// Creates and immediately destroys `iterations` contexts.
pub fn context_churn(capi: &Capi, iterations: usize) {
    for _ in 0..iterations {
        unsafe {
            let context = capi.mlirContextCreate();
            capi.mlirContextDestroy(context);
        }
    }
    tracing::debug!(iterations, "context churn finished");
}

/// Registers every upstream dialect, then loads each of `names` by name.
///
/// # Safety
///
/// `context` must be live.
pub unsafe fn load_upstream_dialects(capi: &Capi, context: MlirContext, names: &[&str]) -> Result<()> {
    unsafe {
        register_all_upstream_dialects(capi, context);
        load_dialects(capi, context, names.iter().copied())?;
    }
    Ok(())
}

/// Parses `source` as an attribute and dumps it to stderr `times` times.
///
/// # Safety
///
/// `context` must be live.
pub unsafe fn parse_and_dump_attribute(
    capi: &Capi,
    context: MlirContext,
    source: &str,
    times: usize,
) -> Result<()> {
    for _ in 0..times {
        unsafe {
            let attr = parse_attribute(capi, context, source)?;
            capi.mlirAttributeDump(attr);
        }
    }
    Ok(())
}

/// Builds `name` with no operands, results, regions, or attributes.
///
/// The operation is detached; the caller must insert or destroy it.
///
/// ```compile_fail,E0133
/// use mlir_capi::scenarios::minimal_operation;
/// use mlir_capi::sys::MlirLocation;
///
/// fn detached(capi: &mlir_capi::Capi) {
///     let _ = minimal_operation(capi, "test.op", MlirLocation::null());
/// }
/// ```
///
/// # Safety
///
/// `location` must be live.
pub unsafe fn minimal_operation(
    capi: &Capi,
    name: &str,
    location: MlirLocation,
) -> Result<MlirOperation> {
    unsafe { OperationBuilder::new(capi, name, location).build() }
}

/// Appends one argument per type to a fresh block, then reads them back.
///
/// Returns the types reported by the block's arguments, in order. The block
/// is destroyed before returning.
///
/// # Safety
///
/// Every type in `types` and `location` must be live.
pub unsafe fn block_arguments_round_trip(
    capi: &Capi,
    types: &[MlirType],
    location: MlirLocation,
) -> Vec<MlirType> {
    unsafe {
        let block = create_block(capi, &[]);
        for ty in types {
            capi.mlirBlockAddArgument(block, *ty, location);
        }
        let count = capi.mlirBlockGetNumArguments(block) as usize;
        let read_back = (0..count)
            .map(|position| capi.mlirValueGetType(argument(capi, block, position)))
            .collect();
        capi.mlirBlockDestroy(block);
        read_back
    }
}

/// Builds a module holding
///
/// ```mlir
/// func.func @add(%lhs: memref<?xf32>, %rhs: memref<?xf32>) {
///   %c0 = arith.constant 0 : index
///   %dim = memref.dim %lhs, %c0 : memref<?xf32>
///   %c1 = arith.constant 1 : index
///   scf.for %i = %c0 to %dim step %c1 {
///     %0 = memref.load %lhs[%i] : memref<?xf32>
///     %1 = memref.load %rhs[%i] : memref<?xf32>
///     %2 = arith.addf %0, %1 : f32
///     memref.store %2, %lhs[%i] : memref<?xf32>
///   }
///   return
/// }
/// ```
///
/// The dialects in [`ADD_FUNCTION_DIALECTS`] must already be loaded.
pub fn build_add_function<'c>(context: &'c OwnedContext<'_>) -> Result<OwnedModule<'c>> {
    let capi = context.capi();
    let ctx = context.raw();
    let location = context.unknown_location();
    let module = OwnedModule::empty(context);

    unsafe {
        let memref_type = parse_type(capi, ctx, "memref<?xf32>")?;
        let func_type = parse_attribute(capi, ctx, "(memref<?xf32>, memref<?xf32>) -> ()")?;
        let func_name = parse_attribute(capi, ctx, "\"add\"")?;

        let func_body = create_block(capi, &[(memref_type, location), (memref_type, location)]);
        let func_region = create_region(capi, &[func_body]);
        let func = OperationBuilder::new(capi, "func.func", location)
            .add_attribute(ctx, "function_type", func_type)
            .add_attribute(ctx, "sym_name", func_name)
            .add_regions(&[func_region])
            .build()?;
        capi.mlirBlockInsertOwnedOperation(module.body(), 0, func);

        let index_type = parse_type(capi, ctx, "index")?;
        let const_zero = index_constant(capi, ctx, location, index_type, 0)?;
        capi.mlirBlockAppendOwnedOperation(func_body, const_zero);

        let lhs = argument(capi, func_body, 0);
        let zero = result(capi, const_zero, 0);
        let dim = OperationBuilder::new(capi, "memref.dim", location)
            .add_operands(&[lhs, zero])
            .add_results(&[index_type])
            .build()?;
        capi.mlirBlockAppendOwnedOperation(func_body, dim);

        let const_one = index_constant(capi, ctx, location, index_type, 1)?;
        capi.mlirBlockAppendOwnedOperation(func_body, const_one);

        let loop_body = create_block(capi, &[]);
        capi.mlirBlockAddArgument(loop_body, index_type, location);
        let loop_region = create_region(capi, &[loop_body]);

        let upper = result(capi, dim, 0);
        let step = result(capi, const_one, 0);
        let for_loop = OperationBuilder::new(capi, "scf.for", location)
            .add_operands(&[zero, upper, step])
            .add_regions(&[loop_region])
            .build()?;
        capi.mlirBlockAppendOwnedOperation(func_body, for_loop);

        populate_loop_body(capi, ctx, location, loop_body, func_body)?;

        let ret = OperationBuilder::new(capi, "func.return", location).build()?;
        capi.mlirBlockAppendOwnedOperation(func_body, ret);
    }

    tracing::debug!("built @add module");
    Ok(module)
}

/// `lhs[i] = lhs[i] + rhs[i]`, followed by the loop terminator.
unsafe fn populate_loop_body(
    capi: &Capi,
    ctx: MlirContext,
    location: MlirLocation,
    loop_body: MlirBlock,
    func_body: MlirBlock,
) -> Result<()> {
    unsafe {
        let iv = argument(capi, loop_body, 0);
        let lhs = argument(capi, func_body, 0);
        let rhs = argument(capi, func_body, 1);
        let f32_type = parse_type(capi, ctx, "f32")?;

        let load_lhs = OperationBuilder::new(capi, "memref.load", location)
            .add_operands(&[lhs, iv])
            .add_results(&[f32_type])
            .build()?;
        capi.mlirBlockAppendOwnedOperation(loop_body, load_lhs);

        let load_rhs = OperationBuilder::new(capi, "memref.load", location)
            .add_operands(&[rhs, iv])
            .add_results(&[f32_type])
            .build()?;
        capi.mlirBlockAppendOwnedOperation(loop_body, load_rhs);

        let sum = OperationBuilder::new(capi, "arith.addf", location)
            .add_operands(&[result(capi, load_lhs, 0), result(capi, load_rhs, 0)])
            .add_results(&[f32_type])
            .build()?;
        capi.mlirBlockAppendOwnedOperation(loop_body, sum);

        let store = OperationBuilder::new(capi, "memref.store", location)
            .add_operands(&[result(capi, sum, 0), lhs, iv])
            .build()?;
        capi.mlirBlockAppendOwnedOperation(loop_body, store);

        let terminator = OperationBuilder::new(capi, "scf.yield", location).build()?;
        capi.mlirBlockAppendOwnedOperation(loop_body, terminator);
    }
    Ok(())
}

unsafe fn index_constant(
    capi: &Capi,
    ctx: MlirContext,
    location: MlirLocation,
    index_type: MlirType,
    value: i64,
) -> Result<MlirOperation> {
    unsafe {
        let literal = parse_attribute(capi, ctx, &format!("{value} : index"))?;
        OperationBuilder::new(capi, "arith.constant", location)
            .add_results(&[index_type])
            .add_attribute(ctx, "value", literal)
            .build()
    }
}

/// Loads the dialects `@add` needs, builds it, and checks that it verifies.
pub fn build_verified_add_function<'c>(context: &'c OwnedContext<'_>) -> Result<OwnedModule<'c>> {
    unsafe { load_upstream_dialects(context.capi(), context.raw(), ADD_FUNCTION_DIALECTS)? };
    let module = build_add_function(context)?;
    if !module.verify() {
        return Err(Error::Verification("builtin.module".to_string()));
    }
    Ok(module)
}
