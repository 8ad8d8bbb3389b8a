//! Exercise scripts against the native library: each binding must round-trip
//! without faulting.

mod common;

use common::capi_or_skip;
use mlir_capi::dialects::{dialect_namespace, load_dialect};
use mlir_capi::scenarios::{
    ADD_FUNCTION_DIALECTS, block_arguments_round_trip, build_add_function,
    build_verified_add_function, context_churn, load_upstream_dialects, minimal_operation,
    parse_and_dump_attribute,
};
use mlir_capi::support::{attribute_to_string, identifier_to_string, parse_attribute, parse_type};
use mlir_capi::builder::{create_block, create_region, result};
use mlir_capi::sys::{Capi, MlirContext, MlirLocation, MlirOperation, MlirStringRef};
use mlir_capi::{
    Error, OperationBuilder, OwnedContext, OwnedDialectRegistry, OwnedModule, OwnedPrintingFlags,
    ParseKind, UPSTREAM_DIALECTS, register_all_upstream_dialects,
};

#[test]
fn context_create_destroy_is_repeatable() {
    let Some(capi) = capi_or_skip("context_create_destroy_is_repeatable") else {
        return;
    };
    context_churn(capi, 1_000);
}

#[test]
fn register_all_dialects_twice_on_one_context() {
    let Some(capi) = capi_or_skip("register_all_dialects_twice_on_one_context") else {
        return;
    };
    let context = OwnedContext::new(capi);
    unsafe {
        register_all_upstream_dialects(capi, context.raw());
        register_all_upstream_dialects(capi, context.raw());
    }
    assert!(context.registered_dialect_count() > 0);
}

#[test]
fn every_upstream_dialect_loads_by_name() {
    let Some(capi) = capi_or_skip("every_upstream_dialect_loads_by_name") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    for name in UPSTREAM_DIALECTS {
        let dialect = unsafe { load_dialect(capi, context.raw(), name) }.unwrap();
        assert_eq!(unsafe { dialect_namespace(capi, dialect) }, *name);
    }
}

#[test]
fn raw_get_or_load_dialect_from_c_string() {
    let Some(capi) = capi_or_skip("raw_get_or_load_dialect_from_c_string") else {
        return;
    };
    unsafe {
        let context = capi.mlirContextCreate();
        register_all_upstream_dialects(capi, context);
        let name = capi.mlirStringRefCreateFromCString(c"arith".as_ptr());
        assert_eq!(name.length, 5);
        let dialect = capi.mlirContextGetOrLoadDialect(context, name);
        assert!(!dialect.is_null());
        capi.mlirContextDestroy(context);
    }
}

#[test]
fn unknown_dialect_is_reported() {
    let Some(capi) = capi_or_skip("unknown_dialect_is_reported") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    let err = unsafe { load_dialect(capi, context.raw(), "no_such_dialect") }.unwrap_err();
    assert!(matches!(err, Error::UnknownDialect(name) if name == "no_such_dialect"));
}

#[test]
fn explicit_registry_guard_matches_convenience_wrapper() {
    let Some(capi) = capi_or_skip("explicit_registry_guard_matches_convenience_wrapper") else {
        return;
    };
    let via_wrapper = OwnedContext::with_upstream_dialects(capi);
    let via_guard = OwnedContext::new(capi);
    {
        let registry = OwnedDialectRegistry::new(capi);
        registry.register_all();
        registry.append_to(&via_guard);
    }
    assert_eq!(
        via_wrapper.registered_dialect_count(),
        via_guard.registered_dialect_count()
    );
}

#[test]
fn attribute_parse_and_dump_repeatedly() {
    let Some(capi) = capi_or_skip("attribute_parse_and_dump_repeatedly") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    unsafe { parse_and_dump_attribute(capi, context.raw(), "0 : index", 3) }.unwrap();

    let attr = unsafe { parse_attribute(capi, context.raw(), "0 : index") }.unwrap();
    assert_eq!(unsafe { attribute_to_string(capi, attr) }, "0 : index");

    let again = unsafe { parse_attribute(capi, context.raw(), "0 : index") }.unwrap();
    assert!(unsafe { capi.mlirAttributeEqual(attr, again) });
    let index = unsafe { capi.mlirIndexTypeGet(context.raw()) };
    assert!(unsafe { capi.mlirTypeEqual(capi.mlirAttributeGetType(attr), index) });
}

#[test]
fn malformed_attribute_is_a_parse_error() {
    let Some(capi) = capi_or_skip("malformed_attribute_is_a_parse_error") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    let err = unsafe { parse_attribute(capi, context.raw(), "0 : ") }.unwrap_err();
    assert!(matches!(
        err,
        Error::Parse {
            kind: ParseKind::Attribute,
            ..
        }
    ));
}

#[test]
fn minimal_operation_is_created() {
    let Some(capi) = capi_or_skip("minimal_operation_is_created") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    unsafe { load_dialect(capi, context.raw(), "func") }.unwrap();

    let operation = unsafe { minimal_operation(capi, "func.return", context.unknown_location()) }.unwrap();
    assert!(!operation.is_null());
    unsafe {
        assert_eq!(capi.mlirOperationGetNumResults(operation), 0);
        assert_eq!(capi.mlirOperationGetNumRegions(operation), 0);
        let name = identifier_to_string(capi, capi.mlirOperationGetName(operation));
        assert_eq!(name, "func.return");
        capi.mlirOperationDestroy(operation);
    }
}

#[test]
fn block_arguments_keep_declared_types() {
    let Some(capi) = capi_or_skip("block_arguments_keep_declared_types") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    let location = context.file_location("block.mlir", 1, 1);
    let (index, f32) = unsafe {
        (
            capi.mlirIndexTypeGet(context.raw()),
            capi.mlirF32TypeGet(context.raw()),
        )
    };

    let read_back = unsafe { block_arguments_round_trip(capi, &[index, f32], location) };
    assert_eq!(read_back.len(), 2);
    unsafe {
        assert!(capi.mlirTypeEqual(read_back[0], index));
        assert!(capi.mlirTypeEqual(read_back[1], f32));
        assert!(!capi.mlirTypeEqual(read_back[0], read_back[1]));
    }
}

#[test]
fn block_arguments_are_block_arguments() {
    let Some(capi) = capi_or_skip("block_arguments_are_block_arguments") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    let i32_type = unsafe { capi.mlirIntegerTypeGet(context.raw(), 32) };
    unsafe {
        let block = create_block(capi, &[(i32_type, context.unknown_location())]);
        let arg = capi.mlirBlockGetArgument(block, 0);
        assert!(capi.mlirValueIsABlockArgument(arg));
        assert!(!capi.mlirValueIsAOpResult(arg));
        capi.mlirBlockDestroy(block);
    }
}

#[test]
fn add_function_end_to_end() {
    let Some(capi) = capi_or_skip("add_function_end_to_end") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    let module = build_verified_add_function(&context).unwrap();
    assert!(!module.as_operation().is_null());

    let text = module.to_string();
    assert!(text.contains("func.func @add"), "{text}");
    assert!(text.contains("scf.for"), "{text}");
    assert!(text.contains("arith.addf"), "{text}");
    assert_eq!(text.matches("memref.load").count(), 2, "{text}");
    assert!(text.contains("memref.store"), "{text}");

    let order = ["arith.constant 0", "memref.dim", "arith.constant 1", "scf.for", "return"];
    let positions: Vec<usize> = order
        .iter()
        .map(|needle| text.find(needle).unwrap_or_else(|| panic!("{needle} missing:\n{text}")))
        .collect();
    assert!(positions.is_sorted(), "{text}");

    unsafe {
        let table = capi.mlirSymbolTableCreate(module.as_operation());
        let add = capi.mlirSymbolTableLookup(table, MlirStringRef::new("add"));
        assert!(!add.is_null());
        assert!(capi.mlirSymbolTableLookup(table, MlirStringRef::new("sub")).is_null());
        capi.mlirSymbolTableDestroy(table);
    }
}

#[test]
fn add_function_prints_in_generic_form() {
    let Some(capi) = capi_or_skip("add_function_prints_in_generic_form") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    unsafe { load_upstream_dialects(capi, context.raw(), ADD_FUNCTION_DIALECTS) }.unwrap();
    let module = build_add_function(&context).unwrap();

    let flags = OwnedPrintingFlags::new(capi).generic_form();
    let text = unsafe { flags.print(module.as_operation()) };
    assert!(text.contains("\"func.func\""), "{text}");
    assert!(text.contains("\"scf.yield\""), "{text}");
}

#[test]
fn parsed_module_round_trips() {
    let Some(capi) = capi_or_skip("parsed_module_round_trips") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    unsafe { load_dialect(capi, context.raw(), "func") }.unwrap();

    let module = OwnedModule::parse(&context, "func.func private @external(index) -> index").unwrap();
    assert!(module.verify());
    assert!(module.to_string().contains("@external"));

    let err = OwnedModule::parse(&context, "func.func @broken(").unwrap_err();
    assert!(matches!(
        err,
        Error::Parse {
            kind: ParseKind::Module,
            ..
        }
    ));
}

#[test]
fn builder_with_results_and_attribute() {
    let Some(capi) = capi_or_skip("builder_with_results_and_attribute") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    unsafe { load_dialect(capi, context.raw(), "arith") }.unwrap();
    let index = unsafe { parse_type(capi, context.raw(), "index") }.unwrap();
    let literal = unsafe { parse_attribute(capi, context.raw(), "7 : index") }.unwrap();

    let constant = unsafe {
        OperationBuilder::new(capi, "arith.constant", context.unknown_location())
            .add_results(&[index])
            .add_attribute(context.raw(), "value", literal)
            .build()
    }
    .unwrap();
    unsafe {
        assert_eq!(capi.mlirOperationGetNumResults(constant), 1);
        let value = capi.mlirOperationGetResult(constant, 0);
        assert!(capi.mlirValueIsAOpResult(value));
        assert!(capi.mlirTypeEqual(capi.mlirValueGetType(value), index));
        assert!(capi.mlirOperationVerify(constant));
        capi.mlirOperationDestroy(constant);
    }
}

#[test]
fn function_type_from_arrays() {
    let Some(capi) = capi_or_skip("function_type_from_arrays") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    let ctx = context.raw();
    let inputs = mlir_capi::CArray::from([unsafe { capi.mlirIndexTypeGet(ctx) }; 2]);
    let results = mlir_capi::CArray::from([unsafe { capi.mlirF32TypeGet(ctx) }]);
    let func_type = unsafe {
        capi.mlirFunctionTypeGet(ctx, inputs.c_len(), inputs.as_ptr(), results.c_len(), results.as_ptr())
    };
    let expected = unsafe { parse_type(capi, ctx, "(index, index) -> f32") }.unwrap();
    assert!(unsafe { capi.mlirTypeEqual(func_type, expected) });

    let type_attr = unsafe { capi.mlirTypeAttrGet(func_type) };
    assert_eq!(unsafe { attribute_to_string(capi, type_attr) }, "(index, index) -> f32");
}

/// `arith.constant <value> : index`, detached.
unsafe fn index_constant(capi: &Capi, context: MlirContext, location: MlirLocation, value: i64) -> MlirOperation {
    unsafe {
        let index = capi.mlirIndexTypeGet(context);
        let literal = parse_attribute(capi, context, &format!("{value} : index")).unwrap();
        OperationBuilder::new(capi, "arith.constant", location)
            .add_results(&[index])
            .add_attribute(context, "value", literal)
            .build()
            .unwrap()
    }
}

#[test]
fn result_type_is_inferred_from_operands() {
    let Some(capi) = capi_or_skip("result_type_is_inferred_from_operands") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    let ctx = context.raw();
    unsafe { load_dialect(capi, ctx, "arith") }.unwrap();
    let location = context.unknown_location();

    unsafe {
        let block = create_block(capi, &[]);
        let lhs = index_constant(capi, ctx, location, 2);
        let rhs = index_constant(capi, ctx, location, 3);
        capi.mlirBlockAppendOwnedOperation(block, lhs);
        capi.mlirBlockAppendOwnedOperation(block, rhs);

        let sum = OperationBuilder::new(capi, "arith.addi", location)
            .add_operands(&[result(capi, lhs, 0), result(capi, rhs, 0)])
            .enable_result_type_inference()
            .build()
            .unwrap();
        capi.mlirBlockAppendOwnedOperation(block, sum);

        assert_eq!(capi.mlirOperationGetNumResults(sum), 1);
        let inferred = capi.mlirValueGetType(result(capi, sum, 0));
        assert!(capi.mlirTypeEqual(inferred, capi.mlirIndexTypeGet(ctx)));
        assert!(capi.mlirOperationVerify(sum));
        capi.mlirBlockDestroy(block);
    }
}

#[test]
fn failed_inference_is_an_operation_creation_error() {
    let Some(capi) = capi_or_skip("failed_inference_is_an_operation_creation_error") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    unsafe { load_dialect(capi, context.raw(), "arith") }.unwrap();
    let location = context.unknown_location();

    let without_operands = unsafe {
        OperationBuilder::new(capi, "arith.addi", location)
            .enable_result_type_inference()
            .build()
    };
    assert!(matches!(
        without_operands,
        Err(Error::OperationCreation(name)) if name == "arith.addi"
    ));

    let unregistered = unsafe {
        OperationBuilder::new(capi, "nowhere.op", location)
            .enable_result_type_inference()
            .build()
    };
    assert!(matches!(
        unregistered,
        Err(Error::OperationCreation(name)) if name == "nowhere.op"
    ));
}

/// `func.func @jump() { cf.br ^exit ^exit: return }`, built block by block.
unsafe fn jump_function(capi: &Capi, context: &OwnedContext<'_>) -> MlirOperation {
    let ctx = context.raw();
    let location = context.unknown_location();
    unsafe {
        let func_type = parse_attribute(capi, ctx, "() -> ()").unwrap();
        let func_name = parse_attribute(capi, ctx, "\"jump\"").unwrap();

        let entry = create_block(capi, &[]);
        let exit = create_block(capi, &[]);
        let branch = OperationBuilder::new(capi, "cf.br", location)
            .add_successors(&[exit])
            .build()
            .unwrap();
        capi.mlirBlockAppendOwnedOperation(entry, branch);
        let ret = OperationBuilder::new(capi, "func.return", location).build().unwrap();
        capi.mlirBlockAppendOwnedOperation(exit, ret);

        let body = create_region(capi, &[entry, exit]);
        OperationBuilder::new(capi, "func.func", location)
            .add_attribute(ctx, "function_type", func_type)
            .add_attribute(ctx, "sym_name", func_name)
            .add_regions(&[body])
            .build()
            .unwrap()
    }
}

#[test]
fn branch_with_successor_verifies() {
    let Some(capi) = capi_or_skip("branch_with_successor_verifies") else {
        return;
    };
    let context = OwnedContext::with_upstream_dialects(capi);
    unsafe { load_upstream_dialects(capi, context.raw(), &["cf", "func"]) }.unwrap();

    let module = OwnedModule::empty(&context);
    unsafe {
        let func = jump_function(capi, &context);
        capi.mlirBlockInsertOwnedOperation(module.body(), 0, func);
    }
    assert!(module.verify());

    let text = module.to_string();
    assert!(text.contains("cf.br ^bb1"), "{text}");
    assert!(text.contains("^bb1:"), "{text}");
}
