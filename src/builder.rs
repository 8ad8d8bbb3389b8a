//! Building operations through `MlirOperationState`.

use mlir_capi_sys::{
    Capi, MlirAttribute, MlirBlock, MlirContext, MlirLocation, MlirNamedAttribute,
    MlirOperation, MlirRegion, MlirStringRef, MlirType, MlirValue,
};

use crate::array::CArray;
use crate::error::{Error, Result};
use crate::support;

/// Accumulates the pieces of one operation, then creates it in a single call.
///
/// Nothing reaches the native side until [`OperationBuilder::build`]: the
/// builder fills an `MlirOperationState` through the `mlirOperationStateAdd*`
/// functions and hands it to `mlirOperationCreate`. Regions added here are
/// owned by the new operation afterwards.
///
/// Collecting handles is safe; [`OperationBuilder::build`] is where they are
/// dereferenced, so that is the `unsafe` step.
///
/// ```compile_fail,E0133
/// use mlir_capi::OperationBuilder;
/// use mlir_capi::sys::MlirLocation;
///
/// fn build_detached(capi: &mlir_capi::Capi) {
///     let _ = OperationBuilder::new(capi, "test.op", MlirLocation::null()).build();
/// }
/// ```
#[derive(Debug)]
pub struct OperationBuilder<'a> {
    capi: &'a Capi,
    name: String,
    location: MlirLocation,
    results: CArray<MlirType>,
    operands: CArray<MlirValue>,
    regions: CArray<MlirRegion>,
    successors: CArray<MlirBlock>,
    attributes: CArray<MlirNamedAttribute>,
    infer_result_types: bool,
}

impl<'a> OperationBuilder<'a> {
    pub fn new(capi: &'a Capi, name: &str, location: MlirLocation) -> Self {
        Self {
            capi,
            name: name.to_string(),
            location,
            results: CArray::new(),
            operands: CArray::new(),
            regions: CArray::new(),
            successors: CArray::new(),
            attributes: CArray::new(),
            infer_result_types: false,
        }
    }

    pub fn add_results(mut self, results: &[MlirType]) -> Self {
        self.results.extend(results.iter().copied());
        self
    }

    pub fn add_operands(mut self, operands: &[MlirValue]) -> Self {
        self.operands.extend(operands.iter().copied());
        self
    }

    /// Regions passed here must not be owned by anything else.
    pub fn add_regions(mut self, regions: &[MlirRegion]) -> Self {
        self.regions.extend(regions.iter().copied());
        self
    }

    pub fn add_successors(mut self, successors: &[MlirBlock]) -> Self {
        self.successors.extend(successors.iter().copied());
        self
    }

    pub fn add_attributes(mut self, attributes: &[MlirNamedAttribute]) -> Self {
        self.attributes.extend(attributes.iter().copied());
        self
    }

    /// Attaches `attr` under `name`, interning the name in `context`.
    ///
    /// # Safety
    ///
    /// `context` and `attr` must be live.
    ///
    /// ```compile_fail,E0133
    /// use mlir_capi::OperationBuilder;
    /// use mlir_capi::sys::{MlirAttribute, MlirContext, MlirLocation};
    ///
    /// fn attach(capi: &mlir_capi::Capi) {
    ///     let _ = OperationBuilder::new(capi, "test.op", MlirLocation::null())
    ///         .add_attribute(MlirContext::null(), "v", MlirAttribute::null());
    /// }
    /// ```
    pub unsafe fn add_attribute(
        mut self,
        context: MlirContext,
        name: &str,
        attr: MlirAttribute,
    ) -> Self {
        let attribute = unsafe { named_attribute(self.capi, context, name, attr) };
        self.attributes.push(attribute);
        self
    }

    /// Let the operation infer its result types instead of listing them.
    pub fn enable_result_type_inference(mut self) -> Self {
        self.infer_result_types = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates the operation. It is not attached to any block yet.
    ///
    /// Fails with [`Error::OperationCreation`] when the native side returns a
    /// null operation, e.g. because result type inference was requested and
    /// could not be carried out.
    ///
    /// # Safety
    ///
    /// The location and every type, value, region, block, and attribute added
    /// to the builder must be live. Regions must be detached, since the new
    /// operation takes them over.
    pub unsafe fn build(self) -> Result<MlirOperation> {
        let capi = self.capi;
        let operation = unsafe {
            let mut state = capi.mlirOperationStateGet(MlirStringRef::new(&self.name), self.location);
            if !self.results.is_empty() {
                capi.mlirOperationStateAddResults(&mut state, self.results.c_len(), self.results.as_ptr());
            }
            if !self.operands.is_empty() {
                capi.mlirOperationStateAddOperands(
                    &mut state,
                    self.operands.c_len(),
                    self.operands.as_ptr(),
                );
            }
            if !self.regions.is_empty() {
                capi.mlirOperationStateAddOwnedRegions(
                    &mut state,
                    self.regions.c_len(),
                    self.regions.as_ptr(),
                );
            }
            if !self.successors.is_empty() {
                capi.mlirOperationStateAddSuccessors(
                    &mut state,
                    self.successors.c_len(),
                    self.successors.as_ptr(),
                );
            }
            if !self.attributes.is_empty() {
                capi.mlirOperationStateAddAttributes(
                    &mut state,
                    self.attributes.c_len(),
                    self.attributes.as_ptr(),
                );
            }
            if self.infer_result_types {
                capi.mlirOperationStateEnableResultTypeInference(&mut state);
            }
            capi.mlirOperationCreate(&mut state)
        };

        if operation.is_null() {
            return Err(Error::OperationCreation(self.name));
        }
        tracing::trace!(
            name = %self.name,
            operands = self.operands.len(),
            results = self.results.len(),
            regions = self.regions.len(),
            "created operation"
        );
        Ok(operation)
    }
}

/// Pairs an interned `name` with `attr`.
///
/// # Safety
///
/// `context` and `attr` must be live.
pub unsafe fn named_attribute(
    capi: &Capi,
    context: MlirContext,
    name: &str,
    attr: MlirAttribute,
) -> MlirNamedAttribute {
    unsafe { capi.mlirNamedAttributeGet(support::identifier(capi, context, name), attr) }
}

/// Creates a detached block with one argument per `(type, location)` pair.
///
/// # Safety
///
/// Every handle in `arguments` must be live.
pub unsafe fn create_block(capi: &Capi, arguments: &[(MlirType, MlirLocation)]) -> MlirBlock {
    let types: CArray<MlirType> = arguments.iter().map(|(ty, _)| *ty).collect();
    let locations: CArray<MlirLocation> = arguments.iter().map(|(_, loc)| *loc).collect();
    unsafe { capi.mlirBlockCreate(types.c_len(), types.as_ptr(), locations.as_ptr()) }
}

/// Creates a region holding `blocks`, which it takes ownership of.
///
/// # Safety
///
/// The blocks must be detached.
pub unsafe fn create_region(capi: &Capi, blocks: &[MlirBlock]) -> MlirRegion {
    unsafe {
        let region = capi.mlirRegionCreate();
        for block in blocks {
            capi.mlirRegionAppendOwnedBlock(region, *block);
        }
        region
    }
}

/// Result `position` of `operation`.
///
/// # Safety
///
/// `operation` must be live and have more than `position` results.
pub unsafe fn result(capi: &Capi, operation: MlirOperation, position: usize) -> MlirValue {
    unsafe { capi.mlirOperationGetResult(operation, position as isize) }
}

/// Argument `position` of `block`.
///
/// # Safety
///
/// `block` must be live and have more than `position` arguments.
pub unsafe fn argument(capi: &Capi, block: MlirBlock, position: usize) -> MlirValue {
    unsafe { capi.mlirBlockGetArgument(block, position as isize) }
}
