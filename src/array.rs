//! Packing handle records into contiguous C arrays.
//!
//! Foreign functions such as `mlirBlockCreate` or
//! `mlirOperationStateAddOperands` take a count and a pointer to the first
//! element. [`CArray`] owns such a buffer. Small arrays stay inline, which
//! covers almost every operand or result list.

use core::ffi::c_void;
use core::fmt;

use smallvec::SmallVec;

/// A contiguous, owned buffer of `#[repr(C)]` records.
///
/// Elements are stored back to back with no padding beyond their own layout,
/// so the buffer can be handed to C as `T*`. Passing a type whose layout does
/// not match what the callee expects is undefined behavior.
#[derive(Clone, PartialEq, Eq)]
pub struct CArray<T: Copy> {
    elements: SmallVec<[T; 4]>,
}

impl<T: Copy> CArray<T> {
    pub fn new() -> Self {
        Self {
            elements: SmallVec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: SmallVec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, element: T) {
        self.elements.push(element);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The element count as the C API's `intptr_t`.
    pub fn c_len(&self) -> isize {
        // Allocations never exceed isize::MAX bytes, so neither does the count.
        self.elements.len() as isize
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// Pointer to the first element, or null when empty.
    ///
    /// The C API accepts `NULL` together with a zero count; an empty Rust
    /// slice would otherwise hand out a dangling (non-null) pointer.
    pub fn as_ptr(&self) -> *const T {
        if self.elements.is_empty() {
            core::ptr::null()
        } else {
            self.elements.as_ptr()
        }
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        if self.elements.is_empty() {
            core::ptr::null_mut()
        } else {
            self.elements.as_mut_ptr()
        }
    }

    /// The buffer as an untyped pointer, for callees taking `void*`.
    pub fn as_raw_ptr(&self) -> *const c_void {
        self.as_ptr().cast()
    }

    /// Size of the buffer in bytes.
    pub fn byte_len(&self) -> usize {
        core::mem::size_of_val(self.as_slice())
    }
}

impl<T: Copy> Default for CArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for CArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Copy> FromIterator<T> for CArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<T: Copy> From<&[T]> for CArray<T> {
    fn from(elements: &[T]) -> Self {
        Self {
            elements: SmallVec::from_slice(elements),
        }
    }
}

impl<T: Copy, const N: usize> From<[T; N]> for CArray<T> {
    fn from(elements: [T; N]) -> Self {
        elements.into_iter().collect()
    }
}

impl<T: Copy> Extend<T> for CArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.elements.extend(iter);
    }
}

impl<'a, T: Copy> IntoIterator for &'a CArray<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
