//! In-memory row storage.
//!
//! The heap is the only component that mints `Rid`s; everything else
//! treats them as opaque handles.

pub mod heap;
pub mod tuple;

pub use heap::TableHeap;
pub use tuple::Tuple;
