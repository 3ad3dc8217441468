pub mod document_loader;
pub mod memory_locator;

pub use memory_locator::{ElementState, MemoryElement, MemoryLocator};
