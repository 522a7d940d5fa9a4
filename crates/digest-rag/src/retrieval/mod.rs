//! Fragment storage and similarity retrieval

pub mod store;

pub use store::DocumentStore;
