//! Clients for the external collaborators
//!
//! Each remote service gets its own client with an explicit
//! request/response contract and its own error enum, so tests can
//! substitute a stub endpoint instead of the real network service.

pub mod classifier;
pub mod places;

pub use classifier::{ClassifierError, WasteClassifier};
pub use places::{PlacesClient, PlacesError};
