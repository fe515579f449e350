pub mod client;
pub mod employers;
pub mod models;

// Re-export commonly used types
pub use client::ListingSource;
pub use employers::{EmployerDirectory, EmployerEntry};
