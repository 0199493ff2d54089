//! Repository traits and implementations.

pub mod job;
pub mod memory;

pub use job::{JobRepo, JobRow, PgJobRepo, StatusQuery};
pub use memory::MemoryJobRepo;
