pub mod memory;

pub use memory::ApprovalStore;
