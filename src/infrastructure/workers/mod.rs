pub mod scheduler;

pub use scheduler::ReconciliationWorker;
