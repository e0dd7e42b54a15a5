// Service exports
pub mod memory;
pub mod postgres;
pub mod registry;
pub mod store;
pub mod supabase;

pub use memory::MemoryReportStore;
pub use postgres::PostgresReportStore;
pub use registry::{Registry, RegistryError};
pub use store::{ReportStore, StoreError};
pub use supabase::SupabaseReportStore;
