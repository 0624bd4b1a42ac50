pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::cab::{Cab, CabUpdate};
use crate::models::employee::Employee;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique index violation, carrying the store's own message.
    #[error("{0}")]
    Duplicate(String),

    #[error("store error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Updates are keyed by the record's unique business key (`employeeId`,
/// `registrationNumber`) and return `None` when nothing matched.
#[async_trait]
pub trait Store: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;

    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError>;

    async fn update_employee(&self, employee: Employee) -> Result<Option<Employee>, StoreError>;

    async fn delete_employee(&self, employee_id: &str) -> Result<DeleteResult, StoreError>;

    async fn list_cabs(&self) -> Result<Vec<Cab>, StoreError>;

    async fn insert_cab(&self, cab: &Cab) -> Result<(), StoreError>;

    async fn update_cab(&self, update: CabUpdate) -> Result<Option<Cab>, StoreError>;
}
