use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::Serialize;
use tracing::info;

use crate::models::cab::{Cab, CabUpdate};
use crate::models::employee::Employee;
use crate::store::{DeleteResult, Store, StoreError};

const DUPLICATE_KEY: i32 = 11000;
const DEFAULT_DATABASE: &str = "test";

pub struct MongoStore {
    database: Database,
    employees: Collection<Employee>,
    cabs: Collection<Cab>,
}

impl MongoStore {
    /// Connects once and makes sure the unique indexes exist.
    pub async fn connect(url: &str, database: Option<&str>) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(url).await.map_err(backend_error)?;
        let database = match database {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
        };

        let store = Self {
            employees: database.collection("employees"),
            cabs: database.collection("cabs"),
            database,
        };
        store.ensure_indexes().await?;

        info!(database = store.database.name(), "mongodb store ready");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        for key in ["employeeId", "email"] {
            self.employees
                .create_index(unique_index(key))
                .await
                .map_err(backend_error)?;
        }
        self.cabs
            .create_index(unique_index("registrationNumber"))
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}

fn unique_index(key: &str) -> IndexModel {
    let mut keys = Document::new();
    keys.insert(key, 1);

    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn set_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    let fields = bson::to_document(value).map_err(|err| StoreError::Backend(err.to_string()))?;
    Ok(doc! { "$set": fields })
}

fn backend_error(err: MongoError) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Duplicate-key failures keep the server's message; inserts report them as
/// write errors, find-and-modify as command errors.
fn classify(err: MongoError) -> StoreError {
    let duplicate = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY =>
        {
            Some(write_error.message.clone())
        }
        ErrorKind::Command(command_error) if command_error.code == DUPLICATE_KEY => {
            Some(command_error.message.clone())
        }
        _ => None,
    };

    match duplicate {
        Some(message) => StoreError::Duplicate(message),
        None => backend_error(err),
    }
}

#[async_trait]
impl Store for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let cursor = self.employees.find(doc! {}).await.map_err(backend_error)?;
        cursor.try_collect().await.map_err(backend_error)
    }

    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        self.employees.insert_one(employee).await.map_err(classify)?;
        Ok(())
    }

    async fn update_employee(&self, employee: Employee) -> Result<Option<Employee>, StoreError> {
        let filter = doc! { "employeeId": employee.employee_id.clone() };
        let update = set_document(&employee)?;
        self.employees
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(classify)
    }

    async fn delete_employee(&self, employee_id: &str) -> Result<DeleteResult, StoreError> {
        let result = self
            .employees
            .delete_one(doc! { "employeeId": employee_id })
            .await
            .map_err(backend_error)?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn list_cabs(&self) -> Result<Vec<Cab>, StoreError> {
        let cursor = self.cabs.find(doc! {}).await.map_err(backend_error)?;
        cursor.try_collect().await.map_err(backend_error)
    }

    async fn insert_cab(&self, cab: &Cab) -> Result<(), StoreError> {
        self.cabs.insert_one(cab).await.map_err(classify)?;
        Ok(())
    }

    async fn update_cab(&self, update: CabUpdate) -> Result<Option<Cab>, StoreError> {
        let filter = doc! { "registrationNumber": update.registration_number.clone() };
        let modifications = set_document(&update)?;
        self.cabs
            .find_one_and_update(filter, modifications)
            .return_document(ReturnDocument::After)
            .await
            .map_err(classify)
    }
}
