use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::models::cab::{Cab, CabUpdate};
use crate::models::employee::Employee;
use crate::store::{DeleteResult, Store, StoreError};

// Lock order: `employees` before `employee_emails`.
#[derive(Default)]
pub struct MemoryStore {
    employees: DashMap<String, Employee>,
    employee_emails: DashMap<String, String>,
    cabs: DashMap<String, Cab>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_key(collection: &str, field: &str, value: &str) -> StoreError {
    StoreError::Duplicate(format!(
        "E11000 duplicate key error collection: {collection} index: {field}_1 dup key: {{ {field}: {value:?} }}"
    ))
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let mut employees: Vec<Employee> = self
            .employees
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        employees.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        Ok(employees)
    }

    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        let slot = match self.employees.entry(employee.employee_id.clone()) {
            Entry::Occupied(_) => {
                return Err(duplicate_key("employees", "employeeId", &employee.employee_id));
            }
            Entry::Vacant(slot) => slot,
        };

        match self.employee_emails.entry(employee.email.clone()) {
            Entry::Occupied(_) => Err(duplicate_key("employees", "email", &employee.email)),
            Entry::Vacant(email_slot) => {
                email_slot.insert(employee.employee_id.clone());
                slot.insert(employee.clone());
                Ok(())
            }
        }
    }

    async fn update_employee(&self, employee: Employee) -> Result<Option<Employee>, StoreError> {
        let Some(mut stored) = self.employees.get_mut(&employee.employee_id) else {
            return Ok(None);
        };

        if stored.email != employee.email {
            match self.employee_emails.entry(employee.email.clone()) {
                Entry::Occupied(_) => {
                    return Err(duplicate_key("employees", "email", &employee.email));
                }
                Entry::Vacant(email_slot) => {
                    email_slot.insert(employee.employee_id.clone());
                }
            }
            self.employee_emails.remove(&stored.email);
        }

        stored.apply_edit(employee);
        Ok(Some(stored.clone()))
    }

    async fn delete_employee(&self, employee_id: &str) -> Result<DeleteResult, StoreError> {
        let deleted = match self.employees.entry(employee_id.to_string()) {
            Entry::Occupied(slot) => {
                self.employee_emails.remove(&slot.get().email);
                slot.remove();
                true
            }
            Entry::Vacant(_) => false,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: u64::from(deleted),
        })
    }

    async fn list_cabs(&self) -> Result<Vec<Cab>, StoreError> {
        let mut cabs: Vec<Cab> = self.cabs.iter().map(|entry| entry.value().clone()).collect();
        cabs.sort_by(|a, b| a.registration_number.cmp(&b.registration_number));
        Ok(cabs)
    }

    async fn insert_cab(&self, cab: &Cab) -> Result<(), StoreError> {
        match self.cabs.entry(cab.registration_number.clone()) {
            Entry::Occupied(_) => Err(duplicate_key(
                "cabs",
                "registrationNumber",
                &cab.registration_number,
            )),
            Entry::Vacant(slot) => {
                slot.insert(cab.clone());
                Ok(())
            }
        }
    }

    async fn update_cab(&self, update: CabUpdate) -> Result<Option<Cab>, StoreError> {
        let Some(mut stored) = self.cabs.get_mut(&update.registration_number) else {
            return Ok(None);
        };

        update.apply(&mut stored);
        Ok(Some(stored.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::models::cab::{Cab, CabUpdate};
    use crate::models::employee::Employee;
    use crate::store::{Store, StoreError};

    fn employee(id: &str, email: &str) -> Employee {
        Employee {
            employee_id: id.to_string(),
            name: "Ravi".to_string(),
            email: email.to_string(),
            contact: 9000000001,
            designation: Some("Engineer".to_string()),
            address: "Park Street, Kolkata".to_string(),
            geo_code: None,
        }
    }

    fn cab(registration: &str) -> Cab {
        Cab {
            registration_number: registration.to_string(),
            driver_name: "Suresh".to_string(),
            driver_license_number: "DL-0420110012345".to_string(),
            cab_type: "SUV".to_string(),
            model: "Innova".to_string(),
            contact: "9000000002".to_string(),
            available: false,
            capacity: 6,
        }
    }

    #[tokio::test]
    async fn duplicate_employee_id_is_rejected() {
        let store = MemoryStore::new();
        store.insert_employee(&employee("E-1", "a@example.com")).await.unwrap();

        let err = store
            .insert_employee(&employee("E-1", "b@example.com"))
            .await
            .unwrap_err();

        match err {
            StoreError::Duplicate(msg) => {
                assert!(msg.starts_with("E11000"));
                assert!(msg.contains("employeeId"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // the rejected email must not be reserved
        store.insert_employee(&employee("E-2", "b@example.com")).await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.insert_employee(&employee("E-1", "a@example.com")).await.unwrap();

        let err = store
            .insert_employee(&employee("E-2", "a@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Duplicate(ref msg) if msg.contains("email")));
        assert_eq!(store.list_employees().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_moves_email_reservation() {
        let store = MemoryStore::new();
        store.insert_employee(&employee("E-1", "old@example.com")).await.unwrap();

        let updated = store
            .update_employee(employee("E-1", "new@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.email, "new@example.com");

        store.insert_employee(&employee("E-2", "old@example.com")).await.unwrap();
        let err = store
            .insert_employee(&employee("E-3", "new@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn update_to_taken_email_conflicts() {
        let store = MemoryStore::new();
        store.insert_employee(&employee("E-1", "a@example.com")).await.unwrap();
        store.insert_employee(&employee("E-2", "b@example.com")).await.unwrap();

        let err = store
            .update_employee(employee("E-2", "a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));

        let employees = store.list_employees().await.unwrap();
        assert_eq!(employees[1].email, "b@example.com");
    }

    #[tokio::test]
    async fn delete_reports_count_and_frees_email() {
        let store = MemoryStore::new();
        store.insert_employee(&employee("E-1", "a@example.com")).await.unwrap();

        assert_eq!(store.delete_employee("E-1").await.unwrap().deleted_count, 1);
        assert_eq!(store.delete_employee("E-1").await.unwrap().deleted_count, 0);

        store.insert_employee(&employee("E-9", "a@example.com")).await.unwrap();
    }

    #[tokio::test]
    async fn delete_then_reinsert_same_id_and_email() {
        let store = MemoryStore::new();
        store.insert_employee(&employee("E-1", "a@example.com")).await.unwrap();
        store.insert_employee(&employee("E-2", "b@example.com")).await.unwrap();

        store.delete_employee("E-1").await.unwrap();
        store.insert_employee(&employee("E-1", "a@example.com")).await.unwrap();

        let err = store
            .insert_employee(&employee("E-3", "b@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref msg) if msg.contains("email")));
        assert_eq!(store.list_employees().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn cab_update_keeps_availability_when_absent() {
        let store = MemoryStore::new();
        let mut stored = cab("KA-01-AB-1234");
        stored.available = true;
        store.insert_cab(&stored).await.unwrap();

        let updated = store
            .update_cab(CabUpdate {
                registration_number: "KA-01-AB-1234".to_string(),
                driver_name: "Mahesh".to_string(),
                driver_license_number: stored.driver_license_number.clone(),
                cab_type: stored.cab_type.clone(),
                model: stored.model.clone(),
                contact: stored.contact.clone(),
                available: None,
                capacity: 7,
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.driver_name, "Mahesh");
        assert_eq!(updated.capacity, 7);
        assert!(updated.available);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let store = MemoryStore::new();
        store.insert_cab(&cab("KA-01-AB-1234")).await.unwrap();
        let err = store.insert_cab(&cab("KA-01-AB-1234")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref msg) if msg.contains("registrationNumber")));
    }
}
