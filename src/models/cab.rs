use serde::{Deserialize, Serialize};

use crate::models::lenient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cab {
    pub registration_number: String,
    pub driver_name: String,
    pub driver_license_number: String,
    #[serde(rename = "type")]
    pub cab_type: String,
    pub model: String,
    pub contact: String,
    #[serde(default)]
    pub available: bool,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub capacity: u32,
}

/// Field set written by an edit. `available` is only touched when the
/// request carries it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CabUpdate {
    pub registration_number: String,
    pub driver_name: String,
    pub driver_license_number: String,
    #[serde(rename = "type")]
    pub cab_type: String,
    pub model: String,
    pub contact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    pub capacity: u32,
}

impl CabUpdate {
    pub fn apply(self, cab: &mut Cab) {
        cab.registration_number = self.registration_number;
        cab.driver_name = self.driver_name;
        cab.driver_license_number = self.driver_license_number;
        cab.cab_type = self.cab_type;
        cab.model = self.model;
        cab.contact = self.contact;
        if let Some(available) = self.available {
            cab.available = available;
        }
        cab.capacity = self.capacity;
    }
}

/// A new cab is unavailable unless the request says otherwise.
impl From<CabUpdate> for Cab {
    fn from(fields: CabUpdate) -> Self {
        Cab {
            registration_number: fields.registration_number,
            driver_name: fields.driver_name,
            driver_license_number: fields.driver_license_number,
            cab_type: fields.cab_type,
            model: fields.model,
            contact: fields.contact,
            available: fields.available.unwrap_or(false),
            capacity: fields.capacity,
        }
    }
}
