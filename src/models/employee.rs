use serde::{Deserialize, Serialize};

use crate::models::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCode {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub contact: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_code: Option<GeoCode>,
}

impl Employee {
    /// Overwrites this record with an edit. A missing designation keeps the
    /// stored one.
    pub fn apply_edit(&mut self, edit: Employee) {
        let designation = edit.designation.or_else(|| self.designation.take());
        *self = Employee {
            designation,
            ..edit
        };
    }
}
