use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A patient record as returned by the patient service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    #[serde(rename = "dateOfBirth")]
    pub date_of_birth: String,
}

impl Patient {
    /// Age in whole years, if the date of birth parses as YYYY-MM-DD.
    pub fn age(&self) -> Option<i32> {
        let dob = NaiveDate::parse_from_str(&self.date_of_birth, "%Y-%m-%d").ok()?;
        let today = Utc::now().date_naive();
        let mut age = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }
        Some(age)
    }

    /// Case-insensitive match against name and email, for the search filter.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.name.to_lowercase().contains(&q) || self.email.to_lowercase().contains(&q)
    }
}

/// Create/update payload for the patient service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PatientRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    #[serde(rename = "dateOfBirth")]
    pub date_of_birth: String,
    #[serde(rename = "registeredDate", skip_serializing_if = "Option::is_none")]
    pub registered_date: Option<String>,
}

impl PatientRequest {
    /// The service rejects blank fields with a 400; catch the obvious ones here
    /// so the form can show a message without a round trip.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err("A valid email is required".to_string());
        }
        if NaiveDate::parse_from_str(&self.date_of_birth, "%Y-%m-%d").is_err() {
            return Err("Date of birth must be YYYY-MM-DD".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_deserializes_wire_names() {
        let json = r#"{"id":"123e4567-e89b-12d3-a456-426614174000","name":"John Doe","email":"john.doe@example.com","address":"123 Main St","dateOfBirth":"1985-06-15"}"#;
        let p: Patient = serde_json::from_str(json).expect("patient json");
        assert_eq!(p.name, "John Doe");
        assert_eq!(p.date_of_birth, "1985-06-15");
    }

    #[test]
    fn test_patient_request_omits_absent_registered_date() {
        let req = PatientRequest {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            address: "456 Oak Ave".to_string(),
            date_of_birth: "1990-01-02".to_string(),
            registered_date: None,
        };
        let json = serde_json::to_string(&req).expect("serialize");
        assert!(json.contains("dateOfBirth"));
        assert!(!json.contains("registeredDate"));
    }

    #[test]
    fn test_validate_rejects_blank_name_and_bad_email() {
        let mut req = PatientRequest {
            name: String::new(),
            email: "jane@example.com".to_string(),
            address: String::new(),
            date_of_birth: "1990-01-02".to_string(),
            registered_date: None,
        };
        assert!(req.validate().is_err());

        req.name = "Jane".to_string();
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());

        req.email = "jane@example.com".to_string();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let p = Patient {
            id: "1".to_string(),
            name: "Alice Smith".to_string(),
            email: "alice@clinic.org".to_string(),
            address: String::new(),
            date_of_birth: "1970-01-01".to_string(),
        };
        assert!(p.matches("smith"));
        assert!(p.matches("ALICE@"));
        assert!(!p.matches("bob"));
    }
}
