use serde::{Deserialize, Serialize};

use crate::types::{AppError, AppResult};

pub const CONTACTS_KEY: &str = "contacts";

/// Contact block shown on the site. Replaced as a whole on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub title: String,
    pub description: String,
    /// Messaging handle, e.g. `@studio`.
    pub telegram: String,
    pub email: String,
    pub hours: String,
    pub location: String,
    pub response_time: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            title: "Let's discuss your project".to_string(),
            description: "Tell me about your space and I will get back to you with ideas, timing and a first estimate.".to_string(),
            telegram: "@interior_studio".to_string(),
            email: "hello@interior.studio".to_string(),
            hours: "Mon-Fri, 10:00-19:00".to_string(),
            location: "Remote, worldwide".to_string(),
            response_time: "Usually replies within 24 hours".to_string(),
            features: vec![
                "Free first consultation".to_string(),
                "Concept in 7 days".to_string(),
                "Full drawing set in PDF".to_string(),
            ],
        }
    }
}

impl ContactInfo {
    pub fn validate(&self) -> AppResult<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::InvalidRequest(
                "email must be a valid address".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates an admin PUT body.
    pub fn from_payload(payload: serde_json::Value) -> AppResult<Self> {
        if !payload.is_object() {
            return Err(AppError::InvalidRequest(
                "contacts must be an object".to_string(),
            ));
        }
        let contacts: ContactInfo = serde_json::from_value(payload)
            .map_err(|e| AppError::InvalidRequest(format!("invalid contacts: {}", e)))?;
        contacts.validate()?;
        Ok(contacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_valid() {
        assert!(ContactInfo::default().validate().is_ok());
    }

    #[test]
    fn test_camel_case_wire_format() {
        let value = serde_json::to_value(ContactInfo::default()).unwrap();
        assert!(value.get("responseTime").is_some());
        assert!(value.get("response_time").is_none());
    }

    #[test]
    fn test_from_payload_rejects_bad_shapes() {
        assert!(ContactInfo::from_payload(json!([1, 2])).is_err());
        assert!(ContactInfo::from_payload(json!({"email": "x@y.z"})).is_err());

        let mut value = serde_json::to_value(ContactInfo::default()).unwrap();
        value["email"] = json!("not-an-address");
        assert!(matches!(
            ContactInfo::from_payload(value),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_features_default_to_empty() {
        let mut value = serde_json::to_value(ContactInfo::default()).unwrap();
        value.as_object_mut().unwrap().remove("features");
        let parsed = ContactInfo::from_payload(value).unwrap();
        assert!(parsed.features.is_empty());
    }
}
