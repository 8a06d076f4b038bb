use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::Entity;
use crate::error::ApiError;

/// Collects per-field problems so one response can report all of them
#[derive(Debug, Default)]
pub struct FieldCheck {
    errors: HashMap<String, String>,
    order: Vec<String>,
}

impl FieldCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &str, problem: impl Into<String>) {
        if !self.errors.contains_key(field) {
            self.order.push(field.to_string());
            self.errors.insert(field.to_string(), problem.into());
        }
    }

    /// Field must be present and non-empty after trimming
    pub fn required(&mut self, field: &str, value: Option<String>) -> String {
        match trimmed(value) {
            Some(v) => v,
            None => {
                self.reject(field, "is required");
                String::new()
            }
        }
    }

    /// Absent is fine; present-but-blank is a mistake on update
    pub fn provided(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = value?;
        let value = value.trim();
        if value.is_empty() {
            self.reject(field, "must not be empty");
            None
        } else {
            Some(value.to_string())
        }
    }

    pub fn required_email(&mut self, field: &str, value: Option<String>) -> String {
        let email = self.required(field, value);
        if !email.is_empty() && !looks_like_email(&email) {
            self.reject(field, "must be a valid email address");
        }
        email
    }

    pub fn provided_email(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let email = self.provided(field, value)?;
        if !looks_like_email(&email) {
            self.reject(field, "must be a valid email address");
        }
        Some(email)
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), ApiError> {
        match self.order.len() {
            0 => Ok(()),
            1 => {
                let field = &self.order[0];
                let message = format!("{}: {}", field, self.errors[field]);
                Err(ApiError::validation_error(message, Some(self.errors)))
            }
            _ => {
                let message = format!("Invalid fields: {}", self.order.join(", "));
                Err(ApiError::validation_error(message, Some(self.errors)))
            }
        }
    }
}

/// Trim, turning blank strings into None
pub fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Ids that do not parse cannot name an existing record
pub fn parse_id<T: Entity>(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::not_found(format!("{} not found", T::NAME)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Client;

    #[test]
    fn collects_every_missing_field() {
        let mut check = FieldCheck::new();
        assert_eq!(check.required("name", Some("  Acme ".into())), "Acme");
        check.required("designation", Some("   ".into()));
        check.required("description", None);

        let err = check.finish().unwrap_err();
        let body = err.to_json();
        assert_eq!(err.status_code(), 400);
        assert_eq!(body["message"], "Invalid fields: designation, description");
        assert_eq!(body["field_errors"]["designation"], "is required");
        assert!(body["field_errors"].get("name").is_none());
    }

    #[test]
    fn provided_allows_absence_but_not_blank() {
        let mut check = FieldCheck::new();
        assert_eq!(check.provided("city", None), None);
        assert!(check.is_ok());
        assert_eq!(check.provided("city", Some("".into())), None);
        assert_eq!(
            check.finish().unwrap_err().message(),
            "city: must not be empty"
        );
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("a@b.com"));
        assert!(looks_like_email("first.last+tag@sub.example.org"));
        for bad in ["", "plain", "@b.com", "a@b", "a@.com", "a b@c.com", "a@b@c.com"] {
            assert!(!looks_like_email(bad), "{}", bad);
        }
    }

    #[test]
    fn unparsable_ids_are_not_found() {
        let err = parse_id::<Client>("not-an-id").unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "Client not found");
        assert!(parse_id::<Client>(&Uuid::new_v4().to_string()).is_ok());
    }
}
