//! Checkout form input and per-field validation.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use vitashop_core::{Email, EmailError};

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10,15}$").expect("Invalid regex"));

/// Raw checkout form values, as typed by the customer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub message: String,
}

/// Validated customer details, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub message: Option<String>,
}

/// A validated form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
}

impl FormField {
    /// Field name as used in the form and the order payload.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

/// Every field that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(&self.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn for_field(&self, field: FormField) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl CheckoutForm {
    /// Validate every field and collect all failures.
    ///
    /// # Errors
    ///
    /// Returns `ValidationErrors` listing each invalid field.
    pub fn validate(&self) -> Result<CustomerDetails, ValidationErrors> {
        let mut errors = Vec::new();
        let mut fail = |field, message: &str| {
            errors.push(FieldError {
                field,
                message: message.to_string(),
            });
        };

        let first_name = self.first_name.trim();
        if first_name.is_empty() {
            fail(FormField::FirstName, "First name is required");
        }

        let last_name = self.last_name.trim();
        if last_name.is_empty() {
            fail(FormField::LastName, "Last name is required");
        }

        let email = match Email::parse(self.email.trim()) {
            Ok(email) => Some(email),
            Err(EmailError::Empty) => {
                fail(FormField::Email, "Email is required");
                None
            }
            Err(_) => {
                fail(FormField::Email, "Enter a valid email address");
                None
            }
        };

        let phone = self.phone.trim();
        if phone.is_empty() {
            fail(FormField::Phone, "Phone is required");
        } else if !PHONE_RE.is_match(phone) {
            fail(FormField::Phone, "Phone must be 10 to 15 digits");
        }

        let address = self.address.trim();
        if address.is_empty() {
            fail(FormField::Address, "Address is required");
        }

        match email {
            Some(email) if errors.is_empty() => Ok(CustomerDetails {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email,
                phone: phone.to_string(),
                address: address.to_string(),
                message: Some(self.message.trim())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string),
            }),
            _ => Err(ValidationErrors { errors }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "0123456789".to_string(),
            address: "1 Analytical St".to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn test_valid_form() {
        let details = valid_form().validate().unwrap();
        assert_eq!(details.email.as_str(), "ada@example.com");
        assert!(details.message.is_none());
    }

    #[test]
    fn test_values_are_trimmed() {
        let form = CheckoutForm {
            first_name: "  Ada ".to_string(),
            message: "  leave at door ".to_string(),
            ..valid_form()
        };
        let details = form.validate().unwrap();
        assert_eq!(details.first_name, "Ada");
        assert_eq!(details.message.as_deref(), Some("leave at door"));
    }

    #[test]
    fn test_email_without_dot_in_domain_rejected() {
        let form = CheckoutForm {
            email: "a@b".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.for_field(FormField::Email).is_some());
    }

    #[test]
    fn test_phone_rules() {
        for phone in ["123456789", "1234567890123456", "012-345-6789", "+201234567890"] {
            let form = CheckoutForm {
                phone: phone.to_string(),
                ..valid_form()
            };
            let errors = form.validate().unwrap_err();
            assert_eq!(
                errors.for_field(FormField::Phone),
                Some("Phone must be 10 to 15 digits"),
                "{phone}"
            );
        }

        for phone in ["1234567890", "123456789012345"] {
            let form = CheckoutForm {
                phone: phone.to_string(),
                ..valid_form()
            };
            assert!(form.validate().is_ok(), "{phone}");
        }
    }

    #[test]
    fn test_all_failures_reported() {
        let errors = CheckoutForm::default().validate().unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                FormField::FirstName,
                FormField::LastName,
                FormField::Email,
                FormField::Phone,
                FormField::Address,
            ]
        );
        assert_eq!(
            errors.for_field(FormField::Email),
            Some("Email is required")
        );
    }

    #[test]
    fn test_blank_names_rejected() {
        let form = CheckoutForm {
            first_name: "   ".to_string(),
            address: "\t".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.to_string().contains("firstName: First name is required"));
    }
}
