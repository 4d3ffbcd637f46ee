//! Client-side form validation.
//!
//! Required fields, password rules, and email shape are checked before
//! any network call; failures are reported per field and block
//! submission. The backend re-validates everything; this layer exists
//! so obvious mistakes never cost a round trip.

use chrono::NaiveDate;

/// Minimum password length for registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Login form checks: both fields present, email well-formed.
pub fn validate_login(email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "email is required"));
    } else if !email_is_well_formed(email) {
        errors.push(FieldError::new("email", "email address looks invalid"));
    }
    if password.is_empty() {
        errors.push(FieldError::new("password", "password is required"));
    }
    errors
}

/// Registration form fields.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
    pub location: String,
}

pub fn validate_registration(form: &RegistrationForm) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if form.name.trim().is_empty() {
        errors.push(FieldError::new("name", "name is required"));
    }
    if form.email.trim().is_empty() {
        errors.push(FieldError::new("email", "email is required"));
    } else if !email_is_well_formed(&form.email) {
        errors.push(FieldError::new("email", "email address looks invalid"));
    }
    if form.password.len() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if form.password != form.confirm_password {
        errors.push(FieldError::new("confirm_password", "passwords do not match"));
    }
    // Admin accounts are provisioned server-side, never self-registered
    if !matches!(form.role.as_str(), "user" | "host") {
        errors.push(FieldError::new("role", "role must be 'user' or 'host'"));
    }
    if form.location.trim().is_empty() {
        errors.push(FieldError::new("location", "location is required"));
    }
    errors
}

/// Event creation/edit form fields, date still unparsed.
#[derive(Debug, Clone)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub category: String,
    pub date: String,
    pub location: String,
    pub capacity: u32,
    pub fee: f64,
}

impl EventForm {
    /// The schedule date, when it parses as `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

pub fn validate_event_form(form: &EventForm, today: NaiveDate) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if form.title.trim().is_empty() {
        errors.push(FieldError::new("title", "title is required"));
    }
    match form.parsed_date() {
        None => errors.push(FieldError::new("date", "date must be YYYY-MM-DD")),
        Some(date) if date < today => {
            errors.push(FieldError::new("date", "date must not be in the past"));
        }
        Some(_) => {}
    }
    if form.capacity == 0 {
        errors.push(FieldError::new("capacity", "capacity must be at least 1"));
    }
    if form.fee < 0.0 {
        errors.push(FieldError::new("fee", "fee must not be negative"));
    }
    errors
}

/// Cheap shape check: one `@`, non-empty local part, dotted domain, no
/// whitespace. The backend does the real validation.
fn email_is_well_formed(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegistrationForm {
        RegistrationForm {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            role: "user".into(),
            location: "Berlin".into(),
        }
    }

    #[test]
    fn valid_login_passes() {
        assert!(validate_login("ann@example.com", "pw").is_empty());
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = validate_login("", "");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "email");
        assert_eq!(errors[1].field, "password");
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(email_is_well_formed("a@b.co"));
        assert!(!email_is_well_formed("no-at-sign"));
        assert!(!email_is_well_formed("@missing.local"));
        assert!(!email_is_well_formed("a@nodot"));
        assert!(!email_is_well_formed("a b@x.com"));
        assert!(!email_is_well_formed("a@.leading.dot"));
    }

    #[test]
    fn valid_registration_passes() {
        assert!(validate_registration(&form()).is_empty());
    }

    #[test]
    fn short_password_is_rejected() {
        let mut bad = form();
        bad.password = "abc".into();
        bad.confirm_password = "abc".into();
        let errors = validate_registration(&bad);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password");
    }

    #[test]
    fn mismatched_passwords_are_rejected() {
        let mut bad = form();
        bad.confirm_password = "different1".into();
        let errors = validate_registration(&bad);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "confirm_password");
    }

    #[test]
    fn admin_cannot_self_register() {
        let mut bad = form();
        bad.role = "admin".into();
        let errors = validate_registration(&bad);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "role");
    }

    fn event_form(date: &str) -> EventForm {
        EventForm {
            title: "Picnic".into(),
            description: String::new(),
            category: "outdoors".into(),
            date: date.into(),
            location: "Park".into(),
            capacity: 10,
            fee: 0.0,
        }
    }

    #[test]
    fn event_form_rejects_garbage_date() {
        let today = "2024-06-01".parse().unwrap();
        let errors = validate_event_form(&event_form("next tuesday"), today);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "date");
    }

    #[test]
    fn event_form_rejects_past_date() {
        let today = "2024-06-01".parse().unwrap();
        let errors = validate_event_form(&event_form("2024-05-31"), today);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "date");
    }

    #[test]
    fn event_form_accepts_today() {
        let today = "2024-06-01".parse().unwrap();
        assert!(validate_event_form(&event_form("2024-06-01"), today).is_empty());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let today = "2024-06-01".parse().unwrap();
        let mut bad = event_form("2024-06-10");
        bad.capacity = 0;
        let errors = validate_event_form(&bad, today);
        assert_eq!(errors[0].field, "capacity");
    }
}
