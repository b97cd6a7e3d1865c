use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationErrors};

const USERNAME_CHARS: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(String::deserialize(deserializer)?.trim().to_owned())
}

fn lowercase<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(String::deserialize(deserializer)?.trim().to_lowercase())
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty()))
}

/// Flattens validator output into user-facing messages, in a stable order.
pub fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut out: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field}: invalid value"),
            })
        })
        .collect();
    out.sort();
    out
}

fn problems_of(form: &impl Validate) -> Vec<String> {
    match form.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => messages(&errors),
    }
}

fn username_chars_ok(username: &str) -> bool {
    username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct RoomForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200, message = "Topic is required and may be at most 200 characters."))]
    pub topic: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200, message = "Name is required and may be at most 200 characters."))]
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
}

impl RoomForm {
    pub fn problems(&self) -> Vec<String> {
        problems_of(self)
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct MessageForm {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Message body is required."))]
    pub body: String,
}

impl MessageForm {
    pub fn problems(&self) -> Vec<String> {
        problems_of(self)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default, deserialize_with = "lowercase")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub return_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(default, deserialize_with = "lowercase")]
    #[validate(length(min = 1, max = 150, message = "Username is required and may be at most 150 characters."))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "This password is too short. It must contain at least 8 characters."))]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl RegisterForm {
    pub fn problems(&self) -> Vec<String> {
        let mut problems = problems_of(self);
        if !username_chars_ok(&self.username) {
            problems.push(USERNAME_CHARS.to_owned());
        }
        if !self.password1.is_empty() && self.password1.chars().all(|c| c.is_ascii_digit()) {
            problems.push("This password is entirely numeric.".to_owned());
        }
        if self.password1 != self.password2 {
            problems.push("The two password fields didn't match.".to_owned());
        }
        problems
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AccountForm {
    #[serde(default, deserialize_with = "lowercase")]
    #[validate(length(min = 1, max = 150, message = "Username is required and may be at most 150 characters."))]
    pub username: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
}

impl AccountForm {
    pub fn problems(&self) -> Vec<String> {
        let mut problems = problems_of(self);
        if !username_chars_ok(&self.username) {
            problems.push(USERNAME_CHARS.to_owned());
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, password1: &str, password2: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_owned(),
            password1: password1.to_owned(),
            password2: password2.to_owned(),
        }
    }

    #[test]
    fn room_form_requires_topic_and_name() {
        let form = RoomForm::default();
        let problems = form.problems();
        assert_eq!(problems.len(), 2);

        let form = RoomForm {
            topic: "Rust".to_owned(),
            name: "Borrowck support group".to_owned(),
            description: None,
        };
        assert!(form.problems().is_empty());
    }

    #[test]
    fn room_name_is_capped() {
        let form = RoomForm {
            topic: "Rust".to_owned(),
            name: "x".repeat(201),
            description: None,
        };
        assert_eq!(form.problems(), vec!["Name is required and may be at most 200 characters.".to_owned()]);
    }

    #[test]
    fn message_form_rejects_empty_body() {
        assert_eq!(MessageForm::default().problems(), vec!["Message body is required.".to_owned()]);
    }

    #[test]
    fn register_checks_passwords() {
        assert!(register("alice", "correct horse", "correct horse").problems().is_empty());
        assert!(register("alice", "short", "short").problems()[0].contains("too short"));
        assert!(register("alice", "12345678", "12345678").problems().contains(&"This password is entirely numeric.".to_owned()));
        assert!(register("alice", "correct horse", "battery staple").problems().contains(&"The two password fields didn't match.".to_owned()));
    }

    #[test]
    fn register_checks_username_characters() {
        assert!(register("al ice", "correct horse", "correct horse").problems().contains(&USERNAME_CHARS.to_owned()));
        assert!(register("a.l+i-c_e@x", "correct horse", "correct horse").problems().is_empty());
    }

    #[test]
    fn account_email_is_optional_but_checked() {
        let ok = AccountForm { username: "alice".to_owned(), email: None };
        assert!(ok.problems().is_empty());

        let bad = AccountForm { username: "alice".to_owned(), email: Some("not-an-email".to_owned()) };
        assert_eq!(bad.problems(), vec!["Enter a valid email address.".to_owned()]);
    }
}
