/// Collects human-readable validation failures for a request body
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(format!("{} is required", field));
        }
        self
    }

    /// Only checked when the value is present; `required` reports absence
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.trim().is_empty() && !is_valid_email(value) {
            self.errors.push(format!("{} must be a valid email address", field));
        }
        self
    }

    /// Zero counts as missing, negatives are rejected
    pub fn positive_amount(&mut self, field: &str, value: i64) -> &mut Self {
        if value == 0 {
            self.errors.push(format!("{} is required", field));
        } else if value < 0 {
            self.errors.push(format!("{} must not be negative", field));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), Vec<String>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}
