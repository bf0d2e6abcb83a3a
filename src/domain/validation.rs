use crate::error::{PaymentError, Result};

/// Validation contract of the payment API's request objects.
///
/// Mirrors the schema check the API performs server-side, so a payload that
/// passes here will not be rejected for shape reasons.
pub trait Validate {
    /// Entity name used in error messages and logs.
    const ENTITY: &'static str;

    fn list_invalid_properties(&self) -> Vec<String>;

    fn valid(&self) -> bool {
        self.list_invalid_properties().is_empty()
    }

    /// Returns `self` when valid, otherwise logs and fails with
    /// [`PaymentError::InvalidPayload`].
    fn ensure_valid(self) -> Result<Self>
    where
        Self: Sized,
    {
        let properties = self.list_invalid_properties();
        if properties.is_empty() {
            return Ok(self);
        }
        tracing::error!(entity = Self::ENTITY, ?properties, "payload invalid");
        Err(PaymentError::InvalidPayload {
            entity: Self::ENTITY,
            properties,
        })
    }
}

/// Accumulates invalid-property messages.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<String>);

impl Violations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn required(&mut self, property: &str, value: Option<&str>) -> &mut Self {
        if value.is_none_or(str::is_empty) {
            self.0.push(format!("'{property}' can't be null"));
        }
        self
    }

    pub(crate) fn max_length(&mut self, property: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value
            && value.chars().count() > max
        {
            self.0.push(format!(
                "invalid value for '{property}', the character length must be smaller than or equal to {max}."
            ));
        }
        self
    }

    pub(crate) fn min_length(&mut self, property: &str, value: Option<&str>, min: usize) -> &mut Self {
        if let Some(value) = value
            && value.chars().count() < min
        {
            self.0.push(format!(
                "invalid value for '{property}', the character length must be bigger than or equal to {min}."
            ));
        }
        self
    }

    pub(crate) fn check(&mut self, condition: bool, message: impl Into<String>) -> &mut Self {
        if !condition {
            self.0.push(message.into());
        }
        self
    }

    pub(crate) fn into_inner(self) -> Vec<String> {
        self.0
    }
}
