use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::ValueObject;

pub const DEFAULT_COUNTRY: &str = "United States";

/// Address fields that must not be blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    Name,
    Street,
    City,
    State,
    ZipCode,
    Phone,
}

impl AddressField {
    pub fn as_str(self) -> &'static str {
        match self {
            AddressField::Name => "name",
            AddressField::Street => "street",
            AddressField::City => "city",
            AddressField::State => "state",
            AddressField::ZipCode => "zip_code",
            AddressField::Phone => "phone",
        }
    }
}

/// Every blank required field, in form order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("missing required address fields: {}", fields_list(.missing))]
pub struct AddressError {
    pub missing: Vec<AddressField>,
}

fn fields_list(fields: &[AddressField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
}

impl Default for ShippingAddress {
    fn default() -> Self {
        Self {
            name: String::new(),
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            phone: String::new(),
        }
    }
}

impl ShippingAddress {
    /// Country is optional; all other fields must contain non-whitespace text.
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            (AddressField::Name, &self.name),
            (AddressField::Street, &self.street),
            (AddressField::City, &self.city),
            (AddressField::State, &self.state),
            (AddressField::ZipCode, &self.zip_code),
            (AddressField::Phone, &self.phone),
        ];

        let missing: Vec<_> = required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AddressError { missing })
        }
    }
}

impl ValueObject for ShippingAddress {}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ShippingAddress {
        ShippingAddress {
            name: "Ada Lovelace".into(),
            street: "12 Analytical Way".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip_code: "62701".into(),
            phone: "555-0100".into(),
            ..ShippingAddress::default()
        }
    }

    #[test]
    fn complete_address_is_valid() {
        assert_eq!(complete().validate(), Ok(()));
    }

    #[test]
    fn default_country_is_prefilled() {
        assert_eq!(ShippingAddress::default().country, DEFAULT_COUNTRY);
    }

    #[test]
    fn reports_every_blank_field() {
        let address = ShippingAddress {
            city: "   ".into(),
            phone: String::new(),
            ..complete()
        };

        let err = address.validate().unwrap_err();
        assert_eq!(err.missing, vec![AddressField::City, AddressField::Phone]);
        assert_eq!(err.to_string(), "missing required address fields: city, phone");
    }

    #[test]
    fn country_is_not_required() {
        let address = ShippingAddress {
            country: String::new(),
            ..complete()
        };
        assert!(address.validate().is_ok());
    }
}
