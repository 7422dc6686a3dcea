//! Contact types.

use serde::{Deserialize, Serialize};

/// The seven text fields the extraction service must return, in schema order.
pub const FIELD_NAMES: [&str; 7] = [
    "name", "title", "company", "phone", "email", "website", "address",
];

/// Structured contact fields read from a business card.
///
/// Every field is a plain string; a field that is not on the card is the
/// empty string, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFields {
    /// Full name of the person.
    pub name: String,
    /// Job title or position.
    pub title: String,
    /// Company or organization.
    pub company: String,
    /// Primary phone number.
    pub phone: String,
    /// Primary email address.
    pub email: String,
    /// Company or personal website.
    pub website: String,
    /// Full physical address.
    pub address: String,
}

impl ContactFields {
    /// Create an empty set of fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = value.into();
        self
    }

    /// Set the title.
    pub fn title(mut self, value: impl Into<String>) -> Self {
        self.title = value.into();
        self
    }

    /// Set the company.
    pub fn company(mut self, value: impl Into<String>) -> Self {
        self.company = value.into();
        self
    }

    /// Set the phone number.
    pub fn phone(mut self, value: impl Into<String>) -> Self {
        self.phone = value.into();
        self
    }

    /// Set the email address.
    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = value.into();
        self
    }

    /// Set the website.
    pub fn website(mut self, value: impl Into<String>) -> Self {
        self.website = value.into();
        self
    }

    /// Set the address.
    pub fn address(mut self, value: impl Into<String>) -> Self {
        self.address = value.into();
        self
    }

    /// Look up a field by its wire name.
    pub fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            "name" => &self.name,
            "title" => &self.title,
            "company" => &self.company,
            "phone" => &self.phone,
            "email" => &self.email,
            "website" => &self.website,
            "address" => &self.address,
            _ => return None,
        };
        Some(value)
    }

    /// Mutable access to a field by its wire name.
    pub fn get_mut(&mut self, field: &str) -> Option<&mut String> {
        let value = match field {
            "name" => &mut self.name,
            "title" => &mut self.title,
            "company" => &mut self.company,
            "phone" => &mut self.phone,
            "email" => &mut self.email,
            "website" => &mut self.website,
            "address" => &mut self.address,
            _ => return None,
        };
        Some(value)
    }

    /// Whether every field is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        FIELD_NAMES
            .iter()
            .filter_map(|f| self.get(f))
            .all(|v| v.trim().is_empty())
    }

    /// The website as a navigable URL.
    ///
    /// Adds an `https://` scheme when the stored value has none.
    pub fn website_url(&self) -> Option<String> {
        let site = self.website.trim();
        if site.is_empty() {
            return None;
        }
        let lower = site.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Some(site.to_string())
        } else {
            Some(format!("https://{}", site))
        }
    }

    /// A `tel:` link for the phone number.
    pub fn phone_link(&self) -> Option<String> {
        let phone = self.phone.trim();
        (!phone.is_empty()).then(|| format!("tel:{}", phone))
    }

    /// A `mailto:` link for the email address.
    pub fn email_link(&self) -> Option<String> {
        let email = self.email.trim();
        (!email.is_empty()).then(|| format!("mailto:{}", email))
    }
}

/// A scanned card that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    /// Extracted contact fields.
    #[serde(flatten)]
    pub fields: ContactFields,
    /// The normalized card image as a `data:` URL.
    pub card_image: String,
}

impl CardDraft {
    /// Create a draft from extracted fields and the image they came from.
    pub fn new(fields: ContactFields, card_image: impl Into<String>) -> Self {
        Self {
            fields,
            card_image: card_image.into(),
        }
    }
}

/// A stored contact record.
///
/// Serialized with the field names of the collection file: the seven
/// contact fields at the top level alongside `id` and `cardImage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    /// Unique, creation-ordered identifier.
    pub id: String,
    /// Contact fields.
    #[serde(flatten)]
    pub fields: ContactFields,
    /// The normalized card image as a `data:` URL.
    pub card_image: String,
}

impl ContactRecord {
    /// Build a record from a draft under the given id.
    pub fn from_draft(id: impl Into<String>, draft: CardDraft) -> Self {
        Self {
            id: id.into(),
            fields: draft.fields,
            card_image: draft.card_image,
        }
    }

    /// The record's content without its id.
    pub fn to_draft(&self) -> CardDraft {
        CardDraft {
            fields: self.fields.clone(),
            card_image: self.card_image.clone(),
        }
    }
}
