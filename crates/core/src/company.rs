//! Company profiles shown on the settings page.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// A company as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: DbId,
    pub com_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub gst: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// URL of the stored logo, if any.
    #[serde(default)]
    pub logo: Option<String>,
}

/// A logo file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// What to do with the company logo on save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogoChange {
    #[default]
    Keep,
    Replace(LogoUpload),
    Clear,
}

/// Create/edit form for a company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyForm {
    pub name: String,
    pub address: String,
    pub tax_id: String,
    pub phone: String,
    pub email: String,
    pub logo: LogoChange,
    existing_logo: Option<String>,
}

impl CompanyForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill the form from a stored company, keeping its logo.
    pub fn for_edit(company: &Company) -> Self {
        Self {
            name: company.com_name.clone(),
            address: company.address.clone(),
            tax_id: company.gst.clone().unwrap_or_default(),
            phone: company.phone.clone().unwrap_or_default(),
            email: company.email.clone().unwrap_or_default(),
            logo: LogoChange::Keep,
            existing_logo: company.logo.clone(),
        }
    }

    pub fn existing_logo(&self) -> Option<&str> {
        self.existing_logo.as_deref()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() || self.address.trim().is_empty() {
            return Err(CoreError::Validation(
                "Company Name and Billing Address are required.".to_string(),
            ));
        }
        Ok(())
    }

    /// Text parts of the multipart body, in wire names.
    pub fn text_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("company_name", self.name.as_str()),
            ("address", self.address.as_str()),
            ("gst", self.tax_id.as_str()),
            ("phone", self.phone.as_str()),
            ("email", self.email.as_str()),
        ]
    }

    /// The new logo file, when one was picked.
    pub fn logo_upload(&self) -> Option<&LogoUpload> {
        match &self.logo {
            LogoChange::Replace(upload) => Some(upload),
            LogoChange::Keep | LogoChange::Clear => None,
        }
    }

    /// True when saving must ask the backend to drop a stored logo.
    pub fn clears_logo(&self) -> bool {
        matches!(self.logo, LogoChange::Clear) && self.existing_logo.is_some()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn stored() -> Company {
        Company {
            id: 4,
            com_name: "Rajib Electricals".to_string(),
            address: "12 Park Street".to_string(),
            gst: Some("19ABCDE1234F1Z5".to_string()),
            phone: None,
            email: Some("office@example.com".to_string()),
            logo: Some("/uploads/logo.png".to_string()),
        }
    }

    #[test]
    fn name_and_address_are_required() {
        let mut form = CompanyForm::new();
        form.name = "Acme".to_string();
        form.address = "   ".to_string();

        assert_matches!(
            form.validate(),
            Err(CoreError::Validation(msg)) if msg == "Company Name and Billing Address are required."
        );

        form.address = "1 Main Road".to_string();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn edit_form_is_prefilled() {
        let form = CompanyForm::for_edit(&stored());

        assert_eq!(form.name, "Rajib Electricals");
        assert_eq!(form.tax_id, "19ABCDE1234F1Z5");
        assert_eq!(form.phone, "");
        assert_eq!(form.logo, LogoChange::Keep);
        assert_eq!(form.existing_logo(), Some("/uploads/logo.png"));
        assert_eq!(form.text_fields()[2], ("gst", "19ABCDE1234F1Z5"));
    }

    #[test]
    fn clearing_only_applies_to_a_stored_logo() {
        let mut edit = CompanyForm::for_edit(&stored());
        edit.logo = LogoChange::Clear;
        assert!(edit.clears_logo());

        let mut create = CompanyForm::new();
        create.logo = LogoChange::Clear;
        assert!(!create.clears_logo());
    }

    #[test]
    fn replacement_exposes_upload() {
        let mut form = CompanyForm::for_edit(&stored());
        form.logo = LogoChange::Replace(LogoUpload {
            file_name: "new.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        });

        assert_eq!(form.logo_upload().map(|u| u.file_name.as_str()), Some("new.png"));
        assert!(!form.clears_logo());
    }

    #[test]
    fn company_tolerates_missing_optional_fields() {
        let company: Company =
            serde_json::from_str(r#"{"id": 1, "com_name": "Acme", "logo": null}"#).unwrap();
        assert_eq!(company.address, "");
        assert_eq!(company.logo, None);
    }
}
