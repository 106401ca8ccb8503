//! The subscription submission object.
//!
//! Front ends build a [`SubscriptionSubmission`] and POST it to the
//! storefront as JSON:
//!
//! ```json
//! {
//!   "planId": "standard",
//!   "brands": [{ "brandId": "brand_juan_valdez", "grindId": "espresso" }],
//!   "customer": { "name": "A", "lastname": "B", "email": "a@b.com", "phone": "1", "address": "x" }
//! }
//! ```
//!
//! Every field deserializes leniently (missing becomes empty) so that an
//! incomplete payload is reported by [`SubscriptionSubmission::validate`]
//! rather than by the JSON decoder.
//!
//! Grind ids are not checked against the brand's grind options here; that
//! check belongs to the form that offered the options.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Email, EmailError};

/// Reasons a submission is rejected before any persistence is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("incomplete data: planId is required")]
    MissingPlan,

    #[error("incomplete data: customer is required")]
    MissingCustomer,

    #[error("incomplete data: at least one brand is required")]
    NoBrands,

    #[error("incomplete data: customer {0} is required")]
    MissingCustomerField(&'static str),

    #[error("incomplete data: brands[{index}].{field} is required")]
    MissingBrandField { index: usize, field: &'static str },

    #[error("invalid customer email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// A subscription request as sent by a front end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSubmission {
    #[serde(default)]
    pub plan_id: String,
    #[serde(default)]
    pub brands: Vec<BrandSelection>,
    #[serde(default)]
    pub customer: Option<CustomerDetails>,
}

/// One (brand, grind) pairing within a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandSelection {
    pub brand_id: String,
    pub grind_id: String,
}

/// Customer contact details as entered in the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerDetails {
    pub name: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// A submission whose required fields are present and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    plan_id: String,
    brands: Vec<BrandSelection>,
    customer: ValidatedCustomer,
}

/// Customer details after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCustomer {
    pub name: String,
    pub lastname: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
}

impl BrandSelection {
    #[must_use]
    pub fn new(brand_id: impl Into<String>, grind_id: impl Into<String>) -> Self {
        Self {
            brand_id: brand_id.into(),
            grind_id: grind_id.into(),
        }
    }
}

impl SubscriptionSubmission {
    /// A submission with a single brand line.
    #[must_use]
    pub fn single(
        plan_id: impl Into<String>,
        brand: BrandSelection,
        customer: CustomerDetails,
    ) -> Self {
        Self {
            plan_id: plan_id.into(),
            brands: vec![brand],
            customer: Some(customer),
        }
    }

    /// Check required fields and produce a [`ValidatedSubmission`].
    ///
    /// # Errors
    ///
    /// Returns the first [`SubmissionError`] found, checking the plan, then
    /// the customer, then the brand lines.
    pub fn validate(&self) -> Result<ValidatedSubmission, SubmissionError> {
        let plan_id = self.plan_id.trim();
        if plan_id.is_empty() {
            return Err(SubmissionError::MissingPlan);
        }

        let customer = self
            .customer
            .as_ref()
            .ok_or(SubmissionError::MissingCustomer)?
            .validate()?;

        if self.brands.is_empty() {
            return Err(SubmissionError::NoBrands);
        }
        let brands = self
            .brands
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let brand_id = line.brand_id.trim();
                let grind_id = line.grind_id.trim();
                if brand_id.is_empty() {
                    return Err(SubmissionError::MissingBrandField {
                        index,
                        field: "brandId",
                    });
                }
                if grind_id.is_empty() {
                    return Err(SubmissionError::MissingBrandField {
                        index,
                        field: "grindId",
                    });
                }
                Ok(BrandSelection::new(brand_id, grind_id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValidatedSubmission {
            plan_id: plan_id.to_owned(),
            brands,
            customer,
        })
    }
}

impl CustomerDetails {
    fn validate(&self) -> Result<ValidatedCustomer, SubmissionError> {
        let required = |field: &'static str, value: &str| {
            let value = value.trim();
            if value.is_empty() {
                Err(SubmissionError::MissingCustomerField(field))
            } else {
                Ok(value.to_owned())
            }
        };

        let name = required("name", &self.name)?;
        let lastname = required("lastname", &self.lastname)?;
        let email = required("email", &self.email)?;
        let phone = required("phone", &self.phone)?;
        let address = required("address", &self.address)?;

        Ok(ValidatedCustomer {
            name,
            lastname,
            email: Email::parse(&email)?,
            phone,
            address,
        })
    }
}

impl ValidatedSubmission {
    #[must_use]
    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    /// Brand lines; never empty.
    #[must_use]
    pub fn brands(&self) -> &[BrandSelection] {
        &self.brands
    }

    #[must_use]
    pub const fn customer(&self) -> &ValidatedCustomer {
        &self.customer
    }
}
