//! Subscription form controller.
//!
//! Holds the selection state of the subscription form: plan, brand and grind
//! selects populated from the session catalog, plus the customer fields.
//! Changing the brand repopulates the grind options from that brand only.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use url::Url;

use coffee_box_core::{BrandSelection, CustomerDetails, SubscriptionSubmission};

use crate::catalog::Session;

/// Message shown when a required form field is empty.
pub const INCOMPLETE_MESSAGE: &str = "Please fill in all the form fields.";

/// Errors raised by the form before anything is stored or sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// One or more required fields are empty; `missing` names them in form order.
    #[error("Please fill in all the form fields.")]
    Incomplete { missing: Vec<&'static str> },

    #[error("unknown plan: {0}")]
    UnknownPlan(String),

    #[error("unknown coffee brand: {0}")]
    UnknownBrand(String),

    #[error("grind {grind_id} is not offered for {brand_id}")]
    GrindNotOffered { brand_id: String, grind_id: String },
}

/// One entry of a select input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Customer text inputs of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    Name,
    Lastname,
    Email,
    Phone,
    Address,
}

impl CustomerField {
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Lastname,
        Self::Email,
        Self::Phone,
        Self::Address,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Lastname => "lastname",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
        }
    }

    const fn value(self, customer: &CustomerDetails) -> &String {
        match self {
            Self::Name => &customer.name,
            Self::Lastname => &customer.lastname,
            Self::Email => &customer.email,
            Self::Phone => &customer.phone,
            Self::Address => &customer.address,
        }
    }

    const fn value_mut(self, customer: &mut CustomerDetails) -> &mut String {
        match self {
            Self::Name => &mut customer.name,
            Self::Lastname => &mut customer.lastname,
            Self::Email => &mut customer.email,
            Self::Phone => &mut customer.phone,
            Self::Address => &mut customer.address,
        }
    }
}

/// State of one subscription form bound to a session catalog.
#[derive(Debug, Clone)]
pub struct SubscriptionForm {
    session: Session,
    plan_options: Vec<SelectOption>,
    brand_options: Vec<SelectOption>,
    grind_options: Vec<SelectOption>,
    plan_id: Option<String>,
    brand_id: Option<String>,
    grind_id: Option<String>,
    customer: CustomerDetails,
}

impl SubscriptionForm {
    /// Populate the selects from the session catalog with the first plan and
    /// brand selected.
    #[must_use]
    pub fn new(session: &Session) -> Self {
        let catalog = session.catalog();
        let plan_options = catalog
            .plans
            .iter()
            .map(|plan| SelectOption {
                value: plan.id.clone(),
                label: format!("{} - ${}", plan.name, format_cop(plan.price_monthly)),
            })
            .collect();
        let brand_options = catalog
            .coffee_brands
            .iter()
            .map(|brand| SelectOption {
                value: brand.id.clone(),
                label: format!("{} ({})", brand.name, brand.origin),
            })
            .collect();

        let mut form = Self {
            session: session.clone(),
            plan_options,
            brand_options,
            grind_options: Vec::new(),
            plan_id: None,
            brand_id: None,
            grind_id: None,
            customer: CustomerDetails::default(),
        };
        form.select_defaults();
        form
    }

    fn select_defaults(&mut self) {
        self.plan_id = self.plan_options.first().map(|o| o.value.clone());
        self.brand_id = self.brand_options.first().map(|o| o.value.clone());
        self.refresh_grinds();
    }

    /// Repopulate grind options from the selected brand; the first one
    /// becomes the selection.
    fn refresh_grinds(&mut self) {
        let options = self
            .brand_id
            .as_deref()
            .and_then(|id| self.session.catalog().grind_options(id));

        self.grind_options = options
            .unwrap_or_default()
            .iter()
            .map(|g| SelectOption {
                value: g.id.clone(),
                label: g.label.clone(),
            })
            .collect();
        self.grind_id = self.grind_options.first().map(|o| o.value.clone());
    }

    /// Select a plan.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownPlan`] and keeps the current selection if
    /// the catalog has no such plan.
    pub fn select_plan(&mut self, plan_id: &str) -> Result<(), FormError> {
        if self.session.catalog().plan(plan_id).is_none() {
            return Err(FormError::UnknownPlan(plan_id.to_owned()));
        }
        self.plan_id = Some(plan_id.to_owned());
        Ok(())
    }

    /// Preselect the plan named by the `plan` query parameter of a page URL.
    ///
    /// Returns whether a plan was selected. An unknown plan is logged and
    /// ignored: the current selection is kept rather than cleared.
    pub fn preselect_plan_from_url(&mut self, url: &Url) -> bool {
        let Some((_, plan_id)) = url.query_pairs().find(|(key, _)| key == "plan") else {
            return false;
        };

        match self.select_plan(&plan_id) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring plan query parameter");
                false
            }
        }
    }

    /// Select a brand and repopulate its grind options.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownBrand`] if the catalog has no such brand;
    /// the brand selection and grind options are cleared in that case.
    pub fn select_brand(&mut self, brand_id: &str) -> Result<(), FormError> {
        if self.session.catalog().brand(brand_id).is_none() {
            self.brand_id = None;
            self.refresh_grinds();
            return Err(FormError::UnknownBrand(brand_id.to_owned()));
        }
        self.brand_id = Some(brand_id.to_owned());
        self.refresh_grinds();
        Ok(())
    }

    /// Select one of the grind options of the current brand.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::GrindNotOffered`] if the grind is not among the
    /// current options.
    pub fn select_grind(&mut self, grind_id: &str) -> Result<(), FormError> {
        if !self.grind_options.iter().any(|o| o.value == grind_id) {
            return Err(FormError::GrindNotOffered {
                brand_id: self.brand_id.clone().unwrap_or_default(),
                grind_id: grind_id.to_owned(),
            });
        }
        self.grind_id = Some(grind_id.to_owned());
        Ok(())
    }

    pub fn set_customer_field(&mut self, field: CustomerField, value: impl Into<String>) {
        *field.value_mut(&mut self.customer) = value.into();
    }

    #[must_use]
    pub fn customer_field(&self, field: CustomerField) -> &str {
        field.value(&self.customer)
    }

    #[must_use]
    pub fn plan_options(&self) -> &[SelectOption] {
        &self.plan_options
    }

    #[must_use]
    pub fn brand_options(&self) -> &[SelectOption] {
        &self.brand_options
    }

    #[must_use]
    pub fn grind_options(&self) -> &[SelectOption] {
        &self.grind_options
    }

    #[must_use]
    pub fn selected_plan(&self) -> Option<&str> {
        self.plan_id.as_deref()
    }

    #[must_use]
    pub fn selected_brand(&self) -> Option<&str> {
        self.brand_id.as_deref()
    }

    #[must_use]
    pub fn selected_grind(&self) -> Option<&str> {
        self.grind_id.as_deref()
    }

    /// Build the submission object from the current state.
    ///
    /// Every field is trimmed and required.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Incomplete`] naming the empty fields.
    pub fn submit(&self) -> Result<SubscriptionSubmission, FormError> {
        let trimmed = |value: Option<&str>| value.map(str::trim).unwrap_or_default().to_owned();

        let plan_id = trimmed(self.selected_plan());
        let brand_id = trimmed(self.selected_brand());
        let grind_id = trimmed(self.selected_grind());
        let customer = CustomerDetails {
            name: self.customer.name.trim().to_owned(),
            lastname: self.customer.lastname.trim().to_owned(),
            email: self.customer.email.trim().to_owned(),
            phone: self.customer.phone.trim().to_owned(),
            address: self.customer.address.trim().to_owned(),
        };

        let mut missing = Vec::new();
        for (field, value) in [("plan", &plan_id), ("brand", &brand_id), ("grind", &grind_id)] {
            if value.is_empty() {
                missing.push(field);
            }
        }
        for field in CustomerField::ALL {
            if field.value(&customer).is_empty() {
                missing.push(field.as_str());
            }
        }
        if !missing.is_empty() {
            return Err(FormError::Incomplete { missing });
        }

        Ok(SubscriptionSubmission::single(
            plan_id,
            BrandSelection::new(brand_id, grind_id),
            customer,
        ))
    }

    /// Clear the customer fields and go back to the first plan and brand.
    pub fn reset(&mut self) {
        self.customer = CustomerDetails::default();
        self.select_defaults();
    }
}

/// Format an amount the way Colombian pesos are displayed: `.` groups
/// thousands, `,` separates up to three decimals.
#[must_use]
pub fn format_cop(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut out = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(digit);
    }
    if !frac_part.is_empty() {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}
