//! The static catalog of subscription plans and coffee brands.
//!
//! The catalog is a JSON document (`{"plans": [...], "coffeeBrands": [...]}`)
//! served as a static file by the storefront. It is loaded once per session
//! and never mutated.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a [`Catalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document is not valid catalog JSON.
    #[error("invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two entries of the same kind share an id.
    #[error("duplicate {kind} id in catalog: {id}")]
    DuplicateId {
        /// `plan`, `brand` or `grind option`.
        kind: &'static str,
        /// The repeated id.
        id: String,
    },
}

/// The full catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Subscription plans, in display order.
    pub plans: Vec<Plan>,
    /// Coffee brands, in display order.
    pub coffee_brands: Vec<CoffeeBrand>,
}

/// A subscription plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Monthly price in Colombian pesos.
    pub price_monthly: Decimal,
    #[serde(default)]
    pub features: Vec<String>,
}

/// A coffee brand and the grinds it can be shipped in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeBrand {
    pub id: String,
    pub name: String,
    pub origin: String,
    #[serde(default)]
    pub grind_options: Vec<GrindOption>,
}

/// One grind option of a brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrindOption {
    pub id: String,
    pub label: String,
}

impl Catalog {
    /// Parse and check a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON and
    /// [`CatalogError::DuplicateId`] when plan, brand or per-brand grind ids
    /// repeat.
    pub fn from_json(document: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(document)?;
        catalog.check_unique_ids()?;
        Ok(catalog)
    }

    fn check_unique_ids(&self) -> Result<(), CatalogError> {
        ensure_unique("plan", self.plans.iter().map(|p| p.id.as_str()))?;
        ensure_unique("brand", self.coffee_brands.iter().map(|b| b.id.as_str()))?;
        for brand in &self.coffee_brands {
            ensure_unique(
                "grind option",
                brand.grind_options.iter().map(|g| g.id.as_str()),
            )?;
        }
        Ok(())
    }

    /// Look up a plan by id.
    #[must_use]
    pub fn plan(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == id)
    }

    /// Look up a brand by id.
    #[must_use]
    pub fn brand(&self, id: &str) -> Option<&CoffeeBrand> {
        self.coffee_brands.iter().find(|b| b.id == id)
    }

    /// Grind options of a brand, or `None` if the brand is unknown.
    #[must_use]
    pub fn grind_options(&self, brand_id: &str) -> Option<&[GrindOption]> {
        self.brand(brand_id).map(|b| b.grind_options.as_slice())
    }
}

impl CoffeeBrand {
    /// Whether `grind_id` is one of this brand's grind options.
    #[must_use]
    pub fn offers_grind(&self, grind_id: &str) -> bool {
        self.grind_options.iter().any(|g| g.id == grind_id)
    }
}

fn ensure_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_owned(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SHIPPED_CATALOG: &str = include_str!("../../storefront/static/data/catalog.json");

    #[test]
    fn test_shipped_catalog_parses() {
        let catalog = Catalog::from_json(SHIPPED_CATALOG).unwrap();

        let standard = catalog.plan("standard").unwrap();
        assert_eq!(standard.name, "Standard");
        assert!(standard.price_monthly > Decimal::ZERO);

        let brand = catalog.brand("brand_juan_valdez").unwrap();
        assert!(brand.offers_grind("espresso"));
    }

    #[test]
    fn test_grind_options_unknown_brand() {
        let catalog = Catalog::from_json(SHIPPED_CATALOG).unwrap();
        assert!(catalog.grind_options("brand_missing").is_none());
    }

    #[test]
    fn test_price_accepts_json_number() {
        let doc = r#"{
            "plans": [{"id": "basic", "name": "Basic", "priceMonthly": 45000, "features": []}],
            "coffeeBrands": []
        }"#;
        let catalog = Catalog::from_json(doc).unwrap();
        assert_eq!(catalog.plans[0].price_monthly, Decimal::from(45_000));
    }

    #[test]
    fn test_duplicate_plan_rejected() {
        let doc = r#"{
            "plans": [
                {"id": "basic", "name": "Basic", "priceMonthly": 1},
                {"id": "basic", "name": "Basic again", "priceMonthly": 2}
            ],
            "coffeeBrands": []
        }"#;
        let err = Catalog::from_json(doc).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId { kind: "plan", .. }));
    }

    #[test]
    fn test_duplicate_grind_within_brand_rejected() {
        let doc = r#"{
            "plans": [],
            "coffeeBrands": [{
                "id": "b", "name": "B", "origin": "Huila",
                "grindOptions": [{"id": "fine", "label": "Fine"}, {"id": "fine", "label": "Fine"}]
            }]
        }"#;
        assert!(matches!(
            Catalog::from_json(doc),
            Err(CatalogError::DuplicateId {
                kind: "grind option",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            Catalog::from_json("{\"plans\": 3}"),
            Err(CatalogError::Parse(_))
        ));
    }
}
