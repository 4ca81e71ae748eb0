//! Checkout request payload and its validation.
//!
//! Validation runs before any stock is touched and reports every problem at
//! once so the storefront can highlight all offending fields.

use inventory_store::{DeliveryMethod, PickupPoint, ShippingInfo};
use serde::Deserialize;

use crate::error::ValidationErrors;
use crate::quote::{CartLine, MAX_LINE_GRAMS};

/// Upper bound on lines in a single order.
pub const MAX_LINES: usize = 50;

fn default_country() -> String {
    "CZ".to_string()
}

/// Order-creation request as posted by the storefront.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub pickup_point: Option<PickupPoint>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub items: Vec<CartLine>,
}

/// A checkout request that passed validation, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCheckout {
    pub email: String,
    pub shipping: ShippingInfo,
    pub coupon_code: Option<String>,
    pub lines: Vec<CartLine>,
}

/// Loose structural e-mail check: one `@`, a local part and a dotted domain.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split('.')
            .filter(|part| !part.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CheckoutRequest {
    /// Validates and normalizes the request.
    pub fn validate(self) -> Result<ValidCheckout, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            errors.push("email", "E-mail is required");
        } else if !is_plausible_email(&email) {
            errors.push("email", "E-mail address is not valid");
        }

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push("name", "Name is required");
        }

        let needs_address = self.delivery_method != DeliveryMethod::PersonalPickup;
        let street = self.street.trim().to_string();
        let city = self.city.trim().to_string();
        let postal_code = self.postal_code.trim().to_string();
        let country = self.country.trim().to_uppercase();
        if needs_address {
            if street.is_empty() {
                errors.push("street", "Street is required");
            }
            if city.is_empty() {
                errors.push("city", "City is required");
            }
            if postal_code.is_empty() {
                errors.push("postalCode", "Postal code is required");
            }
        }
        if country.is_empty() {
            errors.push("country", "Country is required");
        }

        let pickup_point = match (self.delivery_method, self.pickup_point) {
            (DeliveryMethod::PickupPoint, Some(point)) => {
                let point = PickupPoint {
                    id: point.id.trim().to_string(),
                    name: point.name.trim().to_string(),
                };
                if point.id.is_empty() || point.name.is_empty() {
                    errors.push("pickupPoint", "Pickup point must have an id and a name");
                }
                Some(point)
            }
            (DeliveryMethod::PickupPoint, None) => {
                errors.push("pickupPoint", "Choose a pickup point");
                None
            }
            // A stale selection from the widget is dropped for other methods.
            (_, _) => None,
        };

        if self.items.is_empty() {
            errors.push("items", "Cart is empty");
        } else if self.items.len() > MAX_LINES {
            errors.push("items", format!("At most {MAX_LINES} items per order"));
        }
        for (index, line) in self.items.iter().enumerate() {
            if line.sku_code.trim().is_empty() {
                errors.push(format!("items[{index}].skuCode"), "Product code is required");
            }
            if line.grams < 0 {
                errors.push(format!("items[{index}].grams"), "Quantity cannot be negative");
            } else if line.grams > MAX_LINE_GRAMS {
                errors.push(
                    format!("items[{index}].grams"),
                    format!("At most {MAX_LINE_GRAMS} g per item"),
                );
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let lines = self
            .items
            .into_iter()
            .map(|line| CartLine {
                sku_code: line.sku_code.trim().to_string(),
                ..line
            })
            .collect();

        Ok(ValidCheckout {
            email,
            shipping: ShippingInfo {
                name,
                phone: non_blank(self.phone),
                street,
                city,
                postal_code,
                country,
                delivery_method: self.delivery_method,
                pickup_point,
            },
            coupon_code: non_blank(self.coupon_code).map(|c| c.to_uppercase()),
            lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ending::Ending;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            email: " Jana@Example.cz ".to_string(),
            name: "Jana Nováková".to_string(),
            phone: Some("  ".to_string()),
            street: "Dlouhá 12".to_string(),
            city: "Praha".to_string(),
            postal_code: "110 00".to_string(),
            country: "cz".to_string(),
            delivery_method: DeliveryMethod::PickupPoint,
            pickup_point: Some(PickupPoint {
                id: "1234".to_string(),
                name: "Praha 1".to_string(),
            }),
            coupon_code: Some(" jaro10 ".to_string()),
            items: vec![CartLine::new("BULK-60", 80, Ending::Keratin)],
        }
    }

    fn fields(errors: &ValidationErrors) -> Vec<&str> {
        errors.fields().iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn valid_request_is_normalized() {
        let valid = request().validate().unwrap();
        assert_eq!(valid.email, "jana@example.cz");
        assert_eq!(valid.shipping.country, "CZ");
        assert_eq!(valid.shipping.phone, None);
        assert_eq!(valid.coupon_code.as_deref(), Some("JARO10"));
        assert_eq!(valid.lines.len(), 1);
    }

    #[test]
    fn reports_all_problems_together() {
        let req = CheckoutRequest {
            email: "not-an-email".to_string(),
            name: "".to_string(),
            items: vec![],
            ..request()
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["email", "name", "items"]);
    }

    #[test]
    fn pickup_point_required_for_pickup_delivery() {
        let req = CheckoutRequest {
            pickup_point: None,
            ..request()
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["pickupPoint"]);
    }

    #[test]
    fn personal_pickup_needs_no_address() {
        let req = CheckoutRequest {
            street: "".to_string(),
            city: "".to_string(),
            postal_code: "".to_string(),
            delivery_method: DeliveryMethod::PersonalPickup,
            ..request()
        };
        let valid = req.validate().unwrap();
        assert_eq!(valid.shipping.pickup_point, None);
    }

    #[test]
    fn courier_requires_address() {
        let req = CheckoutRequest {
            street: "".to_string(),
            postal_code: " ".to_string(),
            delivery_method: DeliveryMethod::Courier,
            ..request()
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["street", "postalCode"]);
    }

    #[test]
    fn line_errors_carry_their_index() {
        let req = CheckoutRequest {
            items: vec![
                CartLine::new("BULK-60", 10, Ending::None),
                CartLine::new(" ", -5, Ending::None),
            ],
            ..request()
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["items[1].skuCode", "items[1].grams"]);
    }

    #[test]
    fn oversized_quantity_is_rejected() {
        let req = CheckoutRequest {
            items: vec![
                CartLine::new("BULK-60", MAX_LINE_GRAMS, Ending::None),
                CartLine::new("BULK-60", i64::MAX / 2, Ending::None),
            ],
            ..request()
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["items[1].grams"]);
    }

    #[test]
    fn too_many_lines_are_rejected() {
        let req = CheckoutRequest {
            items: vec![CartLine::new("BULK-60", 10, Ending::None); MAX_LINES + 1],
            ..request()
        };
        assert_eq!(fields(&req.validate().unwrap_err()), vec!["items"]);
    }

    #[test]
    fn email_plausibility() {
        assert!(is_plausible_email("a@b.cz"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("@b.cz"));
        assert!(!is_plausible_email("a@@b.cz"));
        assert!(!is_plausible_email("a b@c.cz"));
        assert!(!is_plausible_email("a@.cz"));
    }

    #[test]
    fn deserializes_camel_case_payload() {
        let json = serde_json::json!({
            "email": "jana@example.cz",
            "name": "Jana",
            "street": "Dlouhá 12",
            "city": "Praha",
            "postalCode": "110 00",
            "deliveryMethod": "PICKUP_POINT",
            "pickupPoint": { "id": "1", "name": "Praha 1" },
            "items": [{ "skuCode": "BULK-60", "grams": 50, "ending": "TAPE" }]
        });
        let req: CheckoutRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.country, "CZ");
        assert_eq!(req.items[0].ending, Ending::Tape);
        assert!(req.validate().is_ok());
    }
}
