#![allow(dead_code)]

use planet_payment::application::settings::SettingsService;
use planet_payment::application::transaction::Checkout;
use planet_payment::infrastructure::in_memory::SandboxState;
use rand::Rng;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

pub const CREDIT_CARD: &str = "5cd6a063c51df65aa0d61bbfd9882874";
pub const INVOICE: &str = "b882b325a4c32027bb7a3589209866b9";

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn settings() -> SettingsService {
    SettingsService::load(fixture("settings.json")).unwrap()
}

pub fn sandbox() -> SandboxState {
    SandboxState::load(fixture("state.json")).unwrap()
}

pub fn checkout_json() -> Value {
    let content = std::fs::read_to_string(fixture("checkout.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

pub fn checkout() -> Checkout {
    serde_json::from_value(checkout_json()).unwrap()
}

/// Copies the sandbox fixture into `dir` so a command can write it back.
pub fn state_copy(dir: &Path) -> PathBuf {
    let path = dir.join("state.json");
    std::fs::copy(fixture("state.json"), &path).unwrap();
    path
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

fn cents(rng: &mut impl Rng, min: i64, max: i64) -> Decimal {
    Decimal::new(rng.gen_range(min..=max), 2)
}

/// A gross order of random products with one shipping tax. The order total
/// is off from the line item sum by up to five cents either way.
pub fn random_checkout(rng: &mut impl Rng) -> (Checkout, Decimal) {
    let mut line_items = Vec::new();
    let mut total = Decimal::ZERO;
    for i in 0..rng.gen_range(1..=6) {
        let quantity = rng.gen_range(1..=4u32);
        let unit_price = cents(rng, 1, 20_000);
        let total_price = unit_price * Decimal::from(quantity);
        total += total_price;
        line_items.push(json!({
            "id": format!("li-{i}"),
            "type": "product",
            "label": format!("Product {i}"),
            "quantity": quantity,
            "total_price": total_price,
            "price": {
                "unit_price": unit_price,
                "quantity": quantity,
                "total_price": total_price,
                "calculated_taxes": [{"tax": 0, "tax_rate": 19, "price": total_price}]
            }
        }));
    }

    let shipping = cents(rng, 0, 1_500);
    total += shipping;
    let drift = cents(rng, -5, 5);

    let mut checkout = checkout_json();
    checkout["order"]["line_items"] = Value::Array(line_items);
    checkout["order"]["shipping_total"] = json!(shipping);
    checkout["order"]["shipping_costs"] = json!({
        "unit_price": shipping,
        "quantity": 1,
        "total_price": shipping,
        "calculated_taxes": [{"tax": 0, "tax_rate": 19, "price": shipping}]
    });
    checkout["order"]["amount_total"] = json!(total + drift);
    (serde_json::from_value(checkout).unwrap(), drift)
}
