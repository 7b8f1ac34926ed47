//! Storefront orders as served by the e-commerce order endpoints.
//!
//! Amounts are kept as the decimal strings the backend sends.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
    pub company: String,
    pub job_title: String,
    pub email: String,
    pub phone: String,
    pub invoice_address: Address,
    pub shipping_address: Address,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// One line of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderLine {
    pub id: String,
    pub title: String,
    pub image: String,
    pub price: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderStatus {
    pub id: String,
    pub name: String,
    pub color: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Payment {
    pub transaction_id: String,
    pub amount: String,
    pub method: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingDetails {
    pub tracking: String,
    pub carrier: String,
    pub weight: String,
    pub fee: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub id: String,
    pub reference: String,
    pub subtotal: String,
    pub tax: String,
    pub discount: String,
    pub total: String,
    pub date: String,
    pub customer: Customer,
    pub products: Vec<OrderLine>,
    /// Status history, most recent first.
    pub status: Vec<OrderStatus>,
    pub payment: Payment,
    pub shipping_details: Vec<ShippingDetails>,
}

impl Order {
    pub fn current_status(&self) -> Option<&OrderStatus> {
        self.status.first()
    }
}
