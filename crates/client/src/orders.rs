//! Order endpoints (`/api/mock/ecommerce/orders`).

use printables_core::order::Order;

use crate::admin::{AdminClient, MutationEffects};
use crate::cache::CacheTag;
use crate::error::ClientError;

const ORDERS_PATH: &str = "/api/mock/ecommerce/orders";

const ORDER_TAGS: &[CacheTag] = &[CacheTag::Order, CacheTag::Orders];

const UPDATE_ORDER: MutationEffects = MutationEffects {
    name: "update_order",
    invalidates: ORDER_TAGS,
    success: None,
    failure: None,
};

const DELETE_ORDER: MutationEffects = MutationEffects {
    name: "delete_order",
    invalidates: ORDER_TAGS,
    success: None,
    failure: None,
};

const DELETE_ORDERS: MutationEffects = MutationEffects {
    name: "delete_orders",
    invalidates: ORDER_TAGS,
    success: None,
    failure: None,
};

fn order_path(order_id: &str) -> String {
    format!("{ORDERS_PATH}/{order_id}")
}

impl AdminClient {
    pub async fn list_orders(&self) -> Result<Vec<Order>, ClientError> {
        self.cache()
            .get_or_fetch("orders", &[CacheTag::Orders], || {
                self.api().get_json(ORDERS_PATH, &[])
            })
            .await
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order, ClientError> {
        let path = order_path(order_id);
        self.cache()
            .get_or_fetch(&format!("order/{order_id}"), &[CacheTag::Order], || {
                self.api().get_json(&path, &[])
            })
            .await
    }

    /// `PUT` the whole order; returns the backend's copy.
    pub async fn update_order(&self, order: &Order) -> Result<Order, ClientError> {
        let path = order_path(&order.id);
        self.mutate(UPDATE_ORDER, self.api().put_json(&path, order))
            .await
    }

    pub async fn delete_order(&self, order_id: &str) -> Result<(), ClientError> {
        let path = order_path(order_id);
        self.mutate(DELETE_ORDER, self.api().delete(&path)).await
    }

    /// Bulk delete; the ids travel as a JSON array body.
    pub async fn delete_orders(&self, order_ids: &[String]) -> Result<(), ClientError> {
        self.mutate(DELETE_ORDERS, self.api().delete_json(ORDERS_PATH, order_ids))
            .await
    }
}
