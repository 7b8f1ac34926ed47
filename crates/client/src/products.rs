//! Product endpoints.

use printables_core::listing::{ProductListState, ProductQuery};
use printables_core::payload::build_payload;
use printables_core::product::{
    CreateProductResponse, Product, ProductListResponse, ProductResponse,
};
use reqwest::Method;

use crate::admin::{AdminClient, MutationEffects};
use crate::cache::CacheTag;
use crate::error::ClientError;
use crate::multipart;

const PRODUCTS_PATH: &str = "/api/products/";

const PRODUCT_TAGS: &[CacheTag] = &[CacheTag::Products, CacheTag::Product];

const CREATE_PRODUCT: MutationEffects = MutationEffects {
    name: "create_product",
    invalidates: PRODUCT_TAGS,
    success: Some("Product Created Successfully"),
    failure: Some("Error Creating Product!"),
};

const UPDATE_PRODUCT: MutationEffects = MutationEffects {
    name: "update_product",
    invalidates: PRODUCT_TAGS,
    success: Some("Product Edited Successfully"),
    failure: Some("Error Editing Product!"),
};

const DELETE_PRODUCT: MutationEffects = MutationEffects {
    name: "delete_product",
    invalidates: PRODUCT_TAGS,
    success: Some("Product Deleted Successfully"),
    failure: Some("Error Deleting Product!"),
};

fn product_path(product_id: &str) -> String {
    format!("{PRODUCTS_PATH}{product_id}")
}

fn product_cache_key(product_id: &str) -> String {
    format!("product/{product_id}")
}

impl AdminClient {
    /// `GET /api/products/` with the given filters.
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductListResponse, ClientError> {
        let pairs = query.to_query_pairs();
        self.cache()
            .get_or_fetch(&query.cache_key(), &[CacheTag::Products], || {
                self.api().get_json(PRODUCTS_PATH, &pairs)
            })
            .await
    }

    /// The page described by a product table's state.
    pub async fn list_products_for(
        &self,
        state: &ProductListState,
    ) -> Result<ProductListResponse, ClientError> {
        self.list_products(&state.to_query(self.product_type())).await
    }

    /// `GET /api/products/:id`.
    pub async fn get_product(&self, product_id: &str) -> Result<Product, ClientError> {
        let path = product_path(product_id);
        let response: ProductResponse = self
            .cache()
            .get_or_fetch(
                &product_cache_key(product_id),
                &[CacheTag::Product, CacheTag::Products],
                || self.api().get_json(&path, &[]),
            )
            .await?;
        Ok(response.product)
    }

    /// `POST /api/products/`. Returns the id assigned by the backend.
    pub async fn create_product(&self, product: &Product) -> Result<String, ClientError> {
        self.mutate(CREATE_PRODUCT, async {
            let payload = build_payload(product, self.product_type())?;
            let form = multipart::to_form(payload).await?;
            let created: CreateProductResponse = self
                .api()
                .send_multipart_json(Method::POST, PRODUCTS_PATH, form)
                .await?;
            tracing::info!(product_id = %created.product_id, "Product created");
            Ok::<_, ClientError>(created.product_id)
        })
        .await
    }

    /// `PUT /api/products/`. The product id travels in the descriptor.
    pub async fn update_product(&self, product: &Product) -> Result<(), ClientError> {
        self.mutate(UPDATE_PRODUCT, async {
            let payload = build_payload(product, self.product_type())?;
            let form = multipart::to_form(payload).await?;
            self.api()
                .send_multipart(Method::PUT, PRODUCTS_PATH, form)
                .await?;
            tracing::info!(product_id = %product.id, "Product updated");
            Ok::<_, ClientError>(())
        })
        .await
    }

    /// `DELETE /api/products/:id`.
    pub async fn delete_product(&self, product_id: &str) -> Result<(), ClientError> {
        self.mutate(DELETE_PRODUCT, self.api().delete(&product_path(product_id)))
            .await
    }
}
