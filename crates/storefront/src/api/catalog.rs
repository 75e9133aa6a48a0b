//! Product and category endpoints.

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use vitashop_core::{CategoryId, ProductId};

use super::cache::{CacheKey, CacheValue};
use super::types::{Category, Product, ProductPage, ProductQuery, fallback_categories};
use super::{ApiClient, ApiError, wire};

impl ApiClient {
    /// Get one page of products.
    ///
    /// Listings are not cached; search and filter combinations are too
    /// varied to be worth it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    #[instrument(skip(self), fields(page = query.page_number, size = query.page_size))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let mut url = self.endpoint(&["products"])?;
        url.query_pairs_mut().extend_pairs(query.query_pairs());

        let body: Value = self.send_json(self.request(Method::GET, url).await).await?;
        let page = wire::convert_product_page(&body, query);

        if page.items.is_empty() {
            debug!("No products in listing response");
        }

        Ok(page)
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the server answers 404 or the body has
    /// no product identifier.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id.clone());

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["products", id.as_str()])?;
        let body: Value = match self.send_json(self.request(Method::GET, url).await).await {
            Ok(body) => body,
            Err(ApiError::Api { status: 404, .. }) => {
                return Err(ApiError::NotFound(format!("Product not found: {id}")));
            }
            Err(e) => return Err(e),
        };

        let product = wire::convert_product(&body)
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))?;

        // Cache the result
        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get all categories.
    ///
    /// Never fails: any error is logged and the built-in
    /// [`fallback_categories`] are returned instead. Only a server answer is
    /// cached, so the next call tries the server again.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Vec<Category> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return categories;
        }

        let result: Result<Value, ApiError> = async {
            let url = self.endpoint(&["categories"])?;
            self.send_json(self.request(Method::GET, url).await).await
        }
        .await;

        match result {
            Ok(body) => {
                let categories = wire::convert_categories(&body);
                self.inner
                    .cache
                    .insert(
                        CacheKey::Categories,
                        CacheValue::Categories(categories.clone()),
                    )
                    .await;
                categories
            }
            Err(e) => {
                warn!(error = %e, "Failed to load categories; using fallback list");
                fallback_categories()
            }
        }
    }

    /// Get one category.
    ///
    /// On any error the id is looked up in [`fallback_categories`]; `None`
    /// means it is unknown there too.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: &CategoryId) -> Option<Category> {
        let result: Result<Value, ApiError> = async {
            let url = self.endpoint(&["categories", id.as_str()])?;
            self.send_json(self.request(Method::GET, url).await).await
        }
        .await;

        let fetched = match result {
            Ok(body) => {
                let category = wire::convert_categories(&Value::Array(vec![body])).pop();
                if category.is_none() {
                    warn!("Category response has no identifier");
                }
                category
            }
            Err(e) => {
                warn!(error = %e, "Failed to load category; using fallback list");
                None
            }
        };

        fetched.or_else(|| fallback_categories().into_iter().find(|c| &c.id == id))
    }

    /// Drop a cached product so the next lookup goes to the server.
    pub async fn invalidate_product(&self, id: &ProductId) {
        self.inner
            .cache
            .invalidate(&CacheKey::Product(id.clone()))
            .await;
    }
}
