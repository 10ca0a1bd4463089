//! Typed wrappers over the authenticated pipeline.
//!
//! Status interpretation lives here, not in the pipeline: a 404 on barcode
//! lookup means "unknown product", a 401 that survived the refresh attempt
//! means the session is gone, and anything else uninterpreted is handed to
//! the caller as [`ApiError::UnexpectedStatus`].

use reqwest::{Method, Response, StatusCode};

use tillpoint_core::{CashRegisterStatus, Product, ProductPage, SaleDraft};

use crate::client::{ApiClient, RequestBody};
use crate::error::ApiError;

impl ApiClient {
    /// Fetch the product listing.
    pub async fn list_products(&self) -> Result<ProductPage, ApiError> {
        let response = self
            .execute(Method::GET, "/products", RequestBody::Empty)
            .await?;
        let response = expect_success(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    /// Look up a single product by barcode on the backend.
    ///
    /// A 404 maps to `Ok(None)`. For offline lookup use the local cache.
    pub async fn product_by_barcode(&self, barcode: &str) -> Result<Option<Product>, ApiError> {
        let endpoint = format!("/products/barcode/{barcode}");
        let response = self
            .execute(Method::GET, &endpoint, RequestBody::Empty)
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = expect_success(response).await?;
        Ok(Some(response.json().await.map_err(ApiError::Decode)?))
    }

    /// Submit a validated sale.
    ///
    /// The backend answers 201 on success; any 2xx is accepted.
    pub async fn submit_sale(&self, draft: &SaleDraft) -> Result<(), ApiError> {
        let payload = serde_json::to_value(draft)?;
        let response = self
            .execute(Method::POST, "/sales", RequestBody::Json(payload))
            .await?;
        expect_success(response).await?;
        tracing::info!(items = draft.items().len(), "sale submitted");
        Ok(())
    }

    /// Open the cash register with the given opening amount.
    ///
    /// Returns the backend's session payload uninterpreted.
    pub async fn open_register(&self, opening_amount: f64) -> Result<serde_json::Value, ApiError> {
        let body = RequestBody::Form(vec![("opening_amount", opening_amount.to_string())]);
        let response = self
            .execute(Method::POST, "/cash-register/open", body)
            .await?;
        let response = expect_success(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    /// Close the cash register with the given closing amount.
    pub async fn close_register(&self, closing_amount: f64) -> Result<serde_json::Value, ApiError> {
        let body = RequestBody::Form(vec![("closing_amount", closing_amount.to_string())]);
        let response = self
            .execute(Method::POST, "/cash-register/close", body)
            .await?;
        let response = expect_success(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    /// Whether a register session is currently open.
    pub async fn register_status(&self) -> Result<CashRegisterStatus, ApiError> {
        let response = self
            .execute(Method::GET, "/cash-register/status", RequestBody::Empty)
            .await?;
        let response = expect_success(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }
}

/// Map a pipeline response to an error unless it is 2xx.
async fn expect_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::ReauthenticationRequired);
    }
    Err(ApiError::UnexpectedStatus {
        status,
        body: response.text().await.unwrap_or_default(),
    })
}
