//! Cart endpoints.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront::{
    cart::{Cart, CartId, CartItem, Variation, VariationId},
    identity::{AuthToken, GuestId, Identity},
};

use crate::api::{ApiClient, ApiError, client::Envelope};

/// A cart as returned by a cart endpoint, plus any guest id the server issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartPayload {
    pub cart: Cart,
    pub guest_id: Option<GuestId>,
}

#[automock]
#[async_trait]
pub trait CartsApi: Send + Sync {
    /// Fetch the cart for `identity`.
    async fn get_cart(&self, identity: &Identity) -> Result<CartPayload, ApiError>;

    /// Add `quantity` units of a variation.
    async fn add_item(
        &self,
        identity: &Identity,
        variation: &VariationId,
        quantity: u32,
    ) -> Result<CartPayload, ApiError>;

    /// Set the quantity of a line.
    async fn update_item(
        &self,
        identity: &Identity,
        variation: &VariationId,
        quantity: u32,
    ) -> Result<CartPayload, ApiError>;

    /// Remove one line.
    async fn remove_item(
        &self,
        identity: &Identity,
        variation: &VariationId,
    ) -> Result<CartPayload, ApiError>;

    /// Remove several lines at once.
    async fn remove_items(
        &self,
        identity: &Identity,
        variations: &[VariationId],
    ) -> Result<CartPayload, ApiError>;

    /// Empty the cart.
    async fn clear_cart(&self, identity: &Identity) -> Result<(), ApiError>;

    /// Fold a guest cart into the signed-in user's cart.
    async fn merge_guest_cart(&self, token: &AuthToken, guest: &GuestId) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpCartsApi {
    client: ApiClient,
}

impl HttpCartsApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn send_cart(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<CartPayload, ApiError> {
        cart_payload(self.client.send::<CartResponse>(request).await?)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemRequest<'a> {
    variation_id: &'a VariationId,
    quantity: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveItemsRequest<'a> {
    variation_ids: &'a [VariationId],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MergeRequest<'a> {
    guest_id: &'a str,
}

#[async_trait]
impl CartsApi for HttpCartsApi {
    #[tracing::instrument(name = "carts.api.get_cart", skip(self, identity), err)]
    async fn get_cart(&self, identity: &Identity) -> Result<CartPayload, ApiError> {
        let request = self.client.request(Method::GET, "carts", Some(identity))?;

        self.send_cart(request).await
    }

    #[tracing::instrument(
        name = "carts.api.add_item",
        skip(self, identity),
        fields(variation_id = %variation),
        err
    )]
    async fn add_item(
        &self,
        identity: &Identity,
        variation: &VariationId,
        quantity: u32,
    ) -> Result<CartPayload, ApiError> {
        let request = self
            .client
            .request(Method::POST, "carts/add", Some(identity))?
            .json(&ItemRequest {
                variation_id: variation,
                quantity,
            });

        self.send_cart(request).await
    }

    #[tracing::instrument(
        name = "carts.api.update_item",
        skip(self, identity),
        fields(variation_id = %variation),
        err
    )]
    async fn update_item(
        &self,
        identity: &Identity,
        variation: &VariationId,
        quantity: u32,
    ) -> Result<CartPayload, ApiError> {
        let request = self
            .client
            .request(Method::PUT, "carts/update", Some(identity))?
            .json(&ItemRequest {
                variation_id: variation,
                quantity,
            });

        self.send_cart(request).await
    }

    #[tracing::instrument(
        name = "carts.api.remove_item",
        skip(self, identity),
        fields(variation_id = %variation),
        err
    )]
    async fn remove_item(
        &self,
        identity: &Identity,
        variation: &VariationId,
    ) -> Result<CartPayload, ApiError> {
        let url = self.client.url_with_segment("carts/remove", variation.as_str())?;
        let request = self.client.request_url(Method::DELETE, url, Some(identity));

        self.send_cart(request).await
    }

    #[tracing::instrument(
        name = "carts.api.remove_items",
        skip(self, identity, variations),
        fields(count = variations.len()),
        err
    )]
    async fn remove_items(
        &self,
        identity: &Identity,
        variations: &[VariationId],
    ) -> Result<CartPayload, ApiError> {
        let request = self
            .client
            .request(Method::DELETE, "carts/remove-multiple", Some(identity))?
            .json(&RemoveItemsRequest {
                variation_ids: variations,
            });

        self.send_cart(request).await
    }

    #[tracing::instrument(name = "carts.api.clear_cart", skip(self, identity), err)]
    async fn clear_cart(&self, identity: &Identity) -> Result<(), ApiError> {
        let request = self.client.request(Method::DELETE, "carts/clear", Some(identity))?;

        self.client
            .send::<serde_json::Value>(request)
            .await
            .map(|_envelope| ())
    }

    #[tracing::instrument(name = "carts.api.merge_guest_cart", skip(self, token, guest), err)]
    async fn merge_guest_cart(&self, token: &AuthToken, guest: &GuestId) -> Result<(), ApiError> {
        let identity = Identity::Authenticated(token.clone());
        let request = self
            .client
            .request(Method::POST, "carts/merge", Some(&identity))?
            .json(&MergeRequest {
                guest_id: guest.as_str(),
            });

        self.client
            .send::<serde_json::Value>(request)
            .await
            .map(|_envelope| ())
    }
}

/// `data` of a cart response. Some endpoints wrap the cart in `{ cart, totalPrice, guestId }`,
/// others return the cart fields directly.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartResponse {
    cart: Option<CartRecord>,

    #[serde(default, alias = "_id")]
    id: Option<String>,

    items: Option<Vec<CartItemRecord>>,

    total_price: Option<Decimal>,

    guest_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartRecord {
    #[serde(default, alias = "_id")]
    id: Option<String>,

    #[serde(default)]
    items: Vec<CartItemRecord>,

    total_price: Option<Decimal>,

    guest_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartItemRecord {
    #[serde(alias = "variationId")]
    variation: VariationRecord,

    quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariationRecord {
    #[serde(alias = "_id")]
    id: String,

    product: Option<ProductRecord>,

    product_name: Option<String>,

    sale_price: Option<Decimal>,

    #[serde(alias = "price")]
    final_price: Option<Decimal>,

    #[serde(default)]
    stock_quantity: i64,

    color: Option<Label>,

    size: Option<Label>,

    material: Option<Label>,
}

#[derive(Debug, Deserialize)]
struct ProductRecord {
    name: String,
}

/// Option labels arrive either as plain strings or as `{ name }` objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Label {
    Plain(String),
    Named { name: String },
}

impl Label {
    fn into_name(self) -> Option<String> {
        let name = match self {
            Self::Plain(name) | Self::Named { name } => name,
        };

        (!name.trim().is_empty()).then_some(name)
    }
}

impl TryFrom<CartResponse> for CartPayload {
    type Error = ApiError;

    fn try_from(response: CartResponse) -> Result<Self, Self::Error> {
        let record = match (response.cart, response.items) {
            (Some(record), _) => record,
            (None, Some(items)) => CartRecord {
                id: response.id,
                items,
                total_price: None,
                guest_id: None,
            },
            (None, None) => {
                return Ok(Self {
                    cart: Cart::empty(None),
                    guest_id: parse_guest_id(response.guest_id),
                });
            }
        };

        let guest_id = parse_guest_id(response.guest_id.or(record.guest_id));
        let id = record.id.map(CartId::new).transpose()?;

        let items = record
            .items
            .into_iter()
            .map(CartItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let total = response
            .total_price
            .or(record.total_price)
            .unwrap_or_else(|| items.iter().map(CartItem::line_total).sum());

        Ok(Self {
            cart: Cart::new(id, items, total)?,
            guest_id,
        })
    }
}

impl TryFrom<CartItemRecord> for CartItem {
    type Error = ApiError;

    fn try_from(record: CartItemRecord) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(record.quantity)
            .map_err(|_negative| ApiError::malformed("negative line quantity"))?;

        let variation = record.variation;

        let product_name = variation
            .product
            .map(|product| product.name)
            .or(variation.product_name)
            .unwrap_or_default();

        let variation = Variation {
            id: VariationId::new(variation.id)?,
            product_name,
            sale_price: variation.sale_price,
            final_price: variation.final_price,
            stock_quantity: u32::try_from(variation.stock_quantity.max(0)).unwrap_or(u32::MAX),
            color: variation.color.and_then(Label::into_name),
            size: variation.size.and_then(Label::into_name),
            material: variation.material.and_then(Label::into_name),
        };

        Ok(CartItem::new(variation, quantity)?)
    }
}

/// A reply without `data` (e.g. `{"message": "Cart is empty"}`) is an empty cart.
fn cart_payload(envelope: Envelope<CartResponse>) -> Result<CartPayload, ApiError> {
    match envelope.data {
        Some(response) => response.try_into(),
        None => Ok(CartPayload {
            cart: Cart::empty(None),
            guest_id: None,
        }),
    }
}

fn parse_guest_id(raw: Option<String>) -> Option<GuestId> {
    raw.and_then(|raw| GuestId::new(raw).ok())
}
