//! Test harness for the Maoyang sites.
//!
//! [`FakeBackend`] serves the slice of the REST backend both sites call,
//! keeping everything in memory so tests can inspect what was written.
//! [`spawn_storefront`] and [`spawn_admin`] run the real routers against it on
//! ephemeral ports.
//!
//! # Fixtures
//!
//! - Member `0811111111` / `secret123`, id 1, with an address
//! - Admin `0899999999` / `admin-pass`
//! - Products 1 (Mango Smoothie, 5 in stock), 2 (Lime Soda, 0 in stock) and
//!   3 (Hidden Tea, not visible)
//! - Ingredients 1 (Mango) and 2 (Lime); the member is allergic to Lime
//! - Notifications for the member: "Welcome" (unread) and "Rainy season sale"
//!   (read), with expiry dates in the shapes the real backend sends

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use maoyang_core::{
    AssociationRule, Ingredient, IngredientId, Member, MemberId, OrderLine, OrderStatus, Price,
    Product, ProductId,
};

pub const MEMBER_PHONE: &str = "0811111111";
pub const MEMBER_PASSWORD: &str = "secret123";
pub const ADMIN_PHONE: &str = "0899999999";
pub const ADMIN_PASSWORD: &str = "admin-pass";

const MEMBER_TOKEN: &str = "member-token-1";
const ADMIN_TOKEN: &str = "admin-token";

/// Everything the fake backend stores.
#[derive(Debug, Default)]
pub struct BackendData {
    pub members: Vec<Member>,
    pub products: Vec<Product>,
    pub ingredients: Vec<Ingredient>,
    pub product_ingredients: HashMap<ProductId, Vec<IngredientId>>,
    pub orders: Vec<OrderLine>,
    /// `(product, remaining stock)` in the order received.
    pub stock_updates: Vec<(ProductId, u32)>,
    /// Raw bodies of `POST /notifications`.
    pub sent_notifications: Vec<Value>,
    /// Raw bodies of `POST /products/add`.
    pub added_products: Vec<Value>,
    /// Raw bodies of `POST /member/memberRegister`.
    pub registrations: Vec<Value>,
    /// The fixture member's favourite ingredients.
    pub favorites: Vec<IngredientId>,
    /// The fixture member's allergen ingredients.
    pub allergies: Vec<IngredientId>,
    /// The fixture member's notifications, as raw backend JSON.
    pub notifications: Vec<Value>,
    /// Served by `/api/association/{member}`.
    pub member_rules: Vec<AssociationRule>,
    /// Served by `/api/association-all/{member}`.
    pub global_rules: Vec<AssociationRule>,
    /// When set, `POST /orders/create` answers 500.
    pub fail_orders: bool,
}

type Shared = Arc<Mutex<BackendData>>;

/// In-process stand-in for the Maoyang REST backend.
pub struct FakeBackend {
    pub url: String,
    data: Shared,
}

impl FakeBackend {
    /// Start the fake backend with the default fixtures.
    pub async fn spawn() -> Self {
        let data: Shared = Arc::new(Mutex::new(fixtures()));
        let addr = serve(router(Arc::clone(&data))).await;
        Self {
            url: format!("http://{addr}"),
            data,
        }
    }

    /// Lock the stored data for inspection or setup.
    pub fn data(&self) -> MutexGuard<'_, BackendData> {
        self.data.lock().unwrap()
    }
}

fn product(id: i32, name: &str, stock: u32, satang: i64, visible: bool) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        description: format!("{name} made fresh"),
        kind: "smoothie".to_string(),
        location: "Chiang Mai".to_string(),
        size: "16oz".to_string(),
        quantity_in_stock: stock,
        price: Price::from_satang(satang),
        image_url: Some(format!("https://img.example/{id}.png")),
        is_visible: visible,
    }
}

fn fixtures() -> BackendData {
    BackendData {
        members: vec![
            Member {
                id: MemberId::new(1),
                name: Some("Nok".to_string()),
                phone: Some(MEMBER_PHONE.to_string()),
                email: Some("nok@example.com".to_string()),
                sex: Some("female".to_string()),
                address: Some("12 Nimman Rd".to_string()),
            },
            Member {
                id: MemberId::new(2),
                name: Some("Somchai".to_string()),
                phone: Some("0822222222".to_string()),
                email: None,
                sex: Some("male".to_string()),
                address: None,
            },
        ],
        products: vec![
            product(1, "Mango Smoothie", 5, 6500, true),
            product(2, "Lime Soda", 0, 4000, true),
            product(3, "Hidden Tea", 9, 3000, false),
        ],
        ingredients: vec![
            Ingredient { id: IngredientId::new(1), name: "Mango".to_string() },
            Ingredient { id: IngredientId::new(2), name: "Lime".to_string() },
        ],
        product_ingredients: HashMap::from([(ProductId::new(1), vec![IngredientId::new(1)])]),
        allergies: vec![IngredientId::new(2)],
        notifications: vec![
            json!({
                "id": 1,
                "title": "Welcome",
                "message": "Thanks for joining Mao Yang",
                "isRead": false,
                "createdAt": "2024-03-05T10:00:00.000Z",
                "expiryDate": "2024-04-01T00:00:00.000Z"
            }),
            json!({
                "id": 2,
                "title": "Rainy season sale",
                "message": "Half price smoothies",
                "isRead": true,
                "createdAt": "2024-03-01T10:00:00.000Z",
                "expiryDate": ""
            }),
        ],
        ..BackendData::default()
    }
}

/// Seed an order row as if it had been placed earlier.
pub fn order_row(number: &str, user: i32, product: i32, quantity: u32, satang: i64, status: OrderStatus) -> OrderLine {
    OrderLine {
        id: None,
        order_number: number.to_string(),
        user_id: MemberId::new(user),
        product_id: ProductId::new(product),
        quantity,
        total_price: Price::from_satang(satang),
        created_at: Some(Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()),
        status,
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

// =============================================================================
// Site Launchers
// =============================================================================

/// Run the storefront against `backend`; returns its base URL.
pub async fn spawn_storefront(backend: &FakeBackend) -> String {
    let config = maoyang_storefront::config::StorefrontConfig::from_lookup(|key| match key {
        "STOREFRONT_BASE_URL" => Some("http://localhost".to_string()),
        "MAOYANG_API_URL" => Some(backend.url.clone()),
        _ => None,
    })
    .unwrap();
    let state = maoyang_storefront::state::AppState::new(config).unwrap();
    let addr = serve(maoyang_storefront::app(state)).await;
    format!("http://{addr}")
}

/// Run the admin console against `backend`; returns its base URL.
pub async fn spawn_admin(backend: &FakeBackend) -> String {
    let config = maoyang_admin::config::AdminConfig::from_lookup(|key| match key {
        "ADMIN_BASE_URL" => Some("http://localhost".to_string()),
        "MAOYANG_API_URL" => Some(backend.url.clone()),
        _ => None,
    })
    .unwrap();
    let state = maoyang_admin::state::AppState::new(config).unwrap();
    let addr = serve(maoyang_admin::app(state)).await;
    format!("http://{addr}")
}

/// Browser-like client: keeps cookies, does not follow redirects.
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// `Location` header of a redirect response.
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Sign `client` in to the storefront as the fixture member.
pub async fn member_login(client: &reqwest::Client, site: &str) {
    let response = client
        .post(format!("{site}/auth/login"))
        .form(&[("phone", MEMBER_PHONE), ("password", MEMBER_PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/recommend");
}

/// Sign `client` in to the admin console as the fixture admin.
pub async fn admin_login(client: &reqwest::Client, site: &str) {
    let response = client
        .post(format!("{site}/auth/login"))
        .form(&[("phone", ADMIN_PHONE), ("password", ADMIN_PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/products");
}

// =============================================================================
// Fake Backend Routes
// =============================================================================

fn router(data: Shared) -> Router {
    Router::new()
        .route("/", get(|| async { "maoyang backend" }))
        // members
        .route("/member/signin", post(member_signin))
        .route("/member/info/id", get(member_id))
        .route("/member/info", get(member_info))
        .route("/member/name/{id}", get(member_name))
        .route("/member/memberRegister", post(register_member))
        .route("/member/editName", put(edit_member))
        .route("/member/editPhone", put(edit_member))
        .route("/member/editAddress", put(edit_member))
        .route("/member-favorites/{id}", get(favorites))
        .route("/member-allergies/{id}", get(allergies))
        .route("/member-favorites", put(save_favorites))
        .route("/member-allergies", put(save_allergies))
        .route("/admin/signin", post(admin_signin))
        // products
        .route("/products/list", get(visible_products))
        .route("/products/order/list", get(all_products))
        .route("/products/query", get(search_products))
        .route("/products/recommendation", get(products_by_id))
        .route("/products/similar", get(empty_results))
        .route("/products/name/{id}", get(product_name))
        .route("/products/{id}/ingredients", get(product_ingredients))
        .route("/products/update-stock/{id}", put(update_stock))
        .route("/products/add", post(add_product))
        .route("/admin/products/list", get(all_products))
        .route("/ingredients", get(ingredients))
        .route("/ingredients/add", post(add_ingredient))
        // orders
        .route("/orders/list", get(member_orders))
        .route("/orders/list/admin", get(admin_orders))
        .route("/orders/create", post(create_order))
        .route("/orders/{number}", put(update_order_status))
        // notifications and rules
        .route("/notifications", post(send_notification))
        .route("/notifications/{id}", get(member_notifications).patch(read_notification))
        .route("/api/association/{id}", get(member_rules))
        .route("/api/association-all/{id}", get(global_rules))
        .with_state(data)
}

fn token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Rejects requests without the expected bearer token.
fn authorize(headers: &HeaderMap, expected: &[&str]) -> Result<(), Response> {
    match token(headers) {
        Some(t) if expected.contains(&t) => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED.into_response()),
    }
}

fn any_user(headers: &HeaderMap) -> Result<(), Response> {
    authorize(headers, &[MEMBER_TOKEN, ADMIN_TOKEN])
}

fn admin_only(headers: &HeaderMap) -> Result<(), Response> {
    authorize(headers, &[ADMIN_TOKEN])
}

async fn member_signin(Json(body): Json<Value>) -> Json<Value> {
    if body["phone"] == MEMBER_PHONE && body["pass"] == MEMBER_PASSWORD {
        Json(json!({ "message": "success", "token": MEMBER_TOKEN }))
    } else {
        Json(json!({ "message": "Invalid phone or password" }))
    }
}

async fn admin_signin(Json(body): Json<Value>) -> Json<Value> {
    if body["phone"] == ADMIN_PHONE && body["pass"] == ADMIN_PASSWORD {
        Json(json!({ "message": "success", "token": ADMIN_TOKEN }))
    } else {
        Json(json!({ "message": "Invalid phone or password" }))
    }
}

async fn member_id(headers: HeaderMap) -> Result<Json<Value>, Response> {
    authorize(&headers, &[MEMBER_TOKEN])?;
    Ok(Json(json!({ "userId": 1 })))
}

async fn member_info(State(data): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, Response> {
    authorize(&headers, &[MEMBER_TOKEN])?;
    let data = data.lock().unwrap();
    Ok(Json(json!({ "result": data.members.first() })))
}

async fn register_member(State(data): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut data = data.lock().unwrap();
    let phone = body["phone"].as_str().unwrap_or_default().to_string();
    if data.members.iter().any(|m| m.phone.as_deref() == Some(phone.as_str())) {
        return Json(json!({ "message": "Phone number already registered" }));
    }
    let id = i32::try_from(data.members.len()).unwrap() + 1;
    data.members.push(Member {
        id: MemberId::new(id),
        name: body["name"].as_str().map(String::from),
        phone: Some(phone),
        email: body["email"].as_str().map(String::from),
        sex: body["sex"].as_str().map(String::from),
        address: None,
    });
    data.registrations.push(body);
    Json(json!({ "message": "success" }))
}

/// `PUT /member/edit{Name,Phone,Address}` for the fixture member.
async fn edit_member(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<StatusCode, Response> {
    authorize(&headers, &[MEMBER_TOKEN])?;
    let mut data = data.lock().unwrap();
    let member = data.members.first_mut().unwrap();
    let text = |key: &str| body[key].as_str().map(String::from);
    if let Some(name) = text("name") {
        member.name = Some(name);
    }
    if let Some(phone) = text("phone") {
        member.phone = Some(phone);
    }
    if let Some(address) = text("address") {
        member.address = Some(address);
    }
    Ok(StatusCode::OK)
}

fn ingredient_list(data: &BackendData, ids: &[IngredientId]) -> Value {
    let list: Vec<&Ingredient> = data.ingredients.iter().filter(|i| ids.contains(&i.id)).collect();
    json!(list)
}

async fn favorites(State(data): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    let data = data.lock().unwrap();
    Ok(Json(ingredient_list(&data, &data.favorites)))
}

async fn allergies(State(data): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    let data = data.lock().unwrap();
    Ok(Json(ingredient_list(&data, &data.allergies)))
}

fn ids_in(body: &Value, key: &str) -> Result<Vec<IngredientId>, Response> {
    serde_json::from_value(body[key].clone()).map_err(|_| StatusCode::BAD_REQUEST.into_response())
}

async fn save_favorites(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<StatusCode, Response> {
    authorize(&headers, &[MEMBER_TOKEN])?;
    data.lock().unwrap().favorites = ids_in(&body, "fruits")?;
    Ok(StatusCode::OK)
}

async fn save_allergies(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<StatusCode, Response> {
    authorize(&headers, &[MEMBER_TOKEN])?;
    data.lock().unwrap().allergies = ids_in(&body, "allergies")?;
    Ok(StatusCode::OK)
}

async fn member_name(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<MemberId>,
) -> Result<Json<Value>, Response> {
    admin_only(&headers)?;
    let data = data.lock().unwrap();
    let member = data
        .members
        .iter()
        .find(|m| m.id == id)
        .ok_or_else(|| StatusCode::NOT_FOUND.into_response())?;
    Ok(Json(json!({ "name": member.name })))
}

async fn product_name(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    let data = data.lock().unwrap();
    let product = data
        .products
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| StatusCode::NOT_FOUND.into_response())?;
    Ok(Json(json!({ "product": product.name })))
}

async fn visible_products(State(data): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    let data = data.lock().unwrap();
    let visible: Vec<&Product> = data.products.iter().filter(|p| p.is_visible).collect();
    Ok(Json(json!({ "results": visible })))
}

async fn all_products(State(data): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    let data = data.lock().unwrap();
    Ok(Json(json!({ "results": data.products })))
}

async fn search_products(
    State(data): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    let needle = query.get("query").cloned().unwrap_or_default().to_lowercase();
    let data = data.lock().unwrap();
    let hits: Vec<&Product> = data
        .products
        .iter()
        .filter(|p| p.is_visible && p.name.to_lowercase().contains(&needle))
        .collect();
    Ok(Json(json!({ "results": hits })))
}

async fn product_ingredients(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    let data = data.lock().unwrap();
    let ids = data.product_ingredients.get(&id).cloned().unwrap_or_default();
    let list: Vec<&Ingredient> = data.ingredients.iter().filter(|i| ids.contains(&i.id)).collect();
    Ok(Json(json!(list)))
}

async fn update_stock(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
    Json(body): Json<Value>,
) -> Result<StatusCode, Response> {
    any_user(&headers)?;
    let quantity = body["quantity"]
        .as_u64()
        .and_then(|q| u32::try_from(q).ok())
        .ok_or_else(|| StatusCode::BAD_REQUEST.into_response())?;
    let mut data = data.lock().unwrap();
    if let Some(product) = data.products.iter_mut().find(|p| p.id == id) {
        product.quantity_in_stock = quantity;
    }
    data.stock_updates.push((id, quantity));
    Ok(StatusCode::OK)
}

async fn add_product(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<StatusCode, Response> {
    admin_only(&headers)?;
    let mut data = data.lock().unwrap();
    let id = i32::try_from(data.products.len()).unwrap() + 1;
    let mut merged = body.clone();
    merged["id"] = json!(id);
    let mut product: Product =
        serde_json::from_value(merged).map_err(|_| StatusCode::BAD_REQUEST.into_response())?;
    product.id = ProductId::new(id);
    data.products.push(product);
    data.added_products.push(body);
    Ok(StatusCode::CREATED)
}

async fn ingredients(State(data): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    let data = data.lock().unwrap();
    Ok(Json(json!(data.ingredients)))
}

async fn add_ingredient(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<StatusCode, Response> {
    admin_only(&headers)?;
    let name = body["name"]
        .as_str()
        .ok_or_else(|| StatusCode::BAD_REQUEST.into_response())?;
    let mut data = data.lock().unwrap();
    let id = i32::try_from(data.ingredients.len()).unwrap() + 1;
    data.ingredients.push(Ingredient {
        id: IngredientId::new(id),
        name: name.to_string(),
    });
    Ok(StatusCode::CREATED)
}

async fn member_orders(
    State(data): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    let user: Option<MemberId> = query.get("userId").and_then(|u| u.parse().ok());
    let data = data.lock().unwrap();
    let rows: Vec<&OrderLine> = data
        .orders
        .iter()
        .filter(|o| user.is_none_or(|u| o.user_id == u))
        .collect();
    Ok(Json(json!({ "results": rows })))
}

async fn admin_orders(State(data): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, Response> {
    admin_only(&headers)?;
    let data = data.lock().unwrap();
    Ok(Json(json!({ "results": data.orders })))
}

async fn create_order(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<StatusCode, Response> {
    any_user(&headers)?;
    let mut data = data.lock().unwrap();
    if data.fail_orders {
        return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response());
    }
    let mut line: OrderLine =
        serde_json::from_value(body).map_err(|_| StatusCode::BAD_REQUEST.into_response())?;
    line.created_at = Some(Utc::now());
    data.orders.push(line);
    Ok(StatusCode::CREATED)
}

async fn update_order_status(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(number): Path<String>,
    Json(body): Json<Value>,
) -> Result<StatusCode, Response> {
    admin_only(&headers)?;
    let status = body["status"]
        .as_str()
        .ok_or_else(|| StatusCode::BAD_REQUEST.into_response())?;
    let mut data = data.lock().unwrap();
    for row in data.orders.iter_mut().filter(|o| o.order_number == number) {
        row.status = OrderStatus::from(status.to_string());
    }
    Ok(StatusCode::OK)
}

async fn send_notification(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<StatusCode, Response> {
    admin_only(&headers)?;
    data.lock().unwrap().sent_notifications.push(body);
    Ok(StatusCode::CREATED)
}

async fn member_notifications(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(member): Path<MemberId>,
) -> Result<Json<Value>, Response> {
    authorize(&headers, &[MEMBER_TOKEN])?;
    let data = data.lock().unwrap();
    if member != MemberId::new(1) {
        return Ok(Json(json!([])));
    }
    Ok(Json(json!(data.notifications)))
}

async fn read_notification(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<StatusCode, Response> {
    authorize(&headers, &[MEMBER_TOKEN])?;
    let mut data = data.lock().unwrap();
    let notification = data
        .notifications
        .iter_mut()
        .find(|n| n["id"] == id)
        .ok_or_else(|| StatusCode::NOT_FOUND.into_response())?;
    notification["isRead"] = body["isRead"].clone();
    Ok(StatusCode::OK)
}

async fn products_by_id(
    State(data): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    let ids: Vec<ProductId> = query
        .get("ids")
        .map(|ids| ids.split(',').filter_map(|id| id.trim().parse().ok()).collect())
        .unwrap_or_default();
    let data = data.lock().unwrap();
    let hits: Vec<&Product> = data.products.iter().filter(|p| ids.contains(&p.id)).collect();
    Ok(Json(json!({ "results": hits })))
}

async fn empty_results(headers: HeaderMap) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    Ok(Json(json!({ "results": [] })))
}

async fn member_rules(State(data): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    let data = data.lock().unwrap();
    Ok(Json(json!({ "associationRules": data.member_rules })))
}

async fn global_rules(State(data): State<Shared>, headers: HeaderMap) -> Result<Json<Value>, Response> {
    any_user(&headers)?;
    let data = data.lock().unwrap();
    Ok(Json(json!({ "associationRules": data.global_rules })))
}
