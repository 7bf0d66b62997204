use std::net::SocketAddr;
use std::sync::Arc;

use kestrel_api::config::ApiConfig;
use kestrel_api::{build_router, AppState};
use kestrel_core::{NewUser, Role};
use kestrel_db::{Database, DbConfig};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

struct TestServer {
    addr: SocketAddr,
    state: Arc<AppState>,
}

impl TestServer {
    async fn start() -> Self {
        let db = Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database");
        let config = ApiConfig::defaults().expect("default config");
        let state = Arc::new(AppState::new(db, config));
        let app = build_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        TestServer { addr, state }
    }

    /// Creates an account directly in the database and returns a token for it.
    async fn token_for(&self, email: &str, role: Role) -> String {
        let user = self
            .state
            .db
            .users()
            .create(NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password: "Passw0rd!".to_string(),
                role: Some(role),
            })
            .await
            .expect("create user");
        self.state
            .jwt
            .generate_access_token(&user.id)
            .expect("token")
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (u16, String, Value) {
        let mut headers = Vec::new();
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        let body = body.map(|b| b.to_string()).unwrap_or_default();
        let (status, head, body) = send_raw(self.addr, method, path, &headers, &body).await;
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).unwrap_or(Value::String(body))
        };
        (status, head, json)
    }
}

async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(String, String)],
    body: &str,
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    if !body.is_empty() {
        req.push_str("Content-Type: application/json\r\n");
    }
    req.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));
    req.push_str(body);
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, head.to_string(), body.to_string())
}

fn product_body(sku: &str, stock: i64) -> Value {
    json!({
        "title": "Wireless Mouse",
        "sku": sku,
        "category": "Accessories",
        "price": 1200.0,
        "cost": 800.0,
        "stock": stock,
    })
}

#[tokio::test]
async fn health_is_public_and_tagged_with_request_id() {
    let server = TestServer::start().await;

    let (status, head, body) = server.send("GET", "/api/health", None, None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "OK");
    assert!(head.to_ascii_lowercase().contains("x-request-id:"));

    let (status, _, _) = server.send("GET", "/", None, None).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let server = TestServer::start().await;

    let (status, _, body) = server.send("GET", "/api/products", None, None).await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _, _) = server
        .send("GET", "/api/products", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn register_creates_viewer_and_rejects_duplicate_email() {
    let server = TestServer::start().await;
    let body = json!({ "name": "Vikram", "email": "Vikram@ERP.com", "password": "secret123" });

    let (status, _, created) = server
        .send("POST", "/api/auth/register", None, Some(body.clone()))
        .await;
    assert_eq!(status, 201);
    assert_eq!(created["role"], "viewer");
    assert_eq!(created["email"], "vikram@erp.com");
    assert!(created["token"].as_str().is_some_and(|t| !t.is_empty()));

    let token = created["token"].as_str().unwrap_or_default().to_string();
    let (status, _, me) = server.send("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, 200);
    assert_eq!(me["name"], "Vikram");

    let (status, _, dup) = server
        .send("POST", "/api/auth/register", None, Some(body))
        .await;
    assert_eq!(status, 409);
    assert_eq!(dup["code"], "DUPLICATE");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let server = TestServer::start().await;
    server.token_for("sales@erp.com", Role::Sales).await;

    let (status, _, body) = server
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "sales@erp.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, 401);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _, body) = server
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "SALES@erp.com", "password": "Passw0rd!" })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["role"], "sales");
}

#[tokio::test]
async fn roles_gate_mutations() {
    let server = TestServer::start().await;
    let viewer = server.token_for("viewer@erp.com", Role::Viewer).await;
    let inventory = server.token_for("inventory@erp.com", Role::Inventory).await;

    let (status, _, body) = server
        .send("POST", "/api/products", Some(&viewer), Some(product_body("MOU-002", 5)))
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _, product) = server
        .send("POST", "/api/products", Some(&inventory), Some(product_body("mou-002", 5)))
        .await;
    assert_eq!(status, 201);
    assert_eq!(product["sku"], "MOU-002");

    // Only admin deletes.
    let path = format!("/api/products/{}", product["id"].as_str().unwrap_or_default());
    let (status, _, _) = server.send("DELETE", &path, Some(&inventory), None).await;
    assert_eq!(status, 403);

    // Reports are for admin and inventory.
    let (status, _, _) = server.send("GET", "/api/reports/profit", Some(&viewer), None).await;
    assert_eq!(status, 403);
    let (status, _, _) = server
        .send("GET", "/api/reports/inventory", Some(&inventory), None)
        .await;
    assert_eq!(status, 200);

    // Users are admin-only.
    let (status, _, _) = server.send("GET", "/api/users", Some(&inventory), None).await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn list_endpoints_return_page_envelope() {
    let server = TestServer::start().await;
    let admin = server.token_for("admin@erp.com", Role::Admin).await;

    for sku in ["A-1", "A-2", "A-3"] {
        let (status, _, _) = server
            .send("POST", "/api/products", Some(&admin), Some(product_body(sku, 1)))
            .await;
        assert_eq!(status, 201);
    }

    let (status, _, page) = server
        .send("GET", "/api/products?page=1&limit=2", Some(&admin), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(page["total"], 3);
    assert_eq!(page["page"], 1);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["data"].as_array().map(Vec::len), Some(1));

    let (status, _, body) = server
        .send("GET", "/api/products?page=abc", Some(&admin), None)
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn sales_order_beyond_stock_is_rejected() {
    let server = TestServer::start().await;
    let admin = server.token_for("admin@erp.com", Role::Admin).await;
    let sales = server.token_for("sales@erp.com", Role::Sales).await;

    let (_, _, product) = server
        .send("POST", "/api/products", Some(&admin), Some(product_body("MOU-002", 5)))
        .await;
    let product_id = product["id"].as_str().unwrap_or_default().to_string();

    let order = |quantity: i64| {
        json!({
            "customerId": "c1",
            "items": [{ "productId": product_id, "quantity": quantity, "price": 1200.0 }],
        })
    };

    let (status, _, body) = server
        .send("POST", "/api/sales-orders", Some(&sales), Some(order(6)))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    let (status, _, created) = server
        .send("POST", "/api/sales-orders", Some(&sales), Some(order(5)))
        .await;
    assert_eq!(status, 201);
    assert_eq!(created["orderNumber"], "SO-000001");

    let path = format!("/api/products/{product_id}");
    let (_, _, product) = server.send("GET", &path, Some(&sales), None).await;
    assert_eq!(product["stock"], 0);
}

#[tokio::test]
async fn unknown_document_is_not_found() {
    let server = TestServer::start().await;
    let admin = server.token_for("admin@erp.com", Role::Admin).await;

    let (status, _, body) = server
        .send("GET", "/api/invoices/does-not-exist", Some(&admin), None)
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn purchase_to_invoice_round_trip() {
    let server = TestServer::start().await;
    let admin = server.token_for("admin@erp.com", Role::Admin).await;
    let purchase = server.token_for("purchase@erp.com", Role::Purchase).await;
    let inventory = server.token_for("inventory@erp.com", Role::Inventory).await;
    let sales = server.token_for("sales@erp.com", Role::Sales).await;

    let (_, _, product) = server
        .send("POST", "/api/products", Some(&admin), Some(product_body("KEY-003", 0)))
        .await;
    let product_id = product["id"].as_str().unwrap_or_default().to_string();
    let product_path = format!("/api/products/{product_id}");

    // Purchase raises the order.
    let (status, _, po) = server
        .send(
            "POST",
            "/api/purchase-orders",
            Some(&purchase),
            Some(json!({
                "supplierId": "s1",
                "items": [{ "productId": product_id, "quantity": 20, "price": 800.0 }],
            })),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(po["orderNumber"], "PO-000001");
    assert_eq!(po["status"], "pending");
    let po_id = po["id"].as_str().unwrap_or_default().to_string();
    let po_path = format!("/api/purchase-orders/{po_id}");

    let receipt = |purchase_order_id: &str| {
        json!({
            "purchaseOrderId": purchase_order_id,
            "items": [{ "productId": product_id, "receivedQuantity": 20 }],
        })
    };

    // Sales may not receive goods.
    let (status, _, body) = server
        .send("POST", "/api/grn", Some(&sales), Some(receipt(&po_id)))
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _, body) = server
        .send("POST", "/api/grn", Some(&inventory), Some(receipt("no-such-po")))
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "NOT_FOUND");

    // Inventory receives the full quantity.
    let (status, _, grn) = server
        .send("POST", "/api/grn", Some(&inventory), Some(receipt(&po_id)))
        .await;
    assert_eq!(status, 201);
    assert_eq!(grn["grnNumber"], "GRN-000001");
    assert_eq!(grn["purchaseOrderId"], po_id.as_str());
    assert_eq!(grn["supplierId"], "s1");
    assert_eq!(grn["items"][0]["orderedQuantity"], 20);
    assert_eq!(grn["items"][0]["receivedQuantity"], 20);

    let (_, _, product) = server.send("GET", &product_path, Some(&sales), None).await;
    assert_eq!(product["stock"], 20);
    let (status, _, po) = server.send("GET", &po_path, Some(&sales), None).await;
    assert_eq!(status, 200);
    assert_eq!(po["status"], "received");
    assert_eq!(po["items"][0]["receivedQuantity"], 20);

    // Status overrides are purchase-only.
    let (status, _, _) = server
        .send("PUT", &po_path, Some(&sales), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, 403);
    let (status, _, po) = server
        .send("PUT", &po_path, Some(&purchase), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, 200);
    assert_eq!(po["status"], "cancelled");

    // Sales sells, marks it paid, then invoices it.
    let (status, _, so) = server
        .send(
            "POST",
            "/api/sales-orders",
            Some(&sales),
            Some(json!({
                "customerId": "c1",
                "items": [{ "productId": product_id, "quantity": 4, "price": 1200.0 }],
            })),
        )
        .await;
    assert_eq!(status, 201);
    let so_id = so["id"].as_str().unwrap_or_default().to_string();
    let so_path = format!("/api/sales-orders/{so_id}");

    let (status, _, so) = server
        .send(
            "PUT",
            &format!("{so_path}/status"),
            Some(&sales),
            Some(json!({ "paymentStatus": "paid" })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(so["paymentStatus"], "paid");

    let (status, _, invoice) = server
        .send(
            "POST",
            "/api/invoices",
            Some(&sales),
            Some(json!({ "salesOrderId": so_id, "dueDate": "2026-12-31T00:00:00Z" })),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(invoice["invoiceNumber"], "INV-000001");
    assert_eq!(invoice["customerId"], "c1");
    assert_eq!(invoice["totalAmount"], 4800.0);

    let (_, _, so) = server.send("GET", &so_path, Some(&sales), None).await;
    assert_eq!(so["paymentStatus"], "unpaid");
    let (_, _, product) = server.send("GET", &product_path, Some(&sales), None).await;
    assert_eq!(product["stock"], 16);

    let (status, _, body) = server
        .send(
            "POST",
            "/api/invoices",
            Some(&sales),
            Some(json!({ "salesOrderId": "no-such-so", "dueDate": "2026-12-31T00:00:00Z" })),
        )
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "NOT_FOUND");
}
