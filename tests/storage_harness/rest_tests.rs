//! REST integration test macro for store backends.
//!
//! The `rest_integration_tests!` macro generates HTTP-level tests that run
//! the full application router over a store:
//! JSON → HTTP request → handler → Store → HTTP response → JSON.

/// Generate a REST integration test suite for a store backend.
///
/// `$factory` must produce a fresh, empty `impl Store + 'static`.
///
/// # Generated Tests
///
/// - companies: create/slug, get with nested ids, list, update, delete
/// - invoices: create defaults, paid/unpaid transitions, rejected updates
/// - industries: grouped view, association, duplicate/unknown association
/// - errors: envelope shape, 400/404/409/422 mapping, unknown routes
#[macro_export]
macro_rules! rest_integration_tests {
    ($factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use biztime::server::ServerBuilder;
            use serde_json::{Value, json};

            async fn make_server() -> TestServer {
                let store = $factory;
                let router = ServerBuilder::new().with_store(store).build().unwrap();
                TestServer::try_new(router).unwrap()
            }

            async fn create_company(server: &TestServer, name: &str) -> Value {
                let response = server
                    .post("/companies")
                    .json(&json!({ "name": name, "description": format!("{} desc", name) }))
                    .await;
                response.assert_status(StatusCode::CREATED);
                response.json::<Value>()["company"].clone()
            }

            async fn create_invoice(server: &TestServer, comp_code: &str, amt: f64) -> Value {
                let response = server
                    .post("/invoices")
                    .json(&json!({ "comp_code": comp_code, "amt": amt }))
                    .await;
                response.assert_status(StatusCode::CREATED);
                response.json::<Value>()["invoice"].clone()
            }

            async fn create_industry(server: &TestServer, label: &str) -> Value {
                let response = server
                    .post("/industries")
                    .json(&json!({ "industry": label }))
                    .await;
                response.assert_status(StatusCode::CREATED);
                response.json::<Value>()["industry"].clone()
            }

            // ==============================================================
            // Health & routing
            // ==============================================================

            #[tokio::test]
            async fn test_rest_health() {
                let server = make_server().await;
                for path in ["/health", "/healthz"] {
                    let response = server.get(path).await;
                    response.assert_status(StatusCode::OK);
                    let body: Value = response.json();
                    assert_eq!(body["status"], "ok");
                    assert_eq!(body["service"], "biztime");
                }
            }

            #[tokio::test]
            async fn test_rest_unknown_route_is_404_envelope() {
                let server = make_server().await;
                let response = server.get("/nope").await;
                response.assert_status(StatusCode::NOT_FOUND);
                assert_error_envelope(&response.json(), 404, "ROUTE_NOT_FOUND");
            }

            // ==============================================================
            // Companies
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create_company_then_get() {
                let server = make_server().await;

                let company = create_company(&server, "Test Co").await;
                assert_eq!(company["code"], "test-co");
                assert_eq!(company["name"], "Test Co");

                let response = server.get("/companies/test-co").await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();
                assert_eq!(body["company"]["code"], "test-co");
                assert_eq!(body["company"]["description"], "Test Co desc");
                assert_eq!(body["company"]["invoices"], json!([]));
                assert_eq!(body["company"]["industries"], json!([]));
            }

            #[tokio::test]
            async fn test_rest_create_company_slugs_name() {
                let server = make_server().await;
                let company = create_company(&server, "Apple Computer").await;
                assert_eq!(company["code"], "apple-computer");

                let company = create_company(&server, "Yahoo! Inc.").await;
                assert_eq!(company["code"], "yahoo-inc");
            }

            #[tokio::test]
            async fn test_rest_create_company_without_description() {
                let server = make_server().await;
                let response = server.post("/companies").json(&json!({ "name": "IBM" })).await;
                response.assert_status(StatusCode::CREATED);
                let body: Value = response.json();
                assert_eq!(body["company"]["code"], "ibm");
                assert_eq!(body["company"]["description"], Value::Null);
            }

            #[tokio::test]
            async fn test_rest_create_company_missing_name_is_422() {
                let server = make_server().await;

                let response = server
                    .post("/companies")
                    .json(&json!({ "description": "no name" }))
                    .await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                let body: Value = response.json();
                assert_error_envelope(&body, 422, "VALIDATION_ERROR");
                assert_eq!(body["error"]["details"]["fields"][0]["field"], "name");

                // An empty body reads as an empty object
                let response = server.post("/companies").await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

                let response = server.post("/companies").json(&json!({ "name": "   " })).await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
            }

            #[tokio::test]
            async fn test_rest_create_company_malformed_json_is_400() {
                let server = make_server().await;
                let response = server.post("/companies").text("{\"name\": ").await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_error_envelope(&response.json(), 400, "INVALID_JSON");
            }

            #[tokio::test]
            async fn test_rest_create_duplicate_company_is_409() {
                let server = make_server().await;
                create_company(&server, "Acme").await;

                let response = server.post("/companies").json(&json!({ "name": "ACME" })).await;
                response.assert_status(StatusCode::CONFLICT);
                assert_error_envelope(&response.json(), 409, "ENTITY_ALREADY_EXISTS");
            }

            #[tokio::test]
            async fn test_rest_list_companies() {
                let server = make_server().await;
                create_company(&server, "IBM").await;
                create_company(&server, "Apple").await;

                let response = server.get("/companies").await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();
                assert_eq!(
                    body["companies"],
                    json!([
                        { "code": "apple", "name": "Apple" },
                        { "code": "ibm", "name": "IBM" }
                    ])
                );
            }

            #[tokio::test]
            async fn test_rest_get_missing_company_is_404() {
                let server = make_server().await;
                let response = server.get("/companies/ghost").await;
                response.assert_status(StatusCode::NOT_FOUND);
                assert_error_envelope(&response.json(), 404, "ENTITY_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_rest_update_company_keeps_code() {
                let server = make_server().await;
                create_company(&server, "Acme").await;

                let response = server
                    .put("/companies/acme")
                    .json(&json!({ "name": "Acme Corporation", "description": "Renamed" }))
                    .await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();
                assert_eq!(body["company"]["code"], "acme");
                assert_eq!(body["company"]["name"], "Acme Corporation");
                assert_eq!(body["company"]["description"], "Renamed");

                // Omitted description is replaced with null
                let response = server
                    .put("/companies/acme")
                    .json(&json!({ "name": "Acme" }))
                    .await;
                let body: Value = response.json();
                assert_eq!(body["company"]["description"], Value::Null);
            }

            #[tokio::test]
            async fn test_rest_update_company_errors() {
                let server = make_server().await;
                let response = server
                    .put("/companies/ghost")
                    .json(&json!({ "name": "Ghost" }))
                    .await;
                response.assert_status(StatusCode::NOT_FOUND);

                create_company(&server, "Acme").await;
                let response = server
                    .put("/companies/acme")
                    .json(&json!({ "description": "no name" }))
                    .await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
            }

            #[tokio::test]
            async fn test_rest_delete_company_is_idempotent() {
                let server = make_server().await;
                create_company(&server, "Acme").await;

                for _ in 0..2 {
                    let response = server.delete("/companies/acme").await;
                    response.assert_status(StatusCode::OK);
                    assert_eq!(response.json::<Value>(), json!({ "msg": "DELETED" }));
                }
                server
                    .get("/companies/acme")
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_company_lists_invoices_and_industries() {
                let server = make_server().await;
                create_company(&server, "Acme").await;
                create_industry(&server, "Technology").await;
                let invoice = create_invoice(&server, "acme", 100.0).await;
                server
                    .post("/industries/technology/companies")
                    .json(&json!({ "comp_code": "acme" }))
                    .await
                    .assert_status(StatusCode::CREATED);

                let body: Value = server.get("/companies/acme").await.json();
                assert_eq!(body["company"]["invoices"], json!([invoice["id"]]));
                assert_eq!(body["company"]["industries"], json!(["technology"]));
            }

            // ==============================================================
            // Invoices
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create_invoice_defaults() {
                let server = make_server().await;
                create_company(&server, "Test Co").await;

                let invoice = create_invoice(&server, "test-co", 100.0).await;
                assert!(invoice["id"].as_i64().is_some());
                assert_eq!(invoice["comp_code"], "test-co");
                assert_amount(&invoice["amt"], 100.0);
                assert_eq!(invoice["paid"], false);
                assert_eq!(invoice["paid_date"], Value::Null);
                assert_eq!(invoice["add_date"], today().to_string());
            }

            #[tokio::test]
            async fn test_rest_create_invoice_accepts_numeric_string() {
                let server = make_server().await;
                create_company(&server, "Acme").await;

                let response = server
                    .post("/invoices")
                    .json(&json!({ "comp_code": "acme", "amt": "99.95" }))
                    .await;
                response.assert_status(StatusCode::CREATED);
                assert_amount(&response.json::<Value>()["invoice"]["amt"], 99.95);
            }

            #[tokio::test]
            async fn test_rest_create_invoice_unknown_company_is_422() {
                let server = make_server().await;
                let response = server
                    .post("/invoices")
                    .json(&json!({ "comp_code": "ghost", "amt": 100 }))
                    .await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                let body: Value = response.json();
                assert_error_envelope(&body, 422, "CONSTRAINT_VIOLATION");
                assert_eq!(body["error"]["details"]["kind"], "foreign_key");

                let body: Value = server.get("/invoices").await.json();
                assert_eq!(body["invoices"], json!([]));
            }

            #[tokio::test]
            async fn test_rest_create_invoice_invalid_input_is_422() {
                let server = make_server().await;
                create_company(&server, "Acme").await;

                for payload in [
                    json!({ "amt": 100 }),
                    json!({ "comp_code": "acme" }),
                    json!({ "comp_code": "acme", "amt": null }),
                    json!({ "comp_code": "acme", "amt": -5 }),
                    json!({ "comp_code": "acme", "amt": 0 }),
                    json!({ "comp_code": "acme", "amt": "lots" }),
                    json!({ "comp_code": "acme", "amt": true }),
                ] {
                    let response = server.post("/invoices").json(&payload).await;
                    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                }
            }

            #[tokio::test]
            async fn test_rest_create_invoice_amount_out_of_range_is_422() {
                let server = make_server().await;
                create_company(&server, "Acme").await;

                for amt in [json!(0.001), json!("12345678901234567890"), json!(1e15)] {
                    let response = server
                        .post("/invoices")
                        .json(&json!({ "comp_code": "acme", "amt": amt }))
                        .await;
                    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                    assert_error_envelope(&response.json::<Value>(), 422, "VALIDATION_ERROR");
                }

                let body: Value = server.get("/invoices").await.json();
                assert_eq!(body["invoices"], json!([]));
            }

            #[tokio::test]
            async fn test_rest_update_invoice_oversized_amount_is_422() {
                let server = make_server().await;
                create_company(&server, "Acme").await;
                let invoice = create_invoice(&server, "acme", 100.0).await;
                let path = format!("/invoices/{}", invoice["id"]);

                let response = server
                    .put(&path)
                    .json(&json!({ "amt": "10000000000" }))
                    .await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

                let body: Value = server.get(&path).await.json();
                assert_amount(&body["invoice"]["amt"], 100.0);
            }

            #[tokio::test]
            async fn test_rest_get_invoice_embeds_company() {
                let server = make_server().await;
                create_company(&server, "Acme").await;
                let invoice = create_invoice(&server, "acme", 250.5).await;
                let id = invoice["id"].as_i64().unwrap();

                let response = server.get(&format!("/invoices/{}", id)).await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();
                assert_eq!(body["invoice"]["id"], id);
                assert_amount(&body["invoice"]["amt"], 250.5);
                assert_eq!(
                    body["invoice"]["company"],
                    json!({ "code": "acme", "name": "Acme", "description": "Acme desc" })
                );
            }

            #[tokio::test]
            async fn test_rest_get_invoice_errors() {
                let server = make_server().await;

                let response = server.get("/invoices/999999").await;
                response.assert_status(StatusCode::NOT_FOUND);
                assert_error_envelope(&response.json(), 404, "ENTITY_NOT_FOUND");

                let response = server.get("/invoices/abc").await;
                response.assert_status(StatusCode::BAD_REQUEST);
                assert_error_envelope(&response.json(), 400, "INVALID_ID");
            }

            #[tokio::test]
            async fn test_rest_list_invoices() {
                let server = make_server().await;
                create_company(&server, "Acme").await;
                let first = create_invoice(&server, "acme", 10.0).await;
                let second = create_invoice(&server, "acme", 20.0).await;

                let body: Value = server.get("/invoices").await.json();
                let invoices = body["invoices"].as_array().unwrap();
                assert_count(invoices, 2);
                assert_eq!(invoices[0]["id"], first["id"]);
                assert_eq!(invoices[1]["id"], second["id"]);
            }

            #[tokio::test]
            async fn test_rest_pay_then_unpay_invoice() {
                let server = make_server().await;
                create_company(&server, "Test Co").await;
                let invoice = create_invoice(&server, "test-co", 100.0).await;
                let path = format!("/invoices/{}", invoice["id"]);

                let response = server.put(&path).json(&json!({ "paid": "true" })).await;
                response.assert_status(StatusCode::OK);
                let paid: Value = response.json::<Value>()["invoice"].clone();
                assert_eq!(paid["paid"], true);
                assert_eq!(paid["paid_date"], today().to_string());
                assert_amount(&paid["amt"], 100.0);

                let response = server.put(&path).json(&json!({ "paid": "FALSE" })).await;
                response.assert_status(StatusCode::OK);
                let unpaid: Value = response.json::<Value>()["invoice"].clone();
                assert_eq!(unpaid["paid"], false);
                assert_eq!(unpaid["paid_date"], Value::Null);
            }

            #[tokio::test]
            async fn test_rest_update_invoice_amount_only() {
                let server = make_server().await;
                create_company(&server, "Acme").await;
                let invoice = create_invoice(&server, "acme", 100.0).await;
                let path = format!("/invoices/{}", invoice["id"]);
                server.put(&path).json(&json!({ "paid": true })).await;

                let response = server.put(&path).json(&json!({ "amt": 500 })).await;
                response.assert_status(StatusCode::OK);
                let updated: Value = response.json::<Value>()["invoice"].clone();
                assert_amount(&updated["amt"], 500.0);
                assert_eq!(updated["paid"], true);
                assert_eq!(updated["paid_date"], today().to_string());
            }

            #[tokio::test]
            async fn test_rest_update_invoice_invalid_paid_leaves_row() {
                let server = make_server().await;
                create_company(&server, "Acme").await;
                let invoice = create_invoice(&server, "acme", 100.0).await;
                let path = format!("/invoices/{}", invoice["id"]);

                let response = server
                    .put(&path)
                    .json(&json!({ "amt": 999, "paid": "maybe" }))
                    .await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                let body: Value = response.json();
                assert_error_envelope(&body, 422, "INVALID_PAID_VALUE");
                assert!(
                    body["error"]["message"]
                        .as_str()
                        .unwrap()
                        .contains("paid value must be true or false")
                );

                let body: Value = server.get(&path).await.json();
                assert_amount(&body["invoice"]["amt"], 100.0);
                assert_eq!(body["invoice"]["paid"], false);
            }

            #[tokio::test]
            async fn test_rest_update_invoice_without_fields_is_422() {
                let server = make_server().await;
                create_company(&server, "Acme").await;
                let invoice = create_invoice(&server, "acme", 100.0).await;
                let path = format!("/invoices/{}", invoice["id"]);

                let response = server.put(&path).json(&json!({})).await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                assert_error_envelope(&response.json(), 422, "EMPTY_UPDATE");

                let response = server.put(&path).await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
            }

            #[tokio::test]
            async fn test_rest_update_missing_invoice_is_404() {
                let server = make_server().await;
                let response = server
                    .put("/invoices/999999")
                    .json(&json!({ "paid": "true" }))
                    .await;
                response.assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_delete_invoice_is_idempotent() {
                let server = make_server().await;
                create_company(&server, "Acme").await;
                let invoice = create_invoice(&server, "acme", 100.0).await;
                let path = format!("/invoices/{}", invoice["id"]);

                for _ in 0..2 {
                    let response = server.delete(&path).await;
                    response.assert_status(StatusCode::OK);
                    assert_eq!(response.json::<Value>(), json!({ "status": "DELETED" }));
                }
                server.get(&path).await.assert_status(StatusCode::NOT_FOUND);

                server
                    .delete("/invoices/abc")
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
            }

            // ==============================================================
            // Industries
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create_industry() {
                let server = make_server().await;
                let industry = create_industry(&server, "Information Technology").await;
                assert_eq!(
                    industry,
                    json!({ "code": "information-technology", "industry": "Information Technology" })
                );

                let response = server.post("/industries").json(&json!({})).await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

                let response = server
                    .post("/industries")
                    .json(&json!({ "industry": "information technology" }))
                    .await;
                response.assert_status(StatusCode::CONFLICT);
            }

            #[tokio::test]
            async fn test_rest_list_industries_grouped_by_label() {
                let server = make_server().await;
                create_company(&server, "Acme").await;
                create_company(&server, "IBM").await;
                create_industry(&server, "Technology").await;
                create_industry(&server, "Accounting").await;

                for comp_code in ["ibm", "acme"] {
                    let response = server
                        .post("/industries/technology/companies")
                        .json(&json!({ "comp_code": comp_code }))
                        .await;
                    response.assert_status(StatusCode::CREATED);
                    assert_eq!(
                        response.json::<Value>()["message"],
                        format!("Associated {} with technology", comp_code)
                    );
                }

                let response = server.get("/industries").await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();
                assert_eq!(
                    body["industries"],
                    json!({ "Accounting": [], "Technology": ["acme", "ibm"] })
                );
            }

            #[tokio::test]
            async fn test_rest_associate_errors() {
                let server = make_server().await;
                create_company(&server, "Acme").await;
                create_industry(&server, "Technology").await;

                let path = "/industries/technology/companies";
                server
                    .post(path)
                    .json(&json!({ "comp_code": "acme" }))
                    .await
                    .assert_status(StatusCode::CREATED);

                let response = server.post(path).json(&json!({ "comp_code": "acme" })).await;
                response.assert_status(StatusCode::CONFLICT);
                assert_error_envelope(&response.json(), 409, "ASSOCIATION_ALREADY_EXISTS");

                let response = server.post(path).json(&json!({ "comp_code": "ghost" })).await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                assert_error_envelope(&response.json(), 422, "CONSTRAINT_VIOLATION");

                let response = server
                    .post("/industries/ghost/companies")
                    .json(&json!({ "comp_code": "acme" }))
                    .await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

                let response = server.post(path).json(&json!({})).await;
                response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
                assert_error_envelope(&response.json(), 422, "VALIDATION_ERROR");
            }

            #[tokio::test]
            async fn test_rest_delete_company_cascades_to_invoices() {
                let server = make_server().await;
                create_company(&server, "Acme").await;
                create_industry(&server, "Technology").await;
                let invoice = create_invoice(&server, "acme", 100.0).await;
                server
                    .post("/industries/technology/companies")
                    .json(&json!({ "comp_code": "acme" }))
                    .await;

                server.delete("/companies/acme").await.assert_status(StatusCode::OK);

                server
                    .get(&format!("/invoices/{}", invoice["id"]))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
                let body: Value = server.get("/industries").await.json();
                assert_eq!(body["industries"], json!({ "Technology": [] }));
            }
        }
    };
}
