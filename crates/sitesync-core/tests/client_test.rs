#![allow(clippy::unwrap_used)]
// Integration tests for `SiteClient` against a wiremock store: optimistic
// mutations, the dual persistence path, and the bulk save coordinator.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sitesync_core::{
    AiModel, BrandSettingsPatch, CoreError, EntityId, Faq, FaqPatch, Identity, NewFaq, SiteClient,
    SiteSettingsPatch, StoreConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Opt-in log output for debugging failing tests (RUST_LOG=debug).
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Serve empty rows for every table select.
async fn mount_empty_tables(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/rest/v1/[a-z_]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(50)
        .mount(server)
        .await;
}

async fn client_for(server: &MockServer) -> SiteClient {
    init_tracing();
    let mut config = StoreConfig::new(
        Url::parse(&server.uri()).unwrap(),
        SecretString::from("anon-key".to_owned()),
    );
    config.realtime_enabled = false;
    let client = SiteClient::new(config);
    client.connect().await.unwrap();
    client
}

async fn connected_client() -> (MockServer, SiteClient) {
    let server = MockServer::start().await;
    mount_empty_tables(&server).await;
    let client = client_for(&server).await;
    (server, client)
}

fn faq_row(id: i64, question: &str) -> serde_json::Value {
    json!({ "id": id, "question": question, "answer": "Now.", "visible": true, "position": 1 })
}

fn new_faq(question: &str) -> NewFaq {
    NewFaq {
        question: question.into(),
        answer: "Now.".into(),
        visible: true,
        position: 1,
    }
}

fn model_row(id: i64, group: &str, is_default: bool) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("model-{id}"),
        "provider": "acme",
        "model_key": format!("key-{id}"),
        "model_group": group,
        "is_default": is_default,
        "enabled": true
    })
}

// ── Optimistic add ──────────────────────────────────────────────────

#[tokio::test]
async fn add_shows_pending_record_then_swaps_in_assigned_id() {
    let (server, client) = connected_client().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/faqs"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([faq_row(21, "When?")]))
                .set_delay(Duration::from_millis(250)),
        )
        .mount(&server)
        .await;

    let task = {
        let client = client.clone();
        tokio::spawn(async move { client.add::<Faq>(new_faq("When?")).await })
    };

    // While the insert is in flight the optimistic record is visible
    // under its pending id.
    tokio::time::sleep(Duration::from_millis(100)).await;
    {
        let snap = client.store().faqs();
        assert_eq!(snap.len(), 1);
        assert!(snap[0].id.is_pending());
    }

    let created = task.await.unwrap().unwrap();
    assert_eq!(created.id, EntityId::Assigned(21));

    // Exactly one record: the pending one was replaced, not duplicated.
    let snap = client.store().faqs();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].id, EntityId::Assigned(21));
}

#[tokio::test]
async fn add_failure_removes_the_optimistic_record() {
    let (server, client) = connected_client().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/faqs"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;

    let result = client.add::<Faq>(new_faq("When?")).await;
    assert!(result.is_err());
    assert!(client.store().faqs().is_empty());
}

// ── Optimistic update / remove ──────────────────────────────────────

#[tokio::test]
async fn update_applies_the_acknowledged_server_row() {
    let (server, client) = connected_client().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/faqs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([faq_row(21, "When?")])))
        .mount(&server)
        .await;
    client.add::<Faq>(new_faq("When?")).await.unwrap();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/faqs"))
        .and(query_param("id", "eq.21"))
        .and(body_partial_json(json!({ "question": "Where?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([faq_row(21, "Where?")])))
        .mount(&server)
        .await;

    client
        .update::<Faq>(
            EntityId::Assigned(21),
            FaqPatch {
                question: Some("Where?".into()),
                ..FaqPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(client.store().faqs()[0].question, "Where?");
}

#[tokio::test]
async fn update_failure_restores_the_previous_record() {
    let (server, client) = connected_client().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/faqs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([faq_row(21, "When?")])))
        .mount(&server)
        .await;
    client.add::<Faq>(new_faq("When?")).await.unwrap();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/faqs"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;

    let result = client
        .update::<Faq>(
            EntityId::Assigned(21),
            FaqPatch {
                question: Some("Where?".into()),
                ..FaqPatch::default()
            },
        )
        .await;

    assert!(result.is_err());
    assert_eq!(client.store().faqs()[0].question, "When?");
}

#[tokio::test]
async fn remove_failure_reinserts_the_record() {
    let (server, client) = connected_client().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/faqs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([faq_row(21, "When?")])))
        .mount(&server)
        .await;
    client.add::<Faq>(new_faq("When?")).await.unwrap();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/faqs"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;

    let result = client.remove::<Faq>(EntityId::Assigned(21)).await;
    assert!(result.is_err());
    assert_eq!(client.store().faqs().len(), 1);
}

// ── Default-model group invariant ───────────────────────────────────

#[tokio::test]
async fn set_default_clears_only_its_own_group() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/ai_models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            model_row(1, "chat", true),
            model_row(2, "chat", false),
            model_row(3, "vision", true),
        ])))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_empty_tables(&server).await;
    let client = client_for(&server).await;

    // Guest path: the elevated procedure with the well-known default
    // password, since no password was ever stored locally.
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/set_default_model"))
        .and(body_partial_json(json!({ "model_id": 2, "admin_password": "admin" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    client.set_default_model(EntityId::Assigned(2)).await.unwrap();

    let by_id = |id: i64| -> AiModel {
        client
            .store()
            .ai_models()
            .iter()
            .find(|m| m.id == EntityId::Assigned(id))
            .map(|m| m.as_ref().clone())
            .unwrap()
    };
    assert!(by_id(2).is_default);
    assert!(!by_id(1).is_default);
    // Other group untouched.
    assert!(by_id(3).is_default);
}

#[tokio::test]
async fn rejected_default_change_restores_the_group() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/ai_models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            model_row(1, "chat", true),
            model_row(2, "chat", false),
        ])))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_empty_tables(&server).await;
    let client = client_for(&server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/set_default_model"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
        .mount(&server)
        .await;

    let result = client.set_default_model(EntityId::Assigned(2)).await;
    assert!(matches!(result, Err(CoreError::AuthorizationFailed { .. })));

    let snap = client.store().ai_models();
    let one = snap.iter().find(|m| m.id == EntityId::Assigned(1)).unwrap();
    let two = snap.iter().find(|m| m.id == EntityId::Assigned(2)).unwrap();
    assert!(one.is_default);
    assert!(!two.is_default);
}

#[tokio::test]
async fn disabling_a_model_clears_its_default_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/ai_models"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([model_row(1, "chat", true)])),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    mount_empty_tables(&server).await;
    let client = client_for(&server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/set_model_flag"))
        .and(body_partial_json(
            json!({ "model_id": 1, "flag": "enabled", "value": false }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_model_enabled(EntityId::Assigned(1), false)
        .await
        .unwrap();

    let snap = client.store().ai_models();
    assert!(!snap[0].enabled);
    assert!(!snap[0].is_default);
}

// ── Persistence strategy selector ───────────────────────────────────

#[tokio::test]
async fn guest_settings_save_goes_through_the_elevated_procedure() {
    let (server, client) = connected_client().await;

    assert_eq!(client.identity().await, Identity::local_admin());

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/save_site_content"))
        .and(body_partial_json(json!({
            "content_key": "brand_settings",
            "payload": { "brand_name": "Acme" },
            "admin_password": "admin"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    client
        .update_brand_settings(BrandSettingsPatch {
            brand_name: Some("Acme".into()),
            ..BrandSettingsPatch::default()
        })
        .await
        .unwrap();

    assert_eq!(client.store().brand_settings().unwrap().brand_name, "Acme");
}

#[tokio::test]
async fn credential_field_never_reaches_the_payload() {
    let (server, client) = connected_client().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/save_site_content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .mount(&server)
        .await;

    client
        .update_site_settings(SiteSettingsPatch {
            admin_password: Some("secret-1".into()),
            ..SiteSettingsPatch::default()
        })
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let rpc = requests
        .iter()
        .find(|r| r.url.path() == "/rest/v1/rpc/save_site_content")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&rpc.body).unwrap();

    // The new password gates the write itself, but is stripped from the
    // stored payload.
    assert_eq!(body["admin_password"], "secret-1");
    assert!(body["payload"].get("admin_password").is_none());
    assert_eq!(
        client.store().site_settings().unwrap().admin_password,
        "secret-1"
    );
}

#[tokio::test]
async fn authenticated_settings_save_upserts_without_a_password() {
    let (server, client) = connected_client().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt",
            "user": {
                "id": "550e8400-e29b-41d4-a716-446655440000",
                "email": "admin@lumeo.academy",
                "role": "authenticated"
            }
        })))
        .mount(&server)
        .await;

    let identity = client
        .sign_in("admin@lumeo.academy", &SecretString::from("pw".to_owned()))
        .await
        .unwrap();
    assert!(!identity.is_guest);
    assert!(client.has_session().await);

    Mock::given(method("POST"))
        .and(path("/rest/v1/site_content"))
        .and(query_param("on_conflict", "content_key"))
        .and(body_partial_json(json!({
            "content_key": "brand_settings",
            "payload": { "brand_name": "Acme" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": 9, "content_key": "brand_settings", "payload": { "brand_name": "Acme" } }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    // The elevated procedure must not be touched.
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/save_site_content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(0)
        .mount(&server)
        .await;

    client
        .update_brand_settings(BrandSettingsPatch {
            brand_name: Some("Acme".into()),
            ..BrandSettingsPatch::default()
        })
        .await
        .unwrap();

    assert_eq!(client.store().brand_settings().unwrap().brand_name, "Acme");
}

#[tokio::test]
async fn rejected_singleton_write_leaves_the_value_unchanged() {
    let (server, client) = connected_client().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/save_site_content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
        .mount(&server)
        .await;

    let result = client
        .update_brand_settings(BrandSettingsPatch {
            brand_name: Some("Acme".into()),
            ..BrandSettingsPatch::default()
        })
        .await;

    assert!(matches!(result, Err(CoreError::AuthorizationFailed { .. })));
    // Never loaded before the call, never loaded after.
    assert!(client.store().brand_settings().is_none());
}

// ── Bulk save coordinator ───────────────────────────────────────────

#[tokio::test]
async fn bulk_save_stops_at_the_first_failing_step() {
    let server = MockServer::start().await;
    // Seed every singleton so the coordinator has eight steps to run.
    let keys = [
        "brand_settings",
        "hero_content",
        "about_content",
        "contact_info",
        "footer_content",
        "seo_settings",
        "enrollment_settings",
        "site_settings",
    ];
    let rows: Vec<serde_json::Value> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| json!({ "id": i + 1, "content_key": key, "payload": {} }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/rest/v1/site_content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(rows)))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_empty_tables(&server).await;
    let client = client_for(&server).await;

    let save_rpc = |key: &str| {
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/save_site_content"))
            .and(body_partial_json(json!({ "content_key": key })))
    };

    // Steps 1 and 2 succeed exactly once; step 3 throws; 4..8 never run.
    save_rpc("brand_settings")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    save_rpc("hero_content")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    save_rpc("about_content")
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/save_site_content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .with_priority(10)
        .expect(0)
        .mount(&server)
        .await;

    let result = client.save_all_content().await;
    assert!(matches!(result, Err(CoreError::Store { .. })));

    server.verify().await;
}
