//! Enrichment tests against mock Key Vault and managed identity servers.
//!
//! Every test uses a `MemoryEnv` so the real process environment is never
//! read or written, except where `ProcessEnv` itself is under test.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dotenv_keyvault::error::{EnvError, Error, FetchError, TokenError, TransportError};
use dotenv_keyvault::{AccessToken, EnvMap, EnvStore, KeyVault, MemoryEnv, ProcessEnv, TokenSource};

fn map(pairs: &[(&str, &str)]) -> EnvMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// `kv:` reference to secret `name` on `server`.
fn reference(server: &MockServer, name: &str) -> String {
    format!("kv:{}/secrets/{}", server.uri(), name)
}

/// Env store pointing the managed identity flow at `server`.
fn msi_env(server: &MockServer) -> Arc<MemoryEnv> {
    Arc::new(
        [
            ("MSI_ENDPOINT", server.uri()),
            ("MSI_SECRET", "MY_SECRET_KEY".to_string()),
        ]
        .into_iter()
        .collect(),
    )
}

fn vault(token: TokenSource, env: &Arc<MemoryEnv>) -> KeyVault {
    KeyVault::builder().token(token).shared_env(env.clone()).build()
}

async fn mount_secret(server: &MockServer, name: &str, value: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/secrets/{}", name)))
        .and(query_param("api-version", "2016-10-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "attributes": "attr",
            "contentType": "thing",
            "id": "id",
            "kid": "string",
            "managed": "true",
            "value": value,
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_no_references_contacts_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "T" })))
        .expect(0)
        .mount(&server)
        .await;

    let env = msi_env(&server);
    let parsed = map(&[("MYTRUTH", "THETRUTH"), ("OTHER", "value with kv: inside")]);

    let out = vault(TokenSource::Absent, &env).enrich(&parsed).await.unwrap();
    assert_eq!(out, parsed);
    assert_eq!(env.get("MYTRUTH"), None);
}

#[tokio::test]
async fn test_provider_called_once_only_when_references_present() {
    let server = MockServer::start().await;
    mount_secret(&server, "MYSECRET", "MYSECRETVALUE").await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let source = TokenSource::from_fn(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, TokenError>(AccessToken::new("SOME_TOKEN")) }
    });
    let env = Arc::new(MemoryEnv::new());
    let vault = vault(source, &env);

    vault.enrich(&map(&[("MYPLAIN", "PLAINTEXT")])).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let secret = reference(&server, "MYSECRET");
    vault
        .enrich(&map(&[("MYPLAIN", "PLAINTEXT"), ("MYSECRET", secret.as_str())]))
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_literal_token_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/secrets/A"))
        .and(header("Authorization", "Bearer SOME_TOKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "a" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/secrets/B"))
        .and(header("Authorization", "Bearer SOME_TOKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "b" })))
        .expect(1)
        .mount(&server)
        .await;

    let env = Arc::new(MemoryEnv::new());
    let parsed = map(&[
        ("A", reference(&server, "A").as_str()),
        ("B", reference(&server, "B").as_str()),
    ]);

    let out = vault(TokenSource::literal("SOME_TOKEN"), &env)
        .enrich(&parsed)
        .await
        .unwrap();
    assert_eq!(out, map(&[("A", "a"), ("B", "b")]));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in requests {
        assert_eq!(
            request.headers.get("authorization").unwrap().to_str().unwrap(),
            "Bearer SOME_TOKEN"
        );
    }
}

#[tokio::test]
async fn test_secret_replaces_reference_in_output_and_env() {
    let server = MockServer::start().await;
    mount_secret(&server, "MYSECRET", "MYSECRETVALUE").await;

    let env = Arc::new(MemoryEnv::new());
    let parsed = map(&[
        ("MYPLAIN", "PLAINTEXT"),
        ("MYSECRET", reference(&server, "MYSECRET").as_str()),
    ]);

    let out = vault(TokenSource::literal("SOME_TOKEN"), &env)
        .enrich(&parsed)
        .await
        .unwrap();

    assert_eq!(
        out,
        map(&[("MYPLAIN", "PLAINTEXT"), ("MYSECRET", "MYSECRETVALUE")])
    );
    assert_eq!(env.get("MYSECRET").as_deref(), Some("MYSECRETVALUE"));
    assert_eq!(env.get("MYPLAIN"), None);
}

#[tokio::test]
async fn test_managed_identity_token_flows_into_fetches() {
    let msi = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("resource", "https://vault.azure.net"))
        .and(query_param("api-version", "2017-09-01"))
        .and(header("Secret", "MY_SECRET_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "eyJ0eXAiblahblah",
            "expires_on": "09/14/2018 00:00:00 PM +00:00",
            "resource": "https://vault.azure.net",
            "token_type": "Bearer",
        })))
        .expect(1)
        .mount(&msi)
        .await;

    let kv = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/secrets/MYSECRET"))
        .and(header("Authorization", "Bearer eyJ0eXAiblahblah"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "MYSECRETVALUE" })))
        .expect(1)
        .mount(&kv)
        .await;

    let env = msi_env(&msi);
    let parsed = map(&[
        ("MYTRUTH", "TRUTH"),
        ("MYSECRET", reference(&kv, "MYSECRET").as_str()),
    ]);

    let out = vault(TokenSource::Absent, &env).enrich(&parsed).await.unwrap();
    assert_eq!(out["MYSECRET"], "MYSECRETVALUE");
    assert_eq!(out["MYTRUTH"], "TRUTH");

    let identity = msi.received_requests().await.unwrap();
    assert_eq!(identity[0].url.path(), "/");
    assert_eq!(
        identity[0].url.query(),
        Some("resource=https://vault.azure.net&api-version=2017-09-01")
    );
}

#[tokio::test]
async fn test_identity_failure_surfaces_unwrapped() {
    let msi = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("identity unavailable"))
        .mount(&msi)
        .await;

    let kv = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "x" })))
        .expect(0)
        .mount(&kv)
        .await;

    let env = msi_env(&msi);
    let parsed = map(&[("MYSECRET", reference(&kv, "MYSECRET").as_str())]);

    let err = vault(TokenSource::Absent, &env)
        .enrich(&parsed)
        .await
        .unwrap_err();

    let expected = TransportError::Status {
        url: format!(
            "{}/?resource=https://vault.azure.net&api-version=2017-09-01",
            msi.uri()
        ),
        status: 500,
        body: "identity unavailable".to_string(),
    };
    match err {
        Error::Identity(raw) => assert_eq!(raw, expected),
        other => panic!("expected identity error, got {other:?}"),
    }
    assert_eq!(env.get("MYSECRET"), None);
}

#[tokio::test]
async fn test_secret_failure_is_aggregated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/secrets/MYSECRET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let env = Arc::new(MemoryEnv::new());
    let parsed = map(&[("MYSECRET", reference(&server, "MYSECRET").as_str())]);

    let err = vault(TokenSource::literal("SOME_TOKEN"), &env)
        .enrich(&parsed)
        .await
        .unwrap_err();

    match err {
        Error::SecretFetch(aggregate) => {
            assert_eq!(aggregate.keys(), vec!["MYSECRET"]);
            assert_eq!(aggregate.first().source.status(), Some(403));
            assert!(aggregate.to_string().contains("MYSECRET"));
        }
        other => panic!("expected aggregate error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_partial_failure_still_runs_every_fetch() {
    let server = MockServer::start().await;
    mount_secret(&server, "GOOD", "good-value").await;
    Mock::given(method("GET"))
        .and(path("/secrets/BAD"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let env = Arc::new(MemoryEnv::new());
    let parsed = map(&[
        ("BAD", reference(&server, "BAD").as_str()),
        ("GOOD", reference(&server, "GOOD").as_str()),
    ]);

    let err = vault(TokenSource::literal("SOME_TOKEN"), &env)
        .enrich(&parsed)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SecretFetch(ref a) if a.keys() == vec!["BAD"]));
    // The successful fetch already landed in the environment
    assert_eq!(env.get("GOOD").as_deref(), Some("good-value"));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_environment_reference_overrides_file() {
    let server = MockServer::start().await;
    mount_secret(&server, "OVERRIDE", "from-override").await;
    Mock::given(method("GET"))
        .and(path("/secrets/MYSECRET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": "from-file" })))
        .expect(0)
        .mount(&server)
        .await;

    let env: Arc<MemoryEnv> = Arc::new(
        [("MYSECRET", reference(&server, "OVERRIDE"))]
            .into_iter()
            .collect(),
    );
    let parsed = map(&[("MYSECRET", reference(&server, "MYSECRET").as_str())]);

    let out = vault(TokenSource::literal("SOME_TOKEN"), &env)
        .enrich(&parsed)
        .await
        .unwrap();

    assert_eq!(out["MYSECRET"], "from-override");
    assert_eq!(env.get("MYSECRET").as_deref(), Some("from-override"));
}

#[tokio::test]
async fn test_process_env_receives_secret() {
    let server = MockServer::start().await;
    mount_secret(&server, "PROCESS", "process-value").await;

    let key = "DOTENV_KEYVAULT_IT_PROCESS_SECRET";
    let vault = KeyVault::builder()
        .token(TokenSource::literal("SOME_TOKEN"))
        .env(ProcessEnv)
        .build();

    vault
        .enrich(&map(&[(key, reference(&server, "PROCESS").as_str())]))
        .await
        .unwrap();
    assert_eq!(std::env::var(key).unwrap(), "process-value");
}

#[tokio::test]
async fn test_nul_in_secret_value_is_a_fetch_failure() {
    let server = MockServer::start().await;
    mount_secret(&server, "NUL", "a\u{0}b").await;

    let key = "DOTENV_KEYVAULT_IT_NUL_SECRET";
    let vault = KeyVault::builder()
        .token(TokenSource::literal("SOME_TOKEN"))
        .env(ProcessEnv)
        .build();

    let err = vault
        .enrich(&map(&[(key, reference(&server, "NUL").as_str())]))
        .await
        .unwrap_err();

    match err {
        Error::SecretFetch(aggregate) => {
            assert_eq!(aggregate.keys(), vec![key]);
            assert!(matches!(
                aggregate.first().source,
                FetchError::Env(EnvError::InvalidValue { .. })
            ));
        }
        other => panic!("expected aggregate error, got {other:?}"),
    }
    assert!(std::env::var_os(key).is_none());
}
