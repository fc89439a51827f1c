use serde_json::{json, Value};
use std::borrow::Cow;
use trust_http::{Auth, HttpClient, HttpError, RequestOpts};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn query_auth_is_sent_with_caller_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "eiffel tower"))
        .and(query_param("apiKey", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&format!("{}/v2/", server.uri())).unwrap();
    let opts = RequestOpts {
        query: Some(vec![("q", Cow::Borrowed("eiffel tower"))]),
        auth: Some(Auth::Query {
            name: "apiKey",
            value: Cow::Borrowed("secret"),
        }),
        ..Default::default()
    };
    let got: Value = client.get_json("everything", opts).await.unwrap();
    assert_eq!(got["status"], "ok");
}

#[tokio::test]
async fn server_errors_are_retried_once_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let got: Value = client
        .get_json("flaky", RequestOpts::default())
        .await
        .unwrap();
    assert_eq!(got["ok"], true);
}

#[tokio::test]
async fn rate_limit_text_and_retry_after_survive_into_the_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_json(json!({
                    "error": {"code": 429, "message": "Too many requests", "status": "RESOURCE_EXHAUSTED"}
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap().with_retries(0);
    let err = client
        .post_json::<_, Value>("generate", None, &json!({"prompt": "hi"}))
        .await
        .unwrap_err();

    let text = err.to_string();
    assert!(text.contains("429"), "{text}");
    assert!(text.contains("RESOURCE_EXHAUSTED"), "{text}");
    assert!(text.contains("retry after 7 seconds"), "{text}");
    assert!(matches!(
        err,
        HttpError::Api {
            retry_after_secs: Some(7),
            ..
        }
    ));
}

#[tokio::test]
async fn malformed_success_bodies_are_decode_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let err = client
        .get_json::<Value>("broken", RequestOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Decode(_, ref snip) if snip == "not json"));
}

#[tokio::test]
async fn retry_after_beyond_the_timeout_fails_fast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "3600")
                .set_body_json(json!({"status": "error", "code": "rateLimited", "message": "slow down"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri())
        .unwrap()
        .with_timeout(std::time::Duration::from_secs(5));
    let started = std::time::Instant::now();
    let err = client
        .get_json::<Value>("limited", RequestOpts::default())
        .await
        .unwrap_err();
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
    assert!(matches!(
        err,
        HttpError::Api {
            retry_after_secs: Some(3600),
            ..
        }
    ));
}

#[tokio::test]
async fn short_retry_after_is_honoured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/brief"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/brief"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let got: Value = client
        .get_json("brief", RequestOpts::default())
        .await
        .unwrap();
    assert_eq!(got["ok"], true);
}
