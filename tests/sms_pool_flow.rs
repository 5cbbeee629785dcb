//! End-to-end order flows against a mocked SMSPool API.

#![cfg(feature = "sms-pool")]

use sms_rental::sms_pool::{SmsPoolClient, SmsPoolProvider};
use sms_rental::{
    CancellationToken, CountryName, OrderErrorKind, PollOutcome, RankingPolicy, RejectionReason,
    RetryConfig, ServiceName, SmsCode, SmsOrderService, SmsOrderServiceError, SmsOrderServiceTrait,
};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer, policy: RankingPolicy) -> SmsOrderService<SmsPoolProvider> {
    let client = SmsPoolClient::builder("pool_key")
        .endpoint(Url::parse(&server.uri()).unwrap())
        .retry_config(RetryConfig::disabled())
        .build()
        .unwrap();

    SmsOrderService::builder(SmsPoolProvider::new(client))
        .policy(policy)
        .poll_interval(Duration::from_millis(10))
        .deadline(Duration::from_secs(5))
        .build()
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/country/retrieve_all"))
        .and(query_param("key", "pool_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"ID": 1, "name": "United States", "short_name": "US", "cc": "1"}
        ])))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/service/retrieve_all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"ID": 395, "name": "Telegram"}
        ])))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/request/pricing"))
        .and(query_param("country", "US"))
        .and(query_param("service", "Telegram"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"pool": 1, "price": "0.45", "success_rate": "72.1"},
            {"pool": 7, "price": "0.30", "success_rate": "91"},
            {"pool": 9, "price": "0.90", "success_rate": "99"}
        ])))
        .mount(server)
        .await;
}

async fn mount_purchase(server: &MockServer, pool: &str) {
    Mock::given(method("GET"))
        .and(path("/purchase/sms"))
        .and(query_param("pool", pool))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": 1,
            "number": "16136001234",
            "order_id": "ABCDEFG",
            "cc": "1",
            "phonenumber": "6136001234"
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn check(status: u8, sms: Option<&str>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "status": status,
        "sms": sms,
        "full_sms": sms.map(|code| format!("Your code is {code}")),
    }))
}

fn pair() -> (CountryName, ServiceName) {
    (
        CountryName::new("US").unwrap(),
        ServiceName::new("Telegram").unwrap(),
    )
}

#[tokio::test]
async fn cheapest_pool_delivers_code() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    mount_purchase(&server, "7").await;
    Mock::given(method("GET"))
        .and(path("/sms/check"))
        .and(query_param("orderid", "ABCDEFG"))
        .respond_with(check(1, None))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sms/check"))
        .respond_with(check(3, Some("805512")))
        .mount(&server)
        .await;

    let service = service(&server, RankingPolicy::CheapestFirst);
    let (country, product) = pair();

    let order = service.order_number(&country, &product).await.unwrap();
    assert_eq!(order.order_id.as_str(), "ABCDEFG");
    assert_eq!(order.operator.as_str(), "7");
    assert_eq!(order.phone_number.as_str(), "6136001234");

    let outcome = service.wait_for_code(&order).await;
    assert_eq!(outcome.code(), Some(&SmsCode::from("805512")));
}

#[tokio::test]
async fn refunded_order_is_rejected() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    mount_purchase(&server, "9").await;
    Mock::given(method("GET"))
        .and(path("/sms/check"))
        .respond_with(check(6, None))
        .expect(1)
        .mount(&server)
        .await;

    let service = service(&server, RankingPolicy::HighestSuccessRateFirst);
    let (country, product) = pair();

    let order = service.order_number(&country, &product).await.unwrap();
    match service.wait_for_code(&order).await {
        PollOutcome::Rejected(reason) => assert_eq!(reason, RejectionReason::Canceled),
        other => panic!("Expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn bare_string_rejection_is_classified() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("GET"))
        .and(path("/purchase/sms"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Out of stock for this pool"))
        .expect(1)
        .mount(&server)
        .await;

    let service = service(&server, RankingPolicy::CheapestFirst);
    let (country, product) = pair();

    let error = service.order_number(&country, &product).await.unwrap_err();
    match error {
        SmsOrderServiceError::Provider(e) => assert_eq!(
            e.order_error_kind(),
            Some(OrderErrorKind::ServiceUnavailableForCountry)
        ),
        other => panic!("Expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_country_never_reaches_pricing() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let service = service(&server, RankingPolicy::CheapestFirst);
    let error = service
        .get_price(
            &CountryName::new("Atlantis").unwrap(),
            &ServiceName::new("Telegram").unwrap(),
        )
        .await
        .unwrap_err();

    assert!(error.is_invalid_country());
    let pricing_calls = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/request/pricing")
        .count();
    assert_eq!(pricing_calls, 0);
}

#[tokio::test]
async fn caller_cancellation_leaves_order_open() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    mount_purchase(&server, "7").await;
    Mock::given(method("GET"))
        .and(path("/sms/check"))
        .respond_with(check(1, None))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sms/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": 1})))
        .expect(0)
        .mount(&server)
        .await;

    let service = service(&server, RankingPolicy::CheapestFirst);
    let (country, product) = pair();
    let order = service.order_number(&country, &product).await.unwrap();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        canceller.cancel();
    });

    let error = service
        .wait_for_code_cancellable(&order, token)
        .await
        .unwrap_err();
    assert!(matches!(error, SmsOrderServiceError::Cancelled { .. }));
}

#[tokio::test]
async fn pool_without_rate_is_skipped_by_rate_policies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/country/retrieve_all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"ID": 1, "name": "United States", "short_name": "US", "cc": "1"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/service/retrieve_all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"ID": 395, "name": "Telegram"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/request/pricing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"pool": 3, "price": "0.50", "success_rate": "40"},
            {"pool": 5, "price": "0.20", "success_rate": null},
            {"pool": 8, "price": "0.25"}
        ])))
        .mount(&server)
        .await;

    let service = service(&server, RankingPolicy::CheapestFirst);
    let (country, product) = pair();

    let lowest = service
        .get_price_with(&country, &product, RankingPolicy::LowestSuccessRateFirst)
        .await
        .unwrap();
    assert_eq!(lowest.operator.as_str(), "3");
    assert_eq!(lowest.success_rate, Some(40.0));

    let cheapest = service
        .get_price_with(&country, &product, RankingPolicy::CheapestFirst)
        .await
        .unwrap();
    assert_eq!(cheapest.operator.as_str(), "5");
    assert_eq!(cheapest.success_rate, None);
}
