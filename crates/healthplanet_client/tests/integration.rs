use chrono::NaiveDate;
use healthplanet_client::http_client::ReqwestHealthPlanetClient;
use healthplanet_client::{
    BodyComposition, DateRange, DateType, HealthPlanetClient, HealthPlanetError,
};
use secrecy::SecretString;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, date_type: DateType) -> ReqwestHealthPlanetClient {
    ReqwestHealthPlanetClient::new(
        &server.uri(),
        SecretString::new("hoge_token".into()),
        date_type,
    )
    .expect("client")
}

async fn mount_fixture(server: &MockServer, endpoint: &str, body: &str) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_body_composition() {
    let server = MockServer::start().await;
    mount_fixture(
        &server,
        "/status/innerscan.json",
        include_str!("fixtures/innerscan_valid.json"),
    )
    .await;

    let result = client(&server, DateType::MeasuredAt)
        .get_body_composition(DateRange::default())
        .await
        .expect("innerscan");

    assert_eq!(
        result.birth_date(),
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    );
    assert_eq!(result.height(), 195.5);
    assert_eq!(result.sex(), "male");

    let items = result.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].measured_at(), Some(1_575_502_680));
    assert_eq!(items[0].registered_at(), None);
    assert_eq!(items[0].model(), "01000144");
    assert_eq!(
        items[0].values(),
        &BodyComposition {
            weight: Some(77.10),
            body_fat: Some(21.30),
            muscle_mass: Some(57.50),
            physique_rating: Some(2),
            visceral_fat_rating: Some(10.5),
            basal_metabolic_rate: Some(1721),
            metabolic_age: Some(32),
            bone_mass: Some(3.10),
        }
    );
    assert_eq!(items[1].measured_at(), Some(1_575_673_560));
    assert_eq!(items[1].values().weight, Some(76.70));
    assert_eq!(items[1].values().metabolic_age, Some(34));
}

#[tokio::test]
async fn fetch_blood_pressure_by_registration_time() {
    let server = MockServer::start().await;
    mount_fixture(
        &server,
        "/status/sphygmomanometer.json",
        include_str!("fixtures/sphygmomanometer_valid.json"),
    )
    .await;

    let result = client(&server, DateType::RegisteredAt)
        .get_blood_pressure(DateRange::default())
        .await
        .expect("sphygmomanometer");

    assert_eq!(result.height(), 196.5);
    assert_eq!(result.sex(), "female");
    let items = result.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].registered_at(), Some(1_578_327_300));
    assert_eq!(items[0].measured_at(), None);
    assert_eq!(items[0].values().maximal_pressure, Some(180));
    assert_eq!(items[0].values().minimal_pressure, Some(70));
    assert_eq!(items[0].values().pulse, Some(20));
    assert_eq!(items[1].registered_at(), Some(1_578_328_200));
    assert_eq!(items[1].values().pulse, Some(50));
}

#[tokio::test]
async fn fetch_pedometer_sorts_and_leaves_gaps() {
    let server = MockServer::start().await;
    mount_fixture(
        &server,
        "/status/pedometer.json",
        include_str!("fixtures/pedometer_valid.json"),
    )
    .await;

    let result = client(&server, DateType::MeasuredAt)
        .get_pedometer(DateRange::default())
        .await
        .expect("pedometer");

    assert_eq!(result.height(), 197.5);
    let items = result.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].measured_at(), Some(1_578_322_800));
    assert_eq!(items[0].values().steps, Some(1000));
    assert_eq!(items[0].values().exercise, None);
    assert_eq!(items[0].values().calories, Some(5500));
    assert_eq!(items[1].measured_at(), Some(1_578_409_200));
    assert_eq!(items[1].values().steps, Some(2222));
    assert_eq!(items[1].values().calories, Some(6660));
}

#[tokio::test]
async fn fetch_urinary_sugar() {
    let server = MockServer::start().await;
    mount_fixture(
        &server,
        "/status/smug.json",
        include_str!("fixtures/smug_valid.json"),
    )
    .await;

    let result = client(&server, DateType::MeasuredAt)
        .get_urinary_sugar(DateRange::default())
        .await
        .expect("smug");

    assert_eq!(result.height(), 198.5);
    let sugar: Vec<_> = result
        .items()
        .iter()
        .map(|r| (r.measured_at(), r.values().urinary_sugar))
        .collect();
    assert_eq!(
        sugar,
        vec![
            (Some(1_578_327_600), Some(500)),
            (Some(1_578_327_900), Some(550))
        ]
    );
}

#[tokio::test]
async fn status_request_sends_full_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/status/sphygmomanometer.json"))
        .and(body_string_contains("access_token=hoge_token"))
        .and(body_string_contains("date=0"))
        .and(body_string_contains("tag=622E%2C622F%2C6230"))
        .and(body_string_contains("from=20200101000000"))
        .and(body_string_contains("to=20200131235959"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(include_str!("fixtures/sphygmomanometer_valid.json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let from = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let to = NaiveDate::from_ymd_opt(2020, 1, 31)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap();
    let result = client(&server, DateType::RegisteredAt)
        .get_blood_pressure(DateRange::between(from, to))
        .await
        .expect("matched request");
    assert_eq!(result.items().len(), 2);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let content_type = received[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(content_type, "application/x-www-form-urlencoded");
}

#[tokio::test]
async fn unbounded_request_omits_range() {
    let server = MockServer::start().await;
    mount_fixture(
        &server,
        "/status/smug.json",
        include_str!("fixtures/smug_valid.json"),
    )
    .await;

    client(&server, DateType::MeasuredAt)
        .get_urinary_sugar(DateRange::default())
        .await
        .expect("smug");

    let received = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&received[0].body).to_string();
    assert!(body.contains("tag=6240"));
    assert!(body.contains("date=1"));
    assert!(!body.contains("&from="));
    assert!(!body.contains("&to="));
}

#[tokio::test]
async fn html_reply_is_malformed_response() {
    let server = MockServer::start().await;
    mount_fixture(
        &server,
        "/status/innerscan.json",
        include_str!("fixtures/invalid_token.html"),
    )
    .await;

    let err = client(&server, DateType::MeasuredAt)
        .get_body_composition(DateRange::default())
        .await
        .unwrap_err();
    match err {
        HealthPlanetError::MalformedResponse { body, .. } => {
            assert!(body.contains("Invalid access token"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/status/pedometer.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client(&server, DateType::MeasuredAt)
        .get_pedometer(DateRange::default())
        .await
        .unwrap_err();
    match err {
        HealthPlanetError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_tag_aborts_fetch() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "birth_date": "20200101",
        "height": "170.0",
        "sex": "female",
        "data": [
            {"date": "202001070000", "keydata": "1000", "model": "00000000", "tag": "6331"},
            {"date": "202001070000", "keydata": "77.1", "model": "00000000", "tag": "6021"}
        ]
    });
    Mock::given(method("POST"))
        .and(path("/status/pedometer.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let err = client(&server, DateType::MeasuredAt)
        .get_pedometer(DateRange::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HealthPlanetError::UnknownTag { ref tag, .. } if tag == "6021"));
}

#[tokio::test]
async fn works_through_trait_object() {
    let server = MockServer::start().await;
    mount_fixture(
        &server,
        "/status/smug.json",
        include_str!("fixtures/smug_valid.json"),
    )
    .await;

    let client: std::sync::Arc<dyn HealthPlanetClient> =
        std::sync::Arc::new(client(&server, DateType::MeasuredAt));
    let result = client
        .get_urinary_sugar(DateRange::default())
        .await
        .expect("smug");
    assert_eq!(result.items().len(), 2);
}
