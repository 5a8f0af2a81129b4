use crate::domain::property::normalize;
use crate::tests::utils::{fast_scraper, sample_property, FakeTransport};
use chrono::Local;
use serde_json::{json, Value};

#[test]
fn returns_the_property_document() {
    let transport = FakeTransport::new().detail("5", sample_property());
    let scraper = fast_scraper(&transport, 20);

    let doc = scraper.fetch_detail("5").expect("document");

    assert_eq!(doc.raw, sample_property());
    assert_eq!(
        doc.detail.address.and_then(|a| a.city).as_deref(),
        Some("Brooklyn")
    );
    assert_eq!(*transport.detail_requests.borrow(), vec!["5".to_string()]);
}

#[test]
fn transport_failure_is_none() {
    let transport = FakeTransport::new().detail_error("5", "connection refused");
    let scraper = fast_scraper(&transport, 20);

    assert!(scraper.fetch_detail("5").is_none());
}

#[test]
fn non_success_status_is_none() {
    // Unscripted ids answer 404.
    let transport = FakeTransport::new();
    let scraper = fast_scraper(&transport, 20);

    assert!(scraper.fetch_detail("404").is_none());
    assert_eq!(transport.detail_count("404"), 1);
}

#[test]
fn missing_property_object_is_none() {
    let transport = FakeTransport::new().detail("5", Value::Null);
    let scraper = fast_scraper(&transport, 20);

    assert!(scraper.fetch_detail("5").is_none());
}

#[test]
fn wrongly_typed_fields_are_read_as_absent() {
    let mut property = sample_property();
    property["priceHistory"] = json!("not a list");
    property["address"] = json!("12 Main St, Brooklyn");
    let transport = FakeTransport::new().detail("5", property);
    let scraper = fast_scraper(&transport, 20);

    let doc = scraper.fetch_detail("5").expect("document");
    let record = normalize(&doc, "5", Local::now().naive_local());

    assert!(doc.detail.price_history.is_none());
    assert_eq!(record.price_history, "");
    assert_eq!(record.street_address, "");
    assert_eq!(record.bedrooms.map(|n| n.to_string()).as_deref(), Some("3"));
    assert_eq!(record.images.len(), 2);
}

#[test]
fn no_internal_retry() {
    let transport = FakeTransport::new()
        .detail_error("5", "reset")
        .detail("5", sample_property());
    let scraper = fast_scraper(&transport, 20);

    assert!(scraper.fetch_detail("5").is_none());
    assert_eq!(transport.detail_count("5"), 1);
}
