use crate::tests::utils::{fast_scraper, FakeTransport};
use serde_json::json;

fn ids(result: &crate::scraper::PaginatedResult) -> Vec<&str> {
    result.listings.iter().map(|l| l.zpid.as_str()).collect()
}

#[test]
fn stops_on_first_empty_page() {
    let transport = FakeTransport::new().page(&["1", "2"]).page(&[]);
    let scraper = fast_scraper(&transport, 20);

    let result = scraper.fetch_all_pages();

    assert_eq!(ids(&result), vec!["1", "2"]);
    assert_eq!(result.pages_fetched, 1);
    assert_eq!(*transport.page_requests.borrow(), vec![1, 2]);
}

#[test]
fn stops_once_page_cap_is_passed() {
    let transport = FakeTransport::new()
        .page(&["1"])
        .page(&["2"])
        .page(&["3"])
        .page(&["4"]);
    let scraper = fast_scraper(&transport, 3);

    let result = scraper.fetch_all_pages();

    assert_eq!(ids(&result), vec!["1", "2", "3"]);
    assert_eq!(*transport.page_requests.borrow(), vec![1, 2, 3]);
}

#[test]
fn failure_keeps_earlier_pages_and_stops() {
    let transport = FakeTransport::new()
        .page(&["1", "2"])
        .page_error("connection reset")
        .page(&["3"]);
    let scraper = fast_scraper(&transport, 20);

    let result = scraper.fetch_all_pages();

    assert_eq!(ids(&result), vec!["1", "2"]);
    assert_eq!(*transport.page_requests.borrow(), vec![1, 2]);
}

#[test]
fn failure_on_first_page_returns_nothing() {
    let transport = FakeTransport::new().page_error("timeout");
    let scraper = fast_scraper(&transport, 20);

    let result = scraper.fetch_all_pages();

    assert!(result.listings.is_empty());
    assert_eq!(result.pages_fetched, 0);
}

#[test]
fn order_is_preserved_across_pages() {
    let transport = FakeTransport::new()
        .page(&["30", "10"])
        .page(&["20", "40"])
        .page(&[]);
    let scraper = fast_scraper(&transport, 20);

    assert_eq!(ids(&scraper.fetch_all_pages()), vec!["30", "10", "20", "40"]);
}

#[test]
fn request_body_carries_search_area_and_page() {
    let transport = FakeTransport::new().page(&["1"]).page(&[]);
    let scraper = fast_scraper(&transport, 20);

    scraper.fetch_all_pages();

    let bodies = transport.page_bodies.borrow();
    let state = &bodies[1]["searchQueryState"];
    assert_eq!(state["pagination"]["currentPage"], 2);
    assert_eq!(state["regionSelection"][0]["regionId"], 270915);
    assert_eq!(state["regionSelection"][0]["regionType"], 17);
    assert_eq!(state["filterState"]["sortSelection"]["value"], "globalrelevanceex");
    assert_eq!(state["mapBounds"]["west"], -74.30523740039064);
    assert_eq!(bodies[1]["wants"]["cat1"][0], "mapResults");
}

#[test]
fn numeric_zpids_are_kept_and_missing_ones_dropped() {
    let transport = FakeTransport::new()
        .raw_page(json!({ "cat1": { "searchResults": { "mapResults": [
            { "zpid": 2077 },
            { "price": "$1" },
            { "zpid": "31" }
        ] } } }))
        .page(&[]);
    let scraper = fast_scraper(&transport, 20);

    assert_eq!(ids(&scraper.fetch_all_pages()), vec!["2077", "31"]);
}

#[test]
fn malformed_page_ends_pagination() {
    let transport = FakeTransport::new()
        .page(&["1"])
        .raw_page(json!({ "cat1": {} }))
        .page(&["2"]);
    let scraper = fast_scraper(&transport, 20);

    assert_eq!(ids(&scraper.fetch_all_pages()), vec!["1"]);
    assert_eq!(*transport.page_requests.borrow(), vec![1, 2]);
}
