//! Integration tests for the WebDriver backend against a mock driver endpoint

use base64::Engine;
use httpmock::prelude::*;
use serde_json::json;

use bank_ui_harness::page::{
    Locator, PageAutomation, PageError, Readiness, WebDriverConfig, WebDriverPage,
};

const SESSION: &str = "abc123";
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f866cc1e2e6";

fn connect(server: &MockServer) -> WebDriverPage {
    server.mock(|when, then| {
        when.method(POST)
            .path("/session")
            .body_includes("\"browserName\":\"chrome\"");
        then.status(200)
            .json_body(json!({ "value": { "sessionId": SESSION, "capabilities": {} } }));
    });

    let config = WebDriverConfig::new(server.base_url()).browser("chrome");
    WebDriverPage::connect(&config).expect("session should open")
}

fn session_path(path: &str) -> String {
    format!("/session/{}{}", SESSION, path)
}

#[test]
fn test_connect_reads_session_id() {
    let server = MockServer::start();
    let page = connect(&server);
    assert_eq!(page.session_id(), Some(SESSION));
}

#[test]
fn test_missing_element_is_not_ready() {
    let server = MockServer::start();
    let mut page = connect(&server);

    let lookup = server.mock(|when, then| {
        when.method(POST)
            .path(session_path("/element"))
            .body_includes("link text");
        then.status(404).json_body(json!({
            "value": {
                "error": "no such element",
                "message": "Unable to locate element",
                "stacktrace": ""
            }
        }));
    });

    let found = page
        .locate(&Locator::link("Log Out"), Readiness::Clickable)
        .expect("lookup should not fail");
    assert!(found.is_none());
    lookup.assert();
}

#[test]
fn test_clickable_requires_displayed_and_enabled() {
    let server = MockServer::start();
    let mut page = connect(&server);

    server.mock(|when, then| {
        when.method(POST).path(session_path("/element"));
        then.status(200)
            .json_body(json!({ "value": { ELEMENT_KEY: "el-1" } }));
    });
    server.mock(|when, then| {
        when.method(GET).path(session_path("/element/el-1/displayed"));
        then.status(200).json_body(json!({ "value": true }));
    });
    let enabled = server.mock(|when, then| {
        when.method(GET).path(session_path("/element/el-1/enabled"));
        then.status(200).json_body(json!({ "value": false }));
    });

    let found = page
        .locate(&Locator::button("Log In"), Readiness::Clickable)
        .unwrap();
    assert!(found.is_none(), "disabled button is not clickable");

    let present = page
        .locate(&Locator::button("Log In"), Readiness::Present)
        .unwrap();
    assert_eq!(present.map(|e| e.0), Some("el-1".to_string()));
    enabled.assert_hits(1);
}

#[test]
fn test_stale_element_maps_to_stale_error() {
    let server = MockServer::start();
    let mut page = connect(&server);

    server.mock(|when, then| {
        when.method(POST).path(session_path("/element/el-9/click"));
        then.status(404).json_body(json!({
            "value": { "error": "stale element reference", "message": "element is not attached" }
        }));
    });

    let err = page
        .click(&bank_ui_harness::page::ElementHandle("el-9".to_string()))
        .unwrap_err();
    assert!(matches!(err, PageError::StaleElement(_)));
}

#[test]
fn test_screenshot_is_base64_decoded() {
    let server = MockServer::start();
    let mut page = connect(&server);
    let png = [0x89u8, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    server.mock(|when, then| {
        when.method(GET).path(session_path("/screenshot"));
        then.status(200).json_body(json!({
            "value": base64::engine::general_purpose::STANDARD.encode(png)
        }));
    });

    assert_eq!(page.capture_visual().unwrap(), png.to_vec());
}

#[test]
fn test_title_and_visible_text() {
    let server = MockServer::start();
    let mut page = connect(&server);

    server.mock(|when, then| {
        when.method(GET).path(session_path("/title"));
        then.status(200)
            .json_body(json!({ "value": "ParaBank | Accounts Overview" }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path(session_path("/element"))
            .body_includes("body");
        then.status(200)
            .json_body(json!({ "value": { ELEMENT_KEY: "body-1" } }));
    });
    server.mock(|when, then| {
        when.method(GET).path(session_path("/element/body-1/text"));
        then.status(200)
            .json_body(json!({ "value": "Accounts Overview\nTotal $1,030.00" }));
    });

    assert_eq!(page.current_title().unwrap(), "ParaBank | Accounts Overview");
    assert!(page.current_visible_text().unwrap().contains("Total"));
}

#[test]
fn test_close_deletes_session_once() {
    let server = MockServer::start();
    let mut page = connect(&server);

    let delete = server.mock(|when, then| {
        when.method(DELETE).path(session_path(""));
        then.status(200).json_body(json!({ "value": null }));
    });

    page.close().unwrap();
    assert_eq!(page.session_id(), None);
    assert!(matches!(page.close(), Err(PageError::Closed)));
    assert!(matches!(page.navigate("http://bank/"), Err(PageError::Closed)));
    delete.assert_hits(1);
}

#[test]
fn test_driver_error_is_reported() {
    let server = MockServer::start();
    let mut page = connect(&server);

    server.mock(|when, then| {
        when.method(POST).path(session_path("/url"));
        then.status(500).json_body(json!({
            "value": { "error": "unknown error", "message": "net::ERR_NAME_NOT_RESOLVED" }
        }));
    });

    match page.navigate("http://nowhere.invalid/") {
        Err(PageError::WebDriver { status, error, message }) => {
            assert_eq!(status, 500);
            assert_eq!(error, "unknown error");
            assert!(message.contains("ERR_NAME_NOT_RESOLVED"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_dropping_open_page_deletes_session() {
    let server = MockServer::start();
    let page = connect(&server);

    let delete = server.mock(|when, then| {
        when.method(DELETE).path(session_path(""));
        then.status(200).json_body(json!({ "value": null }));
    });

    drop(page);
    delete.assert_hits(1);
}
