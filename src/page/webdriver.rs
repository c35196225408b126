//! W3C WebDriver client backing the page automation capability.
//!
//! Talks to an already-running driver endpoint (chromedriver, geckodriver or a
//! Selenium grid) over blocking HTTP. Launching the driver process is left to
//! the operator.

use base64::Engine;
use reqwest::Method;
use reqwest::blocking::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::types::{ElementHandle, Locator, PageAutomation, PageError, PageResult, Readiness};
use crate::config;

/// Key under which W3C drivers return element references
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f866cc1e2e6";

/// Per-request HTTP timeout; readiness waits are bounded separately
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a WebDriver session
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// Driver endpoint URL
    pub endpoint: String,
    /// `browserName` capability
    pub browser: String,
    /// Request a headless browser
    pub headless: bool,
    /// HTTP timeout for a single protocol request
    pub request_timeout: Duration,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        let cfg = config::get();
        Self {
            endpoint: cfg.driver.endpoint.clone(),
            browser: cfg.driver.browser.clone(),
            headless: cfg.driver.headless,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl WebDriverConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = browser.into();
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Capabilities payload for `POST /session`
    pub fn capabilities(&self) -> Value {
        let mut always_match = serde_json::Map::new();
        always_match.insert("browserName".to_string(), json!(self.browser));

        match self.browser.to_lowercase().as_str() {
            "chrome" | "chromium" => {
                let mut args = vec![
                    "--remote-allow-origins=*",
                    "--start-maximized",
                    "--disable-notifications",
                ];
                if self.headless {
                    args.push("--headless=new");
                }
                always_match.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
            "firefox" if self.headless => {
                always_match.insert(
                    "moz:firefoxOptions".to_string(),
                    json!({ "args": ["-headless"] }),
                );
            }
            _ => {}
        }

        json!({ "capabilities": { "alwaysMatch": Value::Object(always_match) } })
    }
}

/// A live WebDriver session
pub struct WebDriverPage {
    client: Client,
    endpoint: String,
    session_id: Option<String>,
}

impl WebDriverPage {
    /// Open a new browser session on the configured endpoint
    pub fn connect(config: &WebDriverConfig) -> PageResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let endpoint = config.endpoint.trim_end_matches('/').to_string();

        let mut page = Self {
            client,
            endpoint,
            session_id: None,
        };

        let url = format!("{}/session", page.endpoint);
        let value = page.execute(Method::POST, &url, Some(config.capabilities()))?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| PageError::Decode("new session response has no sessionId".to_string()))?
            .to_string();

        info!(endpoint = %page.endpoint, session = %session_id, "WebDriver session opened");
        page.session_id = Some(session_id);
        Ok(page)
    }

    /// Identifier of the remote session, `None` once closed
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    fn session_url(&self, path: &str) -> PageResult<String> {
        let id = self.session_id.as_deref().ok_or(PageError::Closed)?;
        Ok(format!("{}/session/{}{}", self.endpoint, id, path))
    }

    fn execute(&self, method: Method, url: &str, body: Option<Value>) -> PageResult<Value> {
        debug!(%method, url, "WebDriver request");
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send()?;
        let status = response.status();
        let payload: Value = response
            .json()
            .map_err(|e| PageError::Decode(format!("invalid WebDriver response: {}", e)))?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(value);
        }

        let error = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if error == "stale element reference" {
            return Err(PageError::StaleElement(message));
        }
        Err(PageError::WebDriver {
            status: status.as_u16(),
            error,
            message,
        })
    }

    /// Look up an element, `None` when the driver reports no match
    fn find(&self, locator: &Locator) -> PageResult<Option<ElementHandle>> {
        let (using, value) = strategy(locator);
        let url = self.session_url("/element")?;
        match self.execute(Method::POST, &url, Some(json!({ "using": using, "value": value }))) {
            Ok(found) => {
                let id = found
                    .get(ELEMENT_KEY)
                    .and_then(Value::as_str)
                    .ok_or_else(|| PageError::Decode("element reference missing".to_string()))?;
                Ok(Some(ElementHandle(id.to_string())))
            }
            Err(PageError::WebDriver { error, .. }) if error == "no such element" => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn element_flag(&self, element: &ElementHandle, flag: &str) -> PageResult<bool> {
        let url = self.session_url(&format!("/element/{}/{}", element.id(), flag))?;
        let value = self.execute(Method::GET, &url, None)?;
        value
            .as_bool()
            .ok_or_else(|| PageError::Decode(format!("'{}' is not a boolean", flag)))
    }

    fn element_command(
        &self,
        element: &ElementHandle,
        command: &str,
        body: Value,
    ) -> PageResult<()> {
        let url = self.session_url(&format!("/element/{}/{}", element.id(), command))?;
        self.execute(Method::POST, &url, Some(body))?;
        Ok(())
    }

    fn is_ready(&self, element: &ElementHandle, readiness: Readiness) -> PageResult<bool> {
        match readiness {
            Readiness::Present => Ok(true),
            Readiness::Visible => self.element_flag(element, "displayed"),
            Readiness::Clickable => Ok(self.element_flag(element, "displayed")?
                && self.element_flag(element, "enabled")?),
        }
    }
}

impl PageAutomation for WebDriverPage {
    fn navigate(&mut self, url: &str) -> PageResult<()> {
        let endpoint = self.session_url("/url")?;
        self.execute(Method::POST, &endpoint, Some(json!({ "url": url })))?;
        Ok(())
    }

    fn refresh(&mut self) -> PageResult<()> {
        let endpoint = self.session_url("/refresh")?;
        self.execute(Method::POST, &endpoint, Some(json!({})))?;
        Ok(())
    }

    fn locate(
        &mut self,
        locator: &Locator,
        readiness: Readiness,
    ) -> PageResult<Option<ElementHandle>> {
        let Some(element) = self.find(locator)? else {
            return Ok(None);
        };
        match self.is_ready(&element, readiness) {
            Ok(true) => Ok(Some(element)),
            Ok(false) | Err(PageError::StaleElement(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn send_text(&mut self, element: &ElementHandle, text: &str) -> PageResult<()> {
        self.element_command(element, "value", json!({ "text": text }))
    }

    fn clear(&mut self, element: &ElementHandle) -> PageResult<()> {
        self.element_command(element, "clear", json!({}))
    }

    fn click(&mut self, element: &ElementHandle) -> PageResult<()> {
        self.element_command(element, "click", json!({}))
    }

    fn current_title(&mut self) -> PageResult<String> {
        let url = self.session_url("/title")?;
        let value = self.execute(Method::GET, &url, None)?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn current_visible_text(&mut self) -> PageResult<String> {
        let Some(body) = self.find(&Locator::Css("body".to_string()))? else {
            return Ok(String::new());
        };
        let url = self.session_url(&format!("/element/{}/text", body.id()))?;
        let value = self.execute(Method::GET, &url, None)?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn capture_visual(&mut self) -> PageResult<Vec<u8>> {
        let url = self.session_url("/screenshot")?;
        let value = self.execute(Method::GET, &url, None)?;
        let encoded = value
            .as_str()
            .ok_or_else(|| PageError::Decode("screenshot is not a string".to_string()))?;
        Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
    }

    fn close(&mut self) -> PageResult<()> {
        let url = self.session_url("")?;
        self.execute(Method::DELETE, &url, None)?;
        info!(session = ?self.session_id, "WebDriver session closed");
        self.session_id = None;
        Ok(())
    }

    fn source_type(&self) -> &str {
        "webdriver"
    }
}

impl Drop for WebDriverPage {
    fn drop(&mut self) {
        if self.session_id.is_some() {
            if let Err(e) = PageAutomation::close(self) {
                warn!("Failed to delete WebDriver session on drop: {}", e);
            }
        }
    }
}

/// Map a locator onto a W3C location strategy.
///
/// Names and ids go through attribute selectors since ids such as
/// `customer.firstName` are not valid `#id` selectors.
fn strategy(locator: &Locator) -> (&'static str, String) {
    match locator {
        Locator::Name(name) => ("css selector", format!("[name=\"{}\"]", escape_quotes(name))),
        Locator::Id(id) => ("css selector", format!("[id=\"{}\"]", escape_quotes(id))),
        Locator::LinkText(text) => ("link text", text.clone()),
        Locator::Css(selector) => ("css selector", selector.clone()),
        Locator::XPath(path) => ("xpath", path.clone()),
    }
}

fn escape_quotes(value: &str) -> String {
    value.replace('"', "\\\"")
}
