// Core types for the page automation capability

use serde::{Deserialize, Serialize};

/// Abstract reference to one UI element within the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locator {
    /// Match by `name` attribute
    Name(String),
    /// Match by `id` attribute
    Id(String),
    /// Match an anchor by its exact visible text
    LinkText(String),
    /// Match by CSS selector
    Css(String),
    /// Match by XPath expression
    XPath(String),
}

impl Locator {
    pub fn name(value: impl Into<String>) -> Self {
        Locator::Name(value.into())
    }

    pub fn id(value: impl Into<String>) -> Self {
        Locator::Id(value.into())
    }

    pub fn link(text: impl Into<String>) -> Self {
        Locator::LinkText(text.into())
    }

    /// Submit input whose `value` attribute equals `label`
    pub fn button(label: &str) -> Self {
        Locator::Css(format!("input[value='{}']", label))
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Name(v) => write!(f, "name={}", v),
            Locator::Id(v) => write!(f, "id={}", v),
            Locator::LinkText(v) => write!(f, "link={}", v),
            Locator::Css(v) => write!(f, "css={}", v),
            Locator::XPath(v) => write!(f, "xpath={}", v),
        }
    }
}

/// Readiness condition gating an interaction with an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Readiness {
    /// Attached to the document
    Present,
    /// Present and displayed
    Visible,
    /// Displayed and enabled
    Clickable,
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Readiness::Present => write!(f, "present"),
            Readiness::Visible => write!(f, "visible"),
            Readiness::Clickable => write!(f, "clickable"),
        }
    }
}

/// Opaque handle to a resolved element, valid until the page changes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Result type for page automation operations
pub type PageResult<T> = Result<T, PageError>;

/// Faults raised by a page automation backend
#[derive(Debug)]
pub enum PageError {
    /// The endpoint could not be reached or the connection dropped
    Transport(String),

    /// The driver answered with a protocol-level error
    WebDriver {
        status: u16,
        error: String,
        message: String,
    },

    /// The element handle no longer refers to an attached element
    StaleElement(String),

    /// The response could not be decoded
    Decode(String),

    /// The backend was already closed
    Closed,
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageError::Transport(msg) => write!(f, "Transport error: {}", msg),
            PageError::WebDriver {
                status,
                error,
                message,
            } => write!(f, "WebDriver error {} ({}): {}", status, error, message),
            PageError::StaleElement(id) => write!(f, "Stale element reference: {}", id),
            PageError::Decode(msg) => write!(f, "Decode error: {}", msg),
            PageError::Closed => write!(f, "Page automation backend is closed"),
        }
    }
}

impl std::error::Error for PageError {}

impl From<reqwest::Error> for PageError {
    fn from(err: reqwest::Error) -> Self {
        PageError::Transport(err.to_string())
    }
}

impl From<base64::DecodeError> for PageError {
    fn from(err: base64::DecodeError) -> Self {
        PageError::Decode(err.to_string())
    }
}

/// Abstract page automation capability.
///
/// The harness depends only on this trait:
/// - `WebDriverPage` drives a real browser over the WebDriver protocol
/// - `SimulatedBank` answers from an in-memory model
///
/// `locate` is a single non-blocking probe; blocking readiness waits are the
/// wait engine's job.
pub trait PageAutomation: Send {
    /// Load `url` in the current browsing context
    fn navigate(&mut self, url: &str) -> PageResult<()>;

    /// Reload the current page
    fn refresh(&mut self) -> PageResult<()>;

    /// Probe once for an element satisfying `readiness`.
    ///
    /// Returns `Ok(None)` while the element is absent, hidden, disabled or stale.
    fn locate(&mut self, locator: &Locator, readiness: Readiness)
    -> PageResult<Option<ElementHandle>>;

    /// Type `text` into the element
    fn send_text(&mut self, element: &ElementHandle, text: &str) -> PageResult<()>;

    /// Clear the element's current value
    fn clear(&mut self, element: &ElementHandle) -> PageResult<()>;

    /// Click the element
    fn click(&mut self, element: &ElementHandle) -> PageResult<()>;

    /// Current document title
    fn current_title(&mut self) -> PageResult<String>;

    /// Rendered text of the whole document
    fn current_visible_text(&mut self) -> PageResult<String>;

    /// PNG screenshot of the viewport
    fn capture_visual(&mut self) -> PageResult<Vec<u8>>;

    /// End the remote session
    fn close(&mut self) -> PageResult<()>;

    /// Backend identifier recorded in artifact metadata (e.g. "webdriver", "simulated")
    fn source_type(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_locator() {
        assert_eq!(
            Locator::button("Log In"),
            Locator::Css("input[value='Log In']".to_string())
        );
    }

    #[test]
    fn test_locator_display() {
        assert_eq!(Locator::id("customer.ssn").to_string(), "id=customer.ssn");
        assert_eq!(Locator::link("Log Out").to_string(), "link=Log Out");
    }
}
