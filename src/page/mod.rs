pub mod framebuffer;
pub mod simulated;
pub mod types;
pub mod webdriver;

pub use framebuffer::Framebuffer;
pub use simulated::SimulatedBank;
pub use types::{ElementHandle, Locator, PageAutomation, PageError, PageResult, Readiness};
pub use webdriver::{WebDriverConfig, WebDriverPage};
