//! In-memory banking application implementing the page automation capability.
//!
//! Models the public demo bank closely enough to run every journey offline:
//! - Welcome/login, accounts overview, registration, transfer funds and
//!   open account pages with their titles, links, fields and buttons
//! - Server-side validation producing the feedback text the journeys assert on
//! - Delayed element readiness after each page load (`render_delay`)
//! - Stale element handles once the page changes
//! - Screenshots rendered through the software framebuffer

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

use super::framebuffer::Framebuffer;
use super::types::{ElementHandle, Locator, PageAutomation, PageError, PageResult, Readiness};

pub const TITLE_HOME: &str = "ParaBank | Welcome | Online Banking";
pub const TITLE_OVERVIEW: &str = "ParaBank | Accounts Overview";
pub const TITLE_REGISTER: &str = "ParaBank | Register for Free Online Account Access";
pub const TITLE_CUSTOMER_CREATED: &str = "ParaBank | Customer Created";
pub const TITLE_TRANSFER: &str = "ParaBank | Transfer Funds";
pub const TITLE_OPEN_ACCOUNT: &str = "ParaBank | Open Account";

/// Screenshot dimensions
const VIEWPORT: (u32, u32) = (800, 600);

/// First account number handed out by "Open New Account"
const FIRST_NEW_ACCOUNT: u64 = 13344;

/// Registration form fields in page order with their labels
const REGISTRATION_FIELDS: &[(&str, &str, bool)] = &[
    ("customer.firstName", "First name", true),
    ("customer.lastName", "Last name", true),
    ("customer.address.street", "Address", true),
    ("customer.address.city", "City", true),
    ("customer.address.state", "State", false),
    ("customer.address.zipCode", "Zip Code", true),
    ("customer.phoneNumber", "Phone", false),
    ("customer.ssn", "Social Security Number", true),
    ("customer.username", "Username", true),
    ("customer.password", "Password", true),
    ("repeatedPassword", "Password confirmation", true),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Home,
    Overview,
    Register,
    CustomerCreated,
    Transfer,
    OpenAccount,
}

impl Screen {
    fn title(self) -> &'static str {
        match self {
            Screen::Home => TITLE_HOME,
            Screen::Overview => TITLE_OVERVIEW,
            Screen::Register => TITLE_REGISTER,
            Screen::CustomerCreated => TITLE_CUSTOMER_CREATED,
            Screen::Transfer => TITLE_TRANSFER,
            Screen::OpenAccount => TITLE_OPEN_ACCOUNT,
        }
    }

    fn heading(self) -> &'static str {
        match self {
            Screen::Home => "Customer Login",
            Screen::Overview => "Accounts Overview",
            Screen::Register => "Signing up is easy!",
            Screen::CustomerCreated => "Customer Created",
            Screen::Transfer => "Transfer Funds",
            Screen::OpenAccount => "Open New Account",
        }
    }

    fn requires_login(self) -> bool {
        matches!(self, Screen::Overview | Screen::Transfer | Screen::OpenAccount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Submit {
    Login,
    Register,
    Transfer,
    OpenAccount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ElementKind {
    Field,
    Link(LinkTarget),
    Button(Submit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkTarget {
    Screen(Screen),
    Logout,
}

#[derive(Debug, Clone)]
struct Element {
    locator: Locator,
    kind: ElementKind,
}

impl Element {
    fn field(locator: Locator) -> Self {
        Self {
            locator,
            kind: ElementKind::Field,
        }
    }

    fn link(text: &str, target: LinkTarget) -> Self {
        Self {
            locator: Locator::link(text),
            kind: ElementKind::Link(target),
        }
    }

    fn button(label: &str, submit: Submit) -> Self {
        Self {
            locator: Locator::button(label),
            kind: ElementKind::Button(submit),
        }
    }
}

/// Simulated banking application
pub struct SimulatedBank {
    screen: Screen,
    logged_in: Option<String>,
    users: HashMap<String, String>,
    accounts: Vec<String>,
    next_account: u64,
    fields: HashMap<Locator, String>,
    banner: Vec<String>,
    /// Incremented on every page load; handles from older loads are stale
    generation: u64,
    render_delay: u32,
    pending_probes: u32,
    hidden: HashSet<Locator>,
    fail_visuals: bool,
    closed: bool,
    close_calls: Arc<AtomicUsize>,
}

impl SimulatedBank {
    /// Create a bank with the demo customer `john`/`demo` owning accounts 12345 and 67890
    pub fn new() -> Self {
        let mut users = HashMap::new();
        users.insert("john".to_string(), "demo".to_string());

        Self {
            screen: Screen::Home,
            logged_in: None,
            users,
            accounts: vec!["12345".to_string(), "67890".to_string()],
            next_account: FIRST_NEW_ACCOUNT,
            fields: HashMap::new(),
            banner: Vec::new(),
            generation: 0,
            render_delay: 0,
            pending_probes: 0,
            hidden: HashSet::new(),
            fail_visuals: false,
            closed: false,
            close_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of probes after each page load before elements become ready
    pub fn render_delay(mut self, probes: u32) -> Self {
        self.render_delay = probes;
        self
    }

    /// Never resolve `locator`, on any page
    pub fn hide(mut self, locator: Locator) -> Self {
        self.hidden.insert(locator);
        self
    }

    /// Make every screenshot request fail
    pub fn fail_visuals(mut self, fail: bool) -> Self {
        self.fail_visuals = fail;
        self
    }

    /// Shared counter of `close()` calls
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.close_calls)
    }

    /// Account numbers currently known to the bank
    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    fn ensure_open(&self) -> PageResult<()> {
        if self.closed {
            Err(PageError::Closed)
        } else {
            Ok(())
        }
    }

    /// Load a screen, resetting form state and feedback
    fn load(&mut self, screen: Screen) {
        let screen = if screen.requires_login() && self.logged_in.is_none() {
            Screen::Home
        } else {
            screen
        };
        self.screen = screen;
        self.fields.clear();
        self.banner.clear();
        self.generation += 1;
        self.pending_probes = self.render_delay;
        debug!(screen = ?screen, generation = self.generation, "simulated page load");
    }

    /// Show a result on the current screen, as a form POST re-render would
    fn show(&mut self, screen: Screen, banner: Vec<String>) {
        self.load(screen);
        self.banner = banner;
    }

    fn elements(&self) -> Vec<Element> {
        let mut elements = Vec::new();
        match self.screen {
            Screen::Home => {
                elements.push(Element::field(Locator::name("username")));
                elements.push(Element::field(Locator::name("password")));
                elements.push(Element::button("Log In", Submit::Login));
                elements.push(Element::link("Register", LinkTarget::Screen(Screen::Register)));
            }
            Screen::Register => {
                for (id, _, _) in REGISTRATION_FIELDS {
                    elements.push(Element::field(Locator::id(*id)));
                }
                elements.push(Element::button("Register", Submit::Register));
            }
            Screen::Transfer => {
                elements.push(Element::field(Locator::id("amount")));
                elements.push(Element::field(Locator::id("fromAccountId")));
                elements.push(Element::field(Locator::id("toAccountId")));
                elements.push(Element::button("Transfer", Submit::Transfer));
            }
            Screen::OpenAccount => {
                elements.push(Element::field(Locator::id("type")));
                elements.push(Element::field(Locator::id("fromAccountId")));
                elements.push(Element::button("Open New Account", Submit::OpenAccount));
            }
            Screen::Overview | Screen::CustomerCreated => {}
        }

        if self.logged_in.is_some() {
            elements.push(Element::link(
                "Accounts Overview",
                LinkTarget::Screen(Screen::Overview),
            ));
            elements.push(Element::link(
                "Transfer Funds",
                LinkTarget::Screen(Screen::Transfer),
            ));
            elements.push(Element::link(
                "Open New Account",
                LinkTarget::Screen(Screen::OpenAccount),
            ));
            elements.push(Element::link("Log Out", LinkTarget::Logout));
        }

        elements
    }

    fn handle_for(&self, index: usize) -> ElementHandle {
        ElementHandle(format!("sim-{}-{}", self.generation, index))
    }

    /// Resolve a handle against the current page load
    fn element(&self, handle: &ElementHandle) -> PageResult<Element> {
        let stale = || PageError::StaleElement(handle.id().to_string());
        let mut parts = handle.id().strip_prefix("sim-").ok_or_else(stale)?.split('-');
        let generation: u64 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(stale)?;
        let index: usize = parts.next().and_then(|s| s.parse().ok()).ok_or_else(stale)?;
        if generation != self.generation {
            return Err(stale());
        }
        self.elements().get(index).cloned().ok_or_else(stale)
    }

    fn field(&self, id: &str) -> String {
        self.fields
            .get(&Locator::id(id))
            .or_else(|| self.fields.get(&Locator::name(id)))
            .cloned()
            .unwrap_or_default()
    }

    fn submit(&mut self, submit: Submit) {
        match submit {
            Submit::Login => self.submit_login(),
            Submit::Register => self.submit_registration(),
            Submit::Transfer => self.submit_transfer(),
            Submit::OpenAccount => self.submit_open_account(),
        }
    }

    fn submit_login(&mut self) {
        let username = self.field("username");
        let password = self.field("password");

        if self.users.get(&username) == Some(&password) && !username.is_empty() {
            self.logged_in = Some(username);
            self.load(Screen::Overview);
            return;
        }

        let error = if username.is_empty() || password.is_empty() {
            "Please enter a username and password."
        } else if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
            "Invalid username"
        } else if password.chars().count() < 8 {
            "Password must be at least 8 characters"
        } else {
            "The username and password could not be verified."
        };
        self.show(Screen::Home, vec!["Error!".to_string(), error.to_string()]);
    }

    fn submit_registration(&mut self) {
        let mut errors = Vec::new();
        for (id, label, required) in REGISTRATION_FIELDS {
            if *required && self.field(id).is_empty() {
                errors.push(format!("{} is required.", label));
            }
        }

        let first_name = self.field("customer.firstName");
        let ssn = self.field("customer.ssn");
        let username = self.field("customer.username");
        let password = self.field("customer.password");

        if first_name.chars().count() > 50 {
            errors.push("First name cannot exceed 50 characters".to_string());
        }
        if !ssn.is_empty() && !ssn.chars().all(|c| c.is_ascii_digit()) {
            errors.push("Social Security Number must be numeric".to_string());
        }
        if password != self.field("repeatedPassword") {
            errors.push("Passwords did not match.".to_string());
        }
        if self.users.contains_key(&username) {
            errors.push("This username already exists.".to_string());
        }

        if !errors.is_empty() {
            self.show(Screen::Register, errors);
            return;
        }

        self.users.insert(username.clone(), password);
        let account = self.open_new_account();
        self.logged_in = Some(username.clone());
        self.show(
            Screen::CustomerCreated,
            vec![
                format!("Welcome {}", username),
                "Your account was created successfully. You are now logged in.".to_string(),
                format!("Your account number is {}", account),
            ],
        );
    }

    fn submit_transfer(&mut self) {
        let amount = self.field("amount");
        let from = self.field("fromAccountId");
        let to = self.field("toAccountId");

        let error = match amount.trim().parse::<f64>() {
            Err(_) => Some("Amount must be numeric"),
            Ok(value) if !value.is_finite() => Some("Amount must be numeric"),
            Ok(value) if value <= 0.0 => Some("Amount must be greater than 0"),
            Ok(_) if from.is_empty() || to.is_empty() => Some("Please select both accounts"),
            Ok(_) if from == to => Some("Cannot transfer to the same account"),
            Ok(_) if !self.accounts.contains(&from) || !self.accounts.contains(&to) => {
                Some("Account not found")
            }
            Ok(_) => None,
        };

        let banner = match error {
            Some(error) => vec!["Error!".to_string(), error.to_string()],
            None => {
                let value: f64 = amount.trim().parse().unwrap_or_default();
                vec![
                    "Transfer Complete!".to_string(),
                    format!(
                        "${:.2} has been transferred from account #{} to account #{}.",
                        value, from, to
                    ),
                ]
            }
        };
        self.show(Screen::Transfer, banner);
    }

    fn submit_open_account(&mut self) {
        let kind = self.field("type").trim().to_uppercase();
        let from = self.field("fromAccountId");

        let error = if kind.is_empty() {
            Some("Account type is required")
        } else if kind != "CHECKING" && kind != "SAVINGS" {
            Some("Invalid account type")
        } else if from.is_empty() {
            Some("Please choose an account to fund the new account")
        } else if !self.accounts.contains(&from) {
            Some("Account not found")
        } else {
            None
        };

        let banner = match error {
            Some(error) => vec!["Error!".to_string(), error.to_string()],
            None => {
                let account = self.open_new_account();
                vec![
                    "Account Opened!".to_string(),
                    "Congratulations, your account is now open.".to_string(),
                    format!("Your new account number: {}", account),
                ]
            }
        };
        self.show(Screen::OpenAccount, banner);
    }

    fn open_new_account(&mut self) -> String {
        let account = self.next_account.to_string();
        self.next_account += 1;
        self.accounts.push(account.clone());
        account
    }

    fn text_lines(&self) -> Vec<String> {
        let mut lines = vec![self.screen.heading().to_string()];
        lines.extend(self.banner.iter().cloned());

        match self.screen {
            Screen::Home => {
                lines.push("Username".to_string());
                lines.push("Password".to_string());
                lines.push("Forgot login info?".to_string());
            }
            Screen::Overview => {
                lines.push("Account  Balance".to_string());
                lines.extend(self.accounts.iter().map(|a| format!("{}  $515.50", a)));
            }
            Screen::Register => {
                lines.push(
                    "If you have an account with us you can sign-up for free instant online access."
                        .to_string(),
                );
                lines.extend(REGISTRATION_FIELDS.iter().map(|(_, label, _)| format!("{}:", label)));
            }
            Screen::Transfer => {
                lines.push("Amount: $".to_string());
                lines.push("From account #".to_string());
                lines.push("to account #".to_string());
            }
            Screen::OpenAccount => {
                lines.push("What type of Account would you like to open?".to_string());
                lines.push("A minimum of $100.00 must be deposited into this account.".to_string());
            }
            Screen::CustomerCreated => {}
        }

        for element in self.elements() {
            if let (ElementKind::Link(_), Locator::LinkText(text)) =
                (&element.kind, &element.locator)
            {
                lines.push(text.clone());
            }
        }
        lines
    }
}

impl Default for SimulatedBank {
    fn default() -> Self {
        Self::new()
    }
}

impl PageAutomation for SimulatedBank {
    fn navigate(&mut self, url: &str) -> PageResult<()> {
        self.ensure_open()?;
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let page = path.rsplit('/').next().unwrap_or_default();

        match page {
            "register.htm" => self.load(Screen::Register),
            "overview.htm" => self.load(Screen::Overview),
            "transfer.htm" => self.load(Screen::Transfer),
            "openaccount.htm" => self.load(Screen::OpenAccount),
            "logout.htm" => {
                self.logged_in = None;
                self.load(Screen::Home);
            }
            _ if self.logged_in.is_some() => self.load(Screen::Overview),
            _ => self.load(Screen::Home),
        }
        Ok(())
    }

    fn refresh(&mut self) -> PageResult<()> {
        self.ensure_open()?;
        self.load(self.screen);
        Ok(())
    }

    fn locate(
        &mut self,
        locator: &Locator,
        _readiness: Readiness,
    ) -> PageResult<Option<ElementHandle>> {
        self.ensure_open()?;
        if self.pending_probes > 0 {
            self.pending_probes -= 1;
            return Ok(None);
        }
        if self.hidden.contains(locator) {
            return Ok(None);
        }
        Ok(self
            .elements()
            .iter()
            .position(|e| &e.locator == locator)
            .map(|index| self.handle_for(index)))
    }

    fn send_text(&mut self, element: &ElementHandle, text: &str) -> PageResult<()> {
        self.ensure_open()?;
        let element = self.element(element)?;
        if element.kind != ElementKind::Field {
            return Err(PageError::WebDriver {
                status: 400,
                error: "element not interactable".to_string(),
                message: format!("{} does not accept text", element.locator),
            });
        }
        self.fields.entry(element.locator).or_default().push_str(text);
        Ok(())
    }

    fn clear(&mut self, element: &ElementHandle) -> PageResult<()> {
        self.ensure_open()?;
        let element = self.element(element)?;
        self.fields.remove(&element.locator);
        Ok(())
    }

    fn click(&mut self, element: &ElementHandle) -> PageResult<()> {
        self.ensure_open()?;
        match self.element(element)?.kind {
            ElementKind::Field => {}
            ElementKind::Link(LinkTarget::Screen(screen)) => self.load(screen),
            ElementKind::Link(LinkTarget::Logout) => {
                self.logged_in = None;
                self.load(Screen::Home);
            }
            ElementKind::Button(submit) => self.submit(submit),
        }
        Ok(())
    }

    fn current_title(&mut self) -> PageResult<String> {
        self.ensure_open()?;
        Ok(self.screen.title().to_string())
    }

    fn current_visible_text(&mut self) -> PageResult<String> {
        self.ensure_open()?;
        Ok(self.text_lines().join("\n"))
    }

    fn capture_visual(&mut self) -> PageResult<Vec<u8>> {
        self.ensure_open()?;
        if self.fail_visuals {
            return Err(PageError::Transport("screenshot unavailable".to_string()));
        }
        let mut fb = Framebuffer::new(VIEWPORT.0, VIEWPORT.1);
        fb.render_page(self.screen.title(), &self.text_lines());
        fb.to_png()
    }

    fn close(&mut self) -> PageResult<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }

    fn source_type(&self) -> &str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(bank: &mut SimulatedBank, locator: Locator) -> ElementHandle {
        bank.locate(&locator, Readiness::Clickable)
            .unwrap()
            .unwrap_or_else(|| panic!("{} not found", locator))
    }

    fn login(bank: &mut SimulatedBank, username: &str, password: &str) {
        let user = ready(bank, Locator::name("username"));
        bank.send_text(&user, username).unwrap();
        let pass = ready(bank, Locator::name("password"));
        bank.send_text(&pass, password).unwrap();
        let submit = ready(bank, Locator::button("Log In"));
        bank.click(&submit).unwrap();
    }

    #[test]
    fn test_valid_login_reaches_overview() {
        let mut bank = SimulatedBank::new();
        bank.navigate("http://bank/parabank/index.htm").unwrap();
        login(&mut bank, "john", "demo");
        assert!(bank.current_title().unwrap().contains("Accounts Overview"));
    }

    #[test]
    fn test_invalid_username_keeps_title() {
        let mut bank = SimulatedBank::new();
        bank.navigate("index.htm").unwrap();
        login(&mut bank, "john!", "demo");
        assert_eq!(bank.current_title().unwrap(), TITLE_HOME);
        assert!(bank.current_visible_text().unwrap().contains("Invalid username"));
    }

    #[test]
    fn test_render_delay_defers_elements() {
        let mut bank = SimulatedBank::new().render_delay(2);
        bank.navigate("index.htm").unwrap();
        let username = Locator::name("username");
        assert!(bank.locate(&username, Readiness::Present).unwrap().is_none());
        assert!(bank.locate(&username, Readiness::Present).unwrap().is_none());
        assert!(bank.locate(&username, Readiness::Present).unwrap().is_some());
    }

    #[test]
    fn test_handles_go_stale_after_page_load() {
        let mut bank = SimulatedBank::new();
        bank.navigate("index.htm").unwrap();
        let user = ready(&mut bank, Locator::name("username"));
        bank.refresh().unwrap();
        assert!(matches!(
            bank.send_text(&user, "john"),
            Err(PageError::StaleElement(_))
        ));
    }

    #[test]
    fn test_open_account_without_type_creates_nothing() {
        let mut bank = SimulatedBank::new();
        bank.navigate("index.htm").unwrap();
        login(&mut bank, "john", "demo");
        let link = ready(&mut bank, Locator::link("Open New Account"));
        bank.click(&link).unwrap();
        let submit = ready(&mut bank, Locator::button("Open New Account"));
        bank.click(&submit).unwrap();

        let text = bank.current_visible_text().unwrap();
        assert!(text.contains("Account type is required"));
        assert!(!text.contains("Account Opened"));
        assert_eq!(bank.accounts().len(), 2);
    }

    #[test]
    fn test_hidden_locator_never_resolves() {
        let mut bank = SimulatedBank::new().hide(Locator::button("Log In"));
        bank.navigate("index.htm").unwrap();
        assert!(
            bank.locate(&Locator::button("Log In"), Readiness::Clickable)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_close_counts_and_blocks_further_use() {
        let mut bank = SimulatedBank::new();
        let counter = bank.close_counter();
        bank.close().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(matches!(bank.navigate("index.htm"), Err(PageError::Closed)));
    }
}
