//! User operations against the banking application.
//!
//! Every step is a fixed sequence of element actions. A screenshot is taken
//! right before the submitting click, and any failure is captured as
//! `<step>_failure` and wrapped with the step name.

use tracing::info;

use crate::assertion::OutcomeKind;
use crate::error::HarnessResult;
use crate::harness::{Action, Harness, RunEvent};
use crate::page::Locator;

/// Title fragment shown once a customer is logged in
pub const TITLE_LOGGED_IN: &str = "Accounts Overview";

/// Title fragment shared by every public page
pub const TITLE_PUBLIC: &str = "ParaBank";

/// Registration form contents.
///
/// Values are forwarded exactly as given, including ones the application is
/// expected to reject. `state` is the only optional field: it is typed only
/// when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub ssn: String,
    pub username: String,
    pub password: String,
    pub confirm: String,
}

impl Registration {
    /// Form fields in page order, paired with their element ids
    fn fields(&self) -> [(&'static str, &str); 11] {
        [
            ("customer.firstName", self.first_name.as_str()),
            ("customer.lastName", self.last_name.as_str()),
            ("customer.address.street", self.street.as_str()),
            ("customer.address.city", self.city.as_str()),
            ("customer.address.state", self.state.as_str()),
            ("customer.address.zipCode", self.zip_code.as_str()),
            ("customer.phoneNumber", self.phone.as_str()),
            ("customer.ssn", self.ssn.as_str()),
            ("customer.username", self.username.as_str()),
            ("customer.password", self.password.as_str()),
            ("repeatedPassword", self.confirm.as_str()),
        ]
    }
}

/// Funds transfer between two accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer<'a> {
    pub amount: &'a str,
    pub from_account: &'a str,
    pub to_account: &'a str,
}

impl Harness {
    /// Log in from the welcome page and wait for the accounts overview
    pub fn login(&mut self, username: &str, password: &str) -> HarnessResult<()> {
        self.step("login", |h| {
            h.navigate("")?;
            h.type_into(&Locator::name("username"), username)?;
            h.type_into(&Locator::name("password"), password)?;
            h.capture("before_login_click");
            h.click(&Locator::button("Log In"))?;
            h.wait_for_title(TITLE_LOGGED_IN)?;
            h.advance(RunEvent::LoggedIn);
            Ok(())
        })
    }

    pub fn logout(&mut self) -> HarnessResult<()> {
        self.step("logout", |h| {
            h.click(&Locator::link("Log Out"))?;
            h.wait_for_title(TITLE_PUBLIC)?;
            h.advance(RunEvent::LoggedOut);
            Ok(())
        })
    }

    /// Submit credentials the application must reject, then expect `expected_error`.
    ///
    /// The current page is reloaded first so no earlier input or feedback
    /// carries over.
    pub fn attempt_login(
        &mut self,
        username: &str,
        password: &str,
        expected_error: &str,
    ) -> HarnessResult<()> {
        self.step("login_attempt", |h| {
            h.refresh()?;
            h.type_into(&Locator::name("username"), username)?;
            h.type_into(&Locator::name("password"), password)?;
            h.capture("before_invalid_login_attempt");
            h.click(&Locator::button("Log In"))?;
            h.assert_contains(expected_error, OutcomeKind::Error)?;
            Ok(())
        })
    }

    /// Fill the registration form and submit it
    pub fn register(&mut self, form: &Registration) -> HarnessResult<()> {
        self.step("registration_fill", |h| {
            h.navigate("register.htm")?;
            for (id, value) in form.fields() {
                if id == "customer.address.state" && value.is_empty() {
                    continue;
                }
                h.type_into(&Locator::id(id), value)?;
            }
            h.capture("before_registration_submit");
            h.click(&Locator::button("Register"))?;
            Ok(())
        })
    }

    /// Open the transfer page, fill it and submit
    pub fn transfer_funds(&mut self, transfer: &Transfer<'_>) -> HarnessResult<()> {
        self.step("transfer_funds", |h| {
            h.click(&Locator::link("Transfer Funds"))?;
            let amount = Locator::id("amount");
            h.perform(&amount, Action::Clear)?;
            h.type_into(&amount, transfer.amount)?;
            h.type_into(&Locator::id("fromAccountId"), transfer.from_account)?;
            h.type_into(&Locator::id("toAccountId"), transfer.to_account)?;
            h.capture("before_transfer_submit");
            h.click(&Locator::button("Transfer"))?;
            Ok(())
        })
    }

    /// Open the new-account page and submit it.
    ///
    /// Passing `None` leaves the corresponding field untouched.
    pub fn open_account(
        &mut self,
        account_type: Option<&str>,
        from_account: Option<&str>,
    ) -> HarnessResult<()> {
        self.step("open_account", |h| {
            h.click(&Locator::link("Open New Account"))?;
            if let Some(account_type) = account_type {
                h.type_into(&Locator::id("type"), account_type)?;
            }
            if let Some(from_account) = from_account {
                h.type_into(&Locator::id("fromAccountId"), from_account)?;
            }
            h.capture("before_open_account_submit");
            h.click(&Locator::button("Open New Account"))?;
            info!(
                account_type = account_type.unwrap_or("<none>"),
                "Submitted open account form"
            );
            Ok(())
        })
    }
}
