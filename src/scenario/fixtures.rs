// Fixed journey data for the public demo bank

use crate::steps::{Registration, Transfer};

/// Account funding every transfer and new account
pub const PRIMARY_ACCOUNT: &str = "12345";

/// Second account owned by the demo customer
pub const SECONDARY_ACCOUNT: &str = "67890";

/// A login the application must reject, with the message it shows
pub struct RejectedLogin {
    pub username: &'static str,
    pub password: &'static str,
    pub expected: &'static str,
}

pub const REJECTED_LOGINS: [RejectedLogin; 3] = [
    RejectedLogin {
        username: "john!",
        password: "demo",
        expected: "Invalid username",
    },
    RejectedLogin {
        username: "john",
        password: "short",
        expected: "Password must be at least 8 characters",
    },
    RejectedLogin {
        username: "john#",
        password: "demo1234",
        expected: "Invalid username",
    },
];

/// Registration the application accepts
pub fn valid_registration() -> Registration {
    Registration {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        street: "123 Main St".to_string(),
        city: "Anytown".to_string(),
        state: "CA".to_string(),
        zip_code: "12345".to_string(),
        phone: "5551234567".to_string(),
        ssn: "123456789".to_string(),
        username: "johndoe123".to_string(),
        password: "Test1234".to_string(),
        confirm: "Test1234".to_string(),
    }
}

pub const REGISTRATION_WELCOME: &str = "Welcome";

/// Registrations the application must reject, with the message each shows
pub fn rejected_registrations() -> Vec<(Registration, &'static str)> {
    let base = valid_registration();

    let mismatch = Registration {
        username: "johndoe124".to_string(),
        confirm: "Different123".to_string(),
        ..base.clone()
    };

    let long_name = Registration {
        first_name: "J".repeat(51),
        username: "user123".to_string(),
        password: "ValidPass123".to_string(),
        confirm: "ValidPass123".to_string(),
        ..base.clone()
    };

    let bad_ssn = Registration {
        ssn: "123abc789".to_string(),
        username: "user123".to_string(),
        password: "ValidPass123".to_string(),
        confirm: "ValidPass123".to_string(),
        ..base
    };

    vec![
        (mismatch, "Passwords did not match"),
        (long_name, "First name cannot exceed 50 characters"),
        (bad_ssn, "Social Security Number must be numeric"),
    ]
}

pub const VALID_TRANSFER: Transfer<'static> = Transfer {
    amount: "100",
    from_account: PRIMARY_ACCOUNT,
    to_account: SECONDARY_ACCOUNT,
};

pub const TRANSFER_COMPLETE: &str = "Transfer Complete";

pub const REJECTED_TRANSFERS: [(Transfer<'static>, &str); 3] = [
    (
        Transfer {
            amount: "100",
            from_account: PRIMARY_ACCOUNT,
            to_account: PRIMARY_ACCOUNT,
        },
        "Cannot transfer to the same account",
    ),
    (
        Transfer {
            amount: "0",
            from_account: PRIMARY_ACCOUNT,
            to_account: SECONDARY_ACCOUNT,
        },
        "Amount must be greater than 0",
    ),
    (
        Transfer {
            amount: "abc",
            from_account: PRIMARY_ACCOUNT,
            to_account: SECONDARY_ACCOUNT,
        },
        "Amount must be numeric",
    ),
];

/// Account kinds opened in order, with the screenshot taken after each
pub const NEW_ACCOUNTS: [(&str, &str); 2] = [
    ("CHECKING", "after_checking_account_opened"),
    ("SAVINGS", "after_savings_account_opened"),
];

pub const ACCOUNT_OPENED: &str = "Account Opened";

pub const ACCOUNT_TYPE_REQUIRED: &str = "Account type is required";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_registrations_differ_from_valid_one() {
        let valid = valid_registration();
        for (form, _) in rejected_registrations() {
            assert_ne!(form, valid);
            assert_eq!(form.last_name, valid.last_name);
        }
    }

    #[test]
    fn test_long_name_exceeds_limit() {
        let (form, expected) = &rejected_registrations()[1];
        assert_eq!(form.first_name.chars().count(), 51);
        assert!(expected.contains("50"));
    }
}
