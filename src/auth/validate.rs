use lazy_static::lazy_static;
use regex::Regex;
use time::Date;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// 5-25 chars, alphanumeric plus `_` and `-`.
pub fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_-]{5,25}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

/// 8-30 chars with at least one uppercase letter, one lowercase letter and
/// one digit.
pub fn is_valid_password(password: &str) -> bool {
    (8..=30).contains(&password.len())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

pub fn is_valid_name(name: &str) -> bool {
    (3..=30).contains(&name.chars().count())
}

/// Age must be at least 18 years at submission time.
pub fn is_adult(birthdate: Date, today: Date) -> bool {
    let cutoff = Date::from_calendar_date(today.year() - 18, today.month(), today.day())
        .or_else(|_| {
            // Feb 29 on a non-leap target year
            Date::from_calendar_date(today.year() - 18, today.month(), 28)
        })
        .expect("cutoff date is always constructible");
    birthdate <= cutoff
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("a@example.com"));
        assert!(is_valid_email("first.last@sub.example.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn username_charset_and_length() {
        assert!(is_valid_username("alice123"));
        assert!(is_valid_username("al-ic_e"));
        assert!(is_valid_username("abcde"));
        assert!(!is_valid_username("abcd")); // too short
        assert!(!is_valid_username(&"a".repeat(26))); // too long
        assert!(!is_valid_username("alice 123")); // space
        assert!(!is_valid_username("alice@123")); // symbol
    }

    #[test]
    fn password_policy() {
        assert!(is_valid_password("Passw0rd"));
        assert!(!is_valid_password("passw0rd")); // no uppercase
        assert!(!is_valid_password("PASSW0RD")); // no lowercase
        assert!(!is_valid_password("Password")); // no digit
        assert!(!is_valid_password("Pw0rd")); // too short
        assert!(!is_valid_password(&format!("Aa1{}", "x".repeat(30)))); // too long
    }

    #[test]
    fn name_length() {
        assert!(is_valid_name("Ann"));
        assert!(!is_valid_name("An"));
        assert!(!is_valid_name(&"n".repeat(31)));
    }

    #[test]
    fn adulthood_boundary() {
        let today = date!(2026 - 08 - 07);
        assert!(is_adult(date!(2008 - 08 - 07), today)); // exactly 18
        assert!(!is_adult(date!(2008 - 08 - 08), today)); // one day short
        assert!(is_adult(date!(1990 - 01 - 01), today));
    }

    #[test]
    fn adulthood_handles_leap_day() {
        let today = date!(2024 - 02 - 29);
        assert!(is_adult(date!(2006 - 02 - 28), today));
        assert!(!is_adult(date!(2006 - 03 - 01), today));
    }
}
