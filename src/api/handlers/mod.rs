pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

pub mod me;
pub use self::me::me;

// common functions for the handlers
use regex::Regex;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

pub fn valid_username(username: &str) -> bool {
    !username.trim().is_empty() && username.len() <= 64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(valid_email("alice@example.test"));
        assert!(!valid_email("alice"));
        assert!(!valid_email("alice@example"));
        assert!(!valid_email("al ice@example.test"));
    }

    #[test]
    fn test_valid_username() {
        assert!(valid_username("alice"));
        assert!(!valid_username(""));
        assert!(!valid_username("   "));
        assert!(!valid_username(&"a".repeat(65)));
    }
}
