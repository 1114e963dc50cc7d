//! IBAN generation and validation
//!
//! Accounts are addressed externally by a Turkish-format IBAN: "TR", two
//! check digits, a 5-digit bank code, one reserve digit, and a 16-digit
//! account number. Check digits follow ISO 7064 mod-97-10.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

/// Bank code used for locally issued accounts.
const BANK_CODE: &str = "00061";

const COUNTRY: &str = "TR";

fn shape_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^TR\d{24}$").unwrap())
}

/// Generate a fresh IBAN with a random account number and valid check digits.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let mut account_number = String::with_capacity(16);
    for _ in 0..16 {
        account_number.push(char::from(b'0' + rng.gen_range(0..10)));
    }
    let bban = format!("{BANK_CODE}0{account_number}");
    let check = check_digits(&bban);
    format!("{COUNTRY}{check:02}{bban}")
}

/// Validate shape and mod-97 check digits.
pub fn validate(iban: &str) -> bool {
    if !shape_re().is_match(iban) {
        return false;
    }
    // Move the country code + check digits to the end, digitize, mod 97.
    let rearranged = format!("{}{}", &iban[4..], &iban[..4]);
    mod97(&digitize(&rearranged)) == 1
}

/// Compute the two check digits for a BBAN.
fn check_digits(bban: &str) -> u32 {
    // Candidate with "00" check digits, country moved to the end.
    let candidate = format!("{bban}{COUNTRY}00");
    98 - mod97(&digitize(&candidate))
}

/// Replace letters with their ISO 7064 numeric values (A=10 .. Z=35).
fn digitize(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if c.is_ascii_digit() {
            out.push(c);
        } else {
            let value = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 10;
            out.push_str(&value.to_string());
        }
    }
    out
}

/// Remainder of an arbitrarily long decimal string modulo 97.
fn mod97(digits: &str) -> u32 {
    let mut rem: u32 = 0;
    for c in digits.chars() {
        rem = (rem * 10 + c.to_digit(10).unwrap_or(0)) % 97;
    }
    rem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ibans_validate() {
        for _ in 0..50 {
            let iban = generate();
            assert_eq!(iban.len(), 26);
            assert!(iban.starts_with("TR"));
            assert!(validate(&iban), "generated IBAN failed mod-97: {iban}");
        }
    }

    #[test]
    fn test_known_good_iban() {
        // Published example of a valid Turkish IBAN
        assert!(validate("TR330006100519786457841326"));
    }

    #[test]
    fn test_corrupted_check_digits_fail() {
        let iban = generate();
        let mut corrupted = iban.clone();
        // Flip one digit of the account number
        let last = corrupted.pop().unwrap();
        corrupted.push(if last == '0' { '1' } else { '0' });
        assert!(!validate(&corrupted));
    }

    #[test]
    fn test_shape_rejections() {
        assert!(!validate(""));
        assert!(!validate("DE44500105175407324931"));
        assert!(!validate("TR33000610051978645784132")); // too short
        assert!(!validate("TR33000610051978645784132X"));
    }
}
