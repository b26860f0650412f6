//! Built-in recognizers with their validators.

use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

use crate::recognizer::{Pattern, PatternRecognizer};

/// Entity names the predefined recognizers report.
pub const ENTITIES: &[&str] = &[
    "CREDIT_CARD",
    "CRYPTO",
    "DOMAIN_NAME",
    "EMAIL_ADDRESS",
    "IBAN_CODE",
    "IP_ADDRESS",
    "PHONE_NUMBER",
    "US_BANK_NUMBER",
    "US_ITIN",
    "US_PASSPORT",
    "US_SSN",
];

// (name, entity, [(pattern name, regex, score)], validator)
type Builtin = (
    &'static str,
    &'static str,
    &'static [(&'static str, &'static str, f32)],
    Option<fn(&str) -> Option<f32>>,
);

const BUILTINS: &[Builtin] = &[
    (
        "CreditCardRecognizer",
        "CREDIT_CARD",
        &[(
            "All Credit Cards (weak)",
            r"\b(?:4\d{3}|5[0-5]\d{2}|6\d{3}|1\d{3}|3\d{3})[- ]?\d{3,4}[- ]?\d{3,4}[- ]?\d{3,5}\b",
            0.3,
        )],
        Some(validate_credit_card),
    ),
    (
        "CryptoRecognizer",
        "CRYPTO",
        &[("Crypto (Medium)", r"\b[13][a-km-zA-HJ-NP-Z1-9]{26,33}\b", 0.5)],
        Some(validate_bitcoin_address),
    ),
    (
        "DomainRecognizer",
        "DOMAIN_NAME",
        &[(
            "Domain (weak)",
            r"\b(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,24}\b",
            0.5,
        )],
        None,
    ),
    (
        "EmailRecognizer",
        "EMAIL_ADDRESS",
        &[(
            "Email (Medium)",
            r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b",
            1.0,
        )],
        None,
    ),
    (
        "IbanRecognizer",
        "IBAN_CODE",
        &[(
            "Iban (Medium)",
            r"\b[a-zA-Z]{2}[0-9]{2}[a-zA-Z0-9]{4}[0-9]{7}[a-zA-Z0-9]{0,16}\b",
            0.5,
        )],
        Some(validate_iban),
    ),
    (
        "IpRecognizer",
        "IP_ADDRESS",
        &[(
            "IPv4",
            r"\b(?:(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\b",
            0.6,
        )],
        None,
    ),
    (
        "UsPhoneRecognizer",
        "PHONE_NUMBER",
        &[
            ("Phone (strong)", r"\(\d{3}\)\s*\d{3}[-.\s]?\d{4}\b|\b\d{3}[-.\s]\d{3}[-.\s]\d{4}\b", 0.7),
            ("Phone (medium)", r"\b\d{3}[-.\s]\d{3}[-.\s]?\d{4}\b", 0.5),
            ("Phone (weak)", r"\b\d{10}\b", 0.05),
        ],
        None,
    ),
    (
        "UsBankRecognizer",
        "US_BANK_NUMBER",
        &[("Bank Account (weak)", r"\b\d{8,17}\b", 0.05)],
        None,
    ),
    (
        "UsItinRecognizer",
        "US_ITIN",
        &[
            (
                "Itin (very weak)",
                r"\b9\d{2}[- ](?:7\d|8[0-8]|9[0-2]|9[4-9])\d{4}\b|\b9\d{2}(?:7\d|8[0-8]|9[0-2]|9[4-9])[- ]\d{4}\b",
                0.05,
            ),
            ("Itin (weak)", r"\b9\d{2}(?:7\d|8[0-8]|9[0-2]|9[4-9])\d{4}\b", 0.3),
            ("Itin (medium)", r"\b9\d{2}[- ](?:7\d|8[0-8]|9[0-2]|9[4-9])[- ]\d{4}\b", 0.5),
        ],
        None,
    ),
    (
        "UsPassportRecognizer",
        "US_PASSPORT",
        &[("Passport (very weak)", r"\b\d{9}\b", 0.05)],
        None,
    ),
    (
        "UsSsnRecognizer",
        "US_SSN",
        &[
            ("SSN (very weak)", r"\b(?:\d{5}-\d{4}|\d{3}-\d{6})\b", 0.05),
            ("SSN (weak)", r"\b\d{9}\b", 0.3),
            ("SSN (medium)", r"\b\d{3}-\d{2}-\d{4}\b", 0.5),
        ],
        None,
    ),
];

// Compiled once, cloned into each registry.
static PREDEFINED: Lazy<Vec<PatternRecognizer>> = Lazy::new(|| {
    BUILTINS
        .iter()
        .map(|(name, entity, patterns, validator)| {
            let patterns = patterns
                .iter()
                .map(|(pname, regex, score)| Pattern::new(*pname, regex, *score).unwrap())
                .collect();
            let recognizer = PatternRecognizer::new(*name, *entity, "en", patterns);
            match validator {
                Some(v) => recognizer.with_validator(*v),
                None => recognizer,
            }
        })
        .collect()
});

/// The built-in English recognizers.
pub fn recognizers() -> Vec<PatternRecognizer> {
    PREDEFINED.clone()
}

/// Luhn checksum: valid numbers score 1.0, invalid ones 0.
fn validate_credit_card(text: &str) -> Option<f32> {
    let digits: Vec<u32> = text.chars().filter_map(|c| c.to_digit(10)).collect();
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    Some(if sum % 10 == 0 { 1.0 } else { 0.0 })
}

/// IBAN mod-97 check: valid codes score 1.0, invalid ones 0.
fn validate_iban(text: &str) -> Option<f32> {
    let upper = text.to_ascii_uppercase();
    if upper.len() < 5 {
        return Some(0.0);
    }
    let (head, tail) = upper.split_at(4);
    let mut remainder: u32 = 0;
    for c in tail.chars().chain(head.chars()) {
        let value = c.to_digit(36)?;
        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }
    Some(if remainder == 1 { 1.0 } else { 0.0 })
}

/// Base58Check (double SHA-256) for legacy bitcoin addresses. A valid
/// checksum raises the score to 1.0; otherwise the pattern score stays.
fn validate_bitcoin_address(text: &str) -> Option<f32> {
    const ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

    let mut bytes = [0u8; 25];
    for c in text.bytes() {
        let mut carry = ALPHABET.iter().position(|&a| a == c)? as u32;
        for byte in bytes.iter_mut().rev() {
            carry += u32::from(*byte) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        if carry != 0 {
            return None;
        }
    }

    let checksum = Sha256::digest(Sha256::digest(&bytes[..21]));
    (checksum[..4] == bytes[21..]).then_some(1.0)
}
