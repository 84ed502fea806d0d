// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for abuse simulation.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client identities (IPv4 strings) for testing.
pub fn generate_identities(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c)).to_string()
        })
        .collect()
}

/// A well-formed contact submission.
pub fn valid_contact(i: usize) -> Value {
    json!({
        "name": format!("Visitor {i}"),
        "email": format!("Visitor.{i}@Example.com"),
        "phone": "+91 98765 43210",
        "message": format!("Question number {i} about the course schedule"),
    })
}

/// A well-formed enrollment submission.
pub fn valid_enrollment(i: usize) -> Value {
    json!({
        "name": format!("Student {i}"),
        "email": format!("student{i}@example.org"),
        "phone": "9876543210",
        "course": "Full Stack Web Development",
        "qualification": "B.Tech",
    })
}

/// A submission with the honeypot filled, otherwise arbitrary.
pub fn bot_payload(i: usize) -> Value {
    let mut body = if i % 2 == 0 { valid_contact(i) } else { json!({}) };
    body["honeypot"] = json!(format!("https://cheap-pills-{i}.example"));
    body
}

/// Email values that must fail the shape check.
pub fn generate_invalid_emails() -> Vec<&'static str> {
    vec![
        "not-an-email",
        "missing-at.example.com",
        "no-dot@example",
        "two@@example.com",
        "spaces in@example.com",
        "@example.com",
        "user@.",
    ]
}

/// Request bodies that are not JSON objects.
pub fn generate_malformed_bodies() -> Vec<&'static [u8]> {
    vec![
        b"",
        b"{",
        b"name=Ada&email=ada@example.com",
        b"[]",
        b"\"just a string\"",
        b"null",
        b"42",
    ]
}

/// Fields pushed one character past their limit, with the expected error.
pub fn generate_oversized_fields() -> Vec<(&'static str, String, &'static str)> {
    vec![
        (
            "name",
            "n".repeat(101),
            "Name must be less than 100 characters",
        ),
        (
            "email",
            format!("{}@example.com", "e".repeat(244)),
            "Email must be less than 255 characters",
        ),
        (
            "phone",
            "1".repeat(21),
            "Phone must be less than 20 characters",
        ),
        (
            "message",
            "m".repeat(2001),
            "Message must be less than 2000 characters",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_identities() {
        let ids = generate_identities(256);
        assert_eq!(ids.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_oversized_lengths() {
        for (_, value, _) in generate_oversized_fields() {
            assert!(value.chars().count() > 20);
        }
        assert_eq!(generate_oversized_fields()[1].1.len(), 256);
    }
}
