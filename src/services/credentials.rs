// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential matching against the agent listing.

use crate::models::RemoteUser;

/// Result of scanning the agent listing for a phone/password pair.
#[derive(Debug)]
pub enum CredentialMatch<'a> {
    Found(&'a RemoteUser),
    /// Phone matched at least one agent, password matched none of them.
    WrongPassword,
    NoSuchPhone,
}

/// Remove every whitespace character, including internal ones.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Mask a phone number for logs, keeping only the last three digits.
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    let keep = chars.len().min(3);
    let hidden = chars.len() - keep;
    std::iter::repeat('*')
        .take(hidden)
        .chain(chars[hidden..].iter().copied())
        .collect()
}

/// Scan `users` in order for the first agent whose normalized phone equals
/// the normalized input and whose password equals `password` exactly.
///
/// With `trace` set, each comparison is logged at TRACE level with masked
/// phones.
pub fn match_credentials<'a>(
    users: &'a [RemoteUser],
    phone: &str,
    password: &str,
    trace: bool,
) -> CredentialMatch<'a> {
    let wanted = normalize_phone(phone);
    let mut phone_seen = false;

    for user in users {
        let candidate = normalize_phone(&user.phone);
        let phone_matches = candidate == wanted;

        if trace {
            tracing::trace!(
                user_id = user.id,
                candidate = %mask_phone(&candidate),
                phone_matches,
                "Credential comparison"
            );
        }

        if !phone_matches {
            continue;
        }
        phone_seen = true;

        if user.password == password {
            return CredentialMatch::Found(user);
        }
    }

    if phone_seen {
        CredentialMatch::WrongPassword
    } else {
        CredentialMatch::NoSuchPhone
    }
}
