// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admin identity used for remote actions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identity remote actions run under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// User to sudo to after login, when not the login user itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sudo_user: Option<String>,
    /// Run actions as the login user without privilege escalation.
    #[serde(default)]
    pub no_sudo: bool,
}

impl User {
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            private_key_path: None,
            public_key_path: None,
            password: None,
            sudo_user: None,
            no_sudo: false,
        }
    }

    /// Admin identity defaulting to the invoking user.
    pub fn admin() -> Self {
        let username = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "root".to_string());
        Self::named(username)
    }

    pub fn with_private_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key_path = Some(path.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_sudo_user(mut self, user: impl Into<String>) -> Self {
        self.sudo_user = Some(user.into());
        self
    }

    pub fn without_sudo(mut self) -> Self {
        self.no_sudo = true;
        self
    }
}

impl Default for User {
    fn default() -> Self {
        Self::admin()
    }
}
