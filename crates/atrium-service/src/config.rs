// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment-driven service configuration.
//!
//! Every knob has a default, so an empty environment yields a usable
//! development configuration. Empty variables are treated as unset.

/// Runtime configuration for the service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
	/// SQLite database location.
	pub database_url: String,
	/// Cookie carrying the session token.
	pub session_cookie_name: String,
	/// When false, notification creation skips push fan-out entirely.
	pub push_enabled: bool,
}

impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			database_url: "sqlite://atrium.db".to_string(),
			session_cookie_name: "session".to_string(),
			push_enabled: true,
		}
	}
}

impl ServiceConfig {
	/// Load configuration from `ATRIUM_*` environment variables, falling
	/// back to defaults for anything unset.
	pub fn from_env() -> Self {
		let defaults = Self::default();
		Self {
			database_url: env_var("ATRIUM_DATABASE_URL").unwrap_or(defaults.database_url),
			session_cookie_name: env_var("ATRIUM_SESSION_COOKIE_NAME")
				.unwrap_or(defaults.session_cookie_name),
			push_enabled: env_bool("ATRIUM_PUSH_ENABLED").unwrap_or(defaults.push_enabled),
		}
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_usable() {
		let config = ServiceConfig::default();
		assert_eq!(config.database_url, "sqlite://atrium.db");
		assert_eq!(config.session_cookie_name, "session");
		assert!(config.push_enabled);
	}

	// Mutating the process environment races with parallel tests, so only
	// the unset path is exercised here.
	#[test]
	fn unset_variables_read_as_none() {
		assert_eq!(super::env_var("ATRIUM_TEST_UNSET_VARIABLE"), None);
		assert_eq!(super::env_bool("ATRIUM_TEST_UNSET_VARIABLE"), None);
	}
}
