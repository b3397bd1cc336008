/// Unit-level tests against the public API
mod analytics;
mod dates;
mod streaks;
