//! Terminal output.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use serde::Serialize;

/// Where command results go: text lines or one JSON document.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON, or the text built by `text`.
    pub fn emit<T, F>(self, value: &T, text: F)
    where
        T: Serialize + ?Sized,
        F: FnOnce() -> String,
    {
        if self.json {
            match serde_json::to_string_pretty(value) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!(error = %e, "Could not render JSON output"),
            }
        } else {
            println!("{}", text());
        }
    }

    /// Print a status line. JSON mode wraps it as `{"message": ...}`.
    pub fn message(self, message: &str) {
        self.emit(&serde_json::json!({ "message": message }), || {
            message.to_string()
        });
    }
}

/// Print an error for the user.
pub fn failure(message: &str) {
    eprintln!("error: {message}");
}
