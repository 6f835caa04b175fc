// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jinja2-style rendering for provisioning scripts.
//!
//! Step scripts are templates over a per-machine context:
//! `{{ name }}`, `{{ address }}`, `{{ hosts }}`, `{{ pod_cidr }}` and so on.
//! Rendering is strict: an undefined variable is an error, not an empty
//! string silently baked into a shell script.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during script rendering.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template syntax error: {0}")]
    Syntax(String),
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
    #[error("render error: {0}")]
    Render(String),
}

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::SyntaxError => TemplateError::Syntax(err.to_string()),
            minijinja::ErrorKind::UndefinedError => {
                TemplateError::UndefinedVariable(err.to_string())
            }
            _ => TemplateError::Render(err.to_string()),
        }
    }
}

/// Renders provisioning script templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine;

impl TemplateEngine {
    pub fn new() -> Self {
        Self
    }

    /// Render a single template string against a serializable context.
    pub fn render(&self, template: &str, ctx: impl Serialize) -> Result<String, TemplateError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Ok(env.render_str(template, ctx)?)
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
