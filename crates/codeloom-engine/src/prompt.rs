//! Prompt templates for the architect and coder phases.
//!
//! Templates are embedded Jinja2 rendered through a shared minijinja
//! environment. The architect prompt asks for a structured specification
//! instead of code; the coder prompt embeds that specification; the direct
//! prompt is the fallback used when planning produced nothing.

use minijinja::{Environment, context};
use once_cell::sync::Lazy;

use codeloom_core::{LoomError, Result};

/// Literal prompt that opts out of revision context even when prior code
/// exists. Known fragile heuristic, kept for compatibility.
pub const NEW_PROJECT_TRIGGER: &str = "new";

const ARCHITECT_TEMPLATE: &str = r#"You are a software architect. Produce a short, concrete build
specification for the request below. Describe the user-visible behavior,
the layout, and the interaction model in numbered points. Do NOT write any
code.

Request: {{ request }}
{% if prior_code %}
The user is revising an existing program. Current code:

{{ prior_code }}

Specify only what the revised version should do.
{% endif %}"#;

const CODER_TEMPLATE: &str = r#"You are an expert developer. Implement the specification below as a
single, complete, runnable file. Prefer self-contained HTML/JavaScript for
anything visual or interactive, and Python for data or scripting tasks.
Output exactly one fenced code block tagged with the language and nothing
else.
{% if style %}
Authoring style: {{ style }}
{% endif %}
Specification:
{{ spec }}

Original request: {{ request }}
{% if revision %}
This is a revision of the user's previous program; keep working behavior
the user did not ask to change.
{% endif %}"#;

const DIRECT_TEMPLATE: &str = r#"You are an expert developer. Build the following as a single, complete,
runnable file. Prefer self-contained HTML/JavaScript for anything visual or
interactive, and Python for data or scripting tasks. Output exactly one
fenced code block tagged with the language and nothing else.
{% if style %}
Authoring style: {{ style }}
{% endif %}
Request: {{ request }}"#;

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template("architect", ARCHITECT_TEMPLATE)
        .expect("architect template is valid");
    env.add_template("coder", CODER_TEMPLATE)
        .expect("coder template is valid");
    env.add_template("direct", DIRECT_TEMPLATE)
        .expect("direct template is valid");
    env
});

fn render(name: &str, ctx: minijinja::Value) -> Result<String> {
    let template = ENV
        .get_template(name)
        .map_err(|e| LoomError::internal(format!("missing prompt template '{name}': {e}")))?;
    template
        .render(ctx)
        .map_err(|e| LoomError::internal(format!("failed to render prompt '{name}': {e}")))
}

/// True when the cycle should be treated as a revision: prior code exists
/// and the prompt is not the literal new-project trigger word.
pub fn is_revision(prompt: &str, prior_code: &str) -> bool {
    !prior_code.trim().is_empty() && !prompt.trim().eq_ignore_ascii_case(NEW_PROJECT_TRIGGER)
}

/// Builds the architect (planning) prompt.
pub fn architect_prompt(request: &str, prior_code: Option<&str>) -> Result<String> {
    render(
        "architect",
        context! {
            request => request,
            prior_code => prior_code.unwrap_or(""),
        },
    )
}

/// Builds the coder (implementation) prompt from a non-blank specification.
pub fn coder_prompt(
    spec: &str,
    request: &str,
    revision: bool,
    style: Option<&str>,
) -> Result<String> {
    render(
        "coder",
        context! {
            spec => spec,
            request => request,
            revision => revision,
            style => style.unwrap_or(""),
        },
    )
}

/// Builds the direct-prompt fallback used when planning produced no
/// specification.
pub fn direct_prompt(request: &str, style: Option<&str>) -> Result<String> {
    render("direct", context! { request => request, style => style.unwrap_or("") })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_architect_prompt_embeds_request() {
        let prompt = architect_prompt("a pomodoro timer", None).unwrap();
        assert!(prompt.contains("a pomodoro timer"));
        assert!(!prompt.contains("Current code"));
    }

    #[test]
    fn test_architect_prompt_embeds_prior_code_for_revision() {
        let prompt = architect_prompt("make it blue", Some("<html></html>")).unwrap();
        assert!(prompt.contains("<html></html>"));
        assert!(prompt.contains("revising"));
    }

    #[test]
    fn test_coder_prompt_embeds_spec_and_style() {
        let prompt = coder_prompt("1. draws a grid", "a grid", false, Some("retro")).unwrap();
        assert!(prompt.contains("1. draws a grid"));
        assert!(prompt.contains("retro"));
    }

    #[test]
    fn test_direct_prompt_omits_spec_section() {
        let prompt = direct_prompt("a calculator", None).unwrap();
        assert!(prompt.contains("a calculator"));
        assert!(!prompt.contains("Specification:"));
    }

    #[test]
    fn test_revision_detection() {
        assert!(is_revision("make it faster", "print(1)"));
        assert!(!is_revision("new", "print(1)"));
        assert!(!is_revision("NEW", "print(1)"));
        assert!(!is_revision("make it faster", "   "));
    }
}
