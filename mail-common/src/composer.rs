// Subject/body rendering from Handlebars templates
use handlebars::Handlebars;
use serde_json::Value;
use tracing::warn;

use crate::error::ComposeError;

const SUBJECT_TEMPLATE: &str = "subject";
const MESSAGE_TEMPLATE: &str = "message";

/// Renders the subject and body of a mail from caller supplied data.
pub trait MessageComposer: Send + Sync {
    fn compose_subject(&self, data: &Value) -> Result<String, ComposeError>;

    fn compose_message(&self, data: &Value) -> Result<String, ComposeError>;

    /// Like [`compose_subject`](Self::compose_subject) but logs failures and
    /// yields an empty string.
    fn compose_subject_or_default(&self, data: &Value) -> String {
        self.compose_subject(data).unwrap_or_else(|e| {
            warn!(error = %e, "Subject composition failed, using empty subject");
            String::new()
        })
    }

    /// Like [`compose_message`](Self::compose_message) but logs failures and
    /// yields an empty string.
    fn compose_message_or_default(&self, data: &Value) -> String {
        self.compose_message(data).unwrap_or_else(|e| {
            warn!(error = %e, "Message composition failed, using empty body");
            String::new()
        })
    }
}

/// Composer backed by two Handlebars templates compiled once at construction.
///
/// Rendering is strict: a template referencing a field missing from the
/// data fails with [`ComposeError::Render`]. Output is not HTML escaped.
pub struct TemplateComposer {
    registry: Handlebars<'static>,
}

impl TemplateComposer {
    pub fn new(subject: &str, message: &str) -> Result<Self, ComposeError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);

        for (name, source) in [(SUBJECT_TEMPLATE, subject), (MESSAGE_TEMPLATE, message)] {
            registry
                .register_template_string(name, source)
                .map_err(|e| ComposeError::InvalidTemplate {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
        }

        Ok(Self { registry })
    }

    /// Registration confirmation mail; the body expects a `ConfirmationLink` field.
    pub fn registration_confirmation() -> Result<Self, ComposeError> {
        Self::new(
            "Suricata: Registration confirmation",
            "Please confirm the registration on Suricata Talk website with click on this link {{ConfirmationLink}}",
        )
    }

    /// Passes string data through unchanged.
    pub fn verbatim() -> Result<Self, ComposeError> {
        Self::new("{{this}}", "{{this}}")
    }

    fn render(&self, name: &str, data: &Value) -> Result<String, ComposeError> {
        self.registry
            .render(name, data)
            .map_err(|e| ComposeError::Render {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}

impl MessageComposer for TemplateComposer {
    fn compose_subject(&self, data: &Value) -> Result<String, ComposeError> {
        self.render(SUBJECT_TEMPLATE, data)
    }

    fn compose_message(&self, data: &Value) -> Result<String, ComposeError> {
        self.render(MESSAGE_TEMPLATE, data)
    }
}
