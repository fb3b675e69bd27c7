//! Minijinja template rendering for waste notifications.
//!
//! Every classification variant has a subject and a body template,
//! registered as `{key}_subject` / `{key}_body` where `key` comes from
//! [`Variant::template_key`]. Amounts are pre-formatted strings so the
//! templates never deal with decimal arithmetic.

use serde::Serialize;
use wastewatch_core::Variant;

use crate::traits::NotifyError;

const EXCEEDED_SUBJECT: &str = "⚠️ Waste Management Alert - Threshold Exceeded";

const EXCEEDED_BODY: &str = "Dear {{ display_name }},\n\n\
Your total food waste for {{ period_label }} is {{ total_waste }}, which exceeds the allowed threshold of {{ threshold }}.\n\
Please manage your food portions more responsibly.\n\n\
Your fine amount will be ₹{{ fine_amount }}/-\n\n\
Thank you.";

const WITHIN_LIMIT_SUBJECT: &str = "✅ Waste Management Notice - Within Limit";

const WITHIN_LIMIT_BODY: &str = "Dear {{ display_name }},\n\n\
Your total food waste for {{ period_label }} is {{ total_waste }}, which is within the allowed threshold of {{ threshold }}.\n\n\
However, a default fine of ₹{{ fine_amount }}/- will still be considered as per hostel policy.\n\n\
Thank you.";

/// (name, source) pairs registered on every renderer.
const TEMPLATES: &[(&str, &str)] = &[
    ("exceeded_subject", EXCEEDED_SUBJECT),
    ("exceeded_body", EXCEEDED_BODY),
    ("within_limit_subject", WITHIN_LIMIT_SUBJECT),
    ("within_limit_body", WITHIN_LIMIT_BODY),
];

/// Values interpolated into the notification templates.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationContext {
    pub display_name: String,
    pub period_label: String,
    pub total_waste: String,
    pub threshold: String,
    pub fine_amount: String,
    pub variant: Variant,
}

/// A rendered subject/body pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

/// Renders notification templates using minijinja.
///
/// Templates are parsed once, when the renderer is built.
#[derive(Debug)]
pub struct TemplateRenderer {
    env: minijinja::Environment<'static>,
}

impl TemplateRenderer {
    /// Create a renderer with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if a built-in template fails to parse.
    pub fn new() -> Result<Self, NotifyError> {
        let mut env = minijinja::Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| NotifyError::Template(format!("{name}: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Render the subject and body for a variant.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] if the variant has no template pair
    /// or rendering fails.
    pub fn render(&self, ctx: &NotificationContext) -> Result<RenderedMessage, NotifyError> {
        let key = ctx.variant.template_key();
        Ok(RenderedMessage {
            subject: self.render_named(&format!("{key}_subject"), ctx)?,
            body: self.render_named(&format!("{key}_body"), ctx)?,
        })
    }

    fn render_named(&self, name: &str, ctx: &NotificationContext) -> Result<String, NotifyError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| NotifyError::Template(e.to_string()))?;
        template
            .render(ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_context(variant: Variant) -> NotificationContext {
        NotificationContext {
            display_name: "Asha".to_string(),
            period_label: "March".to_string(),
            total_waste: "1000.00".to_string(),
            threshold: "500".to_string(),
            fine_amount: "1250.00".to_string(),
            variant,
        }
    }

    #[test]
    fn builtin_templates_parse() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn render_exceeded() {
        let renderer = TemplateRenderer::new().unwrap();
        let msg = renderer.render(&sample_context(Variant::Exceeded)).unwrap();
        assert_eq!(msg.subject, "⚠️ Waste Management Alert - Threshold Exceeded");
        assert!(msg.body.starts_with("Dear Asha,\n\n"));
        assert!(msg.body.contains("for March is 1000.00, which exceeds the allowed threshold of 500."));
        assert!(msg.body.contains("Your fine amount will be ₹1250.00/-"));
    }

    #[test]
    fn render_within_limit() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut ctx = sample_context(Variant::WithinLimit);
        ctx.total_waste = "300.00".to_string();
        ctx.fine_amount = "3000.00".to_string();
        let msg = renderer.render(&ctx).unwrap();
        assert_eq!(msg.subject, "✅ Waste Management Notice - Within Limit");
        assert!(msg.body.contains("300.00, which is within the allowed threshold of 500."));
        assert!(msg.body.contains("default fine of ₹3000.00/-"));
    }

    #[test]
    fn names_are_not_html_escaped() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut ctx = sample_context(Variant::Exceeded);
        ctx.display_name = "O'Brien & Co".to_string();
        let msg = renderer.render(&ctx).unwrap();
        assert!(msg.body.starts_with("Dear O'Brien & Co,"));
    }
}
