//! Structured tool descriptions with usage guidance.
//!
//! `ToolSpec` turns a purpose, usage guidance, parameter schema, and examples
//! into the single description string the chat API accepts.

use crate::ToolDef;

/// A structured tool specification.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Tool name (must be unique within a ToolSet).
    pub name: String,
    /// One-sentence purpose: "Search products by name or category".
    pub purpose: String,
    pub when_to_use: Option<String>,
    /// Steers the model away from a similar tool.
    pub when_not_to_use: Option<String>,
    pub parameters: serde_json::Value,
    /// (question, call) pairs.
    pub examples: Vec<UsageExample>,
    pub output_format: String,
}

/// A usage example for a tool.
#[derive(Debug, Clone)]
pub struct UsageExample {
    /// The user's question.
    pub input: String,
    /// How the tool should be called for it.
    pub output: String,
}

impl ToolSpec {
    /// Start a spec; the purpose is the only required text.
    pub fn builder(name: impl Into<String>, purpose: impl Into<String>) -> ToolSpecBuilder {
        ToolSpecBuilder {
            spec: ToolSpec {
                name: name.into(),
                purpose: purpose.into(),
                when_to_use: None,
                when_not_to_use: None,
                parameters: serde_json::json!({"type": "object", "properties": {}}),
                examples: Vec::new(),
                output_format: "JSON".into(),
            },
        }
    }

    /// Rich description string for the model.
    pub fn to_description(&self) -> String {
        let mut desc = format!("{}.", self.purpose.trim_end_matches('.'));
        if let Some(when) = &self.when_to_use {
            desc.push_str(&format!("\nWhen to use: {when}"));
        }
        if let Some(when_not) = &self.when_not_to_use {
            desc.push_str(&format!("\nWhen NOT to use: {when_not}"));
        }
        if !self.examples.is_empty() {
            desc.push_str("\nExamples:");
            for ex in &self.examples {
                desc.push_str(&format!("\n  - \"{}\" → {}", ex.input, ex.output));
            }
        }
        desc.push_str(&format!("\nOutput format: {}", self.output_format));
        desc
    }

    pub fn to_tool_def(&self) -> ToolDef {
        ToolDef::new(
            self.name.clone(),
            self.to_description(),
            self.parameters.clone(),
        )
    }
}

/// Builder for [`ToolSpec`].
#[derive(Debug, Clone)]
pub struct ToolSpecBuilder {
    spec: ToolSpec,
}

impl ToolSpecBuilder {
    pub fn when_to_use(mut self, when: impl Into<String>) -> Self {
        self.spec.when_to_use = Some(when.into());
        self
    }

    pub fn when_not_to_use(mut self, when_not: impl Into<String>) -> Self {
        self.spec.when_not_to_use = Some(when_not.into());
        self
    }

    pub fn parameters(mut self, params: serde_json::Value) -> Self {
        self.spec.parameters = params;
        self
    }

    /// Derive JSON Schema parameters from a type implementing `schemars::JsonSchema`.
    pub fn parameters_for<T: schemars::JsonSchema>(self) -> Self {
        self.parameters(crate::json_schema_for::<T>())
    }

    pub fn example(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.spec.examples.push(UsageExample {
            input: input.into(),
            output: output.into(),
        });
        self
    }

    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.spec.output_format = format.into();
        self
    }

    pub fn build(self) -> ToolSpec {
        self.spec
    }

    /// Shortcut for `.build().to_tool_def()`.
    pub fn to_tool_def(self) -> ToolDef {
        self.spec.to_tool_def()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_includes_guidance_and_examples() {
        let spec = ToolSpec::builder("get_product_price", "Look up the current price of a product")
            .when_to_use("The user asks what something costs now")
            .when_not_to_use("The user asks how a price moved; use analyze_price_trends")
            .example("How much is lime?", r#"{"product_name": "lime"}"#)
            .build();

        let desc = spec.to_description();
        assert!(desc.starts_with("Look up the current price of a product."));
        assert!(desc.contains("When NOT to use:"));
        assert!(desc.contains("analyze_price_trends"));
        assert!(desc.contains("How much is lime?"));
        assert!(desc.ends_with("Output format: JSON"));
    }

    #[test]
    fn minimal_spec_has_empty_object_schema() {
        let def = ToolSpec::builder("list_all_vendors", "List every vendor").to_tool_def();
        assert_eq!(def.function.name, "list_all_vendors");
        assert_eq!(def.function.parameters["type"], "object");
        assert!(!def.function.description.contains("When to use"));
    }
}
