//! Built-in echo template.
//!
//! Returns its input, optionally prefixed and upper-cased. It is the template
//! the daemon falls back to when no manifest is configured and the fixture
//! most tests build agents from.

use crate::agent::domain::AgentSpec;
use crate::template::{
    domain::{ConfigValidation, DEFAULT_FRAMEWORK_TAG, TemplateMetadata},
    ports::{AgentInstance, AgentTemplate, TemplateError, TemplateResult},
};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Constructor name of the echo template in the default library.
pub const ECHO_CONSTRUCTOR: &str = "echo";

const KNOWN_KEYS: [&str; 2] = ["prefix", "uppercase"];

/// Template whose instances echo their input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoTemplate {
    template_id: String,
    name: String,
    version: String,
    framework: String,
}

impl EchoTemplate {
    /// Creates an echo template with a custom identity.
    #[must_use]
    pub fn new(template_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            name: "Echo Agent".to_owned(),
            version: version.into(),
            framework: DEFAULT_FRAMEWORK_TAG.to_owned(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the framework tag.
    #[must_use]
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = framework.into();
        self
    }
}

impl Default for EchoTemplate {
    fn default() -> Self {
        Self::new("echo", "1.0.0")
    }
}

#[async_trait]
impl AgentTemplate for EchoTemplate {
    fn template_id(&self) -> &str {
        &self.template_id
    }

    fn template_name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn framework_tag(&self) -> &str {
        &self.framework
    }

    fn metadata(&self) -> TemplateMetadata {
        TemplateMetadata {
            name: self.name.clone(),
            template_id: self.template_id.clone(),
            version: self.version.clone(),
            description: "Echoes its input back, optionally prefixed".to_owned(),
            config_schema: json!({
                "type": "object",
                "properties": {
                    "prefix": {"type": "string"},
                    "uppercase": {"type": "boolean"}
                },
                "additionalProperties": false
            }),
            runtime_requirements: json!({"model": null, "tools": []}),
        }
    }

    fn validate_config(&self, config: &Value) -> ConfigValidation {
        let mut validation = ConfigValidation::ok();
        let fields = match config {
            Value::Null => return validation,
            Value::Object(fields) => fields,
            _ => {
                validation.push_error("configuration must be a JSON object");
                return validation;
            }
        };

        if fields.get("prefix").is_some_and(|v| !v.is_string()) {
            validation.push_error("'prefix' must be a string");
        }
        if fields.get("uppercase").is_some_and(|v| !v.is_boolean()) {
            validation.push_error("'uppercase' must be a boolean");
        }
        for key in fields.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                validation.push_warning(format!("unknown configuration key '{key}'"));
            }
        }
        validation
    }

    async fn create_instance(&self, spec: &AgentSpec) -> TemplateResult<Box<dyn AgentInstance>> {
        let config = spec.config();
        let prefix = match config.get("prefix") {
            None => String::new(),
            Some(Value::String(prefix)) => prefix.clone(),
            Some(_) => {
                return Err(TemplateError::InvalidConfig(
                    "'prefix' must be a string".to_owned(),
                ));
            }
        };
        let uppercase = config
            .get("uppercase")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Box::new(EchoAgent { prefix, uppercase }))
    }
}

/// Instance built by [`EchoTemplate`].
#[derive(Debug)]
struct EchoAgent {
    prefix: String,
    uppercase: bool,
}

#[async_trait]
impl AgentInstance for EchoAgent {
    async fn execute(&self, input: Value) -> TemplateResult<Value> {
        let text = match &input {
            Value::String(text) => text.clone(),
            Value::Object(fields) => fields
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| {
                    TemplateError::Execution("input object must carry a 'message' string".to_owned())
                })?,
            other => other.to_string(),
        };

        let mut output = format!("{}{text}", self.prefix);
        if self.uppercase {
            output = output.to_uppercase();
        }
        Ok(json!({"output": output}))
    }
}
