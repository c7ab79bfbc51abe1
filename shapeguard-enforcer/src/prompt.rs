//! Prompt construction for first and repair attempts.

use shapeguard_schema::Schema;

use crate::config::EnforcerConfig;

/// Formatting instructions appended to the caller's prompt on the first attempt.
pub const DEFAULT_INSTRUCTIONS: &str = "You MUST return a valid JSON object.\n\
Do NOT include explanations.\n\
Do NOT include markdown.\n\
Do NOT wrap the response in code blocks.\n\
Return ONLY raw JSON.";

/// Correction instructions used in repair prompts.
pub const DEFAULT_REPAIR_INSTRUCTIONS: &str = "You MUST correct the JSON.\n\
Return ONLY valid JSON.\n\
No explanations.\n\
No markdown.";

/// Violation text used when no JSON object could be found in a response.
pub const EXTRACTION_FAILURE: &str = "Could not extract valid JSON object from response.";

/// Builds prompts around a fixed schema rendering.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    schema_text: String,
    instructions: String,
    repair_instructions: String,
}

impl PromptBuilder {
    /// Render `schema` once according to `config`.
    pub fn new(schema: &Schema, config: &EnforcerConfig) -> Self {
        let schema_text = if config.pretty_schema {
            schema.to_pretty_text()
        } else {
            schema.to_text()
        };
        Self {
            schema_text,
            instructions: config
                .instructions
                .clone()
                .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string()),
            repair_instructions: config
                .repair_instructions
                .clone()
                .unwrap_or_else(|| DEFAULT_REPAIR_INSTRUCTIONS.to_string()),
        }
    }

    /// The schema text embedded in every prompt.
    pub fn schema_text(&self) -> &str {
        &self.schema_text
    }

    /// Prompt for the first attempt.
    pub fn initial(&self, prompt: &str) -> String {
        format!(
            "{prompt}\n\n{}\n\nThe JSON must match this schema exactly:\n\n{}",
            self.instructions, self.schema_text
        )
    }

    /// Prompt that follows failed attempt number `attempt`.
    pub fn repair(&self, prompt: &str, attempt: u32, previous: &str, violations: &str) -> String {
        format!(
            "{prompt}\n\n\
             Attempt {attempt} failed.\n\n\
             Your previous response did NOT match the required JSON schema.\n\n\
             Previous JSON:\n{previous}\n\n\
             Schema violations:\n{violations}\n\n\
             {}\n\n\
             Please return ONLY corrected JSON matching this schema:\n{}",
            self.repair_instructions, self.schema_text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn builder() -> PromptBuilder {
        let schema = Schema::builder().string("name", "Name", true).build();
        PromptBuilder::new(&schema, &EnforcerConfig::default())
    }

    #[test]
    fn test_initial_prompt() {
        let expected = "Extract the person\n\n\
            You MUST return a valid JSON object.\n\
            Do NOT include explanations.\n\
            Do NOT include markdown.\n\
            Do NOT wrap the response in code blocks.\n\
            Return ONLY raw JSON.\n\n\
            The JSON must match this schema exactly:\n\n\
            {\"type\":\"object\",\"properties\":{\"name\":{\"type\":\"string\",\"description\":\"Name\"}},\"required\":[\"name\"]}";
        assert_eq!(builder().initial("Extract the person"), expected);
    }

    #[test]
    fn test_repair_prompt() {
        let prompt = builder().repair("Go", 2, "{}", "Field '$.name': Missing required field");
        assert!(prompt.starts_with("Go\n\nAttempt 2 failed.\n\n"));
        assert!(prompt.contains("Previous JSON:\n{}\n\n"));
        assert!(prompt.contains("Schema violations:\nField '$.name': Missing required field\n\n"));
        assert!(prompt.contains("No markdown.\n\nPlease return ONLY corrected JSON matching this schema:\n{"));
    }

    #[test]
    fn test_overrides() {
        let schema = Schema::builder().boolean("ok", "Ok", true).build();
        let config = EnforcerConfig::new()
            .instructions("JSON only.")
            .pretty_schema(true);
        let builder = PromptBuilder::new(&schema, &config);
        assert!(builder.initial("Q").starts_with("Q\n\nJSON only.\n\n"));
        assert!(builder.schema_text().contains('\n'));
    }
}
