//! Prompt templates for the SQL correction call
//!
//! The system prompt pins the model to bare SQL output; the cleaning step in
//! the validator still defends against replies that ignore it.

/// System prompt for the correction request
pub const CORRECTION_SYSTEM_PROMPT: &str = "You are an AI that corrects SQL queries. \
Only return the corrected SQL query without any explanation, markdown formatting, \
or additional text.";

/// Build the user message asking for a corrected version of one query.
pub fn correction_prompt(incorrect_sql: &str) -> String {
    format!(
        "Fix this incorrect SQL query:\n{}\nOnly provide the corrected SQL query, \
         no explanations or markdown formatting.",
        incorrect_sql
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correction_prompt_embeds_query() {
        let prompt = correction_prompt("SELECT * FROM orders;");
        assert!(prompt.contains("SELECT * FROM orders;"));
        assert!(prompt.starts_with("Fix this incorrect SQL query:"));
    }
}
