/// Parse a `"<provider>:<model>"` spec. A colon splits provider from model;
/// at most the first colon is significant. No colon means an empty provider
/// (the caller substitutes its default provider).
///
/// ```
/// use skylark_llm::parse_model_spec;
/// assert_eq!(parse_model_spec("gpt-4"), ("".to_string(), "gpt-4".to_string()));
/// assert_eq!(parse_model_spec("openai:gpt-4"), ("openai".to_string(), "gpt-4".to_string()));
/// assert_eq!(parse_model_spec(":gpt-4"), ("".to_string(), "gpt-4".to_string()));
/// assert_eq!(parse_model_spec("openai:"), ("openai".to_string(), "".to_string()));
/// ```
pub fn parse_model_spec(spec: &str) -> (String, String) {
    match spec.split_once(':') {
        Some((provider, model)) => (provider.to_string(), model.to_string()),
        None => (String::new(), spec.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_and_model_from_colon_spec() {
        assert_eq!(parse_model_spec("gpt-4"), ("".to_string(), "gpt-4".to_string()));
        assert_eq!(
            parse_model_spec("openai:gpt-4"),
            ("openai".to_string(), "gpt-4".to_string())
        );
        assert_eq!(parse_model_spec(":gpt-4"), ("".to_string(), "gpt-4".to_string()));
        assert_eq!(parse_model_spec("openai:"), ("openai".to_string(), "".to_string()));
    }

    #[test]
    fn only_first_colon_is_significant() {
        assert_eq!(
            parse_model_spec("openai:gpt-4:turbo"),
            ("openai".to_string(), "gpt-4:turbo".to_string())
        );
    }
}
