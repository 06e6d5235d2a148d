#[cfg(test)]
mod tests {
    use super::super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_target_local_services() {
        let c = Config::default();
        assert_eq!(c.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(c.llm.backend, LlmBackendKind::Ollama);
        assert_eq!(c.llm.model, "deepseek-r1:1.5b");
        assert_eq!(c.arxiv.api_url, "http://export.arxiv.org/api/query");
        assert_eq!(c.server.bind, "0.0.0.0:8000");
        assert_eq!(c.qa.max_content_chars, 8000);
    }

    #[test]
    fn test_env_overrides_win() {
        let mut c = Config::default();
        c.apply_env(env(&[
            ("NEO4J_URI", "neo4j+s://example.databases.neo4j.io"),
            ("NEO4J_PASSWORD", "s3cret"),
            ("LLM_MODEL", "llama3:8b"),
            ("LLM_BACKEND", "openai_compatible"),
            ("LLM_TIMEOUT_SECS", "45"),
            ("PDF_FETCH_DELAY_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(c.neo4j.uri, "neo4j+s://example.databases.neo4j.io");
        assert_eq!(c.neo4j.password, "s3cret");
        assert_eq!(c.llm.model, "llama3:8b");
        assert_eq!(c.llm.backend, LlmBackendKind::OpenAiCompatible);
        assert_eq!(c.llm.timeout_secs, 45);
        assert_eq!(c.arxiv.pdf_fetch_delay_ms, 0);
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut c = Config::default();
        c.apply_env(env(&[("LLM_MODEL", "  "), ("LLM_API_KEY", "")])).unwrap();
        assert_eq!(c.llm.model, "deepseek-r1:1.5b");
        assert_eq!(c.llm.api_key, None);
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        let mut c = Config::default();
        let err = c.apply_env(env(&[("LLM_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LLM_TIMEOUT_SECS", .. }));
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let mut c = Config::default();
        let err = c.apply_env(env(&[("LLM_BACKEND", "carrier-pigeon")])).unwrap_err();
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let c = Config::from_toml_str(
            r#"
            [llm]
            model = "qwen2.5:7b"

            [arxiv]
            pdf_fetch_delay_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(c.llm.model, "qwen2.5:7b");
        assert_eq!(c.llm.base_url, "http://localhost:11434");
        assert_eq!(c.arxiv.pdf_fetch_delay_ms, 250);
        assert_eq!(c.arxiv.request_timeout_secs, 30);
        assert_eq!(c.neo4j.username, "neo4j");
    }
}
