//! `{name}` prompt templates.
//!
//! A template is parsed once, when the node owning it is built. `{{` and `}}` produce literal
//! braces; any other brace must open or close a placeholder. Rendering substitutes every
//! placeholder from the given variables.

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Var(String),
}

/// Parsed prompt template.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    name: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parses `text`; `name` only labels errors.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        let malformed = |detail: &str| ConfigError::Load(format!("prompt {}: {}", name, detail));
        let mut segments = Vec::new();
        let mut text_buf = String::new();
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text_buf.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text_buf.push('}');
                }
                '{' => {
                    let mut var = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) if ch.is_alphanumeric() || ch == '_' || ch == '-' => {
                                var.push(ch)
                            }
                            Some(ch) => {
                                return Err(malformed(&format!(
                                    "unexpected {:?} in placeholder",
                                    ch
                                )))
                            }
                            None => return Err(malformed("unclosed placeholder")),
                        }
                    }
                    if var.is_empty() {
                        return Err(malformed("empty placeholder"));
                    }
                    if !text_buf.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text_buf)));
                    }
                    segments.push(Segment::Var(var));
                }
                '}' => return Err(malformed("single '}' outside a placeholder")),
                c => text_buf.push(c),
            }
        }
        if !text_buf.is_empty() {
            segments.push(Segment::Text(text_buf));
        }
        Ok(Self { name, segments })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placeholder names in order of appearance (repeats included).
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Var(v) => Some(v.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Fails when the template uses a placeholder outside `allowed`.
    pub fn check_variables(&self, allowed: &[&str]) -> Result<(), ConfigError> {
        match self.placeholders().find(|p| !allowed.contains(p)) {
            Some(unknown) => Err(ConfigError::Load(format!(
                "prompt {} uses unknown placeholder {{{}}} (expected one of {:?})",
                self.name, unknown, allowed
            ))),
            None => Ok(()),
        }
    }

    /// Renders with `vars`; unused variables are ignored.
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String, ConfigError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(t) => out.push_str(t),
                Segment::Var(v) => {
                    let value = vars
                        .iter()
                        .find(|(k, _)| k == v)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| {
                            ConfigError::Load(format!(
                                "prompt {}: no value for placeholder {{{}}}",
                                self.name, v
                            ))
                        })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_placeholders_and_escaped_braces() {
        let t = PromptTemplate::parse(
            "reranking",
            "Rate {chunk} for {question}. Reply as {{\"score\": x}}.",
        )
        .unwrap();
        assert_eq!(
            t.placeholders().collect::<Vec<_>>(),
            vec!["chunk", "question"]
        );
        let out = t
            .render(&[("question", "why?"), ("chunk", "because"), ("extra", "ignored")])
            .unwrap();
        assert_eq!(out, "Rate because for why?. Reply as {\"score\": x}.");
    }

    #[test]
    fn render_fails_on_missing_value() {
        let t = PromptTemplate::parse("output", "{question} {context}").unwrap();
        let err = t.render(&[("question", "q")]).unwrap_err();
        assert!(err.to_string().contains("context"), "{}", err);
    }

    #[test]
    fn parse_rejects_malformed_templates() {
        for bad in ["{unclosed", "stray } brace", "{}", "{two words}"] {
            assert!(
                matches!(PromptTemplate::parse("p", bad), Err(ConfigError::Load(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn check_variables_flags_unknown_placeholder() {
        let t = PromptTemplate::parse("history", "{question} {histroy}").unwrap();
        assert!(t.check_variables(&["question", "history"]).is_err());
        let ok = PromptTemplate::parse("history", "{question} {history}").unwrap();
        assert!(ok.check_variables(&["question", "history"]).is_ok());
    }
}
