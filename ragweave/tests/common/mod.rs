//! Shared fixtures: prompt markers for the embedded default prompts and a scripted model
//! that plays every role of one physics-question turn.

#![allow(dead_code)]

use ragweave::{AppConfig, MockLlm, MockToolSource};

/// Substrings that identify each embedded default prompt.
pub const HISTORY: &str = "Rewrite the question so it can be understood";
pub const INPUT_CHECK: &str = "Decide whether the following question is related";
pub const STEP_BACK: &str = "Take a step back";
pub const HYDE: &str = "Write a short passage";
pub const DECIDE: &str = "You decide whether more information must be retrieved";
pub const TOOL_CALLING: &str = "Call the tool best suited";
pub const RERANKING: &str = "Rate how relevant the passage is";
pub const OUTPUT: &str = "Answer the question using only the context";
pub const OUTPUT_CHECK: &str = "Check whether the answer is fully supported";

pub const QUESTION: &str = "What keeps the moon in orbit?";
pub const STANDALONE: &str = "What keeps the moon in orbit around the earth?";
pub const STEPPED_BACK: &str = "How does gravity act between two masses?";
pub const ANSWER: &str = "Gravity keeps the moon in orbit.";

pub const GRAVITY: &str = "Gravity pulls masses together.";
pub const APPLES: &str = "Apples fall from trees.";
pub const ORBITS: &str = "Orbits are a form of free fall.";

/// Reply of the mock `physics_retriever` tool: three passages separated by blank lines.
pub fn passages() -> String {
    [GRAVITY, APPLES, ORBITS].join("\n\n")
}

pub fn physics_tools() -> MockToolSource {
    MockToolSource::new().with_tool("physics_retriever", passages())
}

/// Model scripted for one retrieval round followed by an answer.
///
/// Reranking: GRAVITY 0.9, APPLES 0.2, ORBITS 0.6 (generic reply).
pub fn scripted_llm() -> MockLlm {
    scripted_llm_from(MockLlm::with_reply("unexpected prompt"))
}

/// Adds the scripted rules after the rules already on `base`, so `base` can override any
/// of them.
pub fn scripted_llm_from(base: MockLlm) -> MockLlm {
    base.on(HISTORY, STANDALONE)
        .on(INPUT_CHECK, "yes")
        .on(STEP_BACK, STEPPED_BACK)
        .on(format!("Passage:\n{}", GRAVITY), "0.9")
        .on(format!("Passage:\n{}", APPLES), "0.2")
        .on(RERANKING, "0.6")
        .on_sequence(DECIDE, ["retrieve", "respond"])
        .on_tool_call(
            TOOL_CALLING,
            "physics_retriever",
            serde_json::json!({ "query": "gravity and orbits" }),
        )
        .on(OUTPUT, ANSWER)
        .on(OUTPUT_CHECK, "pass")
}

/// Default config with `physics` as the only accepted topic.
pub fn physics_config() -> AppConfig {
    AppConfig {
        topics: vec!["physics".to_string()],
        ..AppConfig::default()
    }
}
