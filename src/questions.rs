//! The fixed benchmark question set
//!
//! Eight questions over *Journey to the West*, chosen to exercise different
//! retrieval depths: entity lookups, multi-hop relations, corpus-wide themes,
//! and an inferential question never stated directly in the text.

/// Questions run through both retrieval engines, in benchmark order
pub const QUESTIONS: [&str; 8] = [
    // Specific / entity-level
    "Who is Sun Wukong and what are his main abilities?",
    "What is the Monkey King's weapon and where did he get it?",
    "Describe the journey to the West and its main purpose.",
    // Relational / multi-hop
    "How are Tang Sanzang, Sun Wukong, Zhu Bajie, and Sha Wujing related?",
    "What role does the Jade Emperor play in Sun Wukong's story?",
    // Thematic / global
    "What are the major themes of Journey to the West?",
    "How does the novel use Buddhist and Taoist philosophy?",
    // Inferential / graph-traversal
    "Across all of Sun Wukong's encounters and relationships, which single character or deity has the most overall influence on his behaviour and decisions throughout the novel?",
];
