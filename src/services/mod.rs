pub mod clipboard;
pub mod insert;
pub mod llm;
