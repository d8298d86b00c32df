pub mod course;
pub mod error;
pub mod llm_config;
pub mod preview;
pub mod raw_record;
