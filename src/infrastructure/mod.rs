pub mod config;
pub mod course_api;
pub mod document_upload;
pub mod llm_clients;
pub mod response;
