pub mod course_materializer;
pub mod enhancement;
pub mod field_normalizer;
pub mod import_ingestion;
pub mod import_session;
pub mod import_validation;
pub mod link_extractor;
