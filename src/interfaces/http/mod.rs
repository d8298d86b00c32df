use crate::application::use_cases::course_materializer::CommitMode;
use crate::application::use_cases::enhancement::EnhancementUseCase;
use crate::application::use_cases::import_session::{FileOutcome, ImportFile, ImportSession};
use crate::application::use_cases::import_validation::ImportValidationUseCase;
use crate::domain::llm_config::LLMConfig;
use crate::domain::preview::{CourseImportPreview, ImportValidationResult};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::course_api::HttpCourseStore;
use crate::infrastructure::document_upload::DocumentUploadClient;
use crate::infrastructure::llm_clients;

use actix_cors::Cors;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub config: AppConfig,
    pub enhancement: EnhancementUseCase,
    pub course_store: HttpCourseStore,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseFilePayload {
    pub file_name: String,
    pub content_base64: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    #[serde(default)]
    pub files: Vec<ParseFilePayload>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub previews: Vec<CourseImportPreview>,
    pub outcomes: Vec<FileOutcome>,
    pub validation: ImportValidationResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub previews: Vec<CourseImportPreview>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDiagnostics {
    pub errors: Vec<String>,
    pub notifications: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub previews: Vec<CourseImportPreview>,
    pub diagnostics: Vec<RecordDiagnostics>,
    pub validation: ImportValidationResult,
    pub validation_info: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    #[serde(default)]
    pub config: Option<LLMConfig>,
    pub preview: CourseImportPreview,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub topic: String,
    pub file_name: String,
    #[serde(default = "default_upload_content_type")]
    pub content_type: String,
    pub content_base64: String,
    #[serde(default)]
    pub previews: Vec<CourseImportPreview>,
}

fn default_upload_content_type() -> String {
    "application/octet-stream".to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub document: crate::domain::preview::UploadedDocument,
    pub matched: usize,
    pub previews: Vec<CourseImportPreview>,
    pub validation: ImportValidationResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub previews: Vec<CourseImportPreview>,
    pub mode: CommitMode,
    #[serde(default)]
    pub course_name: Option<String>,
}

#[post("/import/parse")]
async fn parse_import(data: web::Data<HttpState>, req: web::Json<ParseRequest>) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "ImportApi",
        &format!(
            "Parsing import batch ({} file(s), pasted text: {})",
            req.files.len(),
            req.text.is_some()
        ),
    );

    let mut session = ImportSession::new();

    let mut files = Vec::new();
    for payload in &req.files {
        match BASE64.decode(&payload.content_base64) {
            Ok(content) => files.push(ImportFile {
                file_name: payload.file_name.clone(),
                content,
            }),
            Err(e) => {
                add_log(
                    &data.logs,
                    "ERROR",
                    "ImportApi",
                    &format!("Invalid base64 for {}: {}", payload.file_name, e),
                );
                return HttpResponse::BadRequest()
                    .body(format!("Invalid base64 content for {}", payload.file_name));
            }
        }
    }
    session.ingest_files(&files);

    if let Some(text) = req.text.as_deref() {
        if let Err(e) = session.ingest_text(text) {
            add_log(
                &data.logs,
                "ERROR",
                "ImportApi",
                &format!("Pasted text parse failed: {}", e),
            );
            return HttpResponse::BadRequest().body(e.to_string());
        }
    }

    let response = ParseResponse {
        previews: session.previews().to_vec(),
        outcomes: session.outcomes().to_vec(),
        validation: session.validation(),
    };
    HttpResponse::Ok().json(response)
}

#[post("/import/validate")]
async fn validate_import(
    data: web::Data<HttpState>,
    req: web::Json<ValidateRequest>,
) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "ImportApi",
        &format!("Revalidating {} preview(s)", req.previews.len()),
    );

    let mut previews = req.previews.clone();
    let mut diagnostics = Vec::with_capacity(previews.len());
    for preview in &mut previews {
        preview.dedup_arrays();
        let result = ImportValidationUseCase::apply(preview);
        diagnostics.push(RecordDiagnostics {
            errors: result.errors,
            notifications: result.notifications,
        });
    }

    let validation = ImportValidationUseCase::summarize(&previews);
    let validation_info = crate::application::use_cases::import_validation::validation_info();

    HttpResponse::Ok().json(ValidateResponse {
        previews,
        diagnostics,
        validation,
        validation_info,
    })
}

#[post("/import/enhance")]
async fn enhance_import(
    data: web::Data<HttpState>,
    req: web::Json<EnhanceRequest>,
) -> impl Responder {
    let config = req.config.clone().unwrap_or_else(|| data.config.llm.clone());
    add_log(
        &data.logs,
        "INFO",
        "ImportApi",
        &format!(
            "Enhancing preview '{}' (provider={:?} base_url={})",
            req.preview.topic, config.provider, config.base_url
        ),
    );

    // Enhancement failures are absorbed inside the use case; the caller
    // always gets a preview back.
    let enriched = data.enhancement.enhance(&config, &req.preview).await;
    HttpResponse::Ok().json(enriched)
}

#[post("/import/upload")]
async fn upload_document(data: web::Data<HttpState>, req: web::Json<UploadRequest>) -> impl Responder {
    let Some(endpoint) = data.config.upload_api_url.clone() else {
        add_log(
            &data.logs,
            "ERROR",
            "ImportApi",
            "Document upload requested but no upload endpoint is configured",
        );
        return HttpResponse::BadRequest().body("Document upload is not configured");
    };

    let bytes = match BASE64.decode(&req.content_base64) {
        Ok(bytes) => bytes,
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "ImportApi",
                &format!("Invalid base64 for {}: {}", req.file_name, e),
            );
            return HttpResponse::BadRequest()
                .body(format!("Invalid base64 content for {}", req.file_name));
        }
    };

    add_log(
        &data.logs,
        "INFO",
        "ImportApi",
        &format!(
            "Uploading document {} for topic '{}' ({} bytes)",
            req.file_name,
            req.topic,
            bytes.len()
        ),
    );

    let client = DocumentUploadClient::new(endpoint);
    match client
        .upload(&req.topic, &req.file_name, &req.content_type, bytes)
        .await
    {
        Ok(document) => {
            let mut session = ImportSession::from_previews(req.previews.clone());
            let matched = session.attach_document(&req.topic, document.clone());
            HttpResponse::Ok().json(UploadResponse {
                document,
                matched,
                previews: session.previews().to_vec(),
                validation: session.validation(),
            })
        }
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "ImportApi",
                &format!("Document upload failed: {}", e),
            );
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

#[post("/import/commit")]
async fn commit_import(data: web::Data<HttpState>, req: web::Json<CommitRequest>) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "ImportApi",
        &format!(
            "Committing {} preview(s) (mode={:?})",
            req.previews.len(),
            req.mode
        ),
    );

    // Previews arrive as edited on the client; the session revalidates them
    // and owns the all-or-nothing commit.
    let session = ImportSession::from_previews(req.previews.clone());
    match session
        .commit(req.mode, req.course_name.as_deref(), &data.course_store)
        .await
    {
        Ok(response) => HttpResponse::Ok().json(serde_json::json!({
            "success": response.success,
            "createdCount": response.created_count,
            "failedCount": response.failed_count,
            "courseIds": response.course_ids,
        })),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "ImportApi",
                &format!("Commit failed: {}", e),
            );
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap();
    HttpResponse::Ok().json(&*logs)
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap();
    logs.push(entry.clone());
    if logs.len() > 100 {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

pub fn start_server(config: AppConfig, logs: Arc<Mutex<Vec<LogEntry>>>) -> std::io::Result<Server> {
    let bind_addr = (config.host.clone(), config.port);
    let state = web::Data::new(HttpState {
        enhancement: EnhancementUseCase::new(Arc::new(llm_clients::default_client())),
        course_store: HttpCourseStore::new(config.course_api_url.clone()),
        config,
        logs,
    });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new().wrap(cors).app_data(state.clone()).service(
            web::scope("/api")
                .service(parse_import)
                .service(validate_import)
                .service(enhance_import)
                .service(upload_document)
                .service(commit_import)
                .service(get_logs),
        )
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
