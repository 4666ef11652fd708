#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use async_trait::async_trait;
use bytes::Bytes;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use template_renderer::core::RenderResult;
use template_renderer::storage::StorageError;
use template_renderer::{
    DocumentConverter, ObjectStore, ServiceConfig, StorageBackend, TemplateSource,
};

pub const SERVICE_KEY: &str = "test-service-key";
pub const ROLE_KEY: &str = "test-role-key";

/// Builds `App` for the service under test, wired the same way `main` does.
macro_rules! render_app {
    ($state:expr) => {{
        let data = actix_web::web::Data::new($state);
        let json_config = data.json_config();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(data)
                .app_data(json_config)
                .configure(template_renderer::api::configure_routes),
        )
        .await
    }};
}

pub fn build_archive(members: &[(&str, &str, CompressionMethod)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents, method) in members {
        let options = SimpleFileOptions::default().compression_method(*method);
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A DOCX with one `RMGC1` occurrence. The body is stored uncompressed so
/// the converted payload can be inspected as text.
pub fn docx_with_one_token() -> Vec<u8> {
    build_archive(&[
        ("[Content_Types].xml", "<Types/>", CompressionMethod::Deflated),
        (
            "word/document.xml",
            "<w:document><w:body><w:p><w:r><w:t>Hello RMGC1</w:t></w:r></w:p></w:body></w:document>",
            CompressionMethod::Stored,
        ),
        ("word/header1.xml", "<w:hdr>Invoice</w:hdr>", CompressionMethod::Deflated),
    ])
}

pub fn spreadsheet() -> Vec<u8> {
    build_archive(&[
        ("[Content_Types].xml", "<Types/>", CompressionMethod::Deflated),
        ("xl/workbook.xml", "<workbook>RMGC1</workbook>", CompressionMethod::Deflated),
    ])
}

pub fn pdf_of_len(len: usize) -> Vec<u8> {
    let mut pdf = b"%PDF-1.7\n".to_vec();
    pdf.resize(len, b' ');
    pdf
}

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub path: String,
    pub content_type: String,
    pub upsert: String,
    pub authorization: String,
    pub if_none_match: String,
    pub size: usize,
}

/// Stand-in for the template host, Gotenberg and Supabase Storage, served on
/// a real loopback port so the production HTTP clients are exercised.
#[derive(Clone)]
pub struct Upstream {
    pub template: Option<Vec<u8>>,
    pub convert_status: u16,
    pub pdf: Vec<u8>,
    pub upload_status: u16,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub conversions: Arc<Mutex<Vec<Vec<u8>>>>,
    pub uploads: Arc<Mutex<Vec<RecordedUpload>>>,
}

impl Default for Upstream {
    fn default() -> Self {
        Upstream {
            template: Some(docx_with_one_token()),
            convert_status: 200,
            pdf: pdf_of_len(60_000),
            upload_status: 200,
            calls: Arc::default(),
            conversions: Arc::default(),
            uploads: Arc::default(),
        }
    }
}

impl Upstream {
    /// Starts serving and returns the base URL.
    pub fn spawn(&self) -> String {
        let data = web::Data::new(self.clone());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .app_data(web::PayloadConfig::new(4 * 1024 * 1024))
                .route("/templates/{name}", web::get().to(serve_template))
                .route("/forms/libreoffice/convert", web::post().to(convert))
                .route("/storage/v1/object/{bucket}/{path:.*}", web::post().to(upload))
                .route("/{bucket}/{key:.*}", web::put().to(s3_put))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }

    pub fn config(&self, base_url: &str) -> ServiceConfig {
        ServiceConfig::builder()
            .service_key(SERVICE_KEY)
            .gotenberg_url(base_url)
            .storage(StorageBackend::Supabase {
                url: base_url.to_string(),
                service_key: ROLE_KEY.to_string(),
            })
            .build()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn header(req: &HttpRequest, name: &str) -> String {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn serve_template(upstream: web::Data<Upstream>, req: HttpRequest) -> HttpResponse {
    upstream.record(format!("fetch {}", req.path()));
    match &upstream.template {
        Some(bytes) => HttpResponse::Ok()
            .content_type("application/octet-stream")
            .body(bytes.clone()),
        None => HttpResponse::NotFound().body("no such template"),
    }
}

async fn convert(upstream: web::Data<Upstream>, body: web::Bytes) -> HttpResponse {
    upstream.record("convert".to_string());
    upstream.conversions.lock().unwrap().push(body.to_vec());

    if upstream.convert_status != 200 {
        let status = StatusCode::from_u16(upstream.convert_status).unwrap();
        return HttpResponse::build(status).body("LibreOffice conversion failed");
    }
    HttpResponse::Ok()
        .content_type("application/pdf")
        .body(upstream.pdf.clone())
}

async fn upload(
    upstream: web::Data<Upstream>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> HttpResponse {
    let (bucket, object) = path.into_inner();
    upstream.record(format!("upload {}/{}", bucket, object));
    upstream.uploads.lock().unwrap().push(RecordedUpload {
        path: format!("{}/{}", bucket, object),
        content_type: header(&req, "content-type"),
        upsert: header(&req, "x-upsert"),
        authorization: header(&req, "authorization"),
        if_none_match: header(&req, "if-none-match"),
        size: body.len(),
    });

    if upstream.upload_status != 200 {
        let status = StatusCode::from_u16(upstream.upload_status).unwrap();
        return HttpResponse::build(status)
            .json(serde_json::json!({"statusCode": "409", "error": "Duplicate"}));
    }
    HttpResponse::Ok().json(serde_json::json!({"Key": format!("{}/{}", bucket, object)}))
}

/// Path-style S3 `PutObject`.
async fn s3_put(
    upstream: web::Data<Upstream>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Bytes,
) -> HttpResponse {
    let (bucket, key) = path.into_inner();
    upstream.record(format!("upload {}/{}", bucket, key));
    upstream.uploads.lock().unwrap().push(RecordedUpload {
        path: format!("{}/{}", bucket, key),
        content_type: header(&req, "content-type"),
        upsert: header(&req, "x-upsert"),
        authorization: header(&req, "authorization"),
        if_none_match: header(&req, "if-none-match"),
        size: body.len(),
    });

    if upstream.upload_status != 200 {
        let status = StatusCode::from_u16(upstream.upload_status).unwrap();
        return HttpResponse::build(status)
            .content_type("application/xml")
            .body(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Error><Code>PreconditionFailed</Code>\
                 <Message>At least one of the pre-conditions you specified did not hold</Message></Error>",
            );
    }
    HttpResponse::Ok()
        .insert_header(("etag", "\"d41d8cd98f00b204e9800998ecf8427e\""))
        .finish()
}

/// An S3 client aimed at `base_url` with static credentials, so no
/// credential chain is consulted.
pub fn s3_client(base_url: &str) -> aws_sdk_s3::Client {
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("test-access", "test-secret", None, None, "tests"))
        .endpoint_url(base_url)
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(config)
}

pub struct StaticSource(pub Vec<u8>);

#[async_trait]
impl TemplateSource for StaticSource {
    async fn fetch(&self, _url: &str) -> RenderResult<Bytes> {
        Ok(Bytes::from(self.0.clone()))
    }
}

pub struct PanickingConverter;

#[async_trait]
impl DocumentConverter for PanickingConverter {
    async fn convert(&self, _document: Vec<u8>) -> RenderResult<Bytes> {
        panic!("converter blew up")
    }
}

pub struct DiscardStore;

#[async_trait]
impl ObjectStore for DiscardStore {
    async fn put_new(
        &self,
        _bucket: &str,
        _path: &str,
        _data: Bytes,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        Ok(())
    }
}
