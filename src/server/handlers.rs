//! Route handlers for the JSON API

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use futures::StreamExt;
use multer::Multipart;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::application::services::BACKUP_FILE_NAME;
use crate::domain::{Cell, LenientList, TreeFields};
use crate::infrastructure::di::ServiceContainer;
use crate::server::error::{ApiError, ApiResult};
use crate::server::MAX_UPLOAD_BYTES;

pub type AppState = web::Data<ServiceContainer>;

/// Form field carrying photo files on the multipart upsert.
pub const IMAGES_FIELD: &str = "images";

/// Most photos accepted by one multipart upsert.
pub const MAX_TREE_IMAGES: usize = 10;

#[derive(Debug, Deserialize)]
pub struct CreateGardenRequest {
    pub name: Option<String>,
    pub rows: Option<Value>,
    pub cols: Option<Value>,
}

/// Upsert body. `existingImages` and `harvestInfo` may also arrive as
/// JSON-encoded strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertTreeRequest {
    pub row: Option<Value>,
    pub col: Option<Value>,
    pub variety: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub existing_images: LenientList<String>,
    #[serde(default)]
    pub new_images: LenientList<String>,
    #[serde(default)]
    pub harvest_info: LenientList<Value>,
}

impl UpsertTreeRequest {
    fn into_parts(self) -> ApiResult<(Cell, TreeFields)> {
        let row = integer(self.row.as_ref()).ok_or(ApiError::InvalidCell)?;
        let col = integer(self.col.as_ref()).ok_or(ApiError::InvalidCell)?;
        let fields = TreeFields {
            variety: self.variety,
            status: self.status,
            notes: self.notes,
            existing_images: self.existing_images.into_inner(),
            new_images: self.new_images.into_inner(),
            harvest_info: self.harvest_info.into_inner(),
        };
        Ok((Cell::new(row, col), fields))
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

/// Photo part of a multipart upsert, not yet written to disk.
struct FormFile {
    name: String,
    bytes: web::Bytes,
}

/// Integer from a JSON number or a string, read the way form clients send
/// them: fractions are truncated and trailing junk after the digits is ignored.
fn integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    }
}

fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let sign = usize::from(s.starts_with(['+', '-']));
    let end = s[sign..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(s.len(), |i| i + sign);
    s[..end].parse().ok()
}

/// Collect the request body, refusing anything over [`MAX_UPLOAD_BYTES`].
async fn read_body(mut payload: web::Payload) -> ApiResult<web::Bytes> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| ApiError::BadRequest(e.to_string()))?;
        if body.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::PayloadTooLarge);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// Boundary of a `multipart/form-data` request, `None` for any other body.
fn multipart_boundary(req: &HttpRequest) -> ApiResult<Option<String>> {
    let Some(content_type) = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(None);
    };
    if !content_type
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
    {
        return Ok(None);
    }
    multer::parse_boundary(content_type)
        .map(Some)
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Split a form submission into the tree fields and its photo parts.
///
/// Text parts are read like the JSON body, so `existingImages` and
/// `harvestInfo` arrive as JSON-encoded strings.
async fn read_form(
    body: web::Bytes,
    boundary: String,
) -> ApiResult<(UpsertTreeRequest, Vec<FormFile>)> {
    let form_error = |e: multer::Error| ApiError::BadRequest(e.to_string());
    let stream = futures::stream::once(async move { Ok::<_, std::io::Error>(body) });
    let mut multipart = Multipart::new(stream, boundary);

    let mut data = Map::new();
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let key = field.name().unwrap_or_default().to_owned();
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            let value = field.text().await.map_err(form_error)?;
            data.insert(key, Value::String(value));
            continue;
        };
        if key != IMAGES_FIELD {
            return Err(ApiError::BadRequest(format!("unexpected file field {key:?}")));
        }
        let bytes = field.bytes().await.map_err(form_error)?;
        // Browsers send one empty part when no file was picked.
        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }
        if files.len() == MAX_TREE_IMAGES {
            return Err(ApiError::BadRequest(format!(
                "more than {MAX_TREE_IMAGES} images"
            )));
        }
        files.push(FormFile {
            name: file_name,
            bytes,
        });
    }

    let request = serde_json::from_value(Value::Object(data))
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok((request, files))
}

#[get("/api/gardens")]
pub async fn list_gardens(state: AppState) -> ApiResult<HttpResponse> {
    let gardens = web::block(move || state.gardens.list_gardens()).await??;
    Ok(HttpResponse::Ok().json(gardens))
}

#[post("/api/gardens")]
pub async fn create_garden(
    state: AppState,
    body: web::Json<CreateGardenRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let name = body.name.ok_or(ApiError::InvalidGarden)?;
    let rows = integer(body.rows.as_ref()).ok_or(ApiError::InvalidGarden)?;
    let cols = integer(body.cols.as_ref()).ok_or(ApiError::InvalidGarden)?;

    let garden = web::block(move || state.gardens.create_garden(&name, rows, cols)).await??;
    Ok(HttpResponse::Created().json(garden))
}

#[delete("/api/gardens/{name}")]
pub async fn delete_garden(state: AppState, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let name = path.into_inner();
    web::block(move || state.gardens.delete_garden(&name)).await??;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// Upsert one cell from a JSON body or a `multipart/form-data` submission.
///
/// Form photos are stored first and appended to `newImages` in part order.
#[post("/api/gardens/{name}/trees")]
pub async fn upsert_tree(
    state: AppState,
    req: HttpRequest,
    path: web::Path<String>,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let name = path.into_inner();
    let body = read_body(payload).await?;
    let (request, files) = match multipart_boundary(&req)? {
        Some(boundary) => read_form(body, boundary).await?,
        None => {
            let request = serde_json::from_slice::<UpsertTreeRequest>(&body)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            (request, Vec::new())
        }
    };
    let (cell, mut fields) = request.into_parts()?;
    debug!("upsert {:?} {}: {} form images", name, cell, files.len());

    let tree = web::block(move || {
        for file in files {
            let path = state.uploads.store(&file.name, &file.bytes)?;
            fields.new_images.push(path);
        }
        state.gardens.upsert_tree(&name, cell, fields)
    })
    .await??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "tree": tree })))
}

#[get("/api/gardens/{name}/grouped")]
pub async fn grouped(state: AppState, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let name = path.into_inner();
    let groups = web::block(move || state.gardens.group_by_status(&name)).await??;
    Ok(HttpResponse::Ok().json(groups))
}

#[post("/api/uploads")]
pub async fn upload(
    state: AppState,
    query: web::Query<UploadQuery>,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let filename = query
        .into_inner()
        .filename
        .ok_or_else(|| ApiError::BadRequest("missing filename".into()))?;
    let body = read_body(payload).await?;
    debug!("upload {:?}: {} bytes", filename, body.len());
    let path = web::block(move || state.uploads.store(&filename, &body)).await??;
    Ok(HttpResponse::Created().json(json!({ "path": path })))
}

#[get("/api/backup")]
pub async fn backup(state: AppState) -> ApiResult<HttpResponse> {
    let archive = web::block(move || state.backup.export_to_vec()).await??;
    Ok(HttpResponse::Ok()
        .content_type("application/zip")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(BACKUP_FILE_NAME.to_string())],
        })
        .body(archive))
}

#[get("/api/debug")]
pub async fn debug_info(state: AppState) -> ApiResult<HttpResponse> {
    let uploads_dir = state.settings.uploads_dir.display().to_string();
    let backend = state.gardens.backend();
    let stats = web::block(move || state.gardens.stats()).await??;
    Ok(HttpResponse::Ok().json(json!({
        "backend": backend,
        "gardens": stats.gardens,
        "trees": stats.trees,
        "uploadsDir": uploads_dir,
    })))
}
