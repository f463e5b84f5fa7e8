//! OpenAPI documentation, served at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::OpenApi;

use crate::handlers;
use crate::ErrorResponse;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mediadrop API",
        version = "0.1.0",
        description = "Upload images and videos to a media host, extract video frames, and render line and rectangle drawings to JPEG."
    ),
    paths(
        handlers::upload::upload_media,
        handlers::frames::extract_frames,
        handlers::draw::draw_lines,
        handlers::draw::draw_rect,
    ),
    components(schemas(
        handlers::upload::UploadResponse,
        handlers::frames::FramesResponse,
        ErrorResponse,
    )),
    tags(
        (name = "media", description = "Uploads and frame extraction"),
        (name = "draw", description = "Server-side rasterized drawings"),
    )
)]
pub struct ApiDoc;
