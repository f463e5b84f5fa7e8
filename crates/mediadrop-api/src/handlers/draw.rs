//! Canvas drawing endpoints: up to two lines, or one filled rectangle, rendered to JPEG.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use mediadrop_core::constants::{
    DEFAULT_BACKGROUND, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_STROKE,
};
use mediadrop_core::AppError;
use mediadrop_processing::{parse_color, Canvas, Point, COORDINATE_LIMIT};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::HttpAppError;
use crate::state::{AppState, DrawState};
use crate::ErrorResponse;

/// Query values are kept as raw strings so malformed numbers produce our own error body.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DrawLinesQuery {
    /// Canvas width in pixels (default 256)
    pub width: Option<String>,
    /// Canvas height in pixels (default 256)
    pub height: Option<String>,
    /// Background color, `#rrggbb[aa]` (default white)
    pub background: Option<String>,
    /// Stroke color, `#rrggbb[aa]` (default black)
    pub color: Option<String>,
    pub x1: Option<String>,
    pub y1: Option<String>,
    pub x2: Option<String>,
    pub y2: Option<String>,
    pub x3: Option<String>,
    pub y3: Option<String>,
    pub x4: Option<String>,
    pub y4: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DrawRectQuery {
    pub width: Option<String>,
    pub height: Option<String>,
    pub background: Option<String>,
    /// Fill color (default black)
    pub color: Option<String>,
    /// Left edge, may be negative (default 0)
    pub x: Option<String>,
    /// Top edge, may be negative (default 0)
    pub y: Option<String>,
    /// Rectangle width in pixels (required)
    pub w: Option<String>,
    /// Rectangle height in pixels (required)
    pub h: Option<String>,
}

fn parse_dimension(name: &str, raw: Option<&str>, default: u32) -> Result<u32, AppError> {
    match raw.map(str::trim) {
        None => Ok(default),
        Some(value) => value.parse::<u32>().map_err(|_| {
            AppError::InvalidInput(format!("{} must be a non-negative integer, got '{}'", name, value))
        }),
    }
}

fn parse_number(name: &str, raw: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::InvalidInput(format!("{} must be a number, got '{}'", name, raw)))
}

fn parse_color_param(name: &str, raw: Option<&str>, default: &str) -> Result<u32, AppError> {
    parse_color(raw.unwrap_or(default))
        .map_err(|e| AppError::InvalidInput(format!("{}: {}", name, e)))
}

fn parse_point(names: (&str, &str), values: (&str, &str)) -> Result<Point, HttpAppError> {
    let x = parse_number(names.0, values.0)?;
    let y = parse_number(names.1, values.1)?;
    Point::new(x, y).map_err(|e| {
        HttpAppError(AppError::InvalidCoordinate(format!(
            "({}, {}): {}",
            names.0, names.1, e
        )))
    })
}

/// `Ok(None)` when none of the four values is present; all four are required otherwise.
fn parse_line(
    names: [&str; 4],
    values: [Option<&String>; 4],
) -> Result<Option<(Point, Point)>, HttpAppError> {
    match values {
        [None, None, None, None] => Ok(None),
        [Some(x0), Some(y0), Some(x1), Some(y1)] => {
            let from = parse_point((names[0], names[1]), (x0, y0))?;
            let to = parse_point((names[2], names[3]), (x1, y1))?;
            Ok(Some((from, to)))
        }
        _ => Err(HttpAppError(AppError::InvalidInput(format!(
            "A line needs all of {}",
            names.join(", ")
        )))),
    }
}

/// Integer pixel offset for a rectangle edge, within the same range as line coordinates.
fn parse_offset(name: &str, raw: Option<&str>) -> Result<i32, AppError> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    let value = parse_number(name, raw)?;
    if !value.is_finite() {
        return Err(AppError::InvalidCoordinate(format!("{} must be finite", name)));
    }
    if value.abs() > COORDINATE_LIMIT {
        return Err(AppError::InvalidCoordinate(format!(
            "{}={} is outside the supported range ±{}",
            name, value, COORDINATE_LIMIT
        )));
    }
    Ok(value.round() as i32)
}

fn canvas(
    limits: DrawState,
    width: Option<&str>,
    height: Option<&str>,
    background: Option<&str>,
) -> Result<Canvas, HttpAppError> {
    let width = parse_dimension("width", width, DEFAULT_CANVAS_WIDTH)?;
    let height = parse_dimension("height", height, DEFAULT_CANVAS_HEIGHT)?;
    let background = parse_color_param("background", background, DEFAULT_BACKGROUND)?;
    Ok(Canvas::bounded(width, height, background, limits.max_dimension)?)
}

/// Encode on the blocking pool and wrap as an `image/jpeg` response.
async fn render_jpeg<F>(quality: u8, draw: F) -> Result<Response, HttpAppError>
where
    F: FnOnce() -> Result<Canvas, HttpAppError> + Send + 'static,
{
    let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, HttpAppError> {
        let canvas = draw()?;
        Ok(canvas.encode_jpeg(quality)?)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Render task failed: {}", e)))??;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        bytes,
    )
        .into_response())
}

/// Draw zero, one or two lines on a solid canvas
#[utoipa::path(
    get,
    path = "/api/draw",
    tag = "draw",
    params(DrawLinesQuery),
    responses(
        (status = 200, description = "JPEG image", content_type = "image/jpeg"),
        (status = 400, description = "Invalid number, color, dimension or coordinate", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "draw_lines"))]
pub async fn draw_lines(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DrawLinesQuery>,
) -> Result<Response, HttpAppError> {
    let mut canvas = canvas(
        state.draw,
        query.width.as_deref(),
        query.height.as_deref(),
        query.background.as_deref(),
    )?;
    let stroke = parse_color_param("color", query.color.as_deref(), DEFAULT_STROKE)?;

    let lines = [
        parse_line(
            ["x1", "y1", "x2", "y2"],
            [
                query.x1.as_ref(),
                query.y1.as_ref(),
                query.x2.as_ref(),
                query.y2.as_ref(),
            ],
        )?,
        parse_line(
            ["x3", "y3", "x4", "y4"],
            [
                query.x3.as_ref(),
                query.y3.as_ref(),
                query.x4.as_ref(),
                query.y4.as_ref(),
            ],
        )?,
    ];

    tracing::debug!(
        width = canvas.width(),
        height = canvas.height(),
        lines = lines.iter().flatten().count(),
        "Drawing lines"
    );

    render_jpeg(state.draw.jpeg_quality, move || {
        for (from, to) in lines.into_iter().flatten() {
            canvas.draw_line(from, to, stroke);
        }
        Ok(canvas)
    })
    .await
}

/// Draw one filled rectangle on a solid canvas
#[utoipa::path(
    get,
    path = "/api/draw/rect",
    tag = "draw",
    params(DrawRectQuery),
    responses(
        (status = 200, description = "JPEG image", content_type = "image/jpeg"),
        (status = 400, description = "Invalid number, color or dimension", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "draw_rect"))]
pub async fn draw_rect(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DrawRectQuery>,
) -> Result<Response, HttpAppError> {
    let mut canvas = canvas(
        state.draw,
        query.width.as_deref(),
        query.height.as_deref(),
        query.background.as_deref(),
    )?;
    let fill = parse_color_param("color", query.color.as_deref(), DEFAULT_STROKE)?;
    let x = parse_offset("x", query.x.as_deref())?;
    let y = parse_offset("y", query.y.as_deref())?;

    let (Some(w), Some(h)) = (query.w.as_deref(), query.h.as_deref()) else {
        return Err(AppError::InvalidInput("w and h are required".to_string()).into());
    };
    let w = parse_dimension("w", Some(w), 0)?;
    let h = parse_dimension("h", Some(h), 0)?;

    render_jpeg(state.draw.jpeg_quality, move || {
        canvas.fill_rect(x, y, w, h, fill);
        Ok(canvas)
    })
    .await
}
