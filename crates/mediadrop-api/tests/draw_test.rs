//! Drawing endpoint integration tests.
//!
//! Run with: `cargo test -p mediadrop-api --test draw_test`

mod helpers;

use helpers::{api_path, setup_test_app};

fn luma(img: &image::RgbImage, x: u32, y: u32) -> u32 {
    let p = img.get_pixel(x, y).0;
    (u32::from(p[0]) + u32::from(p[1]) + u32::from(p[2])) / 3
}

#[tokio::test]
async fn test_draw_defaults_to_blank_canvas() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/draw")).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
    let img = image::load_from_memory(response.as_bytes()).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (256, 256));
    assert!(luma(&img, 128, 128) > 240);
}

#[tokio::test]
async fn test_draw_two_lines() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(
            "/draw?width=32&height=32&x1=0&y1=16&x2=31&y2=16&x3=8&y3=0&x4=8&y4=31",
        ))
        .await;

    assert_eq!(response.status_code(), 200);
    let img = image::load_from_memory(response.as_bytes()).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (32, 32));
    assert!(luma(&img, 24, 16) < 128, "horizontal line missing");
    assert!(luma(&img, 8, 4) < 128, "vertical line missing");
    assert!(luma(&img, 24, 4) > 200, "background was painted");
}

#[tokio::test]
async fn test_draw_clips_lines_outside_canvas() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/draw?width=16&height=16&x1=-100&y1=-5&x2=-1&y2=-90"))
        .await;

    assert_eq!(response.status_code(), 200);
    let img = image::load_from_memory(response.as_bytes()).unwrap().to_rgb8();
    assert!(img.pixels().all(|p| p.0.iter().all(|&c| c > 200)));
}

#[tokio::test]
async fn test_draw_rejects_non_numeric_coordinate() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/draw?x1=abc&y1=0&x2=1&y2=1"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_draw_rejects_unusable_coordinates() {
    let app = setup_test_app().await;

    for query in [
        "/draw?x1=NaN&y1=0&x2=1&y2=1",
        "/draw?x1=0&y1=inf&x2=1&y2=1",
        "/draw?x1=0&y1=0&x2=1e9&y2=1",
    ] {
        let response = app.client().get(&api_path(query)).await;
        assert_eq!(response.status_code(), 400, "{}", query);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "INVALID_COORDINATE", "{}", query);
    }
}

#[tokio::test]
async fn test_draw_rejects_partial_line() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/draw?x1=0&y1=0&x2=5")).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_draw_rejects_bad_canvas() {
    let app = setup_test_app().await;

    for query in [
        "/draw?width=0",
        "/draw?height=5000",
        "/draw?width=-3",
        "/draw?color=%23zzzzzz",
    ] {
        let response = app.client().get(&api_path(query)).await;
        assert_eq!(response.status_code(), 400, "{}", query);
    }
}

#[tokio::test]
async fn test_draw_rect() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(
            "/draw/rect?width=64&height=64&color=%23ff0000&x=16&y=16&w=32&h=32",
        ))
        .await;

    assert_eq!(response.status_code(), 200);
    let img = image::load_from_memory(response.as_bytes()).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (64, 64));
    let inside = img.get_pixel(32, 32).0;
    assert!(inside[0] > 200 && inside[1] < 80 && inside[2] < 80);
    assert!(luma(&img, 4, 4) > 200);
}

#[tokio::test]
async fn test_draw_rect_requires_size() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/draw/rect?x=1&y=1&w=4")).await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_draw_rect_rejects_huge_offsets() {
    let app = setup_test_app().await;

    for query in ["/draw/rect?x=3e9&y=0&w=10&h=2", "/draw/rect?x=0&y=-2e7&w=10&h=2"] {
        let response = app.client().get(&api_path(query)).await;
        assert_eq!(response.status_code(), 400, "{}", query);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "INVALID_COORDINATE", "{}", query);
    }
}

#[tokio::test]
async fn test_draw_rect_far_outside_canvas_is_blank() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(
            "/draw/rect?width=16&height=16&x=1000000&y=0&w=4294967295&h=4294967295",
        ))
        .await;

    assert_eq!(response.status_code(), 200);
    let img = image::load_from_memory(response.as_bytes()).unwrap().to_rgb8();
    assert!(img.pixels().all(|p| p.0.iter().all(|&c| c > 200)));
}
