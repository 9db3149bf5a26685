//! Integration tests for the `/video/` endpoint.
//!
//! Tests verify:
//! - Files are served with the MIME type of their extension
//! - Status codes for missing files, missing and disallowed extensions
//! - Requests can never reach files outside the serving root
//! - Range and conditional requests

use axum::http::{header, Method, StatusCode};
use tower::ServiceExt;

use super::test_utils::{
    get, request, segment_bytes, send, VideoFixture, DASH_MANIFEST, HLS_PLAYLIST,
};

// =============================================================================
// Successful Retrieval
// =============================================================================

#[tokio::test]
async fn test_segment_served_with_mime_type() {
    let data = segment_bytes();
    let fixture = VideoFixture::new().with_file("segment1.m4s", &data);

    let (status, headers, body) = send(fixture.router(), get("/video/segment1.m4s")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "video/mp4");
    assert_eq!(&body[..], &data[..]);
}

#[tokio::test]
async fn test_every_allowed_extension_has_its_content_type() {
    let cases = [
        ("movie.mp4", "video/mp4"),
        ("chunk.m4s", "video/mp4"),
        ("manifest.mpd", "application/dash+xml"),
        ("clip.webm", "video/webm"),
        ("index.m3u8", "application/vnd.apple.mpegurl"),
        ("segment0.ts", "video/mp2t"),
    ];

    let mut fixture = VideoFixture::new();
    for (name, _) in cases {
        fixture = fixture.with_file(name, b"media bytes");
    }

    for (name, expected) in cases {
        let (status, headers, body) =
            send(fixture.router(), get(&format!("/video/{}", name))).await;

        assert_eq!(status, StatusCode::OK, "{}", name);
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), expected, "{}", name);
        assert_eq!(&body[..], b"media bytes");
    }
}

#[tokio::test]
async fn test_nested_manifests() {
    let fixture = VideoFixture::new()
        .with_file("hls/001/playlist.m3u8", HLS_PLAYLIST.as_bytes())
        .with_file("dash/001/manifest.mpd", DASH_MANIFEST.as_bytes());

    let (status, headers, body) =
        send(fixture.router(), get("/video/hls/001/playlist.m3u8")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/vnd.apple.mpegurl"
    );
    assert_eq!(&body[..], HLS_PLAYLIST.as_bytes());

    let (status, headers, body) =
        send(fixture.router(), get("/video/dash/001/manifest.mpd")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/dash+xml"
    );
    assert_eq!(&body[..], DASH_MANIFEST.as_bytes());
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_missing_file_returns_404() {
    let fixture = VideoFixture::new();

    let (status, _, body) = send(fixture.router(), get("/video/missing.mp4")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"Video not found");
}

#[tokio::test]
async fn test_disallowed_extension_returns_400() {
    let fixture = VideoFixture::new()
        .with_file("notes.txt", b"not a video")
        .with_file("movie.mkv", b"matroska")
        .with_file("upper.MP4", b"wrong case");

    for path in ["notes.txt", "movie.mkv", "upper.MP4"] {
        let (status, headers, body) =
            send(fixture.router(), get(&format!("/video/{}", path))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(&body[..], b"Invalid file type");
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }
}

#[tokio::test]
async fn test_missing_disallowed_extension_returns_404() {
    let fixture = VideoFixture::new();

    let (status, _, _) = send(fixture.router(), get("/video/missing.txt")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_no_extension_returns_500() {
    let fixture = VideoFixture::new()
        .with_file("manifest", b"no extension")
        .with_dir("hls/001");

    // existing file, directory, and the root itself
    for uri in ["/video/manifest", "/video/hls/001", "/video/"] {
        let (status, _, body) = send(fixture.router(), get(uri)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(&body[..], b"Internal server error");
    }
}

#[tokio::test]
async fn test_missing_file_without_extension_returns_404() {
    let fixture = VideoFixture::new();

    let (status, _, body) = send(fixture.router(), get("/video/absent")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"Video not found");
}

#[tokio::test]
async fn test_directory_with_video_extension_returns_404() {
    let fixture = VideoFixture::new()
        .with_dir("dir.mp4")
        .with_file("hls/001.m3u8/playlist.m3u8", HLS_PLAYLIST.as_bytes());

    for uri in ["/video/dir.mp4", "/video/hls/001.m3u8"] {
        let (status, headers, body) = send(fixture.router(), get(uri)).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(&body[..], b"Video not found");
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }
}

// =============================================================================
// Path Traversal
// =============================================================================

#[tokio::test]
async fn test_traversal_cannot_reach_outside_root() {
    let fixture = VideoFixture::new()
        .with_file("segment1.m4s", b"inside")
        .with_outside_file("secret.mp4", b"outside the root");

    // sanity check: the outside file is really one level above the root
    assert!(fixture.root().parent().unwrap().join("secret.mp4").exists());

    for uri in [
        "/video/../secret.mp4",
        "/video/../../secret.mp4",
        "/video/a/../../secret.mp4",
        "/video/%2e%2e/secret.mp4",
        "/video/..%2fsecret.mp4",
    ] {
        let (status, _, body) = send(fixture.router(), get(uri)).await;

        assert_ne!(status, StatusCode::OK, "{} escaped the root", uri);
        assert_ne!(&body[..], b"outside the root", "{} escaped the root", uri);
    }
}

#[tokio::test]
async fn test_traversal_is_clamped_to_root() {
    let fixture = VideoFixture::new().with_file("segment1.m4s", b"inside");

    let (status, _, body) = send(fixture.router(), get("/video/../../segment1.m4s")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"inside");
}

// =============================================================================
// Byte Serving
// =============================================================================

#[tokio::test]
async fn test_range_request() {
    let data = segment_bytes();
    let fixture = VideoFixture::new().with_file("segment1.m4s", &data);

    let mut req = get("/video/segment1.m4s");
    req.headers_mut()
        .insert(header::RANGE, "bytes=0-7".parse().unwrap());

    let (status, headers, body) = send(fixture.router(), req).await;

    assert_eq!(status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "video/mp4");
    assert_eq!(
        headers.get(header::CONTENT_RANGE).unwrap().to_str().unwrap(),
        format!("bytes 0-7/{}", data.len())
    );
    assert_eq!(&body[..], &data[..8]);
}

#[tokio::test]
async fn test_if_modified_since_returns_304() {
    let fixture = VideoFixture::new().with_file("index.m3u8", HLS_PLAYLIST.as_bytes());

    let mut req = get("/video/index.m3u8");
    req.headers_mut().insert(
        header::IF_MODIFIED_SINCE,
        "Fri, 01 Jan 2100 00:00:00 GMT".parse().unwrap(),
    );

    let (status, headers, body) = send(fixture.router(), req).await;

    assert_eq!(status, StatusCode::NOT_MODIFIED);
    assert!(body.is_empty());
    assert!(headers.get(header::CONTENT_TYPE).is_none());
}

#[tokio::test]
async fn test_unsatisfiable_range_has_no_media_type() {
    let data = segment_bytes();
    let fixture = VideoFixture::new().with_file("segment1.m4s", &data);

    let mut req = get("/video/segment1.m4s");
    req.headers_mut()
        .insert(header::RANGE, "bytes=999999-".parse().unwrap());

    let (status, headers, _) = send(fixture.router(), req).await;

    assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE);
    assert!(headers.get(header::CONTENT_TYPE).is_none());
}

#[tokio::test]
async fn test_last_modified_header_present() {
    let fixture = VideoFixture::new().with_file("clip.webm", b"webm");

    let response = fixture
        .router()
        .oneshot(get("/video/clip.webm"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::LAST_MODIFIED));
}

#[tokio::test]
async fn test_post_is_not_allowed() {
    let fixture = VideoFixture::new().with_file("segment1.m4s", b"inside");

    let (status, headers, _) =
        send(fixture.router(), request(Method::POST, "/video/segment1.m4s")).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
