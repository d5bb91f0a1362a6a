//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], an [`AppContext`] over an in-memory image store,
//! plus builders for multipart upload bodies and small image fixtures.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Frame;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use portfolio::config::Config;
use portfolio::gallery::ImageStore;
use portfolio::server::{create_router, AppContext};
use portfolio_imaging::heif::UncompressedWriter;
use portfolio_imaging::DecodedImage;

pub const BOUNDARY: &str = "portfolio-test-boundary";

/// Test harness wrapping an [`AppContext`] backed by an in-memory store.
pub struct TestHarness {
    pub ctx: AppContext,
    pub store: ImageStore,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let store = ImageStore::in_memory(config.storage.jpeg_quality)
            .expect("failed to create in-memory store");
        let ctx = AppContext::new(store.clone(), config);
        Self { ctx, store }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }
}

/// One file part of a multipart body.
pub struct Part<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: Option<&'a str>,
    pub data: Vec<u8>,
}

impl<'a> Part<'a> {
    pub fn file(file_name: &'a str, content_type: &'a str, data: Vec<u8>) -> Self {
        Self {
            field: "files",
            file_name,
            content_type: Some(content_type),
            data,
        }
    }
}

/// Encode parts as `multipart/form-data`.
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.field, part.file_name
            )
            .as_bytes(),
        );
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Build a multipart POST request.
pub fn upload_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// A body delivered as separate data frames, like a network stream.
pub struct ChunkedBody(VecDeque<Bytes>);

impl ChunkedBody {
    pub fn new(data: Vec<u8>, chunk_size: usize) -> Self {
        Self(
            data.chunks(chunk_size)
                .map(|chunk| Bytes::copy_from_slice(chunk))
                .collect(),
        )
    }
}

impl hyper::body::Body for ChunkedBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
        Poll::Ready(self.0.pop_front().map(|chunk| Ok(Frame::data(chunk))))
    }
}

/// Build a multipart POST request whose body arrives in `chunk_size` frames.
pub fn chunked_upload_request(uri: &str, parts: &[Part<'_>], chunk_size: usize) -> Request<Body> {
    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::new(ChunkedBody::new(multipart_body(parts), chunk_size)))
        .unwrap()
}

/// Helper to get response body as string
pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 40, 90]))),
        ImageFormat::Png,
    )
}

pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 128]))),
        ImageFormat::Png,
    )
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 160, 60]))),
        ImageFormat::Jpeg,
    )
}

/// An uncompressed HEIF file whose rows are padded to `row_align` bytes.
pub fn heic_bytes(width: u32, height: u32, row_align: u32) -> Vec<u8> {
    let image = DecodedImage::from(DynamicImage::ImageRgb8(RgbImage::from_fn(
        width,
        height,
        |x, y| Rgb([(x * 40) as u8, (y * 40) as u8, 128]),
    )));
    UncompressedWriter::new()
        .row_align(row_align)
        .write(&image)
        .unwrap()
}
