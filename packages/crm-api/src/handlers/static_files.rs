//! Static file serving for paths outside the customer API.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use askama::Template;
use hyper::{body::Bytes, header, Method, Request, Response, StatusCode};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::router::{AppState, RouterError};

const INDEX_FILE: &str = "index.html";
const HTML_UTF8: &str = "text/html; charset=utf-8";

/// Characters left unescaped in listing links.
const LINK_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// HTML index for a directory without an `index.html`.
#[derive(Template)]
#[template(
    source = "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n{% for entry in entries %}<a href=\"{{ entry.href }}\">{{ entry.label }}</a>\n{% endfor %}</pre>\n",
    ext = "html"
)]
struct DirectoryListing {
    entries: Vec<ListingEntry>,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ListingEntry {
    label: String,
    href: String,
}

impl ListingEntry {
    fn new(name: &str, is_dir: bool) -> Self {
        let suffix = if is_dir { "/" } else { "" };
        Self {
            label: format!("{}{}", name, suffix),
            href: format!("{}{}", utf8_percent_encode(name, LINK_SEGMENT), suffix),
        }
    }
}

/// Serves a file from the configured static directory.
///
/// # Endpoint
/// `GET /{path}` and `HEAD /{path}`
///
/// # Response
/// - **200 OK**: File contents with a content type guessed from the extension.
///   Directories serve their `index.html`, or an HTML listing when there is none.
/// - **301 Moved Permanently**: Directory requested without a trailing slash,
///   or file requested with one
///
/// # Errors
/// - **403 Forbidden**: File exists but cannot be read
/// - **404 Not Found**: No such file, or the path tries to leave the static root
/// - **405 Method Not Allowed**: Any method other than GET or HEAD
/// - **500 Internal Server Error**: Other I/O failures
pub async fn serve_static<B>(
    req: Request<B>,
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    let head_only = match *req.method() {
        Method::GET => false,
        Method::HEAD => true,
        _ => return Err(RouterError::MethodNotAllowed),
    };

    let request_path = req.uri().path();
    let relative = resolve_relative_path(request_path).ok_or_else(not_found)?;
    let target = state.config.static_dir.join(relative);

    let metadata = tokio::fs::metadata(&target).await.map_err(map_io_error)?;
    let has_slash = request_path.ends_with('/');

    if !metadata.is_dir() {
        if has_slash {
            return redirect(request_path.trim_end_matches('/'));
        }
        let contents = tokio::fs::read(&target).await.map_err(map_io_error)?;
        tracing::debug!(path = %target.display(), bytes = contents.len(), "Serving static file");
        return file_response(&content_type_for(&target), contents, head_only);
    }

    if !has_slash {
        return redirect(&format!("{}/", request_path));
    }

    let index_path = target.join(INDEX_FILE);
    match tokio::fs::read(&index_path).await {
        Ok(contents) => {
            tracing::debug!(path = %index_path.display(), "Serving directory index");
            file_response(&content_type_for(&index_path), contents, head_only)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let listing = render_listing(&target).await?;
            tracing::debug!(path = %target.display(), "Serving directory listing");
            file_response(HTML_UTF8, listing.into_bytes(), head_only)
        }
        Err(e) => Err(map_io_error(e)),
    }
}

/// Renders the sorted entries of `dir` as an HTML link list.
async fn render_listing(dir: &Path) -> Result<String, RouterError> {
    let mut read_dir = tokio::fs::read_dir(dir).await.map_err(map_io_error)?;
    let mut entries = Vec::new();

    while let Some(entry) = read_dir.next_entry().await.map_err(map_io_error)? {
        let is_dir = entry
            .file_type()
            .await
            .map(|t| t.is_dir())
            .unwrap_or(false);
        let name = entry.file_name();
        entries.push(ListingEntry::new(&name.to_string_lossy(), is_dir));
    }
    entries.sort();

    DirectoryListing { entries }
        .render()
        .map_err(|e| RouterError::InternalError(format!("Failed to render listing: {}", e)))
}

fn file_response(
    content_type: &str,
    contents: Vec<u8>,
    head_only: bool,
) -> Result<Response<Bytes>, RouterError> {
    let content_length = contents.len();
    let body = if head_only {
        Bytes::new()
    } else {
        Bytes::from(contents)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content_length)
        .body(body)
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

fn redirect(location: &str) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(header::LOCATION, location)
        .body(Bytes::new())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Turns a request path into a path relative to the static root.
///
/// Returns `None` for paths that are not valid UTF-8 once percent-decoded or
/// that contain a `..` component.
fn resolve_relative_path(request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;

    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') || s.contains('\0') => return None,
            s => relative.push(s),
        }
    }
    Some(relative)
}

fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

fn not_found() -> RouterError {
    RouterError::NotFound("404 page not found".to_string())
}

fn map_io_error(e: std::io::Error) -> RouterError {
    match e.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory => not_found(),
        ErrorKind::PermissionDenied => RouterError::Forbidden("403 Forbidden".to_string()),
        _ => {
            tracing::error!("Static file I/O error: {}", e);
            RouterError::InternalError("500 Internal Server Error".to_string())
        }
    }
}
