//! Resumable media upload over the tus 1.0.0 protocol.
//!
//! A session creates the upload resource with `POST`, then streams the file
//! in fixed-size `PATCH` chunks. Transient failures wait out the retry
//! schedule and re-sync the server offset with `HEAD` before resuming.

use crate::models::{Language, SummarizationType};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use futures::future::{self, AbortRegistration, Abortable, Aborted};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

pub(crate) const CHUNK_SIZE: u64 = 10 * 1024 * 1024;
pub(crate) const RETRY_DELAYS_MS: [u32; 4] = [0, 3000, 5000, 10000];
const TUS_VERSION: &str = "1.0.0";

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub(crate) enum UploadError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server responded with {status}: {body}")]
    Http { status: u16, body: String },
    #[error("{0}")]
    Protocol(String),
    #[error("Could not read file: {0}")]
    File(String),
    #[error("Upload aborted")]
    Aborted,
}

impl UploadError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => is_transient_status(*status),
            _ => false,
        }
    }

    fn js(e: JsValue) -> Self {
        Self::File(e.as_string().unwrap_or_else(|| format!("{e:?}")))
    }
}

pub(crate) fn is_transient_status(status: u16) -> bool {
    status >= 500 || matches!(status, 409 | 423 | 429)
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct UploadMetadata {
    pub filename: String,
    pub filetype: String,
    pub title: Option<String>,
    pub language: Language,
    pub summarization_type: SummarizationType,
}

impl UploadMetadata {
    /// `Upload-Metadata` header value: `key base64(value)` pairs joined by `,`.
    pub fn header_value(&self) -> String {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.filename);
        let language = self.language.to_string();
        let summarization_type = self.summarization_type.to_string();

        [
            ("filename", self.filename.as_str()),
            ("filetype", self.filetype.as_str()),
            ("title", title),
            ("language", language.as_str()),
            ("summarizationType", summarization_type.as_str()),
        ]
        .iter()
        .map(|(k, v)| format!("{k} {}", STANDARD.encode(v.as_bytes())))
        .collect::<Vec<_>>()
        .join(",")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) struct UploadProgress {
    pub bytes_uploaded: u64,
    pub bytes_total: u64,
    pub percentage: u8,
}

impl UploadProgress {
    pub fn new(bytes_uploaded: u64, bytes_total: u64) -> Self {
        let percentage = if bytes_total == 0 {
            100
        } else {
            ((bytes_uploaded as f64 / bytes_total as f64) * 100.0)
                .round()
                .clamp(0.0, 100.0) as u8
        };
        Self {
            bytes_uploaded,
            bytes_total,
            percentage,
        }
    }
}

/// Walks `RETRY_DELAYS_MS`; reset after every accepted chunk.
#[derive(Clone, Debug, Default)]
pub(crate) struct RetrySchedule {
    attempt: usize,
}

impl RetrySchedule {
    pub fn next_delay(&mut self) -> Option<u32> {
        let delay = RETRY_DELAYS_MS.get(self.attempt).copied();
        if delay.is_some() {
            self.attempt += 1;
        }
        delay
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

pub(crate) fn chunk_end(offset: u64, total: u64) -> u64 {
    offset.saturating_add(CHUNK_SIZE).min(total)
}

/// The server names the upload resource after the lecture it creates.
pub(crate) fn lecture_id_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn resolve_location(endpoint: &str, location: &str) -> Result<String, UploadError> {
    let base = reqwest::Url::parse(endpoint)
        .map_err(|e| UploadError::Protocol(format!("invalid upload endpoint: {e}")))?;
    base.join(location)
        .map(|u| u.to_string())
        .map_err(|e| UploadError::Protocol(format!("invalid upload location: {e}")))
}

/// Cancels a session: the running transfer is dropped, which aborts the
/// in-flight fetch, and no callback fires afterwards.
#[derive(Clone, Debug)]
pub(crate) struct AbortHandle {
    flag: Arc<AtomicBool>,
    transfer: future::AbortHandle,
}

impl AbortHandle {
    pub fn new() -> (Self, AbortRegistration) {
        let (transfer, registration) = future::AbortHandle::new_pair();
        let handle = Self {
            flag: Arc::default(),
            transfer,
        };
        (handle, registration)
    }

    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.transfer.abort();
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn ensure_active(&self) -> Result<(), UploadError> {
        if self.is_aborted() {
            Err(UploadError::Aborted)
        } else {
            Ok(())
        }
    }
}

/// Drives `transfer` until it settles or its session is aborted.
pub(crate) async fn abortable<T>(
    registration: AbortRegistration,
    transfer: impl Future<Output = Result<T, UploadError>>,
) -> Result<T, UploadError> {
    Abortable::new(transfer, registration)
        .await
        .unwrap_or_else(|Aborted| Err(UploadError::Aborted))
}

pub(crate) struct UploadCallbacks {
    pub on_progress: Box<dyn Fn(UploadProgress)>,
    pub on_success: Box<dyn FnOnce(String)>,
    pub on_error: Box<dyn FnOnce(UploadError)>,
}

/// Callback set that goes silent once its abort handle is set.
struct GuardedCallbacks {
    abort: AbortHandle,
    inner: UploadCallbacks,
}

impl GuardedCallbacks {
    fn progress(&self, p: UploadProgress) {
        if !self.abort.is_aborted() {
            (self.inner.on_progress)(p);
        }
    }

    fn finish(self, result: Result<String, UploadError>) {
        if self.abort.is_aborted() {
            return;
        }
        match result {
            Ok(id) => (self.inner.on_success)(id),
            Err(e) => (self.inner.on_error)(e),
        }
    }
}

pub(crate) struct UploadOptions {
    pub endpoint: String,
    pub auth_header: Option<String>,
    pub file: web_sys::File,
    pub metadata: UploadMetadata,
}

/// Start an upload in the background and return its cancellation handle.
pub(crate) fn start(options: UploadOptions, callbacks: UploadCallbacks) -> AbortHandle {
    let (abort, registration) = AbortHandle::new();
    let guarded = GuardedCallbacks {
        abort: abort.clone(),
        inner: callbacks,
    };

    let Some(auth_header) = options.auth_header.clone() else {
        guarded.finish(Err(UploadError::NotAuthenticated));
        return abort;
    };

    let session = TusSession {
        endpoint: options.endpoint,
        auth_header,
        file: options.file,
        metadata: options.metadata,
        abort: abort.clone(),
        http: reqwest::Client::new(),
    };

    leptos::task::spawn_local(async move {
        let result = abortable(registration, session.run(&guarded)).await;
        match &result {
            Err(UploadError::Aborted) => tracing::info!("upload cancelled"),
            Err(e) => tracing::warn!(error = %e, "upload failed"),
            Ok(_) => {}
        }
        guarded.finish(result);
    });

    abort
}

struct TusSession {
    endpoint: String,
    auth_header: String,
    file: web_sys::File,
    metadata: UploadMetadata,
    abort: AbortHandle,
    http: reqwest::Client,
}

impl TusSession {
    async fn run(&self, callbacks: &GuardedCallbacks) -> Result<String, UploadError> {
        let total = self.file.size().max(0.0) as u64;
        let mut retry = RetrySchedule::default();

        let location = loop {
            self.abort.ensure_active()?;
            match self.create(total).await {
                Ok(location) => break location,
                Err(e) => self.backoff(&mut retry, e).await?,
            }
        };
        retry.reset();
        tracing::info!(%location, total, "upload resource created");

        let mut offset = 0;
        callbacks.progress(UploadProgress::new(offset, total));

        while offset < total {
            self.abort.ensure_active()?;

            match self.patch_chunk(&location, offset, total).await {
                Ok(next) => {
                    if next <= offset {
                        return Err(UploadError::Protocol(format!(
                            "server did not advance offset past {offset}"
                        )));
                    }
                    offset = next;
                    retry.reset();
                    callbacks.progress(UploadProgress::new(offset, total));
                }
                Err(e) => {
                    self.backoff(&mut retry, e).await?;
                    match self.head_offset(&location).await {
                        Ok(server_offset) => offset = server_offset,
                        Err(e) if e.is_transient() => {}
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        Ok(lecture_id_from_url(&location))
    }

    /// Wait out the next retry delay, or give up with `err`.
    async fn backoff(&self, retry: &mut RetrySchedule, err: UploadError) -> Result<(), UploadError> {
        if !err.is_transient() {
            return Err(err);
        }
        let Some(delay) = retry.next_delay() else {
            return Err(err);
        };
        tracing::debug!(delay_ms = delay, error = %err, "retrying upload");
        if delay > 0 {
            gloo_timers::future::TimeoutFuture::new(delay).await;
        }
        self.abort.ensure_active()
    }

    async fn create(&self, total: u64) -> Result<String, UploadError> {
        let res = self
            .http
            .post(&self.endpoint)
            .header("Tus-Resumable", TUS_VERSION)
            .header("Authorization", &self.auth_header)
            .header("Upload-Length", total.to_string())
            .header("Upload-Metadata", self.metadata.header_value())
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = res.status().as_u16();
        if status != 201 && !(200..300).contains(&status) {
            let body = res.text().await.unwrap_or_default();
            return Err(UploadError::Http { status, body });
        }

        let location = res
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| UploadError::Protocol("missing Location header".to_string()))?;
        resolve_location(&self.endpoint, location)
    }

    async fn patch_chunk(&self, location: &str, offset: u64, total: u64) -> Result<u64, UploadError> {
        let end = chunk_end(offset, total);
        let bytes = read_slice(&self.file, offset, end).await?;

        let res = self
            .http
            .patch(location)
            .header("Tus-Resumable", TUS_VERSION)
            .header("Authorization", &self.auth_header)
            .header("Upload-Offset", offset.to_string())
            .header("Content-Type", "application/offset+octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = res.status().as_u16();
        if !(200..300).contains(&status) {
            let body = res.text().await.unwrap_or_default();
            return Err(UploadError::Http { status, body });
        }
        upload_offset(res.headers())
    }

    async fn head_offset(&self, location: &str) -> Result<u64, UploadError> {
        let res = self
            .http
            .head(location)
            .header("Tus-Resumable", TUS_VERSION)
            .header("Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = res.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(UploadError::Http {
                status,
                body: String::new(),
            });
        }
        upload_offset(res.headers())
    }
}

fn upload_offset(headers: &reqwest::header::HeaderMap) -> Result<u64, UploadError> {
    headers
        .get("Upload-Offset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| UploadError::Protocol("missing or invalid Upload-Offset header".to_string()))
}

async fn read_slice(file: &web_sys::File, start: u64, end: u64) -> Result<Vec<u8>, UploadError> {
    let blob = file
        .slice_with_f64_and_f64(start as f64, end as f64)
        .map_err(UploadError::js)?;
    let buf = JsFuture::from(blob.array_buffer())
        .await
        .map_err(UploadError::js)?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn metadata() -> UploadMetadata {
        UploadMetadata {
            filename: "lecture.mp3".to_string(),
            filetype: "audio/mpeg".to_string(),
            title: None,
            language: Language::Uz,
            summarization_type: SummarizationType::Lecture,
        }
    }

    #[test]
    fn test_metadata_header_encodes_every_field() {
        let header = metadata().header_value();
        let pairs: Vec<&str> = header.split(',').collect();
        assert_eq!(
            pairs,
            vec![
                "filename bGVjdHVyZS5tcDM=",
                "filetype YXVkaW8vbXBlZw==",
                "title bGVjdHVyZS5tcDM=",
                "language dXo=",
                "summarizationType bGVjdHVyZQ==",
            ]
        );
    }

    #[test]
    fn test_metadata_title_is_utf8_base64() {
        let mut m = metadata();
        m.title = Some("Ma'ruza №1".to_string());
        m.summarization_type = SummarizationType::Custdev;
        let header = m.header_value();

        let title = header
            .split(',')
            .find_map(|p| p.strip_prefix("title "))
            .expect("title pair");
        let decoded = STANDARD.decode(title).expect("valid base64");
        assert_eq!(String::from_utf8(decoded).ok().as_deref(), Some("Ma'ruza №1"));
        assert!(header.contains("summarizationType Y3VzdGRldg=="));
    }

    #[test]
    fn test_blank_title_falls_back_to_filename() {
        let mut m = metadata();
        m.title = Some("   ".to_string());
        assert!(m.header_value().contains("title bGVjdHVyZS5tcDM="));
    }

    #[test]
    fn test_progress_percentage_rounds() {
        assert_eq!(UploadProgress::new(1, 3).percentage, 33);
        assert_eq!(UploadProgress::new(2, 3).percentage, 67);
        assert_eq!(UploadProgress::new(10, 10).percentage, 100);
        assert_eq!(UploadProgress::new(0, 0).percentage, 100);
    }

    #[test]
    fn test_retry_schedule_exhausts_then_resets() {
        let mut r = RetrySchedule::default();
        let delays: Vec<_> = std::iter::from_fn(|| r.next_delay()).collect();
        assert_eq!(delays, vec![0, 3000, 5000, 10000]);
        assert_eq!(r.next_delay(), None);

        r.reset();
        assert_eq!(r.next_delay(), Some(0));
    }

    #[test]
    fn test_chunk_end_clamps_to_total() {
        assert_eq!(chunk_end(0, 25 * 1024 * 1024), CHUNK_SIZE);
        assert_eq!(chunk_end(20 * 1024 * 1024, 25 * 1024 * 1024), 25 * 1024 * 1024);
        assert_eq!(chunk_end(0, 0), 0);
    }

    #[test]
    fn test_transient_classification() {
        for status in [409, 423, 429, 500, 502, 503] {
            assert!(is_transient_status(status), "{status}");
        }
        for status in [400, 401, 403, 404, 413] {
            assert!(!is_transient_status(status), "{status}");
        }
        assert!(UploadError::Network("offline".into()).is_transient());
        assert!(!UploadError::NotAuthenticated.is_transient());
    }

    #[test]
    fn test_lecture_id_from_url() {
        assert_eq!(
            lecture_id_from_url("https://api.example.com/api/v1/uploads/abc123"),
            "abc123"
        );
        assert_eq!(lecture_id_from_url("https://api.example.com/api/v1/uploads/abc123/"), "abc123");
        assert_eq!(lecture_id_from_url("/api/v1/uploads/xyz?foo=1"), "xyz");
    }

    #[test]
    fn test_resolve_relative_location() {
        let url = resolve_location("http://localhost:3000/api/v1/uploads", "/api/v1/uploads/abc")
            .expect("resolves");
        assert_eq!(url, "http://localhost:3000/api/v1/uploads/abc");

        let abs = resolve_location("http://localhost:3000/api/v1/uploads", "https://cdn.example.com/u/1")
            .expect("resolves");
        assert_eq!(abs, "https://cdn.example.com/u/1");
    }

    #[test]
    fn test_no_callbacks_after_abort() {
        let events = Rc::new(RefCell::new(Vec::<String>::new()));
        let (p, s, e) = (events.clone(), events.clone(), events.clone());

        let (abort, _registration) = AbortHandle::new();
        let guarded = GuardedCallbacks {
            abort: abort.clone(),
            inner: UploadCallbacks {
                on_progress: Box::new(move |pr| p.borrow_mut().push(format!("progress {}", pr.percentage))),
                on_success: Box::new(move |id| s.borrow_mut().push(format!("success {id}"))),
                on_error: Box::new(move |err| e.borrow_mut().push(format!("error {err}"))),
            },
        };

        guarded.progress(UploadProgress::new(5, 10));
        abort.abort();
        guarded.progress(UploadProgress::new(10, 10));
        guarded.finish(Ok("lec-1".to_string()));

        assert_eq!(*events.borrow(), vec!["progress 50".to_string()]);
    }

    #[test]
    fn test_abort_handle_clones_share_state() {
        let (a, _registration) = AbortHandle::new();
        let b = a.clone();
        assert!(!b.is_aborted());
        a.abort();
        assert!(b.is_aborted());
        assert_eq!(b.ensure_active(), Err(UploadError::Aborted));
    }

    #[test]
    fn test_abort_during_request_drops_the_transfer() {
        let (abort, registration) = AbortHandle::new();
        let cancel = abort.clone();
        let finished = Rc::new(RefCell::new(false));
        let done = finished.clone();

        // Stands in for a PATCH whose response never arrives before Cancel.
        let transfer = async move {
            cancel.abort();
            std::future::pending::<()>().await;
            *done.borrow_mut() = true;
            Ok::<String, UploadError>("lec-1".to_string())
        };

        let result = futures::executor::block_on(abortable(registration, transfer));
        assert_eq!(result, Err(UploadError::Aborted));
        assert!(!*finished.borrow());
        assert!(abort.is_aborted());
    }

    #[test]
    fn test_abort_before_start_never_polls_the_transfer() {
        let (abort, registration) = AbortHandle::new();
        abort.abort();
        let polled = Rc::new(RefCell::new(false));
        let flag = polled.clone();
        let transfer = async move {
            *flag.borrow_mut() = true;
            Ok::<(), UploadError>(())
        };
        let result = futures::executor::block_on(abortable(registration, transfer));
        assert_eq!(result, Err(UploadError::Aborted));
        assert!(!*polled.borrow());
    }
}
