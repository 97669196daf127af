use crate::api::ApiClient;
use crate::models::{Language, SummarizationType};
use crate::state::{LogEntry, LogKind};
use crate::upload::{self, AbortHandle, UploadCallbacks, UploadMetadata, UploadOptions, UploadProgress};
use leptos::prelude::*;

#[derive(Clone, Copy)]
pub(crate) struct UploadStore {
    api: RwSignal<ApiClient>,
    /// `web_sys::File` is a JS handle, so it lives in thread-local storage.
    pub file: RwSignal<Option<web_sys::File>, LocalStorage>,
    pub title: RwSignal<String>,
    pub language: RwSignal<Language>,
    pub summarization_type: RwSignal<SummarizationType>,
    pub is_uploading: RwSignal<bool>,
    pub progress: RwSignal<Option<UploadProgress>>,
    pub logs: RwSignal<Vec<LogEntry>>,
    pub error: RwSignal<Option<String>>,
    current: StoredValue<Option<AbortHandle>>,
}

impl UploadStore {
    pub fn new(api: RwSignal<ApiClient>) -> Self {
        Self {
            api,
            file: RwSignal::new_local(None),
            title: RwSignal::new(String::new()),
            language: RwSignal::new(Language::default()),
            summarization_type: RwSignal::new(SummarizationType::default()),
            is_uploading: RwSignal::new(false),
            progress: RwSignal::new(None),
            logs: RwSignal::new(vec![]),
            error: RwSignal::new(None),
            current: StoredValue::new(None),
        }
    }

    pub fn file_summary(&self) -> Option<(String, u64)> {
        self.file
            .with(|f| f.as_ref().map(|f| (f.name(), f.size().max(0.0) as u64)))
    }

    pub fn set_file(&self, file: Option<web_sys::File>) {
        if let Some(f) = &file {
            self.add_log(format!("Selected: {}", f.name()), LogKind::Info);
        }
        self.file.set(file);
        self.error.set(None);
    }

    pub fn set_title(&self, title: String) {
        self.title.set(title);
    }

    pub fn set_language(&self, language: Language) {
        self.language.set(language);
    }

    pub fn set_summarization_type(&self, kind: SummarizationType) {
        self.summarization_type.set(kind);
    }

    pub fn start_upload(self, on_success: impl FnOnce() + 'static) {
        let Some(file) = self.file.get_untracked() else {
            self.error.set(Some("No file selected".to_string()));
            return;
        };
        let kind = self.summarization_type.get_untracked();
        self.add_log(format!("Starting TUS upload ({})...", kind.label()), LogKind::Info);
        self.is_uploading.set(true);
        self.error.set(None);
        self.progress.set(None);

        let api = self.api.get_untracked();
        let title = self.title.get_untracked();
        let metadata = UploadMetadata {
            filename: file.name(),
            filetype: file.type_(),
            title: Some(title).filter(|t| !t.trim().is_empty()),
            language: self.language.get_untracked(),
            summarization_type: kind,
        };
        let options = UploadOptions {
            endpoint: api.upload_endpoint(),
            auth_header: api.auth_header(),
            file,
            metadata,
        };

        let callbacks = UploadCallbacks {
            on_progress: Box::new(move |p| self.progress.set(Some(p))),
            on_success: Box::new(move |lecture_id| {
                self.add_log("Upload complete!".to_string(), LogKind::Success);
                if !lecture_id.is_empty() {
                    self.add_log(format!("Lecture ID: {lecture_id}"), LogKind::Info);
                }
                self.current.set_value(None);
                self.is_uploading.set(false);
                self.file.set(None);
                self.title.set(String::new());
                self.progress.set(None);
                on_success();
            }),
            on_error: Box::new(move |e| {
                let message = e.to_string();
                self.add_log(format!("Upload failed: {message}"), LogKind::Error);
                self.current.set_value(None);
                self.is_uploading.set(false);
                self.error.set(Some(message));
            }),
        };

        let handle = upload::start(options, callbacks);
        // A synchronous failure already cleared the upload state.
        if self.is_uploading.get_untracked() {
            self.current.set_value(Some(handle));
        }
    }

    fn abort_current(&self) {
        if let Some(handle) = self.current.try_update_value(|h| h.take()).flatten() {
            handle.abort();
        }
    }

    pub fn cancel_upload(&self) {
        self.abort_current();
        self.add_log("Upload cancelled".to_string(), LogKind::Info);
        self.is_uploading.set(false);
        self.progress.set(None);
    }

    pub fn reset(&self) {
        self.abort_current();
        self.file.set(None);
        self.title.set(String::new());
        self.is_uploading.set(false);
        self.progress.set(None);
        self.error.set(None);
    }

    pub fn add_log(&self, message: String, kind: LogKind) {
        self.logs.update(|logs| logs.push(LogEntry::now(message, kind)));
    }

    pub fn clear_logs(&self) {
        self.logs.set(vec![]);
    }
}
