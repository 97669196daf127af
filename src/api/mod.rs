use crate::config::{self, EnvConfig};
use crate::models::{
    ActionItem, AuthPayload, CustDevData, Folder, KeyPoint, Language, Lecture, LectureShare,
    LectureStatusLight, LectureSummary, LinkedAccountsStatus, MindMap, MinutePackage,
    MinuteTransaction, MinutesBalance, Pagination, PainPoint, ProductSuggestion, PublicLecture,
    SubscriptionPlan, Tag, Transcription, User, UserStats, UserSubscription,
};
use crate::session::SessionEvents;
use crate::storage;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub(crate) const API_PREFIX: &str = "/api/v1";
const USER_NOT_FOUND: &str = "USER_NOT_FOUND";

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("Session expired. Please sign in again.")]
    Unauthorized,
    #[error("{0}")]
    Network(String),
    #[error("Unexpected server response: {0}")]
    Parse(String),
    #[error("{message}")]
    Server {
        message: String,
        code: Option<String>,
    },
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self::Parse(e.to_string())
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Uniform response wrapper: `{ success, data?, error?, pagination? }`.
#[derive(Deserialize, Clone, Debug)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "none")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ErrorBody>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> Envelope<T> {
    fn failure(&self, fallback: &str) -> ApiError {
        match &self.error {
            Some(e) if !e.message.trim().is_empty() => ApiError::Server {
                message: e.message.clone(),
                code: e.code.clone(),
            },
            e => ApiError::Server {
                message: fallback.to_string(),
                code: e.as_ref().and_then(|e| e.code.clone()),
            },
        }
    }

    /// Payload of a successful response; a missing payload is an error.
    pub fn into_data(self, fallback: &str) -> ApiResult<T> {
        if !self.success {
            return Err(self.failure(fallback));
        }
        self.data
            .ok_or_else(|| ApiError::Parse(format!("{fallback}: response has no data")))
    }

    /// Success flag only, for endpoints whose payload is just a message.
    pub fn into_unit(self, fallback: &str) -> ApiResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(self.failure(fallback))
        }
    }
}

/// True when the backend no longer accepts this session.
pub(crate) fn is_session_rejected(status: u16, error_code: Option<&str>) -> bool {
    status == 401 || error_code == Some(USER_NOT_FOUND)
}

pub(crate) struct Decoded<T> {
    pub result: ApiResult<Envelope<T>>,
    /// Set when the caller must purge tokens and broadcast the logout.
    pub session_rejected: bool,
}

/// Decode a raw response body. A rejected session still reports the
/// server's own error message when the body carries one.
pub(crate) fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Decoded<T> {
    let parsed = serde_json::from_str::<Envelope<T>>(body);

    let code = parsed
        .as_ref()
        .ok()
        .and_then(|env| env.error.as_ref())
        .and_then(|e| e.code.as_deref());
    let session_rejected = is_session_rejected(status, code);

    let result = match parsed {
        Ok(env) if session_rejected => {
            let has_message = env
                .error
                .as_ref()
                .is_some_and(|e| !e.message.trim().is_empty());
            if has_message {
                Err(env.failure(""))
            } else {
                Err(ApiError::Unauthorized)
            }
        }
        Err(_) if session_rejected => Err(ApiError::Unauthorized),
        Ok(env) => Ok(env),
        Err(e) if (200..300).contains(&status) => Err(ApiError::parse(e)),
        Err(_) => Err(ApiError::Server {
            message: format!("Request failed ({status})"),
            code: None,
        }),
    };
    Decoded {
        result,
        session_rejected,
    }
}

pub(crate) fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[derive(Clone, Debug)]
enum Auth {
    /// Stored access token, if any.
    Session,
    /// Telegram init data, validated server-side.
    Tma(String),
    Anonymous,
}

const NO_BODY: Option<&()> = None;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

#[derive(Serialize, Clone, Debug)]
pub(crate) struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleAuthRequest {
    pub id_token: String,
}

/// `folder_id: Some(None)` serializes as `null` and removes the folder.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LectureUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Option<String>>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FolderCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FolderUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<String>>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct TagCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct TagUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateShareRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_transcription: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_summary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_key_points: Option<bool>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateShareRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_transcription: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_summary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_key_points: Option<bool>,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct UserResponse {
    pub user: User,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct LectureResponse {
    pub lecture: Lecture,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LecturePage {
    pub lectures: Vec<Lecture>,
    pub pagination: Pagination,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct BatchStatusResponse {
    pub statuses: HashMap<String, LectureStatusLight>,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct TranscriptResponse {
    pub transcription: Transcription,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SummaryResponse {
    pub summary: LectureSummary,
    #[serde(default)]
    pub key_points: Option<Vec<KeyPoint>>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KeyPointsResponse {
    pub key_points: Vec<KeyPoint>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MindMapResponse {
    pub mind_map: MindMap,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PainPointsResponse {
    pub key_pain_points: Vec<PainPoint>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SuggestionsResponse {
    pub product_suggestions: Vec<ProductSuggestion>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActionsResponse {
    pub internal_action_items: Vec<ActionItem>,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct TagsResponse {
    pub tags: Vec<Tag>,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct TagResponse {
    pub tag: Tag,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct FoldersResponse {
    pub folders: Vec<Folder>,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct FolderResponse {
    pub folder: Folder,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShareResponse {
    pub share: LectureShare,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct CheckSlugResponse {
    pub available: bool,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct PlansResponse {
    pub plans: Vec<SubscriptionPlan>,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct PackagesResponse {
    pub packages: Vec<MinutePackage>,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct BalanceResponse {
    pub balance: MinutesBalance,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct SubscriptionResponse {
    #[serde(default)]
    pub subscription: Option<UserSubscription>,
}

/// Shared shape of plan activation and package purchase responses.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PurchaseResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub requires_payment: bool,
    #[serde(default)]
    pub payment_url: Option<String>,
}

impl PurchaseResponse {
    /// Where the user must go to pay, if anywhere.
    pub fn payment_redirect(&self) -> Option<&str> {
        if !self.requires_payment {
            return None;
        }
        self.payment_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct TransactionsResponse {
    pub transactions: Vec<MinuteTransaction>,
    pub pagination: Pagination,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InitTelegramLinkResponse {
    pub deep_link: String,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InitGoogleLinkResponse {
    pub token: String,
}

#[derive(Deserialize, Clone, Debug)]
pub(crate) struct CompleteGoogleLinkResponse {
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct HealthStatus {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    events: SessionEvents,
}

impl ApiClient {
    pub fn new(base_url: String, events: SessionEvents) -> Self {
        Self { base_url, events }
    }

    pub fn from_env(events: SessionEvents) -> Self {
        Self::new(EnvConfig::new().api_url, events)
    }

    pub fn with_base_url(&self, base_url: String) -> Self {
        Self {
            base_url,
            events: self.events.clone(),
        }
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    pub fn is_authenticated(&self) -> bool {
        storage::load_access_token().is_some()
    }

    pub fn auth_header(&self) -> Option<String> {
        storage::load_access_token().map(|t| bearer(&t))
    }

    pub fn upload_endpoint(&self) -> String {
        format!("{}{}/uploads", self.origin(), API_PREFIX)
    }

    pub fn logout(&self) {
        storage::clear_tokens();
    }

    /// The backend refused this session: purge both tokens and tell every store.
    pub fn reject_session(&self) {
        storage::clear_tokens();
        self.events.emit_logout();
    }

    /// An empty base means same-origin; fetch still needs an absolute URL.
    fn origin(&self) -> String {
        if self.base_url.is_empty() {
            config::page_origin()
        } else {
            self.base_url.clone()
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.origin(), API_PREFIX, path)
    }

    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: Auth,
    ) -> ApiResult<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let client = reqwest::Client::new();
        let mut req = client
            .request(method.clone(), self.url(path))
            .header("Content-Type", "application/json");

        match auth {
            Auth::Session => {
                if let Some(header) = self.auth_header() {
                    req = req.header("Authorization", header);
                }
            }
            Auth::Tma(init_data) => {
                req = req.header("Authorization", format!("tma {init_data}"));
            }
            Auth::Anonymous => {}
        }

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status().as_u16();
        let text = res.text().await.map_err(ApiError::network)?;

        let decoded = decode_envelope::<T>(status, &text);
        if decoded.session_rejected {
            tracing::warn!(%method, path, status, "request rejected, clearing session");
            self.reject_session();
        } else if let Err(e) = &decoded.result {
            tracing::debug!(%method, path, status, error = %e, "request failed");
        }
        decoded.result
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> ApiResult<T> {
        self.send::<T, ()>(Method::GET, path, NO_BODY, Auth::Session)
            .await?
            .into_data(fallback)
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> ApiResult<T> {
        self.send::<T, B>(Method::POST, path, Some(body), Auth::Session)
            .await?
            .into_data(fallback)
    }

    async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> ApiResult<T> {
        self.send::<T, B>(Method::PATCH, path, Some(body), Auth::Session)
            .await?
            .into_data(fallback)
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> ApiResult<T> {
        self.send::<T, B>(Method::PUT, path, Some(body), Auth::Session)
            .await?
            .into_data(fallback)
    }

    /// Body-less command whose response carries only a message.
    async fn command(&self, method: Method, path: &str, fallback: &str) -> ApiResult<()> {
        self.send::<serde_json::Value, ()>(method, path, NO_BODY, Auth::Session)
            .await?
            .into_unit(fallback)
    }

    // -- health -------------------------------------------------------------

    pub async fn test_connection(&self) -> ApiResult<HealthStatus> {
        let res = reqwest::Client::new()
            .get(format!("{}/health", self.origin()))
            .send()
            .await
            .map_err(ApiError::network)?;

        if !res.status().is_success() {
            return Err(ApiError::Server {
                message: format!("Server responded with {}", res.status().as_u16()),
                code: None,
            });
        }

        let body: serde_json::Value = res.json().await.unwrap_or(serde_json::Value::Null);
        let status = body
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or("OK")
            .to_string();
        Ok(HealthStatus { status })
    }

    // -- auth ---------------------------------------------------------------

    fn keep_tokens(payload: &AuthPayload) {
        storage::save_tokens(&payload.tokens);
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthPayload> {
        let payload: AuthPayload = self
            .post(
                "/auth/login",
                &CredentialsRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                },
                "Login failed",
            )
            .await?;
        Self::keep_tokens(&payload);
        Ok(payload)
    }

    pub async fn register(&self, email: &str, password: &str) -> ApiResult<AuthPayload> {
        let payload: AuthPayload = self
            .post(
                "/auth/register",
                &CredentialsRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                },
                "Registration failed",
            )
            .await?;
        Self::keep_tokens(&payload);
        Ok(payload)
    }

    pub async fn google_auth(&self, id_token: &str) -> ApiResult<AuthPayload> {
        let payload: AuthPayload = self
            .post(
                "/auth/google",
                &GoogleAuthRequest {
                    id_token: id_token.to_string(),
                },
                "Google login failed",
            )
            .await?;
        Self::keep_tokens(&payload);
        Ok(payload)
    }

    pub async fn telegram_auth(&self, init_data_raw: &str) -> ApiResult<AuthPayload> {
        let payload: AuthPayload = self
            .send::<AuthPayload, ()>(
                Method::POST,
                "/auth/telegram/webapp",
                NO_BODY,
                Auth::Tma(init_data_raw.to_string()),
            )
            .await?
            .into_data("Telegram authentication failed")?;
        Self::keep_tokens(&payload);
        Ok(payload)
    }

    pub async fn get_me(&self) -> ApiResult<User> {
        let r: UserResponse = self.get("/auth/me", "Failed to fetch user").await?;
        Ok(r.user)
    }

    // -- lectures -----------------------------------------------------------

    pub async fn get_lectures(
        &self,
        page: u32,
        limit: u32,
        status: Option<&str>,
    ) -> ApiResult<LecturePage> {
        let mut path = format!("/lectures?page={page}&limit={limit}&fields=minimal");
        if let Some(status) = status.filter(|s| !s.is_empty()) {
            path.push_str(&format!("&status={}", urlencoding::encode(status)));
        }

        let env = self
            .send::<Vec<Lecture>, ()>(Method::GET, &path, NO_BODY, Auth::Session)
            .await?;
        let pagination = env
            .pagination
            .clone()
            .unwrap_or_else(|| Pagination::single_page(page, limit));
        if !env.success {
            return Err(env.failure("Failed to load lectures"));
        }
        Ok(LecturePage {
            lectures: env.data.unwrap_or_default(),
            pagination,
        })
    }

    pub async fn get_lecture(&self, id: &str) -> ApiResult<Lecture> {
        let r: LectureResponse = self
            .get(&format!("/lectures/{id}"), "Failed to load lecture")
            .await?;
        Ok(r.lecture)
    }

    pub async fn update_lecture(&self, id: &str, req: &LectureUpdateRequest) -> ApiResult<Lecture> {
        let r: LectureResponse = self
            .patch(&format!("/lectures/{id}"), req, "Failed to update lecture")
            .await?;
        Ok(r.lecture)
    }

    pub async fn delete_lecture(&self, id: &str) -> ApiResult<()> {
        self.command(Method::DELETE, &format!("/lectures/{id}"), "Failed to delete lecture")
            .await
    }

    pub async fn get_lecture_status_light(&self, id: &str) -> ApiResult<LectureStatusLight> {
        self.get(&format!("/lectures/{id}/status/light"), "Failed to fetch status")
            .await
    }

    pub async fn get_lecture_status_batch(
        &self,
        ids: &[String],
    ) -> ApiResult<HashMap<String, LectureStatusLight>> {
        let r: BatchStatusResponse = self
            .post(
                "/lectures/status",
                &serde_json::json!({ "ids": ids }),
                "Failed to fetch statuses",
            )
            .await?;
        Ok(r.statuses)
    }

    pub async fn get_lecture_transcript(
        &self,
        id: &str,
        page: Option<(u32, u32)>,
    ) -> ApiResult<Transcription> {
        let mut path = format!("/lectures/{id}/transcript");
        if let Some((page, limit)) = page {
            path.push_str(&format!("?page={page}&limit={limit}"));
        }
        let r: TranscriptResponse = self.get(&path, "Failed to load transcript").await?;
        Ok(r.transcription)
    }

    pub async fn get_lecture_summary(&self, id: &str) -> ApiResult<SummaryResponse> {
        self.get(&format!("/lectures/{id}/summary"), "Failed to load summary")
            .await
    }

    pub async fn get_lecture_key_points(&self, id: &str) -> ApiResult<Vec<KeyPoint>> {
        let r: KeyPointsResponse = self
            .get(&format!("/lectures/{id}/keypoints"), "Failed to load key points")
            .await?;
        Ok(r.key_points)
    }

    pub async fn get_custdev_data(&self, id: &str) -> ApiResult<CustDevData> {
        self.get(&format!("/lectures/{id}/custdev"), "Failed to load analysis")
            .await
    }

    pub async fn get_custdev_mind_map(&self, id: &str) -> ApiResult<MindMap> {
        let r: MindMapResponse = self
            .get(&format!("/lectures/{id}/custdev/mindmap"), "Failed to load mind map")
            .await?;
        Ok(r.mind_map)
    }

    pub async fn get_custdev_pain_points(&self, id: &str) -> ApiResult<Vec<PainPoint>> {
        let r: PainPointsResponse = self
            .get(&format!("/lectures/{id}/custdev/painpoints"), "Failed to load pain points")
            .await?;
        Ok(r.key_pain_points)
    }

    pub async fn get_custdev_suggestions(&self, id: &str) -> ApiResult<Vec<ProductSuggestion>> {
        let r: SuggestionsResponse = self
            .get(&format!("/lectures/{id}/custdev/suggestions"), "Failed to load suggestions")
            .await?;
        Ok(r.product_suggestions)
    }

    pub async fn get_custdev_actions(&self, id: &str) -> ApiResult<Vec<ActionItem>> {
        let r: ActionsResponse = self
            .get(&format!("/lectures/{id}/custdev/actions"), "Failed to load action items")
            .await?;
        Ok(r.internal_action_items)
    }

    pub async fn get_user_stats(&self) -> ApiResult<UserStats> {
        self.get("/users/stats", "Failed to load stats").await
    }

    // -- lecture tags -------------------------------------------------------

    pub async fn get_lecture_tags(&self, lecture_id: &str) -> ApiResult<Vec<Tag>> {
        let r: TagsResponse = self
            .get(&format!("/lectures/{lecture_id}/tags"), "Failed to load lecture tags")
            .await?;
        Ok(r.tags)
    }

    pub async fn set_lecture_tags(&self, lecture_id: &str, tag_ids: &[String]) -> ApiResult<Vec<Tag>> {
        let r: TagsResponse = self
            .put(
                &format!("/lectures/{lecture_id}/tags"),
                &serde_json::json!({ "tagIds": tag_ids }),
                "Failed to set lecture tags",
            )
            .await?;
        Ok(r.tags)
    }

    pub async fn add_tag_to_lecture(&self, lecture_id: &str, tag_id: &str) -> ApiResult<()> {
        self.command(
            Method::POST,
            &format!("/lectures/{lecture_id}/tags/{tag_id}"),
            "Failed to add tag",
        )
        .await
    }

    pub async fn remove_tag_from_lecture(&self, lecture_id: &str, tag_id: &str) -> ApiResult<()> {
        self.command(
            Method::DELETE,
            &format!("/lectures/{lecture_id}/tags/{tag_id}"),
            "Failed to remove tag",
        )
        .await
    }

    // -- folders ------------------------------------------------------------

    pub async fn get_folders(&self) -> ApiResult<Vec<Folder>> {
        let r: FoldersResponse = self.get("/folders", "Failed to load folders").await?;
        Ok(r.folders)
    }

    pub async fn get_folders_tree(&self) -> ApiResult<Vec<Folder>> {
        let r: FoldersResponse = self
            .get("/folders/tree", "Failed to load folders tree")
            .await?;
        Ok(r.folders)
    }

    pub async fn create_folder(&self, req: &FolderCreateRequest) -> ApiResult<Folder> {
        let r: FolderResponse = self
            .post("/folders", req, "Failed to create folder")
            .await?;
        Ok(r.folder)
    }

    pub async fn update_folder(&self, id: &str, req: &FolderUpdateRequest) -> ApiResult<Folder> {
        let r: FolderResponse = self
            .patch(&format!("/folders/{id}"), req, "Failed to update folder")
            .await?;
        Ok(r.folder)
    }

    pub async fn delete_folder(&self, id: &str) -> ApiResult<()> {
        self.command(Method::DELETE, &format!("/folders/{id}"), "Failed to delete folder")
            .await
    }

    // -- tags ---------------------------------------------------------------

    pub async fn get_tags(&self, counts: bool) -> ApiResult<Vec<Tag>> {
        let path = if counts { "/tags?counts=true" } else { "/tags" };
        let r: TagsResponse = self.get(path, "Failed to load tags").await?;
        Ok(r.tags)
    }

    pub async fn create_tag(&self, req: &TagCreateRequest) -> ApiResult<Tag> {
        let r: TagResponse = self.post("/tags", req, "Failed to create tag").await?;
        Ok(r.tag)
    }

    pub async fn update_tag(&self, id: &str, req: &TagUpdateRequest) -> ApiResult<Tag> {
        let r: TagResponse = self
            .patch(&format!("/tags/{id}"), req, "Failed to update tag")
            .await?;
        Ok(r.tag)
    }

    pub async fn delete_tag(&self, id: &str) -> ApiResult<()> {
        self.command(Method::DELETE, &format!("/tags/{id}"), "Failed to delete tag")
            .await
    }

    // -- sharing ------------------------------------------------------------

    pub async fn create_share(
        &self,
        lecture_id: &str,
        req: &CreateShareRequest,
    ) -> ApiResult<ShareResponse> {
        self.post(&format!("/lectures/{lecture_id}/share"), req, "Failed to create share link")
            .await
    }

    pub async fn get_share(&self, lecture_id: &str) -> ApiResult<ShareResponse> {
        self.get(&format!("/lectures/{lecture_id}/share"), "Share not found")
            .await
    }

    pub async fn update_share(
        &self,
        lecture_id: &str,
        req: &UpdateShareRequest,
    ) -> ApiResult<ShareResponse> {
        self.patch(&format!("/lectures/{lecture_id}/share"), req, "Failed to update share")
            .await
    }

    pub async fn delete_share(&self, lecture_id: &str) -> ApiResult<()> {
        self.command(
            Method::DELETE,
            &format!("/lectures/{lecture_id}/share"),
            "Failed to delete share",
        )
        .await
    }

    pub async fn check_slug_availability(&self, slug: &str) -> ApiResult<CheckSlugResponse> {
        self.post(
            "/shares/check-slug",
            &serde_json::json!({ "slug": slug }),
            "Failed to check slug",
        )
        .await
    }

    /// Public projection of a shared lecture; sent without credentials.
    pub async fn get_public_lecture(&self, slug: &str) -> ApiResult<PublicLecture> {
        self.send::<PublicLecture, ()>(
            Method::GET,
            &format!("/s/{}", urlencoding::encode(slug)),
            NO_BODY,
            Auth::Anonymous,
        )
        .await?
        .into_data("Shared lecture not found")
    }

    // -- subscription -------------------------------------------------------

    pub async fn get_plans(&self) -> ApiResult<Vec<SubscriptionPlan>> {
        let r: PlansResponse = self
            .get("/subscription/plans", "Failed to fetch plans")
            .await?;
        Ok(r.plans)
    }

    pub async fn get_packages(&self) -> ApiResult<Vec<MinutePackage>> {
        let r: PackagesResponse = self
            .get("/subscription/packages", "Failed to fetch packages")
            .await?;
        Ok(r.packages)
    }

    pub async fn get_balance(&self) -> ApiResult<MinutesBalance> {
        let r: BalanceResponse = self
            .get("/subscription/balance", "Failed to fetch balance")
            .await?;
        Ok(r.balance)
    }

    pub async fn get_subscription(&self) -> ApiResult<Option<UserSubscription>> {
        let r: SubscriptionResponse = self
            .get("/subscription/me", "Failed to fetch subscription")
            .await?;
        Ok(r.subscription)
    }

    pub async fn activate_plan(&self, plan_name: &str) -> ApiResult<PurchaseResponse> {
        self.post(
            "/subscription/activate-plan-by-name",
            &serde_json::json!({ "planName": plan_name }),
            "Failed to activate plan",
        )
        .await
    }

    pub async fn purchase_package(&self, package_name: &str) -> ApiResult<PurchaseResponse> {
        self.post(
            "/subscription/purchase-package-by-name",
            &serde_json::json!({ "packageName": package_name }),
            "Failed to purchase package",
        )
        .await
    }

    pub async fn get_transactions(&self, page: u32, limit: u32) -> ApiResult<TransactionsResponse> {
        self.get(
            &format!("/subscription/transactions?page={page}&limit={limit}"),
            "Failed to fetch transactions",
        )
        .await
    }

    // -- account linking ----------------------------------------------------

    pub async fn get_linked_accounts_status(&self) -> ApiResult<LinkedAccountsStatus> {
        self.get("/auth/link/status", "Failed to load linked accounts")
            .await
    }

    pub async fn init_telegram_link(&self) -> ApiResult<InitTelegramLinkResponse> {
        self.send::<InitTelegramLinkResponse, ()>(
            Method::POST,
            "/auth/link/telegram/init",
            NO_BODY,
            Auth::Session,
        )
        .await?
        .into_data("Failed to start Telegram linking")
    }

    pub async fn init_google_link(&self) -> ApiResult<InitGoogleLinkResponse> {
        self.send::<InitGoogleLinkResponse, ()>(
            Method::POST,
            "/auth/link/google/init",
            NO_BODY,
            Auth::Session,
        )
        .await?
        .into_data("Failed to start Google linking")
    }

    pub async fn complete_google_link(
        &self,
        token: &str,
        id_token: &str,
    ) -> ApiResult<CompleteGoogleLinkResponse> {
        self.post(
            "/auth/link/google/complete",
            &serde_json::json!({ "token": token, "idToken": id_token }),
            "Failed to link Google account",
        )
        .await
    }

    pub async fn unlink_google(&self) -> ApiResult<()> {
        self.command(Method::POST, "/auth/unlink/google", "Failed to unlink Google")
            .await
    }

    pub async fn unlink_telegram(&self) -> ApiResult<()> {
        self.command(Method::POST, "/auth/unlink/telegram", "Failed to unlink Telegram")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success_with_data() {
        let body = r#"{"success": true, "data": {"user": {"id": "u1", "createdAt": ""}}}"#;
        let decoded = decode_envelope::<UserResponse>(200, body);
        assert!(!decoded.session_rejected);
        let env = decoded.result.expect("should decode");
        let data = env.into_data("fallback").expect("should have data");
        assert_eq!(data.user.id, "u1");
    }

    #[test]
    fn test_decode_401_without_envelope_is_unauthorized() {
        let d = decode_envelope::<serde_json::Value>(401, "not json");
        assert!(d.session_rejected);
        assert_eq!(d.result.err(), Some(ApiError::Unauthorized));

        let d = decode_envelope::<serde_json::Value>(401, r#"{"success": false}"#);
        assert!(d.session_rejected);
        assert_eq!(d.result.err(), Some(ApiError::Unauthorized));
    }

    #[test]
    fn test_decode_401_keeps_server_message() {
        let d = decode_envelope::<serde_json::Value>(
            401,
            r#"{"success": false, "error": {"message": "Invalid email or password"}}"#,
        );
        assert!(d.session_rejected);
        let err = d.result.expect_err("should fail");
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn test_decode_401_rejects_session_even_when_flagged_success() {
        let d = decode_envelope::<serde_json::Value>(401, r#"{"success": true, "data": {}}"#);
        assert!(d.session_rejected);
        assert_eq!(d.result.err(), Some(ApiError::Unauthorized));
    }

    #[test]
    fn test_decode_user_not_found_rejects_session() {
        let body = r#"{"success": false, "error": {"message": "User not found", "code": "USER_NOT_FOUND"}}"#;
        let d = decode_envelope::<serde_json::Value>(404, body);
        assert!(d.session_rejected);
        assert_eq!(
            d.result.err(),
            Some(ApiError::Server {
                message: "User not found".to_string(),
                code: Some("USER_NOT_FOUND".to_string()),
            })
        );
    }

    #[test]
    fn test_server_error_message_is_surfaced() {
        let body = r#"{"success": false, "error": {"message": "Lecture not found", "code": "NOT_FOUND"}}"#;
        let d = decode_envelope::<LectureResponse>(404, body);
        assert!(!d.session_rejected);
        let env = d.result.expect("envelope parses");
        let err = env.into_data("Failed to load lecture").expect_err("should fail");
        assert_eq!(err.to_string(), "Lecture not found");
        assert!(matches!(err, ApiError::Server { code: Some(c), .. } if c == "NOT_FOUND"));
    }

    #[test]
    fn test_missing_error_message_uses_fallback() {
        let env = decode_envelope::<LectureResponse>(500, r#"{"success": false}"#)
            .result
            .expect("envelope parses");
        let err = env.into_data("Failed to load lecture").expect_err("should fail");
        assert_eq!(err.to_string(), "Failed to load lecture");
    }

    #[test]
    fn test_non_json_error_body_is_server_error() {
        let err = decode_envelope::<serde_json::Value>(502, "<html>Bad gateway</html>")
            .result
            .expect_err("should fail");
        assert_eq!(err.to_string(), "Request failed (502)");
    }

    #[test]
    fn test_non_json_success_body_is_parse_error() {
        let err = decode_envelope::<serde_json::Value>(200, "oops")
            .result
            .expect_err("should fail");
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn test_list_envelope_carries_pagination() {
        let body = r#"{
            "success": true,
            "data": [{"id": "l1", "status": "completed"}],
            "pagination": {"page": 2, "limit": 10, "total": 11, "totalPages": 2, "hasNext": false, "hasPrev": true}
        }"#;
        let env = decode_envelope::<Vec<Lecture>>(200, body).result.expect("decode");
        assert_eq!(env.pagination.as_ref().map(|p| p.page), Some(2));
        assert_eq!(env.data.map(|d| d.len()), Some(1));
    }

    #[test]
    fn test_unit_command_ignores_missing_data() {
        let env = decode_envelope::<serde_json::Value>(200, r#"{"success": true}"#)
            .result
            .expect("decode");
        assert!(env.into_unit("x").is_ok());
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(bearer("my-jwt-token"), "Bearer my-jwt-token");
    }

    #[test]
    fn test_lecture_update_folder_removal_serializes_null() {
        let req = LectureUpdateRequest {
            folder_id: Some(None),
            ..Default::default()
        };
        let v = serde_json::to_value(req).expect("serialize");
        assert_eq!(v, serde_json::json!({ "folderId": null }));
    }

    #[test]
    fn test_lecture_update_omits_untouched_fields() {
        let req = LectureUpdateRequest {
            title: Some("T".into()),
            language: Some(Language::Ru),
            folder_id: None,
        };
        let v = serde_json::to_value(req).expect("serialize");
        assert_eq!(v, serde_json::json!({ "title": "T", "language": "ru" }));
    }

    #[test]
    fn test_purchase_redirect_requires_flag_and_url() {
        let free = PurchaseResponse {
            message: "ok".into(),
            requires_payment: false,
            payment_url: Some("https://pay".into()),
        };
        assert!(free.payment_redirect().is_none());

        let paid = PurchaseResponse {
            message: "pay".into(),
            requires_payment: true,
            payment_url: Some("https://pay.example/1".into()),
        };
        assert_eq!(paid.payment_redirect(), Some("https://pay.example/1"));
    }

    #[test]
    fn test_upload_endpoint_and_api_paths() {
        let client = ApiClient::new("http://localhost:3000".into(), SessionEvents::new());
        assert_eq!(client.upload_endpoint(), "http://localhost:3000/api/v1/uploads");
        assert_eq!(client.url("/folders"), "http://localhost:3000/api/v1/folders");
    }
}
