use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Backend user object returned by `/auth/me` and every login endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub google_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
    #[serde(default)]
    pub auth_provider: Option<String>,
    #[serde(default)]
    pub telegram_id: Option<i64>,
    #[serde(default)]
    pub telegram_username: Option<String>,
    #[serde(default)]
    pub telegram_first_name: Option<String>,
    #[serde(default)]
    pub telegram_last_name: Option<String>,
    #[serde(default)]
    pub telegram_photo_url: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl User {
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|s| !s.trim().is_empty()) {
            return name.to_string();
        }
        if let Some(first) = self.telegram_first_name.as_deref() {
            return match self.telegram_last_name.as_deref() {
                Some(last) if !last.is_empty() => format!("{first} {last}"),
                _ => first.to_string(),
            };
        }
        if let Some(username) = self.telegram_username.as_deref() {
            return format!("@{username}");
        }
        self.email.clone().unwrap_or_else(|| "User".to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthPayload {
    pub user: User,
    pub tokens: AuthTokens,
    #[serde(default)]
    pub is_new_user: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Placeholder used when a list endpoint omits pagination.
    pub fn single_page(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            total: 0,
            total_pages: 1,
            has_next: false,
            has_prev: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Lectures
// ---------------------------------------------------------------------------

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum LectureStatus {
    Uploaded,
    Extracting,
    Transcribing,
    Summarizing,
    Completed,
    Failed,
}

impl LectureStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn is_processing(self) -> bool {
        !self.is_terminal()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Uploaded => "Uploaded",
            Self::Extracting => "Extracting audio",
            Self::Transcribing => "Transcribing",
            Self::Summarizing => "Summarizing",
            Self::Completed => "Ready",
            Self::Failed => "Failed",
        }
    }
}

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Language {
    #[default]
    Uz,
    Ru,
    En,
}

impl Language {
    pub fn label(self) -> &'static str {
        match self {
            Self::Uz => "O'zbekcha",
            Self::Ru => "Русский",
            Self::En => "English",
        }
    }
}

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum SummarizationType {
    #[default]
    Lecture,
    Custdev,
}

impl SummarizationType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Lecture => "Lecture Summary",
            Self::Custdev => "CustDev Analysis",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranscriptionSegment {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub start_time_ms: Option<u64>,
    #[serde(default)]
    pub end_time_ms: Option<u64>,
    #[serde(default)]
    pub start_time_formatted: String,
    #[serde(default)]
    pub end_time_formatted: String,
    pub text: String,
    #[serde(default)]
    pub speaker: Option<String>,
}

impl TranscriptionSegment {
    /// Segment start in seconds, whichever unit the backend sent.
    pub fn start_seconds(&self) -> Option<f64> {
        self.start_time
            .or_else(|| self.start_time_ms.map(|ms| ms as f64 / 1000.0))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Transcription {
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub word_count: Option<u32>,
    #[serde(default)]
    pub segments: Vec<TranscriptionSegment>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Chapter {
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub end_time: f64,
    #[serde(default)]
    pub start_time_formatted: String,
    #[serde(default)]
    pub end_time_formatted: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KeyPoint {
    pub index: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub timestamp_formatted: Option<String>,
    #[serde(default)]
    pub importance: Option<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LectureSummary {
    #[serde(default)]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub custdev_data: Option<CustDevData>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Lecture {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_filename: String,
    #[serde(default)]
    pub file_size_bytes: u64,
    pub status: LectureStatus,
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub summarization_type: SummarizationType,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub duration_formatted: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub transcription: Option<Transcription>,
    #[serde(default)]
    pub summary: Option<LectureSummary>,
    #[serde(default)]
    pub key_points: Option<Vec<KeyPoint>>,
    #[serde(default)]
    pub tags: Option<Vec<Tag>>,
}

impl Lecture {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.original_filename)
    }

    pub fn tag_ids(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().flatten().map(|t| t.id.as_str())
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag_ids().any(|id| id == tag_id)
    }

    /// Merge a server-side update into the locally held copy, keeping lazily
    /// loaded payloads the update response does not carry.
    pub fn merge_update(&mut self, updated: Lecture) {
        let transcription = self.transcription.take();
        let summary = self.summary.take();
        let key_points = self.key_points.take();
        let tags = self.tags.take();

        *self = updated;
        if self.transcription.is_none() {
            self.transcription = transcription;
        }
        if self.summary.is_none() {
            self.summary = summary;
        }
        if self.key_points.is_none() {
            self.key_points = key_points;
        }
        if self.tags.is_none() {
            self.tags = tags;
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LectureStatusLight {
    pub id: String,
    pub status: LectureStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserStats {
    pub total: u32,
    pub completed: u32,
    pub processing: u32,
    pub failed: u32,
}

// ---------------------------------------------------------------------------
// CustDev analysis
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display)]
pub(crate) enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CallSummary {
    pub title: String,
    pub overview: String,
    #[serde(default)]
    pub customer_mood: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PainPoint {
    pub pain_point: String,
    pub impact: String,
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PositiveFeedback {
    pub feature: String,
    pub benefit: String,
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductSuggestion {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub priority: Priority,
    #[serde(default)]
    pub related_pain_point: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActionItem {
    pub owner: String,
    pub action: String,
    pub priority: Priority,
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct MindMapNode {
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// Branch payloads differ per branch; the mind map tab renders them
/// generically, so they stay as JSON.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MindMap {
    pub central_node: MindMapNode,
    #[serde(default)]
    pub branches: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub connections: Vec<MindMapConnection>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct MindMapConnection {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustDevData {
    #[serde(default)]
    pub call_summary: Option<CallSummary>,
    #[serde(default)]
    pub key_pain_points: Option<Vec<PainPoint>>,
    #[serde(default)]
    pub positive_feedback: Option<Vec<PositiveFeedback>>,
    #[serde(default)]
    pub product_suggestions: Option<Vec<ProductSuggestion>>,
    #[serde(default)]
    pub internal_action_items: Option<Vec<ActionItem>>,
    #[serde(default)]
    pub mind_map: Option<MindMap>,
}

// ---------------------------------------------------------------------------
// Folders & tags
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub lecture_count: Option<u32>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub children: Vec<Folder>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub lecture_count: Option<u32>,
    #[serde(default)]
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Sharing
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LectureShare {
    pub id: String,
    pub lecture_id: String,
    pub slug: String,
    pub is_public: bool,
    pub show_transcription: bool,
    pub show_summary: bool,
    pub show_key_points: bool,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PublicSummary {
    #[serde(default)]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chapters: Vec<Chapter>,
}

/// Public projection of a shared lecture; fields hidden by the owner are null.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PublicLecture {
    pub slug: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub duration_formatted: Option<String>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub summarization_type: SummarizationType,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub transcription: Option<Transcription>,
    #[serde(default)]
    pub summary: Option<PublicSummary>,
    #[serde(default)]
    pub key_points: Option<Vec<KeyPoint>>,
}

// ---------------------------------------------------------------------------
// Subscription & billing
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub display_name_uz: Option<String>,
    pub price_uzs: u64,
    pub minutes_per_month: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_uz: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub features_uz: Option<Vec<String>>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MinutePackage {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub display_name_uz: Option<String>,
    pub price_uzs: u64,
    pub minutes: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_uz: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MinutesBalance {
    pub plan_minutes_remaining: f64,
    pub plan_minutes_total: f64,
    pub plan_minutes_used: f64,
    pub bonus_minutes: f64,
    pub total_available: f64,
    pub billing_cycle_start: String,
    pub billing_cycle_end: String,
    pub plan_name: String,
    pub plan_display_name: String,
    pub status: String,
}

impl MinutesBalance {
    /// Share of the plan allowance already used, clamped to 0..=100.
    pub fn used_percentage(&self) -> f64 {
        if self.plan_minutes_total <= 0.0 {
            return 0.0;
        }
        (self.plan_minutes_used / self.plan_minutes_total * 100.0).clamp(0.0, 100.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserSubscription {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    pub billing_cycle_start: String,
    pub billing_cycle_end: String,
    pub minutes_included: f64,
    pub minutes_used: f64,
    pub bonus_minutes: f64,
    pub status: String,
    #[serde(default)]
    pub plan: Option<SubscriptionPlan>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum TransactionKind {
    Deduction,
    Refund,
    Bonus,
    PackagePurchase,
    PlanReset,
}

impl TransactionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Deduction => "Used",
            Self::Refund => "Refund",
            Self::Bonus => "Bonus",
            Self::PackagePurchase => "Package",
            Self::PlanReset => "Plan renewal",
        }
    }

    /// Whether the transaction adds minutes to the balance.
    pub fn is_credit(self) -> bool {
        !matches!(self, Self::Deduction)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MinuteTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub minutes: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lecture_id: Option<String>,
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Account linking
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub(crate) struct LinkedProvider {
    pub linked: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub(crate) struct LinkedAccountsStatus {
    pub google: LinkedProvider,
    pub telegram: LinkedProvider,
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_lecture_contract_deserialize_minimal_fields() {
        let json = r#"{
            "id": "lec-1",
            "originalFilename": "intro.mp3",
            "fileSizeBytes": 1048576,
            "status": "transcribing",
            "summarizationType": "custdev",
            "folderId": null,
            "createdAt": "2026-01-10T10:00:00Z",
            "updatedAt": "2026-01-10T10:05:00Z"
        }"#;
        let lecture: Lecture = serde_json::from_str(json).expect("lecture should parse");
        assert_eq!(lecture.status, LectureStatus::Transcribing);
        assert_eq!(lecture.summarization_type, SummarizationType::Custdev);
        assert!(lecture.folder_id.is_none());
        assert_eq!(lecture.display_title(), "intro.mp3");
    }

    #[test]
    fn test_status_terminal_partition() {
        let terminal: Vec<_> = [
            LectureStatus::Uploaded,
            LectureStatus::Extracting,
            LectureStatus::Transcribing,
            LectureStatus::Summarizing,
            LectureStatus::Completed,
            LectureStatus::Failed,
        ]
        .into_iter()
        .filter(|s| s.is_terminal())
        .collect();
        assert_eq!(terminal, vec![LectureStatus::Completed, LectureStatus::Failed]);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(LectureStatus::Summarizing.to_string(), "summarizing");
        assert_eq!(Language::from_str("ru").ok(), Some(Language::Ru));
        assert_eq!(SummarizationType::Custdev.to_string(), "custdev");
        assert_eq!(
            serde_json::to_value(TransactionKind::PackagePurchase).ok(),
            Some(serde_json::json!("package_purchase"))
        );
    }

    #[test]
    fn test_only_deductions_are_debits() {
        assert!(!TransactionKind::Deduction.is_credit());
        for kind in [
            TransactionKind::Refund,
            TransactionKind::Bonus,
            TransactionKind::PackagePurchase,
            TransactionKind::PlanReset,
        ] {
            assert!(kind.is_credit());
        }
    }

    #[test]
    fn test_merge_update_keeps_lazy_payloads() {
        let mut held: Lecture = serde_json::from_value(serde_json::json!({
            "id": "a", "status": "completed", "title": "Old",
            "keyPoints": [{"index": 1, "title": "k"}],
            "tags": [{"id": "t1", "name": "math"}]
        }))
        .expect("lecture");
        let updated: Lecture = serde_json::from_value(serde_json::json!({
            "id": "a", "status": "completed", "title": "New"
        }))
        .expect("lecture");

        held.merge_update(updated);
        assert_eq!(held.title.as_deref(), Some("New"));
        assert_eq!(held.key_points.as_ref().map(|k| k.len()), Some(1));
        assert!(held.has_tag("t1"));
    }

    #[test]
    fn test_public_lecture_null_chapters() {
        let json = r#"{
            "slug": "my-talk",
            "title": null,
            "language": "uz",
            "summarizationType": "lecture",
            "createdAt": "2026-01-01",
            "summary": {"overview": "o", "chapters": null},
            "transcription": null
        }"#;
        let parsed: PublicLecture = serde_json::from_str(json).expect("public lecture");
        assert!(parsed.summary.expect("summary").chapters.is_empty());
        assert!(parsed.transcription.is_none());
    }

    #[test]
    fn test_balance_used_percentage_clamped() {
        let b = MinutesBalance {
            plan_minutes_remaining: 0.0,
            plan_minutes_total: 60.0,
            plan_minutes_used: 90.0,
            bonus_minutes: 0.0,
            total_available: 0.0,
            billing_cycle_start: String::new(),
            billing_cycle_end: String::new(),
            plan_name: "free".into(),
            plan_display_name: "Free".into(),
            status: "active".into(),
        };
        assert_eq!(b.used_percentage(), 100.0);
    }

    #[test]
    fn test_user_display_name_fallbacks() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "u1", "telegramFirstName": "Ali", "telegramLastName": "Valiyev"
        }))
        .expect("user");
        assert_eq!(user.display_name(), "Ali Valiyev");
    }
}
