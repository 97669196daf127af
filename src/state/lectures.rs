use crate::api::{ApiClient, LectureUpdateRequest};
use crate::models::{
    ActionItem, CustDevData, Lecture, LectureStatus, LectureStatusLight, MindMap, Pagination,
    PainPoint, ProductSuggestion, PublicLecture, Tag, UserStats,
};
use crate::state::poll::{PollGuard, PollTicket};
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use strum::{Display, EnumIter};

pub(crate) const PAGE_SIZE: u32 = 10;
pub(crate) const STATUS_POLL_INTERVAL_MS: u32 = 5_000;

/// Status pills of the lecture list. `Processing` groups every
/// non-terminal status and is filtered client-side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Display, EnumIter)]
pub(crate) enum StatusFilter {
    #[default]
    All,
    Completed,
    Processing,
    Failed,
}

impl StatusFilter {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Completed => "Ready",
            Self::Processing => "Processing",
            Self::Failed => "Failed",
        }
    }

    /// Value for the `status` query parameter, if the server can filter.
    pub fn server_status(self) -> Option<&'static str> {
        match self {
            Self::Completed => Some("completed"),
            Self::Failed => Some("failed"),
            Self::All | Self::Processing => None,
        }
    }

    pub fn matches(self, status: LectureStatus) -> bool {
        match self {
            Self::All => true,
            Self::Completed => status == LectureStatus::Completed,
            Self::Failed => status == LectureStatus::Failed,
            Self::Processing => status.is_processing(),
        }
    }
}

/// Client-side list filter. Every active criterion must hold.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct LectureFilter {
    pub folder_id: Option<String>,
    pub tag_ids: Vec<String>,
    pub status: StatusFilter,
}

impl LectureFilter {
    pub fn matches(&self, lecture: &Lecture) -> bool {
        if let Some(folder_id) = &self.folder_id {
            if lecture.folder_id.as_ref() != Some(folder_id) {
                return false;
            }
        }
        if !self.status.matches(lecture.status) {
            return false;
        }
        self.tag_ids.iter().all(|id| lecture.has_tag(id))
    }

    pub fn toggle_tag(&mut self, tag_id: &str) {
        if let Some(pos) = self.tag_ids.iter().position(|t| t == tag_id) {
            self.tag_ids.remove(pos);
        } else {
            self.tag_ids.push(tag_id.to_string());
        }
    }

    pub fn apply<'a>(&self, lectures: &'a [Lecture]) -> Vec<&'a Lecture> {
        lectures.iter().filter(|l| self.matches(l)).collect()
    }
}

fn processing_ids(lectures: &[Lecture]) -> Vec<String> {
    lectures
        .iter()
        .filter(|l| l.status.is_processing())
        .map(|l| l.id.clone())
        .collect()
}

pub(crate) fn apply_status_light(lecture: &mut Lecture, light: &LectureStatusLight) {
    lecture.status = light.status;
    lecture.error_message = light.error_message.clone();
}

#[derive(Clone, Copy)]
pub(crate) struct LecturesStore {
    api: RwSignal<ApiClient>,
    pub lectures: RwSignal<Vec<Lecture>>,
    pub selected: RwSignal<Option<Lecture>>,
    pub pagination: RwSignal<Option<Pagination>>,
    pub status_filter: RwSignal<StatusFilter>,
    pub custdev: RwSignal<Option<CustDevData>>,
    pub is_loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,

    /// Ignore stale list responses.
    load_request_id: RwSignal<u64>,
    poll: StoredValue<PollGuard>,
    list_poll: StoredValue<PollGuard>,
}

impl LecturesStore {
    pub fn new(api: RwSignal<ApiClient>) -> Self {
        Self {
            api,
            lectures: RwSignal::new(vec![]),
            selected: RwSignal::new(None),
            pagination: RwSignal::new(None),
            status_filter: RwSignal::new(StatusFilter::All),
            custdev: RwSignal::new(None),
            is_loading: RwSignal::new(false),
            error: RwSignal::new(None),
            load_request_id: RwSignal::new(0),
            poll: StoredValue::new(PollGuard::default()),
            list_poll: StoredValue::new(PollGuard::default()),
        }
    }

    pub async fn load_lectures(self, page: u32) {
        let request_id = self.load_request_id.get_untracked() + 1;
        self.load_request_id.set(request_id);
        self.is_loading.set(true);
        self.error.set(None);

        let api = self.api.get_untracked();
        let status = self.status_filter.get_untracked().server_status();
        let result = api.get_lectures(page, PAGE_SIZE, status).await;

        if self.load_request_id.get_untracked() != request_id {
            return;
        }
        match result {
            Ok(page) => {
                self.lectures.set(page.lectures);
                self.pagination.set(Some(page.pagination));
            }
            Err(e) => self.error.set(Some(e.to_string())),
        }
        self.is_loading.set(false);
    }

    pub async fn reload(self) {
        let page = self
            .pagination
            .get_untracked()
            .map(|p| p.page)
            .unwrap_or(1);
        self.load_lectures(page).await;
    }

    /// Loads a lecture into `selected`. The poll ticket is taken before the
    /// request, so a selection cleared meanwhile never starts a poller.
    pub async fn select_lecture(self, id: String) {
        let ticket = self.poll.with_value(|p| p.begin());
        self.is_loading.set(true);
        self.error.set(None);

        let api = self.api.get_untracked();
        let result = api.get_lecture(&id).await;
        self.is_loading.set(false);
        match result {
            Ok(lecture) => {
                if self.accept_selected(&ticket, lecture) {
                    self.poll_status(ticket, id);
                }
            }
            Err(e) if ticket.is_current() => self.error.set(Some(e.to_string())),
            Err(e) => tracing::debug!("dropping stale lecture error: {}", e),
        }
    }

    /// Stores a fetched lecture if its selection is still live. Returns true
    /// when the lecture is still processing and needs a status poller.
    fn accept_selected(&self, ticket: &PollTicket, lecture: Lecture) -> bool {
        if !ticket.is_current() {
            tracing::debug!("selection of {} superseded, ignoring response", lecture.id);
            return false;
        }
        let processing = lecture.status.is_processing();
        self.selected.set(Some(lecture));
        if !processing {
            self.stop_polling();
        }
        processing
    }

    pub async fn update_lecture(self, id: String, patch: LectureUpdateRequest) -> Option<Lecture> {
        let api = self.api.get_untracked();
        match api.update_lecture(&id, &patch).await {
            Ok(updated) => {
                self.selected.update(|sel| {
                    if let Some(l) = sel.as_mut().filter(|l| l.id == id) {
                        l.merge_update(updated.clone());
                    }
                });
                self.reload().await;
                Some(updated)
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                None
            }
        }
    }

    pub async fn delete_lecture(self, id: String) -> bool {
        let api = self.api.get_untracked();
        match api.delete_lecture(&id).await {
            Ok(()) => {
                if self.selected.with_untracked(|s| s.as_ref().is_some_and(|l| l.id == id)) {
                    self.clear_selection();
                }
                self.reload().await;
                true
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                false
            }
        }
    }

    pub fn set_status_filter(self, filter: StatusFilter) {
        self.status_filter.set(filter);
        spawn_local(self.load_lectures(1));
    }

    fn apply_light(&self, id: &str, light: &LectureStatusLight) {
        self.selected.update(|sel| {
            if let Some(l) = sel.as_mut().filter(|l| l.id == id) {
                apply_status_light(l, light);
            }
        });
        self.lectures.update(|list| {
            if let Some(l) = list.iter_mut().find(|l| l.id == id) {
                apply_status_light(l, light);
            }
        });
    }

    /// Poll the light status endpoint until the lecture settles. A newer
    /// ticket from the same guard supersedes this loop.
    fn poll_status(self, ticket: PollTicket, lecture_id: String) {
        tracing::debug!("polling status of {}", lecture_id);

        spawn_local(async move {
            loop {
                TimeoutFuture::new(STATUS_POLL_INTERVAL_MS).await;
                if !ticket.is_current() {
                    return;
                }

                let api = self.api.get_untracked();
                let light = match api.get_lecture_status_light(&lecture_id).await {
                    Ok(light) => light,
                    Err(e) => {
                        tracing::error!("Polling error: {}", e);
                        continue;
                    }
                };
                if !ticket.is_current() {
                    return;
                }

                self.apply_light(&lecture_id, &light);
                if light.status.is_terminal() {
                    self.stop_polling();
                    if light.status == LectureStatus::Completed {
                        self.select_lecture(lecture_id).await;
                    }
                    return;
                }
            }
        });
    }

    pub fn stop_polling(&self) {
        self.poll.with_value(|p| p.cancel());
    }

    /// Refresh the statuses of listed lectures that are still processing,
    /// one batch request per tick, until stopped.
    pub fn start_list_polling(self) {
        let ticket = self.list_poll.with_value(|p| p.begin());

        spawn_local(async move {
            loop {
                TimeoutFuture::new(STATUS_POLL_INTERVAL_MS).await;
                if !ticket.is_current() {
                    return;
                }
                let ids = self.lectures.with_untracked(|list| processing_ids(list));
                if ids.is_empty() {
                    continue;
                }

                let api = self.api.get_untracked();
                let lights = match api.get_lecture_status_batch(&ids).await {
                    Ok(lights) => lights,
                    Err(e) => {
                        tracing::error!("Batch status error: {}", e);
                        continue;
                    }
                };
                if !ticket.is_current() {
                    return;
                }
                for (id, light) in &lights {
                    self.apply_light(id, light);
                }
            }
        });
    }

    pub fn stop_list_polling(&self) {
        self.list_poll.with_value(|p| p.cancel());
    }

    pub fn clear_selection(&self) {
        self.stop_polling();
        self.selected.set(None);
        self.custdev.set(None);
    }

    pub fn clear_error(&self) {
        self.error.set(None);
    }

    pub fn reset(&self) {
        self.clear_selection();
        self.lectures.set(vec![]);
        self.pagination.set(None);
        self.error.set(None);
    }

    // -- lecture tags -------------------------------------------------------

    pub async fn get_lecture_tags(self, lecture_id: String) -> Vec<Tag> {
        let api = self.api.get_untracked();
        api.get_lecture_tags(&lecture_id).await.unwrap_or_else(|e| {
            tracing::error!("Failed to get lecture tags: {}", e);
            vec![]
        })
    }

    fn set_selected_tags(&self, lecture_id: &str, tags: Vec<Tag>) {
        self.selected.update(|sel| {
            if let Some(l) = sel.as_mut().filter(|l| l.id == lecture_id) {
                l.tags = Some(tags);
            }
        });
    }

    pub async fn set_lecture_tags(self, lecture_id: String, tag_ids: Vec<String>) -> Option<Vec<Tag>> {
        let api = self.api.get_untracked();
        match api.set_lecture_tags(&lecture_id, &tag_ids).await {
            Ok(tags) => {
                self.set_selected_tags(&lecture_id, tags.clone());
                Some(tags)
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                None
            }
        }
    }

    pub async fn add_tag_to_lecture(self, lecture_id: String, tag_id: String) -> bool {
        let api = self.api.get_untracked();
        match api.add_tag_to_lecture(&lecture_id, &tag_id).await {
            Ok(()) => {
                let tags = self.get_lecture_tags(lecture_id.clone()).await;
                self.set_selected_tags(&lecture_id, tags);
                true
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                false
            }
        }
    }

    /// Drops `tag_id` from the selected lecture right away and returns the
    /// tags it had, so a failed request can put them back.
    fn detach_selected_tag(&self, lecture_id: &str, tag_id: &str) -> Option<Vec<Tag>> {
        let mut previous = None;
        self.selected.update(|sel| {
            if let Some(tags) = sel
                .as_mut()
                .filter(|l| l.id == lecture_id)
                .and_then(|l| l.tags.as_mut())
            {
                previous = Some(tags.clone());
                tags.retain(|t| t.id != tag_id);
            }
        });
        previous
    }

    pub async fn remove_tag_from_lecture(self, lecture_id: String, tag_id: String) -> bool {
        let previous = self.detach_selected_tag(&lecture_id, &tag_id);
        let api = self.api.get_untracked();
        match api.remove_tag_from_lecture(&lecture_id, &tag_id).await {
            Ok(()) => true,
            Err(e) => {
                if let Some(tags) = previous {
                    self.set_selected_tags(&lecture_id, tags);
                }
                self.error.set(Some(e.to_string()));
                false
            }
        }
    }

    /// Fills in the selected lecture's tags when the detail response left them out.
    pub async fn load_selected_tags(self, lecture_id: String) {
        let tags = self.get_lecture_tags(lecture_id.clone()).await;
        self.set_selected_tags(&lecture_id, tags);
    }

    // -- lazy sub-resources -------------------------------------------------

    fn with_selected(&self, id: &str, f: impl FnOnce(&mut Lecture)) {
        self.selected.update(|sel| {
            if let Some(l) = sel.as_mut().filter(|l| l.id == id) {
                f(l);
            }
        });
    }

    pub async fn load_transcript(self, id: String) -> Result<(), String> {
        let api = self.api.get_untracked();
        let transcription = api
            .get_lecture_transcript(&id, None)
            .await
            .map_err(|e| e.to_string())?;
        self.with_selected(&id, |l| l.transcription = Some(transcription));
        Ok(())
    }

    pub async fn load_summary(self, id: String) -> Result<(), String> {
        let api = self.api.get_untracked();
        let res = api.get_lecture_summary(&id).await.map_err(|e| e.to_string())?;
        self.with_selected(&id, |l| {
            l.summary = Some(res.summary);
            if res.key_points.is_some() {
                l.key_points = res.key_points;
            }
        });
        Ok(())
    }

    pub async fn load_key_points(self, id: String) -> Result<(), String> {
        let api = self.api.get_untracked();
        let points = api
            .get_lecture_key_points(&id)
            .await
            .map_err(|e| e.to_string())?;
        self.with_selected(&id, |l| l.key_points = Some(points));
        Ok(())
    }

    pub async fn load_custdev(self, id: String) -> Result<(), String> {
        let api = self.api.get_untracked();
        let data = api.get_custdev_data(&id).await.map_err(|e| e.to_string())?;
        self.custdev.set(Some(data));
        Ok(())
    }

    pub async fn load_mind_map(self, id: String) -> Result<MindMap, String> {
        let api = self.api.get_untracked();
        api.get_custdev_mind_map(&id).await.map_err(|e| e.to_string())
    }

    pub async fn load_pain_points(self, id: String) -> Result<Vec<PainPoint>, String> {
        let api = self.api.get_untracked();
        api.get_custdev_pain_points(&id).await.map_err(|e| e.to_string())
    }

    pub async fn load_suggestions(self, id: String) -> Result<Vec<ProductSuggestion>, String> {
        let api = self.api.get_untracked();
        api.get_custdev_suggestions(&id).await.map_err(|e| e.to_string())
    }

    pub async fn load_actions(self, id: String) -> Result<Vec<ActionItem>, String> {
        let api = self.api.get_untracked();
        api.get_custdev_actions(&id).await.map_err(|e| e.to_string())
    }

    /// Shared lectures need no session; nothing is cached in the store.
    pub async fn load_public_lecture(self, slug: String) -> Result<PublicLecture, String> {
        let api = self.api.get_untracked();
        api.get_public_lecture(&slug).await.map_err(|e| e.to_string())
    }

    pub async fn user_stats(self) -> Option<UserStats> {
        let api = self.api.get_untracked();
        match api.get_user_stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!("Failed to load stats: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionEvents;

    fn store() -> LecturesStore {
        LecturesStore::new(RwSignal::new(ApiClient::new(String::new(), SessionEvents::new())))
    }

    fn lecture(id: &str, status: &str, folder: Option<&str>, tags: &[&str]) -> Lecture {
        let tags: Vec<_> = tags
            .iter()
            .map(|t| serde_json::json!({"id": t, "name": t}))
            .collect();
        serde_json::from_value(serde_json::json!({
            "id": id,
            "status": status,
            "folderId": folder,
            "tags": tags,
        }))
        .expect("lecture")
    }

    #[test]
    fn test_folder_and_tags_are_conjunctive() {
        let lectures = vec![
            lecture("a", "completed", Some("f1"), &["t1", "t2"]),
            lecture("b", "completed", Some("f1"), &["t1"]),
            lecture("c", "completed", Some("f2"), &["t1", "t2"]),
            lecture("d", "completed", None, &["t1", "t2"]),
        ];
        let filter = LectureFilter {
            folder_id: Some("f1".into()),
            tag_ids: vec!["t1".into(), "t2".into()],
            status: StatusFilter::All,
        };
        let ids: Vec<_> = filter.apply(&lectures).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let l = lecture("a", "failed", None, &[]);
        assert!(LectureFilter::default().matches(&l));
    }

    #[test]
    fn test_processing_filter_groups_stages() {
        for status in [
            LectureStatus::Uploaded,
            LectureStatus::Extracting,
            LectureStatus::Transcribing,
            LectureStatus::Summarizing,
        ] {
            assert!(StatusFilter::Processing.matches(status));
        }
        assert!(!StatusFilter::Processing.matches(LectureStatus::Completed));
        assert_eq!(StatusFilter::Processing.server_status(), None);
        assert_eq!(StatusFilter::Failed.server_status(), Some("failed"));
    }

    #[test]
    fn test_toggle_tag() {
        let mut f = LectureFilter::default();
        f.toggle_tag("t1");
        f.toggle_tag("t2");
        f.toggle_tag("t1");
        assert_eq!(f.tag_ids, vec!["t2".to_string()]);
    }

    #[test]
    fn test_status_light_updates_in_place() {
        let mut l = lecture("a", "transcribing", None, &[]);
        apply_status_light(
            &mut l,
            &LectureStatusLight {
                id: "a".into(),
                status: LectureStatus::Failed,
                progress: 0.0,
                error_message: Some("Audio too short".into()),
            },
        );
        assert_eq!(l.status, LectureStatus::Failed);
        assert_eq!(l.error_message.as_deref(), Some("Audio too short"));
    }

    #[test]
    fn test_processing_ids_skip_settled_lectures() {
        let lectures = vec![
            lecture("a", "completed", None, &[]),
            lecture("b", "summarizing", None, &[]),
            lecture("c", "failed", None, &[]),
            lecture("d", "uploaded", None, &[]),
        ];
        assert_eq!(processing_ids(&lectures), vec!["b", "d"]);
    }

    #[test]
    fn test_selection_cleared_before_response_starts_no_poller() {
        let lectures = store();
        let ticket = lectures.poll.with_value(|p| p.begin());

        // The detail view unmounts while `get_lecture` is in flight.
        lectures.clear_selection();

        assert!(!lectures.accept_selected(&ticket, lecture("l1", "transcribing", None, &[])));
        assert!(lectures.selected.get_untracked().is_none());
    }

    #[test]
    fn test_newer_selection_supersedes_older_poller() {
        let lectures = store();
        let first = lectures.poll.with_value(|p| p.begin());
        let second = lectures.poll.with_value(|p| p.begin());

        assert!(!lectures.accept_selected(&first, lecture("l1", "transcribing", None, &[])));
        assert!(lectures.accept_selected(&second, lecture("l2", "summarizing", None, &[])));
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(lectures.selected.get_untracked().map(|l| l.id), Some("l2".to_string()));
    }

    #[test]
    fn test_settled_lecture_stops_polling() {
        let lectures = store();
        let ticket = lectures.poll.with_value(|p| p.begin());

        assert!(!lectures.accept_selected(&ticket, lecture("l1", "completed", None, &[])));
        assert!(lectures.selected.get_untracked().is_some());
        assert!(!ticket.is_current());
    }

    #[test]
    fn test_tag_removal_is_applied_before_the_request() {
        let lectures = store();
        lectures.selected.set(Some(lecture("l1", "completed", None, &["t1", "t2"])));

        let previous = lectures.detach_selected_tag("l1", "t1").expect("previous tags");
        let ids = |tags: Vec<Tag>| tags.into_iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids(previous.clone()), vec!["t1", "t2"]);
        assert_eq!(
            lectures.selected.get_untracked().and_then(|l| l.tags).map(ids),
            Some(vec!["t2".to_string()])
        );

        // A failed request restores what was there.
        lectures.set_selected_tags("l1", previous);
        assert_eq!(
            lectures.selected.get_untracked().and_then(|l| l.tags).map(ids),
            Some(vec!["t1".to_string(), "t2".to_string()])
        );
    }

    #[test]
    fn test_tag_removal_ignores_other_lectures() {
        let lectures = store();
        lectures.selected.set(Some(lecture("l1", "completed", None, &["t1"])));

        assert!(lectures.detach_selected_tag("l2", "t1").is_none());
        assert_eq!(lectures.selected.get_untracked().and_then(|l| l.tags).map(|t| t.len()), Some(1));
    }
}
