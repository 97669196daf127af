use crate::api::{ApiClient, FolderCreateRequest, FolderUpdateRequest};
use crate::models::{Folder, Lecture};
use leptos::prelude::*;

/// Lectures that belong to no folder.
pub(crate) fn unorganized(lectures: &[Lecture]) -> Vec<&Lecture> {
    lectures.iter().filter(|l| l.folder_id.is_none()).collect()
}

pub(crate) fn in_folder<'a>(lectures: &'a [Lecture], folder_id: &str) -> Vec<&'a Lecture> {
    lectures
        .iter()
        .filter(|l| l.folder_id.as_deref() == Some(folder_id))
        .collect()
}

/// Depth-first `(depth, folder)` list for parent pickers. `exclude` drops a
/// folder together with its whole subtree, so a folder can never become
/// its own ancestor.
pub(crate) fn flatten_tree<'a>(tree: &'a [Folder], exclude: Option<&str>) -> Vec<(usize, &'a Folder)> {
    fn walk<'a>(
        nodes: &'a [Folder],
        depth: usize,
        exclude: Option<&str>,
        out: &mut Vec<(usize, &'a Folder)>,
    ) {
        for node in nodes {
            if Some(node.id.as_str()) == exclude {
                continue;
            }
            out.push((depth, node));
            walk(&node.children, depth + 1, exclude, out);
        }
    }

    let mut out = Vec::new();
    walk(tree, 0, exclude, &mut out);
    out
}

#[derive(Clone, Copy)]
pub(crate) struct FoldersStore {
    api: RwSignal<ApiClient>,
    pub folders: RwSignal<Vec<Folder>>,
    pub tree: RwSignal<Vec<Folder>>,
    pub selected_folder_id: RwSignal<Option<String>>,
    pub is_loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
}

impl FoldersStore {
    pub fn new(api: RwSignal<ApiClient>) -> Self {
        Self {
            api,
            folders: RwSignal::new(vec![]),
            tree: RwSignal::new(vec![]),
            selected_folder_id: RwSignal::new(None),
            is_loading: RwSignal::new(false),
            error: RwSignal::new(None),
        }
    }

    pub async fn load_folders(self) {
        self.is_loading.set(true);
        self.error.set(None);
        let api = self.api.get_untracked();
        match api.get_folders().await {
            Ok(folders) => self.folders.set(folders),
            Err(e) => self.error.set(Some(e.to_string())),
        }
        self.is_loading.set(false);
    }

    pub async fn load_folders_tree(self) {
        self.is_loading.set(true);
        self.error.set(None);
        let api = self.api.get_untracked();
        match api.get_folders_tree().await {
            Ok(tree) => self.tree.set(tree),
            Err(e) => self.error.set(Some(e.to_string())),
        }
        self.is_loading.set(false);
    }

    async fn reload_all(self) {
        self.load_folders().await;
        self.load_folders_tree().await;
    }

    pub async fn create_folder(self, req: FolderCreateRequest) -> Option<Folder> {
        self.is_loading.set(true);
        self.error.set(None);
        let api = self.api.get_untracked();
        match api.create_folder(&req).await {
            Ok(folder) => {
                tracing::info!("created folder {}", folder.id);
                self.reload_all().await;
                Some(folder)
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                self.is_loading.set(false);
                None
            }
        }
    }

    pub async fn update_folder(self, id: String, req: FolderUpdateRequest) -> Option<Folder> {
        self.is_loading.set(true);
        self.error.set(None);
        let api = self.api.get_untracked();
        match api.update_folder(&id, &req).await {
            Ok(folder) => {
                self.reload_all().await;
                Some(folder)
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                self.is_loading.set(false);
                None
            }
        }
    }

    /// Lectures of a deleted folder become unorganized server-side.
    pub async fn delete_folder(self, id: String) -> bool {
        self.is_loading.set(true);
        self.error.set(None);
        let api = self.api.get_untracked();
        match api.delete_folder(&id).await {
            Ok(()) => {
                if self.selected_folder_id.get_untracked().as_deref() == Some(id.as_str()) {
                    self.selected_folder_id.set(None);
                }
                self.reload_all().await;
                true
            }
            Err(e) => {
                self.error.set(Some(e.to_string()));
                self.is_loading.set(false);
                false
            }
        }
    }

    pub fn select_folder(&self, id: Option<String>) {
        self.selected_folder_id.set(id);
    }

    pub fn clear_error(&self) {
        self.error.set(None);
    }

    pub fn reset(&self) {
        self.folders.set(vec![]);
        self.tree.set(vec![]);
        self.selected_folder_id.set(None);
        self.error.set(None);
    }

    pub fn folder_name(&self, id: &str) -> Option<String> {
        self.folders
            .with(|fs| fs.iter().find(|f| f.id == id).map(|f| f.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: &str, children: Vec<Folder>) -> Folder {
        Folder {
            id: id.to_string(),
            name: id.to_uppercase(),
            color: None,
            parent_id: None,
            lecture_count: None,
            created_at: String::new(),
            updated_at: String::new(),
            children,
        }
    }

    fn lecture(id: &str, folder: Option<&str>) -> Lecture {
        serde_json::from_value(serde_json::json!({
            "id": id, "status": "completed", "folderId": folder
        }))
        .expect("lecture")
    }

    #[test]
    fn test_unorganized_and_in_folder_partition() {
        let lectures = vec![lecture("a", None), lecture("b", Some("f1")), lecture("c", Some("f2"))];
        let loose: Vec<_> = unorganized(&lectures).iter().map(|l| l.id.clone()).collect();
        assert_eq!(loose, vec!["a"]);
        let f1: Vec<_> = in_folder(&lectures, "f1").iter().map(|l| l.id.clone()).collect();
        assert_eq!(f1, vec!["b"]);
    }

    #[test]
    fn test_flatten_tree_depths() {
        let tree = vec![
            folder("a", vec![folder("a1", vec![folder("a1x", vec![])])]),
            folder("b", vec![]),
        ];
        let flat: Vec<_> = flatten_tree(&tree, None)
            .into_iter()
            .map(|(d, f)| (d, f.id.as_str()))
            .collect();
        assert_eq!(flat, vec![(0, "a"), (1, "a1"), (2, "a1x"), (0, "b")]);
    }

    #[test]
    fn test_flatten_tree_excludes_subtree() {
        let tree = vec![
            folder("a", vec![folder("a1", vec![folder("a1x", vec![])])]),
            folder("b", vec![]),
        ];
        let ids: Vec<_> = flatten_tree(&tree, Some("a1"))
            .into_iter()
            .map(|(_, f)| f.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
