//! # Editor Session
//!
//! The in-memory working state of one editing flow: the not-yet-persisted
//! Profile, the candidate public name with its advisory availability, and
//! the asset upload protocol. Mutations apply to working state only; the
//! store is touched exclusively through `save`, which re-validates the
//! name claim regardless of what the advisory state says.
//!
//! Async results are ordered by data, not by timing: every name edit bumps
//! a generation counter and every retarget bumps the session epoch, so a
//! slow check or upload that resolves late is discarded instead of
//! clobbering newer state.

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::migrate::normalize;
use crate::models::{ContentBlock, Profile, SocialLink};
use crate::names::{validate_name, Availability, NameRegistry};
use crate::render::{compose, VisualTree};
use crate::traits::{AssetKind, BlobStore, ProfileRepo, MAX_UPLOAD_BYTES};

/// How long the UI waits after the last keystroke before asking for an
/// availability check. Purely advisory pacing; staleness is handled by the
/// generation counter either way.
pub const AVAILABILITY_DEBOUNCE_MS: u64 = 500;

/// Advisory availability state shown next to the name input. Never
/// authorization to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStatus {
    Idle,
    Checking,
    Available,
    Taken,
    Invalid,
}

/// Per-surface upload-in-flight flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadingFlags {
    pub avatar: bool,
    pub background: bool,
    pub overlay: bool,
}

impl UploadingFlags {
    fn set(&mut self, kind: AssetKind, value: bool) {
        match kind {
            AssetKind::Avatar => self.avatar = value,
            AssetKind::Background => self.background = value,
            AssetKind::Overlay => self.overlay = value,
        }
    }

    pub fn get(&self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Avatar => self.avatar,
            AssetKind::Background => self.background,
            AssetKind::Overlay => self.overlay,
        }
    }
}

/// Handle for one in-flight upload. Stamped with the session epoch at
/// `begin_upload` time; a result presented with a stale epoch is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    epoch: u64,
    kind: AssetKind,
}

#[derive(Debug)]
pub struct EditorSession {
    owner_id: String,
    /// The name the loaded document is currently published under.
    bound_name: Option<String>,
    candidate_name: String,
    name_status: NameStatus,
    generation: u64,
    checked_generation: u64,
    epoch: u64,
    working: Profile,
    uploading: UploadingFlags,
}

impl EditorSession {
    /// A brand-new unsaved document. No bound name, so no edit-page
    /// affordance and no self-rename shortcut.
    pub fn new_unsaved(owner_id: impl Into<String>) -> Self {
        let owner_id = owner_id.into();
        Self {
            working: Profile::blank_for(owner_id.clone()),
            owner_id,
            bound_name: None,
            candidate_name: String::new(),
            name_status: NameStatus::Idle,
            generation: 0,
            checked_generation: 0,
            epoch: 0,
            uploading: UploadingFlags::default(),
        }
    }

    /// Loads the document at `name` for editing. A missing document is not
    /// an error: it means "create new under this name". An existing
    /// document owned by someone else is `PermissionDenied`.
    pub async fn load(
        repo: &dyn ProfileRepo,
        name: &str,
        owner_id: &str,
    ) -> Result<Self> {
        let mut session = Self::new_unsaved(owner_id);
        session.adopt(name, repo.get(name).await?)?;
        Ok(session)
    }

    /// Re-points this session at a different document name. In-flight
    /// checks and uploads for the old target become stale and their
    /// results will be discarded.
    pub async fn retarget(&mut self, repo: &dyn ProfileRepo, name: &str) -> Result<()> {
        let raw = repo.get(name).await?;
        self.adopt(name, raw)
    }

    fn adopt(&mut self, name: &str, raw: Option<Value>) -> Result<()> {
        let (bound, working) = match raw {
            Some(raw) => {
                let profile = normalize(raw);
                if !profile.owner_id.is_empty() && profile.owner_id != self.owner_id {
                    return Err(AppError::PermissionDenied);
                }
                (Some(name.to_string()), profile)
            }
            None => (None, Profile::blank_for(self.owner_id.clone())),
        };
        self.epoch += 1;
        self.generation += 1;
        self.bound_name = bound;
        self.candidate_name = name.to_string();
        self.working = working;
        self.working.owner_id = self.owner_id.clone();
        self.uploading = UploadingFlags::default();
        self.name_status = self.local_status();
        Ok(())
    }

    // ── Candidate name & advisory availability ─────────────────────────

    /// Applies a keystroke to the name input. Input is sanitized the way
    /// the page URL will be (lowercased, everything outside `[a-z0-9-]`
    /// dropped). Each effective change bumps the generation counter.
    pub fn set_candidate_name(&mut self, input: &str) {
        let sanitized: String = input
            .to_lowercase()
            .chars()
            .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
            .collect();
        if sanitized == self.candidate_name {
            return;
        }
        self.candidate_name = sanitized;
        self.generation += 1;
        self.name_status = self.local_status();
    }

    fn local_status(&self) -> NameStatus {
        if self.candidate_name.is_empty() {
            NameStatus::Idle
        } else if self.bound_name.as_deref() == Some(self.candidate_name.as_str()) {
            // Renaming to yourself is always fine; never show "taken".
            NameStatus::Idle
        } else if validate_name(&self.candidate_name).is_err() {
            NameStatus::Invalid
        } else {
            NameStatus::Checking
        }
    }

    /// The (generation, name) pair the UI should check next, if any.
    pub fn pending_check(&self) -> Option<(u64, String)> {
        if self.name_status == NameStatus::Checking && self.generation > self.checked_generation
        {
            Some((self.generation, self.candidate_name.clone()))
        } else {
            None
        }
    }

    /// Applies the result of an availability check. A result for any
    /// generation but the current one is stale and ignored: last input
    /// wins, not last to complete.
    pub fn apply_check(&mut self, generation: u64, availability: &Availability) {
        if generation != self.generation {
            return;
        }
        self.checked_generation = generation;
        if self.name_status != NameStatus::Checking {
            return;
        }
        self.name_status = match availability {
            Availability::Available => NameStatus::Available,
            Availability::Taken { .. } => NameStatus::Taken,
            Availability::Invalid => NameStatus::Invalid,
        };
    }

    /// Runs any pending availability check to completion. Callers debounce
    /// by [`AVAILABILITY_DEBOUNCE_MS`]; correctness does not depend on it.
    pub async fn refresh_availability(
        &mut self,
        repo: &dyn ProfileRepo,
        registry: &NameRegistry,
    ) -> Result<()> {
        if let Some((generation, name)) = self.pending_check() {
            let availability = registry.check(repo, &name).await?;
            self.apply_check(generation, &availability);
        }
        Ok(())
    }

    // ── Working-state mutations ────────────────────────────────────────

    /// Free-form access to the working document for field edits. The
    /// invariant-bearing mutations below should be used where they exist.
    pub fn working_mut(&mut self) -> &mut Profile {
        &mut self.working
    }

    pub fn add_block(&mut self) {
        self.working.blocks.push(ContentBlock::Link {
            title: String::new(),
            url: String::new(),
            featured: false,
        });
    }

    pub fn remove_block(&mut self, index: usize) {
        if index < self.working.blocks.len() {
            self.working.blocks.remove(index);
        }
    }

    pub fn toggle_featured(&mut self, index: usize) {
        self.working.toggle_featured(index);
    }

    pub fn add_social(&mut self) {
        self.working.socials.push(SocialLink::default());
    }

    pub fn remove_social(&mut self, index: usize) {
        if index < self.working.socials.len() {
            self.working.socials.remove(index);
        }
    }

    // ── Asset-reference update protocol ────────────────────────────────

    /// Starts an upload for one surface. Preconditions checked before any
    /// network call: a candidate name must be entered and the file must
    /// fit the size ceiling. Other edits continue while the upload runs.
    pub fn begin_upload(&mut self, kind: AssetKind, size: usize) -> Result<UploadTicket> {
        if self.candidate_name.trim().is_empty() {
            return Err(AppError::UploadFailed(
                "enter a public name before uploading images".to_string(),
            ));
        }
        if size > MAX_UPLOAD_BYTES {
            return Err(AppError::UploadTooLarge { size, limit: MAX_UPLOAD_BYTES });
        }
        self.uploading.set(kind, true);
        Ok(UploadTicket { epoch: self.epoch, kind })
    }

    /// Integrates a finished upload: only the single URL field for the
    /// ticket's surface changes, so edits made while the upload was in
    /// flight are preserved. Results from a previous target are dropped.
    pub fn finish_upload(&mut self, ticket: UploadTicket, url: &str) {
        if ticket.epoch != self.epoch {
            return;
        }
        self.uploading.set(ticket.kind, false);
        match ticket.kind {
            AssetKind::Avatar => self.working.image_url = url.to_string(),
            AssetKind::Background => {
                self.working.theme.background.image_url = url.to_string()
            }
            AssetKind::Overlay => self.working.theme.overlay.image_url = url.to_string(),
        }
    }

    /// A failed upload clears the in-flight flag and changes nothing else.
    pub fn fail_upload(&mut self, ticket: UploadTicket) {
        if ticket.epoch == self.epoch {
            self.uploading.set(ticket.kind, false);
        }
    }

    /// Convenience wrapper running the whole protocol against a store.
    pub async fn upload_asset(
        &mut self,
        store: &dyn BlobStore,
        kind: AssetKind,
        data: Vec<u8>,
    ) -> Result<String> {
        let ticket = self.begin_upload(kind, data.len())?;
        match store.upload(&self.owner_id, kind, data).await {
            Ok(url) => {
                self.finish_upload(ticket, &url);
                Ok(url)
            }
            Err(err) => {
                self.fail_upload(ticket);
                Err(AppError::UploadFailed(err.to_string()))
            }
        }
    }

    // ── Derived views & save ───────────────────────────────────────────

    /// The live preview. Re-derived on every mutation; never shows the
    /// edit affordance.
    pub fn preview(&self) -> VisualTree {
        compose(&self.working, None)
    }

    /// Public URL of the page once it has been saved under a name.
    pub fn shareable_link(&self, origin: &str) -> Option<String> {
        self.bound_name
            .as_ref()
            .map(|name| format!("{}/{}", origin.trim_end_matches('/'), name))
    }

    /// Persists the working document under the candidate name via the
    /// atomic claim. Validation precedes any I/O; a failed save leaves the
    /// working state and the old binding untouched.
    pub async fn save(
        &mut self,
        repo: &dyn ProfileRepo,
        registry: &NameRegistry,
    ) -> Result<String> {
        let name = self.candidate_name.clone();
        validate_name(&name)?;
        self.working.owner_id = self.owner_id.clone();
        registry.claim(repo, &name, &self.owner_id, &self.working).await?;
        self.bound_name = Some(name.clone());
        self.name_status = self.local_status();
        Ok(name)
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn working(&self) -> &Profile {
        &self.working
    }

    pub fn bound_name(&self) -> Option<&str> {
        self.bound_name.as_deref()
    }

    pub fn candidate_name(&self) -> &str {
        &self.candidate_name
    }

    pub fn name_status(&self) -> NameStatus {
        self.name_status
    }

    pub fn uploading(&self) -> UploadingFlags {
        self.uploading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryProfileRepo;
    use async_trait::async_trait;

    struct FixedUrlStore(&'static str);

    #[async_trait]
    impl BlobStore for FixedUrlStore {
        async fn upload(
            &self,
            _owner_id: &str,
            _kind: AssetKind,
            _data: Vec<u8>,
        ) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl BlobStore for FailingStore {
        async fn upload(
            &self,
            _owner_id: &str,
            _kind: AssetKind,
            _data: Vec<u8>,
        ) -> anyhow::Result<String> {
            anyhow::bail!("connection reset")
        }
    }

    #[test]
    fn candidate_name_is_sanitized() {
        let mut session = EditorSession::new_unsaved("u1");
        session.set_candidate_name("My Päge!!");
        assert_eq!(session.candidate_name(), "mypge");
        session.set_candidate_name("my-page");
        assert_eq!(session.candidate_name(), "my-page");
    }

    #[test]
    fn stale_check_results_are_discarded() {
        let mut session = EditorSession::new_unsaved("u1");

        session.set_candidate_name("first-name");
        let (old_generation, _) = session.pending_check().unwrap();

        session.set_candidate_name("second-name");
        let (new_generation, name) = session.pending_check().unwrap();
        assert_eq!(name, "second-name");

        // The slow check for the earlier keystroke resolves late.
        session.apply_check(old_generation, &Availability::Taken { owner_id: "x".into() });
        assert_eq!(session.name_status(), NameStatus::Checking);

        session.apply_check(new_generation, &Availability::Available);
        assert_eq!(session.name_status(), NameStatus::Available);
        assert!(session.pending_check().is_none());
    }

    #[test]
    fn short_names_are_invalid_without_a_check() {
        let mut session = EditorSession::new_unsaved("u1");
        session.set_candidate_name("ab");
        assert_eq!(session.name_status(), NameStatus::Invalid);
        assert!(session.pending_check().is_none());
    }

    #[tokio::test]
    async fn own_bound_name_reads_idle_not_taken() {
        let repo = MemoryProfileRepo::new();
        let registry = NameRegistry::new();
        let mut session = EditorSession::new_unsaved("u1");
        session.set_candidate_name("my-page");
        session.save(&repo, &registry).await.unwrap();

        session.set_candidate_name("other");
        session.set_candidate_name("my-page");
        assert_eq!(session.name_status(), NameStatus::Idle);
        assert!(session.pending_check().is_none());
    }

    #[tokio::test]
    async fn load_of_missing_document_means_create() {
        let repo = MemoryProfileRepo::new();
        let session = EditorSession::load(&repo, "fresh-name", "u1").await.unwrap();
        assert_eq!(session.bound_name(), None);
        assert_eq!(session.candidate_name(), "fresh-name");
        assert_eq!(session.working().owner_id, "u1");
    }

    #[tokio::test]
    async fn load_of_foreign_document_is_denied() {
        let repo = MemoryProfileRepo::new();
        let registry = NameRegistry::new();
        registry
            .claim(&repo, "my-page", "u1", &Profile::blank_for("u1"))
            .await
            .unwrap();

        let err = EditorSession::load(&repo, "my-page", "u2").await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
    }

    #[test]
    fn upload_requires_a_candidate_name() {
        let mut session = EditorSession::new_unsaved("u1");
        let err = session.begin_upload(AssetKind::Avatar, 100).unwrap_err();
        assert!(matches!(err, AppError::UploadFailed(_)));
        assert!(!session.uploading().avatar);
    }

    #[test]
    fn oversize_upload_is_rejected_before_any_network_call() {
        let mut session = EditorSession::new_unsaved("u1");
        session.set_candidate_name("my-page");
        let err = session
            .begin_upload(AssetKind::Background, MAX_UPLOAD_BYTES + 1)
            .unwrap_err();
        assert!(matches!(err, AppError::UploadTooLarge { .. }));
    }

    #[test]
    fn finish_upload_touches_only_its_own_field() {
        let mut session = EditorSession::new_unsaved("u1");
        session.set_candidate_name("my-page");

        let ticket = session.begin_upload(AssetKind::Background, 100).unwrap();
        assert!(session.uploading().background);

        // Edits made while the upload is in flight must survive.
        session.working_mut().bio = "written mid-upload".to_string();
        session.working_mut().theme.container_color = "#123456".to_string();

        session.finish_upload(ticket, "https://cdn.example/bg.png");
        assert!(!session.uploading().background);
        assert_eq!(session.working().theme.background.image_url, "https://cdn.example/bg.png");
        assert_eq!(session.working().bio, "written mid-upload");
        assert_eq!(session.working().theme.container_color, "#123456");
        assert_eq!(session.working().image_url, "");
    }

    #[test]
    fn concurrent_uploads_to_different_surfaces_are_independent() {
        let mut session = EditorSession::new_unsaved("u1");
        session.set_candidate_name("my-page");

        let avatar = session.begin_upload(AssetKind::Avatar, 10).unwrap();
        let background = session.begin_upload(AssetKind::Background, 10).unwrap();
        assert!(session.uploading().avatar && session.uploading().background);

        session.finish_upload(background, "https://cdn.example/bg.png");
        assert!(session.uploading().avatar);
        session.finish_upload(avatar, "https://cdn.example/me.png");

        assert_eq!(session.working().image_url, "https://cdn.example/me.png");
        assert_eq!(session.working().theme.background.image_url, "https://cdn.example/bg.png");
    }

    #[tokio::test]
    async fn upload_result_after_retarget_is_dropped() {
        let repo = MemoryProfileRepo::new();
        let mut session = EditorSession::new_unsaved("u1");
        session.set_candidate_name("my-page");
        let ticket = session.begin_upload(AssetKind::Avatar, 10).unwrap();

        session.retarget(&repo, "other-page").await.unwrap();
        session.finish_upload(ticket, "https://cdn.example/stale.png");
        assert_eq!(session.working().image_url, "");
    }

    #[tokio::test]
    async fn failed_upload_leaves_working_state_unchanged() {
        let mut session = EditorSession::new_unsaved("u1");
        session.set_candidate_name("my-page");
        let before = session.working().clone();

        let err = session
            .upload_asset(&FailingStore, AssetKind::Overlay, vec![0; 16])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UploadFailed(_)));
        assert_eq!(session.working(), &before);
        assert!(!session.uploading().overlay);
    }

    #[tokio::test]
    async fn successful_upload_round_trip() {
        let mut session = EditorSession::new_unsaved("u1");
        session.set_candidate_name("my-page");
        let url = session
            .upload_asset(&FixedUrlStore("https://cdn.example/icon.png"), AssetKind::Overlay, vec![0; 16])
            .await
            .unwrap();
        assert_eq!(session.working().theme.overlay.image_url, url);
    }

    #[tokio::test]
    async fn save_binds_the_name_and_enables_sharing() {
        let repo = MemoryProfileRepo::new();
        let registry = NameRegistry::new();
        let mut session = EditorSession::new_unsaved("u1");
        assert_eq!(session.shareable_link("https://lp.example"), None);

        session.set_candidate_name("my-page");
        let name = session.save(&repo, &registry).await.unwrap();
        assert_eq!(name, "my-page");
        assert_eq!(session.bound_name(), Some("my-page"));
        assert_eq!(
            session.shareable_link("https://lp.example/"),
            Some("https://lp.example/my-page".to_string())
        );
    }

    #[tokio::test]
    async fn save_with_invalid_name_never_reaches_the_store() {
        let repo = MemoryProfileRepo::new();
        let registry = NameRegistry::new();
        let mut session = EditorSession::new_unsaved("u1");
        session.set_candidate_name("ab");
        let err = session.save(&repo, &registry).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidName(_)));
        assert!(repo.get("ab").await.unwrap().is_none());
    }
}
