//! The session-scoped intake workflow: photo captured → optionally analyzed
//! → draft entry ready for editing.
//!
//! ## States
//!
//! - `Idle` — no pending images, no draft.
//! - `Staging` — one or more captured/uploaded images are held, awaiting the
//!   user's decision between manual entry and AI analysis.
//! - `Analyzing` — an analysis call is in flight. Calls are synchronous, so
//!   this state is only observable to re-entrant callers; it exists to gate
//!   against overlapping requests.
//! - `DraftReady` — a candidate entry exists and is being edited.
//!
//! Saving or cancelling a draft returns to `Idle` (or back to `Staging` when
//! staged images remain, as after editing an existing entry). An analysis
//! failure returns to `Staging` with the staged images retained; photos are
//! never lost to a provider error. The quick-scan path skips staging
//! entirely and leaves nothing staged behind on failure.
//!
//! Only the first staged image is sent for analysis; the rest are attached
//! to the draft as additional gallery images.

use crate::core::analysis::LabelAnalyzer;
use crate::{Cellar, Result, WineEntry};
use log::warn;

/// Where the intake workflow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeState {
    Idle,
    Staging,
    Analyzing,
    DraftReady,
}

/// Session-scoped coordinator between the image pipeline, the label
/// analyzer, and the catalog. One instance per session; a single analysis
/// in flight at a time.
#[derive(Debug)]
pub struct Intake {
    state: IntakeState,
    staged: Vec<String>,
    draft: Option<WineEntry>,
}

impl Default for Intake {
    fn default() -> Self {
        Self::new()
    }
}

impl Intake {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: IntakeState::Idle,
            staged: Vec::new(),
            draft: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> IntakeState {
        self.state
    }

    /// The staged images, in capture order. Index 0 is the primary.
    #[must_use]
    pub fn staged(&self) -> &[String] {
        &self.staged
    }

    /// The pending draft, if the workflow is in `DraftReady`.
    #[must_use]
    pub fn draft(&self) -> Option<&WineEntry> {
        self.draft.as_ref()
    }

    /// Mutable access to the draft for form edits.
    pub fn draft_mut(&mut self) -> Option<&mut WineEntry> {
        self.draft.as_mut()
    }

    /// Adds captured or uploaded images. While idle or staging they join the
    /// staged set; while a draft is open they go straight into its gallery
    /// instead (the add-more-photos path on the edit form).
    pub fn add_images(&mut self, images: Vec<String>) {
        if images.is_empty() {
            return;
        }
        match self.state {
            IntakeState::DraftReady => {
                if let Some(draft) = self.draft.as_mut() {
                    draft.push_images(images);
                }
            }
            _ => {
                self.staged.extend(images);
                self.state = IntakeState::Staging;
            }
        }
    }

    /// Drops one staged image. Removal keeps the order of the remaining
    /// images; emptying the set returns to idle.
    pub fn remove_staged(&mut self, index: usize) {
        if index < self.staged.len() {
            self.staged.remove(index);
        }
        if self.staged.is_empty() && self.state == IntakeState::Staging {
            self.state = IntakeState::Idle;
        }
    }

    /// Discards the whole staged set and returns to idle.
    pub fn discard_staged(&mut self) {
        self.staged.clear();
        if self.state == IntakeState::Staging {
            self.state = IntakeState::Idle;
        }
    }

    /// Manual-entry path: consumes the staged images into a blank draft
    /// (first image primary, type defaulting to Red) without touching the
    /// analyzer. No-op unless images are staged.
    pub fn begin_manual(&mut self) {
        if self.staged.is_empty() {
            return;
        }
        let images = std::mem::take(&mut self.staged);
        self.draft = Some(WineEntry::draft(images));
        self.state = IntakeState::DraftReady;
    }

    /// AI-assisted path: sends the first staged image for analysis and, on
    /// success, merges the result with the whole staged set into a draft.
    /// On failure the staged images are retained and the workflow returns
    /// to `Staging` so the user can retry or fall back to manual entry.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`AnalysisError`](crate::AnalysisError) as
    /// [`VinoscanError::Analysis`](crate::VinoscanError::Analysis).
    pub fn begin_analysis(&mut self, analyzer: &dyn LabelAnalyzer) -> Result<()> {
        if self.staged.is_empty() || self.state != IntakeState::Staging {
            return Ok(());
        }
        self.state = IntakeState::Analyzing;
        match analyzer.analyze(&self.staged[0]) {
            Ok(ai) => {
                let images = std::mem::take(&mut self.staged);
                self.draft = Some(WineEntry::from_analysis(ai, images));
                self.state = IntakeState::DraftReady;
                Ok(())
            }
            Err(e) => {
                warn!("label analysis failed, images retained: {e}");
                self.state = IntakeState::Staging;
                Err(e.into())
            }
        }
    }

    /// Single-capture path: analyze one image immediately, bypassing the
    /// staging set. On success any previously staged images are discarded
    /// and the draft holds just the captured image; on failure nothing is
    /// staged from this capture and the prior state is untouched.
    ///
    /// # Errors
    ///
    /// Propagates the classified analysis error, as
    /// [`begin_analysis`](Self::begin_analysis) does.
    pub fn quick_scan(&mut self, image: String, analyzer: &dyn LabelAnalyzer) -> Result<()> {
        let previous = self.state;
        self.state = IntakeState::Analyzing;
        match analyzer.analyze(&image) {
            Ok(ai) => {
                self.staged.clear();
                self.draft = Some(WineEntry::from_analysis(ai, vec![image]));
                self.state = IntakeState::DraftReady;
                Ok(())
            }
            Err(e) => {
                warn!("quick scan failed, capture dropped: {e}");
                self.state = previous;
                Err(e.into())
            }
        }
    }

    /// Opens an existing entry for editing. Staged images are left alone;
    /// they reappear when the form closes.
    pub fn edit(&mut self, entry: WineEntry) {
        self.draft = Some(entry);
        self.state = IntakeState::DraftReady;
    }

    /// Persists the draft: an update when the catalog already holds the id,
    /// an insert otherwise. The workflow returns to idle even if the write
    /// fails; the in-memory catalog mutation is applied regardless.
    ///
    /// # Errors
    ///
    /// Propagates the catalog's persistence error, if any.
    pub fn save(&mut self, cellar: &mut Cellar) -> Result<()> {
        let Some(draft) = self.draft.take() else {
            return Ok(());
        };
        self.state = if self.staged.is_empty() {
            IntakeState::Idle
        } else {
            IntakeState::Staging
        };
        if cellar.get(&draft.id).is_some() {
            cellar.update(draft)
        } else {
            cellar.insert(draft)
        }
    }

    /// Discards the draft. Staged images that were already consumed into it
    /// are not restored to the staging set.
    pub fn cancel(&mut self) {
        self.draft = None;
        self.state = if self.staged.is_empty() {
            IntakeState::Idle
        } else {
            IntakeState::Staging
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::AnalysisError;
    use crate::{AiWineResponse, MemoryStore, VinoscanError, WineType};

    struct FakeAnalyzer {
        fail: bool,
    }

    impl LabelAnalyzer for FakeAnalyzer {
        fn analyze(&self, image: &str) -> std::result::Result<AiWineResponse, AnalysisError> {
            if self.fail {
                return Err(AnalysisError::EmptyResponse);
            }
            Ok(AiWineResponse {
                name: format!("Wine from {image}"),
                maker: "Fake Estate".to_string(),
                year: "2019".to_string(),
                wine_type: WineType::Red,
                description: String::new(),
            })
        }
    }

    fn cellar() -> Cellar {
        Cellar::load(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_add_images_moves_idle_to_staging() {
        let mut intake = Intake::new();
        assert_eq!(intake.state(), IntakeState::Idle);
        intake.add_images(vec!["a".to_string()]);
        assert_eq!(intake.state(), IntakeState::Staging);
        intake.add_images(vec!["b".to_string()]);
        assert_eq!(intake.staged(), ["a", "b"]);
    }

    #[test]
    fn test_remove_staged_keeps_order_and_empties_to_idle() {
        let mut intake = Intake::new();
        intake.add_images(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        intake.remove_staged(1);
        assert_eq!(intake.staged(), ["a", "c"]);
        intake.remove_staged(0);
        intake.remove_staged(0);
        assert_eq!(intake.state(), IntakeState::Idle);
    }

    #[test]
    fn test_discard_staged_returns_to_idle() {
        let mut intake = Intake::new();
        intake.add_images(vec!["a".to_string()]);
        intake.discard_staged();
        assert_eq!(intake.state(), IntakeState::Idle);
        assert!(intake.staged().is_empty());
    }

    #[test]
    fn test_begin_manual_builds_blank_draft_from_staged() {
        let mut intake = Intake::new();
        intake.add_images(vec!["primary".to_string(), "extra".to_string()]);
        intake.begin_manual();

        assert_eq!(intake.state(), IntakeState::DraftReady);
        assert!(intake.staged().is_empty(), "staged set consumed");
        let draft = intake.draft().unwrap();
        assert_eq!(draft.image_urls, vec!["primary", "extra"]);
        assert!(draft.name.is_empty());
        assert_eq!(draft.wine_type, WineType::Red);
    }

    #[test]
    fn test_begin_manual_without_staged_images_is_noop() {
        let mut intake = Intake::new();
        intake.begin_manual();
        assert_eq!(intake.state(), IntakeState::Idle);
        assert!(intake.draft().is_none());
    }

    #[test]
    fn test_begin_analysis_merges_first_image_result_with_all_staged() {
        let mut intake = Intake::new();
        intake.add_images(vec!["one".to_string(), "two".to_string()]);
        intake.begin_analysis(&FakeAnalyzer { fail: false }).unwrap();

        assert_eq!(intake.state(), IntakeState::DraftReady);
        let draft = intake.draft().unwrap();
        assert_eq!(draft.name, "Wine from one", "only the first image is analyzed");
        assert_eq!(draft.image_urls, vec!["one", "two"], "all staged images attached");
    }

    #[test]
    fn test_begin_analysis_failure_retains_staged_images() {
        let mut intake = Intake::new();
        intake.add_images(vec!["one".to_string(), "two".to_string()]);
        let result = intake.begin_analysis(&FakeAnalyzer { fail: true });

        assert!(matches!(result, Err(VinoscanError::Analysis(_))));
        assert_eq!(intake.state(), IntakeState::Staging);
        assert_eq!(intake.staged(), ["one", "two"]);
        assert!(intake.draft().is_none());
    }

    #[test]
    fn test_quick_scan_success_skips_staging() {
        let mut intake = Intake::new();
        intake
            .quick_scan("snap".to_string(), &FakeAnalyzer { fail: false })
            .unwrap();
        assert_eq!(intake.state(), IntakeState::DraftReady);
        assert!(intake.staged().is_empty());
        assert_eq!(intake.draft().unwrap().image_urls, vec!["snap"]);
    }

    #[test]
    fn test_quick_scan_failure_leaves_nothing_staged() {
        let mut intake = Intake::new();
        let result = intake.quick_scan("snap".to_string(), &FakeAnalyzer { fail: true });
        assert!(matches!(result, Err(VinoscanError::Analysis(_))));
        assert_eq!(intake.state(), IntakeState::Idle);
        assert!(intake.staged().is_empty());
        assert!(intake.draft().is_none());
    }

    #[test]
    fn test_add_images_while_drafting_extends_gallery() {
        let mut intake = Intake::new();
        intake.add_images(vec!["a".to_string()]);
        intake.begin_manual();
        intake.add_images(vec!["b".to_string()]);
        assert_eq!(intake.draft().unwrap().image_urls, vec!["a", "b"]);
        assert!(intake.staged().is_empty());
    }

    #[test]
    fn test_save_new_draft_inserts_and_returns_to_idle() {
        let mut intake = Intake::new();
        let mut cellar = cellar();
        intake.add_images(vec!["a".to_string()]);
        intake.begin_manual();
        intake.draft_mut().unwrap().name = "Saved".to_string();
        intake.save(&mut cellar).unwrap();

        assert_eq!(intake.state(), IntakeState::Idle);
        assert!(intake.draft().is_none());
        assert_eq!(cellar.len(), 1);
        assert_eq!(cellar.entries()[0].name, "Saved");
    }

    #[test]
    fn test_save_existing_draft_updates_in_place() {
        let mut intake = Intake::new();
        let mut cellar = cellar();
        let mut entry = WineEntry::draft(vec![]);
        entry.name = "Original".to_string();
        let id = entry.id.clone();
        cellar.insert(entry.clone()).unwrap();

        intake.edit(entry);
        intake.draft_mut().unwrap().name = "Edited".to_string();
        intake.save(&mut cellar).unwrap();

        assert_eq!(cellar.len(), 1, "update, not a second insert");
        assert_eq!(cellar.get(&id).unwrap().name, "Edited");
    }

    #[test]
    fn test_cancel_discards_draft_without_restoring_images() {
        let mut intake = Intake::new();
        intake.add_images(vec!["a".to_string()]);
        intake.begin_manual();
        intake.cancel();

        assert_eq!(intake.state(), IntakeState::Idle);
        assert!(intake.draft().is_none());
        assert!(intake.staged().is_empty(), "consumed images are not restored");
    }

    #[test]
    fn test_cancel_from_edit_returns_to_staging_when_images_remain() {
        let mut intake = Intake::new();
        intake.add_images(vec!["waiting".to_string()]);
        intake.edit(WineEntry::draft(vec![]));
        intake.cancel();
        assert_eq!(intake.state(), IntakeState::Staging);
        assert_eq!(intake.staged(), ["waiting"]);
    }
}
