pub mod assessment;
pub mod init;
pub mod schedule;
pub mod show;
pub mod topic;
pub mod unit;

pub use assessment::{assessment, AssessmentCommand};
pub use init::{init, InitArgs};
pub use schedule::{schedule, ScheduleCommand};
pub use show::{progress, show};
pub use topic::{topic, TopicCommand};
pub use unit::{unit, UnitCommand};

use crate::config::Config;
use crate::surface::TerminalSurface;
use anyhow::Result;
use std::sync::Arc;
use syllabus_editor::{Document, DocumentEditor, JsonFileBackend, PersistenceBackend};

/// Settings shared by every editing command
pub struct Context {
    pub cwd: String,
    pub config: Config,
    pub document_id: String,
    pub assume_yes: bool,
}

impl Context {
    pub fn load(cwd: &str, document_id: String, assume_yes: bool) -> Result<Self> {
        Ok(Self {
            cwd: cwd.to_string(),
            config: Config::load(cwd)?,
            document_id,
            assume_yes,
        })
    }

    fn backend(&self) -> Arc<JsonFileBackend> {
        Arc::new(JsonFileBackend::new(self.config.get_data_dir(&self.cwd)))
    }

    /// Open the syllabus, creating an empty one the first time
    pub async fn open_editor(&self, surface: Arc<TerminalSurface>) -> Result<DocumentEditor> {
        let backend = self.backend();
        if !backend.exists(&self.document_id).await {
            backend.save(&self.document_id, &Document::new()).await?;
            tracing::info!(document_id = %self.document_id, "created empty syllabus");
        }

        let editor = DocumentEditor::open(
            self.document_id.clone(),
            backend,
            surface,
            self.config.editor.clone(),
        )
        .await?;
        Ok(editor)
    }
}

/// Open the editor quietly, run one edit, save and close.
///
/// Views touched by the edit are printed as the editor re-renders them.
pub async fn run_edit<F>(ctx: &Context, edit: F) -> Result<()>
where
    F: FnOnce(&DocumentEditor, &TerminalSurface) -> Result<()>,
{
    let surface = Arc::new(TerminalSurface::new(ctx.assume_yes));
    surface.set_muted(true);
    let editor = ctx.open_editor(surface.clone()).await?;
    surface.set_muted(false);

    let result = edit(&editor, &*surface);

    match &result {
        Ok(()) if editor.is_dirty() => {
            if let Err(e) = editor.save_now().await {
                editor.close().await;
                return Err(e.into());
            }
        }
        Ok(()) => {}
        Err(_) => {
            // A failed command stores nothing, not even its earlier steps
            surface.set_muted(true);
            let _ = editor.load().await;
        }
    }

    // Nothing is dirty here, so close never prompts
    editor.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(dir: &tempfile::TempDir) -> Context {
        Context::load(&dir.path().display().to_string(), "bio-7".to_string(), true).unwrap()
    }

    #[tokio::test]
    async fn test_run_edit_creates_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        run_edit(&ctx, |editor, _surface| {
            editor.add_topic("Cells", "", 2.0, syllabus_editor::Difficulty::Easy)?;
            editor.add_unit()?;
            Ok(())
        })
        .await
        .unwrap();

        let stored = ctx.backend().load("bio-7").await.unwrap();
        assert_eq!(stored.topics.len(), 1);
        assert_eq!(stored.units.len(), 1);
    }

    #[tokio::test]
    async fn test_run_edit_rejected_edit_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);

        let result = run_edit(&ctx, |editor, _surface| {
            editor.add_unit()?;
            editor.delete_topic(4)?;
            Ok(())
        })
        .await;

        assert!(result.is_err());
        let stored = ctx.backend().load("bio-7").await.unwrap();
        assert!(stored.units.is_empty());
    }
}
