//! Session：一次编辑会话的全部状态（翻译集合、文件名列表、表格）

use std::path::PathBuf;

use thiserror::Error;

use crate::model::edit_sync::{CellChange, sync_changes};
use crate::model::export::{ExportedFile, export_files};
use crate::model::grid::Grid;
use crate::model::ingest::{ConfirmDiscard, LoadOutcome, parse_batch};
use crate::model::translation_set::{FileNameList, SourceFile, TranslationSet};
use crate::model::validator::{CellStyle, compute_cell_style};
use crate::utils::fs::read_sources;

#[derive(Debug, Default)]
pub struct Session {
    pub translations: TranslationSet,
    pub file_names: FileNameList,
    pub grid: Option<Grid>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("读取 {file} 出错: {source}")]
    Read {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("解析 {file} 出错: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("解析 {file} 出错: 顶层必须是 JSON 对象")]
    NotAnObject { file: String },
    #[error("文件名重复: {0}")]
    DuplicateFileName(String),
    #[error("无法导出，存在重复的键:\n{}", .0.join("\n"))]
    DuplicateKeys(Vec<String>),
    #[error("归档失败: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("JSON序列化失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("状态错误: {0}")]
    State(String),
}

impl Session {
    /// 是否已有加载的文件
    pub fn has_files(&self) -> bool {
        !self.translations.is_empty()
    }

    /// 从磁盘路径批量加载（zip 归档按条目展开）
    pub fn load_paths(&mut self, paths: &[PathBuf], confirm: &dyn ConfirmDiscard) -> Result<LoadOutcome, AppError> {
        if paths.is_empty() {
            return Ok(LoadOutcome::Empty);
        }
        if !self.confirm_replace(confirm) {
            return Ok(LoadOutcome::Cancelled);
        }
        let sources = read_sources(paths)?;
        if sources.is_empty() {
            // 例如空的 zip 归档：不替换现有数据
            tracing::warn!("所选文件中没有可加载的条目");
            return Ok(LoadOutcome::Empty);
        }
        self.commit(&sources)
    }

    /// 从已读取的文本批量加载
    pub fn load_sources(&mut self, sources: &[SourceFile], confirm: &dyn ConfirmDiscard) -> Result<LoadOutcome, AppError> {
        if sources.is_empty() {
            return Ok(LoadOutcome::Empty);
        }
        if !self.confirm_replace(confirm) {
            return Ok(LoadOutcome::Cancelled);
        }
        self.commit(sources)
    }

    fn confirm_replace(&self, confirm: &dyn ConfirmDiscard) -> bool {
        if self.has_files() && !confirm.confirm_discard() {
            tracing::info!("用户取消加载，保留现有 {} 个文件", self.file_names.len());
            return false;
        }
        true
    }

    /// 整批解析成功后一次性替换会话状态；失败时保持原状
    fn commit(&mut self, sources: &[SourceFile]) -> Result<LoadOutcome, AppError> {
        tracing::info!("开始加载 {} 个文件", sources.len());
        let set = parse_batch(sources).inspect_err(|e| tracing::error!("加载失败: {}", e))?;
        let grid = Grid::build(&set);

        self.file_names = set.file_names();
        self.translations = set;
        let outcome = LoadOutcome::Loaded {
            files: self.file_names.len(),
            rows: grid.row_count(),
        };
        self.grid = Some(grid);
        tracing::info!("加载完成: {:?}", outcome);
        Ok(outcome)
    }

    pub fn grid(&self) -> Result<&Grid, AppError> {
        self.grid
            .as_ref()
            .ok_or_else(|| AppError::State("尚未加载任何文件".into()))
    }

    /// 应用一批单元格编辑 `(行, 列, 新值)`，返回实际发生的修改
    pub fn apply_edits(&mut self, edits: &[(usize, usize, String)]) -> Result<Vec<CellChange>, AppError> {
        let grid = self
            .grid
            .as_mut()
            .ok_or_else(|| AppError::State("尚未加载任何文件".into()))?;

        let mut changes = Vec::with_capacity(edits.len());
        for (row, col, value) in edits {
            let old_value = grid.set_cell(*row, *col, value.clone())?;
            if old_value != *value {
                changes.push(CellChange {
                    row: *row,
                    col: *col,
                    old_value,
                    new_value: value.clone(),
                });
            }
        }
        sync_changes(&mut self.translations, grid, &changes);
        tracing::debug!("同步了 {} 处修改", changes.len());
        Ok(changes)
    }

    /// 单元格显示状态
    pub fn cell_style(&self, row: usize, col: usize) -> CellStyle {
        self.grid
            .as_ref()
            .map(|g| compute_cell_style(row, col, g))
            .unwrap_or_default()
    }

    /// 生成每个文件的导出文本
    pub fn export_files(&self) -> Result<Vec<ExportedFile>, AppError> {
        let grid = self.grid()?;
        export_files(grid, &self.translations).inspect_err(|e| tracing::warn!("导出中止: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::export::{build_archive, write_archive};
    use crate::utils::archive::{ArchiveWriter, read_archive_entries};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn allow() -> impl Fn() -> bool {
        || true
    }

    fn deny() -> impl Fn() -> bool {
        || false
    }

    fn sample_sources() -> Vec<SourceFile> {
        vec![
            SourceFile::new("en.json", r#"{"hi": "Hello"}"#),
            SourceFile::new("fr.json", r#"{"hi": "Bonjour", "bye": "Au revoir"}"#),
        ]
    }

    fn loaded_session() -> Session {
        let mut session = Session::default();
        session.load_sources(&sample_sources(), &allow()).expect("加载失败");
        session
    }

    #[test]
    fn test_load_builds_grid() {
        let session = loaded_session();
        let grid = session.grid().unwrap();
        assert_eq!(session.file_names, vec!["en.json", "fr.json"]);
        assert_eq!(grid.row_count(), 3, "两个键加一行备用行");
        assert!(session.cell_style(1, 1).missing, "bye 在 en.json 中缺失");
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let mut session = loaded_session();
        let outcome = session.load_sources(&[], &allow()).unwrap();
        assert_eq!(outcome, LoadOutcome::Empty);
        assert_eq!(session.file_names.len(), 2);
    }

    #[test]
    fn test_declined_confirm_keeps_state() {
        let mut session = loaded_session();
        let outcome = session
            .load_sources(&[SourceFile::new("de.json", r#"{"x": "y"}"#)], &deny())
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Cancelled);
        assert_eq!(session.file_names, vec!["en.json", "fr.json"]);
    }

    #[test]
    fn test_no_confirm_asked_on_first_load() {
        let mut session = Session::default();
        let outcome = session.load_sources(&sample_sources(), &deny()).unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded { files: 2, rows: 3 });
    }

    #[test]
    fn test_reload_replaces_not_merges() {
        let mut session = loaded_session();
        session
            .load_sources(&[SourceFile::new("de.json", r#"{"x": "y"}"#)], &allow())
            .unwrap();
        assert_eq!(session.file_names, vec!["de.json"]);
        assert!(session.translations.file("en.json").is_none());
        assert_eq!(session.grid().unwrap().headers(), &["Key", "de.json"]);
    }

    #[test]
    fn test_failed_batch_keeps_previous_state() {
        let mut session = loaded_session();
        let bad = vec![
            SourceFile::new("de.json", r#"{"x": "y"}"#),
            SourceFile::new("broken.json", "{"),
        ];
        let err = session.load_sources(&bad, &allow()).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
        assert_eq!(session.file_names, vec!["en.json", "fr.json"]);
        assert_eq!(session.grid().unwrap().row_count(), 3);
    }

    #[test]
    fn test_load_paths_from_disk() {
        let mut file = NamedTempFile::new().expect("创建临时文件失败");
        file.write_all(r#"{"hi": "Hallo"}"#.as_bytes()).expect("写入临时文件失败");

        let mut session = Session::default();
        let outcome = session.load_paths(&[file.path().to_path_buf()], &allow()).unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded { files: 1, rows: 2 });
    }

    #[test]
    fn test_edit_then_export() {
        let mut session = loaded_session();
        session
            .apply_edits(&[(0, 0, "greeting".to_string()), (0, 1, "Hi".to_string())])
            .unwrap();

        assert_eq!(session.translations.file("en.json").unwrap()["greeting"], "Hi");
        assert_eq!(session.translations.file("fr.json").unwrap()["greeting"], "Bonjour");

        let files = session.export_files().unwrap();
        assert!(files[0].content.contains("\"greeting\": \"Hi\""));
        assert!(!files[0].content.contains("\"hi\""));
    }

    #[test]
    fn test_unchanged_edit_reports_nothing() {
        let mut session = loaded_session();
        let changes = session.apply_edits(&[(0, 1, "Hello".to_string())]).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_new_key_in_spare_row() {
        let mut session = loaded_session();
        session.apply_edits(&[(2, 0, "title".to_string())]).unwrap();
        session.apply_edits(&[(2, 2, "Titre".to_string())]).unwrap();

        assert_eq!(session.grid().unwrap().row_count(), 4);
        assert_eq!(session.translations.file("fr.json").unwrap()["title"], "Titre");
        assert!(session.cell_style(2, 1).missing);
    }

    #[test]
    fn test_export_before_load_fails() {
        let session = Session::default();
        assert!(matches!(session.export_files(), Err(AppError::State(_))));
    }

    #[test]
    fn test_duplicate_export_leaves_grid_intact() {
        let mut session = loaded_session();
        session.apply_edits(&[(1, 0, "hi".to_string())]).unwrap();
        let err = session.export_files().unwrap_err();
        assert_eq!(err.to_string(), "无法导出，存在重复的键:\nhi");
        assert_eq!(session.grid().unwrap().column_values(0), vec!["hi", "hi", ""]);
    }

    #[test]
    fn test_export_reload_roundtrip() {
        let session = loaded_session();
        let bytes = build_archive(&session.export_files().unwrap()).expect("导出失败");
        let entries = read_archive_entries("translations.zip", &bytes).unwrap();

        let mut reloaded = Session::default();
        reloaded.load_sources(&entries, &allow()).unwrap();
        assert_eq!(reloaded.file_names, session.file_names);
        for name in &session.file_names {
            let before = session.translations.file(name).unwrap();
            let after = reloaded.translations.file(name).unwrap();
            for (k, v) in after {
                let expected = before.get(k).cloned().unwrap_or_else(|| "".into());
                assert_eq!(&expected, v);
            }
        }
        assert_eq!(reloaded.grid().unwrap().data(), session.grid().unwrap().data());
    }

    #[test]
    fn test_export_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("translations.zip");
        let session = loaded_session();
        let count = write_archive(&session.export_files().unwrap(), &target).expect("导出失败");
        assert_eq!(count, 2);

        let mut reloaded = Session::default();
        reloaded.load_paths(&[target], &allow()).unwrap();
        assert_eq!(reloaded.file_names, vec!["en.json", "fr.json"]);
    }

    #[test]
    fn test_empty_archive_keeps_previous_session() {
        let dir = tempfile::tempdir().unwrap();
        let empty_zip = dir.path().join("empty.zip");
        std::fs::write(&empty_zip, ArchiveWriter::new().finish().unwrap()).unwrap();

        let mut session = loaded_session();
        let outcome = session.load_paths(&[empty_zip], &allow()).unwrap();
        assert_eq!(outcome, LoadOutcome::Empty);
        assert_eq!(session.file_names, vec!["en.json", "fr.json"], "空归档不应清空现有数据");
        assert!(session.export_files().is_ok());
    }

    #[test]
    fn test_commit_twice_is_harmless() {
        // 回车确认后失去焦点会再次提交同一文本
        let mut session = loaded_session();
        let first = session.apply_edits(&[(0, 2, "Salut".to_string())]).unwrap();
        let second = session.apply_edits(&[(0, 2, "Salut".to_string())]).unwrap();
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(session.translations.file("fr.json").unwrap()["hi"], "Salut");
        assert!(session.export_files().unwrap()[1].content.contains("\"hi\": \"Salut\""));
    }

    #[test]
    fn test_unedited_roundtrip_keeps_json_types() {
        let input = r#"{"count": 5, "flag": true, "nested": {"x": 1}}"#;
        let mut session = Session::default();
        session.load_sources(&[SourceFile::new("en.json", input)], &allow()).unwrap();

        let files = session.export_files().unwrap();
        let exported: serde_json::Value = serde_json::from_str(&files[0].content).unwrap();
        assert_eq!(exported, serde_json::from_str::<serde_json::Value>(input).unwrap());
    }
}
