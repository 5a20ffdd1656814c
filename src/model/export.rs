//! 导出：校验重复键，按当前表格内容重建每个文件的映射并打包

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::model::data_core::AppError;
use crate::model::grid::Grid;
use crate::model::translation_set::{TranslationMap, TranslationSet, cell_text_of};
use crate::model::validator::find_duplicate_keys;
use crate::utils::archive::ArchiveWriter;
use crate::utils::fs::write_archive_file;

/// 一个待写入归档的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub name: String,
    pub content: String,
}

/// 单元格文本对应的导出值
///
/// 文本非空且仍等于原值的显示文本时写回原值（数字、布尔、对象保持类型），
/// 否则写字符串。
fn export_value(original: Option<&Value>, text: &str) -> Value {
    match original {
        Some(v) if !text.is_empty() && cell_text_of(v) == text => v.clone(),
        _ => Value::String(text.to_string()),
    }
}

/// 由表格重建每个文件的映射；键为空的行（含备用行）不导出
pub fn rebuild_maps(grid: &Grid, set: &TranslationSet) -> Result<IndexMap<String, TranslationMap>, AppError> {
    let duplicates = find_duplicate_keys(grid.column_values(0));
    if !duplicates.is_empty() {
        return Err(AppError::DuplicateKeys(duplicates));
    }

    let mut out: IndexMap<String, TranslationMap> = set
        .iter()
        .map(|(f, _)| (f.clone(), TranslationMap::new()))
        .collect();

    for row in grid.data() {
        let Some(key) = row.first().filter(|k| !k.is_empty()) else {
            continue;
        };
        for (idx, (file, map)) in out.iter_mut().enumerate() {
            let text = row.get(idx + 1).map(String::as_str).unwrap_or_default();
            let original = set.file(file).and_then(|m| m.get(key.as_str()));
            map.insert(key.clone(), export_value(original, text));
        }
    }
    Ok(out)
}

/// 生成每个文件的格式化 JSON 文本（2 空格缩进）
pub fn export_files(grid: &Grid, set: &TranslationSet) -> Result<Vec<ExportedFile>, AppError> {
    rebuild_maps(grid, set)?
        .into_iter()
        .map(|(name, map)| -> Result<ExportedFile, AppError> {
            Ok(ExportedFile {
                content: serde_json::to_string_pretty(&map)?,
                name,
            })
        })
        .collect()
}

/// 把导出文件打包为 zip 字节
pub fn build_archive(files: &[ExportedFile]) -> Result<Vec<u8>, AppError> {
    let mut writer = ArchiveWriter::new();
    for file in files {
        writer.add_text(&file.name, &file.content)?;
    }
    tracing::info!("归档打包完成: {} 个条目", writer.entries());
    writer.finish()
}

/// 打包并写入磁盘，返回写入的文件数
pub fn write_archive(files: &[ExportedFile], p: &Path) -> Result<usize, AppError> {
    let bytes = build_archive(files)?;
    write_archive_file(p, &bytes)?;
    tracing::info!("已导出 {} 个文件到 {}", files.len(), p.display());
    Ok(files.len())
}
