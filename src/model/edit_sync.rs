//! 编辑同步：把表格单元格的修改回写到各文件的翻译映射

use serde_json::Value;

use crate::model::grid::Grid;
use crate::model::translation_set::TranslationSet;

/// 一次单元格修改（表格已写入新值之后上报）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub row: usize,
    pub col: usize,
    pub old_value: String,
    pub new_value: String,
}

/// 按上报顺序逐条同步一批修改
///
/// 键名重命名时，同名新键已存在的文件会被静默覆盖（后写者胜），
/// 表格中两行同名的情况交由重复键标记和导出校验处理。
pub fn sync_changes(set: &mut TranslationSet, grid: &Grid, changes: &[CellChange]) {
    let file_names = set.file_names();
    for change in changes {
        let Some(key) = grid.key_at(change.row).filter(|k| !k.is_empty()) else {
            tracing::debug!("第 {} 行没有键，忽略修改", change.row);
            continue;
        };

        if change.col > 0 {
            let Some(file) = file_names.get(change.col - 1) else {
                tracing::warn!("列 {} 没有对应的文件", change.col);
                continue;
            };
            if let Some(map) = set.file_mut(file) {
                map.insert(key.to_string(), Value::String(change.new_value.clone()));
            }
        } else if change.old_value != change.new_value {
            rename_key(set, &file_names, &change.old_value, &change.new_value);
        }
    }
}

/// 在所有文件中把 `old_key` 的值移到 `new_key` 下；缺少旧键的文件不变
pub fn rename_key(set: &mut TranslationSet, file_names: &[String], old_key: &str, new_key: &str) {
    let mut moved = 0usize;
    for file in file_names {
        let Some(map) = set.file_mut(file) else {
            continue;
        };
        if let Some(value) = map.shift_remove(old_key) {
            map.insert(new_key.to_string(), value);
            moved += 1;
        }
    }
    tracing::info!("键重命名: {} -> {}（{} 个文件）", old_key, new_key, moved);
}
