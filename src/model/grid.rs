//! 表格模型：一行一个键，一列一个文件，末尾保留一行空白备用行

use indexmap::IndexSet;

use crate::model::data_core::AppError;
use crate::model::translation_set::{TranslationSet, cell_text_of};
use crate::vm::bridge::KEY_COLUMN_HEADER;

/// 表格行：`[键, 文件1的译文, 文件2的译文, ...]`
pub type GridRow = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    headers: Vec<String>,
    rows: Vec<GridRow>,
}

impl Grid {
    /// 由已提交的翻译集合从头构建表格
    ///
    /// 键取所有文件键的并集，按文件加载顺序、文件内出现顺序去重；
    /// 文件缺少该键时单元格为空串。最后追加一行备用行。
    pub fn build(set: &TranslationSet) -> Self {
        let mut all_keys: IndexSet<&str> = IndexSet::new();
        for (_, map) in set.iter() {
            all_keys.extend(map.keys().map(String::as_str));
        }

        let mut rows: Vec<GridRow> = all_keys
            .into_iter()
            .map(|key| {
                let mut row = Vec::with_capacity(set.len() + 1);
                row.push(key.to_string());
                for (_, map) in set.iter() {
                    row.push(map.get(key).map(cell_text_of).unwrap_or_default());
                }
                row
            })
            .collect();

        let width = set.len() + 1;
        rows.push(vec![String::new(); width]);

        let mut headers = Vec::with_capacity(width);
        headers.push(KEY_COLUMN_HEADER.to_string());
        headers.extend(set.file_names());

        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// 行数（含备用行）
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_spare_row(&self, row: usize) -> bool {
        row + 1 == self.rows.len()
    }

    /// 整张表的数据
    pub fn data(&self) -> &[GridRow] {
        &self.rows
    }

    /// 单列的全部值（含备用行）
    pub fn column_values(&self, col: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|r| r.get(col).map(String::as_str))
            .collect()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// 某行的键（第 0 列）
    pub fn key_at(&self, row: usize) -> Option<&str> {
        self.cell(row, 0)
    }

    /// 写入单元格并返回旧值
    ///
    /// 写入备用行后会在末尾补一行新的备用行。
    pub fn set_cell(&mut self, row: usize, col: usize, value: String) -> Result<String, AppError> {
        let width = self.headers.len();
        let spare = self.is_spare_row(row);
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or_else(|| AppError::State(format!("单元格越界: ({}, {})", row, col)))?;
        let old = std::mem::replace(cell, value);
        if spare && !cell.is_empty() {
            self.rows.push(vec![String::new(); width]);
        }
        Ok(old)
    }
}
