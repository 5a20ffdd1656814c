//! 单元格校验：重复键与缺失译文的标记，每次渲染时计算，不做持久化

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::model::grid::Grid;

/// 单元格的显示状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub duplicate: bool,
    pub missing: bool,
}

/// 计算某个单元格的显示状态
///
/// - 第 0 列：非空键在整列出现多于一次时标记为重复；
/// - 其余列：值为空或只含空白时标记为缺失；
/// - 备用行两项都不检查。
pub fn compute_cell_style(row: usize, col: usize, grid: &Grid) -> CellStyle {
    let mut style = CellStyle::default();
    if grid.is_spare_row(row) {
        return style;
    }
    let Some(value) = grid.cell(row, col) else {
        return style;
    };

    if col == 0 {
        if !value.is_empty() {
            let hits = grid.column_values(0).into_iter().filter(|k| *k == value).count();
            style.duplicate = hits > 1;
        }
    } else {
        style.missing = value.trim().is_empty();
    }
    style
}

/// 一次性计算整张表的显示状态，键的出现次数只统计一遍
pub fn compute_grid_styles(grid: &Grid) -> Vec<Vec<CellStyle>> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in grid.column_values(0) {
        *counts.entry(key).or_default() += 1;
    }

    grid.data()
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let spare = grid.is_spare_row(r);
            row.iter()
                .enumerate()
                .map(|(c, value)| match (spare, c) {
                    (true, _) => CellStyle::default(),
                    (false, 0) => CellStyle {
                        duplicate: !value.is_empty() && counts.get(value.as_str()).copied().unwrap_or(0) > 1,
                        missing: false,
                    },
                    (false, _) => CellStyle {
                        duplicate: false,
                        missing: value.trim().is_empty(),
                    },
                })
                .collect()
        })
        .collect()
}

/// 找出重复出现的非空键（去重，按第二次出现的顺序）
pub fn find_duplicate_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: IndexSet<&str> = IndexSet::new();
    let mut dups: IndexSet<&str> = IndexSet::new();
    for key in keys {
        if key.is_empty() {
            continue;
        }
        if !seen.insert(key) {
            dups.insert(key);
        }
    }
    dups.into_iter().map(str::to_string).collect()
}
