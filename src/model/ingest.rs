//! 批量加载：整批解析成功才提交，已有数据时先征求确认

use rayon::prelude::*;

use crate::model::data_core::AppError;
use crate::model::translation_set::{SourceFile, TranslationSet, parse_translation_map};

/// 丢弃已加载数据前的确认策略
pub trait ConfirmDiscard {
    fn confirm_discard(&self) -> bool;
}

impl<F: Fn() -> bool> ConfirmDiscard for F {
    fn confirm_discard(&self) -> bool {
        self()
    }
}

/// 一次加载的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 没有选择任何文件
    Empty,
    /// 用户拒绝丢弃现有数据
    Cancelled,
    Loaded { files: usize, rows: usize },
}

/// 并发解析整批源文件；任一失败则整批失败，保持选择顺序
pub fn parse_batch(sources: &[SourceFile]) -> Result<TranslationSet, AppError> {
    let maps = sources
        .par_iter()
        .map(parse_translation_map)
        .collect::<Result<Vec<_>, _>>()?;

    let mut set = TranslationSet::new();
    for (source, map) in sources.iter().zip(maps) {
        set.insert_file(source.name.clone(), map)?;
    }
    Ok(set)
}
