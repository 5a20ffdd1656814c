//! IO helper: concurrent file reads for a load batch, archive write to disk

use std::{fs, path::Path, path::PathBuf};

use rayon::prelude::*;

use crate::model::data_core::AppError;
use crate::model::translation_set::SourceFile;
use crate::utils::archive::read_archive_entries;

/// 取路径的文件名部分作为列名
pub fn file_name_of(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| p.to_string_lossy().to_string())
}

fn is_zip(p: &Path) -> bool {
    p.extension()
        .map(|e| e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

/// 读取单个文件；zip 归档展开为其中的每个条目
fn read_one(p: &Path) -> Result<Vec<SourceFile>, AppError> {
    let name = file_name_of(p);
    if is_zip(p) {
        let bytes = fs::read(p).map_err(|e| AppError::Read {
            file: name.clone(),
            source: e,
        })?;
        return read_archive_entries(&name, &bytes);
    }
    let text = fs::read_to_string(p).map_err(|e| AppError::Read {
        file: name.clone(),
        source: e,
    })?;
    Ok(vec![SourceFile::new(name, text)])
}

/// 并发读取一批文件为文本；任一文件失败则整批失败
pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>, AppError> {
    let batches: Vec<Vec<SourceFile>> = paths.par_iter().map(|p| read_one(p)).collect::<Result<_, _>>()?;
    Ok(batches.into_iter().flatten().collect())
}

/// 将归档字节写入磁盘
pub fn write_archive_file(p: &Path, bytes: &[u8]) -> Result<(), AppError> {
    fs::write(p, bytes)?;
    Ok(())
}
