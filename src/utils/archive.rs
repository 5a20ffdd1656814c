//! Archive helper: pack named text entries into a zip, and read them back

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::model::data_core::AppError;
use crate::model::translation_set::SourceFile;

/// 逐个添加命名文本条目，最后生成 zip 字节
pub struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }

    /// 添加一个文本条目
    pub fn add_text(&mut self, name: &str, content: &str) -> Result<(), AppError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip.write_all(content.as_bytes())?;
        self.entries += 1;
        Ok(())
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    /// 结束写入并返回归档字节
    pub fn finish(self) -> Result<Vec<u8>, AppError> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// 读取归档中的全部条目（跳过目录），按归档内顺序返回
pub fn read_archive_entries(archive_name: &str, bytes: &[u8]) -> Result<Vec<SourceFile>, AppError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut out = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut text = String::new();
        entry.read_to_string(&mut text).map_err(|e| AppError::Read {
            file: format!("{}/{}", archive_name, name),
            source: e,
        })?;
        out.push(SourceFile::new(name, text));
    }
    Ok(out)
}
