//! 翻译集合：文件名 → (键 → 译文) 的内存映射

use indexmap::IndexMap;
use serde_json::Value;

use crate::model::data_core::AppError;

/// 单个文件的键值映射（保持文件中键的出现顺序）
///
/// 值保留原始 JSON，显示文本由 [`cell_text_of`] 派生；编辑过的值为字符串。
pub type TranslationMap = IndexMap<String, Value>;

/// 文件名列表：决定列顺序，也是跨文件的连接键
pub type FileNameList = Vec<String>;

/// 一个已读取、待解析的源文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// 所有已加载文件的翻译集合，按加载顺序保存
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationSet {
    files: IndexMap<String, TranslationMap>,
}

impl TranslationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个文件；同名文件视为错误（列与归档条目都以文件名区分）
    pub fn insert_file(&mut self, name: String, map: TranslationMap) -> Result<(), AppError> {
        if self.files.contains_key(&name) {
            return Err(AppError::DuplicateFileName(name));
        }
        self.files.insert(name, map);
        Ok(())
    }

    pub fn file_names(&self) -> FileNameList {
        self.files.keys().cloned().collect()
    }

    pub fn file(&self, name: &str) -> Option<&TranslationMap> {
        self.files.get(name)
    }

    pub fn file_mut(&mut self, name: &str) -> Option<&mut TranslationMap> {
        self.files.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TranslationMap)> {
        self.files.iter()
    }
}

/// 把单元格中的 JSON 值转为显示文本
///
/// 假值（null、false、0、空串）显示为空；对象与数组显示为紧凑 JSON。
pub fn cell_text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        Value::Number(n) => {
            if n.as_f64() == Some(0.0) {
                String::new()
            } else {
                n.to_string()
            }
        }
        Value::Object(_) | Value::Array(_) => v.to_string(),
    }
}

/// 解析单个源文件为翻译映射
pub fn parse_translation_map(source: &SourceFile) -> Result<TranslationMap, AppError> {
    let dom: Value = serde_json::from_str(&source.text).map_err(|e| AppError::Parse {
        file: source.name.clone(),
        source: e,
    })?;
    let Value::Object(obj) = dom else {
        return Err(AppError::NotAnObject {
            file: source.name.clone(),
        });
    };
    Ok(obj.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_object() {
        let src = SourceFile::new("en.json", r#"{"hi": "Hello", "bye": "Bye"}"#);
        let map = parse_translation_map(&src).expect("解析失败");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("hi").and_then(Value::as_str), Some("Hello"));
    }

    #[test]
    fn test_parse_opaque_values() {
        let src = SourceFile::new(
            "mixed.json",
            r#"{"a": null, "b": false, "c": 0, "d": 12, "e": true, "f": {"x": 1}, "g": [1, 2]}"#,
        );
        let map = parse_translation_map(&src).expect("解析失败");
        let text = |k: &str| cell_text_of(&map[k]);
        assert_eq!(text("a"), "");
        assert_eq!(text("b"), "");
        assert_eq!(text("c"), "");
        assert_eq!(text("d"), "12");
        assert_eq!(text("e"), "true");
        assert_eq!(text("f"), r#"{"x":1}"#);
        assert_eq!(text("g"), "[1,2]");
        assert_eq!(map["d"], Value::from(12), "原始值应被保留");
    }

    #[test]
    fn test_parse_error_names_file() {
        let src = SourceFile::new("broken.json", r#"{"hi": "#);
        let err = parse_translation_map(&src).unwrap_err();
        assert!(matches!(err, AppError::Parse { ref file, .. } if file == "broken.json"));
        assert!(err.to_string().contains("broken.json"), "错误信息应包含文件名");
    }

    #[test]
    fn test_top_level_array_rejected() {
        let src = SourceFile::new("list.json", "[1, 2, 3]");
        let err = parse_translation_map(&src).unwrap_err();
        assert!(matches!(err, AppError::NotAnObject { .. }));
    }

    #[test]
    fn test_duplicate_file_name_rejected() {
        let mut set = TranslationSet::new();
        set.insert_file("en.json".into(), TranslationMap::new()).expect("首次插入应成功");
        let err = set.insert_file("en.json".into(), TranslationMap::new()).unwrap_err();
        assert!(matches!(err, AppError::DuplicateFileName(ref n) if n == "en.json"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_file_order_follows_insertion() {
        let mut set = TranslationSet::new();
        set.insert_file("zh.json".into(), TranslationMap::new()).unwrap();
        set.insert_file("de.json".into(), TranslationMap::new()).unwrap();
        assert_eq!(set.file_names(), vec!["zh.json".to_string(), "de.json".to_string()]);
    }
}
