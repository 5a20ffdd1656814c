//! VM桥接层：连接Slint UI与Session数据模型
//!
//! 注意：Slint 回调绑定在main.rs中，因为依赖于Slint生成的类型
//! 这里提供公共常量与与界面无关的视图数据

use crate::model::data_core::Session;
use crate::model::validator::compute_grid_styles;

// === 常量定义（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_LOADING: &str = "正在加载文件...";
pub const STATUS_LOADED: &str = "文件加载完成，回车或离开单元格即提交修改";
pub const STATUS_LOAD_CANCELLED: &str = "已取消加载，保留现有数据";
pub const STATUS_EXPORTED: &str = "导出成功";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";

pub const ARCHIVE_FILE_NAME: &str = "translations.zip";
pub const KEY_COLUMN_HEADER: &str = "Key";
pub const KEY_COLUMN_WIDTH: f32 = 200.0;
pub const VALUE_COLUMN_WIDTH: f32 = 300.0;

pub const CONFIRM_DISCARD_TITLE: &str = "覆盖已加载的文件";
pub const CONFIRM_DISCARD_TEXT: &str = "⚠️ 已经加载了文件。\n加载新文件会丢弃当前的修改。\n\n是否继续？";

/// 单元格视图数据
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellView {
    pub text: String,
    pub duplicate: bool,
    pub missing: bool,
}

/// 生成整张表的视图数据（每次渲染重新计算样式）
pub fn grid_view(session: &Session) -> Vec<Vec<CellView>> {
    let Ok(grid) = session.grid() else {
        return Vec::new();
    };
    let styles = compute_grid_styles(grid);
    grid.data()
        .iter()
        .zip(styles)
        .map(|(row, row_styles)| {
            row.iter()
                .zip(row_styles)
                .map(|(text, style)| CellView {
                    text: text.clone(),
                    duplicate: style.duplicate,
                    missing: style.missing,
                })
                .collect()
        })
        .collect()
}
