//! JSON翻译表格编辑库
//!
//! 提供多文件加载、表格构建、重复/缺失校验、编辑回写与 zip 导出功能
//! 遵循MVVM架构模式，界面层只消费 Session 与视图数据

pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use model::data_core::{AppError, Session};
pub use model::grid::{Grid, GridRow};
pub use model::ingest::{ConfirmDiscard, LoadOutcome};
pub use model::validator::{CellStyle, compute_cell_style};
