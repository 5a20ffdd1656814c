//! 程序入口：初始化日志、加载 Slint UI，并把表格回调绑定到 Session

use std::{cell::RefCell, path::PathBuf, rc::Rc, time::Instant};

use slint::{ComponentHandle, Model, ModelRc, SharedString, VecModel};
use tracing_subscriber::fmt::SubscriberBuilder;

use biaoge_fanyi::model::export::write_archive;
use biaoge_fanyi::vm::bridge::*;
use biaoge_fanyi::{LoadOutcome, Session};

slint::include_modules!();

impl From<&CellView> for GridCellData {
    /// 将单元格视图转换为Slint可用的数据结构
    fn from(cell: &CellView) -> Self {
        Self {
            text: cell.text.as_str().into(),
            duplicate: cell.duplicate,
            missing: cell.missing,
        }
    }
}

/// VM桥接器：管理UI与数据层的交互
struct ViewModelBridge {
    session: Rc<RefCell<Session>>,
    // 外层行模型与每行的单元格模型，保持实例以免编辑时丢失焦点
    rows_model: Rc<VecModel<GridRowData>>,
    cell_models: Rc<RefCell<Vec<Rc<VecModel<GridCellData>>>>>,
}

impl ViewModelBridge {
    /// 创建新的VM桥接器并绑定所有回调
    fn new(app_window: &AppWindow, session: Rc<RefCell<Session>>) -> Self {
        let bridge = Self {
            session,
            rows_model: Rc::new(VecModel::default()),
            cell_models: Rc::new(RefCell::new(Vec::new())),
        };
        bridge.setup_callbacks(app_window);
        bridge
    }

    /// 设置所有UI回调函数
    fn setup_callbacks(&self, app_window: &AppWindow) {
        // === 加载文件回调 ===
        {
            let session = self.session.clone();
            let rows_model = self.rows_model.clone();
            let cell_models = self.cell_models.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_load_files(move || {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_load_files(&app_window, &session, &rows_model, &cell_models);
                }
            });
        }

        // === 单元格编辑回调 ===
        {
            let session = self.session.clone();
            let rows_model = self.rows_model.clone();
            let cell_models = self.cell_models.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_cell_edited(move |row, col, text| {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_cell_edited(&app_window, &session, &rows_model, &cell_models, row, col, text);
                }
            });
        }

        // === 导出回调 ===
        {
            let session = self.session.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_export_pressed(move || {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_export_pressed(&app_window, &session);
                }
            });
        }
    }

    /// 初始化UI状态
    fn initialize_ui(&self, app_window: &AppWindow) {
        app_window.set_status_message(STATUS_READY.into());
        app_window.set_performance_info("".into());
        app_window.set_export_enabled(false);
        app_window.set_key_column_width(KEY_COLUMN_WIDTH);
        app_window.set_value_column_width(VALUE_COLUMN_WIDTH);
        app_window.set_column_headers(ModelRc::new(VecModel::<SharedString>::default()));
        app_window.set_grid_rows(ModelRc::from(self.rows_model.clone()));
    }

    /// 显示文件选择对话框（可多选）
    fn show_files_dialog() -> Option<Vec<PathBuf>> {
        use rfd::FileDialog;

        let files = FileDialog::new()
            .add_filter("JSON文件", &["json"])
            .add_filter("zip归档", &["zip"])
            .add_filter("所有文件", &["*"])
            .set_title("选择要编辑的翻译文件")
            .pick_files();

        match files {
            Some(paths) => {
                tracing::info!("用户选择了 {} 个文件", paths.len());
                Some(paths)
            }
            None => {
                tracing::info!("用户取消了文件选择");
                None
            }
        }
    }

    /// 丢弃现有数据前的确认对话框
    fn confirm_discard_dialog() -> bool {
        use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

        let result = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title(CONFIRM_DISCARD_TITLE)
            .set_description(CONFIRM_DISCARD_TEXT)
            .set_buttons(MessageButtons::YesNo)
            .show();
        matches!(result, MessageDialogResult::Yes)
    }

    /// 阻塞式错误提示，同时写入状态栏
    fn show_error(app_window: &AppWindow, message: &str) {
        use rfd::{MessageButtons, MessageDialog, MessageLevel};

        app_window.set_status_message(format!("{}{}", STATUS_ERROR_PREFIX, message).into());
        let _ = MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title("错误")
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }

    /// 处理加载文件操作
    fn handle_load_files(
        app_window: &AppWindow,
        session: &Rc<RefCell<Session>>,
        rows_model: &Rc<VecModel<GridRowData>>,
        cell_models: &Rc<RefCell<Vec<Rc<VecModel<GridCellData>>>>>,
    ) {
        let Some(paths) = Self::show_files_dialog() else {
            return;
        };

        app_window.set_status_message(STATUS_LOADING.into());
        let start_time = Instant::now();

        let confirm = Self::confirm_discard_dialog;
        let load_result = session.borrow_mut().load_paths(&paths, &confirm);
        match load_result {
            Ok(LoadOutcome::Loaded { files, rows }) => {
                let load_duration = start_time.elapsed();
                Self::render_full(app_window, &session.borrow(), rows_model, cell_models);

                let perf_info = format!("加载: {}ms | 文件: {} | 行: {}",
                    load_duration.as_millis(),
                    files,
                    rows.saturating_sub(1)
                );
                app_window.set_performance_info(perf_info.into());
                app_window.set_export_enabled(true);
                app_window.set_status_message(STATUS_LOADED.into());
            }
            Ok(LoadOutcome::Cancelled) => {
                app_window.set_status_message(STATUS_LOAD_CANCELLED.into());
            }
            Ok(LoadOutcome::Empty) => {
                app_window.set_status_message(STATUS_READY.into());
            }
            Err(e) => {
                tracing::error!("文件加载失败: {}", e);
                Self::show_error(app_window, &e.to_string());
            }
        }
    }

    /// 处理单元格编辑：回写 Session 后刷新样式
    fn handle_cell_edited(
        app_window: &AppWindow,
        session: &Rc<RefCell<Session>>,
        rows_model: &Rc<VecModel<GridRowData>>,
        cell_models: &Rc<RefCell<Vec<Rc<VecModel<GridCellData>>>>>,
        row: i32,
        col: i32,
        text: SharedString,
    ) {
        let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col)) else {
            return;
        };

        let edit_result = session.borrow_mut().apply_edits(&[(row, col, text.to_string())]);
        match edit_result {
            Ok(changes) => {
                if !changes.is_empty() {
                    tracing::info!("单元格 ({}, {}) 已修改", row, col);
                }
                Self::refresh(&session.borrow(), rows_model, cell_models);
            }
            Err(e) => {
                tracing::error!("单元格修改失败: {}", e);
                Self::show_error(app_window, &e.to_string());
            }
        }
    }

    /// 处理导出操作
    fn handle_export_pressed(app_window: &AppWindow, session: &Rc<RefCell<Session>>) {
        // 先校验再询问保存位置，重复键时不弹出保存对话框
        let files = match session.borrow().export_files() {
            Ok(files) => files,
            Err(e) => {
                Self::show_error(app_window, &e.to_string());
                return;
            }
        };

        let Some(target) = rfd::FileDialog::new()
            .set_title("保存翻译归档")
            .set_file_name(ARCHIVE_FILE_NAME)
            .add_filter("zip归档", &["zip"])
            .save_file()
        else {
            tracing::info!("用户取消了导出");
            return;
        };

        match write_archive(&files, &target) {
            Ok(_) => {
                app_window.set_status_message(format!("{}: {}", STATUS_EXPORTED, target.display()).into());
            }
            Err(e) => {
                tracing::error!("导出失败: {}", e);
                Self::show_error(app_window, &e.to_string());
            }
        }
    }

    /// 从头重建表头与全部行模型
    fn render_full(
        app_window: &AppWindow,
        session: &Session,
        rows_model: &Rc<VecModel<GridRowData>>,
        cell_models: &Rc<RefCell<Vec<Rc<VecModel<GridCellData>>>>>,
    ) {
        let headers: Vec<SharedString> = session
            .grid()
            .map(|g| g.headers().iter().map(|h| h.as_str().into()).collect())
            .unwrap_or_default();
        app_window.set_column_headers(ModelRc::new(VecModel::from(headers)));

        let mut models = cell_models.borrow_mut();
        models.clear();
        let rows: Vec<GridRowData> = grid_view(session)
            .iter()
            .map(|row| {
                let cells = Rc::new(VecModel::from(row.iter().map(GridCellData::from).collect::<Vec<_>>()));
                models.push(cells.clone());
                GridRowData { cells: ModelRc::from(cells) }
            })
            .collect();
        rows_model.set_vec(rows);
    }

    /// 重新计算重复/缺失标记，只更新有变化的单元格；新增备用行追加到末尾
    fn refresh(
        session: &Session,
        rows_model: &Rc<VecModel<GridRowData>>,
        cell_models: &Rc<RefCell<Vec<Rc<VecModel<GridCellData>>>>>,
    ) {
        let view = grid_view(session);
        let mut models = cell_models.borrow_mut();
        for (r, row) in view.iter().enumerate() {
            if let Some(cells) = models.get(r) {
                for (c, cell) in row.iter().enumerate() {
                    let data = GridCellData::from(cell);
                    if cells.row_data(c).as_ref() != Some(&data) {
                        cells.set_row_data(c, data);
                    }
                }
            } else {
                let cells = Rc::new(VecModel::from(row.iter().map(GridCellData::from).collect::<Vec<_>>()));
                models.push(cells.clone());
                rows_model.push(GridRowData { cells: ModelRc::from(cells) });
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let app = AppWindow::new()?;
    let session = Rc::new(RefCell::new(Session::default()));

    // 创建VM桥接器并绑定UI回调
    let bridge = ViewModelBridge::new(&app, session);
    bridge.initialize_ui(&app);

    tracing::info!("应用启动成功，UI已初始化");
    app.run()?;
    Ok(())
}
