/// Toolbar — top menu bar with file operations and quick actions

/// Actions that can be triggered from the toolbar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    None,
    OpenFile,
    ExportData,
    ExportLogText,
    ExportLogJson,
    Undo,
    Redo,
    ShowAbout,
}

/// Render the toolbar and return any triggered action
pub fn show_toolbar(
    ctx: &egui::Context,
    undo_label: Option<&str>,
    redo_label: Option<&str>,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("📁 File", |ui| {
                if ui.button("📂 Open Spectrum…").clicked() {
                    action = ToolbarAction::OpenFile;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("💾 Export Spectrum…").clicked() {
                    action = ToolbarAction::ExportData;
                    ui.close_menu();
                }
                if ui.button("📋 Export Log (text)…").clicked() {
                    action = ToolbarAction::ExportLogText;
                    ui.close_menu();
                }
                if ui.button("📋 Export Log (JSON)…").clicked() {
                    action = ToolbarAction::ExportLogJson;
                    ui.close_menu();
                }
            });

            ui.menu_button("✏ Edit", |ui| {
                let undo_text = match undo_label {
                    Some(label) => format!("↩ Undo {}", label),
                    None => "↩ Undo".to_string(),
                };
                if ui
                    .add_enabled(undo_label.is_some(), egui::Button::new(undo_text))
                    .clicked()
                {
                    action = ToolbarAction::Undo;
                    ui.close_menu();
                }
                let redo_text = match redo_label {
                    Some(label) => format!("↪ Redo {}", label),
                    None => "↪ Redo".to_string(),
                };
                if ui
                    .add_enabled(redo_label.is_some(), egui::Button::new(redo_text))
                    .clicked()
                {
                    action = ToolbarAction::Redo;
                    ui.close_menu();
                }
            });

            ui.menu_button("❓ Help", |ui| {
                if ui.button("About").clicked() {
                    action = ToolbarAction::ShowAbout;
                    ui.close_menu();
                }
            });
        });
    });

    action
}
