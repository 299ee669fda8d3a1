/// Bottom panel listing the session transcript, newest line kept visible.

use crate::log::session::SessionLog;

pub fn show_log_panel(ctx: &egui::Context, log: &SessionLog) {
    egui::TopBottomPanel::bottom("session_log")
        .resizable(true)
        .default_height(110.0)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new("Session log").strong());
            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for entry in &log.entries {
                        ui.monospace(entry.to_text());
                    }
                    if log.is_empty() {
                        ui.weak("No operations yet");
                    }
                });
        });
}
