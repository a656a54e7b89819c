use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use ws_core::{AxialTilt, BiomeRegistry};
use ws_persistence::PresetStore;
use ws_preview::PreviewState;
use ws_world::{
    GenerationPreset, COMMONALITY_RANGE, DEFAULT_COMMONALITY, DEFAULT_SCORE_OFFSET, DENSITY_RANGE,
    SCORE_OFFSET_RANGE,
};

/// Resource for tracking UI state in the generator panel.
#[derive(Resource, Default)]
pub struct GeneratorUiState {
    /// Show save dialog.
    pub show_save_dialog: bool,
    /// Preset name being typed in the save dialog.
    pub save_name: String,
    /// Show load dialog.
    pub show_load_dialog: bool,
    /// Available preset names for loading.
    pub available_presets: Vec<String>,
    /// Status message to display.
    pub status_message: Option<(String, f64)>,
}

/// System to render the world generation settings panel.
pub fn generator_ui_system(
    mut contexts: EguiContexts,
    mut preset: ResMut<GenerationPreset>,
    registry: Res<BiomeRegistry>,
    store: Res<PresetStore>,
    mut preview: ResMut<PreviewState>,
    mut ui_state: ResMut<GeneratorUiState>,
) {
    egui::SidePanel::left("generator_panel")
        .default_width(260.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("World Generation");
            ui.separator();

            // Seed
            ui.label("Seed:");
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut preset.seed_string);
                if ui.button("🎲").on_hover_text("Randomize everything").clicked() {
                    let mut rng = rand::thread_rng();
                    preset.randomize(&mut rng);
                }
            });
            ui.add_space(8.0);

            // Planet dials
            ui.collapsing("Planet", |ui| {
                ui.add(
                    egui::Slider::new(&mut preset.planet_coverage, 0.05..=1.0)
                        .text("Coverage"),
                );
                ui.add(egui::Slider::new(&mut preset.rainfall, 0.0..=2.0).text("Rainfall"));
                ui.add(egui::Slider::new(&mut preset.temperature, 0.0..=2.0).text("Temperature"));
                ui.add(egui::Slider::new(&mut preset.population, 0.0..=2.0).text("Population"));
                ui.add(egui::Slider::new(&mut preset.pollution, 0.0..=1.0).text("Pollution"));

                let mut tilt_index = preset.axial_tilt.index();
                let tilt_count = AxialTilt::all().len();
                if ui
                    .add(
                        egui::Slider::new(&mut tilt_index, 0..=tilt_count - 1)
                            .text("Axial Tilt")
                            .custom_formatter(|v, _| {
                                AxialTilt::from_index(v as usize).name().to_string()
                            }),
                    )
                    .changed()
                {
                    preset.axial_tilt = AxialTilt::from_index(tilt_index);
                }
            });
            ui.add_space(8.0);

            // Terrain densities
            ui.collapsing("Terrain", |ui| {
                density_slider(ui, &mut preset.sea_level, "Sea Level");
                density_slider(ui, &mut preset.mountain_density, "Mountains");
                density_slider(ui, &mut preset.river_density, "Rivers");
                density_slider(ui, &mut preset.ancient_road_density, "Ancient Roads");
                density_slider(ui, &mut preset.faction_road_density, "Roads");
            });
            ui.add_space(8.0);

            // Per-biome tuning
            ui.collapsing("Biomes", |ui| {
                biome_sliders(ui, &mut preset, &registry);
            });
            ui.add_space(8.0);

            if ui.button("Reset All").clicked() {
                preset.reset(&registry);
            }
            ui.add_space(16.0);
            ui.separator();

            // Preview controls
            let mut show_preview = preview.scheduler.is_enabled();
            if ui.checkbox(&mut show_preview, "Show Preview").changed() {
                preview.scheduler.set_enabled(show_preview);
            }
            if ui.button("Regenerate").clicked() {
                preview.scheduler.request_refresh();
            }

            let (done, total) = preview.scheduler.progress();
            if preview.scheduler.is_generating() && total > 0 {
                ui.add(
                    egui::ProgressBar::new(done as f32 / total as f32)
                        .text(format!("{done} / {total}")),
                );
            }
            ui.add_space(16.0);
            ui.separator();

            // Save/Load buttons
            if ui.button("Save Preset...").clicked() {
                ui_state.show_save_dialog = true;
            }
            if ui.button("Load Preset...").clicked() {
                ui_state.show_load_dialog = true;
                ui_state.available_presets = store.list().unwrap_or_default();
            }

            // Status message
            if let Some((msg, _)) = &ui_state.status_message {
                ui.add_space(8.0);
                ui.label(msg);
            }
        });

    save_dialog(&mut contexts, &preset, &store, &mut ui_state);
    load_dialog(&mut contexts, &mut preset, &registry, &store, &mut ui_state);
}

fn density_slider(ui: &mut egui::Ui, value: &mut f32, label: &str) {
    ui.add(
        egui::Slider::new(value, DENSITY_RANGE.0..=DENSITY_RANGE.1)
            .step_by(0.1)
            .text(label),
    );
}

fn biome_sliders(ui: &mut egui::Ui, preset: &mut GenerationPreset, registry: &BiomeRegistry) {
    // Late-registered biomes get sliders too.
    preset.ensure_biome_entries(registry);

    egui::ScrollArea::vertical()
        .max_height(260.0)
        .show(ui, |ui| {
            for biome in registry.iter() {
                ui.label(&biome.label);
                if let Some(value) = preset.biome_commonalities.get_mut(&biome.id) {
                    let slider = egui::Slider::new(
                        value,
                        COMMONALITY_RANGE.0..=COMMONALITY_RANGE.1,
                    )
                    .text("Commonality");
                    let response = ui.add(slider);
                    tint_tweaked(ui, response, *value, DEFAULT_COMMONALITY);
                }
                if let Some(value) = preset.biome_score_offsets.get_mut(&biome.id) {
                    let slider = egui::Slider::new(
                        value,
                        SCORE_OFFSET_RANGE.0..=SCORE_OFFSET_RANGE.1,
                    )
                    .text("Score Offset");
                    let response = ui.add(slider);
                    tint_tweaked(ui, response, *value, DEFAULT_SCORE_OFFSET);
                }
                ui.add_space(4.0);
            }
        });

    if preset.has_biome_tweaks() && ui.button("Reset Biomes").clicked() {
        preset.reset_biome_commonalities();
        preset.reset_biome_score_offsets();
    }
}

/// Outline a slider whose value differs from the default: green when
/// raised, red when lowered.
fn tint_tweaked(ui: &egui::Ui, response: egui::Response, value: i32, default: i32) {
    if value == default {
        return;
    }
    let color = if value > default {
        egui::Color32::from_rgb(80, 180, 80)
    } else {
        egui::Color32::from_rgb(200, 80, 80)
    };
    ui.painter()
        .rect_stroke(response.rect, 2.0, egui::Stroke::new(1.0, color));
}

fn save_dialog(
    contexts: &mut EguiContexts,
    preset: &GenerationPreset,
    store: &PresetStore,
    ui_state: &mut GeneratorUiState,
) {
    if !ui_state.show_save_dialog {
        return;
    }

    let mut close_dialog = false;
    let mut save_requested = false;

    egui::Window::new("Save Preset")
        .collapsible(false)
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.label("Preset name:");
            ui.text_edit_singleline(&mut ui_state.save_name);
            if store.exists(ui_state.save_name.trim()) {
                ui.colored_label(
                    egui::Color32::from_rgb(220, 170, 60),
                    "A preset with this name exists and will be overwritten.",
                );
            }
            ui.separator();
            ui.horizontal(|ui| {
                let name_ok = !ui_state.save_name.trim().is_empty();
                if ui.add_enabled(name_ok, egui::Button::new("Save")).clicked() {
                    save_requested = true;
                    close_dialog = true;
                }
                if ui.button("Cancel").clicked() {
                    close_dialog = true;
                }
            });
        });

    if save_requested {
        let name = ui_state.save_name.trim().to_string();
        match store.save(&name, preset) {
            Ok(()) => {
                ui_state.status_message = Some((format!("Saved preset '{}'", name), 3.0));
            }
            Err(e) => {
                ui_state.status_message = Some((format!("Save failed: {}", e), 5.0));
                eprintln!("Failed to save preset: {}", e);
            }
        }
    }
    if close_dialog {
        ui_state.show_save_dialog = false;
    }
}

fn load_dialog(
    contexts: &mut EguiContexts,
    preset: &mut GenerationPreset,
    registry: &BiomeRegistry,
    store: &PresetStore,
    ui_state: &mut GeneratorUiState,
) {
    if !ui_state.show_load_dialog {
        return;
    }

    let mut close_dialog = false;
    let mut load_name: Option<String> = None;
    let mut delete_name: Option<String> = None;

    egui::Window::new("Load Preset")
        .collapsible(false)
        .resizable(true)
        .show(contexts.ctx_mut(), |ui| {
            ui.label("Select a preset to load:");
            ui.separator();

            egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                for name in &ui_state.available_presets {
                    ui.horizontal(|ui| {
                        if ui.selectable_label(false, name).clicked() {
                            load_name = Some(name.clone());
                            close_dialog = true;
                        }
                        if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                            delete_name = Some(name.clone());
                        }
                    });
                }

                if ui_state.available_presets.is_empty() {
                    ui.label("No saved presets found.");
                }
            });

            ui.separator();
            if ui.button("Cancel").clicked() {
                close_dialog = true;
            }
        });

    if let Some(name) = delete_name {
        match store.delete(&name) {
            Ok(()) => {
                ui_state.available_presets.retain(|n| n != &name);
                ui_state.status_message = Some((format!("Deleted preset '{}'", name), 3.0));
            }
            Err(e) => {
                ui_state.status_message = Some((format!("Delete failed: {}", e), 5.0));
                eprintln!("Failed to delete preset: {}", e);
            }
        }
    }

    if close_dialog {
        ui_state.show_load_dialog = false;
    }

    if let Some(name) = load_name {
        match store.load(&name) {
            Ok(loaded) => {
                *preset = loaded;
                // A preset saved before new biomes existed still needs
                // sliders for them.
                preset.ensure_biome_entries(registry);
                ui_state.status_message = Some((format!("Loaded preset '{}'", name), 3.0));
            }
            Err(e) => {
                ui_state.status_message = Some((format!("Load failed: {}", e), 5.0));
                eprintln!("Failed to load preset: {}", e);
            }
        }
    }
}

/// Feed preset edits into the preview scheduler. Runs every frame; the
/// scheduler ignores submissions equal to its last snapshot.
pub fn sync_preview_system(preset: Res<GenerationPreset>, mut preview: ResMut<PreviewState>) {
    preview.scheduler.preset_changed(&preset);
}

/// Expire timed status messages.
pub fn status_message_system(time: Res<Time>, mut ui_state: ResMut<GeneratorUiState>) {
    if let Some((_, remaining)) = &mut ui_state.status_message {
        *remaining -= time.delta_secs_f64();
        if *remaining <= 0.0 {
            ui_state.status_message = None;
        }
    }
}
