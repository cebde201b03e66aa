// Post-processing settings panel
//
// Non-modal egui window polled once per UI frame. The panel holds no
// setting values of its own: every frame it starts from the live
// configuration handed in, applies the widget edits, and returns the
// full result. Reset buttons load the compile-time defaults, not the
// persisted values.

use crate::display::{AntialiasEffect, DisplayConfig, ScalingEffect};

/// Result of polling the panel for one frame.
///
/// Fields are `None` when the corresponding collaborator was absent and
/// its section was not shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelEdit {
    pub config: Option<DisplayConfig>,
    pub antialias: Option<AntialiasEffect>,
}

/// Display-quality settings panel.
pub struct SettingsPanel {
    open: bool,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self { open: false }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Poll the panel for one frame.
    ///
    /// Returns the edited state on every frame the panel is open, whether
    /// or not anything changed; the controller diffs against the store.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        current_config: Option<DisplayConfig>,
        current_antialias: Option<AntialiasEffect>,
    ) -> Option<PanelEdit> {
        if !self.open {
            return None;
        }

        let mut open = self.open;
        let mut edit = PanelEdit {
            config: None,
            antialias: None,
        };

        egui::Window::new("Post-processing")
            .open(&mut open)
            .default_pos([20.0, 20.0])
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.label("All effects can be used on GPUs of any brand.");
                ui.add_space(4.0);

                if let Some(current) = current_antialias {
                    edit.antialias = Some(Self::antialias_section(ui, current));
                }
                if let Some(current) = current_config {
                    edit.config = Some(Self::scaling_section(ui, current));
                }
            });
        self.open = open;

        Some(edit)
    }

    fn antialias_section(ui: &mut egui::Ui, current: AntialiasEffect) -> AntialiasEffect {
        let mut effect = current;
        egui::CollapsingHeader::new("Anti-aliasing")
            .default_open(true)
            .show(ui, |ui| {
                ui.radio_value(&mut effect, AntialiasEffect::None, "None");
                ui.radio_value(&mut effect, AntialiasEffect::Fxaa, "FXAA, normal quality");
                ui.radio_value(
                    &mut effect,
                    AntialiasEffect::FxaaExtreme,
                    "FXAA, extreme quality",
                );
            });
        effect
    }

    fn scaling_section(ui: &mut egui::Ui, current: DisplayConfig) -> DisplayConfig {
        let mut config = current;

        egui::CollapsingHeader::new("Resampling and sharpening")
            .default_open(true)
            .show(ui, |ui| {
                let mut effect = config.effect();
                ui.radio_value(&mut effect, ScalingEffect::Bilinear, "None / bilinear");
                ui.radio_value(
                    &mut effect,
                    ScalingEffect::Cas,
                    "Contrast Adaptive Sharpening (CAS)",
                );
                ui.radio_value(&mut effect, ScalingEffect::Fsr, "Super Resolution (FSR)");
                config.set_effect(effect);

                let description = match effect {
                    ScalingEffect::Bilinear => {
                        "Simple bilinear filtering is done if resampling is needed."
                    }
                    ScalingEffect::Cas => {
                        "Sharpening and resampling to up to 2x2; bilinear stretching afterwards."
                    }
                    ScalingEffect::Fsr => {
                        "High-quality edge-preserving upscaling; sharpening when not upscaling."
                    }
                };
                ui.label(description);

                if effect == ScalingEffect::Cas || effect == ScalingEffect::Fsr {
                    ui.add_space(4.0);
                    ui.label("FXAA is highly recommended when using CAS or FSR.");
                    ui.add_space(4.0);

                    if effect == ScalingEffect::Fsr {
                        ui.label("FSR sharpness reduction when upscaling (lower is sharper):");
                        let mut reduction = config.fsr_sharpness_reduction();
                        ui.horizontal(|ui| {
                            ui.add(
                                egui::Slider::new(
                                    &mut reduction,
                                    DisplayConfig::FSR_SHARPNESS_REDUCTION_MIN
                                        ..=DisplayConfig::FSR_SHARPNESS_REDUCTION_MAX,
                                )
                                .fixed_decimals(3)
                                .suffix(" stops"),
                            );
                            if ui.button("Reset").clicked() {
                                reduction = DisplayConfig::FSR_SHARPNESS_REDUCTION_DEFAULT;
                            }
                        });
                        config.set_fsr_sharpness_reduction(reduction);
                    }

                    ui.label(if effect == ScalingEffect::Fsr {
                        "CAS additional sharpness when not upscaling (higher is sharper):"
                    } else {
                        "CAS additional sharpness (higher is sharper):"
                    });
                    let mut sharpness = config.cas_additional_sharpness();
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::Slider::new(
                                &mut sharpness,
                                DisplayConfig::CAS_ADDITIONAL_SHARPNESS_MIN
                                    ..=DisplayConfig::CAS_ADDITIONAL_SHARPNESS_MAX,
                            )
                            .fixed_decimals(3),
                        );
                        if ui.button("Reset").clicked() {
                            sharpness = DisplayConfig::CAS_ADDITIONAL_SHARPNESS_DEFAULT;
                        }
                    });
                    config.set_cas_additional_sharpness(sharpness);
                }
            });

        egui::CollapsingHeader::new("Dithering")
            .default_open(true)
            .show(ui, |ui| {
                let mut dither = config.dither();
                ui.checkbox(
                    &mut dither,
                    "Dither the final output to 8bpc to make gradients smoother",
                );
                config.set_dither(dither);
            });

        config
    }
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frame(
        panel: &mut SettingsPanel,
        config: Option<DisplayConfig>,
        antialias: Option<AntialiasEffect>,
    ) -> Option<PanelEdit> {
        let ctx = egui::Context::default();
        let mut edit = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            edit = panel.show(ctx, config, antialias);
        });
        edit
    }

    #[test]
    fn test_closed_panel_returns_nothing() {
        let mut panel = SettingsPanel::new();
        assert!(!panel.is_open());
        let edit = run_frame(
            &mut panel,
            Some(DisplayConfig::new()),
            Some(AntialiasEffect::None),
        );
        assert_eq!(edit, None);
    }

    #[test]
    fn test_open_panel_echoes_current_state_without_input() {
        let mut panel = SettingsPanel::new();
        panel.toggle();

        let mut config = DisplayConfig::new();
        config.set_effect(ScalingEffect::Fsr);
        config.set_fsr_sharpness_reduction(1.5);

        let edit = run_frame(&mut panel, Some(config), Some(AntialiasEffect::Fxaa)).unwrap();
        assert_eq!(edit.config, Some(config));
        assert_eq!(edit.antialias, Some(AntialiasEffect::Fxaa));
    }

    #[test]
    fn test_absent_collaborators_omit_sections() {
        let mut panel = SettingsPanel::new();
        panel.toggle();

        let edit = run_frame(&mut panel, None, None).unwrap();
        assert_eq!(edit.config, None);
        assert_eq!(edit.antialias, None);
    }

    #[test]
    fn test_toggle() {
        let mut panel = SettingsPanel::new();
        panel.toggle();
        assert!(panel.is_open());
        panel.toggle();
        assert!(!panel.is_open());
    }
}
