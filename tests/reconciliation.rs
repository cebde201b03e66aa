// Store <-> display configuration reconciliation tests
//
// Covers the two one-directional synchronization operations: pulling
// settings out of the store into the live configuration, and writing
// panel edits back into the store field by field.

use emu_shell::shell::{keys, SHELL_SETTINGS};
use emu_shell::{
    AntialiasEffect, ConfigStore, DisplayConfig, EmulatorHost, PanelEdit, ScalingEffect,
    ShellWindow,
};

fn shell_with_graphics(store: ConfigStore) -> ShellWindow {
    let mut shell = ShellWindow::new(store, EmulatorHost::new());
    shell.open_headless();
    shell.host_mut().init_graphics();
    shell.on_emulator_initialized();
    shell
}

fn live_config(shell: &ShellWindow) -> DisplayConfig {
    shell
        .host()
        .graphics_system()
        .unwrap()
        .presenter()
        .unwrap()
        .borrow()
        .display_config()
}

fn set_live_config(shell: &ShellWindow, config: DisplayConfig) {
    shell
        .host()
        .graphics_system()
        .unwrap()
        .presenter()
        .unwrap()
        .borrow_mut()
        .set_display_config(config);
}

#[test]
fn reconcile_pulls_stored_fsr_settings_without_writing_back() {
    let mut store = ConfigStore::new(SHELL_SETTINGS);
    store.set_str(keys::POSTPROCESS_SCALING_AND_SHARPENING, "fsr");
    store.set_float(keys::POSTPROCESS_FSR_SHARPNESS_REDUCTION, 1.5);
    let writes_before = store.write_count();

    let shell = shell_with_graphics(store);
    shell.reconcile_from_store();

    let config = live_config(&shell);
    assert_eq!(config.effect(), ScalingEffect::Fsr);
    assert_eq!(config.fsr_sharpness_reduction(), 1.5);
    assert_eq!(shell.store().write_count(), writes_before);
}

#[test]
fn reconcile_decodes_unrecognized_tokens_to_defaults() {
    let mut store = ConfigStore::new(SHELL_SETTINGS);
    store.set_str(keys::POSTPROCESS_SCALING_AND_SHARPENING, "quincunx");
    store.set_str(keys::POSTPROCESS_ANTIALIASING, "msaa16");

    let shell = shell_with_graphics(store);
    shell.reconcile_from_store();

    assert_eq!(live_config(&shell).effect(), ScalingEffect::Bilinear);
    let pipeline = shell
        .host()
        .graphics_system()
        .unwrap()
        .command_pipeline()
        .unwrap();
    assert_eq!(
        pipeline.borrow().desired_antialias_effect(),
        AntialiasEffect::None
    );
}

#[test]
fn reconcile_pushes_antialias_to_pipeline() {
    let mut store = ConfigStore::new(SHELL_SETTINGS);
    store.set_str(keys::POSTPROCESS_ANTIALIASING, "fxaa_extreme");

    let shell = shell_with_graphics(store);
    shell.reconcile_from_store();

    let pipeline = shell
        .host()
        .graphics_system()
        .unwrap()
        .command_pipeline()
        .unwrap();
    assert_eq!(
        pipeline.borrow().desired_antialias_effect(),
        AntialiasEffect::FxaaExtreme
    );
}

#[test]
fn cas_only_edit_never_writes_fsr_key_despite_live_drift() {
    let mut store = ConfigStore::new(SHELL_SETTINGS);
    store.set_float(keys::POSTPROCESS_FSR_SHARPNESS_REDUCTION, 0.8);
    let mut shell = shell_with_graphics(store);
    shell.reconcile_from_store();

    // The live FSR value drifts away from the stored one.
    let mut drifted = live_config(&shell);
    drifted.set_fsr_sharpness_reduction(1.2);
    set_live_config(&shell, drifted);

    // The user edits only the CAS sharpness; the panel hands back the
    // full live config with that one change.
    let mut edited = live_config(&shell);
    edited.set_cas_additional_sharpness(0.7);
    shell.apply_edit(PanelEdit {
        config: Some(edited),
        antialias: None,
    });

    assert_eq!(
        shell.store().float_value(keys::POSTPROCESS_FSR_SHARPNESS_REDUCTION),
        0.8,
        "untouched field must not be written back"
    );
    assert_eq!(
        shell.store().float_value(keys::POSTPROCESS_CAS_ADDITIONAL_SHARPNESS),
        0.7f32 as f64
    );
    // The full edit still reached the presenter.
    assert_eq!(live_config(&shell).cas_additional_sharpness(), 0.7);
    assert_eq!(live_config(&shell).fsr_sharpness_reduction(), 1.2);
}

#[test]
fn unchanged_edit_writes_nothing() {
    let store = ConfigStore::new(SHELL_SETTINGS);
    let mut shell = shell_with_graphics(store);
    shell.reconcile_from_store();
    let writes_before = shell.store().write_count();

    let edit = PanelEdit {
        config: Some(live_config(&shell)),
        antialias: Some(AntialiasEffect::None),
    };
    shell.apply_edit(edit);
    shell.apply_edit(edit);

    assert_eq!(shell.store().write_count(), writes_before);
}

#[test]
fn effect_change_writes_its_token() {
    let store = ConfigStore::new(SHELL_SETTINGS);
    let mut shell = shell_with_graphics(store);
    shell.reconcile_from_store();

    let mut edited = live_config(&shell);
    edited.set_effect(ScalingEffect::Cas);
    shell.apply_edit(PanelEdit {
        config: Some(edited),
        antialias: None,
    });
    assert_eq!(
        shell.store().str_value(keys::POSTPROCESS_SCALING_AND_SHARPENING),
        "cas"
    );

    // Switching back to the default persists the empty token.
    let mut back = live_config(&shell);
    back.set_effect(ScalingEffect::Bilinear);
    shell.apply_edit(PanelEdit {
        config: Some(back),
        antialias: None,
    });
    assert_eq!(
        shell.store().str_value(keys::POSTPROCESS_SCALING_AND_SHARPENING),
        ""
    );
}

#[test]
fn antialias_edit_writes_token_and_pushes_pipeline() {
    let store = ConfigStore::new(SHELL_SETTINGS);
    let mut shell = shell_with_graphics(store);
    shell.reconcile_from_store();

    shell.apply_edit(PanelEdit {
        config: None,
        antialias: Some(AntialiasEffect::Fxaa),
    });

    let pipeline = shell
        .host()
        .graphics_system()
        .unwrap()
        .command_pipeline()
        .unwrap();
    assert_eq!(
        pipeline.borrow().desired_antialias_effect(),
        AntialiasEffect::Fxaa
    );
    assert_eq!(shell.store().str_value(keys::POSTPROCESS_ANTIALIASING), "fxaa");
}

#[test]
fn dither_edit_writes_bool() {
    let store = ConfigStore::new(SHELL_SETTINGS);
    let mut shell = shell_with_graphics(store);
    shell.reconcile_from_store();

    let mut edited = live_config(&shell);
    edited.set_dither(false);
    shell.apply_edit(PanelEdit {
        config: Some(edited),
        antialias: None,
    });

    assert!(!shell.store().bool_value(keys::POSTPROCESS_DITHER));
}

#[test]
fn title_launch_reloads_store_and_flows_one_way_into_live_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("emu_shell.toml");
    std::fs::write(&config_path, "postprocess_scaling_and_sharpening = \"cas\"\n").unwrap();

    let store = ConfigStore::load(&config_path, SHELL_SETTINGS).unwrap();
    let mut shell = shell_with_graphics(store);
    shell.reconcile_from_store();
    assert_eq!(live_config(&shell).effect(), ScalingEffect::Cas);

    // A concurrent writer rewrites the file while the shell is running.
    std::fs::write(
        &config_path,
        "postprocess_scaling_and_sharpening = \"fsr\"\npostprocess_fsr_sharpness_reduction = 0.5\n",
    )
    .unwrap();

    // Launching content completes an external reload and triggers the
    // reconcile callback.
    let content = dir.path().join("game.iso");
    std::fs::write(&content, b"content").unwrap();
    shell.file_drop(content);

    let config = live_config(&shell);
    assert_eq!(config.effect(), ScalingEffect::Fsr);
    assert_eq!(config.fsr_sharpness_reduction(), 0.5);
    assert_eq!(shell.store().write_count(), 0, "reload must not echo into the store");
    assert!(shell.host().is_title_open());
}

#[test]
fn fsr_max_passes_flows_from_store_but_is_never_written() {
    let mut store = ConfigStore::new(SHELL_SETTINGS);
    store.set_uint(keys::POSTPROCESS_FSR_MAX_UPSAMPLING_PASSES, 2);
    let writes_before = store.write_count();

    let mut shell = shell_with_graphics(store);
    shell.reconcile_from_store();
    assert_eq!(live_config(&shell).fsr_max_upsampling_passes(), 2);

    let mut edited = live_config(&shell);
    edited.set_effect(ScalingEffect::Fsr);
    shell.apply_edit(PanelEdit {
        config: Some(edited),
        antialias: None,
    });

    assert_eq!(
        shell.store().uint_value(keys::POSTPROCESS_FSR_MAX_UPSAMPLING_PASSES),
        2
    );
    // Only the effect token was written.
    assert_eq!(shell.store().write_count(), writes_before + 1);
}
