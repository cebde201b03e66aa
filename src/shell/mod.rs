// Shell window - top-level controller for the emulation host frontend
//
// Owns the window, the presenter binding, the settings panel, and the
// action table, and performs the two one-directional reconciliations
// between the config store and the live display configuration:
// store -> live on startup and external reloads, panel -> live (always)
// plus panel -> store (changed fields only) on edits.

pub mod actions;
pub mod binding;
pub mod profiler;
pub mod recent;
pub mod settings_panel;
pub mod title;

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::{ConfigStore, SettingDefault, SettingDescriptor};
use crate::display::{
    AntialiasEffect, DisplayConfig, OverlayDrawer, PlatformWindow, Presenter, ScalingEffect,
};
use crate::host::{CommandPipeline, EmulatorHost};

use actions::ActionId;
use binding::PresenterBinding;
use profiler::FrameProfiler;
use recent::RecentContentList;
use settings_panel::{PanelEdit, SettingsPanel};
use title::{compose_title, TitleInfo};

/// Persisted setting keys owned by the shell.
pub mod keys {
    pub const POSTPROCESS_ANTIALIASING: &str = "postprocess_antialiasing";
    pub const POSTPROCESS_SCALING_AND_SHARPENING: &str = "postprocess_scaling_and_sharpening";
    pub const POSTPROCESS_CAS_ADDITIONAL_SHARPNESS: &str = "postprocess_cas_additional_sharpness";
    pub const POSTPROCESS_FSR_MAX_UPSAMPLING_PASSES: &str = "postprocess_fsr_max_upsampling_passes";
    pub const POSTPROCESS_FSR_SHARPNESS_REDUCTION: &str = "postprocess_fsr_sharpness_reduction";
    pub const POSTPROCESS_DITHER: &str = "postprocess_dither";
    pub const FULLSCREEN: &str = "fullscreen";
}

/// Settings registered by the shell, with their compile-time defaults.
pub const SHELL_SETTINGS: &[SettingDescriptor] = &[
    SettingDescriptor {
        key: keys::POSTPROCESS_ANTIALIASING,
        default: SettingDefault::Str(""),
    },
    SettingDescriptor {
        key: keys::POSTPROCESS_SCALING_AND_SHARPENING,
        default: SettingDefault::Str(""),
    },
    SettingDescriptor {
        key: keys::POSTPROCESS_CAS_ADDITIONAL_SHARPNESS,
        default: SettingDefault::Float(DisplayConfig::CAS_ADDITIONAL_SHARPNESS_DEFAULT as f64),
    },
    SettingDescriptor {
        key: keys::POSTPROCESS_FSR_MAX_UPSAMPLING_PASSES,
        default: SettingDefault::Uint(DisplayConfig::FSR_MAX_UPSAMPLING_PASSES_MAX),
    },
    SettingDescriptor {
        key: keys::POSTPROCESS_FSR_SHARPNESS_REDUCTION,
        default: SettingDefault::Float(DisplayConfig::FSR_SHARPNESS_REDUCTION_DEFAULT as f64),
    },
    SettingDescriptor {
        key: keys::POSTPROCESS_DITHER,
        default: SettingDefault::Bool(true),
    },
    SettingDescriptor {
        key: keys::FULLSCREEN,
        default: SettingDefault::Bool(false),
    },
];

const BASE_TITLE: &str = concat!("emu-shell v", env!("CARGO_PKG_VERSION"));

/// Errors fatal to the shell.
#[derive(Debug)]
pub enum ShellError {
    /// Event loop creation or execution failed
    EventLoop(winit::error::EventLoopError),

    /// The platform window could not be opened at startup
    WindowOpen(winit::error::OsError),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            ShellError::WindowOpen(e) => write!(f, "Failed to open the platform window: {}", e),
        }
    }
}

impl std::error::Error for ShellError {}

impl From<winit::error::EventLoopError> for ShellError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ShellError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ShellError {
    fn from(e: winit::error::OsError) -> Self {
        ShellError::WindowOpen(e)
    }
}

/// Top-level frontend controller.
pub struct ShellWindow {
    store: ConfigStore,
    host: EmulatorHost,
    window: Option<Rc<RefCell<PlatformWindow>>>,
    overlay: OverlayDrawer,
    binding: PresenterBinding,
    profiler: FrameProfiler,
    settings_panel: SettingsPanel,
    recent: RecentContentList,
    emulator_initialized: bool,
    initializing_shader_storage: bool,
    base_title: String,
    pending_launch: Option<PathBuf>,
    ctrl_down: bool,
    fatal: Option<ShellError>,
}

impl ShellWindow {
    pub fn new(store: ConfigStore, host: EmulatorHost) -> Self {
        Self {
            store,
            host,
            window: None,
            overlay: OverlayDrawer::new(),
            binding: PresenterBinding::new(),
            profiler: FrameProfiler::new(),
            settings_panel: SettingsPanel::new(),
            recent: RecentContentList::new(),
            emulator_initialized: false,
            initializing_shader_storage: false,
            base_title: BASE_TITLE.to_string(),
            pending_launch: None,
            ctrl_down: false,
            fatal: None,
        }
    }

    /// Queue content to launch once the shell is up.
    pub fn set_pending_launch(&mut self, path: Option<PathBuf>) {
        self.pending_launch = path;
    }

    /// Open a window with no native backend, for windowless operation.
    pub fn open_headless(&mut self) {
        self.window = Some(Rc::new(RefCell::new(PlatformWindow::headless())));
    }

    /// Replace the recent-content list, e.g. with one loaded from disk.
    pub fn set_recent_content(&mut self, recent: RecentContentList) {
        self.recent = recent;
    }

    pub fn recent_content(&self) -> &RecentContentList {
        &self.recent
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn host(&self) -> &EmulatorHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut EmulatorHost {
        &mut self.host
    }

    pub fn binding(&self) -> &PresenterBinding {
        &self.binding
    }

    pub fn profiler(&self) -> &FrameProfiler {
        &self.profiler
    }

    pub fn settings_panel(&self) -> &SettingsPanel {
        &self.settings_panel
    }

    pub fn window(&self) -> Option<&Rc<RefCell<PlatformWindow>>> {
        self.window.as_ref()
    }

    pub fn is_emulator_initialized(&self) -> bool {
        self.emulator_initialized
    }

    fn graphics_presenter(&self) -> Option<Rc<RefCell<Presenter>>> {
        self.host
            .graphics_system()
            .and_then(|graphics| graphics.presenter())
    }

    fn command_pipeline(&self) -> Option<Rc<RefCell<CommandPipeline>>> {
        self.host
            .graphics_system()
            .and_then(|graphics| graphics.command_pipeline())
    }

    /// Build a display configuration from the store's current values.
    pub fn display_config_from_store(&self) -> DisplayConfig {
        let mut config = DisplayConfig::new();
        config.set_allow_overscan_cutoff(true);
        config.set_effect(ScalingEffect::from_token(
            self.store.str_value(keys::POSTPROCESS_SCALING_AND_SHARPENING),
        ));
        config.set_cas_additional_sharpness(
            self.store
                .float_value(keys::POSTPROCESS_CAS_ADDITIONAL_SHARPNESS) as f32,
        );
        config.set_fsr_max_upsampling_passes(
            self.store
                .uint_value(keys::POSTPROCESS_FSR_MAX_UPSAMPLING_PASSES),
        );
        config.set_fsr_sharpness_reduction(
            self.store
                .float_value(keys::POSTPROCESS_FSR_SHARPNESS_REDUCTION) as f32,
        );
        config.set_dither(self.store.bool_value(keys::POSTPROCESS_DITHER));
        config
    }

    /// Push the store's settings to the rendering pipeline and presenter.
    ///
    /// One-directional: never writes the store, so an external reload
    /// cannot echo back into it.
    pub fn reconcile_from_store(&self) {
        let Some(graphics) = self.host.graphics_system() else {
            return;
        };
        if let Some(pipeline) = graphics.command_pipeline() {
            pipeline
                .borrow_mut()
                .set_desired_antialias_effect(AntialiasEffect::from_token(
                    self.store.str_value(keys::POSTPROCESS_ANTIALIASING),
                ));
        }
        if let Some(presenter) = graphics.presenter() {
            presenter
                .borrow_mut()
                .set_display_config(self.display_config_from_store());
        }
    }

    /// Apply a settings-panel edit.
    ///
    /// The full edited state goes to the pipeline and presenter
    /// unconditionally. The store receives only the fields the user
    /// touched in this edit: the delta between the configuration the
    /// presenter held before the edit and the edit itself. Untouched
    /// fields are left alone even when their stored value has drifted
    /// from the live one, so a concurrent writer's changes are not
    /// clobbered.
    pub fn apply_edit(&mut self, edit: PanelEdit) {
        if let Some(new_antialias) = edit.antialias {
            let mut touched = false;
            if let Some(pipeline) = self.command_pipeline() {
                let before = pipeline.borrow().desired_antialias_effect();
                if before != new_antialias {
                    touched = true;
                    pipeline
                        .borrow_mut()
                        .set_desired_antialias_effect(new_antialias);
                }
            }
            if touched {
                self.store
                    .set_str(keys::POSTPROCESS_ANTIALIASING, new_antialias.token());
            }
        }

        if let Some(new_config) = edit.config {
            let Some(presenter) = self.graphics_presenter() else {
                return;
            };
            // Snapshot the live config before pushing the edit; the
            // delta between the two is what the user touched.
            let before = presenter.borrow().display_config();
            presenter.borrow_mut().set_display_config(new_config);

            if before.effect() != new_config.effect() {
                self.store.set_str(
                    keys::POSTPROCESS_SCALING_AND_SHARPENING,
                    new_config.effect().token(),
                );
            }
            if before.cas_additional_sharpness() != new_config.cas_additional_sharpness() {
                self.store.set_float(
                    keys::POSTPROCESS_CAS_ADDITIONAL_SHARPNESS,
                    new_config.cas_additional_sharpness() as f64,
                );
            }
            if before.fsr_sharpness_reduction() != new_config.fsr_sharpness_reduction() {
                self.store.set_float(
                    keys::POSTPROCESS_FSR_SHARPNESS_REDUCTION,
                    new_config.fsr_sharpness_reduction() as f64,
                );
            }
            if before.dither() != new_config.dither() {
                self.store.set_bool(keys::POSTPROCESS_DITHER, new_config.dither());
            }
            // The maximum FSR pass count is not panel-editable and is
            // never written back.
        }
    }

    /// Bind presenter painting to the window.
    ///
    /// Idempotent; a missing window or presenter leaves painting
    /// detached until the dependency appears.
    pub fn attach_presenter_painting(&mut self) {
        let presenter = self.graphics_presenter();
        if self.window.is_some() && presenter.is_some() {
            self.reconcile_from_store();
        }
        let window = self.window.clone();
        self.binding
            .setup(window.as_ref(), presenter, &mut self.overlay, &mut self.profiler);
        self.update_title();
    }

    /// Detach presenter painting. Idempotent.
    pub fn detach_presenter_painting(&mut self) {
        self.binding.shutdown(&mut self.overlay, &mut self.profiler);
    }

    /// Callback from the config-reload subsystem, after an external
    /// reload has completed.
    pub fn on_config_reloaded(&mut self) {
        self.reconcile_from_store();
    }

    /// The host has finished initializing: unlock the full action table
    /// and honor the persisted fullscreen preference.
    pub fn on_emulator_initialized(&mut self) {
        self.emulator_initialized = true;
        if self.store.bool_value(keys::FULLSCREEN) {
            self.set_fullscreen(true);
        }
        self.update_title();
    }

    pub fn set_initializing_shader_storage(&mut self, initializing: bool) {
        if self.initializing_shader_storage == initializing {
            return;
        }
        self.initializing_shader_storage = initializing;
        self.update_title();
    }

    /// Recompose the window title from current inputs and push it.
    pub fn update_title(&mut self) {
        let backend_name = self
            .binding
            .presenter()
            .map(|presenter| presenter.borrow().backend_name().to_string())
            .or_else(|| {
                self.host
                    .graphics_system()
                    .map(|graphics| graphics.name().to_string())
            });
        let title = compose_title(&TitleInfo {
            base_title: &self.base_title,
            title_open: self.host.is_title_open(),
            title_id: self.host.title_id(),
            title_version: self.host.title_version(),
            title_name: self.host.title_name(),
            backend_name: backend_name.as_deref(),
            time_scalar: self.host.time_scalar(),
            initializing_shader_storage: self.initializing_shader_storage,
            any_patch_applied: self.host.any_patch_applied(),
        });
        if let Some(window) = &self.window {
            window.borrow_mut().set_title(&title);
        }
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        let Some(window) = &self.window else {
            return;
        };
        if window.borrow().is_fullscreen() == fullscreen {
            return;
        }
        window.borrow_mut().set_fullscreen(fullscreen);
    }

    pub fn toggle_fullscreen(&mut self) {
        let fullscreen = self
            .window
            .as_ref()
            .map(|window| window.borrow().is_fullscreen())
            .unwrap_or(false);
        self.set_fullscreen(!fullscreen);
    }

    /// Dispatch one action from the table.
    ///
    /// Until the host reports initialized, only window-chrome actions
    /// dispatch; everything else is a no-op.
    pub fn invoke_action(&mut self, id: ActionId, event_loop: Option<&ActiveEventLoop>) {
        if !actions::is_enabled(id, self.emulator_initialized) {
            return;
        }
        match id {
            ActionId::OpenContent => {
                tracing::info!(
                    "select content by dropping a file onto the window \
                     or passing a path on the command line"
                );
            }
            ActionId::CloseContent => {
                if self.host.is_title_open() {
                    self.host.terminate_title();
                    self.update_title();
                }
            }
            ActionId::ShowContentDirectory => self.show_content_directory(),
            ActionId::Exit => {
                if let Some(event_loop) = event_loop {
                    event_loop.exit();
                }
            }
            ActionId::TimeScalarReset => {
                self.host.set_time_scalar(1.0);
                self.update_title();
            }
            ActionId::TimeScalarHalf => {
                let scalar = self.host.time_scalar();
                self.host.set_time_scalar(scalar / 2.0);
                self.update_title();
            }
            ActionId::TimeScalarDouble => {
                let scalar = self.host.time_scalar();
                self.host.set_time_scalar(scalar * 2.0);
                self.update_title();
            }
            ActionId::ToggleProfilerDisplay => self.profiler.toggle_display(),
            ActionId::ToggleProfilerPause => self.profiler.toggle_pause(),
            ActionId::GpuTraceFrame => {
                if let Some(pipeline) = self.command_pipeline() {
                    pipeline.borrow_mut().request_frame_trace();
                }
            }
            ActionId::GpuClearCaches => {
                if let Some(pipeline) = self.command_pipeline() {
                    pipeline.borrow_mut().clear_caches();
                }
            }
            ActionId::TogglePostprocessPanel => self.settings_panel.toggle(),
            ActionId::ToggleFullscreen => self.toggle_fullscreen(),
        }
    }

    fn show_content_directory(&self) {
        let content_root = PathBuf::from("content");
        let target = if self.host.is_title_open() {
            content_root.join(format!("{:08X}", self.host.title_id()))
        } else {
            content_root
        };
        if let Err(err) = std::fs::create_dir_all(&target) {
            tracing::warn!("could not create content directory: {}", err);
            return;
        }
        tracing::info!("content directory: {}", target.display());
    }

    fn on_key_down(&mut self, code: KeyCode, ctrl: bool, event_loop: &ActiveEventLoop) {
        if code == KeyCode::Escape {
            // Escape leaves fullscreen but never enters it.
            let fullscreen = self
                .window
                .as_ref()
                .map(|window| window.borrow().is_fullscreen())
                .unwrap_or(false);
            if fullscreen {
                self.set_fullscreen(false);
            }
            return;
        }
        if let Some(id) = actions::action_for_chord(code, ctrl) {
            self.invoke_action(id, Some(event_loop));
        }
    }

    /// Launch dropped or queued content.
    pub fn file_drop(&mut self, path: PathBuf) {
        if !self.emulator_initialized {
            return;
        }
        match self.host.launch(&path) {
            Ok(()) => {
                self.recent.add(&path);
                // The title's config overlay has been applied by the
                // reload subsystem at this point.
                if let Err(err) = self.store.reload() {
                    tracing::debug!("config reload skipped: {}", err);
                }
                self.on_config_reloaded();
                self.update_title();
            }
            Err(err) => tracing::error!("failed to launch content: {}", err),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window_rc) = self.window.clone() else {
            return;
        };
        let native = window_rc.borrow().native().cloned();
        let Some(native) = native else {
            return;
        };

        let has_graphics = self.host.graphics_system().is_some();
        let current_config = self
            .graphics_presenter()
            .map(|presenter| presenter.borrow().display_config());
        let current_antialias = self
            .command_pipeline()
            .map(|pipeline| pipeline.borrow().desired_antialias_effect());
        let initialized = self.emulator_initialized;

        let mut clicked = Vec::new();
        let mut recent_clicked = None;
        let mut edit = None;
        let frame = {
            let overlay = &mut self.overlay;
            let panel = &mut self.settings_panel;
            let profiler = &self.profiler;
            let recent = &self.recent;
            overlay.run(&native, |ctx| {
                (clicked, recent_clicked) = menu_bar_ui(ctx, initialized, recent);
                if has_graphics {
                    edit = panel.show(ctx, current_config, current_antialias);
                }
                profiler.show(ctx);
            })
        };

        if let Some(edit) = edit {
            self.apply_edit(edit);
        }
        for id in clicked {
            self.invoke_action(id, Some(event_loop));
        }
        if let Some(path) = recent_clicked {
            self.file_drop(path);
        }

        if let Some((presenter, renderer)) = self.binding.painting_mut() {
            presenter.borrow_mut().paint(renderer, frame);
        }
        self.profiler.record_frame();

        native.request_redraw();
    }
}

/// Render the menu bar from the action table. Returns the clicked
/// actions and a recent-content selection, if any.
fn menu_bar_ui(
    ctx: &egui::Context,
    emulator_initialized: bool,
    recent: &RecentContentList,
) -> (Vec<ActionId>, Option<PathBuf>) {
    let mut clicked = Vec::new();
    let mut recent_clicked = None;
    egui::TopBottomPanel::top("shell_menu_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            for group in actions::MENU_GROUPS {
                ui.menu_button(group.label(), |ui| {
                    for action in actions::ACTIONS.iter().filter(|action| action.menu == *group) {
                        let enabled = actions::is_enabled(action.id, emulator_initialized);
                        let mut button = egui::Button::new(action.label);
                        if let Some(accelerator) = action.accelerator {
                            button = button.shortcut_text(accelerator);
                        }
                        if ui.add_enabled(enabled, button).clicked() {
                            clicked.push(action.id);
                        }
                        if action.id == ActionId::OpenContent {
                            ui.menu_button("Open Recent", |ui| {
                                if recent.is_empty() {
                                    ui.add_enabled(false, egui::Button::new("(empty)"));
                                }
                                for entry in recent.entries() {
                                    let button = egui::Button::new(&entry.display_name);
                                    if ui.add_enabled(emulator_initialized, button).clicked() {
                                        recent_clicked = Some(entry.path.clone());
                                    }
                                }
                            });
                        }
                        if action.separator_after {
                            ui.separator();
                        }
                    }
                });
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if emulator_initialized {
                    ui.colored_label(egui::Color32::GREEN, "\u{25CF} Ready");
                } else {
                    ui.colored_label(egui::Color32::GRAY, "\u{25CB} Initializing");
                }
            });
        });
    });
    (clicked, recent_clicked)
}

impl ApplicationHandler for ShellWindow {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.base_title.clone())
            .with_inner_size(LogicalSize::new(1280.0, 720.0));
        let native = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                tracing::error!("failed to open the platform window: {}", err);
                self.fatal = Some(ShellError::WindowOpen(err));
                event_loop.exit();
                return;
            }
        };

        self.overlay.init_window(&native);
        self.window = Some(Rc::new(RefCell::new(PlatformWindow::new(native))));

        if self.host.graphics_system().is_none() {
            self.host.init_graphics();
        }
        self.attach_presenter_painting();
        self.on_emulator_initialized();

        if let Some(path) = self.pending_launch.take() {
            self.file_drop(path);
        }
        self.update_title();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = {
            let native = self
                .window
                .as_ref()
                .and_then(|window| window.borrow().native().cloned());
            match native {
                Some(native) => self.overlay.on_window_event(&native, &event),
                None => false,
            }
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(presenter) = self.binding.presenter() {
                    presenter
                        .borrow_mut()
                        .resize_surface(size.width, size.height);
                }
            }
            WindowEvent::DroppedFile(path) => self.file_drop(path),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.ctrl_down = modifiers.state().control_key();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        ..
                    },
                ..
            } => {
                if consumed {
                    return;
                }
                if let (ElementState::Pressed, PhysicalKey::Code(code)) = (state, physical_key) {
                    self.on_key_down(code, self.ctrl_down, event_loop);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.borrow().request_redraw();
        }
    }
}

/// Create and run the shell window.
///
/// The only non-recoverable condition is failing to open the platform
/// window at startup; it is surfaced here. The store is saved on exit.
pub fn run_shell(
    store: ConfigStore,
    host: EmulatorHost,
    launch_path: Option<PathBuf>,
) -> Result<(), ShellError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut shell = ShellWindow::new(store, host);
    shell.set_recent_content(RecentContentList::load_or_default());
    shell.set_pending_launch(launch_path);

    event_loop.run_app(&mut shell)?;

    shell.detach_presenter_painting();
    if let Some(err) = shell.fatal.take() {
        return Err(err);
    }
    if let Err(err) = shell.store.save() {
        tracing::warn!("failed to save configuration: {}", err);
    }
    if let Err(err) = shell.recent.save() {
        tracing::warn!("failed to save recent content list: {}", err);
    }
    Ok(())
}
