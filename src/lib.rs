// emu-shell library
// Frontend shell binding an emulation host's presenter to a window

// Public modules
pub mod config;
pub mod display;
pub mod host;
pub mod shell;

// Re-export main types for convenience
pub use config::{ConfigStore, SettingDefault, SettingDescriptor, SettingValue};
pub use display::{
    AntialiasEffect, DisplayConfig, GuestOutput, OverlayDrawer, OverlayRenderer, PlatformWindow,
    Presenter, ScalingEffect,
};
pub use host::{CommandPipeline, EmulatorHost, GraphicsSystem, HostError};
pub use shell::actions::{ActionDesc, ActionId, KeyChord, MenuGroup, ACTIONS};
pub use shell::binding::PresenterBinding;
pub use shell::profiler::FrameProfiler;
pub use shell::recent::{RecentContentEntry, RecentContentList};
pub use shell::settings_panel::{PanelEdit, SettingsPanel};
pub use shell::title::{compose_title, TitleInfo};
pub use shell::{run_shell, ShellError, ShellWindow, SHELL_SETTINGS};
