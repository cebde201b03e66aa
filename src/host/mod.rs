// Emulation host collaborators
//
// The shell binds to the host through these types: title lifecycle and
// guest clock on EmulatorHost, the presenter and the command pipeline on
// the graphics subsystem. The graphics subsystem (and its presenter) may
// be absent while the host is starting up or being reconfigured; the
// shell treats that as a normal transient condition.

use std::cell::RefCell;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::display::{AntialiasEffect, Presenter};

/// Errors that can occur when launching content.
#[derive(Debug)]
pub enum HostError {
    /// The content path does not point at a readable file
    ContentNotFound(PathBuf),

    /// I/O error while probing the content
    Io(io::Error),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::ContentNotFound(path) => {
                write!(f, "Content not found: {}", path.display())
            }
            HostError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for HostError {}

impl From<io::Error> for HostError {
    fn from(e: io::Error) -> Self {
        HostError::Io(e)
    }
}

/// Rendering command pipeline of the host GPU.
///
/// Owns the post-process anti-aliasing selection, which applies to the
/// image the guest produces (before output scaling), plus the debug
/// operations exposed through the shell menu.
pub struct CommandPipeline {
    desired_antialias: AntialiasEffect,
    frame_trace_pending: bool,
}

impl CommandPipeline {
    pub fn new() -> Self {
        Self {
            desired_antialias: AntialiasEffect::None,
            frame_trace_pending: false,
        }
    }

    pub fn desired_antialias_effect(&self) -> AntialiasEffect {
        self.desired_antialias
    }

    pub fn set_desired_antialias_effect(&mut self, effect: AntialiasEffect) {
        if self.desired_antialias != effect {
            tracing::debug!(?effect, "anti-aliasing effect updated");
        }
        self.desired_antialias = effect;
    }

    /// Request a single-frame trace; picked up by the render loop.
    pub fn request_frame_trace(&mut self) {
        self.frame_trace_pending = true;
        tracing::info!("frame trace requested");
    }

    /// Consume a pending frame-trace request.
    pub fn take_frame_trace_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_trace_pending)
    }

    /// Drop shader/texture caches built at runtime.
    pub fn clear_caches(&mut self) {
        tracing::info!("runtime caches cleared");
    }
}

impl Default for CommandPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// The host's graphics subsystem.
pub struct GraphicsSystem {
    name: String,
    presenter: Option<Rc<RefCell<Presenter>>>,
    command_pipeline: Option<Rc<RefCell<CommandPipeline>>>,
}

impl GraphicsSystem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            presenter: Some(Rc::new(RefCell::new(Presenter::new()))),
            command_pipeline: Some(Rc::new(RefCell::new(CommandPipeline::new()))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The presenter, absent while the output path is being rebuilt.
    pub fn presenter(&self) -> Option<Rc<RefCell<Presenter>>> {
        self.presenter.clone()
    }

    pub fn command_pipeline(&self) -> Option<Rc<RefCell<CommandPipeline>>> {
        self.command_pipeline.clone()
    }

    /// Replace the presenter, e.g. after a backend switch. The shell
    /// re-binds painting afterwards.
    pub fn replace_presenter(&mut self, presenter: Option<Rc<RefCell<Presenter>>>) {
        self.presenter = presenter;
    }
}

/// The emulation host as seen from the shell.
pub struct EmulatorHost {
    title_open: bool,
    title_id: u32,
    title_version: String,
    title_name: String,
    time_scalar: f64,
    any_patch_applied: bool,
    graphics: Option<GraphicsSystem>,
}

impl EmulatorHost {
    pub fn new() -> Self {
        Self {
            title_open: false,
            title_id: 0,
            title_version: String::new(),
            title_name: String::new(),
            time_scalar: 1.0,
            any_patch_applied: false,
            graphics: None,
        }
    }

    /// Bring up the graphics subsystem.
    pub fn init_graphics(&mut self) {
        self.graphics = Some(GraphicsSystem::new("wgpu"));
    }

    pub fn graphics_system(&self) -> Option<&GraphicsSystem> {
        self.graphics.as_ref()
    }

    pub fn graphics_system_mut(&mut self) -> Option<&mut GraphicsSystem> {
        self.graphics.as_mut()
    }

    /// Launch content from a path.
    pub fn launch(&mut self, path: &Path) -> Result<(), HostError> {
        if !path.is_file() {
            return Err(HostError::ContentNotFound(path.to_path_buf()));
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("Unknown")
            .to_string();
        self.title_id = title_id_for_name(&name);
        self.title_name = name;
        self.title_version = String::new();
        self.title_open = true;
        tracing::info!("title launched: [{:08X}] {}", self.title_id, self.title_name);
        Ok(())
    }

    /// Terminate the running title, if any.
    pub fn terminate_title(&mut self) {
        if self.title_open {
            tracing::info!("title terminated: {}", self.title_name);
        }
        self.title_open = false;
        self.title_id = 0;
        self.title_version.clear();
        self.title_name.clear();
    }

    pub fn is_title_open(&self) -> bool {
        self.title_open
    }

    pub fn title_id(&self) -> u32 {
        self.title_id
    }

    pub fn title_version(&self) -> &str {
        &self.title_version
    }

    pub fn title_name(&self) -> &str {
        &self.title_name
    }

    /// Guest clock scale. 1.0 is real time.
    pub fn time_scalar(&self) -> f64 {
        self.time_scalar
    }

    pub fn set_time_scalar(&mut self, scalar: f64) {
        self.time_scalar = scalar;
    }

    pub fn any_patch_applied(&self) -> bool {
        self.any_patch_applied
    }

    pub fn set_any_patch_applied(&mut self, applied: bool) {
        self.any_patch_applied = applied;
    }
}

impl Default for EmulatorHost {
    fn default() -> Self {
        Self::new()
    }
}

fn title_id_for_name(name: &str) -> u32 {
    // FNV-1a over the content name; stable across runs.
    let mut hash: u32 = 0x811c9dc5;
    for byte in name.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x01000193);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_starts_idle() {
        let host = EmulatorHost::new();
        assert!(!host.is_title_open());
        assert_eq!(host.time_scalar(), 1.0);
        assert!(host.graphics_system().is_none());
    }

    #[test]
    fn test_launch_missing_content_fails() {
        let mut host = EmulatorHost::new();
        let err = host.launch(Path::new("/nonexistent/content.bin"));
        assert!(matches!(err, Err(HostError::ContentNotFound(_))));
        assert!(!host.is_title_open());
    }

    #[test]
    fn test_launch_and_terminate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("halo.iso");
        std::fs::write(&path, b"content").unwrap();

        let mut host = EmulatorHost::new();
        host.launch(&path).unwrap();
        assert!(host.is_title_open());
        assert_eq!(host.title_name(), "halo");
        assert_ne!(host.title_id(), 0);

        host.terminate_title();
        assert!(!host.is_title_open());
        assert_eq!(host.title_id(), 0);
    }

    #[test]
    fn test_title_id_is_stable() {
        assert_eq!(title_id_for_name("halo"), title_id_for_name("halo"));
        assert_ne!(title_id_for_name("halo"), title_id_for_name("halo2"));
    }

    #[test]
    fn test_pipeline_frame_trace_request() {
        let mut pipeline = CommandPipeline::new();
        assert!(!pipeline.take_frame_trace_request());
        pipeline.request_frame_trace();
        assert!(pipeline.take_frame_trace_request());
        assert!(!pipeline.take_frame_trace_request());
    }
}
