// Shell action table
//
// One flat table describes every menu entry and hotkey: identity, menu
// placement, label, accelerator text, key chord, and whether the action
// is window chrome (live before the host finishes initializing). The
// menu bar and the key dispatch both consume this table; neither builds
// its own list.

use winit::keyboard::KeyCode;

/// Identity of a shell action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionId {
    OpenContent,
    CloseContent,
    ShowContentDirectory,
    Exit,
    TimeScalarReset,
    TimeScalarHalf,
    TimeScalarDouble,
    ToggleProfilerDisplay,
    ToggleProfilerPause,
    GpuTraceFrame,
    GpuClearCaches,
    TogglePostprocessPanel,
    ToggleFullscreen,
}

/// Top-level menu a given action lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuGroup {
    File,
    Cpu,
    Gpu,
    Display,
}

impl MenuGroup {
    pub fn label(self) -> &'static str {
        match self {
            MenuGroup::File => "File",
            MenuGroup::Cpu => "CPU",
            MenuGroup::Gpu => "GPU",
            MenuGroup::Display => "Display",
        }
    }
}

/// Menu groups in display order.
pub const MENU_GROUPS: &[MenuGroup] = &[
    MenuGroup::File,
    MenuGroup::Cpu,
    MenuGroup::Gpu,
    MenuGroup::Display,
];

/// A physical key chord bound to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub code: KeyCode,
    pub ctrl: bool,
}

/// One entry of the action table.
pub struct ActionDesc {
    pub id: ActionId,
    pub menu: MenuGroup,
    pub label: &'static str,
    pub accelerator: Option<&'static str>,
    pub chord: Option<KeyChord>,
    /// Window-chrome actions stay live before host initialization.
    pub chrome: bool,
    pub separator_after: bool,
}

/// The complete action table, in menu order.
pub const ACTIONS: &[ActionDesc] = &[
    ActionDesc {
        id: ActionId::OpenContent,
        menu: MenuGroup::File,
        label: "Open...",
        accelerator: Some("Ctrl+O"),
        chord: Some(KeyChord {
            code: KeyCode::KeyO,
            ctrl: true,
        }),
        chrome: false,
        separator_after: false,
    },
    ActionDesc {
        id: ActionId::CloseContent,
        menu: MenuGroup::File,
        label: "Close",
        accelerator: None,
        chord: None,
        chrome: false,
        separator_after: true,
    },
    ActionDesc {
        id: ActionId::ShowContentDirectory,
        menu: MenuGroup::File,
        label: "Show content directory...",
        accelerator: None,
        chord: None,
        chrome: false,
        separator_after: true,
    },
    ActionDesc {
        id: ActionId::Exit,
        menu: MenuGroup::File,
        label: "Exit",
        accelerator: Some("Alt+F4"),
        chord: None,
        chrome: true,
        separator_after: false,
    },
    ActionDesc {
        id: ActionId::TimeScalarReset,
        menu: MenuGroup::Cpu,
        label: "Reset Time Scalar",
        accelerator: Some("Numpad *"),
        chord: Some(KeyChord {
            code: KeyCode::NumpadMultiply,
            ctrl: false,
        }),
        chrome: false,
        separator_after: false,
    },
    ActionDesc {
        id: ActionId::TimeScalarHalf,
        menu: MenuGroup::Cpu,
        label: "Time Scalar /= 2",
        accelerator: Some("Numpad -"),
        chord: Some(KeyChord {
            code: KeyCode::NumpadSubtract,
            ctrl: false,
        }),
        chrome: false,
        separator_after: false,
    },
    ActionDesc {
        id: ActionId::TimeScalarDouble,
        menu: MenuGroup::Cpu,
        label: "Time Scalar *= 2",
        accelerator: Some("Numpad +"),
        chord: Some(KeyChord {
            code: KeyCode::NumpadAdd,
            ctrl: false,
        }),
        chrome: false,
        separator_after: true,
    },
    ActionDesc {
        id: ActionId::ToggleProfilerDisplay,
        menu: MenuGroup::Cpu,
        label: "Toggle Profiler Display",
        accelerator: Some("F3"),
        chord: Some(KeyChord {
            code: KeyCode::F3,
            ctrl: false,
        }),
        chrome: false,
        separator_after: false,
    },
    ActionDesc {
        id: ActionId::ToggleProfilerPause,
        menu: MenuGroup::Cpu,
        label: "Pause/Resume Profiler",
        accelerator: Some("`"),
        chord: Some(KeyChord {
            code: KeyCode::Backquote,
            ctrl: false,
        }),
        chrome: false,
        separator_after: false,
    },
    ActionDesc {
        id: ActionId::GpuTraceFrame,
        menu: MenuGroup::Gpu,
        label: "Trace Frame",
        accelerator: Some("F4"),
        chord: Some(KeyChord {
            code: KeyCode::F4,
            ctrl: false,
        }),
        chrome: false,
        separator_after: true,
    },
    ActionDesc {
        id: ActionId::GpuClearCaches,
        menu: MenuGroup::Gpu,
        label: "Clear Runtime Caches",
        accelerator: Some("F5"),
        chord: Some(KeyChord {
            code: KeyCode::F5,
            ctrl: false,
        }),
        chrome: false,
        separator_after: false,
    },
    ActionDesc {
        id: ActionId::TogglePostprocessPanel,
        menu: MenuGroup::Display,
        label: "Post-processing settings",
        accelerator: Some("F6"),
        chord: Some(KeyChord {
            code: KeyCode::F6,
            ctrl: false,
        }),
        chrome: false,
        separator_after: true,
    },
    ActionDesc {
        id: ActionId::ToggleFullscreen,
        menu: MenuGroup::Display,
        label: "Fullscreen",
        accelerator: Some("F11"),
        chord: Some(KeyChord {
            code: KeyCode::F11,
            ctrl: false,
        }),
        chrome: true,
        separator_after: false,
    },
];

/// The table entry for an action.
pub fn descriptor(id: ActionId) -> &'static ActionDesc {
    ACTIONS
        .iter()
        .find(|action| action.id == id)
        .expect("every ActionId has a table entry")
}

/// Look up the action bound to a key chord, if any.
pub fn action_for_chord(code: KeyCode, ctrl: bool) -> Option<ActionId> {
    ACTIONS
        .iter()
        .find(|action| action.chord == Some(KeyChord { code, ctrl }))
        .map(|action| action.id)
}

/// Whether an action dispatches in the current initialization state.
pub fn is_enabled(id: ActionId, emulator_initialized: bool) -> bool {
    emulator_initialized || descriptor(id).chrome
}
