// Window title composition
//
// The title is a pure function of its inputs; the controller recomputes
// and pushes it whenever any contributing input changes.

use std::fmt::Write;

/// Inputs contributing to the window title.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleInfo<'a> {
    pub base_title: &'a str,
    pub title_open: bool,
    pub title_id: u32,
    pub title_version: &'a str,
    pub title_name: &'a str,
    pub backend_name: Option<&'a str>,
    pub time_scalar: f64,
    pub initializing_shader_storage: bool,
    pub any_patch_applied: bool,
}

/// Compose the window title string.
///
/// Decorations append independently; with no title open and every other
/// input at rest, the result is exactly the base title.
pub fn compose_title(info: &TitleInfo) -> String {
    let mut title = String::from(info.base_title);

    if info.title_open {
        let _ = write!(title, " | [{:08X}", info.title_id);
        if !info.title_version.is_empty() {
            title.push_str(" v");
            title.push_str(info.title_version);
        }
        title.push(']');

        if !info.title_name.is_empty() {
            title.push(' ');
            title.push_str(info.title_name);
        }
    }

    if let Some(backend) = info.backend_name {
        if !backend.is_empty() {
            title.push_str(" <");
            title.push_str(backend);
            title.push('>');
        }
    }

    if info.time_scalar != 1.0 {
        let _ = write!(title, " (@{:.2}x)", info.time_scalar);
    }

    if info.initializing_shader_storage {
        title.push_str(" (Preloading shaders\u{2026})");
    }

    if info.any_patch_applied {
        title.push_str(" [Patches Applied]");
    }

    title
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_info() -> TitleInfo<'static> {
        TitleInfo {
            base_title: "emu-shell",
            title_open: false,
            title_id: 0,
            title_version: "",
            title_name: "",
            backend_name: None,
            time_scalar: 1.0,
            initializing_shader_storage: false,
            any_patch_applied: false,
        }
    }

    #[test]
    fn test_no_title_yields_base_only() {
        assert_eq!(compose_title(&base_info()), "emu-shell");
    }

    #[test]
    fn test_title_with_id_version_name() {
        let info = TitleInfo {
            title_open: true,
            title_id: 0x415607E6,
            title_version: "1.1",
            title_name: "Halo 3",
            ..base_info()
        };
        assert_eq!(compose_title(&info), "emu-shell | [415607E6 v1.1] Halo 3");
    }

    #[test]
    fn test_title_without_version_or_name() {
        let info = TitleInfo {
            title_open: true,
            title_id: 0xDEAD,
            ..base_info()
        };
        assert_eq!(compose_title(&info), "emu-shell | [0000DEAD]");
    }

    #[test]
    fn test_backend_decoration() {
        let info = TitleInfo {
            backend_name: Some("vulkan"),
            ..base_info()
        };
        assert_eq!(compose_title(&info), "emu-shell <vulkan>");
    }

    #[test]
    fn test_time_scalar_decoration() {
        let info = TitleInfo {
            time_scalar: 0.5,
            ..base_info()
        };
        assert_eq!(compose_title(&info), "emu-shell (@0.50x)");

        let info = TitleInfo {
            time_scalar: 1.0,
            ..base_info()
        };
        assert_eq!(compose_title(&info), "emu-shell");
    }

    #[test]
    fn test_flags_append() {
        let info = TitleInfo {
            initializing_shader_storage: true,
            any_patch_applied: true,
            ..base_info()
        };
        assert_eq!(
            compose_title(&info),
            "emu-shell (Preloading shaders\u{2026}) [Patches Applied]"
        );
    }

    #[test]
    fn test_all_decorations_in_order() {
        let info = TitleInfo {
            title_open: true,
            title_id: 1,
            title_version: "2",
            title_name: "Game",
            backend_name: Some("wgpu"),
            time_scalar: 2.0,
            initializing_shader_storage: true,
            any_patch_applied: true,
            ..base_info()
        };
        assert_eq!(
            compose_title(&info),
            "emu-shell | [00000001 v2] Game <wgpu> (@2.00x) (Preloading shaders\u{2026}) [Patches Applied]"
        );
    }
}
