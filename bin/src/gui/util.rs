use std::path::Path;

use relm4::{Component, ComponentSender};
use session::selection::NOT_SELECTED;

/// Sends `output` from the component, logging a warning if nothing receives it.
pub fn send_output_or_log<C: Component>(
    output: C::Output,
    description: &str,
    sender: &ComponentSender<C>,
) {
    if sender.output(output).is_err() {
        log::warn!("Failed to send {} output message.", description);
    }
}

/// Returns the path of the named file in the user configuration directory, in the `'static` form
/// that [relm4_components::open_button::OpenButtonSettings] wants for its recent files list.
///
/// The string is leaked, so call this once per component rather than per update.
pub fn xdg_cfg_static_str(xdg_dirs: &xdg::BaseDirectories, name: &str) -> Option<&'static str> {
    let path = match xdg_dirs.place_config_file(name) {
        Ok(path) => path,
        Err(err) => {
            log::warn!("Not remembering recent files in {:?}: {}", name, err);
            return None;
        }
    };
    match path.into_os_string().into_string() {
        Ok(path) => Some(Box::leak(path.into_boxed_str())),
        Err(path) => {
            log::warn!("Not remembering recent files in non-UTF-8 path {:?}.", path);
            None
        }
    }
}

/// Full path for display, or a placeholder when nothing is selected.
pub fn format_opt_path(path: Option<&Path>) -> String {
    match path {
        None => NOT_SELECTED.to_string(),
        Some(path) => path.display().to_string(),
    }
}
