use std::{sync::Arc, thread};

use gtk::Application;
use gtk::prelude::*;
use relm4::RelmApp;
use session::worker::{Converter, JobRunner};

use crate::gui::{mainmenu, mainwin};

const APPLICATION_ID: &str = "io.github.pdf2dxf";

/// Runs the GUI until its window closes. Must be called from the main thread.
pub fn run(converter: &dyn Converter, gtk_options: &[String], xdg_dirs: xdg::BaseDirectories) {
    thread::scope(|s| {
        let runner = JobRunner::new(converter);
        let shutdown_channel = runner.work_channel();

        let init = mainwin::Init {
            xdg_dirs: Arc::new(xdg_dirs),
            work_channel: runner.work_channel(),
        };

        s.spawn(move || {
            run_gui(gtk_options, init);
            // Stop the runner even if relm4 still holds a channel.
            shutdown_channel.shutdown();
        });

        // Conversions run on the main thread, and the GUI never waits on them.
        runner.run();
    });
}

fn run_gui(gtk_options: &[String], init: mainwin::Init) {
    let program_invocation = std::env::args()
        .next()
        .unwrap_or_else(|| "pdf2dxf".to_string());
    let mut gtk_args = vec![program_invocation];
    gtk_args.extend(gtk_options.iter().cloned());

    let gtk_app = Application::builder()
        .application_id(APPLICATION_ID)
        .build();
    mainmenu::install_on_startup(&gtk_app);
    install_css_on_startup(&gtk_app);
    let app = RelmApp::from_app(gtk_app).with_args(gtk_args);
    app.run::<mainwin::MainWindow>(init);
}

/// Installs the GUI's CSS stylesheet on [Application] startup.
fn install_css_on_startup(app: &Application) {
    app.connect_startup(|_| {
        relm4::set_global_css(include_str!("styles.css"));
    });
}
