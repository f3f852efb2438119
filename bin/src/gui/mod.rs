mod components;
mod convertpanel;
mod inputpdf;
pub mod main;
mod mainmenu;
mod mainwin;
mod outputselect;
mod util;
mod workers;
