//! Conversion settings, read from `settings.yaml` in the XDG configuration directory and
//! overridden by command line flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use convert::{ConvertOptions, Units};

pub const SETTINGS_FILE: &str = "settings.yaml";

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("curve_segments must be at least 1")]
    ZeroCurveSegments,
}

/// Command line overrides for [ConvertOptions].
#[derive(clap::Args, Debug, Default)]
pub struct SettingsArgs {
    /// Settings file to read instead of the one in the user configuration directory.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Units of the DXF drawings.
    #[arg(long)]
    units: Option<Units>,

    /// Number of line segments used to approximate each curve.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    curve_segments: Option<u32>,

    /// Put each page's line work on a layer named after the page.
    #[arg(long)]
    layer_per_page: bool,

    /// Fail rather than replace DXF files that already exist.
    #[arg(long)]
    no_overwrite: bool,
}

impl SettingsArgs {
    /// Loads the settings file, and applies any overrides.
    pub fn resolve(&self, xdg_dirs: &xdg::BaseDirectories) -> Result<ConvertOptions> {
        let mut options = match &self.settings {
            Some(path) => load_from(path)?,
            None => load(xdg_dirs)?,
        };
        self.apply(&mut options);
        log::debug!("Using conversion settings {:?}.", options);
        Ok(options)
    }

    fn apply(&self, options: &mut ConvertOptions) {
        if let Some(units) = self.units {
            options.units = units;
        }
        if let Some(curve_segments) = self.curve_segments {
            options.curve_segments = curve_segments;
        }
        if self.layer_per_page {
            options.layer_per_page = true;
        }
        if self.no_overwrite {
            options.overwrite_existing = false;
        }
    }
}

/// Loads settings from the user configuration directory, or the defaults if there are none.
pub fn load(xdg_dirs: &xdg::BaseDirectories) -> Result<ConvertOptions> {
    match xdg_dirs.find_config_file(SETTINGS_FILE) {
        Some(path) => load_from(&path),
        None => {
            log::debug!("No {} found, using default settings.", SETTINGS_FILE);
            Ok(ConvertOptions::default())
        }
    }
}

/// Loads settings from the YAML file at `path`. Keys missing from the file take default values.
pub fn load_from(path: &Path) -> Result<ConvertOptions> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading settings from {:?}", path))?;
    if text.trim().is_empty() {
        return Ok(ConvertOptions::default());
    }

    let options: ConvertOptions = serde_yaml_ng::from_str(&text)
        .with_context(|| format!("parsing settings from {:?}", path))?;
    if options.curve_segments == 0 {
        return Err(SettingsError::ZeroCurveSegments)
            .with_context(|| format!("validating settings from {:?}", path));
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use testutils::anyhow_downcasts_to;

    use super::*;

    fn write_settings(dir: &tempfile::TempDir, text: &str) -> PathBuf {
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, text).expect("write settings");
        path
    }

    #[gtest]
    fn reads_all_fields() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_settings(
            &dir,
            "units: inches\ncurve_segments: 4\nlayer_per_page: true\noverwrite_existing: false\n",
        );

        let options = load_from(&path)?;

        expect_that!(
            options,
            eq(&ConvertOptions {
                units: Units::Inches,
                curve_segments: 4,
                layer_per_page: true,
                overwrite_existing: false,
            })
        );
        Ok(())
    }

    #[gtest]
    fn missing_fields_take_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_settings(&dir, "units: points\n");

        let options = load_from(&path)?;

        expect_that!(
            options,
            eq(&ConvertOptions {
                units: Units::Points,
                ..ConvertOptions::default()
            })
        );
        Ok(())
    }

    #[gtest]
    fn empty_file_is_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_settings(&dir, "\n");

        expect_that!(load_from(&path)?, eq(&ConvertOptions::default()));
        Ok(())
    }

    #[gtest]
    fn zero_curve_segments_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_settings(&dir, "curve_segments: 0\n");

        let result = load_from(&path);

        expect_that!(
            result,
            err(anyhow_downcasts_to::<SettingsError, _>(eq(
                SettingsError::ZeroCurveSegments
            )))
        );
        Ok(())
    }

    #[gtest]
    fn unknown_keys_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_settings(&dir, "unit: inches\n");

        let result = load_from(&path);

        expect_that!(
            result.map_err(|err| format!("{:#}", err)),
            err(contains_substring("unknown field `unit`"))
        );
        Ok(())
    }

    #[gtest]
    fn flags_override_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_settings(&dir, "units: inches\ncurve_segments: 4\n");
        let args = SettingsArgs {
            settings: Some(path),
            units: Some(Units::Millimeters),
            curve_segments: None,
            layer_per_page: true,
            no_overwrite: true,
        };
        let xdg_dirs = xdg::BaseDirectories::with_prefix("pdf2dxf-settings-test");

        let options = args.resolve(&xdg_dirs)?;

        expect_that!(
            options,
            eq(&ConvertOptions {
                units: Units::Millimeters,
                curve_segments: 4,
                layer_per_page: true,
                overwrite_existing: false,
            })
        );
        Ok(())
    }
}
