// Command-line configuration.
use crate::controller::{DEFAULT_BRUSH_WIDTH, StrokeVariant};
use crate::types::Color;
use clap::Parser;
use std::path::PathBuf;

/// Paint on an avatar, swap outfits and save the result as a JPEG.
#[derive(Parser, Debug, Clone)]
#[command(name = "avatar-canvas", version)]
pub struct Config {
    /// Window width in pixels.
    #[arg(long, default_value_t = 800)]
    pub width: usize,

    /// Window height in pixels.
    #[arg(long, default_value_t = 700)]
    pub height: usize,

    /// Directory holding the outfit images.
    #[arg(long, value_name = "DIR", default_value = "assets")]
    pub assets: PathBuf,

    /// Where saved JPEGs go.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub export_dir: PathBuf,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Initial brush color (#rgb, #rrggbb or a basic name).
    #[arg(long, default_value = "#000000")]
    pub color: Color,

    /// Initial brush width (clamped to 1-30).
    #[arg(long, default_value_t = DEFAULT_BRUSH_WIDTH)]
    pub brush_width: f32,

    /// Stroke rendering variant.
    #[arg(long, value_enum, default_value_t = StrokeVariant::Direct)]
    pub variant: StrokeVariant,

    /// Where the upload dialog (U) opens: a folder plus preselected file name.
    #[arg(long, value_name = "FILE")]
    pub upload: Option<PathBuf>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Config::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let c = Config::try_parse_from(["avatar-canvas"]).unwrap();
        assert_eq!((c.width, c.height), (800, 700));
        assert_eq!(c.color, Color::BLACK);
        assert_eq!(c.brush_width, 5.0);
        assert_eq!(c.variant, StrokeVariant::Direct);
        assert_eq!(c.quality, 90);
        assert!(c.upload.is_none());
    }

    #[test]
    fn parses_overrides() {
        let c = Config::try_parse_from([
            "avatar-canvas", "--color", "#4A98F7", "--variant", "snapshot", "-vv", "--quality", "70",
        ])
        .unwrap();
        assert_eq!(c.color, Color::rgb(0x4A, 0x98, 0xF7));
        assert_eq!(c.variant, StrokeVariant::Snapshot);
        assert_eq!(c.verbose, 2);
        assert_eq!(c.quality, 70);
    }

    #[test]
    fn rejects_bad_color_and_quality() {
        assert!(Config::try_parse_from(["avatar-canvas", "--color", "nope"]).is_err());
        assert!(Config::try_parse_from(["avatar-canvas", "--quality", "0"]).is_err());
    }
}
