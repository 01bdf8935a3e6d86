use clap::Parser;
use std::path::PathBuf;
use track_surface_lib::{Config, DEFAULT_MATCH_RADIUS_M};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Track Surface - Report how much of a GPX track runs on paved, unpaved or unknown surfaces
pub struct Settings {
    /// GPX file with the recorded track
    #[clap(value_name = "GPX_FILE")]
    pub gpx_file: PathBuf,

    /// GeoJSON FeatureCollection with the reference road network
    /// (LineString features tagged with highway/surface/tracktype).
    /// Without it every segment is reported as unknown.
    #[clap(short, long, value_name = "FILE")]
    pub network: Option<PathBuf>,

    /// Maximum distance in meters from a segment midpoint to its matched road
    #[clap(short, long, default_value_t = DEFAULT_MATCH_RADIUS_M)]
    pub radius: f64,

    /// Match segments on a single thread
    #[clap(long, default_value = "false")]
    pub sequential: bool,

    /// Print the per-segment results and statistics as JSON instead of a summary
    #[clap(long, default_value = "false")]
    pub json: bool,

    /// Only print the region (south,west,north,east) a network extract must
    /// cover for this track, then exit
    #[clap(long, default_value = "false")]
    pub bounds: bool,

    /// Also list every segment in the text summary
    #[clap(long, default_value = "false")]
    pub segments: bool,

    /// Log debug output from the analysis (overridden by RUST_LOG)
    #[clap(short, long, default_value = "false")]
    pub verbose: bool,
}

impl Settings {
    /// Library configuration derived from the command line
    pub fn analysis_config(&self) -> Config {
        Config {
            match_radius_m: self.radius,
            parallel: !self.sequential,
        }
    }
}
