//! Command line parameters.

/// Benchmark parameters (from CLI or defaults).
#[derive(Debug, Clone)]
pub struct BenchParams {
    /// Map edge length in cells.
    pub size: u32,
    /// Patch edge length in cells.
    pub patch_size: u32,
    /// Number of frames to run.
    pub frames: u64,
    /// LOD view radius.
    pub view_radius: f32,
    /// World generation seed.
    pub seed: u64,
    /// Also tessellate the shadow pass each frame.
    pub shadow: bool,
}

impl Default for BenchParams {
    fn default() -> Self {
        Self {
            size: 1024,
            patch_size: 128,
            frames: 300,
            view_radius: 1000.0,
            seed: 42,
            shadow: false,
        }
    }
}

impl BenchParams {
    /// Parse parameters from command line arguments.
    pub fn from_args() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::parse(&args)
    }

    fn parse(args: &[String]) -> Self {
        let mut params = Self::default();

        let mut i = 0;
        while i < args.len() {
            let value = args.get(i + 1);
            let mut consumed = false;
            match args[i].as_str() {
                "--size" => {
                    if let Some(v) = value.and_then(|v| v.parse().ok()) {
                        params.size = v;
                        consumed = true;
                    }
                }
                "--patch-size" => {
                    if let Some(v) = value.and_then(|v| v.parse().ok()) {
                        params.patch_size = v;
                        consumed = true;
                    }
                }
                "--frames" => {
                    if let Some(v) = value.and_then(|v| v.parse().ok()) {
                        params.frames = v;
                        consumed = true;
                    }
                }
                "--view-radius" => {
                    if let Some(v) = value.and_then(|v| v.parse().ok()) {
                        params.view_radius = v;
                        consumed = true;
                    }
                }
                "--seed" => {
                    if let Some(v) = value.and_then(|v| v.parse().ok()) {
                        params.seed = v;
                        consumed = true;
                    }
                }
                "--shadow" => params.shadow = true,
                _ => {}
            }
            i += if consumed { 2 } else { 1 };
        }

        params
    }
}
