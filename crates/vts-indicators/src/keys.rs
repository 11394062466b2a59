//! Well-known indicator keys shared by entry screens, validation, and aggregation.

/// Replicated plot yields, in plot order.
pub const PLOT_YIELD_KEYS: [&str; 4] = ["yield_plot1", "yield_plot2", "yield_plot3", "yield_plot4"];

pub const YIELD_AVG: &str = "yield_avg";
pub const YIELD_STDDEV: &str = "yield_stddev";
pub const YIELD_CV: &str = "yield_cv";
pub const OVER_STD_ABS: &str = "over_std_abs";
pub const OVER_STD_PCT: &str = "over_std_pct";
pub const LSD: &str = "lsd";

pub const THOUSAND_GRAIN_WEIGHT: &str = "thousand_grain_weight";
pub const GRAIN_NATURE: &str = "grain_nature";

pub const VEGETATION_PERIOD: &str = "vegetation_period";
pub const PLANT_HEIGHT: &str = "plant_height";
pub const PREHARVEST_MOISTURE: &str = "preharvest_moisture";

pub const LODGING_RESISTANCE: &str = "lodging_resistance";
pub const SHATTERING_RESISTANCE: &str = "shattering_resistance";
pub const DROUGHT_RESISTANCE: &str = "drought_resistance";

pub const PROTEIN_CONTENT: &str = "protein_content";
pub const RAW_GLUTEN: &str = "raw_gluten";
pub const GLASSINESS: &str = "glassiness";
pub const BREAD_VOLUME: &str = "bread_volume";
pub const BAKING_SCORE: &str = "baking_score";

pub const SMUT: &str = "smut";
pub const STEM_RUST: &str = "stem_rust";
pub const EAR_SEPTORIA: &str = "ear_septoria";

pub const FINAL_SCORE: &str = "final_score";
