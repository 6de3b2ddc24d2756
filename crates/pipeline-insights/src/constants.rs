//! Centralized constants for the pipeline insights tool
//!
//! Deployment-specific settings (paths, port, origins) are loaded from config.toml.

// =============================================================================
// Server
// =============================================================================

/// Default bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listening port
pub const DEFAULT_PORT: u16 = 5000;

/// Route serving the full aggregated response
pub const API_DATA_PATH: &str = "/api/data";

/// Liveness route
pub const HEALTH_PATH: &str = "/health";

/// Body of every failed data request (no partial results are served)
pub const PROCESSING_ERROR_BODY: &str = "Error processing data";

// =============================================================================
// Export Files (one JSON array of records per dataset)
// =============================================================================

/// Default directory holding the exported record files
pub const DEFAULT_DATA_DIR: &str = "./data";

pub const CUSTOMER_TYPES_FILENAME: &str = "Customer type.json";

pub const INDUSTRIES_FILENAME: &str = "Account Industry.json";

pub const ACV_RANGES_FILENAME: &str = "ACV Range.json";

pub const TEAMS_FILENAME: &str = "Team.json";

// =============================================================================
// Output Files
// =============================================================================

/// Default config file path
pub const CONFIG_FILE: &str = "config.toml";

/// Suffix of per-dataset summary CSVs (`<dataset>_summary.csv`)
pub const SUMMARY_SUFFIX: &str = "_summary.csv";
