pub const APP_NAME: &str = "pkgsync";

/// Manifest file name looked up in the working directory and the config directory.
pub const MANIFEST_FILENAME: &str = "pkgsync.yaml";

/// Default file name for stored inventory snapshots.
pub const SNAPSHOT_FILENAME: &str = "inventory.json";

/// Environment variable overriding the manifest path.
pub const CONFIG_ENV: &str = "PKGSYNC_CONFIG";

/// Environment variable selecting the manifest host.
pub const HOST_ENV: &str = "PKGSYNC_HOST";
