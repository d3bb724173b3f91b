// Constants module for shared string constants

pub const CONFIG_FILE: &str = "mongoctl.config";
pub const DEFAULT_CONFIG_DIR: &str = ".mongoctl";
pub const CONFIG_DIR_ENV: &str = "MONGOFETCH_CONFIG_DIR";
pub const CUSTOM_REPOSITORIES_KEY: &str = "customBinaryRepositories";
pub const S3_REPOSITORY_TYPE: &str = "s3";
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Name of the always-present public CDN repository
pub const DEFAULT_REPOSITORY_NAME: &str = "default";

pub const COMMUNITY_DOMAIN: &str = "fastdl.mongodb.org";
pub const ENTERPRISE_DOMAIN: &str = "downloads.10gen.com";
pub const LEGACY_ENTERPRISE_DOMAIN: &str = "downloads.mongodb.com";

/// First release published under the `enterprise` archive naming.
/// Older enterprise builds use `subscription` on the legacy domain.
pub const ENTERPRISE_NAMING_CUTOFF: &str = "2.6.1";
