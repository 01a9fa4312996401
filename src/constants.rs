// General
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_RETRIES_PER_PROFILE: usize = 3;
pub const DEFAULT_POOL_SIZE: usize = 4;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

// Backoff
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 500;
pub const DEFAULT_BACKOFF_CAP_MS: u64 = 30_000;

// Azure OpenAI
pub const AZURE_OPENAI_API_VERSION: &str = "2024-02-15-preview";
