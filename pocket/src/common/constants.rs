// doc constants
pub const DOC_ID: &str = "_id";

// substrate key prefixes
pub const DEFAULT_PREFIX: &str = "db.";
pub const SECURE_PREFIX: &str = "db.secure.";

// query operator symbols
pub const OP_EQ: &str = "$eq";
pub const OP_NE: &str = "$ne";
pub const OP_OR: &str = "$or";
pub const OP_GT: &str = "$gt";
pub const OP_GTE: &str = "$gte";
pub const OP_LT: &str = "$lt";
pub const OP_LTE: &str = "$lte";

// secure payload layout
pub const SECURE_MAGIC: &[u8; 3] = b"PKT";
pub const SECURE_FORMAT_VERSION: u8 = 1;
pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

pub const POCKET_VERSION: &str = env!("CARGO_PKG_VERSION");
