pub mod cipher;
pub mod crypto_sync;
