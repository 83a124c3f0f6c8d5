pub mod membership;
pub mod resolve;
pub mod table_read;
pub mod table_write;
pub mod text;
