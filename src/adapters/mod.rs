// Adapters
// ベンダー別SQL方言、ベンダーレジストリ、データベース接続を提供

pub mod database;
pub mod dialect;
pub mod registry;
