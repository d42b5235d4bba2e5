// Services Layer
// スキーマの読み込み・検証とDDL生成を実行するサービス層

pub mod config_loader;
pub mod ddl_generator;
pub mod schema_checksum;
pub mod schema_loader;
pub mod schema_validator;
