// Core Domain
// スキーマモデル、型幅計算、依存関係解決の純粋なドメインロジック

pub mod config;
pub mod dependency;
pub mod error;
pub mod naming;
pub mod numeric_width;
pub mod schema;
pub mod vendor;
