// ddlforgeライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメインロジック（スキーマモデル、型幅計算、依存関係解決）
// - adapters: ベンダー別の方言、レジストリ、データベース接続
// - services: スキーマの読み込み・検証とDDL生成

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
