use anyhow::{Context, Result};
use clap::Parser;
use colored::control as color_control;
use ddlforge::cli::commands::apply::{ApplyCommand, ApplyCommandHandler};
use ddlforge::cli::commands::detect::{DetectCommand, DetectCommandHandler};
use ddlforge::cli::commands::generate::{GenerateCommand, GenerateCommandHandler};
use ddlforge::cli::commands::order::{OrderCommand, OrderCommandHandler};
use ddlforge::cli::commands::validate::{ValidateCommand, ValidateCommandHandler};
use ddlforge::cli::{Cli, Commands};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    sqlx::any::install_default_drivers();

    // CLIをパースして実行
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // 非同期ランタイムを作成して実行
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime")
        .unwrap_or_else(|e| {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        });

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// トレーシングを初期化する
///
/// --verbose指定時はdebug、それ以外はRUST_LOG（未設定ならwarn）に従います。
/// ログはstdoutの出力を汚さないようstderrに書き出します。
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ddlforge=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<String> {
    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    // プロジェクトのルートパスを取得
    let project_path = env::current_dir()?;

    // --config フラグの処理（絶対パスに変換）
    let config_path: Option<PathBuf> = cli.config.map(|p| {
        if p.is_absolute() {
            p
        } else {
            project_path.join(p)
        }
    });

    match cli.command {
        Commands::Generate {
            vendor,
            schema,
            mode,
            if_not_exists,
            no_indexes,
            no_enum_checks,
            no_header,
            output,
        } => {
            let handler = GenerateCommandHandler::new();
            let command = GenerateCommand {
                project_path,
                config_path,
                vendor,
                schema,
                mode,
                if_not_exists,
                no_indexes,
                no_enum_checks,
                no_header,
                output,
                format: cli.format,
            };
            handler.execute(&command)
        }

        Commands::Order { schema, reverse } => {
            let handler = OrderCommandHandler::new();
            let command = OrderCommand {
                project_path,
                config_path,
                schema,
                reverse,
                format: cli.format,
            };
            handler.execute(&command)
        }

        Commands::Validate { vendor, schema } => {
            let handler = ValidateCommandHandler::new();
            let command = ValidateCommand {
                project_path,
                config_path,
                vendor,
                schema,
                format: cli.format,
            };
            handler.execute(&command)
        }

        Commands::Detect { env, url } => {
            let handler = DetectCommandHandler::new();
            let command = DetectCommand {
                project_path,
                config_path,
                env,
                url,
                format: cli.format,
            };
            handler.execute(&command).await
        }

        Commands::Apply {
            env,
            url,
            schema,
            mode,
            if_not_exists,
            dry_run,
            timeout,
        } => {
            let handler = ApplyCommandHandler::new();
            let command = ApplyCommand {
                project_path,
                config_path,
                env,
                url,
                schema,
                mode,
                if_not_exists,
                dry_run,
                timeout,
                format: cli.format,
            };
            handler.execute(&command).await
        }
    }
}
