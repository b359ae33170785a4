use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use exif_dates_core::{
    app_paths, build_report, default_decoder_chain, load_config, parse_zone, save_config,
    AppConfig, ExifReport, LocalZone,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "exif-dates-cli", version)]
#[command(about = "画像のEXIF日時を一覧表示します")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[command(flatten)]
    show: ShowArgs,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    Init,
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Path of image file
    #[arg(short, long)]
    filename: Option<PathBuf>,
    /// Output all EXIF fields as well as dates
    #[arg(short, long, default_value_t = false)]
    all: bool,
    /// IANA zone to display full date times in (not applied to date-only values)
    #[arg(short, long)]
    zone: Option<String>,
    /// IANA zone that naive EXIF times are interpreted in (defaults to the system zone)
    #[arg(long)]
    local_zone: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config(config)) => match config.action {
            ConfigAction::Show => cmd_config_show(),
            ConfigAction::Init => cmd_config_init(),
        },
        None => cmd_show(cli.show),
    }
}

fn cmd_show(args: ShowArgs) -> Result<()> {
    eprintln!("exif-dates v{}", env!("CARGO_PKG_VERSION"));

    let Some(filename) = args.filename else {
        anyhow::bail!("画像ファイルを --filename (-f) で指定してください。");
    };

    let zone = parse_zone(args.zone.as_deref())?;
    let mut config = load_config()?;
    if let Some(local_zone) = args.local_zone {
        config.local_zone = Some(local_zone);
    }
    let options = config.report_options(zone, args.all)?;
    let chain = default_decoder_chain(&config);
    let report = build_report(&chain, &filename, &options);

    if let Some(err) = &report.decode_error {
        eprintln!("Error: {}", err);
    }

    match args.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report.records)?);
        }
        OutputFormat::Table => {
            print_table(&report);
        }
    }

    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("設定ファイル: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    describe_local_zone(&config)?;
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let paths = app_paths()?;
    if paths.config_path.exists() {
        anyhow::bail!(
            "設定ファイルは既に存在します: {}",
            paths.config_path.display()
        );
    }
    let path = save_config(&AppConfig::default()).context("設定ファイルを作成できませんでした")?;
    println!("設定ファイルを作成しました: {}", path.display());
    Ok(())
}

fn describe_local_zone(config: &AppConfig) -> Result<()> {
    match config.resolve_local_zone()? {
        LocalZone::System => println!("ローカルタイムゾーン: system"),
        LocalZone::Named(zone) => println!("ローカルタイムゾーン: {}", zone.name()),
    }
    Ok(())
}

fn print_table(report: &ExifReport) {
    for record in &report.records {
        let zone = record
            .zone
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        println!("{} {} {}", record.key, record.value, zone);
    }
}
