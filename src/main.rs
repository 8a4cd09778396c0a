use std::time::Duration;

use clap::Parser;
use env_logger::{Builder, Env};
use log::{error, info, warn};
use tokio_util::sync::CancellationToken;

use m3u_curator::m3u_curator_error::M3uCuratorError;
use m3u_curator::model::{Config, PluginStage};
use m3u_curator::processing::plugin::{PluginContext, PluginRegistry};
use m3u_curator::processing::processor::playlist::process_playlist;
use m3u_curator::repository::cache_repository::FileCache;
use m3u_curator::repository::m3u_repository::write_m3u_playlist;
use m3u_curator::utils::file_utils;
use m3u_curator::utils::network::{create_client, set_sanitize_sensitive_info, HttpStreamValidator};
use m3u_curator::utils::read_config;

const SOURCE_CONNECT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser)]
#[command(name = "m3u-curator")]
#[command(version)]
#[command(about = "Curated IPTV playlists with stream validation and fallback channels", long_about = None)]
struct Args {
    /// The config file
    #[arg(short, long)]
    config: Option<String>,

    /// Playlist source, overrides config source
    #[arg(short, long)]
    input: Option<String>,

    /// Output file, overrides config output
    #[arg(short, long)]
    output: Option<String>,

    /// Log level, env_logger filter syntax like `debug` or `m3u_curator=trace`
    #[arg(short = 'l', long = "log-level")]
    log_level: Option<String>,

    /// Always download remote sources
    #[arg(long, default_value_t = false)]
    no_cache: bool,
}

fn main() {
    let args = Args::parse();

    let config_file = args.config.clone().unwrap_or_else(file_utils::get_default_config_file_path);
    let mut cfg = match read_config(&config_file) {
        Ok(cfg) => cfg,
        Err(err) => {
            init_logger(args.log_level.as_deref(), None);
            exit_with(&err);
        }
    };
    init_logger(args.log_level.as_deref(), cfg.log_level());
    set_sanitize_sensitive_info(cfg.sanitize_sensitive_info());

    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    if let Some(build_time) = option_env!("VERGEN_BUILD_TIMESTAMP") {
        info!("Build time: {build_time}");
    }
    info!("Config file: {config_file}");

    if let Some(input) = args.input {
        cfg.source = input;
    }
    if let Some(output) = args.output {
        cfg.output = output;
    }
    if args.no_cache {
        cfg.cache.enabled = false;
    }
    if let Err(err) = cfg.prepare() {
        exit_with(&err);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => exit_with(&M3uCuratorError::from(err)),
    };
    if let Err(err) = runtime.block_on(run(&cfg)) {
        exit_with(&err);
    }
}

fn init_logger(cli_level: Option<&str>, config_level: Option<&str>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(level) = cli_level.or(config_level) {
        builder.parse_filters(level);
    }
    let _ = builder.try_init();
}

fn exit_with(err: &M3uCuratorError) -> ! {
    error!("{}", err.message);
    std::process::exit(1);
}

/// Returns the shutdown token, cancelled on Ctrl-C, and its child token for stream checks,
/// additionally cancelled when the optional deadline elapses.
fn watch_cancellation(deadline_secs: Option<u64>) -> (CancellationToken, CancellationToken) {
    let shutdown = CancellationToken::new();
    let validation = shutdown.child_token();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling downloads and outstanding stream checks");
            on_signal.cancel();
        }
    });
    if let Some(secs) = deadline_secs {
        let on_deadline = validation.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = on_deadline.cancelled() => {}
                () = tokio::time::sleep(Duration::from_secs(secs)) => {
                    warn!("validation deadline of {secs}s reached, cancelling outstanding stream checks");
                    on_deadline.cancel();
                }
            }
        });
    }
    (shutdown, validation)
}

async fn run(cfg: &Config) -> Result<(), M3uCuratorError> {
    let registry = PluginRegistry::from_config(&cfg.plugins)?;
    let mut ctx = PluginContext::new(cfg);
    registry.notify(PluginStage::ApplicationStart, &mut ctx);

    let client = create_client(Duration::from_secs(SOURCE_CONNECT_TIMEOUT_SECS))?;
    let cache = cfg.cache.enabled.then(|| FileCache::new(&cfg.t_cache_dir));
    if let Some(cache) = &cache {
        info!("Cache dir: {}, lifespan {}h", cache.root().display(), cfg.cache.lifespan);
    }
    let (shutdown, validation_cancel) = watch_cancellation(cfg.validation.deadline_secs);
    let validator = HttpStreamValidator::new(client.clone(), &cfg.validation, validation_cancel.clone());
    if cfg.validation.is_enabled() {
        info!("Validating streams with {} parallel checks, this might disconnect active streams", cfg.validation.concurrency);
    }

    registry.notify(PluginStage::ChannelsBefore, &mut ctx);
    ctx.result = process_playlist(&client, cfg, cache.as_ref(), &validator, &shutdown).await?;
    validation_cancel.cancel();
    registry.notify(PluginStage::ChannelsAfter, &mut ctx);

    for id in &ctx.result.missing {
        warn!("missing channel: {id}");
    }
    if ctx.result.is_empty() {
        info!("no channels found, nothing written");
    } else {
        write_m3u_playlist(&cfg.t_output_path, &ctx.result.items, cfg.compress)?;
        info!("{} channels written to {}", ctx.result.items.len(), cfg.t_output_path.display());
    }

    registry.notify(PluginStage::ApplicationFinished, &mut ctx);
    Ok(())
}
