use clap::Parser;
use racecard_relay::domain::ports::{ConfigProvider, Dataset, KeyValueStore};
use racecard_relay::utils::{logger, validation::Validate};
use racecard_relay::{
    CliArgs, InputDocument, LocalDataset, LocalKeyValueStore, PlatformClient, RelayConfig,
    RelayEngine, RelayError, RelayPipeline, RunInput, StorageKind,
};

fn fail(e: &RelayError) -> ! {
    tracing::error!(
        "❌ Relay failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

async fn run_with<D, K, C>(
    dataset: D,
    store: K,
    config: C,
    input: RunInput,
    monitor_enabled: bool,
) -> racecard_relay::Result<()>
where
    D: Dataset,
    K: KeyValueStore,
    C: ConfigProvider,
{
    let pipeline = RelayPipeline::new(dataset, store, config, input);
    let engine = RelayEngine::new_with_monitoring(pipeline, monitor_enabled);

    let summary = engine.run().await?;
    tracing::info!(
        "✅ Published {} records, batch key {}",
        summary.records_published,
        summary.batch_key
    );
    println!(
        "✅ Published {} records (batch: {})",
        summary.records_published, summary.batch_key
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting racecard-relay");
    tracing::debug!("CLI args: {:?}", args);

    let mut config = match RelayConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    if let Some(dir) = &args.storage_dir {
        config.storage.local_dir = dir.clone();
    }
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let document = match InputDocument::from_file(&args.input) {
        Ok(document) => document,
        Err(e) => fail(&e),
    };
    let input = RunInput::resolve(&args.overrides(), &document);
    if let Err(e) = input.validate() {
        fail(&e);
    }
    tracing::info!("Running {} with date: {}", input.script_file(), input.date);

    let monitor_enabled = args.monitor || config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = config.storage.clone();
    let result = match storage.kind {
        StorageKind::Local => {
            let dataset = LocalDataset::open(&storage.local_dir, &storage.dataset_id);
            let store = LocalKeyValueStore::open(&storage.local_dir, &storage.key_value_store_id);
            match (dataset, store) {
                (Ok(dataset), Ok(store)) => {
                    tracing::info!("📁 Storing results under {}", storage.local_dir.display());
                    run_with(dataset, store, config, input, monitor_enabled).await
                }
                (Err(e), _) | (_, Err(e)) => Err(e),
            }
        }
        StorageKind::Platform => {
            // validate() 已確認 base_url 與 token 存在
            let base_url = storage.base_url.unwrap_or_default();
            let token = storage.token.unwrap_or_default();
            let timeout = config.storage_timeout();
            match PlatformClient::new(&base_url, token) {
                Ok(client) => {
                    let client = client.with_timeout(timeout);
                    let dataset = client.dataset(storage.dataset_id);
                    let store = client.key_value_store(storage.key_value_store_id);
                    run_with(dataset, store, config, input, monitor_enabled).await
                }
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        fail(&e);
    }
}
