use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use planet_payment::application::payment_method::PaymentMethodConfigurationService;
use planet_payment::application::refund::RefundService;
use planet_payment::application::settings::SettingsService;
use planet_payment::application::transaction::{Checkout, TransactionService};
use planet_payment::domain::ports::{ConfigurationStoreBox, TransactionGatewayBox};
use planet_payment::infrastructure::in_memory::{
    InMemoryConfigurationStore, InMemoryGateway, SandboxState,
};
#[cfg(feature = "storage-rocksdb")]
use planet_payment::infrastructure::rocksdb::RocksDBStore;
use planet_payment::interfaces::csv::refundable_writer::RefundableWriter;
use planet_payment::interfaces::http::{self, state::AppState};
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file with a default section and sales channel overrides
    #[arg(long, global = true, default_value = "settings.json")]
    settings: PathBuf,

    /// Sandbox snapshot (JSON) loaded before and saved after the command
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the administrative HTTP API
    Serve {
        #[arg(long, env = "PORT", default_value_t = 3030)]
        port: u16,
    },
    /// Print the transaction update built for a checkout
    TransactionPayload {
        /// JSON file with `order`, `customer`, `context` and `pending`
        checkout: PathBuf,
    },
    /// Print the refundable line items of a transaction as CSV
    Refundable {
        transaction_id: u64,
        #[arg(long)]
        sales_channel: Option<String>,
    },
    /// Synchronise the payment method configurations of a space
    PaymentMethodConfiguration {
        #[arg(long)]
        sales_channel: Option<String>,
    },
}

enum Backend {
    Memory {
        gateway: InMemoryGateway,
        store: InMemoryConfigurationStore,
        snapshot: Option<PathBuf>,
    },
    #[cfg(feature = "storage-rocksdb")]
    RocksDb(RocksDBStore),
}

impl Backend {
    async fn open(db_path: Option<PathBuf>, snapshot: Option<PathBuf>) -> Result<Self> {
        let state = match &snapshot {
            Some(path) => SandboxState::load(path).into_diagnostic()?,
            None => SandboxState::default(),
        };

        #[cfg(feature = "storage-rocksdb")]
        if let Some(db_path) = db_path {
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            store.import(&state).into_diagnostic()?;
            return Ok(Backend::RocksDb(store));
        }

        #[cfg(not(feature = "storage-rocksdb"))]
        if db_path.is_some() {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
        }

        let (gateway, store) = state.into_stores().await;
        Ok(Backend::Memory {
            gateway,
            store,
            snapshot,
        })
    }

    fn gateway(&self) -> TransactionGatewayBox {
        match self {
            Backend::Memory { gateway, .. } => Box::new(gateway.clone()),
            #[cfg(feature = "storage-rocksdb")]
            Backend::RocksDb(store) => Box::new(store.clone()),
        }
    }

    fn configuration_store(&self) -> ConfigurationStoreBox {
        match self {
            Backend::Memory { store, .. } => Box::new(store.clone()),
            #[cfg(feature = "storage-rocksdb")]
            Backend::RocksDb(store) => Box::new(store.clone()),
        }
    }

    /// Writes the in-memory sandbox back to its snapshot file, if any.
    async fn persist(&self) -> Result<()> {
        if let Backend::Memory {
            gateway,
            store,
            snapshot: Some(path),
        } = self
        {
            SandboxState::capture(gateway, store)
                .await
                .save(path)
                .into_diagnostic()?;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let settings = SettingsService::load(&cli.settings).into_diagnostic()?;
    let backend = Backend::open(cli.db_path, cli.state).await?;

    match cli.command {
        Command::Serve { port } => {
            let refunds = RefundService::new(backend.gateway());
            let app = http::app(AppState::new(settings, refunds));

            let listener =
                tokio::net::TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))
                    .await
                    .into_diagnostic()?;
            tracing::info!("Serving on port {port}");
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await
                .into_diagnostic()?;
            backend.persist().await?;
        }
        Command::TransactionPayload { checkout } => {
            let content = std::fs::read_to_string(checkout).into_diagnostic()?;
            let checkout: Checkout = serde_json::from_str(&content).into_diagnostic()?;
            let configurations = PaymentMethodConfigurationService::new(
                backend.gateway(),
                backend.configuration_store(),
            );
            let payload = TransactionService::new(&settings, &configurations)
                .prepare(&checkout)
                .await
                .into_diagnostic()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).into_diagnostic()?
            );
        }
        Command::Refundable {
            transaction_id,
            sales_channel,
        } => {
            let space_id = settings
                .get_settings(sales_channel.as_deref())
                .into_diagnostic()?
                .space_id;
            let refunds = RefundService::new(backend.gateway());
            let transaction = refunds
                .read_transaction(space_id, transaction_id)
                .await
                .into_diagnostic()?;
            let items = refunds
                .refundable_line_items(space_id, &transaction)
                .await
                .into_diagnostic()?;

            let stdout = io::stdout();
            let mut writer = RefundableWriter::new(stdout.lock());
            writer.write_line_items(items).into_diagnostic()?;
        }
        Command::PaymentMethodConfiguration { sales_channel } => {
            let space_id = settings
                .get_settings(sales_channel.as_deref())
                .into_diagnostic()?
                .space_id;
            let report = PaymentMethodConfigurationService::new(
                backend.gateway(),
                backend.configuration_store(),
            )
            .synchronize(space_id)
            .await
            .into_diagnostic()?;
            println!(
                "Payment method configurations of space {space_id} synchronized: {} active, {} deactivated",
                report.activated, report.deactivated
            );
            backend.persist().await?;
        }
    }

    Ok(())
}
