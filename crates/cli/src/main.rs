//! `printables-admin`: the storefront admin from the command line.

mod draft;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use printables_client::{AdminClient, AuthSession, ClientConfig, EditorState, ProductEditor};
use printables_core::data_url;
use printables_core::format::format_file_size;
use printables_core::listing::{DateRange, ProductFilters, ProductListState, SortDirection, SortField};
use printables_core::product::Product;
use printables_core::review::{ReviewQuery, ReviewSortField};
use printables_core::schema::validate_product;
use printables_core::types::Timestamp;
use printables_events::{NotificationBus, NotificationLog};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "printables-admin")]
#[command(about = "Manage printable products, reviews and orders")]
struct Cli {
    /// Backend base URL; overrides `PRINTABLES_API_URL`.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Print full JSON instead of one line per row.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Products {
        #[command(subcommand)]
        command: ProductCommand,
    },
    Reviews {
        #[command(subcommand)]
        command: ReviewCommand,
    },
    Orders {
        #[command(subcommand)]
        command: OrderCommand,
    },
    /// Show the signed-in user, or where to sign in.
    Whoami,
    /// Keep the session alive until interrupted.
    Session,
}

#[derive(Subcommand)]
enum ProductCommand {
    List {
        #[arg(long, default_value_t = 0)]
        page: u64,
        #[arg(long, default_value_t = 10)]
        page_size: u64,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long = "tag", action = ArgAction::Append)]
        tags: Vec<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        created_after: Option<Timestamp>,
        #[arg(long)]
        created_before: Option<Timestamp>,
        #[arg(long)]
        updated_after: Option<Timestamp>,
        #[arg(long)]
        updated_before: Option<Timestamp>,
        #[arg(long, value_enum, default_value_t = ProductSortCli::CreatedAt)]
        sort: ProductSortCli,
        #[arg(long, value_enum, default_value_t = DirectionCli::Desc)]
        order: DirectionCli,
    },
    Get {
        id: String,
    },
    /// Validate a draft file without sending it.
    Check {
        draft: PathBuf,
    },
    Create {
        draft: PathBuf,
    },
    /// Replace a product with the contents of a draft file.
    Update {
        draft: PathBuf,
    },
    /// Change top-level fields of a stored product.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long = "add-tag", action = ArgAction::Append)]
        add_tags: Vec<String>,
        #[arg(long = "remove-tag", action = ArgAction::Append)]
        remove_tags: Vec<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum ReviewCommand {
    List {
        product_id: String,
        #[arg(long)]
        cursor: Option<u64>,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long, value_enum)]
        sort: Option<ReviewSortCli>,
        #[arg(long, value_enum)]
        order: Option<DirectionCli>,
    },
    Stats {
        product_id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum OrderCommand {
    List,
    Get {
        id: String,
    },
    /// Delete one order, or several in a single request.
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProductSortCli {
    CreatedAt,
    Price,
    Title,
}

impl From<ProductSortCli> for SortField {
    fn from(value: ProductSortCli) -> Self {
        match value {
            ProductSortCli::CreatedAt => Self::CreatedAt,
            ProductSortCli::Price => Self::Price,
            ProductSortCli::Title => Self::Title,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReviewSortCli {
    CreatedAt,
    Rating,
    HelpfulCount,
}

impl From<ReviewSortCli> for ReviewSortField {
    fn from(value: ReviewSortCli) -> Self {
        match value {
            ReviewSortCli::CreatedAt => Self::CreatedAt,
            ReviewSortCli::Rating => Self::Rating,
            ReviewSortCli::HelpfulCount => Self::HelpfulCount,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionCli {
    Asc,
    Desc,
}

impl From<DirectionCli> for SortDirection {
    fn from(value: DirectionCli) -> Self {
        match value {
            DirectionCli::Asc => Self::Asc,
            DirectionCli::Desc => Self::Desc,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "printables_admin=info,printables_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // --- Configuration ---
    let config = ClientConfig::from_lookup(|key| match (key, &cli.api_url) {
        ("PRINTABLES_API_URL", Some(url)) => Some(url.clone()),
        _ => std::env::var(key).ok(),
    })?;
    tracing::debug!(api_url = %config.api_url, product_type = %config.product_type, "Loaded client configuration");

    // --- Notifications ---
    let bus = Arc::new(NotificationBus::default());
    let log_handle = tokio::spawn(NotificationLog::run(bus.subscribe()));

    let client = Arc::new(AdminClient::new(&config, Arc::clone(&bus))?);
    let output = Output { json: cli.json };

    let result = match cli.command {
        Commands::Products { command } => products(&client, command, output).await,
        Commands::Reviews { command } => reviews(&client, command, output).await,
        Commands::Orders { command } => orders(&client, command, output).await,
        Commands::Whoami => whoami(&client, &config, output).await,
        Commands::Session => session(&client, &config).await,
    };

    // Closing the bus lets the log drain and exit.
    drop(client);
    drop(bus);
    let _ = log_handle.await;

    result
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    /// Print `value` as JSON, or the given lines in plain mode.
    fn emit<T: Serialize>(&self, value: &T, lines: impl FnOnce() -> Vec<String>) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            for line in lines() {
                println!("{line}");
            }
        }
        Ok(())
    }
}

fn product_lines(product: &Product) -> Vec<String> {
    let mut lines = vec![format!(
        "{}  {}  active={}  tags={}",
        product.id,
        product.title,
        product.active,
        product.tags.iter().cloned().collect::<Vec<_>>().join(",")
    )];
    if let Some(url) = product.featured_image_url().filter(|u| !data_url::is_data_url(u)) {
        lines.push(format!("  featured: {url}"));
    }
    for variant in &product.variants {
        let price = variant
            .price
            .coerce()
            .map_or_else(|| "?".to_string(), |p| format!("{p:.2}"));
        let asset = variant.digital_asset.as_ref().map_or_else(
            || "no asset".to_string(),
            |a| format!("{} ({})", a.filename, format_file_size(a.size)),
        );
        lines.push(format!(
            "  [{}] {}  {}  {} photo(s)  {}",
            variant.sort_order,
            variant.title,
            price,
            variant.photos.len(),
            asset
        ));
    }
    lines
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

async fn products(client: &Arc<AdminClient>, command: ProductCommand, out: Output) -> anyhow::Result<()> {
    match command {
        ProductCommand::List {
            page,
            page_size,
            search,
            title,
            min_price,
            max_price,
            tags,
            active,
            created_after,
            created_before,
            updated_after,
            updated_before,
            sort,
            order,
        } => {
            let mut state = ProductListState::default();
            state.set_sorting(sort.into(), order.into());
            state.set_filters(ProductFilters {
                title,
                min_price,
                max_price,
                tags,
                created: DateRange {
                    after: created_after,
                    before: created_before,
                },
                updated: DateRange {
                    after: updated_after,
                    before: updated_before,
                },
                active,
            });
            if let Some(search) = search {
                state.set_search(search);
            }
            state.pagination.page_size = page_size;
            state.set_page(page);

            let list = client.list_products_for(&state).await?;
            let pages = state.pagination.page_count(list.total_count);
            out.emit(&list, || {
                let mut lines: Vec<String> = list
                    .products
                    .iter()
                    .map(|p| format!("{}  {}  {:.2}  active={}", p.id, p.title, p.price, p.active))
                    .collect();
                lines.push(format!(
                    "page {}/{} ({} products)",
                    state.pagination.page_index + 1,
                    pages,
                    list.total_count
                ));
                lines
            })
        }
        ProductCommand::Get { id } => {
            let product = client.get_product(&id).await?;
            out.emit(&product, || product_lines(&product))
        }
        ProductCommand::Check { draft } => {
            let product = draft::load(&draft)?;
            let result = validate_product(&product);
            for violation in &result.errors {
                println!("{}: {}", violation.field, violation.message);
            }
            if !result.is_valid() {
                bail!("{} has {} validation error(s)", draft.display(), result.errors.len());
            }
            out.emit(&product, || product_lines(&product))
        }
        ProductCommand::Create { draft } => {
            let product = load_valid(&draft)?;
            let id = client.create_product(&product).await?;
            println!("{id}");
            Ok(())
        }
        ProductCommand::Update { draft } => {
            let product = load_valid(&draft)?;
            if product.is_new() {
                bail!("{} has no stored product id; use `create`", draft.display());
            }
            client.update_product(&product).await?;
            println!("{}", product.id);
            Ok(())
        }
        ProductCommand::Edit {
            id,
            title,
            description,
            active,
            add_tags,
            remove_tags,
        } => {
            let mut editor = ProductEditor::open(Arc::clone(client), &id).await;
            if editor.state() == &EditorState::NotFound {
                bail!("Product {id} not found");
            }
            let form = editor
                .form_mut()
                .context("Product is not editable right now")?;
            if let Some(title) = title {
                form.set_title(title);
            }
            if let Some(description) = description {
                form.set_description(description);
            }
            if let Some(active) = active {
                form.set_active(active);
            }
            for tag in add_tags {
                form.add_tag(tag);
            }
            for tag in &remove_tags {
                form.remove_tag(tag);
            }
            for violation in &form.errors().errors {
                println!("{}: {}", violation.field, violation.message);
            }

            let saved = editor.submit().await?;
            println!("{saved}");
            Ok(())
        }
        ProductCommand::Delete { id } => {
            client.delete_product(&id).await?;
            Ok(())
        }
    }
}

fn load_valid(path: &std::path::Path) -> anyhow::Result<Product> {
    let product = draft::load(path)?;
    let result = validate_product(&product);
    if !result.is_valid() {
        for violation in &result.errors {
            eprintln!("{}: {}", violation.field, violation.message);
        }
        bail!("{} has {} validation error(s)", path.display(), result.errors.len());
    }
    Ok(product)
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

async fn reviews(client: &AdminClient, command: ReviewCommand, out: Output) -> anyhow::Result<()> {
    match command {
        ReviewCommand::List {
            product_id,
            cursor,
            limit,
            sort,
            order,
        } => {
            let query = ReviewQuery {
                cursor,
                limit,
                sort_by: sort.map(Into::into),
                sort_order: order.map(Into::into),
            };
            let list = client.list_reviews(&product_id, &query).await?;
            out.emit(&list, || {
                let mut lines: Vec<String> = list
                    .reviews
                    .iter()
                    .map(|r| {
                        format!(
                            "{}  {:.1}  {}  by {}  helpful={}{}",
                            r.id,
                            r.rating,
                            r.title,
                            r.author.name,
                            r.helpful_count,
                            if r.verified_purchase { "  verified" } else { "" }
                        )
                    })
                    .collect();
                lines.push(format!("{} review(s)", list.total_count));
                if let Some(next) = list.next_cursor {
                    lines.push(format!("next cursor: {next}"));
                }
                lines
            })
        }
        ReviewCommand::Stats { product_id } => {
            let stats = client.review_stats(&product_id).await?;
            out.emit(&stats, || {
                let mut lines = vec![format!(
                    "average {:.2} over {} review(s)",
                    stats.average_rating, stats.total_reviews
                )];
                lines.extend(
                    stats
                        .rating_distribution
                        .iter()
                        .rev()
                        .map(|(stars, count)| format!("  {stars}: {count}")),
                );
                lines
            })
        }
        ReviewCommand::Delete { id } => {
            client.delete_review(&id).await?;
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

async fn orders(client: &AdminClient, command: OrderCommand, out: Output) -> anyhow::Result<()> {
    match command {
        OrderCommand::List => {
            let orders = client.list_orders().await?;
            out.emit(&orders, || {
                orders
                    .iter()
                    .map(|o| {
                        format!(
                            "{}  {}  {}  {}  {}",
                            o.id,
                            o.reference,
                            o.customer.full_name(),
                            o.total,
                            o.current_status().map_or("-", |s| s.name.as_str())
                        )
                    })
                    .collect()
            })
        }
        OrderCommand::Get { id } => {
            let order = client.get_order(&id).await?;
            out.emit(&order, || {
                let mut lines = vec![format!(
                    "{}  {}  {}  total {}",
                    order.id,
                    order.reference,
                    order.customer.full_name(),
                    order.total
                )];
                lines.extend(
                    order
                        .products
                        .iter()
                        .map(|line| format!("  {} x{}  {}", line.title, line.quantity, line.price)),
                );
                lines
            })
        }
        OrderCommand::Delete { ids } => match ids.as_slice() {
            [id] => Ok(client.delete_order(id).await?),
            _ => Ok(client.delete_orders(&ids).await?),
        },
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

async fn whoami(client: &AdminClient, config: &ClientConfig, out: Output) -> anyhow::Result<()> {
    let session = AuthSession::new(client.api().clone(), config.token_refresh_interval())?;
    match session.attempt_auto_login().await {
        Some(user) => out.emit(&user, || {
            vec![format!(
                "{} <{}>{}",
                user.display_name,
                user.email,
                if user.is_admin() { "  admin" } else { "" }
            )]
        }),
        None => {
            println!("Not signed in. Sign in at {}", session.login_url());
            Ok(())
        }
    }
}

async fn session(client: &AdminClient, config: &ClientConfig) -> anyhow::Result<()> {
    let session = Arc::new(AuthSession::new(
        client.api().clone(),
        config.token_refresh_interval(),
    )?);
    if session.attempt_auto_login().await.is_none() {
        bail!("Not signed in. Sign in at {}", session.login_url());
    }

    let cancel = CancellationToken::new();
    let mut refresh = tokio::spawn({
        let session = Arc::clone(&session);
        let cancel = cancel.clone();
        async move { session.run_refresh_loop(cancel).await }
    });

    let interrupted = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            true
        }
        _ = &mut refresh => false,
    };
    if !interrupted {
        bail!("Session expired");
    }

    tracing::info!("Interrupted, signing out");
    cancel.cancel();
    let _ = refresh.await;
    session.sign_out().await?;
    Ok(())
}
