use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use hazellab_auth::{
    Capability, LoginForm, Role, UserFilter, UserForm, capability_matrix, explain_authorization,
};
use hazellab_client::{CartView, ClientError, ConfigArgs, Storefront};
use hazellab_core::{CartItemId, CategoryId, Page, ProductId, ReceiptId};
use hazellab_products::{ActiveFilter, AdminProductQuery, CatalogQuery, Product, StockFilter};
use hazellab_sales::{
    CartLine, PaymentMethod, Receipt, ReceiptFilter, ReceiptStatus, ShippingMethod,
    compute_totals_for_code, format_clp,
};
use hazellab_validation::{age, rut};

#[derive(Debug, Parser)]
#[command(name = "hazellab", version, about = "Hazel Lab storefront client")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Offline(OfflineCommand),
    #[command(flatten)]
    Online(OnlineCommand),
}

/// Commands that need neither a backend nor a session.
#[derive(Debug, Subcommand)]
enum OfflineCommand {
    /// Validate or format a RUT.
    Rut {
        #[command(subcommand)]
        action: RutAction,
    },
    /// Price a cart offline: `--line 1000:2 --line 2000:3 --shipping estandar`.
    Totals {
        #[arg(long = "line", value_parser = parse_line)]
        lines: Vec<CartLine>,
        /// Wire code (`retiro`, `estandar`, `express`); unknown codes ship free.
        #[arg(long, default_value = "retiro")]
        shipping: String,
    },
    /// Age for a birthdate (YYYY-MM-DD).
    Age {
        birthdate: String,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Capability matrix.
    Roles,
    /// Why a role may or may not do something.
    Explain { role: Role, capability: Capability },
}

#[derive(Debug, Subcommand)]
enum OnlineCommand {
    Login {
        email: String,
        #[arg(long, env = "HAZELLAB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Create a customer account.
    Register(RegisterArgs),
    /// Browse the active catalog.
    Products {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        category: Option<CategoryId>,
        #[arg(long)]
        featured: bool,
    },
    /// Admin product table.
    AdminProducts {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        active: ActiveFilter,
        #[arg(long, default_value = "all")]
        stock: StockFilter,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Pay for the current cart.
    Checkout {
        #[arg(long)]
        payment: Option<PaymentMethod>,
        #[arg(long, default_value = "retiro")]
        shipping: ShippingMethod,
    },
    /// Your receipts.
    Receipts,
    Sales {
        #[command(subcommand)]
        action: SalesAction,
    },
    /// Admin user table.
    Users {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Dashboard,
    Regions,
    Comunas { region: String },
}

#[derive(Debug, Subcommand)]
enum RutAction {
    Check { rut: String },
    Format { rut: String },
}

#[derive(Debug, Subcommand)]
enum CartAction {
    Show,
    Add {
        product: ProductId,
        #[arg(default_value_t = 1)]
        quantity: u32,
    },
    Set { item: CartItemId, quantity: u32 },
    /// One unit less, never below one.
    Dec { item: CartItemId },
    Remove { item: CartItemId },
}

#[derive(Debug, Subcommand)]
enum SalesAction {
    List {
        #[arg(long)]
        status: Option<ReceiptStatus>,
        #[arg(long, default_value = "")]
        search: String,
    },
    Stats,
    Void { id: ReceiptId },
    Status { id: ReceiptId, status: ReceiptStatus },
}

#[derive(Debug, clap::Args)]
struct RegisterArgs {
    #[arg(long)]
    rut: String,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    apellidos: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "HAZELLAB_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long)]
    region: String,
    #[arg(long)]
    comuna: String,
    #[arg(long, default_value = "")]
    direccion: String,
    #[arg(long)]
    birthdate: Option<String>,
}

impl RegisterArgs {
    fn into_form(self) -> UserForm {
        UserForm {
            rut: self.rut,
            username: self.name,
            apellidos: self.apellidos,
            email: self.email,
            password_confirmation: self.password.clone(),
            password: self.password,
            region: self.region,
            comuna: self.comuna,
            direccion: self.direccion,
            fecha_nacimiento: self.birthdate,
            ..UserForm::default()
        }
    }
}

fn parse_line(raw: &str) -> Result<CartLine, String> {
    let (cost, qty) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected COST:QTY, got '{raw}'"))?;
    let cost: f64 = cost.trim().parse().map_err(|e| format!("cost: {e}"))?;
    let qty: u32 = qty.trim().parse().map_err(|e| format!("quantity: {e}"))?;
    Ok(CartLine::new(cost, qty))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    hazellab_observability::init(cli.config.log_format);

    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        if let Some(fields) = err.downcast_ref::<ClientError>().and_then(ClientError::fields) {
            for (field, msg) in fields.iter() {
                eprintln!("  {field}: {msg}");
            }
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    match cli.command {
        Command::Offline(command) => offline(command, today),
        Command::Online(command) => {
            let config = cli.config.resolve()?;
            tracing::debug!(api_url = %config.api_url, session = %config.session_file.display(), "client configured");
            let store = Storefront::from_config(&config)?;
            online(&store, command, today).await
        }
    }
}

fn offline(command: OfflineCommand, today: NaiveDate) -> anyhow::Result<()> {
    match command {
        OfflineCommand::Rut { action } => rut_command(action)?,
        OfflineCommand::Totals { lines, shipping } => {
            let t = compute_totals_for_code(&lines, &shipping);
            let label = shipping
                .parse::<ShippingMethod>()
                .map_or("sin costo", |m| m.label());
            println!("subtotal  {}", format_clp(t.subtotal));
            println!("iva       {}", format_clp(t.tax));
            println!("envío     {} ({})", format_clp(t.shipping_cost), label);
            println!("total     {}", format_clp(t.total));
        }
        OfflineCommand::Age { birthdate, today: at } => {
            let birth = age::parse_birthdate(&birthdate)?;
            let at = at.unwrap_or(today);
            let years = age::age_on(birth, at);
            let adult = if age::is_adult(Some(birth), at) { "adult" } else { "minor" };
            println!("{years} ({adult})");
        }
        OfflineCommand::Roles => {
            for def in capability_matrix() {
                let caps: Vec<String> = def.capabilities.iter().map(|c| c.to_string()).collect();
                println!("{:<14} {}\n    {}", def.role, def.description, caps.join(", "));
            }
        }
        OfflineCommand::Explain { role, capability } => {
            println!("{}", explain_authorization(role, capability).reason);
        }
    }
    Ok(())
}

async fn online(store: &Storefront, command: OnlineCommand, today: NaiveDate) -> anyhow::Result<()> {
    match command {
        OnlineCommand::Login { email, password } => {
            let landing = store.login(&LoginForm::new(email, password)).await?;
            let user = store.current_user().context("login did not store a user")?;
            println!("logged in as {} ({}), landing at {}", user.display_name(), user.role, landing.path());
        }
        OnlineCommand::Logout => {
            store.logout()?;
            println!("logged out");
        }
        OnlineCommand::Whoami => match store.current_user() {
            Some(user) => println!("{} <{}> [{}] id={}", user.display_name(), user.email, user.role, user.id),
            None => println!("not logged in"),
        },
        OnlineCommand::Register(args) => {
            let user = store.register(&args.into_form(), today).await?;
            println!("account created for {} (id {})", user.email, user.id);
        }
        OnlineCommand::Products {
            search,
            category,
            featured,
        } => {
            let products = if featured {
                store.featured().await?
            } else {
                let query = CatalogQuery {
                    category,
                    search,
                };
                store.catalog(&query).await?
            };
            for p in &products {
                print_product(p);
            }
        }
        OnlineCommand::AdminProducts {
            search,
            active,
            stock,
            page,
        } => {
            let query = AdminProductQuery {
                search,
                active,
                stock,
            };
            let listing = store.admin_products(&query, page).await?;
            for p in &listing.items {
                print_product(p);
                if p.is_expired(today) {
                    println!("       vencido desde {}", p.exp_date.as_deref().unwrap_or("-"));
                }
            }
            print_page(&listing);
        }
        OnlineCommand::Cart { action } => cart_command(store, action.unwrap_or(CartAction::Show)).await?,
        OnlineCommand::Checkout { payment, shipping } => {
            let outcome = store.checkout(payment, shipping).await?;
            println!(
                "receipt {} issued, total {}",
                outcome.receipt.numero_boleta.as_deref().unwrap_or("-"),
                format_clp(outcome.receipt.total.unwrap_or(outcome.totals.total)),
            );
        }
        OnlineCommand::Receipts => {
            for r in store.my_receipts().await? {
                print_receipt(&r);
            }
        }
        OnlineCommand::Sales { action } => sales_command(store, action).await?,
        OnlineCommand::Users { search, role, page } => {
            let filter = UserFilter {
                search,
                role,
                ..UserFilter::default()
            };
            let listing = store.admin_users(&filter, page).await?;
            for u in &listing.items {
                println!(
                    "{:>5}  {:<30} {:<28} {:<14} {}",
                    u.id,
                    u.display_name(),
                    u.email,
                    u.role,
                    u.status
                );
            }
            print_page(&listing);
        }
        OnlineCommand::Dashboard => {
            let summary = store.dashboard().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OnlineCommand::Regions => {
            for region in store.regions().await {
                println!("{region}");
            }
        }
        OnlineCommand::Comunas { region } => {
            for comuna in store.comunas(&region).await {
                println!("{comuna}");
            }
        }
    }
    Ok(())
}

fn rut_command(action: RutAction) -> anyhow::Result<()> {
    match action {
        RutAction::Check { rut: raw } => {
            if !rut::is_valid(&raw) {
                bail!("'{raw}' is not a valid RUT");
            }
            println!("valid: {}", rut::format(&raw));
        }
        RutAction::Format { rut: raw } => println!("{}", rut::format(&raw)),
    }
    Ok(())
}

async fn cart_command(store: &Storefront, action: CartAction) -> anyhow::Result<()> {
    match action {
        CartAction::Show => {
            let mut view = CartView::new();
            view.load(store).await?;
            print_cart(&view);
        }
        CartAction::Add { product, quantity } => {
            let item = store.add_to_cart(product, quantity).await?;
            println!("added {} x{}", item.product_name(), item.quantity());
        }
        CartAction::Set { item, quantity } => {
            let mut view = CartView::new();
            view.load(store).await?;
            view.set_quantity(store, item, quantity).await?;
            print_cart(&view);
        }
        CartAction::Dec { item } => {
            let mut view = CartView::new();
            view.load(store).await?;
            view.decrement(store, item).await?;
            print_cart(&view);
        }
        CartAction::Remove { item } => {
            let mut view = CartView::new();
            view.load(store).await?;
            view.remove(store, item).await?;
            print_cart(&view);
        }
    }
    Ok(())
}

async fn sales_command(store: &Storefront, action: SalesAction) -> anyhow::Result<()> {
    match action {
        SalesAction::List { status, search } => {
            for r in store.sales(&ReceiptFilter { status, search }).await? {
                print_receipt(&r);
            }
        }
        SalesAction::Stats => {
            let s = store.sales_stats().await?;
            println!("ventas      {}", s.total_ventas);
            println!("pagadas     {}", s.ventas_pagadas);
            println!("pendientes  {}", s.ventas_pendientes);
            println!("ingresos    {}", format_clp(s.ingresos_totales));
            println!("promedio    {}", format_clp(s.promedio_venta));
        }
        SalesAction::Void { id } => {
            let r = store.void_receipt(id).await?;
            print_receipt(&r);
        }
        SalesAction::Status { id, status } => {
            let r = store.set_receipt_status(id, status).await?;
            print_receipt(&r);
        }
    }
    Ok(())
}

fn print_cart(view: &CartView) {
    for item in view.items() {
        println!(
            "{:>5}  {:<32} x{:<3} {}",
            item.id,
            item.product_name(),
            item.quantity(),
            format_clp(item.line_total())
        );
    }
    for shipping in ShippingMethod::ALL {
        println!("{:<18} {}", shipping.label(), format_clp(view.totals(shipping).total));
    }
}

fn print_product(p: &Product) {
    println!(
        "{:>5}  {:<32} {:>10}  stock {:<4} {}",
        p.id,
        p.name,
        format_clp(p.unit_cost()),
        p.stock(),
        p.stock_level().label()
    );
}

fn print_receipt(r: &Receipt) {
    let issued = match r.issued_at() {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => r.fecha_emision.clone().unwrap_or_else(|| "-".to_string()),
    };
    println!(
        "{:<14} {:<10} {:<17} {:>4} u {:>10}",
        r.numero_boleta.as_deref().unwrap_or("-"),
        r.estado.map_or("-", |s| s.code()),
        issued,
        r.units(),
        format_clp(r.total())
    );
}

fn print_page<T>(page: &Page<T>) {
    println!(
        "page {}/{} ({} total)",
        page.page,
        page.total_pages.max(1),
        page.total_items
    );
}
