use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use unicode_width::UnicodeWidthStr;

mod cli;

use cineadmin::{
    api::{auth, ApiClient},
    catalog::{crud, EntityDescriptor, FormValues},
    config::Config,
    tui::{
        self,
        components::{DataTable, SortDirection},
        traits::Paginated,
        ui::truncate_string,
    },
};
use cli::{Cli, Commands};

const LOG_FILE: &str = "cineadmin.log";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "cineadmin=info");
    }
    init_logging(!cli.command.is_tui());

    let config = Config::from_env()?.with_base_url(cli.base_url.clone());
    config.validate()?;

    if let Err(e) = run(cli.command, config).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

/// Log to `cineadmin.log`, and to stderr unless the TUI owns the terminal
fn init_logging(to_stderr: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env());

    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(EnvFilter::from_default_env())
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

async fn run(command: Commands, config: Config) -> Result<()> {
    let api = ApiClient::from_config(&config).context("Failed to build HTTP client")?;

    match command {
        Commands::List {
            entity,
            filter,
            sort,
            desc,
            page,
        } => {
            let descriptor = Commands::parse_entity(&entity)?.descriptor();
            let records = crud::fetch_all(&api, descriptor)
                .await
                .with_context(|| format!("Failed to list {}", descriptor.title.to_lowercase()))?;

            let mut table = DataTable::new(descriptor.columns.to_vec()).with_page_size(config.page_size);
            table.set_records(records);
            if let Some(filter) = filter {
                table.set_filter(&filter);
            }
            if let Some(column) = sort {
                let direction = if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                };
                if !table.sort_by(&column, direction) {
                    anyhow::bail!("Cannot sort {} by '{}'", descriptor.title.to_lowercase(), column);
                }
            }
            table.set_current_page(page.saturating_sub(1));
            print_table(descriptor, &table);
        }

        Commands::Get { entity, id } => {
            let descriptor = Commands::parse_entity(&entity)?.descriptor();
            let record = crud::fetch_one(&api, descriptor, id)
                .await
                .with_context(|| format!("Failed to load {} data.", descriptor.singular))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Add { entity, set } => {
            let descriptor = Commands::parse_entity(&entity)?.descriptor();
            let mut values = FormValues::new();
            values.apply_assignments(descriptor, &set)?;
            let body = values.to_payload(descriptor)?;

            crud::create(&api, descriptor, &body).await.map_err(|e| {
                anyhow::anyhow!(e.user_message(&format!(
                    "Failed to add {}. Please try again.",
                    descriptor.singular
                )))
            })?;
            println!("Added {}", descriptor.singular);
        }

        Commands::Edit { entity, id, set } => {
            let descriptor = Commands::parse_entity(&entity)?.descriptor();
            let record = crud::fetch_one(&api, descriptor, id)
                .await
                .with_context(|| format!("Failed to load {} data.", descriptor.singular))?;

            let loaded = FormValues::from_record(descriptor, &record);
            let mut values = loaded.clone();
            values.apply_assignments(descriptor, &set)?;
            let body = values.to_update_payload(descriptor, &loaded)?;

            crud::update(&api, descriptor, id, &body).await.map_err(|e| {
                anyhow::anyhow!(e.user_message(&format!(
                    "Failed to update {}. Please try again.",
                    descriptor.singular
                )))
            })?;
            println!("Updated {} {}", descriptor.singular, id);
        }

        Commands::Delete { entity, id } => {
            let descriptor = Commands::parse_entity(&entity)?.descriptor();
            let deleted = crud::delete(&api, descriptor, id)
                .await
                .with_context(|| format!("Failed to delete {} {}", descriptor.singular, id))?;
            if deleted {
                println!("Deleted {} {}", descriptor.singular, id);
            } else {
                anyhow::bail!("The server did not confirm deleting {} {}", descriptor.singular, id);
            }
        }

        Commands::Login { username, password } => {
            let form = auth::LoginForm { username, password };
            let session = auth::login(&api, &form).await?;
            println!(
                "Signed in as {} (session saved to {})",
                session.username,
                config.session_path_str()
            );
        }

        Commands::Register {
            email,
            password,
            confirm_password,
        } => {
            let form = auth::RegisterForm {
                email,
                password,
                confirm_password,
            };
            auth::register(&api, &form).await?;
            println!("Account created for {}. You can now log in.", form.email);
        }

        Commands::Logout => {
            auth::logout(&api).context("Failed to remove session")?;
            println!("Signed out");
        }

        Commands::Whoami => match api.session().username() {
            Some(username) => println!("{}", username),
            None => println!("Not signed in"),
        },

        Commands::Tui => {
            info!("Launching TUI against {}", config.base_url);
            tui::run_tui(config).await?;
        }
    }

    Ok(())
}

/// Print the current page of a table with fixed-width columns
fn print_table(descriptor: &EntityDescriptor, table: &DataTable) {
    if table.visible_len() == 0 {
        println!("No {} found", descriptor.title.to_lowercase());
        return;
    }

    let header: Vec<String> = descriptor
        .columns
        .iter()
        .map(|c| format!("{:<width$}", c.header, width = c.width as usize))
        .collect();
    println!("{}", header.join(" "));
    let total_width: usize = descriptor.columns.iter().map(|c| c.width as usize + 1).sum();
    println!("{}", "-".repeat(total_width));

    for record in table.page_records() {
        let cells: Vec<String> = descriptor
            .columns
            .iter()
            .map(|c| {
                let text = c.display(record.get(c.accessor));
                let text = truncate_string(&text, c.width as usize);
                let pad = (c.width as usize).saturating_sub(text.width());
                format!("{}{}", text, " ".repeat(pad))
            })
            .collect();
        println!("{}", cells.join(" "));
    }

    println!();
    println!(
        "Page {}/{} - {} of {} {}",
        table.get_current_page() + 1,
        table.get_total_pages(),
        table.visible_len(),
        table.len(),
        descriptor.title.to_lowercase()
    );
}
