//! Command dispatch: turns parsed arguments into service calls

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use serde_json::Value;
use termtree::Tree as TermTree;
use tracing::{debug, instrument};

use crate::application::IoResultExt;
use crate::cli::args::{Cli, Commands, ConfigCommands, GardenCommands, TreeCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings, LOCAL_CONFIG_FILE};
use crate::domain::{Cell, Garden, Tree, TreeFields};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::server;

/// Execute the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        let mut cmd = Cli::command();
        cmd.print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => execute_config(cli, command),
        Commands::Serve {
            host,
            port,
            no_seed,
        } => {
            let mut settings = load_settings(cli)?;
            if let Some(host) = host {
                settings.host = host.clone();
            }
            if let Some(port) = port {
                settings.port = *port;
            }
            if *no_seed {
                settings.seed_on_start = false;
            }
            serve(settings)
        }
        Commands::Garden { command } => {
            let container = open(cli)?;
            execute_garden(&container, command)
        }
        Commands::Tree { command } => {
            let container = open(cli)?;
            execute_tree(&container, command)
        }
        Commands::Grouped { garden } => {
            let container = open(cli)?;
            grouped(&container, garden)
        }
        Commands::Backup { output: path } => {
            let container = open(cli)?;
            let summary = container.backup.export_to_path(path)?;
            output::success(&format!(
                "backup written to {} ({} gardens, {} images)",
                path.display(),
                summary.gardens,
                summary.images
            ));
            Ok(())
        }
        Commands::Seed => {
            let container = open(cli)?;
            if container.gardens.seed_if_empty()? {
                output::success("sample garden created");
            } else {
                output::info("store already holds gardens, nothing seeded");
            }
            Ok(())
        }
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    Ok(Settings::load(cli.config.as_deref())?)
}

fn open(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = load_settings(cli)?;
    Ok(ServiceContainer::new(settings)?)
}

#[instrument(skip(settings))]
fn serve(settings: Settings) -> CliResult<()> {
    std::fs::create_dir_all(&settings.uploads_dir)
        .with_path_context("create uploads dir", &settings.uploads_dir)?;

    let container = ServiceContainer::new(settings)?;
    if container.settings.seed_on_start && container.gardens.seed_if_empty()? {
        output::action("Seeded", "sample garden");
    }
    output::info(&format!(
        "serving on http://{}:{} (backend: {})",
        container.settings.host,
        container.settings.port,
        container.gardens.backend()
    ));
    server::run(container)?;
    Ok(())
}

fn execute_garden(container: &ServiceContainer, command: &GardenCommands) -> CliResult<()> {
    match command {
        GardenCommands::List => {
            let gardens = container.gardens.list_gardens()?;
            if gardens.is_empty() {
                output::info("no gardens");
                return Ok(());
            }
            let root = format!("gardens ({})", container.gardens.backend());
            output::info(&gardens_view(root, &gardens));
            Ok(())
        }
        GardenCommands::Create { name, rows, cols } => {
            let garden = container.gardens.create_garden(name, *rows, *cols)?;
            output::action(
                "Created",
                &format!("{} ({}x{})", garden.name, garden.rows, garden.cols),
            );
            Ok(())
        }
        GardenCommands::Delete { name } => {
            container.gardens.delete_garden(name)?;
            output::action("Deleted", name);
            Ok(())
        }
    }
}

fn execute_tree(container: &ServiceContainer, command: &TreeCommands) -> CliResult<()> {
    match command {
        TreeCommands::Upsert {
            garden,
            row,
            col,
            variety,
            status,
            notes,
            images,
            new_images,
            harvest,
        } => {
            let harvest_info = match harvest {
                Some(raw) => serde_json::from_str::<Vec<Value>>(raw).map_err(|e| {
                    CliError::InvalidArgs(format!("--harvest must be a JSON array: {e}"))
                })?,
                None => Vec::new(),
            };

            let mut uploaded = Vec::with_capacity(new_images.len());
            for path in new_images {
                uploaded.push(upload_file(container, path)?);
            }

            let fields = TreeFields {
                variety: variety.clone(),
                status: status.clone(),
                notes: notes.clone(),
                existing_images: images.clone(),
                new_images: uploaded,
                harvest_info,
            };
            let tree = container
                .gardens
                .upsert_tree(garden, Cell::new(*row, *col), fields)?;

            output::action("Saved", &format!("{} in {}", tree.cell(), garden));
            for image in &tree.images {
                output::detail(image);
            }
            Ok(())
        }
    }
}

fn upload_file(container: &ServiceContainer, path: &Path) -> CliResult<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::InvalidArgs(format!("not a file: {}", path.display())))?;
    let bytes = std::fs::read(path).with_path_context("read image", path)?;
    debug!("uploading {} ({} bytes)", path.display(), bytes.len());
    Ok(container.uploads.store(&name, &bytes)?)
}

fn grouped(container: &ServiceContainer, garden: &str) -> CliResult<()> {
    let groups = container.gardens.group_by_status(garden)?;
    if groups.is_empty() {
        output::info(&format!("{garden}: no trees"));
        return Ok(());
    }
    for group in groups.iter() {
        output::header(&format!("{} ({})", output::status(&group.status), group.trees.len()));
        for tree in &group.trees {
            output::detail(&tree_label(tree));
        }
    }
    Ok(())
}

fn execute_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Template => {
            output::info(&Settings::template());
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action(
                    "global",
                    &format!("{} ({})", path.display(), presence(&path)),
                ),
                None => output::warning("no config directory on this platform"),
            }
            let local = cli
                .config
                .clone()
                .unwrap_or_else(|| LOCAL_CONFIG_FILE.into());
            output::action(
                "local",
                &format!("{} ({})", local.display(), presence(&local)),
            );
            Ok(())
        }
    }
}

fn presence(path: &Path) -> &'static str {
    if path.exists() {
        "exists"
    } else {
        "not found"
    }
}

/// One line per planted cell: position, variety, status and photo count.
fn tree_label(tree: &Tree) -> String {
    let variety = if tree.variety.is_empty() {
        "-"
    } else {
        tree.variety.as_str()
    };
    let mut label = format!(
        "{} {} [{}]",
        tree.cell(),
        variety,
        output::status(tree.status_label())
    );
    if !tree.images.is_empty() {
        label.push_str(&format!(" {} ảnh", tree.images.len()));
    }
    if !tree.harvest_info.is_empty() {
        label.push_str(&format!(" {} lần thu hoạch", tree.harvest_info.len()));
    }
    label
}

/// Gardens and their planted cells as a terminal tree.
pub fn gardens_view(root: String, gardens: &[Garden]) -> TermTree<String> {
    let mut view = TermTree::new(root);
    for garden in gardens {
        let node = TermTree::new(format!(
            "{} ({}x{}, {} trees)",
            garden.name,
            garden.rows,
            garden.cols,
            garden.trees.len()
        ))
        .with_leaves(garden.trees.iter().map(tree_label));
        view.push(node);
    }
    view
}
