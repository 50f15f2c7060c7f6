//! mbean-tree CLI tool
//!
//! Builds the console tree for a catalog stored as JSON (a Jolokia `list` response or its
//! `value` body) and prints it.
//!
//! ## Commands
//!
//! - `tree <catalog>`: Print the whole forest, optionally filtered by a name glob
//! - `show <catalog> <segment>...`: Resolve a path and print the node it leads to
//! - `config`: Print the default configuration as TOML
//!
//! Reshapers enabled in the configuration file (`--config`) run after the tree is built.

use clap::{Parser, Subcommand};
use mbean_tree::{
    builder::TreeBuilder,
    config::TreeConfig,
    paths::Glob,
    processor::ProcessorRegistry,
    reshape::register_configured,
    source::JsonFileCatalog,
    tree::{Forest, IconState, NodeRef},
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mbean-tree")]
#[command(author, version, about = "Build and inspect management console trees", long_about = None)]
struct Cli {
    /// Configuration file path (defaults are used when absent)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the tree for a catalog and print it
    Tree {
        /// Path to the catalog JSON file
        catalog: PathBuf,

        /// Only keep nodes whose name matches this glob (and everything below them)
        #[arg(short, long)]
        filter: Option<String>,

        /// Print the renderer view as JSON instead of an indented outline
        #[arg(long)]
        json: bool,
    },

    /// Resolve a path of node names (globs allowed) and print the node
    Show {
        /// Path to the catalog JSON file
        catalog: PathBuf,

        /// Node names from the domain root down
        #[arg(required = true)]
        segments: Vec<String>,
    },

    /// Print the default configuration
    Config,
}

fn icon_marker(icon: IconState) -> &'static str {
    match icon {
        IconState::Folder => "+",
        IconState::Leaf => "-",
        IconState::Locked => "x",
    }
}

fn print_outline(node: NodeRef<'_>, depth: usize) {
    println!(
        "{:indent$}{} {}",
        "",
        icon_marker(node.icon()),
        node.name(),
        indent = depth * 2
    );
    for child in node.children() {
        print_outline(child, depth + 1);
    }
}

async fn build(catalog: PathBuf, config: TreeConfig) -> Result<Forest, Box<dyn std::error::Error>> {
    let registry = ProcessorRegistry::default();
    let reshapers = register_configured(&registry, &config, None);
    tracing::debug!("Registered reshapers: {reshapers:?}");
    let source = JsonFileCatalog::new(catalog);
    Ok(TreeBuilder::new(config).try_load(&source, &registry).await?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match cli.config.as_ref() {
        Some(path) => TreeConfig::load(path)?,
        None => TreeConfig::default(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match cli.command {
        Commands::Tree {
            catalog,
            filter,
            json,
        } => {
            let builder = TreeBuilder::new(config.clone());
            let mut forest = runtime.block_on(build(catalog, config))?;
            if let Some(pattern) = filter {
                let roots = forest.roots().to_vec();
                let criteria = vec![("name".to_string(), Glob::new(&pattern)?)];
                forest = builder.filter(&forest, &roots, |node| {
                    node.matches_compiled(&criteria)
                })?;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&forest.view())?);
            } else {
                for root in forest.root_refs() {
                    print_outline(root, 0);
                }
            }
            Ok(())
        }

        Commands::Show { catalog, segments } => {
            let forest = runtime.block_on(build(catalog, config))?;
            let Some(found) = forest.navigate(segments.as_slice()) else {
                eprintln!("Error: no node at {}", segments.join(" / "));
                std::process::exit(1);
            };
            let node = forest.node_ref(found);
            println!("id:       {}", node.id());
            println!("path:     {}", node.path().join(" / "));
            println!("kind:     {}", node.variant());
            println!("children: {}", node.child_count());
            if let Some(identity) = node.identity() {
                println!("mbean:    {}", identity.object_name);
                let ops = identity.info.op.keys().cloned().collect::<Vec<_>>();
                println!("ops:      {}", ops.join(", "));
                println!("invoke:   {}", node.has_invoke_rights(ops.as_slice()));
            }
            for (key, value) in node.properties() {
                println!("{key:>8}: {value}");
            }
            Ok(())
        }

        Commands::Config => {
            print!("{}", TreeConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}
