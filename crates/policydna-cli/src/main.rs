//! PolicyDNA command line interface.
//!
//! Subcommands:
//! - `taxonomy`: show or export the coverage taxonomy
//! - `library`: list, search, or export the standard clause library
//! - `process`: run extracted elements through the full pipeline
//!   (normalize, map, build structure)

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use policydna_core::score::MatchConfig;
use policydna_core::{PolicyElement, Relationship};
use policydna_lang::LanguageNormalizer;
use policydna_library::{builtin_library, ClauseLibrary};
use policydna_mapper::TaxonomyMapper;
use policydna_structure::PolicyStructureBuilder;
use policydna_taxonomy::{builtin_registry, TaxonomyRegistry};

/// PolicyDNA - policy language taxonomy and normalization
#[derive(Parser)]
#[command(name = "policydna")]
#[command(about = "Maps insurance policy elements onto a standard coverage taxonomy")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show or export the coverage taxonomy
    Taxonomy {
        #[command(subcommand)]
        command: TaxonomyCommand,
    },

    /// Inspect the standard clause library
    Library {
        #[command(subcommand)]
        command: LibraryCommand,
    },

    /// Run extracted elements through normalization, mapping, and
    /// structure building
    Process(ProcessArgs),
}

#[derive(Subcommand)]
enum TaxonomyCommand {
    /// Print the hierarchy, optionally rooted at one code
    Show {
        /// Dotted taxonomy code to start from
        #[arg(long)]
        code: Option<String>,
    },

    /// Write the built-in taxonomy to a JSON file
    Save {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum LibraryCommand {
    /// List all standard clauses
    List,

    /// Search clauses by free text
    Search { query: String },

    /// Write the built-in library to a JSON file
    Save {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Parser)]
struct ProcessArgs {
    /// JSON file holding the extracted elements (array of elements)
    #[arg(long)]
    elements: PathBuf,

    /// JSON file holding element relationships (array)
    #[arg(long)]
    relationships: Option<PathBuf>,

    /// JSON file holding document metadata (free-form object)
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Extend the built-in taxonomy from a registry JSON file
    #[arg(long, env = "POLICYDNA_TAXONOMY")]
    taxonomy: Option<PathBuf>,

    /// Replace the built-in clause library with a library JSON file
    #[arg(long, env = "POLICYDNA_LIBRARY")]
    library: Option<PathBuf>,

    /// Where to write the assembled policy structure
    #[arg(long)]
    out: PathBuf,

    /// Minimum composite score to rewrite an element to standard wording
    #[arg(long)]
    equivalence_threshold: Option<f64>,

    /// Uniqueness score above which an element is flagged unique
    #[arg(long)]
    uniqueness_threshold: Option<f64>,

    /// Confidence floor below which mappings fall back to UNCLASSIFIED
    #[arg(long)]
    min_confidence: Option<f64>,
}

impl ProcessArgs {
    fn match_config(&self) -> MatchConfig {
        let mut config = MatchConfig::default();
        if let Some(v) = self.equivalence_threshold {
            config.equivalence_threshold = v;
        }
        if let Some(v) = self.uniqueness_threshold {
            config.uniqueness_threshold = v;
        }
        if let Some(v) = self.min_confidence {
            config.min_mapping_confidence = v;
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Taxonomy { command } => run_taxonomy(command),
        Command::Library { command } => run_library(command),
        Command::Process(args) => run_process(args),
    }
}

fn run_taxonomy(command: TaxonomyCommand) -> anyhow::Result<()> {
    let registry = builtin_registry()?;
    match command {
        TaxonomyCommand::Show { code } => {
            print!("{}", registry.format_hierarchy(code.as_deref()));
        }
        TaxonomyCommand::Save { out } => {
            registry.save(&out)?;
            println!("wrote {} taxonomy nodes to {}", registry.len(), out.display());
        }
    }
    Ok(())
}

fn run_library(command: LibraryCommand) -> anyhow::Result<()> {
    let library = builtin_library()?;
    match command {
        LibraryCommand::List => {
            for clause in library.clauses() {
                println!(
                    "{}  {:<20} {:<18} {}",
                    clause.id,
                    clause.clause_type.as_str(),
                    clause.taxonomy_code,
                    clause.name
                );
            }
        }
        LibraryCommand::Search { query } => {
            let hits = library.search(&query);
            if hits.is_empty() {
                println!("no clauses matched");
            }
            for (clause, relevance) in hits {
                println!("{relevance:.3}  {}  {}", clause.id, clause.name);
            }
        }
        LibraryCommand::Save { out } => {
            library.save(&out)?;
            println!("wrote {} clauses to {}", library.len(), out.display());
        }
    }
    Ok(())
}

fn run_process(args: ProcessArgs) -> anyhow::Result<()> {
    let registry = load_registry(args.taxonomy.as_deref())?;
    let library = load_library(args.library.as_deref())?;
    let config = args.match_config();

    let mut elements: Vec<PolicyElement> = read_json(&args.elements)?;
    let relationships: Vec<Relationship> = match &args.relationships {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let metadata: serde_json::Value = match &args.metadata {
        Some(path) => read_json(path)?,
        None => serde_json::Value::Null,
    };

    let normalizer = LanguageNormalizer::with_config(&library, config);
    let report = normalizer.normalize_elements(&mut elements);

    let mapper = TaxonomyMapper::with_config(&registry, config)?;
    let results = mapper.map_elements(&mut elements, Some(&library));
    let stats = TaxonomyMapper::confidence_statistics(&results);
    let distribution = TaxonomyMapper::taxonomy_distribution(&results);

    let structure = PolicyStructureBuilder::new(&registry)
        .metadata(metadata)
        .elements(elements)
        .relationships(relationships)
        .build();
    structure.save(&args.out)?;

    let summary = serde_json::json!({
        "normalization": report,
        "mapping": { "confidence": stats, "distribution": distribution },
        "structure": structure.summary,
        "coverage": structure.coverage,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!("wrote policy structure to {}", args.out.display());
    Ok(())
}

fn load_registry(extension: Option<&std::path::Path>) -> anyhow::Result<TaxonomyRegistry> {
    let mut registry = builtin_registry()?;
    if let Some(path) = extension {
        registry
            .extend_from_file(path)
            .with_context(|| format!("extending taxonomy from {}", path.display()))?;
    }
    Ok(registry)
}

fn load_library(path: Option<&std::path::Path>) -> anyhow::Result<ClauseLibrary> {
    match path {
        Some(path) => ClauseLibrary::load(path)
            .with_context(|| format!("loading clause library from {}", path.display())),
        None => Ok(builtin_library()?),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
