use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use framer_grouping::Embedder;
use framer_protocol::{RolesetMap, VerbSelection};
use framer_render::{framefile_name, render_framefile, Layout, OverrideStore, RenderOptions};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Groups verb usages from a CoNLL-U corpus into rolesets and writes framefiles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Groups the sentences of one verb and exports the framefile
    Group(GroupArgs),
    /// Renders a saved roleset map again, with edits applied
    Render(RenderArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Method {
    Arguments,
    SentenceEmbedding,
    VerbEmbedding,
}

#[derive(Args)]
struct GroupArgs {
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Verb lemma to select
    #[arg(short, long)]
    verb: String,

    #[arg(short, long, value_enum, default_value_t = Method::Arguments)]
    method: Method,

    /// Examples kept per roleset (0 = no limit)
    #[arg(long, default_value_t = 0)]
    max_per_roleset: usize,

    /// Let modifier roles (ArgM-*) split rolesets
    #[arg(long)]
    modifiers: bool,

    /// Cosine similarity threshold in [-1, 1]
    #[arg(long, default_value_t = 0.7, allow_hyphen_values = true)]
    threshold: f32,

    /// Model directory or hub id for the embedding methods
    #[arg(long)]
    model: Option<String>,

    /// Framefile destination (defaults to Framefile-<verb>-v.txt)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also save the roleset map as JSON for later editing
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Print the console rendering to stdout
    #[arg(long)]
    print: bool,
}

#[derive(Args)]
struct RenderArgs {
    #[arg(long, value_name = "FILE")]
    snapshot: PathBuf,

    #[arg(short, long)]
    verb: String,

    #[arg(long, value_name = "FILE")]
    overrides: Option<PathBuf>,

    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print to stdout with console indentation instead of writing a file
    #[arg(long)]
    console: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Group(args) => group(args),
        Command::Render(args) => render(args),
    }
}

fn group(args: GroupArgs) -> anyhow::Result<()> {
    // 1. Read the corpus and select the verb
    let corpus = framer_conllu::parse_file(&args.input)?;
    info!(sentences = corpus.len(), input = ?args.input, "Corpus loaded");

    let selection = corpus.select_verb(&args.verb);
    let sentences = match &selection {
        VerbSelection::NoMatch => {
            info!(verb = %args.verb, "No sentence contains the verb, nothing to write");
            return Ok(());
        }
        VerbSelection::Matched(sentences) => sentences.as_slice(),
    };

    // 2. Group
    let cap = NonZeroUsize::new(args.max_per_roleset);
    let map = match args.method {
        Method::Arguments => framer_grouping::group_by_arguments(sentences, &args.verb, cap, args.modifiers)?,
        Method::SentenceEmbedding => {
            framer_grouping::validate_threshold(args.threshold)?;
            let embedder = load_embedder(args.model.as_deref())?;
            framer_grouping::group_by_sentence_embedding(&*embedder, sentences, cap, args.threshold)?
        }
        Method::VerbEmbedding => {
            framer_grouping::validate_threshold(args.threshold)?;
            let embedder = load_embedder(args.model.as_deref())?;
            framer_grouping::group_by_verb_token_embedding(
                &*embedder,
                sentences,
                &args.verb,
                cap,
                args.threshold,
            )?
        }
    };

    // 3. Export
    if let Some(path) = &args.snapshot {
        write_snapshot(path, &map)?;
    }

    let overrides = OverrideStore::new();
    if args.print {
        print!("{}", render_framefile(&map, &overrides, options(&args.verb, Layout::Console)));
    }

    let output = args.output.unwrap_or_else(|| PathBuf::from(framefile_name(&args.verb)));
    let text = render_framefile(&map, &overrides, options(&args.verb, Layout::File));
    fs::write(&output, text).with_context(|| format!("writing framefile {:?}", output))?;

    info!(rolesets = map.len(), output = ?output, "Framefile written");
    Ok(())
}

fn render(args: RenderArgs) -> anyhow::Result<()> {
    let raw = fs::read_to_string(&args.snapshot).with_context(|| format!("reading snapshot {:?}", args.snapshot))?;
    let map: RolesetMap = serde_json::from_str(&raw).with_context(|| format!("parsing snapshot {:?}", args.snapshot))?;

    let overrides = match &args.overrides {
        Some(path) => {
            let raw = fs::read_to_string(path).with_context(|| format!("reading overrides {:?}", path))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing overrides {:?}", path))?
        }
        None => OverrideStore::new(),
    };

    if args.console {
        print!("{}", render_framefile(&map, &overrides, options(&args.verb, Layout::Console)));
        return Ok(());
    }

    let output = args.output.unwrap_or_else(|| PathBuf::from(framefile_name(&args.verb)));
    let text = render_framefile(&map, &overrides, options(&args.verb, Layout::File));
    fs::write(&output, text).with_context(|| format!("writing framefile {:?}", output))?;

    let active = overrides.active_rolesets(&map).count();
    info!(rolesets = active, removed = map.len() - active, output = ?output, "Framefile written");
    Ok(())
}

fn options(verb: &str, layout: Layout) -> RenderOptions<'_> {
    RenderOptions { verb, layout }
}

fn write_snapshot(path: &Path, map: &RolesetMap) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(map)?;
    fs::write(path, json).with_context(|| format!("writing snapshot {:?}", path))?;
    info!(path = ?path, "Snapshot written");
    Ok(())
}

#[cfg(feature = "bert")]
fn load_embedder(model: Option<&str>) -> anyhow::Result<Box<dyn Embedder>> {
    use framer_grouping::bert::{BertConfig, BertEmbedder};

    let mut config = BertConfig::default();
    if let Some(model) = model {
        config.model = model.to_string();
    }
    Ok(Box::new(BertEmbedder::load(&config)?))
}

#[cfg(not(feature = "bert"))]
fn load_embedder(_model: Option<&str>) -> anyhow::Result<Box<dyn Embedder>> {
    anyhow::bail!("embedding methods need the `bert` feature (rebuild with `--features bert`)")
}
