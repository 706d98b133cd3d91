use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tilegrid::render::MemoryTarget;
use tilegrid::{DisplayOptions, GridPayload, PageRegistry, PostTileData, TemplateSpec, TileGridInstance};

#[derive(Parser)]
#[command(name = "tilegrid", version, about = "Lay out tile grids from row templates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lay out one grid from a payload and print the placements as JSON
    Layout {
        /// Grid payload, or a page payload keyed by grid id
        #[arg(long)]
        payload: PathBuf,
        /// Container width in pixels
        #[arg(long)]
        width: u32,
        /// Grid id when the payload holds several grids
        #[arg(long)]
        grid: Option<String>,
        /// Template key to select after mounting
        #[arg(long)]
        template: Option<usize>,
    },
    /// Build a page payload from options, posts and template files
    Payload {
        #[arg(long)]
        options: Option<PathBuf>,
        #[arg(long)]
        posts: PathBuf,
        /// `name=path` of a template file; repeat for alternates, first is the default
        #[arg(long = "grid", required = true)]
        grids: Vec<String>,
        /// Small-screen template file
        #[arg(long)]
        small: Option<PathBuf>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TileOut {
    id: u64,
    row: usize,
    column: u32,
    span: u32,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOut {
    id: String,
    template: String,
    column_width: u32,
    container_height: u32,
    wrapper_height: u32,
    tiles: Vec<TileOut>,
    hidden: Vec<u64>,
    diagnostics: Vec<String>,
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_payload(path: &Path, grid: Option<&str>) -> anyhow::Result<GridPayload> {
    let text = read(path)?;
    if let Ok(single) = GridPayload::from_json(&text) {
        return Ok(single);
    }
    let mut page: BTreeMap<String, GridPayload> =
        serde_json::from_str(&text).context("payload is neither a grid nor a page payload")?;
    let id = match grid {
        Some(id) => id.to_string(),
        None if page.len() == 1 => page.keys().next().cloned().unwrap_or_default(),
        None => bail!("page payload holds {} grids; pick one with --grid", page.len()),
    };
    page.remove(&id)
        .with_context(|| format!("no grid '{}' in payload", id))
}

fn run_layout(path: PathBuf, width: u32, grid: Option<String>, template: Option<usize>) -> anyhow::Result<()> {
    let mut payload = load_payload(&path, grid.as_deref())?;
    payload.options.animated = false;

    let target = MemoryTarget::new(width);
    let mut instance = TileGridInstance::mount(&payload, Box::new(target))?;
    if let Some(index) = template {
        instance.select_template(index);
    }

    let g = instance.grid();
    let mut tiles = Vec::new();
    let mut hidden = Vec::new();
    for tile in g.tiles() {
        match tile.placement {
            Some(p) => tiles.push(TileOut {
                id: tile.id,
                row: p.row,
                column: p.column,
                span: p.span,
                x: p.rect.x,
                y: p.rect.y,
                width: p.rect.width,
                height: p.rect.height,
            }),
            None => hidden.push(tile.id),
        }
    }
    let out = LayoutOut {
        id: instance.id().to_string(),
        template: g.template().to_string(),
        column_width: g.column_width(),
        container_height: g.container_height(),
        wrapper_height: instance.wrapper_height(),
        tiles,
        hidden,
        diagnostics: instance.diagnostics().iter().map(|e| e.to_string()).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run_payload(
    options: Option<PathBuf>,
    posts: PathBuf,
    grids: Vec<String>,
    small: Option<PathBuf>,
) -> anyhow::Result<()> {
    let options = match options {
        Some(path) => DisplayOptions::from_json(&read(&path)?)?,
        None => DisplayOptions::default(),
    };
    let posts: Vec<PostTileData> = serde_json::from_str(&read(&posts)?).context("parsing posts")?;

    let mut specs = Vec::with_capacity(grids.len());
    for arg in grids {
        let Some((name, file)) = arg.split_once('=') else {
            bail!("--grid expects name=path, got '{}'", arg);
        };
        let text = read(Path::new(file))?;
        specs.push((name.to_string(), TemplateSpec::Text(text)));
    }
    let small = match small {
        Some(path) => Some(TemplateSpec::Text(read(&path)?)),
        None => None,
    };

    let mut page = PageRegistry::new();
    match page.register(specs, small, posts, options)? {
        Some(id) => log::info!("registered {}", id),
        None => log::info!("no posts; nothing to render"),
    }
    println!("{}", serde_json::to_string_pretty(&page.payload())?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Layout {
            payload,
            width,
            grid,
            template,
        } => run_layout(payload, width, grid, template),
        Command::Payload {
            options,
            posts,
            grids,
            small,
        } => run_payload(options, posts, grids, small),
    }
}
