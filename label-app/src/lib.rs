use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use kitchen_label::{
    list_printers, render_label, CaptionInputs, EplViewer, HtmlFileViewer, IdGenerator, LabelConfig, Printer, Viewer,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "label-app", version, about = "Generate and print barcoded kitchen labels")]
pub struct Cli {
    /// YAML config file (falls back to $KITCHEN_LABEL_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a new label id
    Id,
    /// Render label SVG
    Render {
        #[command(flatten)]
        label: LabelArgs,
        /// Write markup here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render and send a label to the viewer or thermal printer
    Print {
        #[command(flatten)]
        label: LabelArgs,
        /// Send an EPL2 job to the configured printer instead of writing an HTML page
        #[arg(long)]
        epl: bool,
    },
    /// Show configured products, staff and container types
    Catalog,
    /// List installed printers
    Printers,
}

#[derive(Debug, Clone, Args)]
pub struct LabelArgs {
    /// Existing label id; a new one is generated when omitted
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long, requires = "product")]
    pub preparer: Option<String>,
    #[arg(long, requires = "product")]
    pub prepared: Option<String>,
    #[arg(long, requires = "product")]
    pub expiry: Option<String>,
}

impl LabelArgs {
    /// Caption inputs, present only when a product was given.
    pub fn caption(&self) -> Option<CaptionInputs> {
        let product = self.product.clone()?;
        Some(CaptionInputs::new(
            product,
            self.preparer.clone().unwrap_or_default(),
            self.prepared.clone().unwrap_or_default(),
            self.expiry.clone().unwrap_or_default(),
        ))
    }

    fn id_or_new(&self, config: &LabelConfig) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| IdGenerator::new(&config.id_prefix).generate().into_inner())
    }
}

fn viewer_for(config: &LabelConfig, epl: bool) -> Result<Arc<dyn Viewer>, Box<dyn Error>> {
    if !epl {
        return Ok(Arc::new(HtmlFileViewer::new(&config.output_dir)));
    }
    let target = config
        .printer
        .raw_target()
        .ok_or("no printer configured: set printer.device or printer.name")?;
    Ok(Arc::new(EplViewer::new(target, config.printer.epl.clone())))
}

fn render(config: &LabelConfig, label: &LabelArgs, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let id = label.id_or_new(config);
    let svg = render_label(&id, label.caption().as_ref(), &config.style);
    if svg.is_empty() {
        return Err("failed to generate barcode".into());
    }
    match out {
        Some(path) => {
            std::fs::write(path, &svg)?;
            info!(id, path = %path.display(), "label rendered");
        }
        None => println!("{svg}"),
    }
    Ok(())
}

async fn print(config: &LabelConfig, label: &LabelArgs, epl: bool) -> Result<(), Box<dyn Error>> {
    let printer = Printer::new(config.style.clone(), viewer_for(config, epl)?);
    let id = label.id_or_new(config);
    if printer.print(&id, label.caption().as_ref()).await {
        println!("{id}");
        Ok(())
    } else {
        Err(format!("printing label {id} failed").into())
    }
}

fn catalog(config: &LabelConfig) {
    let sections = [
        ("products", &config.catalog.products),
        ("staff", &config.catalog.staff),
        ("containers", &config.catalog.container_types),
    ];
    for (title, items) in sections {
        println!("{title}:");
        for item in items {
            println!("  {item}");
        }
    }
}

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = LabelConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Id => println!("{}", IdGenerator::new(&config.id_prefix).generate()),
        Command::Render { label, out } => render(&config, &label, out.as_deref())?,
        Command::Print { label, epl } => print(&config, &label, epl).await?,
        Command::Catalog => catalog(&config),
        Command::Printers => {
            for name in list_printers()? {
                println!("{name}");
            }
        }
    }
    Ok(())
}
