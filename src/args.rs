use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Annotation reports and exports for microscopy images
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print region areas clipped to the boundary, totalled by label
    Report {
        /// Annotation file
        annotations: PathBuf,
        /// Source image; its pixel size sets the raster grid
        #[arg(long)]
        image: Option<PathBuf>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Draw the annotations over a preview of the image
    Overlay {
        annotations: PathBuf,
        image: PathBuf,
        /// Output PNG
        output: PathBuf,
        /// Longest side of the rendered preview
        #[arg(long)]
        max_side: Option<u32>,
    },
    /// List the annotated entities
    Inspect { annotations: PathBuf },
    /// Write a binary mask of all regions with one label
    Mask {
        annotations: PathBuf,
        label: String,
        /// Output PNG
        output: PathBuf,
        /// Source image; its pixel size sets the mask size
        #[arg(long)]
        image: Option<PathBuf>,
    },
}
