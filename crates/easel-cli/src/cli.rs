//! Command-line interface definitions for the Easel controller.

use clap::{Parser, Subcommand};

use crate::tools::DEFAULT_BLUR_RADIUS;

/// Command-line interface for driving the Easel host over the bridge.
#[derive(Parser, Debug)]
#[command(name = "easel", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Prints the tool manifest as an OpenAPI document and exits.
    #[arg(long)]
    pub(crate) capabilities: bool,
    /// The tool to run.
    #[command(subcommand)]
    pub(crate) command: Option<CliCommand>,
}

/// Tools exposed by the controller.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub(crate) enum CliCommand {
    /// Calls any operation path on the host.
    Call {
        /// Dotted operation path, for example `Studio.Image.get_width`.
        #[arg(value_name = "PATH")]
        path: String,
        /// Positional argument as JSON; text that is not JSON is sent as a string.
        #[arg(long = "arg", value_name = "JSON", allow_hyphen_values = true)]
        args: Vec<String>,
        /// Keyword argument in `KEY=JSON` form.
        #[arg(long = "kwarg", value_name = "KEY=JSON")]
        kwargs: Vec<String>,
    },
    /// Lists the open images.
    Images,
    /// Describes one image.
    ImageInfo {
        /// Id of the image.
        #[arg(value_name = "IMAGE_ID", allow_hyphen_values = true)]
        image_id: i64,
    },
    /// Applies a Gaussian blur to the active layer of an image.
    Blur {
        /// Id of the image.
        #[arg(value_name = "IMAGE_ID", allow_hyphen_values = true)]
        image_id: i64,
        /// Blur radius in pixels.
        #[arg(long, default_value_t = DEFAULT_BLUR_RADIUS)]
        radius: f64,
    },
}
