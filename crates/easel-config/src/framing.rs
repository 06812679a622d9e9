//! Request framing modes selectable from configuration.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the host listener decides that a request has fully arrived.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FramingMode {
    /// Keep reading until the accumulated bytes decode as one message.
    #[default]
    WholeBuffer,
    /// Perform exactly one bounded read and decode it as-is.
    SingleShot,
    /// Read up to and including the first newline.
    Delimited,
}
