//! Encoding channels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A visual channel a view can bind a field to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    X,
    Y,
    X2,
    Y2,
    Row,
    Column,
    Color,
    Opacity,
    Size,
    Shape,
    Text,
    Tooltip,
    Href,
    Detail,
    Key,
    Order,
}

impl Channel {
    pub const ALL: [Channel; 16] = [
        Channel::X,
        Channel::Y,
        Channel::X2,
        Channel::Y2,
        Channel::Row,
        Channel::Column,
        Channel::Color,
        Channel::Opacity,
        Channel::Size,
        Channel::Shape,
        Channel::Text,
        Channel::Tooltip,
        Channel::Href,
        Channel::Detail,
        Channel::Key,
        Channel::Order,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::X2 => "x2",
            Channel::Y2 => "y2",
            Channel::Row => "row",
            Channel::Column => "column",
            Channel::Color => "color",
            Channel::Opacity => "opacity",
            Channel::Size => "size",
            Channel::Shape => "shape",
            Channel::Text => "text",
            Channel::Tooltip => "tooltip",
            Channel::Href => "href",
            Channel::Detail => "detail",
            Channel::Key => "key",
            Channel::Order => "order",
        }
    }

    /// Whether the channel owns a scale.
    ///
    /// `x2`/`y2` share the scale of `x`/`y` and do not own one.
    pub fn is_scale_channel(self) -> bool {
        matches!(
            self,
            Channel::X
                | Channel::Y
                | Channel::Color
                | Channel::Opacity
                | Channel::Size
                | Channel::Shape
        )
    }

    /// Positional channels carry pixel coordinates.
    pub fn is_positional(self) -> bool {
        matches!(self, Channel::X | Channel::Y)
    }

    /// Size signal spanning a positional channel's range.
    pub fn size_signal(self) -> Option<&'static str> {
        match self {
            Channel::X => Some("width"),
            Channel::Y => Some("height"),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown channel name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChannel(pub String);

impl fmt::Display for UnknownChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown channel: {}", self.0)
    }
}

impl std::error::Error for UnknownChannel {}

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownChannel(s.to_owned()))
    }
}
