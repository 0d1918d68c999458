//! Options record for the document-export collaborator.
//!
//! The user edits three raw form fields; everything else comes from the
//! export section of the config. Invalid input never fails the export, it
//! just keeps the configured default.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ExportConfig;

pub const NOTHING_TO_EXPORT: &str = "Nothing to download. Please enter some markdown first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            other => Err(format!("unknown orientation: {:?}", other)),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portrait => write!(f, "portrait"),
            Self::Landscape => write!(f, "landscape"),
        }
    }
}

/// Raw values as typed into the export options form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportForm {
    pub prefix: String,
    pub margin: String,
    pub orientation: String,
}

impl ExportForm {
    pub fn defaults(config: &ExportConfig) -> Self {
        Self {
            prefix: config.filename_prefix.clone(),
            margin: config.margin.to_string(),
            orientation: config.orientation.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportDecision {
    Confirmed(ExportForm),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageOptions {
    #[serde(rename = "type")]
    pub kind: String,
    pub quality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasOptions {
    pub scale: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageOptions {
    pub unit: String,
    pub format: String,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagebreakOptions {
    pub mode: Vec<String>,
}

/// Everything the exporter needs, shaped like its JSON options object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportOptions {
    /// Page margin in inches.
    pub margin: f64,
    pub filename: String,
    pub image: ImageOptions,
    pub html2canvas: CanvasOptions,
    #[serde(rename = "jsPDF")]
    pub page: PageOptions,
    pub pagebreak: PagebreakOptions,
}

impl ExportOptions {
    /// Options before the user has touched the form.
    pub fn defaults<Tz: TimeZone>(config: &ExportConfig, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self {
            margin: config.margin,
            filename: export_filename(&config.filename_prefix, now),
            image: ImageOptions {
                kind: String::from("jpeg"),
                quality: config.image_quality,
            },
            html2canvas: CanvasOptions {
                scale: config.scale,
            },
            page: PageOptions {
                unit: String::from("in"),
                format: config.page_format.clone(),
                orientation: config.orientation,
            },
            pagebreak: PagebreakOptions {
                mode: vec![
                    String::from("avoid-all"),
                    String::from("css"),
                    String::from("legacy"),
                ],
            },
        }
    }

    /// Apply the user's form on top of the defaults.
    pub fn from_form<Tz: TimeZone>(form: &ExportForm, config: &ExportConfig, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let mut options = Self::defaults(config, now);

        let prefix = form.prefix.trim();
        if !prefix.is_empty() {
            options.filename = export_filename(prefix, now);
        }

        match form.orientation.trim().parse::<Orientation>() {
            Ok(orientation) => options.page.orientation = orientation,
            Err(e) => log::debug!("Keeping default orientation: {}", e),
        }

        match form.margin.trim().parse::<f64>() {
            Ok(margin) if margin.is_finite() && margin >= 0.0 => options.margin = margin,
            _ => log::debug!("Keeping default margin, got {:?}", form.margin),
        }

        options
    }
}

/// `<prefix>-YYYYMMDD-HHMMSS.pdf`
pub fn export_filename<Tz: TimeZone>(prefix: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!("{}-{}.pdf", prefix, now.format("%Y%m%d-%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::Utc;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap()
    }

    fn form(prefix: &str, margin: &str, orientation: &str) -> ExportForm {
        ExportForm {
            prefix: prefix.to_string(),
            margin: margin.to_string(),
            orientation: orientation.to_string(),
        }
    }

    #[test]
    fn test_defaults_match_config() {
        let config = Config::default().export;
        let options = ExportOptions::defaults(&config, &stamp());
        assert_eq!(options.margin, 0.5);
        assert_eq!(options.filename, "markdown-preview-20240307-090502.pdf");
        assert_eq!(options.image.quality, 0.98);
        assert_eq!(options.html2canvas.scale, 2);
        assert_eq!(options.page.format, "a4");
        assert_eq!(options.page.orientation, Orientation::Portrait);
    }

    #[test]
    fn test_form_values_are_applied() {
        let config = Config::default().export;
        let options =
            ExportOptions::from_form(&form("notes", "1.25", "landscape"), &config, &stamp());
        assert_eq!(options.filename, "notes-20240307-090502.pdf");
        assert_eq!(options.margin, 1.25);
        assert_eq!(options.page.orientation, Orientation::Landscape);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = Config::default().export;
        for (margin, orientation) in [("abc", "sideways"), ("-1", "Portrait"), ("NaN", ""), ("inf", "up")] {
            let options = ExportOptions::from_form(&form("x", margin, orientation), &config, &stamp());
            assert_eq!(options.margin, 0.5, "margin {:?}", margin);
            assert_eq!(options.page.orientation, Orientation::Portrait);
        }
    }

    #[test]
    fn test_zero_margin_is_valid() {
        let config = Config::default().export;
        let options = ExportOptions::from_form(&form("x", "0", "portrait"), &config, &stamp());
        assert_eq!(options.margin, 0.0);
    }

    #[test]
    fn test_blank_prefix_uses_configured_prefix() {
        let config = Config::default().export;
        let options = ExportOptions::from_form(&form("   ", "0.5", "portrait"), &config, &stamp());
        assert_eq!(options.filename, "markdown-preview-20240307-090502.pdf");
    }

    #[test]
    fn test_serializes_in_exporter_shape() {
        let config = Config::default().export;
        let options = ExportOptions::defaults(&config, &stamp());
        let json = serde_json::to_value(&options).unwrap();

        assert_eq!(json["image"]["type"], "jpeg");
        assert_eq!(json["jsPDF"]["unit"], "in");
        assert_eq!(json["jsPDF"]["orientation"], "portrait");
        assert_eq!(json["html2canvas"]["scale"], 2);
        assert_eq!(json["pagebreak"]["mode"][0], "avoid-all");
    }

    #[test]
    fn test_form_defaults_round_trip_through_from_form() {
        let config = Config::default().export;
        let defaults = ExportForm::defaults(&config);
        assert_eq!(defaults.margin, "0.5");
        assert_eq!(
            ExportOptions::from_form(&defaults, &config, &stamp()),
            ExportOptions::defaults(&config, &stamp())
        );
    }
}
