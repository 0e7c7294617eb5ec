//! Caller-supplied configuration.
//!
//! Everything the surrounding application owns — the anchor sentinel, header
//! vocabulary, truthy sets, enum tables, the sheet-naming convention and the
//! layout-version table — arrives here, with documented defaults so the CLI
//! works out of the box. Loaded from YAML when `--config` is given.

use crate::core::coerce::CoercionContext;
use crate::error::{RosterError, RosterResult};
use crate::layout::{self, LayoutTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Data-start resolution settings shared by import and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Sentinel literal; its row + 1 is the first data row.
    pub sentinel: String,
    /// Header vocabulary for the keyword fallback tier.
    pub keywords: Vec<String>,
    /// How many leading rows the keyword tier scans.
    pub scan_rows: usize,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            sentinel: "#DATA".to_string(),
            keywords: vec![
                "name".to_string(),
                "faculty".to_string(),
                "rank".to_string(),
                "surname".to_string(),
            ],
            scan_rows: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub anchor: AnchorConfig,
    /// Truthy vocabulary for BooleanFlag (and the base of TenureFlag).
    pub truthy: Vec<String>,
    /// Extra truthy words accepted only by TenureFlag.
    pub tenure_truthy: Vec<String>,
    /// Named enum tables injected into EnumLookup coercions.
    pub enum_tables: HashMap<String, HashMap<String, i64>>,
    /// Discriminator values excluded from export partitioning.
    pub group_exclusions: Vec<String>,
    /// Canonical template-sheet name; `{code}` is the group code.
    pub sheet_name_pattern: String,
    /// First caption row of every composed sheet.
    pub report_title: String,
    /// Fixed header-caption row written above the data block.
    pub header_captions: Vec<String>,
    /// Which layout version the incoming workbooks use.
    pub active_layout: String,
    pub layouts: HashMap<String, LayoutTable>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        let mut enum_tables = HashMap::new();
        enum_tables.insert(
            "gender".to_string(),
            HashMap::from([
                ("M".to_string(), 1),
                ("MALE".to_string(), 1),
                ("1".to_string(), 1),
                ("F".to_string(), 2),
                ("FEMALE".to_string(), 2),
                ("2".to_string(), 2),
            ]),
        );
        enum_tables.insert(
            "faculty_type".to_string(),
            HashMap::from([
                ("FULL-TIME".to_string(), 1),
                ("FT".to_string(), 1),
                ("1".to_string(), 1),
                ("PART-TIME".to_string(), 2),
                ("PT".to_string(), 2),
                ("2".to_string(), 2),
                ("VISITING".to_string(), 3),
                ("3".to_string(), 3),
            ]),
        );

        let mut layouts = HashMap::new();
        for layout in [layout::faculty_layout_v1(), layout::faculty_layout_v2()] {
            layouts.insert(layout.version.clone(), layout);
        }

        Self {
            anchor: AnchorConfig::default(),
            truthy: vec![
                "true".to_string(),
                "1".to_string(),
                "yes".to_string(),
                "y".to_string(),
            ],
            tenure_truthy: vec!["tenured".to_string()],
            enum_tables,
            group_exclusions: vec!["REFERENCE".to_string()],
            sheet_name_pattern: "GROUP {code}".to_string(),
            report_title: "Faculty Profile Report".to_string(),
            header_captions: vec![
                "No.".to_string(),
                "Faculty Name".to_string(),
                "Gender".to_string(),
                "Group".to_string(),
                "Type".to_string(),
                "Rank".to_string(),
                "Tenured".to_string(),
                "Highest Degree".to_string(),
                "Grad Units".to_string(),
                "Full-time".to_string(),
                "Lecture Hrs".to_string(),
                "Lab Hrs".to_string(),
                "Teaching Hrs".to_string(),
                "Research Hrs".to_string(),
                "Extension Hrs".to_string(),
                "Admin Hrs".to_string(),
                "Total Hrs".to_string(),
            ],
            active_layout: "v2".to_string(),
            layouts,
        }
    }
}

impl RosterConfig {
    /// Load a YAML config file; missing keys keep their defaults.
    pub fn load(path: &Path) -> RosterResult<Self> {
        let text = fs::read_to_string(path)?;
        let config: RosterConfig = serde_yaml::from_str(&text)?;
        Ok(config)
    }

    /// The layout table selected by `active_layout`.
    pub fn layout(&self) -> RosterResult<&LayoutTable> {
        self.layouts.get(&self.active_layout).ok_or_else(|| {
            RosterError::Config(format!("unknown layout version '{}'", self.active_layout))
        })
    }

    pub fn coercion_context(&self) -> CoercionContext {
        CoercionContext::new(
            self.truthy.iter().cloned(),
            self.tenure_truthy.iter().cloned(),
            self.enum_tables.clone(),
        )
    }

    /// Canonical sheet name for a group code, e.g. `GROUP A1`.
    pub fn sheet_name_for(&self, code: &str) -> String {
        self.sheet_name_pattern.replace("{code}", code.trim())
    }
}
